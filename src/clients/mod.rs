use std::time::Duration;

use async_trait::async_trait;

pub mod gemini;
pub mod local;
pub mod mailer;

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("failed to build client: {0}")]
    Build(String),
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("provider returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("unexpected provider response: {0}")]
    Decode(String),
    #[error("model error: {0}")]
    Model(String),
}

pub type ProviderResult<T> = Result<T, ProviderError>;

/// Turns text into embedding vectors, one per input, in input order.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    async fn embed(&self, texts: &[String]) -> ProviderResult<Vec<Vec<f32>>>;
}

/// Produces advice for candidates who were not selected for a job.
#[async_trait]
pub trait SuggestionProvider: Send + Sync {
    async fn improvement_suggestion(&self, job_title: &str) -> ProviderResult<String>;
}

/// Outgoing mail. Delivery is fire-and-forget: success means the transport
/// accepted the message.
#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn send(&self, to: &str, subject: &str, html: &str) -> ProviderResult<()>;
}

/// Build the HTTP client shared by the remote providers.
pub(crate) fn build_reqwest_client(timeout_secs: u64) -> ProviderResult<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| ProviderError::Build(e.to_string()))
}

/// Read the body of a failed response into a [`ProviderError::Status`].
pub(crate) async fn status_error(response: reqwest::Response) -> ProviderError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    ProviderError::Status { status, body }
}

/// Check that a provider returned exactly one vector per input.
pub(crate) fn ensure_vector_count(expected: usize, vectors: &[Vec<f32>]) -> ProviderResult<()> {
    if vectors.len() != expected {
        return Err(ProviderError::Decode(format!(
            "expected {expected} embeddings, got {}",
            vectors.len()
        )));
    }
    Ok(())
}
