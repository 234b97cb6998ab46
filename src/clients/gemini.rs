use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::clients::{
    EmbeddingProvider, ProviderError, ProviderResult, SuggestionProvider, build_reqwest_client,
    ensure_vector_count, status_error,
};

/// Client for the Gemini REST API (`generativelanguage.googleapis.com`).
///
/// One instance is bound to one model; the worker builds one for embeddings
/// and one for text generation.
pub struct GeminiClient {
    client: reqwest::Client,
    base_url: Url,
    api_key: String,
    model: String,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct EmbedContentRequest<'a> {
    model: String,
    content: Content<'a>,
}

#[derive(Serialize)]
struct BatchEmbedRequest<'a> {
    requests: Vec<EmbedContentRequest<'a>>,
}

#[derive(Deserialize)]
struct EmbeddingValues {
    values: Vec<f32>,
}

#[derive(Deserialize)]
struct BatchEmbedResponse {
    #[serde(default)]
    embeddings: Vec<EmbeddingValues>,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<ResponseContent>,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

impl GeminiClient {
    pub fn new(base_url: &str, api_key: &str, model: &str, timeout_secs: u64) -> ProviderResult<Self> {
        let mut base = base_url.to_string();
        if !base.ends_with('/') {
            base.push('/');
        }

        Ok(Self {
            client: build_reqwest_client(timeout_secs)?,
            base_url: Url::parse(&base).map_err(|e| ProviderError::Build(e.to_string()))?,
            api_key: api_key.to_string(),
            model: model.to_string(),
        })
    }

    fn endpoint(&self, method: &str) -> ProviderResult<Url> {
        self.base_url
            .join(&format!("v1beta/models/{}:{method}", self.model))
            .map_err(|e| ProviderError::Build(e.to_string()))
    }

    async fn post<B: Serialize + ?Sized>(&self, method: &str, body: &B) -> ProviderResult<reqwest::Response> {
        let url = self.endpoint(method)?;

        let response = self
            .client
            .post(url)
            .header("x-goog-api-key", &self.api_key)
            .json(body)
            .send()
            .await?;

        if !response.status().is_success() {
            let error = status_error(response).await;
            log::error!("Gemini {method} call for model {} failed: {error}", self.model);
            return Err(error);
        }

        Ok(response)
    }
}

fn suggestion_prompt(job_title: &str) -> String {
    format!(
        "A candidate applied for the \"{job_title}\" position but was not selected. \
         Write one short, encouraging paragraph addressed to the candidate that names \
         the skills and concrete next steps that would make them a stronger applicant \
         for this kind of role. Reply with the paragraph only."
    )
}

fn first_candidate_text(response: GenerateResponse) -> ProviderResult<String> {
    let text = response
        .candidates
        .into_iter()
        .filter_map(|candidate| candidate.content)
        .flat_map(|content| content.parts)
        .filter_map(|part| part.text)
        .collect::<Vec<_>>()
        .join("");

    let text = text.trim();
    if text.is_empty() {
        return Err(ProviderError::Decode(
            "generation response has no text".to_string(),
        ));
    }
    Ok(text.to_string())
}

#[async_trait]
impl EmbeddingProvider for GeminiClient {
    async fn embed(&self, texts: &[String]) -> ProviderResult<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        log::debug!("Embedding {} texts with {}", texts.len(), self.model);

        let request = BatchEmbedRequest {
            requests: texts
                .iter()
                .map(|text| EmbedContentRequest {
                    model: format!("models/{}", self.model),
                    content: Content {
                        parts: vec![Part { text }],
                    },
                })
                .collect(),
        };

        let response: BatchEmbedResponse = self
            .post("batchEmbedContents", &request)
            .await?
            .json()
            .await
            .map_err(|e| ProviderError::Decode(e.to_string()))?;

        let vectors: Vec<Vec<f32>> = response
            .embeddings
            .into_iter()
            .map(|embedding| embedding.values)
            .collect();
        ensure_vector_count(texts.len(), &vectors)?;

        Ok(vectors)
    }
}

#[async_trait]
impl SuggestionProvider for GeminiClient {
    async fn improvement_suggestion(&self, job_title: &str) -> ProviderResult<String> {
        let prompt = suggestion_prompt(job_title);
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: &prompt }],
            }],
        };

        let response: GenerateResponse = self
            .post("generateContent", &request)
            .await?
            .json()
            .await
            .map_err(|e| ProviderError::Decode(e.to_string()))?;

        first_candidate_text(response)
    }
}
