use async_trait::async_trait;
use serde::Serialize;
use url::Url;

use crate::clients::{
    MailTransport, ProviderError, ProviderResult, build_reqwest_client, status_error,
};

/// Sends transactional mail through a JSON HTTP mail API
/// (`POST {base_url}/emails`, bearer-key authenticated).
pub struct HttpMailer {
    client: reqwest::Client,
    endpoint: Url,
    api_key: String,
    from: String,
}

#[derive(Debug, Serialize)]
struct OutgoingMail<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    html: &'a str,
}

impl HttpMailer {
    pub fn new(base_url: &str, api_key: &str, from: &str, timeout_secs: u64) -> ProviderResult<Self> {
        let mut base = base_url.to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        let endpoint = Url::parse(&base)
            .and_then(|url| url.join("emails"))
            .map_err(|e| ProviderError::Build(e.to_string()))?;

        Ok(Self {
            client: build_reqwest_client(timeout_secs)?,
            endpoint,
            api_key: api_key.to_string(),
            from: from.to_string(),
        })
    }
}

#[async_trait]
impl MailTransport for HttpMailer {
    async fn send(&self, to: &str, subject: &str, html: &str) -> ProviderResult<()> {
        let mail = OutgoingMail {
            from: &self.from,
            to: [to],
            subject,
            html,
        };

        let response = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(&self.api_key)
            .json(&mail)
            .send()
            .await?;

        if !response.status().is_success() {
            let error = status_error(response).await;
            log::error!("Mail to {to} rejected: {error}");
            return Err(error);
        }

        log::debug!("Mail \"{subject}\" accepted for {to}");
        Ok(())
    }
}
