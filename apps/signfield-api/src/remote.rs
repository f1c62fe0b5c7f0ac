//! Rendering backend reached over HTTP

use std::time::Duration;

use async_trait::async_trait;
use signfield_core::{BackendError, RenderBackend, RenderRequest, RenderResponse};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct HttpRenderBackend {
    client: reqwest::Client,
    url: String,
}

impl HttpRenderBackend {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl RenderBackend for HttpRenderBackend {
    async fn render(&self, request: &RenderRequest) -> Result<RenderResponse, BackendError> {
        debug!(
            "POST {} for {} ({} annotation(s))",
            self.url,
            request.document_id,
            request.signatures.len()
        );

        let response = self
            .client
            .post(&self.url)
            .json(request)
            .send()
            .await
            .map_err(|e| BackendError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(BackendError::Status(status.as_u16()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| BackendError::Transport(e.to_string()))?;
        RenderResponse::from_body(&body)
    }
}
