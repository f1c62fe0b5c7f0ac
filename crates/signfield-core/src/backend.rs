//! Rendering backend contract
//!
//! The backend receives the finalized annotation list in PDF point space and
//! produces the output document. It is the only suspending call in the
//! editing flow.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::finalize::PlacedAnnotation;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum BackendError {
    #[error("Request failed: {0}")]
    Transport(String),

    #[error("Backend answered with status {0}")]
    Status(u16),

    #[error("Malformed backend response: {0}")]
    Malformed(String),

    #[error("Backend reported failure: {0}")]
    Rejected(String),
}

/// Request body sent to the rendering backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderRequest {
    pub document_id: String,
    pub signatures: Vec<PlacedAnnotation>,
}

/// Response body from the rendering backend
///
/// Everything is optional so that a wrong-shaped body still deserializes and
/// can be rejected with a useful message.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderResponse {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub signed_file_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RenderResponse {
    pub fn success(signed_file_url: impl Into<String>) -> Self {
        Self {
            success: Some(true),
            signed_file_url: Some(signed_file_url.into()),
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: Some(false),
            signed_file_url: None,
            error: Some(error.into()),
        }
    }

    /// Accept only `{ success: true, signedFileUrl: <non-empty> }`
    pub fn into_signed_file_url(self) -> Result<String, BackendError> {
        match (self.success, self.signed_file_url) {
            (Some(true), Some(url)) if !url.trim().is_empty() => Ok(url),
            (Some(true), _) => Err(BackendError::Malformed(
                "missing signedFileUrl".to_string(),
            )),
            (Some(false), _) => Err(BackendError::Rejected(
                self.error.unwrap_or_else(|| "no reason given".to_string()),
            )),
            (None, _) => Err(BackendError::Malformed("missing success flag".to_string())),
        }
    }

    /// Parse a raw response body
    pub fn from_body(body: &[u8]) -> Result<Self, BackendError> {
        serde_json::from_slice(body).map_err(|e| BackendError::Malformed(e.to_string()))
    }
}

#[async_trait]
pub trait RenderBackend: Send + Sync {
    async fn render(&self, request: &RenderRequest) -> Result<RenderResponse, BackendError>;
}
