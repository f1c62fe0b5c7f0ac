//! In-process implementation of the rendering backend contract

use std::sync::Arc;

use async_trait::async_trait;
use signfield_core::{BackendError, RenderBackend, RenderRequest, RenderResponse};
use tracing::{error, info};

use crate::error::RenderError;
use crate::stamp::stamp_annotations;
use crate::store::{DocumentStore, SignedDocument};

/// Renders against originals held in a [`DocumentStore`]
#[derive(Debug, Clone)]
pub struct LocalRenderBackend {
    store: Arc<DocumentStore>,
}

impl LocalRenderBackend {
    pub fn new(store: Arc<DocumentStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<DocumentStore> {
        &self.store
    }

    /// URL the signed output is served from
    pub fn signed_file_url(document_id: &str) -> String {
        format!("/api/documents/{}/signed", document_id)
    }

    /// Stamp the request onto the stored original and keep the result
    pub async fn render_document(
        &self,
        request: &RenderRequest,
    ) -> Result<SignedDocument, RenderError> {
        let original = self.store.original(&request.document_id).await?;
        let annotations = request.signatures.clone();

        let stamped =
            tokio::task::spawn_blocking(move || stamp_annotations(&original, &annotations))
                .await
                .map_err(|e| RenderError::OperationError(e.to_string()))??;

        self.store
            .store_signed(&request.document_id, stamped)
            .await
    }
}

#[async_trait]
impl RenderBackend for LocalRenderBackend {
    async fn render(&self, request: &RenderRequest) -> Result<RenderResponse, BackendError> {
        match self.render_document(request).await {
            Ok(signed) => {
                info!(
                    "Rendered {} ({} bytes)",
                    request.document_id,
                    signed.bytes.len()
                );
                Ok(RenderResponse::success(Self::signed_file_url(
                    &request.document_id,
                )))
            }
            Err(e) => {
                error!("Rendering {} failed: {}", request.document_id, e);
                Ok(RenderResponse::failure(e.to_string()))
            }
        }
    }
}
