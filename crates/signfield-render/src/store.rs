//! In-memory document store for originals and signed output

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use sha2::{Digest, Sha256};
use tokio::sync::RwLock;
use tracing::info;

use crate::error::RenderError;

#[derive(Debug, Clone, PartialEq)]
pub struct SignedDocument {
    pub bytes: Arc<Vec<u8>>,
    /// Hex SHA-256 of `bytes`
    pub document_hash: String,
    /// Where the document was written, when an output directory is configured
    pub path: Option<PathBuf>,
}

#[derive(Debug, Default)]
pub struct DocumentStore {
    originals: RwLock<HashMap<String, Arc<Vec<u8>>>>,
    signed: RwLock<HashMap<String, SignedDocument>>,
    output_dir: Option<PathBuf>,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Also write every signed document into `dir`
    pub fn with_output_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: Some(dir.into()),
            ..Self::default()
        }
    }

    pub fn output_dir(&self) -> Option<&Path> {
        self.output_dir.as_deref()
    }

    /// Keep the original PDF for a document, returning its hex SHA-256
    pub async fn insert_original(&self, document_id: &str, bytes: Vec<u8>) -> String {
        let document_hash = hex::encode(Sha256::digest(&bytes));
        info!(
            "Stored original {} ({} bytes, sha256 {})",
            document_id,
            bytes.len(),
            document_hash
        );
        self.originals
            .write()
            .await
            .insert(document_id.to_string(), Arc::new(bytes));
        document_hash
    }

    pub async fn original(&self, document_id: &str) -> Result<Arc<Vec<u8>>, RenderError> {
        self.originals
            .read()
            .await
            .get(document_id)
            .cloned()
            .ok_or_else(|| RenderError::UnknownDocument(document_id.to_string()))
    }

    pub async fn contains(&self, document_id: &str) -> bool {
        self.originals.read().await.contains_key(document_id)
    }

    pub async fn store_signed(
        &self,
        document_id: &str,
        bytes: Vec<u8>,
    ) -> Result<SignedDocument, RenderError> {
        let document_hash = hex::encode(Sha256::digest(&bytes));

        let path = match &self.output_dir {
            Some(dir) => {
                tokio::fs::create_dir_all(dir).await?;
                let path = dir.join(signed_file_name(document_id));
                tokio::fs::write(&path, &bytes).await?;
                Some(path)
            }
            None => None,
        };

        let signed = SignedDocument {
            bytes: Arc::new(bytes),
            document_hash,
            path,
        };
        info!(
            "Stored signed {} (sha256 {})",
            document_id, signed.document_hash
        );
        self.signed
            .write()
            .await
            .insert(document_id.to_string(), signed.clone());
        Ok(signed)
    }

    pub async fn signed(&self, document_id: &str) -> Option<SignedDocument> {
        self.signed.read().await.get(document_id).cloned()
    }
}

/// File name for a signed document; anything unsafe in the id becomes `_`
pub fn signed_file_name(document_id: &str) -> String {
    let stem: String = document_id
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("{}-signed.pdf", stem)
}
