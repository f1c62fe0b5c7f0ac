//! Application state for the signfield API

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use signfield_core::{EditSession, PageViewports, RenderBackend};
use signfield_render::{DocumentStore, LocalRenderBackend};
use tokio::sync::{Mutex, RwLock};
use tracing::info;

use crate::config::Config;
use crate::error::ApiError;
use crate::remote::HttpRenderBackend;

/// One document being edited, with the page measurements reported for it
#[derive(Debug)]
pub struct SessionEntry {
    pub session: EditSession,
    pub viewports: PageViewports,
    pub created_at: DateTime<Utc>,
}

pub struct AppState {
    pub config: Config,
    sessions: RwLock<HashMap<String, Arc<Mutex<SessionEntry>>>>,
    pub store: Arc<DocumentStore>,
    /// Serves `/api/render` and finalization when no remote backend is set
    pub local: LocalRenderBackend,
    pub backend: Arc<dyn RenderBackend>,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self> {
        let store = Arc::new(match &config.signed_output_dir {
            Some(dir) => DocumentStore::with_output_dir(dir),
            None => DocumentStore::new(),
        });
        let local = LocalRenderBackend::new(store.clone());

        let backend: Arc<dyn RenderBackend> = match &config.render_backend_url {
            Some(url) => {
                info!("Finalizing through remote renderer at {}", url);
                Arc::new(
                    HttpRenderBackend::new(url.clone(), config.render_timeout)
                        .context("Failed to build HTTP client for the rendering backend")?,
                )
            }
            None => {
                info!("Finalizing through the local renderer");
                Arc::new(local.clone())
            }
        };

        Ok(Self::with_backend(config, store, local, backend))
    }

    pub fn with_backend(
        config: Config,
        store: Arc<DocumentStore>,
        local: LocalRenderBackend,
        backend: Arc<dyn RenderBackend>,
    ) -> Self {
        Self {
            config,
            sessions: RwLock::new(HashMap::new()),
            store,
            local,
            backend,
        }
    }

    /// Register a new session, failing if the id is taken
    pub async fn create_session(
        &self,
        document_id: &str,
    ) -> Result<Arc<Mutex<SessionEntry>>, ApiError> {
        let mut sessions = self.sessions.write().await;
        if sessions.contains_key(document_id) {
            return Err(ApiError::DocumentExists(document_id.to_string()));
        }

        let entry = Arc::new(Mutex::new(SessionEntry {
            session: EditSession::new(document_id).with_date_format(&self.config.date_format),
            viewports: PageViewports::new(),
            created_at: Utc::now(),
        }));
        sessions.insert(document_id.to_string(), entry.clone());
        info!("Created session {}", document_id);
        Ok(entry)
    }

    pub async fn session(&self, document_id: &str) -> Result<Arc<Mutex<SessionEntry>>, ApiError> {
        self.sessions
            .read()
            .await
            .get(document_id)
            .cloned()
            .ok_or_else(|| ApiError::SessionNotFound(document_id.to_string()))
    }
}
