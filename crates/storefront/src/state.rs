//! Application state shared across handlers.

use std::sync::Arc;

use crate::backend::{BackendError, StorefrontBackend};
use crate::config::StorefrontConfig;
use crate::content::{ContentError, ContentStore};

/// Errors building the application state.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("backend client: {0}")]
    Backend(#[from] BackendError),
    #[error("content: {0}")]
    Content(#[from] ContentError),
}

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    backend: StorefrontBackend,
    content: ContentStore,
}

impl AppState {
    /// Build state from configuration, loading content pages from disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend client cannot be built or the content
    /// directory cannot be read.
    pub fn new(config: StorefrontConfig) -> Result<Self, StateError> {
        let backend = StorefrontBackend::new(&config.backend)?;
        let content = ContentStore::load(&config.content_dir)?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                backend,
                content,
            }),
        })
    }

    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Commerce backend client.
    #[must_use]
    pub fn backend(&self) -> &StorefrontBackend {
        &self.inner.backend
    }

    /// Markdown content pages.
    #[must_use]
    pub fn content(&self) -> &ContentStore {
        &self.inner.content
    }
}
