use std::sync::Arc;

use fetchd_api::{DownloadEntry, FetchdClient};
use tokio::sync::RwLock;

use crate::db::DbPool;
use crate::resolver::Preview;
use crate::session::DownloadSession;
use crate::words::WordBank;

#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub client: FetchdClient,
    pub session: Arc<DownloadSession>,
    pub library: Arc<Library>,
    pub words: Arc<WordBank>,
    pub ui: Arc<RwLock<UiState>>
}

/// Server-side view state for the single-user UI: the loaded preview
/// and a one-shot flash message for the next page render.
#[derive(Default)]
pub struct UiState {
    pub preview: Option<Preview>,
    pub flash: Option<Flash>
}

#[derive(Debug, Clone)]
pub struct Flash {
    pub kind: FlashKind,
    pub message: String
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashKind {
    Success,
    Error
}

impl Flash {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Success,
            message: message.into()
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Error,
            message: message.into()
        }
    }

    pub fn css_class(&self) -> &'static str {
        match self.kind {
            FlashKind::Success => "success",
            FlashKind::Error => "error"
        }
    }
}

/// Local mirror of the engine's finished-file list. Replaced wholesale
/// on every refresh, never patched entry by entry.
pub struct Library {
    client: FetchdClient,
    entries: RwLock<Vec<DownloadEntry>>
}

impl Library {
    pub fn new(client: FetchdClient) -> Self {
        Self {
            client,
            entries: RwLock::new(Vec::new())
        }
    }

    pub async fn refresh(&self) -> fetchd_api::Result<()> {
        let entries = self.client.list_downloads().await?;
        tracing::debug!("library refreshed, {} entries", entries.len());
        *self.entries.write().await = entries;
        Ok(())
    }

    pub async fn snapshot(&self) -> Vec<DownloadEntry> {
        self.entries.read().await.clone()
    }
}
