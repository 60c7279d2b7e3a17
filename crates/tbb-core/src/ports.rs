use std::time::Duration;

use async_trait::async_trait;

use crate::{domain::UpdateId, messaging::types::IncomingUpdate, Result};

/// Hexagonal port for the inbound update stream (Telegram `getUpdates`).
#[async_trait]
pub trait UpdateSource: Send + Sync {
    /// Prepare a polling session: validate credentials, make sure no webhook
    /// competes for the same update stream.
    ///
    /// Called before the first fetch and again after every catastrophic failure.
    async fn prepare(&self) -> Result<()>;

    /// Long-poll for updates with `id >= offset`, holding the request open up
    /// to `timeout` when nothing is pending.
    async fn fetch(&self, offset: UpdateId, timeout: Duration) -> Result<Vec<IncomingUpdate>>;
}

/// Catalog item type filter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PrintType {
    #[default]
    Books,
    Magazines,
    All,
}

impl PrintType {
    pub fn as_query_value(self) -> &'static str {
        match self {
            PrintType::Books => "books",
            PrintType::Magazines => "magazines",
            PrintType::All => "all",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CatalogQuery {
    pub query: String,
    pub max_results: usize,
    pub print_type: PrintType,
}

/// One catalog entry as delivered upstream; any field may be missing.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CatalogVolume {
    pub title: Option<String>,
    pub authors: Option<Vec<String>>,
}

/// Hexagonal port for the book catalog (Google Books today).
#[async_trait]
pub trait BookCatalog: Send + Sync {
    async fn list_volumes(&self, query: &CatalogQuery) -> Result<Vec<CatalogVolume>>;
}
