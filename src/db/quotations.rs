use crate::models::quotation::PersistedQuotation;
use log::info;
use sled::{Db, Tree};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum QuotationDbError {
    #[error("Sled DB error: {0}")]
    SledError(#[from] sled::Error),
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
    #[error("Store operation timed out after {0:?}")]
    Timeout(Duration),
    #[error("Store task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

pub const QUOTATIONS_TREE_NAME: &str = "quotations";

/// Write side of the quotation table. Implementations must be usable from
/// several blocking tasks at once.
pub trait QuotationRepository: Send + Sync + 'static {
    fn insert(&self, bid: &str) -> Result<PersistedQuotation, QuotationDbError>;
}

#[derive(Clone)]
pub struct QuotationStore {
    db: Db,
    tree: Tree,
}

impl QuotationStore {
    /// Opens the database at `path`, creating the quotation tree if it is missing.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, QuotationDbError> {
        let db = sled::open(path.as_ref())?;
        let tree = db.open_tree(QUOTATIONS_TREE_NAME)?;
        let store = QuotationStore { db, tree };

        info!(
            "quotation store opened at {} ({} rows)",
            path.as_ref().display(),
            store.len()
        );

        Ok(store)
    }

    pub(crate) fn len(&self) -> usize {
        self.tree.len()
    }

    #[cfg(test)]
    pub(crate) fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    #[cfg(test)]
    pub(crate) fn get(&self, id: u64) -> Result<Option<PersistedQuotation>, QuotationDbError> {
        match self.tree.get(id.to_be_bytes())? {
            Some(ivec) => Ok(Some(serde_json::from_slice(&ivec)?)),
            None => Ok(None),
        }
    }

    pub fn flush(&self) -> Result<usize, QuotationDbError> {
        Ok(self.db.flush()?)
    }
}

impl QuotationRepository for QuotationStore {
    fn insert(&self, bid: &str) -> Result<PersistedQuotation, QuotationDbError> {
        let id = self.db.generate_id()?;
        let quotation = PersistedQuotation {
            id,
            bid: bid.to_string(),
        };
        let serialized = serde_json::to_vec(&quotation)?;

        self.tree.insert(id.to_be_bytes(), serialized)?;

        Ok(quotation)
    }
}

/// Runs the insert on the blocking pool and gives up once `deadline` passes.
/// A write already handed to sled is not rolled back on timeout.
pub async fn save_with_deadline<R: QuotationRepository>(
    repository: Arc<R>,
    bid: String,
    deadline: Duration,
) -> Result<PersistedQuotation, QuotationDbError> {
    let task = tokio::task::spawn_blocking(move || repository.insert(&bid));

    match tokio::time::timeout(deadline, task).await {
        Ok(joined) => joined?,
        Err(_) => Err(QuotationDbError::Timeout(deadline)),
    }
}
