//! Submit-then-await dispatch of the final catalog write.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::info;

use super::CatalogStore;
use crate::error::{Error, Result};
use crate::models::FeatureCollection;

/// A write that has been submitted; resolves to the number of features written
#[must_use = "a submitted write must be awaited"]
pub struct PendingWrite {
    inner: Pending,
}

enum Pending {
    Done(Result<usize>),
    Spawned(JoinHandle<Result<usize>>),
}

impl PendingWrite {
    pub fn done(result: Result<usize>) -> Self {
        Self {
            inner: Pending::Done(result),
        }
    }

    pub fn spawned(handle: JoinHandle<Result<usize>>) -> Self {
        Self {
            inner: Pending::Spawned(handle),
        }
    }

    /// Block the caller until the write has finished
    pub async fn wait(self) -> Result<usize> {
        match self.inner {
            Pending::Done(result) => result,
            Pending::Spawned(handle) => handle
                .await
                .map_err(|e| Error::WriteWorker(e.to_string()))?,
        }
    }
}

/// Hands a finished collection to a worker for persistence
pub trait WriteDispatcher: Send + Sync {
    fn submit(&self, path: PathBuf, collection: FeatureCollection) -> PendingWrite;
}

/// Runs each write on tokio's blocking pool
pub struct BlockingWriter<S> {
    store: Arc<S>,
}

impl<S> BlockingWriter<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }
}

impl<S: CatalogStore + 'static> WriteDispatcher for BlockingWriter<S> {
    fn submit(&self, path: PathBuf, collection: FeatureCollection) -> PendingWrite {
        let store = Arc::clone(&self.store);
        let handle = tokio::task::spawn_blocking(move || {
            info!(
                "Writing {} features to {}",
                collection.len(),
                path.display()
            );
            store.save(&path, &collection)?;
            Ok(collection.len())
        });
        PendingWrite::spawned(handle)
    }
}
