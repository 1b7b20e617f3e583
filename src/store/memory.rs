use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::CatalogStore;
use crate::error::{Error, Result};
use crate::models::FeatureCollection;

/// In-memory catalog store, keyed by path
#[derive(Debug, Default)]
pub struct MemoryStore {
    catalogs: Mutex<HashMap<PathBuf, FeatureCollection>>,
    saves: Mutex<Vec<PathBuf>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, path: impl Into<PathBuf>, collection: FeatureCollection) {
        self.catalogs
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(path.into(), collection);
    }

    pub fn get(&self, path: &Path) -> Option<FeatureCollection> {
        self.catalogs
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(path)
            .cloned()
    }

    /// Paths passed to `save`, in call order
    pub fn saves(&self) -> Vec<PathBuf> {
        self.saves.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl CatalogStore for MemoryStore {
    fn exists(&self, path: &Path) -> bool {
        self.catalogs
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains_key(path)
    }

    fn load(&self, path: &Path) -> Result<FeatureCollection> {
        self.get(path).ok_or_else(|| {
            Error::io(
                path,
                std::io::Error::new(std::io::ErrorKind::NotFound, "no such catalog"),
            )
        })
    }

    fn save(&self, path: &Path, collection: &FeatureCollection) -> Result<()> {
        self.saves
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(path.to_path_buf());
        self.insert(path, collection.clone());
        Ok(())
    }
}
