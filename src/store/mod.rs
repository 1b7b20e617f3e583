//! Loading and saving feature catalogs.
//!
//! The pipeline only sees the [`CatalogStore`] trait; file formats live
//! behind [`FileStore`].

pub mod geojson;
pub mod kml;
mod memory;
mod writer;

use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::models::FeatureCollection;

pub use memory::MemoryStore;
pub use writer::{BlockingWriter, PendingWrite, WriteDispatcher};

/// Load/save interface over feature catalogs
pub trait CatalogStore: Send + Sync {
    fn exists(&self, path: &Path) -> bool;

    fn load(&self, path: &Path) -> Result<FeatureCollection>;

    fn save(&self, path: &Path, collection: &FeatureCollection) -> Result<()>;
}

/// Supported vector file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Kml,
    GeoJson,
}

impl Format {
    /// Pick the format from the file extension
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("kml") => Ok(Format::Kml),
            Some("geojson") | Some("json") => Ok(Format::GeoJson),
            _ => Err(Error::UnsupportedFormat(path.to_path_buf())),
        }
    }
}

/// Catalog store backed by KML/GeoJSON files on disk
#[derive(Debug, Clone, Copy, Default)]
pub struct FileStore;

impl FileStore {
    pub fn new() -> Self {
        Self
    }
}

fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

impl CatalogStore for FileStore {
    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn load(&self, path: &Path) -> Result<FeatureCollection> {
        let format = Format::from_path(path)?;
        let content = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;

        let collection = match format {
            Format::Kml => kml::parse(&content, path)?,
            Format::GeoJson => geojson::parse(&content, path)?,
        };

        info!(
            "Read {} features from {}",
            collection.len(),
            path.display()
        );
        Ok(collection)
    }

    /// Written to a temporary file next to the target, then moved into place
    fn save(&self, path: &Path, collection: &FeatureCollection) -> Result<()> {
        let format = Format::from_path(path)?;
        let dir = parent_dir(path);
        fs::create_dir_all(&dir).map_err(|e| Error::io(&dir, e))?;

        let tmp = NamedTempFile::new_in(&dir).map_err(|e| Error::io(&dir, e))?;
        {
            let mut out = BufWriter::new(tmp.as_file());
            match format {
                Format::Kml => kml::write(collection, &mut out).map_err(|e| Error::io(path, e))?,
                Format::GeoJson => {
                    let text = geojson::to_string(collection)
                        .map_err(|e| Error::parse(path, e))?;
                    out.write_all(text.as_bytes())
                        .map_err(|e| Error::io(path, e))?;
                }
            }
            out.flush().map_err(|e| Error::io(path, e))?;
        }
        tmp.persist(path).map_err(|e| Error::io(path, e.error))?;

        debug!("Wrote {} features to {}", collection.len(), path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Feature, GeoCoord, GeoPolygon};

    fn sample() -> FeatureCollection {
        let c = |lat, lon| GeoCoord::new(lat, lon).unwrap();
        FeatureCollection::new(vec![Feature::new(GeoPolygon::from_vertices(vec![
            c(-20.3152, -40.2890),
            c(-20.3152, -40.2888),
            c(-20.3150, -40.2888),
        ]))
        .with_name("Edifício")
        .with_property("ID", "42")])
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(Format::from_path(Path::new("a/B.KML")).unwrap(), Format::Kml);
        assert_eq!(
            Format::from_path(Path::new("b.geojson")).unwrap(),
            Format::GeoJson
        );
        assert!(matches!(
            Format::from_path(Path::new("c.shp")),
            Err(Error::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_file_round_trip_both_formats() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new();

        for name in ["nested/out.kml", "out.geojson"] {
            let path = dir.path().join(name);
            assert!(!store.exists(&path));
            store.save(&path, &sample()).unwrap();
            assert!(store.exists(&path));
            assert_eq!(store.load(&path).unwrap(), sample());
        }
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = FileStore::new()
            .load(&dir.path().join("missing.kml"))
            .unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }
}
