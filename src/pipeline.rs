//! Region-of-study pipeline: select the region, filter buildings, persist.

use std::path::PathBuf;
use std::sync::Arc;

use indicatif::ProgressBar;
use tracing::info;

use crate::config::Config;
use crate::distance;
use crate::error::{Error, Result};
use crate::models::{FeatureCollection, GeoPolygon, RegionCatalog};
use crate::pip::{filter_within_with_progress, select_region_with};
use crate::store::{BlockingWriter, CatalogStore, FileStore, WriteDispatcher};

/// Where the region boundary came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundarySource {
    /// Read from the region cache file
    Cache,
    /// Selected from the region catalog (and written to the cache)
    Selected,
}

/// Outcome of a completed run
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub region: String,
    pub boundary_source: BoundarySource,
    pub candidates: usize,
    pub retained: usize,
    pub output: PathBuf,
}

pub struct Pipeline<S, W> {
    config: Config,
    store: Arc<S>,
    writer: W,
    refresh_region: bool,
    progress: ProgressBar,
}

impl Pipeline<FileStore, BlockingWriter<FileStore>> {
    /// Pipeline over KML/GeoJSON files on disk
    pub fn from_files(config: Config) -> Self {
        let store = Arc::new(FileStore::new());
        let writer = BlockingWriter::new(Arc::clone(&store));
        Self::new(config, store, writer)
    }
}

impl<S: CatalogStore, W: WriteDispatcher> Pipeline<S, W> {
    pub fn new(config: Config, store: Arc<S>, writer: W) -> Self {
        Self {
            config,
            store,
            writer,
            refresh_region: false,
            progress: ProgressBar::hidden(),
        }
    }

    /// Ignore the region cache and select again from the catalog
    pub fn refresh_region(mut self, refresh: bool) -> Self {
        self.refresh_region = refresh;
        self
    }

    /// Report filtering progress on `progress` (hidden by default)
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    pub async fn run(&self) -> Result<RunSummary> {
        distance::self_test()?;

        info!("Generating region border");
        let (region, boundary, boundary_source) = self.region_boundary()?;

        info!("Reading building dataset");
        let buildings = self.store.load(&self.config.buildings_path())?;

        info!("Filtering building dataset");
        let retained = self.filter(&boundary, &buildings);
        info!(
            "{} of {} buildings lie within '{}'",
            retained.len(),
            buildings.len(),
            region
        );

        let output = self.config.output_path();
        let written = self
            .writer
            .submit(output.clone(), retained)
            .wait()
            .await?;
        info!("Wrote {} buildings to {}", written, output.display());

        Ok(RunSummary {
            region,
            boundary_source,
            candidates: buildings.len(),
            retained: written,
            output,
        })
    }

    fn filter(&self, boundary: &GeoPolygon, buildings: &FeatureCollection) -> FeatureCollection {
        self.progress.set_length(buildings.len() as u64);
        self.progress.set_position(0);
        let retained =
            filter_within_with_progress(boundary, buildings, || self.progress.inc(1));
        self.progress.finish_and_clear();
        retained
    }

    /// Region boundary from the cache when present, otherwise selected and cached
    fn region_boundary(&self) -> Result<(String, GeoPolygon, BoundarySource)> {
        let cache_path = self.config.region_cache_path();

        if !self.refresh_region && self.store.exists(&cache_path) {
            info!("Using cached region boundary {}", cache_path.display());
            let cached = self.store.load(&cache_path)?;
            let feature = cached
                .first()
                .ok_or_else(|| Error::EmptyCatalog(cache_path.clone()))?;
            let label = feature
                .name
                .clone()
                .unwrap_or_else(|| "cached region".to_string());
            return Ok((label, feature.polygon.clone(), BoundarySource::Cache));
        }

        let catalog_path = self.config.region_catalog_path();
        let catalog = RegionCatalog::from_features(self.store.load(&catalog_path)?);
        info!(
            "Searching {} regions in {}",
            catalog.len(),
            catalog_path.display()
        );

        let selection = &self.config.selection;
        let region = select_region_with(&catalog, &selection.reference_point, selection.policy)?;

        let cached = FeatureCollection::new(vec![region.feature.clone()]);
        self.store.save(&cache_path, &cached)?;
        info!("Cached region '{}' at {}", region.label, cache_path.display());

        Ok((
            region.label.clone(),
            region.polygon().clone(),
            BoundarySource::Selected,
        ))
    }
}
