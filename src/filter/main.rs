//! Building footprint filter.
//!
//! Selects the region of study from the neighbourhood catalog, keeps the
//! buildings that lie inside it and writes them out.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use footprint::config::Config;
use footprint::pip::SelectionPolicy;
use footprint::pipeline::{BoundarySource, Pipeline};

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

#[derive(Parser, Debug)]
#[command(name = "filter")]
#[command(about = "Filter building footprints to the region of study")]
struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory holding the catalogs (overrides the config file)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Output file, .kml or .geojson (overrides the config file)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Select the region again even if a cached boundary exists
    #[arg(long)]
    refresh_region: bool,

    /// Tie-break when several regions contain the reference point
    #[arg(long, value_enum)]
    policy: Option<SelectionPolicy>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => Config::load_from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => Config::default(),
    };
    if let Some(dir) = args.data_dir {
        config.data_dir = dir;
    }
    if let Some(output) = args.output {
        config.files.output = output;
    }
    if let Some(policy) = args.policy {
        config.selection.policy = policy;
    }

    info!("Footprint filter");
    info!("Data directory: {}", config.data_dir.display());
    info!("Reference point: {}", config.selection.reference_point);

    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({per_sec})",
            )?
            .progress_chars("#>-"),
    );

    let summary = Pipeline::from_files(config)
        .refresh_region(args.refresh_region)
        .with_progress(pb)
        .run()
        .await
        .context("Footprint pipeline failed")?;

    let source = match summary.boundary_source {
        BoundarySource::Cache => "cached",
        BoundarySource::Selected => "selected",
    };
    info!(
        "Done: {} of {} buildings inside '{}' ({} boundary) written to {}",
        summary.retained,
        summary.candidates,
        summary.region,
        source,
        summary.output.display()
    );

    Ok(())
}
