use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::models::GeoCoord;
use crate::pip::SelectionPolicy;

/// A point inside Enseada do Suá, Vitória (ES)
pub const REFERENCE_POINT: GeoCoord = GeoCoord::new_unchecked(-20.315146, -40.288799);

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Config {
    /// Relative file paths below are resolved against this directory
    pub data_dir: PathBuf,
    pub files: FilesConfig,
    pub selection: SelectionConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct FilesConfig {
    pub region_catalog: PathBuf,
    pub region_cache: PathBuf,
    pub buildings: PathBuf,
    pub output: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SelectionConfig {
    pub reference_point: GeoCoord,
    pub policy: SelectionPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
            files: FilesConfig::default(),
            selection: SelectionConfig::default(),
        }
    }
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            region_catalog: PathBuf::from("Bairros.kml"),
            region_cache: PathBuf::from("Enseada.kml"),
            buildings: PathBuf::from("Edificacoes.kml"),
            output: PathBuf::from("Edificacoes_Enseada.kml"),
        }
    }
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            reference_point: REFERENCE_POINT,
            policy: SelectionPolicy::default(),
        }
    }
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path).context("Failed to read config file")?;
        let config: Config = toml::from_str(&content).context("Failed to parse config file")?;
        Ok(config)
    }

    /// Resolve a configured path against `data_dir` (absolute paths pass through)
    pub fn resolve(&self, path: &Path) -> PathBuf {
        self.data_dir.join(path)
    }

    pub fn region_catalog_path(&self) -> PathBuf {
        self.resolve(&self.files.region_catalog)
    }

    pub fn region_cache_path(&self) -> PathBuf {
        self.resolve(&self.files.region_cache)
    }

    pub fn buildings_path(&self) -> PathBuf {
        self.resolve(&self.files.buildings)
    }

    pub fn output_path(&self) -> PathBuf {
        self.resolve(&self.files.output)
    }
}
