//! Error taxonomy for the footprint pipeline.

use std::path::PathBuf;

/// Convenience alias used across the library
pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Coordinate outside the WGS84 range or not finite
    #[error("invalid coordinate (lat {lat}, lon {lon})")]
    InvalidCoordinate { lat: f64, lon: f64 },

    /// No catalog region contains the reference point
    #[error("no region contains the reference point (lat {lat}, lon {lon})")]
    RegionNotFound { lat: f64, lon: f64 },

    /// A catalog that must hold at least one polygon holds none
    #[error("catalog {} holds no polygon features", .0.display())]
    EmptyCatalog(PathBuf),

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unsupported geometry file format: {}", .0.display())]
    UnsupportedFormat(PathBuf),

    #[error("failed to parse {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    /// The persistence worker panicked or was cancelled before finishing
    #[error("write worker failed: {0}")]
    WriteWorker(String),

    #[error(
        "distance self-test failed: expected {expected} m, got {actual} m (tolerance {tolerance} m)"
    )]
    SelfTestFailed {
        expected: f64,
        actual: f64,
        tolerance: f64,
    },
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn parse(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        Error::Parse {
            path: path.into(),
            message: message.to_string(),
        }
    }
}
