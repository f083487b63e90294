//! Error types for the demgrid library.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when resolving elevation data.
#[derive(Error, Debug)]
pub enum DemError {
    /// IO error when reading files.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Input coordinate is NaN or outside the valid degree ranges.
    #[error("Invalid coordinate: lon={lon}, lat={lat} (valid: lon ±180°, lat ±90°)")]
    InvalidCoordinate { lon: f64, lat: f64 },

    /// The tile file is absent, unreadable, or could not be mapped.
    #[error("Tile unavailable: {path}")]
    TileUnavailable { path: PathBuf },

    /// Computed row/column fell outside the tile grid, which means the
    /// coordinate does not belong to the tile it was resolved against.
    #[error("Sample offset out of range for lon={lon}, lat={lat}")]
    OffsetOutOfRange { lon: f64, lat: f64 },

    /// The mapped file is shorter than the offset plus one sample.
    #[error("Truncated tile: offset {offset} exceeds data length {len}")]
    TruncatedTile { offset: u64, len: usize },
}

/// Result type alias using [`DemError`].
pub type Result<T> = std::result::Result<T, DemError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DemError::InvalidCoordinate {
            lon: 200.0,
            lat: 10.0,
        };
        assert!(err.to_string().contains("200"));

        let err = DemError::TileUnavailable {
            path: PathBuf::from("U/35/N40E042.hgt"),
        };
        assert!(err.to_string().contains("N40E042.hgt"));

        let err = DemError::TruncatedTile {
            offset: 2884802,
            len: 1000,
        };
        assert!(err.to_string().contains("2884802"));
    }
}
