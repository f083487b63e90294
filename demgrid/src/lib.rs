//! # demgrid - Tiled DEM Elevation Library
//!
//! Library for resolving geographic coordinates to ground-elevation
//! samples from a local archive of SRTM `.hgt` tiles, laid out in a
//! two-level shard hierarchy (`latBand/lonZone/N59E029.hgt`).
//!
//! ## Features
//!
//! - **Fast**: tiles are memory-mapped and held in a bounded FIFO cache
//! - **Bounded**: at most `max_tiles_in_memory` tiles resident at once
//! - **Safe handles**: returned tile bytes stay valid across eviction
//! - **Region queries**: bulk tile fetch and existence reports over
//!   rectangles and polygons
//! - **Offline**: works against local files only; missing tiles are
//!   reported, never downloaded
//!
//! ## Quick Start
//!
//! ```ignore
//! use demgrid::{DemFormat, DemLoader};
//!
//! let loader = DemLoader::new("/data/dem", DemFormat::Srtm);
//!
//! // Tiles live under /data/dem/hgt/{band}/{zone}/
//! let elevation = loader.elevation(29.7, 59.9)?;
//! println!("Elevation: {}m", elevation);
//!
//! // Which files would a bounding box need?
//! let report = loader.exists_by_rect(29.0, 31.0, 59.0, 61.0, false)?;
//! if !report.all_present {
//!     println!("missing some of: {:?}", report.required_paths);
//! }
//! ```
//!
//! ## Tile Format
//!
//! Each `.hgt` file covers a 1°×1° cell, named by its south-west corner
//! and holding a 1201×1201 grid of 16-bit big-endian signed elevation
//! samples, row-major from the north-west corner — 2,884,802 bytes.
//! The value -32768 marks void (no data) and is returned unchanged.

pub mod cache;
pub mod error;
pub mod geo;
pub mod grid;
pub mod loader;
pub mod region;
pub mod tilename;

// Re-export main types at crate root for convenience
pub use cache::{Tile, TileData, TileStore};
pub use error::{DemError, Result};
pub use geo::GeoPoint;
pub use grid::VOID_VALUE;
pub use loader::{DemBackend, DemFormat, DemLoader, DemSettings, ExistenceReport, SrtmBackend};
pub use region::GeoRect;
pub use tilename::TileCoord;
