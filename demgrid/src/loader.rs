//! Loader facade with pluggable format backends.
//!
//! [`DemLoader`] owns the process-wide settings and the active format
//! backend, and exposes the unified query API: single-point elevation,
//! bulk tile fetch by rectangle or polygon, existence reports, tile
//! path resolution, and archive scanning.
//!
//! The loader is an explicitly constructed value — create one, share it
//! (it is `Send + Sync`; queries take `&self`), and drop it to release
//! every cache entry. Switching the backend format tears the previous
//! backend down and re-derives the cache directory under the new
//! format's subdirectory.

use std::path::{Path, PathBuf};

use log::{debug, warn};
use walkdir::WalkDir;

use crate::cache::{Tile, TileData, TileStore};
use crate::error::{DemError, Result};
use crate::geo::{is_valid_coord, GeoPoint};
use crate::grid;
use crate::region::GeoRect;
use crate::tilename::{self, parse_tile_name, TileCoord};

/// Default bound on resident tiles (~28 MB of mapped data).
pub const DEFAULT_MAX_TILES: usize = 10;

/// Process-wide loader configuration, owned by [`DemLoader`] and
/// mutated only through its setters.
#[derive(Debug, Clone)]
pub struct DemSettings {
    /// Root of the local tile archive.
    pub archive_dir: PathBuf,
    /// Directory the sharded tile tree lives under; derived from
    /// `archive_dir` and the active format unless overridden.
    pub cache_dir: PathBuf,
    /// Remote tile server, used only by the download collaborator.
    pub server_address: String,
    /// Bound on resident tiles.
    pub max_tiles_in_memory: usize,
    /// When set, missing tiles are never fetched remotely.
    pub cache_only: bool,
}

impl Default for DemSettings {
    fn default() -> Self {
        DemSettings {
            archive_dir: PathBuf::new(),
            cache_dir: PathBuf::new(),
            server_address: String::new(),
            max_tiles_in_memory: DEFAULT_MAX_TILES,
            cache_only: true,
        }
    }
}

/// Result of a region existence check.
#[derive(Debug, Clone, Default)]
pub struct ExistenceReport {
    /// Whether every required tile file was found on disk.
    pub all_present: bool,
    /// Absolute path of every tile the region needs, present or not.
    pub required_paths: Vec<PathBuf>,
}

/// The DEM formats the facade can select between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DemFormat {
    /// SRTM `.hgt` tiles.
    Srtm,
    /// ASTER GDEM. No backend for it is built in; selecting it falls
    /// back to SRTM.
    Gdem,
}

impl DemFormat {
    /// Archive subdirectory the format's tiles live under.
    pub fn subdir(&self) -> &'static str {
        match self {
            DemFormat::Srtm => "hgt",
            DemFormat::Gdem => "gdem",
        }
    }
}

/// Capability contract every format backend provides.
pub trait DemBackend: Send + Sync {
    /// Elevation at a coordinate, in meters. The void sentinel is
    /// passed through unchanged.
    fn elevation(&self, settings: &DemSettings, lon: f64, lat: f64) -> Result<i16>;

    /// Elevation at a coordinate from a tile buffer the caller already
    /// holds, assumed to cover the coordinate's floored tile.
    fn elevation_from_tile(&self, data: &[u8], lon: f64, lat: f64) -> Result<i16>;

    /// Byte offset of the coordinate's sample inside its tile.
    fn sample_offset(&self, lon: f64, lat: f64) -> Result<u64>;

    /// Absolute on-disk path of the tile covering a coordinate.
    fn tile_path_for(&self, settings: &DemSettings, lon: f64, lat: f64) -> Result<PathBuf>;

    /// Every resolvable tile intersecting a rectangle. Tiles that fail
    /// to resolve are skipped, not errors.
    fn tiles_by_rect(&self, settings: &DemSettings, rect: GeoRect) -> Result<Vec<Tile>>;

    /// South-west corners of the tiles found under a directory.
    fn scan_archive(&self, dir: &Path) -> Vec<TileCoord>;

    /// Re-bound the backend's tile cache.
    fn set_cache_capacity(&self, capacity: usize);

    /// Release every cache entry.
    fn clear_cache(&self);
}

/// SRTM `.hgt` backend over the sharded archive layout.
pub struct SrtmBackend {
    store: TileStore,
}

impl SrtmBackend {
    /// Create a backend with the given cache bound.
    pub fn new(capacity: usize) -> Self {
        SrtmBackend {
            store: TileStore::new(capacity),
        }
    }

    fn resolve_tile(&self, settings: &DemSettings, coord: TileCoord) -> Result<TileData> {
        let rel = tilename::shard_path(coord).ok_or(DemError::InvalidCoordinate {
            lon: coord.lon as f64,
            lat: coord.lat as f64,
        })?;
        let path = settings.cache_dir.join(rel);
        self.store
            .resolve(coord, &path)
            .ok_or(DemError::TileUnavailable { path })
    }
}

impl DemBackend for SrtmBackend {
    fn elevation(&self, settings: &DemSettings, lon: f64, lat: f64) -> Result<i16> {
        if !is_valid_coord(lon, lat) {
            return Err(DemError::InvalidCoordinate { lon, lat });
        }

        // Compute the offset before touching the cache so a boundary
        // sliver fails without IO.
        let offset = grid::sample_offset(lon, lat)?;
        let coord = TileCoord::from_lon_lat(lon, lat);
        let data = self.resolve_tile(settings, coord)?;
        grid::read_sample(&data, offset)
    }

    fn elevation_from_tile(&self, data: &[u8], lon: f64, lat: f64) -> Result<i16> {
        if !is_valid_coord(lon, lat) {
            return Err(DemError::InvalidCoordinate { lon, lat });
        }
        grid::sample_at(data, lon, lat)
    }

    fn sample_offset(&self, lon: f64, lat: f64) -> Result<u64> {
        if !is_valid_coord(lon, lat) {
            return Err(DemError::InvalidCoordinate { lon, lat });
        }
        grid::sample_offset(lon, lat)
    }

    fn tile_path_for(&self, settings: &DemSettings, lon: f64, lat: f64) -> Result<PathBuf> {
        if !is_valid_coord(lon, lat) {
            return Err(DemError::InvalidCoordinate { lon, lat });
        }
        let coord = TileCoord::from_lon_lat(lon, lat);
        let rel = tilename::shard_path(coord).ok_or(DemError::InvalidCoordinate { lon, lat })?;
        Ok(settings.cache_dir.join(rel))
    }

    fn tiles_by_rect(&self, settings: &DemSettings, rect: GeoRect) -> Result<Vec<Tile>> {
        if !is_valid_coord(rect.min_lon, rect.min_lat) {
            return Err(DemError::InvalidCoordinate {
                lon: rect.min_lon,
                lat: rect.min_lat,
            });
        }
        if !is_valid_coord(rect.max_lon, rect.max_lat) {
            return Err(DemError::InvalidCoordinate {
                lon: rect.max_lon,
                lat: rect.max_lat,
            });
        }

        let mut tiles = Vec::new();
        for coord in rect.tiles() {
            match self.resolve_tile(settings, coord) {
                Ok(data) => tiles.push(Tile {
                    origin: coord,
                    data,
                }),
                Err(e) => {
                    debug!("skipping tile {}: {}", coord.file_name(), e);
                }
            }
        }
        Ok(tiles)
    }

    fn scan_archive(&self, dir: &Path) -> Vec<TileCoord> {
        let mut corners = Vec::new();
        for entry in WalkDir::new(dir)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
        {
            let is_hgt = entry
                .path()
                .extension()
                .map(|ext| ext == "hgt")
                .unwrap_or(false);
            if !is_hgt {
                continue;
            }
            match parse_tile_name(&entry.file_name().to_string_lossy()) {
                Some(coord) => corners.push(coord),
                None => debug!(
                    "skipping unparseable tile name {}",
                    entry.path().display()
                ),
            }
        }
        corners
    }

    fn set_cache_capacity(&self, capacity: usize) {
        self.store.set_capacity(capacity);
    }

    fn clear_cache(&self) {
        self.store.clear();
    }
}

/// Facade over the active format backend and the shared settings.
pub struct DemLoader {
    settings: DemSettings,
    format: DemFormat,
    backend: Box<dyn DemBackend>,
}

impl DemLoader {
    /// Create a loader over an archive root with the requested format.
    ///
    /// The cache directory is derived as
    /// `{archive_dir}/{format subdirectory}`.
    pub fn new<P: AsRef<Path>>(archive_dir: P, format: DemFormat) -> Self {
        let settings = DemSettings {
            archive_dir: archive_dir.as_ref().to_path_buf(),
            ..DemSettings::default()
        };
        let (format, backend) = build_backend(format, settings.max_tiles_in_memory);

        let mut loader = DemLoader {
            settings,
            format,
            backend,
        };
        loader.settings.cache_dir = loader.settings.archive_dir.join(format.subdir());
        loader
    }

    /// Create a loader configured from environment variables.
    ///
    /// # Environment Variables
    ///
    /// | Variable | Description | Default |
    /// |----------|-------------|---------|
    /// | `DEMGRID_ARCHIVE_DIR` | Archive root directory | Required |
    /// | `DEMGRID_MAX_TILES` | Bound on resident tiles | 10 |
    ///
    /// # Errors
    ///
    /// Returns an error if `DEMGRID_ARCHIVE_DIR` is not set.
    pub fn from_env() -> Result<Self> {
        let archive_dir = std::env::var("DEMGRID_ARCHIVE_DIR").map_err(|_| {
            DemError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "DEMGRID_ARCHIVE_DIR environment variable not set",
            ))
        })?;

        let max_tiles: usize = std::env::var("DEMGRID_MAX_TILES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_MAX_TILES);

        let mut loader = Self::new(archive_dir, DemFormat::Srtm);
        loader.set_max_tiles(max_tiles);
        Ok(loader)
    }

    /// Current settings.
    pub fn settings(&self) -> &DemSettings {
        &self.settings
    }

    /// The active format after any fallback.
    pub fn format(&self) -> DemFormat {
        self.format
    }

    /// Switch the backend format.
    ///
    /// A no-op when the requested format is already active. Otherwise
    /// the previous backend's cache entries are released, the backend is
    /// rebuilt, and the cache directory is re-derived under the new
    /// format's subdirectory. Requesting a format with no built-in
    /// backend lands back on SRTM.
    pub fn set_format(&mut self, format: DemFormat) {
        if self.format == format {
            return;
        }

        self.backend.clear_cache();
        let (resolved, backend) = build_backend(format, self.settings.max_tiles_in_memory);
        self.format = resolved;
        self.backend = backend;
        self.settings.cache_dir = self.settings.archive_dir.join(resolved.subdir());
    }

    /// Move the archive root. The cache directory is re-derived under
    /// the active format's subdirectory and resident entries are
    /// released, since they were mapped from the old tree.
    pub fn set_archive_dir<P: AsRef<Path>>(&mut self, dir: P) {
        self.settings.archive_dir = dir.as_ref().to_path_buf();
        self.settings.cache_dir = self.settings.archive_dir.join(self.format.subdir());
        self.backend.clear_cache();
    }

    /// Override the cache directory. Resident entries are released.
    pub fn set_cache_dir<P: AsRef<Path>>(&mut self, dir: P) {
        self.settings.cache_dir = dir.as_ref().to_path_buf();
        self.backend.clear_cache();
    }

    /// Set the remote tile server address. The loader itself never
    /// dials it; the download collaborator reads it.
    pub fn set_server_address<S: Into<String>>(&mut self, address: S) {
        self.settings.server_address = address.into();
    }

    /// Set whether missing tiles may be fetched remotely.
    pub fn set_cache_only(&mut self, cache_only: bool) {
        self.settings.cache_only = cache_only;
    }

    /// Whether missing tiles are served from the local cache only.
    pub fn cache_only(&self) -> bool {
        self.settings.cache_only
    }

    /// Re-bound the tile cache, evicting down if needed.
    pub fn set_max_tiles(&mut self, max_tiles: usize) {
        self.settings.max_tiles_in_memory = max_tiles;
        self.backend.set_cache_capacity(max_tiles);
    }

    /// Elevation in meters at a coordinate. The void sentinel
    /// ([`crate::grid::VOID_VALUE`]) is passed through unchanged.
    pub fn elevation(&self, lon: f64, lat: f64) -> Result<i16> {
        self.backend.elevation(&self.settings, lon, lat)
    }

    /// Elevation at a point.
    pub fn elevation_at(&self, point: GeoPoint) -> Result<i16> {
        self.elevation(point.lon, point.lat)
    }

    /// Elevation from a tile buffer the caller already holds.
    pub fn elevation_from_tile(&self, data: &[u8], lon: f64, lat: f64) -> Result<i16> {
        self.backend.elevation_from_tile(data, lon, lat)
    }

    /// Byte offset of a coordinate's sample inside its tile.
    pub fn sample_offset(&self, lon: f64, lat: f64) -> Result<u64> {
        self.backend.sample_offset(lon, lat)
    }

    /// Absolute path of the tile file covering a coordinate.
    pub fn tile_path_for(&self, lon: f64, lat: f64) -> Result<PathBuf> {
        self.backend.tile_path_for(&self.settings, lon, lat)
    }

    /// Every resolvable tile intersecting a rectangle.
    pub fn tiles_by_rect(
        &self,
        min_lon: f64,
        max_lon: f64,
        min_lat: f64,
        max_lat: f64,
    ) -> Result<Vec<Tile>> {
        let rect = GeoRect::new(min_lon, max_lon, min_lat, max_lat);
        self.backend.tiles_by_rect(&self.settings, rect)
    }

    /// Every resolvable tile under a polygon's covering rectangle.
    ///
    /// An empty polygon yields no tiles; a polygon whose extremes are
    /// not valid coordinates fails.
    pub fn tiles_by_polygon(&self, nodes: &[GeoPoint]) -> Result<Vec<Tile>> {
        let rect = match GeoRect::from_points(nodes) {
            Some(rect) => rect,
            None => return Ok(Vec::new()),
        };
        self.backend.tiles_by_rect(&self.settings, rect)
    }

    /// Check which tile files a rectangle needs and whether they all
    /// exist under the cache directory.
    ///
    /// Every required path is reported regardless of presence. With
    /// `exit_on_first_miss` set, the check returns at the first missing
    /// file with the paths collected so far.
    pub fn exists_by_rect(
        &self,
        min_lon: f64,
        max_lon: f64,
        min_lat: f64,
        max_lat: f64,
        exit_on_first_miss: bool,
    ) -> Result<ExistenceReport> {
        if !is_valid_coord(min_lon, min_lat) {
            return Err(DemError::InvalidCoordinate {
                lon: min_lon,
                lat: min_lat,
            });
        }
        if !is_valid_coord(max_lon, max_lat) {
            return Err(DemError::InvalidCoordinate {
                lon: max_lon,
                lat: max_lat,
            });
        }

        let rect = GeoRect::new(min_lon, max_lon, min_lat, max_lat);
        let tiles = rect.tiles();

        let mut report = ExistenceReport {
            all_present: !tiles.is_empty(),
            required_paths: Vec::with_capacity(tiles.len()),
        };

        for coord in tiles {
            let path = self
                .backend
                .tile_path_for(&self.settings, coord.lon as f64, coord.lat as f64)?;
            let present = path.exists();
            report.required_paths.push(path);

            if !present {
                report.all_present = false;
                if exit_on_first_miss {
                    return Ok(report);
                }
            }
        }

        Ok(report)
    }

    /// Existence check over a polygon's covering rectangle.
    ///
    /// An empty polygon reports nothing present and no required paths.
    pub fn exists_by_polygon(&self, nodes: &[GeoPoint]) -> Result<ExistenceReport> {
        let rect = match GeoRect::from_points(nodes) {
            Some(rect) => rect,
            None => return Ok(ExistenceReport::default()),
        };
        self.exists_by_rect(rect.min_lon, rect.max_lon, rect.min_lat, rect.max_lat, false)
    }

    /// South-west corners of the tile files found under a directory,
    /// shard subdirectories included. Files whose names do not parse
    /// are skipped.
    pub fn scan_archive<P: AsRef<Path>>(&self, dir: P) -> Vec<TileCoord> {
        self.backend.scan_archive(dir.as_ref())
    }
}

fn build_backend(format: DemFormat, capacity: usize) -> (DemFormat, Box<dyn DemBackend>) {
    match format {
        DemFormat::Srtm => (DemFormat::Srtm, Box::new(SrtmBackend::new(capacity))),
        DemFormat::Gdem => {
            warn!("no GDEM backend is built in, falling back to SRTM");
            (DemFormat::Srtm, Box::new(SrtmBackend::new(capacity)))
        }
    }
}
