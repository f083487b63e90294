pub mod exists;
pub mod list;
pub mod path;
pub mod profile;
pub mod query;

use anyhow::{Context, Result};
use demgrid::{DemFormat, DemLoader};
use std::path::PathBuf;

/// Build a loader from the global CLI options.
pub(crate) fn build_loader(archive_dir: Option<PathBuf>, max_tiles: usize) -> Result<DemLoader> {
    let mut loader = match archive_dir {
        Some(dir) => DemLoader::new(dir, DemFormat::Srtm),
        None => DemLoader::from_env().context(
            "DEMGRID_ARCHIVE_DIR environment variable not set. Use --archive-dir or set DEMGRID_ARCHIVE_DIR",
        )?,
    };
    loader.set_max_tiles(max_tiles);
    Ok(loader)
}
