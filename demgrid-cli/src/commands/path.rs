use anyhow::{Context, Result};
use std::path::PathBuf;

pub fn run(archive_dir: Option<PathBuf>, max_tiles: usize, lon: f64, lat: f64) -> Result<()> {
    let loader = super::build_loader(archive_dir, max_tiles)?;

    let path = loader
        .tile_path_for(lon, lat)
        .context("Failed to resolve tile path")?;
    println!("{}", path.display());

    Ok(())
}
