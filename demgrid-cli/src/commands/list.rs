use anyhow::Result;
use std::path::PathBuf;

pub fn run(
    archive_dir: Option<PathBuf>,
    max_tiles: usize,
    dir: Option<PathBuf>,
) -> Result<()> {
    let loader = super::build_loader(archive_dir, max_tiles)?;

    let scan_dir = dir.unwrap_or_else(|| loader.settings().cache_dir.clone());
    if !scan_dir.exists() {
        anyhow::bail!("Directory does not exist: {}", scan_dir.display());
    }

    let mut corners = loader.scan_archive(&scan_dir);
    if corners.is_empty() {
        println!("No tiles found in: {}", scan_dir.display());
        return Ok(());
    }

    corners.sort_by_key(|c| (c.lon, c.lat));

    println!("{:<14} {:>8} {:>8}", "TILE", "LON", "LAT");
    println!("{}", "-".repeat(32));
    for coord in &corners {
        println!("{:<14} {:>8} {:>8}", coord.file_name(), coord.lon, coord.lat);
    }

    println!();
    println!("Summary:");
    println!("  Total tiles: {}", corners.len());
    println!("  Scanned directory: {}", scan_dir.display());

    Ok(())
}
