use anyhow::{Context, Result};
use demgrid::VOID_VALUE;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Serialize)]
struct ElevationResponse {
    lon: f64,
    lat: f64,
    elevation: Option<i16>,
}

pub fn run(
    archive_dir: Option<PathBuf>,
    max_tiles: usize,
    lon: f64,
    lat: f64,
    json: bool,
) -> Result<()> {
    let loader = super::build_loader(archive_dir, max_tiles)?;

    let raw = loader
        .elevation(lon, lat)
        .context("Failed to get elevation")?;
    let elevation = if raw == VOID_VALUE { None } else { Some(raw) };

    if json {
        let response = ElevationResponse {
            lon,
            lat,
            elevation,
        };
        println!("{}", serde_json::to_string(&response)?);
    } else if let Some(elev) = elevation {
        println!("{}", elev);
    } else {
        println!("void");
    }

    Ok(())
}
