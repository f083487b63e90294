use anyhow::{Context, Result};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Serialize)]
struct ExistsResponse {
    all_present: bool,
    required_paths: Vec<PathBuf>,
}

/// Parse a bounding box string of the form "minlon,minlat,maxlon,maxlat".
fn parse_bbox(bbox: &str) -> Result<(f64, f64, f64, f64)> {
    let parts: Vec<&str> = bbox.split(',').collect();
    if parts.len() != 4 {
        anyhow::bail!("Bounding box must have 4 comma-separated values");
    }

    let min_lon: f64 = parts[0].trim().parse().context("Invalid minlon value")?;
    let min_lat: f64 = parts[1].trim().parse().context("Invalid minlat value")?;
    let max_lon: f64 = parts[2].trim().parse().context("Invalid maxlon value")?;
    let max_lat: f64 = parts[3].trim().parse().context("Invalid maxlat value")?;

    Ok((min_lon, min_lat, max_lon, max_lat))
}

pub fn run(
    archive_dir: Option<PathBuf>,
    max_tiles: usize,
    bbox: &str,
    first_miss: bool,
    json: bool,
) -> Result<()> {
    let loader = super::build_loader(archive_dir, max_tiles)?;

    let (min_lon, min_lat, max_lon, max_lat) = parse_bbox(bbox)?;
    let report = loader
        .exists_by_rect(min_lon, max_lon, min_lat, max_lat, first_miss)
        .context("Existence check failed")?;

    if json {
        let response = ExistsResponse {
            all_present: report.all_present,
            required_paths: report.required_paths,
        };
        println!("{}", serde_json::to_string(&response)?);
        return Ok(());
    }

    for path in &report.required_paths {
        let marker = if path.exists() { "ok     " } else { "missing" };
        println!("{} {}", marker, path.display());
    }
    println!();
    if report.all_present {
        println!("All {} required tiles present", report.required_paths.len());
    } else {
        println!("Some required tiles are missing");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bbox() {
        let (a, b, c, d) = parse_bbox("29.0, 59.0, 31.0, 61.0").unwrap();
        assert_eq!((a, b, c, d), (29.0, 59.0, 31.0, 61.0));

        assert!(parse_bbox("29.0,59.0,31.0").is_err());
        assert!(parse_bbox("a,b,c,d").is_err());
    }
}
