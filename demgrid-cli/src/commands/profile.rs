use anyhow::{Context, Result};
use demgrid::VOID_VALUE;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::PathBuf;

/// Append an elevation column to a CSV of waypoints — the data a chart
/// front-end would plot as an elevation profile.
pub fn run(
    archive_dir: Option<PathBuf>,
    max_tiles: usize,
    input: PathBuf,
    output: Option<PathBuf>,
    lon_col: String,
    lat_col: String,
) -> Result<()> {
    let loader = super::build_loader(archive_dir, max_tiles)?;

    let file = File::open(&input).context("Failed to open input file")?;
    let mut reader = csv::Reader::from_reader(BufReader::new(file));

    // Find column indices
    let headers = reader.headers()?.clone();
    let lon_idx = headers
        .iter()
        .position(|h| h == lon_col)
        .with_context(|| format!("Column '{}' not found in CSV", lon_col))?;
    let lat_idx = headers
        .iter()
        .position(|h| h == lat_col)
        .with_context(|| format!("Column '{}' not found in CSV", lat_col))?;

    // Prepare output
    let output_path = output.unwrap_or_else(|| {
        let stem = input.file_stem().unwrap_or_default().to_string_lossy();
        input.with_file_name(format!("{}_elevation.csv", stem))
    });
    let output_file = File::create(&output_path).context("Failed to create output file")?;
    let mut writer = csv::Writer::from_writer(BufWriter::new(output_file));

    // Write header
    let mut new_headers: Vec<&str> = headers.iter().collect();
    new_headers.push("elevation");
    writer.write_record(&new_headers)?;

    // Process records
    for record in reader.records() {
        let record = record?;
        let lon: f64 = record
            .get(lon_idx)
            .context("Missing longitude")?
            .parse()
            .context("Invalid longitude")?;
        let lat: f64 = record
            .get(lat_idx)
            .context("Missing latitude")?
            .parse()
            .context("Invalid latitude")?;

        // Void samples and unavailable tiles both come out as "void"
        let elevation = match loader.elevation(lon, lat) {
            Ok(v) if v != VOID_VALUE => v.to_string(),
            _ => "void".to_string(),
        };

        let mut new_record: Vec<&str> = record.iter().collect();
        new_record.push(&elevation);
        writer.write_record(&new_record)?;
    }

    writer.flush()?;
    println!("Output written to: {}", output_path.display());

    Ok(())
}
