use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

/// Tiled DEM elevation CLI tool
#[derive(Parser)]
#[command(name = "demgrid")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Archive root directory (tiles live under its hgt/ subdirectory)
    #[arg(short, long, env = "DEMGRID_ARCHIVE_DIR", global = true)]
    archive_dir: Option<PathBuf>,

    /// Maximum tiles held in memory
    #[arg(
        short,
        long,
        env = "DEMGRID_MAX_TILES",
        default_value = "10",
        global = true
    )]
    max_tiles: usize,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Query elevation for a single coordinate
    Query {
        /// Longitude in decimal degrees
        #[arg(long)]
        lon: f64,

        /// Latitude in decimal degrees
        #[arg(long)]
        lat: f64,

        /// Output result as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Print the tile file path for a coordinate
    Path {
        /// Longitude in decimal degrees
        #[arg(long)]
        lon: f64,

        /// Latitude in decimal degrees
        #[arg(long)]
        lat: f64,
    },

    /// Check which tile files a bounding box needs
    Exists {
        /// Bounding box as "minlon,minlat,maxlon,maxlat"
        bbox: String,

        /// Stop at the first missing file
        #[arg(short, long)]
        first_miss: bool,

        /// Output result as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Add an elevation column to a CSV of waypoints
    Profile {
        /// Input CSV file
        input: PathBuf,

        /// Output file (defaults to <input>_elevation.csv)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Column name for longitude
        #[arg(long, default_value = "lon")]
        lon_col: String,

        /// Column name for latitude
        #[arg(long, default_value = "lat")]
        lat_col: String,
    },

    /// List tiles found under a directory
    List {
        /// Directory to scan (defaults to the archive's tile directory)
        dir: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Query { lon, lat, json } => {
            commands::query::run(cli.archive_dir, cli.max_tiles, lon, lat, json)
        }
        Commands::Path { lon, lat } => {
            commands::path::run(cli.archive_dir, cli.max_tiles, lon, lat)
        }
        Commands::Exists {
            bbox,
            first_miss,
            json,
        } => commands::exists::run(cli.archive_dir, cli.max_tiles, &bbox, first_miss, json),
        Commands::Profile {
            input,
            output,
            lon_col,
            lat_col,
        } => commands::profile::run(
            cli.archive_dir,
            cli.max_tiles,
            input,
            output,
            lon_col,
            lat_col,
        ),
        Commands::List { dir } => commands::list::run(cli.archive_dir, cli.max_tiles, dir),
    }
}
