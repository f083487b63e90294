//! Tile naming and on-disk shard layout.
//!
//! A 1°×1° tile is addressed by the integer degrees of its south-west
//! corner and stored as `{latBand}/{lonZone}/{N|S}{lat}{E|W}{lon}.hgt`:
//!
//! - Latitude: 2 digits with N/S prefix (e.g. N59, S23)
//! - Longitude: 3 digits with E/W prefix (e.g. E029, W044)
//! - `lonZone`: 1-based 6-degree band over `[-180, 180]`, two digits
//! - `latBand`: letter code over a 45-band scheme, southern bands with
//!   an `S` prefix
//!
//! Examples: `O/35/N59E029.hgt`, `P/36/N60E030.hgt`.
//!
//! The shard arithmetic is what an existing archive on disk was laid out
//! with, so it must not drift.

use std::path::PathBuf;

use crate::geo::{self, GeoPoint};

/// Integer tile coordinate: the floored degrees of a position, naming
/// the tile's south-west corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileCoord {
    /// Whole degrees of longitude, west edge of the tile.
    pub lon: i32,
    /// Whole degrees of latitude, south edge of the tile.
    pub lat: i32,
}

impl TileCoord {
    /// Tile containing the given position.
    pub fn from_lon_lat(lon: f64, lat: f64) -> Self {
        TileCoord {
            lon: lon.floor() as i32,
            lat: lat.floor() as i32,
        }
    }

    /// The south-west corner as a geographic point.
    pub fn sw_corner(&self) -> GeoPoint {
        GeoPoint::new(self.lon as f64, self.lat as f64)
    }

    /// Pack both degrees into one unsigned cache key.
    ///
    /// Both components are shifted into non-negative range before
    /// composing, so negative degrees cannot collide through sign
    /// extension: `lon + 180` needs 9 bits (0..=360), `lat + 90` sits
    /// above them.
    pub fn packed_key(&self) -> u32 {
        (((self.lat + 90) as u32) << 9) | ((self.lon + 180) as u32)
    }

    /// The tile's file name, e.g. `N40E042.hgt`.
    pub fn file_name(&self) -> String {
        let lat_prefix = if self.lat >= 0 { 'N' } else { 'S' };
        let lon_prefix = if self.lon >= 0 { 'E' } else { 'W' };
        format!(
            "{}{:02}{}{:03}.hgt",
            lat_prefix,
            self.lat.abs(),
            lon_prefix,
            self.lon.abs()
        )
    }
}

/// 1-based 6-degree longitude zone over `[-180, 180]`.
///
/// Longitude 180 exactly would land in a 61st zone; it is clamped into
/// zone 60 so the east edge of the grid stays addressable.
pub fn lon_zone(lon: f64) -> Option<u32> {
    if !(geo::MIN_LON..=geo::MAX_LON).contains(&lon) {
        return None;
    }

    let mut zone = ((lon + 180.0) / 6.0).floor() as u32 + 1;
    if zone == 61 {
        zone = 60;
    }
    Some(zone)
}

/// Latitude band letter over the 45-band archive scheme.
///
/// Band 0 covers everything south of -88°; otherwise the index is
/// `floor((lat + 88) / 4) + 1`. Indices 23 and above map to plain
/// letters starting at `A`; indices below 23 mirror into the southern
/// alphabet with an `S` prefix (`SA` just south of `A`, down to `SW`).
pub fn lat_band(lat: f64) -> Option<String> {
    if !(geo::MIN_LAT..=geo::MAX_LAT).contains(&lat) {
        return None;
    }

    let idx = if lat < -88.0 {
        0
    } else {
        ((lat + 88.0) / 4.0).floor() as i32 + 1
    };

    // 65=A, 66=B, ... 87=W
    if idx >= 23 {
        let code = (64 + (idx - 22)) as u8;
        Some((code as char).to_string())
    } else {
        let code = (64 + (23 - idx)) as u8;
        Some(format!("S{}", code as char))
    }
}

/// Relative shard path for a tile: `{latBand}/{lonZone:02}/{fileName}`.
///
/// Returns `None` only for out-of-range degrees.
pub fn shard_path(coord: TileCoord) -> Option<PathBuf> {
    let band = lat_band(coord.lat as f64)?;
    let zone = lon_zone(coord.lon as f64)?;
    let mut path = PathBuf::from(band);
    path.push(format!("{:02}", zone));
    path.push(coord.file_name());
    Some(path)
}

/// Parse a tile file name back to its south-west corner.
///
/// Accepts an optional leading path and the `.hgt` suffix; hemisphere
/// letters are case-insensitive. Returns `None` for anything that does
/// not match `{N|S}{2 digits}{E|W}{3 digits}`.
pub fn parse_tile_name(filename: &str) -> Option<TileCoord> {
    // Extract just the file name if a path is given
    let name = filename
        .rsplit('/')
        .next()
        .unwrap_or(filename)
        .rsplit('\\')
        .next()
        .unwrap_or(filename);

    let name = name.strip_suffix(".hgt").unwrap_or(name);

    // Must be exactly 7 characters: N00E000
    if name.len() != 7 {
        return None;
    }

    let chars: Vec<char> = name.chars().collect();

    let lat_sign = match chars[0] {
        'N' | 'n' => 1,
        'S' | 's' => -1,
        _ => return None,
    };
    let lat: i32 = name[1..3].parse().ok()?;

    let lon_sign = match chars[3] {
        'E' | 'e' => 1,
        'W' | 'w' => -1,
        _ => return None,
    };
    let lon: i32 = name[4..7].parse().ok()?;

    Some(TileCoord {
        lon: lon * lon_sign,
        lat: lat * lat_sign,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_file_name() {
        assert_eq!(TileCoord::from_lon_lat(42.0, 40.0).file_name(), "N40E042.hgt");
        assert_eq!(
            TileCoord::from_lon_lat(-43.2, -22.9).file_name(),
            "S23W044.hgt"
        );
        assert_eq!(TileCoord::from_lon_lat(0.5, 0.5).file_name(), "N00E000.hgt");
        // floor(-0.5) = -1
        assert_eq!(
            TileCoord::from_lon_lat(-0.5, -0.5).file_name(),
            "S01W001.hgt"
        );
        assert_eq!(
            TileCoord::from_lon_lat(29.7, 59.9).file_name(),
            "N59E029.hgt"
        );
    }

    #[test]
    fn test_lon_zone() {
        assert_eq!(lon_zone(-180.0), Some(1));
        assert_eq!(lon_zone(179.9), Some(60));
        // 180 exactly would be zone 61 and is clamped
        assert_eq!(lon_zone(180.0), Some(60));
        assert_eq!(lon_zone(29.0), Some(35));
        assert_eq!(lon_zone(30.0), Some(36));
        assert_eq!(lon_zone(180.1), None);
        assert_eq!(lon_zone(f64::NAN), None);
    }

    #[test]
    fn test_lat_band() {
        assert_eq!(lat_band(59.0).as_deref(), Some("O"));
        assert_eq!(lat_band(60.0).as_deref(), Some("P"));
        assert_eq!(lat_band(90.0).as_deref(), Some("W"));
        // Just north of the -88 cut: index 1
        assert_eq!(lat_band(-88.0).as_deref(), Some("SV"));
        // South of -88: band index 0
        assert_eq!(lat_band(-89.5).as_deref(), Some("SW"));
        assert_eq!(lat_band(-22.9).as_deref(), Some("SF"));
        assert_eq!(lat_band(90.1), None);
        assert_eq!(lat_band(f64::NAN), None);
    }

    #[test]
    fn test_shard_path() {
        let path = shard_path(TileCoord { lon: 29, lat: 59 }).unwrap();
        assert_eq!(path, PathBuf::from("O/35/N59E029.hgt"));

        let path = shard_path(TileCoord { lon: 30, lat: 60 }).unwrap();
        assert_eq!(path, PathBuf::from("P/36/N60E030.hgt"));
    }

    #[test]
    fn test_parse_tile_name() {
        assert_eq!(
            parse_tile_name("N59E029.hgt"),
            Some(TileCoord { lon: 29, lat: 59 })
        );
        assert_eq!(
            parse_tile_name("S23W044.hgt"),
            Some(TileCoord { lon: -44, lat: -23 })
        );
        assert_eq!(
            parse_tile_name("O/35/N59E029.hgt"),
            Some(TileCoord { lon: 29, lat: 59 })
        );
        assert_eq!(
            parse_tile_name("n35e138"),
            Some(TileCoord { lon: 138, lat: 35 })
        );

        assert_eq!(parse_tile_name("invalid"), None);
        assert_eq!(parse_tile_name("N35E13.hgt"), None); // too short
        assert_eq!(parse_tile_name("X35E138.hgt"), None); // bad prefix
        assert_eq!(parse_tile_name("NAAE138.hgt"), None); // non-numeric
    }

    #[test]
    fn test_name_roundtrip_full_grid() {
        for lon in -180..=179 {
            for lat in -90..=89 {
                let coord = TileCoord { lon, lat };
                let parsed = parse_tile_name(&coord.file_name()).unwrap();
                assert_eq!(parsed, coord);
            }
        }
    }

    #[test]
    fn test_packed_key_no_collisions() {
        let mut seen = HashSet::new();
        for lon in -180..=180 {
            for lat in -90..=90 {
                let key = TileCoord { lon, lat }.packed_key();
                assert!(seen.insert(key), "duplicate key for ({}, {})", lon, lat);
            }
        }
    }
}
