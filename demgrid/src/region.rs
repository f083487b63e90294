//! Region normalization and tile enumeration.
//!
//! Bulk queries take either an axis-aligned rectangle or a polygon;
//! polygons are normalized to their covering rectangle before tile
//! enumeration. Enumeration yields every tile whose whole-degree cell
//! intersects the rectangle, west to east, south to north.

use crate::geo::{is_valid_coord, GeoPoint};
use crate::tilename::TileCoord;

/// An axis-aligned geographic rectangle in decimal degrees.
#[derive(Debug, Clone, Copy)]
pub struct GeoRect {
    /// Western boundary longitude.
    pub min_lon: f64,
    /// Eastern boundary longitude.
    pub max_lon: f64,
    /// Southern boundary latitude.
    pub min_lat: f64,
    /// Northern boundary latitude.
    pub max_lat: f64,
}

impl GeoRect {
    /// Create a new rectangle.
    pub fn new(min_lon: f64, max_lon: f64, min_lat: f64, max_lat: f64) -> Self {
        GeoRect {
            min_lon,
            max_lon,
            min_lat,
            max_lat,
        }
    }

    /// Covering rectangle of a polygon's vertices.
    ///
    /// Returns `None` for an empty vertex list. NaN components never win
    /// a min/max comparison, so sentinel vertices are skipped; if no
    /// vertex contributes, the extremes keep their seed values and the
    /// rectangle fails [`Self::is_valid`].
    pub fn from_points(points: &[GeoPoint]) -> Option<Self> {
        if points.is_empty() {
            return None;
        }

        let mut rect = GeoRect::new(f64::MAX, f64::MIN, f64::MAX, f64::MIN);
        for p in points {
            if p.lon < rect.min_lon {
                rect.min_lon = p.lon;
            }
            if p.lon > rect.max_lon {
                rect.max_lon = p.lon;
            }
            if p.lat < rect.min_lat {
                rect.min_lat = p.lat;
            }
            if p.lat > rect.max_lat {
                rect.max_lat = p.lat;
            }
        }
        Some(rect)
    }

    /// Whether both extreme corners are valid coordinates.
    pub fn is_valid(&self) -> bool {
        is_valid_coord(self.min_lon, self.min_lat) && is_valid_coord(self.max_lon, self.max_lat)
    }

    /// Every tile whose cell intersects the rectangle.
    ///
    /// Order is deterministic: longitude ascending in the outer loop,
    /// latitude ascending in the inner. Boundary values are floored, so
    /// a rectangle degenerating to a point still yields one tile.
    pub fn tiles(&self) -> Vec<TileCoord> {
        let lon1 = self.min_lon.floor() as i32;
        let lon2 = self.max_lon.floor() as i32;
        let lat1 = self.min_lat.floor() as i32;
        let lat2 = self.max_lat.floor() as i32;

        let (lon_min, lon_max) = (lon1.min(lon2), lon1.max(lon2));
        let (lat_min, lat_max) = (lat1.min(lat2), lat1.max(lat2));

        let mut tiles = Vec::new();
        for lon in lon_min..=lon_max {
            for lat in lat_min..=lat_max {
                tiles.push(TileCoord { lon, lat });
            }
        }
        tiles
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_rect_single_tile() {
        let rect = GeoRect::new(42.5, 42.5, 40.5, 40.5);
        assert_eq!(rect.tiles(), vec![TileCoord { lon: 42, lat: 40 }]);
    }

    #[test]
    fn test_spanning_rect() {
        let rect = GeoRect::new(29.5, 30.5, 59.5, 60.5);
        let tiles = rect.tiles();
        assert_eq!(
            tiles,
            vec![
                TileCoord { lon: 29, lat: 59 },
                TileCoord { lon: 29, lat: 60 },
                TileCoord { lon: 30, lat: 59 },
                TileCoord { lon: 30, lat: 60 },
            ]
        );
    }

    #[test]
    fn test_swapped_extremes_normalize() {
        let rect = GeoRect::new(30.5, 29.5, 60.5, 59.5);
        assert_eq!(rect.tiles().len(), 4);
    }

    #[test]
    fn test_negative_span() {
        let rect = GeoRect::new(-44.0, -43.2, -23.0, -22.9);
        let tiles = rect.tiles();
        assert!(tiles.contains(&TileCoord { lon: -44, lat: -23 }));
        // -43.2 floors to -44, -22.9 floors to -23
        assert_eq!(tiles.len(), 1);
    }

    #[test]
    fn test_from_points() {
        let poly = [
            GeoPoint::new(29.8, 59.2),
            GeoPoint::new(30.4, 59.9),
            GeoPoint::new(29.1, 60.3),
        ];
        let rect = GeoRect::from_points(&poly).unwrap();
        assert!(rect.is_valid());
        assert_eq!(rect.min_lon, 29.1);
        assert_eq!(rect.max_lon, 30.4);
        assert_eq!(rect.min_lat, 59.2);
        assert_eq!(rect.max_lat, 60.3);
    }

    #[test]
    fn test_from_points_empty() {
        assert!(GeoRect::from_points(&[]).is_none());
    }

    #[test]
    fn test_from_points_skips_sentinel_vertices() {
        // A sentinel vertex never wins a comparison; the finite ones
        // still shape the rectangle.
        let poly = [GeoPoint::new(29.8, 59.2), GeoPoint::INVALID];
        let rect = GeoRect::from_points(&poly).unwrap();
        assert!(rect.is_valid());
        assert_eq!(rect.min_lon, 29.8);

        // All-sentinel input leaves the seeds in place, which are not
        // valid coordinates.
        let rect = GeoRect::from_points(&[GeoPoint::INVALID]).unwrap();
        assert!(!rect.is_valid());
    }

    #[test]
    fn test_out_of_range_invalid() {
        assert!(!GeoRect::new(-190.0, 10.0, 0.0, 1.0).is_valid());
        assert!(GeoRect::new(-180.0, 180.0, -90.0, 90.0).is_valid());
    }
}
