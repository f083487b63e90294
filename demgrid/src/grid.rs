//! Byte addressing inside an SRTM tile grid.
//!
//! A tile holds a 1201×1201 grid of 16-bit big-endian signed elevation
//! samples, row-major from the north-west corner, 2,884,802 bytes total.
//! Lookup is nearest-sample: each pixel's footprint spans one full cell,
//! with centers offset half a cell from the tile boundary. Row 0 is the
//! tile's north edge, column 0 its west edge.

use crate::error::{DemError, Result};
use crate::tilename::TileCoord;

/// Samples per row/column in a tile.
pub const SAMPLES_PER_SIDE: usize = 1201;

/// Bytes per elevation sample.
pub const BYTES_PER_SAMPLE: usize = 2;

/// Exact byte length of a tile file: 1201 × 1201 × 2.
pub const TILE_BYTE_LEN: usize = SAMPLES_PER_SIDE * SAMPLES_PER_SIDE * BYTES_PER_SAMPLE;

/// Degrees spanned by one grid cell.
const DEG_PER_CELL: f64 = 1.0 / 1200.0;

/// Half a cell in degrees, the offset of sample centers from the boundary.
const DEG_PER_HALF_CELL: f64 = 1.0 / 2400.0;

/// Elevation value marking a missing sample (void). Extraction passes it
/// through unchanged; interpreting it is the caller's concern.
pub const VOID_VALUE: i16 = i16::MIN;

/// Byte offset of the sample nearest to a position, inside the tile
/// with the given origin.
///
/// Fails with [`DemError::OffsetOutOfRange`] when the computed row or
/// column leaves the grid — either the coordinate does not belong to
/// this tile, or it sits within the half-cell sliver at the extreme
/// west/north boundary that rounds outside the grid.
pub fn sample_offset_in(origin: TileCoord, lon: f64, lat: f64) -> Result<u64> {
    let col = ((lon - origin.lon as f64 - DEG_PER_HALF_CELL) / DEG_PER_CELL).floor();
    let row = ((origin.lat as f64 + 1.0 + DEG_PER_HALF_CELL - lat) / DEG_PER_CELL).floor();

    let max = (SAMPLES_PER_SIDE - 1) as f64;
    if !(0.0..=max).contains(&col) || !(0.0..=max).contains(&row) {
        return Err(DemError::OffsetOutOfRange { lon, lat });
    }

    Ok((BYTES_PER_SAMPLE as u64) * (col as u64 + row as u64 * SAMPLES_PER_SIDE as u64))
}

/// Byte offset of the sample nearest to a position, inside the tile the
/// position floors into.
pub fn sample_offset(lon: f64, lat: f64) -> Result<u64> {
    sample_offset_in(TileCoord::from_lon_lat(lon, lat), lon, lat)
}

/// Read the big-endian sample at a byte offset.
///
/// Fails with [`DemError::TruncatedTile`] if the buffer ends before
/// `offset + 2`.
pub fn read_sample(data: &[u8], offset: u64) -> Result<i16> {
    let end = offset + BYTES_PER_SAMPLE as u64;
    if end > data.len() as u64 {
        return Err(DemError::TruncatedTile {
            offset,
            len: data.len(),
        });
    }

    let i = offset as usize;
    Ok(i16::from_be_bytes([data[i], data[i + 1]]))
}

/// Elevation at a position from a tile buffer whose origin is the
/// position's floored degrees.
pub fn sample_at(data: &[u8], lon: f64, lat: f64) -> Result<i16> {
    let offset = sample_offset(lon, lat)?;
    read_sample(data, offset)
}
