//! Bounded FIFO store of memory-mapped tiles.
//!
//! The store maps a [`TileCoord`] to the bytes of its `.hgt` file,
//! opening and memory-mapping the file on first use. It holds at most
//! `capacity` entries; inserting past that evicts the entry that was
//! inserted earliest, regardless of how recently it was read. This is a
//! deliberate FIFO, not an LRU: a hit does not reorder the key sequence.
//!
//! A failed open or map is recorded as a permanent miss for that
//! coordinate — the slot participates in FIFO order like a live entry
//! and the file is not probed again until the entry is evicted or the
//! store is cleared.
//!
//! All mutation goes through one mutex; a resolved entry is handed out
//! as a reference-counted [`TileData`], so eviction never invalidates
//! bytes a caller is still reading — the mapping is released when the
//! last handle drops.

use std::collections::{HashMap, VecDeque};
use std::fs::File;
use std::ops::Deref;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use log::warn;
use memmap2::Mmap;

use crate::tilename::TileCoord;

/// An open tile file's read-only mapping, together with the tile's
/// south-west corner.
#[derive(Debug)]
pub struct MappedTile {
    data: Mmap,
    origin: TileCoord,
}

impl MappedTile {
    fn open(path: &Path, origin: TileCoord) -> std::io::Result<Self> {
        let file = File::open(path)?;
        // SAFETY: the file is mapped read-only and archive tiles are not
        // rewritten while the process runs.
        let data = unsafe { Mmap::map(&file)? };
        Ok(MappedTile { data, origin })
    }
}

/// Reference-counted view of a cached tile's bytes.
///
/// Cloning is cheap. The handle stays readable after the backing entry
/// is evicted from the store; only the memory release is deferred to
/// the last drop.
#[derive(Clone, Debug)]
pub struct TileData(Arc<MappedTile>);

impl TileData {
    /// South-west corner of the tile these bytes belong to.
    pub fn origin(&self) -> TileCoord {
        self.0.origin
    }

    /// The tile's full byte contents.
    pub fn bytes(&self) -> &[u8] {
        &self.0.data
    }
}

impl Deref for TileData {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        self.bytes()
    }
}

/// A whole tile as returned by bulk region fetches.
#[derive(Clone, Debug)]
pub struct Tile {
    /// South-west corner in whole degrees.
    pub origin: TileCoord,
    /// The tile's raw grid bytes.
    pub data: TileData,
}

struct StoreInner {
    capacity: usize,
    /// Keys in insertion order; the front is evicted first.
    order: VecDeque<u32>,
    /// `None` marks a recorded open/map failure.
    entries: HashMap<u32, Option<Arc<MappedTile>>>,
}

impl StoreInner {
    fn evict_to(&mut self, limit: usize) {
        while self.order.len() > limit {
            if let Some(key) = self.order.pop_front() {
                self.entries.remove(&key);
            }
        }
    }
}

/// Bounded FIFO cache of memory-mapped tiles, keyed by packed tile
/// coordinate.
pub struct TileStore {
    inner: Mutex<StoreInner>,
}

impl TileStore {
    /// Create a store holding at most `capacity` tiles.
    pub fn new(capacity: usize) -> Self {
        TileStore {
            inner: Mutex::new(StoreInner {
                capacity: capacity.max(1),
                order: VecDeque::new(),
                entries: HashMap::new(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, StoreInner> {
        // A poisoning panic cannot originate inside the store; recover
        // the guard rather than propagating a panic to callers.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Resolve a tile to its mapped bytes, opening `path` on a miss.
    ///
    /// Returns `None` when the file could not be opened or mapped, now
    /// or on a previous attempt. Lookup, insertion, and eviction happen
    /// as one atomic step; the call blocks while the file is mapped.
    pub fn resolve(&self, coord: TileCoord, path: &Path) -> Option<TileData> {
        let mut inner = self.lock();
        let key = coord.packed_key();

        if let Some(entry) = inner.entries.get(&key) {
            return entry.as_ref().cloned().map(TileData);
        }

        let mapped = match MappedTile::open(path, coord) {
            Ok(tile) => Some(Arc::new(tile)),
            Err(e) => {
                warn!("can't open tile {}: {}", path.display(), e);
                None
            }
        };

        // Make room before inserting; first-inserted goes first.
        let limit = inner.capacity - 1;
        inner.evict_to(limit);
        inner.order.push_back(key);
        inner.entries.insert(key, mapped.clone());

        mapped.map(TileData)
    }

    /// Whether the store currently holds a usable entry for the tile.
    pub fn resident(&self, coord: TileCoord) -> bool {
        let inner = self.lock();
        matches!(inner.entries.get(&coord.packed_key()), Some(Some(_)))
    }

    /// Number of occupied slots, failed entries included.
    pub fn len(&self) -> usize {
        self.lock().order.len()
    }

    /// Whether the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.lock().order.is_empty()
    }

    /// Change the capacity, evicting oldest entries if over the new
    /// limit.
    pub fn set_capacity(&self, capacity: usize) {
        let mut inner = self.lock();
        inner.capacity = capacity.max(1);
        let limit = inner.capacity;
        inner.evict_to(limit);
    }

    /// Drop every entry, including recorded failures.
    pub fn clear(&self) {
        let mut inner = self.lock();
        inner.order.clear();
        inner.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Write;
    use std::path::PathBuf;
    use tempfile::TempDir;

    use crate::grid::TILE_BYTE_LEN;

    /// Write a tile file of the full grid size, filled with one byte.
    fn create_tile(dir: &Path, name: &str, fill: u8) -> PathBuf {
        let path = dir.join(name);
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(&vec![fill; TILE_BYTE_LEN]).unwrap();
        path
    }

    fn coord(lon: i32, lat: i32) -> TileCoord {
        TileCoord { lon, lat }
    }

    #[test]
    fn test_resolve_and_hit() {
        let dir = TempDir::new().unwrap();
        let path = create_tile(dir.path(), "N40E042.hgt", 7);

        let store = TileStore::new(4);
        let a = coord(42, 40);

        let data = store.resolve(a, &path).unwrap();
        assert_eq!(data.len(), TILE_BYTE_LEN);
        assert_eq!(data[0], 7);
        assert_eq!(data.origin(), a);
        assert_eq!(store.len(), 1);

        // Second resolve is a hit on the same mapping
        let again = store.resolve(a, &path).unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(again[100], 7);
    }

    #[test]
    fn test_fifo_eviction_ignores_hits() {
        let dir = TempDir::new().unwrap();
        let pa = create_tile(dir.path(), "N40E042.hgt", 1);
        let pb = create_tile(dir.path(), "N41E042.hgt", 2);
        let pc = create_tile(dir.path(), "N42E042.hgt", 3);

        let store = TileStore::new(2);
        let a = coord(42, 40);
        let b = coord(42, 41);
        let c = coord(42, 42);

        store.resolve(a, &pa).unwrap();
        store.resolve(b, &pb).unwrap();

        // Re-read A; under LRU this would protect it. It does not.
        store.resolve(a, &pa).unwrap();

        store.resolve(c, &pc).unwrap();

        assert!(!store.resident(a), "A was inserted first, A is evicted");
        assert!(store.resident(b));
        assert!(store.resident(c));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_capacity_plus_one_evicts_first() {
        let dir = TempDir::new().unwrap();
        let store = TileStore::new(3);

        let mut coords = Vec::new();
        for i in 0..4 {
            let c = coord(10 + i, 50);
            let path = create_tile(dir.path(), &c.file_name(), i as u8);
            store.resolve(c, &path).unwrap();
            coords.push(c);
        }

        assert_eq!(store.len(), 3);
        assert!(!store.resident(coords[0]));
        assert!(store.resident(coords[1]));
        assert!(store.resident(coords[3]));
    }

    #[test]
    fn test_failed_open_is_permanent_miss() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("N10E010.hgt");
        let store = TileStore::new(4);
        let c = coord(10, 10);

        assert!(store.resolve(c, &path).is_none());
        // The failure occupies a slot
        assert_eq!(store.len(), 1);

        // Creating the file afterwards does not help until invalidation
        create_tile(dir.path(), "N10E010.hgt", 9);
        assert!(store.resolve(c, &path).is_none());

        store.clear();
        let data = store.resolve(c, &path).unwrap();
        assert_eq!(data[0], 9);
    }

    #[test]
    fn test_evicted_bytes_stay_readable() {
        let dir = TempDir::new().unwrap();
        let pa = create_tile(dir.path(), "N40E042.hgt", 5);
        let pb = create_tile(dir.path(), "N41E042.hgt", 6);

        let store = TileStore::new(1);
        let a = coord(42, 40);

        let held = store.resolve(a, &pa).unwrap();
        store.resolve(coord(42, 41), &pb).unwrap();
        assert!(!store.resident(a));

        // The handle still reads the old mapping
        assert_eq!(held[TILE_BYTE_LEN - 1], 5);
    }

    #[test]
    fn test_set_capacity_evicts_down() {
        let dir = TempDir::new().unwrap();
        let store = TileStore::new(4);

        let mut coords = Vec::new();
        for i in 0..4 {
            let c = coord(20 + i, 30);
            let path = create_tile(dir.path(), &c.file_name(), i as u8);
            store.resolve(c, &path).unwrap();
            coords.push(c);
        }

        store.set_capacity(2);
        assert_eq!(store.len(), 2);
        assert!(!store.resident(coords[0]));
        assert!(!store.resident(coords[1]));
        assert!(store.resident(coords[2]));
        assert!(store.resident(coords[3]));
    }
}
