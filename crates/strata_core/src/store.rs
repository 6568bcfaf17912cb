//! Region persistence seam.
//!
//! Stores move opaque codec bytes; they never interpret them.

use std::collections::HashMap;

use parking_lot::Mutex;
use strata_shared::{Coordinate, WorldId};

use crate::error::WorldResult;

/// Backing store for encoded regions, keyed by world and region origin.
pub trait RegionStore: Send + Sync {
    /// Returns the saved encoding, or `None` if the region was never saved.
    ///
    /// # Errors
    ///
    /// `WorldError::Storage` if the backing medium fails.
    fn load(&self, world: WorldId, origin: Coordinate) -> WorldResult<Option<Vec<u8>>>;

    /// Saves an encoding, replacing any previous one.
    ///
    /// # Errors
    ///
    /// `WorldError::Storage` if the backing medium fails.
    fn save(&self, world: WorldId, origin: Coordinate, bytes: &[u8]) -> WorldResult<()>;
}

/// In-process store. Useful for tests and for servers that never restart.
#[derive(Default)]
pub struct MemoryRegionStore {
    blobs: Mutex<HashMap<(WorldId, Coordinate), Vec<u8>>>,
}

impl MemoryRegionStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of saved regions across all worlds.
    #[must_use]
    pub fn len(&self) -> usize {
        self.blobs.lock().len()
    }

    /// Returns true if nothing was saved yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.blobs.lock().is_empty()
    }

    /// Returns true if `origin` has a saved encoding in `world`.
    #[must_use]
    pub fn contains(&self, world: WorldId, origin: Coordinate) -> bool {
        self.blobs.lock().contains_key(&(world, origin))
    }
}

impl RegionStore for MemoryRegionStore {
    fn load(&self, world: WorldId, origin: Coordinate) -> WorldResult<Option<Vec<u8>>> {
        Ok(self.blobs.lock().get(&(world, origin)).cloned())
    }

    fn save(&self, world: WorldId, origin: Coordinate, bytes: &[u8]) -> WorldResult<()> {
        self.blobs.lock().insert((world, origin), bytes.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_is_keyed_by_world() {
        let store = MemoryRegionStore::new();
        assert!(store.is_empty());
        store.save(WorldId(1), Coordinate::ZERO, &[1, 2, 3]).unwrap();

        assert_eq!(store.load(WorldId(1), Coordinate::ZERO).unwrap(), Some(vec![1, 2, 3]));
        assert_eq!(store.load(WorldId(2), Coordinate::ZERO).unwrap(), None);
        assert!(store.contains(WorldId(1), Coordinate::ZERO));
        assert_eq!(store.len(), 1);

        store.save(WorldId(1), Coordinate::ZERO, &[9]).unwrap();
        assert_eq!(store.load(WorldId(1), Coordinate::ZERO).unwrap(), Some(vec![9]));
        assert_eq!(store.len(), 1);
    }
}
