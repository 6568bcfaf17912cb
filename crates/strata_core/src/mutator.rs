//! # World Mutator
//!
//! The only writer of tile contents in a world.
//!
//! A world accepts one mutator at a time. Edits take the target region's write
//! guard for the single slot update; readers are never blocked for longer than
//! that. An edit that finds its region retired by a concurrent unload goes
//! to the reloaded region instead. Changed regions are collected and announced as one `Updated` event per
//! region on [`WorldMutator::flush_updates`] (and on drop).

use std::sync::Arc;

use strata_shared::Coordinate;
use tracing::trace;

use crate::error::{RegistryError, TileKey, WorldError, WorldResult};
use crate::region::Region;
use crate::tile::{Tile, TileId};
use crate::world::{RegionHandle, World};

/// Exclusive write handle to a world's tiles.
#[derive(Debug)]
pub struct WorldMutator {
    world: Arc<World>,
}

impl WorldMutator {
    /// Binds a mutator to `world`.
    ///
    /// # Errors
    ///
    /// `MutatorAlreadyPresent` if another mutator is still alive.
    pub fn attach(world: &Arc<World>) -> WorldResult<Self> {
        world.try_bind_mutator()?;
        trace!("mutator attached to {}", world.id());
        Ok(Self {
            world: Arc::clone(world),
        })
    }

    /// World being edited.
    #[must_use]
    pub fn world(&self) -> &Arc<World> {
        &self.world
    }

    /// Replaces the tile type at `coord` and resets its damage.
    ///
    /// Returns the previous tile. Loads the region on authoritative worlds.
    ///
    /// # Errors
    ///
    /// * `Registry(NoSuchTile)` - `tile_type` is not registered
    /// * `RegionNotLoaded` - replica world without the region
    /// * any load error
    pub fn set_tile_entry(&self, coord: Coordinate, tile_type: Option<TileId>) -> WorldResult<Tile> {
        self.check_known(tile_type)?;
        let tile = tile_type.map_or(Tile::AIR, Tile::new);
        self.edit(coord, |slot| std::mem::replace(slot, tile))
    }

    /// Sets the tile at `coord` to a named entry's variant.
    ///
    /// # Errors
    ///
    /// Registry lookup failures, plus everything
    /// [`set_tile_entry`](Self::set_tile_entry) returns.
    pub fn set_tile_named(&self, coord: Coordinate, full_name: &str, variant: u64) -> WorldResult<Tile> {
        let id = self.world.registry().variant_id(full_name, variant)?;
        self.set_tile_entry(coord, Some(id))
    }

    /// Turns the tile at `coord` into air.
    ///
    /// # Errors
    ///
    /// See [`set_tile_entry`](Self::set_tile_entry).
    pub fn clear_tile(&self, coord: Coordinate) -> WorldResult<Tile> {
        self.set_tile_entry(coord, None)
    }

    /// Adds `amount` to the tile's damage counter (wrapping). Returns the new value.
    ///
    /// # Errors
    ///
    /// `RegionNotLoaded` on replicas, or any load error.
    pub fn damage_tile(&self, coord: Coordinate, amount: i64) -> WorldResult<i64> {
        self.edit(coord, |slot| {
            slot.damage = slot.damage.wrapping_add(amount);
            slot.damage
        })
    }

    /// Overwrites the tile's damage counter.
    ///
    /// # Errors
    ///
    /// `RegionNotLoaded` on replicas, or any load error.
    pub fn set_damage(&self, coord: Coordinate, damage: i64) -> WorldResult<()> {
        self.edit(coord, |slot| slot.damage = damage)
    }

    /// Sets every slot of the region holding `origin` to `tile`.
    ///
    /// # Errors
    ///
    /// Same as [`set_tile_entry`](Self::set_tile_entry).
    pub fn fill_region(&self, origin: Coordinate, tile: Tile) -> WorldResult<()> {
        self.check_known(tile.tile_type)?;
        self.with_live_region(origin.region_origin(), |region| region.fill(tile))
    }

    /// Publishes one `Updated` event per region edited since the last flush.
    ///
    /// Returns the number of events published.
    pub fn flush_updates(&self) -> usize {
        self.world.flush_dirty()
    }

    fn edit<R>(&self, coord: Coordinate, f: impl FnOnce(&mut Tile) -> R) -> WorldResult<R> {
        let local = coord.local_index();
        self.with_live_region(coord.region_origin(), |region| f(region.tile_at_mut(local)))
    }

    /// Runs `f` on the region currently mapped at `origin`.
    fn with_live_region<R>(
        &self,
        origin: Coordinate,
        f: impl FnOnce(&mut Region) -> R,
    ) -> WorldResult<R> {
        loop {
            let handle = self.region_for(origin)?;
            let mut region = handle.write();
            if !self.world.is_current(origin, &handle) {
                // Unloaded (and persisted) while we waited for the guard.
                continue;
            }
            let result = f(&mut region);
            drop(region);
            self.world.mark_dirty(origin);
            return Ok(result);
        }
    }

    fn region_for(&self, origin: Coordinate) -> WorldResult<RegionHandle> {
        if let Some(region) = self.world.region_handle(origin) {
            return Ok(region);
        }
        // Replicas only queue a request here.
        self.world.load_region(origin)?;
        self.world
            .region_handle(origin)
            .ok_or(WorldError::RegionNotLoaded(origin))
    }

    fn check_known(&self, tile_type: Option<TileId>) -> WorldResult<()> {
        match tile_type {
            Some(id) if !self.world.registry().is_known(id.get()) => Err(
                RegistryError::NoSuchTile(TileKey::Id(id.get())).into(),
            ),
            _ => Ok(()),
        }
    }
}

impl Drop for WorldMutator {
    fn drop(&mut self) {
        self.world.flush_dirty();
        self.world.release_mutator();
        trace!("mutator released from {}", self.world.id());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::RegionEvent;
    use crate::generator::EmptyGenerator;
    use crate::registry::TileRegistry;
    use crate::tile::TileEntry;
    use strata_shared::WorldId;

    fn world() -> (Arc<World>, TileId) {
        let registry = Arc::new(TileRegistry::new());
        let stone = registry.register(TileEntry::new("base", "stone")).unwrap();
        registry
            .register(TileEntry::new("base", "wheat").with_variants(7))
            .unwrap();
        let world = Arc::new(World::authoritative(WorldId(1), registry));
        world.set_generator(Arc::new(EmptyGenerator));
        (world, stone)
    }

    #[test]
    fn test_single_mutator() {
        let (world, _) = world();
        let first = WorldMutator::attach(&world).unwrap();
        assert!(world.has_mutator());
        assert_eq!(
            WorldMutator::attach(&world).unwrap_err(),
            WorldError::MutatorAlreadyPresent(WorldId(1))
        );
        drop(first);
        assert!(!world.has_mutator());
        assert!(WorldMutator::attach(&world).is_ok());
    }

    #[test]
    fn test_set_and_damage() {
        let (world, stone) = world();
        let mutator = WorldMutator::attach(&world).unwrap();
        let at = Coordinate::new(-3, 7, 40);

        assert_eq!(mutator.set_tile_entry(at, Some(stone)).unwrap(), Tile::AIR);
        assert_eq!(mutator.damage_tile(at, 5).unwrap(), 5);
        assert_eq!(mutator.damage_tile(at, -2).unwrap(), 3);
        assert_eq!(world.get_loaded_tile(at), Some(Tile::new(stone).with_damage(3)));

        mutator.set_damage(at, i64::MAX).unwrap();
        assert_eq!(mutator.damage_tile(at, 1).unwrap(), i64::MIN);

        let previous = mutator.clear_tile(at).unwrap();
        assert_eq!(previous.tile_type, Some(stone));
        assert_eq!(world.get_loaded_tile(at), Some(Tile::AIR));
    }

    #[test]
    fn test_named_variants() {
        let (world, _) = world();
        let mutator = WorldMutator::attach(&world).unwrap();
        mutator.set_tile_named(Coordinate::ZERO, "base.wheat", 3).unwrap();
        assert_eq!(
            world.get_loaded_tile(Coordinate::ZERO).and_then(|t| t.tile_type),
            TileId::new(5)
        );
        assert!(mutator.set_tile_named(Coordinate::ZERO, "base.wheat", 8).is_err());
        assert!(mutator.set_tile_named(Coordinate::ZERO, "base.nope", 0).is_err());
    }

    #[test]
    fn test_rejects_unknown_id() {
        let (world, _) = world();
        let mutator = WorldMutator::attach(&world).unwrap();
        assert_eq!(
            mutator.set_tile_entry(Coordinate::ZERO, TileId::new(99)),
            Err(WorldError::Registry(RegistryError::NoSuchTile(TileKey::Id(99))))
        );
        assert_eq!(world.region_count(), 0);
    }

    #[test]
    fn test_updates_are_batched_per_region() {
        let (world, stone) = world();
        world.load_region(Coordinate::ZERO).unwrap();
        let events = world.subscribe();
        let mutator = WorldMutator::attach(&world).unwrap();

        for y in 0..10 {
            mutator.set_tile_entry(Coordinate::new(1, y, 1), Some(stone)).unwrap();
        }
        mutator.fill_region(Coordinate::new(40, 0, 0), Tile::new(stone)).unwrap();
        assert_eq!(mutator.flush_updates(), 2);
        assert_eq!(mutator.flush_updates(), 0);

        let updated: Vec<_> = events
            .drain()
            .into_iter()
            .filter(|e| matches!(e, RegionEvent::Updated { .. }))
            .map(|e| e.origin())
            .collect();
        assert_eq!(updated.len(), 2);
        assert!(updated.contains(&Coordinate::ZERO));
        assert!(updated.contains(&Coordinate::new(32, 0, 0)));
    }

    #[test]
    fn test_drop_flushes() {
        let (world, stone) = world();
        let events = world.subscribe();
        {
            let mutator = WorldMutator::attach(&world).unwrap();
            mutator.set_tile_entry(Coordinate::ZERO, Some(stone)).unwrap();
        }
        assert!(events
            .drain()
            .iter()
            .any(|e| matches!(e, RegionEvent::Updated { .. })));
    }
}
