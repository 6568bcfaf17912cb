//! Process-level owner of the registry and the worlds.
//!
//! There are no globals: whatever needs the registry or a world is handed
//! the [`GameContext`] (or an `Arc` taken from it).

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use strata_shared::WorldId;

use crate::config::StrataConfig;
use crate::error::RegistryError;
use crate::region::Region;
use crate::registry::TileRegistry;
use crate::tile::{TileEntry, TileId};
use crate::world::{LoadPolicy, World, WorldRole};

/// One tile registry plus every world that shares it.
pub struct GameContext {
    registry: Arc<TileRegistry>,
    worlds: RwLock<HashMap<WorldId, Arc<World>>>,
    next_world: AtomicU32,
}

impl GameContext {
    /// Context with an empty registry and no worlds.
    #[must_use]
    pub fn new() -> Self {
        Self::with_registry(Arc::new(TileRegistry::new()))
    }

    /// Context around an existing registry.
    #[must_use]
    pub fn with_registry(registry: Arc<TileRegistry>) -> Self {
        Self {
            registry,
            worlds: RwLock::new(HashMap::new()),
            next_world: AtomicU32::new(0),
        }
    }

    /// Context whose registry holds the configured tiles, in file order.
    ///
    /// # Errors
    ///
    /// Duplicate names or id space exhaustion in the tile list.
    pub fn from_config(config: &StrataConfig) -> Result<Self, RegistryError> {
        let context = Self::new();
        context.register_tiles(config.tiles.iter().cloned())?;
        Ok(context)
    }

    /// Shared tile registry.
    #[must_use]
    pub fn registry(&self) -> &Arc<TileRegistry> {
        &self.registry
    }

    /// Registers entries in order and returns their base ids.
    ///
    /// # Errors
    ///
    /// Stops at the first rejected entry.
    pub fn register_tiles(
        &self,
        entries: impl IntoIterator<Item = TileEntry>,
    ) -> Result<Vec<TileId>, RegistryError> {
        entries
            .into_iter()
            .map(|entry| self.registry.register(entry))
            .collect()
    }

    /// Creates a world with the next free id.
    ///
    /// Ids count up from 0 in creation order, so two contexts that create
    /// their worlds in the same order agree on every id.
    pub fn create_world(&self, role: WorldRole, policy: LoadPolicy) -> Arc<World> {
        let id = WorldId(self.next_world.fetch_add(1, Ordering::Relaxed));
        let world = Arc::new(World::new(id, Arc::clone(&self.registry), role, policy));
        self.worlds.write().insert(id, Arc::clone(&world));
        tracing::debug!("created {:?}", world);
        world
    }

    /// World by id.
    #[must_use]
    pub fn world(&self, id: WorldId) -> Option<Arc<World>> {
        self.worlds.read().get(&id).cloned()
    }

    /// World a region belongs to.
    #[must_use]
    pub fn world_of(&self, region: &Region) -> Option<Arc<World>> {
        self.world(region.world())
    }

    /// Ids of every world, ascending.
    #[must_use]
    pub fn world_ids(&self) -> Vec<WorldId> {
        let mut ids: Vec<WorldId> = self.worlds.read().keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Drops the context's handle to a world.
    pub fn remove_world(&self, id: WorldId) -> Option<Arc<World>> {
        self.worlds.write().remove(&id)
    }
}

impl Default for GameContext {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_shared::Coordinate;

    #[test]
    fn test_world_ids_are_sequential() {
        let context = GameContext::new();
        let a = context.create_world(WorldRole::Authoritative, LoadPolicy::Immediate);
        let b = context.create_world(WorldRole::Authoritative, LoadPolicy::LoadedOnly);
        assert_eq!(a.id(), WorldId(0));
        assert_eq!(b.id(), WorldId(1));
        assert_eq!(context.world_ids(), vec![WorldId(0), WorldId(1)]);
        assert!(Arc::ptr_eq(&context.world(WorldId(1)).unwrap(), &b));

        context.remove_world(WorldId(0));
        assert!(context.world(WorldId(0)).is_none());
    }

    #[test]
    fn test_worlds_share_registry() {
        let context = GameContext::new();
        let world = context.create_world(WorldRole::Authoritative, LoadPolicy::Immediate);
        let ids = context
            .register_tiles([TileEntry::new("base", "stone"), TileEntry::new("base", "dirt")])
            .unwrap();
        assert_eq!(ids.iter().map(|id| id.get()).collect::<Vec<_>>(), vec![1, 2]);
        assert!(Arc::ptr_eq(world.registry(), context.registry()));
    }

    #[test]
    fn test_region_back_reference() {
        let context = GameContext::new();
        let world = context.create_world(WorldRole::Authoritative, LoadPolicy::Immediate);
        let region = Region::new(Coordinate::ZERO, world.id());
        assert_eq!(context.world_of(&region).map(|w| w.id()), Some(world.id()));
    }

    #[test]
    fn test_from_config_registers_tiles() {
        let config = StrataConfig {
            tiles: vec![
                TileEntry::new("base", "stone"),
                TileEntry::new("base", "wheat").with_variants(7),
                TileEntry::new("base", "dirt"),
            ],
            ..StrataConfig::default()
        };
        let context = GameContext::from_config(&config).unwrap();
        assert_eq!(context.registry().id_of("base.dirt").map(TileId::get), Ok(10));

        let duplicate = StrataConfig {
            tiles: vec![TileEntry::new("base", "stone"), TileEntry::new("base", "stone")],
            ..StrataConfig::default()
        };
        assert!(GameContext::from_config(&duplicate).is_err());
    }
}
