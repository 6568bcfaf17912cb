//! # Bootstrap
//!
//! Turns a [`StrataConfig`] into a context with one authoritative world:
//! tiles registered, generator built, region store attached.

use std::path::Path;
use std::sync::Arc;

use strata_core::{
    ConfigError, GameContext, MemoryRegionStore, RegionStore, RegistryError, StorageConfig,
    StrataConfig, World, WorldRole,
};
use thiserror::Error;

use crate::file_store::FileRegionStore;
use crate::generators::build_generator;

/// Startup failures.
#[derive(Error, Debug)]
pub enum BootstrapError {
    /// Configuration could not be read or validated.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Tile list or generator tile names were rejected.
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Region store selected by the `[storage]` table.
#[must_use]
pub fn store_for(storage: &StorageConfig) -> Arc<dyn RegionStore> {
    match &storage.directory {
        Some(directory) => Arc::new(FileRegionStore::new(directory, storage.compress)),
        None => Arc::new(MemoryRegionStore::new()),
    }
}

/// Builds a context and its first authoritative world.
///
/// # Errors
///
/// Registry rejections from the tile list or from generator tile names.
pub fn bootstrap(config: &StrataConfig) -> Result<(GameContext, Arc<World>), BootstrapError> {
    config.validate()?;

    let context = GameContext::from_config(config)?;
    let generator = build_generator(&config.generator, context.registry())?;

    let world = context.create_world(WorldRole::Authoritative, config.world.policy);
    tracing::info!(
        "{} ready: generator '{}', {} tiles, policy {:?}",
        world.id(),
        generator.name(),
        config.tiles.len(),
        config.world.policy
    );
    world.set_generator(generator);
    world.set_store(store_for(&config.storage));

    Ok((context, world))
}

/// Reads a TOML file and bootstraps from it.
///
/// # Errors
///
/// I/O, parse and validation errors, then everything [`bootstrap`] returns.
pub fn bootstrap_from_file(
    path: impl AsRef<Path>,
) -> Result<(GameContext, Arc<World>), BootstrapError> {
    let config = StrataConfig::load(path)?;
    bootstrap(&config)
}
