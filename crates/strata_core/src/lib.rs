//! # STRATA Core
//!
//! Chunked tile storage for a voxel world.
//!
//! ## Pieces
//!
//! 1. **[`TileRegistry`]** - hands every tile type a contiguous id range; ids
//!    inside the range carry a packed variant
//! 2. **[`Region`]** - `REGION_SIZE`³ tiles in one flat array
//! 3. **[`RegionCodec`]** - run-length encoded bytes for disk and network
//! 4. **[`World`]** - loaded regions, on-demand loading, neighbor queries
//! 5. **[`WorldMutator`]** - the single writer of tile contents
//!
//! ## Thread Safety
//!
//! Readers (renderers, physics) call [`World::get_tile`] from any thread while
//! a loader thread calls [`World::load_region`]. Generation runs without any
//! world lock held.
//!
//! ## Example
//!
//! ```rust,ignore
//! use strata_core::{GameContext, LoadPolicy, TileEntry, WorldRole};
//!
//! let context = GameContext::new();
//! let stone = context.registry().register(TileEntry::new("base", "stone"))?;
//! let world = context.create_world(WorldRole::Authoritative, LoadPolicy::Immediate);
//! world.set_generator(generator);
//!
//! let tile = world.get_tile(Coordinate::new(10, -4, 3));
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod codec;
pub mod config;
pub mod context;
pub mod error;
pub mod events;
pub mod generator;
pub mod mutator;
pub mod region;
pub mod registry;
pub mod store;
pub mod tile;
pub mod world;

pub use codec::RegionCodec;
pub use config::{FlatLayer, GeneratorKind, StorageConfig, StrataConfig, WorldConfig};
pub use context::GameContext;
pub use error::{
    CodecError, ConfigError, RegionError, RegistryError, TileKey, WorldError, WorldResult,
};
pub use events::{EventBus, LoadSource, RegionEvent, RegistryEvent, Subscription};
pub use generator::{EmptyGenerator, MapGenerator};
pub use mutator::WorldMutator;
pub use region::Region;
pub use registry::{RegistrySnapshot, TileRegistry};
pub use store::{MemoryRegionStore, RegionStore};
pub use tile::{Tile, TileEntry, TileId};
pub use world::{LoadOutcome, LoadPolicy, RegionHandle, World, WorldRole, WorldStats};

pub use strata_shared::{Coordinate, Direction, LocalIndex, RegionPush, RegionRequest, WorldId};
