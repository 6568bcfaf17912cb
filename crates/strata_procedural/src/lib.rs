//! # STRATA Procedural
//!
//! Everything a world needs besides the core: map generators, on-disk region
//! files and config bootstrap.
//!
//! ## Example
//!
//! ```rust,ignore
//! use strata_procedural::bootstrap_from_file;
//!
//! let (context, world) = bootstrap_from_file("strata.toml")?;
//! let surface = world.get_tile(Coordinate::new(0, 0, 0));
//! world.save_all()?;
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_precision_loss)]

pub mod bootstrap;
pub mod file_store;
pub mod generators;
pub mod noise;

pub use bootstrap::{bootstrap, bootstrap_from_file, store_for, BootstrapError};
pub use file_store::{FileRegionStore, REGION_FILE_EXTENSION};
pub use generators::{build_generator, FlatGenerator, TerrainGenerator};
pub use noise::{SimplexNoise, WorldSeed};
