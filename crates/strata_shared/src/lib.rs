//! # STRATA Shared
//!
//! Common types used by authoritative and replica worlds.
//!
//! ## RULE
//!
//! This crate holds data only: coordinates, chunk geometry and the region
//! protocol messages. Storage, codecs and world logic live in `strata_core`.

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod constants;
pub mod coord;
pub mod protocol;

pub use constants::{AIR_WIRE_VALUE, REGION_SIZE, REGION_SIZE_I32, REGION_VOLUME, RESERVED_TILE_ID};
pub use coord::{Coordinate, Direction, LocalIndex};
pub use protocol::{RegionPush, RegionRequest, WorldId};
