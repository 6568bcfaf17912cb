//! # Region Constants
//!
//! Chunk geometry and wire sentinels.
//!
//! **CRITICAL:** These values are part of the persisted and network formats.
//! Changing any of them invalidates every stored region file.

// =============================================================================
// REGION GEOMETRY
// =============================================================================

/// Edge length of a region (chunk) in tiles. Must be a power of two.
pub const REGION_SIZE: usize = 32;

/// `REGION_SIZE` as a signed coordinate delta.
pub const REGION_SIZE_I32: i32 = REGION_SIZE as i32;

/// Number of tile slots in one region.
pub const REGION_VOLUME: usize = REGION_SIZE * REGION_SIZE * REGION_SIZE;

const _: () = assert!(REGION_SIZE.is_power_of_two());

// =============================================================================
// WIRE SENTINELS
// =============================================================================

/// Type value written to the region stream for an air tile.
///
/// In memory air is `None`, and the registry reserves id `0`.
/// This is the only value that means air on the wire.
pub const AIR_WIRE_VALUE: i32 = -1;

/// Id that the tile registry never hands out.
pub const RESERVED_TILE_ID: u32 = 0;
