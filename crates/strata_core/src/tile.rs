//! Tile types and the per-cell tile value.
//!
//! A [`TileEntry`] describes a kind of tile; the registry hands it a range of
//! [`TileId`]s. A [`Tile`] is one cell of a region.

use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};
use strata_shared::AIR_WIRE_VALUE;

/// Registry-assigned tile type identifier. Never zero.
#[repr(transparent)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileId(NonZeroU32);

impl TileId {
    /// Wraps a raw id. Returns `None` for the reserved id `0`.
    #[inline]
    #[must_use]
    pub const fn new(raw: u32) -> Option<Self> {
        match NonZeroU32::new(raw) {
            Some(id) => Some(Self(id)),
            None => None,
        }
    }

    /// Raw id value.
    #[inline]
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0.get()
    }

    /// Wire value for an optional tile type; air becomes [`AIR_WIRE_VALUE`].
    ///
    /// Registry ids never exceed `i32::MAX`.
    #[inline]
    #[must_use]
    pub const fn to_wire(tile_type: Option<Self>) -> i32 {
        match tile_type {
            Some(id) => id.get() as i32,
            None => AIR_WIRE_VALUE,
        }
    }
}

impl std::fmt::Display for TileId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.get())
    }
}

/// Immutable description of a tile type.
///
/// Built with the chained setters, then handed to the registry which keeps it
/// behind an `Arc` for the rest of the process.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileEntry {
    namespace: String,
    name: String,
    /// Blocks visibility of neighbors.
    #[serde(default)]
    opaque: bool,
    /// Blocks entity movement.
    #[serde(default)]
    solid: bool,
    /// Extra ids reserved for packed sub-states. `0` means a single state.
    #[serde(default, rename = "variants")]
    variant_capacity: u64,
}

impl TileEntry {
    /// Creates a non-opaque, non-solid, single-state entry.
    #[must_use]
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
            opaque: false,
            solid: false,
            variant_capacity: 0,
        }
    }

    /// Sets the opaque flag.
    #[must_use]
    pub fn opaque(mut self, opaque: bool) -> Self {
        self.opaque = opaque;
        self
    }

    /// Sets the solid flag.
    #[must_use]
    pub fn solid(mut self, solid: bool) -> Self {
        self.solid = solid;
        self
    }

    /// Reserves `capacity` extra ids for packed variants.
    #[must_use]
    pub fn with_variants(mut self, capacity: u64) -> Self {
        self.variant_capacity = capacity;
        self
    }

    /// Namespace of the mod that owns this tile.
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Name inside the namespace.
    #[must_use]
    pub fn simple_name(&self) -> &str {
        &self.name
    }

    /// Globally unique `namespace.name`.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{}.{}", self.namespace, self.name)
    }

    /// Returns true if the tile hides its neighbors.
    #[must_use]
    pub const fn is_opaque(&self) -> bool {
        self.opaque
    }

    /// Returns true if the tile blocks movement.
    #[must_use]
    pub const fn is_solid(&self) -> bool {
        self.solid
    }

    /// Number of extra ids reserved beyond the base id.
    #[must_use]
    pub const fn variant_capacity(&self) -> u64 {
        self.variant_capacity
    }

    /// Total ids this entry owns.
    #[must_use]
    pub const fn id_span(&self) -> u64 {
        self.variant_capacity.saturating_add(1)
    }
}

/// One cell of a region.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Tile {
    /// Tile type; `None` is air.
    pub tile_type: Option<TileId>,
    /// Free-running damage counter.
    pub damage: i64,
}

impl Tile {
    /// Empty cell.
    pub const AIR: Self = Self {
        tile_type: None,
        damage: 0,
    };

    /// Undamaged tile of the given type.
    #[inline]
    #[must_use]
    pub const fn new(tile_type: TileId) -> Self {
        Self {
            tile_type: Some(tile_type),
            damage: 0,
        }
    }

    /// Same tile with a different damage value.
    #[inline]
    #[must_use]
    pub const fn with_damage(mut self, damage: i64) -> Self {
        self.damage = damage;
        self
    }

    /// Returns true if this cell is air.
    #[inline]
    #[must_use]
    pub const fn is_air(self) -> bool {
        self.tile_type.is_none()
    }
}
