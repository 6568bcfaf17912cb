//! # Regions
//!
//! A region is a `REGION_SIZE`³ cube of tiles stored as one flat array.
//!
//! ## Layout
//!
//! Slots are linearized as `z * S * S + x * S + y`: y is the fastest axis,
//! then x, then z. The region codec walks the same order, so the flat slice
//! returned by [`Region::tiles`] is exactly the encoded traversal.

use strata_shared::{Coordinate, LocalIndex, WorldId, REGION_SIZE, REGION_VOLUME};

use crate::error::RegionError;
use crate::tile::Tile;

/// Fixed-size chunk of tiles.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Region {
    /// Absolute corner of the chunk.
    origin: Coordinate,
    /// World the chunk belongs to.
    world: WorldId,
    /// `REGION_VOLUME` slots in z, x, y order.
    tiles: Box<[Tile]>,
}

impl Region {
    /// Creates an all-air region. `origin` is floored to its region corner.
    #[must_use]
    pub fn new(origin: Coordinate, world: WorldId) -> Self {
        Self {
            origin: origin.region_origin(),
            world,
            tiles: vec![Tile::AIR; REGION_VOLUME].into_boxed_slice(),
        }
    }

    /// Builds a region from tiles already in layout order.
    ///
    /// # Errors
    ///
    /// `WrongTileCount` unless `tiles.len() == REGION_VOLUME`.
    pub fn new_from(
        origin: Coordinate,
        world: WorldId,
        tiles: Vec<Tile>,
    ) -> Result<Self, RegionError> {
        if tiles.len() != REGION_VOLUME {
            return Err(RegionError::WrongTileCount {
                expected: REGION_VOLUME,
                actual: tiles.len(),
            });
        }
        Ok(Self {
            origin: origin.region_origin(),
            world,
            tiles: tiles.into_boxed_slice(),
        })
    }

    /// Flat slot index of a local position.
    ///
    /// # Panics
    ///
    /// Panics if any axis is outside `[0, REGION_SIZE)`.
    #[inline]
    #[must_use]
    pub fn index_of(x: usize, y: usize, z: usize) -> usize {
        assert!(
            x < REGION_SIZE && y < REGION_SIZE && z < REGION_SIZE,
            "local tile index ({x}, {y}, {z}) outside region of size {REGION_SIZE}"
        );
        z * REGION_SIZE * REGION_SIZE + x * REGION_SIZE + y
    }

    /// Local position of a flat slot index.
    ///
    /// # Panics
    ///
    /// Panics if `index >= REGION_VOLUME`.
    #[inline]
    #[must_use]
    pub fn position_of(index: usize) -> LocalIndex {
        assert!(index < REGION_VOLUME, "slot {index} outside region");
        LocalIndex::new(
            (index / REGION_SIZE) % REGION_SIZE,
            index % REGION_SIZE,
            index / (REGION_SIZE * REGION_SIZE),
        )
    }

    /// Tile at a local position.
    ///
    /// # Panics
    ///
    /// Panics on out-of-range indices; use [`Coordinate::local_index`] to derive them.
    #[inline]
    #[must_use]
    pub fn tile(&self, x: usize, y: usize, z: usize) -> &Tile {
        &self.tiles[Self::index_of(x, y, z)]
    }

    /// Mutable tile at a local position.
    ///
    /// # Panics
    ///
    /// Panics on out-of-range indices.
    #[inline]
    pub fn tile_mut(&mut self, x: usize, y: usize, z: usize) -> &mut Tile {
        &mut self.tiles[Self::index_of(x, y, z)]
    }

    /// Tile at a [`LocalIndex`].
    #[inline]
    #[must_use]
    pub fn tile_at(&self, local: LocalIndex) -> &Tile {
        self.tile(local.x, local.y, local.z)
    }

    /// Mutable tile at a [`LocalIndex`].
    #[inline]
    pub fn tile_at_mut(&mut self, local: LocalIndex) -> &mut Tile {
        self.tile_mut(local.x, local.y, local.z)
    }

    /// Region corner.
    #[inline]
    #[must_use]
    pub const fn origin(&self) -> Coordinate {
        self.origin
    }

    /// Owning world.
    #[inline]
    #[must_use]
    pub const fn world(&self) -> WorldId {
        self.world
    }

    /// Returns true if the absolute coordinate lies inside this region.
    #[inline]
    #[must_use]
    pub fn contains(&self, coord: Coordinate) -> bool {
        coord.region_origin() == self.origin
    }

    /// All slots in layout order.
    #[inline]
    #[must_use]
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    /// All slots in layout order, mutable.
    #[inline]
    pub fn tiles_mut(&mut self) -> &mut [Tile] {
        &mut self.tiles
    }

    /// Sets every slot to `tile`.
    pub fn fill(&mut self, tile: Tile) {
        self.tiles.fill(tile);
    }

    /// Number of slots that are not air.
    #[must_use]
    pub fn count_non_air(&self) -> usize {
        self.tiles.iter().filter(|t| !t.is_air()).count()
    }

    /// Returns true if every slot holds the same tile.
    #[must_use]
    pub fn is_uniform(&self) -> bool {
        self.tiles.windows(2).all(|w| w[0] == w[1])
    }

    /// Iterates `(local position, tile)` in layout order.
    pub fn iter(&self) -> impl Iterator<Item = (LocalIndex, &Tile)> + '_ {
        self.tiles
            .iter()
            .enumerate()
            .map(|(i, tile)| (Self::position_of(i), tile))
    }
}
