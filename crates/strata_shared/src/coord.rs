//! Integer tile coordinates shared between client and server.
//!
//! These are the canonical representations used in the region protocol.

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

use crate::constants::{REGION_SIZE, REGION_SIZE_I32};

/// Absolute tile position in a world.
///
/// Region origins are also `Coordinate`s: the floor-aligned corner of a chunk.
#[repr(C)]
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Pod, Zeroable, Serialize,
    Deserialize,
)]
pub struct Coordinate {
    /// X component
    pub x: i32,
    /// Y component
    pub y: i32,
    /// Z component
    pub z: i32,
}

impl Coordinate {
    /// Creates a new coordinate
    #[inline]
    #[must_use]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// The world origin
    pub const ZERO: Self = Self::new(0, 0, 0);

    /// Floors every axis to the nearest lower multiple of `REGION_SIZE`.
    ///
    /// Uses euclidean remainder so `-1` lands in the region at `-REGION_SIZE`,
    /// not in the region at `0`.
    #[inline]
    #[must_use]
    pub const fn region_origin(self) -> Self {
        Self {
            x: self.x - self.x.rem_euclid(REGION_SIZE_I32),
            y: self.y - self.y.rem_euclid(REGION_SIZE_I32),
            z: self.z - self.z.rem_euclid(REGION_SIZE_I32),
        }
    }

    /// Offset of this coordinate inside its region, each axis in `[0, REGION_SIZE)`.
    #[inline]
    #[must_use]
    pub const fn local_index(self) -> LocalIndex {
        LocalIndex {
            x: self.x.rem_euclid(REGION_SIZE_I32) as usize,
            y: self.y.rem_euclid(REGION_SIZE_I32) as usize,
            z: self.z.rem_euclid(REGION_SIZE_I32) as usize,
        }
    }

    /// Returns true if this coordinate is the corner of a region.
    #[inline]
    #[must_use]
    pub const fn is_region_origin(self) -> bool {
        self.x.rem_euclid(REGION_SIZE_I32) == 0
            && self.y.rem_euclid(REGION_SIZE_I32) == 0
            && self.z.rem_euclid(REGION_SIZE_I32) == 0
    }

    /// Translates by the given deltas. Wraps on `i32` overflow.
    #[inline]
    #[must_use]
    pub const fn offset(self, dx: i32, dy: i32, dz: i32) -> Self {
        Self {
            x: self.x.wrapping_add(dx),
            y: self.y.wrapping_add(dy),
            z: self.z.wrapping_add(dz),
        }
    }

    /// The adjacent coordinate in `direction`.
    #[inline]
    #[must_use]
    pub const fn neighbor(self, direction: Direction) -> Self {
        let [dx, dy, dz] = direction.delta();
        self.offset(dx, dy, dz)
    }

    /// Rebuilds an absolute coordinate from a region origin and a local index.
    #[inline]
    #[must_use]
    pub const fn from_local(origin: Self, local: LocalIndex) -> Self {
        origin.offset(local.x as i32, local.y as i32, local.z as i32)
    }

    /// Origin of the region `steps` regions away along each axis.
    #[inline]
    #[must_use]
    pub const fn region_step(self, sx: i32, sy: i32, sz: i32) -> Self {
        self.offset(
            sx * REGION_SIZE_I32,
            sy * REGION_SIZE_I32,
            sz * REGION_SIZE_I32,
        )
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

impl From<[i32; 3]> for Coordinate {
    fn from(arr: [i32; 3]) -> Self {
        Self::new(arr[0], arr[1], arr[2])
    }
}

/// Position of a tile inside its region.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct LocalIndex {
    /// X in `[0, REGION_SIZE)`
    pub x: usize,
    /// Y in `[0, REGION_SIZE)`
    pub y: usize,
    /// Z in `[0, REGION_SIZE)`
    pub z: usize,
}

impl LocalIndex {
    /// Creates a local index. Values are not checked here.
    #[inline]
    #[must_use]
    pub const fn new(x: usize, y: usize, z: usize) -> Self {
        Self { x, y, z }
    }

    /// Returns true if every axis is inside a region.
    #[inline]
    #[must_use]
    pub const fn in_bounds(self) -> bool {
        self.x < REGION_SIZE && self.y < REGION_SIZE && self.z < REGION_SIZE
    }
}

/// The six axis-aligned neighbor directions.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// +X
    PosX = 0,
    /// -X
    NegX = 1,
    /// +Y
    PosY = 2,
    /// -Y
    NegY = 3,
    /// +Z
    PosZ = 4,
    /// -Z
    NegZ = 5,
}

impl Direction {
    /// All directions, in the order neighbor queries report them.
    pub const ALL: [Self; 6] = [
        Self::PosX,
        Self::NegX,
        Self::PosY,
        Self::NegY,
        Self::PosZ,
        Self::NegZ,
    ];

    /// Unit step along this direction.
    #[inline]
    #[must_use]
    pub const fn delta(self) -> [i32; 3] {
        match self {
            Self::PosX => [1, 0, 0],
            Self::NegX => [-1, 0, 0],
            Self::PosY => [0, 1, 0],
            Self::NegY => [0, -1, 0],
            Self::PosZ => [0, 0, 1],
            Self::NegZ => [0, 0, -1],
        }
    }

    /// The direction pointing back.
    #[inline]
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::PosX => Self::NegX,
            Self::NegX => Self::PosX,
            Self::PosY => Self::NegY,
            Self::NegY => Self::PosY,
            Self::PosZ => Self::NegZ,
            Self::NegZ => Self::PosZ,
        }
    }

    /// Position of this direction in [`Direction::ALL`].
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_region_origin_positive() {
        assert_eq!(Coordinate::new(0, 0, 0).region_origin(), Coordinate::ZERO);
        assert_eq!(Coordinate::new(31, 5, 17).region_origin(), Coordinate::ZERO);
        assert_eq!(
            Coordinate::new(32, 64, 95).region_origin(),
            Coordinate::new(32, 64, 64)
        );
    }

    #[test]
    fn test_region_origin_floors_negative() {
        assert_eq!(
            Coordinate::new(-1, -1, -1).region_origin(),
            Coordinate::new(-32, -32, -32)
        );
        assert_eq!(
            Coordinate::new(-32, -33, -64).region_origin(),
            Coordinate::new(-32, -64, -64)
        );
    }

    #[test]
    fn test_local_index_in_range() {
        for v in [-65, -64, -33, -32, -31, -1, 0, 1, 31, 32, 33, 1000] {
            let c = Coordinate::new(v, v, v);
            let local = c.local_index();
            assert!(local.in_bounds(), "{c} -> {local:?}");
            assert_eq!(Coordinate::from_local(c.region_origin(), local), c);
        }
        assert_eq!(Coordinate::new(-1, 0, 33).local_index(), LocalIndex::new(31, 0, 1));
    }

    #[test]
    fn test_is_region_origin() {
        assert!(Coordinate::new(-32, 0, 64).is_region_origin());
        assert!(!Coordinate::new(-31, 0, 64).is_region_origin());
    }

    #[test]
    fn test_neighbor_and_opposite() {
        let c = Coordinate::new(31, 0, 0);
        for dir in Direction::ALL {
            assert_eq!(c.neighbor(dir).neighbor(dir.opposite()), c);
        }
        assert_eq!(c.neighbor(Direction::PosX), Coordinate::new(32, 0, 0));
        assert_eq!(
            c.neighbor(Direction::PosX).region_origin(),
            Coordinate::ZERO.region_step(1, 0, 0)
        );
    }

    #[test]
    fn test_direction_index_matches_all() {
        for (i, dir) in Direction::ALL.iter().enumerate() {
            assert_eq!(dir.index(), i);
        }
    }
}
