//! Region protocol types shared between authoritative and replica worlds.
//!
//! A replica asks for a chunk with [`RegionRequest`]; the authoritative side
//! answers with [`RegionPush`] carrying the encoded region bytes.
//! Framing and transport are up to the caller.

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

use crate::coord::Coordinate;

/// Identifies a world inside a game context.
#[repr(transparent)]
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Pod, Zeroable, Serialize,
    Deserialize,
)]
pub struct WorldId(pub u32);

impl std::fmt::Display for WorldId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "world#{}", self.0)
    }
}

/// Region request (replica to authoritative)
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Pod, Zeroable, Serialize, Deserialize)]
pub struct RegionRequest {
    /// World the region belongs to
    pub world: WorldId,
    /// Region origin (floor-aligned)
    pub origin: Coordinate,
}

impl RegionRequest {
    /// Creates a request, normalizing `origin` to its region corner.
    #[must_use]
    pub const fn new(world: WorldId, origin: Coordinate) -> Self {
        Self {
            world,
            origin: origin.region_origin(),
        }
    }
}

/// Region push (authoritative to replica)
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionPush {
    /// World the region belongs to
    pub world: WorldId,
    /// Region origin
    pub origin: Coordinate,
    /// Region bytes in the RLE region format
    pub payload: Vec<u8>,
}

impl RegionPush {
    /// Request this push answers.
    #[must_use]
    pub const fn request(&self) -> RegionRequest {
        RegionRequest::new(self.world, self.origin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_normalizes_origin() {
        let req = RegionRequest::new(WorldId(3), Coordinate::new(-1, 40, 5));
        assert_eq!(req.origin, Coordinate::new(-32, 32, 0));
        assert_eq!(req.world, WorldId(3));
    }

    #[test]
    fn test_request_is_plain_data() {
        let req = RegionRequest::new(WorldId(1), Coordinate::new(32, 0, 0));
        assert_eq!(bytemuck::bytes_of(&req).len(), 16);
    }

    #[test]
    fn test_push_answers_request() {
        let push = RegionPush {
            world: WorldId(2),
            origin: Coordinate::new(64, 0, -32),
            payload: vec![1, 2, 3],
        };
        assert_eq!(
            push.request(),
            RegionRequest::new(WorldId(2), Coordinate::new(64, 0, -32))
        );
    }
}
