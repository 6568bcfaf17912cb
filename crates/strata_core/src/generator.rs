//! Map generator seam.

use strata_shared::Coordinate;

use crate::error::WorldResult;
use crate::region::Region;
use crate::world::World;

/// Produces fresh regions for an authoritative world.
///
/// Implementations may read neighbors through [`World::get_tile`] or
/// [`World::get_neighbor_tiles`] for seam-aware generation. From inside a
/// generator those reads never load: regions not yet loaded read as `None`,
/// and [`World::load_region`] fails with `LoadDuringGeneration`.
pub trait MapGenerator: Send + Sync {
    /// Builds the region whose corner is `origin`.
    ///
    /// The returned region must report `origin` and `world.id()`.
    ///
    /// # Errors
    ///
    /// Any failure is propagated to the caller of `World::load_region`.
    fn generate_region(&self, origin: Coordinate, world: &World) -> WorldResult<Region>;

    /// Short name used in log lines.
    fn name(&self) -> &str {
        "generator"
    }
}

/// Leaves every region empty.
#[derive(Clone, Copy, Debug, Default)]
pub struct EmptyGenerator;

impl MapGenerator for EmptyGenerator {
    fn generate_region(&self, origin: Coordinate, world: &World) -> WorldResult<Region> {
        Ok(Region::new(origin, world.id()))
    }

    fn name(&self) -> &str {
        "empty"
    }
}
