//! # Built-in Map Generators
//!
//! Both generators are pure functions of the region origin, so adjacent
//! regions agree on their shared faces without looking at each other.

use std::sync::Arc;

use strata_core::{
    EmptyGenerator, FlatLayer, GeneratorKind, MapGenerator, Region, RegistryError, Tile, TileId,
    TileRegistry, World, WorldResult,
};
use strata_shared::{Coordinate, REGION_SIZE};

use crate::noise::{SimplexNoise, WorldSeed};

/// Amplitude decay per terrain octave.
const TERRAIN_PERSISTENCE: f64 = 0.5;
/// Frequency growth per terrain octave.
const TERRAIN_LACUNARITY: f64 = 2.0;
/// Sub-seed purpose for the height field.
const HEIGHT_SEED_PURPOSE: u64 = 0x4845_4947_4854;

/// Builds the generator selected in the configuration.
///
/// Tile names are resolved once, here.
///
/// # Errors
///
/// `NoSuchTile` if a configured tile name is not registered.
pub fn build_generator(
    kind: &GeneratorKind,
    registry: &TileRegistry,
) -> Result<Arc<dyn MapGenerator>, RegistryError> {
    Ok(match kind {
        GeneratorKind::Empty => Arc::new(EmptyGenerator),
        GeneratorKind::Flat {
            ground_level,
            layers,
        } => Arc::new(FlatGenerator::from_config(*ground_level, layers, registry)?),
        GeneratorKind::Terrain {
            seed,
            sea_level,
            amplitude,
            scale,
            octaves,
            surface,
            soil,
            soil_depth,
            stone,
            water,
        } => Arc::new(TerrainGenerator {
            noise: SimplexNoise::new(WorldSeed::new(*seed).derive(HEIGHT_SEED_PURPOSE)),
            sea_level: *sea_level,
            amplitude: *amplitude,
            scale: *scale,
            octaves: *octaves,
            surface: registry.id_of(surface)?,
            soil: registry.id_of(soil)?,
            soil_depth: i32::try_from(*soil_depth).unwrap_or(i32::MAX),
            stone: registry.id_of(stone)?,
            water: water.as_deref().map(|name| registry.id_of(name)).transpose()?,
        }),
    })
}

// =============================================================================
// Flat
// =============================================================================

/// Horizontal bands under a fixed ground level.
#[derive(Clone, Debug)]
pub struct FlatGenerator {
    ground_level: i32,
    /// `(lowest y of the band, tile)`, top band first.
    bands: Vec<(i32, TileId)>,
}

impl FlatGenerator {
    /// Creates a flat generator.
    ///
    /// # Arguments
    ///
    /// * `ground_level` - First air y above the top band
    /// * `layers` - `(tile, depth)` from the surface down; the last band
    ///   continues downward forever
    #[must_use]
    pub fn new(ground_level: i32, layers: &[(TileId, u32)]) -> Self {
        let mut top = ground_level;
        let bands = layers
            .iter()
            .map(|&(tile, depth)| {
                top = top.saturating_sub(i32::try_from(depth).unwrap_or(i32::MAX));
                (top, tile)
            })
            .collect();
        Self {
            ground_level,
            bands,
        }
    }

    fn from_config(
        ground_level: i32,
        layers: &[FlatLayer],
        registry: &TileRegistry,
    ) -> Result<Self, RegistryError> {
        let resolved = layers
            .iter()
            .map(|layer| Ok((registry.id_of(&layer.tile)?, layer.depth)))
            .collect::<Result<Vec<_>, RegistryError>>()?;
        Ok(Self::new(ground_level, &resolved))
    }

    /// Tile at height `y` in every column.
    #[must_use]
    pub fn tile_at_height(&self, y: i32) -> Tile {
        if y >= self.ground_level {
            return Tile::AIR;
        }
        self.bands
            .iter()
            .find(|(bottom, _)| y >= *bottom)
            .or_else(|| self.bands.last())
            .map_or(Tile::AIR, |&(_, tile)| Tile::new(tile))
    }
}

impl MapGenerator for FlatGenerator {
    fn generate_region(&self, origin: Coordinate, world: &World) -> WorldResult<Region> {
        let mut region = Region::new(origin, world.id());
        for y in 0..REGION_SIZE {
            let tile = self.tile_at_height(origin.y + y as i32);
            if tile.is_air() {
                continue;
            }
            for z in 0..REGION_SIZE {
                for x in 0..REGION_SIZE {
                    *region.tile_mut(x, y, z) = tile;
                }
            }
        }
        Ok(region)
    }

    fn name(&self) -> &str {
        "flat"
    }
}

// =============================================================================
// Terrain
// =============================================================================

/// Noise heightmap: surface tile on top, a soil band, stone below, water up
/// to sea level.
pub struct TerrainGenerator {
    noise: SimplexNoise,
    sea_level: i32,
    amplitude: f64,
    scale: f64,
    octaves: u32,
    surface: TileId,
    soil: TileId,
    soil_depth: i32,
    stone: TileId,
    water: Option<TileId>,
}

impl TerrainGenerator {
    /// Surface height of the column at `(x, z)`.
    #[must_use]
    pub fn height_at(&self, x: i32, z: i32) -> i32 {
        let n = self.noise.octaved(
            f64::from(x) * self.scale,
            f64::from(z) * self.scale,
            self.octaves,
            TERRAIN_PERSISTENCE,
            TERRAIN_LACUNARITY,
        );
        // Float to int casts saturate; the sum must too.
        self.sea_level.saturating_add((n * self.amplitude).round() as i32)
    }

    fn tile_in_column(&self, y: i32, height: i32) -> Tile {
        if y > height {
            return match self.water {
                Some(water) if y <= self.sea_level => Tile::new(water),
                _ => Tile::AIR,
            };
        }
        if y == height {
            Tile::new(self.surface)
        } else if y >= height.saturating_sub(self.soil_depth) {
            Tile::new(self.soil)
        } else {
            Tile::new(self.stone)
        }
    }
}

impl MapGenerator for TerrainGenerator {
    fn generate_region(&self, origin: Coordinate, world: &World) -> WorldResult<Region> {
        let mut region = Region::new(origin, world.id());
        for z in 0..REGION_SIZE {
            for x in 0..REGION_SIZE {
                let height = self.height_at(origin.x + x as i32, origin.z + z as i32);
                // Whole column above the surface and the water line: stays air.
                if height < origin.y && (self.water.is_none() || self.sea_level < origin.y) {
                    continue;
                }
                for y in 0..REGION_SIZE {
                    *region.tile_mut(x, y, z) = self.tile_in_column(origin.y + y as i32, height);
                }
            }
        }
        Ok(region)
    }

    fn name(&self) -> &str {
        "terrain"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_core::TileEntry;
    use strata_shared::WorldId;

    fn registry() -> TileRegistry {
        let registry = TileRegistry::new();
        for name in ["grass", "dirt", "stone", "water"] {
            registry.register(TileEntry::new("base", name)).unwrap();
        }
        registry
    }

    fn id(registry: &TileRegistry, name: &str) -> TileId {
        registry.id_of(name).unwrap()
    }

    #[test]
    fn test_flat_bands() {
        let registry = registry();
        let grass = id(&registry, "base.grass");
        let stone = id(&registry, "base.stone");
        let flat = FlatGenerator::new(4, &[(grass, 1), (stone, 3)]);

        assert_eq!(flat.tile_at_height(4), Tile::AIR);
        assert_eq!(flat.tile_at_height(3), Tile::new(grass));
        assert_eq!(flat.tile_at_height(2), Tile::new(stone));
        assert_eq!(flat.tile_at_height(0), Tile::new(stone));
        assert_eq!(flat.tile_at_height(-1000), Tile::new(stone));
    }

    #[test]
    fn test_flat_region() {
        let registry = Arc::new(registry());
        let grass = id(&registry, "base.grass");
        let world = World::authoritative(WorldId(0), Arc::clone(&registry));
        let flat = FlatGenerator::new(1, &[(grass, 2)]);

        let region = flat.generate_region(Coordinate::ZERO, &world).unwrap();
        assert_eq!(*region.tile(7, 0, 7), Tile::new(grass));
        assert_eq!(*region.tile(7, 1, 7), Tile::AIR);
        assert_eq!(region.count_non_air(), REGION_SIZE * REGION_SIZE);

        let below = flat.generate_region(Coordinate::new(0, -32, 0), &world).unwrap();
        assert_eq!(below.count_non_air(), strata_shared::REGION_VOLUME);
    }

    #[test]
    fn test_build_from_config() {
        let registry = registry();
        let kind = GeneratorKind::Flat {
            ground_level: 0,
            layers: vec![FlatLayer {
                tile: "base.stone".into(),
                depth: 4,
            }],
        };
        assert_eq!(build_generator(&kind, &registry).unwrap().name(), "flat");

        let missing = GeneratorKind::Flat {
            ground_level: 0,
            layers: vec![FlatLayer {
                tile: "base.marble".into(),
                depth: 4,
            }],
        };
        assert!(build_generator(&missing, &registry).is_err());
    }

    #[test]
    fn test_terrain_extreme_settings() {
        let registry = Arc::new(registry());
        let kind = GeneratorKind::Terrain {
            seed: 3,
            sea_level: i32::MIN + 8,
            amplitude: 1.0e12,
            scale: 0.05,
            octaves: 2,
            surface: "base.grass".into(),
            soil: "base.dirt".into(),
            soil_depth: u32::MAX,
            stone: "base.stone".into(),
            water: None,
        };
        assert!(strata_core::StrataConfig {
            generator: kind.clone(),
            ..Default::default()
        }
        .validate()
        .is_ok());

        let generator = build_generator(&kind, &registry).unwrap();
        let world = World::authoritative(WorldId(0), Arc::clone(&registry));
        for origin in [
            Coordinate::new(0, i32::MIN, 0),
            Coordinate::new(64, -32, 64),
            Coordinate::new(0, i32::MAX, 0).region_origin(),
        ] {
            let region = generator.generate_region(origin, &world).unwrap();
            assert_eq!(region.origin(), origin);
        }
    }

    #[test]
    fn test_terrain_columns() {
        let registry = Arc::new(registry());
        let kind = GeneratorKind::Terrain {
            seed: 7,
            sea_level: 0,
            amplitude: 12.0,
            scale: 0.02,
            octaves: 3,
            surface: "base.grass".into(),
            soil: "base.dirt".into(),
            soil_depth: 2,
            stone: "base.stone".into(),
            water: Some("base.water".into()),
        };
        let generator = build_generator(&kind, &registry).unwrap();
        let world = World::authoritative(WorldId(0), Arc::clone(&registry));

        let deep = generator
            .generate_region(Coordinate::new(0, -64, 0), &world)
            .unwrap();
        assert!(deep
            .tiles()
            .iter()
            .all(|t| t.tile_type == Some(id(&registry, "base.stone"))));

        let sky = generator
            .generate_region(Coordinate::new(0, 64, 0), &world)
            .unwrap();
        assert_eq!(sky.count_non_air(), 0);
    }
}
