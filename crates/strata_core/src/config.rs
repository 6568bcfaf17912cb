//! # Configuration
//!
//! Startup settings read from TOML. Every field has a default, so an empty
//! file is a valid configuration.
//!
//! ```toml
//! [world]
//! policy = "immediate"
//!
//! [generator]
//! kind = "flat"
//! ground_level = 0
//! layers = [{ tile = "base.grass", depth = 1 }, { tile = "base.stone", depth = 8 }]
//!
//! [storage]
//! directory = "saves/overworld"
//!
//! [[tiles]]
//! namespace = "base"
//! name = "stone"
//! opaque = true
//! solid = true
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::tile::TileEntry;
use crate::world::LoadPolicy;

const DEFAULT_SEA_LEVEL: i32 = 0;
const DEFAULT_TERRAIN_AMPLITUDE: f64 = 24.0;
const DEFAULT_TERRAIN_SCALE: f64 = 0.01;
const DEFAULT_TERRAIN_OCTAVES: u32 = 4;
const DEFAULT_SOIL_DEPTH: u32 = 3;

/// Root of the configuration file.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrataConfig {
    /// World behaviour.
    pub world: WorldConfig,
    /// Map generator for authoritative worlds.
    pub generator: GeneratorKind,
    /// Region persistence.
    pub storage: StorageConfig,
    /// Tile types, registered in file order.
    pub tiles: Vec<TileEntry>,
}

/// `[world]` table.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// What `get_tile` does on a miss.
    pub policy: LoadPolicy,
}

/// `[storage]` table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory for region files. `None` keeps regions in memory only.
    pub directory: Option<PathBuf>,
    /// Compress region files with LZ4.
    pub compress: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            directory: None,
            compress: true,
        }
    }
}

/// One band of a flat world.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlatLayer {
    /// Full tile name (`namespace.name`).
    pub tile: String,
    /// Thickness in tiles.
    pub depth: u32,
}

/// `[generator]` table. Selects one of the built-in generators.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GeneratorKind {
    /// Every region is air.
    #[default]
    Empty,
    /// Horizontal bands stacked downward from `ground_level`.
    Flat {
        /// Y of the first air tile above the top layer.
        #[serde(default)]
        ground_level: i32,
        /// Bands from the surface down. The last band extends forever.
        layers: Vec<FlatLayer>,
    },
    /// Noise heightmap with soil over stone and water up to sea level.
    Terrain {
        /// Noise seed.
        #[serde(default)]
        seed: u64,
        /// Water fills air at or below this height.
        #[serde(default = "default_sea_level")]
        sea_level: i32,
        /// Peak height offset in tiles.
        #[serde(default = "default_amplitude")]
        amplitude: f64,
        /// Horizontal noise frequency.
        #[serde(default = "default_scale")]
        scale: f64,
        /// Noise octaves.
        #[serde(default = "default_octaves")]
        octaves: u32,
        /// Top tile of each column.
        surface: String,
        /// Tiles right under the surface.
        soil: String,
        /// Thickness of the soil band.
        #[serde(default = "default_soil_depth")]
        soil_depth: u32,
        /// Everything deeper.
        stone: String,
        /// Fills air below sea level. No water if unset.
        #[serde(default)]
        water: Option<String>,
    },
}

const fn default_sea_level() -> i32 {
    DEFAULT_SEA_LEVEL
}

const fn default_amplitude() -> f64 {
    DEFAULT_TERRAIN_AMPLITUDE
}

const fn default_scale() -> f64 {
    DEFAULT_TERRAIN_SCALE
}

const fn default_octaves() -> u32 {
    DEFAULT_TERRAIN_OCTAVES
}

const fn default_soil_depth() -> u32 {
    DEFAULT_SOIL_DEPTH
}

impl StrataConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// `Parse` for malformed TOML, `Invalid` for values that parse but make no sense.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    ///
    /// # Errors
    ///
    /// `Io` if the file cannot be read, otherwise as [`from_toml_str`](Self::from_toml_str).
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!(
            "loaded config {} ({} tiles)",
            path.display(),
            config.tiles.len()
        );
        Ok(config)
    }

    /// Checks cross-field constraints serde cannot express.
    ///
    /// # Errors
    ///
    /// `Invalid` naming the first offending value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match &self.generator {
            GeneratorKind::Empty => {}
            GeneratorKind::Flat { layers, .. } => {
                if layers.is_empty() {
                    return Err(ConfigError::Invalid("flat generator needs at least one layer".into()));
                }
                if let Some(layer) = layers.iter().find(|l| l.depth == 0) {
                    return Err(ConfigError::Invalid(format!(
                        "flat layer '{}' has zero depth",
                        layer.tile
                    )));
                }
            }
            GeneratorKind::Terrain {
                scale,
                amplitude,
                octaves,
                ..
            } => {
                if !(scale.is_finite() && *scale > 0.0) {
                    return Err(ConfigError::Invalid(format!("terrain scale {scale} must be positive")));
                }
                if !(amplitude.is_finite() && *amplitude >= 0.0) {
                    return Err(ConfigError::Invalid(format!(
                        "terrain amplitude {amplitude} must be non-negative"
                    )));
                }
                if *octaves == 0 {
                    return Err(ConfigError::Invalid("terrain needs at least one octave".into()));
                }
            }
        }
        Ok(())
    }
}
