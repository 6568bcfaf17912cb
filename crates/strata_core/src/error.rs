//! # Storage Error Types
//!
//! All errors that can occur in the tile storage layer.
//!
//! Out-of-range local tile indices are not represented here: they are
//! caller bugs and panic at the indexing site.

use strata_shared::{Coordinate, WorldId};
use thiserror::Error;

/// Key used when a tile lookup fails.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TileKey {
    /// Lookup by numeric id.
    Id(u32),
    /// Lookup by full name (`namespace.name`).
    Name(String),
}

impl std::fmt::Display for TileKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Id(id) => write!(f, "id {id}"),
            Self::Name(name) => write!(f, "name '{name}'"),
        }
    }
}

/// Errors raised by the tile registry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// A tile with this full name is already registered.
    #[error("duplicate tile registration: {0}")]
    DuplicateName(String),

    /// No registered tile owns this id or name.
    #[error("no such tile: {0}")]
    NoSuchTile(TileKey),

    /// The requested variant is beyond the entry's reserved capacity.
    #[error("variant {variant} out of range for '{name}' (capacity {capacity})")]
    VariantOutOfRange {
        /// Full tile name.
        name: String,
        /// Requested variant.
        variant: u64,
        /// Reserved capacity.
        capacity: u64,
    },

    /// Allocating the entry would push ids past the signed 32-bit wire range.
    #[error("tile id space exhausted: '{name}' needs {requested} ids from cursor {cursor}")]
    IdSpaceExhausted {
        /// Full tile name.
        name: String,
        /// Number of ids the entry asked for.
        requested: u64,
        /// Allocation cursor at the time.
        cursor: u32,
    },
}

/// Errors raised when building a region from raw tiles.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegionError {
    /// The tile buffer does not cover exactly one region.
    #[error("wrong tile count: expected {expected}, got {actual}")]
    WrongTileCount {
        /// `REGION_VOLUME`.
        expected: usize,
        /// Length supplied.
        actual: usize,
    },
}

/// Errors raised while decoding a region stream.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// The stream ended before every slot was filled.
    #[error("region stream truncated at byte {offset}: needed {needed} more bytes")]
    Truncated {
        /// Read position.
        offset: usize,
        /// Bytes missing.
        needed: usize,
    },

    /// A type value is not known to the registry (yet).
    #[error("unknown tile id {id} in region {origin}")]
    UnknownTileId {
        /// The raw id.
        id: u32,
        /// Region being decoded.
        origin: Coordinate,
    },

    /// Negative type value other than the air sentinel.
    #[error("invalid tile type value {value} at byte {offset}")]
    InvalidTypeValue {
        /// The raw value.
        value: i32,
        /// Read position.
        offset: usize,
    },

    /// A run with count zero.
    #[error("zero-length run at byte {offset}")]
    ZeroLengthRun {
        /// Read position.
        offset: usize,
    },

    /// A run that would write past the end of the region.
    #[error("run at byte {offset} overflows region: {filled} + {count} slots")]
    RunOverflow {
        /// Read position.
        offset: usize,
        /// Slots already filled.
        filled: usize,
        /// Run length.
        count: usize,
    },

    /// The header origin is not a region corner.
    #[error("region origin {0} is not aligned to the region grid")]
    UnalignedOrigin(Coordinate),

    /// Bytes left over after both streams were complete.
    #[error("{0} trailing bytes after region stream")]
    TrailingBytes(usize),
}

impl CodecError {
    /// Returns true if retrying after the registry catches up may succeed.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::UnknownTileId { .. })
    }
}

/// Errors raised by world orchestration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WorldError {
    /// Region needs generating but no generator is attached.
    #[error("{0} has no map generator attached")]
    NoGenerator(WorldId),

    /// A second mutator tried to bind to the world.
    #[error("{0} already has a mutator attached")]
    MutatorAlreadyPresent(WorldId),

    /// The region holding a coordinate is not loaded.
    #[error("region {0} is not loaded")]
    RegionNotLoaded(Coordinate),

    /// The generator failed.
    #[error("generation of region {origin} failed: {reason}")]
    Generation {
        /// Region being generated.
        origin: Coordinate,
        /// Generator message.
        reason: String,
    },

    /// `load_region` was called from inside this world's generator.
    #[error("region {0} requested while generating; generators read loaded regions only")]
    LoadDuringGeneration(Coordinate),

    /// A generator, store or peer handed back a region for another origin.
    #[error("expected region {expected}, got region {actual}")]
    OriginMismatch {
        /// Requested origin.
        expected: Coordinate,
        /// Origin of the region received.
        actual: Coordinate,
    },

    /// A message addressed to another world.
    #[error("message for {actual} delivered to {expected}")]
    WorldMismatch {
        /// This world.
        expected: WorldId,
        /// World named by the message.
        actual: WorldId,
    },

    /// Operation needs an authoritative world.
    #[error("{0} is a replica")]
    NotAuthoritative(WorldId),

    /// Operation needs a replica world.
    #[error("{0} is authoritative")]
    NotReplica(WorldId),

    /// The request channel to the authoritative peer is closed.
    #[error("{0} lost its authoritative peer")]
    PeerDisconnected(WorldId),

    /// Region store failure.
    #[error("region storage: {0}")]
    Storage(String),

    /// Region stream could not be decoded.
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// Registry lookup failed.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// Region construction failed.
    #[error(transparent)]
    Region(#[from] RegionError),
}

impl WorldError {
    /// Returns true if the failure is an unknown tile id that may resolve after
    /// the registry is synchronized.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        match self {
            Self::Codec(err) => err.is_recoverable(),
            _ => false,
        }
    }
}

/// Result type for world operations.
pub type WorldResult<T> = Result<T, WorldError>;

/// Errors raised while loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config {path}: {source}")]
    Io {
        /// File path.
        path: String,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid TOML for this schema.
    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value parsed but makes no sense.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}
