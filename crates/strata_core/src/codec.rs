//! # Region Codec
//!
//! Run-length encoded region format used for persistence and network pushes.
//!
//! ## Format (little-endian)
//!
//! ```text
//! origin_x: i32
//! origin_y: i32
//! origin_z: i32
//! type_runs:   repeated { value: i32, count: u16 }   until REGION_VOLUME slots
//! damage_runs: repeated { value: i64, count: u32 }   until REGION_VOLUME slots
//! ```
//!
//! Both streams walk the flat tile array in layout order. Air is written as
//! [`AIR_WIRE_VALUE`]; the registry's reserved id `0` never appears on the wire.

use strata_shared::{Coordinate, WorldId, AIR_WIRE_VALUE, REGION_VOLUME};

use crate::error::CodecError;
use crate::region::Region;
use crate::registry::TileRegistry;
use crate::tile::TileId;

/// Bytes taken by the origin header.
pub const HEADER_LEN: usize = 12;
/// Bytes per type run.
pub const TYPE_RUN_LEN: usize = 6;
/// Bytes per damage run.
pub const DAMAGE_RUN_LEN: usize = 12;

const TYPE_RUN_MAX: usize = u16::MAX as usize;
const DAMAGE_RUN_MAX: usize = u32::MAX as usize;

/// Stateless encoder/decoder for regions.
pub struct RegionCodec;

impl RegionCodec {
    /// Encodes a region.
    #[must_use]
    pub fn encode(region: &Region) -> Vec<u8> {
        let type_runs = runs(
            region.tiles().iter().map(|t| TileId::to_wire(t.tile_type)),
            TYPE_RUN_MAX,
        );
        let damage_runs = runs(region.tiles().iter().map(|t| t.damage), DAMAGE_RUN_MAX);

        let mut buf = Vec::with_capacity(
            HEADER_LEN + type_runs.len() * TYPE_RUN_LEN + damage_runs.len() * DAMAGE_RUN_LEN,
        );
        let origin = region.origin();
        buf.extend_from_slice(&origin.x.to_le_bytes());
        buf.extend_from_slice(&origin.y.to_le_bytes());
        buf.extend_from_slice(&origin.z.to_le_bytes());

        for (value, count) in type_runs {
            buf.extend_from_slice(&value.to_le_bytes());
            buf.extend_from_slice(&u16::try_from(count).unwrap_or(u16::MAX).to_le_bytes());
        }
        for (value, count) in damage_runs {
            buf.extend_from_slice(&value.to_le_bytes());
            buf.extend_from_slice(&u32::try_from(count).unwrap_or(u32::MAX).to_le_bytes());
        }

        tracing::trace!("encoded region {} into {} bytes", origin, buf.len());
        buf
    }

    /// Size [`encode`](Self::encode) would produce, without allocating.
    #[must_use]
    pub fn encoded_len(region: &Region) -> usize {
        let type_runs = count_runs(region.tiles().iter().map(|t| t.tile_type), TYPE_RUN_MAX);
        let damage_runs = count_runs(region.tiles().iter().map(|t| t.damage), DAMAGE_RUN_MAX);
        HEADER_LEN + type_runs * TYPE_RUN_LEN + damage_runs * DAMAGE_RUN_LEN
    }

    /// Reads only the origin header.
    ///
    /// # Errors
    ///
    /// `Truncated` if fewer than [`HEADER_LEN`] bytes are given.
    pub fn peek_origin(bytes: &[u8]) -> Result<Coordinate, CodecError> {
        ByteReader::new(bytes).origin()
    }

    /// Decodes a region, resolving every type id against `registry`.
    ///
    /// Nothing is fabricated: the first bad run aborts the decode.
    ///
    /// # Arguments
    ///
    /// * `bytes` - Encoded region
    /// * `registry` - Registry the ids were allocated from
    /// * `world` - World the decoded region will belong to
    ///
    /// # Errors
    ///
    /// * `UnknownTileId` - recoverable once the registry is synchronized
    /// * `Truncated`, `ZeroLengthRun`, `RunOverflow`, `InvalidTypeValue`,
    ///   `UnalignedOrigin`, `TrailingBytes` - the stream is corrupt
    pub fn decode(
        bytes: &[u8],
        registry: &TileRegistry,
        world: WorldId,
    ) -> Result<Region, CodecError> {
        let mut reader = ByteReader::new(bytes);
        let origin = reader.origin()?;
        if !origin.is_region_origin() {
            return Err(CodecError::UnalignedOrigin(origin));
        }

        let mut region = Region::new(origin, world);
        let tiles = region.tiles_mut();

        let mut filled = 0;
        while filled < REGION_VOLUME {
            let offset = reader.offset;
            let value = i32::from_le_bytes(reader.take()?);
            let count = usize::from(u16::from_le_bytes(reader.take()?));
            check_run(offset, filled, count)?;

            let tile_type = match value {
                AIR_WIRE_VALUE => None,
                v if v < 0 => return Err(CodecError::InvalidTypeValue { value: v, offset }),
                v => {
                    let raw = v.unsigned_abs();
                    match TileId::new(raw) {
                        Some(id) if registry.is_known(raw) => Some(id),
                        _ => return Err(CodecError::UnknownTileId { id: raw, origin }),
                    }
                }
            };
            for tile in &mut tiles[filled..filled + count] {
                tile.tile_type = tile_type;
            }
            filled += count;
        }

        filled = 0;
        while filled < REGION_VOLUME {
            let offset = reader.offset;
            let value = i64::from_le_bytes(reader.take()?);
            let count = u32::from_le_bytes(reader.take()?) as usize;
            check_run(offset, filled, count)?;

            for tile in &mut tiles[filled..filled + count] {
                tile.damage = value;
            }
            filled += count;
        }

        let rest = reader.remaining();
        if rest > 0 {
            return Err(CodecError::TrailingBytes(rest));
        }

        tracing::trace!("decoded region {} for {}", origin, world);
        Ok(region)
    }
}

fn check_run(offset: usize, filled: usize, count: usize) -> Result<(), CodecError> {
    if count == 0 {
        return Err(CodecError::ZeroLengthRun { offset });
    }
    if filled + count > REGION_VOLUME {
        return Err(CodecError::RunOverflow {
            offset,
            filled,
            count,
        });
    }
    Ok(())
}

/// Collapses `values` into `(value, length)` runs no longer than `max_run`.
/// The final run is always flushed.
fn runs<T: Copy + PartialEq>(values: impl Iterator<Item = T>, max_run: usize) -> Vec<(T, usize)> {
    let mut out = Vec::new();
    let mut current: Option<(T, usize)> = None;
    for value in values {
        current = match current {
            Some((v, n)) if v == value && n < max_run => Some((v, n + 1)),
            Some(run) => {
                out.push(run);
                Some((value, 1))
            }
            None => Some((value, 1)),
        };
    }
    if let Some(run) = current {
        out.push(run);
    }
    out
}

fn count_runs<T: PartialEq>(values: impl Iterator<Item = T>, max_run: usize) -> usize {
    let mut n = 0;
    let mut current: Option<(T, usize)> = None;
    for value in values {
        current = match current {
            Some((v, len)) if v == value && len < max_run => Some((v, len + 1)),
            _ => {
                n += 1;
                Some((value, 1))
            }
        };
    }
    n
}

struct ByteReader<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> ByteReader<'a> {
    const fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, offset: 0 }
    }

    fn take<const N: usize>(&mut self) -> Result<[u8; N], CodecError> {
        let end = self.offset + N;
        let Some(chunk) = self.bytes.get(self.offset..end) else {
            return Err(CodecError::Truncated {
                offset: self.offset,
                needed: end - self.bytes.len(),
            });
        };
        let mut out = [0u8; N];
        out.copy_from_slice(chunk);
        self.offset = end;
        Ok(out)
    }

    fn origin(&mut self) -> Result<Coordinate, CodecError> {
        let x = i32::from_le_bytes(self.take()?);
        let y = i32::from_le_bytes(self.take()?);
        let z = i32::from_le_bytes(self.take()?);
        Ok(Coordinate::new(x, y, z))
    }

    const fn remaining(&self) -> usize {
        self.bytes.len() - self.offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tile::{Tile, TileEntry};

    fn registry() -> (TileRegistry, TileId, TileId) {
        let registry = TileRegistry::new();
        let stone = registry.register(TileEntry::new("base", "stone")).unwrap();
        let wheat = registry
            .register(TileEntry::new("base", "wheat").with_variants(7))
            .unwrap();
        (registry, stone, wheat)
    }

    fn header(origin: Coordinate) -> Vec<u8> {
        let mut buf = Vec::new();
        buf.extend_from_slice(&origin.x.to_le_bytes());
        buf.extend_from_slice(&origin.y.to_le_bytes());
        buf.extend_from_slice(&origin.z.to_le_bytes());
        buf
    }

    fn push_type_run(buf: &mut Vec<u8>, value: i32, count: u16) {
        buf.extend_from_slice(&value.to_le_bytes());
        buf.extend_from_slice(&count.to_le_bytes());
    }

    fn push_damage_run(buf: &mut Vec<u8>, value: i64, count: u32) {
        buf.extend_from_slice(&value.to_le_bytes());
        buf.extend_from_slice(&count.to_le_bytes());
    }

    const VOLUME_U16: u16 = REGION_VOLUME as u16;
    const VOLUME_U32: u32 = REGION_VOLUME as u32;

    #[test]
    fn test_round_trip_preserves_everything() {
        let (registry, stone, wheat) = registry();
        let wheat_ripe = registry.variant_id("base.wheat", 5).unwrap();
        let mut region = Region::new(Coordinate::new(-32, 64, 0), WorldId(3));
        for x in 0..8 {
            *region.tile_mut(x, 0, 0) = Tile::new(stone);
        }
        *region.tile_mut(4, 1, 0) = Tile::new(wheat).with_damage(2);
        *region.tile_mut(4, 2, 0) = Tile::new(wheat_ripe).with_damage(-9);
        *region.tile_mut(31, 31, 31) = Tile::AIR.with_damage(i64::MAX);

        let bytes = RegionCodec::encode(&region);
        assert_eq!(bytes.len(), RegionCodec::encoded_len(&region));

        let decoded = RegionCodec::decode(&bytes, &registry, WorldId(3)).unwrap();
        assert_eq!(decoded, region);
        assert_eq!(decoded.origin(), Coordinate::new(-32, 64, 0));
    }

    #[test]
    fn test_uniform_air_is_single_run_each() {
        let region = Region::new(Coordinate::ZERO, WorldId(0));
        let bytes = RegionCodec::encode(&region);

        let mut expected = header(Coordinate::ZERO);
        push_type_run(&mut expected, -1, VOLUME_U16);
        push_damage_run(&mut expected, 0, VOLUME_U32);
        assert_eq!(bytes, expected);
        assert_eq!(bytes.len(), HEADER_LEN + TYPE_RUN_LEN + DAMAGE_RUN_LEN);
    }

    #[test]
    fn test_runs_split_at_max() {
        let out = runs([1, 1, 1, 1, 1, 2].into_iter(), 2);
        assert_eq!(out, vec![(1, 2), (1, 2), (1, 1), (2, 1)]);
        assert!(runs(std::iter::empty::<u8>(), 4).is_empty());
    }

    #[test]
    fn test_truncated_stream_is_fatal() {
        let (registry, ..) = registry();
        let region = Region::new(Coordinate::ZERO, WorldId(0));
        let bytes = RegionCodec::encode(&region);

        let err = RegionCodec::decode(&bytes[..bytes.len() - 4], &registry, WorldId(0)).unwrap_err();
        assert!(matches!(err, CodecError::Truncated { needed: 4, .. }));
        assert!(!err.is_recoverable());

        let err = RegionCodec::decode(&bytes[..5], &registry, WorldId(0)).unwrap_err();
        assert_eq!(err, CodecError::Truncated { offset: 4, needed: 3 });
    }

    #[test]
    fn test_unknown_id_is_recoverable() {
        let (registry, ..) = registry();
        let mut bytes = header(Coordinate::ZERO);
        push_type_run(&mut bytes, 10, VOLUME_U16);
        push_damage_run(&mut bytes, 0, VOLUME_U32);

        let err = RegionCodec::decode(&bytes, &registry, WorldId(0)).unwrap_err();
        assert_eq!(
            err,
            CodecError::UnknownTileId {
                id: 10,
                origin: Coordinate::ZERO
            }
        );
        assert!(err.is_recoverable());

        // Registry catches up, same bytes now decode.
        registry.register(TileEntry::new("base", "dirt")).unwrap();
        let region = RegionCodec::decode(&bytes, &registry, WorldId(0)).unwrap();
        assert_eq!(region.count_non_air(), REGION_VOLUME);
    }

    #[test]
    fn test_reserved_zero_is_unknown() {
        let (registry, ..) = registry();
        let mut bytes = header(Coordinate::ZERO);
        push_type_run(&mut bytes, 0, VOLUME_U16);
        push_damage_run(&mut bytes, 0, VOLUME_U32);
        let err = RegionCodec::decode(&bytes, &registry, WorldId(0)).unwrap_err();
        assert!(matches!(err, CodecError::UnknownTileId { id: 0, .. }));
    }

    #[test]
    fn test_malformed_runs() {
        let (registry, ..) = registry();

        let mut negative = header(Coordinate::ZERO);
        push_type_run(&mut negative, -7, VOLUME_U16);
        assert_eq!(
            RegionCodec::decode(&negative, &registry, WorldId(0)).unwrap_err(),
            CodecError::InvalidTypeValue {
                value: -7,
                offset: HEADER_LEN
            }
        );

        let mut zero = header(Coordinate::ZERO);
        push_type_run(&mut zero, -1, 0);
        assert_eq!(
            RegionCodec::decode(&zero, &registry, WorldId(0)).unwrap_err(),
            CodecError::ZeroLengthRun { offset: HEADER_LEN }
        );

        let mut overflow = header(Coordinate::ZERO);
        push_type_run(&mut overflow, -1, VOLUME_U16 - 1);
        push_type_run(&mut overflow, -1, 2);
        assert!(matches!(
            RegionCodec::decode(&overflow, &registry, WorldId(0)).unwrap_err(),
            CodecError::RunOverflow { count: 2, .. }
        ));
    }

    #[test]
    fn test_trailing_bytes_and_alignment() {
        let (registry, ..) = registry();
        let mut bytes = RegionCodec::encode(&Region::new(Coordinate::ZERO, WorldId(0)));
        bytes.push(0xFF);
        assert_eq!(
            RegionCodec::decode(&bytes, &registry, WorldId(0)).unwrap_err(),
            CodecError::TrailingBytes(1)
        );

        let mut unaligned = header(Coordinate::new(1, 0, 0));
        push_type_run(&mut unaligned, -1, VOLUME_U16);
        push_damage_run(&mut unaligned, 0, VOLUME_U32);
        assert_eq!(
            RegionCodec::decode(&unaligned, &registry, WorldId(0)).unwrap_err(),
            CodecError::UnalignedOrigin(Coordinate::new(1, 0, 0))
        );
    }

    #[test]
    fn test_peek_origin() {
        let bytes = RegionCodec::encode(&Region::new(Coordinate::new(96, -32, 0), WorldId(0)));
        assert_eq!(RegionCodec::peek_origin(&bytes), Ok(Coordinate::new(96, -32, 0)));
    }

    #[test]
    fn test_round_trip_random_regions() {
        use rand::{Rng, SeedableRng};
        use rand_chacha::ChaCha8Rng;

        let (registry, stone, _) = registry();
        let mut palette = vec![None, Some(stone)];
        palette.extend((0..=7).map(|v| Some(registry.variant_id("base.wheat", v).unwrap())));
        let damages = [0, 1, -1, i64::MIN, i64::MAX, i64::MIN + 1];

        let check = |region: &Region| {
            let bytes = RegionCodec::encode(region);
            assert_eq!(bytes.len(), RegionCodec::encoded_len(region));
            let decoded = RegionCodec::decode(&bytes, &registry, region.world()).unwrap();
            assert_eq!(decoded.origin(), region.origin());
            assert_eq!(decoded.tiles(), region.tiles());
        };

        // Every slot differs from its predecessor in both streams.
        let mut alternating = Region::new(Coordinate::new(-64, 32, -96), WorldId(1));
        for (i, tile) in alternating.tiles_mut().iter_mut().enumerate() {
            *tile = Tile {
                tile_type: palette[i % palette.len()],
                damage: damages[i % damages.len()],
            };
        }
        check(&alternating);

        let mut rng = ChaCha8Rng::seed_from_u64(0x5354_5241_5441);
        for round in 0..16u32 {
            let origin = Coordinate::new(
                rng.gen_range(-100_000..100_000),
                rng.gen_range(-100_000..100_000),
                rng.gen_range(-100_000..100_000),
            )
            .region_origin();
            let mut region = Region::new(origin, WorldId(round));
            // Higher rounds repeat the previous tile more often: longer runs.
            let repeat = f64::from(round) / 16.0;
            let mut current = Tile::AIR;
            for tile in region.tiles_mut() {
                if !rng.gen_bool(repeat) {
                    current = Tile {
                        tile_type: palette[rng.gen_range(0..palette.len())],
                        damage: if rng.gen_bool(0.5) {
                            damages[rng.gen_range(0..damages.len())]
                        } else {
                            rng.gen()
                        },
                    };
                }
                *tile = current;
            }
            check(&region);
        }
    }
}
