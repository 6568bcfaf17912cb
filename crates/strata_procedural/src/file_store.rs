//! # Region Files
//!
//! One file per region: `<root>/world.<id>/r.<x>.<y>.<z>.strata`, where
//! `x y z` is the region origin. Contents are the region codec bytes,
//! optionally wrapped in `lz4_flex::compress_prepend_size`.
//!
//! Writes go to a uniquely named `.tmp` sibling first and are renamed into
//! place, so a crash mid-write leaves the previous file intact and concurrent
//! saves of one region never share a temp file.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use lz4_flex::{compress_prepend_size, decompress_size_prepended};
use strata_core::{RegionStore, WorldError, WorldResult};
use strata_shared::{Coordinate, WorldId};

/// File extension of region files.
pub const REGION_FILE_EXTENSION: &str = "strata";

/// Per-process sequence for temp file names.
static TEMP_SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Directory-backed [`RegionStore`].
#[derive(Clone, Debug)]
pub struct FileRegionStore {
    root: PathBuf,
    compress: bool,
}

impl FileRegionStore {
    /// Store rooted at `root`. Directories are created on first save.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, compress: bool) -> Self {
        Self {
            root: root.into(),
            compress,
        }
    }

    /// Root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding one world's regions.
    #[must_use]
    pub fn world_dir(&self, world: WorldId) -> PathBuf {
        self.root.join(format!("world.{}", world.0))
    }

    /// File holding the region at `origin`.
    #[must_use]
    pub fn region_path(&self, world: WorldId, origin: Coordinate) -> PathBuf {
        let origin = origin.region_origin();
        self.world_dir(world).join(format!(
            "r.{}.{}.{}.{REGION_FILE_EXTENSION}",
            origin.x, origin.y, origin.z
        ))
    }
}

fn storage_error(path: &Path, err: impl std::fmt::Display) -> WorldError {
    WorldError::Storage(format!("{}: {err}", path.display()))
}

impl RegionStore for FileRegionStore {
    fn load(&self, world: WorldId, origin: Coordinate) -> WorldResult<Option<Vec<u8>>> {
        let path = self.region_path(world, origin);
        let raw = match std::fs::read(&path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(storage_error(&path, err)),
        };

        let bytes = if self.compress {
            decompress_size_prepended(&raw).map_err(|err| storage_error(&path, err))?
        } else {
            raw
        };
        tracing::trace!("read {} ({} bytes)", path.display(), bytes.len());
        Ok(Some(bytes))
    }

    fn save(&self, world: WorldId, origin: Coordinate, bytes: &[u8]) -> WorldResult<()> {
        let dir = self.world_dir(world);
        std::fs::create_dir_all(&dir).map_err(|err| storage_error(&dir, err))?;

        let path = self.region_path(world, origin);
        let tmp = path.with_extension(format!(
            "{REGION_FILE_EXTENSION}.{}.{}.tmp",
            std::process::id(),
            TEMP_SEQUENCE.fetch_add(1, Ordering::Relaxed)
        ));
        let written = if self.compress {
            std::fs::write(&tmp, compress_prepend_size(bytes))
        } else {
            std::fs::write(&tmp, bytes)
        };
        if let Err(err) = written.and_then(|()| std::fs::rename(&tmp, &path)) {
            std::fs::remove_file(&tmp).ok();
            return Err(storage_error(&path, err));
        }

        tracing::trace!("wrote {}", path.display());
        Ok(())
    }
}
