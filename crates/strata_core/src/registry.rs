//! # Tile Registry
//!
//! Allocates tile type ids and maps them back to entries.
//!
//! ## Id Ranges
//!
//! Every entry owns a contiguous range `[base, base + capacity]`:
//!
//! ```text
//! id:     0     1       2 ......... 9     10
//!         air   stone   wheat (cap 7)     next entry
//! ```
//!
//! Id `0` is never allocated. Any id inside a range resolves to its entry and
//! `id - base` is the packed variant. Ranges are handed out by a monotonic
//! cursor, so the entry list is always sorted by base and decoding an id is a
//! range search over the bases.
//!
//! ## Thread Safety
//!
//! Entries are registered at startup and read from every thread afterwards.
//! State lives behind a `parking_lot::RwLock`; share the registry as
//! `Arc<TileRegistry>`.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::error::{RegistryError, TileKey};
use crate::events::{EventBus, RegistryEvent, Subscription};
use crate::tile::{TileEntry, TileId};

/// Highest id that still fits the signed 32-bit region wire format.
const MAX_TILE_ID: u64 = i32::MAX as u64;

/// Ordered list of entries, enough to rebuild an identical registry.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrySnapshot {
    /// Entries in registration order.
    pub entries: Vec<TileEntry>,
}

struct RegistryState {
    /// `(base, entry)`, ascending by base.
    entries: Vec<(u32, Arc<TileEntry>)>,
    /// Full name to base id.
    by_name: HashMap<String, TileId>,
    /// Next base id to hand out.
    cursor: u32,
}

impl RegistryState {
    fn new() -> Self {
        Self {
            entries: Vec::new(),
            by_name: HashMap::new(),
            cursor: 1,
        }
    }

    fn register(&mut self, entry: TileEntry) -> Result<(TileId, Arc<TileEntry>), RegistryError> {
        let name = entry.full_name();
        if self.by_name.contains_key(&name) {
            return Err(RegistryError::DuplicateName(name));
        }

        let base = self.cursor;
        let Some(last) = u64::from(base)
            .checked_add(entry.variant_capacity())
            .filter(|last| *last <= MAX_TILE_ID)
        else {
            return Err(RegistryError::IdSpaceExhausted {
                name,
                requested: entry.id_span(),
                cursor: base,
            });
        };
        let Some(id) = TileId::new(base) else {
            unreachable!("cursor starts at 1 and only grows");
        };

        // `last + 1 <= i32::MAX + 1`, fits in u32.
        self.cursor = (last + 1) as u32;
        let entry = Arc::new(entry);
        self.entries.push((base, Arc::clone(&entry)));
        self.by_name.insert(name, id);
        Ok((id, entry))
    }

    /// Index into `entries` of the range holding `id`.
    fn locate(&self, id: u32) -> Option<usize> {
        if id == 0 || id >= self.cursor {
            return None;
        }
        // First entry whose base is above `id`; the owner is just before it.
        let above = self.entries.partition_point(|(base, _)| *base <= id);
        let slot = above.checked_sub(1)?;
        let end = self.entries.get(slot + 1).map_or(self.cursor, |(base, _)| *base);
        (id < end).then_some(slot)
    }
}

/// Allocates and resolves tile ids.
pub struct TileRegistry {
    state: RwLock<RegistryState>,
    events: EventBus<RegistryEvent>,
}

impl TileRegistry {
    /// Creates an empty registry. The first entry gets id `1`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: RwLock::new(RegistryState::new()),
            events: EventBus::new(),
        }
    }

    /// Registers `entry` and returns its base id.
    ///
    /// The entry owns `variant_capacity + 1` consecutive ids.
    ///
    /// # Errors
    ///
    /// `DuplicateName` if the full name is taken, `IdSpaceExhausted` if the
    /// range would not fit the wire format.
    pub fn register(&self, entry: TileEntry) -> Result<TileId, RegistryError> {
        let (id, entry) = self.state.write().register(entry)?;
        tracing::trace!("registered tile {} as {}", entry.full_name(), id);
        self.events.publish(&RegistryEvent::EntryAdded { entry, id });
        Ok(id)
    }

    /// Entry owning `id`.
    ///
    /// # Errors
    ///
    /// `NoSuchTile` if no registered range contains `id`.
    pub fn resolve(&self, id: TileId) -> Result<Arc<TileEntry>, RegistryError> {
        self.resolve_variant(id).map(|(entry, _)| entry)
    }

    /// Entry owning `id` and the variant packed into it (`id - base`).
    ///
    /// # Errors
    ///
    /// `NoSuchTile` if no registered range contains `id`.
    pub fn resolve_variant(&self, id: TileId) -> Result<(Arc<TileEntry>, u64), RegistryError> {
        let state = self.state.read();
        let slot = state
            .locate(id.get())
            .ok_or(RegistryError::NoSuchTile(TileKey::Id(id.get())))?;
        let (base, entry) = &state.entries[slot];
        Ok((Arc::clone(entry), u64::from(id.get() - base)))
    }

    /// Base id of the entry named `full_name`.
    ///
    /// # Errors
    ///
    /// `NoSuchTile` if the name is not registered.
    pub fn id_of(&self, full_name: &str) -> Result<TileId, RegistryError> {
        self.state
            .read()
            .by_name
            .get(full_name)
            .copied()
            .ok_or_else(|| RegistryError::NoSuchTile(TileKey::Name(full_name.to_owned())))
    }

    /// Id encoding `variant` of the entry named `full_name`.
    ///
    /// # Errors
    ///
    /// `NoSuchTile` if the name is unknown, `VariantOutOfRange` if `variant`
    /// exceeds the entry's capacity.
    pub fn variant_id(&self, full_name: &str, variant: u64) -> Result<TileId, RegistryError> {
        let base = self.id_of(full_name)?;
        let (entry, _) = self.resolve_variant(base)?;
        if variant > entry.variant_capacity() {
            return Err(RegistryError::VariantOutOfRange {
                name: full_name.to_owned(),
                variant,
                capacity: entry.variant_capacity(),
            });
        }
        // Bounded by the allocated range, which fits in i32.
        let raw = u64::from(base.get()) + variant;
        TileId::new(raw as u32).ok_or(RegistryError::NoSuchTile(TileKey::Id(0)))
    }

    /// Returns true if some entry owns `raw` (`0 < raw < next_id`).
    #[must_use]
    pub fn is_known(&self, raw: u32) -> bool {
        raw != 0 && raw < self.state.read().cursor
    }

    /// Next base id that would be handed out.
    #[must_use]
    pub fn next_id(&self) -> u32 {
        self.state.read().cursor
    }

    /// Number of registered entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.state.read().entries.len()
    }

    /// Returns true if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state.read().entries.is_empty()
    }

    /// `(base id, entry)` pairs in ascending id order.
    #[must_use]
    pub fn entries(&self) -> Vec<(TileId, Arc<TileEntry>)> {
        self.state
            .read()
            .entries
            .iter()
            .filter_map(|(base, entry)| TileId::new(*base).map(|id| (id, Arc::clone(entry))))
            .collect()
    }

    /// Captures the registration order for a replica.
    #[must_use]
    pub fn snapshot(&self) -> RegistrySnapshot {
        RegistrySnapshot {
            entries: self
                .state
                .read()
                .entries
                .iter()
                .map(|(_, entry)| TileEntry::clone(entry))
                .collect(),
        }
    }

    /// Replaces every entry with the authoritative list in `snapshot`.
    ///
    /// Readers see either the old table or the complete new one. Subscribers
    /// get `Cleared` followed by one `EntryAdded` per entry.
    ///
    /// # Errors
    ///
    /// Fails if the snapshot itself holds duplicates or overflows the id
    /// space; the registry then holds only the entries before the bad one.
    pub fn apply_snapshot(&self, snapshot: RegistrySnapshot) -> Result<(), RegistryError> {
        let mut added = Vec::with_capacity(snapshot.entries.len());
        let result = {
            let mut state = self.state.write();
            *state = RegistryState::new();
            snapshot
                .entries
                .into_iter()
                .try_for_each(|entry| state.register(entry).map(|pair| added.push(pair)))
        };

        tracing::debug!("registry resynchronized with {} entries", added.len());
        self.events.publish(&RegistryEvent::Cleared);
        for (id, entry) in added {
            self.events.publish(&RegistryEvent::EntryAdded { entry, id });
        }
        result
    }

    /// Subscribes to registry changes.
    #[must_use]
    pub fn subscribe(&self) -> Subscription<RegistryEvent> {
        self.events.subscribe()
    }
}

impl Default for TileRegistry {
    fn default() -> Self {
        Self::new()
    }
}
