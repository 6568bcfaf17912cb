//! # World
//!
//! Owns the loaded regions of one world and brings new ones in on demand.
//!
//! ## Locking
//!
//! `regions` is a single `RwLock` over the origin map. Readers hold it only
//! for the map lookup; loads hold the write lock only around the insert.
//! Generation and decoding run with no lock held, so different origins load
//! in parallel. Two loads of the same origin race to the insert: the first
//! one wins and the later region is dropped ([`LoadOutcome::Discarded`]).
//!
//! Each region sits behind its own `RwLock` so the world's single mutator can
//! edit tiles while readers take short read guards. Unloading holds the
//! region's write guard from the encode until the map entry is gone, so an
//! edit lands either in the persisted bytes or in the reloaded region.
//!
//! `Loaded` and `Unloaded` are published under the map write lock, so events
//! for one origin arrive in the order the map changed.
//!
//! Generators run on the loading thread. While one runs, reads through
//! [`World::get_tile`] on that thread never load, and
//! [`World::load_region`] fails with `LoadDuringGeneration`.

use std::cell::RefCell;
use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use crossbeam_channel::Sender;
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use strata_shared::{Coordinate, Direction, RegionPush, RegionRequest, WorldId};
use tracing::{debug, trace};

use crate::codec::RegionCodec;
use crate::error::{WorldError, WorldResult};
use crate::events::{EventBus, LoadSource, RegionEvent, Subscription};
use crate::generator::MapGenerator;
use crate::region::Region;
use crate::registry::TileRegistry;
use crate::store::RegionStore;
use crate::tile::Tile;

/// Pre-allocated capacity of the region map.
const INITIAL_REGION_CAPACITY: usize = 256;

thread_local! {
    /// Worlds whose generator is running on this thread.
    static GENERATING: RefCell<Vec<WorldId>> = const { RefCell::new(Vec::new()) };
}

/// Marks a world as generating on the current thread until dropped.
struct GenerationScope(WorldId);

impl GenerationScope {
    fn enter(world: WorldId) -> Self {
        GENERATING.with(|active| active.borrow_mut().push(world));
        Self(world)
    }

    fn is_active(world: WorldId) -> bool {
        GENERATING.with(|active| active.borrow().contains(&world))
    }
}

impl Drop for GenerationScope {
    fn drop(&mut self) {
        GENERATING.with(|active| {
            let mut active = active.borrow_mut();
            if let Some(pos) = active.iter().rposition(|world| *world == self.0) {
                active.remove(pos);
            }
        });
    }
}

/// Shared handle to one loaded region.
pub type RegionHandle = Arc<RwLock<Region>>;

/// Whether this world owns its content or mirrors a peer.
#[derive(Clone, Debug)]
pub enum WorldRole {
    /// Generates, restores and persists its own regions.
    Authoritative,
    /// Requests regions from an authoritative peer.
    Replica {
        /// Outgoing request queue towards the peer.
        requests: Sender<RegionRequest>,
    },
}

/// What `get_tile` does when the region is missing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadPolicy {
    /// Load the region synchronously on the calling thread.
    #[default]
    Immediate,
    /// Never load; report the tile as unavailable.
    LoadedOnly,
}

/// Result of a load attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Built by the map generator and inserted.
    Generated,
    /// Decoded from the region store and inserted.
    Restored,
    /// Decoded from a peer push and inserted.
    Received,
    /// The region was already present; nothing ran.
    AlreadyLoaded,
    /// Another load inserted the same origin first; this result was dropped.
    Discarded,
    /// Replica only: a request went (or was already on its way) to the peer.
    Requested,
}

impl From<LoadSource> for LoadOutcome {
    fn from(source: LoadSource) -> Self {
        match source {
            LoadSource::Generated => Self::Generated,
            LoadSource::Restored => Self::Restored,
            LoadSource::Received => Self::Received,
        }
    }
}

/// Lifetime counters for one world.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WorldStats {
    /// Regions produced by the generator and inserted.
    pub generated: u64,
    /// Regions decoded from the store and inserted.
    pub restored: u64,
    /// Regions decoded from peer pushes and inserted.
    pub received: u64,
    /// Loaded regions dropped because another load won.
    pub discarded: u64,
    /// Regions removed by `unload_region`.
    pub unloaded: u64,
    /// Requests sent to the authoritative peer.
    pub requested: u64,
    /// Region encodings written to the store.
    pub saved: u64,
}

#[derive(Default)]
struct Counters {
    generated: AtomicU64,
    restored: AtomicU64,
    received: AtomicU64,
    discarded: AtomicU64,
    unloaded: AtomicU64,
    requested: AtomicU64,
    saved: AtomicU64,
}

impl Counters {
    fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn snapshot(&self) -> WorldStats {
        WorldStats {
            generated: self.generated.load(Ordering::Relaxed),
            restored: self.restored.load(Ordering::Relaxed),
            received: self.received.load(Ordering::Relaxed),
            discarded: self.discarded.load(Ordering::Relaxed),
            unloaded: self.unloaded.load(Ordering::Relaxed),
            requested: self.requested.load(Ordering::Relaxed),
            saved: self.saved.load(Ordering::Relaxed),
        }
    }
}

/// One world: its loaded regions plus the collaborators that fill them.
pub struct World {
    id: WorldId,
    role: WorldRole,
    policy: LoadPolicy,
    registry: Arc<TileRegistry>,
    regions: RwLock<HashMap<Coordinate, RegionHandle>>,
    generator: RwLock<Option<Arc<dyn MapGenerator>>>,
    store: RwLock<Option<Arc<dyn RegionStore>>>,
    /// Origins already requested from the peer and not yet received.
    pending: Mutex<HashSet<Coordinate>>,
    /// Origins edited since the last `Updated` flush.
    dirty: Mutex<HashSet<Coordinate>>,
    mutator_bound: AtomicBool,
    events: EventBus<RegionEvent>,
    counters: Counters,
}

impl World {
    /// Creates an empty world.
    ///
    /// # Arguments
    ///
    /// * `id` - Identifier, also stamped into every region
    /// * `registry` - Registry shared with every other world of the context
    /// * `role` - Authoritative or replica
    /// * `policy` - What `get_tile` does on a miss
    #[must_use]
    pub fn new(
        id: WorldId,
        registry: Arc<TileRegistry>,
        role: WorldRole,
        policy: LoadPolicy,
    ) -> Self {
        Self {
            id,
            role,
            policy,
            registry,
            regions: RwLock::new(HashMap::with_capacity(INITIAL_REGION_CAPACITY)),
            generator: RwLock::new(None),
            store: RwLock::new(None),
            pending: Mutex::new(HashSet::new()),
            dirty: Mutex::new(HashSet::new()),
            mutator_bound: AtomicBool::new(false),
            events: EventBus::new(),
            counters: Counters::default(),
        }
    }

    /// Authoritative world with the immediate load policy.
    #[must_use]
    pub fn authoritative(id: WorldId, registry: Arc<TileRegistry>) -> Self {
        Self::new(id, registry, WorldRole::Authoritative, LoadPolicy::Immediate)
    }

    /// Replica world sending its requests on `requests`.
    #[must_use]
    pub fn replica(id: WorldId, registry: Arc<TileRegistry>, requests: Sender<RegionRequest>) -> Self {
        Self::new(id, registry, WorldRole::Replica { requests }, LoadPolicy::Immediate)
    }

    /// World identifier.
    #[inline]
    #[must_use]
    pub const fn id(&self) -> WorldId {
        self.id
    }

    /// Role of this world.
    #[must_use]
    pub const fn role(&self) -> &WorldRole {
        &self.role
    }

    /// Returns true unless this world is a replica.
    #[inline]
    #[must_use]
    pub const fn is_authoritative(&self) -> bool {
        matches!(self.role, WorldRole::Authoritative)
    }

    /// Load policy for `get_tile` misses.
    #[must_use]
    pub const fn policy(&self) -> LoadPolicy {
        self.policy
    }

    /// Registry used to resolve and validate tile ids.
    #[must_use]
    pub fn registry(&self) -> &Arc<TileRegistry> {
        &self.registry
    }

    /// Attaches (or replaces) the map generator.
    pub fn set_generator(&self, generator: Arc<dyn MapGenerator>) {
        debug!("{} using generator '{}'", self.id, generator.name());
        *self.generator.write() = Some(generator);
    }

    /// Attaches (or replaces) the region store.
    pub fn set_store(&self, store: Arc<dyn RegionStore>) {
        *self.store.write() = Some(store);
    }

    /// Returns true if a generator is attached.
    #[must_use]
    pub fn has_generator(&self) -> bool {
        self.generator.read().is_some()
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Tile at an absolute coordinate, loading its region per the load policy.
    ///
    /// Load failures are logged and reported as `None`; use
    /// [`try_get_tile`](Self::try_get_tile) to see them.
    #[must_use]
    pub fn get_tile(&self, coord: Coordinate) -> Option<Tile> {
        match self.try_get_tile(coord) {
            Ok(tile) => tile,
            Err(err) => {
                debug!("{} could not provide tile at {}: {}", self.id, coord, err);
                None
            }
        }
    }

    /// Like [`get_tile`](Self::get_tile) but propagates load errors.
    ///
    /// Called from inside this world's generator it behaves like
    /// [`get_loaded_tile`](Self::get_loaded_tile).
    ///
    /// # Errors
    ///
    /// Whatever [`load_region`](Self::load_region) returns.
    pub fn try_get_tile(&self, coord: Coordinate) -> WorldResult<Option<Tile>> {
        if let Some(tile) = self.get_loaded_tile(coord) {
            return Ok(Some(tile));
        }
        if self.is_generating() {
            return Ok(None);
        }
        match self.policy {
            LoadPolicy::LoadedOnly => Ok(None),
            LoadPolicy::Immediate => {
                self.load_region(coord)?;
                // Replicas return here with the request still in flight.
                Ok(self.get_loaded_tile(coord))
            }
        }
    }

    /// Tile at an absolute coordinate if its region is loaded. Never loads.
    #[inline]
    #[must_use]
    pub fn get_loaded_tile(&self, coord: Coordinate) -> Option<Tile> {
        let region = self.region_handle(coord.region_origin())?;
        let tile = *region.read().tile_at(coord.local_index());
        Some(tile)
    }

    /// The six axis neighbors of `coord` in [`Direction::ALL`] order.
    ///
    /// Offsets that leave the region are resolved in the adjacent region,
    /// which is loaded per the load policy (never from inside a generator).
    #[must_use]
    pub fn get_neighbor_tiles(&self, coord: Coordinate) -> [Option<Tile>; 6] {
        Direction::ALL.map(|dir| self.get_tile(coord.neighbor(dir)))
    }

    /// Neighbors restricted to loaded regions. Safe to call from a generator.
    #[must_use]
    pub fn get_loaded_neighbor_tiles(&self, coord: Coordinate) -> [Option<Tile>; 6] {
        Direction::ALL.map(|dir| self.get_loaded_tile(coord.neighbor(dir)))
    }

    /// Runs `f` against a loaded region without cloning it.
    pub fn with_region<F, R>(&self, origin: Coordinate, f: F) -> Option<R>
    where
        F: FnOnce(&Region) -> R,
    {
        let region = self.region_handle(origin.region_origin())?;
        let guard = region.read();
        Some(f(&*guard))
    }

    /// Returns true if the region holding `coord` is loaded.
    #[must_use]
    pub fn is_loaded(&self, coord: Coordinate) -> bool {
        self.regions.read().contains_key(&coord.region_origin())
    }

    /// Returns true if a replica request for this region is in flight.
    #[must_use]
    pub fn is_pending(&self, coord: Coordinate) -> bool {
        self.pending.lock().contains(&coord.region_origin())
    }

    /// Origins of every loaded region, in no particular order.
    #[must_use]
    pub fn loaded_origins(&self) -> Vec<Coordinate> {
        self.regions.read().keys().copied().collect()
    }

    /// Number of loaded regions.
    #[must_use]
    pub fn region_count(&self) -> usize {
        self.regions.read().len()
    }

    /// Lifetime counters.
    #[must_use]
    pub fn stats(&self) -> WorldStats {
        self.counters.snapshot()
    }

    /// Returns true while this world's generator runs on the calling thread.
    #[must_use]
    pub fn is_generating(&self) -> bool {
        GenerationScope::is_active(self.id)
    }

    // =========================================================================
    // Loading
    // =========================================================================

    /// Makes the region holding `origin` available.
    ///
    /// Authoritative worlds restore from the store, else generate. Replicas
    /// send one request to the peer and return; the region arrives through
    /// [`receive_region_push`](Self::receive_region_push).
    ///
    /// # Errors
    ///
    /// * `NoGenerator` - nothing stored and no generator attached
    /// * `Codec` - the stored encoding is corrupt or uses unknown ids
    /// * `OriginMismatch` / `WorldMismatch` - a collaborator returned the wrong region
    /// * `PeerDisconnected` - the replica request channel is closed
    /// * `LoadDuringGeneration` - called from inside this world's generator
    /// * anything the generator or store returns
    pub fn load_region(&self, origin: Coordinate) -> WorldResult<LoadOutcome> {
        let origin = origin.region_origin();
        if self.is_loaded(origin) {
            return Ok(LoadOutcome::AlreadyLoaded);
        }
        if self.is_generating() {
            return Err(WorldError::LoadDuringGeneration(origin));
        }

        match &self.role {
            WorldRole::Replica { requests } => self.request_region(origin, requests),
            WorldRole::Authoritative => {
                let (region, source) = match self.restore(origin)? {
                    Some(region) => (region, LoadSource::Restored),
                    None => (self.generate(origin)?, LoadSource::Generated),
                };
                Ok(self.insert(region, source))
            }
        }
    }

    fn request_region(
        &self,
        origin: Coordinate,
        requests: &Sender<RegionRequest>,
    ) -> WorldResult<LoadOutcome> {
        if !self.pending.lock().insert(origin) {
            return Ok(LoadOutcome::Requested);
        }
        if requests.send(RegionRequest::new(self.id, origin)).is_err() {
            self.pending.lock().remove(&origin);
            return Err(WorldError::PeerDisconnected(self.id));
        }
        Counters::bump(&self.counters.requested);
        trace!("{} requested region {}", self.id, origin);
        Ok(LoadOutcome::Requested)
    }

    fn restore(&self, origin: Coordinate) -> WorldResult<Option<Region>> {
        let Some(store) = self.store.read().clone() else {
            return Ok(None);
        };
        let Some(bytes) = store.load(self.id, origin)? else {
            return Ok(None);
        };
        let region = RegionCodec::decode(&bytes, &self.registry, self.id)?;
        if region.origin() != origin {
            return Err(WorldError::OriginMismatch {
                expected: origin,
                actual: region.origin(),
            });
        }
        Ok(Some(region))
    }

    fn generate(&self, origin: Coordinate) -> WorldResult<Region> {
        let generator = self
            .generator
            .read()
            .clone()
            .ok_or(WorldError::NoGenerator(self.id))?;

        trace!("{} generating region {}", self.id, origin);
        let region = {
            let _scope = GenerationScope::enter(self.id);
            generator.generate_region(origin, self)?
        };
        if region.origin() != origin {
            return Err(WorldError::OriginMismatch {
                expected: origin,
                actual: region.origin(),
            });
        }
        if region.world() != self.id {
            return Err(WorldError::WorldMismatch {
                expected: self.id,
                actual: region.world(),
            });
        }
        Ok(region)
    }

    /// Inserts unless the origin is already present (first insert wins).
    fn insert(&self, region: Region, source: LoadSource) -> LoadOutcome {
        let origin = region.origin();
        let inserted = match self.regions.write().entry(origin) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(Arc::new(RwLock::new(region)));
                // Still under the map write guard.
                self.events.publish(&RegionEvent::Loaded {
                    world: self.id,
                    origin,
                    source,
                });
                true
            }
        };
        if !inserted {
            Counters::bump(&self.counters.discarded);
            debug!("{} discarded duplicate load of region {}", self.id, origin);
            return LoadOutcome::Discarded;
        }

        Counters::bump(match source {
            LoadSource::Generated => &self.counters.generated,
            LoadSource::Restored => &self.counters.restored,
            LoadSource::Received => &self.counters.received,
        });
        debug!("{} loaded region {} ({:?})", self.id, origin, source);
        source.into()
    }

    // =========================================================================
    // Unloading and persistence
    // =========================================================================

    /// Evicts a region.
    ///
    /// Authoritative worlds persist it first when a store is attached. The
    /// region's write guard is held from the encode to the removal, so the
    /// mutator cannot slip an edit in between. `Unloaded` is published by the
    /// one call that removes the region, just before the entry goes.
    ///
    /// Returns `false` if the region was not loaded (or another unload won).
    ///
    /// # Errors
    ///
    /// Store failures; the region stays loaded.
    pub fn unload_region(&self, origin: Coordinate) -> WorldResult<bool> {
        let origin = origin.region_origin();
        let Some(handle) = self.region_handle(origin) else {
            return Ok(false);
        };

        let region = handle.write();
        if !self.is_current(origin, &handle) {
            return Ok(false);
        }
        if self.is_authoritative() {
            self.persist(origin, &region)?;
        }

        {
            let mut regions = self.regions.write();
            self.events.publish(&RegionEvent::Unloaded {
                world: self.id,
                origin,
            });
            regions.remove(&origin);
        }
        drop(region);

        self.dirty.lock().remove(&origin);
        Counters::bump(&self.counters.unloaded);
        debug!("{} unloaded region {}", self.id, origin);
        Ok(true)
    }

    /// Writes one loaded region to the store.
    ///
    /// Returns `false` if no store is attached or an unload got there first.
    ///
    /// # Errors
    ///
    /// `NotAuthoritative` on replicas, `RegionNotLoaded`, or store failures.
    pub fn save_region(&self, origin: Coordinate) -> WorldResult<bool> {
        if !self.is_authoritative() {
            return Err(WorldError::NotAuthoritative(self.id));
        }
        let origin = origin.region_origin();
        let handle = self
            .region_handle(origin)
            .ok_or(WorldError::RegionNotLoaded(origin))?;
        self.persist_live(origin, &handle)
    }

    /// Writes every loaded region to the store. Returns how many were written.
    ///
    /// # Errors
    ///
    /// `NotAuthoritative` on replicas, or the first store failure.
    pub fn save_all(&self) -> WorldResult<usize> {
        if !self.is_authoritative() {
            return Err(WorldError::NotAuthoritative(self.id));
        }
        let handles: Vec<(Coordinate, RegionHandle)> = self
            .regions
            .read()
            .iter()
            .map(|(origin, region)| (*origin, Arc::clone(region)))
            .collect();

        let mut saved = 0;
        for (origin, handle) in handles {
            if self.persist_live(origin, &handle)? {
                saved += 1;
            }
        }
        Ok(saved)
    }

    /// Persists `handle` unless an unload retired it while we waited.
    fn persist_live(&self, origin: Coordinate, handle: &RegionHandle) -> WorldResult<bool> {
        let region = handle.read();
        if !self.is_current(origin, handle) {
            return Ok(false);
        }
        self.persist(origin, &region)
    }

    fn persist(&self, origin: Coordinate, region: &Region) -> WorldResult<bool> {
        let Some(store) = self.store.read().clone() else {
            return Ok(false);
        };
        let bytes = RegionCodec::encode(region);
        store.save(self.id, origin, &bytes)?;
        Counters::bump(&self.counters.saved);
        trace!("{} saved region {} ({} bytes)", self.id, origin, bytes.len());
        Ok(true)
    }

    // =========================================================================
    // Replication
    // =========================================================================

    /// Replica side: decodes a push from the peer and inserts it.
    ///
    /// On `UnknownTileId` the request stays pending; synchronize the registry
    /// and call again with the same push.
    ///
    /// # Errors
    ///
    /// `WorldMismatch`, `NotReplica`, `OriginMismatch`, or a codec error.
    pub fn receive_region_push(&self, push: &RegionPush) -> WorldResult<LoadOutcome> {
        if push.world != self.id {
            return Err(WorldError::WorldMismatch {
                expected: self.id,
                actual: push.world,
            });
        }
        if self.is_authoritative() {
            return Err(WorldError::NotReplica(self.id));
        }

        let expected = push.origin.region_origin();
        let region = match RegionCodec::decode(&push.payload, &self.registry, self.id) {
            Ok(region) => region,
            Err(err) => {
                debug!("{} rejected push for region {}: {}", self.id, expected, err);
                return Err(err.into());
            }
        };
        if region.origin() != expected {
            return Err(WorldError::OriginMismatch {
                expected,
                actual: region.origin(),
            });
        }

        self.pending.lock().remove(&expected);
        Ok(self.insert(region, LoadSource::Received))
    }

    /// Authoritative side: loads the requested region if needed and encodes it.
    ///
    /// # Errors
    ///
    /// `WorldMismatch`, `NotAuthoritative`, or any load error.
    pub fn serve_region_request(&self, request: RegionRequest) -> WorldResult<RegionPush> {
        if request.world != self.id {
            return Err(WorldError::WorldMismatch {
                expected: self.id,
                actual: request.world,
            });
        }
        if !self.is_authoritative() {
            return Err(WorldError::NotAuthoritative(self.id));
        }

        let origin = request.origin.region_origin();
        self.load_region(origin)?;
        let payload = self
            .with_region(origin, RegionCodec::encode)
            .ok_or(WorldError::RegionNotLoaded(origin))?;
        trace!("{} serving region {} ({} bytes)", self.id, origin, payload.len());
        Ok(RegionPush {
            world: self.id,
            origin,
            payload,
        })
    }

    // =========================================================================
    // Subscriptions
    // =========================================================================

    /// Subscribes to every region event of this world.
    #[must_use]
    pub fn subscribe(&self) -> Subscription<RegionEvent> {
        self.events.subscribe()
    }

    /// Subscribes to events about one region.
    #[must_use]
    pub fn subscribe_region(&self, origin: Coordinate) -> Subscription<RegionEvent> {
        let origin = origin.region_origin();
        self.events
            .subscribe_filtered(move |event: &RegionEvent| event.origin() == origin)
    }

    // =========================================================================
    // Mutator plumbing
    // =========================================================================

    pub(crate) fn region_handle(&self, origin: Coordinate) -> Option<RegionHandle> {
        self.regions.read().get(&origin).cloned()
    }

    /// Returns true if `handle` is still the map entry for `origin`.
    ///
    /// Callers hold the region guard, so the answer cannot change under them:
    /// removal happens only with the region's write guard held.
    pub(crate) fn is_current(&self, origin: Coordinate, handle: &RegionHandle) -> bool {
        self.regions
            .read()
            .get(&origin)
            .is_some_and(|live| Arc::ptr_eq(live, handle))
    }

    pub(crate) fn try_bind_mutator(&self) -> WorldResult<()> {
        self.mutator_bound
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| ())
            .map_err(|_| WorldError::MutatorAlreadyPresent(self.id))
    }

    pub(crate) fn release_mutator(&self) {
        self.mutator_bound.store(false, Ordering::Release);
    }

    /// Returns true while a `WorldMutator` is attached.
    #[must_use]
    pub fn has_mutator(&self) -> bool {
        self.mutator_bound.load(Ordering::Acquire)
    }

    pub(crate) fn mark_dirty(&self, origin: Coordinate) {
        self.dirty.lock().insert(origin);
    }

    /// Publishes one `Updated` per dirty region still loaded.
    pub(crate) fn flush_dirty(&self) -> usize {
        let dirty: Vec<Coordinate> = self.dirty.lock().drain().collect();
        let mut flushed = 0;
        for origin in dirty {
            if !self.is_loaded(origin) {
                continue;
            }
            self.events.publish(&RegionEvent::Updated {
                world: self.id,
                origin,
            });
            flushed += 1;
        }
        flushed
    }
}

impl std::fmt::Debug for World {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("World")
            .field("id", &self.id)
            .field("authoritative", &self.is_authoritative())
            .field("policy", &self.policy)
            .field("regions", &self.region_count())
            .finish_non_exhaustive()
    }
}
