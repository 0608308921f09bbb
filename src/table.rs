//! The table manager: owns the segment array, current batch, size
//! counters, and threshold; orchestrates lookup, removal, and
//! resize-with-rehash; exposes the public map contract.
//!
//! Grounded on the teacher's `SekejapDB` (`db.rs`): a fallible constructor
//! that validates its inputs up front, owns every collaborator it
//! allocates, and exposes typed accessors over them. `SekejapDB::new`
//! returns `io::Result<Self>`; here construction can fail on bad
//! parameters instead of I/O, so it returns `Result<Self, MapError>`.

use std::fmt;
use std::hash::{BuildHasher, BuildHasherDefault, Hash};

use crate::entry::Entry;
use crate::error::MapError;
use crate::iter::Iter;
use crate::layout;
use crate::nullable::NullableKey;
use crate::scheduler::{self, InsertOutcome};
use crate::segment::Segment;
use crate::views::{EntrySet, KeySet, Values};

/// The default hash builder: `seahash`, already a dependency of the
/// teacher crate (used there to hash slug strings in `db.rs`), wrapped the
/// same way `rustc-hash`/`fxhash` expose themselves via
/// `BuildHasherDefault`.
pub type DefaultHashBuilder = BuildHasherDefault<seahash::SeaHasher>;

#[inline]
fn fold_hash(h: u64) -> u32 {
    (h ^ (h >> 32)) as u32
}

/// An associative container implementing elastic hashing: open addressing
/// across a sequence of geometrically shrinking segments, with bounded
/// worst-case insertion cost and no entry relocation once placed.
///
/// See the crate-level documentation for the algorithm. `δ` (the load-gap
/// parameter) is fixed for the container's lifetime.
pub struct ElasticMap<K, V, S = DefaultHashBuilder> {
    segments: Vec<Segment<K, V>>,
    batch: usize,
    size: usize,
    delta: f64,
    total_capacity: usize,
    threshold: usize,
    rehashing: bool,
    hash_builder: S,
}

impl<K, V> ElasticMap<K, V, DefaultHashBuilder> {
    /// Creates a map with the given initial capacity and load-gap
    /// parameter, using the default hasher.
    pub fn new(initial_capacity: usize, delta: f64) -> Result<Self, MapError> {
        Self::with_capacity_and_hasher(initial_capacity, delta, DefaultHashBuilder::default())
    }
}

impl<K, V, S> ElasticMap<K, V, S>
where
    S: Default,
{
    /// Creates a map with the given initial capacity and load-gap
    /// parameter, using `S`'s default instance.
    pub fn with_capacity_and_delta(initial_capacity: usize, delta: f64) -> Result<Self, MapError> {
        Self::with_capacity_and_hasher(initial_capacity, delta, S::default())
    }
}

impl<K, V, S> ElasticMap<K, V, S> {
    /// Creates a map with the given initial capacity, load-gap parameter,
    /// and hash builder.
    ///
    /// Fails if `initial_capacity == 0` or `delta` does not lie strictly
    /// between 0 and 1.
    pub fn with_capacity_and_hasher(
        initial_capacity: usize,
        delta: f64,
        hash_builder: S,
    ) -> Result<Self, MapError> {
        if initial_capacity == 0 {
            return Err(MapError::InvalidCapacity(initial_capacity));
        }
        if !(delta > 0.0 && delta < 1.0) {
            return Err(MapError::InvalidDelta(delta));
        }

        let caps = layout::segment_capacities(initial_capacity);
        let total_capacity: usize = caps.iter().sum();
        let segments = caps.into_iter().map(Segment::new).collect();
        let threshold = Self::compute_threshold(total_capacity, delta);

        Ok(Self {
            segments,
            batch: 0,
            size: 0,
            delta,
            total_capacity,
            threshold,
            rehashing: false,
            hash_builder,
        })
    }

    fn compute_threshold(total_capacity: usize, delta: f64) -> usize {
        total_capacity - ((delta * total_capacity as f64).floor() as usize)
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Total slot capacity across all segments (after layout rounding).
    pub fn capacity(&self) -> usize {
        self.total_capacity
    }

    /// Iterates live `(&K, &V)` pairs in segment-then-slot order. Not
    /// stable across resizes.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter::new(&self.segments)
    }
}

impl<K, V, S> ElasticMap<K, V, S>
where
    K: Eq + Hash + NullableKey,
    S: BuildHasher,
{
    fn hash_of<Q: Hash + ?Sized>(&self, key: &Q) -> u64 {
        self.hash_builder.hash_one(key)
    }

    /// Finds the live slot for `key`, if any. Stops scanning a probe chain
    /// the moment it hits an empty slot — proof the key isn't further down
    /// that chain — and never looks past `min(s, b+2)` segments, the
    /// furthest a key could plausibly have landed given the current batch.
    ///
    /// A segment `A_i` (`i >= 1`) can hold entries placed two different
    /// ways: as the *current* segment of batch `i` (Case 3, probed with
    /// base-index `i`), or as the *next* segment injected into from batch
    /// `i - 1` (Case 1/2, probed with base-index `i - 1` — see
    /// `scheduler::insert`). Both chains must be walked independently, each
    /// with its own empty-slot termination, or injected entries become
    /// unreachable.
    fn locate(&self, hash64: u64, hash32: u32, key: &K) -> Option<(usize, usize)> {
        let scan_limit = (self.batch + 2).min(self.segments.len());
        for seg_idx in 0..scan_limit {
            let segment = &self.segments[seg_idx];
            let cap = segment.capacity();

            if seg_idx == 0 {
                // probe(0, j, h) is independent of j, so segment 0 only
                // ever has one candidate slot regardless of how many
                // probes we'd nominally try.
                let idx = crate::probe::slot_index(0, 1, hash32, cap);
                if let Some(entry) = segment.slot(idx) {
                    if entry.hash == hash64 && &entry.key == key {
                        return Some((seg_idx, idx));
                    }
                }
                continue;
            }

            for base in [seg_idx as u32, seg_idx as u32 - 1] {
                for j in 1..=cap as u32 {
                    let idx = crate::probe::slot_index(base, j, hash32, cap);
                    match segment.slot(idx) {
                        None => break,
                        Some(entry) => {
                            if entry.hash == hash64 && &entry.key == key {
                                return Some((seg_idx, idx));
                            }
                        }
                    }
                }
            }
        }
        None
    }

    /// Returns a reference to the value mapped to `key`, if present.
    pub fn get(&self, key: &K) -> Result<Option<&V>, MapError> {
        if key.is_null_key() {
            return Err(MapError::NullKey);
        }
        let h64 = self.hash_of(key);
        let h32 = fold_hash(h64);
        Ok(self.locate(h64, h32, key).map(|(s, i)| &self.segments[s].slot(i).as_ref().unwrap().value))
    }

    /// `get(key).is_some()`.
    pub fn contains_key(&self, key: &K) -> Result<bool, MapError> {
        Ok(self.get(key)?.is_some())
    }

    /// Linear scan for `value` among all live values.
    pub fn contains_value(&self, value: &V) -> bool
    where
        V: PartialEq,
    {
        self.iter().any(|(_, v)| v == value)
    }

    /// Inserts `key => value`, overwriting and returning the previous
    /// value if `key` was already present. Grows the table first if
    /// `size >= threshold`.
    pub fn put(&mut self, key: K, value: V) -> Result<Option<V>, MapError> {
        if key.is_null_key() {
            return Err(MapError::NullKey);
        }
        let h64 = self.hash_of(&key);
        let h32 = fold_hash(h64);

        if let Some((seg_idx, slot_idx)) = self.locate(h64, h32, &key) {
            let slot = self.segments[seg_idx].slot_mut(slot_idx);
            let entry = slot.as_mut().expect("locate returned an occupied slot");
            return Ok(Some(std::mem::replace(&mut entry.value, value)));
        }

        if self.size >= self.threshold {
            log::debug!("size {} >= threshold {}, resizing before insert", self.size, self.threshold);
            self.resize(self.total_capacity * 2)?;
        }

        self.insert_new(h64, h32, key, value)?;
        self.size += 1;
        Ok(None)
    }

    /// Places a brand new `(key, value)` pair via the insertion scheduler,
    /// resizing and retrying as many times as the scheduler asks for it.
    fn insert_new(&mut self, h64: u64, h32: u32, key: K, value: V) -> Result<(), MapError> {
        let mut key = key;
        let mut value = value;
        loop {
            let outcome = scheduler::insert(
                &mut self.segments,
                &mut self.batch,
                self.delta,
                self.rehashing,
                h32,
                h64,
                key,
                value,
            )?;
            match outcome {
                InsertOutcome::Placed(_) => return Ok(()),
                InsertOutcome::NeedsResize(k, v) => {
                    log::debug!("batch 0 collision, resizing and retrying insert");
                    self.resize(self.total_capacity * 2)?;
                    key = k;
                    value = v;
                }
            }
        }
    }

    /// Removes and returns the value mapped to `key`, if present.
    ///
    /// Leaves the vacated slot empty rather than tombstoned: a later
    /// lookup for a *different* key whose probe chain passed through this
    /// slot will stop early and report "not found" even if that key is
    /// present further down its chain. This is the documented tradeoff of
    /// reorderless open addressing, not a bug.
    pub fn remove(&mut self, key: &K) -> Result<Option<V>, MapError> {
        if key.is_null_key() {
            return Err(MapError::NullKey);
        }
        let h64 = self.hash_of(key);
        let h32 = fold_hash(h64);
        match self.locate(h64, h32, key) {
            Some((seg_idx, slot_idx)) => {
                let removed = self.segments[seg_idx].vacate(slot_idx);
                self.size -= 1;
                Ok(removed.map(|e| e.value))
            }
            None => Ok(None),
        }
    }

    /// Empties every segment, resetting size and batch. Capacity and
    /// segment layout are preserved.
    pub fn clear(&mut self) {
        for segment in &mut self.segments {
            segment.clear();
        }
        self.size = 0;
        self.batch = 0;
    }

    /// Grows capacity in advance if `self.len() + other.len()` would
    /// exceed the threshold, then inserts every pair from `other`
    /// individually.
    pub fn put_all(&mut self, other: &ElasticMap<K, V, S>) -> Result<(), MapError>
    where
        K: Clone,
        V: Clone,
    {
        let projected = self.size + other.size;
        if projected > self.threshold {
            let new_capacity = (2 * self.total_capacity).max(((4 * projected) as f64 / 3.0).ceil() as usize);
            self.resize(new_capacity)?;
        }
        for (k, v) in other.iter() {
            self.put(k.clone(), v.clone())?;
        }
        Ok(())
    }

    /// Rebuilds the table at (at least) `new_capacity`, rehashing every
    /// live entry. Entry order during rehash is segment-index then
    /// slot-index, matching iteration order.
    fn resize(&mut self, new_capacity: usize) -> Result<(), MapError> {
        log::debug!("resizing table: total_capacity {} -> at least {new_capacity}", self.total_capacity);
        let caps = layout::segment_capacities(new_capacity);
        let new_total_capacity: usize = caps.iter().sum();
        let new_segments: Vec<Segment<K, V>> = caps.into_iter().map(Segment::new).collect();

        let old_segments = std::mem::replace(&mut self.segments, new_segments);
        let old_size = self.size;

        self.batch = 0;
        self.size = 0;
        self.total_capacity = new_total_capacity;
        self.threshold = Self::compute_threshold(new_total_capacity, self.delta);
        self.rehashing = true;

        for segment in old_segments.into_iter() {
            for entry in segment.into_iter_entries() {
                let Entry { key, value, hash, .. } = entry;
                let h32 = fold_hash(hash);
                self.insert_new(hash, h32, key, value)?;
                self.size += 1;
            }
        }

        self.rehashing = false;

        if self.size != old_size {
            return Err(MapError::RehashSizeMismatch { expected: old_size, actual: self.size });
        }
        Ok(())
    }

    /// Point-in-time snapshot of all keys.
    pub fn keys(&self) -> KeySet<K>
    where
        K: Clone,
    {
        KeySet::new(self.iter().map(|(k, _)| k.clone()).collect())
    }

    /// Point-in-time snapshot of all values.
    pub fn values(&self) -> Values<V>
    where
        V: Clone,
    {
        Values::new(self.iter().map(|(_, v)| v.clone()).collect())
    }

    /// Point-in-time snapshot of all `(key, value)` pairs.
    pub fn entries(&self) -> EntrySet<K, V>
    where
        K: Clone,
        V: Clone,
    {
        EntrySet::new(self.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
    }

    /// Sum, over every live entry, of `key_hash XOR value_hash` —
    /// consistent with the standard mapping contract (order-independent,
    /// since addition commutes).
    pub fn content_hash(&self) -> u64
    where
        K: Hash,
        V: Hash,
    {
        self.iter().fold(0u64, |acc, (k, v)| {
            let kh = self.hash_builder.hash_one(k);
            let vh = self.hash_builder.hash_one(v);
            acc.wrapping_add(kh ^ vh)
        })
    }
}

impl<K, V, S> PartialEq for ElasticMap<K, V, S>
where
    K: Eq + Hash + NullableKey,
    V: PartialEq,
    S: BuildHasher,
{
    fn eq(&self, other: &Self) -> bool {
        if self.size != other.size {
            return false;
        }
        self.iter().all(|(k, v)| {
            let h64 = other.hash_of(k);
            let h32 = fold_hash(h64);
            match other.locate(h64, h32, k) {
                Some((s, i)) => &other.segments[s].slot(i).as_ref().unwrap().value == v,
                None => false,
            }
        })
    }
}

impl<K, V, S> Eq for ElasticMap<K, V, S>
where
    K: Eq + Hash + NullableKey,
    V: Eq,
    S: BuildHasher,
{
}

impl<K, V, S> fmt::Display for ElasticMap<K, V, S>
where
    K: fmt::Display,
    V: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (k, v)) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{k}={v}")?;
        }
        write!(f, "}}")
    }
}

impl<'a, K, V, S> IntoIterator for &'a ElasticMap<K, V, S> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K, V, S> fmt::Debug for ElasticMap<K, V, S>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}
