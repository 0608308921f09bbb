//! The unit of storage: a key, a value, and the cached hash/placement
//! metadata the probe engine needs to avoid re-hashing on every lookup.
//!
//! Purely an internal storage type: no public operation returns an
//! `Entry`, so it carries no public accessors either.

/// An immutable key plus mutable value plus cached key-hash.
///
/// `segment_index` and `probe_count` record where the entry was placed.
/// They are set once at insertion time and never mutated afterward; they
/// exist for diagnostics only and correctness never depends on reading
/// them back.
#[derive(Debug, Clone)]
pub(crate) struct Entry<K, V> {
    pub(crate) key: K,
    pub(crate) value: V,
    pub(crate) hash: u64,
    pub(crate) segment_index: u32,
    pub(crate) probe_count: u32,
}

impl<K, V> Entry<K, V> {
    pub(crate) fn new(key: K, value: V, hash: u64, segment_index: u32, probe_count: u32) -> Self {
        Self { key, value, hash, segment_index, probe_count }
    }
}
