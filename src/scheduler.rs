//! The insertion state machine: which segment receives the next entry, and
//! by which probing strategy, governed by the current batch and the free
//! fractions of the current and next segments.
//!
//! Grounded on the teacher's `MmapHashIndex::insert` (`mmap_hash.rs`): a
//! loop that walks candidate slots and places on the first empty or
//! lower-priority one it finds. The teacher's table is flat and uses
//! Robin-Hood displacement; this scheduler instead dispatches across a
//! *sequence* of segments under the elastic-hashing three-case policy, but
//! keeps the teacher's shape of "probe, check occupancy, place or
//! continue".

use crate::entry::Entry;
use crate::error::MapError;
use crate::probe;
use crate::segment::Segment;

pub(crate) struct Placement {
    pub(crate) segment_index: usize,
    pub(crate) probe_count: u32,
}

pub(crate) enum InsertOutcome<K, V> {
    Placed(Placement),
    NeedsResize(K, V),
}

/// Checks whether `A0`'s occupancy has reached 75% and, if so and a next
/// segment exists, promotes `b` to 1.
///
/// This single check backs two distinct spec rules depending on when it's
/// called: the top-of-`insert` "pre-insert promotion check" (§4.3), which
/// rehash mode suppresses, and Case B0's own post-placement 75% check
/// (§4.3's Case B0 description), which is not the pre-insert check and
/// always runs, rehashing or not — Case B0's post-placement rule is what
/// keeps a rehash's batch moving forward even while the pre-insert check is
/// suppressed, so rehashed entries are never pinned to `A0`.
fn maybe_promote_a0<K, V>(segments: &[Segment<K, V>], batch: &mut usize) {
    if *batch != 0 || segments.len() <= 1 {
        return;
    }
    let a0 = &segments[0];
    let threshold = (0.75 * a0.capacity() as f64).ceil() as usize;
    if a0.len() >= threshold {
        log::debug!("promoting batch 0 -> 1 (A0 occupancy {} >= {})", a0.len(), threshold);
        *batch = 1;
    }
}

/// Post-insert promotion check for `b >= 1`: if `A_b`'s occupancy has
/// reached `cap(A_b) - floor(delta * cap(A_b) / 2)` and a next segment
/// exists, promote.
fn maybe_promote_post_insert<K, V>(segments: &[Segment<K, V>], batch: &mut usize, delta: f64) {
    let b = *batch;
    if b + 1 >= segments.len() {
        return;
    }
    let seg = &segments[b];
    let cap = seg.capacity();
    let threshold = cap - ((delta * cap as f64) / 2.0).floor() as usize;
    if seg.len() >= threshold {
        log::debug!("promoting batch {} -> {} (A{b} occupancy {} >= {threshold})", b, b + 1, seg.len());
        *batch = b + 1;
    }
}

/// Finds the first empty slot in `segment` among `probe_values`, without
/// mutating anything. Returns the slot index and the `j` that found it.
fn find_empty<K, V>(
    segment: &Segment<K, V>,
    segment_index_for_probe: u32,
    hash32: u32,
    js: impl Iterator<Item = u32>,
) -> Option<(usize, u32)> {
    let cap = segment.capacity();
    for j in js {
        let idx = probe::slot_index(segment_index_for_probe, j, hash32, cap);
        if segment.slot(idx).is_none() {
            return Some((idx, j));
        }
    }
    None
}

/// Inserts `entry` assuming the caller has already verified the key is
/// absent and `size < threshold`. Returns where the entry landed, or
/// signals that a resize is required (only possible from batch 0).
pub(crate) fn insert<K, V>(
    segments: &mut [Segment<K, V>],
    batch: &mut usize,
    delta: f64,
    rehashing: bool,
    hash32: u32,
    hash64: u64,
    key: K,
    value: V,
) -> Result<InsertOutcome<K, V>, MapError> {
    // The pre-insert promotion check (§4.3) is what rehash mode suppresses
    // (§4.4 step 4) — not Case B0's own post-placement check below.
    if !rehashing {
        maybe_promote_a0(segments, batch);
    }
    let b = *batch;

    if b == 0 {
        // probe(0, j, h) is independent of j (see crate::probe::probe), so the
        // bounded phase and the unbounded linear phase described by the spec
        // collapse onto a single candidate slot. We check it once.
        let a0 = &segments[0];
        match find_empty(a0, 0, hash32, 1..=1) {
            Some((idx, j)) => {
                segments[0].place(idx, Entry::new(key, value, hash64, 0, j));
                // Case B0's own post-placement 75% check always runs, rehash
                // or not — this is what keeps a rehash's batch advancing
                // past A0 even though the pre-insert check above is
                // suppressed while rehashing.
                maybe_promote_a0(segments, batch);
                return Ok(InsertOutcome::Placed(Placement { segment_index: 0, probe_count: j }));
            }
            None => return Ok(InsertOutcome::NeedsResize(key, value)),
        }
    }

    let eps1 = segments[b].free_fraction();
    let has_next = b + 1 < segments.len();
    let eps2 = if has_next { segments[b + 1].free_fraction() } else { 1.0 };

    let placed = if eps1 > delta / 2.0 && eps2 > 0.25 && has_next {
        // Case 1: bounded attempt in A_b, then a full linear sweep of
        // A_{b+1} computed with segment-index b (not b+1) — preserved
        // from the source's injection-into-next-segment step.
        let limit = probe::probe_limit(eps1, delta).unwrap_or(segments[b].capacity() as u32);
        if let Some((idx, j)) = find_empty(&segments[b], b as u32, hash32, 1..=limit) {
            segments[b].place(idx, Entry::new(key, value, hash64, b as u32, j));
            Some((b, j))
        } else {
            let next_cap = segments[b + 1].capacity() as u32;
            match find_empty(&segments[b + 1], b as u32, hash32, 1..=next_cap) {
                Some((idx, j)) => {
                    segments[b + 1].place(idx, Entry::new(key, value, hash64, b as u32, j));
                    Some((b + 1, j))
                }
                None => None,
            }
        }
    } else if eps1 <= delta / 2.0 && has_next {
        // Case 2: skip A_b entirely; linear sweep of A_{b+1} with
        // segment-index b.
        let next_cap = segments[b + 1].capacity() as u32;
        match find_empty(&segments[b + 1], b as u32, hash32, 1..=next_cap) {
            Some((idx, j)) => {
                segments[b + 1].place(idx, Entry::new(key, value, hash64, b as u32, j));
                Some((b + 1, j))
            }
            None => None,
        }
    } else {
        // Case 3: next segment too full (eps2 <= 0.25) or doesn't exist;
        // linear sweep of A_b with segment-index b.
        let cap = segments[b].capacity() as u32;
        match find_empty(&segments[b], b as u32, hash32, 1..=cap) {
            Some((idx, j)) => {
                segments[b].place(idx, Entry::new(key, value, hash64, b as u32, j));
                Some((b, j))
            }
            None => None,
        }
    };

    match placed {
        Some((segment_index, probe_count)) => {
            maybe_promote_post_insert(segments, batch, delta);
            Ok(InsertOutcome::Placed(Placement { segment_index, probe_count }))
        }
        None => Err(MapError::InsertionExhausted),
    }
}
