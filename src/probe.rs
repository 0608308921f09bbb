//! Pure functions computing where a `(segment-index, probe-count, key-hash)`
//! triple lands, and how many bounded attempts a segment gets before the
//! scheduler falls through to a linear or next-segment strategy.
//!
//! The probe sequence shape (quadratic spread scaled by segment index,
//! masked against a power-of-two capacity) is the same idea as the
//! triangular/quadratic probe sequences documented in
//! `andjo403-Interner/src/raw_interner.rs::ProbeSeq`; the exact formula
//! below is dictated by the elastic-hashing scheme and must be preserved
//! verbatim, including its degeneracy at segment 0.

/// Multiplier in the probe-limit formula `f(eps)`.
const PROBE_MULTIPLIER: u32 = 4;

/// `mix(h) = h XOR (h >>> 16)` over 32-bit unsigned semantics — the
/// fingerprint used to diffuse identity hashes before probing.
#[inline]
pub(crate) fn mix(h: u32) -> u32 {
    h ^ (h >> 16)
}

/// `probe(i, j, h) = (mix(h) + i*j*j) AND 0x7FFF_FFFF`.
///
/// For `i = 0` this collapses to a constant (`mix(h)` alone) — `j` is
/// inert at segment 0 by design. This is intentional: batch-0 fills `A0`
/// by hash distribution alone, and congestion triggers promotion before
/// collisions would dominate. Callers must not "fix" this.
#[inline]
pub(crate) fn probe(segment_index: u32, probe_count: u32, hash: u32) -> u32 {
    let spread = segment_index
        .wrapping_mul(probe_count)
        .wrapping_mul(probe_count);
    mix(hash).wrapping_add(spread) & 0x7FFF_FFFF
}

/// Maps a raw probe value into a slot index inside a segment of the given
/// power-of-two capacity.
#[inline]
pub(crate) fn slot_index(segment_index: u32, probe_count: u32, hash: u32, capacity: usize) -> usize {
    debug_assert!(capacity.is_power_of_two());
    (probe(segment_index, probe_count, hash) as usize) & (capacity - 1)
}

/// `f(eps) = PROBE_MULTIPLIER * min(ceil(log2(1/eps)), ceil(log2(1/delta)))`.
///
/// Returns `None` for `eps <= 0` (a full segment): "no bounded attempts",
/// the caller falls straight through to full linear probing.
pub(crate) fn probe_limit(free_fraction: f64, delta: f64) -> Option<u32> {
    if free_fraction <= 0.0 {
        return None;
    }
    let log_inv_eps = (1.0 / free_fraction).log2().ceil();
    let log_inv_delta = (1.0 / delta).log2().ceil();
    let bound = log_inv_eps.min(log_inv_delta).max(0.0) as u32;
    Some(PROBE_MULTIPLIER * bound)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mix_is_its_own_diffusion() {
        assert_eq!(mix(0), 0);
        assert_eq!(mix(0xFFFF_0000), 0xFFFF_0000 ^ 0x0000_FFFF);
    }

    #[test]
    fn probe_at_segment_zero_ignores_probe_count() {
        let h = 123_456u32;
        let p1 = probe(0, 1, h);
        let p2 = probe(0, 7, h);
        let p3 = probe(0, 1000, h);
        assert_eq!(p1, p2);
        assert_eq!(p2, p3);
        assert_eq!(p1, mix(h) & 0x7FFF_FFFF);
    }

    #[test]
    fn probe_spreads_quadratically_for_later_segments() {
        let h = 42u32;
        let p1 = probe(2, 1, h);
        let p2 = probe(2, 2, h);
        let p3 = probe(2, 3, h);
        // i * j*j for i=2: 2, 8, 18 -> strictly increasing spread
        assert_ne!(p1, p2);
        assert_ne!(p2, p3);
    }

    #[test]
    fn probe_limit_full_segment_is_none() {
        assert_eq!(probe_limit(0.0, 0.125), None);
        assert_eq!(probe_limit(-0.1, 0.125), None);
    }

    #[test]
    fn probe_limit_is_bounded_by_delta() {
        // eps very small -> log2(1/eps) huge, but capped by log2(1/delta)
        let limit = probe_limit(0.0001, 0.125).unwrap();
        let delta_bound = (1.0f64 / 0.125).log2().ceil() as u32 * PROBE_MULTIPLIER;
        assert_eq!(limit, delta_bound);
    }

    #[test]
    fn slot_index_respects_capacity_mask() {
        for cap in [2usize, 4, 8, 16, 1024] {
            let idx = slot_index(3, 5, 999_999, cap);
            assert!(idx < cap);
        }
    }
}
