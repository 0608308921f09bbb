//! Geometric segment-capacity layout: `s = floor(log2(total_capacity)) + 1`
//! segments, capacities decreasing geometrically and rounded up to a power
//! of two (minimum 2), with `A0` inflated so the segment capacities sum to
//! at least `total_capacity` while each capacity — including `A0`'s after
//! inflation — stays a power of two.

/// Computes per-segment capacities for a requested total capacity.
///
/// Returns the capacities in `A0, A1, ..., A_{s-1}` order. The sum of the
/// returned capacities is the effective table capacity, which may exceed
/// `requested_capacity`.
pub(crate) fn segment_capacities(requested_capacity: usize) -> Vec<usize> {
    debug_assert!(requested_capacity > 0);

    let total = requested_capacity.next_power_of_two().max(2);
    let segment_count = (total as f64).log2().floor() as usize + 1;

    let mut caps = Vec::with_capacity(segment_count);
    for i in 0..segment_count {
        let raw = total / (1usize << (i + 1)).max(1);
        caps.push(raw.max(1).next_power_of_two().max(2));
    }

    // Inflate A0 until the sum covers total_capacity, keeping it a power of two.
    let tail_sum: usize = caps[1..].iter().sum();
    let mut a0 = caps[0];
    while a0 + tail_sum < total {
        a0 *= 2;
    }
    caps[0] = a0;

    caps
}
