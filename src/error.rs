//! Error kinds raised by [`crate::table::ElasticMap`].
//!
//! Mirrors the three error kinds a map backed by elastic hashing can raise:
//! invalid construction parameters, a null key, and an invariant violation.
//! Every other "failure" (key not found) is a normal `Ok(None)`, never an
//! error.

use thiserror::Error;

/// Errors raised by [`crate::table::ElasticMap`].
///
/// `InsertionExhausted` and `RehashSizeMismatch` indicate a broken
/// invariant or adversarial hash behavior. The map's state after either is
/// undefined; callers should discard the container rather than retry.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MapError {
    #[error("invalid capacity {0}: must be positive")]
    InvalidCapacity(usize),

    #[error("invalid delta {0}: must lie strictly between 0 and 1")]
    InvalidDelta(f64),

    #[error("key must not be null")]
    NullKey,

    #[error("insertion failed: no free slot found for key despite size < threshold")]
    InsertionExhausted,

    #[error("rehash invariant violated: expected {expected} live entries, found {actual}")]
    RehashSizeMismatch { expected: usize, actual: usize },
}
