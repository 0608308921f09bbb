//! An open-addressing associative container implementing elastic hashing
//! (Farach-Colton, Krapivin, Kuszmaul, "Optimal Bounds for Open Addressing
//! Without Reordering"): bounded worst-case insertion cost and no entry
//! relocation once placed, at the cost of giving up tombstone-based
//! removal semantics.
//!
//! The table is a sequence of segments (`A0, A1, ..., A_{s-1}`) with
//! geometrically decreasing power-of-two capacities. A batch counter `b`
//! tracks which segment is currently being filled; promotion rules move
//! `b` forward as segments fill past threshold occupancy. See
//! [`table::ElasticMap`] for the public entry point.

mod entry;
mod error;
mod iter;
mod layout;
mod nullable;
mod probe;
mod scheduler;
mod segment;
mod table;
mod views;

pub use error::MapError;
pub use iter::{IntoIter, Iter};
pub use nullable::NullableKey;
pub use table::{DefaultHashBuilder, ElasticMap};
pub use views::{EntrySet, KeySet, Values};
