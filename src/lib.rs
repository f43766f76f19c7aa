//! A multimap implementation mapping keys to buckets of values.
//!
//! ---
//!
//! [`BucketMultimap`] is a [multimap](https://en.wikipedia.org/wiki/Multimap)
//! implementation where entries are stored as a hash map
//! which maps keys to a bucket of values:
//!  - `a -> 1, 2`
//!  - `b -> 3`
//!
//! Queries can also view the contents as a single flattened collection
//! of key-value pairs:
//!  - `a -> 1`
//!  - `a -> 2`
//!  - `b -> 3`
//!
//! ---
//!
//! A key is present exactly as long as its bucket is non-empty:
//! buckets are created by the first insert for a key and removed
//! together with the key when their last value is removed.
//!
//! Within a bucket, values keep their insertion order and may contain
//! duplicates. Across keys, iteration order is arbitrary.
//!
//! ---
//!
//! The structure is not thread safe: concurrent mutation requires
//! external synchronization.

/// Multimap implementation where entries are stored as a hash map from keys to buckets of values.
pub mod map;

#[cfg(feature = "rayon")]
mod rayon;

pub use hashbrown::TryReserveError;
pub use map::BucketMultimap;
