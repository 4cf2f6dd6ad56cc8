//! Small collection type aliases reused across crates.
//!
//! Instrument and topic keys in this ecosystem are short strings (symbols, topic names), so an
//! FNV-hashed `IndexMap`/`IndexSet` is a better default than the standard library's SipHash map:
//! insertion order is preserved (useful for deterministic iteration over active orders) and
//! hashing short keys is cheaper.

/// Fast `IndexMap` using the FNV hasher, tuned for small keys (symbols, topic names).
pub type FnvIndexMap<K, V> = indexmap::IndexMap<K, V, fnv::FnvBuildHasher>;
