//! Shared identifiers and map/set aliases used across the crate.
//!
//! Deterministic-enough ahash over the default SipHash, with no DOS
//! hardening concerns since this crate never processes untrusted keys from
//! the network.

use std::fmt;

#[allow(clippy::disallowed_types)]
pub type Hasher = ahash::AHasher;
pub type BuildHasher = std::hash::BuildHasherDefault<Hasher>;

#[allow(clippy::disallowed_types)]
pub type HashMap<K, V> = std::collections::HashMap<K, V, BuildHasher>;
#[allow(clippy::disallowed_types)]
pub type HashSet<V> = std::collections::HashSet<V, BuildHasher>;

pub type OrderMap<K, V> = ordermap::OrderMap<K, V, BuildHasher>;
pub type OrderSet<V> = ordermap::OrderSet<V, BuildHasher>;

/// Identifier of a [`crate::rst::Region`]. Plain newtype over the generated
/// `r-N` counter string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RegionId(pub String);

/// Identifier of a [`crate::rst::Segment`]. Plain newtype over the generated
/// `s-N` counter string, or a graph vertex name once a segment collapses to
/// a single vertex.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SegmentId(pub String);

impl fmt::Display for RegionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for SegmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for RegionId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<String> for SegmentId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for SegmentId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Inclusive level interval `[low, high]` a region/segment is visible at.
///
/// `None` while still unassigned during the wrapping pass; the
/// postcondition requires every element to end up with `Some`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelRange {
    pub low: u32,
    pub high: u32,
}

impl LevelRange {
    pub fn single(level: u32) -> Self {
        Self {
            low: level,
            high: level,
        }
    }

    pub fn covers(&self, level: u32) -> bool {
        self.low <= level && level <= self.high
    }
}

/// Half-open coordinate interval `[start, end)` in the parent's frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Coordinate {
    pub start: u64,
    pub end: u64,
}

impl Coordinate {
    pub fn len(&self) -> u64 {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }
}
