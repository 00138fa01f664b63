//! Append-only accumulators for [`Region`]/[`Segment`] rows, plus the
//! per-task id generator.
//!
//! Keyed, insertion-ordered maps: `OrderMap` gives O(1) id lookup while
//! preserving build order for iteration.

use crate::rst::region::Region;
use crate::rst::segment::Segment;
use crate::types::{OrderMap, RegionId, SegmentId};

#[derive(Debug, Default)]
pub struct RegionTable(OrderMap<RegionId, Region>);

impl RegionTable {
    pub fn insert(&mut self, region: Region) {
        self.0.insert(region.id.clone(), region);
    }

    pub fn get(&self, id: &RegionId) -> Option<&Region> {
        self.0.get(id)
    }

    pub fn get_mut(&mut self, id: &RegionId) -> Option<&mut Region> {
        self.0.get_mut(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&RegionId, &Region)> {
        self.0.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&RegionId, &mut Region)> {
        self.0.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The unique root region: the one with no `parent_segment`.
    pub fn root(&self) -> Option<&Region> {
        self.0.values().find(|r| r.is_root())
    }

    pub fn root_id(&self) -> Option<RegionId> {
        self.root().map(|r| r.id.clone())
    }
}

#[derive(Debug, Default)]
pub struct SegmentTable(OrderMap<SegmentId, Segment>);

impl SegmentTable {
    pub fn insert(&mut self, segment: Segment) {
        self.0.insert(segment.id.clone(), segment);
    }

    pub fn get(&self, id: &SegmentId) -> Option<&Segment> {
        self.0.get(id)
    }

    pub fn get_mut(&mut self, id: &SegmentId) -> Option<&mut Segment> {
        self.0.get_mut(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&SegmentId, &Segment)> {
        self.0.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&SegmentId, &mut Segment)> {
        self.0.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Graph-level metadata.
#[derive(Debug, Clone)]
pub struct Meta {
    pub sources: Vec<String>,
    pub name: String,
    pub max_level: u32,
    pub total_length: u64,
    pub total_variants: u64,
}

/// Closed set of id/name prefixes the builder and classifier hand out, one
/// monotonic counter per prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdKind {
    Segment,
    Region,
    Var,
    Con,
    Ale,
    Ind,
    Sv,
    Snp,
}

impl IdKind {
    fn prefix(self) -> &'static str {
        match self {
            IdKind::Segment => "s",
            IdKind::Region => "r",
            IdKind::Var => "VAR",
            IdKind::Con => "CON",
            IdKind::Ale => "ALE",
            IdKind::Ind => "IND",
            IdKind::Sv => "SV",
            IdKind::Snp => "SNP",
        }
    }
}

/// Per-task monotonic id generator. Never shared across tasks: the
/// scheduler constructs one per subgraph, so counters restart at 0 and the
/// caller must rename or namespace identifiers before merging.
#[derive(Debug, Default)]
pub struct IdGenerator {
    counters: crate::types::HashMap<IdKind, u64>,
}

impl IdGenerator {
    pub fn next(&mut self, kind: IdKind) -> String {
        let counter = self.counters.entry(kind).or_insert(0);
        *counter += 1;
        format!("{}-{}", kind.prefix(), counter)
    }

    pub fn next_region(&mut self) -> RegionId {
        RegionId(self.next(IdKind::Region))
    }

    pub fn next_segment(&mut self) -> SegmentId {
        SegmentId(self.next(IdKind::Segment))
    }
}

/// `a, b, c, ...` suffix for the `n`-th (0-indexed) alternative. No
/// wraparound past `z`, since pangenome loci realistically never carry 26+
/// alternative alleles.
pub fn letter_suffix(n: usize) -> char {
    (b'a' + (n % 26) as u8) as char
}
