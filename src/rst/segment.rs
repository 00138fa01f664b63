//! The [`Segment`] record.

use crate::types::{Coordinate, HashSet, LevelRange, RegionId, SegmentId};

/// One alternative at a locus: a single graph vertex, an allele path, or a
/// synthetic wrapper over a set of sub-regions.
#[derive(Debug, Clone)]
pub struct Segment {
    pub id: SegmentId,
    /// The `s-N` id this segment was created under before it collapsed to a
    /// graph vertex name. `None` if it never collapsed.
    pub original_id: Option<SegmentId>,
    pub semantic_id: Option<String>,
    pub level_range: Option<LevelRange>,
    pub coordinate: Option<Coordinate>,
    pub length: u64,
    pub rank: u32,
    pub frequency: f32,
    pub sources: HashSet<String>,
    pub direct_variants: u64,
    pub total_variants: u64,
    pub is_wrapper: bool,
    pub sub_regions: Vec<RegionId>,
}

impl Segment {
    pub fn new(id: SegmentId) -> Self {
        Self {
            id,
            original_id: None,
            semantic_id: None,
            level_range: None,
            coordinate: None,
            length: 0,
            rank: 0,
            frequency: 0.0,
            sources: HashSet::default(),
            direct_variants: 0,
            total_variants: 0,
            is_wrapper: false,
            sub_regions: Vec::new(),
        }
    }

    pub fn has_children(&self) -> bool {
        !self.sub_regions.is_empty()
    }

    /// Collapses this segment's id to a graph vertex name, remembering the
    /// synthetic id it was created under.
    pub fn collapse_id_to(&mut self, vertex_name: &str) {
        let previous = std::mem::replace(&mut self.id, SegmentId(vertex_name.to_string()));
        self.original_id = Some(previous);
    }
}
