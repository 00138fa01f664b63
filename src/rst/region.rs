//! The [`Region`] record and its closed type tag.

use strum::{Display, EnumIs};

use crate::types::{Coordinate, HashSet, LevelRange, RegionId, SegmentId};

/// Closed classification of a region, assigned by the Leaf-to-Root Property
/// Filler. Modeled as a tagged enum rather than a string so the match arms
/// handling each kind are checked exhaustively at compile time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIs)]
#[strum(serialize_all = "lowercase")]
pub enum RegionType {
    /// Single segment: consensus, no variation at this locus.
    Con,
    /// Multiple segments, variance too irregular to classify further.
    Var,
    /// All alternatives length 1, tight length spread.
    Snp,
    /// Multiple alternatives of near-equal length > 1.
    Ale,
    /// Deletion-bearing locus, small size delta.
    Ind,
    /// Deletion-bearing locus, large size delta (> 50bp).
    Sv,
}

impl RegionType {
    /// All types other than `con` represent real variation.
    pub fn is_variant(self) -> bool {
        !matches!(self, RegionType::Con)
    }
}

/// A locus container holding one or more alternative [`crate::rst::Segment`]s.
#[derive(Debug, Clone)]
pub struct Region {
    pub id: RegionId,
    pub semantic_id: Option<String>,
    pub level_range: Option<LevelRange>,
    pub coordinate: Option<Coordinate>,
    pub length: u64,
    pub parent_segment: Option<SegmentId>,
    pub segments: Vec<SegmentId>,
    pub region_type: RegionType,
    pub is_default: bool,
    pub sources: HashSet<String>,
    pub total_variants: u64,

    /// Transient: minimum non-zero segment length, used by the wrapping pass
    /// to decide whether a run of regions is "too small". Dropped before TSV
    /// emission.
    pub min_length: u64,
    /// Transient: name of the graph vertex flanking this region on the left,
    /// used to detect repeated attachment at the same side-path origin.
    /// Dropped before TSV emission.
    pub before: Option<String>,
    /// Transient: name of the graph vertex flanking this region on the
    /// right, used to locate the corresponding allele sub-interval on the
    /// main path. Dropped before TSV emission.
    pub after: Option<String>,
}

impl Region {
    pub fn new(id: RegionId, region_type: RegionType) -> Self {
        Self {
            id,
            semantic_id: None,
            level_range: None,
            coordinate: None,
            length: 0,
            parent_segment: None,
            segments: Vec::new(),
            region_type,
            is_default: false,
            sources: HashSet::default(),
            total_variants: 0,
            min_length: 0,
            before: None,
            after: None,
        }
    }

    pub fn is_root(&self) -> bool {
        self.parent_segment.is_none()
    }
}
