//! Source-set closure and rank assignment, the cross-region cleanup that
//! runs once every region's segments carry their final `length`/`type`.

use crate::rst::{RegionTable, SegmentTable};
use crate::types::HashSet;

pub(super) fn fill_sources_and_rank(regions: &RegionTable, segments: &mut SegmentTable, haplotypes: &[String]) {
    for (_, region) in regions.iter() {
        close_sources(region, segments, haplotypes);
        assign_ranks(region, segments);
    }
}

/// A segment built from a zero-length deletion carrier never picks up any
/// vertex sources during the walk; it implicitly covers whatever haplotypes
/// its region's other alternatives don't, by elimination.
fn close_sources(region: &crate::rst::Region, segments: &mut SegmentTable, haplotypes: &[String]) {
    let Some(empty_pos) = region
        .segments
        .iter()
        .position(|sid| segments.get(sid).is_some_and(|s| s.sources.is_empty()))
    else {
        return;
    };

    let mut covered: HashSet<String> = HashSet::default();
    for (i, sid) in region.segments.iter().enumerate() {
        if i == empty_pos {
            continue;
        }
        if let Some(segment) = segments.get(sid) {
            covered.extend(segment.sources.iter().cloned());
        }
    }
    let filled: HashSet<String> = region.sources.difference(&covered).cloned().collect();
    let frequency = filled.len() as f32 / haplotypes.len() as f32;

    if let Some(segment) = segments.get_mut(&region.segments[empty_pos]) {
        segment.sources = filled;
        segment.frequency = frequency;
    }
}

/// Descending-frequency rank within a region, ties broken by the order
/// segments were appended to it, except that a deletion-marked segment
/// (semantic id ending `-d`, per [`super::classify::run`]) always loses a
/// tie to a non-deletion segment: insertions are preferred over deletions
/// when frequencies tie.
fn assign_ranks(region: &crate::rst::Region, segments: &mut SegmentTable) {
    let mut order: Vec<(usize, f32, bool)> = region
        .segments
        .iter()
        .enumerate()
        .map(|(i, sid)| {
            let segment = segments.get(sid);
            let frequency = segment.map(|s| s.frequency).unwrap_or(0.0);
            let is_deletion = segment.and_then(|s| s.semantic_id.as_deref()).is_some_and(|n| n.ends_with("-d"));
            (i, frequency, is_deletion)
        })
        .collect();
    order.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.2.cmp(&b.2)).then(a.0.cmp(&b.0)));

    for (rank, (original_index, _, _)) in order.into_iter().enumerate() {
        if let Some(segment) = segments.get_mut(&region.segments[original_index]) {
            segment.rank = rank as u32;
        }
    }
}
