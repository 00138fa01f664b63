//! Leaf-to-Root Property Filler: classifies every region by its segments'
//! length statistics, names regions and segments accordingly, aggregates
//! wrapper segment lengths and variant counts bottom-up, then closes out
//! implicit source sets and assigns per-region ranks.

mod classify;
mod rank;

use crate::error::Result;
use crate::rst::{IdGenerator, RegionTable, SegmentTable};

/// Runs the full leaf-to-root pass: classification/naming level by level,
/// then the cross-cutting source-closure and rank assignment that only make
/// sense once every region's segments are finalized.
pub fn calc_props_l2r(
    regions: &mut RegionTable,
    segments: &mut SegmentTable,
    ids: &mut IdGenerator,
    haplotypes: &[String],
    subgraph: &str,
) -> Result<()> {
    classify::run(regions, segments, ids, subgraph)?;
    rank::fill_sources_and_rank(regions, segments, haplotypes);
    Ok(())
}
