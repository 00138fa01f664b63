//! Level-by-level classification: at each structural depth, from the
//! deepest region up to the root, classify and name every region at that
//! depth from its segments' lengths, then roll the now-finalized lengths
//! and variant counts up into the wrapper segment one level above.

use itertools::Itertools;

use crate::error::{HapError, Result};
use crate::rst::{letter_suffix, IdGenerator, IdKind, RegionTable, RegionType, SegmentTable};
use crate::types::{RegionId, SegmentId};

pub(super) fn run(regions: &mut RegionTable, segments: &mut SegmentTable, ids: &mut IdGenerator, subgraph: &str) -> Result<()> {
    let max_level = regions
        .iter()
        .filter_map(|(_, r)| r.level_range.map(|lr| lr.high))
        .max()
        .unwrap_or(0);

    for level in (0..=max_level).rev() {
        let region_ids: Vec<RegionId> = regions
            .iter()
            .filter(|(_, r)| r.level_range.is_some_and(|lr| lr.covers(level)))
            .map(|(id, _)| id.clone())
            .collect();
        for region_id in &region_ids {
            classify_region(region_id, regions, segments, ids, subgraph)?;
        }

        if level >= 1 {
            let segment_ids: Vec<SegmentId> = segments
                .iter()
                .filter(|(_, s)| s.level_range.is_some_and(|lr| lr.covers(level - 1)) && s.has_children())
                .map(|(id, _)| id.clone())
                .collect();
            for segment_id in &segment_ids {
                aggregate_segment(segment_id, regions, segments, subgraph)?;
            }
        }
    }
    Ok(())
}

fn classify_region(
    region_id: &RegionId,
    regions: &mut RegionTable,
    segments: &mut SegmentTable,
    ids: &mut IdGenerator,
    subgraph: &str,
) -> Result<()> {
    let segment_ids = regions
        .get(region_id)
        .ok_or_else(|| HapError::InternalInvariant {
            subgraph: subgraph.to_string(),
            detail: format!("region {region_id} vanished mid-classification"),
        })?
        .segments
        .clone();
    let lengths: Vec<u64> = segment_ids
        .iter()
        .map(|sid| segments.get(sid).map(|s| s.length).unwrap_or(0))
        .collect();
    let (min_len, max_len) = match lengths.iter().copied().minmax() {
        itertools::MinMaxResult::NoElements => (0, 0),
        itertools::MinMaxResult::OneElement(l) => (l, l),
        itertools::MinMaxResult::MinMax(lo, hi) => (lo, hi),
    };
    let total_variants: u64 = segment_ids
        .iter()
        .map(|sid| segments.get(sid).map(|s| s.total_variants).unwrap_or(0))
        .sum();
    let nonzero_min = lengths.iter().filter(|&&l| l > 0).min().copied().unwrap_or(0);

    let region = regions
        .get_mut(region_id)
        .expect("region present, checked above");
    region.length = max_len;
    region.min_length = nonzero_min;
    region.total_variants = total_variants;

    if segment_ids.len() > 1 {
        let d = max_len - min_len;
        let mean = lengths.iter().sum::<u64>() as f64 / lengths.len() as f64;
        let variance = lengths.iter().map(|&l| (l as f64 - mean).powi(2)).sum::<f64>() / (lengths.len() - 1) as f64;
        let std = variance.sqrt();

        if mean > 0.0 && std / mean < 0.1 {
            let region = regions.get_mut(region_id).expect("region present");
            if lengths.iter().all(|&l| l == 1) {
                region.region_type = RegionType::Snp;
                let rn = ids.next(IdKind::Snp);
                region.semantic_id = Some(rn.clone());
                name_lettered(segments, &segment_ids, &rn);
            } else {
                region.region_type = RegionType::Ale;
                let rn = ids.next(IdKind::Ale);
                region.semantic_id = Some(rn.clone());
                name_lettered(segments, &segment_ids, &rn);
            }
        } else if min_len == 0 || (min_len < 10 && d as f64 / min_len as f64 > 5.0) {
            let second_min = lengths.iter().filter(|&&l| l > min_len).min().copied();
            let rn = if d > 50 {
                regions.get_mut(region_id).expect("region present").region_type = RegionType::Sv;
                ids.next(IdKind::Sv)
            } else {
                regions.get_mut(region_id).expect("region present").region_type = RegionType::Ind;
                ids.next(IdKind::Ind)
            };
            let region = regions.get_mut(region_id).expect("region present");
            region.semantic_id = Some(rn.clone());
            if let Some(second) = second_min {
                region.min_length = second;
            }

            let mini_pos = lengths
                .iter()
                .enumerate()
                .min_by_key(|&(_, &l)| l)
                .map(|(i, _)| i)
                .expect("segment_ids is non-empty");
            segments
                .get_mut(&segment_ids[mini_pos])
                .expect("segment present")
                .semantic_id = Some(format!("{rn}-d"));

            let remaining: Vec<&SegmentId> = segment_ids
                .iter()
                .enumerate()
                .filter(|&(i, _)| i != mini_pos)
                .map(|(_, id)| id)
                .collect();
            if remaining.len() > 1 {
                for (j, sid) in remaining.iter().enumerate() {
                    segments.get_mut(sid).expect("segment present").semantic_id = Some(format!("{rn}-i{}", letter_suffix(j)));
                }
            } else if let Some(&sid) = remaining.first() {
                segments.get_mut(sid).expect("segment present").semantic_id = Some(format!("{rn}-i"));
            }
        } else {
            let region = regions.get_mut(region_id).expect("region present");
            region.region_type = RegionType::Var;
            let rn = ids.next(IdKind::Var);
            region.semantic_id = Some(rn.clone());
            name_lettered(segments, &segment_ids, &rn);
        }
    } else {
        let region = regions.get_mut(region_id).expect("region present");
        region.region_type = RegionType::Con;
        let rn = ids.next(IdKind::Con);
        region.semantic_id = Some(rn.clone());
        if let Some(sid) = segment_ids.first() {
            segments.get_mut(sid).expect("segment present").semantic_id = Some(rn);
        }
    }

    Ok(())
}

fn name_lettered(segments: &mut SegmentTable, segment_ids: &[SegmentId], base: &str) {
    for (j, sid) in segment_ids.iter().enumerate() {
        segments.get_mut(sid).expect("segment present").semantic_id = Some(format!("{base}-{}", letter_suffix(j)));
    }
}

fn aggregate_segment(segment_id: &SegmentId, regions: &mut RegionTable, segments: &mut SegmentTable, subgraph: &str) -> Result<()> {
    let sub_region_ids = segments
        .get(segment_id)
        .ok_or_else(|| HapError::InternalInvariant {
            subgraph: subgraph.to_string(),
            detail: format!("segment {segment_id} vanished mid-aggregation"),
        })?
        .sub_regions
        .clone();

    let mut total_length = 0u64;
    let mut direct_variants = 0u64;
    let mut total_variants = 0u64;
    for rid in &sub_region_ids {
        let region = regions.get(rid).ok_or_else(|| HapError::InternalInvariant {
            subgraph: subgraph.to_string(),
            detail: format!("sub-region {rid} vanished mid-aggregation"),
        })?;
        total_length += region.length;
        total_variants += region.total_variants;
        if region.region_type.is_variant() {
            direct_variants += 1;
        }
    }
    total_variants += direct_variants;

    if direct_variants > u8::MAX as u64 {
        return Err(HapError::InternalInvariant {
            subgraph: subgraph.to_string(),
            detail: format!("segment {segment_id} has {direct_variants} direct variants, exceeding the 255 cap"),
        });
    }

    let segment = segments.get_mut(segment_id).expect("segment present, checked above");
    segment.length = total_length;
    segment.direct_variants = direct_variants;
    segment.total_variants = total_variants;

    Ok(())
}
