//! Hierarchical Wrapper: the only component that deepens the tree after the
//! fact. The builder and the property filler produce a flat,
//! structurally-nested RST; this pass decides, level by level from the
//! coarsest resolution down to the finest, which runs of small or
//! `con`-flanked regions are too detailed to show yet and folds them behind
//! a synthetic wrapper until a later, finer level earns them back.

mod ranges;

use crate::error::{HapError, Result};
use crate::rst::{IdGenerator, IdKind, Meta, Region, RegionTable, RegionType, Segment, SegmentTable};
use crate::types::{HashSet, LevelRange, RegionId, SegmentId};

/// Runs the Hierarchical Wrapper over a built, leaf-to-root-classified RST,
/// filling in `max_level`/`total_length` on `meta` and replacing every
/// element's structural `level_range` with its final, resolution-aware one.
pub fn wrap_rst(
    regions: &mut RegionTable,
    segments: &mut SegmentTable,
    ids: &mut IdGenerator,
    haplotypes: &[String],
    meta: &mut Meta,
    min_res: f64,
    subgraph: &str,
) -> Result<()> {
    if !(min_res > 0.0) {
        return Err(HapError::InvalidResolution {
            subgraph: subgraph.to_string(),
            min_resolution: min_res,
        });
    }

    let root = regions.root().ok_or_else(|| HapError::InternalInvariant {
        subgraph: subgraph.to_string(),
        detail: "no root region (none with an empty parent_segment)".to_string(),
    })?;
    let total_length = root.length;

    // `log2` of a sub-unity ratio (a graph shorter than `1000 * min_res` bp)
    // goes negative; the original lets `maxlevel` go negative too and simply
    // never enters its wrap loop. Clamping here avoids an `as u32` underflow
    // while preserving that same "no wrapping needed" outcome.
    let raw_max_level = (total_length as f64 / 1000.0 / min_res).log2().ceil();
    let max_level = if raw_max_level.is_finite() && raw_max_level > 0.0 {
        raw_max_level as u32
    } else {
        0
    };
    meta.max_level = max_level;
    meta.total_length = total_length;

    for (_, region) in regions.iter_mut() {
        if region.level_range.is_some_and(|lr| lr.high > 1) {
            region.level_range = None;
        }
    }
    for (_, segment) in segments.iter_mut() {
        if segment.level_range.is_some_and(|lr| lr.high > 1) {
            segment.level_range = None;
        }
    }

    let min_len_px = 1.0 / min_res;

    for i in 1..max_level {
        let res = 2f64.powi((max_level - i) as i32) * min_res;
        let threshold = res * min_len_px;

        let mut rmdregions: HashSet<RegionId> = regions
            .iter()
            .filter(|(_, r)| r.level_range.is_some_and(|lr| lr.covers(i)))
            .map(|(id, _)| id.clone())
            .collect();

        let parent_segments: Vec<SegmentId> = segments
            .iter()
            .filter(|(_, s)| s.level_range.is_some_and(|lr| lr.covers(i - 1)) && s.has_children())
            .map(|(id, _)| id.clone())
            .collect();

        for parent_segment_id in &parent_segments {
            let rid_list = segments
                .get(parent_segment_id)
                .expect("parent segment id came from this table")
                .sub_regions
                .clone();
            for rid in &rid_list {
                rmdregions.remove(rid);
            }

            process_parent(
                parent_segment_id,
                &rid_list,
                i,
                threshold,
                regions,
                segments,
                ids,
                haplotypes,
                subgraph,
            )?;
        }

        let region_order: Vec<RegionId> = regions
            .iter()
            .filter(|(id, _)| rmdregions.contains(id))
            .map(|(id, _)| id.clone())
            .collect();
        for rid in &region_order {
            let segment_ids = regions.get(rid).expect("region present").segments.clone();
            let new_range = {
                let region = regions.get_mut(rid).expect("region present");
                let lr = region.level_range.ok_or_else(|| HapError::InternalInvariant {
                    subgraph: subgraph.to_string(),
                    detail: format!("region {rid} carried forward with no level_range"),
                })?;
                region.level_range = Some(LevelRange { low: lr.low, high: i + 1 });
                region.level_range
            };
            for sid in segment_ids {
                if let Some(segment) = segments.get_mut(&sid) {
                    segment.level_range = new_range;
                }
            }
        }
    }

    let incomplete_regions = regions.iter().filter(|(_, r)| r.level_range.is_none()).count();
    let incomplete_segments = segments.iter().filter(|(_, s)| s.level_range.is_none()).count();
    if incomplete_regions + incomplete_segments > 0 {
        let first_region = regions
            .iter()
            .find(|(_, r)| r.level_range.is_none())
            .map(|(id, _)| id.to_string())
            .or_else(|| {
                segments
                    .iter()
                    .find(|(_, s)| s.level_range.is_none())
                    .map(|(id, _)| id.to_string())
            })
            .unwrap_or_default();
        return Err(HapError::WrappingIncomplete {
            subgraph: subgraph.to_string(),
            count: incomplete_regions + incomplete_segments,
            first_region,
        });
    }

    Ok(())
}

/// Processes one parent segment's ordered `sub_regions` list at level `i`:
/// finds and merges wrap windows, either promotes the parent wholesale or
/// wraps each window into a synthetic region/segment, then resolves every
/// region left untouched.
#[allow(clippy::too_many_arguments)]
fn process_parent(
    parent_segment_id: &SegmentId,
    rid_list: &[RegionId],
    i: u32,
    threshold: f64,
    regions: &mut RegionTable,
    segments: &mut SegmentTable,
    ids: &mut IdGenerator,
    haplotypes: &[String],
    subgraph: &str,
) -> Result<()> {
    let mut windows: Vec<(usize, usize)> = Vec::new();
    for (posi, rid) in rid_list.iter().enumerate() {
        let region = regions.get(rid).ok_or_else(|| HapError::InternalInvariant {
            subgraph: subgraph.to_string(),
            detail: format!("region {rid} vanished mid-wrap"),
        })?;
        if (region.min_length as f64) < threshold {
            windows.push(ranges::extend_window(rid_list, posi, threshold, regions));
        }
    }
    let windows = ranges::merge_ranges(windows);

    if windows.len() == 1 && windows[0] == (0, rid_list.len() - 1) {
        tracing::debug!(
            parent_segment = %parent_segment_id,
            level = i,
            child_count = rid_list.len(),
            "whole child list wraps into one window, promoting parent segment instead"
        );
        segments
            .get_mut(parent_segment_id)
            .expect("parent segment present")
            .level_range
            .as_mut()
            .expect("parent segment already has a level_range")
            .high = i;

        for rid in rid_list {
            let segment_ids = regions.get(rid).expect("region present").segments.clone();
            regions.get_mut(rid).expect("region present").level_range = Some(LevelRange::single(i + 1));
            for sid in segment_ids {
                if let Some(segment) = segments.get_mut(&sid) {
                    segment.level_range = Some(LevelRange::single(i + 1));
                }
            }
        }
        return Ok(());
    }

    let mut normal_regions: HashSet<RegionId> = rid_list.iter().cloned().collect();
    let mut spliced: Vec<Option<RegionId>> = rid_list.iter().cloned().map(Some).collect();

    for &(lo, hi) in &windows {
        let window_ids: Vec<RegionId> = rid_list[lo..=hi].to_vec();
        for rid in &window_ids {
            normal_regions.remove(rid);
        }

        let wrapper_region_id = wrap_window(
            parent_segment_id,
            &window_ids,
            i,
            regions,
            segments,
            ids,
            haplotypes,
            subgraph,
        )?;

        for slot in &mut spliced[lo..=hi] {
            *slot = None;
        }
        spliced[lo] = Some(wrapper_region_id);
    }

    if !windows.is_empty() {
        let final_list: Vec<RegionId> = spliced.into_iter().flatten().collect();
        segments
            .get_mut(parent_segment_id)
            .expect("parent segment present")
            .sub_regions = final_list;
    }

    for rid in rid_list {
        if !normal_regions.contains(rid) {
            continue;
        }
        resolve_normal_region(rid, i, regions, segments, subgraph)?;
    }

    Ok(())
}

/// Builds a synthetic wrapper region+segment summarizing `window_ids`,
/// moving each wrapped region (and its segments) one level deeper.
fn wrap_window(
    parent_segment_id: &SegmentId,
    window_ids: &[RegionId],
    i: u32,
    regions: &mut RegionTable,
    segments: &mut SegmentTable,
    ids: &mut IdGenerator,
    haplotypes: &[String],
    subgraph: &str,
) -> Result<RegionId> {
    let parent_sources = segments.get(parent_segment_id).expect("parent segment present").sources.clone();

    let mut total_length = 0u64;
    let mut direct_variants = 0u64;
    let mut total_variants = 0u64;
    for rid in window_ids {
        let region = regions.get(rid).ok_or_else(|| HapError::InternalInvariant {
            subgraph: subgraph.to_string(),
            detail: format!("wrapped region {rid} vanished mid-wrap"),
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
            detail: format!("wrapper under {parent_segment_id} has {direct_variants} direct variants, exceeding the 255 cap"),
        });
    }

    let semantic_name = ids.next(IdKind::Con);

    let mut wrapper_region = Region::new(ids.next_region(), RegionType::Con);
    wrapper_region.level_range = Some(LevelRange::single(i));
    wrapper_region.sources = parent_sources.clone();
    wrapper_region.length = total_length;
    wrapper_region.min_length = total_length;
    wrapper_region.total_variants = total_variants;
    wrapper_region.parent_segment = Some(parent_segment_id.clone());
    wrapper_region.semantic_id = Some(semantic_name.clone());

    let mut wrapper_segment = Segment::new(ids.next_segment());
    wrapper_segment.level_range = Some(LevelRange::single(i));
    wrapper_segment.sources = parent_sources.clone();
    wrapper_segment.length = total_length;
    wrapper_segment.frequency = parent_sources.len() as f32 / haplotypes.len() as f32;
    wrapper_segment.is_wrapper = true;
    wrapper_segment.direct_variants = direct_variants;
    wrapper_segment.total_variants = total_variants;
    wrapper_segment.semantic_id = Some(semantic_name);
    wrapper_segment.sub_regions = window_ids.to_vec();

    wrapper_region.segments.push(wrapper_segment.id.clone());
    let wrapper_segment_id = wrapper_segment.id.clone();
    let wrapper_region_id = wrapper_region.id.clone();

    for rid in window_ids {
        let segment_ids = regions.get(rid).expect("region present, checked above").segments.clone();
        let region = regions.get_mut(rid).expect("region present, checked above");
        region.level_range = Some(LevelRange::single(i + 1));
        region.parent_segment = Some(wrapper_segment_id.clone());
        for sid in segment_ids {
            if let Some(segment) = segments.get_mut(&sid) {
                segment.level_range = Some(LevelRange::single(i + 1));
            }
        }
    }

    segments.insert(wrapper_segment);
    regions.insert(wrapper_region);

    Ok(wrapper_region_id)
}

/// A region its parent segment's window-finding pass left alone: either a
/// true leaf (pass-through to the next level unchanged) or a region with
/// real substructure of its own, in which case it stays visible at this
/// level *and* its own children become visible one level deeper.
fn resolve_normal_region(
    rid: &RegionId,
    i: u32,
    regions: &mut RegionTable,
    segments: &mut SegmentTable,
    subgraph: &str,
) -> Result<()> {
    let segment_ids = regions
        .get(rid)
        .ok_or_else(|| HapError::InternalInvariant {
            subgraph: subgraph.to_string(),
            detail: format!("region {rid} vanished mid-wrap"),
        })?
        .segments
        .clone();

    let pass_through = LevelRange { low: i, high: i + 1 };
    regions.get_mut(rid).expect("region present, checked above").level_range = Some(pass_through);

    let mut grandchildren: Vec<RegionId> = Vec::new();
    for sid in &segment_ids {
        let segment = segments.get_mut(sid).ok_or_else(|| HapError::InternalInvariant {
            subgraph: subgraph.to_string(),
            detail: format!("segment {sid} vanished mid-wrap"),
        })?;
        segment.level_range = Some(pass_through);
        grandchildren.extend(segment.sub_regions.iter().cloned());
    }

    for gc in &grandchildren {
        let gc_segment_ids = regions.get(gc).expect("grandchild region present").segments.clone();
        regions.get_mut(gc).expect("grandchild region present").level_range = Some(LevelRange::single(i + 1));
        for sid in gc_segment_ids {
            if let Some(segment) = segments.get_mut(&sid) {
                segment.level_range = Some(LevelRange::single(i + 1));
            }
        }
    }

    Ok(())
}
