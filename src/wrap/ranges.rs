//! Wrap-window discovery and merging: for a region too small to read at the
//! current resolution, extend left and right until the accumulated length
//! clears the threshold, each hop skipping past `con` regions to land on
//! the next real variant — then collapse the resulting windows into the
//! smallest set of non-overlapping ranges.

use crate::rst::{RegionTable, RegionType};
use crate::types::RegionId;

/// Extends `posi` outward within `rid_list` until the wrapped span's total
/// length reaches `threshold`, or both ends of the list are exhausted.
/// Returns the inclusive `[lo, hi]` index range to wrap.
pub(super) fn extend_window(rid_list: &[RegionId], posi: usize, threshold: f64, regions: &RegionTable) -> (usize, usize) {
    let len = rid_list.len() as isize;
    let mut b: isize = posi as isize;
    let mut a: isize = posi as isize;
    let mut total_len: u64 = 0;

    while (total_len as f64) < threshold && !(b < 0 && a > len - 1) {
        if b >= 1 {
            let lefti = b;
            b = -1;
            for j in (0..lefti).rev() {
                if !is_con(rid_list, j as usize, regions) {
                    b = j;
                    break;
                }
            }
        } else {
            b = -1;
        }

        if a <= len - 2 {
            let righti = a;
            a = len;
            for j in (righti + 1)..len {
                if !is_con(rid_list, j as usize, regions) {
                    a = j;
                    break;
                }
            }
        } else {
            a = len;
        }

        let lo = (b + 1).max(0) as usize;
        let hi = a.max(0) as usize;
        total_len = rid_list
            .get(lo..hi.min(rid_list.len()))
            .unwrap_or(&[])
            .iter()
            .map(|rid| regions.get(rid).map(|r| r.length).unwrap_or(0))
            .sum();
    }

    let lo = (b + 1).max(0) as usize;
    let hi = (a - 1).max(lo as isize) as usize;
    (lo, hi)
}

fn is_con(rid_list: &[RegionId], idx: usize, regions: &RegionTable) -> bool {
    regions
        .get(&rid_list[idx])
        .is_some_and(|r| matches!(r.region_type, RegionType::Con))
}

/// Merges a sequence of `[lo, hi]` index ranges, already sorted by `lo` by
/// construction (windows are discovered in `rid_list` order), collapsing
/// any that touch or overlap.
pub(super) fn merge_ranges(ranges: Vec<(usize, usize)>) -> Vec<(usize, usize)> {
    let mut merged: Vec<(usize, usize)> = Vec::new();
    for (lo, hi) in ranges {
        match merged.last_mut() {
            Some(last) if last.1 >= lo => last.1 = last.1.max(hi),
            _ => merged.push((lo, hi)),
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rst::Region;

    #[test]
    fn merge_ranges_joins_only_true_overlaps() {
        assert_eq!(merge_ranges(vec![(0, 2), (2, 4)]), vec![(0, 4)]);
        assert_eq!(merge_ranges(vec![(0, 2), (3, 4)]), vec![(0, 2), (3, 4)]);
        assert_eq!(merge_ranges(vec![(0, 5), (1, 2)]), vec![(0, 5)]);
    }

    #[test]
    fn extend_window_skips_con_regions_and_stops_at_threshold() {
        let mut regions = RegionTable::default();
        let rid_list: Vec<RegionId> = (0..5).map(|i| RegionId(format!("r-{i}"))).collect();

        for (i, rid) in rid_list.iter().enumerate() {
            let region_type = if i == 1 || i == 3 { RegionType::Con } else { RegionType::Var };
            let mut region = Region::new(rid.clone(), region_type);
            region.length = 10;
            regions.insert(region);
        }

        let (lo, hi) = extend_window(&rid_list, 2, 25.0, &regions);
        assert_eq!((lo, hi), (1, 3));
    }
}
