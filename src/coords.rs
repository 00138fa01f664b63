//! Root-to-Leaf Coordinate Filler: a breadth-first pass down
//! from the root region that assigns every segment a centered pixel/bp
//! window within its parent, lays its child regions out contiguously inside
//! that window, and marks the unique rank-0 descent as the default path.

use std::collections::VecDeque;

use crate::error::{HapError, Result};
use crate::rst::{Meta, RegionTable, SegmentTable};
use crate::types::{Coordinate, RegionId};

/// Runs the root-to-leaf coordinate pass, assigning `coordinate` and
/// `is_default` to every region and segment reachable from the root.
pub fn calc_props_r2l(regions: &mut RegionTable, segments: &mut SegmentTable, meta: &Meta, subgraph: &str) -> Result<()> {
    let root_id = regions.root_id().ok_or_else(|| HapError::InternalInvariant {
        subgraph: subgraph.to_string(),
        detail: "no root region (none with an empty parent_segment)".to_string(),
    })?;

    {
        let root = regions.get_mut(&root_id).expect("root region present");
        root.coordinate = Some(Coordinate {
            start: 0,
            end: meta.total_length,
        });
        root.is_default = true;
    }

    let mut queue: VecDeque<RegionId> = VecDeque::new();
    queue.push_back(root_id);

    while let Some(region_id) = queue.pop_front() {
        let (parent_window, parent_is_default, segment_ids) = {
            let region = regions.get(&region_id).ok_or_else(|| HapError::InternalInvariant {
                subgraph: subgraph.to_string(),
                detail: format!("region {region_id} vanished mid-layout"),
            })?;
            let window = region.coordinate.ok_or_else(|| HapError::InternalInvariant {
                subgraph: subgraph.to_string(),
                detail: format!("region {region_id} reached layout with no coordinate"),
            })?;
            (window, region.is_default, region.segments.clone())
        };

        for segment_id in &segment_ids {
            let segment_length = segments
                .get(segment_id)
                .ok_or_else(|| HapError::InternalInvariant {
                    subgraph: subgraph.to_string(),
                    detail: format!("segment {segment_id} vanished mid-layout"),
                })?
                .length;
            let window_length = parent_window.len();

            if segment_length > window_length {
                return Err(HapError::LengthOverflow {
                    subgraph: subgraph.to_string(),
                    segment: segment_id.to_string(),
                    segment_length,
                    parent_region: region_id.to_string(),
                    window_length,
                });
            }

            let start = parent_window.start + (window_length - segment_length) / 2;
            let segment_coordinate = Coordinate {
                start,
                end: start + segment_length,
            };

            let (rank, sub_regions) = {
                let segment = segments.get_mut(segment_id).expect("segment present, checked above");
                segment.coordinate = Some(segment_coordinate);
                (segment.rank, segment.sub_regions.clone())
            };
            let segment_is_default = parent_is_default && rank == 0;

            let mut cursor = segment_coordinate.start;
            for child_id in &sub_regions {
                let child_length = regions
                    .get(child_id)
                    .ok_or_else(|| HapError::InternalInvariant {
                        subgraph: subgraph.to_string(),
                        detail: format!("child region {child_id} vanished mid-layout"),
                    })?
                    .length;
                let child = regions.get_mut(child_id).expect("child region present, checked above");
                child.coordinate = Some(Coordinate {
                    start: cursor,
                    end: cursor + child_length,
                });
                child.is_default = segment_is_default;
                cursor += child_length;
                queue.push_back(child_id.clone());
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rst::{Region, RegionType, Segment};
    use crate::types::{RegionId, SegmentId};

    /// A `con` region of length 100 with a single segment of length 60
    /// centers that segment at `[20, 80)`.
    #[test]
    fn segment_is_centered_within_its_parent_region() {
        let mut regions = RegionTable::default();
        let mut segments = SegmentTable::default();

        let mut root = Region::new(RegionId("r-1".to_string()), RegionType::Con);
        root.length = 100;

        let mut segment = Segment::new(SegmentId("s-1".to_string()));
        segment.length = 60;
        root.segments = vec![segment.id.clone()];

        regions.insert(root);
        segments.insert(segment);

        let meta = Meta {
            sources: vec!["h1".to_string()],
            name: "sg".to_string(),
            max_level: 0,
            total_length: 100,
            total_variants: 0,
        };
        calc_props_r2l(&mut regions, &mut segments, &meta, "sg").expect("layout succeeds");

        let segment = segments.get(&SegmentId("s-1".to_string())).expect("segment present");
        assert_eq!(segment.coordinate, Some(Coordinate { start: 20, end: 80 }));
    }

    /// Running the pass twice on the same tables yields the same output.
    #[test]
    fn layout_is_idempotent() {
        let mut regions = RegionTable::default();
        let mut segments = SegmentTable::default();

        let mut root = Region::new(RegionId("r-1".to_string()), RegionType::Con);
        root.length = 100;

        let mut segment = Segment::new(SegmentId("s-1".to_string()));
        segment.length = 60;
        root.segments = vec![segment.id.clone()];
        regions.insert(root);
        segments.insert(segment);

        let meta = Meta {
            sources: vec!["h1".to_string()],
            name: "sg".to_string(),
            max_level: 0,
            total_length: 100,
            total_variants: 0,
        };
        calc_props_r2l(&mut regions, &mut segments, &meta, "sg").expect("first pass succeeds");
        let first: Vec<_> = segments.iter().map(|(id, s)| (id.clone(), s.coordinate)).collect();

        calc_props_r2l(&mut regions, &mut segments, &meta, "sg").expect("second pass succeeds");
        let second: Vec<_> = segments.iter().map(|(id, s)| (id.clone(), s.coordinate)).collect();

        assert_eq!(first, second);
    }
}
