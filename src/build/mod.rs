//! RST Builder: walks the DAG breadth-first over whole paths,
//! turning each branch point into a `var` region and each consumed vertex
//! into a segment, splicing in zero-length carrier vertices wherever a
//! branch rejoins the graph ahead of where its sibling expects it to.
//!
//! Accumulates into owned region/segment tables and validates once at the
//! end, rather than mutating a shared structure incrementally.

mod allele;
mod deletion;
mod path;

use std::collections::VecDeque;

use petgraph::graph::NodeIndex;

use crate::error::{HapError, Result};
use crate::graph::Dag;
use crate::rst::{IdGenerator, Region, RegionTable, RegionType, Segment, SegmentTable};
use crate::types::{HashMap, HashSet, RegionId, SegmentId};

/// Mutable state threaded through one subgraph's traversal. Never shared
/// across subgraphs: the scheduler hands each task its own.
pub(crate) struct Builder {
    pub(crate) dag: Dag,
    pub(crate) haplotypes: Vec<String>,
    pub(crate) visited: HashSet<NodeIndex>,
    pub(crate) path_starts: VecDeque<NodeIndex>,
    pub(crate) paths: Vec<Vec<NodeIndex>>,
    pub(crate) node_parent_segment: HashMap<NodeIndex, SegmentId>,
    pub(crate) node_path_index: HashMap<NodeIndex, usize>,
    pub(crate) before_to_region: HashMap<String, RegionId>,
    pub(crate) ids: IdGenerator,
    pub(crate) regions: RegionTable,
    pub(crate) segments: SegmentTable,
}

/// Runs the RST Builder over a loaded, validated DAG, returning its region
/// and segment tables with raw structural `level_range`s (nesting depth, not
/// yet the final hierarchy the hierarchical wrapper produces) plus the id
/// generator it used — later pipeline phases mint `r-`/`s-` ids of their own
/// (classification's semantic names share the same counter map, wrapper
/// regions/segments reuse the plain `r-`/`s-` prefixes) and MUST continue
/// from here rather than restart at 0, or they'd collide with ids already
/// live in the tables.
pub fn graph_to_rst(dag: Dag, haplotypes: Vec<String>, subgraph: &str) -> Result<(RegionTable, SegmentTable, IdGenerator)> {
    let start = dag.start();
    let mut builder = Builder {
        dag,
        haplotypes,
        visited: HashSet::default(),
        path_starts: VecDeque::new(),
        paths: Vec::new(),
        node_parent_segment: HashMap::default(),
        node_path_index: HashMap::default(),
        before_to_region: HashMap::default(),
        ids: IdGenerator::default(),
        regions: RegionTable::default(),
        segments: SegmentTable::default(),
    };
    builder.path_starts.push_back(start);

    while let Some(s) = builder.path_starts.pop_front() {
        if builder.visited.contains(&s) {
            continue;
        }
        builder.process_path(s, subgraph)?;
    }
    builder.finalize_leftover_vertices(subgraph)?;

    Ok((builder.regions, builder.segments, builder.ids))
}

impl Builder {
    /// Processes one independent path: sets up its owning region (creating a
    /// new `var` region for a fresh branch, or appending to the existing one
    /// for a repeat branch off the same vertex), walks its vertices into a
    /// segment, and — for side paths — builds the corresponding allele
    /// segment on the original path.
    fn process_path(&mut self, start: NodeIndex, subgraph: &str) -> Result<()> {
        let is_main = start == self.dag.start();

        if is_main {
            let region_id = self.ids.next_region();
            let mut region = Region::new(region_id, RegionType::Con);
            region.sources = self.haplotypes.iter().cloned().collect();
            region.level_range = Some(crate::types::LevelRange::single(0));

            let segment_id = self.ids.next_segment();
            let mut segment = Segment::new(segment_id);
            segment.level_range = Some(crate::types::LevelRange::single(0));
            segment.is_wrapper = true;

            let path = self.walk_path(start, &mut segment, subgraph)?;
            self.finish_segment(&mut region, segment, &path);
            self.regions.insert(region);
            return Ok(());
        }

        let before = *self
            .dag
            .predecessors_in_order(start)
            .first()
            .ok_or_else(|| HapError::UnresolvedTopology {
                subgraph: subgraph.to_string(),
                vertex: self.dag.vertex(start).name.clone(),
                detail: "side path start has no predecessor".to_string(),
            })?;
        let before_name = self.dag.vertex(before).name.clone();

        let (region_id, level, is_fresh) = if let Some(existing) = self.before_to_region.get(&before_name) {
            let level = self
                .regions
                .get(existing)
                .and_then(|r| r.level_range)
                .map(|lr| lr.low)
                .ok_or_else(|| HapError::InternalInvariant {
                    subgraph: subgraph.to_string(),
                    detail: format!("region {existing} missing level_range"),
                })?;
            (existing.clone(), level, false)
        } else {
            let parent_segment_id = self.node_parent_segment.get(&before).cloned().ok_or_else(|| {
                HapError::InternalInvariant {
                    subgraph: subgraph.to_string(),
                    detail: format!("vertex {before_name:?} has no recorded parent segment"),
                }
            })?;
            let parent_level = self
                .segments
                .get(&parent_segment_id)
                .and_then(|s| s.level_range)
                .map(|lr| lr.low)
                .ok_or_else(|| HapError::InternalInvariant {
                    subgraph: subgraph.to_string(),
                    detail: format!("segment {parent_segment_id} missing level_range"),
                })?;
            let level = parent_level + 1;
            let parent_sources = self
                .segments
                .get(&parent_segment_id)
                .map(|s| s.sources.clone())
                .unwrap_or_default();

            if before_name != crate::graph::dag::START {
                let before_vertex = self.dag.vertex(before).clone();
                let mut pre_region = Region::new(self.ids.next_region(), RegionType::Con);
                pre_region.level_range = Some(crate::types::LevelRange::single(level));
                pre_region.sources = parent_sources.clone();
                let mut pre_segment = Segment::new(SegmentId(before_vertex.name.clone()));
                pre_segment.level_range = pre_region.level_range;
                pre_segment.length = before_vertex.length;
                pre_segment.sources = parent_sources.clone();
                pre_segment.frequency = pre_segment.sources.len() as f32 / self.haplotypes.len() as f32;
                pre_region.parent_segment = Some(parent_segment_id.clone());
                pre_region.segments.push(pre_segment.id.clone());
                let pre_region_id = pre_region.id.clone();
                self.segments.insert(pre_segment);
                self.regions.insert(pre_region);
                self.segments
                    .get_mut(&parent_segment_id)
                    .expect("parent segment present")
                    .sub_regions
                    .push(pre_region_id);
            }

            let mut region = Region::new(self.ids.next_region(), RegionType::Var);
            region.level_range = Some(crate::types::LevelRange::single(level));
            region.parent_segment = Some(parent_segment_id.clone());
            region.sources = parent_sources;
            region.before = Some(before_name.clone());
            let region_id = region.id.clone();
            self.before_to_region.insert(before_name.clone(), region_id.clone());
            self.regions.insert(region);
            self.segments
                .get_mut(&parent_segment_id)
                .expect("parent segment present")
                .sub_regions
                .push(region_id.clone());
            (region_id, level, true)
        };
        self.node_parent_segment.remove(&before);

        let segment_id = self.ids.next_segment();
        let mut segment = Segment::new(segment_id);
        segment.level_range = Some(crate::types::LevelRange::single(level));

        let path = self.walk_path(start, &mut segment, subgraph)?;
        let last = *path.last().expect("path is non-empty");
        self.finish_segment_into(&region_id, segment, &path, subgraph)?;

        // The allele segment represents the fixed sub-interval of the
        // original path between `before` and `after`: it's a property of
        // the region, not of any one branch off it, so it's only built the
        // first time this `before` locus is seen. Building it again for
        // every later branch off the same locus would append duplicate
        // segment rows for loci with 3+ alternatives and break the
        // rank-is-a-permutation invariant.
        if is_fresh {
            self.build_allele_segment(&region_id, before, last, level, subgraph)?;
        }

        Ok(())
    }

    /// Finalizes a freshly built `segment` into `region` (the fields shared
    /// by the main path and the first branch off a locus), applying the
    /// single-vertex collapse rule.
    fn finish_segment(&mut self, region: &mut Region, mut segment: Segment, path: &[NodeIndex]) {
        if path.len() == 1 {
            let vertex = self.dag.vertex(path[0]).clone();
            segment.collapse_id_to(&vertex.name);
            segment.length = vertex.length;
            self.node_parent_segment.remove(&path[0]);
            self.node_path_index.remove(&path[0]);
        } else {
            self.paths.push(path.to_vec());
        }
        region.segments.push(segment.id.clone());
        self.segments.insert(segment);
    }

    /// Same as [`Self::finish_segment`] but for a side path joining an
    /// already-existing region by id (the "reused" branch, and every side
    /// path's own segment in general).
    fn finish_segment_into(
        &mut self,
        region_id: &RegionId,
        mut segment: Segment,
        path: &[NodeIndex],
        subgraph: &str,
    ) -> Result<()> {
        if path.len() == 1 {
            let vertex = self.dag.vertex(path[0]).clone();
            segment.collapse_id_to(&vertex.name);
            segment.length = vertex.length;
            self.node_parent_segment.remove(&path[0]);
            self.node_path_index.remove(&path[0]);
        } else {
            segment.is_wrapper = true;
            self.paths.push(path.to_vec());
        }
        let segment_id = segment.id.clone();
        self.segments.insert(segment);
        self.regions
            .get_mut(region_id)
            .ok_or_else(|| HapError::InternalInvariant {
                subgraph: subgraph.to_string(),
                detail: format!("region {region_id} vanished mid-build"),
            })?
            .segments
            .push(segment_id);
        Ok(())
    }

    /// Turns every vertex still carrying a recorded parent segment (i.e.
    /// every interior vertex of a multi-vertex path that never collapsed)
    /// into its own singleton `con` region, one level below its owner.
    fn finalize_leftover_vertices(&mut self, subgraph: &str) -> Result<()> {
        let indices: Vec<NodeIndex> = self.dag.graph.node_indices().collect();
        for idx in indices {
            if idx == self.dag.start() || idx == self.dag.end() {
                self.node_parent_segment.remove(&idx);
                continue;
            }
            let Some(parent_segment_id) = self.node_parent_segment.remove(&idx) else {
                continue;
            };
            let parent_segment = self.segments.get(&parent_segment_id).ok_or_else(|| HapError::InternalInvariant {
                subgraph: subgraph.to_string(),
                detail: format!("segment {parent_segment_id} vanished mid-build"),
            })?;
            let level = parent_segment
                .level_range
                .ok_or_else(|| HapError::InternalInvariant {
                    subgraph: subgraph.to_string(),
                    detail: format!("segment {parent_segment_id} missing level_range"),
                })?
                .low
                + 1;
            let parent_sources = parent_segment.sources.clone();

            let vertex = self.dag.vertex(idx).clone();
            let mut region = Region::new(self.ids.next_region(), RegionType::Con);
            region.level_range = Some(crate::types::LevelRange::single(level));
            region.sources = parent_sources.clone();
            region.parent_segment = Some(parent_segment_id.clone());

            let mut segment = Segment::new(SegmentId(vertex.name.clone()));
            segment.level_range = region.level_range;
            segment.length = vertex.length;
            segment.sources = parent_sources;
            segment.frequency = segment.sources.len() as f32 / self.haplotypes.len() as f32;
            region.segments.push(segment.id.clone());

            let region_id = region.id.clone();
            self.segments.insert(segment);
            self.regions.insert(region);
            self.segments
                .get_mut(&parent_segment_id)
                .expect("parent segment present")
                .sub_regions
                .push(region_id);
        }
        Ok(())
    }
}
