//! Allele segment construction: every side path has a counterpart on the
//! main path — the sub-interval between where it branched off (`before`)
//! and where it rejoins (`after`) — and that counterpart needs its own
//! segment in the same region so the two alternatives sit side by side.

use petgraph::graph::NodeIndex;

use super::Builder;
use crate::error::{HapError, Result};
use crate::rst::{IdKind, Segment};
use crate::types::{LevelRange, RegionId, SegmentId};

impl Builder {
    pub(super) fn build_allele_segment(
        &mut self,
        region_id: &RegionId,
        before: NodeIndex,
        last: NodeIndex,
        level: u32,
        subgraph: &str,
    ) -> Result<()> {
        let path_index = *self
            .node_path_index
            .get(&before)
            .ok_or_else(|| HapError::InternalInvariant {
                subgraph: subgraph.to_string(),
                detail: format!("vertex {:?} has no recorded path", self.dag.vertex(before).name),
            })?;
        let org_path = self.paths[path_index].clone();
        let b_pos = org_path
            .iter()
            .position(|&v| v == before)
            .ok_or_else(|| HapError::InternalInvariant {
                subgraph: subgraph.to_string(),
                detail: "before vertex missing from its own recorded path".to_string(),
            })?;

        let successors = self.dag.successors_in_order(last);
        if successors.iter().filter(|s| self.visited.contains(s)).count() > 1 {
            tracing::debug!(
                vertex = %self.dag.vertex(last).name,
                "multiple visited successors at side-path rejoin, picking the first in edge order"
            );
        }
        let after = successors
            .into_iter()
            .find(|s| self.visited.contains(s))
            .ok_or_else(|| HapError::UnresolvedTopology {
                subgraph: subgraph.to_string(),
                vertex: self.dag.vertex(last).name.clone(),
                detail: "side path end has no visited successor to rejoin at".to_string(),
            })?;
        let after_name = self.dag.vertex(after).name.clone();
        self.regions
            .get_mut(region_id)
            .ok_or_else(|| HapError::InternalInvariant {
                subgraph: subgraph.to_string(),
                detail: format!("region {region_id} vanished mid-build"),
            })?
            .after = Some(after_name);

        let a_pos = org_path.iter().position(|&v| v == after).ok_or_else(|| HapError::InternalInvariant {
            subgraph: subgraph.to_string(),
            detail: "after vertex missing from the original path".to_string(),
        })?;

        let mut allele_vertices: Vec<NodeIndex> = if b_pos < a_pos {
            org_path[b_pos + 1..a_pos].to_vec()
        } else {
            Vec::new()
        };

        if allele_vertices.is_empty() {
            let carrier_name = self.ids.next(IdKind::Segment);
            let carrier = self.dag.add_synthetic_vertex(carrier_name);
            self.dag.add_edge(before, carrier);
            self.dag.add_edge(carrier, after);
            self.dag.remove_edge(before, after);
            self.visited.insert(carrier);
            allele_vertices.push(carrier);
        }

        let allele_segment = if allele_vertices.len() == 1 {
            let v = allele_vertices[0];
            let vertex = self.dag.vertex(v).clone();
            let mut segment = Segment::new(SegmentId(vertex.name.clone()));
            segment.level_range = Some(LevelRange::single(level));
            segment.length = vertex.length;
            segment.frequency = vertex.frequency;
            segment.sources = vertex.sources.iter().cloned().collect();
            self.node_parent_segment.remove(&v);
            segment
        } else {
            let segment_id = self.ids.next_segment();
            let mut segment = Segment::new(segment_id.clone());
            segment.level_range = Some(LevelRange::single(level));
            segment.is_wrapper = true;
            for &v in &allele_vertices {
                self.node_parent_segment.insert(v, segment_id.clone());
                let vertex = self.dag.vertex(v);
                segment.sources.extend(vertex.sources.iter().cloned());
                segment.frequency = segment.frequency.max(vertex.frequency);
            }
            segment
        };

        let allele_id = allele_segment.id.clone();
        self.segments.insert(allele_segment);
        self.regions
            .get_mut(region_id)
            .expect("region present, checked above")
            .segments
            .push(allele_id);

        Ok(())
    }
}
