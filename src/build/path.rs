//! Per-node path walking: consumes vertices one at a time until the current
//! one has no unvisited successor left, stashing any extra branches for
//! later.

use petgraph::graph::NodeIndex;

use super::Builder;
use crate::error::{HapError, Result};
use crate::graph::dag::{END, START};
use crate::rst::Segment;

impl Builder {
    /// Walks the unvisited path `start` belongs to, recording each vertex's
    /// owning `segment` and accumulating `segment`'s sources/frequency along
    /// the way. Returns the consumed vertices in traversal order.
    pub(super) fn walk_path(&mut self, start: NodeIndex, segment: &mut Segment, subgraph: &str) -> Result<Vec<NodeIndex>> {
        let mut path = Vec::new();
        let mut current = start;
        let mut last: Option<NodeIndex> = None;
        let path_index = self.paths.len();

        loop {
            self.visited.insert(current);
            path.push(current);

            if let Some(queue_pos) = self.path_starts.iter().position(|&v| v == current) {
                let last = last.ok_or_else(|| HapError::InternalInvariant {
                    subgraph: subgraph.to_string(),
                    detail: "deletion-site repair triggered on the first vertex of a path".to_string(),
                })?;
                self.repair_deletion_site(current, queue_pos, last, subgraph)?;
            }

            self.node_parent_segment.insert(current, segment.id.clone());
            self.node_path_index.insert(current, path_index);

            let name = self.dag.vertex(current).name.clone();
            if name != START && name != END {
                let vertex = self.dag.vertex(current);
                segment.sources.extend(vertex.sources.iter().cloned());
                segment.frequency = segment.frequency.max(vertex.frequency);
            }

            last = Some(current);

            let mut next = None;
            for successor in self.dag.successors_in_order(current) {
                if self.visited.contains(&successor) {
                    continue;
                }
                if next.is_some() {
                    self.path_starts.push_back(successor);
                } else {
                    next = Some(successor);
                }
            }

            match next {
                Some(n) => current = n,
                None => break,
            }
        }

        Ok(path)
    }
}
