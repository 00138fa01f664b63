//! Deletion-site repair: fires when a path walk reaches a
//! vertex that is already queued as someone else's branch start, meaning the
//! graph has a direct edge shortcutting past one or more vertices another
//! branch still expects to traverse. A zero-length carrier vertex is spliced
//! into that shortcut so the rejoin point keeps a single, unambiguous
//! predecessor.

use petgraph::graph::NodeIndex;

use super::Builder;
use crate::error::{HapError, Result};

impl Builder {
    pub(super) fn repair_deletion_site(
        &mut self,
        node: NodeIndex,
        queue_pos: usize,
        last: NodeIndex,
        subgraph: &str,
    ) -> Result<()> {
        let farther = self
            .dag
            .predecessors_in_order(node)
            .into_iter()
            .find(|&p| self.visited.contains(&p) && p != last)
            .ok_or_else(|| HapError::UnresolvedTopology {
                subgraph: subgraph.to_string(),
                vertex: self.dag.vertex(node).name.clone(),
                detail: "no visited predecessor distinct from the arriving branch".to_string(),
            })?;

        let carrier_name = self.ids.next(crate::rst::IdKind::Segment);
        tracing::debug!(
            vertex = %self.dag.vertex(node).name,
            carrier = %carrier_name,
            "deletion-site repair: splicing carrier into bypass edge"
        );
        let carrier = self.dag.add_synthetic_vertex(carrier_name);
        self.dag.add_edge(farther, carrier);
        self.dag.add_edge(carrier, node);
        self.dag.remove_edge(farther, node);

        self.path_starts[queue_pos] = carrier;

        Ok(())
    }
}
