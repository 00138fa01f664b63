//! Subgraph Scheduler: fans `build_rst` out over however many independent
//! subgraphs the (out-of-scope) splitter collaborator produced, one `rayon`
//! task per subgraph, each entirely single-threaded internally with no
//! shared mutable state.

use rayon::prelude::*;

use crate::build_rst;
use crate::error::{HapError, Result};
use crate::graph::InputGraph;
use crate::rst::{Meta, RegionTable, SegmentTable};
use crate::BuildOptions;

/// One independent subgraph, named for error reporting and for namespacing
/// its output ids against its siblings': per-task counters restart at 0, so
/// the caller must rename before merging.
pub struct Subgraph {
    pub name: String,
    pub graph: InputGraph,
}

/// Runs [`build_rst`] for every subgraph concurrently, fail-fast: the first
/// per-task error encountered (by completion order, not input order) is
/// returned and any results from subgraphs that succeeded are discarded.
/// Partial results are never emitted.
pub fn build_rst_all(subgraphs: &[Subgraph], options: BuildOptions) -> Result<Vec<(String, RegionTable, SegmentTable, Meta)>> {
    subgraphs
        .par_iter()
        .map(|sg| -> Result<(String, RegionTable, SegmentTable, Meta)> {
            let (regions, segments, meta) = build_rst(&sg.graph, options, &sg.name)?;
            Ok((sg.name.clone(), regions, segments, meta))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{InputEdge, InputNode};

    fn linear(name: &str) -> Subgraph {
        Subgraph {
            name: name.to_string(),
            graph: InputGraph {
                nodes: vec![InputNode::new("n1", 10, 1.0, vec!["h1".into()])],
                edges: vec![],
                haplotypes: vec!["h1".into()],
            },
        }
    }

    #[test]
    fn runs_independent_subgraphs_to_completion() {
        let subgraphs = vec![linear("a"), linear("b"), linear("c")];
        let results = build_rst_all(&subgraphs, BuildOptions { min_resolution: 0.04 }).expect("all subgraphs build");
        assert_eq!(results.len(), 3);
        for (_, regions, _, _) in &results {
            assert!(regions.root().is_some());
        }
    }

    #[test]
    fn surfaces_the_failing_subgraph() {
        let mut bad = linear("bad");
        bad.graph.nodes[0].length = None;
        let subgraphs = vec![linear("good"), bad];
        let err = build_rst_all(&subgraphs, BuildOptions { min_resolution: 0.04 }).unwrap_err();
        assert!(matches!(err, HapError::LengthMissing { .. }));
    }
}
