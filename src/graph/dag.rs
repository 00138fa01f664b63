//! Graph Loader: turns a flat node/edge list into a typed DAG
//! with exactly one `start` and one `end` sentinel.
//!
//! Sentinel contract: if the input already names a vertex `start`/`end`, it
//! is trusted as the sentinel and only *missing* attachments are filled in
//! (any other in-degree-0 or out-degree-0 vertex gets wired to it);
//! otherwise a fresh sentinel is synthesized and wired to every existing
//! source/sink.

use itertools::Itertools;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;

use crate::error::{HapError, Result};
use crate::graph::model::InputGraph;
use crate::types::HashMap;

pub const START: &str = "start";
pub const END: &str = "end";

/// A vertex in the loaded DAG.
#[derive(Debug, Clone)]
pub struct Vertex {
    pub name: String,
    pub length: u64,
    pub frequency: f32,
    pub sources: Vec<String>,
}

/// The loaded, validated DAG. Owned by the caller of [`build_rst`](crate::build_rst);
/// the RST Builder consumes it by value and is free to mutate its own copy
/// (deletion-site vertex insertion) without touching anyone else's graph.
#[derive(Debug, Clone)]
pub struct Dag {
    pub(crate) graph: DiGraph<Vertex, ()>,
    pub(crate) index_by_name: HashMap<String, NodeIndex>,
    pub(crate) start: NodeIndex,
    pub(crate) end: NodeIndex,
}

impl Dag {
    pub fn start(&self) -> NodeIndex {
        self.start
    }

    pub fn end(&self) -> NodeIndex {
        self.end
    }

    pub fn vertex(&self, idx: NodeIndex) -> &Vertex {
        &self.graph[idx]
    }

    pub fn index_of(&self, name: &str) -> Option<NodeIndex> {
        self.index_by_name.get(name).copied()
    }

    /// Successors of `idx` in edge-insertion order: branch-order ties are
    /// resolved deterministically by picking the first neighbor in edge
    /// order. `petgraph`'s own `neighbors()` walks its adjacency list
    /// newest-edge first, so this sorts by edge index to recover creation
    /// order.
    pub(crate) fn successors_in_order(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        self.graph
            .edges_directed(idx, Direction::Outgoing)
            .sorted_by_key(|e| e.id().index())
            .map(|e| e.target())
            .collect()
    }

    /// Predecessors of `idx` in edge-insertion order; see
    /// [`Self::successors_in_order`].
    pub(crate) fn predecessors_in_order(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        self.graph
            .edges_directed(idx, Direction::Incoming)
            .sorted_by_key(|e| e.id().index())
            .map(|e| e.source())
            .collect()
    }

    /// Inserts a zero-length carrier vertex at a deletion site: it owns no
    /// sequence and belongs to no haplotype, it only exists to give the
    /// bypassed interval a place to attach.
    pub(crate) fn add_synthetic_vertex(&mut self, name: String) -> NodeIndex {
        let idx = self.graph.add_node(Vertex {
            name: name.clone(),
            length: 0,
            frequency: 0.0,
            sources: Vec::new(),
        });
        self.index_by_name.insert(name, idx);
        idx
    }

    pub(crate) fn add_edge(&mut self, from: NodeIndex, to: NodeIndex) {
        self.graph.add_edge(from, to, ());
    }

    /// Removes the bypass edge a deletion-site repair splices a carrier
    /// vertex into. A no-op if the edge is already gone.
    pub(crate) fn remove_edge(&mut self, from: NodeIndex, to: NodeIndex) {
        if let Some(edge) = self.graph.find_edge(from, to) {
            self.graph.remove_edge(edge);
        }
    }

    /// Loads and validates a [`Dag`] from a parsed GFA-derived graph.
    pub fn load(input: &InputGraph, subgraph: &str) -> Result<Self> {
        let mut graph = DiGraph::new();
        let mut index_by_name = HashMap::default();
        let haplotype_set: crate::types::HashSet<&str> = input.haplotypes.iter().map(|h| h.as_str()).collect();

        for node in &input.nodes {
            let is_sentinel = node.name == START || node.name == END;
            let length = match node.length {
                Some(len) => len,
                None if is_sentinel => 0,
                None => {
                    return Err(HapError::LengthMissing {
                        subgraph: subgraph.to_string(),
                        vertex: node.name.clone(),
                    })
                }
            };
            if let Some(unknown) = node.sources.iter().find(|s| !haplotype_set.contains(s.as_str())) {
                return Err(HapError::InternalInvariant {
                    subgraph: subgraph.to_string(),
                    detail: format!("vertex {:?} carries source {unknown:?} not present in haplotypes", node.name),
                });
            }
            let idx = graph.add_node(Vertex {
                name: node.name.clone(),
                length,
                frequency: node.frequency,
                sources: node.sources.clone(),
            });
            if index_by_name.insert(node.name.clone(), idx).is_some() {
                return Err(HapError::InternalInvariant {
                    subgraph: subgraph.to_string(),
                    detail: format!("duplicate vertex name {:?}", node.name),
                });
            }
        }

        for edge in &input.edges {
            let source = *index_by_name.get(&edge.source).ok_or_else(|| HapError::InternalInvariant {
                subgraph: subgraph.to_string(),
                detail: format!("edge references unknown vertex {:?}", edge.source),
            })?;
            let target = *index_by_name.get(&edge.target).ok_or_else(|| HapError::InternalInvariant {
                subgraph: subgraph.to_string(),
                detail: format!("edge references unknown vertex {:?}", edge.target),
            })?;
            graph.add_edge(source, target, ());
        }

        let start = *index_by_name.entry(START.to_string()).or_insert_with(|| {
            graph.add_node(Vertex {
                name: START.to_string(),
                length: 0,
                frequency: 1.0,
                sources: input.haplotypes.clone(),
            })
        });
        let end = *index_by_name.entry(END.to_string()).or_insert_with(|| {
            graph.add_node(Vertex {
                name: END.to_string(),
                length: 0,
                frequency: 1.0,
                sources: input.haplotypes.clone(),
            })
        });

        let sources: Vec<NodeIndex> = graph
            .node_indices()
            .filter(|&idx| {
                idx != start
                    && idx != end
                    && graph.edges_directed(idx, Direction::Incoming).next().is_none()
            })
            .collect();
        for idx in sources {
            graph.add_edge(start, idx, ());
        }

        let sinks: Vec<NodeIndex> = graph
            .node_indices()
            .filter(|&idx| {
                idx != start
                    && idx != end
                    && graph.edges_directed(idx, Direction::Outgoing).next().is_none()
            })
            .collect();
        for idx in sinks {
            graph.add_edge(idx, end, ());
        }

        if let Err(cycle) = petgraph::algo::toposort(&graph, None) {
            let vertex = graph.node_weight(cycle.node_id()).map(|v| v.name.clone());
            return Err(HapError::CycleDetected {
                subgraph: subgraph.to_string(),
                vertex,
            });
        }

        let components = petgraph::algo::connected_components(&graph);
        if components > 1 {
            return Err(HapError::Disconnected {
                subgraph: subgraph.to_string(),
            });
        }

        Ok(Self {
            graph,
            index_by_name,
            start,
            end,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::model::{InputEdge, InputNode};

    fn linear_graph() -> InputGraph {
        InputGraph {
            nodes: vec![InputNode::new("n1", 10, 1.0, vec!["h1".into()])],
            edges: vec![],
            haplotypes: vec!["h1".into()],
        }
    }

    #[test]
    fn inserts_sentinels_around_a_single_vertex() {
        let dag = Dag::load(&linear_graph(), "sg").expect("loads");
        assert_eq!(dag.graph.node_count(), 3);
        let n1 = dag.index_of("n1").unwrap();
        assert!(dag.graph.contains_edge(dag.start(), n1));
        assert!(dag.graph.contains_edge(n1, dag.end()));
    }

    #[test]
    fn rejects_missing_length() {
        let input = InputGraph {
            nodes: vec![InputNode {
                name: "n1".into(),
                length: None,
                frequency: 1.0,
                sources: vec!["h1".into()],
            }],
            edges: vec![],
            haplotypes: vec!["h1".into()],
        };
        let err = Dag::load(&input, "sg").unwrap_err();
        assert!(matches!(err, HapError::LengthMissing { .. }));
    }

    #[test]
    fn rejects_cycles() {
        let input = InputGraph {
            nodes: vec![
                InputNode::new("a", 1, 1.0, vec!["h1".into()]),
                InputNode::new("b", 1, 1.0, vec!["h1".into()]),
            ],
            edges: vec![InputEdge::new("a", "b"), InputEdge::new("b", "a")],
            haplotypes: vec!["h1".into()],
        };
        let err = Dag::load(&input, "sg").unwrap_err();
        assert!(matches!(err, HapError::CycleDetected { .. }));
    }

    #[test]
    fn rejects_disconnected_components() {
        let input = InputGraph {
            nodes: vec![
                InputNode::new("a", 1, 1.0, vec!["h1".into()]),
                InputNode::new("b", 1, 1.0, vec!["h1".into()]),
            ],
            edges: vec![],
            haplotypes: vec!["h1".into()],
        };
        let err = Dag::load(&input, "sg").unwrap_err();
        assert!(matches!(err, HapError::Disconnected { .. }));
    }

    /// A vertex source outside the declared haplotype list is rejected at
    /// load time rather than silently skewing frequencies.
    #[test]
    fn rejects_sources_not_in_haplotypes() {
        let input = InputGraph {
            nodes: vec![InputNode::new("a", 1, 1.0, vec!["ghost".into()])],
            edges: vec![],
            haplotypes: vec!["h1".into()],
        };
        let err = Dag::load(&input, "sg").unwrap_err();
        assert!(matches!(err, HapError::InternalInvariant { .. }));
    }
}
