//! Input DTOs handed to the core by the (out-of-scope) GFA parsing and
//! subgraph-splitting collaborators.

use crate::types::HashSet;

/// A single graph vertex as produced by the GFA parser, before sentinel
/// insertion.
#[derive(Debug, Clone)]
pub struct InputNode {
    pub name: String,
    /// `None` means "unknown", which is rejected with
    /// [`crate::error::HapError::LengthMissing`] for non-sentinel vertices.
    pub length: Option<u64>,
    pub frequency: f32,
    pub sources: Vec<String>,
}

impl InputNode {
    pub fn new(name: impl Into<String>, length: u64, frequency: f32, sources: Vec<String>) -> Self {
        Self {
            name: name.into(),
            length: Some(length),
            frequency,
            sources,
        }
    }
}

/// A directed edge between two (by-name) vertices.
#[derive(Debug, Clone)]
pub struct InputEdge {
    pub source: String,
    pub target: String,
}

impl InputEdge {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }
}

/// The full input to the Graph Loader: nodes, edges, and graph-level
/// metadata.
#[derive(Debug, Clone, Default)]
pub struct InputGraph {
    pub nodes: Vec<InputNode>,
    pub edges: Vec<InputEdge>,
    pub haplotypes: Vec<String>,
}

impl InputGraph {
    pub fn haplotype_set(&self) -> HashSet<String> {
        self.haplotypes.iter().cloned().collect()
    }
}
