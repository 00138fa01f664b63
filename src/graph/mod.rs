//! Graph Loader: validates and wraps an input graph into a typed DAG.

pub mod dag;
pub mod model;

pub use dag::Dag;
pub use model::{InputEdge, InputGraph, InputNode};
