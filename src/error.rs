//! Typed failure modes for the core pipeline.
//!
//! One variant per failure kind, each carrying the subgraph name and the
//! offending identifier when one applies.

use miette::Diagnostic;
use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, HapError>;

#[derive(Debug, Clone, Error, Diagnostic, PartialEq)]
pub enum HapError {
    #[error("[{subgraph}] graph contains a cycle{}", format_at(.vertex))]
    CycleDetected {
        subgraph: String,
        vertex: Option<String>,
    },

    #[error("[{subgraph}] graph is not weakly connected")]
    Disconnected { subgraph: String },

    #[error("[{subgraph}] vertex {vertex:?} has no known length")]
    LengthMissing { subgraph: String, vertex: String },

    #[error("[{subgraph}] could not resolve topology at {vertex:?}: {detail}")]
    UnresolvedTopology {
        subgraph: String,
        vertex: String,
        detail: String,
    },

    #[error("[{subgraph}] min_resolution must be > 0, got {min_resolution}")]
    InvalidResolution {
        subgraph: String,
        min_resolution: f64,
    },

    #[error("[{subgraph}] wrapping left {count} region(s) without a level range, starting at {first_region:?}")]
    WrappingIncomplete {
        subgraph: String,
        count: usize,
        first_region: String,
    },

    #[error("[{subgraph}] segment {segment:?} (length {segment_length}) does not fit parent region {parent_region:?} (window {window_length})")]
    LengthOverflow {
        subgraph: String,
        segment: String,
        segment_length: u64,
        parent_region: String,
        window_length: u64,
    },

    #[error("[{subgraph}] internal invariant violated: {detail}")]
    InternalInvariant { subgraph: String, detail: String },
}

fn format_at(vertex: &Option<String>) -> String {
    match vertex {
        Some(v) => format!(" at vertex {v:?}"),
        None => String::new(),
    }
}
