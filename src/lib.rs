//! Hierarchical Pangenome construction core: turns a parsed GFA-derived DAG
//! into a multi-level Region–Segment Tree.
//!
//! The five in-process phases run in a fixed pipeline for one subgraph:
//!
//! ```text
//! graph::Dag::load -> build::graph_to_rst -> props::calc_props_l2r
//!   -> wrap::wrap_rst -> coords::calc_props_r2l
//! ```
//!
//! [`build_rst`] runs all five for a single subgraph; [`scheduler`] fans
//! that out over however many independent subgraphs the splitter
//! collaborator produced. GFA parsing, chromosome splitting, persistence,
//! and CLI dispatch are out of scope — this crate starts from an
//! already-parsed [`graph::InputGraph`].

pub mod build;
pub mod coords;
pub mod error;
pub mod graph;
pub mod io;
pub mod props;
pub mod rst;
pub mod scheduler;
pub mod types;
pub mod wrap;

pub use error::{HapError, Result};
pub use rst::{Meta, Region, RegionTable, RegionType, Segment, SegmentTable};

use graph::{Dag, InputGraph};

/// The one external tunable of the pipeline, collected into a small config
/// struct rather than a bare positional argument. There is no sensible
/// default for `min_resolution`, so this has no `Default` impl — callers
/// must choose one.
#[derive(Debug, Clone, Copy)]
pub struct BuildOptions {
    /// bp-per-pixel; must be `> 0` or `build_rst` fails with
    /// `InvalidResolution`.
    pub min_resolution: f64,
}

/// Runs the full core pipeline for one subgraph:
///
/// ```text
/// build_rst(graph, options, subgraph) -> (RegionTable, SegmentTable, Meta)
/// ```
///
/// `subgraph` names this task for error reporting and for namespacing its
/// ids against any sibling subgraphs the caller builds separately — this
/// function's own id counters always start at 0 and never escape it.
pub fn build_rst(graph: &InputGraph, options: BuildOptions, subgraph: &str) -> Result<(RegionTable, SegmentTable, Meta)> {
    let dag = Dag::load(graph, subgraph)?;
    let (mut regions, mut segments, mut ids) = build::graph_to_rst(dag, graph.haplotypes.clone(), subgraph)?;

    props::calc_props_l2r(&mut regions, &mut segments, &mut ids, &graph.haplotypes, subgraph)?;

    let mut meta = Meta {
        sources: graph.haplotypes.clone(),
        name: subgraph.to_string(),
        max_level: 0,
        total_length: 0,
        total_variants: 0,
    };
    wrap::wrap_rst(
        &mut regions,
        &mut segments,
        &mut ids,
        &graph.haplotypes,
        &mut meta,
        options.min_resolution,
        subgraph,
    )?;

    coords::calc_props_r2l(&mut regions, &mut segments, &meta, subgraph)?;

    meta.total_variants = regions.root().map(|r| r.total_variants).unwrap_or(0);

    Ok((regions, segments, meta))
}
