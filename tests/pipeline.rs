//! End-to-end pipeline coverage, run against the crate's public surface
//! rather than its private modules.

mod common;

use hap_core::graph::{InputEdge, InputGraph, InputNode};
use hap_core::{build_rst, BuildOptions, HapError, RegionType};
use rstest::rstest;

fn haplotypes(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

fn sources(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

/// A bubble with two equal-length alternatives off `n1` rejoining at `n2`
/// classifies as `snp` when both are single-bp, or `ale` for any other
/// common length (std/mean < 0.1).
#[rstest]
#[case(1, RegionType::Snp)]
#[case(5, RegionType::Ale)]
#[case(200, RegionType::Ale)]
fn bubble_classifies_by_allele_length(#[case] alt_length: u64, #[case] expected: RegionType) {
    common::init_tracing();

    let graph = InputGraph {
        nodes: vec![
            InputNode::new("n1", 1, 1.0, sources(&["h1", "h2"])),
            InputNode::new("a", alt_length, 0.5, sources(&["h1"])),
            InputNode::new("b", alt_length, 0.5, sources(&["h2"])),
            InputNode::new("n2", 1, 1.0, sources(&["h1", "h2"])),
        ],
        edges: vec![
            InputEdge::new("n1", "a"),
            InputEdge::new("n1", "b"),
            InputEdge::new("a", "n2"),
            InputEdge::new("b", "n2"),
        ],
        haplotypes: haplotypes(&["h1", "h2"]),
    };

    let (regions, _segments, _meta) = build_rst(&graph, BuildOptions { min_resolution: 0.04 }, "sg").expect("builds");

    let found = regions.iter().map(|(_, r)| r.region_type).find(|t| *t == expected);
    assert_eq!(found, Some(expected));
}

/// A direct bypass edge around a vertex triggers deletion-site repair and
/// the resulting region classifies as an indel; `min_length` reflects the
/// smallest non-deletion allele, not the zero-length deletion carrier.
#[test]
fn bypass_edge_is_repaired_into_a_deletion_site() {
    common::init_tracing();

    let graph = InputGraph {
        nodes: vec![
            InputNode::new("n1", 5, 1.0, sources(&["h1", "h2"])),
            InputNode::new("alt", 5, 0.5, sources(&["h1"])),
            InputNode::new("n2", 5, 1.0, sources(&["h1", "h2"])),
        ],
        edges: vec![InputEdge::new("n1", "alt"), InputEdge::new("alt", "n2"), InputEdge::new("n1", "n2")],
        haplotypes: haplotypes(&["h1", "h2"]),
    };

    let (regions, segments, _meta) = build_rst(&graph, BuildOptions { min_resolution: 0.04 }, "sg").expect("builds");

    let ind_region = regions.iter().map(|(_, r)| r).find(|r| r.region_type == RegionType::Ind).expect("an ind region exists");
    assert_eq!(ind_region.min_length, 5);

    let deletion_ranks: Vec<u32> = ind_region
        .segments
        .iter()
        .filter_map(|sid| segments.get(sid))
        .filter(|s| s.semantic_id.as_deref().is_some_and(|n| n.ends_with("-d")))
        .map(|s| s.rank)
        .collect();
    assert_eq!(deletion_ranks.len(), 1);
}

/// `min_resolution <= 0` is rejected before any wrapping work.
#[rstest]
#[case(0.0)]
#[case(-1.0)]
fn non_positive_resolution_is_rejected(#[case] min_resolution: f64) {
    common::init_tracing();

    let graph = InputGraph {
        nodes: vec![InputNode::new("n1", 10, 1.0, sources(&["h1"]))],
        edges: vec![],
        haplotypes: haplotypes(&["h1"]),
    };

    let err = build_rst(&graph, BuildOptions { min_resolution }, "sg").unwrap_err();
    assert!(matches!(err, HapError::InvalidResolution { .. }));
}

/// A 200bp chain of single-bp variant sites wraps to the expected
/// `max_level` with every element ending up with a non-empty `level_range`,
/// and the summary is stable across runs (deterministic sources, not
/// dependent on hash-map iteration order).
#[test]
fn long_chain_wraps_with_a_deterministic_summary() {
    common::init_tracing();

    let nodes: Vec<InputNode> = (0..200).map(|i| InputNode::new(format!("n{i}"), 1, 1.0, sources(&["h1"]))).collect();
    let edges: Vec<InputEdge> = (0..199).map(|i| InputEdge::new(format!("n{i}"), format!("n{}", i + 1))).collect();
    let graph = InputGraph {
        nodes,
        edges,
        haplotypes: haplotypes(&["h1"]),
    };

    let (regions, segments, meta) = build_rst(&graph, BuildOptions { min_resolution: 0.04 }, "sg").expect("builds");

    assert!(regions.iter().all(|(_, r)| r.level_range.is_some()));
    assert!(segments.iter().all(|(_, s)| s.level_range.is_some()));

    let mut sorted_sources: Vec<String> = meta.sources.clone();
    sorted_sources.sort();
    let summary = format!(
        "name={} max_level={} total_length={} sources={}",
        meta.name,
        meta.max_level,
        meta.total_length,
        sorted_sources.join(",")
    );
    insta::assert_snapshot!(summary, @"name=sg max_level=3 total_length=200 sources=h1");
}

/// Coordinate centering, exercised end-to-end through `build_rst` rather
/// than the coordinate filler in isolation.
#[test]
fn root_region_spans_the_full_total_length() {
    common::init_tracing();

    let graph = InputGraph {
        nodes: vec![InputNode::new("n1", 100, 1.0, sources(&["h1"]))],
        edges: vec![],
        haplotypes: haplotypes(&["h1"]),
    };

    let (regions, _segments, meta) = build_rst(&graph, BuildOptions { min_resolution: 0.04 }, "sg").expect("builds");
    let root = regions.root().expect("root region present");
    assert!(root.is_default);
    assert_eq!(root.coordinate.map(|c| (c.start, c.end)), Some((0, 100)));
    assert_eq!(meta.total_length, 100);
}
