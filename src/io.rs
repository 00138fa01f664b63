//! Persisted TSV format for the Region/Segment tables and subgraph metadata:
//! one file per table, header row, tab-delimited, list-valued columns
//! comma-joined, missing values written as `*`. The dialect is bespoke, so
//! this is a small hand-written formatter/parser rather than a CSV crate
//! bent out of shape.
//!
//! Transient builder-only fields (`min_length`, `before`, `after`) are
//! dropped before emission and default back to their zero values on
//! reload — they play no role after `wrap_rst`/`calc_props_r2l` have run,
//! so round-tripping the persisted columns does not require carrying them.

use crate::error::{HapError, Result};
use crate::rst::{Meta, Region, RegionTable, RegionType, Segment, SegmentTable};
use crate::types::{Coordinate, HashSet, LevelRange, RegionId, SegmentId};

const MISSING: &str = "*";

fn opt_str(value: &Option<String>) -> String {
    value.clone().unwrap_or_else(|| MISSING.to_string())
}

fn parse_opt_str(field: &str) -> Option<String> {
    if field == MISSING {
        None
    } else {
        Some(field.to_string())
    }
}

fn level_range_str(value: &Option<LevelRange>) -> String {
    match value {
        Some(lr) => format!("{},{}", lr.low, lr.high),
        None => MISSING.to_string(),
    }
}

fn parse_level_range(field: &str, subgraph: &str) -> Result<Option<LevelRange>> {
    if field == MISSING {
        return Ok(None);
    }
    let (low, high) = field.split_once(',').ok_or_else(|| HapError::InternalInvariant {
        subgraph: subgraph.to_string(),
        detail: format!("malformed level_range {field:?}"),
    })?;
    Ok(Some(LevelRange {
        low: parse_field(low, subgraph, "level_range.low")?,
        high: parse_field(high, subgraph, "level_range.high")?,
    }))
}

fn coordinate_str(value: &Option<Coordinate>) -> String {
    match value {
        Some(c) => format!("{},{}", c.start, c.end),
        None => MISSING.to_string(),
    }
}

fn parse_coordinate(field: &str, subgraph: &str) -> Result<Option<Coordinate>> {
    if field == MISSING {
        return Ok(None);
    }
    let (start, end) = field.split_once(',').ok_or_else(|| HapError::InternalInvariant {
        subgraph: subgraph.to_string(),
        detail: format!("malformed coordinate {field:?}"),
    })?;
    Ok(Some(Coordinate {
        start: parse_field(start, subgraph, "coordinate.start")?,
        end: parse_field(end, subgraph, "coordinate.end")?,
    }))
}

fn list_str<I: IntoIterator<Item = S>, S: AsRef<str>>(items: I) -> String {
    let joined = items.into_iter().map(|s| s.as_ref().to_string()).collect::<Vec<_>>().join(",");
    if joined.is_empty() {
        MISSING.to_string()
    } else {
        joined
    }
}

fn parse_list(field: &str) -> Vec<String> {
    if field == MISSING {
        Vec::new()
    } else {
        field.split(',').map(|s| s.to_string()).collect()
    }
}

fn parse_field<T: std::str::FromStr>(field: &str, subgraph: &str, column: &str) -> Result<T> {
    field.parse().map_err(|_| HapError::InternalInvariant {
        subgraph: subgraph.to_string(),
        detail: format!("malformed {column} value {field:?}"),
    })
}

const REGION_HEADER: &str = "id\tsemantic_id\tlevel_range\tcoordinate\tis_default\tlength\tis_variant\ttype\ttotal_variants\tparent_segment\tsegments\tsources";

/// Emits a [`RegionTable`] in the persisted dialect.
pub fn emit_region_table(regions: &RegionTable) -> String {
    let mut out = String::from(REGION_HEADER);
    out.push('\n');
    for (_, region) in regions.iter() {
        out.push_str(&format!(
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\n",
            region.id,
            opt_str(&region.semantic_id),
            level_range_str(&region.level_range),
            coordinate_str(&region.coordinate),
            region.is_default,
            region.length,
            region.region_type.is_variant(),
            region.region_type,
            region.total_variants,
            region
                .parent_segment
                .as_ref()
                .map(|s| s.to_string())
                .unwrap_or_else(|| MISSING.to_string()),
            list_str(region.segments.iter().map(|s| s.to_string())),
            list_str(region.sources.iter().cloned()),
        ));
    }
    out
}

/// Parses a [`RegionTable`] emitted by [`emit_region_table`].
pub fn parse_region_table(tsv: &str, subgraph: &str) -> Result<RegionTable> {
    let mut table = RegionTable::default();
    for line in tsv.lines().skip(1) {
        if line.is_empty() {
            continue;
        }
        let cols: Vec<&str> = line.split('\t').collect();
        if cols.len() != 12 {
            return Err(HapError::InternalInvariant {
                subgraph: subgraph.to_string(),
                detail: format!("region row has {} columns, expected 12", cols.len()),
            });
        }
        let region_type = match cols[7] {
            "con" => RegionType::Con,
            "var" => RegionType::Var,
            "snp" => RegionType::Snp,
            "ale" => RegionType::Ale,
            "ind" => RegionType::Ind,
            "sv" => RegionType::Sv,
            other => {
                return Err(HapError::InternalInvariant {
                    subgraph: subgraph.to_string(),
                    detail: format!("unknown region type {other:?}"),
                })
            }
        };
        let mut region = Region::new(RegionId(cols[0].to_string()), region_type);
        region.semantic_id = parse_opt_str(cols[1]);
        region.level_range = parse_level_range(cols[2], subgraph)?;
        region.coordinate = parse_coordinate(cols[3], subgraph)?;
        region.is_default = parse_field(cols[4], subgraph, "is_default")?;
        region.length = parse_field(cols[5], subgraph, "length")?;
        // cols[6] (is_variant) is derived from `type` on read, same as on write.
        region.total_variants = parse_field(cols[8], subgraph, "total_variants")?;
        region.parent_segment = parse_opt_str(cols[9]).map(SegmentId);
        region.segments = parse_list(cols[10]).into_iter().map(SegmentId).collect();
        region.sources = parse_list(cols[11]).into_iter().collect::<HashSet<String>>();
        table.insert(region);
    }
    Ok(table)
}

const SEGMENT_HEADER: &str = "id\toriginal_id\tsemantic_id\tlevel_range\tcoordinate\trank\tlength\tfrequency\tdirect_variants\ttotal_variants\tis_wrapper\tsub_regions\tsources";

/// Emits a [`SegmentTable`] in the persisted dialect.
pub fn emit_segment_table(segments: &SegmentTable, subgraph: &str) -> Result<String> {
    let mut out = String::from(SEGMENT_HEADER);
    out.push('\n');
    for (_, segment) in segments.iter() {
        if segment.rank > u8::MAX as u32 {
            return Err(HapError::InternalInvariant {
                subgraph: subgraph.to_string(),
                detail: format!("segment {} has rank {} exceeding the 8-bit column width", segment.id, segment.rank),
            });
        }
        out.push_str(&format!(
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\n",
            segment.id,
            segment
                .original_id
                .as_ref()
                .map(|s| s.to_string())
                .unwrap_or_else(|| MISSING.to_string()),
            opt_str(&segment.semantic_id),
            level_range_str(&segment.level_range),
            coordinate_str(&segment.coordinate),
            segment.rank,
            segment.length,
            segment.frequency,
            segment.direct_variants,
            segment.total_variants,
            segment.is_wrapper,
            list_str(segment.sub_regions.iter().map(|r| r.to_string())),
            list_str(segment.sources.iter().cloned()),
        ));
    }
    Ok(out)
}

/// Parses a [`SegmentTable`] emitted by [`emit_segment_table`].
pub fn parse_segment_table(tsv: &str, subgraph: &str) -> Result<SegmentTable> {
    let mut table = SegmentTable::default();
    for line in tsv.lines().skip(1) {
        if line.is_empty() {
            continue;
        }
        let cols: Vec<&str> = line.split('\t').collect();
        if cols.len() != 13 {
            return Err(HapError::InternalInvariant {
                subgraph: subgraph.to_string(),
                detail: format!("segment row has {} columns, expected 13", cols.len()),
            });
        }
        let mut segment = Segment::new(SegmentId(cols[0].to_string()));
        segment.original_id = parse_opt_str(cols[1]).map(SegmentId);
        segment.semantic_id = parse_opt_str(cols[2]);
        segment.level_range = parse_level_range(cols[3], subgraph)?;
        segment.coordinate = parse_coordinate(cols[4], subgraph)?;
        segment.rank = parse_field(cols[5], subgraph, "rank")?;
        segment.length = parse_field(cols[6], subgraph, "length")?;
        segment.frequency = parse_field(cols[7], subgraph, "frequency")?;
        segment.direct_variants = parse_field(cols[8], subgraph, "direct_variants")?;
        segment.total_variants = parse_field(cols[9], subgraph, "total_variants")?;
        segment.is_wrapper = parse_field(cols[10], subgraph, "is_wrapper")?;
        segment.sub_regions = parse_list(cols[11]).into_iter().map(RegionId).collect();
        segment.sources = parse_list(cols[12]).into_iter().collect::<HashSet<String>>();
        table.insert(segment);
    }
    Ok(table)
}

const META_HEADER: &str = "sources\tname\tmax_level\ttotal_length\ttotal_variants";

/// Emits a subgraph's [`Meta`] row in the persisted dialect.
pub fn emit_meta(meta: &Meta) -> String {
    format!(
        "{META_HEADER}\n{}\t{}\t{}\t{}\t{}\n",
        list_str(meta.sources.iter().cloned()),
        meta.name,
        meta.max_level,
        meta.total_length,
        meta.total_variants,
    )
}

/// Parses a [`Meta`] row emitted by [`emit_meta`].
pub fn parse_meta(tsv: &str, subgraph: &str) -> Result<Meta> {
    let row = tsv.lines().nth(1).ok_or_else(|| HapError::InternalInvariant {
        subgraph: subgraph.to_string(),
        detail: "meta table has no data row".to_string(),
    })?;
    let cols: Vec<&str> = row.split('\t').collect();
    if cols.len() != 5 {
        return Err(HapError::InternalInvariant {
            subgraph: subgraph.to_string(),
            detail: format!("meta row has {} columns, expected 5", cols.len()),
        });
    }
    Ok(Meta {
        sources: parse_list(cols[0]),
        name: cols[1].to_string(),
        max_level: parse_field(cols[2], subgraph, "max_level")?,
        total_length: parse_field(cols[3], subgraph, "total_length")?,
        total_variants: parse_field(cols[4], subgraph, "total_variants")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rst::IdGenerator;

    fn sample_tables() -> (RegionTable, SegmentTable) {
        let mut ids = IdGenerator::default();
        let mut regions = RegionTable::default();
        let mut segments = SegmentTable::default();

        let mut region = Region::new(ids.next_region(), RegionType::Snp);
        region.semantic_id = Some("SNP-1".to_string());
        region.level_range = Some(LevelRange::single(1));
        region.coordinate = Some(Coordinate { start: 0, end: 1 });
        region.length = 1;
        region.is_default = true;
        region.sources = ["h1".to_string(), "h2".to_string()].into_iter().collect();

        let mut seg_a = Segment::new(ids.next_segment());
        seg_a.level_range = region.level_range;
        seg_a.coordinate = region.coordinate;
        seg_a.length = 1;
        seg_a.frequency = 0.5;
        seg_a.sources = ["h1".to_string()].into_iter().collect();
        region.segments.push(seg_a.id.clone());
        region.parent_segment = Some(SegmentId("s-0".to_string()));

        segments.insert(seg_a);
        regions.insert(region);
        (regions, segments)
    }

    #[test]
    fn region_table_round_trips() {
        let (regions, _segments) = sample_tables();
        let tsv = emit_region_table(&regions);
        let reloaded = parse_region_table(&tsv, "sg").expect("parses");
        assert_eq!(reloaded.len(), regions.len());
        for (id, region) in regions.iter() {
            let back = reloaded.get(id).expect("round-tripped region present");
            assert_eq!(back.semantic_id, region.semantic_id);
            assert_eq!(back.length, region.length);
            assert_eq!(back.is_default, region.is_default);
            assert_eq!(back.sources, region.sources);
            assert!(matches!(back.region_type, RegionType::Snp));
        }
    }

    #[test]
    fn segment_table_round_trips() {
        let (_regions, segments) = sample_tables();
        let tsv = emit_segment_table(&segments, "sg").expect("emits");
        let reloaded = parse_segment_table(&tsv, "sg").expect("parses");
        assert_eq!(reloaded.len(), segments.len());
        for (id, segment) in segments.iter() {
            let back = reloaded.get(id).expect("round-tripped segment present");
            assert_eq!(back.length, segment.length);
            assert_eq!(back.frequency, segment.frequency);
            assert_eq!(back.sources, segment.sources);
        }
    }

    #[test]
    fn meta_round_trips() {
        let meta = Meta {
            sources: vec!["h1".to_string(), "h2".to_string()],
            name: "chr1".to_string(),
            max_level: 3,
            total_length: 200,
            total_variants: 5,
        };
        let tsv = emit_meta(&meta);
        let reloaded = parse_meta(&tsv, "sg").expect("parses");
        assert_eq!(reloaded.sources, meta.sources);
        assert_eq!(reloaded.name, meta.name);
        assert_eq!(reloaded.max_level, meta.max_level);
        assert_eq!(reloaded.total_length, meta.total_length);
        assert_eq!(reloaded.total_variants, meta.total_variants);
    }

    #[test]
    fn missing_values_round_trip_as_star() {
        let region = Region::new(RegionId("r-1".to_string()), RegionType::Con);
        let mut regions = RegionTable::default();
        regions.insert(region);
        let tsv = emit_region_table(&regions);
        assert!(tsv.contains('*'));
        let reloaded = parse_region_table(&tsv, "sg").expect("parses");
        let back = reloaded.get(&RegionId("r-1".to_string())).expect("present");
        assert_eq!(back.semantic_id, None);
        assert_eq!(back.parent_segment, None);
        assert!(back.segments.is_empty());
    }
}
