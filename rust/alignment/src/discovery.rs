// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Axis-line discovery via multi-floor position filtering.
//!
//! Axis lines are a subset of positions already present in the input,
//! selected by how many distinct floor levels witness them. Selection (as
//! opposed to density clustering) cannot merge two adjacent but distinct
//! axes, and reduces the problem to sorting and counting.

use rustc_hash::FxHashMap;
use rustc_hash::FxHashSet;

use structalign_core::{
    round_to, Axis, AxisLine, Error, Model, PipelineConfig, Result, Warning,
};

/// Per-axis reference positions, for recall measurement.
#[derive(Debug, Clone, Default)]
pub struct ReferencePositions {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

impl ReferencePositions {
    /// Extracts the positions of already-discovered axis lines.
    pub fn from_lines(x: &[AxisLine], y: &[AxisLine]) -> Self {
        Self {
            x: x.iter().map(|l| l.position).collect(),
            y: y.iter().map(|l| l.position).collect(),
        }
    }
}

/// Result of axis discovery over both axes.
#[derive(Debug, Clone)]
pub struct DiscoveryOutcome {
    /// X axis lines, sorted ascending by position.
    pub x: Vec<AxisLine>,
    /// Y axis lines, sorted ascending by position.
    pub y: Vec<AxisLine>,
    /// Fraction of reference positions recovered, when a reference was given.
    pub recall_x: Option<f64>,
    pub recall_y: Option<f64>,
    pub warnings: Vec<Warning>,
}

/// Discovers canonical axis-line positions from the model's vertex cloud.
///
/// The X and Y passes are independent and run in parallel; each output list
/// is sorted by position, so the result is deterministic regardless of the
/// split.
pub fn discover_axis_lines(
    model: &Model,
    config: &PipelineConfig,
    reference: Option<&ReferencePositions>,
) -> Result<DiscoveryOutcome> {
    let mut x_pairs = Vec::with_capacity(model.vertex_count());
    let mut y_pairs = Vec::with_capacity(model.vertex_count());
    for v in model.all_vertices() {
        x_pairs.push((v.x, v.z));
        y_pairs.push((v.y, v.z));
    }

    let (res_x, res_y) = rayon::join(
        || discover_axis(Axis::X, &x_pairs, config, reference.map(|r| r.x.as_slice())),
        || discover_axis(Axis::Y, &y_pairs, config, reference.map(|r| r.y.as_slice())),
    );
    let (x, recall_x, warn_x) = res_x?;
    let (y, recall_y, warn_y) = res_y?;

    tracing::info!(
        x_lines = x.len(),
        y_lines = y.len(),
        min_floors = config.min_floors,
        "axis discovery complete"
    );

    let mut warnings = warn_x;
    warnings.extend(warn_y);
    Ok(DiscoveryOutcome {
        x,
        y,
        recall_x,
        recall_y,
        warnings,
    })
}

/// A coalesced candidate position with its floor witnesses.
#[derive(Debug, Clone)]
struct Candidate {
    position: f64,
    floor_count: u32,
    vertex_count: u32,
}

type AxisResult = Result<(Vec<AxisLine>, Option<f64>, Vec<Warning>)>;

fn discover_axis(
    axis: Axis,
    pairs: &[(f64, f64)],
    config: &PipelineConfig,
    reference: Option<&[f64]>,
) -> AxisResult {
    if pairs.is_empty() {
        return Ok((Vec::new(), None, Vec::new()));
    }

    let candidates = coalesce_candidates(pairs, config);

    // Primary selection, then the one-step floor-count fallback.
    let mut lines = select(&candidates, config.min_floors, config.min_floors, axis);
    if lines.is_empty() && config.min_floors > 2 {
        tracing::warn!(%axis, "no candidate reached min_floors; retrying at 2");
        lines = select(&candidates, 2, config.min_floors, axis);
    }
    if lines.is_empty() {
        return Err(Error::NoAxesFound { axis });
    }

    let mut warnings = Vec::new();
    let mut recall = None;
    if let Some(reference) = reference.filter(|r| !r.is_empty()) {
        let measured = measure_recall(&lines, reference, config.reference_match_tolerance);
        if measured < config.recall_threshold {
            admit_fallback_candidates(axis, &mut lines, &candidates, reference, config);
        }
        let final_recall = measure_recall(&lines, reference, config.reference_match_tolerance);
        for &position in reference {
            if !has_line_near(&lines, position, config.reference_match_tolerance) {
                warnings.push(Warning::ReferenceMissingPosition { axis, position });
            }
        }
        recall = Some(final_recall);
    }

    lines.sort_by(|a, b| a.position.partial_cmp(&b.position).unwrap());
    Ok((lines, recall, warnings))
}

/// Rounds, groups and coalesces coordinate/Z pairs into candidates.
fn coalesce_candidates(pairs: &[(f64, f64)], config: &PipelineConfig) -> Vec<Candidate> {
    let precision = config.rounding_precision;

    // Group by quantized coordinate, collecting floor witnesses. A Z value
    // only counts when it matches a ladder level within z_tolerance; with an
    // empty ladder, Zs are grouped at 0.1 m granularity.
    struct Group {
        floors: FxHashSet<i64>,
        count: u32,
    }
    let mut groups: FxHashMap<i64, Group> = FxHashMap::default();
    for &(coord, z) in pairs {
        let key = (coord / precision).round() as i64;
        let group = groups.entry(key).or_insert_with(|| Group {
            floors: FxHashSet::default(),
            count: 0,
        });
        group.count += 1;
        let floor_key = if config.floor_ladder.is_empty() {
            Some((z / 0.1).round() as i64)
        } else {
            config
                .floor_ladder
                .match_level(z, config.z_tolerance)
                .map(|level| (level * 1000.0).round() as i64)
        };
        if let Some(fk) = floor_key {
            group.floors.insert(fk);
        }
    }

    let mut keys: Vec<i64> = groups.keys().copied().collect();
    keys.sort_unstable();

    // Coalesce neighbors within cluster_radius. The window is anchored to
    // the group's first member so millimeter steps cannot chain across a
    // large span. The merged position is the vertex-weighted mean, put back
    // on the rounding grid.
    let mut merged: Vec<Candidate> = Vec::new();
    let mut i = 0;
    while i < keys.len() {
        let anchor = keys[i] as f64 * precision;
        let mut weighted_sum = 0.0;
        let mut count = 0u32;
        let mut floors: FxHashSet<i64> = FxHashSet::default();
        let mut j = i;
        while j < keys.len() {
            let pos = keys[j] as f64 * precision;
            if pos - anchor > config.cluster_radius {
                break;
            }
            let group = &groups[&keys[j]];
            weighted_sum += pos * group.count as f64;
            count += group.count;
            floors.extend(group.floors.iter().copied());
            j += 1;
        }
        merged.push(Candidate {
            position: round_to(weighted_sum / count as f64, precision),
            floor_count: floors.len() as u32,
            vertex_count: count,
        });
        i = j;
    }

    // Re-rounding can land two merged candidates on the same grid point when
    // cluster_radius exceeds the precision; fold those together.
    let mut folded: Vec<Candidate> = Vec::with_capacity(merged.len());
    for cand in merged {
        match folded.last_mut() {
            Some(last) if (last.position - cand.position).abs() < precision / 2.0 => {
                last.vertex_count += cand.vertex_count;
                last.floor_count = last.floor_count.max(cand.floor_count);
            }
            _ => folded.push(cand),
        }
    }
    folded
}

fn select(
    candidates: &[Candidate],
    threshold: u32,
    configured_min: u32,
    axis: Axis,
) -> Vec<AxisLine> {
    candidates
        .iter()
        .filter(|c| c.floor_count >= threshold)
        .map(|c| AxisLine {
            axis,
            position: c.position,
            floor_count: c.floor_count,
            vertex_count: c.vertex_count,
            fallback: c.floor_count < configured_min,
        })
        .collect()
}

fn measure_recall(lines: &[AxisLine], reference: &[f64], tolerance: f64) -> f64 {
    let matched = reference
        .iter()
        .filter(|&&p| has_line_near(lines, p, tolerance))
        .count();
    matched as f64 / reference.len() as f64
}

fn has_line_near(lines: &[AxisLine], position: f64, tolerance: f64) -> bool {
    lines
        .iter()
        .any(|l| (l.position - position).abs() <= tolerance)
}

/// Admits candidates at `min_floors - 1` that cover reference positions the
/// primary selection missed. Ties on floor count break on higher vertex
/// count, then lower position, for a stable admission order.
fn admit_fallback_candidates(
    axis: Axis,
    lines: &mut Vec<AxisLine>,
    candidates: &[Candidate],
    reference: &[f64],
    config: &PipelineConfig,
) {
    let relaxed = config.min_floors.saturating_sub(1);
    let mut pool: Vec<&Candidate> = candidates
        .iter()
        .filter(|c| c.floor_count == relaxed)
        .collect();
    pool.sort_by(|a, b| {
        b.floor_count
            .cmp(&a.floor_count)
            .then(b.vertex_count.cmp(&a.vertex_count))
            .then(a.position.partial_cmp(&b.position).unwrap())
    });

    for &position in reference {
        if has_line_near(lines, position, config.reference_match_tolerance) {
            continue;
        }
        if let Some(cand) = pool
            .iter()
            .find(|c| (c.position - position).abs() <= config.reference_match_tolerance)
        {
            tracing::debug!(
                %axis,
                position = cand.position,
                floors = cand.floor_count,
                "admitting fallback axis line"
            );
            lines.push(AxisLine {
                axis,
                position: cand.position,
                floor_count: cand.floor_count,
                vertex_count: cand.vertex_count,
                fallback: true,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use structalign_core::{Element, ElementId, ElementKind, GeometryKind, Vertex};

    fn column_at(id: u64, x: f64, y: f64, floors: &[f64]) -> Element {
        Element {
            id: ElementId(id),
            name: format!("Column_{id}"),
            kind: ElementKind::Column,
            geometry_kind: GeometryKind::Brep,
            face_count: None,
            layer: None,
            vertices: floors
                .iter()
                .enumerate()
                .map(|(i, &z)| Vertex::new(i as u32, x, y, z))
                .collect(),
        }
    }

    #[test]
    fn multi_floor_positions_become_axis_lines() {
        let model = Model::new(vec![
            column_at(1, -39.7, 22.5, &[-4.44, -1.56, 2.12, 5.48]),
            // Present on only two floors: filtered out at min_floors=3.
            column_at(2, -10.0, 22.5, &[-4.44, -1.56]),
        ]);
        let config = PipelineConfig::default();
        let outcome = discover_axis_lines(&model, &config, None).unwrap();
        assert_eq!(outcome.x.len(), 1);
        assert_eq!(outcome.x[0].position, -39.7);
        assert_eq!(outcome.x[0].floor_count, 4);
        assert!(!outcome.x[0].fallback);
        // Y=22.5 is witnessed by both columns across 4 floors.
        assert_eq!(outcome.y.len(), 1);
        assert_eq!(outcome.y[0].position, 22.5);
    }

    #[test]
    fn sub_millimeter_noise_collapses_to_one_line() {
        // Jitter well inside the 5 mm rounding grid.
        let model = Model::new(vec![
            column_at(1, -39.7004, 12.0, &[-4.44]),
            column_at(2, -39.6996, 12.0, &[2.12]),
            column_at(3, -39.7001, 12.0, &[5.48]),
        ]);
        let config = PipelineConfig::default();
        let outcome = discover_axis_lines(&model, &config, None).unwrap();
        assert_eq!(outcome.x.len(), 1);
        assert_eq!(outcome.x[0].position, -39.7);
        assert_eq!(outcome.x[0].floor_count, 3);
        assert_eq!(outcome.x[0].vertex_count, 3);
    }

    #[test]
    fn adjacent_distinct_axes_stay_distinct() {
        // 75 mm apart: a density clusterer with eps >= 75 mm would fuse
        // these; selection must not.
        let model = Model::new(vec![
            column_at(1, -55.850, 3.0, &[-4.44, 2.12, 5.48]),
            column_at(2, -55.775, 3.0, &[-4.44, 2.12, 5.48]),
        ]);
        let config = PipelineConfig::default();
        let outcome = discover_axis_lines(&model, &config, None).unwrap();
        assert_eq!(outcome.x.len(), 2);
        assert_eq!(outcome.x[0].position, -55.85);
        assert_eq!(outcome.x[1].position, -55.775);
    }

    #[test]
    fn empty_model_yields_empty_output() {
        let outcome =
            discover_axis_lines(&Model::default(), &PipelineConfig::default(), None).unwrap();
        assert!(outcome.x.is_empty());
        assert!(outcome.y.is_empty());
    }

    #[test]
    fn pathological_input_falls_back_then_errors() {
        // Two floors only: min_floors=3 finds nothing, fallback to 2 works.
        let model = Model::new(vec![column_at(1, 0.0, 0.0, &[-4.44, 2.12])]);
        let config = PipelineConfig::default();
        let outcome = discover_axis_lines(&model, &config, None).unwrap();
        assert_eq!(outcome.x.len(), 1);
        assert!(outcome.x[0].fallback);

        // Single floor: even the fallback fails.
        let model = Model::new(vec![column_at(1, 0.0, 0.0, &[2.12])]);
        let err = discover_axis_lines(&model, &config, None).unwrap_err();
        assert!(matches!(err, Error::NoAxesFound { .. }));
    }

    #[test]
    fn reference_recall_admits_fallback_candidates() {
        let model = Model::new(vec![
            column_at(1, -39.7, 5.0, &[-4.44, 2.12, 5.48, 8.20]),
            // Only two floors: below min_floors, but the reference wants it.
            column_at(2, -30.0, 5.0, &[-4.44, 2.12]),
        ]);
        let config = PipelineConfig::default();
        let reference = ReferencePositions {
            x: vec![-39.7, -30.0],
            y: vec![5.0],
        };
        let outcome = discover_axis_lines(&model, &config, Some(&reference)).unwrap();
        assert_eq!(outcome.x.len(), 2);
        let fallback = outcome.x.iter().find(|l| l.position == -30.0).unwrap();
        assert!(fallback.fallback);
        assert_eq!(fallback.floor_count, 2);
        assert_eq!(outcome.recall_x, Some(1.0));
        assert!(outcome.warnings.is_empty());
    }

    #[test]
    fn missing_reference_position_is_warned() {
        let model = Model::new(vec![column_at(1, -39.7, 5.0, &[-4.44, 2.12, 5.48])]);
        let config = PipelineConfig::default();
        let reference = ReferencePositions {
            x: vec![-39.7, -20.0],
            y: vec![5.0],
        };
        let outcome = discover_axis_lines(&model, &config, Some(&reference)).unwrap();
        assert_eq!(outcome.recall_x, Some(0.5));
        assert!(outcome
            .warnings
            .iter()
            .any(|w| matches!(w, Warning::ReferenceMissingPosition { axis: Axis::X, .. })));
    }
}
