// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The two-tier snap engine.
//!
//! Each element endpoint picks a target axis line under the narrow primary
//! tolerance first, escalating to the wide outlier band only when the
//! primary fails. Vertices then inherit the target of the endpoint they
//! belong to; their aligned coordinate is the axis position itself, so the
//! engine's central invariant (`aligned == axis.position` when snapped)
//! holds by construction. Z is copied bit-for-bit.

use nalgebra::Point3;
use rustc_hash::FxHashMap;

use structalign_core::{
    AlignedVertex, Axis, AxisLine, ElementId, Model, PipelineConfig, Warning,
};

use crate::endpoints::{assign_to_endpoint, resolve_endpoints};

/// Which tolerance band admitted a snap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapTier {
    Primary,
    Outlier,
}

/// An endpoint and the axis line it selected, if any.
#[derive(Debug, Clone, Copy)]
pub struct EndpointTarget {
    pub endpoint: f64,
    /// Index into the sorted axis-line table, plus the admitting tier.
    pub target: Option<(usize, SnapTier)>,
}

/// Snap targets of one element, both axes.
#[derive(Debug, Clone, Default)]
pub struct ElementTargets {
    pub x: Vec<EndpointTarget>,
    pub y: Vec<EndpointTarget>,
}

/// Output of the snap engine.
#[derive(Debug, Clone)]
pub struct AlignmentOutcome {
    /// One aligned vertex per input vertex, in input order.
    pub vertices: Vec<AlignedVertex>,
    /// Resolved endpoint targets per element (consumed by the validator).
    pub targets: FxHashMap<ElementId, ElementTargets>,
    pub outlier_snaps: u32,
    pub unsnapped_endpoints: u32,
    pub warnings: Vec<Warning>,
}

/// Finds the nearest axis line within `max_distance` of `coord`.
///
/// Binary search over the sorted positions; only the two neighbors of the
/// insertion point can be nearest. Equidistance within 1e-9 m is broken by
/// higher floor count, then higher vertex count, then lower position.
pub fn nearest_line(coord: f64, lines: &[AxisLine], max_distance: f64) -> Option<usize> {
    if lines.is_empty() {
        return None;
    }
    let idx = lines.partition_point(|l| l.position < coord);

    let mut best: Option<usize> = None;
    for i in [idx.wrapping_sub(1), idx] {
        let Some(line) = lines.get(i) else { continue };
        let dist = (coord - line.position).abs();
        if dist > max_distance {
            continue;
        }
        best = Some(match best {
            None => i,
            Some(b) => {
                let best_dist = (coord - lines[b].position).abs();
                if dist + 1e-9 < best_dist {
                    i
                } else if (dist - best_dist).abs() <= 1e-9 && prefer(line, &lines[b]) {
                    i
                } else {
                    b
                }
            }
        });
    }
    best
}

/// Tie-break between equidistant lines.
fn prefer(a: &AxisLine, b: &AxisLine) -> bool {
    if a.floor_count != b.floor_count {
        return a.floor_count > b.floor_count;
    }
    if a.vertex_count != b.vertex_count {
        return a.vertex_count > b.vertex_count;
    }
    a.position < b.position
}

/// Two-tier target selection for a single endpoint.
fn select_target(coord: f64, lines: &[AxisLine], config: &PipelineConfig) -> EndpointTarget {
    let target = match nearest_line(coord, lines, config.max_snap_distance) {
        Some(i) => Some((i, SnapTier::Primary)),
        None => nearest_line(coord, lines, config.outlier_snap_distance)
            .map(|i| (i, SnapTier::Outlier)),
    };
    EndpointTarget {
        endpoint: coord,
        target,
    }
}

/// Produces the aligned vertex stream for the whole model.
///
/// Output preserves input count and ordering (element order, then vertex
/// order). Slab elements and elements without vertices pass through with
/// their original coordinates.
pub fn align_model(
    model: &Model,
    x_lines: &[AxisLine],
    y_lines: &[AxisLine],
    config: &PipelineConfig,
) -> AlignmentOutcome {
    let mut vertices = Vec::with_capacity(model.vertex_count());
    let mut targets: FxHashMap<ElementId, ElementTargets> = FxHashMap::default();
    let mut outlier_snaps = 0u32;
    let mut unsnapped_endpoints = 0u32;
    let mut warnings = Vec::new();
    let mut aligned_count = 0usize;

    for element in &model.elements {
        let resolved = resolve_endpoints(element, config);

        let element_targets = match &resolved {
            Some(eps) => ElementTargets {
                x: eps
                    .x
                    .iter()
                    .map(|&ep| select_target(ep, x_lines, config))
                    .collect(),
                y: eps
                    .y
                    .iter()
                    .map(|&ep| select_target(ep, y_lines, config))
                    .collect(),
            },
            None => ElementTargets::default(),
        };

        for (axis, list) in [(Axis::X, &element_targets.x), (Axis::Y, &element_targets.y)] {
            for t in list {
                match t.target {
                    Some((_, SnapTier::Outlier)) => outlier_snaps += 1,
                    Some(_) => {}
                    None => {
                        unsnapped_endpoints += 1;
                        warnings.push(Warning::UnsnappedEndpoint {
                            element_id: element.id,
                            axis,
                            position: t.endpoint,
                        });
                    }
                }
            }
        }

        for v in &element.vertices {
            let (x, axis_x) = align_coord(v.x, &element_targets.x, x_lines);
            let (y, axis_y) = align_coord(v.y, &element_targets.y, y_lines);

            let displacement =
                nalgebra::distance(&Point3::new(v.x, v.y, v.z), &Point3::new(x, y, v.z));

            let aligned = AlignedVertex {
                element_id: element.id,
                vertex_index: v.index,
                x,
                y,
                z: v.z,
                x_original: v.x,
                y_original: v.y,
                z_original: v.z,
                axis_x,
                axis_y,
                displacement,
            };
            if aligned.is_aligned() {
                aligned_count += 1;
            }
            vertices.push(aligned);
        }

        targets.insert(element.id, element_targets);
    }

    let total = vertices.len().max(1);
    tracing::info!(
        aligned = aligned_count,
        total = vertices.len(),
        rate = format!("{:.1}%", aligned_count as f64 / total as f64 * 100.0),
        outlier_snaps,
        unsnapped_endpoints,
        "snap complete"
    );

    AlignmentOutcome {
        vertices,
        targets,
        outlier_snaps,
        unsnapped_endpoints,
        warnings,
    }
}

/// Aligns one coordinate through its element's endpoint targets.
fn align_coord(
    coord: f64,
    targets: &[EndpointTarget],
    lines: &[AxisLine],
) -> (f64, Option<usize>) {
    if targets.is_empty() {
        return (coord, None);
    }
    let endpoint_positions: Vec<f64> = targets.iter().map(|t| t.endpoint).collect();
    let idx = assign_to_endpoint(coord, &endpoint_positions);
    match targets[idx].target {
        // Discovery emits grid-rounded positions, so assigning the line
        // position is already the rounded result, bit-exact.
        Some((line_idx, _)) => (lines[line_idx].position, Some(line_idx)),
        None => (coord, None),
    }
}
