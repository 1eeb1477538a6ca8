// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-element endpoint resolution.
//!
//! An endpoint is a distinct axis-aligned position within one element's
//! vertex set: one per axis for compact elements (columns, supports), two on
//! the long axis for spanning elements (walls, beams). Lifting the snap
//! decision from vertices to endpoints is what lets a spanning wall's two
//! ends go to two different axis lines.

use structalign_core::{Axis, Element, ElementKind, GeometryKind, PipelineConfig};

/// Distinct endpoint positions of one element, per axis, sorted ascending.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementEndpoints {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

/// Resolves an element's endpoints. Returns `None` for slabs (their fate is
/// decided by the object rules, not the snap), for line-geometry supports
/// (synthetic boundary markers whose extent must not collapse onto the
/// single support endpoint), and for empty elements.
pub fn resolve_endpoints(element: &Element, config: &PipelineConfig) -> Option<ElementEndpoints> {
    if element.vertices.is_empty() || element.kind == ElementKind::Slab {
        return None;
    }
    if element.kind == ElementKind::Support
        && matches!(
            element.geometry_kind,
            GeometryKind::LineCurve | GeometryKind::PolyCurve | GeometryKind::NurbsCurve
        )
    {
        return None;
    }

    let bounds = element.bounds()?;
    let dx = bounds.x_range();
    let dy = bounds.y_range();

    let endpoints = match element.kind {
        ElementKind::Column | ElementKind::Support => ElementEndpoints {
            x: vec![mean_on(element, Axis::X)],
            y: vec![mean_on(element, Axis::Y)],
        },
        ElementKind::Wall if dx >= config.l_shape_min_extent && dy >= config.l_shape_min_extent => {
            // L-shaped wall: a genuine span on both axes.
            ElementEndpoints {
                x: span_endpoints(element, Axis::X, config),
                y: span_endpoints(element, Axis::Y, config),
            }
        }
        ElementKind::Wall | ElementKind::Beam => {
            if dx > dy {
                ElementEndpoints {
                    x: span_endpoints(element, Axis::X, config),
                    y: vec![mean_on(element, Axis::Y)],
                }
            } else {
                ElementEndpoints {
                    x: vec![mean_on(element, Axis::X)],
                    y: span_endpoints(element, Axis::Y, config),
                }
            }
        }
        ElementKind::Slab => unreachable!("slabs are filtered above"),
    };
    Some(endpoints)
}

/// Index of the endpoint a vertex coordinate belongs to (nearest by
/// original coordinate).
pub fn assign_to_endpoint(coord: f64, endpoints: &[f64]) -> usize {
    let mut best = 0;
    let mut best_dist = f64::INFINITY;
    for (i, &ep) in endpoints.iter().enumerate() {
        let dist = (coord - ep).abs();
        if dist < best_dist {
            best = i;
            best_dist = dist;
        }
    }
    best
}

fn mean_on(element: &Element, axis: Axis) -> f64 {
    let sum: f64 = element.vertices.iter().map(|v| v.on(axis)).sum();
    sum / element.vertices.len() as f64
}

/// Min and max coordinate clusters of a spanning element on one axis,
/// capped at two (first and last when an irregular outline produces more).
fn span_endpoints(element: &Element, axis: Axis, config: &PipelineConfig) -> Vec<f64> {
    let mut coords: Vec<f64> = element.vertices.iter().map(|v| v.on(axis)).collect();
    coords.sort_by(|a, b| a.partial_cmp(b).unwrap());
    let clusters = cluster_positions(&coords, config.cluster_radius);
    match clusters.len() {
        0 | 1 | 2 => clusters,
        _ => vec![clusters[0], clusters[clusters.len() - 1]],
    }
}

/// Merges sorted positions whose successive gap is within `radius`; each
/// cluster is represented by its mean.
pub fn cluster_positions(sorted: &[f64], radius: f64) -> Vec<f64> {
    let mut clusters: Vec<f64> = Vec::new();
    let mut sum = 0.0;
    let mut count = 0usize;
    let mut prev = f64::NEG_INFINITY;
    for &c in sorted {
        if count > 0 && c - prev > radius {
            clusters.push(sum / count as f64);
            sum = 0.0;
            count = 0;
        }
        sum += c;
        count += 1;
        prev = c;
    }
    if count > 0 {
        clusters.push(sum / count as f64);
    }
    clusters
}
