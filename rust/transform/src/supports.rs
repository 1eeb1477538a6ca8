// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Rule 6: support placement and retirement.
//!
//! Point supports are emitted at axis-grid intersections backed by an
//! aligned column, at each configured support floor. Line supports follow
//! the building's Y edges where a wall is incident. Pre-existing supports
//! whose position no longer sits on the discovered grid are retired.

use nalgebra::Point2;
use rustc_hash::FxHashMap;

use structalign_core::{
    AlignedVertex, AxisLine, ElementId, ElementKind, GeometryKind, LayerHint, Model,
    NameAllocator, ObjectEdit, PipelineConfig, Vertex, Warning,
};

use structalign_alignment::snap::nearest_line;

/// Output of rule 6.
#[derive(Debug, Clone)]
pub struct SupportPlacement {
    pub edits: Vec<ObjectEdit>,
    /// Point-support positions, feeding rule 7.
    pub point_positions: Vec<(f64, f64, f64)>,
    pub removed: u32,
    pub points_added: u32,
    pub lines_added: u32,
    pub warnings: Vec<Warning>,
}

/// Places supports on the discovered grid and retires off-grid ones.
pub fn place_supports(
    model: &Model,
    aligned_by_element: &FxHashMap<ElementId, Vec<&AlignedVertex>>,
    x_lines: &[AxisLine],
    y_lines: &[AxisLine],
    config: &PipelineConfig,
    names: &mut NameAllocator,
) -> SupportPlacement {
    let mut edits = Vec::new();

    // Existing supports, keyed by their anchor vertex: used for dedup, and
    // off-grid ones are retired.
    let mut existing_points: Vec<Point2<f64>> = Vec::new();
    let mut existing_lines: Vec<Point2<f64>> = Vec::new();
    let mut removals: Vec<u64> = Vec::new();
    for element in &model.elements {
        if element.kind != ElementKind::Support {
            continue;
        }
        let Some(anchor) = aligned_anchor(element.id, aligned_by_element) else {
            continue;
        };
        let on_grid = nearest_line(anchor.x, x_lines, config.proximity_tolerance).is_some()
            && nearest_line(anchor.y, y_lines, config.proximity_tolerance).is_some();
        if !on_grid {
            tracing::debug!(name = %element.name, "retiring off-grid support");
            removals.push(element.id.0);
            continue;
        }
        match element.geometry_kind {
            GeometryKind::LineCurve | GeometryKind::PolyCurve | GeometryKind::NurbsCurve => {
                existing_lines.push(anchor)
            }
            _ => existing_points.push(anchor),
        }
    }
    removals.sort_unstable();
    let removed = removals.len() as u32;
    edits.extend(removals.into_iter().map(|id| ObjectEdit::Remove {
        element_id: ElementId(id),
    }));

    // Candidate intersections: aligned column centroids snapped to the grid.
    let mut intersections: Vec<(f64, f64)> = Vec::new();
    for element in &model.elements {
        if element.kind != ElementKind::Column {
            continue;
        }
        let Some(centroid) = aligned_centroid(element.id, aligned_by_element) else {
            continue;
        };
        let Some(xi) = nearest_line(centroid.x, x_lines, config.proximity_tolerance) else {
            continue;
        };
        let Some(yi) = nearest_line(centroid.y, y_lines, config.proximity_tolerance) else {
            continue;
        };
        let corner = Point2::new(x_lines[xi].position, y_lines[yi].position);
        if nalgebra::distance(&centroid, &corner) <= config.proximity_tolerance {
            intersections.push((corner.x, corner.y));
        }
    }
    intersections.sort_by(|a, b| {
        a.0.partial_cmp(&b.0)
            .unwrap()
            .then(a.1.partial_cmp(&b.1).unwrap())
    });

    let mut support_floors = config.support_floors.clone();
    support_floors.sort_by(|a, b| a.partial_cmp(b).unwrap());

    let mut emitted: Vec<Point2<f64>> = Vec::new();
    let mut point_positions = Vec::new();
    let mut points_added = 0u32;
    for (x, y) in intersections {
        let pos = Point2::new(x, y);
        if near_any(&pos, &emitted, config.dedup_radius)
            || near_any(&pos, &existing_points, config.dedup_radius)
        {
            continue;
        }
        emitted.push(pos);
        for &z in &support_floors {
            edits.push(ObjectEdit::Add {
                kind: ElementKind::Support,
                geometry_kind: GeometryKind::Point,
                name: names.next_name(),
                vertices: vec![Vertex::new(0, x, y, z)],
                layer_hint: LayerHint::Supports,
            });
            point_positions.push((x, y, z));
            points_added += 1;
        }
    }

    // Line supports along the building's Y edges, where a wall is incident.
    let mut lines_added = 0u32;
    let mut warnings = Vec::new();
    if y_lines.is_empty() {
        // Degenerate discovery: without Y lines there are no building edges
        // to anchor line supports to. Surface it rather than dropping the
        // rule silently.
        let walls = model
            .elements
            .iter()
            .filter(|e| e.kind == ElementKind::Wall)
            .count();
        if walls > 0 {
            tracing::warn!(walls, "no Y axis lines; edge line supports skipped");
            warnings.push(Warning::LineSupportsUnplaceable { walls });
        }
    } else if let (Some(z), Some(&first_y), Some(&last_y)) = (
        config.lowest_support_floor(),
        y_lines.first().map(|l| &l.position),
        y_lines.last().map(|l| &l.position),
    ) {
        let mut edge_ys = vec![first_y];
        if (last_y - first_y).abs() > config.dedup_radius {
            edge_ys.push(last_y);
        }
        let mut emitted_lines: Vec<Point2<f64>> = Vec::new();
        for x_line in x_lines {
            for &edge_y in &edge_ys {
                let corner = Point2::new(x_line.position, edge_y);
                if !wall_incident(&corner, z, model, aligned_by_element, config) {
                    continue;
                }
                if near_any(&corner, &emitted_lines, config.dedup_radius)
                    || near_any(&corner, &existing_lines, config.dedup_radius)
                {
                    continue;
                }
                emitted_lines.push(corner);
                edits.push(ObjectEdit::Add {
                    kind: ElementKind::Support,
                    geometry_kind: GeometryKind::LineCurve,
                    name: names.next_name(),
                    vertices: vec![
                        Vertex::new(0, corner.x, corner.y, z),
                        Vertex::new(1, corner.x, corner.y + 1.0, z),
                    ],
                    layer_hint: LayerHint::Supports,
                });
                lines_added += 1;
            }
        }
    }

    tracing::info!(
        removed,
        points_added,
        lines_added,
        "support placement complete"
    );
    SupportPlacement {
        edits,
        point_positions,
        removed,
        points_added,
        lines_added,
        warnings,
    }
}

/// Centroid of an element's aligned vertices.
fn aligned_centroid(
    id: ElementId,
    aligned_by_element: &FxHashMap<ElementId, Vec<&AlignedVertex>>,
) -> Option<Point2<f64>> {
    let vertices = aligned_by_element.get(&id)?;
    if vertices.is_empty() {
        return None;
    }
    let n = vertices.len() as f64;
    let sx: f64 = vertices.iter().map(|v| v.x).sum();
    let sy: f64 = vertices.iter().map(|v| v.y).sum();
    Some(Point2::new(sx / n, sy / n))
}

/// First aligned vertex of an element (a support's anchor point).
fn aligned_anchor(
    id: ElementId,
    aligned_by_element: &FxHashMap<ElementId, Vec<&AlignedVertex>>,
) -> Option<Point2<f64>> {
    let vertices = aligned_by_element.get(&id)?;
    let first = vertices.first()?;
    Some(Point2::new(first.x, first.y))
}

fn near_any(pos: &Point2<f64>, others: &[Point2<f64>], radius: f64) -> bool {
    others.iter().any(|o| nalgebra::distance(pos, o) <= radius)
}

/// True when some wall has an aligned vertex at the corner, on the given
/// floor.
fn wall_incident(
    corner: &Point2<f64>,
    z: f64,
    model: &Model,
    aligned_by_element: &FxHashMap<ElementId, Vec<&AlignedVertex>>,
    config: &PipelineConfig,
) -> bool {
    for element in &model.elements {
        if element.kind != ElementKind::Wall {
            continue;
        }
        let Some(vertices) = aligned_by_element.get(&element.id) else {
            continue;
        };
        for v in vertices {
            if (v.z - z).abs() <= config.z_tolerance
                && nalgebra::distance(&Point2::new(v.x, v.y), corner)
                    <= config.proximity_tolerance
            {
                return true;
            }
        }
    }
    false
}
