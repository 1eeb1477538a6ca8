// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! End-to-end pipeline scenarios over a miniature building: four columns on
//! a 2x2 grid, one spanning multi-face wall, a floor slab, a roof slab and
//! one structurally retired support.

use structalign_core::{
    CancelToken, Element, ElementId, ElementKind, GeometryKind, Model, ObjectEdit,
    PipelineConfig, Vertex,
};
use structalign_transform::run_pipeline;

const FLOORS: [f64; 4] = [-4.44, -1.56, 2.12, 5.48];

fn element(
    id: u64,
    name: &str,
    kind: ElementKind,
    geometry: GeometryKind,
    face_count: Option<u32>,
    coords: &[(f64, f64, f64)],
) -> Element {
    Element {
        id: ElementId(id),
        name: name.into(),
        kind,
        geometry_kind: geometry,
        face_count,
        layer: None,
        vertices: coords
            .iter()
            .enumerate()
            .map(|(i, &(x, y, z))| Vertex::new(i as u32, x, y, z))
            .collect(),
    }
}

/// A column with one vertex per floor, with millimeter jitter.
fn column(id: u64, x: f64, y: f64, jitter: f64) -> Element {
    let coords: Vec<(f64, f64, f64)> = FLOORS
        .iter()
        .map(|&z| (x + jitter, y - jitter, z))
        .collect();
    element(
        id,
        &format!("Column_{id}"),
        ElementKind::Column,
        GeometryKind::Brep,
        Some(1),
        &coords,
    )
}

fn miniature_building() -> Model {
    let wall = element(
        5,
        "Wall_5",
        ElementKind::Wall,
        GeometryKind::Brep,
        Some(3),
        &[
            (-39.700, 12.25, -4.44),
            (-39.700, 12.35, -4.44),
            (-30.000, 12.25, -4.44),
            (-30.000, 12.35, -4.44),
            (-39.700, 12.25, 2.12),
            (-39.700, 12.35, 2.12),
            (-30.000, 12.25, 2.12),
            (-30.000, 12.35, 2.12),
        ],
    );
    let floor_slab = element(
        6,
        "Slab_6",
        ElementKind::Slab,
        GeometryKind::Brep,
        Some(1),
        &[
            (-39.700, 12.30, 2.12),
            (-30.000, 12.30, 2.12),
            (-30.000, 22.50, 2.12),
            (-39.700, 22.50, 2.12),
        ],
    );
    let roof_slab = element(
        7,
        "Slab_7",
        ElementKind::Slab,
        GeometryKind::Brep,
        Some(1),
        &[
            (-39.700, 12.30, 32.36),
            (-30.000, 12.30, 32.36),
            (-30.000, 22.50, 32.36),
            (-39.700, 22.50, 32.36),
        ],
    );
    // Sits on the long-gone X=-10.83 axis: structurally retired.
    let stale_support = element(
        8,
        "Support_8",
        ElementKind::Support,
        GeometryKind::Point,
        None,
        &[(-10.830, 12.30, -4.44)],
    );

    Model::new(vec![
        column(1, -39.700, 12.300, 0.001),
        column(2, -39.700, 22.500, -0.001),
        column(3, -30.000, 12.300, 0.001),
        column(4, -30.000, 22.500, -0.001),
        wall,
        floor_slab,
        roof_slab,
        stale_support,
    ])
}

#[test]
fn full_pipeline_on_miniature_building() {
    let model = miniature_building();
    let config = PipelineConfig::default();
    let outcome = run_pipeline(&model, &config, None, &CancelToken::new()).unwrap();

    // Discovery: a 2x2 grid.
    assert_eq!(outcome.report.axis_lines_x, 2);
    assert_eq!(outcome.report.axis_lines_y, 2);

    // Rule 3: the floor slab goes, the roof stays.
    assert_eq!(outcome.report.rule_counts.slabs_removed, 1);
    assert_eq!(outcome.report.rule_counts.slabs_kept, 1);
    assert!(outcome
        .edits
        .iter()
        .any(|e| matches!(e, ObjectEdit::Remove { element_id } if *element_id == ElementId(6))));
    assert!(outcome
        .output
        .elements
        .iter()
        .any(|e| e.name == "Slab_7"));

    // Rule 4: one consolidated zone at Z=2.12.
    assert_eq!(outcome.report.rule_counts.slabs_consolidated, 1);
    let zone = outcome
        .output
        .elements
        .iter()
        .find(|e| e.name == "SlabZone_1")
        .expect("consolidated slab present");
    assert!(zone.vertices.iter().all(|v| v.z == 2.12));

    // Rule 5: the multi-face wall becomes two per-span rectangles.
    assert_eq!(outcome.report.rule_counts.walls_removed, 1);
    assert_eq!(outcome.report.rule_counts.wall_segments_added, 2);
    let seg0 = outcome
        .output
        .elements
        .iter()
        .find(|e| e.name == "Wall_5_0")
        .expect("first wall segment present");
    assert!(seg0.vertices.iter().all(|v| (v.y - 12.3).abs() < 1e-9));
    assert_eq!(seg0.vertices[0].z, -4.44);
    assert_eq!(seg0.vertices[2].z, -1.56);

    // Rule 6: 4 column intersections x 2 support floors, the stale support
    // retired, 2 wall-edge line supports.
    assert_eq!(outcome.report.rule_counts.supports_removed, 1);
    assert_eq!(outcome.report.rule_counts.point_supports_added, 8);
    assert_eq!(outcome.report.rule_counts.line_supports_added, 2);
    assert!(!outcome.output.elements.iter().any(|e| e.name == "Support_8"));

    // Rule 7 and the grid.
    assert_eq!(outcome.report.rule_counts.centerlines_added, 8);
    assert_eq!(outcome.report.rule_counts.grid_curves_added, 2);

    // Column vertices landed exactly on the grid, Z untouched.
    for v in &outcome.aligned {
        assert_eq!(v.z.to_bits(), v.z_original.to_bits());
    }
    let col = outcome
        .output
        .elements
        .iter()
        .find(|e| e.name == "Column_1")
        .unwrap();
    for v in &col.vertices {
        assert!((v.x - -39.700).abs() < 1e-9);
        assert!((v.y - 12.300).abs() < 1e-9);
    }
}

#[test]
fn pipeline_is_idempotent_on_its_own_output() {
    let model = miniature_building();
    let config = PipelineConfig::default();
    let cancel = CancelToken::new();

    let first = run_pipeline(&model, &config, None, &cancel).unwrap();
    let second = run_pipeline(&first.output, &config, None, &cancel).unwrap();

    // No further displacement anywhere.
    let max_displacement = second
        .aligned
        .iter()
        .map(|v| v.displacement)
        .fold(0.0f64, f64::max);
    assert!(
        max_displacement < 1e-9,
        "second run displaced by {max_displacement}"
    );

    // And no further object edits.
    assert!(
        second.edits.is_empty(),
        "second run produced {} edits: {:?}",
        second.edits.len(),
        second.edits
    );
    assert_eq!(
        second.output.elements.len(),
        first.output.elements.len()
    );
}

#[test]
fn cancelled_pipeline_stops_at_a_rule_boundary() {
    let model = miniature_building();
    let cancel = CancelToken::new();
    cancel.cancel();
    let err = run_pipeline(&model, &PipelineConfig::default(), None, &cancel).unwrap_err();
    assert!(matches!(err, structalign_core::Error::Cancelled));
}

#[test]
fn self_reference_comparison_is_clean() {
    let model = miniature_building();
    let config = PipelineConfig::default();
    let cancel = CancelToken::new();

    // Use the pipeline's own output as the reference model: every common
    // vertex must match and recall must be total.
    let first = run_pipeline(&model, &config, None, &cancel).unwrap();
    let again = run_pipeline(&model, &config, Some(&first.output), &cancel).unwrap();

    assert_eq!(again.report.recall_x, Some(1.0));
    assert_eq!(again.report.recall_y, Some(1.0));
    let reference = again.report.reference.as_ref().unwrap();
    assert_eq!(reference.match_rate, 1.0);
}

#[test]
fn report_serializes_to_json() {
    let model = miniature_building();
    let config = PipelineConfig::default();
    let outcome = run_pipeline(&model, &config, None, &CancelToken::new()).unwrap();
    let json = serde_json::to_string_pretty(&outcome.report).unwrap();
    assert!(json.contains("axis_lines_x"));
    assert!(json.contains("rule_counts"));
    assert!(json.contains("consolidation_clusters"));
}
