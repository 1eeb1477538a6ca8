// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Grid curve emission.
//!
//! One unnamed horizontal curve per Y axis line, spanning the building's X
//! extent, on the dedicated grid layer. Y lines that already carry a grid
//! curve (a re-run on the pipeline's own output) are skipped.

use structalign_core::{
    AxisLine, ElementKind, GeometryKind, LayerHint, Model, ObjectEdit, PipelineConfig, Vertex,
};

/// Output of grid emission.
#[derive(Debug, Clone)]
pub struct GridGeneration {
    pub edits: Vec<ObjectEdit>,
    pub added: u32,
}

/// Emits grid curves for every Y axis line not yet drawn.
pub fn generate_grid(
    model: &Model,
    x_lines: &[AxisLine],
    y_lines: &[AxisLine],
    config: &PipelineConfig,
) -> GridGeneration {
    let (Some(first), Some(last)) = (x_lines.first(), x_lines.last()) else {
        return GridGeneration {
            edits: Vec::new(),
            added: 0,
        };
    };
    let (x_min, x_max) = (first.position, last.position);

    // Y positions already covered by an unnamed grid-layer curve.
    let existing: Vec<f64> = model
        .elements
        .iter()
        .filter(|e| {
            e.name.is_empty() && e.layer.as_deref() == Some(LayerHint::Grid.layer_name())
        })
        .filter_map(|e| e.vertices.first().map(|v| v.y))
        .collect();

    let mut edits = Vec::new();
    for y_line in y_lines {
        let y = y_line.position;
        if existing
            .iter()
            .any(|&ey| (ey - y).abs() <= config.rounding_precision)
        {
            continue;
        }
        edits.push(ObjectEdit::Add {
            kind: ElementKind::Beam,
            geometry_kind: GeometryKind::PolyCurve,
            name: String::new(),
            vertices: vec![
                Vertex::new(0, x_min, y, 0.0),
                Vertex::new(1, x_max, y, 0.0),
            ],
            layer_hint: LayerHint::Grid,
        });
    }

    let added = edits.len() as u32;
    tracing::info!(added, "grid generation complete");
    GridGeneration { edits, added }
}
