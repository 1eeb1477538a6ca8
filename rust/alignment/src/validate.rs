// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Post-alignment validation.
//!
//! The critical checks guard invariants that must never break: Z
//! immutability, snap distance, and element-level endpoint consistency. A
//! failure there means an internal bug and aborts the pipeline. The
//! aggregate alignment-rate check only warns.

use rustc_hash::{FxHashMap, FxHashSet};

use structalign_core::{
    Axis, AxisLine, ElementId, Error, Model, PipelineConfig, Result, Warning,
};

use crate::snap::AlignmentOutcome;

/// Runs all validation checks on the aligned stream.
pub fn validate_alignment(
    model: &Model,
    outcome: &AlignmentOutcome,
    x_lines: &[AxisLine],
    y_lines: &[AxisLine],
    config: &PipelineConfig,
) -> Result<Vec<Warning>> {
    if outcome.vertices.len() != model.vertex_count() {
        return Err(Error::ValidationFailed(format!(
            "vertex count changed: {} in, {} out",
            model.vertex_count(),
            outcome.vertices.len()
        )));
    }

    let mut aligned_count = 0usize;
    let mut per_element: FxHashMap<(ElementId, Axis), FxHashSet<u64>> = FxHashMap::default();

    for v in &outcome.vertices {
        if v.z.to_bits() != v.z_original.to_bits() {
            return Err(Error::ValidationFailed(format!(
                "Z was modified on element {} vertex {}: {} -> {}",
                v.element_id, v.vertex_index, v.z_original, v.z
            )));
        }

        for (axis, assigned, aligned, lines) in [
            (Axis::X, v.axis_x, v.x, x_lines),
            (Axis::Y, v.axis_y, v.y, y_lines),
        ] {
            let Some(line_idx) = assigned else { continue };
            let line = lines.get(line_idx).ok_or_else(|| {
                Error::ValidationFailed(format!(
                    "element {} vertex {} references missing {axis} line {line_idx}",
                    v.element_id, v.vertex_index
                ))
            })?;
            if (aligned - line.position).abs() > config.rounding_precision {
                return Err(Error::ValidationFailed(format!(
                    "element {} vertex {} off its {axis} line: {} vs {}",
                    v.element_id, v.vertex_index, aligned, line.position
                )));
            }
            per_element
                .entry((v.element_id, axis))
                .or_default()
                .insert(aligned.to_bits());
        }

        if v.is_aligned() {
            aligned_count += 1;
        }
    }

    // Element-level consistency: the distinct aligned coordinates on an axis
    // cannot outnumber the element's endpoints there.
    for ((element_id, axis), coords) in &per_element {
        let Some(targets) = outcome.targets.get(element_id) else {
            return Err(Error::ValidationFailed(format!(
                "aligned vertices for element {element_id} without endpoint targets"
            )));
        };
        let endpoint_count = match axis {
            Axis::X => targets.x.len(),
            Axis::Y => targets.y.len(),
        };
        if coords.len() > endpoint_count {
            return Err(Error::ValidationFailed(format!(
                "element {element_id}: {} distinct aligned {axis} values for {} endpoints",
                coords.len(),
                endpoint_count
            )));
        }
    }

    let mut warnings = Vec::new();
    if !outcome.vertices.is_empty() {
        let rate = aligned_count as f64 / outcome.vertices.len() as f64;
        if rate < 0.85 {
            tracing::warn!(rate = format!("{:.1}%", rate * 100.0), "low alignment rate");
            warnings.push(Warning::LowAlignmentRate { rate });
        }
    }
    Ok(warnings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snap::align_model;
    use structalign_core::{Element, ElementId, ElementKind, GeometryKind, Vertex};

    fn test_model() -> Model {
        Model::new(vec![Element {
            id: ElementId(1),
            name: "Column_1".into(),
            kind: ElementKind::Column,
            geometry_kind: GeometryKind::Brep,
            face_count: None,
            layer: None,
            vertices: vec![
                Vertex::new(0, -39.775, 22.500, -4.44),
                Vertex::new(1, -39.770, 22.502, -1.56),
            ],
        }])
    }

    fn lines(axis: Axis, positions: &[f64]) -> Vec<AxisLine> {
        positions
            .iter()
            .map(|&position| AxisLine {
                axis,
                position,
                floor_count: 6,
                vertex_count: 40,
                fallback: false,
            })
            .collect()
    }

    #[test]
    fn clean_alignment_passes() {
        let model = test_model();
        let config = PipelineConfig::default();
        let x = lines(Axis::X, &[-39.7]);
        let y = lines(Axis::Y, &[22.5]);
        let outcome = align_model(&model, &x, &y, &config);
        let warnings = validate_alignment(&model, &outcome, &x, &y, &config).unwrap();
        assert!(warnings.is_empty());
    }

    #[test]
    fn modified_z_is_fatal() {
        let model = test_model();
        let config = PipelineConfig::default();
        let x = lines(Axis::X, &[-39.7]);
        let y = lines(Axis::Y, &[22.5]);
        let mut outcome = align_model(&model, &x, &y, &config);
        outcome.vertices[0].z += 0.001;
        let err = validate_alignment(&model, &outcome, &x, &y, &config).unwrap_err();
        assert!(matches!(err, Error::ValidationFailed(_)));
    }

    #[test]
    fn off_line_coordinate_is_fatal() {
        let model = test_model();
        let config = PipelineConfig::default();
        let x = lines(Axis::X, &[-39.7]);
        let y = lines(Axis::Y, &[22.5]);
        let mut outcome = align_model(&model, &x, &y, &config);
        outcome.vertices[0].x = -39.0;
        let err = validate_alignment(&model, &outcome, &x, &y, &config).unwrap_err();
        assert!(matches!(err, Error::ValidationFailed(_)));
    }

    #[test]
    fn unaligned_stream_only_warns() {
        let model = test_model();
        let config = PipelineConfig::default();
        // No axis lines anywhere near: everything stays put.
        let x = lines(Axis::X, &[500.0]);
        let y = lines(Axis::Y, &[500.0]);
        let outcome = align_model(&model, &x, &y, &config);
        let warnings = validate_alignment(&model, &outcome, &x, &y, &config).unwrap();
        assert!(warnings
            .iter()
            .any(|w| matches!(w, Warning::LowAlignmentRate { .. })));
    }
}
