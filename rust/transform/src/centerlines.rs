// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Rule 7: centerline emission.
//!
//! Each emitted point support carries a vertical centerline spanning one
//! floor above it. The curve kind per floor range carries no structural
//! meaning; it matches the reference file so downstream tooling that
//! filters on the tag keeps working.

use structalign_core::{
    ElementKind, GeometryKind, LayerHint, NameAllocator, ObjectEdit, PipelineConfig, Vertex,
};

/// Output of rule 7.
#[derive(Debug, Clone)]
pub struct CenterlineGeneration {
    pub edits: Vec<ObjectEdit>,
    pub added: u32,
}

/// Emits one vertical centerline per point support, spanning to the next
/// floor level above.
pub fn generate_centerlines(
    point_positions: &[(f64, f64, f64)],
    config: &PipelineConfig,
    names: &mut NameAllocator,
) -> CenterlineGeneration {
    let mut edits = Vec::new();
    let mut added = 0u32;

    for &(x, y, z) in point_positions {
        let Some(z_top) = config.floor_ladder.next_above(z) else {
            continue;
        };
        if z_top <= z {
            continue;
        }

        edits.push(ObjectEdit::Add {
            kind: ElementKind::Beam,
            geometry_kind: curve_kind(z, z_top - z, config),
            name: names.next_name(),
            vertices: vec![Vertex::new(0, x, y, z), Vertex::new(1, x, y, z_top)],
            layer_hint: LayerHint::Centerlines,
        });
        added += 1;
    }

    tracing::info!(added, "centerline generation complete");
    CenterlineGeneration { edits, added }
}

/// Curve kind per floor range, matching the reference output.
fn curve_kind(z_bottom: f64, height: f64, config: &PipelineConfig) -> GeometryKind {
    let mut floors = config.support_floors.clone();
    floors.sort_by(|a, b| a.partial_cmp(b).unwrap());

    if let Some(&lowest) = floors.first() {
        if (z_bottom - lowest).abs() < 0.1 && height < 3.0 {
            return GeometryKind::LineCurve;
        }
    }
    if let Some(&second) = floors.get(1) {
        if (z_bottom - second).abs() < 0.1 {
            return GeometryKind::NurbsCurve;
        }
    }
    GeometryKind::PolyCurve
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_centerline_per_support_spanning_one_floor() {
        let config = PipelineConfig::default();
        let mut names = NameAllocator::scan("Centerline_", std::iter::empty());
        let positions = vec![(10.0, 20.0, -4.44), (10.0, 20.0, 2.12)];
        let result = generate_centerlines(&positions, &config, &mut names);
        assert_eq!(result.added, 2);

        match &result.edits[0] {
            ObjectEdit::Add {
                geometry_kind,
                vertices,
                ..
            } => {
                // -4.44 -> -1.56 is a 2.88 m span at the lowest floor: a
                // plain line.
                assert_eq!(*geometry_kind, GeometryKind::LineCurve);
                assert_eq!(vertices[1].z, -1.56);
            }
            _ => panic!("expected addition"),
        }
        match &result.edits[1] {
            ObjectEdit::Add { geometry_kind, vertices, .. } => {
                assert_eq!(*geometry_kind, GeometryKind::NurbsCurve);
                assert_eq!(vertices[1].z, 5.48);
            }
            _ => panic!("expected addition"),
        }
    }

    #[test]
    fn support_above_the_top_floor_gets_no_centerline() {
        let config = PipelineConfig::default();
        let mut names = NameAllocator::scan("Centerline_", std::iter::empty());
        let result = generate_centerlines(&[(0.0, 0.0, 32.36)], &config, &mut names);
        assert_eq!(result.added, 0);
    }

    #[test]
    fn mid_floor_support_gets_a_poly_curve() {
        let config = PipelineConfig::default();
        let mut names = NameAllocator::scan("Centerline_", std::iter::empty());
        let result = generate_centerlines(&[(0.0, 0.0, 13.32)], &config, &mut names);
        match &result.edits[0] {
            ObjectEdit::Add { geometry_kind, .. } => {
                assert_eq!(*geometry_kind, GeometryKind::PolyCurve);
            }
            _ => panic!("expected addition"),
        }
    }
}
