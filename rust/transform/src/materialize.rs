// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Reference materializer for the JSON interchange model.
//!
//! Applies the aligned vertex stream and the object edits to a model,
//! producing the document the CLI writes out. The binary-format writer
//! stays external; this materializer exists so the pipeline (and its
//! idempotence tests) can round-trip without it.

use rustc_hash::{FxHashMap, FxHashSet};

use structalign_core::{
    AlignedVertex, Element, ElementId, GeometryKind, Model, ObjectEdit,
};

/// Applies aligned coordinates and object edits, yielding the output model.
///
/// Surviving elements keep their identity and vertex ordering; additions are
/// appended after them with freshly allocated ids.
pub fn apply_edits(model: &Model, aligned: &[AlignedVertex], edits: &[ObjectEdit]) -> Model {
    let mut aligned_by_vertex: FxHashMap<(ElementId, u32), &AlignedVertex> =
        FxHashMap::default();
    for v in aligned {
        aligned_by_vertex.insert((v.element_id, v.vertex_index), v);
    }

    let removed: FxHashSet<ElementId> = edits
        .iter()
        .filter_map(|e| match e {
            ObjectEdit::Remove { element_id } => Some(*element_id),
            ObjectEdit::Add { .. } => None,
        })
        .collect();

    let mut elements = Vec::with_capacity(model.elements.len());
    for element in &model.elements {
        if removed.contains(&element.id) {
            continue;
        }
        let mut out = element.clone();
        for v in &mut out.vertices {
            if let Some(av) = aligned_by_vertex.get(&(element.id, v.index)) {
                v.x = av.x;
                v.y = av.y;
                v.z = av.z;
            }
        }
        elements.push(out);
    }

    let mut next_id = model.max_element_id() + 1;
    for edit in edits {
        let ObjectEdit::Add {
            kind,
            geometry_kind,
            name,
            vertices,
            layer_hint,
        } = edit
        else {
            continue;
        };
        elements.push(Element {
            id: ElementId(next_id),
            name: name.clone(),
            kind: *kind,
            geometry_kind: *geometry_kind,
            face_count: matches!(geometry_kind, GeometryKind::Brep).then_some(1),
            layer: Some(layer_hint.layer_name().to_string()),
            vertices: vertices.clone(),
        });
        next_id += 1;
    }

    Model::new(elements)
}

#[cfg(test)]
mod tests {
    use super::*;
    use structalign_core::{ElementKind, LayerHint, Vertex};

    fn model() -> Model {
        Model::new(vec![
            Element {
                id: ElementId(1),
                name: "Column_1".into(),
                kind: ElementKind::Column,
                geometry_kind: GeometryKind::Brep,
                face_count: None,
                layer: None,
                vertices: vec![Vertex::new(0, 1.01, 2.0, -4.44)],
            },
            Element {
                id: ElementId(2),
                name: "Slab_2".into(),
                kind: ElementKind::Slab,
                geometry_kind: GeometryKind::Brep,
                face_count: Some(1),
                layer: None,
                vertices: vec![Vertex::new(0, 0.0, 0.0, 2.12)],
            },
        ])
    }

    #[test]
    fn substitutes_removes_and_appends() {
        let m = model();
        let aligned = vec![AlignedVertex {
            element_id: ElementId(1),
            vertex_index: 0,
            x: 1.0,
            y: 2.0,
            z: -4.44,
            x_original: 1.01,
            y_original: 2.0,
            z_original: -4.44,
            axis_x: Some(0),
            axis_y: None,
            displacement: 0.01,
        }];
        let edits = vec![
            ObjectEdit::Remove {
                element_id: ElementId(2),
            },
            ObjectEdit::Add {
                kind: ElementKind::Support,
                geometry_kind: GeometryKind::Point,
                name: "Support_1".into(),
                vertices: vec![Vertex::new(0, 1.0, 2.0, -4.44)],
                layer_hint: LayerHint::Supports,
            },
        ];

        let out = apply_edits(&m, &aligned, &edits);
        assert_eq!(out.elements.len(), 2);
        assert_eq!(out.elements[0].vertices[0].x, 1.0);
        let added = &out.elements[1];
        assert_eq!(added.id, ElementId(3));
        assert_eq!(added.name, "Support_1");
        assert_eq!(added.layer.as_deref(), Some("Supports"));
        assert_eq!(added.face_count, None);
    }
}
