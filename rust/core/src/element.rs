// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Structural elements and their vertex lists.
//!
//! An [`Element`] owns its ordered vertices for the whole pipeline lifetime;
//! vertices are immutable after ingest and are referenced elsewhere by the
//! pair (element id, vertex index). The [`Model`] is the fully materialized
//! input set the pipeline operates on.

use serde::{Deserialize, Serialize};

use crate::aligned::Axis;
use crate::error::{Error, Result};

/// Stable identifier of a structural element, assigned by the external reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(pub u64);

impl std::fmt::Display for ElementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Structural discipline of an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ElementKind {
    /// Point-like vertical load carrier.
    Column,
    /// Planar vertical element.
    Wall,
    /// Horizontal floor or roof plate.
    Slab,
    /// Boundary-condition marker (point or line).
    Support,
    /// Linear horizontal element.
    Beam,
}

impl ElementKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ElementKind::Column => "COLUMN",
            ElementKind::Wall => "WALL",
            ElementKind::Slab => "SLAB",
            ElementKind::Support => "SUPPORT",
            ElementKind::Beam => "BEAM",
        }
    }

    /// All kinds, in the order used for per-kind report breakdowns.
    pub fn all() -> [ElementKind; 5] {
        [
            ElementKind::Column,
            ElementKind::Wall,
            ElementKind::Slab,
            ElementKind::Support,
            ElementKind::Beam,
        ]
    }
}

impl std::fmt::Display for ElementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Geometry representation tag carried over from the source model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GeometryKind {
    Brep,
    LineCurve,
    PolyCurve,
    NurbsCurve,
    Point,
}

/// A single model vertex. Immutable after ingest.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    /// Position of this vertex within its element's ordered list.
    pub index: u32,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vertex {
    pub fn new(index: u32, x: f64, y: f64, z: f64) -> Self {
        Self { index, x, y, z }
    }

    /// Coordinate of this vertex on the given horizontal axis.
    pub fn on(&self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

/// Axis-aligned bounding box of an element's vertices.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
    pub z_min: f64,
    pub z_max: f64,
}

impl Bounds {
    pub fn x_range(&self) -> f64 {
        self.x_max - self.x_min
    }

    pub fn y_range(&self) -> f64 {
        self.y_max - self.y_min
    }
}

/// A named structural element with its ordered vertex list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Element {
    pub id: ElementId,
    pub name: String,
    pub kind: ElementKind,
    pub geometry_kind: GeometryKind,
    /// Number of faces in the source Brep, when the reader knows it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub face_count: Option<u32>,
    /// Logical layer the object sits on in the source model.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layer: Option<String>,
    #[serde(default)]
    pub vertices: Vec<Vertex>,
}

impl Element {
    /// Bounding box of the vertex set, `None` for an empty element.
    pub fn bounds(&self) -> Option<Bounds> {
        let first = self.vertices.first()?;
        let mut b = Bounds {
            x_min: first.x,
            x_max: first.x,
            y_min: first.y,
            y_max: first.y,
            z_min: first.z,
            z_max: first.z,
        };
        for v in &self.vertices[1..] {
            b.x_min = b.x_min.min(v.x);
            b.x_max = b.x_max.max(v.x);
            b.y_min = b.y_min.min(v.y);
            b.y_max = b.y_max.max(v.y);
            b.z_min = b.z_min.min(v.z);
            b.z_max = b.z_max.max(v.z);
        }
        Some(b)
    }

    pub fn max_z(&self) -> Option<f64> {
        self.vertices
            .iter()
            .map(|v| v.z)
            .fold(None, |acc, z| Some(acc.map_or(z, |m: f64| m.max(z))))
    }

    /// Mean XY position of the vertex set.
    pub fn centroid_xy(&self) -> Option<(f64, f64)> {
        if self.vertices.is_empty() {
            return None;
        }
        let n = self.vertices.len() as f64;
        let sx: f64 = self.vertices.iter().map(|v| v.x).sum();
        let sy: f64 = self.vertices.iter().map(|v| v.y).sum();
        Some((sx / n, sy / n))
    }
}

/// The fully materialized input set: every element of the source model,
/// in source order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Model {
    pub elements: Vec<Element>,
}

impl Model {
    pub fn new(elements: Vec<Element>) -> Self {
        Self { elements }
    }

    pub fn vertex_count(&self) -> usize {
        self.elements.iter().map(|e| e.vertices.len()).sum()
    }

    /// Iterates all vertices across all elements, in element order.
    pub fn all_vertices(&self) -> impl Iterator<Item = &Vertex> + '_ {
        self.elements.iter().flat_map(|e| e.vertices.iter())
    }

    pub fn max_element_id(&self) -> u64 {
        self.elements.iter().map(|e| e.id.0).max().unwrap_or(0)
    }

    /// Ingest-time validation: coordinates must be finite and element ids
    /// unique. Violations are fatal (`InvalidInput`).
    pub fn validate_input(&self) -> Result<()> {
        let mut seen = std::collections::HashSet::with_capacity(self.elements.len());
        for element in &self.elements {
            if !seen.insert(element.id) {
                return Err(Error::InvalidInput(format!(
                    "duplicate element id {} ({})",
                    element.id, element.name
                )));
            }
            for v in &element.vertices {
                if !v.is_finite() {
                    return Err(Error::InvalidInput(format!(
                        "non-finite coordinate in element {} ({}) vertex {}",
                        element.id, element.name, v.index
                    )));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn element(id: u64, kind: ElementKind, coords: &[(f64, f64, f64)]) -> Element {
        Element {
            id: ElementId(id),
            name: format!("E_{id}"),
            kind,
            geometry_kind: GeometryKind::Brep,
            face_count: None,
            layer: None,
            vertices: coords
                .iter()
                .enumerate()
                .map(|(i, &(x, y, z))| Vertex::new(i as u32, x, y, z))
                .collect(),
        }
    }

    #[test]
    fn bounds_and_centroid() {
        let e = element(
            1,
            ElementKind::Wall,
            &[(0.0, 0.0, 0.0), (4.0, 0.2, 3.0), (4.0, 0.0, 0.0)],
        );
        let b = e.bounds().unwrap();
        assert_eq!(b.x_range(), 4.0);
        assert_eq!(b.y_range(), 0.2);
        assert_eq!(e.max_z(), Some(3.0));
        let (cx, _) = e.centroid_xy().unwrap();
        assert!((cx - 8.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn empty_element_has_no_bounds() {
        let e = element(1, ElementKind::Column, &[]);
        assert!(e.bounds().is_none());
        assert!(e.centroid_xy().is_none());
    }

    #[test]
    fn duplicate_ids_rejected() {
        let model = Model::new(vec![
            element(1, ElementKind::Column, &[(0.0, 0.0, 0.0)]),
            element(1, ElementKind::Wall, &[(1.0, 1.0, 0.0)]),
        ]);
        assert!(model.validate_input().is_err());
    }

    #[test]
    fn non_finite_coordinates_rejected() {
        let model = Model::new(vec![element(
            1,
            ElementKind::Column,
            &[(f64::NAN, 0.0, 0.0)],
        )]);
        assert!(model.validate_input().is_err());
    }

    #[test]
    fn kind_names_round_trip() {
        let json = serde_json::to_string(&ElementKind::Wall).unwrap();
        assert_eq!(json, "\"WALL\"");
        let kind: ElementKind = serde_json::from_str("\"SUPPORT\"").unwrap();
        assert_eq!(kind, ElementKind::Support);
        let geom: GeometryKind = serde_json::from_str("\"LINE_CURVE\"").unwrap();
        assert_eq!(geom, GeometryKind::LineCurve);
    }
}
