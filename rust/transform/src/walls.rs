// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Rule 5: wall simplification.
//!
//! Multi-face wall Breps and degenerate thin solids are replaced by one
//! single-face planar rectangle per floor span, using the aligned extents
//! from the snap. Replacement rectangles have zero thickness and a single
//! face, so a re-run does not touch them again.

use rustc_hash::FxHashMap;

use structalign_core::{
    AlignedVertex, Element, ElementId, ElementKind, GeometryKind, LayerHint, Model, ObjectEdit,
    PipelineConfig, Vertex,
};

/// Output of rule 5.
#[derive(Debug, Clone)]
pub struct WallSimplification {
    pub edits: Vec<ObjectEdit>,
    pub removed: u32,
    pub segments_added: u32,
}

/// Replaces multi-face and thin-solid walls with per-floor rectangles.
pub fn simplify_walls(
    model: &Model,
    aligned_by_element: &FxHashMap<ElementId, Vec<&AlignedVertex>>,
    config: &PipelineConfig,
) -> WallSimplification {
    let mut targets: Vec<&Element> = model
        .elements
        .iter()
        .filter(|e| e.kind == ElementKind::Wall && should_simplify(e, config))
        .collect();
    targets.sort_by_key(|e| e.id);

    let mut edits = Vec::new();
    let mut removed = 0u32;
    let mut segments_added = 0u32;

    for element in targets {
        let Some(aligned) = aligned_by_element.get(&element.id) else {
            continue;
        };
        if aligned.is_empty() {
            continue;
        }

        removed += 1;
        edits.push(ObjectEdit::Remove {
            element_id: element.id,
        });

        let extent = AlignedExtent::from_vertices(aligned);
        let boundaries = floor_boundaries(extent.z_min, extent.z_max, config);
        let multi_segment = boundaries.len() > 2;

        for (i, pair) in boundaries.windows(2).enumerate() {
            let (z_bot, z_top) = (pair[0], pair[1]);
            if z_top - z_bot < 0.1 {
                continue;
            }
            let name = if multi_segment {
                format!("{}_{i}", element.name)
            } else {
                element.name.clone()
            };
            edits.push(ObjectEdit::Add {
                kind: ElementKind::Wall,
                geometry_kind: GeometryKind::Brep,
                name,
                vertices: extent.segment_rectangle(z_bot, z_top),
                layer_hint: LayerHint::Default,
            });
            segments_added += 1;
        }
    }

    tracing::info!(removed, segments_added, "wall simplification complete");
    WallSimplification {
        edits,
        removed,
        segments_added,
    }
}

/// A wall triggers simplification when its source Brep has several faces or
/// when it is a degenerate thin solid. Planar replacements (zero thickness,
/// single face) stay untouched.
fn should_simplify(element: &Element, config: &PipelineConfig) -> bool {
    if element.face_count.is_some_and(|f| f > 1) {
        return true;
    }
    let Some(bounds) = element.bounds() else {
        return false;
    };
    let thickness = bounds.x_range().min(bounds.y_range());
    thickness > 1e-9 && thickness < config.thin_wall_threshold
}

/// Aligned planar extent of a wall, classified as X- or Y-oriented.
struct AlignedExtent {
    x_oriented: bool,
    along_min: f64,
    along_max: f64,
    cross: f64,
    z_min: f64,
    z_max: f64,
}

impl AlignedExtent {
    fn from_vertices(aligned: &[&AlignedVertex]) -> Self {
        let mut x_min = f64::INFINITY;
        let mut x_max = f64::NEG_INFINITY;
        let mut y_min = f64::INFINITY;
        let mut y_max = f64::NEG_INFINITY;
        let mut z_min = f64::INFINITY;
        let mut z_max = f64::NEG_INFINITY;
        let mut y_sum = 0.0;
        let mut x_sum = 0.0;
        for v in aligned {
            x_min = x_min.min(v.x);
            x_max = x_max.max(v.x);
            y_min = y_min.min(v.y);
            y_max = y_max.max(v.y);
            z_min = z_min.min(v.z);
            z_max = z_max.max(v.z);
            x_sum += v.x;
            y_sum += v.y;
        }
        let n = aligned.len() as f64;

        // Diagonal walls are approximated as axis-aligned; acceptable for a
        // structural model where walls overwhelmingly follow the grid.
        let x_oriented = (x_max - x_min) > (y_max - y_min);
        if x_oriented {
            Self {
                x_oriented,
                along_min: x_min,
                along_max: x_max,
                cross: y_sum / n,
                z_min,
                z_max,
            }
        } else {
            Self {
                x_oriented,
                along_min: y_min,
                along_max: y_max,
                cross: x_sum / n,
                z_min,
                z_max,
            }
        }
    }

    /// Corner vertices of one single-face vertical rectangle.
    fn segment_rectangle(&self, z_bot: f64, z_top: f64) -> Vec<Vertex> {
        if self.x_oriented {
            vec![
                Vertex::new(0, self.along_min, self.cross, z_bot),
                Vertex::new(1, self.along_max, self.cross, z_bot),
                Vertex::new(2, self.along_max, self.cross, z_top),
                Vertex::new(3, self.along_min, self.cross, z_top),
            ]
        } else {
            vec![
                Vertex::new(0, self.cross, self.along_min, z_bot),
                Vertex::new(1, self.cross, self.along_max, z_bot),
                Vertex::new(2, self.cross, self.along_max, z_top),
                Vertex::new(3, self.cross, self.along_min, z_top),
            ]
        }
    }
}

/// Ladder levels strictly inside the wall's Z range, with the range ends
/// prepended and appended.
fn floor_boundaries(z_min: f64, z_max: f64, config: &PipelineConfig) -> Vec<f64> {
    let mut boundaries = vec![z_min];
    for &z in config.floor_ladder.levels() {
        if z_min + 0.1 < z && z < z_max - 0.1 {
            boundaries.push(z);
        }
    }
    boundaries.push(z_max);
    boundaries
}
