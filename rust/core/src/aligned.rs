// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Axis lines and aligned vertices: the alignment engine's output vocabulary.

use serde::{Deserialize, Serialize};

use crate::element::ElementId;

/// One of the two horizontal snap axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
}

impl Axis {
    pub fn as_str(&self) -> &'static str {
        match self {
            Axis::X => "X",
            Axis::Y => "Y",
        }
    }
}

impl std::fmt::Display for Axis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A canonical axis-line position discovered from the vertex cloud.
///
/// Identity is the pair (axis, position) after rounding; lines are immutable
/// once discovery has emitted them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisLine {
    pub axis: Axis,
    /// Canonical coordinate, on the rounding grid.
    pub position: f64,
    /// Number of distinct floor levels witnessing this position.
    pub floor_count: u32,
    /// Total supporting vertices.
    pub vertex_count: u32,
    /// True when the line was admitted below the configured floor minimum.
    pub fallback: bool,
}

/// A vertex after snapping: original and aligned coordinates side by side.
///
/// `z` is carried over from the original bit-for-bit; the engine never
/// touches it. `axis_x` / `axis_y` index into the sorted axis-line tables.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlignedVertex {
    pub element_id: ElementId,
    pub vertex_index: u32,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub x_original: f64,
    pub y_original: f64,
    pub z_original: f64,
    pub axis_x: Option<usize>,
    pub axis_y: Option<usize>,
    /// 3D Euclidean displacement, for reporting only.
    pub displacement: f64,
}

impl AlignedVertex {
    /// True when at least one axis was assigned.
    pub fn is_aligned(&self) -> bool {
        self.axis_x.is_some() || self.axis_y.is_some()
    }
}
