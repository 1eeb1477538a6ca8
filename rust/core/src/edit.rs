// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Object edits: the transform engine's description of what to add and
//! remove, consumed by the materializer.

use serde::{Deserialize, Serialize};

use crate::element::{ElementId, ElementKind, GeometryKind, Vertex};

/// Logical layer a synthesized object should land on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LayerHint {
    Default,
    Supports,
    Centerlines,
    Grid,
}

impl LayerHint {
    pub fn layer_name(&self) -> &'static str {
        match self {
            LayerHint::Default => "Default",
            LayerHint::Supports => "Supports",
            LayerHint::Centerlines => "Centerlines",
            LayerHint::Grid => "Grid",
        }
    }
}

/// One object-level mutation of the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ObjectEdit {
    Remove {
        element_id: ElementId,
    },
    Add {
        kind: ElementKind,
        geometry_kind: GeometryKind,
        name: String,
        vertices: Vec<Vertex>,
        layer_hint: LayerHint,
    },
}

impl ObjectEdit {
    pub fn is_removal(&self) -> bool {
        matches!(self, ObjectEdit::Remove { .. })
    }
}

/// Allocates synthetic object names by continuing past the highest numeric
/// suffix already present for a prefix.
///
/// Keeps emitted names disjoint from the source model's and stable across
/// re-runs on the pipeline's own output.
#[derive(Debug, Clone)]
pub struct NameAllocator {
    prefix: &'static str,
    next: u64,
}

impl NameAllocator {
    /// Scans existing names and positions the allocator after the highest
    /// `<prefix><n>` found.
    pub fn scan<'a>(prefix: &'static str, names: impl Iterator<Item = &'a str>) -> Self {
        let mut max_id = 0u64;
        for name in names {
            if let Some(rest) = name.strip_prefix(prefix) {
                if let Ok(n) = rest.parse::<u64>() {
                    max_id = max_id.max(n);
                }
            }
        }
        Self {
            prefix,
            next: max_id + 1,
        }
    }

    pub fn next_name(&mut self) -> String {
        let name = format!("{}{}", self.prefix, self.next);
        self.next += 1;
        name
    }
}
