// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error taxonomy of the pipeline.
//!
//! Fatal conditions abort the run without writing the output model and map
//! to stable process exit codes. Recoverable conditions are [`Warning`]s:
//! they accumulate into the report and never alter output correctness.

use crate::aligned::Axis;
use crate::element::{ElementId, ElementKind};

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Fatal pipeline errors.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Malformed input: unknown kind, NaN/infinite coordinate, duplicate id.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Axis discovery produced nothing even after the floor-count fallback.
    #[error("no {axis} axis lines found after fallback")]
    NoAxesFound { axis: Axis },

    /// An internal invariant broke (Z modified, element inconsistency).
    #[error("validation failed: {0}")]
    ValidationFailed(String),

    /// Cooperative cancellation was requested between rules.
    #[error("pipeline cancelled")]
    Cancelled,

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("model document error: {0}")]
    Document(#[from] serde_json::Error),
}

impl Error {
    /// Stable process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::InvalidInput(_) | Error::Document(_) => 10,
            Error::NoAxesFound { .. } => 20,
            Error::ValidationFailed(_) => 30,
            Error::Cancelled | Error::Io(_) => 1,
        }
    }
}

/// Recoverable conditions, surfaced in the final report.
#[derive(Debug, Clone, PartialEq)]
pub enum Warning {
    /// A reference axis position has no discovered counterpart.
    ReferenceMissingPosition { axis: Axis, position: f64 },
    /// Alignment rate fell below the 85% aggregate threshold.
    LowAlignmentRate { rate: f64 },
    /// Reference vertex match rate fell below 95%.
    LowReferenceMatch { rate: f64 },
    /// A removed slab level produced no usable consolidation cluster.
    SlabFootprintUnreconstructable { z: f64 },
    /// Per-kind output count drifted more than 10% from the reference.
    ObjectCountDrift {
        kind: ElementKind,
        output: usize,
        reference: usize,
    },
    /// An element endpoint stayed outside even the outlier snap band.
    UnsnappedEndpoint {
        element_id: ElementId,
        axis: Axis,
        position: f64,
    },
    /// No Y axis lines were discovered, so edge line supports could not be
    /// placed even though walls are present.
    LineSupportsUnplaceable { walls: usize },
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Warning::ReferenceMissingPosition { axis, position } => {
                write!(f, "reference {axis} position {position:.3} not discovered")
            }
            Warning::LowAlignmentRate { rate } => {
                write!(f, "alignment rate {:.1}% below 85%", rate * 100.0)
            }
            Warning::LowReferenceMatch { rate } => {
                write!(f, "reference vertex match {:.1}% below 95%", rate * 100.0)
            }
            Warning::SlabFootprintUnreconstructable { z } => {
                write!(f, "no usable slab footprint cluster at Z={z:.2}")
            }
            Warning::ObjectCountDrift {
                kind,
                output,
                reference,
            } => write!(
                f,
                "{kind} count drifted: output {output} vs reference {reference}"
            ),
            Warning::UnsnappedEndpoint {
                element_id,
                axis,
                position,
            } => write!(
                f,
                "element {element_id}: {axis} endpoint {position:.3} outside outlier band"
            ),
            Warning::LineSupportsUnplaceable { walls } => write!(
                f,
                "no Y axis lines discovered: edge line supports skipped ({walls} walls present)"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_are_stable() {
        assert_eq!(Error::InvalidInput("x".into()).exit_code(), 10);
        assert_eq!(Error::NoAxesFound { axis: Axis::X }.exit_code(), 20);
        assert_eq!(Error::ValidationFailed("z moved".into()).exit_code(), 30);
        assert_eq!(Error::Cancelled.exit_code(), 1);
    }
}
