// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # StructAlign Alignment
//!
//! The alignment engine: axis-line discovery, per-element endpoint
//! resolution, and the two-tier snap that produces the aligned vertex
//! stream.
//!
//! Discovery treats axis selection as filtering of existing positions by
//! multi-floor presence rather than density clustering; the snap lifts the
//! target decision from individual vertices to element endpoints so that a
//! spanning wall's two ends can land on two different axis lines. Z is never
//! touched.

pub mod compare;
pub mod discovery;
pub mod endpoints;
pub mod snap;
pub mod stats;
pub mod validate;

pub use compare::{compare_with_reference, ReferenceComparison};
pub use discovery::{discover_axis_lines, DiscoveryOutcome, ReferencePositions};
pub use endpoints::{resolve_endpoints, ElementEndpoints};
pub use snap::{align_model, AlignmentOutcome, SnapTier};
pub use stats::{axis_statistics, percentile, AxisStatistics, DisplacementPercentiles};
pub use validate::validate_alignment;
