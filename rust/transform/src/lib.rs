// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # StructAlign Transform
//!
//! The object-level transformation rules and the pipeline that strings them
//! together: slab removal and consolidation, wall simplification, support
//! placement, centerline emission and grid drawing, followed by report
//! generation.
//!
//! Rule ordering is semantic: consolidation (rule 4) consumes the footprints
//! captured during slab removal (rule 3), and centerlines (rule 7) are
//! derived from the supports emitted by rule 6. All emissions are
//! deterministic functions of the input and the configuration.

pub mod centerlines;
pub mod grid;
pub mod materialize;
pub mod pipeline;
pub mod report;
pub mod slabs;
pub mod supports;
pub mod walls;

pub use materialize::apply_edits;
pub use pipeline::{run_pipeline, PipelineOutcome};
pub use report::PipelineReport;
pub use slabs::CONSOLIDATED_SLAB_PREFIX;
