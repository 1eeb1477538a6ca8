// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # StructAlign Core
//!
//! Data model and shared types for the structural model alignment pipeline.
//!
//! This crate holds the vocabulary the rest of the workspace speaks:
//! structural elements with their typed vertex lists, discovered axis lines,
//! aligned vertices, object edits, the floor ladder, and the pipeline
//! configuration. The alignment and transform crates operate exclusively on
//! these types; the CLI materializes them from and to the JSON interchange
//! documents produced by the external model reader.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use structalign_core::{Model, PipelineConfig};
//!
//! let model: Model = serde_json::from_str(document)?;
//! model.validate_input()?;
//! let config = PipelineConfig::default();
//! ```

pub mod aligned;
pub mod cancel;
pub mod config;
pub mod edit;
pub mod element;
pub mod error;
pub mod floor;

pub use aligned::{AlignedVertex, Axis, AxisLine};
pub use cancel::CancelToken;
pub use config::{round_to, PipelineConfig};
pub use edit::{LayerHint, NameAllocator, ObjectEdit};
pub use element::{Element, ElementId, ElementKind, GeometryKind, Model, Vertex};
pub use error::{Error, Result, Warning};
pub use floor::FloorLadder;
