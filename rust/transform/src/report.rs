// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The pipeline report: everything an operator needs to judge a run
//! without opening the output model.

use serde::Serialize;

use structalign_alignment::{AxisStatistics, DisplacementPercentiles, ReferenceComparison};

/// Per-rule addition/removal counts.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RuleCounts {
    pub slabs_removed: u32,
    pub slabs_kept: u32,
    pub slabs_consolidated: u32,
    pub walls_removed: u32,
    pub wall_segments_added: u32,
    pub supports_removed: u32,
    pub point_supports_added: u32,
    pub line_supports_added: u32,
    pub centerlines_added: u32,
    pub grid_curves_added: u32,
}

/// Consolidation cluster count at one floor level.
#[derive(Debug, Clone, Serialize)]
pub struct ConsolidationLevel {
    pub z: f64,
    pub clusters: usize,
}

/// Reference to a vertex that received no axis assignment.
#[derive(Debug, Clone, Serialize)]
pub struct UnalignedVertexRef {
    pub element_id: u64,
    pub vertex_index: u32,
}

/// Structured summary of a pipeline run, serialized as JSON next to the
/// output model.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    // Axis discovery
    pub axis_lines_x: usize,
    pub axis_lines_y: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recall_x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recall_y: Option<f64>,

    // Alignment
    pub total_elements: usize,
    pub total_vertices: usize,
    pub aligned_vertices: usize,
    pub alignment_rate: f64,
    pub outlier_snaps: u32,
    pub unsnapped_endpoints: u32,
    pub displacement: DisplacementPercentiles,
    pub unaligned_vertices: Vec<UnalignedVertexRef>,

    // Object rules
    pub rule_counts: RuleCounts,
    pub consolidation_clusters: Vec<ConsolidationLevel>,
    pub final_element_count: usize,

    // Input statistics
    pub axis_statistics: Vec<AxisStatistics>,

    // Reference comparison, when one was supplied
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<ReferenceComparison>,

    pub warnings: Vec<String>,
}
