// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Pipeline configuration.
//!
//! All tolerances are in meters. The defaults are the values validated
//! against the reference building; they are deliberately conservative and
//! should rarely need changing.

use serde::{Deserialize, Serialize};

use crate::floor::FloorLadder;

/// Rounds `value` to the nearest multiple of `precision`.
pub fn round_to(value: f64, precision: f64) -> f64 {
    if precision <= 0.0 {
        return value;
    }
    (value / precision).round() * precision
}

/// Configuration for the full alignment pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Grid step aligned coordinates are rounded to (5 mm).
    pub rounding_precision: f64,
    /// Positions closer than this are considered the same (2 mm).
    pub cluster_radius: f64,
    /// Two Z values within this distance witness the same floor (20 mm).
    pub z_tolerance: f64,
    /// Minimum distinct floor levels for a position to become an axis line.
    pub min_floors: u32,
    /// Primary snap tolerance.
    pub max_snap_distance: f64,
    /// Escalated tolerance for rare but legitimate large displacements.
    pub outlier_snap_distance: f64,
    /// Slabs with max Z at or below this are removed; above it, kept as roof.
    pub roof_z_threshold: f64,
    /// Centroid gap beyond which removed slab panels form distinct zones.
    pub consolidation_gap: f64,
    /// Walls thinner than this (but not planar) are degenerate solids.
    pub thin_wall_threshold: f64,
    /// Floor levels at which supports are placed.
    pub support_floors: Vec<f64>,
    /// Column-to-intersection distance for support placement.
    pub proximity_tolerance: f64,
    /// Duplicate-emission suppression radius for supports.
    pub dedup_radius: f64,
    /// Minimum per-axis recall against a reference before the discovery
    /// fallback kicks in.
    pub recall_threshold: f64,
    /// Vertex/position matching tolerance for reference comparison (5 mm).
    pub reference_match_tolerance: f64,
    /// A wall whose bounding range exceeds this on both axes is L-shaped.
    pub l_shape_min_extent: f64,
    /// The fixed floor-Z ladder of the building.
    pub floor_ladder: FloorLadder,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            rounding_precision: 0.005,
            cluster_radius: 0.002,
            z_tolerance: 0.020,
            min_floors: 3,
            max_snap_distance: 0.75,
            outlier_snap_distance: 4.0,
            roof_z_threshold: 30.0,
            consolidation_gap: 2.0,
            thin_wall_threshold: 0.05,
            support_floors: vec![-4.44, 2.12],
            proximity_tolerance: 0.5,
            dedup_radius: 0.1,
            recall_threshold: 0.95,
            reference_match_tolerance: 0.005,
            l_shape_min_extent: 1.0,
            floor_ladder: FloorLadder::reference(),
        }
    }
}

impl PipelineConfig {
    /// Lowest support floor; line supports and beam-style centerlines attach
    /// here.
    pub fn lowest_support_floor(&self) -> Option<f64> {
        self.support_floors
            .iter()
            .copied()
            .fold(None, |acc, z| Some(acc.map_or(z, |m: f64| m.min(z))))
    }
}
