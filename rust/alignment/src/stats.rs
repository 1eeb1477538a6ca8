// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Coordinate and displacement statistics for the report.

use serde::Serialize;

/// Statistical summary of one coordinate axis of the input.
#[derive(Debug, Clone, Serialize)]
pub struct AxisStatistics {
    pub axis: String,
    pub mean: f64,
    pub median: f64,
    /// Population standard deviation.
    pub std: f64,
    pub min: f64,
    pub max: f64,
    pub q1: f64,
    pub q3: f64,
    /// Distinct values at centimeter granularity.
    pub unique_count: usize,
    pub total_count: usize,
}

/// Displacement distribution of the aligned vertex stream.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct DisplacementPercentiles {
    pub p50: f64,
    pub p95: f64,
    pub p99: f64,
    pub max: f64,
}

impl DisplacementPercentiles {
    /// Nearest-rank percentiles over the displacement magnitudes.
    pub fn from_displacements(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self::default();
        }
        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());
        Self {
            p50: percentile(&sorted, 50.0),
            p95: percentile(&sorted, 95.0),
            p99: percentile(&sorted, 99.0),
            max: *sorted.last().unwrap(),
        }
    }
}

/// Nearest-rank percentile of a pre-sorted ascending slice.
pub fn percentile(sorted: &[f64], pct: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let rank = ((pct / 100.0) * sorted.len() as f64).ceil() as usize;
    sorted[rank.clamp(1, sorted.len()) - 1]
}

/// Computes the per-axis summary over a coordinate list.
pub fn axis_statistics(axis: &str, values: &[f64]) -> AxisStatistics {
    if values.is_empty() {
        return AxisStatistics {
            axis: axis.to_string(),
            mean: 0.0,
            median: 0.0,
            std: 0.0,
            min: 0.0,
            max: 0.0,
            q1: 0.0,
            q3: 0.0,
            unique_count: 0,
            total_count: 0,
        };
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());

    let n = sorted.len() as f64;
    let mean = sorted.iter().sum::<f64>() / n;
    let variance = sorted.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;

    // Distinct at centimeter granularity: a statistical summary independent
    // of the alignment rounding precision.
    let mut cm: Vec<i64> = sorted.iter().map(|v| (v * 100.0).round() as i64).collect();
    cm.dedup();

    AxisStatistics {
        axis: axis.to_string(),
        mean,
        median: percentile(&sorted, 50.0),
        std: variance.sqrt(),
        min: sorted[0],
        max: *sorted.last().unwrap(),
        q1: percentile(&sorted, 25.0),
        q3: percentile(&sorted, 75.0),
        unique_count: cm.len(),
        total_count: sorted.len(),
    }
}
