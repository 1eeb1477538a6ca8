// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Output-vs-reference comparison.
//!
//! Matches elements by name and vertices by index, then measures how many
//! common vertices land within tolerance of the reference and how far the
//! per-kind object counts drift.

use nalgebra::Point3;
use rustc_hash::FxHashMap;
use serde::Serialize;

use structalign_core::{ElementKind, Model, Warning};

/// Per-kind object count drift.
#[derive(Debug, Clone, Serialize)]
pub struct KindDrift {
    pub kind: String,
    pub output: usize,
    pub reference: usize,
    pub drift_pct: f64,
}

/// Result of comparing the pipeline output against a reference model.
#[derive(Debug, Clone, Serialize)]
pub struct ReferenceComparison {
    pub vertices_compared: usize,
    pub vertices_matched: usize,
    pub match_rate: f64,
    pub mean_displacement: f64,
    pub max_displacement: f64,
    pub kind_counts: Vec<KindDrift>,
    #[serde(skip)]
    pub warnings: Vec<Warning>,
}

/// Compares the materialized output against a reference model.
pub fn compare_with_reference(
    output: &Model,
    reference: &Model,
    tolerance: f64,
) -> ReferenceComparison {
    let ref_by_name: FxHashMap<&str, &structalign_core::Element> = reference
        .elements
        .iter()
        .filter(|e| !e.name.is_empty())
        .map(|e| (e.name.as_str(), e))
        .collect();

    let mut compared = 0usize;
    let mut matched = 0usize;
    let mut displacement_sum = 0.0;
    let mut displacement_max = 0.0f64;

    for element in &output.elements {
        let Some(ref_element) = ref_by_name.get(element.name.as_str()) else {
            continue;
        };
        let n = element.vertices.len().min(ref_element.vertices.len());
        for i in 0..n {
            let out_v = &element.vertices[i];
            let ref_v = &ref_element.vertices[i];
            let dist = nalgebra::distance(
                &Point3::new(out_v.x, out_v.y, out_v.z),
                &Point3::new(ref_v.x, ref_v.y, ref_v.z),
            );
            compared += 1;
            if dist <= tolerance {
                matched += 1;
            }
            displacement_sum += dist;
            displacement_max = displacement_max.max(dist);
        }
    }

    let match_rate = if compared > 0 {
        matched as f64 / compared as f64
    } else {
        1.0
    };

    let mut warnings = Vec::new();
    if match_rate < 0.95 {
        warnings.push(Warning::LowReferenceMatch { rate: match_rate });
    }

    let mut kind_counts = Vec::new();
    for kind in ElementKind::all() {
        let out_count = output.elements.iter().filter(|e| e.kind == kind).count();
        let ref_count = reference.elements.iter().filter(|e| e.kind == kind).count();
        if out_count == 0 && ref_count == 0 {
            continue;
        }
        let drift_pct = if ref_count > 0 {
            (out_count as f64 - ref_count as f64).abs() / ref_count as f64 * 100.0
        } else {
            100.0
        };
        if drift_pct > 10.0 {
            warnings.push(Warning::ObjectCountDrift {
                kind,
                output: out_count,
                reference: ref_count,
            });
        }
        kind_counts.push(KindDrift {
            kind: kind.as_str().to_string(),
            output: out_count,
            reference: ref_count,
            drift_pct,
        });
    }

    tracing::info!(
        compared,
        matched,
        rate = format!("{:.1}%", match_rate * 100.0),
        "reference comparison complete"
    );

    ReferenceComparison {
        vertices_compared: compared,
        vertices_matched: matched,
        match_rate,
        mean_displacement: if compared > 0 {
            displacement_sum / compared as f64
        } else {
            0.0
        },
        max_displacement: displacement_max,
        kind_counts,
        warnings,
    }
}
