// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Rules 3 and 4: slab removal and per-floor consolidation.
//!
//! Every floor slab below the roof threshold is removed; its XY footprint is
//! retained, grouped by floor level. Consolidation then replaces the removed
//! panels with one to three large rectangles per floor, split where the
//! panel centroids leave a gap wider than the consolidation threshold.

use std::collections::BTreeMap;

use structalign_core::{
    ElementKind, GeometryKind, LayerHint, Model, NameAllocator, ObjectEdit, PipelineConfig,
    Vertex, Warning,
};

/// Name prefix of consolidated slabs. Rule 3 skips slabs carrying it, so a
/// re-run on the pipeline's own output does not remove what it added.
pub const CONSOLIDATED_SLAB_PREFIX: &str = "SlabZone_";

/// XY footprint of a removed slab panel.
#[derive(Debug, Clone, Copy)]
pub struct SlabFootprint {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

impl SlabFootprint {
    fn centroid(&self) -> (f64, f64) {
        (
            (self.x_min + self.x_max) / 2.0,
            (self.y_min + self.y_max) / 2.0,
        )
    }
}

/// Output of rule 3.
#[derive(Debug, Clone)]
pub struct SlabRemoval {
    pub edits: Vec<ObjectEdit>,
    /// Removed footprints grouped by millimeter-quantized floor level.
    pub footprints: BTreeMap<i64, Vec<SlabFootprint>>,
    pub removed: u32,
    pub kept: u32,
}

/// Rule 3: removes every slab whose highest vertex stays at or below the
/// roof threshold, capturing footprints for rule 4.
pub fn remove_slabs(model: &Model, config: &PipelineConfig) -> SlabRemoval {
    let mut removals: Vec<(u64, ObjectEdit)> = Vec::new();
    let mut footprints: BTreeMap<i64, Vec<SlabFootprint>> = BTreeMap::new();
    let mut kept = 0u32;

    for element in &model.elements {
        if element.kind != ElementKind::Slab {
            continue;
        }
        if element.name.starts_with(CONSOLIDATED_SLAB_PREFIX) {
            kept += 1;
            continue;
        }
        let Some(bounds) = element.bounds() else {
            continue;
        };
        if bounds.z_max > config.roof_z_threshold {
            kept += 1;
            tracing::debug!(name = %element.name, max_z = bounds.z_max, "keeping roof slab");
            continue;
        }

        let mean_z = element.vertices.iter().map(|v| v.z).sum::<f64>()
            / element.vertices.len() as f64;
        let level = config
            .floor_ladder
            .match_level(mean_z, 0.5)
            .unwrap_or((mean_z * 100.0).round() / 100.0);

        footprints
            .entry((level * 1000.0).round() as i64)
            .or_default()
            .push(SlabFootprint {
                x_min: bounds.x_min,
                x_max: bounds.x_max,
                y_min: bounds.y_min,
                y_max: bounds.y_max,
            });
        removals.push((
            element.id.0,
            ObjectEdit::Remove {
                element_id: element.id,
            },
        ));
    }

    removals.sort_by_key(|(id, _)| *id);
    let removed = removals.len() as u32;
    tracing::info!(removed, kept, "slab removal complete");

    SlabRemoval {
        edits: removals.into_iter().map(|(_, e)| e).collect(),
        footprints,
        removed,
        kept,
    }
}

/// Output of rule 4.
#[derive(Debug, Clone)]
pub struct Consolidation {
    pub edits: Vec<ObjectEdit>,
    /// (floor Z, cluster count) per synthesized level, bottom-up.
    pub clusters_per_level: Vec<(f64, usize)>,
    pub warnings: Vec<Warning>,
}

/// Rule 4: synthesizes 1–3 consolidated rectangles per floor level from the
/// removed footprints. The topmost ladder level is excluded (the roof is
/// kept, not consolidated).
pub fn consolidate_slabs(
    removal: &SlabRemoval,
    config: &PipelineConfig,
    names: &mut NameAllocator,
) -> Consolidation {
    let mut edits = Vec::new();
    let mut clusters_per_level = Vec::new();
    let mut warnings = Vec::new();

    let top_key = config
        .floor_ladder
        .top()
        .map(|z| (z * 1000.0).round() as i64);

    for (&level_key, panels) in &removal.footprints {
        if Some(level_key) == top_key {
            continue;
        }
        let z = level_key as f64 / 1000.0;

        let clusters = cluster_panels(panels, config.consolidation_gap);
        let mut rects: Vec<SlabFootprint> = clusters
            .iter()
            .map(|members| union_rect(panels, members))
            .filter(|r| {
                let usable = r.x_max - r.x_min > 1e-9 && r.y_max - r.y_min > 1e-9;
                if !usable {
                    warnings.push(Warning::SlabFootprintUnreconstructable { z });
                }
                usable
            })
            .collect();
        if rects.is_empty() {
            continue;
        }
        rects.sort_by(|a, b| {
            a.x_min
                .partial_cmp(&b.x_min)
                .unwrap()
                .then(a.y_min.partial_cmp(&b.y_min).unwrap())
        });

        clusters_per_level.push((z, rects.len()));
        for rect in rects {
            edits.push(ObjectEdit::Add {
                kind: ElementKind::Slab,
                geometry_kind: GeometryKind::Brep,
                name: names.next_name(),
                vertices: vec![
                    Vertex::new(0, rect.x_min, rect.y_min, z),
                    Vertex::new(1, rect.x_max, rect.y_min, z),
                    Vertex::new(2, rect.x_max, rect.y_max, z),
                    Vertex::new(3, rect.x_min, rect.y_max, z),
                ],
                layer_hint: LayerHint::Default,
            });
        }
    }

    tracing::info!(added = edits.len(), "slab consolidation complete");
    Consolidation {
        edits,
        clusters_per_level,
        warnings,
    }
}

/// Single-linkage clustering of panel centroids: two panels connect when
/// their centroids are within the gap on both axes. Capped at three
/// clusters by merging the closest pair until the cap holds.
fn cluster_panels(panels: &[SlabFootprint], gap: f64) -> Vec<Vec<usize>> {
    let n = panels.len();
    let centroids: Vec<(f64, f64)> = panels.iter().map(|p| p.centroid()).collect();

    // Union-find over pairwise Chebyshev adjacency.
    let mut parent: Vec<usize> = (0..n).collect();
    fn find(parent: &mut [usize], mut i: usize) -> usize {
        while parent[i] != i {
            parent[i] = parent[parent[i]];
            i = parent[i];
        }
        i
    }
    for i in 0..n {
        for j in (i + 1)..n {
            let dx = (centroids[i].0 - centroids[j].0).abs();
            let dy = (centroids[i].1 - centroids[j].1).abs();
            if dx <= gap && dy <= gap {
                let (ri, rj) = (find(&mut parent, i), find(&mut parent, j));
                if ri != rj {
                    parent[ri] = rj;
                }
            }
        }
    }

    let mut by_root: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for i in 0..n {
        let root = find(&mut parent, i);
        by_root.entry(root).or_default().push(i);
    }
    let mut clusters: Vec<Vec<usize>> = by_root.into_values().collect();

    // More than three structural zones per floor is not a shape the design
    // set exhibits; fold the closest pair until the cap holds.
    while clusters.len() > 3 {
        let mut best = (0, 1);
        let mut best_dist = f64::INFINITY;
        for i in 0..clusters.len() {
            for j in (i + 1)..clusters.len() {
                let ci = mean_centroid(&centroids, &clusters[i]);
                let cj = mean_centroid(&centroids, &clusters[j]);
                let dist = (ci.0 - cj.0).hypot(ci.1 - cj.1);
                if dist < best_dist {
                    best_dist = dist;
                    best = (i, j);
                }
            }
        }
        let merged = clusters.remove(best.1);
        clusters[best.0].extend(merged);
    }
    clusters
}

fn mean_centroid(centroids: &[(f64, f64)], members: &[usize]) -> (f64, f64) {
    let n = members.len() as f64;
    let sx: f64 = members.iter().map(|&i| centroids[i].0).sum();
    let sy: f64 = members.iter().map(|&i| centroids[i].1).sum();
    (sx / n, sy / n)
}

fn union_rect(panels: &[SlabFootprint], members: &[usize]) -> SlabFootprint {
    let mut rect = panels[members[0]];
    for &i in &members[1..] {
        rect.x_min = rect.x_min.min(panels[i].x_min);
        rect.x_max = rect.x_max.max(panels[i].x_max);
        rect.y_min = rect.y_min.min(panels[i].y_min);
        rect.y_max = rect.y_max.max(panels[i].y_max);
    }
    rect
}
