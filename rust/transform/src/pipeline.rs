// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! End-to-end pipeline orchestration.
//!
//! Discovery, snap and validation first; then the object rules in their
//! semantic order (3, 4, 5, 6, 7, grid); finally materialization and the
//! report. Emissions keep a deterministic order: removals by element id
//! within their rule, synthetics by position then floor Z. A cooperative
//! cancel token is checked at every rule boundary.

use rustc_hash::FxHashMap;

use structalign_alignment::{
    align_model, axis_statistics, compare_with_reference, discover_axis_lines,
    validate_alignment, AlignmentOutcome, DisplacementPercentiles, ReferencePositions,
};
use structalign_core::{
    AlignedVertex, CancelToken, ElementId, Model, NameAllocator, ObjectEdit, PipelineConfig,
    Result, Warning,
};

use crate::centerlines::generate_centerlines;
use crate::grid::generate_grid;
use crate::materialize::apply_edits;
use crate::report::{ConsolidationLevel, PipelineReport, RuleCounts, UnalignedVertexRef};
use crate::slabs::{consolidate_slabs, remove_slabs, CONSOLIDATED_SLAB_PREFIX};
use crate::supports::place_supports;
use crate::walls::simplify_walls;

/// Everything a pipeline run produces.
#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    /// Aligned vertex stream, in input order.
    pub aligned: Vec<AlignedVertex>,
    /// Object edits, ordered by rule.
    pub edits: Vec<ObjectEdit>,
    /// The materialized output model.
    pub output: Model,
    pub report: PipelineReport,
}

/// Runs the complete pipeline over a materialized input model.
///
/// Fatal errors abort before materialization; the caller must not write any
/// output model in that case.
pub fn run_pipeline(
    model: &Model,
    config: &PipelineConfig,
    reference: Option<&Model>,
    cancel: &CancelToken,
) -> Result<PipelineOutcome> {
    model.validate_input()?;
    if let Some(reference) = reference {
        reference.validate_input()?;
    }

    let mut warnings: Vec<Warning> = Vec::new();

    // Reference axis positions come from running discovery on the
    // reference model itself.
    cancel.check()?;
    let reference_positions = match reference {
        Some(ref_model) => {
            let ref_discovery = discover_axis_lines(ref_model, config, None)?;
            Some(ReferencePositions::from_lines(
                &ref_discovery.x,
                &ref_discovery.y,
            ))
        }
        None => None,
    };

    tracing::info!(
        elements = model.elements.len(),
        vertices = model.vertex_count(),
        "pipeline start"
    );

    // Rule 1: axis discovery.
    cancel.check()?;
    let discovery = discover_axis_lines(model, config, reference_positions.as_ref())?;
    warnings.extend(discovery.warnings.iter().cloned());

    // Rule 2: per-element endpoint snap.
    cancel.check()?;
    let alignment: AlignmentOutcome = align_model(model, &discovery.x, &discovery.y, config);
    warnings.extend(alignment.warnings.iter().cloned());
    warnings.extend(validate_alignment(
        model,
        &alignment,
        &discovery.x,
        &discovery.y,
        config,
    )?);

    let aligned_by_element = index_by_element(&alignment.vertices);

    // Rule 3: slab removal.
    cancel.check()?;
    let slab_removal = remove_slabs(model, config);

    // Rule 4: slab consolidation.
    cancel.check()?;
    let mut slab_names = NameAllocator::scan(
        CONSOLIDATED_SLAB_PREFIX,
        model.elements.iter().map(|e| e.name.as_str()),
    );
    let consolidation = consolidate_slabs(&slab_removal, config, &mut slab_names);
    warnings.extend(consolidation.warnings.iter().cloned());

    // Rule 5: wall simplification.
    cancel.check()?;
    let wall_simplification = simplify_walls(model, &aligned_by_element, config);

    // Rule 6: support placement.
    cancel.check()?;
    let mut support_names =
        NameAllocator::scan("Support_", model.elements.iter().map(|e| e.name.as_str()));
    let supports = place_supports(
        model,
        &aligned_by_element,
        &discovery.x,
        &discovery.y,
        config,
        &mut support_names,
    );
    warnings.extend(supports.warnings.iter().cloned());

    // Rule 7: centerline emission.
    cancel.check()?;
    let mut centerline_names = NameAllocator::scan(
        "Centerline_",
        model.elements.iter().map(|e| e.name.as_str()),
    );
    let centerlines = generate_centerlines(&supports.point_positions, config, &mut centerline_names);

    // Grid curves.
    cancel.check()?;
    let grid = generate_grid(model, &discovery.x, &discovery.y, config);

    // Assemble edits in rule order.
    let mut edits = Vec::new();
    edits.extend(slab_removal.edits.iter().cloned());
    edits.extend(consolidation.edits.iter().cloned());
    edits.extend(wall_simplification.edits.iter().cloned());
    edits.extend(supports.edits.iter().cloned());
    edits.extend(centerlines.edits.iter().cloned());
    edits.extend(grid.edits.iter().cloned());

    cancel.check()?;
    let output = apply_edits(model, &alignment.vertices, &edits);

    let reference_comparison = reference.map(|ref_model| {
        let cmp = compare_with_reference(&output, ref_model, config.reference_match_tolerance);
        warnings.extend(cmp.warnings.iter().cloned());
        cmp
    });

    let report = build_report(
        model,
        &discovery,
        &alignment,
        &slab_removal,
        &consolidation,
        &wall_simplification,
        &supports,
        centerlines.added,
        grid.added,
        &output,
        reference_comparison,
        warnings,
    );

    tracing::info!(
        edits = edits.len(),
        final_elements = output.elements.len(),
        "pipeline complete"
    );

    Ok(PipelineOutcome {
        aligned: alignment.vertices,
        edits,
        output,
        report,
    })
}

/// Groups the aligned stream by element for the object rules.
fn index_by_element(aligned: &[AlignedVertex]) -> FxHashMap<ElementId, Vec<&AlignedVertex>> {
    let mut map: FxHashMap<ElementId, Vec<&AlignedVertex>> = FxHashMap::default();
    for v in aligned {
        map.entry(v.element_id).or_default().push(v);
    }
    map
}

#[allow(clippy::too_many_arguments)]
fn build_report(
    model: &Model,
    discovery: &structalign_alignment::DiscoveryOutcome,
    alignment: &AlignmentOutcome,
    slab_removal: &crate::slabs::SlabRemoval,
    consolidation: &crate::slabs::Consolidation,
    walls: &crate::walls::WallSimplification,
    supports: &crate::supports::SupportPlacement,
    centerlines_added: u32,
    grid_added: u32,
    output: &Model,
    reference: Option<structalign_alignment::ReferenceComparison>,
    warnings: Vec<Warning>,
) -> PipelineReport {
    let aligned_count = alignment.vertices.iter().filter(|v| v.is_aligned()).count();
    let total = alignment.vertices.len();

    let displacements: Vec<f64> = alignment.vertices.iter().map(|v| v.displacement).collect();

    let xs: Vec<f64> = model.all_vertices().map(|v| v.x).collect();
    let ys: Vec<f64> = model.all_vertices().map(|v| v.y).collect();
    let zs: Vec<f64> = model.all_vertices().map(|v| v.z).collect();

    PipelineReport {
        axis_lines_x: discovery.x.len(),
        axis_lines_y: discovery.y.len(),
        recall_x: discovery.recall_x,
        recall_y: discovery.recall_y,
        total_elements: model.elements.len(),
        total_vertices: total,
        aligned_vertices: aligned_count,
        alignment_rate: if total > 0 {
            aligned_count as f64 / total as f64
        } else {
            0.0
        },
        outlier_snaps: alignment.outlier_snaps,
        unsnapped_endpoints: alignment.unsnapped_endpoints,
        displacement: DisplacementPercentiles::from_displacements(&displacements),
        unaligned_vertices: alignment
            .vertices
            .iter()
            .filter(|v| !v.is_aligned())
            .map(|v| UnalignedVertexRef {
                element_id: v.element_id.0,
                vertex_index: v.vertex_index,
            })
            .collect(),
        rule_counts: RuleCounts {
            slabs_removed: slab_removal.removed,
            slabs_kept: slab_removal.kept,
            slabs_consolidated: consolidation.edits.len() as u32,
            walls_removed: walls.removed,
            wall_segments_added: walls.segments_added,
            supports_removed: supports.removed,
            point_supports_added: supports.points_added,
            line_supports_added: supports.lines_added,
            centerlines_added,
            grid_curves_added: grid_added,
        },
        consolidation_clusters: consolidation
            .clusters_per_level
            .iter()
            .map(|&(z, clusters)| ConsolidationLevel { z, clusters })
            .collect(),
        final_element_count: output.elements.len(),
        axis_statistics: vec![
            axis_statistics("X", &xs),
            axis_statistics("Y", &ys),
            axis_statistics("Z", &zs),
        ],
        reference,
        warnings: warnings.iter().map(|w| w.to_string()).collect(),
    }
}
