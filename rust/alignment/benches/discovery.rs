// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Benchmarks discovery and snap on a synthetic model of roughly the
//! reference building's size (~20 k vertices).

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use structalign_alignment::{align_model, discover_axis_lines};
use structalign_core::{
    Element, ElementId, ElementKind, GeometryKind, Model, PipelineConfig, Vertex,
};

fn synthetic_model() -> Model {
    let config = PipelineConfig::default();
    let floors = config.floor_ladder.levels().to_vec();
    let mut elements = Vec::new();
    let mut id = 1u64;
    for i in 0..40 {
        for j in 0..25 {
            let x = -75.0 + i as f64 * 1.85;
            let y = j as f64 * 2.4;
            // Millimeter jitter, deterministic per cell.
            let jitter = ((i * 31 + j * 17) % 7) as f64 * 0.001 - 0.003;
            let vertices = floors
                .iter()
                .enumerate()
                .map(|(k, &z)| Vertex::new(k as u32, x + jitter, y - jitter, z))
                .collect();
            elements.push(Element {
                id: ElementId(id),
                name: format!("Column_{id}"),
                kind: ElementKind::Column,
                geometry_kind: GeometryKind::Brep,
                face_count: None,
                layer: None,
                vertices,
            });
            id += 1;
        }
    }
    Model::new(elements)
}

fn bench_pipeline_core(c: &mut Criterion) {
    let model = synthetic_model();
    let config = PipelineConfig::default();

    c.bench_function("discover_axis_lines", |b| {
        b.iter(|| discover_axis_lines(black_box(&model), &config, None).unwrap())
    });

    let outcome = discover_axis_lines(&model, &config, None).unwrap();
    c.bench_function("align_model", |b| {
        b.iter(|| align_model(black_box(&model), &outcome.x, &outcome.y, &config))
    });
}

criterion_group!(benches, bench_pipeline_core);
criterion_main!(benches);
