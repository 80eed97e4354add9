use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sparse_community::{ChineseWhispers, LinkClustering, SimpleEdge, SparseUndirectedGraph};

/// A planted-partition graph: `communities` cliques of `size` vertices each,
/// plus `noise_edges` random cross links. Vertex ids are contiguous.
fn planted_partition(
    communities: usize,
    size: usize,
    noise_edges: usize,
    seed: u64,
) -> SparseUndirectedGraph {
    let mut graph = SparseUndirectedGraph::new();
    for c in 0..communities {
        let base = (c * size) as u32;
        for i in 0..size as u32 {
            for j in (i + 1)..size as u32 {
                graph.add_edge(SimpleEdge::new(base + i, base + j));
            }
        }
    }
    let n = (communities * size) as u32;
    let mut rng = StdRng::seed_from_u64(seed);
    let mut added = 0;
    while added < noise_edges {
        let u = rng.gen_range(0..n);
        let v = rng.gen_range(0..n);
        if u != v && graph.add_edge(SimpleEdge::new(u, v)) {
            added += 1;
        }
    }
    graph
}

fn bench_chinese_whispers(c: &mut Criterion) {
    let mut group = c.benchmark_group("chinese_whispers");
    for (name, communities, size) in [("8x16", 8, 16), ("16x32", 16, 32)] {
        let graph = planted_partition(communities, size, communities * 4, 7);
        group.bench_with_input(BenchmarkId::from_parameter(name), &graph, |b, graph| {
            b.iter(|| {
                ChineseWhispers::new()
                    .with_seed(9)
                    .cluster(black_box(graph))
                    .unwrap()
            })
        });
    }
    group.finish();
}

fn bench_link_clustering(c: &mut Criterion) {
    let mut group = c.benchmark_group("link_clustering");
    for (name, communities, size) in [("4x6", 4, 6), ("6x8", 6, 8)] {
        let graph = planted_partition(communities, size, communities * 2, 11);
        group.bench_with_input(BenchmarkId::from_parameter(name), &graph, |b, graph| {
            b.iter(|| LinkClustering::new().cluster(black_box(graph)).unwrap())
        });
    }
    group.finish();
}

criterion_group!(benches, bench_chinese_whispers, bench_link_clustering);
criterion_main!(benches);
