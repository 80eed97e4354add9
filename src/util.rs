use fixedbitset::FixedBitSet;
use rand::Rng;

use crate::edge_set::EdgeSet;
use crate::graph::{GraphError, SparseGraph};
use crate::multigraph::UndirectedMultigraph;
use crate::types::{GraphEdge, SimpleTypedEdge, TypedGraphEdge};

/// Rounds `expected` to one of its two surrounding integers, choosing the
/// upper one with probability equal to the fractional part.
pub fn probabilistic_round(expected: f64, rng: &mut impl Rng) -> usize {
    let floor = expected.floor();
    if rng.gen::<f64>() <= expected - floor {
        expected.ceil() as usize
    } else {
        floor as usize
    }
}

/// A bit mask over `total` slots with exactly `count` of them set, chosen
/// uniformly. All slots are set when `count >= total`.
pub fn random_subset_mask(count: usize, total: usize, rng: &mut impl Rng) -> FixedBitSet {
    let mut mask = FixedBitSet::with_capacity(total);
    if count >= total {
        mask.set_range(.., true);
        return mask;
    }
    let mut chosen = 0;
    while chosen < count {
        let slot = rng.gen_range(0..total);
        if !mask.contains(slot) {
            mask.put(slot);
            chosen += 1;
        }
    }
    mask
}

/// Rewires edges at random while preserving every vertex's degree, making
/// `shuffles_per_edge` swap attempts per edge. An attempt fails when a
/// rewired pair is already connected or the swap would create a self loop.
/// Returns the number of successful swaps.
pub fn shuffle_preserving_degrees<E, S>(
    graph: &mut SparseGraph<E, S>,
    shuffles_per_edge: usize,
) -> Result<usize, GraphError>
where
    E: GraphEdge,
    S: EdgeSet<E>,
{
    if shuffles_per_edge < 1 {
        return Err(GraphError::InvalidArgument(
            "must attempt at least one shuffle per edge".to_string(),
        ));
    }
    let mut edge_array: Vec<E> = graph.edges().collect();
    let original_size = graph.size();
    let mut rng = rand::thread_rng();
    let mut total_shuffles = 0;

    let num_edges = edge_array.len();
    if num_edges < 2 {
        return Ok(0);
    }
    for i in 0..num_edges {
        for _ in 0..shuffles_per_edge {
            let mut j = i;
            while j == i {
                j = rng.gen_range(0..num_edges);
            }
            let mut e1 = edge_array[i].clone();
            let mut e2 = edge_array[j].clone();

            // Undirected edges are flipped half the time, otherwise vertices
            // stored only on one side would never trade that side.
            if !E::DIRECTED && rng.gen::<f64>() < 0.5 {
                e1 = e1.flipped();
            }
            if !E::DIRECTED && rng.gen::<f64>() < 0.5 {
                e2 = e2.flipped();
            }
            let swapped1 = e1.with_endpoints(e1.from(), e2.to());
            let swapped2 = e2.with_endpoints(e2.from(), e1.to());

            // Any edge already on the target pair blocks the swap, whatever
            // weight it carries; for directed edges only the same-orientation
            // arc blocks.
            let occupied = |e: &E| {
                graph
                    .edges_between(e.from(), e.to())
                    .iter()
                    .any(|held| !E::DIRECTED || held.from() == e.from())
            };
            if occupied(&swapped1) || occupied(&swapped2) {
                continue;
            }
            if swapped1.is_self_loop() || swapped2.is_self_loop() {
                continue;
            }
            total_shuffles += 1;

            graph.remove_edge(&edge_array[i]);
            graph.remove_edge(&edge_array[j]);
            graph.add_edge(swapped1.clone());
            graph.add_edge(swapped2.clone());

            edge_array[i] = swapped1;
            edge_array[j] = swapped2;
            debug_assert_eq!(graph.size(), original_size, "shuffle changed the edge count");
        }
    }
    Ok(total_shuffles)
}

/// Degree-preserving rewiring for a multigraph, swapping edges only within
/// the same type so per-type degree sequences survive too.
pub fn shuffle_preserving_types<T>(
    graph: &mut UndirectedMultigraph<T>,
    shuffles_per_edge: usize,
) -> Result<usize, GraphError>
where
    T: Clone + Eq + std::hash::Hash,
{
    if shuffles_per_edge < 1 {
        return Err(GraphError::InvalidArgument(
            "must attempt at least one shuffle per edge".to_string(),
        ));
    }
    let original_order = graph.order();
    let original_size = graph.size();
    let mut rng = rand::thread_rng();
    let mut total_shuffles = 0;

    let types: Vec<T> = graph.edge_types().cloned().collect();
    for edge_type in types {
        let mut edge_array: Vec<SimpleTypedEdge<T>> =
            graph.edges_with_type(&edge_type).collect();
        let num_edges = edge_array.len();
        if num_edges < 2 {
            continue;
        }
        for i in 0..num_edges {
            for _ in 0..shuffles_per_edge {
                let mut j = i;
                while j == i {
                    j = rng.gen_range(0..num_edges);
                }
                let mut e1 = edge_array[i].clone();
                let mut e2 = edge_array[j].clone();
                if rng.gen::<f64>() < 0.5 {
                    e1 = e1.flipped();
                }
                if rng.gen::<f64>() < 0.5 {
                    e2 = e2.flipped();
                }
                let swapped1 = e1.with_endpoints(e1.from(), e2.to());
                let swapped2 = e2.with_endpoints(e2.from(), e1.to());

                if graph.contains_edge(&swapped1) || graph.contains_edge(&swapped2) {
                    continue;
                }
                if swapped1.is_self_loop() || swapped2.is_self_loop() {
                    continue;
                }
                total_shuffles += 1;

                graph.remove_edge(&edge_array[i]);
                graph.remove_edge(&edge_array[j]);
                graph.add_edge(swapped1.clone());
                graph.add_edge(swapped2.clone());

                edge_array[i] = swapped1;
                edge_array[j] = swapped2;
            }
        }
    }
    debug_assert_eq!(graph.order(), original_order, "shuffle changed the vertex count");
    debug_assert_eq!(graph.size(), original_size, "shuffle changed the edge count");
    Ok(total_shuffles)
}

/// Renders the graph as a 0/1 adjacency matrix, one row per vertex in
/// ascending order.
pub fn adjacency_matrix_string<E, S>(graph: &SparseGraph<E, S>) -> String
where
    E: GraphEdge,
    S: EdgeSet<E>,
{
    let mut out = String::with_capacity(graph.order() * (graph.order() + 1));
    for from in graph.vertices() {
        for to in graph.vertices() {
            out.push(if graph.connected(from, to) { '1' } else { '0' });
        }
        out.push('\n');
    }
    out
}
