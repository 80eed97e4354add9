use std::sync::Arc;

use dashmap::DashMap;
use itertools::Itertools;
use log::{debug, info};
use parking_lot::Mutex;
use rayon::prelude::*;
use rustc_hash::FxHashMap;

use crate::clustering::Assignment;
use crate::config::MERGE_LOG_INTERVAL;
use crate::deadline::CancelToken;
use crate::edge_set::EdgeSet;
use crate::graph::{GraphError, SparseGraph};
use crate::types::{GraphEdge, IntSet, SimpleEdge, VertexId, WeightedGraphEdge};

/// Pairwise similarity of two edges meeting at a keystone vertex, computed
/// from the two endpoints the edges do not share (the impost vertices).
/// Implementations are shared across the worker pool during the similarity
/// phase.
trait EdgeSimilarity<E, S>: Sync
where
    E: GraphEdge,
    S: EdgeSet<E>,
{
    fn similarity(
        &self,
        graph: &SparseGraph<E, S>,
        keystone: VertexId,
        impost1: VertexId,
        impost2: VertexId,
    ) -> f64;
}

/// Jaccard index over the closed neighborhoods of the impost vertices: each
/// impost's membership in the other's neighborhood counts toward the
/// intersection, and the keystone is present on both sides.
struct JaccardSimilarity;

impl<E, S> EdgeSimilarity<E, S> for JaccardSimilarity
where
    E: GraphEdge,
    S: EdgeSet<E>,
{
    fn similarity(
        &self,
        graph: &SparseGraph<E, S>,
        _keystone: VertexId,
        impost1: VertexId,
        impost2: VertexId,
    ) -> f64 {
        let n1: IntSet = graph.neighbors(impost1).collect();
        let n2: IntSet = graph.neighbors(impost2).collect();
        let n1_size = n1.len();
        let n2_size = n2.len();

        // Scan the smaller neighborhood when intersecting.
        let (small, large) = if n1_size > n2_size { (&n2, &n1) } else { (&n1, &n2) };
        let mut in_common = small.iter().filter(|v| large.contains(v)).count();
        if n2.contains(&impost1) {
            in_common += 1;
        }
        if n1.contains(&impost2) {
            in_common += 1;
        }
        in_common as f64 / (n1_size + n2_size + 2 - in_common) as f64
    }
}

/// Tanimoto coefficient over the imposts' degree-normalized weight vectors.
/// A vertex's vector holds `weight/degree` per neighbor plus `1/degree` for
/// the vertex itself, standing in for the keystone contribution of the
/// unweighted metric. Vectors are cached for the lifetime of one clustering
/// run.
struct TanimotoSimilarity {
    weight_vectors: DashMap<VertexId, Arc<Vec<(VertexId, f64)>>>,
}

impl TanimotoSimilarity {
    fn new() -> Self {
        TanimotoSimilarity {
            weight_vectors: DashMap::new(),
        }
    }

    fn weight_vector<E, S>(
        &self,
        graph: &SparseGraph<E, S>,
        vertex: VertexId,
    ) -> Arc<Vec<(VertexId, f64)>>
    where
        E: WeightedGraphEdge,
        S: EdgeSet<E>,
    {
        if let Some(cached) = self.weight_vectors.get(&vertex) {
            return cached.clone();
        }
        let mut entries: Vec<(VertexId, f64)> = Vec::new();
        let degree = graph.degree(vertex);
        if degree > 0 {
            let normalizer = 1.0 / degree as f64;
            for edge in graph.incident_edges(vertex) {
                entries.push((edge.other(vertex), normalizer * edge.weight()));
            }
            entries.push((vertex, normalizer));
            entries.sort_unstable_by_key(|&(v, _)| v);
        }
        let vector = Arc::new(entries);
        self.weight_vectors
            .entry(vertex)
            .or_insert_with(|| vector.clone());
        vector
    }
}

impl<E, S> EdgeSimilarity<E, S> for TanimotoSimilarity
where
    E: WeightedGraphEdge,
    S: EdgeSet<E>,
{
    fn similarity(
        &self,
        graph: &SparseGraph<E, S>,
        _keystone: VertexId,
        impost1: VertexId,
        impost2: VertexId,
    ) -> f64 {
        tanimoto(
            &self.weight_vector(graph, impost1),
            &self.weight_vector(graph, impost2),
        )
    }
}

// Sparse vectors sorted by index.
fn tanimoto(a: &[(VertexId, f64)], b: &[(VertexId, f64)]) -> f64 {
    let mut dot = 0.0;
    let mut i = 0;
    let mut j = 0;
    while i < a.len() && j < b.len() {
        match a[i].0.cmp(&b[j].0) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                dot += a[i].1 * b[j].1;
                i += 1;
                j += 1;
            }
        }
    }
    let norm_a: f64 = a.iter().map(|&(_, w)| w * w).sum();
    let norm_b: f64 = b.iter().map(|&(_, w)| w * w).sum();
    let denominator = norm_a + norm_b - dot;
    if denominator == 0.0 {
        0.0
    } else {
        dot / denominator
    }
}

enum MergeGoal {
    /// Merge all the way down, returning the step with the highest partition
    /// density.
    Densest,
    /// Stop once this many edge clusters remain, no density tracking.
    ClusterCount(usize),
}

/// Density contribution of one cluster with `num_nodes` vertices spanned by
/// `num_edges` edges. Defined as 0 for clusters too small to have internal
/// structure.
fn partition_density(num_nodes: usize, num_edges: usize) -> f64 {
    if num_nodes <= 2 {
        return 0.0;
    }
    let m = num_edges as f64;
    let n = num_nodes as f64;
    m * (m - n + 1.0) / ((n - 1.0) * (n - 2.0))
}

fn edge_pair_similarity<E, S, M>(
    graph: &SparseGraph<E, S>,
    metric: &M,
    e1: &SimpleEdge,
    e2: &SimpleEdge,
) -> f64
where
    E: GraphEdge,
    S: EdgeSet<E>,
    M: EdgeSimilarity<E, S>,
{
    if e1.to() == e2.to() {
        metric.similarity(graph, e1.to(), e1.from(), e2.from())
    } else if e1.to() == e2.from() {
        metric.similarity(graph, e1.to(), e1.from(), e2.to())
    } else if e1.from() == e2.to() {
        metric.similarity(graph, e1.from(), e1.to(), e2.from())
    } else if e1.from() == e2.from() {
        metric.similarity(graph, e1.from(), e1.to(), e2.to())
    } else {
        0.0
    }
}

/// Single-linkage agglomerative clustering over a graph's edges via a
/// next-best-merge array, O(E²) time and O(E) space.
fn single_link<E, S, M>(
    graph: &SparseGraph<E, S>,
    metric: &M,
    goal: MergeGoal,
    token: &CancelToken,
) -> Result<Assignment, GraphError>
where
    E: GraphEdge + Sync,
    S: EdgeSet<E> + Sync,
    M: EdgeSimilarity<E, S>,
{
    // Index every edge by plain endpoint identity, dropping weights and
    // types, so parallel or typed duplicates collapse onto one id.
    let mut edge_list: Vec<SimpleEdge> = Vec::new();
    let mut edge_ids: FxHashMap<SimpleEdge, usize> = FxHashMap::default();
    for edge in graph.edges() {
        let plain = SimpleEdge::new(edge.from(), edge.to());
        if !edge_ids.contains_key(&plain) {
            edge_ids.insert(plain.clone(), edge_list.len());
            edge_list.push(plain);
        }
    }
    let num_edges = edge_list.len();

    let target = match goal {
        MergeGoal::Densest => {
            if num_edges == 0 {
                return Ok(Assignment::new());
            }
            if num_edges == 1 {
                let mut degenerate = Assignment::new();
                degenerate.insert(0, edge_list[0].from());
                degenerate.insert(0, edge_list[0].to());
                return Ok(degenerate);
            }
            1
        }
        MergeGoal::ClusterCount(count) => {
            if count < 1 || count > num_edges {
                return Err(GraphError::InvalidArgument(format!(
                    "cluster count {} is outside [1, {}]",
                    count, num_edges
                )));
            }
            count
        }
    };

    // Each edge starts as its own cluster holding its two endpoints.
    let mut edge_to_cluster: Vec<usize> = (0..num_edges).collect();
    let mut cluster_to_vertices: FxHashMap<usize, IntSet> = FxHashMap::default();
    for (id, edge) in edge_list.iter().enumerate() {
        let members = cluster_to_vertices.entry(id).or_default();
        members.insert(edge.from());
        members.insert(edge.to());
    }
    let mut cluster_edge_counts: Vec<usize> = vec![1; num_edges];

    debug!("computing edge similarities for {} edges", num_edges);

    // For every vertex, compare all pairs of its incident edges and retain
    // each edge's single most similar partner. An edge is reached from both
    // of its endpoints, so the compare-and-update goes through that edge's
    // own lock.
    let slots: Vec<Mutex<(f64, usize)>> =
        (0..num_edges).map(|_| Mutex::new((0.0, 0))).collect();
    let vertices: Vec<VertexId> = graph.vertices().collect();
    vertices
        .par_iter()
        .try_for_each(|&keystone| -> Result<(), GraphError> {
            token.check()?;
            let neighbors: Vec<VertexId> = graph.neighbors(keystone).collect();
            for (&impost1, &impost2) in neighbors.iter().tuple_combinations() {
                let sim = metric.similarity(graph, keystone, impost1, impost2);
                let e1 = match edge_ids.get(&SimpleEdge::new(keystone, impost1)) {
                    Some(&id) => id,
                    None => continue,
                };
                let e2 = match edge_ids.get(&SimpleEdge::new(keystone, impost2)) {
                    Some(&id) => id,
                    None => continue,
                };
                {
                    let mut best = slots[e1].lock();
                    if sim > best.0 {
                        *best = (sim, e2);
                    }
                }
                {
                    let mut best = slots[e2].lock();
                    if sim > best.0 {
                        *best = (sim, e1);
                    }
                }
            }
            Ok(())
        })?;

    let mut best_match: Vec<(f64, usize)> =
        slots.into_iter().map(|slot| slot.into_inner()).collect();

    debug!("clustering {} edges", num_edges);

    let track_density = matches!(goal, MergeGoal::Densest);
    let mut densest_solution: Option<FxHashMap<usize, IntSet>> = None;
    let mut highest_density = f64::NEG_INFINITY;
    let mut best_step = 0;
    let mut merge_iter = 0usize;

    while cluster_to_vertices.len() > target {
        token.check()?;

        // The globally best cross-cluster candidate in the next-best-merge
        // array. Exact ties resolve to the first slot scanned.
        let mut selected: Option<(usize, usize)> = None;
        let mut highest_sim = -1.0;
        for i in 0..num_edges {
            let (sim, partner) = best_match[i];
            if sim > highest_sim && edge_to_cluster[i] != edge_to_cluster[partner] {
                highest_sim = sim;
                selected = Some((i, partner));
            }
        }

        let (cluster1, cluster2) = match selected {
            Some((e1, e2)) => (edge_to_cluster[e1], edge_to_cluster[e2]),
            None => {
                // Disconnected remainder: no similarity will ever link these
                // clusters, so merge an arbitrary pair to guarantee progress.
                info!("no cross-cluster similarity left; merging arbitrary clusters");
                let mut ids = cluster_to_vertices.keys().copied();
                match (ids.next(), ids.next()) {
                    (Some(c1), Some(c2)) => (c1, c2),
                    _ => break,
                }
            }
        };

        merge_iter += 1;
        if merge_iter % MERGE_LOG_INTERVAL == 0 {
            debug!("dendrogram merge {}/{}", merge_iter, num_edges - 1);
        }

        // Merge the smaller cluster's bookkeeping into the larger.
        let (winner, loser) = if cluster_edge_counts[cluster1] >= cluster_edge_counts[cluster2] {
            (cluster1, cluster2)
        } else {
            (cluster2, cluster1)
        };
        let moved = cluster_to_vertices.remove(&loser).unwrap_or_default();
        cluster_to_vertices
            .entry(winner)
            .or_default()
            .extend(moved.iter().copied());
        cluster_edge_counts[winner] += cluster_edge_counts[loser];
        for cluster in edge_to_cluster.iter_mut() {
            if *cluster == loser {
                *cluster = winner;
            }
        }

        if track_density {
            let mut density_sum = 0.0;
            for (id, members) in &cluster_to_vertices {
                density_sum += partition_density(members.len(), cluster_edge_counts[*id]);
            }
            let total_density = (2.0 / num_edges as f64) * density_sum;
            if total_density > highest_density {
                highest_density = total_density;
                best_step = merge_iter;
                densest_solution = Some(cluster_to_vertices.clone());
            }
        }

        if cluster_to_vertices.len() <= target {
            break;
        }

        // Point the merged cluster's slot at its best remaining partner; the
        // other edges' slots stay valid since their own best matches did not
        // change.
        if let Some((e1, e2)) = selected {
            best_match[e2].0 = -4.0;
            let edge1_rep = edge_list[e1].clone();
            let edge2_rep = edge_list[e2].clone();
            let mut refreshed: Option<(f64, usize)> = None;
            for i in 0..num_edges {
                if edge_to_cluster[i] == winner {
                    continue;
                }
                let candidate = &edge_list[i];
                let sim = edge_pair_similarity(graph, metric, &edge1_rep, candidate)
                    .max(edge_pair_similarity(graph, metric, &edge2_rep, candidate));
                match refreshed {
                    Some((best, _)) if sim <= best => {}
                    _ => refreshed = Some((sim, i)),
                }
            }
            best_match[e1] = refreshed.unwrap_or((-3.0, e1));
        }
    }

    let chosen = if track_density {
        debug!(
            "merge {} had the highest partition density {}",
            best_step, highest_density
        );
        match densest_solution {
            Some(solution) => solution,
            None => cluster_to_vertices,
        }
    } else {
        cluster_to_vertices
    };

    let mut assignment = Assignment::new();
    for (id, members) in chosen {
        assignment.insert_all(id, members);
    }
    Ok(assignment)
}

/// Link clustering after Ahn, Bagrow, and Lehmann (2010): clusters a graph's
/// edges rather than its vertices, then reads a vertex community off each
/// edge cluster. A vertex belongs to every community one of its edges
/// belongs to, so communities may overlap.
#[derive(Debug, Default)]
pub struct LinkClustering;

impl LinkClustering {
    pub fn new() -> Self {
        LinkClustering
    }

    /// Merges edges all the way down and returns the vertex communities of
    /// the merge step with the highest partition density.
    pub fn cluster<E, S>(&self, graph: &SparseGraph<E, S>) -> Result<Assignment, GraphError>
    where
        E: GraphEdge + Sync,
        S: EdgeSet<E> + Sync,
    {
        self.cluster_with_token(graph, &CancelToken::new())
    }

    pub fn cluster_with_token<E, S>(
        &self,
        graph: &SparseGraph<E, S>,
        token: &CancelToken,
    ) -> Result<Assignment, GraphError>
    where
        E: GraphEdge + Sync,
        S: EdgeSet<E> + Sync,
    {
        single_link(graph, &JaccardSimilarity, MergeGoal::Densest, token)
    }

    /// Stops merging once `num_clusters` edge clusters remain, returning
    /// that partition without any density tracking.
    pub fn cluster_bounded<E, S>(
        &self,
        graph: &SparseGraph<E, S>,
        num_clusters: usize,
    ) -> Result<Assignment, GraphError>
    where
        E: GraphEdge + Sync,
        S: EdgeSet<E> + Sync,
    {
        self.cluster_bounded_with_token(graph, num_clusters, &CancelToken::new())
    }

    pub fn cluster_bounded_with_token<E, S>(
        &self,
        graph: &SparseGraph<E, S>,
        num_clusters: usize,
        token: &CancelToken,
    ) -> Result<Assignment, GraphError>
    where
        E: GraphEdge + Sync,
        S: EdgeSet<E> + Sync,
    {
        single_link(
            graph,
            &JaccardSimilarity,
            MergeGoal::ClusterCount(num_clusters),
            token,
        )
    }
}

/// Link clustering scoring edge pairs by the Tanimoto coefficient of the
/// imposts' normalized weight vectors instead of the unweighted Jaccard
/// index.
#[derive(Debug, Default)]
pub struct WeightedLinkClustering;

impl WeightedLinkClustering {
    pub fn new() -> Self {
        WeightedLinkClustering
    }

    pub fn cluster<E, S>(&self, graph: &SparseGraph<E, S>) -> Result<Assignment, GraphError>
    where
        E: WeightedGraphEdge + Sync,
        S: EdgeSet<E> + Sync,
    {
        self.cluster_with_token(graph, &CancelToken::new())
    }

    pub fn cluster_with_token<E, S>(
        &self,
        graph: &SparseGraph<E, S>,
        token: &CancelToken,
    ) -> Result<Assignment, GraphError>
    where
        E: WeightedGraphEdge + Sync,
        S: EdgeSet<E> + Sync,
    {
        single_link(graph, &TanimotoSimilarity::new(), MergeGoal::Densest, token)
    }

    pub fn cluster_bounded<E, S>(
        &self,
        graph: &SparseGraph<E, S>,
        num_clusters: usize,
    ) -> Result<Assignment, GraphError>
    where
        E: WeightedGraphEdge + Sync,
        S: EdgeSet<E> + Sync,
    {
        self.cluster_bounded_with_token(graph, num_clusters, &CancelToken::new())
    }

    pub fn cluster_bounded_with_token<E, S>(
        &self,
        graph: &SparseGraph<E, S>,
        num_clusters: usize,
        token: &CancelToken,
    ) -> Result<Assignment, GraphError>
    where
        E: WeightedGraphEdge + Sync,
        S: EdgeSet<E> + Sync,
    {
        single_link(
            graph,
            &TanimotoSimilarity::new(),
            MergeGoal::ClusterCount(num_clusters),
            token,
        )
    }
}

#[cfg(test)]
mod test_link_clustering {
    use std::collections::BTreeSet;

    use crate::clustering::link_clustering::*;
    use crate::graph::{SparseUndirectedGraph, SparseWeightedGraph};
    use crate::types::{SimpleEdge, SimpleWeightedEdge};

    fn bowtie() -> SparseUndirectedGraph {
        // Two triangles sharing vertex 2.
        SparseUndirectedGraph::from_edges([
            SimpleEdge::new(0, 1),
            SimpleEdge::new(1, 2),
            SimpleEdge::new(2, 0),
            SimpleEdge::new(2, 3),
            SimpleEdge::new(3, 4),
            SimpleEdge::new(4, 2),
        ])
    }

    #[test]
    fn test_jaccard_values() {
        let path = SparseUndirectedGraph::from_edges([
            SimpleEdge::new(0, 1),
            SimpleEdge::new(1, 2),
        ]);
        // Imposts 0 and 2 share only the keystone.
        let sim = JaccardSimilarity.similarity(&path, 1, 0, 2);
        assert_eq!(sim, 1.0 / 3.0);

        let triangle = SparseUndirectedGraph::from_edges([
            SimpleEdge::new(0, 1),
            SimpleEdge::new(1, 2),
            SimpleEdge::new(2, 0),
        ]);
        // Mutually adjacent imposts with identical neighborhoods.
        let sim = JaccardSimilarity.similarity(&triangle, 2, 0, 1);
        assert_eq!(sim, 1.0);
    }

    #[test]
    fn test_bowtie_recovers_triangles() {
        let assignment = LinkClustering::new().cluster(&bowtie()).unwrap();
        assert_eq!(assignment.num_clusters(), 2);

        let mut communities = assignment.into_vertex_sets();
        communities.sort();
        assert_eq!(communities[0], [0, 1, 2].into_iter().collect());
        assert_eq!(communities[1], [2, 3, 4].into_iter().collect());
    }

    #[test]
    fn test_shared_vertex_overlaps() {
        let assignment = LinkClustering::new().cluster(&bowtie()).unwrap();
        assert_eq!(assignment.clusters_containing(2).count(), 2);
        assert_eq!(assignment.clusters_containing(0).count(), 1);
    }

    #[test]
    fn test_bounded_cluster_count() {
        let path = SparseUndirectedGraph::from_edges([
            SimpleEdge::new(0, 1),
            SimpleEdge::new(1, 2),
            SimpleEdge::new(2, 3),
        ]);
        let assignment = LinkClustering::new().cluster_bounded(&path, 2).unwrap();
        assert_eq!(assignment.num_clusters(), 2);

        assert!(LinkClustering::new().cluster_bounded(&path, 0).is_err());
        assert!(LinkClustering::new().cluster_bounded(&path, 4).is_err());
    }

    #[test]
    fn test_degenerate_inputs() {
        let empty = SparseUndirectedGraph::new();
        assert!(LinkClustering::new().cluster(&empty).unwrap().is_empty());

        let single = SparseUndirectedGraph::from_edges([SimpleEdge::new(0, 1)]);
        let assignment = LinkClustering::new().cluster(&single).unwrap();
        assert_eq!(assignment.num_clusters(), 1);
        assert_eq!(
            assignment.members(0).unwrap(),
            &[0, 1].into_iter().collect::<BTreeSet<u32>>()
        );
    }

    #[test]
    fn test_disconnected_components_terminate() {
        // Two triangles with no connection force the arbitrary-merge path
        // once each component has fully merged.
        let g = SparseUndirectedGraph::from_edges([
            SimpleEdge::new(0, 1),
            SimpleEdge::new(1, 2),
            SimpleEdge::new(2, 0),
            SimpleEdge::new(3, 4),
            SimpleEdge::new(4, 5),
            SimpleEdge::new(5, 3),
        ]);
        let assignment = LinkClustering::new().cluster(&g).unwrap();
        assert_eq!(assignment.num_clusters(), 2);
        let mut communities = assignment.into_vertex_sets();
        communities.sort();
        assert_eq!(communities[0], [0, 1, 2].into_iter().collect());
        assert_eq!(communities[1], [3, 4, 5].into_iter().collect());
    }

    #[test]
    fn test_weighted_bowtie_recovers_triangles() {
        let g = SparseWeightedGraph::from_edges([
            SimpleWeightedEdge::new(0, 1, 1.0),
            SimpleWeightedEdge::new(1, 2, 1.0),
            SimpleWeightedEdge::new(2, 0, 1.0),
            SimpleWeightedEdge::new(2, 3, 1.0),
            SimpleWeightedEdge::new(3, 4, 1.0),
            SimpleWeightedEdge::new(4, 2, 1.0),
        ]);
        let assignment = WeightedLinkClustering::new().cluster(&g).unwrap();
        assert_eq!(assignment.num_clusters(), 2);
        assert_eq!(assignment.clusters_containing(2).count(), 2);
    }

    #[test]
    fn test_cancelled_token_aborts() {
        let token = crate::deadline::CancelToken::new();
        token.cancel();
        let result = LinkClustering::new().cluster_with_token(&bowtie(), &token);
        assert!(matches!(result, Err(crate::graph::GraphError::Cancelled)));
    }
}
