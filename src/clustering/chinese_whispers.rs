use rand::prelude::SliceRandom;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rustc_hash::FxHashMap;

use crate::clustering::Assignment;
use crate::config::{DEFAULT_MAX_ITERATIONS, DEFAULT_MUTATION_PROB};
use crate::deadline::CancelToken;
use crate::edge_set::EdgeSet;
use crate::graph::{GraphError, SparseGraph};
use crate::types::{GraphEdge, VertexId, WeightedGraphEdge};

/// Chinese Whispers label propagation.
///
/// Every vertex starts in its own cluster and repeatedly adopts the label
/// held by the plurality of its neighborhood, visiting vertices in a freshly
/// randomized order each pass. The process stops after a full pass with no
/// label change, or after `max_iterations` passes. Ties between equally
/// strong labels resolve by uniform random choice, so two runs only produce
/// identical output when a seed is supplied.
#[derive(Debug, Clone)]
pub struct ChineseWhispers {
    max_iterations: usize,
    mutation_prob: f64,
    seed: Option<u64>,
}

impl ChineseWhispers {
    pub fn new() -> Self {
        ChineseWhispers {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            mutation_prob: DEFAULT_MUTATION_PROB,
            seed: None,
        }
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Probability that a vertex takes a uniformly random label instead of
    /// the plurality label, as an escape from local optima.
    pub fn with_mutation_prob(mut self, mutation_prob: f64) -> Self {
        self.mutation_prob = mutation_prob;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Clusters by neighbor-label counts, where a vertex's own current label
    /// contributes one extra vote.
    pub fn cluster<E, S>(&self, graph: &SparseGraph<E, S>) -> Result<Assignment, GraphError>
    where
        E: GraphEdge,
        S: EdgeSet<E>,
    {
        self.cluster_with_token(graph, &CancelToken::new())
    }

    pub fn cluster_with_token<E, S>(
        &self,
        graph: &SparseGraph<E, S>,
        token: &CancelToken,
    ) -> Result<Assignment, GraphError>
    where
        E: GraphEdge,
        S: EdgeSet<E>,
    {
        self.propagate(graph, token, plurality_label)
    }

    /// Clusters by summed edge weight per neighbor label. Unlike the
    /// unweighted form there is no extra self vote; a vertex's own label
    /// competes only through self loops.
    pub fn cluster_weighted<E, S>(&self, graph: &SparseGraph<E, S>) -> Result<Assignment, GraphError>
    where
        E: WeightedGraphEdge,
        S: EdgeSet<E>,
    {
        self.cluster_weighted_with_token(graph, &CancelToken::new())
    }

    pub fn cluster_weighted_with_token<E, S>(
        &self,
        graph: &SparseGraph<E, S>,
        token: &CancelToken,
    ) -> Result<Assignment, GraphError>
    where
        E: WeightedGraphEdge,
        S: EdgeSet<E>,
    {
        self.propagate(graph, token, weightiest_label)
    }

    fn propagate<E, S, F>(
        &self,
        graph: &SparseGraph<E, S>,
        token: &CancelToken,
        best_label: F,
    ) -> Result<Assignment, GraphError>
    where
        E: GraphEdge,
        S: EdgeSet<E>,
        F: Fn(&SparseGraph<E, S>, VertexId, &[u32], &mut StdRng) -> u32,
    {
        if !(0.0..=1.0).contains(&self.mutation_prob) {
            return Err(GraphError::InvalidArgument(format!(
                "mutation probability {} is outside [0, 1]",
                self.mutation_prob
            )));
        }
        validate_contiguous(graph)?;

        let order = graph.order();
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        // Every vertex begins with its own index as its label.
        let mut labels: Vec<u32> = (0..order as u32).collect();
        let all_vertices: Vec<VertexId> = (0..order as u32).collect();

        for _ in 0..self.max_iterations {
            token.check()?;
            let mut changes = false;

            // Randomize the visiting order anew for this pass.
            let mut vertices = all_vertices.clone();
            vertices.shuffle(&mut rng);

            for &vertex in &vertices {
                let new_label = if rng.gen::<f64>() < self.mutation_prob {
                    rng.gen_range(0..order as u32)
                } else {
                    best_label(graph, vertex, &labels, &mut rng)
                };
                if labels[vertex as usize] != new_label {
                    labels[vertex as usize] = new_label;
                    changes = true;
                }
            }

            if !changes {
                break;
            }
        }

        let mut assignment = Assignment::new();
        for (vertex, &label) in labels.iter().enumerate() {
            assignment.insert(label as usize, vertex as VertexId);
        }
        Ok(assignment)
    }
}

impl Default for ChineseWhispers {
    fn default() -> Self {
        Self::new()
    }
}

/// The label ids must form the dense range `0..order` so they can double as
/// array indices.
fn validate_contiguous<E, S>(graph: &SparseGraph<E, S>) -> Result<(), GraphError>
where
    E: GraphEdge,
    S: EdgeSet<E>,
{
    let order = graph.order();
    if order == 0 {
        return Ok(());
    }
    let first = graph.vertices().next();
    let last = graph.vertices().last();
    if first == Some(0) && last == Some(order as u32 - 1) {
        Ok(())
    } else {
        Err(GraphError::InvalidArgument(
            "vertex ids must be contiguous from zero".to_string(),
        ))
    }
}

fn plurality_label<E, S>(
    graph: &SparseGraph<E, S>,
    vertex: VertexId,
    labels: &[u32],
    rng: &mut StdRng,
) -> u32
where
    E: GraphEdge,
    S: EdgeSet<E>,
{
    let mut votes: FxHashMap<u32, usize> = FxHashMap::default();
    *votes.entry(labels[vertex as usize]).or_insert(0) += 1;
    for neighbor in graph.neighbors(vertex) {
        *votes.entry(labels[neighbor as usize]).or_insert(0) += 1;
    }

    let mut ties: Vec<u32> = Vec::new();
    let mut max = 0;
    for (&label, &count) in &votes {
        if count > max {
            ties.clear();
            max = count;
        }
        if count == max {
            ties.push(label);
        }
    }
    if ties.len() == 1 {
        ties[0]
    } else {
        ties[rng.gen_range(0..ties.len())]
    }
}

fn weightiest_label<E, S>(
    graph: &SparseGraph<E, S>,
    vertex: VertexId,
    labels: &[u32],
    rng: &mut StdRng,
) -> u32
where
    E: WeightedGraphEdge,
    S: EdgeSet<E>,
{
    let mut sums: FxHashMap<u32, f64> = FxHashMap::default();
    for edge in graph.incident_edges(vertex) {
        let neighbor = edge.other(vertex);
        *sums.entry(labels[neighbor as usize]).or_insert(0.0) += edge.weight();
    }
    // Isolated vertices have nothing to adopt and keep their label.
    if sums.is_empty() {
        return labels[vertex as usize];
    }

    let mut ties: Vec<u32> = Vec::new();
    let mut max = f64::NEG_INFINITY;
    for (&label, &sum) in &sums {
        if sum > max {
            ties.clear();
            max = sum;
        }
        if sum == max {
            ties.push(label);
        }
    }
    if ties.is_empty() {
        return labels[vertex as usize];
    }
    if ties.len() == 1 {
        ties[0]
    } else {
        ties[rng.gen_range(0..ties.len())]
    }
}
