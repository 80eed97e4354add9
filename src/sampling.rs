use std::collections::VecDeque;

use fixedbitset::FixedBitSet;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::edge_set::EdgeSet;
use crate::graph::{GraphError, SparseGraph};
use crate::types::{GraphEdge, IntSet, VertexId};
use crate::util::{probabilistic_round, random_subset_mask};

/// Randomized subgraph enumeration (RAND-ESU) after Wernicke (2006),
/// yielding an unbiased sample of the connected size-k subgraphs of a
/// backing graph.
///
/// Each entry of `probabilities` gives the chance that a partial subgraph
/// with that many vertices is expanded by one more vertex, so the product of
/// the entries is the expected fraction of subgraphs sampled. With every
/// probability at 1.0 the iterator enumerates each connected size-k
/// subgraph exactly once.
///
/// Subgraphs are queued lazily one start vertex at a time, so construction
/// stays cheap on large graphs. The iterator borrows the backing graph and
/// reflects its state at the time each batch is expanded.
pub struct SamplingSubgraphIterator<'g, E, S>
where
    E: GraphEdge,
    S: EdgeSet<E>,
{
    graph: &'g SparseGraph<E, S>,
    subgraph_size: usize,
    probabilities: Vec<f64>,
    starts: std::vec::IntoIter<VertexId>,
    queued: VecDeque<SparseGraph<E, S>>,
    rng: StdRng,
}

impl<'g, E, S> SamplingSubgraphIterator<'g, E, S>
where
    E: GraphEdge,
    S: EdgeSet<E>,
{
    /// Builds a sampling iterator over the connected subgraphs with
    /// `subgraph_size` vertices. `probabilities` must hold one expansion
    /// probability per subgraph size, each in (0, 1].
    pub fn new(
        graph: &'g SparseGraph<E, S>,
        subgraph_size: usize,
        probabilities: Vec<f64>,
    ) -> Result<Self, GraphError> {
        if subgraph_size < 1 || subgraph_size > graph.order() {
            return Err(GraphError::InvalidArgument(format!(
                "subgraph size {} is outside [1, {}]",
                subgraph_size,
                graph.order()
            )));
        }
        if probabilities.len() != subgraph_size {
            return Err(GraphError::InvalidArgument(format!(
                "need one traversal probability per subgraph size, got {} for size {}",
                probabilities.len(),
                subgraph_size
            )));
        }
        for (depth, &probability) in probabilities.iter().enumerate() {
            if probability <= 0.0 || probability > 1.0 {
                return Err(GraphError::InvalidArgument(format!(
                    "invalid traversal probability {} at depth {}; must be in (0, 1]",
                    probability, depth
                )));
            }
        }
        let starts: Vec<VertexId> = graph.vertices().collect();
        let mut iter = SamplingSubgraphIterator {
            graph,
            subgraph_size,
            probabilities,
            starts: starts.into_iter(),
            queued: VecDeque::new(),
            rng: StdRng::from_entropy(),
        };
        iter.advance();
        Ok(iter)
    }

    /// Builds an iterator that enumerates every connected size-k subgraph
    /// exactly once.
    pub fn exhaustive(
        graph: &'g SparseGraph<E, S>,
        subgraph_size: usize,
    ) -> Result<Self, GraphError> {
        Self::new(graph, subgraph_size, vec![1.0; subgraph_size])
    }

    // Expands start vertices in ascending order until the queue holds a
    // batch of subgraphs or the graph is exhausted.
    fn advance(&mut self) {
        while self.queued.is_empty() {
            let start = match self.starts.next() {
                Some(vertex) => vertex,
                None => return,
            };
            let extension: VecDeque<VertexId> =
                self.graph.neighbors(start).filter(|&n| n > start).collect();
            let mut subgraph = IntSet::default();
            subgraph.insert(start);
            self.extend_subgraph(subgraph, extension, start);
        }
    }

    fn extend_subgraph(
        &mut self,
        subgraph: IntSet,
        extension: VecDeque<VertexId>,
        start: VertexId,
    ) {
        let graph = self.graph;
        if subgraph.len() == self.subgraph_size {
            self.queued.push_back(graph.induced_copy(&subgraph));
            return;
        }

        // Decide up front which children of this search node get explored.
        // The depth index is the current subgraph size, so entry 0 is only
        // consulted through validation.
        let probability = self.probabilities[subgraph.len()];
        let num_children = extension.len();
        let mask = if probability == 1.0 {
            let mut all = FixedBitSet::with_capacity(num_children);
            all.set_range(.., true);
            all
        } else if num_children == 0 {
            FixedBitSet::with_capacity(0)
        } else {
            let count = probabilistic_round(num_children as f64 * probability, &mut self.rng);
            random_subset_mask(count, num_children, &mut self.rng)
        };

        let mut remaining = extension;
        let mut child = 0;
        while let Some(w) = remaining.pop_front() {
            let explore = mask.contains(child);
            child += 1;
            if !explore {
                continue;
            }

            // The next extension keeps the siblings not yet drained and adds
            // the exclusive neighborhood of w: vertices above the start that
            // no current subgraph vertex can reach. Everything already in
            // the extension is adjacent to the subgraph, so the exclusive
            // test never re-adds a sibling.
            let mut next_extension = remaining.clone();
            'candidate: for n in graph.neighbors(w) {
                if n > start && !subgraph.contains(&n) {
                    for &member in &subgraph {
                        if graph.connected(member, n) {
                            continue 'candidate;
                        }
                    }
                    next_extension.push_back(n);
                }
            }
            let mut next_subgraph = subgraph.clone();
            next_subgraph.insert(w);
            self.extend_subgraph(next_subgraph, next_extension, start);
        }
    }
}

impl<'g, E, S> Iterator for SamplingSubgraphIterator<'g, E, S>
where
    E: GraphEdge,
    S: EdgeSet<E>,
{
    type Item = SparseGraph<E, S>;

    fn next(&mut self) -> Option<Self::Item> {
        let item = self.queued.pop_front()?;
        if self.queued.is_empty() {
            self.advance();
        }
        Some(item)
    }
}

#[cfg(test)]
mod test_sampling {
    use crate::graph::SparseUndirectedGraph;
    use crate::sampling::SamplingSubgraphIterator;
    use crate::types::SimpleEdge;

    fn cycle(n: u32) -> SparseUndirectedGraph {
        SparseUndirectedGraph::from_edges((0..n).map(|i| SimpleEdge::new(i, (i + 1) % n)))
    }

    #[test]
    fn test_exhaustive_cycle() {
        let g = cycle(5);
        let subgraphs: Vec<_> = SamplingSubgraphIterator::exhaustive(&g, 3)
            .unwrap()
            .collect();
        // The connected 3-vertex subgraphs of a 5-cycle are its 5 paths.
        assert_eq!(subgraphs.len(), 5);
        for sub in &subgraphs {
            assert_eq!(sub.order(), 3);
            assert_eq!(sub.size(), 2);
        }
    }

    #[test]
    fn test_exhaustive_complete_graph() {
        let g = SparseUndirectedGraph::from_edges([
            SimpleEdge::new(0, 1),
            SimpleEdge::new(0, 2),
            SimpleEdge::new(0, 3),
            SimpleEdge::new(1, 2),
            SimpleEdge::new(1, 3),
            SimpleEdge::new(2, 3),
        ]);
        let subgraphs: Vec<_> = SamplingSubgraphIterator::exhaustive(&g, 3)
            .unwrap()
            .collect();
        assert_eq!(subgraphs.len(), 4);
        for sub in &subgraphs {
            assert_eq!(sub.order(), 3);
            assert_eq!(sub.size(), 3);
        }
    }

    #[test]
    fn test_single_vertex_subgraphs() {
        let g = cycle(3);
        let subgraphs: Vec<_> = SamplingSubgraphIterator::exhaustive(&g, 1)
            .unwrap()
            .collect();
        assert_eq!(subgraphs.len(), 3);
        for sub in &subgraphs {
            assert_eq!(sub.order(), 1);
            assert_eq!(sub.size(), 0);
        }
    }

    #[test]
    fn test_sampled_subset_of_exhaustive() {
        let g = cycle(5);
        let sampled: Vec<_> = SamplingSubgraphIterator::new(&g, 3, vec![1.0, 1.0, 0.5])
            .unwrap()
            .collect();
        assert!(sampled.len() <= 5);
        for sub in &sampled {
            assert_eq!(sub.order(), 3);
            assert_eq!(sub.size(), 2);
        }
    }

    #[test]
    fn test_rejects_bad_arguments() {
        let g = cycle(4);
        assert!(SamplingSubgraphIterator::exhaustive(&g, 0).is_err());
        assert!(SamplingSubgraphIterator::exhaustive(&g, 5).is_err());
        assert!(SamplingSubgraphIterator::new(&g, 3, vec![1.0, 1.0]).is_err());
        assert!(SamplingSubgraphIterator::new(&g, 2, vec![1.0, 0.0]).is_err());
        assert!(SamplingSubgraphIterator::new(&g, 2, vec![1.0, 1.5]).is_err());
    }
}
