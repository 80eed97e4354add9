use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::marker::PhantomData;

use slotmap::{DefaultKey, DenseSlotMap};
use thiserror::Error;

use crate::edge_set::{EdgeSet, SparseDirectedEdgeSet, SparseUndirectedEdgeSet, SparseWeightedDirectedEdgeSet, SparseWeightedEdgeSet};
use crate::types::{GraphEdge, IntSet, SimpleDirectedEdge, SimpleEdge, SimpleWeightedDirectedEdge, SimpleWeightedEdge, VertexId};

/// Errors surfaced by graph operations and the algorithms built on them.
#[derive(Debug, Error)]
pub enum GraphError {
    /// The input is malformed; nothing was mutated.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The operation is legal on a graph but disallowed through this view.
    #[error("unsupported operation: {0}")]
    UnsupportedOperation(String),

    /// An algorithm observed its cancellation flag mid-run.
    #[error("operation cancelled before completion")]
    Cancelled,
}

/// Handle to a live subgraph view registered on its backing graph.
///
/// The handle stays valid until `release_subgraph`; a released or foreign
/// handle makes every subgraph operation report an invalid argument.
pub type SubgraphId = DefaultKey;

#[derive(Debug, Clone)]
struct SubgraphState {
    /// Current member vertices. Pruned whenever the backing graph drops one.
    vertices: IntSet,
}

/// Mutable sparse graph: a vertex → edge-set map plus an incrementally
/// maintained edge count.
///
/// Every edge is stored in the sets of both its endpoints, so neighbor
/// queries are cheap from either side while `size` still counts each edge
/// once. All mutation funnels through `add_vertex`, `add_edge`,
/// `remove_vertex` and `remove_edge`; subgraph views delegate here and never
/// touch the storage directly.
///
/// Structural mutation is single-writer. Concurrent reads are fine while no
/// write is in flight; anything else needs external synchronization.
#[derive(Debug)]
pub struct SparseGraph<E: GraphEdge, S: EdgeSet<E>> {
    vertex_to_edges: BTreeMap<VertexId, S>,
    /// Edge count, kept in step with every add and remove.
    size: usize,
    subgraphs: DenseSlotMap<SubgraphId, SubgraphState>,
    _edge: PhantomData<E>,
}

pub type SparseUndirectedGraph = SparseGraph<SimpleEdge, SparseUndirectedEdgeSet>;
pub type SparseDirectedGraph = SparseGraph<SimpleDirectedEdge, SparseDirectedEdgeSet>;
pub type SparseWeightedGraph = SparseGraph<SimpleWeightedEdge, SparseWeightedEdgeSet>;
pub type SparseWeightedDirectedGraph =
    SparseGraph<SimpleWeightedDirectedEdge, SparseWeightedDirectedEdgeSet>;

impl<E: GraphEdge, S: EdgeSet<E>> SparseGraph<E, S> {
    pub fn new() -> Self {
        SparseGraph {
            vertex_to_edges: BTreeMap::new(),
            size: 0,
            subgraphs: DenseSlotMap::new(),
            _edge: PhantomData,
        }
    }

    /// A graph pre-seeded with the vertices `0..order`, no edges.
    pub fn with_order(order: u32) -> Self {
        let mut graph = Self::new();
        for v in 0..order {
            graph.add_vertex(v);
        }
        graph
    }

    pub fn from_edges(edges: impl IntoIterator<Item = E>) -> Self {
        let mut graph = Self::new();
        for edge in edges {
            graph.add_edge(edge);
        }
        graph
    }

    /// Number of vertices.
    pub fn order(&self) -> usize {
        self.vertex_to_edges.len()
    }

    /// Number of edges. O(1), never recomputed by scanning.
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.vertex_to_edges.is_empty()
    }

    pub fn contains_vertex(&self, vertex: VertexId) -> bool {
        self.vertex_to_edges.contains_key(&vertex)
    }

    /// Whether any edge joins the two vertices, in either direction.
    pub fn connected(&self, v1: VertexId, v2: VertexId) -> bool {
        self.vertex_to_edges
            .get(&v1)
            .map(|set| set.connects(v2))
            .unwrap_or(false)
    }

    pub fn contains_edge(&self, edge: &E) -> bool {
        self.vertex_to_edges
            .get(&edge.from())
            .map(|set| set.contains(edge))
            .unwrap_or(false)
    }

    /// Number of edges incident to the vertex, 0 when absent.
    pub fn degree(&self, vertex: VertexId) -> usize {
        self.vertex_to_edges
            .get(&vertex)
            .map(|set| set.len())
            .unwrap_or(0)
    }

    /// Vertex ids in ascending order.
    pub fn vertices(&self) -> impl Iterator<Item = VertexId> + '_ {
        self.vertex_to_edges.keys().copied()
    }

    /// Each logical edge exactly once, taken from the endpoint that owns it
    /// during global enumeration.
    pub fn edges(&self) -> impl Iterator<Item = E> + '_ {
        self.vertex_to_edges
            .values()
            .flat_map(|set| set.unique_edges())
    }

    pub fn neighbors(&self, vertex: VertexId) -> Box<dyn Iterator<Item = VertexId> + '_> {
        match self.vertex_to_edges.get(&vertex) {
            Some(set) => set.neighbors(),
            None => Box::new(std::iter::empty()),
        }
    }

    /// Read view of one vertex's adjacency, if the vertex exists.
    pub fn adjacency(&self, vertex: VertexId) -> Option<&S> {
        self.vertex_to_edges.get(&vertex)
    }

    pub fn incident_edges(&self, vertex: VertexId) -> Box<dyn Iterator<Item = E> + '_> {
        match self.vertex_to_edges.get(&vertex) {
            Some(set) => set.edges(),
            None => Box::new(std::iter::empty()),
        }
    }

    /// All edges between the pair, regardless of orientation.
    pub fn edges_between(&self, v1: VertexId, v2: VertexId) -> Vec<E> {
        self.vertex_to_edges
            .get(&v1)
            .map(|set| set.edges_to(v2))
            .unwrap_or_default()
    }

    pub fn add_vertex(&mut self, vertex: VertexId) -> bool {
        match self.vertex_to_edges.entry(vertex) {
            Entry::Vacant(slot) => {
                slot.insert(S::with_root(vertex));
                true
            }
            Entry::Occupied(_) => false,
        }
    }

    /// Adds the edge, creating missing endpoints on the fly. Returns whether
    /// a new connection appeared; a weight-only rewrite of an existing slot
    /// returns false but still reaches both endpoints' sets.
    pub fn add_edge(&mut self, edge: E) -> bool {
        self.add_vertex(edge.from());
        self.add_vertex(edge.to());
        let is_new = match self.vertex_to_edges.get_mut(&edge.from()) {
            Some(set) => set.add(edge.clone()),
            None => false,
        };
        if !edge.is_self_loop() {
            if let Some(set) = self.vertex_to_edges.get_mut(&edge.to()) {
                set.add(edge);
            }
        }
        if is_new {
            self.size += 1;
        }
        is_new
    }

    pub fn remove_edge(&mut self, edge: &E) -> bool {
        let removed = match self.vertex_to_edges.get_mut(&edge.from()) {
            Some(set) => set.remove(edge),
            None => false,
        };
        if removed {
            if !edge.is_self_loop() {
                let mirrored = match self.vertex_to_edges.get_mut(&edge.to()) {
                    Some(set) => set.remove(edge),
                    None => false,
                };
                debug_assert!(mirrored, "edge missing from its other endpoint");
            }
            self.size -= 1;
        }
        removed
    }

    /// Removes the vertex, every edge incident to it, and its membership in
    /// all live subgraph views.
    pub fn remove_vertex(&mut self, vertex: VertexId) -> bool {
        let removed_set = match self.vertex_to_edges.remove(&vertex) {
            Some(set) => set,
            None => return false,
        };
        for neighbor in removed_set.neighbors() {
            if neighbor == vertex {
                continue;
            }
            if let Some(set) = self.vertex_to_edges.get_mut(&neighbor) {
                set.disconnect(vertex);
            }
        }
        self.size -= removed_set.len();
        for state in self.subgraphs.values_mut() {
            state.vertices.remove(&vertex);
        }
        true
    }

    /// Drops every edge, keeping the vertices.
    pub fn clear_edges(&mut self) {
        for set in self.vertex_to_edges.values_mut() {
            set.clear();
        }
        self.size = 0;
    }

    pub fn clear(&mut self) {
        self.vertex_to_edges.clear();
        self.size = 0;
        for state in self.subgraphs.values_mut() {
            state.vertices.clear();
        }
    }

    /// Deep snapshot restricted to `vertices` and the edges with both
    /// endpoints inside it. The copy is fully independent of this graph.
    pub fn copy(&self, vertices: &IntSet) -> Result<Self, GraphError> {
        for &v in vertices {
            if !self.contains_vertex(v) {
                return Err(GraphError::InvalidArgument(format!(
                    "cannot copy: vertex {} is not in the graph",
                    v
                )));
            }
        }
        Ok(self.induced_copy(vertices))
    }

    // Snapshot without membership validation, for callers that expand the
    // vertex set from this graph's own adjacency.
    pub(crate) fn induced_copy(&self, vertices: &IntSet) -> Self {
        let mut copied = Self::new();
        for &v in vertices {
            copied.add_vertex(v);
        }
        for &v in vertices {
            if let Some(set) = self.vertex_to_edges.get(&v) {
                for edge in set.unique_edges() {
                    if vertices.contains(&edge.other(v)) {
                        copied.add_edge(edge);
                    }
                }
            }
        }
        copied
    }

    /// Registers a live view over `vertices`, all of which must already be
    /// present. The view reads through to this graph until released.
    pub fn subgraph(&mut self, vertices: IntSet) -> Result<SubgraphId, GraphError> {
        for &v in &vertices {
            if !self.contains_vertex(v) {
                return Err(GraphError::InvalidArgument(format!(
                    "cannot build subgraph: vertex {} is not in the graph",
                    v
                )));
            }
        }
        Ok(self.subgraphs.insert(SubgraphState { vertices }))
    }

    /// A view over a subset of an existing view's vertices.
    pub fn subgraph_of_subgraph(
        &mut self,
        id: SubgraphId,
        vertices: IntSet,
    ) -> Result<SubgraphId, GraphError> {
        let parent = self.subgraph_state(id)?;
        for &v in &vertices {
            if !parent.vertices.contains(&v) {
                return Err(GraphError::InvalidArgument(format!(
                    "vertex {} is outside the parent subgraph",
                    v
                )));
            }
        }
        Ok(self.subgraphs.insert(SubgraphState { vertices }))
    }

    pub fn release_subgraph(&mut self, id: SubgraphId) -> bool {
        self.subgraphs.remove(id).is_some()
    }

    fn subgraph_state(&self, id: SubgraphId) -> Result<&SubgraphState, GraphError> {
        self.subgraphs
            .get(id)
            .ok_or_else(|| GraphError::InvalidArgument("unknown subgraph handle".to_string()))
    }

    pub fn subgraph_order(&self, id: SubgraphId) -> Result<usize, GraphError> {
        Ok(self.subgraph_state(id)?.vertices.len())
    }

    pub fn subgraph_vertices(&self, id: SubgraphId) -> Result<&IntSet, GraphError> {
        Ok(&self.subgraph_state(id)?.vertices)
    }

    pub fn subgraph_contains_vertex(
        &self,
        id: SubgraphId,
        vertex: VertexId,
    ) -> Result<bool, GraphError> {
        Ok(self.subgraph_state(id)?.vertices.contains(&vertex))
    }

    pub fn subgraph_contains_edge(&self, id: SubgraphId, edge: &E) -> Result<bool, GraphError> {
        let state = self.subgraph_state(id)?;
        Ok(state.vertices.contains(&edge.from())
            && state.vertices.contains(&edge.to())
            && self.contains_edge(edge))
    }

    pub fn subgraph_connected(
        &self,
        id: SubgraphId,
        v1: VertexId,
        v2: VertexId,
    ) -> Result<bool, GraphError> {
        let state = self.subgraph_state(id)?;
        Ok(state.vertices.contains(&v1) && state.vertices.contains(&v2) && self.connected(v1, v2))
    }

    pub fn subgraph_neighbors(
        &self,
        id: SubgraphId,
        vertex: VertexId,
    ) -> Result<Box<dyn Iterator<Item = VertexId> + '_>, GraphError> {
        let state = self.subgraph_state(id)?;
        if !state.vertices.contains(&vertex) {
            return Ok(Box::new(std::iter::empty()));
        }
        match self.vertex_to_edges.get(&vertex) {
            Some(set) => Ok(Box::new(
                set.neighbors().filter(move |n| state.vertices.contains(n)),
            )),
            None => Ok(Box::new(std::iter::empty())),
        }
    }

    pub fn subgraph_degree(&self, id: SubgraphId, vertex: VertexId) -> Result<usize, GraphError> {
        let state = self.subgraph_state(id)?;
        if !state.vertices.contains(&vertex) {
            return Ok(0);
        }
        Ok(match self.vertex_to_edges.get(&vertex) {
            Some(set) => set
                .edges()
                .filter(|e| state.vertices.contains(&e.other(vertex)))
                .count(),
            None => 0,
        })
    }

    /// Edge count of the view, recomputed by scanning the member vertices on
    /// every call. The backing graph may change between calls, so nothing is
    /// cached; expect a cost on the order of the members' summed degrees.
    pub fn subgraph_size(&self, id: SubgraphId) -> Result<usize, GraphError> {
        let state = self.subgraph_state(id)?;
        let mut count = 0;
        for &v in &state.vertices {
            if let Some(set) = self.vertex_to_edges.get(&v) {
                count += set
                    .unique_edges()
                    .filter(|e| state.vertices.contains(&e.other(v)))
                    .count();
            }
        }
        Ok(count)
    }

    pub fn subgraph_edges(&self, id: SubgraphId) -> Result<Vec<E>, GraphError> {
        let state = self.subgraph_state(id)?;
        let mut edges = Vec::new();
        for &v in &state.vertices {
            if let Some(set) = self.vertex_to_edges.get(&v) {
                edges.extend(
                    set.unique_edges()
                        .filter(|e| state.vertices.contains(&e.other(v))),
                );
            }
        }
        Ok(edges)
    }

    /// Adding a vertex through a view is refused unless it is already a
    /// member, in which case nothing changes.
    pub fn subgraph_add_vertex(
        &mut self,
        id: SubgraphId,
        vertex: VertexId,
    ) -> Result<bool, GraphError> {
        if self.subgraph_state(id)?.vertices.contains(&vertex) {
            Ok(false)
        } else {
            Err(GraphError::UnsupportedOperation(format!(
                "cannot add vertex {} through a subgraph view",
                vertex
            )))
        }
    }

    /// Adds the edge through the view. Both endpoints must be members; the
    /// write lands in the backing graph and is visible globally.
    pub fn subgraph_add_edge(&mut self, id: SubgraphId, edge: E) -> Result<bool, GraphError> {
        let inside = {
            let state = self.subgraph_state(id)?;
            state.vertices.contains(&edge.from()) && state.vertices.contains(&edge.to())
        };
        if inside {
            Ok(self.add_edge(edge))
        } else {
            Err(GraphError::UnsupportedOperation(
                "edge endpoints are not both inside the subgraph".to_string(),
            ))
        }
    }

    /// Removes a member vertex from the backing graph itself. A view cannot
    /// hide a vertex without deleting it.
    pub fn subgraph_remove_vertex(
        &mut self,
        id: SubgraphId,
        vertex: VertexId,
    ) -> Result<bool, GraphError> {
        if self.subgraph_state(id)?.vertices.contains(&vertex) {
            Ok(self.remove_vertex(vertex))
        } else {
            Ok(false)
        }
    }

    pub fn subgraph_remove_edge(&mut self, id: SubgraphId, edge: &E) -> Result<bool, GraphError> {
        let inside = {
            let state = self.subgraph_state(id)?;
            state.vertices.contains(&edge.from()) && state.vertices.contains(&edge.to())
        };
        if inside {
            Ok(self.remove_edge(edge))
        } else {
            Ok(false)
        }
    }

    /// Materializes the view as an independent graph.
    pub fn subgraph_copy(&self, id: SubgraphId) -> Result<Self, GraphError> {
        let vertices = self.subgraph_state(id)?.vertices.clone();
        self.copy(&vertices)
    }
}

impl<E: GraphEdge, S: EdgeSet<E>> Default for SparseGraph<E, S> {
    fn default() -> Self {
        Self::new()
    }
}

/// Two graphs are equal when they hold the same vertices and the same edge
/// values; subgraph registrations take no part.
impl<E: GraphEdge, S: EdgeSet<E>> PartialEq for SparseGraph<E, S> {
    fn eq(&self, other: &Self) -> bool {
        self.order() == other.order()
            && self.size() == other.size()
            && self.vertex_to_edges.keys().eq(other.vertex_to_edges.keys())
            && self.edges().all(|e| other.contains_edge(&e))
    }
}

impl<E: GraphEdge, S: EdgeSet<E>> Eq for SparseGraph<E, S> {}

impl SparseDirectedGraph {
    pub fn in_degree(&self, vertex: VertexId) -> usize {
        self.adjacency(vertex).map(|s| s.in_degree()).unwrap_or(0)
    }

    pub fn out_degree(&self, vertex: VertexId) -> usize {
        self.adjacency(vertex).map(|s| s.out_degree()).unwrap_or(0)
    }

    pub fn in_neighbors(&self, vertex: VertexId) -> Box<dyn Iterator<Item = VertexId> + '_> {
        match self.adjacency(vertex) {
            Some(set) => Box::new(set.in_neighbors()),
            None => Box::new(std::iter::empty()),
        }
    }

    pub fn out_neighbors(&self, vertex: VertexId) -> Box<dyn Iterator<Item = VertexId> + '_> {
        match self.adjacency(vertex) {
            Some(set) => Box::new(set.out_neighbors()),
            None => Box::new(std::iter::empty()),
        }
    }
}

impl SparseWeightedGraph {
    /// Sum of the weights on the vertex's incident edges.
    pub fn strength(&self, vertex: VertexId) -> f64 {
        self.adjacency(vertex).map(|s| s.sum()).unwrap_or(0.0)
    }

    pub fn edge_weight(&self, v1: VertexId, v2: VertexId) -> Option<f64> {
        self.adjacency(v1).and_then(|s| s.weight_to(v2))
    }
}

impl SparseWeightedDirectedGraph {
    pub fn strength(&self, vertex: VertexId) -> f64 {
        self.adjacency(vertex).map(|s| s.sum()).unwrap_or(0.0)
    }
}

#[cfg(test)]
mod test_graph {
    use rustc_hash::FxHashSet;

    use crate::graph::*;
    use crate::types::IntSet;

    fn triangle() -> SparseUndirectedGraph {
        SparseUndirectedGraph::from_edges([
            SimpleEdge::new(0, 1),
            SimpleEdge::new(1, 2),
            SimpleEdge::new(2, 0),
        ])
    }

    #[test]
    fn test_both_endpoints_see_an_edge() {
        let mut g = SparseUndirectedGraph::new();
        assert!(g.add_edge(SimpleEdge::new(4, 9)));
        assert!(g.neighbors(4).any(|n| n == 9));
        assert!(g.neighbors(9).any(|n| n == 4));

        assert!(g.remove_edge(&SimpleEdge::new(9, 4)));
        assert!(!g.neighbors(4).any(|n| n == 9));
        assert!(!g.neighbors(9).any(|n| n == 4));
        // The endpoints stay behind as isolated vertices.
        assert_eq!(g.order(), 2);
        assert_eq!(g.size(), 0);
    }

    #[test]
    fn test_size_matches_edge_enumeration() {
        let mut g = SparseUndirectedGraph::new();
        g.add_edge(SimpleEdge::new(0, 1));
        g.add_edge(SimpleEdge::new(1, 0));
        g.add_edge(SimpleEdge::new(1, 2));
        g.add_edge(SimpleEdge::new(3, 3));
        g.remove_edge(&SimpleEdge::new(0, 1));

        let collected: FxHashSet<SimpleEdge> = g.edges().collect();
        println!("edges: {:?}", collected);
        assert_eq!(collected.len(), g.size());
        assert_eq!(g.size(), 2);
    }

    #[test]
    fn test_vertex_removal_cascades() {
        let mut g = SparseUndirectedGraph::new();
        for n in 1..=5 {
            g.add_edge(SimpleEdge::new(0, n));
        }
        g.add_edge(SimpleEdge::new(1, 2));
        let center_degree = g.degree(0);
        let before = g.size();

        assert!(g.remove_vertex(0));
        for n in 1..=5 {
            assert!(!g.neighbors(n).any(|m| m == 0), "dangling edge from {}", n);
        }
        assert_eq!(g.size(), before - center_degree);
        assert_eq!(g.size(), 1);
        assert!(!g.remove_vertex(0));
    }

    #[test]
    fn test_copy_is_independent() {
        let g = triangle();
        let keep: IntSet = [0, 1].into_iter().collect();
        let mut copied = g.copy(&keep).unwrap();
        assert_eq!(copied.order(), 2);
        assert_eq!(copied.size(), 1);

        copied.add_edge(SimpleEdge::new(0, 7));
        copied.remove_edge(&SimpleEdge::new(0, 1));
        assert_eq!(g.size(), 3, "the source graph never changes");
        assert!(g.contains_edge(&SimpleEdge::new(0, 1)));
        assert!(!g.contains_vertex(7));
    }

    #[test]
    fn test_copy_rejects_unknown_vertex() {
        let g = triangle();
        let bad: IntSet = [0, 42].into_iter().collect();
        assert!(matches!(g.copy(&bad), Err(GraphError::InvalidArgument(_))));
    }

    #[test]
    fn test_subgraph_delegates_writes() {
        let mut g = triangle();
        g.add_vertex(3);
        let view = g.subgraph([0, 1, 3].into_iter().collect()).unwrap();

        // An in-view write becomes globally visible.
        assert!(g.subgraph_add_edge(view, SimpleEdge::new(1, 3)).unwrap());
        assert!(g.contains_edge(&SimpleEdge::new(1, 3)));

        // An out-of-view write is refused and the graph is untouched.
        let before = g.size();
        let refused = g.subgraph_add_edge(view, SimpleEdge::new(1, 2));
        assert!(matches!(refused, Err(GraphError::UnsupportedOperation(_))));
        assert_eq!(g.size(), before);
    }

    #[test]
    fn test_subgraph_reads_are_filtered() {
        let mut g = triangle();
        g.add_edge(SimpleEdge::new(2, 3));
        let view = g.subgraph([0, 1, 2].into_iter().collect()).unwrap();

        assert_eq!(g.subgraph_order(view).unwrap(), 3);
        assert_eq!(g.subgraph_size(view).unwrap(), 3);
        assert_eq!(g.subgraph_degree(view, 2).unwrap(), 2, "edge to 3 filtered");
        let from_two: Vec<u32> = g.subgraph_neighbors(view, 2).unwrap().collect();
        assert!(!from_two.contains(&3));
        assert!(!g.subgraph_contains_edge(view, &SimpleEdge::new(2, 3)).unwrap());
    }

    #[test]
    fn test_subgraph_tracks_backing_mutation() {
        let mut g = triangle();
        let view = g.subgraph([0, 1, 2].into_iter().collect()).unwrap();
        assert_eq!(g.subgraph_size(view).unwrap(), 3);

        g.remove_vertex(1);
        assert_eq!(g.subgraph_order(view).unwrap(), 2);
        assert_eq!(g.subgraph_size(view).unwrap(), 1);
    }

    #[test]
    fn test_subgraph_vertex_removal_is_global() {
        let mut g = triangle();
        let view = g.subgraph([0, 1].into_iter().collect()).unwrap();
        assert!(g.subgraph_remove_vertex(view, 1).unwrap());
        assert!(!g.contains_vertex(1));
        // A non-member removal is a no-op, not an error.
        assert!(!g.subgraph_remove_vertex(view, 2).unwrap());
        assert!(g.contains_vertex(2));
    }

    #[test]
    fn test_released_handle_is_rejected() {
        let mut g = triangle();
        let view = g.subgraph([0].into_iter().collect()).unwrap();
        assert!(g.release_subgraph(view));
        assert!(!g.release_subgraph(view));
        assert!(matches!(
            g.subgraph_order(view),
            Err(GraphError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_nested_subgraph_checks_parent() {
        let mut g = triangle();
        let outer = g.subgraph([0, 1].into_iter().collect()).unwrap();
        let inner = g.subgraph_of_subgraph(outer, [0].into_iter().collect());
        assert!(inner.is_ok());
        let bad = g.subgraph_of_subgraph(outer, [2].into_iter().collect());
        assert!(matches!(bad, Err(GraphError::InvalidArgument(_))));
    }

    #[test]
    fn test_directed_degrees() {
        let mut g = SparseDirectedGraph::new();
        g.add_edge(SimpleDirectedEdge::new(0, 1));
        g.add_edge(SimpleDirectedEdge::new(1, 0));
        g.add_edge(SimpleDirectedEdge::new(2, 1));

        assert_eq!(g.out_degree(0), 1);
        assert_eq!(g.in_degree(0), 1);
        assert_eq!(g.in_degree(1), 2);
        assert_eq!(g.degree(1), 3);
        assert_eq!(g.size(), 3);
        assert!(g.contains_edge(&SimpleDirectedEdge::new(2, 1)));
        assert!(!g.contains_edge(&SimpleDirectedEdge::new(1, 2)));

        let incoming: Vec<u32> = g.in_neighbors(1).collect();
        assert_eq!(incoming.len(), 2);
    }

    #[test]
    fn test_weight_update_reaches_both_sides() {
        let mut g = SparseWeightedGraph::new();
        assert!(g.add_edge(SimpleWeightedEdge::new(0, 1, 1.0)));
        assert!(!g.add_edge(SimpleWeightedEdge::new(1, 0, 5.0)));
        assert_eq!(g.size(), 1);
        assert_eq!(g.edge_weight(0, 1), Some(5.0));
        assert_eq!(g.edge_weight(1, 0), Some(5.0));
        assert!((g.strength(0) - 5.0).abs() < 1e-12);
        assert!((g.strength(1) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_graph_equality_is_structural() {
        let a = triangle();
        let mut b = SparseUndirectedGraph::new();
        b.add_edge(SimpleEdge::new(2, 0));
        b.add_edge(SimpleEdge::new(1, 2));
        b.add_edge(SimpleEdge::new(0, 1));
        assert_eq!(a, b);

        b.remove_edge(&SimpleEdge::new(0, 1));
        assert_ne!(a, b);
    }

    #[test]
    fn test_clear_edges_keeps_vertices() {
        let mut g = triangle();
        g.clear_edges();
        assert_eq!(g.order(), 3);
        assert_eq!(g.size(), 0);
        assert_eq!(g.edges().count(), 0);
    }
}
