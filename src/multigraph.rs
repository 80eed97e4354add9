use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::hash::Hash;

use rustc_hash::{FxHashMap, FxHashSet};
use slotmap::DenseSlotMap;

use crate::edge_set::EdgeSet;
use crate::graph::{GraphError, SubgraphId};
use crate::typed_edge_set::{SparseTypedEdgeSet, TypedEdgeSet};
use crate::types::{GraphEdge, IntSet, SimpleTypedEdge, TypedGraphEdge, VertexId};

#[derive(Debug, Clone)]
struct TypedSubgraphState<T> {
    vertices: IntSet,
    /// Types this view accepts. Fixed at creation, then pruned whenever a
    /// type's last edge leaves the backing graph.
    valid_types: FxHashSet<T>,
}

/// Undirected graph admitting parallel edges between a vertex pair as long
/// as their types differ.
///
/// A type → count table tracks how many edges of each type exist, so
/// `edge_types` answers from the table instead of scanning; a type leaves the
/// table at the moment its last edge is removed, and every live subgraph
/// view drops it from its valid set at that same moment.
#[derive(Debug)]
pub struct UndirectedMultigraph<T> {
    vertex_to_edges: BTreeMap<VertexId, SparseTypedEdgeSet<T>>,
    /// Live edge count per type. A zero count is never stored.
    type_counts: FxHashMap<T, usize>,
    size: usize,
    subgraphs: DenseSlotMap<SubgraphId, TypedSubgraphState<T>>,
}

impl<T: Clone + Eq + Hash> UndirectedMultigraph<T> {
    pub fn new() -> Self {
        UndirectedMultigraph {
            vertex_to_edges: BTreeMap::new(),
            type_counts: FxHashMap::default(),
            size: 0,
            subgraphs: DenseSlotMap::new(),
        }
    }

    pub fn from_edges(edges: impl IntoIterator<Item = SimpleTypedEdge<T>>) -> Self {
        let mut graph = Self::new();
        for edge in edges {
            graph.add_edge(edge);
        }
        graph
    }

    pub fn order(&self) -> usize {
        self.vertex_to_edges.len()
    }

    /// Number of edges across all types. O(1).
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.vertex_to_edges.is_empty()
    }

    pub fn contains_vertex(&self, vertex: VertexId) -> bool {
        self.vertex_to_edges.contains_key(&vertex)
    }

    /// Whether any edge of any type joins the pair.
    pub fn connected(&self, v1: VertexId, v2: VertexId) -> bool {
        self.vertex_to_edges
            .get(&v1)
            .map(|set| set.connects(v2))
            .unwrap_or(false)
    }

    /// Whether an edge of the given type joins the pair.
    pub fn connected_with_type(&self, v1: VertexId, v2: VertexId, edge_type: &T) -> bool {
        self.vertex_to_edges
            .get(&v1)
            .map(|set| set.connects_with_type(v2, edge_type))
            .unwrap_or(false)
    }

    pub fn contains_edge(&self, edge: &SimpleTypedEdge<T>) -> bool {
        self.vertex_to_edges
            .get(&edge.from())
            .map(|set| set.contains(edge))
            .unwrap_or(false)
    }

    /// Number of edges incident to the vertex, counting parallel types.
    pub fn degree(&self, vertex: VertexId) -> usize {
        self.vertex_to_edges
            .get(&vertex)
            .map(|set| set.len())
            .unwrap_or(0)
    }

    pub fn vertices(&self) -> impl Iterator<Item = VertexId> + '_ {
        self.vertex_to_edges.keys().copied()
    }

    pub fn neighbors(&self, vertex: VertexId) -> Box<dyn Iterator<Item = VertexId> + '_> {
        match self.vertex_to_edges.get(&vertex) {
            Some(set) => set.neighbors(),
            None => Box::new(std::iter::empty()),
        }
    }

    pub fn edges(&self) -> impl Iterator<Item = SimpleTypedEdge<T>> + '_ {
        self.vertex_to_edges
            .values()
            .flat_map(|set| set.unique_edges())
    }

    /// Every edge carrying the given type, each exactly once.
    pub fn edges_with_type<'a>(
        &'a self,
        edge_type: &'a T,
    ) -> impl Iterator<Item = SimpleTypedEdge<T>> + 'a {
        self.vertex_to_edges.values().flat_map(move |set| {
            set.unique_edges()
                .filter(move |e| e.edge_type() == edge_type)
        })
    }

    pub fn edges_between(&self, v1: VertexId, v2: VertexId) -> Vec<SimpleTypedEdge<T>> {
        self.vertex_to_edges
            .get(&v1)
            .map(|set| set.edges_to(v2))
            .unwrap_or_default()
    }

    pub fn incident_edges(&self, vertex: VertexId) -> Box<dyn Iterator<Item = SimpleTypedEdge<T>> + '_> {
        match self.vertex_to_edges.get(&vertex) {
            Some(set) => set.edges(),
            None => Box::new(std::iter::empty()),
        }
    }

    /// The types currently present, i.e. those with at least one live edge.
    pub fn edge_types(&self) -> impl Iterator<Item = &T> + '_ {
        self.type_counts.keys()
    }

    pub fn has_edge_type(&self, edge_type: &T) -> bool {
        self.type_counts.contains_key(edge_type)
    }

    /// Live edges of one type, answered from the count table.
    pub fn type_count(&self, edge_type: &T) -> usize {
        self.type_counts.get(edge_type).copied().unwrap_or(0)
    }

    pub fn add_vertex(&mut self, vertex: VertexId) -> bool {
        match self.vertex_to_edges.entry(vertex) {
            Entry::Vacant(slot) => {
                slot.insert(SparseTypedEdgeSet::with_root(vertex));
                true
            }
            Entry::Occupied(_) => false,
        }
    }

    /// Adds the typed edge, creating missing endpoints. Returns false when
    /// the same (pair, type) connection already exists.
    pub fn add_edge(&mut self, edge: SimpleTypedEdge<T>) -> bool {
        self.add_vertex(edge.from());
        self.add_vertex(edge.to());
        let is_new = match self.vertex_to_edges.get_mut(&edge.from()) {
            Some(set) => set.add(edge.clone()),
            None => false,
        };
        if is_new {
            if !edge.is_self_loop() {
                if let Some(set) = self.vertex_to_edges.get_mut(&edge.to()) {
                    set.add(edge.clone());
                }
            }
            self.size += 1;
            *self.type_counts.entry(edge.edge_type().clone()).or_insert(0) += 1;
        }
        is_new
    }

    pub fn remove_edge(&mut self, edge: &SimpleTypedEdge<T>) -> bool {
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
            if self.decrement_type(edge.edge_type()) {
                self.prune_type(edge.edge_type().clone());
            }
        }
        removed
    }

    /// Removes the vertex, all its incident edges, the type counts they
    /// carried, and the vertex's membership in live views.
    pub fn remove_vertex(&mut self, vertex: VertexId) -> bool {
        let removed_set = match self.vertex_to_edges.remove(&vertex) {
            Some(set) => set,
            None => return false,
        };
        let mut vanished = Vec::new();
        for edge in removed_set.edges() {
            if self.decrement_type(edge.edge_type()) {
                vanished.push(edge.edge_type().clone());
            }
        }
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
            for t in &vanished {
                state.valid_types.remove(t);
            }
        }
        true
    }

    /// Removes every edge of the given type, reporting how many went away.
    pub fn clear_edges_with_type(&mut self, edge_type: &T) -> usize {
        let doomed: Vec<SimpleTypedEdge<T>> = self.edges_with_type(edge_type).collect();
        let mut removed = 0;
        for edge in &doomed {
            if self.remove_edge(edge) {
                removed += 1;
            }
        }
        removed
    }

    pub fn clear_edges(&mut self) {
        for set in self.vertex_to_edges.values_mut() {
            set.clear();
        }
        self.size = 0;
        self.type_counts.clear();
        for state in self.subgraphs.values_mut() {
            state.valid_types.clear();
        }
    }

    pub fn clear(&mut self) {
        self.vertex_to_edges.clear();
        self.size = 0;
        self.type_counts.clear();
        for state in self.subgraphs.values_mut() {
            state.vertices.clear();
            state.valid_types.clear();
        }
    }

    // True when the type's last edge just went away.
    fn decrement_type(&mut self, edge_type: &T) -> bool {
        match self.type_counts.get_mut(edge_type) {
            Some(count) => {
                *count -= 1;
                if *count == 0 {
                    self.type_counts.remove(edge_type);
                    true
                } else {
                    false
                }
            }
            None => {
                debug_assert!(false, "edge removed for an untracked type");
                false
            }
        }
    }

    fn prune_type(&mut self, edge_type: T) {
        for state in self.subgraphs.values_mut() {
            state.valid_types.remove(&edge_type);
        }
    }

    /// Deep snapshot of the listed vertices and every edge among them.
    pub fn copy(&self, vertices: &IntSet) -> Result<Self, GraphError> {
        let all_types: FxHashSet<T> = self.type_counts.keys().cloned().collect();
        self.copy_filtered(vertices, &all_types)
    }

    /// Deep snapshot keeping only edges whose type is in `types`.
    pub fn copy_with_types(
        &self,
        vertices: &IntSet,
        types: &FxHashSet<T>,
    ) -> Result<Self, GraphError> {
        self.validate_types(types)?;
        self.copy_filtered(vertices, types)
    }

    fn copy_filtered(
        &self,
        vertices: &IntSet,
        types: &FxHashSet<T>,
    ) -> Result<Self, GraphError> {
        for &v in vertices {
            if !self.contains_vertex(v) {
                return Err(GraphError::InvalidArgument(format!(
                    "cannot copy: vertex {} is not in the graph",
                    v
                )));
            }
        }
        let mut copied = Self::new();
        for &v in vertices {
            copied.add_vertex(v);
        }
        for &v in vertices {
            if let Some(set) = self.vertex_to_edges.get(&v) {
                for edge in set.unique_edges() {
                    if vertices.contains(&edge.other(v)) && types.contains(edge.edge_type()) {
                        copied.add_edge(edge);
                    }
                }
            }
        }
        Ok(copied)
    }

    fn validate_vertices(&self, vertices: &IntSet) -> Result<(), GraphError> {
        for &v in vertices {
            if !self.contains_vertex(v) {
                return Err(GraphError::InvalidArgument(format!(
                    "cannot build subgraph: vertex {} is not in the graph",
                    v
                )));
            }
        }
        Ok(())
    }

    fn validate_types(&self, types: &FxHashSet<T>) -> Result<(), GraphError> {
        if types.is_empty() {
            return Err(GraphError::InvalidArgument(
                "the type subset must not be empty".to_string(),
            ));
        }
        for t in types {
            if !self.type_counts.contains_key(t) {
                return Err(GraphError::InvalidArgument(
                    "a requested type has no edges in the graph".to_string(),
                ));
            }
        }
        Ok(())
    }

    /// Registers a live view over `vertices` accepting every type present at
    /// creation time.
    pub fn subgraph(&mut self, vertices: IntSet) -> Result<SubgraphId, GraphError> {
        self.validate_vertices(&vertices)?;
        let valid_types = self.type_counts.keys().cloned().collect();
        Ok(self.subgraphs.insert(TypedSubgraphState { vertices, valid_types }))
    }

    /// Registers a live view restricted by vertex membership and edge type.
    /// The type subset must be non-empty and every type must currently have
    /// edges.
    pub fn subgraph_with_types(
        &mut self,
        vertices: IntSet,
        types: FxHashSet<T>,
    ) -> Result<SubgraphId, GraphError> {
        self.validate_vertices(&vertices)?;
        self.validate_types(&types)?;
        Ok(self.subgraphs.insert(TypedSubgraphState {
            vertices,
            valid_types: types,
        }))
    }

    /// A view over a subset of an existing view, inheriting its valid types.
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
        let valid_types = parent.valid_types.clone();
        Ok(self.subgraphs.insert(TypedSubgraphState {
            vertices,
            valid_types,
        }))
    }

    pub fn release_subgraph(&mut self, id: SubgraphId) -> bool {
        self.subgraphs.remove(id).is_some()
    }

    fn subgraph_state(&self, id: SubgraphId) -> Result<&TypedSubgraphState<T>, GraphError> {
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

    /// The types this view still accepts.
    pub fn subgraph_edge_types(&self, id: SubgraphId) -> Result<&FxHashSet<T>, GraphError> {
        Ok(&self.subgraph_state(id)?.valid_types)
    }

    pub fn subgraph_contains_vertex(
        &self,
        id: SubgraphId,
        vertex: VertexId,
    ) -> Result<bool, GraphError> {
        Ok(self.subgraph_state(id)?.vertices.contains(&vertex))
    }

    pub fn subgraph_contains_edge(
        &self,
        id: SubgraphId,
        edge: &SimpleTypedEdge<T>,
    ) -> Result<bool, GraphError> {
        let state = self.subgraph_state(id)?;
        Ok(state.vertices.contains(&edge.from())
            && state.vertices.contains(&edge.to())
            && state.valid_types.contains(edge.edge_type())
            && self.contains_edge(edge))
    }

    pub fn subgraph_connected(
        &self,
        id: SubgraphId,
        v1: VertexId,
        v2: VertexId,
    ) -> Result<bool, GraphError> {
        let state = self.subgraph_state(id)?;
        if !state.vertices.contains(&v1) || !state.vertices.contains(&v2) {
            return Ok(false);
        }
        Ok(self
            .edges_between(v1, v2)
            .iter()
            .any(|e| state.valid_types.contains(e.edge_type())))
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
                set.neighbors()
                    .filter(move |n| state.vertices.contains(n))
                    .filter(move |&n| {
                        set.edges_to(n)
                            .iter()
                            .any(|e| state.valid_types.contains(e.edge_type()))
                    }),
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
                .filter(|e| {
                    state.vertices.contains(&e.other(vertex))
                        && state.valid_types.contains(e.edge_type())
                })
                .count(),
            None => 0,
        })
    }

    /// Edge count of the view, recomputed by scanning on every call.
    pub fn subgraph_size(&self, id: SubgraphId) -> Result<usize, GraphError> {
        let state = self.subgraph_state(id)?;
        let mut count = 0;
        for &v in &state.vertices {
            if let Some(set) = self.vertex_to_edges.get(&v) {
                count += set
                    .unique_edges()
                    .filter(|e| {
                        state.vertices.contains(&e.other(v))
                            && state.valid_types.contains(e.edge_type())
                    })
                    .count();
            }
        }
        Ok(count)
    }

    pub fn subgraph_edges(&self, id: SubgraphId) -> Result<Vec<SimpleTypedEdge<T>>, GraphError> {
        let state = self.subgraph_state(id)?;
        let mut edges = Vec::new();
        for &v in &state.vertices {
            if let Some(set) = self.vertex_to_edges.get(&v) {
                edges.extend(set.unique_edges().filter(|e| {
                    state.vertices.contains(&e.other(v))
                        && state.valid_types.contains(e.edge_type())
                }));
            }
        }
        Ok(edges)
    }

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

    /// Adds the edge through the view. Both endpoints must be members and
    /// the type must be valid for this view.
    pub fn subgraph_add_edge(
        &mut self,
        id: SubgraphId,
        edge: SimpleTypedEdge<T>,
    ) -> Result<bool, GraphError> {
        let accepted = {
            let state = self.subgraph_state(id)?;
            state.vertices.contains(&edge.from())
                && state.vertices.contains(&edge.to())
                && state.valid_types.contains(edge.edge_type())
        };
        if accepted {
            Ok(self.add_edge(edge))
        } else {
            Err(GraphError::UnsupportedOperation(
                "edge endpoints or type are not valid for the subgraph".to_string(),
            ))
        }
    }

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

    pub fn subgraph_remove_edge(
        &mut self,
        id: SubgraphId,
        edge: &SimpleTypedEdge<T>,
    ) -> Result<bool, GraphError> {
        let accepted = {
            let state = self.subgraph_state(id)?;
            state.vertices.contains(&edge.from())
                && state.vertices.contains(&edge.to())
                && state.valid_types.contains(edge.edge_type())
        };
        if accepted {
            Ok(self.remove_edge(edge))
        } else {
            Ok(false)
        }
    }

    /// Materializes the view, keeping only its vertices and valid types.
    pub fn subgraph_copy(&self, id: SubgraphId) -> Result<Self, GraphError> {
        let state = self.subgraph_state(id)?;
        self.copy_filtered(&state.vertices, &state.valid_types)
    }
}

impl<T: Clone + Eq + Hash> Default for UndirectedMultigraph<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + Eq + Hash> PartialEq for UndirectedMultigraph<T> {
    fn eq(&self, other: &Self) -> bool {
        self.order() == other.order()
            && self.size() == other.size()
            && self.vertex_to_edges.keys().eq(other.vertex_to_edges.keys())
            && self.edges().all(|e| other.contains_edge(&e))
    }
}

impl<T: Clone + Eq + Hash> Eq for UndirectedMultigraph<T> {}
