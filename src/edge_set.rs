use crate::types::{GraphEdge, IntMap, IntSet, SimpleDirectedEdge, SimpleEdge, SimpleWeightedDirectedEdge, SimpleWeightedEdge, VertexId, WeightedGraphEdge};

/// Per-vertex adjacency container, the storage unit of the sparse graphs.
///
/// Every edge held by a set has the set's root vertex as one of its two
/// endpoints. The same logical edge lives in the sets of both its endpoints,
/// which is why `unique_edges` exists: it emits an edge only from the set
/// whose root is the smaller endpoint (the out-side for directed flavors), so
/// a whole-graph enumeration sees each edge exactly once.
pub trait EdgeSet<E: GraphEdge>: Sized {
    fn with_root(root: VertexId) -> Self;

    fn root(&self) -> VertexId;

    /// Inserts the edge if it is incident to the root and the connection is
    /// new. An edge that touches the root on neither side is ignored and
    /// reported as false, never an error.
    fn add(&mut self, edge: E) -> bool;

    fn remove(&mut self, edge: &E) -> bool;

    fn contains(&self, edge: &E) -> bool;

    fn connects(&self, vertex: VertexId) -> bool;

    /// The distinct vertices connected to the root.
    fn neighbors(&self) -> Box<dyn Iterator<Item = VertexId> + '_>;

    /// Every edge in the set, rebuilt as a value on the fly.
    fn edges(&self) -> Box<dyn Iterator<Item = E> + '_>;

    /// The edges this set is responsible for in a whole-graph enumeration.
    fn unique_edges(&self) -> Box<dyn Iterator<Item = E> + '_>;

    /// All edges between the root and `vertex` (more than one for typed
    /// sets).
    fn edges_to(&self, vertex: VertexId) -> Vec<E>;

    /// Removes every edge to `vertex`, returning how many went away.
    fn disconnect(&mut self, vertex: VertexId) -> usize;

    /// A new set for the same root keeping only edges whose other endpoint
    /// lies in `vertices`.
    fn copy_subset(&self, vertices: &IntSet) -> Self;

    /// The number of edges (not neighbors) in the set.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn clear(&mut self);
}

/// Adjacency of one vertex in an undirected plain graph: just the neighbor
/// ids.
#[derive(Debug, Clone)]
pub struct SparseUndirectedEdgeSet {
    root: VertexId,
    neighbors: IntSet,
}

impl SparseUndirectedEdgeSet {
    fn other_endpoint(&self, edge: &SimpleEdge) -> Option<VertexId> {
        if edge.from() == self.root {
            Some(edge.to())
        } else if edge.to() == self.root {
            Some(edge.from())
        } else {
            None
        }
    }
}

impl EdgeSet<SimpleEdge> for SparseUndirectedEdgeSet {
    fn with_root(root: VertexId) -> Self {
        SparseUndirectedEdgeSet {
            root,
            neighbors: IntSet::default(),
        }
    }

    fn root(&self) -> VertexId {
        self.root
    }

    fn add(&mut self, edge: SimpleEdge) -> bool {
        match self.other_endpoint(&edge) {
            Some(other) => self.neighbors.insert(other),
            None => false,
        }
    }

    fn remove(&mut self, edge: &SimpleEdge) -> bool {
        match self.other_endpoint(edge) {
            Some(other) => self.neighbors.remove(&other),
            None => false,
        }
    }

    fn contains(&self, edge: &SimpleEdge) -> bool {
        self.other_endpoint(edge)
            .map(|other| self.neighbors.contains(&other))
            .unwrap_or(false)
    }

    fn connects(&self, vertex: VertexId) -> bool {
        self.neighbors.contains(&vertex)
    }

    fn neighbors(&self) -> Box<dyn Iterator<Item = VertexId> + '_> {
        Box::new(self.neighbors.iter().copied())
    }

    fn edges(&self) -> Box<dyn Iterator<Item = SimpleEdge> + '_> {
        let root = self.root;
        Box::new(self.neighbors.iter().map(move |&n| SimpleEdge::new(root, n)))
    }

    fn unique_edges(&self) -> Box<dyn Iterator<Item = SimpleEdge> + '_> {
        let root = self.root;
        // Self loops have only one owning set, so <= keeps them enumerated.
        Box::new(
            self.neighbors
                .iter()
                .filter(move |&&n| root <= n)
                .map(move |&n| SimpleEdge::new(root, n)),
        )
    }

    fn edges_to(&self, vertex: VertexId) -> Vec<SimpleEdge> {
        if self.neighbors.contains(&vertex) {
            vec![SimpleEdge::new(self.root, vertex)]
        } else {
            Vec::new()
        }
    }

    fn disconnect(&mut self, vertex: VertexId) -> usize {
        if self.neighbors.remove(&vertex) {
            1
        } else {
            0
        }
    }

    fn copy_subset(&self, vertices: &IntSet) -> Self {
        SparseUndirectedEdgeSet {
            root: self.root,
            neighbors: self
                .neighbors
                .iter()
                .filter(|v| vertices.contains(v))
                .copied()
                .collect(),
        }
    }

    fn len(&self) -> usize {
        self.neighbors.len()
    }

    fn clear(&mut self) {
        self.neighbors.clear();
    }
}

/// Adjacency of one vertex in a directed graph, split into the edges that
/// leave the root and the edges that arrive at it.
#[derive(Debug, Clone)]
pub struct SparseDirectedEdgeSet {
    root: VertexId,
    in_neighbors: IntSet,
    out_neighbors: IntSet,
}

impl SparseDirectedEdgeSet {
    /// Vertices with an edge arriving at the root.
    pub fn in_neighbors(&self) -> impl Iterator<Item = VertexId> + '_ {
        self.in_neighbors.iter().copied()
    }

    /// Vertices the root has an edge to.
    pub fn out_neighbors(&self) -> impl Iterator<Item = VertexId> + '_ {
        self.out_neighbors.iter().copied()
    }

    pub fn in_edges(&self) -> impl Iterator<Item = SimpleDirectedEdge> + '_ {
        let root = self.root;
        self.in_neighbors
            .iter()
            .map(move |&n| SimpleDirectedEdge::new(n, root))
    }

    pub fn out_edges(&self) -> impl Iterator<Item = SimpleDirectedEdge> + '_ {
        let root = self.root;
        self.out_neighbors
            .iter()
            .map(move |&n| SimpleDirectedEdge::new(root, n))
    }

    pub fn in_degree(&self) -> usize {
        self.in_neighbors.len()
    }

    pub fn out_degree(&self) -> usize {
        self.out_neighbors.len()
    }
}

impl EdgeSet<SimpleDirectedEdge> for SparseDirectedEdgeSet {
    fn with_root(root: VertexId) -> Self {
        SparseDirectedEdgeSet {
            root,
            in_neighbors: IntSet::default(),
            out_neighbors: IntSet::default(),
        }
    }

    fn root(&self) -> VertexId {
        self.root
    }

    fn add(&mut self, edge: SimpleDirectedEdge) -> bool {
        if edge.from() == self.root {
            self.out_neighbors.insert(edge.to())
        } else if edge.to() == self.root {
            self.in_neighbors.insert(edge.from())
        } else {
            false
        }
    }

    fn remove(&mut self, edge: &SimpleDirectedEdge) -> bool {
        if edge.from() == self.root {
            self.out_neighbors.remove(&edge.to())
        } else if edge.to() == self.root {
            self.in_neighbors.remove(&edge.from())
        } else {
            false
        }
    }

    fn contains(&self, edge: &SimpleDirectedEdge) -> bool {
        if edge.from() == self.root {
            self.out_neighbors.contains(&edge.to())
        } else if edge.to() == self.root {
            self.in_neighbors.contains(&edge.from())
        } else {
            false
        }
    }

    fn connects(&self, vertex: VertexId) -> bool {
        self.out_neighbors.contains(&vertex) || self.in_neighbors.contains(&vertex)
    }

    fn neighbors(&self) -> Box<dyn Iterator<Item = VertexId> + '_> {
        // Reciprocal edges put a vertex in both sets; emit it once.
        Box::new(
            self.out_neighbors.iter().copied().chain(
                self.in_neighbors
                    .iter()
                    .filter(|v| !self.out_neighbors.contains(v))
                    .copied(),
            ),
        )
    }

    fn edges(&self) -> Box<dyn Iterator<Item = SimpleDirectedEdge> + '_> {
        Box::new(self.out_edges().chain(self.in_edges()))
    }

    fn unique_edges(&self) -> Box<dyn Iterator<Item = SimpleDirectedEdge> + '_> {
        // The from-side owns a directed edge during whole-graph enumeration.
        Box::new(self.out_edges())
    }

    fn edges_to(&self, vertex: VertexId) -> Vec<SimpleDirectedEdge> {
        let mut found = Vec::new();
        if self.out_neighbors.contains(&vertex) {
            found.push(SimpleDirectedEdge::new(self.root, vertex));
        }
        if vertex != self.root && self.in_neighbors.contains(&vertex) {
            found.push(SimpleDirectedEdge::new(vertex, self.root));
        }
        found
    }

    fn disconnect(&mut self, vertex: VertexId) -> usize {
        let mut removed = 0;
        if self.out_neighbors.remove(&vertex) {
            removed += 1;
        }
        if self.in_neighbors.remove(&vertex) {
            removed += 1;
        }
        removed
    }

    fn copy_subset(&self, vertices: &IntSet) -> Self {
        SparseDirectedEdgeSet {
            root: self.root,
            in_neighbors: self
                .in_neighbors
                .iter()
                .filter(|v| vertices.contains(v))
                .copied()
                .collect(),
            out_neighbors: self
                .out_neighbors
                .iter()
                .filter(|v| vertices.contains(v))
                .copied()
                .collect(),
        }
    }

    fn len(&self) -> usize {
        self.in_neighbors.len() + self.out_neighbors.len()
    }

    fn clear(&mut self) {
        self.in_neighbors.clear();
        self.out_neighbors.clear();
    }
}

/// Adjacency with one weight per neighbor. The neighbor id is the connection
/// slot: re-adding an existing pair rewrites the weight in place and reports
/// false, so graph-level edge counting stays untouched.
#[derive(Debug, Clone)]
pub struct SparseWeightedEdgeSet {
    root: VertexId,
    weights: IntMap<f64>,
}

impl SparseWeightedEdgeSet {
    fn other_endpoint(&self, edge: &SimpleWeightedEdge) -> Option<VertexId> {
        if edge.from() == self.root {
            Some(edge.to())
        } else if edge.to() == self.root {
            Some(edge.from())
        } else {
            None
        }
    }

    pub fn weight_to(&self, vertex: VertexId) -> Option<f64> {
        self.weights.get(&vertex).copied()
    }

    /// Total weight over all edges in the set.
    pub fn sum(&self) -> f64 {
        self.weights.values().sum()
    }
}

impl EdgeSet<SimpleWeightedEdge> for SparseWeightedEdgeSet {
    fn with_root(root: VertexId) -> Self {
        SparseWeightedEdgeSet {
            root,
            weights: IntMap::default(),
        }
    }

    fn root(&self) -> VertexId {
        self.root
    }

    fn add(&mut self, edge: SimpleWeightedEdge) -> bool {
        match self.other_endpoint(&edge) {
            Some(other) => self.weights.insert(other, edge.weight()).is_none(),
            None => false,
        }
    }

    fn remove(&mut self, edge: &SimpleWeightedEdge) -> bool {
        match self.other_endpoint(edge) {
            Some(other) => self.weights.remove(&other).is_some(),
            None => false,
        }
    }

    fn contains(&self, edge: &SimpleWeightedEdge) -> bool {
        // Membership requires the stored weight to match.
        self.other_endpoint(edge)
            .and_then(|other| self.weights.get(&other))
            .map(|w| w.to_bits() == edge.weight().to_bits())
            .unwrap_or(false)
    }

    fn connects(&self, vertex: VertexId) -> bool {
        self.weights.contains_key(&vertex)
    }

    fn neighbors(&self) -> Box<dyn Iterator<Item = VertexId> + '_> {
        Box::new(self.weights.keys().copied())
    }

    fn edges(&self) -> Box<dyn Iterator<Item = SimpleWeightedEdge> + '_> {
        let root = self.root;
        Box::new(
            self.weights
                .iter()
                .map(move |(&n, &w)| SimpleWeightedEdge::new(root, n, w)),
        )
    }

    fn unique_edges(&self) -> Box<dyn Iterator<Item = SimpleWeightedEdge> + '_> {
        let root = self.root;
        Box::new(
            self.weights
                .iter()
                .filter(move |(&n, _)| root <= n)
                .map(move |(&n, &w)| SimpleWeightedEdge::new(root, n, w)),
        )
    }

    fn edges_to(&self, vertex: VertexId) -> Vec<SimpleWeightedEdge> {
        match self.weights.get(&vertex) {
            Some(&w) => vec![SimpleWeightedEdge::new(self.root, vertex, w)],
            None => Vec::new(),
        }
    }

    fn disconnect(&mut self, vertex: VertexId) -> usize {
        if self.weights.remove(&vertex).is_some() {
            1
        } else {
            0
        }
    }

    fn copy_subset(&self, vertices: &IntSet) -> Self {
        SparseWeightedEdgeSet {
            root: self.root,
            weights: self
                .weights
                .iter()
                .filter(|(v, _)| vertices.contains(v))
                .map(|(&v, &w)| (v, w))
                .collect(),
        }
    }

    fn len(&self) -> usize {
        self.weights.len()
    }

    fn clear(&mut self) {
        self.weights.clear();
    }
}

/// Directed adjacency with one weight per (direction, neighbor) slot.
#[derive(Debug, Clone)]
pub struct SparseWeightedDirectedEdgeSet {
    root: VertexId,
    in_weights: IntMap<f64>,
    out_weights: IntMap<f64>,
}

impl SparseWeightedDirectedEdgeSet {
    pub fn in_degree(&self) -> usize {
        self.in_weights.len()
    }

    pub fn out_degree(&self) -> usize {
        self.out_weights.len()
    }

    pub fn in_edges(&self) -> impl Iterator<Item = SimpleWeightedDirectedEdge> + '_ {
        let root = self.root;
        self.in_weights
            .iter()
            .map(move |(&n, &w)| SimpleWeightedDirectedEdge::new(n, root, w))
    }

    pub fn out_edges(&self) -> impl Iterator<Item = SimpleWeightedDirectedEdge> + '_ {
        let root = self.root;
        self.out_weights
            .iter()
            .map(move |(&n, &w)| SimpleWeightedDirectedEdge::new(root, n, w))
    }

    /// Total weight over both directions.
    pub fn sum(&self) -> f64 {
        self.in_weights.values().sum::<f64>() + self.out_weights.values().sum::<f64>()
    }
}

impl EdgeSet<SimpleWeightedDirectedEdge> for SparseWeightedDirectedEdgeSet {
    fn with_root(root: VertexId) -> Self {
        SparseWeightedDirectedEdgeSet {
            root,
            in_weights: IntMap::default(),
            out_weights: IntMap::default(),
        }
    }

    fn root(&self) -> VertexId {
        self.root
    }

    fn add(&mut self, edge: SimpleWeightedDirectedEdge) -> bool {
        if edge.from() == self.root {
            self.out_weights.insert(edge.to(), edge.weight()).is_none()
        } else if edge.to() == self.root {
            self.in_weights.insert(edge.from(), edge.weight()).is_none()
        } else {
            false
        }
    }

    fn remove(&mut self, edge: &SimpleWeightedDirectedEdge) -> bool {
        if edge.from() == self.root {
            self.out_weights.remove(&edge.to()).is_some()
        } else if edge.to() == self.root {
            self.in_weights.remove(&edge.from()).is_some()
        } else {
            false
        }
    }

    fn contains(&self, edge: &SimpleWeightedDirectedEdge) -> bool {
        let stored = if edge.from() == self.root {
            self.out_weights.get(&edge.to())
        } else if edge.to() == self.root {
            self.in_weights.get(&edge.from())
        } else {
            None
        };
        stored
            .map(|w| w.to_bits() == edge.weight().to_bits())
            .unwrap_or(false)
    }

    fn connects(&self, vertex: VertexId) -> bool {
        self.out_weights.contains_key(&vertex) || self.in_weights.contains_key(&vertex)
    }

    fn neighbors(&self) -> Box<dyn Iterator<Item = VertexId> + '_> {
        Box::new(
            self.out_weights.keys().copied().chain(
                self.in_weights
                    .keys()
                    .filter(|v| !self.out_weights.contains_key(v))
                    .copied(),
            ),
        )
    }

    fn edges(&self) -> Box<dyn Iterator<Item = SimpleWeightedDirectedEdge> + '_> {
        Box::new(self.out_edges().chain(self.in_edges()))
    }

    fn unique_edges(&self) -> Box<dyn Iterator<Item = SimpleWeightedDirectedEdge> + '_> {
        Box::new(self.out_edges())
    }

    fn edges_to(&self, vertex: VertexId) -> Vec<SimpleWeightedDirectedEdge> {
        let mut found = Vec::new();
        if let Some(&w) = self.out_weights.get(&vertex) {
            found.push(SimpleWeightedDirectedEdge::new(self.root, vertex, w));
        }
        if vertex != self.root {
            if let Some(&w) = self.in_weights.get(&vertex) {
                found.push(SimpleWeightedDirectedEdge::new(vertex, self.root, w));
            }
        }
        found
    }

    fn disconnect(&mut self, vertex: VertexId) -> usize {
        let mut removed = 0;
        if self.out_weights.remove(&vertex).is_some() {
            removed += 1;
        }
        if self.in_weights.remove(&vertex).is_some() {
            removed += 1;
        }
        removed
    }

    fn copy_subset(&self, vertices: &IntSet) -> Self {
        SparseWeightedDirectedEdgeSet {
            root: self.root,
            in_weights: self
                .in_weights
                .iter()
                .filter(|(v, _)| vertices.contains(v))
                .map(|(&v, &w)| (v, w))
                .collect(),
            out_weights: self
                .out_weights
                .iter()
                .filter(|(v, _)| vertices.contains(v))
                .map(|(&v, &w)| (v, w))
                .collect(),
        }
    }

    fn len(&self) -> usize {
        self.in_weights.len() + self.out_weights.len()
    }

    fn clear(&mut self) {
        self.in_weights.clear();
        self.out_weights.clear();
    }
}

#[cfg(test)]
mod test_edge_set {
    use crate::edge_set::*;
    use crate::types::IntSet;

    #[test]
    fn test_undirected_add_either_orientation() {
        let mut set = SparseUndirectedEdgeSet::with_root(3);
        assert!(set.add(SimpleEdge::new(3, 7)));
        assert!(!set.add(SimpleEdge::new(7, 3)), "same undirected edge");
        assert!(set.contains(&SimpleEdge::new(7, 3)));
        assert!(set.connects(7));
        assert_eq!(set.len(), 1);

        // Not incident to the root: ignored, not an error.
        assert!(!set.add(SimpleEdge::new(1, 2)));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_undirected_disconnect_and_copy() {
        let mut set = SparseUndirectedEdgeSet::with_root(0);
        for n in 1..=4 {
            set.add(SimpleEdge::new(0, n));
        }
        assert_eq!(set.disconnect(2), 1);
        assert_eq!(set.disconnect(2), 0);
        assert_eq!(set.len(), 3);

        let keep: IntSet = [1, 3].into_iter().collect();
        let copy = set.copy_subset(&keep);
        assert_eq!(copy.len(), 2);
        assert!(copy.connects(1));
        assert!(!copy.connects(4));
        // The copy is independent.
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn test_unique_edges_take_smaller_root_side() {
        let mut low = SparseUndirectedEdgeSet::with_root(1);
        let mut high = SparseUndirectedEdgeSet::with_root(5);
        low.add(SimpleEdge::new(1, 5));
        high.add(SimpleEdge::new(1, 5));
        assert_eq!(low.unique_edges().count(), 1);
        assert_eq!(high.unique_edges().count(), 0);
    }

    #[test]
    fn test_directed_separates_in_and_out() {
        let mut set = SparseDirectedEdgeSet::with_root(2);
        assert!(set.add(SimpleDirectedEdge::new(2, 9)));
        assert!(set.add(SimpleDirectedEdge::new(9, 2)));
        assert_eq!(set.len(), 2);
        assert_eq!(set.out_degree(), 1);
        assert_eq!(set.in_degree(), 1);
        // The reciprocal pair is one neighbor.
        assert_eq!(set.neighbors().count(), 1);
        assert_eq!(set.edges_to(9).len(), 2);
        assert_eq!(set.unique_edges().count(), 1);
        assert_eq!(set.disconnect(9), 2);
        assert!(set.is_empty());
    }

    #[test]
    fn test_weighted_update_reports_false() {
        let mut set = SparseWeightedEdgeSet::with_root(0);
        assert!(set.add(SimpleWeightedEdge::new(0, 4, 1.0)));
        assert!(!set.add(SimpleWeightedEdge::new(0, 4, 2.5)));
        assert_eq!(set.len(), 1);
        assert_eq!(set.weight_to(4), Some(2.5));
        assert!(set.contains(&SimpleWeightedEdge::new(4, 0, 2.5)));
        assert!(!set.contains(&SimpleWeightedEdge::new(4, 0, 1.0)));
    }

    #[test]
    fn test_weighted_sum() {
        let mut set = SparseWeightedEdgeSet::with_root(0);
        set.add(SimpleWeightedEdge::new(0, 1, 1.5));
        set.add(SimpleWeightedEdge::new(0, 2, 2.0));
        set.add(SimpleWeightedEdge::new(3, 0, 0.5));
        assert!((set.sum() - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_weighted_directed_slots_per_direction() {
        let mut set = SparseWeightedDirectedEdgeSet::with_root(1);
        assert!(set.add(SimpleWeightedDirectedEdge::new(1, 2, 0.3)));
        assert!(set.add(SimpleWeightedDirectedEdge::new(2, 1, 0.7)));
        // Same direction, new weight: slot update only.
        assert!(!set.add(SimpleWeightedDirectedEdge::new(1, 2, 0.9)));
        assert_eq!(set.len(), 2);
        assert!(set.contains(&SimpleWeightedDirectedEdge::new(1, 2, 0.9)));
        assert!(set.contains(&SimpleWeightedDirectedEdge::new(2, 1, 0.7)));
        assert_eq!(set.edges_to(2).len(), 2);
    }

    #[test]
    fn test_self_loop_enumerated_once() {
        let mut set = SparseUndirectedEdgeSet::with_root(6);
        set.add(SimpleEdge::new(6, 6));
        assert_eq!(set.unique_edges().count(), 1);
        assert!(set.contains(&SimpleEdge::new(6, 6)));
    }
}
