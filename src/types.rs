use std::fmt;
use std::fmt::{Display, Formatter};
use std::hash::{Hash, Hasher};

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

/// Vertex identifier, unique in one graph, usually allocated densely from 0.
pub type VertexId = u32;

pub type IntSet = FxHashSet<VertexId>;
pub type IntMap<V> = FxHashMap<VertexId, V>;

// Define the capability traits of edge values. Every edge fixes its two
// endpoints at construction; reorientation always builds a new value.
pub trait GraphEdge: Clone + Eq + Hash {
    /// Whether equality of this edge flavor is orientation sensitive.
    const DIRECTED: bool;

    fn from(&self) -> VertexId;

    fn to(&self) -> VertexId;

    /// A new edge with the endpoints swapped.
    fn flipped(&self) -> Self;

    /// A new edge of the same flavor connecting different endpoints.
    fn with_endpoints(&self, from: VertexId, to: VertexId) -> Self;

    /// The endpoint that is not `v`, or `v` itself for a self loop.
    fn other(&self, v: VertexId) -> VertexId {
        if self.from() == v { self.to() } else { self.from() }
    }

    fn is_self_loop(&self) -> bool {
        self.from() == self.to()
    }
}

/// Marker for edge flavors whose orientation carries meaning.
pub trait DirectedGraphEdge: GraphEdge {
    /// The origin of the edge.
    fn tail(&self) -> VertexId {
        self.from()
    }

    /// The destination of the edge.
    fn head(&self) -> VertexId {
        self.to()
    }
}

pub trait WeightedGraphEdge: GraphEdge {
    fn weight(&self) -> f64;

    /// The same connection carrying a different weight.
    fn with_weight(&self, weight: f64) -> Self;
}

pub trait TypedGraphEdge<T>: GraphEdge {
    fn edge_type(&self) -> &T;
}

/// An undirected edge, nothing but its two endpoints. Equality and hashing
/// ignore orientation, so (2, 5) and (5, 2) are the same edge.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SimpleEdge {
    from: VertexId,
    to: VertexId,
}

impl SimpleEdge {
    pub fn new(from: VertexId, to: VertexId) -> Self {
        SimpleEdge { from, to }
    }

    // Endpoints in ascending order, the canonical form for undirected keys.
    pub fn ordered(&self) -> (VertexId, VertexId) {
        if self.from <= self.to {
            (self.from, self.to)
        } else {
            (self.to, self.from)
        }
    }
}

impl GraphEdge for SimpleEdge {
    const DIRECTED: bool = false;

    fn from(&self) -> VertexId {
        self.from
    }

    fn to(&self) -> VertexId {
        self.to
    }

    fn flipped(&self) -> Self {
        SimpleEdge::new(self.to, self.from)
    }

    fn with_endpoints(&self, from: VertexId, to: VertexId) -> Self {
        SimpleEdge::new(from, to)
    }
}

impl PartialEq for SimpleEdge {
    fn eq(&self, other: &Self) -> bool {
        self.ordered() == other.ordered()
    }
}

impl Eq for SimpleEdge {}

impl Hash for SimpleEdge {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.ordered().hash(state);
    }
}

impl Display for SimpleEdge {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "({}<->{})", self.from, self.to)
    }
}

/// A directed edge. Equality respects orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SimpleDirectedEdge {
    from: VertexId,
    to: VertexId,
}

impl SimpleDirectedEdge {
    pub fn new(from: VertexId, to: VertexId) -> Self {
        SimpleDirectedEdge { from, to }
    }
}

impl GraphEdge for SimpleDirectedEdge {
    const DIRECTED: bool = true;

    fn from(&self) -> VertexId {
        self.from
    }

    fn to(&self) -> VertexId {
        self.to
    }

    fn flipped(&self) -> Self {
        SimpleDirectedEdge::new(self.to, self.from)
    }

    fn with_endpoints(&self, from: VertexId, to: VertexId) -> Self {
        SimpleDirectedEdge::new(from, to)
    }
}

impl DirectedGraphEdge for SimpleDirectedEdge {}

impl Display for SimpleDirectedEdge {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "({}->{})", self.from, self.to)
    }
}

/// An undirected weighted edge. The endpoint pair identifies the connection
/// slot; the weight takes part in equality, and NaN weights compare by bit
/// pattern.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SimpleWeightedEdge {
    from: VertexId,
    to: VertexId,
    weight: f64,
}

impl SimpleWeightedEdge {
    pub fn new(from: VertexId, to: VertexId, weight: f64) -> Self {
        SimpleWeightedEdge { from, to, weight }
    }

    pub fn ordered(&self) -> (VertexId, VertexId) {
        if self.from <= self.to {
            (self.from, self.to)
        } else {
            (self.to, self.from)
        }
    }
}

impl GraphEdge for SimpleWeightedEdge {
    const DIRECTED: bool = false;

    fn from(&self) -> VertexId {
        self.from
    }

    fn to(&self) -> VertexId {
        self.to
    }

    fn flipped(&self) -> Self {
        SimpleWeightedEdge::new(self.to, self.from, self.weight)
    }

    fn with_endpoints(&self, from: VertexId, to: VertexId) -> Self {
        SimpleWeightedEdge::new(from, to, self.weight)
    }
}

impl WeightedGraphEdge for SimpleWeightedEdge {
    fn weight(&self) -> f64 {
        self.weight
    }

    fn with_weight(&self, weight: f64) -> Self {
        SimpleWeightedEdge::new(self.from, self.to, weight)
    }
}

impl PartialEq for SimpleWeightedEdge {
    fn eq(&self, other: &Self) -> bool {
        self.ordered() == other.ordered()
            && self.weight.to_bits() == other.weight.to_bits()
    }
}

impl Eq for SimpleWeightedEdge {}

impl Hash for SimpleWeightedEdge {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.ordered().hash(state);
        self.weight.to_bits().hash(state);
    }
}

impl Display for SimpleWeightedEdge {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "({}<->{}, w={})", self.from, self.to, self.weight)
    }
}

/// A directed weighted edge.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SimpleWeightedDirectedEdge {
    from: VertexId,
    to: VertexId,
    weight: f64,
}

impl SimpleWeightedDirectedEdge {
    pub fn new(from: VertexId, to: VertexId, weight: f64) -> Self {
        SimpleWeightedDirectedEdge { from, to, weight }
    }
}

impl GraphEdge for SimpleWeightedDirectedEdge {
    const DIRECTED: bool = true;

    fn from(&self) -> VertexId {
        self.from
    }

    fn to(&self) -> VertexId {
        self.to
    }

    fn flipped(&self) -> Self {
        SimpleWeightedDirectedEdge::new(self.to, self.from, self.weight)
    }

    fn with_endpoints(&self, from: VertexId, to: VertexId) -> Self {
        SimpleWeightedDirectedEdge::new(from, to, self.weight)
    }
}

impl DirectedGraphEdge for SimpleWeightedDirectedEdge {}

impl WeightedGraphEdge for SimpleWeightedDirectedEdge {
    fn weight(&self) -> f64 {
        self.weight
    }

    fn with_weight(&self, weight: f64) -> Self {
        SimpleWeightedDirectedEdge::new(self.from, self.to, weight)
    }
}

impl PartialEq for SimpleWeightedDirectedEdge {
    fn eq(&self, other: &Self) -> bool {
        self.from == other.from
            && self.to == other.to
            && self.weight.to_bits() == other.weight.to_bits()
    }
}

impl Eq for SimpleWeightedDirectedEdge {}

impl Hash for SimpleWeightedDirectedEdge {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.from.hash(state);
        self.to.hash(state);
        self.weight.to_bits().hash(state);
    }
}

impl Display for SimpleWeightedDirectedEdge {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "({}->{}, w={})", self.from, self.to, self.weight)
    }
}

/// An undirected edge carrying an opaque type value. Two typed edges are
/// equal when they connect the same unordered pair with the same type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimpleTypedEdge<T> {
    from: VertexId,
    to: VertexId,
    edge_type: T,
}

impl<T: Clone + Eq + Hash> SimpleTypedEdge<T> {
    pub fn new(edge_type: T, from: VertexId, to: VertexId) -> Self {
        SimpleTypedEdge { from, to, edge_type }
    }

    pub fn ordered(&self) -> (VertexId, VertexId) {
        if self.from <= self.to {
            (self.from, self.to)
        } else {
            (self.to, self.from)
        }
    }
}

impl<T: Clone + Eq + Hash> GraphEdge for SimpleTypedEdge<T> {
    const DIRECTED: bool = false;

    fn from(&self) -> VertexId {
        self.from
    }

    fn to(&self) -> VertexId {
        self.to
    }

    fn flipped(&self) -> Self {
        SimpleTypedEdge::new(self.edge_type.clone(), self.to, self.from)
    }

    fn with_endpoints(&self, from: VertexId, to: VertexId) -> Self {
        SimpleTypedEdge::new(self.edge_type.clone(), from, to)
    }
}

impl<T: Clone + Eq + Hash> TypedGraphEdge<T> for SimpleTypedEdge<T> {
    fn edge_type(&self) -> &T {
        &self.edge_type
    }
}

impl<T: Clone + Eq + Hash> PartialEq for SimpleTypedEdge<T> {
    fn eq(&self, other: &Self) -> bool {
        self.ordered() == other.ordered() && self.edge_type == other.edge_type
    }
}

impl<T: Clone + Eq + Hash> Eq for SimpleTypedEdge<T> {}

impl<T: Clone + Eq + Hash> Hash for SimpleTypedEdge<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.ordered().hash(state);
        self.edge_type.hash(state);
    }
}

impl<T: Display + Clone + Eq + Hash> Display for SimpleTypedEdge<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "({}<-[{}]->{})", self.from, self.edge_type, self.to)
    }
}

/// A directed typed edge with a weight. The (orientation, type) pair
/// identifies the connection slot inside weighted typed edge sets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimpleWeightedDirectedTypedEdge<T> {
    from: VertexId,
    to: VertexId,
    edge_type: T,
    weight: f64,
}

impl<T: Clone + Eq + Hash> SimpleWeightedDirectedTypedEdge<T> {
    pub fn new(edge_type: T, from: VertexId, to: VertexId, weight: f64) -> Self {
        SimpleWeightedDirectedTypedEdge { from, to, edge_type, weight }
    }
}

impl<T: Clone + Eq + Hash> GraphEdge for SimpleWeightedDirectedTypedEdge<T> {
    const DIRECTED: bool = true;

    fn from(&self) -> VertexId {
        self.from
    }

    fn to(&self) -> VertexId {
        self.to
    }

    fn flipped(&self) -> Self {
        SimpleWeightedDirectedTypedEdge::new(
            self.edge_type.clone(),
            self.to,
            self.from,
            self.weight,
        )
    }

    fn with_endpoints(&self, from: VertexId, to: VertexId) -> Self {
        SimpleWeightedDirectedTypedEdge::new(self.edge_type.clone(), from, to, self.weight)
    }
}

impl<T: Clone + Eq + Hash> DirectedGraphEdge for SimpleWeightedDirectedTypedEdge<T> {}

impl<T: Clone + Eq + Hash> TypedGraphEdge<T> for SimpleWeightedDirectedTypedEdge<T> {
    fn edge_type(&self) -> &T {
        &self.edge_type
    }
}

impl<T: Clone + Eq + Hash> WeightedGraphEdge for SimpleWeightedDirectedTypedEdge<T> {
    fn weight(&self) -> f64 {
        self.weight
    }

    fn with_weight(&self, weight: f64) -> Self {
        SimpleWeightedDirectedTypedEdge::new(
            self.edge_type.clone(),
            self.from,
            self.to,
            weight,
        )
    }
}

impl<T: Clone + Eq + Hash> PartialEq for SimpleWeightedDirectedTypedEdge<T> {
    fn eq(&self, other: &Self) -> bool {
        self.from == other.from
            && self.to == other.to
            && self.edge_type == other.edge_type
            && self.weight.to_bits() == other.weight.to_bits()
    }
}

impl<T: Clone + Eq + Hash> Eq for SimpleWeightedDirectedTypedEdge<T> {}

impl<T: Clone + Eq + Hash> Hash for SimpleWeightedDirectedTypedEdge<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.from.hash(state);
        self.to.hash(state);
        self.edge_type.hash(state);
        self.weight.to_bits().hash(state);
    }
}

impl<T: Display + Clone + Eq + Hash> Display for SimpleWeightedDirectedTypedEdge<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}-[{}, w={}]->{})",
            self.from, self.edge_type, self.weight, self.to
        )
    }
}

#[cfg(test)]
mod test_types {
    use std::collections::HashSet;

    use crate::types::*;

    #[test]
    fn test_undirected_orientation_blind() {
        let e1 = SimpleEdge::new(2, 5);
        let e2 = SimpleEdge::new(5, 2);
        assert_eq!(e1, e2);

        let mut set = HashSet::new();
        set.insert(e1);
        assert!(set.contains(&e2));
        println!("undirected edge set: {:?}", set);
    }

    #[test]
    fn test_directed_orientation_sensitive() {
        let e1 = SimpleDirectedEdge::new(2, 5);
        let e2 = SimpleDirectedEdge::new(5, 2);
        assert_ne!(e1, e2);
        assert_eq!(e1.flipped(), e2);
        assert_eq!(e1.head(), 5);
        assert_eq!(e1.tail(), 2);
    }

    #[test]
    fn test_flip_and_reendpoint_build_new_values() {
        let e = SimpleWeightedEdge::new(1, 2, 0.5);
        let f = e.flipped();
        assert_eq!(e.from(), f.to());
        assert_eq!(e.weight(), f.weight());

        let moved = e.with_endpoints(7, 9);
        assert_eq!((moved.from(), moved.to()), (7, 9));
        assert_eq!(moved.weight(), 0.5);
        // The source value is untouched.
        assert_eq!((e.from(), e.to()), (1, 2));
    }

    #[test]
    fn test_weight_takes_part_in_equality() {
        let e1 = SimpleWeightedEdge::new(1, 2, 0.5);
        let e2 = SimpleWeightedEdge::new(2, 1, 0.5);
        let e3 = SimpleWeightedEdge::new(1, 2, 0.75);
        assert_eq!(e1, e2);
        assert_ne!(e1, e3);
    }

    #[test]
    fn test_typed_equality_includes_type() {
        let a = SimpleTypedEdge::new("follows", 0, 1);
        let b = SimpleTypedEdge::new("follows", 1, 0);
        let c = SimpleTypedEdge::new("blocks", 0, 1);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(*a.edge_type(), "follows");
    }

    #[test]
    fn test_other_endpoint() {
        let e = SimpleEdge::new(3, 9);
        assert_eq!(e.other(3), 9);
        assert_eq!(e.other(9), 3);
        let loop_edge = SimpleEdge::new(4, 4);
        assert_eq!(loop_edge.other(4), 4);
        assert!(loop_edge.is_self_loop());
    }
}
