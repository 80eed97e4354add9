use std::hash::Hash;
use std::sync::Arc;

use fixedbitset::FixedBitSet;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::edge_set::EdgeSet;
use crate::interner::TypeInterner;
use crate::types::{GraphEdge, IntMap, IntSet, SimpleTypedEdge, SimpleWeightedDirectedTypedEdge, TypedGraphEdge, VertexId, WeightedGraphEdge};

/// Extra surface of edge sets whose edges carry a type: parallel edges
/// between a vertex pair are allowed as long as their types differ.
pub trait TypedEdgeSet<T, E>: EdgeSet<E>
where
    T: Clone + Eq + Hash,
    E: TypedGraphEdge<T>,
{
    fn connects_with_type(&self, vertex: VertexId, edge_type: &T) -> bool;

    /// The distinct types present in the set.
    fn types(&self) -> FxHashSet<T>;

    fn edges_with_type(&self, edge_type: &T) -> Vec<E>;
}

/// Typed adjacency storing the type values directly: neighbor → set of
/// types. `len` counts (neighbor, type) pairs and is kept incrementally.
#[derive(Debug, Clone)]
pub struct SparseTypedEdgeSet<T> {
    root: VertexId,
    type_sets: IntMap<FxHashSet<T>>,
    size: usize,
}

impl<T: Clone + Eq + Hash> SparseTypedEdgeSet<T> {
    fn other_endpoint(&self, edge: &SimpleTypedEdge<T>) -> Option<VertexId> {
        if edge.from() == self.root {
            Some(edge.to())
        } else if edge.to() == self.root {
            Some(edge.from())
        } else {
            None
        }
    }
}

impl<T: Clone + Eq + Hash> EdgeSet<SimpleTypedEdge<T>> for SparseTypedEdgeSet<T> {
    fn with_root(root: VertexId) -> Self {
        SparseTypedEdgeSet {
            root,
            type_sets: IntMap::default(),
            size: 0,
        }
    }

    fn root(&self) -> VertexId {
        self.root
    }

    fn add(&mut self, edge: SimpleTypedEdge<T>) -> bool {
        let other = match self.other_endpoint(&edge) {
            Some(other) => other,
            None => return false,
        };
        let added = self
            .type_sets
            .entry(other)
            .or_default()
            .insert(edge.edge_type().clone());
        if added {
            self.size += 1;
        }
        added
    }

    fn remove(&mut self, edge: &SimpleTypedEdge<T>) -> bool {
        let other = match self.other_endpoint(edge) {
            Some(other) => other,
            None => return false,
        };
        match self.type_sets.get_mut(&other) {
            Some(types) => {
                if types.remove(edge.edge_type()) {
                    self.size -= 1;
                    if types.is_empty() {
                        self.type_sets.remove(&other);
                    }
                    true
                } else {
                    false
                }
            }
            None => false,
        }
    }

    fn contains(&self, edge: &SimpleTypedEdge<T>) -> bool {
        self.other_endpoint(edge)
            .and_then(|other| self.type_sets.get(&other))
            .map(|types| types.contains(edge.edge_type()))
            .unwrap_or(false)
    }

    fn connects(&self, vertex: VertexId) -> bool {
        self.type_sets.contains_key(&vertex)
    }

    fn neighbors(&self) -> Box<dyn Iterator<Item = VertexId> + '_> {
        Box::new(self.type_sets.keys().copied())
    }

    fn edges(&self) -> Box<dyn Iterator<Item = SimpleTypedEdge<T>> + '_> {
        let root = self.root;
        Box::new(self.type_sets.iter().flat_map(move |(&n, types)| {
            types
                .iter()
                .map(move |t| SimpleTypedEdge::new(t.clone(), root, n))
        }))
    }

    fn unique_edges(&self) -> Box<dyn Iterator<Item = SimpleTypedEdge<T>> + '_> {
        let root = self.root;
        Box::new(
            self.type_sets
                .iter()
                .filter(move |(&n, _)| root <= n)
                .flat_map(move |(&n, types)| {
                    types
                        .iter()
                        .map(move |t| SimpleTypedEdge::new(t.clone(), root, n))
                }),
        )
    }

    fn edges_to(&self, vertex: VertexId) -> Vec<SimpleTypedEdge<T>> {
        match self.type_sets.get(&vertex) {
            Some(types) => types
                .iter()
                .map(|t| SimpleTypedEdge::new(t.clone(), self.root, vertex))
                .collect(),
            None => Vec::new(),
        }
    }

    fn disconnect(&mut self, vertex: VertexId) -> usize {
        match self.type_sets.remove(&vertex) {
            Some(types) => {
                self.size -= types.len();
                types.len()
            }
            None => 0,
        }
    }

    fn copy_subset(&self, vertices: &IntSet) -> Self {
        let type_sets: IntMap<FxHashSet<T>> = self
            .type_sets
            .iter()
            .filter(|(v, _)| vertices.contains(v))
            .map(|(&v, types)| (v, types.clone()))
            .collect();
        let size = type_sets.values().map(|t| t.len()).sum();
        SparseTypedEdgeSet {
            root: self.root,
            type_sets,
            size,
        }
    }

    fn len(&self) -> usize {
        self.size
    }

    fn clear(&mut self) {
        self.type_sets.clear();
        self.size = 0;
    }
}

impl<T: Clone + Eq + Hash> TypedEdgeSet<T, SimpleTypedEdge<T>> for SparseTypedEdgeSet<T> {
    fn connects_with_type(&self, vertex: VertexId, edge_type: &T) -> bool {
        self.type_sets
            .get(&vertex)
            .map(|types| types.contains(edge_type))
            .unwrap_or(false)
    }

    fn types(&self) -> FxHashSet<T> {
        let mut all = FxHashSet::default();
        for types in self.type_sets.values() {
            all.extend(types.iter().cloned());
        }
        all
    }

    fn edges_with_type(&self, edge_type: &T) -> Vec<SimpleTypedEdge<T>> {
        self.type_sets
            .iter()
            .filter(|(_, types)| types.contains(edge_type))
            .map(|(&n, _)| SimpleTypedEdge::new(edge_type.clone(), self.root, n))
            .collect()
    }
}

/// Typed adjacency holding interned type indices in a bitset per neighbor,
/// trading type lookups for a much smaller footprint when many vertex pairs
/// share the same few types.
///
/// The interner is owned by the caller and shared through an `Arc`, so any
/// number of sets (and the graphs holding them) agree on the index of a
/// type. `with_root` makes a set with a private interner; use
/// `with_interner` to join an existing table.
#[derive(Debug, Clone)]
pub struct CompactSparseTypedEdgeSet<T> {
    root: VertexId,
    interner: Arc<TypeInterner<T>>,
    type_bits: IntMap<FixedBitSet>,
    size: usize,
}

impl<T: Clone + Eq + Hash> CompactSparseTypedEdgeSet<T> {
    pub fn with_interner(root: VertexId, interner: Arc<TypeInterner<T>>) -> Self {
        CompactSparseTypedEdgeSet {
            root,
            interner,
            type_bits: IntMap::default(),
            size: 0,
        }
    }

    pub fn interner(&self) -> &Arc<TypeInterner<T>> {
        &self.interner
    }

    fn other_endpoint(&self, edge: &SimpleTypedEdge<T>) -> Option<VertexId> {
        if edge.from() == self.root {
            Some(edge.to())
        } else if edge.to() == self.root {
            Some(edge.from())
        } else {
            None
        }
    }

    fn rebuild(root: VertexId, bits: &FixedBitSet, n: VertexId, interner: &TypeInterner<T>) -> Vec<SimpleTypedEdge<T>> {
        bits.ones()
            .filter_map(|idx| interner.resolve(idx as u32))
            .map(|t| SimpleTypedEdge::new(t, root, n))
            .collect()
    }
}

impl<T: Clone + Eq + Hash> EdgeSet<SimpleTypedEdge<T>> for CompactSparseTypedEdgeSet<T> {
    fn with_root(root: VertexId) -> Self {
        CompactSparseTypedEdgeSet::with_interner(root, Arc::new(TypeInterner::new()))
    }

    fn root(&self) -> VertexId {
        self.root
    }

    fn add(&mut self, edge: SimpleTypedEdge<T>) -> bool {
        let other = match self.other_endpoint(&edge) {
            Some(other) => other,
            None => return false,
        };
        let idx = self.interner.intern(edge.edge_type()) as usize;
        let bits = self
            .type_bits
            .entry(other)
            .or_insert_with(|| FixedBitSet::with_capacity(idx + 1));
        if bits.len() <= idx {
            bits.grow(idx + 1);
        }
        if bits.put(idx) {
            false
        } else {
            self.size += 1;
            true
        }
    }

    fn remove(&mut self, edge: &SimpleTypedEdge<T>) -> bool {
        let other = match self.other_endpoint(edge) {
            Some(other) => other,
            None => return false,
        };
        let idx = match self.interner.lookup(edge.edge_type()) {
            Some(idx) => idx as usize,
            None => return false,
        };
        match self.type_bits.get_mut(&other) {
            Some(bits) if bits.contains(idx) => {
                bits.set(idx, false);
                self.size -= 1;
                if bits.count_ones(..) == 0 {
                    self.type_bits.remove(&other);
                }
                true
            }
            _ => false,
        }
    }

    fn contains(&self, edge: &SimpleTypedEdge<T>) -> bool {
        let other = match self.other_endpoint(edge) {
            Some(other) => other,
            None => return false,
        };
        match self.interner.lookup(edge.edge_type()) {
            Some(idx) => self
                .type_bits
                .get(&other)
                .map(|bits| bits.contains(idx as usize))
                .unwrap_or(false),
            None => false,
        }
    }

    fn connects(&self, vertex: VertexId) -> bool {
        self.type_bits.contains_key(&vertex)
    }

    fn neighbors(&self) -> Box<dyn Iterator<Item = VertexId> + '_> {
        Box::new(self.type_bits.keys().copied())
    }

    fn edges(&self) -> Box<dyn Iterator<Item = SimpleTypedEdge<T>> + '_> {
        let root = self.root;
        let interner = &self.interner;
        Box::new(
            self.type_bits
                .iter()
                .flat_map(move |(&n, bits)| Self::rebuild(root, bits, n, interner)),
        )
    }

    fn unique_edges(&self) -> Box<dyn Iterator<Item = SimpleTypedEdge<T>> + '_> {
        let root = self.root;
        let interner = &self.interner;
        Box::new(
            self.type_bits
                .iter()
                .filter(move |(&n, _)| root <= n)
                .flat_map(move |(&n, bits)| Self::rebuild(root, bits, n, interner)),
        )
    }

    fn edges_to(&self, vertex: VertexId) -> Vec<SimpleTypedEdge<T>> {
        match self.type_bits.get(&vertex) {
            Some(bits) => Self::rebuild(self.root, bits, vertex, &self.interner),
            None => Vec::new(),
        }
    }

    fn disconnect(&mut self, vertex: VertexId) -> usize {
        match self.type_bits.remove(&vertex) {
            Some(bits) => {
                let removed = bits.count_ones(..);
                self.size -= removed;
                removed
            }
            None => 0,
        }
    }

    fn copy_subset(&self, vertices: &IntSet) -> Self {
        let type_bits: IntMap<FixedBitSet> = self
            .type_bits
            .iter()
            .filter(|(v, _)| vertices.contains(v))
            .map(|(&v, bits)| (v, bits.clone()))
            .collect();
        let size = type_bits.values().map(|bits| bits.count_ones(..)).sum();
        CompactSparseTypedEdgeSet {
            root: self.root,
            interner: Arc::clone(&self.interner),
            type_bits,
            size,
        }
    }

    fn len(&self) -> usize {
        self.size
    }

    fn clear(&mut self) {
        self.type_bits.clear();
        self.size = 0;
    }
}

impl<T: Clone + Eq + Hash> TypedEdgeSet<T, SimpleTypedEdge<T>> for CompactSparseTypedEdgeSet<T> {
    fn connects_with_type(&self, vertex: VertexId, edge_type: &T) -> bool {
        match self.interner.lookup(edge_type) {
            Some(idx) => self
                .type_bits
                .get(&vertex)
                .map(|bits| bits.contains(idx as usize))
                .unwrap_or(false),
            None => false,
        }
    }

    fn types(&self) -> FxHashSet<T> {
        let mut indices = FxHashSet::default();
        for bits in self.type_bits.values() {
            indices.extend(bits.ones());
        }
        indices
            .into_iter()
            .filter_map(|idx| self.interner.resolve(idx as u32))
            .collect()
    }

    fn edges_with_type(&self, edge_type: &T) -> Vec<SimpleTypedEdge<T>> {
        let idx = match self.interner.lookup(edge_type) {
            Some(idx) => idx as usize,
            None => return Vec::new(),
        };
        self.type_bits
            .iter()
            .filter(|(_, bits)| bits.contains(idx))
            .map(|(&n, _)| SimpleTypedEdge::new(edge_type.clone(), self.root, n))
            .collect()
    }
}

/// Directed typed adjacency with a weight slot per (direction, neighbor,
/// type). Both directions between a pair may coexist, each holding any
/// number of differently typed slots.
#[derive(Debug, Clone)]
pub struct SparseWeightedDirectedTypedEdgeSet<T> {
    root: VertexId,
    in_slots: IntMap<FxHashMap<T, f64>>,
    out_slots: IntMap<FxHashMap<T, f64>>,
    size: usize,
}

impl<T: Clone + Eq + Hash> SparseWeightedDirectedTypedEdgeSet<T> {
    pub fn in_degree(&self) -> usize {
        self.in_slots.values().map(|slots| slots.len()).sum()
    }

    pub fn out_degree(&self) -> usize {
        self.out_slots.values().map(|slots| slots.len()).sum()
    }

    pub fn in_edges(&self) -> impl Iterator<Item = SimpleWeightedDirectedTypedEdge<T>> + '_ {
        let root = self.root;
        self.in_slots.iter().flat_map(move |(&n, slots)| {
            slots
                .iter()
                .map(move |(t, &w)| SimpleWeightedDirectedTypedEdge::new(t.clone(), n, root, w))
        })
    }

    pub fn out_edges(&self) -> impl Iterator<Item = SimpleWeightedDirectedTypedEdge<T>> + '_ {
        let root = self.root;
        self.out_slots.iter().flat_map(move |(&n, slots)| {
            slots
                .iter()
                .map(move |(t, &w)| SimpleWeightedDirectedTypedEdge::new(t.clone(), root, n, w))
        })
    }

    /// Total weight over every slot in both directions.
    pub fn sum(&self) -> f64 {
        self.in_slots
            .values()
            .chain(self.out_slots.values())
            .flat_map(|slots| slots.values())
            .sum()
    }
}

impl<T: Clone + Eq + Hash> EdgeSet<SimpleWeightedDirectedTypedEdge<T>>
    for SparseWeightedDirectedTypedEdgeSet<T>
{
    fn with_root(root: VertexId) -> Self {
        SparseWeightedDirectedTypedEdgeSet {
            root,
            in_slots: IntMap::default(),
            out_slots: IntMap::default(),
            size: 0,
        }
    }

    fn root(&self) -> VertexId {
        self.root
    }

    fn add(&mut self, edge: SimpleWeightedDirectedTypedEdge<T>) -> bool {
        let (slots, other) = if edge.from() == self.root {
            (&mut self.out_slots, edge.to())
        } else if edge.to() == self.root {
            (&mut self.in_slots, edge.from())
        } else {
            return false;
        };
        let fresh = slots
            .entry(other)
            .or_default()
            .insert(edge.edge_type().clone(), edge.weight())
            .is_none();
        if fresh {
            self.size += 1;
        }
        fresh
    }

    fn remove(&mut self, edge: &SimpleWeightedDirectedTypedEdge<T>) -> bool {
        let (slots, other) = if edge.from() == self.root {
            (&mut self.out_slots, edge.to())
        } else if edge.to() == self.root {
            (&mut self.in_slots, edge.from())
        } else {
            return false;
        };
        match slots.get_mut(&other) {
            Some(typed) => {
                if typed.remove(edge.edge_type()).is_some() {
                    self.size -= 1;
                    if typed.is_empty() {
                        slots.remove(&other);
                    }
                    true
                } else {
                    false
                }
            }
            None => false,
        }
    }

    fn contains(&self, edge: &SimpleWeightedDirectedTypedEdge<T>) -> bool {
        let (slots, other) = if edge.from() == self.root {
            (&self.out_slots, edge.to())
        } else if edge.to() == self.root {
            (&self.in_slots, edge.from())
        } else {
            return false;
        };
        slots
            .get(&other)
            .and_then(|typed| typed.get(edge.edge_type()))
            .map(|w| w.to_bits() == edge.weight().to_bits())
            .unwrap_or(false)
    }

    fn connects(&self, vertex: VertexId) -> bool {
        self.out_slots.contains_key(&vertex) || self.in_slots.contains_key(&vertex)
    }

    fn neighbors(&self) -> Box<dyn Iterator<Item = VertexId> + '_> {
        Box::new(
            self.out_slots.keys().copied().chain(
                self.in_slots
                    .keys()
                    .filter(|v| !self.out_slots.contains_key(v))
                    .copied(),
            ),
        )
    }

    fn edges(&self) -> Box<dyn Iterator<Item = SimpleWeightedDirectedTypedEdge<T>> + '_> {
        Box::new(self.out_edges().chain(self.in_edges()))
    }

    fn unique_edges(&self) -> Box<dyn Iterator<Item = SimpleWeightedDirectedTypedEdge<T>> + '_> {
        Box::new(self.out_edges())
    }

    fn edges_to(&self, vertex: VertexId) -> Vec<SimpleWeightedDirectedTypedEdge<T>> {
        let mut found = Vec::new();
        if let Some(slots) = self.out_slots.get(&vertex) {
            for (t, &w) in slots {
                found.push(SimpleWeightedDirectedTypedEdge::new(
                    t.clone(),
                    self.root,
                    vertex,
                    w,
                ));
            }
        }
        if vertex != self.root {
            if let Some(slots) = self.in_slots.get(&vertex) {
                for (t, &w) in slots {
                    found.push(SimpleWeightedDirectedTypedEdge::new(
                        t.clone(),
                        vertex,
                        self.root,
                        w,
                    ));
                }
            }
        }
        found
    }

    fn disconnect(&mut self, vertex: VertexId) -> usize {
        let mut removed = 0;
        if let Some(slots) = self.out_slots.remove(&vertex) {
            removed += slots.len();
        }
        if let Some(slots) = self.in_slots.remove(&vertex) {
            removed += slots.len();
        }
        self.size -= removed;
        removed
    }

    fn copy_subset(&self, vertices: &IntSet) -> Self {
        let in_slots: IntMap<FxHashMap<T, f64>> = self
            .in_slots
            .iter()
            .filter(|(v, _)| vertices.contains(v))
            .map(|(&v, slots)| (v, slots.clone()))
            .collect();
        let out_slots: IntMap<FxHashMap<T, f64>> = self
            .out_slots
            .iter()
            .filter(|(v, _)| vertices.contains(v))
            .map(|(&v, slots)| (v, slots.clone()))
            .collect();
        let size = in_slots
            .values()
            .chain(out_slots.values())
            .map(|slots| slots.len())
            .sum();
        SparseWeightedDirectedTypedEdgeSet {
            root: self.root,
            in_slots,
            out_slots,
            size,
        }
    }

    fn len(&self) -> usize {
        self.size
    }

    fn clear(&mut self) {
        self.in_slots.clear();
        self.out_slots.clear();
        self.size = 0;
    }
}

impl<T: Clone + Eq + Hash> TypedEdgeSet<T, SimpleWeightedDirectedTypedEdge<T>>
    for SparseWeightedDirectedTypedEdgeSet<T>
{
    fn connects_with_type(&self, vertex: VertexId, edge_type: &T) -> bool {
        let holds = |slots: &IntMap<FxHashMap<T, f64>>| {
            slots
                .get(&vertex)
                .map(|typed| typed.contains_key(edge_type))
                .unwrap_or(false)
        };
        holds(&self.out_slots) || holds(&self.in_slots)
    }

    fn types(&self) -> FxHashSet<T> {
        let mut all = FxHashSet::default();
        for slots in self.in_slots.values().chain(self.out_slots.values()) {
            all.extend(slots.keys().cloned());
        }
        all
    }

    fn edges_with_type(&self, edge_type: &T) -> Vec<SimpleWeightedDirectedTypedEdge<T>> {
        let mut found = Vec::new();
        for (&n, slots) in &self.out_slots {
            if let Some(&w) = slots.get(edge_type) {
                found.push(SimpleWeightedDirectedTypedEdge::new(
                    edge_type.clone(),
                    self.root,
                    n,
                    w,
                ));
            }
        }
        for (&n, slots) in &self.in_slots {
            if let Some(&w) = slots.get(edge_type) {
                found.push(SimpleWeightedDirectedTypedEdge::new(
                    edge_type.clone(),
                    n,
                    self.root,
                    w,
                ));
            }
        }
        found
    }
}

#[cfg(test)]
mod test_typed_edge_set {
    use std::sync::Arc;

    use crate::interner::TypeInterner;
    use crate::typed_edge_set::*;

    #[test]
    fn test_parallel_edges_by_type() {
        let mut set: SparseTypedEdgeSet<&str> = SparseTypedEdgeSet::with_root(0);
        assert!(set.add(SimpleTypedEdge::new("follows", 0, 3)));
        assert!(set.add(SimpleTypedEdge::new("blocks", 3, 0)));
        assert!(!set.add(SimpleTypedEdge::new("follows", 3, 0)), "duplicate type");
        assert_eq!(set.len(), 2);
        assert_eq!(set.neighbors().count(), 1);
        assert_eq!(set.edges_to(3).len(), 2);
    }

    #[test]
    fn test_removing_last_type_drops_neighbor() {
        let mut set: SparseTypedEdgeSet<&str> = SparseTypedEdgeSet::with_root(1);
        set.add(SimpleTypedEdge::new("a", 1, 2));
        set.add(SimpleTypedEdge::new("b", 1, 2));
        assert!(set.remove(&SimpleTypedEdge::new("a", 2, 1)));
        assert!(set.connects(2));
        assert!(set.remove(&SimpleTypedEdge::new("b", 1, 2)));
        assert!(!set.connects(2));
        assert!(set.is_empty());
    }

    #[test]
    fn test_types_and_typed_queries() {
        let mut set: SparseTypedEdgeSet<&str> = SparseTypedEdgeSet::with_root(5);
        set.add(SimpleTypedEdge::new("x", 5, 1));
        set.add(SimpleTypedEdge::new("x", 5, 2));
        set.add(SimpleTypedEdge::new("y", 5, 2));
        let types = set.types();
        assert_eq!(types.len(), 2);
        assert!(set.connects_with_type(2, &"y"));
        assert!(!set.connects_with_type(1, &"y"));
        assert_eq!(set.edges_with_type(&"x").len(), 2);
    }

    #[test]
    fn test_compact_set_shares_interned_indices() {
        let interner = Arc::new(TypeInterner::new());
        let mut a: CompactSparseTypedEdgeSet<String> =
            CompactSparseTypedEdgeSet::with_interner(0, Arc::clone(&interner));
        let mut b: CompactSparseTypedEdgeSet<String> =
            CompactSparseTypedEdgeSet::with_interner(9, Arc::clone(&interner));

        a.add(SimpleTypedEdge::new("red".to_string(), 0, 9));
        b.add(SimpleTypedEdge::new("red".to_string(), 0, 9));
        b.add(SimpleTypedEdge::new("blue".to_string(), 9, 4));
        println!("interned types: {}", interner.len());
        assert_eq!(interner.len(), 2);

        assert!(a.contains(&SimpleTypedEdge::new("red".to_string(), 9, 0)));
        assert!(b.connects_with_type(0, &"red".to_string()));
        assert_eq!(b.len(), 2);

        // Both owning sets hold the edge; enumeration takes the smaller root.
        assert_eq!(a.unique_edges().count(), 1);
        assert_eq!(b.unique_edges().count(), 0, "9 is the larger endpoint of both");
    }

    #[test]
    fn test_compact_remove_and_counters() {
        let mut set: CompactSparseTypedEdgeSet<&str> = CompactSparseTypedEdgeSet::with_root(2);
        set.add(SimpleTypedEdge::new("a", 2, 7));
        set.add(SimpleTypedEdge::new("b", 2, 7));
        set.add(SimpleTypedEdge::new("a", 2, 8));
        assert_eq!(set.len(), 3);

        assert!(set.remove(&SimpleTypedEdge::new("a", 7, 2)));
        assert_eq!(set.len(), 2);
        assert!(set.connects(7));
        assert!(set.remove(&SimpleTypedEdge::new("b", 2, 7)));
        assert!(!set.connects(7));

        assert!(!set.remove(&SimpleTypedEdge::new("never-seen", 2, 8)));
        assert_eq!(set.disconnect(8), 1);
        assert!(set.is_empty());
    }

    #[test]
    fn test_compact_copy_keeps_interner_and_size() {
        let mut set: CompactSparseTypedEdgeSet<&str> = CompactSparseTypedEdgeSet::with_root(0);
        for n in 1..=4 {
            set.add(SimpleTypedEdge::new("t", 0, n));
        }
        set.add(SimpleTypedEdge::new("u", 0, 1));

        let keep: IntSet = [1, 2].into_iter().collect();
        let copy = set.copy_subset(&keep);
        assert_eq!(copy.len(), 3);
        assert!(Arc::ptr_eq(set.interner(), copy.interner()));
    }

    #[test]
    fn test_weighted_directed_typed_slots() {
        let mut set: SparseWeightedDirectedTypedEdgeSet<&str> =
            SparseWeightedDirectedTypedEdgeSet::with_root(1);
        assert!(set.add(SimpleWeightedDirectedTypedEdge::new("t", 1, 2, 0.5)));
        assert!(set.add(SimpleWeightedDirectedTypedEdge::new("t", 2, 1, 0.25)));
        assert!(set.add(SimpleWeightedDirectedTypedEdge::new("u", 1, 2, 1.0)));
        // Same (direction, neighbor, type): weight rewrite only.
        assert!(!set.add(SimpleWeightedDirectedTypedEdge::new("t", 1, 2, 2.0)));

        assert_eq!(set.len(), 3);
        assert_eq!(set.out_degree(), 2);
        assert_eq!(set.in_degree(), 1);
        assert!(set.contains(&SimpleWeightedDirectedTypedEdge::new("t", 1, 2, 2.0)));
        assert!(!set.contains(&SimpleWeightedDirectedTypedEdge::new("t", 1, 2, 0.5)));
        assert_eq!(set.edges_to(2).len(), 3);
        assert!((set.sum() - 3.25).abs() < 1e-12);
        assert_eq!(set.neighbors().count(), 1);

        assert_eq!(set.disconnect(2), 3);
        assert!(set.is_empty());
    }

    #[test]
    fn test_weighted_directed_typed_type_queries() {
        let mut set: SparseWeightedDirectedTypedEdgeSet<&str> =
            SparseWeightedDirectedTypedEdgeSet::with_root(0);
        set.add(SimpleWeightedDirectedTypedEdge::new("a", 0, 1, 1.0));
        set.add(SimpleWeightedDirectedTypedEdge::new("b", 2, 0, 1.5));
        assert!(set.connects_with_type(1, &"a"));
        assert!(set.connects_with_type(2, &"b"));
        assert!(!set.connects_with_type(1, &"b"));
        assert_eq!(set.types().len(), 2);
        assert_eq!(set.edges_with_type(&"a").len(), 1);
    }
}
