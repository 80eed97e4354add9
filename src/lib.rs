#![forbid(unsafe_code)]

//! In-memory sparse graph engine with overlapping community detection.
//!
//! Graphs hold `u32` vertex ids in a sorted vertex table, with every edge
//! stored by both endpoints so incident lookups never scan. On top of the
//! core [`SparseGraph`] and the typed [`UndirectedMultigraph`] sit the
//! clustering algorithms: Chinese Whispers label propagation and the
//! overlapping link clustering family, plus RAND-ESU subgraph sampling and
//! degree-preserving randomization for motif significance testing.

pub mod clustering;
mod config;
pub mod deadline;
pub mod edge_set;
pub mod graph;
pub mod interner;
pub mod logger;
pub mod multigraph;
pub mod sampling;
pub mod typed_edge_set;
pub mod types;
pub mod util;

pub use clustering::chinese_whispers::ChineseWhispers;
pub use clustering::link_clustering::{LinkClustering, WeightedLinkClustering};
pub use clustering::Assignment;
pub use deadline::CancelToken;
pub use edge_set::{
    EdgeSet, SparseDirectedEdgeSet, SparseUndirectedEdgeSet, SparseWeightedDirectedEdgeSet,
    SparseWeightedEdgeSet,
};
pub use graph::{
    GraphError, SparseDirectedGraph, SparseGraph, SparseUndirectedGraph,
    SparseWeightedDirectedGraph, SparseWeightedGraph, SubgraphId,
};
pub use interner::{InternerSnapshot, TypeInterner};
pub use multigraph::UndirectedMultigraph;
pub use sampling::SamplingSubgraphIterator;
pub use typed_edge_set::{
    CompactSparseTypedEdgeSet, SparseTypedEdgeSet, SparseWeightedDirectedTypedEdgeSet,
    TypedEdgeSet,
};
pub use types::{
    DirectedGraphEdge, GraphEdge, IntMap, IntSet, SimpleDirectedEdge, SimpleEdge, SimpleTypedEdge,
    SimpleWeightedDirectedEdge, SimpleWeightedDirectedTypedEdge, SimpleWeightedEdge,
    TypedGraphEdge, VertexId, WeightedGraphEdge,
};
