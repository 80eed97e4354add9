use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::types::VertexId;

pub mod chinese_whispers;
pub mod link_clustering;

/// The result shape shared by the clustering algorithms: a cluster label
/// mapped to the vertices assigned to it.
///
/// Labels are whatever the producing algorithm used internally (surviving
/// propagation labels, edge-cluster ids) and are not renumbered. Vertices may
/// belong to several clusters when the algorithm produces overlapping
/// communities.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    clusters: BTreeMap<usize, BTreeSet<VertexId>>,
}

impl Assignment {
    pub fn new() -> Self {
        Assignment {
            clusters: BTreeMap::new(),
        }
    }

    pub fn insert(&mut self, cluster: usize, vertex: VertexId) {
        self.clusters.entry(cluster).or_default().insert(vertex);
    }

    pub fn insert_all(&mut self, cluster: usize, vertices: impl IntoIterator<Item = VertexId>) {
        self.clusters.entry(cluster).or_default().extend(vertices);
    }

    pub fn num_clusters(&self) -> usize {
        self.clusters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }

    pub fn members(&self, cluster: usize) -> Option<&BTreeSet<VertexId>> {
        self.clusters.get(&cluster)
    }

    pub fn labels(&self) -> impl Iterator<Item = usize> + '_ {
        self.clusters.keys().copied()
    }

    pub fn clusters(&self) -> impl Iterator<Item = (usize, &BTreeSet<VertexId>)> {
        self.clusters.iter().map(|(&label, members)| (label, members))
    }

    /// Labels of every cluster the vertex belongs to.
    pub fn clusters_containing(&self, vertex: VertexId) -> impl Iterator<Item = usize> + '_ {
        self.clusters
            .iter()
            .filter(move |(_, members)| members.contains(&vertex))
            .map(|(&label, _)| label)
    }

    /// Drops the labels, keeping only the member sets.
    pub fn into_vertex_sets(self) -> Vec<BTreeSet<VertexId>> {
        self.clusters.into_values().collect()
    }
}
