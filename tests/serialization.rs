use std::fs::File;
use std::io::{BufReader, BufWriter};

use anyhow::Result;
use sparse_community::{
    Assignment, ChineseWhispers, InternerSnapshot, LinkClustering, SimpleEdge,
    SparseUndirectedGraph, TypeInterner,
};
use tempfile::tempdir;

fn two_triangles() -> SparseUndirectedGraph {
    SparseUndirectedGraph::from_edges([
        SimpleEdge::new(0, 1),
        SimpleEdge::new(1, 2),
        SimpleEdge::new(0, 2),
        SimpleEdge::new(3, 4),
        SimpleEdge::new(4, 5),
        SimpleEdge::new(3, 5),
    ])
}

#[test]
fn assignment_round_trips_through_json_file() -> Result<()> {
    let assignment = ChineseWhispers::new()
        .with_seed(42)
        .cluster(&two_triangles())?;
    assert_eq!(assignment.num_clusters(), 2);

    let dir = tempdir()?;
    let path = dir.path().join("assignment.json");
    serde_json::to_writer(BufWriter::new(File::create(&path)?), &assignment)?;
    let restored: Assignment = serde_json::from_reader(BufReader::new(File::open(&path)?))?;
    assert_eq!(restored, assignment);
    Ok(())
}

#[test]
fn overlapping_assignment_survives_round_trip() -> Result<()> {
    // Bowtie: the shared vertex belongs to both communities, and that
    // overlap must come back intact.
    let graph = SparseUndirectedGraph::from_edges([
        SimpleEdge::new(0, 1),
        SimpleEdge::new(1, 2),
        SimpleEdge::new(2, 0),
        SimpleEdge::new(2, 3),
        SimpleEdge::new(3, 4),
        SimpleEdge::new(4, 2),
    ]);
    let assignment = LinkClustering::new().cluster(&graph)?;
    assert_eq!(assignment.clusters_containing(2).count(), 2);

    let text = serde_json::to_string(&assignment)?;
    let restored: Assignment = serde_json::from_str(&text)?;
    assert_eq!(restored, assignment);
    assert_eq!(restored.clusters_containing(2).count(), 2);
    Ok(())
}

#[test]
fn interner_snapshot_remaps_across_sessions() -> Result<()> {
    // First session: intern a vocabulary and persist its index order.
    let source: TypeInterner<String> = TypeInterner::new();
    source.intern(&"cites".to_string());
    source.intern(&"extends".to_string());
    source.intern(&"contrasts".to_string());

    let dir = tempdir()?;
    let path = dir.path().join("types.json");
    serde_json::to_writer(BufWriter::new(File::create(&path)?), &source.snapshot())?;

    // Second session: an interner that already assigned "extends" elsewhere.
    let snapshot: InternerSnapshot<String> =
        serde_json::from_reader(BufReader::new(File::open(&path)?))?;
    let target: TypeInterner<String> = TypeInterner::new();
    target.intern(&"imports".to_string());
    target.intern(&"extends".to_string());

    let remap = target.import(&snapshot);
    assert_eq!(remap.len(), 3);
    for (old, &new) in remap.iter().enumerate() {
        assert_eq!(
            target.resolve(new),
            Some(snapshot.types()[old].clone()),
            "index {} must keep naming the same type",
            old
        );
    }
    // "extends" kept its pre-existing target index rather than a new one.
    assert_eq!(remap[1], 1);
    Ok(())
}
