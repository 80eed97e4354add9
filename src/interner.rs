use std::hash::Hash;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// A shared, append-only table mapping edge-type values to dense indices.
///
/// Compact typed edge sets store their per-neighbor type memberships as
/// bitsets over these indices, so every edge set of one graph must be handed
/// the same interner. The table only ever grows; indices stay valid for the
/// lifetime of the interner, and interior locking makes concurrent interning
/// from reader threads safe.
#[derive(Debug)]
pub struct TypeInterner<T> {
    inner: RwLock<InternerInner<T>>,
}

#[derive(Debug)]
struct InternerInner<T> {
    types: Vec<T>,
    indices: FxHashMap<T, u32>,
}

/// A serializable image of an interner's index order, used to carry the
/// mapping across a persistence boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InternerSnapshot<T> {
    types: Vec<T>,
}

impl<T: Clone + Eq + Hash> TypeInterner<T> {
    pub fn new() -> Self {
        TypeInterner {
            inner: RwLock::new(InternerInner {
                types: Vec::new(),
                indices: FxHashMap::default(),
            }),
        }
    }

    /// Returns the index for `value`, assigning the next free one on first
    /// sight.
    pub fn intern(&self, value: &T) -> u32 {
        if let Some(idx) = self.inner.read().indices.get(value) {
            return *idx;
        }
        let mut inner = self.inner.write();
        // Re-check under the write lock, another thread may have won the race.
        if let Some(idx) = inner.indices.get(value) {
            return *idx;
        }
        let idx = inner.types.len() as u32;
        inner.types.push(value.clone());
        inner.indices.insert(value.clone(), idx);
        idx
    }

    /// The index for `value`, without assigning one.
    pub fn lookup(&self, value: &T) -> Option<u32> {
        self.inner.read().indices.get(value).copied()
    }

    /// The type value behind an index.
    pub fn resolve(&self, index: u32) -> Option<T> {
        self.inner.read().types.get(index as usize).cloned()
    }

    pub fn len(&self) -> usize {
        self.inner.read().types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Captures the current index order for serialization.
    pub fn snapshot(&self) -> InternerSnapshot<T> {
        InternerSnapshot {
            types: self.inner.read().types.clone(),
        }
    }

    /// Merges a snapshot into this interner and returns the remap table
    /// translating the snapshot's indices to live ones. Types the interner
    /// already knows keep their local index; unknown types are appended, so
    /// loading into a fresh interner reproduces the snapshot's order exactly.
    pub fn import(&self, snapshot: &InternerSnapshot<T>) -> Vec<u32> {
        snapshot
            .types
            .iter()
            .map(|t| self.intern(t))
            .collect()
    }
}

impl<T: Clone + Eq + Hash> Default for TypeInterner<T> {
    fn default() -> Self {
        TypeInterner::new()
    }
}

impl<T> InternerSnapshot<T> {
    pub fn types(&self) -> &[T] {
        &self.types
    }
}

#[cfg(test)]
mod test_interner {
    use std::sync::Arc;

    use crate::interner::{InternerSnapshot, TypeInterner};

    #[test]
    fn test_intern_is_stable() {
        let interner = TypeInterner::new();
        let a = interner.intern(&"cites");
        let b = interner.intern(&"extends");
        assert_eq!(interner.intern(&"cites"), a);
        assert_eq!(interner.intern(&"extends"), b);
        assert_ne!(a, b);
        assert_eq!(interner.len(), 2);
        assert_eq!(interner.resolve(a), Some("cites"));
        assert_eq!(interner.lookup(&"unknown"), None);
    }

    #[test]
    fn test_concurrent_interning_agrees() {
        let interner = Arc::new(TypeInterner::new());
        let mut handles = Vec::new();
        for _ in 0..4 {
            let interner = Arc::clone(&interner);
            handles.push(std::thread::spawn(move || {
                let mut seen = Vec::new();
                for t in ["a", "b", "c", "d", "e"] {
                    seen.push(interner.intern(&t));
                }
                seen
            }));
        }
        let results: Vec<Vec<u32>> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        for r in &results[1..] {
            assert_eq!(*r, results[0]);
        }
        assert_eq!(interner.len(), 5);
    }

    #[test]
    fn test_snapshot_import_remaps() {
        let source = TypeInterner::new();
        source.intern(&"x");
        source.intern(&"y");
        source.intern(&"z");
        let snap: InternerSnapshot<&str> = source.snapshot();

        // The target already knows "z" under a different index.
        let target = TypeInterner::new();
        target.intern(&"z");
        let remap = target.import(&snap);
        assert_eq!(remap.len(), 3);
        assert_eq!(remap[2], 0, "existing assignment must win");
        assert_eq!(target.resolve(remap[0]), Some("x"));
        assert_eq!(target.resolve(remap[1]), Some("y"));

        // A fresh interner replays the snapshot order verbatim.
        let fresh = TypeInterner::new();
        let identity = fresh.import(&snap);
        assert_eq!(identity, vec![0, 1, 2]);
    }

    #[test]
    fn test_snapshot_round_trips_through_json() {
        let interner = TypeInterner::new();
        interner.intern(&"alpha".to_string());
        interner.intern(&"beta".to_string());
        let snap = interner.snapshot();
        let text = serde_json::to_string(&snap).unwrap();
        let back: InternerSnapshot<String> = serde_json::from_str(&text).unwrap();
        assert_eq!(back.types(), snap.types());
    }
}
