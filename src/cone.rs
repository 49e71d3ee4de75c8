//! Cone traversals: transitive fanin, topological order, logic levels.
//!
//! Traversals mark visited nodes with an epoch stamp. Starting a traversal
//! bumps the epoch, which invalidates every mark left by the previous one.

use log::trace;

use crate::reference::Ref;
use crate::storage::Storage;
use crate::types::NodeId;
use crate::vector::Vector;

/// Visited marks for graph traversals.
#[derive(Debug, Default)]
pub struct Marks {
    stamps: Vec<u32>,
    epoch: u32,
}

impl Marks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin a new traversal over a graph of `size` nodes.
    pub fn start(&mut self, size: usize) {
        if self.stamps.len() < size {
            self.stamps.resize(size, 0);
        }
        if self.epoch == u32::MAX {
            self.unmark_all();
        }
        self.epoch += 1;
    }

    pub fn is_marked(&self, id: NodeId) -> bool {
        self.epoch != 0 && self.stamps.get(id.index()) == Some(&self.epoch)
    }

    /// Mark `id`, returning `true` if it was not marked in this traversal.
    pub fn visit(&mut self, id: NodeId) -> bool {
        let index = id.index();
        if index >= self.stamps.len() {
            self.stamps.resize(index + 1, 0);
        }
        if self.stamps[index] == self.epoch {
            false
        } else {
            self.stamps[index] = self.epoch;
            true
        }
    }

    /// Clear every mark, e.g. after a traversal was abandoned midway.
    pub fn unmark_all(&mut self) {
        self.stamps.iter_mut().for_each(|s| *s = 0);
        self.epoch = 0;
    }
}

/// Collect every node reachable from `roots` into `out`, children before
/// parents. Nodes already in `out` from a previous call are kept.
pub fn transitive_fanin(
    storage: &Storage,
    marks: &mut Marks,
    roots: &[Ref],
    out: &mut Vector<NodeId>,
) {
    marks.start(storage.len());
    let mut stack: Vec<(NodeId, bool)> = Vec::new();

    for root in roots {
        stack.push((root.id(), false));
        while let Some((id, expanded)) = stack.pop() {
            if expanded {
                out.push(id);
                continue;
            }
            if !marks.visit(id) {
                continue;
            }
            stack.push((id, true));
            if let Some([f0, f1]) = storage.node(id).fanins {
                stack.push((f1.id(), false));
                stack.push((f0.id(), false));
            }
        }
    }

    trace!("transitive_fanin({} roots) -> {} nodes", roots.len(), out.len());
}

/// All nodes reachable from `roots` in topological order.
pub fn topological_order(storage: &Storage, marks: &mut Marks, roots: &[Ref]) -> Vec<NodeId> {
    let mut out = Vector::new();
    transitive_fanin(storage, marks, roots, &mut out);
    out.into_vec()
}

/// Maximum number of AND nodes on any path from an input to one of `roots`.
pub fn count_levels(storage: &Storage, marks: &mut Marks, roots: &[Ref]) -> u32 {
    let order = topological_order(storage, marks, roots);
    let mut levels = vec![0u32; storage.len()];
    for id in order {
        if let Some([f0, f1]) = storage.node(id).fanins {
            levels[id.index()] = 1 + levels[f0.index()].max(levels[f1.index()]);
        }
    }
    roots.iter().map(|r| levels[r.index()]).max().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;
    use crate::sim::Signature;

    // n0 const, n1..n4 inputs, n5 = n1 & n2, n6 = n5 & ~n3, n7 = n3 & n4
    fn graph() -> Storage {
        let mut storage = Storage::new(16);
        for _ in 0..5 {
            storage.create(None, Signature::constant());
        }
        let x = |i: u32| Ref::positive(NodeId::new(i));
        storage.create(Some([x(1), x(2)]), Signature::constant());
        storage.create(Some([x(5), !x(3)]), Signature::constant());
        storage.create(Some([x(3), x(4)]), Signature::constant());
        storage
    }

    fn ids(v: &[u32]) -> Vec<NodeId> {
        v.iter().map(|&i| NodeId::new(i)).collect()
    }

    #[test]
    fn test_topological_order() {
        let storage = graph();
        let mut marks = Marks::new();
        let order = topological_order(&storage, &mut marks, &[Ref::positive(NodeId::new(6))]);
        assert_eq!(order, ids(&[1, 2, 5, 3, 6]));

        let pos = |id: u32| order.iter().position(|&n| n == NodeId::new(id));
        assert!(pos(5) < pos(6));
        assert!(pos(3) < pos(6));
    }

    #[test]
    fn test_shared_nodes_visited_once() {
        let storage = graph();
        let mut marks = Marks::new();
        let roots = [Ref::positive(NodeId::new(6)), Ref::new(NodeId::new(7), true)];
        let order = topological_order(&storage, &mut marks, &roots);
        assert_eq!(order, ids(&[1, 2, 5, 3, 6, 4, 7]));
    }

    #[test]
    fn test_no_stale_marks() {
        let storage = graph();
        let mut marks = Marks::new();
        let mut first = Vector::new();
        transitive_fanin(&storage, &mut marks, &[Ref::positive(NodeId::new(5))], &mut first);
        let mut second = Vector::new();
        transitive_fanin(&storage, &mut marks, &[Ref::positive(NodeId::new(7))], &mut second);
        assert_eq!(first.as_slice(), ids(&[1, 2, 5]).as_slice());
        assert_eq!(second.as_slice(), ids(&[3, 4, 7]).as_slice());

        // Overlapping cones are collected in full again.
        let mut third = Vector::new();
        transitive_fanin(&storage, &mut marks, &[Ref::positive(NodeId::new(6))], &mut third);
        assert_eq!(third.as_slice(), ids(&[1, 2, 5, 3, 6]).as_slice());
    }

    #[test]
    fn test_unmark_all() {
        let mut marks = Marks::new();
        marks.start(4);
        assert!(marks.visit(NodeId::new(2)));
        assert!(!marks.visit(NodeId::new(2)));
        assert!(marks.is_marked(NodeId::new(2)));
        marks.unmark_all();
        assert!(!marks.is_marked(NodeId::new(2)));
        marks.start(4);
        assert!(marks.visit(NodeId::new(2)));
    }

    #[test]
    fn test_count_levels() {
        let storage = graph();
        let mut marks = Marks::new();
        let x = |i: u32| Ref::positive(NodeId::new(i));
        assert_eq!(count_levels(&storage, &mut marks, &[x(1)]), 0);
        assert_eq!(count_levels(&storage, &mut marks, &[x(5)]), 1);
        assert_eq!(count_levels(&storage, &mut marks, &[x(6), x(7)]), 2);
        assert_eq!(count_levels(&storage, &mut marks, &[]), 0);
    }
}
