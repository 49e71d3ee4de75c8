//! Equivalence classes of nodes proven functionally identical.
//!
//! A union-find over node ids where every parent link carries a phase: node
//! `n` with parent `p` and phase `true` computes the complement of `p`.
//! [`EquivClasses::find`] resolves a [`Ref`] to the representative of its
//! class with the accumulated polarity and compresses the path on the way.

use std::cell::Cell;

use crate::reference::Ref;
use crate::types::NodeId;

#[derive(Debug, Copy, Clone)]
struct Link {
    parent: NodeId,
    phase: bool,
}

#[derive(Debug, Default)]
pub struct EquivClasses {
    links: Vec<Cell<Link>>,
    merges: usize,
}

impl EquivClasses {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// Number of successful unions.
    pub fn num_merges(&self) -> usize {
        self.merges
    }

    /// Make room for nodes up to (and including) `id`, each in its own class.
    pub fn grow(&mut self, id: NodeId) {
        while self.links.len() <= id.index() {
            let parent = NodeId::new(self.links.len() as u32);
            self.links.push(Cell::new(Link { parent, phase: false }));
        }
    }

    fn link(&self, id: NodeId) -> Link {
        assert!(id.index() < self.links.len(), "Node {} has no class", id);
        self.links[id.index()].get()
    }

    pub fn is_representative(&self, id: NodeId) -> bool {
        self.link(id).parent == id
    }

    /// Representative of the class of `r`, complemented as `r` relates to it.
    pub fn find(&self, r: Ref) -> Ref {
        let mut root = r.id();
        let mut phase = false;
        loop {
            let link = self.link(root);
            if link.parent == root {
                break;
            }
            phase ^= link.phase;
            root = link.parent;
        }

        // Second pass: point every node on the path directly at the root.
        let mut cur = r.id();
        let mut acc = phase;
        while cur != root {
            let link = self.link(cur);
            self.links[cur.index()].set(Link {
                parent: root,
                phase: acc,
            });
            acc ^= link.phase;
            cur = link.parent;
        }

        Ref::new(root, r.is_complemented() ^ phase)
    }

    /// Record `loser ≡ winner`. The winner's representative becomes the
    /// representative of the merged class.
    ///
    /// Returns `false` if both were already in the same class.
    pub fn union(&mut self, loser: Ref, winner: Ref) -> bool {
        let l = self.find(loser);
        let w = self.find(winner);
        if l.id() == w.id() {
            assert_eq!(
                l.is_complemented(),
                w.is_complemented(),
                "Node {} cannot be equivalent to its own complement",
                l.id()
            );
            return false;
        }
        assert!(
            w.id() < l.id(),
            "Representative {} must be older than {}",
            w.id(),
            l.id()
        );
        self.links[l.id().index()].set(Link {
            parent: w.id(),
            phase: l.is_complemented() ^ w.is_complemented(),
        });
        self.merges += 1;
        true
    }
}
