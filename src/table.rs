//! Structural hashing of AND nodes.
//!
//! Buckets hold the head of a chain threaded through the nodes themselves
//! (`Node::next_strash`), so the table owns no per-entry storage.

use log::debug;

use crate::reference::Ref;
use crate::sim::Signature;
use crate::storage::Storage;
use crate::types::NodeId;
use crate::utils::{next_prime, MyHash};

/// Initial number of buckets.
pub const INITIAL_BUCKETS: usize = 1021;

/// Outcome of [`StructuralTable::lookup_or_insert`].
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Lookup {
    /// An AND node with the same children already exists.
    Found(NodeId),
    /// A fresh node was allocated.
    Created(NodeId),
}

/// Order the children so that `(a, b)` and `(b, a)` share a key.
pub fn canonical_pair(a: Ref, b: Ref) -> (Ref, Ref) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

pub struct StructuralTable {
    buckets: Vec<Option<NodeId>>,
    len: usize,
}

impl Default for StructuralTable {
    fn default() -> Self {
        Self::new(INITIAL_BUCKETS)
    }
}

impl StructuralTable {
    pub fn new(buckets: usize) -> Self {
        let buckets = next_prime(buckets);
        Self {
            buckets: vec![None; buckets],
            len: 0,
        }
    }

    /// Number of AND nodes in the table.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn num_buckets(&self) -> usize {
        self.buckets.len()
    }

    fn bucket_index(&self, p1: Ref, p2: Ref) -> usize {
        ((p1.packed(), p2.packed()).hash() % self.buckets.len() as u64) as usize
    }

    /// Find the AND node with children `(p1, p2)` in the table.
    pub fn lookup(&self, storage: &Storage, p1: Ref, p2: Ref) -> Option<NodeId> {
        let (p1, p2) = canonical_pair(p1, p2);
        let mut cur = self.buckets[self.bucket_index(p1, p2)];
        while let Some(id) = cur {
            let node = storage.node(id);
            if node.fanins == Some([p1, p2]) {
                return Some(id);
            }
            cur = node.next_strash;
        }
        None
    }

    /// Return the AND node with children `(p1, p2)`, creating it on a miss.
    ///
    /// The signature of a new node is only computed when the node is actually
    /// allocated.
    pub fn lookup_or_insert(
        &mut self,
        storage: &mut Storage,
        p1: Ref,
        p2: Ref,
        signature: impl FnOnce(&Storage) -> Signature,
    ) -> Lookup {
        let (p1, p2) = canonical_pair(p1, p2);
        if let Some(id) = self.lookup(storage, p1, p2) {
            return Lookup::Found(id);
        }

        let sig = signature(storage);
        let id = storage.create(Some([p1, p2]), sig);
        self.insert(storage, id);
        Lookup::Created(id)
    }

    fn insert(&mut self, storage: &mut Storage, id: NodeId) {
        let [p1, p2] = match storage.node(id).fanins {
            Some(fanins) => fanins,
            None => panic!("Only AND nodes are structurally hashed, got {}", id),
        };
        let index = self.bucket_index(p1, p2);
        storage.node_mut(id).next_strash = self.buckets[index];
        self.buckets[index] = Some(id);
        self.len += 1;

        if self.len > 2 * self.buckets.len() {
            self.resize(storage);
        }
    }

    fn resize(&mut self, storage: &mut Storage) {
        let new_size = next_prime(2 * self.buckets.len());
        debug!(
            "Resizing structural table: {} -> {} buckets ({} entries)",
            self.buckets.len(),
            new_size,
            self.len
        );

        let old = std::mem::replace(&mut self.buckets, vec![None; new_size]);
        for head in old {
            let mut cur = head;
            while let Some(id) = cur {
                let node = storage.node(id);
                cur = node.next_strash;
                if let Some([p1, p2]) = node.fanins {
                    let index = self.bucket_index(p1, p2);
                    storage.node_mut(id).next_strash = self.buckets[index];
                    self.buckets[index] = Some(id);
                }
            }
        }
    }
}
