//! Functional table: buckets class representatives by simulation signature.
//!
//! Two nodes land in the same class when their normalized signatures are
//! identical. Such a match is only a candidate: the manager decides with the
//! SAT oracle whether the nodes are really equivalent. Nodes that share a
//! signature with a representative but were proven different hang off the
//! representative's difference list (`Node::next_diff`).

use log::{debug, trace};

use crate::storage::Storage;
use crate::table::INITIAL_BUCKETS;
use crate::types::NodeId;
use crate::utils::next_prime;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Classification {
    /// No node with this signature; the node is now a representative.
    Unique,
    /// A representative with the identical signature exists.
    Candidate(NodeId),
}

pub struct FunctionalTable {
    buckets: Vec<Option<NodeId>>,
    len: usize,
}

impl Default for FunctionalTable {
    fn default() -> Self {
        Self::new(INITIAL_BUCKETS)
    }
}

impl FunctionalTable {
    pub fn new(buckets: usize) -> Self {
        let buckets = next_prime(buckets);
        Self {
            buckets: vec![None; buckets],
            len: 0,
        }
    }

    /// Number of signature classes.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn num_buckets(&self) -> usize {
        self.buckets.len()
    }

    fn bucket_index(&self, hash: u32) -> usize {
        hash as usize % self.buckets.len()
    }

    /// Representative whose signature equals the one of `id`, if any.
    pub fn find(&self, storage: &Storage, id: NodeId) -> Option<NodeId> {
        let sig = storage.signature(id);
        let mut cur = self.buckets[self.bucket_index(sig.hash())];
        while let Some(repr) = cur {
            let node = storage.node(repr);
            if node.signature.same_class(sig) {
                return Some(repr);
            }
            cur = node.next_fraig;
        }
        None
    }

    /// Classify a freshly created node, registering it as a representative
    /// when its signature is new. Candidates are not merged here.
    pub fn classify(&mut self, storage: &mut Storage, id: NodeId) -> Classification {
        match self.find(storage, id) {
            Some(repr) => {
                debug!("classify({}) -> candidate {}", id, repr);
                Classification::Candidate(repr)
            }
            None => {
                self.insert(storage, id);
                debug!("classify({}) -> unique", id);
                Classification::Unique
            }
        }
    }

    /// Register `id` as a representative without looking for a match.
    pub fn insert(&mut self, storage: &mut Storage, id: NodeId) {
        let index = self.bucket_index(storage.signature(id).hash());
        storage.node_mut(id).next_fraig = self.buckets[index];
        self.buckets[index] = Some(id);
        self.len += 1;

        if self.len > 2 * self.buckets.len() {
            self.resize(storage);
        }
    }

    /// Append `id` at the end of the difference list of `repr`.
    pub fn append_diff(&self, storage: &mut Storage, repr: NodeId, id: NodeId) {
        let mut last = repr;
        while let Some(next) = storage.node(last).next_diff {
            last = next;
        }
        trace!("append_diff: {} after {} (class of {})", id, last, repr);
        storage.node_mut(last).next_diff = Some(id);
    }

    fn resize(&mut self, storage: &mut Storage) {
        let new_size = next_prime(2 * self.buckets.len());
        debug!(
            "Resizing functional table: {} -> {} buckets ({} classes)",
            self.buckets.len(),
            new_size,
            self.len
        );

        let old = std::mem::replace(&mut self.buckets, vec![None; new_size]);
        for head in old {
            let mut cur = head;
            while let Some(id) = cur {
                cur = storage.node(id).next_fraig;
                let index = self.bucket_index(storage.signature(id).hash());
                storage.node_mut(id).next_fraig = self.buckets[index];
                self.buckets[index] = Some(id);
            }
        }
    }
}

/// Iterator over a class: the representative followed by its difference list.
pub struct ClassMembers<'a> {
    storage: &'a Storage,
    cur: Option<NodeId>,
}

impl<'a> ClassMembers<'a> {
    pub fn new(storage: &'a Storage, repr: NodeId) -> Self {
        Self {
            storage,
            cur: Some(repr),
        }
    }
}

impl Iterator for ClassMembers<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.cur?;
        self.cur = self.storage.node(id).next_diff;
        Some(id)
    }
}
