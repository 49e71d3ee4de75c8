//! Node arena.
//!
//! Nodes live in a single [`Vector`] and are addressed by [`NodeId`], which is
//! simply their position. Ids are handed out in creation order and never
//! reused: the arena only grows for the lifetime of a session.

use crate::bitset::BitSet;
use crate::node::Node;
use crate::reference::Ref;
use crate::sim::Signature;
use crate::types::NodeId;
use crate::vector::Vector;

pub struct Storage {
    nodes: Vector<Node>,
    num_inputs: usize,
}

impl Storage {
    pub fn new(capacity: usize) -> Self {
        Self {
            nodes: Vector::with_capacity(capacity),
            num_inputs: 0,
        }
    }

    /// Total number of nodes, constant and inputs included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.nodes.capacity()
    }

    pub fn num_inputs(&self) -> usize {
        self.num_inputs
    }

    pub fn contains(&self, id: NodeId) -> bool {
        id.index() < self.nodes.len()
    }

    pub fn node(&self, id: NodeId) -> &Node {
        assert!(self.contains(id), "Node {} does not exist", id);
        &self.nodes[id.index()]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        assert!(self.contains(id), "Node {} does not exist", id);
        &mut self.nodes[id.index()]
    }

    pub fn signature(&self, id: NodeId) -> &Signature {
        &self.node(id).signature
    }

    /// Ids of all nodes in creation order.
    pub fn ids(&self) -> impl Iterator<Item = NodeId> {
        (0..self.nodes.len() as u32).map(NodeId::new)
    }

    /// Allocate a fresh node with the next id.
    ///
    /// Without fanins, the first node becomes the constant and the following
    /// ones primary inputs; those must all be created before any AND node.
    /// With fanins, both children must already exist; their usage counts are
    /// incremented.
    pub fn create(&mut self, fanins: Option<[Ref; 2]>, signature: Signature) -> NodeId {
        let id = NodeId::new(self.nodes.len() as u32);

        let (support, level) = match fanins {
            None => {
                assert_eq!(
                    self.num_inputs + 1,
                    self.nodes.len().max(1),
                    "Leaf nodes must be created before AND nodes"
                );
                if id == NodeId::CONST {
                    (BitSet::empty(), 0)
                } else {
                    self.num_inputs += 1;
                    (BitSet::singleton(id.index() - 1), 0)
                }
            }
            Some([p1, p2]) => {
                assert!(!self.is_empty(), "Constant node must exist before AND nodes");
                assert!(
                    p1.id() < id && p2.id() < id,
                    "AND node {} created out of dependency order ({}, {})",
                    id,
                    p1,
                    p2
                );
                let a = self.node(p1.id());
                let b = self.node(p2.id());
                let support = a.support.union(&b.support);
                let level = 1 + a.level.max(b.level);
                self.node_mut(p1.id()).refs += 1;
                self.node_mut(p2.id()).refs += 1;
                (support, level)
            }
        };

        self.nodes.push(Node {
            id,
            fanins,
            signature,
            support,
            refs: 0,
            level,
            next_strash: None,
            next_fraig: None,
            next_diff: None,
        });
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::Simulator;

    fn leaves(n: usize) -> (Storage, Simulator) {
        let mut sim = Simulator::new(0);
        let mut storage = Storage::new(16);
        storage.create(None, Signature::constant());
        for _ in 0..n {
            storage.create(None, sim.random());
        }
        (storage, sim)
    }

    #[test]
    fn test_leaves() {
        let (storage, _) = leaves(3);
        assert_eq!(storage.len(), 4);
        assert_eq!(storage.num_inputs(), 3);
        assert!(storage.node(NodeId::CONST).is_const());
        assert!(storage.node(NodeId::new(1)).is_input());
        assert_eq!(
            storage.node(NodeId::new(3)).support.iter().collect::<Vec<_>>(),
            vec![2]
        );
    }

    #[test]
    fn test_create_and() {
        let (mut storage, sim) = leaves(2);
        let x = Ref::positive(NodeId::new(1));
        let y = Ref::positive(NodeId::new(2));
        let sig = sim.and(storage.signature(x.id()), false, storage.signature(y.id()), true);
        let id = storage.create(Some([x, !y]), sig);

        assert_eq!(id, NodeId::new(3));
        let node = storage.node(id);
        assert!(node.is_and());
        assert_eq!(node.fanin0(), Some(x));
        assert_eq!(node.fanin1(), Some(!y));
        assert_eq!(node.level, 1);
        assert_eq!(node.support.len(), 2);
        assert_eq!(storage.node(x.id()).refs, 1);
        assert_eq!(storage.node(y.id()).refs, 1);
        assert_eq!(storage.node(id).refs, 0);
    }

    #[test]
    #[should_panic(expected = "out of dependency order")]
    fn test_out_of_order() {
        let (mut storage, _) = leaves(1);
        let x = Ref::positive(NodeId::new(1));
        let future = Ref::positive(NodeId::new(9));
        storage.create(Some([x, future]), Signature::constant());
    }

    #[test]
    #[should_panic(expected = "Leaf nodes must be created before AND nodes")]
    fn test_input_after_and() {
        let (mut storage, _) = leaves(2);
        let x = Ref::positive(NodeId::new(1));
        let y = Ref::positive(NodeId::new(2));
        storage.create(Some([x, y]), Signature::constant());
        storage.create(None, Signature::constant());
    }
}
