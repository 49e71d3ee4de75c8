use crate::bitset::BitSet;
use crate::reference::Ref;
use crate::sim::Signature;
use crate::types::NodeId;

/// A single AIG node as stored in the arena.
///
/// A node without fanins is either the constant node (id 0) or a primary
/// input (ids `1..=n`). All other nodes are two-input AND gates.
#[derive(Debug, Clone)]
pub struct Node {
    pub id: NodeId,
    pub fanins: Option<[Ref; 2]>,
    pub signature: Signature,
    /// Primary inputs (0-based) the function may depend on.
    pub support: BitSet,
    /// Number of fanout edges pointing at this node.
    pub refs: u32,
    /// Longest path from the inputs, counted in AND nodes.
    pub level: u32,
    pub(crate) next_strash: Option<NodeId>,
    pub(crate) next_fraig: Option<NodeId>,
    pub(crate) next_diff: Option<NodeId>,
}

impl Node {
    pub fn is_const(&self) -> bool {
        self.id == NodeId::CONST
    }

    pub fn is_input(&self) -> bool {
        self.fanins.is_none() && !self.is_const()
    }

    pub fn is_and(&self) -> bool {
        self.fanins.is_some()
    }

    pub fn fanin0(&self) -> Option<Ref> {
        self.fanins.map(|[f, _]| f)
    }

    pub fn fanin1(&self) -> Option<Ref> {
        self.fanins.map(|[_, f]| f)
    }
}
