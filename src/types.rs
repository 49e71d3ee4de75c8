//! Type-safe wrappers for AIG node identities and SAT variables.
//!
//! Node ids and SAT variables share the same numbering (node `i` is encoded by
//! variable `i`), but keeping them as distinct newtypes prevents mixing a graph
//! index with a solver literal by accident.
use std::fmt;
use std::ops::Not;

/// A stable node identity (0-indexed, creation order).
///
/// # Invariants
///
/// - Id 0 is the constant node
/// - Ids `1..=n` are the primary inputs of an `n`-input graph
/// - Every AND node has a larger id than both of its children
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct NodeId(u32);

impl NodeId {
    /// The constant node.
    pub const CONST: NodeId = NodeId(0);

    /// Creates a node id from its raw index.
    pub const fn new(id: u32) -> Self {
        NodeId(id)
    }

    /// Returns the raw id as a `u32`.
    pub const fn id(self) -> u32 {
        self.0
    }

    /// Returns the id as a `usize`, suitable for indexing.
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Returns the SAT variable encoding this node.
    pub const fn var(self) -> Var {
        Var(self.0)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

impl From<NodeId> for u32 {
    fn from(id: NodeId) -> Self {
        id.0
    }
}

/// A SAT variable (0-indexed).
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Var(u32);

impl Var {
    pub const fn new(index: u32) -> Self {
        Var(index)
    }

    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Positive literal of this variable.
    pub const fn pos(self) -> Lit {
        Lit::new(self, false)
    }

    /// Negative literal of this variable.
    pub const fn neg(self) -> Lit {
        Lit::new(self, true)
    }

    /// Literal of this variable, negated iff `negated`.
    pub const fn lit(self, negated: bool) -> Lit {
        Lit::new(self, negated)
    }
}

impl fmt::Display for Var {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// A SAT literal, packed as `2 * var + negated`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Lit(u32);

impl Lit {
    pub const fn new(var: Var, negated: bool) -> Self {
        Lit((var.0 << 1) | negated as u32)
    }

    pub const fn var(self) -> Var {
        Var(self.0 >> 1)
    }

    pub const fn is_negated(self) -> bool {
        self.0 & 1 == 1
    }

    pub const fn is_positive(self) -> bool {
        !self.is_negated()
    }

    /// Signed 1-based DIMACS representation.
    pub fn to_dimacs(self) -> i32 {
        let v = self.var().0 as i32 + 1;
        if self.is_negated() {
            -v
        } else {
            v
        }
    }
}

impl Not for Lit {
    type Output = Self;

    fn not(self) -> Self::Output {
        Lit(self.0 ^ 1)
    }
}

impl fmt::Display for Lit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_dimacs())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_id() {
        let n = NodeId::new(5);
        assert_eq!(n.id(), 5);
        assert_eq!(n.index(), 5);
        assert_eq!(n.var(), Var::new(5));
        assert!(NodeId::CONST < n);
    }

    #[test]
    fn test_lit_packing() {
        let v = Var::new(3);
        assert_eq!(v.pos().var(), v);
        assert_eq!(v.neg().var(), v);
        assert!(v.pos().is_positive());
        assert!(v.neg().is_negated());
        assert_eq!(!v.pos(), v.neg());
        assert_eq!(!!v.pos(), v.pos());
        assert_eq!(v.lit(true), v.neg());
    }

    #[test]
    fn test_dimacs() {
        assert_eq!(Var::new(0).pos().to_dimacs(), 1);
        assert_eq!(Var::new(0).neg().to_dimacs(), -1);
        assert_eq!(Var::new(41).neg().to_dimacs(), -42);
    }
}
