use std::fmt::{Display, Formatter};
use std::ops::Not;

use crate::types::{Lit, NodeId};

/// A handle to an AIG node together with an edge polarity.
///
/// Two refs with the same id and opposite polarity denote logical negations of
/// each other. A `Ref` never owns its node; the [`Aig`][crate::aig::Aig]
/// manager does.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Ref {
    id: NodeId,
    complemented: bool,
}

impl Ref {
    pub const fn new(id: NodeId, complemented: bool) -> Self {
        Self { id, complemented }
    }

    /// Uncomplemented reference to the node.
    pub const fn positive(id: NodeId) -> Self {
        Self::new(id, false)
    }

    pub const fn id(self) -> NodeId {
        self.id
    }

    /// Return the index of the referenced node.
    pub const fn index(self) -> usize {
        self.id.index()
    }

    pub const fn is_complemented(self) -> bool {
        self.complemented
    }

    pub const fn negate(self) -> Self {
        Self::new(self.id, !self.complemented)
    }

    /// Negate iff `cond` holds.
    pub const fn not_if(self, cond: bool) -> Self {
        Self::new(self.id, self.complemented ^ cond)
    }

    /// The SAT literal encoding this edge.
    pub const fn lit(self) -> Lit {
        self.id.var().lit(self.complemented)
    }

    /// Stable integer encoding, `2 * id + complemented`.
    pub(crate) const fn packed(self) -> u64 {
        ((self.id.id() as u64) << 1) | self.complemented as u64
    }
}

impl Not for Ref {
    type Output = Self;

    fn not(self) -> Self::Output {
        self.negate()
    }
}

impl Display for Ref {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}@{}",
            if self.is_complemented() { "~" } else { "" },
            self.id.id()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negation() {
        let r = Ref::positive(NodeId::new(3));
        assert!(!r.is_complemented());
        assert!((!r).is_complemented());
        assert_eq!(!!r, r);
        assert_eq!(r.not_if(false), r);
        assert_eq!(r.not_if(true), !r);
    }

    #[test]
    fn test_order_is_by_id_first() {
        let a = Ref::new(NodeId::new(2), true);
        let b = Ref::new(NodeId::new(3), false);
        assert!(a < b);
        assert!(Ref::positive(NodeId::new(2)) < a);
    }

    #[test]
    fn test_display_and_lit() {
        let r = Ref::new(NodeId::new(7), true);
        assert_eq!(r.to_string(), "~@7");
        assert_eq!(r.lit().var().index(), 7);
        assert!(r.lit().is_negated());
        assert_eq!(r.packed(), 15);
    }
}
