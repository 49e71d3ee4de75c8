//! Debug utilities for inspecting AIG structure.
//!
//! These are primarily useful in tests and during development.

use std::fmt::Write;

use crate::aig::Aig;
use crate::reference::Ref;
use crate::sat::SatSolver;
use crate::types::NodeId;

/// Detailed information about a single node.
#[derive(Debug, Clone)]
pub struct NodeInfo {
    /// The reference to this node
    pub node_ref: Ref,
    /// Class representative, with matching polarity
    pub representative: Ref,
    /// Children, for AND nodes
    pub fanins: Option<[Ref; 2]>,
    pub level: u32,
    /// Primary inputs the function may depend on
    pub support: Vec<usize>,
    /// Is this the constant node
    pub is_const: bool,
    /// Is this a primary input
    pub is_input: bool,
}

impl std::fmt::Display for NodeInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_const {
            return write!(f, "{}", if self.node_ref.is_complemented() { "ZERO" } else { "ONE" });
        }
        if self.is_input {
            return write!(f, "{}(input x{})", self.node_ref, self.node_ref.index() - 1);
        }
        write!(f, "{}(", self.node_ref)?;
        if let Some([a, b]) = self.fanins {
            write!(f, "and={}&{}, ", a, b)?;
        }
        write!(f, "level={}, support={:?}", self.level, self.support)?;
        if self.representative != self.node_ref {
            write!(f, ", repr={}", self.representative)?;
        }
        write!(f, ")")
    }
}

impl<S: SatSolver> Aig<S> {
    pub fn node_info(&self, node_ref: Ref) -> NodeInfo {
        NodeInfo {
            node_ref,
            representative: self.representative(node_ref),
            fanins: self.fanins(node_ref),
            level: self.level(node_ref),
            support: self.support(node_ref),
            is_const: self.is_const(node_ref),
            is_input: self.is_input(node_ref),
        }
    }

    /// Compact listing of the cone of `root`, children first.
    pub fn debug_string(&self, root: Ref) -> String {
        let order = self.topological_order(&[root]);
        let mut result = String::new();
        writeln!(&mut result, "AIG {} (size={}):", root, order.len()).unwrap();
        for id in order {
            writeln!(&mut result, "  {}", self.node_info(Ref::positive(id))).unwrap();
        }
        result
    }

    /// Check `root` against `expected_fn` on every input assignment.
    ///
    /// Returns the assignments where they differ, with the expected and the
    /// actual value.
    pub fn verify_truth_table(&self, root: Ref, expected_fn: impl Fn(&[bool]) -> bool) -> Vec<(Vec<bool>, bool, bool)> {
        let n = self.num_inputs();
        assert!(n < 24, "Truth table of {} inputs is too large", n);

        let mut failures = Vec::new();
        for bits in 0u32..(1 << n) {
            let assignment: Vec<bool> = (0..n).map(|i| (bits >> i) & 1 == 1).collect();
            let actual = self.evaluate(root, &assignment);
            let expected = expected_fn(&assignment);
            if actual != expected {
                failures.push((assignment, expected, actual));
            }
        }
        failures
    }

    /// Dump the node table for debugging.
    pub fn dump_state(&self) -> String {
        let mut result = String::new();
        writeln!(&mut result, "=== AIG State ===").unwrap();
        writeln!(&mut result, "{}", self.stats()).unwrap();
        for i in 0..self.num_nodes() {
            let info = self.node_info(Ref::positive(NodeId::new(i as u32)));
            writeln!(&mut result, "  {}", info).unwrap();
        }
        for (i, out) in self.outputs().iter().enumerate() {
            writeln!(&mut result, "  out{} = {}", i, out).unwrap();
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_info() {
        let aig = Aig::new(2, 0);
        let x = aig.input(0);
        let y = aig.input(1);
        let f = aig.apply_and(x, !y);

        let info = aig.node_info(f);
        assert_eq!(info.fanins, Some([x, !y]));
        assert_eq!(info.level, 1);
        assert_eq!(info.support, vec![0, 1]);
        assert!(!info.is_const);
        assert!(!info.is_input);

        assert!(aig.node_info(x).is_input);
        assert_eq!(aig.node_info(aig.zero).to_string(), "ZERO");
    }

    #[test]
    fn test_verify_truth_table() {
        let aig = Aig::new(3, 0);
        let (x, y, z) = (aig.input(0), aig.input(1), aig.input(2));
        let f = aig.apply_mux(x, y, z);

        let failures = aig.verify_truth_table(f, |a| if a[0] { a[1] } else { a[2] });
        assert!(failures.is_empty(), "Truth table verification failed: {:?}", failures);

        let failures = aig.verify_truth_table(f, |a| a[1]);
        assert_eq!(failures.len(), 2);
    }

    #[test]
    fn test_debug_string() {
        let aig = Aig::new(2, 0);
        let f = aig.apply_and(aig.input(0), aig.input(1));
        let s = aig.debug_string(f);
        assert!(s.contains("size=3"), "Expected size=3 in: {}", s);
        assert!(s.contains("input x1"), "Expected input x1 in: {}", s);
        assert!(aig.dump_state().contains("nodes = 4"));
    }
}
