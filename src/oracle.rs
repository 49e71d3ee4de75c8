//! SAT-based equivalence oracle.
//!
//! Every node of the graph is mirrored by a solver variable with the same
//! index. AND nodes contribute their three Tseitin clauses when they are
//! created, the constant node contributes a unit clause. A query
//! `a ≡ b ^ phase` is answered by two incremental solves, one per direction
//! of the implication. Each direction that comes back UNSAT is learned as a
//! permanent clause, so later queries over the same nodes are cheaper.

use std::fmt::{Display, Formatter};

use log::{debug, trace};

use crate::cone::{transitive_fanin, Marks};
use crate::reference::Ref;
use crate::sat::{SatResult, SatSolver};
use crate::storage::Storage;
use crate::types::{Lit, NodeId, Var};
use crate::vector::Vector;

/// Verdict of an equivalence query.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Equivalence {
    /// The two functions are identical.
    Proved,
    /// An input assignment distinguishes the two functions.
    Disproved,
    /// The query was not attempted.
    Skipped,
}

impl Equivalence {
    pub fn is_proved(self) -> bool {
        self == Equivalence::Proved
    }
}

impl Display for Equivalence {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Equivalence::Proved => "proved",
            Equivalence::Disproved => "disproved",
            Equivalence::Skipped => "skipped",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Default, Copy, Clone, Eq, PartialEq)]
pub struct OracleStats {
    pub proofs: usize,
    pub counterexamples: usize,
    pub skips: usize,
    pub sat_calls: usize,
}

pub struct Oracle<S> {
    solver: S,
    stats: OracleStats,
    cone: Vector<NodeId>,
    scope: Vec<Var>,
    counterexample: Option<Vec<bool>>,
}

impl<S: Default> Default for Oracle<S> {
    fn default() -> Self {
        Self::new(S::default())
    }
}

impl<S> Oracle<S> {
    pub fn new(solver: S) -> Self {
        Self {
            solver,
            stats: OracleStats::default(),
            cone: Vector::new(),
            scope: Vec::new(),
            counterexample: None,
        }
    }

    pub fn solver(&self) -> &S {
        &self.solver
    }

    pub fn stats(&self) -> OracleStats {
        self.stats
    }

    /// Input assignment found by the last refuted query.
    pub fn counterexample(&self) -> Option<&[bool]> {
        self.counterexample.as_deref()
    }

    pub(crate) fn set_counterexample(&mut self, assignment: Vec<bool>) {
        self.counterexample = Some(assignment);
    }
}

impl<S: SatSolver> Oracle<S> {
    fn new_var_for(&mut self, id: NodeId) -> Var {
        let var = self.solver.new_variable();
        assert_eq!(
            var,
            id.var(),
            "Solver variable {} out of sync with node {}",
            var,
            id
        );
        var
    }

    fn add_clause(&mut self, lits: &[Lit]) {
        trace!("clause {:?}", lits.iter().map(|l| l.to_dimacs()).collect::<Vec<_>>());
        let ok = self.solver.add_clause(lits);
        assert!(ok, "Empty clause added to the solver");
    }

    /// Register the constant-true node.
    pub fn add_constant(&mut self, id: NodeId) {
        let var = self.new_var_for(id);
        self.add_clause(&[var.pos()]);
    }

    /// Register a primary input; inputs are unconstrained.
    pub fn add_input(&mut self, id: NodeId) {
        self.new_var_for(id);
    }

    /// Register `id = p1 & p2`.
    pub fn add_and(&mut self, id: NodeId, p1: Ref, p2: Ref) {
        let n = self.new_var_for(id);
        let (a, b) = (p1.lit(), p2.lit());
        self.add_clause(&[n.neg(), a]);
        self.add_clause(&[n.neg(), b]);
        self.add_clause(&[n.pos(), !a, !b]);
    }

    /// Zero-word heuristic: queries against a node whose stored signature
    /// starts with a zero word are not attempted. Counts the skip.
    pub fn skips_zero_word(&mut self, storage: &Storage, id: NodeId) -> bool {
        let skip = storage.signature(id).words()[0] == 0;
        if skip {
            debug!("{}: zero first word, skipped", id);
            self.stats.skips += 1;
        }
        skip
    }

    /// Check `a ≡ b ^ phase`, skipping the SAT calls when `skip_zero` is set
    /// and the stored signature of `b` starts with a zero word.
    pub fn check(
        &mut self,
        storage: &Storage,
        marks: &mut Marks,
        a: Ref,
        b: Ref,
        phase: bool,
        skip_zero: bool,
    ) -> Equivalence {
        if skip_zero && self.skips_zero_word(storage, b.id()) {
            return Equivalence::Skipped;
        }
        self.prove(storage, marks, a, b, phase)
    }

    /// Decide `a ≡ b ^ phase` with the SAT solver.
    pub fn prove(
        &mut self,
        storage: &Storage,
        marks: &mut Marks,
        a: Ref,
        b: Ref,
        phase: bool,
    ) -> Equivalence {
        debug!("prove({}, {}, phase={})", a, b, phase);
        let b = b.not_if(phase);

        if a.id() == b.id() {
            return if a == b {
                self.stats.proofs += 1;
                Equivalence::Proved
            } else {
                // a == !a never holds; any assignment is a witness.
                self.counterexample = Some(vec![false; storage.num_inputs()]);
                self.stats.counterexamples += 1;
                Equivalence::Disproved
            };
        }

        self.load_scope(storage, marks, a, b);

        let (la, lb) = (a.lit(), b.lit());
        for (lhs, rhs) in [(la, lb), (!la, !lb)] {
            // Look for an assignment where lhs is false and rhs is true.
            self.stats.sat_calls += 1;
            match self.solver.solve(&[!lhs, rhs]) {
                SatResult::Sat => {
                    self.capture_counterexample(storage);
                    self.stats.counterexamples += 1;
                    debug!("prove({}, {}) -> disproved", a, b);
                    return Equivalence::Disproved;
                }
                SatResult::Unsat => {
                    // rhs -> lhs holds everywhere.
                    self.add_clause(&[lhs, !rhs]);
                }
            }
        }

        self.stats.proofs += 1;
        debug!("prove({}, {}) -> proved", a, b);
        Equivalence::Proved
    }

    fn load_scope(&mut self, storage: &Storage, marks: &mut Marks, a: Ref, b: Ref) {
        self.cone.clear();
        transitive_fanin(storage, marks, &[a, b], &mut self.cone);
        self.scope.clear();
        self.scope.push(NodeId::CONST.var());
        self.scope.extend(self.cone.iter().map(|id| id.var()));
        assert!(
            self.scope.iter().all(|v| v.index() < self.solver.num_variables()),
            "Solver has {} variables but the graph has {} nodes",
            self.solver.num_variables(),
            storage.len()
        );
        self.solver.prepare_incremental(&self.scope);
    }

    fn capture_counterexample(&mut self, storage: &Storage) {
        let assignment = (1..=storage.num_inputs() as u32)
            .map(|i| self.solver.model_value(Var::new(i)).unwrap_or(false))
            .collect();
        self.counterexample = Some(assignment);
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;
    use crate::sat::VarisatSolver;
    use crate::sim::Signature;

    /// n1 = x, n2 = y, n3 = x & y, n4 = n3 & x, n5 = ~x & ~y
    fn setup() -> (Storage, Oracle<VarisatSolver<'static>>) {
        let mut storage = Storage::new(16);
        let mut oracle = Oracle::new(VarisatSolver::new());
        let c = storage.create(None, Signature::constant());
        oracle.add_constant(c);
        for _ in 0..2 {
            let id = storage.create(None, Signature::constant());
            oracle.add_input(id);
        }
        let x = Ref::positive(NodeId::new(1));
        let y = Ref::positive(NodeId::new(2));
        for [p1, p2] in [[x, y], [Ref::positive(NodeId::new(3)), x], [!x, !y]] {
            let id = storage.create(Some([p1, p2]), Signature::constant());
            oracle.add_and(id, p1, p2);
        }
        (storage, oracle)
    }

    fn n(i: u32) -> Ref {
        Ref::positive(NodeId::new(i))
    }

    #[test]
    fn test_prove_equal() {
        let (storage, mut oracle) = setup();
        let mut marks = Marks::new();
        assert_eq!(oracle.prove(&storage, &mut marks, n(3), n(4), false), Equivalence::Proved);
        assert_eq!(oracle.prove(&storage, &mut marks, n(4), !n(3), true), Equivalence::Proved);
        assert_eq!(oracle.stats().proofs, 2);
        assert_eq!(oracle.stats().sat_calls, 4);
    }

    #[test]
    fn test_disprove_with_counterexample() {
        let (storage, mut oracle) = setup();
        let mut marks = Marks::new();
        assert_eq!(oracle.prove(&storage, &mut marks, n(3), n(1), false), Equivalence::Disproved);
        let cex = oracle.counterexample().unwrap().to_vec();
        assert_eq!(cex, vec![true, false]);
        assert_eq!(oracle.stats().counterexamples, 1);
    }

    #[test]
    fn test_complemented_phase() {
        let (storage, mut oracle) = setup();
        let mut marks = Marks::new();
        // ~x & ~y is not the complement of x & y.
        assert_eq!(oracle.prove(&storage, &mut marks, n(5), n(3), true), Equivalence::Disproved);
        let cex = oracle.counterexample().unwrap().to_vec();
        assert_ne!(cex[0], cex[1]);
        assert_eq!(oracle.prove(&storage, &mut marks, n(5), n(5), false), Equivalence::Proved);
        assert_eq!(oracle.prove(&storage, &mut marks, n(5), n(5), true), Equivalence::Disproved);
    }

    #[test]
    fn test_query_sees_only_its_cone() {
        let (storage, mut oracle) = setup();
        let mut marks = Marks::new();
        assert_eq!(oracle.prove(&storage, &mut marks, n(3), n(4), false), Equivalence::Proved);
        // Constant, n3, n4 and the two learned clauses.
        assert_eq!(oracle.solver().num_active_clauses(), 9);

        // The cone of n5 is {x, y, n5}; clauses of n3 and n4 sit out.
        assert_eq!(oracle.prove(&storage, &mut marks, n(5), n(1), false), Equivalence::Disproved);
        assert_eq!(oracle.solver().num_active_clauses(), 4);
        assert_eq!(oracle.solver().num_clauses(), 12);
    }

    #[test]
    fn test_skip_zero_word() {
        let (storage, mut oracle) = setup();
        let mut marks = Marks::new();
        let verdict = oracle.check(&storage, &mut marks, n(3), n(4), false, true);
        assert_eq!(verdict, Equivalence::Skipped);
        assert_eq!(oracle.stats().skips, 1);
        assert_eq!(oracle.stats().sat_calls, 0);
    }
}
