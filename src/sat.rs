//! SAT collaborator.
//!
//! The engine talks to the solver through [`SatSolver`]. Variables are created
//! in node order (node `i` is variable `i`), clauses are added once per node,
//! and queries are incremental: assumptions only live for one `solve` call,
//! while added clauses are permanent.
//!
//! [`VarisatSolver`] implements the trait on top of the `varisat` crate.
//! Every clause belongs to its highest variable and is guarded by that
//! variable's activation literal. A solve assumes only the activation
//! literals of the current scope, so clauses of nodes outside the scope take
//! no part in it.

use log::trace;
use varisat::ExtendFormula;

use crate::bitset::BitSet;
use crate::types::{Lit, Var};

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SatResult {
    Sat,
    Unsat,
}

pub trait SatSolver {
    /// Allocate the next variable.
    fn new_variable(&mut self) -> Var;

    /// Number of variables created so far.
    fn num_variables(&self) -> usize;

    /// Add a permanent clause. Returns `false` if the clause is empty.
    fn add_clause(&mut self, lits: &[Lit]) -> bool;

    /// Restrict the following solves to exactly the clauses over `scope`.
    /// Clauses outside the scope stay in the solver but are not considered
    /// until a later scope covers them again.
    fn prepare_incremental(&mut self, scope: &[Var]);

    /// Solve under the given assumptions.
    fn solve(&mut self, assumptions: &[Lit]) -> SatResult;

    /// Value of `var` in the model of the last satisfiable call.
    fn model_value(&self, var: Var) -> Option<bool>;
}

/// Variable `v` is varisat variable `2v`, its activation literal is `2v + 1`.
fn to_varisat(lit: Lit) -> varisat::Lit {
    varisat::Lit::from_index(2 * lit.var().index(), lit.is_positive())
}

fn activation(var: usize) -> varisat::Lit {
    varisat::Lit::from_index(2 * var + 1, true)
}

/// [`SatSolver`] backed by [`varisat::Solver`].
pub struct VarisatSolver<'a> {
    solver: varisat::Solver<'a>,
    num_vars: usize,
    /// Number of clauses owned by each variable.
    owned: Vec<usize>,
    in_scope: BitSet,
    /// Activation literals of the current scope.
    scope: Vec<varisat::Lit>,
    num_active: usize,
    model: Vec<Option<bool>>,
    contradiction: bool,
}

impl Default for VarisatSolver<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> VarisatSolver<'a> {
    pub fn new() -> Self {
        Self {
            solver: varisat::Solver::new(),
            num_vars: 0,
            owned: Vec::new(),
            in_scope: BitSet::empty(),
            scope: Vec::new(),
            num_active: 0,
            model: Vec::new(),
            contradiction: false,
        }
    }

    /// Clauses taking part in the following solves.
    pub fn num_active_clauses(&self) -> usize {
        self.num_active
    }

    /// Clauses added so far, in or out of scope.
    pub fn num_clauses(&self) -> usize {
        self.owned.iter().sum()
    }
}

impl SatSolver for VarisatSolver<'_> {
    fn new_variable(&mut self) -> Var {
        let v = self.solver.new_var();
        let act = self.solver.new_var();
        assert_eq!(
            (v.index(), act.index()),
            (2 * self.num_vars, 2 * self.num_vars + 1),
            "Solver variable {} does not match the expected index {}",
            v.index(),
            2 * self.num_vars
        );
        self.num_vars += 1;
        self.owned.push(0);
        Var::new((v.index() / 2) as u32)
    }

    fn num_variables(&self) -> usize {
        self.num_vars
    }

    fn add_clause(&mut self, lits: &[Lit]) -> bool {
        if lits.is_empty() {
            self.contradiction = true;
            return false;
        }
        for lit in lits {
            assert!(
                lit.var().index() < self.num_vars,
                "Clause mentions unknown variable {}",
                lit.var()
            );
        }
        let owner = lits.iter().map(|lit| lit.var().index()).max().unwrap_or(0);
        self.owned[owner] += 1;
        if self.in_scope.contains(owner) {
            self.num_active += 1;
        }
        trace!("add_clause({:?}) owned by v{}", lits, owner);

        let mut clause: Vec<varisat::Lit> = lits.iter().copied().map(to_varisat).collect();
        clause.push(!activation(owner));
        self.solver.add_clause(&clause);
        true
    }

    fn prepare_incremental(&mut self, scope: &[Var]) {
        self.in_scope = BitSet::empty();
        self.scope.clear();
        self.num_active = 0;
        for var in scope {
            assert!(
                var.index() < self.num_vars,
                "Scope mentions unknown variable {}",
                var
            );
            if self.in_scope.insert(var.index()) {
                self.scope.push(activation(var.index()));
                self.num_active += self.owned[var.index()];
            }
        }
        trace!(
            "prepare_incremental: {} vars in scope, {} of {} clauses active",
            self.scope.len(),
            self.num_active,
            self.num_clauses()
        );
    }

    fn solve(&mut self, assumptions: &[Lit]) -> SatResult {
        self.model.clear();
        if self.contradiction {
            return SatResult::Unsat;
        }

        let mut lits = self.scope.clone();
        lits.extend(assumptions.iter().copied().map(to_varisat));
        self.solver.assume(&lits);
        match self.solver.solve() {
            Ok(true) => {
                self.model = vec![None; self.num_vars];
                if let Some(model) = self.solver.model() {
                    for lit in model.iter().filter(|lit| lit.var().index() % 2 == 0) {
                        if let Some(slot) = self.model.get_mut(lit.var().index() / 2) {
                            *slot = Some(lit.is_positive());
                        }
                    }
                }
                SatResult::Sat
            }
            Ok(false) => SatResult::Unsat,
            Err(e) => panic!("SAT solver failed: {:?}", e),
        }
    }

    fn model_value(&self, var: Var) -> Option<bool> {
        self.model.get(var.index()).copied().flatten()
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;

    fn vars(solver: &mut impl SatSolver, n: usize) -> Vec<Var> {
        (0..n).map(|_| solver.new_variable()).collect()
    }

    #[test]
    fn test_variables_in_order() {
        let mut solver = VarisatSolver::new();
        let vs = vars(&mut solver, 3);
        assert_eq!(vs, vec![Var::new(0), Var::new(1), Var::new(2)]);
        assert_eq!(solver.num_variables(), 3);
    }

    #[test]
    fn test_assumptions_are_temporary() {
        let mut solver = VarisatSolver::new();
        let v = vars(&mut solver, 2);
        solver.prepare_incremental(&v);
        // v0 -> v1
        assert!(solver.add_clause(&[v[0].neg(), v[1].pos()]));

        assert_eq!(solver.solve(&[v[0].pos(), v[1].neg()]), SatResult::Unsat);
        assert_eq!(solver.solve(&[v[0].pos()]), SatResult::Sat);
        assert_eq!(solver.model_value(v[1]), Some(true));
        assert_eq!(solver.solve(&[]), SatResult::Sat);
    }

    #[test]
    fn test_scope_activation() {
        let mut solver = VarisatSolver::new();
        let v = vars(&mut solver, 3);
        // v2 <-> v0 & v1
        solver.add_clause(&[v[2].neg(), v[0].pos()]);
        solver.add_clause(&[v[2].neg(), v[1].pos()]);
        solver.add_clause(&[v[2].pos(), v[0].neg(), v[1].neg()]);
        assert_eq!(solver.num_clauses(), 3);

        // Outside the scope the gate is unconstrained.
        solver.prepare_incremental(&v[..2]);
        assert_eq!(solver.num_active_clauses(), 0);
        assert_eq!(solver.solve(&[v[2].pos(), v[0].neg()]), SatResult::Sat);

        solver.prepare_incremental(&v);
        assert_eq!(solver.num_active_clauses(), 3);
        assert_eq!(solver.solve(&[v[2].pos(), v[0].neg()]), SatResult::Unsat);
        assert_eq!(solver.solve(&[v[2].pos()]), SatResult::Sat);
        assert_eq!(solver.model_value(v[0]), Some(true));
        assert_eq!(solver.model_value(v[1]), Some(true));
    }

    #[test]
    fn test_previous_scope_is_dropped() {
        let mut solver = VarisatSolver::new();
        let v = vars(&mut solver, 4);
        // v0 -> v1, v2 -> v3
        solver.add_clause(&[v[0].neg(), v[1].pos()]);
        solver.add_clause(&[v[2].neg(), v[3].pos()]);

        solver.prepare_incremental(&v[..2]);
        assert_eq!(solver.num_active_clauses(), 1);
        assert_eq!(solver.solve(&[v[0].pos(), v[1].neg()]), SatResult::Unsat);
        assert_eq!(solver.solve(&[v[2].pos(), v[3].neg()]), SatResult::Sat);

        solver.prepare_incremental(&v[2..]);
        assert_eq!(solver.num_active_clauses(), 1);
        assert_eq!(solver.solve(&[v[0].pos(), v[1].neg()]), SatResult::Sat);
        assert_eq!(solver.solve(&[v[2].pos(), v[3].neg()]), SatResult::Unsat);

        // Clauses come back with their scope.
        solver.prepare_incremental(&v[..2]);
        assert_eq!(solver.solve(&[v[0].pos(), v[1].neg()]), SatResult::Unsat);
    }

    #[test]
    fn test_clause_added_inside_scope() {
        let mut solver = VarisatSolver::new();
        let v = vars(&mut solver, 2);
        solver.prepare_incremental(&v);
        solver.add_clause(&[v[0].pos(), v[1].pos()]);
        assert_eq!(solver.num_active_clauses(), 1);
        assert_eq!(solver.solve(&[v[0].neg(), v[1].neg()]), SatResult::Unsat);

        solver.prepare_incremental(&v[..1]);
        assert_eq!(solver.num_active_clauses(), 0);
        assert_eq!(solver.solve(&[v[0].neg(), v[1].neg()]), SatResult::Sat);
    }

    #[test]
    fn test_empty_clause() {
        let mut solver = VarisatSolver::new();
        vars(&mut solver, 1);
        assert!(!solver.add_clause(&[]));
        assert_eq!(solver.solve(&[]), SatResult::Unsat);
    }
}
