//! The FRAIG manager.
//!
//! [`Aig`] owns every node of an And-Inverter Graph and keeps it functionally
//! reduced while it is being built. Each new AND node goes through three
//! filters:
//!
//! 1. **Structural hashing.** An AND over the same (unordered) pair of
//!    children is never created twice.
//! 2. **Simulation.** Every node carries a signature computed from random
//!    input patterns. A fresh node whose signature matches an existing class
//!    becomes a candidate for equivalence.
//! 3. **SAT.** Candidates are checked with an incremental SAT solver. A proof
//!    merges the new node into the older one, which then represents both.
//!
//! All operations take `&self`; the manager state lives behind `RefCell`s.
//!
//! ```
//! use fraig_rs::aig::Aig;
//!
//! let aig = Aig::new(2, 1);
//! let [x, y] = [aig.input(0), aig.input(1)];
//!
//! // De Morgan holds by construction.
//! let f = aig.apply_or(x, y);
//! let g = !aig.apply_and(!x, !y);
//! assert_eq!(f, g);
//!
//! // Structurally different, functionally equal.
//! let h = aig.apply_and(aig.apply_or(x, y), aig.apply_or(x, !y));
//! assert_eq!(h, x);
//! assert!(aig.is_equivalent(h, x, false, false));
//! ```

use std::cell::{Cell, RefCell};
use std::fmt::{Debug, Display, Formatter};

use log::{debug, info};

use crate::cache::Cache;
use crate::cone::{self, Marks};
use crate::equiv::EquivClasses;
use crate::functional::{ClassMembers, Classification, FunctionalTable};
use crate::oracle::{Equivalence, Oracle};
use crate::reference::Ref;
use crate::sat::{SatSolver, VarisatSolver};
use crate::sim::{Signature, Simulator, SIM_WORDS};
use crate::storage::Storage;
use crate::table::{Lookup, StructuralTable};
use crate::types::NodeId;
use crate::utils::MyHash;

/// Session-wide settings.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct FraigConfig {
    /// Seed of the random simulation patterns.
    pub seed: u64,
    /// Log query verdicts and a summary on drop at `info` level.
    pub verbose: bool,
    /// Check simulation candidates with SAT while building. When disabled the
    /// graph is only structurally hashed.
    pub functional_reduction: bool,
    /// Skip the SAT check of candidates whose first signature word is zero.
    pub skip_zero_heuristic: bool,
}

impl Default for FraigConfig {
    fn default() -> Self {
        Self {
            seed: 0x5eed,
            verbose: false,
            functional_reduction: true,
            skip_zero_heuristic: false,
        }
    }
}

impl FraigConfig {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn with_functional_reduction(mut self, enabled: bool) -> Self {
        self.functional_reduction = enabled;
        self
    }

    pub fn with_skip_zero_heuristic(mut self, enabled: bool) -> Self {
        self.skip_zero_heuristic = enabled;
        self
    }
}

/// Counters describing the work done by a session.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq)]
pub struct FraigStats {
    pub nodes: usize,
    pub inputs: usize,
    pub ands: usize,
    pub strash_hits: usize,
    pub classes: usize,
    pub merges: usize,
    pub proofs: usize,
    pub counterexamples: usize,
    pub skips: usize,
    pub sat_calls: usize,
    pub sim_disproofs: usize,
    pub memo_hits: usize,
}

impl Display for FraigStats {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "nodes = {} (inputs = {}, ands = {})",
            self.nodes, self.inputs, self.ands
        )?;
        writeln!(
            f,
            "strash hits = {}, classes = {}, merges = {}",
            self.strash_hits, self.classes, self.merges
        )?;
        write!(
            f,
            "sat calls = {}, proofs = {}, counterexamples = {}, skips = {}, sim disproofs = {}, memo hits = {}",
            self.sat_calls,
            self.proofs,
            self.counterexamples,
            self.skips,
            self.sim_disproofs,
            self.memo_hits
        )
    }
}

/// Query key: `(a, b)` stands for `a ≡ b`, with `a` the lower id and
/// uncomplemented.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
struct QueryKey(Ref, Ref);

impl QueryKey {
    fn new(a: Ref, b: Ref) -> Self {
        let (a, b) = if a.id() <= b.id() { (a, b) } else { (b, a) };
        if a.is_complemented() {
            QueryKey(!a, !b)
        } else {
            QueryKey(a, b)
        }
    }
}

impl MyHash for QueryKey {
    fn hash(&self) -> u64 {
        (self.0.packed(), self.1.packed()).hash()
    }
}

type Verdict = (Equivalence, Option<Vec<bool>>);

pub struct Aig<S: SatSolver = VarisatSolver<'static>> {
    config: FraigConfig,
    num_inputs: usize,
    storage: RefCell<Storage>,
    strash: RefCell<StructuralTable>,
    functional: RefCell<FunctionalTable>,
    classes: RefCell<EquivClasses>,
    oracle: RefCell<Oracle<S>>,
    sim: RefCell<Simulator>,
    marks: RefCell<Marks>,
    memo: RefCell<Cache<QueryKey, Verdict>>,
    outputs: RefCell<Vec<Ref>>,
    strash_hits: Cell<usize>,
    sim_disproofs: Cell<usize>,
    pub zero: Ref,
    pub one: Ref,
}

impl Aig {
    /// Create a session with `n_inputs` primary inputs and `n_outputs`
    /// output slots, using the default configuration.
    pub fn new(n_inputs: usize, n_outputs: usize) -> Self {
        Self::with_config(n_inputs, n_outputs, FraigConfig::default())
    }

    pub fn with_config(n_inputs: usize, n_outputs: usize, config: FraigConfig) -> Self {
        Self::with_solver(n_inputs, n_outputs, config, VarisatSolver::new())
    }
}

impl<S: SatSolver> Aig<S> {
    /// Create a session on top of the given solver, which must be fresh.
    pub fn with_solver(n_inputs: usize, n_outputs: usize, config: FraigConfig, solver: S) -> Self {
        assert_eq!(solver.num_variables(), 0, "Solver must not have any variables");
        debug!(
            "Aig::with_solver(n_inputs = {}, n_outputs = {}, config = {:?})",
            n_inputs, n_outputs, config
        );

        let mut storage = Storage::new(n_inputs + 1);
        let mut functional = FunctionalTable::default();
        let mut classes = EquivClasses::new();
        let mut oracle = Oracle::new(solver);
        let mut sim = Simulator::new(config.seed);

        let c = storage.create(None, Signature::constant());
        assert_eq!(c, NodeId::CONST, "Constant node must be node 0");
        oracle.add_constant(c);
        functional.insert(&mut storage, c);

        for _ in 0..n_inputs {
            let id = storage.create(None, sim.random());
            oracle.add_input(id);
            if let Classification::Candidate(repr) = functional.classify(&mut storage, id) {
                functional.append_diff(&mut storage, repr, id);
            }
        }
        classes.grow(NodeId::new(n_inputs as u32));

        let one = Ref::positive(NodeId::CONST);
        let zero = !one;

        Self {
            config,
            num_inputs: n_inputs,
            storage: RefCell::new(storage),
            strash: RefCell::new(StructuralTable::default()),
            functional: RefCell::new(functional),
            classes: RefCell::new(classes),
            oracle: RefCell::new(oracle),
            sim: RefCell::new(sim),
            marks: RefCell::new(Marks::new()),
            memo: RefCell::new(Cache::new(12)),
            outputs: RefCell::new(vec![zero; n_outputs]),
            strash_hits: Cell::new(0),
            sim_disproofs: Cell::new(0),
            zero,
            one,
        }
    }
}

impl<S: SatSolver> Debug for Aig<S> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Aig")
            .field("inputs", &self.num_inputs)
            .field("nodes", &self.num_nodes())
            .field("classes", &self.functional.borrow().len())
            .finish()
    }
}

impl<S: SatSolver> Drop for Aig<S> {
    fn drop(&mut self) {
        if self.config.verbose {
            info!("FRAIG statistics:\n{}", self.stats());
        }
    }
}

// Inputs and outputs
impl<S: SatSolver> Aig<S> {
    pub fn config(&self) -> &FraigConfig {
        &self.config
    }

    pub fn num_inputs(&self) -> usize {
        self.num_inputs
    }

    pub fn num_outputs(&self) -> usize {
        self.outputs.borrow().len()
    }

    /// Primary input `i` (0-based).
    pub fn input(&self, i: usize) -> Ref {
        assert!(
            i < self.num_inputs,
            "Input index {} out of range 0..{}",
            i,
            self.num_inputs
        );
        Ref::positive(NodeId::new(i as u32 + 1))
    }

    pub fn inputs(&self) -> Vec<Ref> {
        (0..self.num_inputs).map(|i| self.input(i)).collect()
    }

    pub fn output(&self, i: usize) -> Ref {
        let outputs = self.outputs.borrow();
        assert!(i < outputs.len(), "Output index {} out of range 0..{}", i, outputs.len());
        outputs[i]
    }

    pub fn outputs(&self) -> Vec<Ref> {
        self.outputs.borrow().clone()
    }

    pub fn set_output(&self, i: usize, r: Ref) {
        debug!("set_output(i = {}, r = {})", i, r);
        self.check_ref(r);
        let mut outputs = self.outputs.borrow_mut();
        assert!(i < outputs.len(), "Output index {} out of range 0..{}", i, outputs.len());
        outputs[i] = r;
    }

    fn check_ref(&self, r: Ref) {
        assert!(
            self.storage.borrow().contains(r.id()),
            "Reference {} points to a node that does not exist",
            r
        );
    }
}

// Node inspection
impl<S: SatSolver> Aig<S> {
    /// Total number of nodes, including the constant, the inputs and the AND
    /// nodes that were merged into older ones.
    pub fn num_nodes(&self) -> usize {
        self.storage.borrow().len()
    }

    pub fn num_ands(&self) -> usize {
        self.num_nodes() - self.num_inputs - 1
    }

    pub fn is_zero(&self, r: Ref) -> bool {
        r == self.zero
    }
    pub fn is_one(&self, r: Ref) -> bool {
        r == self.one
    }
    pub fn is_const(&self, r: Ref) -> bool {
        r.id() == NodeId::CONST
    }

    pub fn is_input(&self, r: Ref) -> bool {
        let i = r.index();
        i >= 1 && i <= self.num_inputs
    }

    /// Children of an AND node, `None` for the constant and the inputs.
    pub fn fanins(&self, r: Ref) -> Option<[Ref; 2]> {
        self.storage.borrow().node(r.id()).fanins
    }

    /// Representative of the equivalence class of `r`, with the matching
    /// polarity.
    pub fn representative(&self, r: Ref) -> Ref {
        self.classes.borrow().find(r)
    }

    /// Primary inputs (0-based) the function of `r` may depend on.
    pub fn support(&self, r: Ref) -> Vec<usize> {
        let r = self.representative(r);
        self.storage.borrow().node(r.id()).support.iter().collect()
    }

    pub fn level(&self, r: Ref) -> u32 {
        self.storage.borrow().node(r.id()).level
    }

    /// Simulation signature of the node behind `r` (stored orientation).
    pub fn signature(&self, r: Ref) -> Signature {
        self.storage.borrow().signature(r.id()).clone()
    }

    /// Every node reachable from `roots`, sorted by id.
    pub fn transitive_fanin(&self, roots: &[Ref]) -> Vec<NodeId> {
        let mut res = self.topological_order(roots);
        res.sort();
        res
    }

    /// Every node reachable from `roots`, children before parents.
    pub fn topological_order(&self, roots: &[Ref]) -> Vec<NodeId> {
        cone::topological_order(&self.storage.borrow(), &mut self.marks.borrow_mut(), roots)
    }

    /// Logic depth of the cone of `roots`.
    pub fn count_levels(&self, roots: &[Ref]) -> u32 {
        cone::count_levels(&self.storage.borrow(), &mut self.marks.borrow_mut(), roots)
    }

    /// Reset all traversal marks.
    pub fn unmark_all(&self) {
        self.marks.borrow_mut().unmark_all();
    }

    /// Value of `r` under a full input assignment.
    pub fn evaluate(&self, r: Ref, assignment: &[bool]) -> bool {
        assert_eq!(
            assignment.len(),
            self.num_inputs,
            "Assignment must provide a value for each of the {} inputs",
            self.num_inputs
        );
        let order = self.topological_order(&[r]);
        let storage = self.storage.borrow();
        let mut values = vec![false; storage.len()];
        for id in order {
            let node = storage.node(id);
            values[id.index()] = match node.fanins {
                Some([f0, f1]) => {
                    (values[f0.index()] ^ f0.is_complemented())
                        && (values[f1.index()] ^ f1.is_complemented())
                }
                None if node.is_const() => true,
                None => assignment[id.index() - 1],
            };
        }
        values[r.index()] ^ r.is_complemented()
    }

    /// Input assignment (one value per input) that refuted the last
    /// disproved equivalence query.
    pub fn counterexample(&self) -> Option<Vec<bool>> {
        self.oracle.borrow().counterexample().map(|c| c.to_vec())
    }

    pub fn stats(&self) -> FraigStats {
        let oracle = self.oracle.borrow().stats();
        let num_nodes = self.num_nodes();
        FraigStats {
            nodes: num_nodes,
            inputs: self.num_inputs,
            ands: num_nodes - self.num_inputs - 1,
            strash_hits: self.strash_hits.get(),
            classes: self.functional.borrow().len(),
            merges: self.classes.borrow().num_merges(),
            proofs: oracle.proofs,
            counterexamples: oracle.counterexamples,
            skips: oracle.skips,
            sat_calls: oracle.sat_calls,
            sim_disproofs: self.sim_disproofs.get(),
            memo_hits: self.memo.borrow().hits(),
        }
    }
}

// Construction
impl<S: SatSolver> Aig<S> {
    pub fn apply_not(&self, f: Ref) -> Ref {
        debug!("apply_not(f = {})", f);
        !f
    }

    pub fn apply_and(&self, a: Ref, b: Ref) -> Ref {
        debug!("apply_and(a = {}, b = {})", a, b);
        self.check_ref(a);
        self.check_ref(b);

        let a = self.representative(a);
        let b = self.representative(b);

        if a == b {
            debug!("and(A,A) => A");
            return a;
        }
        if a == !b {
            debug!("and(A,~A) => 0");
            return self.zero;
        }
        if self.is_zero(a) || self.is_zero(b) {
            debug!("and(A,0) => 0");
            return self.zero;
        }
        if self.is_one(a) {
            debug!("and(1,B) => B");
            return b;
        }
        if self.is_one(b) {
            debug!("and(A,1) => A");
            return a;
        }

        let lookup = {
            let sim = self.sim.borrow();
            let mut storage = self.storage.borrow_mut();
            self.strash.borrow_mut().lookup_or_insert(&mut storage, a, b, |storage| {
                sim.and(
                    storage.signature(a.id()),
                    a.is_complemented(),
                    storage.signature(b.id()),
                    b.is_complemented(),
                )
            })
        };

        match lookup {
            Lookup::Found(id) => {
                self.strash_hits.set(self.strash_hits.get() + 1);
                let res = self.representative(Ref::positive(id));
                debug!("and({}, {}): structural hit {} => {}", a, b, id, res);
                res
            }
            Lookup::Created(id) => {
                let fanins = self.storage.borrow().node(id).fanins;
                if let Some([p1, p2]) = fanins {
                    self.oracle.borrow_mut().add_and(id, p1, p2);
                }
                self.classes.borrow_mut().grow(id);
                debug!("and({}, {}): created {}", a, b, id);

                if self.config.functional_reduction {
                    self.reduce(id)
                } else {
                    Ref::positive(id)
                }
            }
        }
    }

    /// Merge a freshly created node into an existing class if SAT proves
    /// it equivalent to one of the class members.
    fn reduce(&self, id: NodeId) -> Ref {
        let class = {
            let mut storage = self.storage.borrow_mut();
            self.functional.borrow_mut().classify(&mut storage, id)
        };
        let repr = match class {
            Classification::Unique => return Ref::positive(id),
            Classification::Candidate(repr) => repr,
        };

        let skipped = self.config.skip_zero_heuristic
            && self.oracle.borrow_mut().skips_zero_word(&self.storage.borrow(), id);
        let members: Vec<NodeId> = if skipped {
            debug!("reduce({}): skipped against class {}", id, repr);
            Vec::new()
        } else {
            ClassMembers::new(&self.storage.borrow(), repr).collect()
        };
        for member in members {
            let phase = {
                let storage = self.storage.borrow();
                storage.signature(id).is_inverted() ^ storage.signature(member).is_inverted()
            };
            let verdict = self.oracle.borrow_mut().prove(
                &self.storage.borrow(),
                &mut self.marks.borrow_mut(),
                Ref::positive(member),
                Ref::positive(id),
                phase,
            );
            debug!("reduce({}): {} against {} (phase = {})", id, verdict, member, phase);

            if verdict.is_proved() {
                let winner = Ref::new(member, phase);
                self.classes.borrow_mut().union(Ref::positive(id), winner);
                if self.config.verbose {
                    info!("Merged {} into {}", id, winner);
                }
                return self.representative(winner);
            }
        }

        let mut storage = self.storage.borrow_mut();
        self.functional.borrow().append_diff(&mut storage, repr, id);
        Ref::positive(id)
    }

    pub fn apply_or(&self, a: Ref, b: Ref) -> Ref {
        debug!("apply_or(a = {}, b = {})", a, b);
        !self.apply_and(!a, !b)
    }

    pub fn apply_xor(&self, a: Ref, b: Ref) -> Ref {
        debug!("apply_xor(a = {}, b = {})", a, b);
        self.apply_mux(a, !b, b)
    }

    /// `c ? t : e`
    pub fn apply_mux(&self, c: Ref, t: Ref, e: Ref) -> Ref {
        debug!("apply_mux(c = {}, t = {}, e = {})", c, t, e);
        let ct = self.apply_and(c, t);
        let ce = self.apply_and(!c, e);
        self.apply_or(ct, ce)
    }

    pub fn apply_and_many(&self, nodes: impl IntoIterator<Item = Ref>) -> Ref {
        debug!("apply_and_many(...)");
        let mut res = self.one;
        for node in nodes {
            res = self.apply_and(res, node);
        }
        res
    }

    pub fn apply_or_many(&self, nodes: impl IntoIterator<Item = Ref>) -> Ref {
        debug!("apply_or_many(...)");
        let mut res = self.zero;
        for node in nodes {
            res = self.apply_or(res, node);
        }
        res
    }
}

// Equivalence queries
impl<S: SatSolver> Aig<S> {
    /// Decide whether `a ≡ b ^ phase`.
    ///
    /// With `skip_zero_heuristic` set, queries whose second operand has a zero
    /// first simulation word are not attempted and come back as
    /// [`Equivalence::Skipped`].
    pub fn check_equivalence(&self, a: Ref, b: Ref, phase: bool, skip_zero_heuristic: bool) -> Equivalence {
        debug!(
            "check_equivalence(a = {}, b = {}, phase = {}, skip = {})",
            a, b, phase, skip_zero_heuristic
        );
        self.check_ref(a);
        self.check_ref(b);

        let a = self.representative(a);
        let b = self.representative(b).not_if(phase);

        if a == b {
            debug!("same representative => proved");
            return Equivalence::Proved;
        }
        if a == !b {
            debug!("opposite representatives => disproved");
            self.oracle
                .borrow_mut()
                .set_counterexample(vec![false; self.num_inputs]);
            return Equivalence::Disproved;
        }

        let key = QueryKey::new(a, b);
        if let Some((verdict, cex)) = self.memo.borrow().get(&key) {
            debug!("cache: {} vs {} => {}", a, b, verdict);
            if let Some(cex) = cex {
                self.oracle.borrow_mut().set_counterexample(cex.clone());
            }
            return *verdict;
        }

        let verdict = if let Some(cex) = self.simulation_counterexample(a, b) {
            self.sim_disproofs.set(self.sim_disproofs.get() + 1);
            self.oracle.borrow_mut().set_counterexample(cex);
            Equivalence::Disproved
        } else {
            self.oracle.borrow_mut().check(
                &self.storage.borrow(),
                &mut self.marks.borrow_mut(),
                a,
                b,
                false,
                skip_zero_heuristic,
            )
        };

        if self.config.verbose {
            info!("Equivalence of {} and {}: {}", a, b, verdict);
        }
        if verdict != Equivalence::Skipped {
            let cex = match verdict {
                Equivalence::Disproved => self.counterexample(),
                _ => None,
            };
            self.memo.borrow_mut().insert(key, (verdict, cex));
        }
        verdict
    }

    /// `true` iff `a ≡ b ^ phase` was proved. Skipped queries count as not
    /// equivalent.
    pub fn is_equivalent(&self, a: Ref, b: Ref, phase: bool, skip_zero_heuristic: bool) -> bool {
        self.check_equivalence(a, b, phase, skip_zero_heuristic).is_proved()
    }

    /// Pairwise equivalence of two output vectors of equal length.
    pub fn equivalent_outputs(&self, lhs: &[Ref], rhs: &[Ref]) -> bool {
        assert_eq!(
            lhs.len(),
            rhs.len(),
            "Output vectors must have the same length"
        );
        lhs.iter()
            .zip(rhs)
            .all(|(&a, &b)| self.is_equivalent(a, b, false, false))
    }

    /// Input assignment among the simulation patterns under which `a` and
    /// `b` differ, if there is one.
    fn simulation_counterexample(&self, a: Ref, b: Ref) -> Option<Vec<bool>> {
        let storage = self.storage.borrow();
        let sa = storage.signature(a.id());
        let sb = storage.signature(b.id());
        let k = (0..SIM_WORDS).find_map(|i| {
            let diff = sa.word(i, a.is_complemented()) ^ sb.word(i, b.is_complemented());
            (diff != 0).then(|| i * 32 + diff.trailing_zeros() as usize)
        })?;
        let cex = (1..=self.num_inputs as u32)
            .map(|i| storage.signature(NodeId::new(i)).value(k))
            .collect();
        Some(cex)
    }
}
