//! # fraig-rs: Functionally Reduced And-Inverter Graphs in Rust
//!
//! **`fraig-rs`** builds Boolean networks as And-Inverter Graphs (AIGs) and keeps
//! them *functionally reduced* as they grow: no two nodes of the graph compute
//! the same function, up to complementation.
//! It is meant for combinational equivalence checking and logic optimization.
//!
//! ## What is a FRAIG?
//!
//! An AIG represents a Boolean function with two-input AND gates and
//! complemented edges. Structural hashing alone makes sure that the same gate
//! is never built twice, but different gates may still compute the same
//! function. A FRAIG closes that gap: every new node is simulated on random
//! input patterns, and if its signature matches an existing node, a SAT solver
//! decides whether the two are really equivalent. Proven equivalences are
//! merged on the spot.
//!
//! ## Key Features
//!
//! - **Manager-Centric Architecture**: All operations go through the [`Aig`][crate::aig::Aig] manager, which owns the nodes, the hash tables and the SAT solver.
//! - **Lightweight handles**: A [`Ref`][crate::reference::Ref] is a node id plus a complement bit. Negation is free.
//! - **Incremental SAT**: Every AND node is encoded once; queries only load the clauses of the cones involved, and proven implications are learned.
//! - **Counterexamples**: A failed equivalence query yields a concrete input assignment.
//!
//! ## Basic Usage
//!
//! ```rust
//! use fraig_rs::aig::Aig;
//!
//! // 1. Initialize the manager with 3 inputs and 1 output
//! let aig = Aig::new(3, 1);
//! let (a, b, c) = (aig.input(0), aig.input(1), aig.input(2));
//!
//! // 2. Build two versions of the majority function
//! let ab = aig.apply_and(a, b);
//! let maj1 = aig.apply_or_many([ab, aig.apply_and(a, c), aig.apply_and(b, c)]);
//! let maj2 = aig.apply_mux(aig.apply_xor(a, b), c, a);
//!
//! // 3. They are reduced to the same node
//! assert_eq!(maj1, maj2);
//! aig.set_output(0, maj1);
//!
//! // 4. Failed queries come with a counterexample
//! assert!(!aig.is_equivalent(maj1, ab, false, false));
//! let cex = aig.counterexample().unwrap();
//! assert_ne!(aig.evaluate(maj1, &cex), aig.evaluate(ab, &cex));
//! ```
//!
//! ## Core Components
//!
//! - **[`aig`]**: The [`Aig`][crate::aig::Aig] manager and its configuration.
//! - **[`oracle`]** and **[`sat`]**: SAT-based equivalence checking.
//! - **[`sim`]** and **[`functional`]**: Random simulation and candidate classes.
//! - **[`dot`]**: Utilities for visualizing AIGs using Graphviz.

pub mod aig;
pub mod bitset;
pub mod cache;
pub mod cone;
pub mod debug;
pub mod dot;
pub mod equiv;
pub mod eval;
pub mod functional;
pub mod node;
pub mod oracle;
pub mod reference;
pub mod sat;
pub mod sim;
pub mod storage;
pub mod table;
pub mod types;
pub mod utils;
pub mod vector;
