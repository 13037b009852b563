//! Deciding satisfiability of propositional formulas in conjunctive normal
//! form.
//!
//! Three families of decision procedures over a shared clause model:
//!
//! - [`truth_table`]: exhaustive search over partial assignments.
//! - [`resolution`]: given-clause saturation, naive and ordered.
//! - [`dpll`]: recursive search with unit propagation, from a naive
//!   full-scan variant up to two watched literals with conflict-driven
//!   activities.
//!
//! Every engine consumes a [`cnf::CnfFormula`], narrates its run through a
//! [`trace::Tracer`], and returns a [`verdict::Verdict`]. Engines own their
//! run state; the same engine value can be used for any number of
//! independent runs.
#![warn(missing_docs)]

pub mod assignment;
pub mod cnf;
pub mod dpll;
pub mod lit;
pub mod resolution;
pub mod subsume;
pub mod trace;
pub mod truth_table;
pub mod verdict;
