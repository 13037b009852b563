//! The DPLL engines.
//!
//! Three renditions of the same search: a naive recursive split over
//! full-formula propagation scans, a classical variant with occurrence
//! buckets, the pure-literal rule and weighted branching, and a
//! watched-literal variant with lazy propagation and conflict-driven
//! variable activities.

pub mod classic;
pub mod naive;
pub mod watched;

/// Counters shared by the DPLL engines.
///
/// Not every engine drives every counter: only the classical engine derives
/// pure literals during search, and only the watched engine counts
/// conflicts towards activities.
#[derive(Default, Debug)]
pub struct DpllStats {
    /// Literals (or full scans, for the naive engine) processed by unit
    /// propagation.
    pub propagations: u64,
    /// Unit literals derived by propagation.
    pub units: u64,
    /// Pure-literal assignments.
    pub pures: u64,
    /// Clauses found falsified.
    pub conflicts: u64,
    /// Deepest recursion frame reached.
    pub max_depth: usize,
}

/// Branching bonus for a clause of the given length; shorter clauses weigh
/// more.
pub(crate) fn length_bonus(len: usize) -> f64 {
    2f64.powi(-(len.min(64) as i32))
}
