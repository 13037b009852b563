//! Resolution-based saturation engines.
//!
//! Both engines run a given-clause loop: repeatedly select a clause from the
//! usable set, resolve it against the processed set, and move it to the
//! processed set. Deriving the empty clause refutes the input; an exhausted
//! usable set means the input is satisfiable.

pub mod naive;
pub mod ordered;

/// Counters shared by the resolution engines.
#[derive(Default, Debug)]
pub struct ResolutionStats {
    /// Clauses selected from the usable set.
    pub selected: u64,
    /// Resolvents constructed.
    pub generated: u64,
    /// Resolvents kept after filtering.
    pub kept: u64,
}
