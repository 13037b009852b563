//! Engine results.

use crate::lit::Lit;

/// The satisfying evidence accompanying a SAT verdict.
///
/// Not every engine can reconstruct the same amount of evidence: search
/// engines produce assignments, while the resolution calculus does not build
/// one on the fly.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Witness {
    /// A total assignment, one literal per variable.
    Total(Vec<Lit>),
    /// A partial assignment; unlisted variables are unconstrained.
    Partial(Vec<Lit>),
    /// Satisfiability established without a reconstructible assignment.
    Bare,
}

impl Witness {
    /// The witnessing literals, when there are any.
    pub fn lits(&self) -> Option<&[Lit]> {
        match self {
            Witness::Total(lits) | Witness::Partial(lits) => Some(lits),
            Witness::Bare => None,
        }
    }
}

/// The result of running an engine to completion.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Verdict {
    /// Some assignment satisfies every clause.
    Sat(Witness),
    /// No assignment satisfies every clause.
    Unsat,
}

impl Verdict {
    /// Whether this is a SAT verdict.
    pub fn is_sat(&self) -> bool {
        matches!(self, Verdict::Sat(_))
    }
}
