//! Clause sets and variable names.

use thiserror::Error;

use crate::lit::{Lit, Var};

/// Error raised by the bounds-checked formula construction path.
#[derive(Error, Debug)]
pub enum CnfError {
    /// A clause mentions a variable outside the declared range.
    #[error("variable {var} exceeds the declared maximum of {max_var}")]
    VariableOutOfRange {
        /// The offending variable, as its DIMACS index.
        var: isize,
        /// The declared maximum, as a DIMACS index.
        max_var: isize,
    },
}

/// A CNF formula: a conjunction of clauses over variables `1…V`.
///
/// Clauses are stored as plain literal sequences in input order. Input
/// ordering carries no meaning but may influence search, so it is preserved.
///
/// There are two construction paths, matching the two tolerated policies for
/// structurally invalid input: [`add_clause`][Self::add_clause] grows the
/// variable range to cover whatever it is given, while
/// [`try_add_clause`][Self::try_add_clause] fails fast when a clause exceeds
/// the declared range.
#[derive(Default, Clone)]
pub struct CnfFormula {
    var_count: usize,
    clauses: Vec<Vec<Lit>>,
}

impl CnfFormula {
    /// An empty formula with a declared number of variables.
    pub fn with_var_count(var_count: usize) -> CnfFormula {
        CnfFormula {
            var_count,
            clauses: vec![],
        }
    }

    /// Builds a formula from clauses in the signed-integer DIMACS convention.
    ///
    /// The variable count is computed as the maximum over the input.
    pub fn from_dimacs_clauses(clauses: &[Vec<isize>]) -> CnfFormula {
        let mut formula = CnfFormula::default();
        for clause in clauses {
            let lits: Vec<Lit> = clause.iter().map(|&n| Lit::from_signed(n)).collect();
            formula.add_clause(&lits);
        }
        formula
    }

    /// Number of variables.
    pub fn var_count(&self) -> usize {
        self.var_count
    }

    /// Number of clauses.
    pub fn clause_count(&self) -> usize {
        self.clauses.len()
    }

    /// The stored clauses.
    pub fn clauses(&self) -> &[Vec<Lit>] {
        &self.clauses
    }

    /// Adds a clause, growing the variable range as needed.
    pub fn add_clause(&mut self, lits: &[Lit]) {
        for &lit in lits {
            self.var_count = self.var_count.max(lit.index() + 1);
        }
        self.clauses.push(lits.to_vec());
    }

    /// Adds a clause, failing when it exceeds the declared variable range.
    pub fn try_add_clause(&mut self, lits: &[Lit]) -> Result<(), CnfError> {
        for &lit in lits {
            if lit.index() >= self.var_count {
                return Err(CnfError::VariableOutOfRange {
                    var: lit.var().number() as isize,
                    max_var: self.var_count as isize,
                });
            }
        }
        self.clauses.push(lits.to_vec());
        Ok(())
    }

    /// Whether every clause contains at least one of the given literals.
    ///
    /// This is the SAT-direction soundness check: a total model must satisfy
    /// it, and so must any partial witness whose unassigned variables are
    /// unconstrained.
    pub fn satisfied_by(&self, witness: &[Lit]) -> bool {
        self.clauses
            .iter()
            .all(|clause| clause.iter().any(|lit| witness.contains(lit)))
    }
}

/// Human-readable names for variables, as supplied by a parser collaborator.
///
/// Position `i` holds the token for variable `i` in DIMACS numbering;
/// position 0 is reserved and never read.
#[derive(Default, Clone)]
pub struct VarNames {
    names: Vec<String>,
}

impl VarNames {
    /// Builds a name table from tokens for variables `1…n`, in order.
    ///
    /// The reserved slot 0 is inserted here; callers pass names only.
    pub fn from_names<S: Into<String>>(names: impl IntoIterator<Item = S>) -> VarNames {
        let mut table = vec![String::new()];
        table.extend(names.into_iter().map(Into::into));
        VarNames { names: table }
    }

    /// The name of a variable, if the table covers it.
    ///
    /// A table shorter than the formula's variable range is tolerated; the
    /// trace formatter falls back to the numeric encoding.
    pub fn get(&self, var: Var) -> Option<&str> {
        let slot = var.index() + 1;
        self.names.get(slot).map(String::as_str).filter(|name| !name.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn growable_path_recomputes_var_count() {
        let formula = CnfFormula::from_dimacs_clauses(&[vec![1, -2], vec![7]]);
        assert_eq!(formula.var_count(), 7);
        assert_eq!(formula.clause_count(), 2);
    }

    #[test]
    fn checked_path_rejects_out_of_range_variables() {
        let mut formula = CnfFormula::with_var_count(2);
        assert!(formula.try_add_clause(&[Lit::from_signed(1)]).is_ok());
        let err = formula
            .try_add_clause(&[Lit::from_signed(3)])
            .unwrap_err();
        assert!(matches!(
            err,
            CnfError::VariableOutOfRange { var: 3, max_var: 2 }
        ));
    }

    #[test]
    fn satisfied_by_checks_every_clause() {
        let formula = CnfFormula::from_dimacs_clauses(&[vec![1, 2], vec![-1, 2]]);
        let model = [Lit::from_signed(1), Lit::from_signed(2)];
        assert!(formula.satisfied_by(&model));
        assert!(!formula.satisfied_by(&[Lit::from_signed(1)]));
    }

    #[test]
    fn name_table_reserves_slot_zero() {
        let names = VarNames::from_names(["rain", "wet"]);
        assert_eq!(names.get(Var::new(1)), Some("rain"));
        assert_eq!(names.get(Var::new(2)), Some("wet"));
        assert_eq!(names.get(Var::new(3)), None);
    }
}
