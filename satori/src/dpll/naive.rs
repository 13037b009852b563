//! Recursive DPLL without indexing.
//!
//! Unit propagation rescans the whole clause set until a fixpoint: all units
//! found in one scan are collected, then applied, then the scan repeats.
//! Splitting picks the first unassigned variable and tries `true` before
//! `false`.

use crate::{
    assignment::{Assignment, ClauseStatus},
    cnf::CnfFormula,
    lit::{Lit, Var},
    note,
    trace::Tracer,
    verdict::{Verdict, Witness},
};

use super::DpllStats;

/// The naive DPLL engine.
#[derive(Default)]
pub struct NaiveDpll;

impl NaiveDpll {
    /// Decides satisfiability of `formula`.
    pub fn solve(&self, formula: &CnfFormula, tracer: &mut Tracer) -> Verdict {
        let mut run = Run {
            clauses: formula.clauses(),
            var_count: formula.var_count(),
            values: Assignment::new(formula.var_count()),
            model: None,
            stats: DpllStats::default(),
            tracer,
        };

        let verdict = if run.split(0) {
            let lits = run.model.take().unwrap_or_default();
            if lits.len() == run.var_count {
                Verdict::Sat(Witness::Total(lits))
            } else {
                Verdict::Sat(Witness::Partial(lits))
            }
        } else {
            Verdict::Unsat
        };

        tracing::debug!(sat = verdict.is_sat(), max_depth = run.stats.max_depth);
        note!(
            run.tracer,
            0,
            "stats: propagations={} units={} max_depth={}",
            run.stats.propagations,
            run.stats.units,
            run.stats.max_depth
        );
        verdict
    }
}

enum Propagation {
    /// Every clause is satisfied.
    Satisfied,
    /// Some clause is falsified; all assignments made by this propagation
    /// have been restored.
    Conflict,
    /// Fixpoint reached with open clauses; lists the variables this
    /// propagation assigned.
    Open(Vec<Var>),
}

struct Run<'a, 'b> {
    clauses: &'a [Vec<Lit>],
    var_count: usize,
    values: Assignment,
    model: Option<Vec<Lit>>,
    stats: DpllStats,
    tracer: &'a mut Tracer<'b>,
}

impl Run<'_, '_> {
    fn split(&mut self, depth: usize) -> bool {
        self.stats.max_depth = self.stats.max_depth.max(depth);

        let propagated = match self.propagate(depth) {
            Propagation::Conflict => return false,
            Propagation::Satisfied => {
                self.model = Some(self.values.assigned_lits());
                note!(self.tracer, depth, "all clauses satisfied");
                return true;
            }
            Propagation::Open(propagated) => propagated,
        };

        let var = (0..self.var_count)
            .map(Var::from_index)
            .find(|&var| !self.values.is_assigned(var))
            .expect("open clause without an unassigned variable");

        for positive in [true, false] {
            let lit = var.lit(positive);
            self.values.assign(lit);
            if self.tracer.active() {
                let lit_text = self.tracer.lit(lit);
                note!(self.tracer, depth, "split on {lit_text}");
            }
            if self.split(depth + 1) {
                return true;
            }
            self.values.unassign(var);
        }

        for var in propagated {
            self.values.unassign(var);
        }
        false
    }

    fn propagate(&mut self, depth: usize) -> Propagation {
        let mut assigned: Vec<Var> = vec![];
        loop {
            let mut units: Vec<Lit> = vec![];
            let mut all_satisfied = true;
            for clause in self.clauses {
                match self.values.clause_status(clause) {
                    ClauseStatus::Satisfied => {}
                    ClauseStatus::Falsified => {
                        self.stats.conflicts += 1;
                        note!(self.tracer, depth, "conflict");
                        for &var in &assigned {
                            self.values.unassign(var);
                        }
                        return Propagation::Conflict;
                    }
                    ClauseStatus::Unit(lit) => {
                        all_satisfied = false;
                        units.push(lit);
                    }
                    ClauseStatus::Open => all_satisfied = false,
                }
            }

            if all_satisfied {
                return Propagation::Satisfied;
            }
            if units.is_empty() {
                return Propagation::Open(assigned);
            }

            self.stats.propagations += 1;
            for lit in units {
                if !self.values.is_assigned(lit.var()) {
                    self.values.assign(lit);
                    assigned.push(lit.var());
                    self.stats.units += 1;
                    if self.tracer.active() {
                        let lit_text = self.tracer.lit(lit);
                        note!(self.tracer, depth, "unit {lit_text}");
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    macro_rules! formula {
        ($($($lit:literal),+);* $(;)?) => {
            CnfFormula::from_dimacs_clauses(&[$(vec![$($lit),+]),*])
        };
    }

    fn solve(formula: &CnfFormula) -> Verdict {
        NaiveDpll.solve(formula, &mut Tracer::off())
    }

    #[test]
    fn contradictory_units_are_unsat() {
        assert_eq!(solve(&formula![-1, 2; 1; -2]), Verdict::Unsat);
    }

    #[test]
    fn propagation_alone_solves_implication_chains() {
        match solve(&formula![-1, 2; 1]) {
            Verdict::Sat(witness) => {
                let lits = witness.lits().unwrap();
                assert!(lits.contains(&Lit::from_signed(1)));
                assert!(lits.contains(&Lit::from_signed(2)));
            }
            Verdict::Unsat => panic!("expected SAT"),
        }
    }

    #[test]
    fn two_variable_pigeonhole_is_unsat() {
        assert_eq!(solve(&formula![1, 2; -1, 2; 1, -2; -1, -2]), Verdict::Unsat);
    }

    #[test]
    fn all_negative_units_refute_a_positive_clause() {
        assert_eq!(solve(&formula![1, 2, 3; -1; -2; -3]), Verdict::Unsat);
    }

    #[test]
    fn model_satisfies_every_clause() {
        let formula = formula![1, -2, 3; -1, 2, -3; -1, -2, 3; 1, 2, -3];
        match solve(&formula) {
            Verdict::Sat(witness) => {
                assert!(formula.satisfied_by(witness.lits().unwrap()))
            }
            Verdict::Unsat => panic!("expected SAT"),
        }
    }

    #[test]
    fn empty_clause_is_unsat() {
        let mut formula = CnfFormula::default();
        formula.add_clause(&[]);
        assert_eq!(solve(&formula), Verdict::Unsat);
    }

    #[test]
    fn empty_formula_is_sat() {
        assert!(solve(&CnfFormula::default()).is_sat());
    }
}
