//! Exhaustive search over partial assignments.
//!
//! The slowest but simplest decision procedure. Variables are assigned in
//! index order, `true` first. In the default node-evaluating mode every
//! partial assignment is checked, so a branch is abandoned as soon as the
//! partial assignment falsifies some clause and accepted as soon as it
//! satisfies all of them. In leaves-only mode the clause set is evaluated
//! only once all variables are assigned.

use crate::{
    assignment::{Assignment, ClauseStatus},
    cnf::CnfFormula,
    lit::Var,
    note,
    trace::Tracer,
    verdict::{Verdict, Witness},
};

/// Truth-table engine configuration.
#[derive(Default)]
pub struct TruthTable {
    /// Evaluate the clause set only under total assignments.
    pub leaves_only: bool,
}

/// Counters for one truth-table run.
#[derive(Default, Debug)]
pub struct TruthTableStats {
    /// Number of truth-value evaluations of the clause set.
    pub evaluations: u64,
    /// Number of total assignments reached.
    pub leaves: u64,
}

impl TruthTable {
    /// Decides satisfiability of `formula`.
    pub fn solve(&self, formula: &CnfFormula, tracer: &mut Tracer) -> Verdict {
        let mut run = Run {
            formula,
            values: Assignment::new(formula.var_count()),
            stats: TruthTableStats::default(),
            leaves_only: self.leaves_only,
            tracer,
        };

        let verdict = match run.expand(0) {
            Some(witness) => Verdict::Sat(witness),
            None => Verdict::Unsat,
        };

        tracing::debug!(sat = verdict.is_sat(), evaluations = run.stats.evaluations);
        note!(
            run.tracer,
            0,
            "stats: evaluations={} leaves={}",
            run.stats.evaluations,
            run.stats.leaves
        );
        verdict
    }
}

struct Run<'a, 'b> {
    formula: &'a CnfFormula,
    values: Assignment,
    stats: TruthTableStats,
    leaves_only: bool,
    tracer: &'a mut Tracer<'b>,
}

impl Run<'_, '_> {
    /// Truth value of the clause set under the current partial assignment,
    /// `None` when still undetermined.
    fn evaluate(&mut self) -> Option<bool> {
        self.stats.evaluations += 1;
        let mut all_satisfied = true;
        for clause in self.formula.clauses() {
            match self.values.clause_status(clause) {
                ClauseStatus::Satisfied => {}
                ClauseStatus::Falsified => return Some(false),
                _ => all_satisfied = false,
            }
        }
        if all_satisfied {
            Some(true)
        } else {
            None
        }
    }

    fn witness(&self) -> Witness {
        let lits = self.values.assigned_lits();
        if lits.len() == self.formula.var_count() {
            Witness::Total(lits)
        } else {
            Witness::Partial(lits)
        }
    }

    fn expand(&mut self, depth: usize) -> Option<Witness> {
        let at_leaf = depth == self.formula.var_count();
        if at_leaf {
            self.stats.leaves += 1;
        }

        if at_leaf || !self.leaves_only {
            match self.evaluate() {
                Some(true) => {
                    note!(self.tracer, depth, "satisfied");
                    return Some(self.witness());
                }
                Some(false) => {
                    note!(self.tracer, depth, "falsified");
                    return None;
                }
                None => {}
            }
        }

        if at_leaf {
            return None;
        }

        let var = Var::from_index(depth);
        for positive in [true, false] {
            let lit = var.lit(positive);
            self.values.assign(lit);
            if self.tracer.active() {
                let lit_text = self.tracer.lit(lit);
                note!(self.tracer, depth, "trying {lit_text}");
            }
            if let Some(witness) = self.expand(depth + 1) {
                self.values.unassign(var);
                return Some(witness);
            }
            self.values.unassign(var);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::{lit::Lit, trace::TraceBuffer};

    macro_rules! formula {
        ($($($lit:literal),+);* $(;)?) => {
            CnfFormula::from_dimacs_clauses(&[$(vec![$($lit),+]),*])
        };
    }

    fn solve(formula: &CnfFormula, leaves_only: bool) -> Verdict {
        TruthTable { leaves_only }.solve(formula, &mut Tracer::off())
    }

    #[test]
    fn contradictory_units_are_unsat() {
        let formula = formula![-1, 2; 1; -2];
        assert_eq!(solve(&formula, false), Verdict::Unsat);
        assert_eq!(solve(&formula, true), Verdict::Unsat);
    }

    #[test]
    fn implication_chain_is_sat() {
        let formula = formula![-1, 2; 1];
        for leaves_only in [false, true] {
            match solve(&formula, leaves_only) {
                Verdict::Sat(witness) => {
                    let lits = witness.lits().unwrap();
                    assert!(lits.contains(&Lit::from_signed(1)));
                    assert!(lits.contains(&Lit::from_signed(2)));
                }
                Verdict::Unsat => panic!("expected SAT"),
            }
        }
    }

    #[test]
    fn two_variable_pigeonhole_is_unsat() {
        let formula = formula![1, 2; -1, 2; 1, -2; -1, -2];
        assert_eq!(solve(&formula, false), Verdict::Unsat);
        assert_eq!(solve(&formula, true), Verdict::Unsat);
    }

    #[test]
    fn model_satisfies_every_clause() {
        let formula = formula![1, -2, 3; -1, 2, -3; -1, -2, 3; 1, 2, -3];
        match solve(&formula, false) {
            Verdict::Sat(witness) => {
                assert!(formula.satisfied_by(witness.lits().unwrap()));
            }
            Verdict::Unsat => panic!("expected SAT"),
        }
    }

    #[test]
    fn empty_formula_is_sat_without_branching() {
        let formula = CnfFormula::default();
        assert_eq!(
            solve(&formula, false),
            Verdict::Sat(Witness::Total(vec![]))
        );
    }

    #[test]
    fn empty_clause_is_unsat() {
        let mut formula = CnfFormula::default();
        formula.add_clause(&[]);
        assert_eq!(solve(&formula, false), Verdict::Unsat);
    }

    #[test]
    fn node_evaluation_short_circuits() {
        // Under 1=T the second clause is already falsified, so the node mode
        // must prune without descending to the leaves below it.
        let formula = formula![1, 2; -1; 2, 3];
        let mut buffer = TraceBuffer::default();
        let verdict =
            TruthTable { leaves_only: false }.solve(&formula, &mut Tracer::new(&mut buffer));
        assert!(verdict.is_sat());
        let stats_line = &buffer.events.last().unwrap().message;
        assert!(stats_line.starts_with("stats:"), "got {stats_line}");
    }

    #[test]
    fn leaves_mode_visits_leaves() {
        let formula = formula![1, 2];
        let mut buffer = TraceBuffer::default();
        let verdict =
            TruthTable { leaves_only: true }.solve(&formula, &mut Tracer::new(&mut buffer));
        assert!(verdict.is_sat());
        // The very first leaf (1=T, 2=T) already satisfies the clause.
        assert!(buffer
            .events
            .iter()
            .any(|event| event.message == "satisfied" && event.depth == 2));
    }
}
