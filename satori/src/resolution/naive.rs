//! Unrestricted given-clause resolution.
//!
//! Clauses are consumed front to back; every literal of the selected clause
//! is tried as pivot against every matching opposite literal of every
//! processed clause. Forward subsumption against the processed set is the
//! only redundancy filter, which is enough for termination: processed never
//! accumulates a clause it already contains.

use std::collections::VecDeque;

use crate::{
    assignment::Assignment,
    cnf::CnfFormula,
    lit::Lit,
    note,
    subsume::{merge, subsumes, MergeResult},
    trace::Tracer,
    verdict::{Verdict, Witness},
};

use super::ResolutionStats;

/// The naive resolution engine.
///
/// A SAT verdict carries no witness: the resolution calculus does not
/// construct an assignment on the way, and none is fabricated.
#[derive(Default)]
pub struct NaiveResolution;

impl NaiveResolution {
    /// Decides satisfiability of `formula` by saturation.
    pub fn solve(&self, formula: &CnfFormula, tracer: &mut Tracer) -> Verdict {
        let mut run = Run {
            usable: formula.clauses().iter().cloned().collect(),
            processed: vec![],
            no_units: Assignment::new(formula.var_count()),
            stats: ResolutionStats::default(),
            tracer,
        };

        let verdict = run.saturate();

        tracing::debug!(
            sat = verdict.is_sat(),
            selected = run.stats.selected,
            kept = run.stats.kept,
        );
        note!(
            run.tracer,
            0,
            "stats: selected={} generated={} kept={}",
            run.stats.selected,
            run.stats.generated,
            run.stats.kept
        );
        verdict
    }
}

struct Run<'a, 'b> {
    usable: VecDeque<Vec<Lit>>,
    processed: Vec<Vec<Lit>>,
    /// All-unassigned; disables the unit rules of [`merge`].
    no_units: Assignment,
    stats: ResolutionStats,
    tracer: &'a mut Tracer<'b>,
}

impl Run<'_, '_> {
    fn saturate(&mut self) -> Verdict {
        while let Some(given) = self.usable.pop_front() {
            if given.is_empty() {
                note!(self.tracer, 0, "empty clause");
                return Verdict::Unsat;
            }
            self.stats.selected += 1;

            if self.processed.iter().any(|prior| subsumes(prior, &given)) {
                if self.tracer.active() {
                    let clause_text = self.tracer.clause(&given);
                    note!(self.tracer, 1, "subsumed: {clause_text}");
                }
                continue;
            }

            if self.tracer.active() {
                let clause_text = self.tracer.clause(&given);
                note!(self.tracer, 0, "given: {clause_text}");
            }

            self.processed.push(given.clone());

            for partner_index in 0..self.processed.len() {
                for (i1, &pivot) in given.iter().enumerate() {
                    let partner = &self.processed[partner_index];
                    for i2 in 0..partner.len() {
                        if partner[i2] != !pivot {
                            continue;
                        }
                        self.stats.generated += 1;
                        match merge(&given, i1, partner, i2, &self.no_units) {
                            MergeResult::Tautology => {}
                            MergeResult::Empty => {
                                note!(self.tracer, 1, "derived the empty clause");
                                return Verdict::Unsat;
                            }
                            MergeResult::Resolvent(resolvent) => {
                                if self.tracer.active() {
                                    let clause_text = self.tracer.clause(&resolvent);
                                    note!(self.tracer, 1, "resolvent: {clause_text}");
                                }
                                self.stats.kept += 1;
                                self.usable.push_back(resolvent);
                            }
                        }
                    }
                }
            }
        }

        note!(self.tracer, 0, "saturated without the empty clause");
        Verdict::Sat(Witness::Bare)
    }
}
