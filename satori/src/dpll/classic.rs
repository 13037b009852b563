//! DPLL with occurrence buckets, the pure-literal rule and weighted
//! branching.
//!
//! Every literal occurrence is indexed up front. Propagation keeps a queue
//! of derived units and assigns each literal the moment it is derived, so
//! later bucket scans already see the assignment; only the buckets of the
//! freshly falsified literal are visited, never the whole clause set.
//! Variable selection scans the not-yet-satisfied clauses once, detecting
//! pure literals on the way and otherwise picking the variable with the
//! highest length-weighted occurrence score.

use crate::{
    assignment::{Assignment, ClauseStatus},
    cnf::CnfFormula,
    lit::{Lit, Var},
    note,
    trace::Tracer,
    verdict::{Verdict, Witness},
};

use super::{length_bonus, DpllStats};

/// The classical DPLL engine.
#[derive(Default)]
pub struct ClassicDpll;

impl ClassicDpll {
    /// Decides satisfiability of `formula`.
    pub fn solve(&self, formula: &CnfFormula, tracer: &mut Tracer) -> Verdict {
        let var_count = formula.var_count();
        let mut occurrences = vec![vec![]; var_count * 2];
        for (index, clause) in formula.clauses().iter().enumerate() {
            for &lit in clause {
                occurrences[lit.slot()].push(index);
            }
        }

        let mut run = Run {
            clauses: formula.clauses(),
            occurrences,
            var_count,
            values: Assignment::new(var_count),
            model: None,
            stats: DpllStats::default(),
            tracer,
        };

        let verdict = run.solve();

        tracing::debug!(
            sat = verdict.is_sat(),
            units = run.stats.units,
            pures = run.stats.pures,
            max_depth = run.stats.max_depth,
        );
        note!(
            run.tracer,
            0,
            "stats: propagations={} units={} pures={} max_depth={}",
            run.stats.propagations,
            run.stats.units,
            run.stats.pures,
            run.stats.max_depth
        );
        verdict
    }
}

/// Outcome of the selection scan over not-yet-satisfied clauses.
enum Selection {
    /// Every clause is satisfied.
    Satisfied,
    /// A literal occurring in only one polarity; assigning it needs no
    /// second branch.
    Pure(Lit),
    /// The variable with the highest score.
    Split(Var),
}

struct Run<'a, 'b> {
    clauses: &'a [Vec<Lit>],
    /// Clause indices per literal code; every occurrence is indexed.
    occurrences: Vec<Vec<usize>>,
    var_count: usize,
    values: Assignment,
    model: Option<Vec<Lit>>,
    stats: DpllStats,
    tracer: &'a mut Tracer<'b>,
}

impl Run<'_, '_> {
    fn solve(&mut self) -> Verdict {
        // Input units seed the first propagation.
        let mut seeds = vec![];
        for clause in self.clauses {
            match clause[..] {
                [] => return Verdict::Unsat,
                [lit] => {
                    if self.values.is_false(lit) {
                        return Verdict::Unsat;
                    }
                    if !self.values.is_assigned(lit.var()) {
                        self.values.assign(lit);
                        seeds.push(lit);
                    }
                }
                _ => {}
            }
        }

        let sat = match self.propagate(seeds, 0) {
            None => false,
            Some(_) => self.split(0),
        };

        if sat {
            let lits = self.model.take().unwrap_or_default();
            if lits.len() == self.var_count {
                Verdict::Sat(Witness::Total(lits))
            } else {
                Verdict::Sat(Witness::Partial(lits))
            }
        } else {
            Verdict::Unsat
        }
    }

    fn split(&mut self, depth: usize) -> bool {
        self.stats.max_depth = self.stats.max_depth.max(depth);

        match self.select() {
            Selection::Satisfied => {
                self.model = Some(self.values.assigned_lits());
                note!(self.tracer, depth, "all clauses satisfied");
                true
            }
            Selection::Pure(lit) => {
                self.stats.pures += 1;
                if self.tracer.active() {
                    let lit_text = self.tracer.lit(lit);
                    note!(self.tracer, depth, "pure {lit_text}");
                }
                if self.assume(lit, depth) {
                    return true;
                }
                // A pure literal cannot be part of any conflict, so there is
                // no second branch to try.
                false
            }
            Selection::Split(var) => {
                for positive in [true, false] {
                    let lit = var.lit(positive);
                    if self.tracer.active() {
                        let lit_text = self.tracer.lit(lit);
                        note!(self.tracer, depth, "split on {lit_text}");
                    }
                    if self.assume(lit, depth) {
                        return true;
                    }
                }
                false
            }
        }
    }

    /// Assigns `lit`, propagates, and recurses. Restores every assignment
    /// this frame introduced when the subtree fails.
    fn assume(&mut self, lit: Lit, depth: usize) -> bool {
        self.values.assign(lit);
        if let Some(propagated) = self.propagate(vec![lit], depth) {
            if self.split(depth + 1) {
                return true;
            }
            for var in propagated {
                self.values.unassign(var);
            }
        }
        self.values.unassign(lit.var());
        false
    }

    /// Propagates from already-assigned seed literals. Returns the variables
    /// assigned by propagation, or `None` after a conflict (with those
    /// assignments restored).
    fn propagate(&mut self, seeds: Vec<Lit>, depth: usize) -> Option<Vec<Var>> {
        let mut derived = seeds;
        let mut assigned: Vec<Var> = vec![];
        let mut head = 0;

        while head < derived.len() {
            let lit = derived[head];
            head += 1;
            self.stats.propagations += 1;

            // Clauses containing !lit just lost a literal.
            for scan in 0..self.occurrences[(!lit).slot()].len() {
                let clause_index = self.occurrences[(!lit).slot()][scan];
                match self.values.clause_status(&self.clauses[clause_index]) {
                    ClauseStatus::Satisfied | ClauseStatus::Open => {}
                    ClauseStatus::Falsified => {
                        self.stats.conflicts += 1;
                        note!(self.tracer, depth, "conflict");
                        for &var in &assigned {
                            self.values.unassign(var);
                        }
                        return None;
                    }
                    ClauseStatus::Unit(unit) => {
                        self.values.assign(unit);
                        derived.push(unit);
                        assigned.push(unit.var());
                        self.stats.units += 1;
                        if self.tracer.active() {
                            let lit_text = self.tracer.lit(unit);
                            note!(self.tracer, depth, "unit {lit_text}");
                        }
                    }
                }
            }
        }

        Some(assigned)
    }

    /// One scan over the not-yet-satisfied clauses: free literals are
    /// counted per polarity for the pure-literal rule and scored with a
    /// length bonus for splitting.
    fn select(&self) -> Selection {
        let mut polarity_seen = vec![[false; 2]; self.var_count];
        let mut scores = vec![0f64; self.var_count];
        let mut any_unsatisfied = false;
        let mut free = vec![];

        'clauses: for clause in self.clauses {
            free.clear();
            for &lit in clause {
                if self.values.is_true(lit) {
                    continue 'clauses;
                }
                if !self.values.is_false(lit) {
                    free.push(lit);
                }
            }
            any_unsatisfied = true;
            let bonus = length_bonus(free.len());
            for &lit in &free {
                polarity_seen[lit.index()][lit.is_positive() as usize] = true;
                scores[lit.index()] += bonus;
            }
        }

        if !any_unsatisfied {
            return Selection::Satisfied;
        }

        for index in 0..self.var_count {
            match polarity_seen[index] {
                [true, false] => return Selection::Pure(Var::from_index(index).lit(false)),
                [false, true] => return Selection::Pure(Var::from_index(index).lit(true)),
                _ => {}
            }
        }

        let mut best: Option<(Var, f64)> = None;
        for index in 0..self.var_count {
            if polarity_seen[index] == [false, false] {
                continue;
            }
            let score = scores[index];
            if best.map_or(true, |(_, best_score)| score > best_score) {
                best = Some((Var::from_index(index), score));
            }
        }
        let (var, _) = best.expect("open clause without a free variable");
        Selection::Split(var)
    }
}
