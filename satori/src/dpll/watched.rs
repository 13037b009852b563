//! DPLL with two watched literals and conflict-driven activities.
//!
//! Each clause carries a header naming its two watched literals; per-literal
//! watch lists hold the indices of the clauses watching that literal.
//! Assigning a literal only visits the clauses watching its complement: each
//! either turns out satisfied, moves its watch to another non-false literal,
//! becomes unit, or is a conflict. Watch moves are never undone on
//! backtracking; while a clause is not in conflict, a watched literal is
//! either non-false or its clause is satisfied, and that invariant survives
//! unassignment.
//!
//! Decisions pick the unassigned variable with the highest activity.
//! Activities start from length-sensitive occurrence bonuses and are bumped
//! on every conflict by an amount that grows with the propagation count.
//!
//! Preprocessing (on by default, optional for correctness) sorts clauses by
//! length, applies unit cutoff and subsumption with tautology and duplicate
//! removal, eliminates pure literals once, and seeds the activities.

use crate::{
    assignment::Assignment,
    cnf::CnfFormula,
    lit::{Lit, Var},
    note,
    trace::Tracer,
    verdict::{Verdict, Witness},
};

use super::{length_bonus, DpllStats};

/// The watched-literal DPLL engine.
pub struct WatchedDpll {
    /// Apply the preprocessing passes before searching.
    pub preprocess: bool,
}

impl Default for WatchedDpll {
    fn default() -> Self {
        WatchedDpll { preprocess: true }
    }
}

impl WatchedDpll {
    /// Decides satisfiability of `formula`.
    pub fn solve(&self, formula: &CnfFormula, tracer: &mut Tracer) -> Verdict {
        let var_count = formula.var_count();
        let mut run = Run {
            clauses: vec![],
            watch_lists: vec![vec![]; var_count * 2],
            values: Assignment::new(var_count),
            activities: vec![0.0; var_count],
            trail: vec![],
            var_count,
            stats: DpllStats::default(),
            tracer,
        };

        let loaded = if self.preprocess {
            run.preprocess(formula)
        } else {
            run.load_verbatim(formula)
        };

        let verdict = if loaded && run.propagate(0, 0) && run.search(0) {
            Verdict::Sat(Witness::Total(run.values.assigned_lits()))
        } else {
            Verdict::Unsat
        };

        tracing::debug!(
            sat = verdict.is_sat(),
            conflicts = run.stats.conflicts,
            propagations = run.stats.propagations,
            max_depth = run.stats.max_depth,
        );
        note!(
            run.tracer,
            0,
            "stats: propagations={} units={} pures={} conflicts={} max_depth={}",
            run.stats.propagations,
            run.stats.units,
            run.stats.pures,
            run.stats.conflicts,
            run.stats.max_depth
        );
        verdict
    }
}

/// A clause with an explicit watch header.
///
/// Both watched literals are always literals of the clause.
struct WatchedClause {
    watched: [Lit; 2],
    lits: Vec<Lit>,
}

struct Run<'a, 'b> {
    clauses: Vec<WatchedClause>,
    /// Clause indices per literal code; a clause appears in exactly the two
    /// lists of its currently watched literals.
    watch_lists: Vec<Vec<usize>>,
    values: Assignment,
    activities: Vec<f64>,
    /// Assignment history; frames are restored by truncating to a mark.
    trail: Vec<Lit>,
    var_count: usize,
    stats: DpllStats,
    tracer: &'a mut Tracer<'b>,
}

impl Run<'_, '_> {
    /// Assigns a literal and records it on the trail.
    fn assign(&mut self, lit: Lit) {
        self.values.assign(lit);
        self.trail.push(lit);
    }

    /// Installs a non-unit clause and watches its first two literals.
    fn add_clause(&mut self, lits: Vec<Lit>) {
        debug_assert!(lits.len() >= 2);
        let index = self.clauses.len();
        let watched = [lits[0], lits[1]];
        self.watch_lists[watched[0].slot()].push(index);
        self.watch_lists[watched[1].slot()].push(index);
        self.clauses.push(WatchedClause { watched, lits });
    }

    /// Records a root-level unit. Returns `false` on conflict.
    fn root_unit(&mut self, lit: Lit) -> bool {
        if self.values.is_false(lit) {
            return false;
        }
        if !self.values.is_assigned(lit.var()) {
            self.assign(lit);
            self.stats.units += 1;
        }
        true
    }

    /// Loads clauses without simplification; only duplicate literals are
    /// dropped so the two watches are always distinct.
    fn load_verbatim(&mut self, formula: &CnfFormula) -> bool {
        for clause in formula.clauses() {
            let mut lits: Vec<Lit> = vec![];
            for &lit in clause {
                if !lits.contains(&lit) {
                    lits.push(lit);
                }
            }
            match lits[..] {
                [] => return false,
                [unit] => {
                    if !self.root_unit(unit) {
                        return false;
                    }
                }
                _ => self.add_clause(lits),
            }
        }
        true
    }

    fn preprocess(&mut self, formula: &CnfFormula) -> bool {
        let mut input: Vec<Vec<Lit>> = formula.clauses().to_vec();
        input.sort_by_key(|clause| clause.len());

        let mut kept: Vec<Vec<Lit>> = vec![];
        for mut clause in input {
            clause.sort_unstable();
            clause.dedup();
            if clause.windows(2).any(|w| w[0].var() == w[1].var()) {
                continue;
            }

            let mut body: Vec<Lit> = Vec::with_capacity(clause.len());
            let mut satisfied = false;
            for &lit in &clause {
                if self.values.is_true(lit) {
                    satisfied = true;
                    break;
                }
                if !self.values.is_false(lit) {
                    body.push(lit);
                }
            }
            if satisfied {
                continue;
            }

            match body[..] {
                [] => return false,
                [unit] => {
                    if self.tracer.active() {
                        let lit_text = self.tracer.lit(unit);
                        note!(self.tracer, 0, "unit {lit_text}");
                    }
                    if !self.root_unit(unit) {
                        return false;
                    }
                }
                _ => kept.push(body),
            }
        }

        // One pure-literal pass over the surviving clauses.
        let mut polarity_seen = vec![[false; 2]; self.var_count];
        for clause in &kept {
            for &lit in clause {
                polarity_seen[lit.index()][lit.is_positive() as usize] = true;
            }
        }
        let mut pure_lits = vec![];
        for index in 0..self.var_count {
            if self.values.is_assigned(Var::from_index(index)) {
                continue;
            }
            match polarity_seen[index] {
                [true, false] => pure_lits.push(Var::from_index(index).lit(false)),
                [false, true] => pure_lits.push(Var::from_index(index).lit(true)),
                _ => {}
            }
        }
        for &lit in &pure_lits {
            self.stats.pures += 1;
            if self.tracer.active() {
                let lit_text = self.tracer.lit(lit);
                note!(self.tracer, 0, "pure {lit_text}");
            }
            self.assign(lit);
        }
        if !pure_lits.is_empty() {
            kept.retain(|clause| !clause.iter().any(|lit| pure_lits.contains(lit)));
        }

        for clause in &kept {
            let bonus = length_bonus(clause.len());
            for &lit in clause {
                self.activities[lit.index()] += bonus;
            }
        }

        for clause in kept {
            self.add_clause(clause);
        }
        true
    }

    /// Processes every trail entry from `head` onwards. Returns `false` on
    /// conflict; restoration is left to the caller's frame.
    fn propagate(&mut self, mut head: usize, depth: usize) -> bool {
        while head < self.trail.len() {
            let lit = self.trail[head];
            head += 1;
            self.stats.propagations += 1;
            if !self.propagate_lit(lit, depth) {
                return false;
            }
        }
        true
    }

    /// Visits the clauses watching `!lit` after `lit` became true.
    fn propagate_lit(&mut self, lit: Lit, depth: usize) -> bool {
        let falsified = !lit;
        let mut entry = 0;
        while entry < self.watch_lists[falsified.slot()].len() {
            let clause_index = self.watch_lists[falsified.slot()][entry];

            let [watch_a, watch_b] = self.clauses[clause_index].watched;
            let other = falsified.select_other(watch_a, watch_b);
            if self.values.is_true(other) {
                entry += 1;
                continue;
            }

            let replacement = self.clauses[clause_index]
                .lits
                .iter()
                .copied()
                .find(|&candidate| {
                    candidate != falsified && candidate != other && !self.values.is_false(candidate)
                });

            if let Some(new_watch) = replacement {
                self.clauses[clause_index].watched = [new_watch, other];
                self.watch_lists[falsified.slot()].swap_remove(entry);
                self.watch_lists[new_watch.slot()].push(clause_index);
            } else if !self.values.is_assigned(other.var()) {
                // All body literals but `other` are false: unit.
                self.assign(other);
                self.stats.units += 1;
                if self.tracer.active() {
                    let lit_text = self.tracer.lit(other);
                    note!(self.tracer, depth, "unit {lit_text}");
                }
                entry += 1;
            } else {
                self.stats.conflicts += 1;
                let bump = 2.0 * (self.stats.propagations as f64).powf(1.5);
                for body_index in 0..self.clauses[clause_index].lits.len() {
                    let var = self.clauses[clause_index].lits[body_index].index();
                    self.activities[var] += bump;
                }
                note!(self.tracer, depth, "conflict");
                return false;
            }
        }
        true
    }

    /// Unassigned variable with the highest activity, ties to the smallest
    /// index.
    fn decide(&self) -> Option<Var> {
        let mut best: Option<(Var, f64)> = None;
        for index in 0..self.var_count {
            let var = Var::from_index(index);
            if self.values.is_assigned(var) {
                continue;
            }
            let activity = self.activities[index];
            if best.map_or(true, |(_, best_activity)| activity > best_activity) {
                best = Some((var, activity));
            }
        }
        best.map(|(var, _)| var)
    }

    fn search(&mut self, depth: usize) -> bool {
        self.stats.max_depth = self.stats.max_depth.max(depth);

        let Some(var) = self.decide() else {
            note!(self.tracer, depth, "all variables assigned");
            return true;
        };

        for positive in [true, false] {
            let lit = var.lit(positive);
            if self.tracer.active() {
                let lit_text = self.tracer.lit(lit);
                note!(self.tracer, depth, "decide {lit_text}");
            }
            let mark = self.trail.len();
            self.assign(lit);
            if self.propagate(mark, depth) && self.search(depth + 1) {
                return true;
            }
            for undone in self.trail.drain(mark..).collect::<Vec<_>>() {
                self.values.unassign(undone.var());
            }
        }
        false
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
        WatchedDpll::default().solve(formula, &mut Tracer::off())
    }

    fn solve_raw(formula: &CnfFormula) -> Verdict {
        WatchedDpll { preprocess: false }.solve(formula, &mut Tracer::off())
    }

    #[test]
    fn contradictory_units_are_unsat() {
        let formula = formula![-1, 2; 1; -2];
        assert_eq!(solve(&formula), Verdict::Unsat);
        assert_eq!(solve_raw(&formula), Verdict::Unsat);
    }

    #[test]
    fn implication_chain_is_sat() {
        let formula = formula![-1, 2; 1];
        for verdict in [solve(&formula), solve_raw(&formula)] {
            match verdict {
                Verdict::Sat(Witness::Total(lits)) => {
                    assert!(lits.contains(&Lit::from_signed(1)));
                    assert!(lits.contains(&Lit::from_signed(2)));
                }
                other => panic!("expected total witness, got {other:?}"),
            }
        }
    }

    #[test]
    fn two_variable_pigeonhole_is_unsat() {
        let formula = formula![1, 2; -1, 2; 1, -2; -1, -2];
        assert_eq!(solve(&formula), Verdict::Unsat);
        assert_eq!(solve_raw(&formula), Verdict::Unsat);
    }

    #[test]
    fn all_negative_units_refute_a_positive_clause() {
        let formula = formula![1, 2, 3; -1; -2; -3];
        assert_eq!(solve(&formula), Verdict::Unsat);
        assert_eq!(solve_raw(&formula), Verdict::Unsat);
    }

    #[test]
    fn model_satisfies_every_clause() {
        let formula = formula![1, -2, 3; -1, 2, -3; -1, -2, 3; 1, 2, -3];
        for verdict in [solve(&formula), solve_raw(&formula)] {
            match verdict {
                Verdict::Sat(witness) => {
                    assert!(formula.satisfied_by(witness.lits().unwrap()))
                }
                Verdict::Unsat => panic!("expected SAT"),
            }
        }
    }

    #[test]
    fn preprocessing_eliminates_pure_literals() {
        let formula = formula![1, 2; 1, -2];
        let mut buffer = crate::trace::TraceBuffer::default();
        let verdict = WatchedDpll::default().solve(&formula, &mut Tracer::new(&mut buffer));
        assert!(verdict.is_sat());
        assert!(buffer
            .events
            .iter()
            .any(|event| event.message.starts_with("pure")));
    }

    #[test]
    fn deep_propagation_chain() {
        // Forcing 1 true propagates through a chain of implications; the
        // final clause then flips the chain head, so the input is UNSAT.
        let formula = formula![1; -1, 2; -2, 3; -3, 4; -4, 5; -5, -1];
        assert_eq!(solve(&formula), Verdict::Unsat);
        assert_eq!(solve_raw(&formula), Verdict::Unsat);
    }

    #[test]
    fn tautologies_are_harmless() {
        let formula = formula![1, -1; 2];
        for verdict in [solve(&formula), solve_raw(&formula)] {
            assert!(verdict.is_sat());
        }
    }

    #[test]
    fn empty_clause_is_unsat() {
        let mut formula = CnfFormula::default();
        formula.add_clause(&[]);
        assert_eq!(solve(&formula), Verdict::Unsat);
        assert_eq!(solve_raw(&formula), Verdict::Unsat);
    }

    fn check_watch_invariants(run: &Run) {
        for (index, clause) in run.clauses.iter().enumerate() {
            assert!(clause.lits.contains(&clause.watched[0]));
            assert!(clause.lits.contains(&clause.watched[1]));
            for slot in 0..run.watch_lists.len() {
                let present = run.watch_lists[slot].contains(&index);
                let expected = clause.watched.iter().any(|watch| watch.slot() == slot);
                assert_eq!(present, expected, "clause {index}, bucket {slot}");
            }
            let satisfied = clause.lits.iter().any(|&lit| run.values.is_true(lit));
            if !satisfied {
                assert!(!run.values.is_false(clause.watched[0]));
                assert!(!run.values.is_false(clause.watched[1]));
            }
        }
    }

    #[test]
    fn watches_and_buckets_stay_in_sync() {
        let formula = formula![1, 2, 3; -1, 2, 4; -2, -3, -4];
        let mut tracer = Tracer::off();
        let mut run = Run {
            clauses: vec![],
            watch_lists: vec![vec![]; formula.var_count() * 2],
            values: Assignment::new(formula.var_count()),
            activities: vec![0.0; formula.var_count()],
            trail: vec![],
            var_count: formula.var_count(),
            stats: DpllStats::default(),
            tracer: &mut tracer,
        };
        assert!(run.load_verbatim(&formula));
        check_watch_invariants(&run);

        let mark = run.trail.len();
        run.assign(Lit::from_signed(1));
        assert!(run.propagate(mark, 0));
        check_watch_invariants(&run);

        // Chronological backtracking restores the assignment but leaves the
        // watch moves in place.
        for undone in run.trail.drain(mark..).collect::<Vec<_>>() {
            run.values.unassign(undone.var());
        }
        for index in 0..run.var_count {
            assert!(!run.values.is_assigned(Var::from_index(index)));
        }
        check_watch_invariants(&run);

        run.assign(Lit::from_signed(-1));
        assert!(run.propagate(mark, 0));
        check_watch_invariants(&run);
    }

    #[test]
    fn model_found_after_backtracking() {
        // Branching tries `true` first, so deciding 1=T conflicts right away
        // and the model is only reachable through the restored frame.
        let formula = formula![-1, 2; -1, -2; 1, 2];
        for verdict in [solve(&formula), solve_raw(&formula)] {
            match verdict {
                Verdict::Sat(Witness::Total(lits)) => {
                    assert!(lits.contains(&Lit::from_signed(-1)));
                    assert!(lits.contains(&Lit::from_signed(2)));
                }
                other => panic!("expected total witness, got {other:?}"),
            }
        }
    }
}
