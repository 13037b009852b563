//! Ordered resolution with a unit index and length-bucketed selection.
//!
//! Clauses are kept sorted under the literal order and resolved only on
//! their first literal. The processed set is indexed by first literal, so
//! the partners of a selected clause are exactly the processed clauses whose
//! first literal is the pivot's complement. Unit clauses are additionally
//! folded into an assignment that drives on-the-fly simplification in
//! [`merge`] and in [`preprocess`][Run::preprocess].
//!
//! Selection is shortest-first over length buckets, which steers the search
//! towards the empty clause. For horn inputs, resolution steps between two
//! non-unit parents are skipped; unit resolution alone is refutation
//! complete there.

use std::collections::VecDeque;

use crate::{
    assignment::Assignment,
    cnf::CnfFormula,
    lit::Lit,
    note,
    subsume::{merge, subsumes_sorted, MergeResult},
    trace::Tracer,
    verdict::{Verdict, Witness},
};

use super::ResolutionStats;

/// All clauses of length ≥ `BUCKET_MAX` share the last bucket.
const BUCKET_MAX: usize = 99;

/// The optimized resolution engine.
///
/// A SAT verdict carries the derived units as a partial witness; every
/// listed literal is entailed by the input.
#[derive(Default)]
pub struct OrderedResolution;

impl OrderedResolution {
    /// Decides satisfiability of `formula` by saturation.
    pub fn solve(&self, formula: &CnfFormula, tracer: &mut Tracer) -> Verdict {
        let mut run = Run {
            units: Assignment::new(formula.var_count()),
            unit_lits: vec![],
            usable: Usable::default(),
            processed: Processed::new(formula.var_count()),
            horn: false,
            stats: ResolutionStats::default(),
            tracer,
        };

        let verdict = run.saturate(formula);

        tracing::debug!(
            sat = verdict.is_sat(),
            selected = run.stats.selected,
            kept = run.stats.kept,
            horn = run.horn,
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

/// Usable clauses, bucketed by length; selection pops the front of the
/// shortest nonempty bucket.
struct Usable {
    buckets: Vec<VecDeque<Vec<Lit>>>,
}

impl Default for Usable {
    fn default() -> Self {
        Usable {
            buckets: (0..=BUCKET_MAX).map(|_| VecDeque::new()).collect(),
        }
    }
}

impl Usable {
    fn push(&mut self, clause: Vec<Lit>) {
        let bucket = clause.len().min(BUCKET_MAX);
        self.buckets[bucket].push_back(clause);
    }

    fn pop_shortest(&mut self) -> Option<Vec<Lit>> {
        self.buckets
            .iter_mut()
            .find(|bucket| !bucket.is_empty())?
            .pop_front()
    }
}

/// Processed clauses, indexed by their first literal.
///
/// Deletion is logical: a slot is replaced by `None` (the clause becomes ⊤)
/// and stale index entries are skipped on lookup.
struct Processed {
    slots: Vec<Option<Vec<Lit>>>,
    by_first: Vec<Vec<usize>>,
}

impl Processed {
    fn new(var_count: usize) -> Processed {
        Processed {
            slots: vec![],
            by_first: vec![vec![]; var_count * 2],
        }
    }

    fn insert(&mut self, clause: Vec<Lit>) {
        let slot = self.slots.len();
        self.by_first[clause[0].slot()].push(slot);
        self.slots.push(Some(clause));
    }

    fn get(&self, slot: usize) -> Option<&[Lit]> {
        self.slots[slot].as_deref()
    }

    fn delete(&mut self, slot: usize) {
        self.slots[slot] = None;
    }

    /// Slots whose clause starts with the given literal.
    fn candidates(&self, first: Lit) -> &[usize] {
        &self.by_first[first.slot()]
    }
}

/// Result of re-simplifying a clause against the current run state.
enum Preprocessed {
    /// Every literal was cut off by a unit.
    Unsat,
    /// The clause is redundant.
    Subsumed,
    /// The simplified clause, still sorted.
    Kept(Vec<Lit>),
}

struct Run<'a, 'b> {
    units: Assignment,
    unit_lits: Vec<Lit>,
    usable: Usable,
    processed: Processed,
    horn: bool,
    stats: ResolutionStats,
    tracer: &'a mut Tracer<'b>,
}

impl Run<'_, '_> {
    fn saturate(&mut self, formula: &CnfFormula) -> Verdict {
        // First pass: units feed the assignment and the length-1 bucket.
        for clause in formula.clauses() {
            if clause.is_empty() {
                note!(self.tracer, 0, "empty input clause");
                return Verdict::Unsat;
            }
            if let [lit] = clause[..] {
                if !self.learn_unit(lit) {
                    if self.tracer.active() {
                        let lit_text = self.tracer.lit(lit);
                        note!(self.tracer, 0, "unit conflict on {lit_text}");
                    }
                    return Verdict::Unsat;
                }
                self.usable.push(vec![lit]);
            }
        }

        // Second pass: non-unit clauses, sorted and simplified.
        for clause in formula.clauses() {
            if clause.len() < 2 {
                continue;
            }
            let mut sorted = clause.clone();
            sorted.sort_unstable();
            sorted.dedup();
            if sorted.windows(2).any(|w| w[0].var() == w[1].var()) {
                continue;
            }
            match self.preprocess(&sorted) {
                Preprocessed::Unsat => return Verdict::Unsat,
                Preprocessed::Subsumed => {}
                Preprocessed::Kept(kept) => {
                    if !self.enqueue(kept) {
                        return Verdict::Unsat;
                    }
                }
            }
        }

        self.horn = formula
            .clauses()
            .iter()
            .all(|clause| clause.iter().filter(|lit| lit.is_positive()).count() <= 1);

        while let Some(selected) = self.usable.pop_shortest() {
            self.stats.selected += 1;

            let given = match self.preprocess(&selected) {
                Preprocessed::Unsat => return Verdict::Unsat,
                Preprocessed::Subsumed => continue,
                Preprocessed::Kept(given) => given,
            };
            if let [lit] = given[..] {
                if !self.learn_unit(lit) {
                    return Verdict::Unsat;
                }
            }
            if self.tracer.active() {
                let clause_text = self.tracer.clause(&given);
                note!(self.tracer, 0, "given: {clause_text}");
            }

            let pivot = given[0];
            let slots = self.processed.candidates(!pivot).to_vec();
            for slot in slots {
                let Some(partner) = self.processed.get(slot) else {
                    continue;
                };
                if self.horn && given.len() > 1 && partner.len() > 1 {
                    continue;
                }

                self.stats.generated += 1;
                let merged = merge(&given, 0, partner, 0, &self.units);
                let partner_subsumed = matches!(
                    &merged,
                    MergeResult::Resolvent(resolvent) if subsumes_sorted(resolvent, partner)
                );

                match merged {
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
                        if partner_subsumed {
                            self.processed.delete(slot);
                        }
                        if !self.enqueue(resolvent) {
                            return Verdict::Unsat;
                        }
                    }
                }
            }

            self.processed.insert(given);
        }

        self.unit_lits.sort_unstable();
        note!(self.tracer, 0, "saturated without the empty clause");
        Verdict::Sat(Witness::Partial(std::mem::take(&mut self.unit_lits)))
    }

    /// Records a derived unit. Returns `false` on conflict with an earlier
    /// unit.
    fn learn_unit(&mut self, lit: Lit) -> bool {
        if self.units.is_false(lit) {
            return false;
        }
        if !self.units.is_assigned(lit.var()) {
            self.units.assign(lit);
            self.unit_lits.push(lit);
        }
        true
    }

    /// Queues a clause as usable; units are folded into the assignment
    /// first. Returns `false` on unit conflict.
    fn enqueue(&mut self, clause: Vec<Lit>) -> bool {
        if let [lit] = clause[..] {
            if !self.learn_unit(lit) {
                return false;
            }
        }
        self.stats.kept += 1;
        self.usable.push(clause);
        true
    }

    /// Re-simplifies a sorted clause against the current units and the
    /// processed set.
    ///
    /// A unit clause whose literal already agrees with the assignment is
    /// kept rather than discarded as subsumed, so it still reaches the
    /// processed index and feeds the unit-cut path of later merges.
    fn preprocess(&self, clause: &[Lit]) -> Preprocessed {
        let is_unit = clause.len() == 1;
        let mut kept: Vec<Lit> = Vec::with_capacity(clause.len());
        for &lit in clause {
            if kept.last() == Some(&lit) {
                continue;
            }
            if self.units.is_false(lit) {
                continue;
            }
            if self.units.is_true(lit) && !is_unit {
                return Preprocessed::Subsumed;
            }
            kept.push(lit);
        }
        if kept.is_empty() {
            return Preprocessed::Unsat;
        }

        for &lit in &kept {
            for &slot in self.processed.candidates(lit) {
                if let Some(prior) = self.processed.get(slot) {
                    if subsumes_sorted(prior, &kept) {
                        return Preprocessed::Subsumed;
                    }
                }
            }
        }

        Preprocessed::Kept(kept)
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
        OrderedResolution.solve(formula, &mut Tracer::off())
    }

    fn lit(number: isize) -> Lit {
        Lit::from_signed(number)
    }

    #[test]
    fn contradictory_units_are_unsat() {
        assert_eq!(solve(&formula![-1, 2; 1; -2]), Verdict::Unsat);
    }

    #[test]
    fn derived_units_form_the_witness() {
        match solve(&formula![-1, 2; 1]) {
            Verdict::Sat(Witness::Partial(units)) => {
                assert!(units.contains(&lit(1)));
                assert!(units.contains(&lit(2)));
            }
            other => panic!("expected partial witness, got {other:?}"),
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
    fn satisfiable_three_sat_saturates() {
        assert!(solve(&formula![1, -2, 3; -1, 2, -3; -1, -2, 3; 1, 2, -3]).is_sat());
    }

    #[test]
    fn horn_input_is_detected_and_refuted() {
        // Horn: at most one positive literal per clause.
        let formula = formula![1; -1, 2; -2, -1];
        assert_eq!(solve(&formula), Verdict::Unsat);
    }

    #[test]
    fn horn_satisfiable_input() {
        match solve(&formula![1; -1, 2; -2, 3]) {
            Verdict::Sat(Witness::Partial(units)) => {
                assert_eq!(units, vec![lit(1), lit(2), lit(3)]);
            }
            other => panic!("expected partial witness, got {other:?}"),
        }
    }

    #[test]
    fn input_tautology_does_not_change_the_verdict() {
        let plain = formula![1, 2; -1, 2; 1, -2; -1, -2];
        let mut with_tautology = plain.clone();
        with_tautology.add_clause(&[lit(3), lit(-3)]);
        assert_eq!(solve(&plain), solve(&with_tautology));
    }

    #[test]
    fn subsumption_idempotence() {
        let with_subsumed = formula![1; 1, 2; -1, 2];
        let without = formula![1; -1, 2];
        assert_eq!(solve(&with_subsumed).is_sat(), solve(&without).is_sat());
    }

    #[test]
    fn partial_witness_is_entailed() {
        // 1 is forced, 2 follows by unit resolution, 3 stays open.
        let formula = formula![1; -1, 2; 3, 4];
        match solve(&formula) {
            Verdict::Sat(Witness::Partial(units)) => {
                assert!(units.contains(&lit(1)));
                assert!(units.contains(&lit(2)));
                assert!(!units.iter().any(|u| u.var().number() >= 3));
            }
            other => panic!("expected partial witness, got {other:?}"),
        }
    }
}
