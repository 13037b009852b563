//! A partial assignment to Boolean variables.

use crate::lit::{Lit, Var};

/// Value of a single variable under a partial assignment.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
#[repr(u8)]
pub enum VarValue {
    /// The variable has no value yet.
    #[default]
    Unassigned,
    /// The variable is assigned `true`.
    True,
    /// The variable is assigned `false`.
    False,
}

/// Status of a clause under a partial assignment.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum ClauseStatus {
    /// Some literal of the clause is true.
    Satisfied,
    /// Every literal of the clause is false.
    Falsified,
    /// Exactly one literal is unassigned and all others are false.
    Unit(Lit),
    /// At least two literals are unassigned and none is true.
    Open,
}

/// A partial assignment to Boolean variables.
///
/// Each variable can be unassigned or assigned a Boolean value. Stored
/// densely, one entry per variable.
#[derive(Default, Clone)]
pub struct Assignment {
    values: Vec<VarValue>,
}

impl Assignment {
    /// An assignment covering `var_count` variables, all unassigned.
    pub fn new(var_count: usize) -> Assignment {
        Assignment {
            values: vec![VarValue::Unassigned; var_count],
        }
    }

    /// Number of covered variables.
    pub fn var_count(&self) -> usize {
        self.values.len()
    }

    /// The value of a variable.
    #[inline]
    pub fn value(&self, var: Var) -> VarValue {
        self.values[var.index()]
    }

    /// Assigns `true` to the given literal.
    ///
    /// A variable can be assigned `false` by assigning `true` to the negated
    /// literal.
    #[inline]
    pub fn assign(&mut self, lit: Lit) {
        self.values[lit.index()] = if lit.is_positive() {
            VarValue::True
        } else {
            VarValue::False
        };
    }

    /// Removes any assigned value from a variable.
    #[inline]
    pub fn unassign(&mut self, var: Var) {
        self.values[var.index()] = VarValue::Unassigned;
    }

    /// Returns `true` if the literal is assigned `true`.
    #[inline]
    pub fn is_true(&self, lit: Lit) -> bool {
        self.value(lit.var())
            == if lit.is_positive() {
                VarValue::True
            } else {
                VarValue::False
            }
    }

    /// Returns `true` if the literal is assigned `false`.
    #[inline]
    pub fn is_false(&self, lit: Lit) -> bool {
        self.value(lit.var())
            == if lit.is_positive() {
                VarValue::False
            } else {
                VarValue::True
            }
    }

    /// Returns `true` if the literal's variable is assigned.
    #[inline]
    pub fn is_assigned(&self, var: Var) -> bool {
        self.value(var) != VarValue::Unassigned
    }

    /// Classifies a clause under this assignment.
    pub fn clause_status(&self, lits: &[Lit]) -> ClauseStatus {
        let mut unassigned = None;
        let mut unassigned_count = 0;
        for &lit in lits {
            if self.is_true(lit) {
                return ClauseStatus::Satisfied;
            }
            if !self.is_false(lit) {
                unassigned = Some(lit);
                unassigned_count += 1;
            }
        }
        match (unassigned, unassigned_count) {
            (None, _) => ClauseStatus::Falsified,
            (Some(lit), 1) => ClauseStatus::Unit(lit),
            _ => ClauseStatus::Open,
        }
    }

    /// All literals assigned true, in variable order.
    pub fn assigned_lits(&self) -> Vec<Lit> {
        self.values
            .iter()
            .enumerate()
            .filter_map(|(index, &value)| match value {
                VarValue::Unassigned => None,
                VarValue::True => Some(Var::from_index(index).lit(true)),
                VarValue::False => Some(Var::from_index(index).lit(false)),
            })
            .collect()
    }

    /// Whether every covered variable is assigned.
    pub fn is_total(&self) -> bool {
        self.values
            .iter()
            .all(|&value| value != VarValue::Unassigned)
    }
}
