//! Variables and literals.
//!
//! A variable is a positive number `1…V`. A literal is kept in the same
//! signed convention the DIMACS format uses: the magnitude names the
//! variable, the sign carries the polarity, and negation is a sign flip.
//! Dense per-variable tables are indexed through [`Var::index`]; dense
//! per-literal tables through [`Lit::slot`], which interleaves the two
//! polarities of each variable.

use std::{cmp::Ordering, fmt, ops};

/// A propositional variable.
///
/// Numbered from 1, matching the DIMACS convention. Dense storage uses the
/// zero-based [`index`][Var::index] instead.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Var {
    number: u32,
}

impl Var {
    /// Highest supported variable number.
    pub const LIMIT: usize = i32::MAX as usize;

    /// The variable with the given number.
    ///
    /// Panics when the number is zero or above [`Var::LIMIT`].
    #[inline]
    pub fn new(number: usize) -> Var {
        assert!(
            (1..=Var::LIMIT).contains(&number),
            "variable number {number} out of range"
        );
        Var {
            number: number as u32,
        }
    }

    /// The variable stored at a zero-based table index.
    #[inline]
    pub fn from_index(index: usize) -> Var {
        Var::new(index + 1)
    }

    /// This variable's number, starting at 1.
    #[inline]
    pub fn number(self) -> usize {
        self.number as usize
    }

    /// Zero-based index for dense per-variable tables.
    #[inline]
    pub fn index(self) -> usize {
        self.number as usize - 1
    }

    /// The literal asserting this variable with the given polarity.
    #[inline]
    pub fn lit(self, positive: bool) -> Lit {
        let magnitude = self.number as i32;
        Lit {
            signed: if positive { magnitude } else { -magnitude },
        }
    }
}

impl fmt::Display for Var {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.number)
    }
}

impl fmt::Debug for Var {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

/// A literal: a variable or its negation.
///
/// Stored as the nonzero signed number that also names it in DIMACS input,
/// so conversion at the parser boundary is free and `!lit` only flips the
/// sign.
///
/// The `Ord` impl deliberately does not follow the signed values: literals
/// compare variable-major with the negative polarity first (the
/// [`slot`][Lit::slot] order), so that sorting a clause puts both
/// polarities of a variable next to each other. The sorted-clause
/// primitives rely on exactly that adjacency.
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct Lit {
    signed: i32,
}

impl Lit {
    /// The literal named by a signed nonzero number.
    ///
    /// Panics when the value is zero or its magnitude is above
    /// [`Var::LIMIT`].
    #[inline]
    pub fn from_signed(value: isize) -> Lit {
        assert!(value != 0, "0 does not name a literal");
        assert!(
            value.unsigned_abs() <= Var::LIMIT,
            "literal {value} out of range"
        );
        Lit {
            signed: value as i32,
        }
    }

    /// The signed number naming this literal.
    #[inline]
    pub fn signed(self) -> isize {
        self.signed as isize
    }

    /// The literal's variable.
    #[inline]
    pub fn var(self) -> Var {
        Var {
            number: self.signed.unsigned_abs(),
        }
    }

    /// Zero-based index of the literal's variable.
    #[inline]
    pub fn index(self) -> usize {
        self.var().index()
    }

    /// Whether this literal asserts its variable rather than the negation.
    #[inline]
    pub fn is_positive(self) -> bool {
        self.signed > 0
    }

    /// Whether this literal is a negation.
    #[inline]
    pub fn is_negative(self) -> bool {
        self.signed < 0
    }

    /// Index for dense per-literal tables.
    ///
    /// The polarities of variable number `n` occupy slots `2·(n−1)`
    /// (negative) and `2·(n−1) + 1` (positive).
    #[inline]
    pub fn slot(self) -> usize {
        self.index() * 2 + self.is_positive() as usize
    }

    /// Out of two literals, one of which equals this literal, returns the
    /// other one.
    #[inline]
    pub fn select_other(self, a: Lit, b: Lit) -> Lit {
        debug_assert!(self == a || self == b, "{self} is neither {a} nor {b}");
        if self == a {
            b
        } else {
            a
        }
    }
}

impl Ord for Lit {
    #[inline]
    fn cmp(&self, other: &Lit) -> Ordering {
        self.slot().cmp(&other.slot())
    }
}

impl PartialOrd for Lit {
    #[inline]
    fn partial_cmp(&self, other: &Lit) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl ops::Not for Lit {
    type Output = Lit;

    #[inline]
    fn not(self) -> Lit {
        Lit {
            signed: -self.signed,
        }
    }
}

impl fmt::Display for Lit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.signed)
    }
}

impl fmt::Debug for Lit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl flussab_cnf::Dimacs for Lit {
    const MAX_DIMACS: isize = Var::LIMIT as isize;

    fn from_dimacs(value: isize) -> Self {
        Lit::from_signed(value)
    }

    fn dimacs(self) -> isize {
        self.signed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signed_naming_round_trips() {
        for value in [1, -1, 5, -5, 1000] {
            let lit = Lit::from_signed(value);
            assert_eq!(lit.signed(), value);
            assert_eq!((!lit).signed(), -value);
            assert_eq!(lit.var().number(), value.unsigned_abs());
            assert_eq!(lit.is_positive(), value > 0);
        }
    }

    #[test]
    fn slots_interleave_polarities() {
        assert_eq!(Lit::from_signed(-1).slot(), 0);
        assert_eq!(Lit::from_signed(1).slot(), 1);
        assert_eq!(Lit::from_signed(-2).slot(), 2);
        assert_eq!(Lit::from_signed(2).slot(), 3);
    }

    #[test]
    fn sorting_groups_polarities_of_a_variable() {
        let mut lits = [3, -1, 2, -3, 1, -2].map(Lit::from_signed);
        lits.sort_unstable();
        let signed: Vec<isize> = lits.iter().map(|lit| lit.signed()).collect();
        assert_eq!(signed, [-1, 1, -2, 2, -3, 3]);
    }

    #[test]
    fn variables_and_indices() {
        let var = Var::new(4);
        assert_eq!(var.index(), 3);
        assert_eq!(Var::from_index(3), var);
        assert_eq!(var.lit(true).signed(), 4);
        assert_eq!(var.lit(false).signed(), -4);
    }

    #[test]
    fn select_other_picks_the_remaining_literal() {
        let a = Lit::from_signed(4);
        let b = Lit::from_signed(-7);
        assert_eq!(a.select_other(a, b), b);
        assert_eq!(b.select_other(a, b), a);
    }
}
