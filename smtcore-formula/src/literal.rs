//! Signed literals over terms (C1: the literal and formula layer).
//!
//! A [`TermLit`] pairs a [`Term`] with a sign. Unlike [`crate::lit::Lit`] (a SAT-engine atom tied
//! to a `Var`), a `TermLit` is a *pre-propositional* literal: it is what a caller hands to the
//! preprocessor before a clause atom for it exists. [`atom`] is the bridge between the two: it
//! canonicalizes a `TermLit` by pushing the caller's sign through the term layer's own outer
//! negation, so that two literals differing only by a normalizable negation collapse onto the
//! same canonical form.
use std::hash::{Hash, Hasher};

use crate::term::{Term, TermBank};

/// A signed literal over a term.
///
/// `term` is expected to be in *absolute* form (no outer negation) once produced by [`atom`] or
/// [`normalize`]; `sign` carries the polarity separately.
#[derive(Copy, Clone, Debug)]
pub struct TermLit {
    term: Term,
    sign: bool,
}

impl TermLit {
    /// Build a literal directly from a term and sign, without canonicalizing.
    ///
    /// Prefer [`atom`] when `term` might carry an outer negation.
    pub fn make(sign: bool, term: Term) -> TermLit {
        TermLit { term, sign }
    }

    /// The negation of this literal.
    pub fn neg(self) -> TermLit {
        TermLit {
            term: self.term,
            sign: !self.sign,
        }
    }

    /// Whether this literal is positive.
    pub fn sign(self) -> bool {
        self.sign
    }

    /// The underlying term.
    pub fn term(self) -> Term {
        self.term
    }
}

impl PartialEq for TermLit {
    fn eq(&self, other: &Self) -> bool {
        self.term == other.term && self.sign == other.sign
    }
}
impl Eq for TermLit {}

impl Hash for TermLit {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.term.hash(state);
        self.sign.hash(state);
    }
}

/// Whether canonicalization flipped the caller-requested sign.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum NormalizeTag {
    SameSign,
    Negated,
}

/// Build the canonical atom for `(term, sign)`.
///
/// Strips an outer negation from `term` via [`TermBank::abs`], XORing the caller's requested sign
/// with the sign `abs` reports. The result's term is always in absolute form; its sign alone
/// carries the polarity the caller and the term layer agreed on together.
pub fn atom(bank: &impl TermBank, term: Term, sign: bool) -> TermLit {
    let (abs_term, abs_sign) = bank.abs(term);
    TermLit::make(sign == abs_sign, abs_term)
}

/// Canonicalize a literal, reporting whether the sign flipped.
///
/// `normalize(l) = (l', tag)` where `l'` is produced by running `l` back through [`atom`] and
/// `tag` reports whether that changed the sign. This is the contract the SAT engine relies on to
/// collapse dual atoms onto a single variable: two `TermLit`s that normalize to the same `l'` (up
/// to the reported tag) share a clause-engine atom.
pub fn normalize(bank: &impl TermBank, lit: TermLit) -> (TermLit, NormalizeTag) {
    let normalized = atom(bank, lit.term(), lit.sign());
    let tag = if normalized.sign() == lit.sign() {
        NormalizeTag::SameSign
    } else {
        NormalizeTag::Negated
    };
    (normalized, tag)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::term::SimpleTermBank;

    #[test]
    fn neg_is_involutive() {
        let mut bank = SimpleTermBank::new();
        let t = bank.mk_bool(true);
        let l = TermLit::make(true, t);
        assert_eq!(l.neg().neg(), l);
    }

    #[test]
    fn atom_collapses_outer_negation() {
        let mut bank = SimpleTermBank::new();
        let t = bank.mk_bool(true);
        let not_t = bank.mk_not(t);

        let via_not = atom(&bank, not_t, true);
        let via_abs = atom(&bank, t, false);

        assert_eq!(via_not, via_abs);
        assert_eq!(via_not.term(), t);
        assert!(!via_not.sign());
    }

    #[test]
    fn normalize_is_idempotent() {
        let mut bank = SimpleTermBank::new();
        let t = bank.mk_bool(true);
        let not_t = bank.mk_not(t);
        let l = TermLit::make(true, not_t);

        let (l1, _tag1) = normalize(&bank, l);
        let (l2, tag2) = normalize(&bank, l1);

        assert_eq!(l1, l2);
        assert_eq!(tag2, NormalizeTag::SameSign);
    }
}
