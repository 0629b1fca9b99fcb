//! Term-to-atom registry (C2's `make_atom`, built on C1's literal layer).
//!
//! The clause database stores bare propositional [`Lit`]s; this module is the bridge a theory
//! embedder crosses once, when it first mentions a term to the solver. Two `TermLit`s that
//! [`smtcore_formula::normalize`] collapses onto the same absolute term always share one [`Var`],
//! no matter how many times or in what polarity the embedder asks for it.
use rustc_hash::FxHashMap;

use smtcore_formula::literal::{normalize, TermLit};
use smtcore_formula::term::{Term, TermBank};

use crate::lit::{Lit, Var};

/// Hash-consing table from terms to the propositional variables that represent them.
#[derive(Default)]
pub struct AtomTable {
    vars: FxHashMap<Term, Var>,
    /// Inverse of `vars`, indexed by variable index; lets a model reconstruction report which
    /// term a given solver variable stands for.
    terms: Vec<Term>,
}

impl AtomTable {
    /// The number of distinct variables registered so far.
    pub fn var_count(&self) -> usize {
        self.vars.len()
    }

    /// Look up (or create) the atom for `lit`, per spec.md's C2 `make_atom`.
    ///
    /// Returns the atom together with `true` if a fresh variable was allocated for it, so the
    /// caller can grow the solver's variable count accordingly.
    pub fn make_atom(&mut self, bank: &impl TermBank, lit: TermLit) -> (Lit, Option<Var>) {
        let (normalized, _tag) = normalize(bank, lit);
        let term = normalized.term();

        if let Some(&var) = self.vars.get(&term) {
            return (var.lit(normalized.sign()), None);
        }

        let var = Var::from_index(self.vars.len());
        self.vars.insert(term, var);
        self.terms.push(term);
        (var.lit(normalized.sign()), Some(var))
    }

    /// The term a solver variable represents, if it was created through [`Self::make_atom`].
    pub fn term_of(&self, var: Var) -> Option<Term> {
        self.terms.get(var.index()).copied()
    }

    /// The solver variable standing for `term`, if one has already been created for it.
    ///
    /// Unlike [`Self::make_atom`] this never allocates and never normalizes: `term` must be the
    /// exact (non-negated) term a previous `make_atom` call registered.
    pub fn var_of(&self, term: Term) -> Option<Var> {
        self.vars.get(&term).copied()
    }

    /// Look up (or create) a positive atom for `term`, without normalizing it through a
    /// [`TermBank`].
    ///
    /// Used for the definitional atoms a preprocessor hook introduces for a freshly-lifted
    /// subterm (e.g. Tseitin-style auxiliaries): those terms are fresh by construction, so there
    /// is no outer negation to strip and no term bank is needed to decide that.
    pub fn make_atom_raw(&mut self, term: Term) -> (Lit, Option<Var>) {
        if let Some(&var) = self.vars.get(&term) {
            return (var.positive(), None);
        }

        let var = Var::from_index(self.vars.len());
        self.vars.insert(term, var);
        self.terms.push(term);
        (var.positive(), Some(var))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use smtcore_formula::literal::atom;
    use smtcore_formula::term::SimpleTermBank;

    #[test]
    fn same_term_shares_a_variable() {
        let mut bank = SimpleTermBank::new();
        let mut table = AtomTable::default();

        let p = bank.mk_bool(true);
        let not_p = bank.mk_not(p);

        let (lit_p, fresh) = table.make_atom(&bank, atom(&bank, p, true));
        assert!(fresh.is_some());

        let (lit_not_p, fresh_again) = table.make_atom(&bank, atom(&bank, not_p, true));
        assert!(fresh_again.is_none());

        assert_eq!(lit_p.var(), lit_not_p.var());
        assert_eq!(lit_p, !lit_not_p);
    }

    #[test]
    fn repeated_lookup_is_stable() {
        let mut bank = SimpleTermBank::new();
        let mut table = AtomTable::default();

        let p = bank.mk_bool(true);
        let (first, _) = table.make_atom(&bank, atom(&bank, p, false));
        let (second, fresh) = table.make_atom(&bank, atom(&bank, p, false));

        assert!(fresh.is_none());
        assert_eq!(first, second);
    }
}
