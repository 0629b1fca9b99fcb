//! Shared clause-premise vocabulary for the CDCL(T) solver core and its proof checker.
//!
//! This crate exists so the proof-reconstruction crate (`smtcore-checker`) does not need to link
//! against the solver's own clause database: it depends only on [`ClauseSource`], a narrow
//! read-only view a solver's clause storage can implement cheaply.
use smtcore_formula::Lit;

/// Identifies a clause within a [`ClauseSource`].
///
/// Stable for the lifetime of the clause: a solver must not reuse a `ClauseId` for a different
/// clause while any proof step still references the old one.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[repr(transparent)]
pub struct ClauseId(u64);

impl ClauseId {
    pub const fn from_raw(id: u64) -> ClauseId {
        ClauseId(id)
    }

    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// Opaque identifier for a theory lemma, assigned by whichever theory plugin produced it.
///
/// The proof reconstructor never inspects this beyond equality; it is recorded so a completed
/// proof can cite which theory justified a step without the checker understanding the theory
/// itself.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[repr(transparent)]
pub struct TheoryToken(u64);

impl TheoryToken {
    pub const fn from_raw(id: u64) -> TheoryToken {
        TheoryToken(id)
    }

    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// Why a clause is allowed to exist: the provenance the proof reconstructor walks.
#[derive(Clone, Debug)]
pub enum Premise {
    /// An original input clause, asserted unconditionally.
    Hyp,
    /// A clause scoped to the current assertion level (from `assert_lits` under a `push_level`),
    /// dropped when that level is popped.
    Local,
    /// A clause produced by a theory plugin and justified only by that plugin's own token.
    Lemma(TheoryToken),
    /// A clause derived by resolution from the listed parent clauses, in the order they were
    /// resolved.
    History(Vec<ClauseId>),
}

/// Read-only view onto a clause store, as required by [`smtcore-checker`](../smtcore_checker).
///
/// A solver's own clause database implements this directly against its internal storage; the
/// checker never needs write access or knowledge of watch lists, activities, or tiers.
pub trait ClauseSource {
    /// The clause's current literals, or `None` if it has been deleted.
    fn literals(&self, id: ClauseId) -> Option<&[Lit]>;
    /// The clause's premise, or `None` if it has been deleted.
    fn premise(&self, id: ClauseId) -> Option<&Premise>;

    /// The id of a unit clause asserting `lit` at decision level 0, if one is known.
    ///
    /// Used by the proof checker to close the gap between a learned clause's recorded parents
    /// and its (possibly minimized) literal list: a literal the parents' resolution fold still
    /// carries but the learned clause itself dropped was removed because its negation already
    /// followed from a level-0 unit fact, and that fact's clause is what this returns.
    ///
    /// The default implementation reports no known level-0 units, which disables gap-closing
    /// without requiring every `ClauseSource` to track them.
    fn unit_clause(&self, lit: Lit) -> Option<ClauseId> {
        let _ = lit;
        None
    }
}

// Integer type used to store a hash of a clause.
pub type ClauseHash = u64;

/// Hash a single literal.
///
/// Multiple literals can be combined with xor, as done in [`clause_hash`].
pub fn lit_hash(lit: Lit) -> ClauseHash {
    lit_code_hash(lit.code())
}

/// Hash a single literal from a code.
///
/// This doesn't require the code to correspond to a valid literal.
pub fn lit_code_hash(lit_code: usize) -> ClauseHash {
    // Constant based on the golden ratio provides good mixing for the resulting upper bits
    (!(lit_code as u64)).wrapping_mul(0x61c8_8646_80b5_83eb_u64)
}

/// A fast hash function for clauses (or other *sets* of literals).
///
/// Interprets the given slice as a set: the result is invariant under permutation of `lits`. Does
/// not handle duplicated items correctly (as the solver core never produces clauses with
/// duplicated literals, this is not a practical concern).
pub fn clause_hash(lits: &[Lit]) -> ClauseHash {
    let mut hash = 0;
    for &lit in lits {
        hash ^= lit_hash(lit);
    }
    hash
}

#[cfg(test)]
mod tests {
    use super::*;
    use smtcore_formula::Var;

    #[test]
    fn clause_hash_is_permutation_invariant() {
        let a = Var::from_index(0).positive();
        let b = Var::from_index(1).negative();
        let c = Var::from_index(2).positive();

        assert_eq!(clause_hash(&[a, b, c]), clause_hash(&[c, a, b]));
    }

    #[test]
    fn clause_hash_distinguishes_different_sets() {
        let a = Var::from_index(0).positive();
        let b = Var::from_index(1).negative();
        let c = Var::from_index(2).positive();

        assert_ne!(clause_hash(&[a, b]), clause_hash(&[a, c]));
    }
}
