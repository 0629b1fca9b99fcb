//! Clause-premise bookkeeping for proof reconstruction (C2's provenance, consumed by C6).
//!
//! Stores exactly what [`smtcore_proof::ClauseSource`] needs to replay a clause's derivation:
//! its literals, its [`Premise`], and (for level-0 units) a reverse index so the checker can close
//! minimization gaps without scanning every clause.
use rustc_hash::FxHashMap;

use smtcore_proof::{ClauseId, ClauseSource, Premise};

use crate::lit::Lit;

struct Entry {
    lits: Vec<Lit>,
    premise: Premise,
}

/// A solver's clause-provenance store.
///
/// Implements [`ClauseSource`] directly, so a completed [`smtcore_checker::ProofChecker`] can
/// borrow a solver's store without copying it.
#[derive(Default)]
pub struct ProofStore {
    next_id: u64,
    clauses: FxHashMap<ClauseId, Entry>,
    /// Level-0 unit clauses, indexed by the literal they assert.
    units: FxHashMap<Lit, ClauseId>,
}

impl ProofStore {
    /// Record a new clause with the given literals and premise, returning its id.
    ///
    /// If `lits` is a single literal, it is also registered as that literal's level-0 unit
    /// reason (overwriting any earlier one) -- callers should only record level-0 facts this way.
    pub fn record(&mut self, lits: Vec<Lit>, premise: Premise) -> ClauseId {
        let id = ClauseId::from_raw(self.next_id);
        self.next_id += 1;

        if let [lit] = lits[..] {
            self.units.insert(lit, id);
        }

        self.clauses.insert(id, Entry { lits, premise });
        id
    }

    /// Mark a clause as deleted: future lookups report it as absent.
    pub fn delete(&mut self, id: ClauseId) {
        self.clauses.remove(&id);
    }
}

impl ClauseSource for ProofStore {
    fn literals(&self, id: ClauseId) -> Option<&[Lit]> {
        self.clauses.get(&id).map(|entry| &entry.lits[..])
    }

    fn premise(&self, id: ClauseId) -> Option<&Premise> {
        self.clauses.get(&id).map(|entry| &entry.premise)
    }

    fn unit_clause(&self, lit: Lit) -> Option<ClauseId> {
        self.units.get(&lit).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::lit::Var;

    #[test]
    fn records_and_looks_up_a_hypothesis() {
        let mut store = ProofStore::default();
        let a = Var::from_index(0).positive();

        let id = store.record(vec![a], Premise::Hyp);

        assert_eq!(store.literals(id), Some(&[a][..]));
        assert!(matches!(store.premise(id), Some(Premise::Hyp)));
        assert_eq!(store.unit_clause(a), Some(id));
    }

    #[test]
    fn deleted_clause_is_no_longer_visible() {
        let mut store = ProofStore::default();
        let a = Var::from_index(0).positive();

        let id = store.record(vec![a], Premise::Hyp);
        store.delete(id);

        assert_eq!(store.literals(id), None);
        assert_eq!(store.premise(id), None);
    }
}
