//! Resolution checking and unsat-core extraction.
use rustc_hash::{FxHashMap, FxHashSet};

use smtcore_formula::Lit;
use smtcore_proof::{ClauseId, ClauseSource, Premise};

use crate::CheckerError;

/// Resolve two (sorted, duplicate-free) clauses on their single shared pivot variable.
///
/// Returns the resolvent, sorted and free of duplicates. Errs with the number of candidate pivot
/// variables found if it isn't exactly one -- a proof step may not skip or merge resolutions.
pub fn resolve(a: &[Lit], b: &[Lit]) -> Result<Vec<Lit>, CheckerError> {
    let mut pivots: Vec<_> = a
        .iter()
        .filter(|&&lit| b.contains(&!lit))
        .map(|lit| lit.var())
        .collect();
    pivots.sort();
    pivots.dedup();

    if pivots.len() != 1 {
        return Err(CheckerError::ResolutionError {
            found_pivots: pivots.len(),
        });
    }
    let pivot = pivots[0];

    let mut resolvent: Vec<Lit> = a
        .iter()
        .chain(b.iter())
        .copied()
        .filter(|lit| lit.var() != pivot)
        .collect();
    resolvent.sort();
    resolvent.dedup();
    Ok(resolvent)
}

fn sorted_dedup(lits: &[Lit]) -> Vec<Lit> {
    let mut v = lits.to_vec();
    v.sort();
    v.dedup();
    v
}

/// Checks clause provenance against a [`ClauseSource`] and extracts unsat cores.
///
/// Proof nodes are expanded lazily: `is_proven`/`prove` only walk as much of a clause's `History`
/// as needed, memoizing the verdict for every [`ClauseId`] they visit so re-checking a DAG with
/// shared ancestors (the common case for learned clauses) does the work once.
pub struct ProofChecker<'s, S> {
    source: &'s S,
    proven: FxHashMap<ClauseId, bool>,
    hyps_used: FxHashSet<ClauseId>,
}

impl<'s, S: ClauseSource> ProofChecker<'s, S> {
    pub fn new(source: &'s S) -> ProofChecker<'s, S> {
        ProofChecker {
            source,
            proven: FxHashMap::default(),
            hyps_used: FxHashSet::default(),
        }
    }

    /// Whether `id` has a valid proof, memoizing the result.
    ///
    /// Unlike [`Self::prove`] this never returns an error: an unprovable clause just reports
    /// `false`. Use `prove` when the caller needs to know why.
    pub fn is_proven(&mut self, id: ClauseId) -> bool {
        if let Some(&proven) = self.proven.get(&id) {
            return proven;
        }
        let result = self.prove(id).is_ok();
        self.proven.insert(id, result);
        result
    }

    /// Prove `id`, recursively proving and memoizing everything it depends on.
    pub fn prove(&mut self, id: ClauseId) -> Result<(), CheckerError> {
        if let Some(&proven) = self.proven.get(&id) {
            return if proven {
                Ok(())
            } else {
                Err(CheckerError::InsufficientHypotheses(id))
            };
        }

        // Mark in-progress to turn an accidental cycle into a clean error instead of a stack
        // overflow.
        self.proven.insert(id, false);

        let premise = self
            .source
            .premise(id)
            .ok_or(CheckerError::InsufficientHypotheses(id))?
            .clone();

        let result = match premise {
            Premise::Hyp | Premise::Local => {
                self.hyps_used.insert(id);
                Ok(())
            }
            // A theory lemma is trusted on the theory plugin's own say-so; the core proof
            // reconstructor has no way to re-derive theory reasoning.
            Premise::Lemma(_) => Ok(()),
            Premise::History(parents) => self.add_res(id, &parents),
        };

        self.proven.insert(id, result.is_ok());
        result
    }

    /// Validate that resolving `parents` in order derives exactly `id`'s recorded literals.
    pub fn add_res(&mut self, id: ClauseId, parents: &[ClauseId]) -> Result<(), CheckerError> {
        if parents.is_empty() {
            return Err(CheckerError::InsufficientHypotheses(id));
        }

        for &parent in parents {
            self.prove(parent)?;
        }

        let mut acc = sorted_dedup(
            self.source
                .literals(parents[0])
                .ok_or(CheckerError::InsufficientHypotheses(parents[0]))?,
        );

        for &parent in &parents[1..] {
            let lits = self
                .source
                .literals(parent)
                .ok_or(CheckerError::InsufficientHypotheses(parent))?;
            acc = resolve(&acc, lits)?;
        }

        let target = sorted_dedup(
            self.source
                .literals(id)
                .ok_or(CheckerError::InsufficientHypotheses(id))?,
        );

        acc = self.close_gap(id, acc, &target)?;

        if acc != target {
            return Err(CheckerError::ResolventMismatch(id));
        }

        log::debug!("resolution step for {:?} verified via {} parents", id, parents.len());
        Ok(())
    }

    /// Resolve away literals the raw parent fold still carries but the learning engine's own
    /// minimization dropped from `id`'s recorded clause, because each one's negation already
    /// followed from a level-0 unit fact.
    ///
    /// Every extra literal must have a known unit clause for its negation (via
    /// [`ClauseSource::unit_clause`]); the first one that doesn't leaves `acc` as-is, and
    /// `add_res` reports the ordinary resolvent mismatch.
    fn close_gap(
        &mut self,
        id: ClauseId,
        mut acc: Vec<Lit>,
        target: &[Lit],
    ) -> Result<Vec<Lit>, CheckerError> {
        loop {
            if acc == target {
                return Ok(acc);
            }

            let extra = match acc.iter().find(|lit| !target.contains(lit)) {
                Some(&lit) => lit,
                // Nothing left in `acc` for a unit fact to remove; whatever's left of `target`
                // must be a genuine mismatch, not a gap.
                None => return Ok(acc),
            };

            let unit_id = match self.source.unit_clause(!extra) {
                Some(unit_id) => unit_id,
                None => return Ok(acc),
            };
            self.prove(unit_id)?;

            let unit_lits = self
                .source
                .literals(unit_id)
                .ok_or(CheckerError::InsufficientHypotheses(unit_id))?;
            acc = resolve(&acc, unit_lits).map_err(|_| CheckerError::ResolventMismatch(id))?;
        }
    }

    /// Prove that the empty clause (the canonical unsat witness) follows from the recorded proof.
    pub fn prove_unsat(&mut self, empty_clause: ClauseId) -> Result<(), CheckerError> {
        self.prove(empty_clause)?;
        log::info!("unsat proof for {:?} checked", empty_clause);
        Ok(())
    }

    /// The set of hypothesis clauses the last successful proof actually depended on.
    ///
    /// Only meaningful after a successful [`Self::prove`]/[`Self::prove_unsat`] call; accumulates
    /// across calls since the checker is typically used to prove a single empty clause once.
    pub fn unsat_core(&self) -> Vec<ClauseId> {
        self.hyps_used.iter().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smtcore_formula::Var;
    use std::collections::HashMap;

    struct FakeSource {
        lits: HashMap<ClauseId, Vec<Lit>>,
        premises: HashMap<ClauseId, Premise>,
        units: HashMap<Lit, ClauseId>,
    }

    impl ClauseSource for FakeSource {
        fn literals(&self, id: ClauseId) -> Option<&[Lit]> {
            self.lits.get(&id).map(|v| v.as_slice())
        }
        fn premise(&self, id: ClauseId) -> Option<&Premise> {
            self.premises.get(&id)
        }
        fn unit_clause(&self, lit: Lit) -> Option<ClauseId> {
            self.units.get(&lit).copied()
        }
    }

    fn v(i: usize) -> Var {
        Var::from_index(i)
    }

    #[test]
    fn resolve_requires_single_pivot() {
        let a = [v(0).positive(), v(1).positive()];
        let b = [v(0).negative(), v(2).positive()];
        let resolvent = resolve(&a, &b).unwrap();
        assert_eq!(resolvent, vec![v(1).positive(), v(2).positive()]);
    }

    #[test]
    fn resolve_rejects_multiple_pivots() {
        let a = [v(0).positive(), v(1).positive()];
        let b = [v(0).negative(), v(1).negative()];
        assert!(matches!(
            resolve(&a, &b),
            Err(CheckerError::ResolutionError { found_pivots: 2 })
        ));
    }

    #[test]
    fn prove_unsat_collects_core() {
        let c0 = ClauseId::from_raw(0);
        let c1 = ClauseId::from_raw(1);
        let empty = ClauseId::from_raw(2);

        let mut lits = HashMap::new();
        lits.insert(c0, vec![v(0).positive()]);
        lits.insert(c1, vec![v(0).negative()]);
        lits.insert(empty, vec![]);

        let mut premises = HashMap::new();
        premises.insert(c0, Premise::Hyp);
        premises.insert(c1, Premise::Hyp);
        premises.insert(empty, Premise::History(vec![c0, c1]));

        let source = FakeSource {
            lits,
            premises,
            units: HashMap::new(),
        };
        let mut checker = ProofChecker::new(&source);

        checker.prove_unsat(empty).unwrap();
        let mut core = checker.unsat_core();
        core.sort();
        assert_eq!(core, vec![c0, c1]);
    }

    #[test]
    fn missing_premise_is_insufficient_hypotheses() {
        let lits = HashMap::new();
        let premises = HashMap::new();
        let source = FakeSource {
            lits,
            premises,
            units: HashMap::new(),
        };
        let mut checker = ProofChecker::new(&source);

        let missing = ClauseId::from_raw(42);
        assert!(matches!(
            checker.prove(missing),
            Err(CheckerError::InsufficientHypotheses(id)) if id == missing
        ));
    }

    #[test]
    fn add_res_closes_gap_via_level_0_unit() {
        // c0 = (a v b), c1 = (!a v c), raw resolvent on `a` is (b v c). The learned clause
        // dropped `b` because `!b` already follows from the unit fact `u`.
        let c0 = ClauseId::from_raw(0);
        let c1 = ClauseId::from_raw(1);
        let u = ClauseId::from_raw(2);
        let learned = ClauseId::from_raw(3);

        let a = v(0).positive();
        let b = v(1).positive();
        let c = v(2).positive();

        let mut lits = HashMap::new();
        lits.insert(c0, vec![a, b]);
        lits.insert(c1, vec![!a, c]);
        lits.insert(u, vec![!b]);
        lits.insert(learned, vec![c]);

        let mut premises = HashMap::new();
        premises.insert(c0, Premise::Hyp);
        premises.insert(c1, Premise::Hyp);
        premises.insert(u, Premise::Hyp);
        premises.insert(learned, Premise::History(vec![c0, c1]));

        let mut units = HashMap::new();
        units.insert(!b, u);

        let source = FakeSource {
            lits,
            premises,
            units,
        };
        let mut checker = ProofChecker::new(&source);

        checker.prove(learned).unwrap();
        let mut core = checker.unsat_core();
        core.sort();
        assert_eq!(core, vec![c0, c1, u]);
    }

    #[test]
    fn add_res_without_a_unit_fact_reports_mismatch() {
        // Same shape as above, but no unit clause is known for `!b`: the gap can't be closed and
        // the mismatch must surface rather than silently accepting a wrong clause.
        let c0 = ClauseId::from_raw(0);
        let c1 = ClauseId::from_raw(1);
        let learned = ClauseId::from_raw(2);

        let a = v(0).positive();
        let b = v(1).positive();
        let c = v(2).positive();

        let mut lits = HashMap::new();
        lits.insert(c0, vec![a, b]);
        lits.insert(c1, vec![!a, c]);
        lits.insert(learned, vec![c]);

        let mut premises = HashMap::new();
        premises.insert(c0, Premise::Hyp);
        premises.insert(c1, Premise::Hyp);
        premises.insert(learned, Premise::History(vec![c0, c1]));

        let source = FakeSource {
            lits,
            premises,
            units: HashMap::new(),
        };
        let mut checker = ProofChecker::new(&source);

        assert!(matches!(
            checker.prove(learned),
            Err(CheckerError::ResolventMismatch(id)) if id == learned
        ));
    }
}
