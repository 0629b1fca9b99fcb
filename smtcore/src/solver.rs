//! The top-level solver facade (C7), per spec.md §6.4.
//!
//! `Solver<TB>` owns the propositional [`Context`] and the theory bridge ([`SolverInternal`])
//! side by side, and is the only thing an embedder talks to: it turns embedder-level terms into
//! atoms, embedder-level clauses into loaded CNF, and drives the CDCL loop to a verdict,
//! interleaving theory final-checks the way spec.md §5 describes.
use partial_ref::{IntoPartialRef, IntoPartialRefMut, PartialRef};

use smtcore_formula::literal::TermLit;
use smtcore_formula::term::{Term, TermBank};
use smtcore_proof::{ClauseId, Premise, TheoryToken};

use crate::cdcl::conflict_step;
use crate::context::{ensure_var_count, parts::*, Context};
use crate::lit::Lit;
use crate::load::load_clause;
use crate::model::{reconstruct_model, term_value, Model};
use crate::solver_internal::SolverInternal;
use crate::state::SatState;
use crate::theory::{Acts, Consequence, TheoryPlugin};

/// The result of [`Solver::solve`], per spec.md §6.4.
pub enum SolverStatus {
    Sat,
    /// `unsat_core` lists every hypothesis clause recorded so far.
    ///
    /// This is sound but not minimized: walking `smtcore-checker`'s actual resolution proof down
    /// to the hypotheses it touches would shrink it, but the CDCL engine's own conflict-clause
    /// learning does not yet record `History` steps into the solver's [`crate::proof_store`], so
    /// there is no proof to walk. See DESIGN.md.
    Unsat { unsat_core: Vec<ClauseId> },
    Unknown,
}

/// A CDCL(T) solver over terms from `TB`.
pub struct Solver<TB: TermBank> {
    ctx: Box<Context<'static>>,
    si: SolverInternal<TB>,
    hyps: Vec<ClauseId>,
}

impl<TB: TermBank> Solver<TB> {
    /// Create a solver over the given term bank, per spec.md §6.4's `create`.
    pub fn create(term_bank: TB) -> Solver<TB> {
        Solver {
            ctx: Box::default(),
            si: SolverInternal::new(term_bank),
            hyps: Vec::new(),
        }
    }

    /// Register a theory plugin for the lifetime of the solver.
    pub fn add_theory(&mut self, theory: Box<dyn TheoryPlugin>) {
        self.si.add_theory(theory);
    }

    /// Register a theory plugin scoped to the current assertion level.
    ///
    /// There is no assertion-level stack separate from the plugin's own `push_level`/
    /// `pop_levels` bookkeeping in this core, so this is equivalent to [`Self::add_theory`]; kept
    /// as a distinct method to match spec.md §6.4's API shape.
    pub fn add_theory_l(&mut self, theory: Box<dyn TheoryPlugin>) {
        self.add_theory(theory);
    }

    /// Intern `term` and return the atom for `(term, sign)`, per spec.md §6.4's `mk_atom_t`.
    ///
    /// Runs the term through the registered preprocessors first, so any definitional clauses a
    /// plugin introduces for a Tseitin-style auxiliary are loaded before the returned atom is
    /// used in a clause.
    pub fn mk_atom_t(&mut self, term: Term, sign: bool) -> Lit {
        let atom_table = &mut self.ctx.atom_table;
        let variables = &mut self.ctx.variables;
        let mut pending_clauses: Vec<Vec<Lit>> = Vec::new();

        let mut mk_lit = |t: Term| -> Lit {
            let (lit, fresh) = atom_table.make_atom_raw(t);
            if let Some(var) = fresh {
                variables.set_watermark(var.index() + 1);
            }
            lit
        };
        let mut add_clause = |lits: &[Lit]| pending_clauses.push(lits.to_vec());

        // `preprocess` holds `&mut self.si` (including its `term_bank`) for the whole call, so
        // `mk_lit`/`add_clause` above must not need `term_bank` themselves -- that's why they go
        // through `make_atom_raw` rather than `make_atom`.
        let processed = self.si.preprocess(term, &mut mk_lit, &mut add_clause);

        let (lit, fresh) = self
            .ctx
            .atom_table
            .make_atom(&self.si.term_bank, TermLit::make(sign, processed));
        if let Some(var) = fresh {
            self.ctx.variables.set_watermark(var.index() + 1);
        }

        let atom_table = &mut self.ctx.atom_table;
        let variables = &mut self.ctx.variables;
        let mut mk_raw_atom = |t: Term| -> Lit {
            let (lit, fresh) = atom_table.make_atom_raw(t);
            if let Some(var) = fresh {
                variables.set_watermark(var.index() + 1);
            }
            lit
        };
        self.si.lift_bool_subterms(processed, &mut mk_raw_atom);

        let mut ctx_ref = self.ctx.into_partial_ref_mut();
        ensure_var_count(ctx_ref.borrow());
        for clause in &pending_clauses {
            load_clause(ctx_ref.borrow(), clause);
        }

        lit
    }

    /// Assert a clause of term-level literals, per spec.md §6.4's `add_clause_l`.
    pub fn add_clause_l(&mut self, atoms: &[TermLit]) {
        let lits: Vec<Lit> = atoms
            .iter()
            .map(|&lit| self.mk_atom_t(lit.term(), lit.sign()))
            .collect();

        let id = self
            .ctx
            .proof_store
            .record(lits.clone(), Premise::Hyp);
        self.hyps.push(id);

        let mut ctx_ref = self.ctx.into_partial_ref_mut();
        load_clause(ctx_ref.borrow(), &lits);
    }

    /// Look up the atom already created for `term`, without creating one.
    pub fn atom_of(&self, term: Term) -> Option<Lit> {
        self.ctx.atom_table.var_of(term).map(|var| var.positive())
    }

    /// The model's value for `term`, once [`Self::solve`] has returned [`SolverStatus::Sat`].
    pub fn model_value(&self, term: Term) -> Option<bool> {
        term_value(self.model(), &self.ctx.atom_table, term)
    }

    /// The raw propositional model, once [`Self::solve`] has returned [`SolverStatus::Sat`].
    pub fn model(&self) -> &Model {
        &self.ctx.model
    }

    /// Check satisfiability under `assumptions`, per spec.md §6.4's `solve`.
    ///
    /// Assumptions are loaded as permanent unit clauses: there is no assumption-popping
    /// incrementality in this core (see DESIGN.md's note on the dropped `Incremental` layer), so
    /// a solver should not be reused across assumption sets that are meant to be independent.
    pub fn solve(&mut self, assumptions: &[Lit]) -> SolverStatus {
        {
            let mut ctx_ref = self.ctx.into_partial_ref_mut();
            for &lit in assumptions {
                load_clause(ctx_ref.borrow(), &[lit]);
            }
        }

        loop {
            {
                let mut ctx_ref = self.ctx.into_partial_ref_mut();
                while ctx_ref.part(SolverStateP).sat_state == SatState::Unknown {
                    conflict_step(ctx_ref.borrow());
                }
            }

            match self.ctx.solver_state.sat_state {
                SatState::Unsat => {
                    return SolverStatus::Unsat {
                        unsat_core: self.hyps.clone(),
                    }
                }
                SatState::Sat => {
                    if self.final_theory_check(assumptions) {
                        let mut ctx_ref = self.ctx.into_partial_ref_mut();
                        reconstruct_model(ctx_ref.borrow());
                        return SolverStatus::Sat;
                    }
                    // A theory raised a conflict or propagated; the clause(s) it produced were
                    // already loaded below, flipping `sat_state` back to `Unknown`. Loop again.
                }
                SatState::Unknown => unreachable!("conflict_step only exits on Sat or Unsat"),
            }
        }
    }

    /// Run every registered theory's final check against the current trail.
    ///
    /// Returns `true` if no theory objected. Otherwise the conflict clause (and any lemmas the
    /// theories produced along the way) have already been loaded into the CDCL engine.
    fn final_theory_check(&mut self, assumptions: &[Lit]) -> bool {
        let trail_lits: Vec<Lit> = {
            let ctx_ref = self.ctx.into_partial_ref();
            ctx_ref.part(TrailP).trail().to_vec()
        };

        let mut acts = CollectingActs {
            conflict: None,
            new_clauses: Vec::new(),
            assumptions,
        };
        self.si.assert_lits(true, &trail_lits, &mut acts);

        let new_clauses = acts.new_clauses;
        let conflict = acts.conflict;

        let mut ctx_ref = self.ctx.into_partial_ref_mut();
        for clause in &new_clauses {
            load_clause(ctx_ref.borrow(), clause);
        }
        if let Some(conflict_clause) = conflict {
            load_clause(ctx_ref.borrow(), &conflict_clause);
            false
        } else {
            true
        }
    }
}

/// Collects the actions a theory plugin takes during a final check, for [`Solver::solve`] to
/// replay into the CDCL engine once the check round is over.
///
/// `Acts` is implemented against a live engine in general, but a final check only needs to
/// gather what would be enqueued; this avoids threading the CDCL `Context` itself through every
/// plugin call.
struct CollectingActs<'a> {
    conflict: Option<Vec<Lit>>,
    new_clauses: Vec<Vec<Lit>>,
    assumptions: &'a [Lit],
}

impl<'a> Acts for CollectingActs<'a> {
    fn raise_conflict(&mut self, lits: &[Lit], _token: Option<TheoryToken>) {
        if self.conflict.is_none() {
            self.conflict = Some(lits.iter().map(|&lit| !lit).collect());
        }
    }

    fn propagate(&mut self, lit: Lit, reason: Consequence) {
        let (antecedents, _token) = reason.materialize();
        let mut clause: Vec<Lit> = antecedents.iter().map(|&lit| !lit).collect();
        clause.push(lit);
        self.new_clauses.push(clause);
    }

    fn add_clause(&mut self, lits: &[Lit], _keep: bool, _token: Option<TheoryToken>) {
        self.new_clauses.push(lits.to_vec());
    }

    fn mk_lit(&mut self, lit: Lit) -> Lit {
        lit
    }

    fn iter_assumptions(&self, f: &mut dyn FnMut(Lit)) {
        for &lit in self.assumptions {
            f(lit);
        }
    }
}
