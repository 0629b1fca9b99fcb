//! Theory plugin interface (C5): the contract between the CDCL engine and external theory
//! reasoners, per spec.md §6.1-6.3.
//!
//! Plugins are Rust trait objects rather than the opaque-state-plus-function-pointers pairing the
//! design notes sketch for languages without first-class dynamic dispatch: a `Box<dyn
//! TheoryPlugin>` already closes over its own state, so there is no separate "state" to thread
//! through `push_level`/`pop_levels` calls.
use smtcore_formula::term::{Term, TermBank};
use smtcore_proof::TheoryToken;

use crate::lit::Lit;

/// Opaque congruence-closure node handle.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct CcNode(usize);

impl CcNode {
    pub const fn from_raw(id: usize) -> CcNode {
        CcNode(id)
    }

    pub const fn raw(self) -> usize {
        self.0
    }
}

/// Opaque explanation handle for a congruence-closure merge or conflict.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct CcExpl(u64);

impl CcExpl {
    pub const fn from_raw(id: u64) -> CcExpl {
        CcExpl(id)
    }

    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// The antecedents and theory justification for a propagated literal.
///
/// Built lazily: the supporting literals are only materialized (via [`Consequence::materialize`])
/// if conflict analysis actually needs the reason, matching spec.md §4.4's `propagate` contract.
pub struct Consequence {
    thunk: Box<dyn FnOnce() -> (Vec<Lit>, Option<TheoryToken>)>,
}

impl Consequence {
    pub fn new(thunk: impl FnOnce() -> (Vec<Lit>, Option<TheoryToken>) + 'static) -> Consequence {
        Consequence {
            thunk: Box::new(thunk),
        }
    }

    pub fn materialize(self) -> (Vec<Lit>, Option<TheoryToken>) {
        (self.thunk)()
    }
}

/// The action interface passed to plugins and the congruence closure during a check round.
///
/// Implemented by `Solver_internal`; plugins only ever call it, never construct one.
pub trait Acts {
    /// Record that `lits` is false under the current trail.
    ///
    /// Unlike the source language's exception-based contract, this returns normally: the engine
    /// notices the pending conflict the next time it looks, rather than unwinding the plugin's
    /// call stack.
    fn raise_conflict(&mut self, lits: &[Lit], token: Option<TheoryToken>);
    /// Enqueue `lit` at the current level with a reason materialized lazily from `reason`.
    fn propagate(&mut self, lit: Lit, reason: Consequence);
    /// Install a clause at level 0, permanent if `keep`.
    fn add_clause(&mut self, lits: &[Lit], keep: bool, token: Option<TheoryToken>);
    /// Intern `lit`, invoking the preprocessor if necessary.
    fn mk_lit(&mut self, lit: Lit) -> Lit;
    /// Iterate the trail literals visible to this check round.
    fn iter_assumptions(&self, f: &mut dyn FnMut(Lit));
}

/// Congruence-closure events a plugin can react to.
///
/// Split out from [`TheoryPlugin`] so a plugin that only cares about some events can ignore the
/// rest via the default no-op bodies.
pub trait CcListener {
    fn on_new_term(&mut self, _node: CcNode, _term: Term) {}
    fn on_pre_merge(&mut self, _n1: CcNode, _n2: CcNode) {}
    fn on_post_merge(&mut self, _n1: CcNode, _n2: CcNode) {}
    fn on_conflict(&mut self, _acts: &mut dyn Acts, _expl: CcExpl) {}
    fn on_propagate(&mut self, _acts: &mut dyn Acts, _lit: Lit, _expl: CcExpl) {}
}

/// A theory plugin, per spec.md §6.1.
///
/// `push_level`/`pop_levels` bracket the plugin's own speculative state the same way the SAT
/// trail's decision levels bracket assignments; `Solver_internal` forwards to every registered
/// plugin in registration order (spec.md §5).
pub trait TheoryPlugin: CcListener {
    fn name(&self) -> &str;
    fn push_level(&mut self);
    fn pop_levels(&mut self, n: usize);

    /// Called after BCP stabilizes with newly asserted literals still unexamined by this plugin.
    fn on_partial_check(&mut self, _acts: &mut dyn Acts) {}
    /// Called once BCP has stabilized with no pending unit clauses.
    fn on_final_check(&mut self, _acts: &mut dyn Acts) {}

    /// A simplification rewrite rule (C3's simplify cache), tried in reverse registration order.
    fn simplify(&mut self, _term: Term, _bank: &mut dyn TermBank) -> Option<Term> {
        None
    }

    /// A preprocessing rewrite rule (C3's preprocess cache); may introduce definitional clauses
    /// through `mk_lit`/`add_clause` while rewriting.
    fn preprocess(
        &mut self,
        _term: Term,
        _bank: &mut dyn TermBank,
        _mk_lit: &mut dyn FnMut(Term) -> Lit,
        _add_clause: &mut dyn FnMut(&[Lit]),
    ) -> Option<Term> {
        None
    }
}

/// The congruence-closure contract consumed by `Solver_internal`, per spec.md §6.3.
///
/// Construction (`create(term_state, size)`) is implementation-specific and so is not part of this
/// trait; an embedder builds its own `Box<dyn CongruenceClosure>` however it likes and hands it to
/// [`crate::solver_internal::SolverInternal::set_congruence_closure`].
pub trait CongruenceClosure {
    fn add_term(&mut self, term: Term) -> CcNode;
    fn find(&mut self, node: CcNode) -> CcNode;
    fn merge(&mut self, n1: CcNode, n2: CcNode, expl: CcExpl);
    fn assert_lits(&mut self, lits: &[Lit]);
    fn check(&mut self, acts: &mut dyn Acts);
    fn push_level(&mut self);
    fn pop_levels(&mut self, n: usize);
    fn set_as_lit(&mut self, node: CcNode, lit: Lit);
    fn raise_conflict_from_expl(&mut self, acts: &mut dyn Acts, expl: CcExpl);
}
