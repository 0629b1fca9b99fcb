//! `Solver_internal` (C5): the bidirectional bridge between the CDCL engine and the theory
//! plugins / congruence closure registered on it, per spec.md §4.3 and §4.5.
use rustc_hash::{FxHashMap, FxHashSet};

use smtcore_formula::term::{Sort, Term, TermBank, TermView};

use crate::lit::Lit;
use crate::theory::{Acts, CongruenceClosure, TheoryPlugin};

/// Owns the plugin chain, the congruence closure, and the simplify/preprocess caches.
///
/// Generic over the embedder's term representation: this core never constructs terms itself, only
/// rewrites and forwards them.
pub struct SolverInternal<TB: TermBank> {
    pub term_bank: TB,
    plugins: Vec<Box<dyn TheoryPlugin>>,
    cc: Option<Box<dyn CongruenceClosure>>,
    simplify_cache: FxHashMap<Term, Term>,
    preprocess_cache: FxHashMap<Term, Term>,
}

impl<TB: TermBank> SolverInternal<TB> {
    pub fn new(term_bank: TB) -> SolverInternal<TB> {
        SolverInternal {
            term_bank,
            plugins: Vec::new(),
            cc: None,
            simplify_cache: FxHashMap::default(),
            preprocess_cache: FxHashMap::default(),
        }
    }

    /// Register a theory plugin. Plugins are invoked in registration order at every dispatch
    /// point, but in *reverse* registration order for simplify/preprocess hooks (spec.md §5).
    pub fn add_theory(&mut self, plugin: Box<dyn TheoryPlugin>) {
        self.plugins.push(plugin);
    }

    /// Install the congruence closure shared between the theory interface and its plugins.
    pub fn set_congruence_closure(&mut self, cc: Box<dyn CongruenceClosure>) {
        self.cc = Some(cc);
    }

    pub fn plugins(&self) -> &[Box<dyn TheoryPlugin>] {
        &self.plugins
    }

    /// Forward a batch of asserted literals to the congruence closure and the plugin chain,
    /// per spec.md §4.5.
    pub fn assert_lits(&mut self, final_check: bool, lits: &[Lit], acts: &mut dyn Acts) {
        if let Some(cc) = &mut self.cc {
            if !final_check {
                cc.assert_lits(lits);
            }
            cc.check(acts);
        }

        for plugin in self.plugins.iter_mut() {
            if final_check {
                plugin.on_final_check(acts);
            } else {
                plugin.on_partial_check(acts);
            }
        }
    }

    /// Push a new assertion level on every plugin and the congruence closure.
    pub fn push_level(&mut self) {
        for plugin in self.plugins.iter_mut() {
            plugin.push_level();
        }
        if let Some(cc) = &mut self.cc {
            cc.push_level();
        }
    }

    /// Pop `n` assertion levels. The simplify/preprocess caches are deliberately not touched:
    /// their correctness relies on purity of the registered hooks, not on being re-derived per
    /// level (spec.md §4.5, §9 open questions).
    pub fn pop_levels(&mut self, n: usize) {
        for plugin in self.plugins.iter_mut() {
            plugin.pop_levels(n);
        }
        if let Some(cc) = &mut self.cc {
            cc.pop_levels(n);
        }
    }

    /// Memoized fixed-point rewrite of `term` through the registered simplify hooks (C3).
    pub fn simplify(&mut self, term: Term) -> Term {
        if let Some(&cached) = self.simplify_cache.get(&term) {
            return cached;
        }

        let mut current = match self.term_bank.view(term) {
            TermView::App(f, args) => {
                let args = args.to_vec();
                let new_args: Vec<Term> = args.iter().map(|&a| self.simplify(a)).collect();
                if new_args == args {
                    term
                } else {
                    self.term_bank.mk_app(f, &new_args)
                }
            }
            TermView::Eq(l, r) => {
                let (l2, r2) = (self.simplify(l), self.simplify(r));
                if l2 == l && r2 == r {
                    term
                } else {
                    self.term_bank.mk_eq(l2, r2)
                }
            }
            TermView::Not(inner) => {
                let inner2 = self.simplify(inner);
                if inner2 == inner {
                    term
                } else {
                    self.term_bank.mk_not(inner2)
                }
            }
            TermView::BoolConst(_) | TermView::Opaque => term,
        };

        loop {
            let SolverInternal {
                plugins, term_bank, ..
            } = self;
            let mut next = None;
            for plugin in plugins.iter_mut().rev() {
                if let Some(candidate) = plugin.simplify(current, term_bank) {
                    if candidate != current {
                        next = Some(candidate);
                        break;
                    }
                }
            }
            match next {
                Some(candidate) => current = candidate,
                None => break,
            }
        }

        self.simplify_cache.insert(term, current);
        current
    }

    /// Memoized fixed-point rewrite of `term` through the registered preprocess hooks (C3),
    /// which may additionally introduce definitional clauses through `mk_lit`/`add_clause`.
    pub fn preprocess(
        &mut self,
        term: Term,
        mk_lit: &mut dyn FnMut(Term) -> Lit,
        add_clause: &mut dyn FnMut(&[Lit]),
    ) -> Term {
        if let Some(&cached) = self.preprocess_cache.get(&term) {
            return cached;
        }

        let mut current = self.simplify(term);

        loop {
            let SolverInternal {
                plugins, term_bank, ..
            } = self;
            let mut next = None;
            for plugin in plugins.iter_mut().rev() {
                if let Some(candidate) =
                    plugin.preprocess(current, term_bank, mk_lit, add_clause)
                {
                    if candidate != current {
                        next = Some(candidate);
                        break;
                    }
                }
            }
            match next {
                Some(candidate) => current = candidate,
                None => break,
            }
        }

        self.preprocess_cache.insert(term, current);
        current
    }

    /// Preprocess a literal: simplify/preprocess its term, then rebuild the literal with the
    /// original sign (spec.md §4.3 `preprocess_lit`).
    pub fn preprocess_lit(
        &mut self,
        lit: smtcore_formula::literal::TermLit,
        mk_lit: &mut dyn FnMut(Term) -> Lit,
        add_clause: &mut dyn FnMut(&[Lit]),
    ) -> smtcore_formula::literal::TermLit {
        use smtcore_formula::literal::TermLit;

        let processed = self.preprocess(lit.term(), mk_lit, add_clause);
        TermLit::make(lit.sign(), processed)
    }

    /// Give the congruence closure an atom for every boolean subterm reachable from `term`
    /// (including `term` itself) that isn't itself a negation, per spec.md §4.3.
    ///
    /// A no-op if no congruence closure is installed. `mk_atom` should build the atom without
    /// normalizing through the term bank (e.g. via [`crate::atoms::AtomTable::make_atom_raw`]):
    /// every term this walks is already in absolute form by construction (an outer `Not` is
    /// followed rather than lifted), so there is never a sign to strip.
    pub fn lift_bool_subterms(&mut self, term: Term, mk_atom: &mut dyn FnMut(Term) -> Lit) {
        if self.cc.is_none() {
            return;
        }

        let mut stack = vec![term];
        let mut visited: FxHashSet<Term> = FxHashSet::default();

        while let Some(t) = stack.pop() {
            if !visited.insert(t) {
                continue;
            }

            let is_negation = matches!(self.term_bank.view(t), TermView::Not(_));

            match self.term_bank.view(t) {
                TermView::Not(inner) => stack.push(inner),
                TermView::App(_, args) => stack.extend(args.to_vec()),
                TermView::Eq(l, r) => {
                    stack.push(l);
                    stack.push(r);
                }
                TermView::BoolConst(_) | TermView::Opaque => {}
            }

            if is_negation {
                continue;
            }

            if matches!(self.term_bank.sort(t), Sort::Bool) {
                if let Some(cc) = &mut self.cc {
                    let node = cc.add_term(t);
                    let lit = mk_atom(t);
                    cc.set_as_lit(node, lit);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use smtcore_formula::term::SimpleTermBank;
    use smtcore_proof::TheoryToken;

    use crate::theory::{CcListener, Consequence};

    struct ConstFolder;

    impl CcListener for ConstFolder {}

    impl TheoryPlugin for ConstFolder {
        fn name(&self) -> &str {
            "const-folder"
        }
        fn push_level(&mut self) {}
        fn pop_levels(&mut self, _n: usize) {}

        fn simplify(&mut self, term: Term, bank: &mut dyn TermBank) -> Option<Term> {
            if let TermView::Not(inner) = bank.view(term) {
                if let TermView::BoolConst(v) = bank.view(inner) {
                    return Some(bank.mk_bool(!v));
                }
            }
            None
        }
    }

    #[allow(dead_code)]
    struct NullActs;

    impl Acts for NullActs {
        fn raise_conflict(&mut self, _lits: &[Lit], _token: Option<TheoryToken>) {}
        fn propagate(&mut self, _lit: Lit, _reason: Consequence) {}
        fn add_clause(&mut self, _lits: &[Lit], _keep: bool, _token: Option<TheoryToken>) {}
        fn mk_lit(&mut self, lit: Lit) -> Lit {
            lit
        }
        fn iter_assumptions(&self, _f: &mut dyn FnMut(Lit)) {}
    }

    #[test]
    fn simplify_folds_double_negation_via_plugin() {
        let mut si = SolverInternal::new(SimpleTermBank::new());
        si.add_theory(Box::new(ConstFolder));

        let t = si.term_bank.mk_bool(true);
        let not_t = si.term_bank.mk_not(t);

        let folded = si.simplify(not_t);
        assert!(matches!(
            si.term_bank.view(folded),
            TermView::BoolConst(false)
        ));
    }

    #[test]
    fn simplify_is_idempotent_up_to_the_cache() {
        let mut si = SolverInternal::new(SimpleTermBank::new());
        si.add_theory(Box::new(ConstFolder));

        let t = si.term_bank.mk_bool(true);
        let not_t = si.term_bank.mk_not(t);

        let once = si.simplify(not_t);
        let twice = si.simplify(once);
        assert_eq!(once, twice);
    }

    #[test]
    fn push_then_pop_is_a_no_op_on_an_empty_plugin_chain() {
        let mut si = SolverInternal::new(SimpleTermBank::new());
        si.push_level();
        si.pop_levels(1);
    }
}
