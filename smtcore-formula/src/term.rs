//! The term capability contract.
//!
//! Term hash-consing and type checking are out of scope for this core: a real embedder brings
//! its own term representation (with its own interning, sort system and congruence-closure
//! friendly canonical forms). What the solver core needs from that representation is exactly the
//! small surface specified here: stable integer identity, a shallow structural view, and the
//! ability to strip an outer negation. [`TermBank`] is that contract; [`SimpleTermBank`] is a
//! minimal, direct implementation used by the solver's own tests and by standalone embedders that
//! don't need anything fancier.
use std::fmt;

use rustc_hash::FxHashMap;

/// Opaque, hash-consed term identity.
///
/// Two `Term`s are the same term iff they compare equal; this core never inspects a term's
/// structure except through [`TermBank::view`].
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Term {
    id: u32,
}

impl Term {
    /// Wrap a raw id. Only [`TermBank`] implementations should call this.
    pub const fn from_raw(id: u32) -> Term {
        Term { id }
    }

    /// The raw id backing this term.
    pub const fn raw(self) -> u32 {
        self.id
    }
}

impl fmt::Debug for Term {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "t{}", self.id)
    }
}

/// A term's sort.
///
/// The core only ever distinguishes `Bool` from everything else: only `Bool`-sorted terms can
/// appear as the term of a propositional [`crate::literal::TermLit`].
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Sort {
    Bool,
    /// An uninterpreted or theory sort, identified by name. The core never inspects this beyond
    /// equality.
    Other(&'static str),
}

/// An uninterpreted function symbol.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[repr(transparent)]
pub struct FuncSym {
    id: u32,
}

impl FuncSym {
    pub const fn from_raw(id: u32) -> FuncSym {
        FuncSym { id }
    }
}

/// Shallow structural view of a term.
///
/// Exactly the four shapes `spec.md` §3 calls out: a boolean constant, a function application, an
/// equality, or a negation. Anything else a concrete term representation supports (quantifiers,
/// arithmetic literals, ...) is opaque to this core and is exposed as [`TermView::Opaque`].
#[derive(Copy, Clone, Debug)]
pub enum TermView<'a> {
    BoolConst(bool),
    App(FuncSym, &'a [Term]),
    Eq(Term, Term),
    Not(Term),
    Opaque,
}

/// The term capability set this core relies on.
///
/// Implemented by whatever term/type-checking layer an embedder brings; [`SimpleTermBank`] is a
/// reference implementation.
pub trait TermBank {
    /// Intern a boolean constant.
    fn mk_bool(&mut self, value: bool) -> Term;
    /// Intern a function application.
    fn mk_app(&mut self, func: FuncSym, args: &[Term]) -> Term;
    /// Intern an equality between two terms of the same sort.
    fn mk_eq(&mut self, lhs: Term, rhs: Term) -> Term;
    /// Intern the negation of a boolean term.
    fn mk_not(&mut self, term: Term) -> Term;

    /// The shallow view of a term.
    fn view(&self, term: Term) -> TermView<'_>;
    /// The sort of a term.
    fn sort(&self, term: Term) -> Sort;

    /// Strip an outer negation, if present.
    ///
    /// Returns `(t, sign)` where `t` has no outer negation and `sign` is `true` when `term` was
    /// not itself a negation (i.e. no flip was needed) and `false` when one negation was
    /// stripped. This is the primitive [`crate::literal::atom`] builds on.
    fn abs(&self, term: Term) -> (Term, bool) {
        match self.view(term) {
            TermView::Not(inner) => (inner, false),
            _ => (term, true),
        }
    }
}

/// A minimal hash-consing [`TermBank`].
///
/// Supports boolean constants, uninterpreted applications, equality and negation -- enough to
/// build and run the solver's own tests and small standalone examples without depending on a full
/// embedder term layer.
#[derive(Default)]
pub struct SimpleTermBank {
    nodes: Vec<Node>,
    table: FxHashMap<Node, Term>,
    next_func: u32,
    func_names: FxHashMap<&'static str, FuncSym>,
}

#[derive(Clone, PartialEq, Eq, Hash)]
enum Node {
    Bool(bool),
    App(FuncSym, Vec<Term>),
    Eq(Term, Term),
    Not(Term),
}

impl SimpleTermBank {
    pub fn new() -> SimpleTermBank {
        SimpleTermBank::default()
    }

    /// Intern (or look up) a named uninterpreted function symbol.
    pub fn func(&mut self, name: &'static str) -> FuncSym {
        if let Some(&sym) = self.func_names.get(name) {
            return sym;
        }
        let sym = FuncSym::from_raw(self.next_func);
        self.next_func += 1;
        self.func_names.insert(name, sym);
        sym
    }

    fn intern(&mut self, node: Node) -> Term {
        if let Some(&t) = self.table.get(&node) {
            return t;
        }
        let t = Term::from_raw(self.nodes.len() as u32);
        self.nodes.push(node.clone());
        self.table.insert(node, t);
        t
    }
}

impl TermBank for SimpleTermBank {
    fn mk_bool(&mut self, value: bool) -> Term {
        self.intern(Node::Bool(value))
    }

    fn mk_app(&mut self, func: FuncSym, args: &[Term]) -> Term {
        self.intern(Node::App(func, args.to_vec()))
    }

    fn mk_eq(&mut self, lhs: Term, rhs: Term) -> Term {
        let (lhs, rhs) = if lhs <= rhs { (lhs, rhs) } else { (rhs, lhs) };
        self.intern(Node::Eq(lhs, rhs))
    }

    fn mk_not(&mut self, term: Term) -> Term {
        if let Node::Not(inner) = self.nodes[term.raw() as usize] {
            return inner;
        }
        self.intern(Node::Not(term))
    }

    fn view(&self, term: Term) -> TermView<'_> {
        match &self.nodes[term.raw() as usize] {
            Node::Bool(v) => TermView::BoolConst(*v),
            Node::App(f, args) => TermView::App(*f, args),
            Node::Eq(l, r) => TermView::Eq(*l, *r),
            Node::Not(t) => TermView::Not(*t),
        }
    }

    fn sort(&self, term: Term) -> Sort {
        match &self.nodes[term.raw() as usize] {
            Node::Bool(_) | Node::Eq(..) | Node::Not(_) => Sort::Bool,
            Node::App(..) => Sort::Other("uninterpreted"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_consing_dedups() {
        let mut bank = SimpleTermBank::new();
        let a = bank.mk_bool(true);
        let b = bank.mk_bool(true);
        assert_eq!(a, b);
    }

    #[test]
    fn double_negation_cancels() {
        let mut bank = SimpleTermBank::new();
        let t = bank.mk_bool(true);
        let not_t = bank.mk_not(t);
        let not_not_t = bank.mk_not(not_t);
        assert_eq!(t, not_not_t);
    }

    #[test]
    fn abs_strips_one_negation() {
        let mut bank = SimpleTermBank::new();
        let t = bank.mk_bool(true);
        let not_t = bank.mk_not(t);
        assert_eq!(bank.abs(not_t), (t, false));
        assert_eq!(bank.abs(t), (t, true));
    }
}
