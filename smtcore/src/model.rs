//! Global model reconstruction.
//!
//! The teacher reconstructed a model over its three-tier user/global/solver variable mapping
//! (the remapping layer dropped from `crate::variables`, see DESIGN.md); atoms here are solver
//! variables directly, so reconstruction is just a snapshot of the final propositional
//! assignment, read back either as a raw literal or, through [`crate::atoms::AtomTable`], as the
//! term it stands for.

use partial_ref::{partial, PartialRef};

use smtcore_formula::term::Term;

use crate::context::{parts::*, Context};
use crate::lit::Lit;
use crate::state::SatState;

/// A satisfying assignment, frozen at the moment the solver last reported `Sat`.
#[derive(Default)]
pub struct Model {
    /// Assignment of the model, indexed by solver variable.
    assignment: Vec<Option<bool>>,
}

impl Model {
    /// Assignment of the model, indexed by solver variable.
    ///
    /// Only valid while the solver state is `Sat`.
    pub fn assignment(&self) -> &[Option<bool>] {
        &self.assignment
    }

    /// Whether a given literal is true in the model.
    ///
    /// Only valid while the solver state is `Sat`.
    pub fn lit_is_true(&self, lit: Lit) -> bool {
        self.assignment[lit.index()] == Some(lit.is_positive())
    }
}

/// Copies the final propositional assignment into the model and marks the state `Sat`.
pub fn reconstruct_model(mut ctx: partial!(Context, mut ModelP, mut SolverStateP, AssignmentP)) {
    let (model, mut ctx) = ctx.split_part_mut(ModelP);

    model.assignment.clear();
    model
        .assignment
        .extend_from_slice(ctx.part(AssignmentP).assignment());

    ctx.part_mut(SolverStateP).sat_state = SatState::Sat;
}

/// The truth value of `term` in the model, given the atom it was registered under (if any).
///
/// Returns `None` if the term was never turned into an atom; such a term is unconstrained by the
/// boolean skeleton and a theory's own model completion would be needed to give it a value.
pub fn term_value(model: &Model, atoms: &crate::atoms::AtomTable, term: Term) -> Option<bool> {
    let var = atoms.var_of(term)?;
    model.assignment().get(var.index()).copied().flatten()
}
