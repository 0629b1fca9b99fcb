//! Decision heuristics.

use partial_ref::{partial, PartialRef};

use crate::context::{AssignmentP, Context, ImplGraphP, TrailP, VsidsP};
use crate::lit::{Lit, Var};
use crate::prop::{enqueue_assignment, Reason};

pub mod vsids;

/// Make the var available again for future decisions.
///
/// Called when a variable becomes unassigned, either through backtracking or because it was just
/// given a variable count to track.
pub fn make_available(mut ctx: partial!(Context, mut VsidsP), var: Var) {
    ctx.part_mut(VsidsP).make_available(var);
}

/// Make a decision and enqueue it.
///
/// Branches on the unassigned variable with the highest VSIDS activity, always deciding it false
/// first (this core has no polarity saving, see the notes on decision heuristics).
///
/// Returns `false` if no decision was made because all variables are assigned.
pub fn make_decision(
    mut ctx: partial!(Context, mut AssignmentP, mut ImplGraphP, mut TrailP, mut VsidsP),
) -> bool {
    loop {
        let decision_var = match ctx.part_mut(VsidsP).next() {
            Some(var) => var,
            None => return false,
        };

        if ctx.part(AssignmentP).var_value(decision_var).is_some() {
            // Stale heap entry for an already assigned variable, skip it.
            continue;
        }

        let decision = Lit::from_var(decision_var, true);

        ctx.part_mut(TrailP).new_decision_level();

        enqueue_assignment(ctx.borrow(), decision, Reason::Unit);

        return true;
    }
}
