//! Proof reconstruction for the CDCL(T) solver core.
//!
//! Given a read-only [`smtcore_proof::ClauseSource`] over a solver's clause database, this crate
//! checks that a derived clause's `History` premise really does follow from its parents by
//! resolution, and extracts the set of hypothesis clauses an unsat proof actually depends on.

pub mod dot;
pub mod proof;

pub use dot::to_dot;
pub use proof::{resolve, ProofChecker};

use smtcore_proof::ClauseId;

/// Errors raised while reconstructing a proof.
#[derive(thiserror::Error, Debug)]
pub enum CheckerError {
    #[error("resolution step expected exactly one pivot variable, found {found_pivots}")]
    ResolutionError { found_pivots: usize },
    #[error("clause {0:?} has no recorded premise or a failed proof")]
    InsufficientHypotheses(ClauseId),
    #[error("resolvent of clause {0:?} does not match its recorded literals")]
    ResolventMismatch(ClauseId),
}
