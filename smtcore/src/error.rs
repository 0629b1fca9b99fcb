//! Top-level solver errors, per spec.md §7.
//!
//! `Unsat` and `Unknown` are results, not errors (see [`crate::solver::SolverStatus`]); this type
//! only covers genuine failures: misuse of the public API and proof-reconstruction bugs.
use thiserror::Error;

/// Errors the top-level solver can report to its caller.
#[derive(Error, Debug)]
pub enum SolverError {
    /// The caller misused the public API (e.g. asserted a clause naming an atom that was never
    /// created through this solver). Failing a call this way leaves the solver in the state it
    /// was in before the call.
    #[error("invalid use of the solver API: {0}")]
    UserError(String),
    /// Proof reconstruction could not reconstruct a `History`-premised clause from its recorded
    /// parents. Indicates a bug in the CDCL engine's own bookkeeping, not a caller error; the
    /// UNSAT verdict itself stands, only the proof is unavailable.
    #[error("proof reconstruction failed: {0}")]
    ProofReconstruction(#[from] smtcore_checker::CheckerError),
}
