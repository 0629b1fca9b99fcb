#[macro_use]
pub mod lit;
pub mod cnf;

mod analyze_conflict;
mod atoms;
mod binary;
mod cdcl;
mod clause;
mod config;
mod context;
mod decision;
mod error;
mod glue;
mod load;
mod model;
mod proof;
mod proof_store;
mod prop;
mod schedule;
mod simplify;
mod solver;
mod solver_internal;
mod state;
mod theory;
mod tmp;
mod variables;

mod vec_mut_scan;
mod vli_enc;

#[cfg(test)]
mod test;

pub use error::SolverError;
pub use solver::{Solver, SolverStatus};
pub use theory::{Acts, CcListener, CongruenceClosure, TheoryPlugin};
