//! cf-solver: implicit DAE integration.
//!
//! Solves systems of the form `F(t, y, y') = 0` with variable-step,
//! variable-order BDF methods and a Newton corrector. The problem side
//! supplies only a residual callback plus a differential/algebraic flag
//! per component (see [`DaeProblem`]); Jacobians are built by finite
//! differences, either densely or with grouped-column banded probing
//! when the caller knows the Jacobian bandwidth.

pub mod bdf;
pub mod error;
pub mod ic;
pub mod jacobian;
pub mod newton;
pub mod problem;

pub use bdf::{DaeSolution, LinearStrategy, SolveOptions, SolveStatus, SolverStats, solve_dae};
pub use error::{SolverError, SolverResult};
pub use ic::consistent_ic;
pub use problem::DaeProblem;
