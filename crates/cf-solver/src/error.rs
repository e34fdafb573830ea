//! Error types for DAE solving.

use thiserror::Error;

/// Errors that can occur while setting up or driving an integration.
#[derive(Error, Debug)]
pub enum SolverError {
    #[error("Problem setup error: {what}")]
    Setup { what: String },

    #[error("Convergence failed: {what}")]
    ConvergenceFailed { what: String },

    #[error("Step size underflow at t = {t}: h = {h}")]
    StepSizeUnderflow { t: f64, h: f64 },

    #[error("Numeric error: {what}")]
    Numeric { what: String },
}

pub type SolverResult<T> = Result<T, SolverError>;
