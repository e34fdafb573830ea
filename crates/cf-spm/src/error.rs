//! Error types for the SPM engine.

use cf_cell::CellError;
use cf_solver::SolverError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SpmError {
    #[error("Cell description error: {0}")]
    Cell(#[from] CellError),

    #[error("Solver error: {0}")]
    Solver(#[from] SolverError),

    #[error("Experiment error: {what}")]
    Experiment { what: String },
}

pub type SpmResult<T> = Result<T, SpmError>;
