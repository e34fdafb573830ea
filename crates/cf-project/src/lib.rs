//! cf-project: cell and experiment configuration files.
//!
//! Serde schema for the YAML descriptions, validation that runs once at
//! load time (the residual hot path never re-checks configuration), and
//! builders that turn validated definitions into `cf-cell` values.

pub mod load;
pub mod schema;
pub mod validate;

pub use load::{
    ProjectError, build_cell, build_experiment, cell_from_yaml, experiment_from_yaml, load_cell,
    load_experiment,
};
pub use schema::{CellDef, ElectrodeDef, ElectrolyteDef, ExperimentDef, HysteresisDef};
pub use validate::{ValidationError, validate_cell, validate_experiment};
