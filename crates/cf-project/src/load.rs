//! Loading and building: YAML text → validated definitions → cell values.

use std::path::Path;

use cf_cell::{
    CellAssembly, CellParams, Electrode, Electrolyte, Experiment, HysteresisParams, Mode,
    StopCondition, TimeGrid,
};

use crate::schema::{CellDef, ElectrodeDef, ExperimentDef};
use crate::validate::{ValidationError, validate_cell, validate_experiment};

#[derive(thiserror::Error, Debug)]
pub enum ProjectError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Cell description error: {0}")]
    Cell(#[from] cf_cell::CellError),
}

/// Parse and validate a cell definition from YAML text.
pub fn cell_from_yaml(text: &str) -> Result<CellDef, ProjectError> {
    let def: CellDef = serde_yaml::from_str(text)?;
    validate_cell(&def)?;
    Ok(def)
}

/// Parse and validate an experiment definition from YAML text.
pub fn experiment_from_yaml(text: &str) -> Result<ExperimentDef, ProjectError> {
    let def: ExperimentDef = serde_yaml::from_str(text)?;
    validate_experiment(&def)?;
    Ok(def)
}

pub fn load_cell(path: &Path) -> Result<CellDef, ProjectError> {
    cell_from_yaml(&std::fs::read_to_string(path)?)
}

pub fn load_experiment(path: &Path) -> Result<ExperimentDef, ProjectError> {
    experiment_from_yaml(&std::fs::read_to_string(path)?)
}

fn build_electrode(def: &ElectrodeDef) -> Result<Electrode, ProjectError> {
    let mut ed = Electrode::new(
        def.thickness_m,
        def.particle_radius_m,
        def.solid_fraction,
        def.li_max_kmol_m3,
        def.alpha_a,
        def.alpha_c,
        def.x_initial,
        def.radial_nodes,
        def.material.clone(),
    )?;
    if let Some(h) = &def.hysteresis {
        ed = ed.with_hysteresis(HysteresisParams {
            g: h.gain,
            m: h.max_v,
            h0: h.initial_v,
        });
    }
    Ok(ed)
}

/// Turn a validated cell definition into domain values.
pub fn build_cell(def: &CellDef) -> Result<CellAssembly, ProjectError> {
    Ok(CellAssembly {
        bat: CellParams {
            area: def.area_m2,
            cap: def.capacity_ah,
            temp: def.temperature_k,
        },
        el: Electrolyte {
            li_ref: def.electrolyte.li_ref_kmol_m3,
        },
        an: build_electrode(&def.anode)?,
        ca: build_electrode(&def.cathode)?,
    })
}

/// Turn a validated experiment definition into an experiment value.
pub fn build_experiment(def: &ExperimentDef) -> Result<Experiment, ProjectError> {
    let mode = match (def.mode.as_str(), def.units.as_deref()) {
        ("current", Some("A")) => Mode::CurrentAmps,
        ("current", Some("C")) => Mode::CurrentCRate,
        ("voltage", None) => Mode::Voltage,
        ("power", None) => Mode::Power,
        _ => {
            return Err(ValidationError::UnsupportedMode {
                mode: def.mode.clone(),
                units: def.units.clone(),
            }
            .into());
        }
    };

    let time = TimeGrid::new(def.t_min, def.t_max, def.nt)?;
    let mut limits = Vec::new();
    if let Some(v) = def.voltage_min {
        limits.push(StopCondition::VoltageBelow(v));
    }
    if let Some(v) = def.voltage_max {
        limits.push(StopCondition::VoltageAbove(v));
    }

    Ok(Experiment::new(mode, def.profile.clone(), time)?.with_limits(limits))
}
