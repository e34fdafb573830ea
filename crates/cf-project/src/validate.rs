//! Configuration validation logic.
//!
//! Everything here runs once at load time. In particular this is where
//! unsupported `(mode, units)` pairings die: the residual assembler and
//! boundary-condition dispatch assume a valid combination and never
//! re-check it.

use crate::schema::{CellDef, ElectrodeDef, ExperimentDef};

#[derive(thiserror::Error, Debug)]
pub enum ValidationError {
    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Unsupported mode/units pair: mode = {mode:?}, units = {units:?}")]
    UnsupportedMode { mode: String, units: Option<String> },

    #[error("Cell description error: {0}")]
    Cell(#[from] cf_cell::CellError),
}

fn require_positive(field: &str, value: f64) -> Result<(), ValidationError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ValidationError::InvalidValue {
            field: field.to_string(),
            value: value.to_string(),
            reason: "must be positive and finite".to_string(),
        })
    }
}

fn require_fraction(field: &str, value: f64) -> Result<(), ValidationError> {
    if value > 0.0 && value < 1.0 {
        Ok(())
    } else {
        Err(ValidationError::InvalidValue {
            field: field.to_string(),
            value: value.to_string(),
            reason: "must lie in (0, 1)".to_string(),
        })
    }
}

fn validate_electrode(prefix: &str, ed: &ElectrodeDef) -> Result<(), ValidationError> {
    require_positive(&format!("{prefix}.thickness_m"), ed.thickness_m)?;
    require_positive(&format!("{prefix}.particle_radius_m"), ed.particle_radius_m)?;
    require_positive(&format!("{prefix}.li_max_kmol_m3"), ed.li_max_kmol_m3)?;
    require_fraction(&format!("{prefix}.solid_fraction"), ed.solid_fraction)?;
    require_fraction(&format!("{prefix}.x_initial"), ed.x_initial)?;
    require_positive(&format!("{prefix}.alpha_a"), ed.alpha_a)?;
    require_positive(&format!("{prefix}.alpha_c"), ed.alpha_c)?;
    if ed.radial_nodes < 3 {
        return Err(ValidationError::InvalidValue {
            field: format!("{prefix}.radial_nodes"),
            value: ed.radial_nodes.to_string(),
            reason: "radial mesh needs at least 3 nodes".to_string(),
        });
    }
    if let Some(h) = &ed.hysteresis {
        require_positive(&format!("{prefix}.hysteresis.gain"), h.gain)?;
        require_positive(&format!("{prefix}.hysteresis.max_v"), h.max_v)?;
    }
    Ok(())
}

pub fn validate_cell(def: &CellDef) -> Result<(), ValidationError> {
    require_positive("area_m2", def.area_m2)?;
    require_positive("capacity_ah", def.capacity_ah)?;
    require_positive("temperature_k", def.temperature_k)?;
    require_positive("electrolyte.li_ref_kmol_m3", def.electrolyte.li_ref_kmol_m3)?;
    validate_electrode("anode", &def.anode)?;
    validate_electrode("cathode", &def.cathode)?;
    Ok(())
}

pub fn validate_experiment(def: &ExperimentDef) -> Result<(), ValidationError> {
    // exhaustive mode/units table; anything else is rejected here, never
    // silently defaulted downstream
    match (def.mode.as_str(), def.units.as_deref()) {
        ("current", Some("A")) | ("current", Some("C")) => {}
        ("voltage", None) | ("power", None) => {}
        _ => {
            return Err(ValidationError::UnsupportedMode {
                mode: def.mode.clone(),
                units: def.units.clone(),
            });
        }
    }

    def.profile.validate()?;
    cf_cell::TimeGrid::new(def.t_min, def.t_max, def.nt)?;

    if let (Some(lo), Some(hi)) = (def.voltage_min, def.voltage_max) {
        if lo >= hi {
            return Err(ValidationError::InvalidValue {
                field: "voltage_min/voltage_max".to_string(),
                value: format!("{lo}/{hi}"),
                reason: "window is empty".to_string(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_definitions_validate() {
        validate_cell(&CellDef::default()).unwrap();
        validate_experiment(&ExperimentDef::default()).unwrap();
    }

    #[test]
    fn every_supported_mode_pair_passes() {
        let base = ExperimentDef::default();
        let cases = [
            ("current", Some("A")),
            ("current", Some("C")),
            ("voltage", None),
            ("power", None),
        ];
        for (mode, units) in cases {
            let def = ExperimentDef {
                mode: mode.to_string(),
                units: units.map(str::to_string),
                ..base.clone()
            };
            validate_experiment(&def).unwrap();
        }
    }

    #[test]
    fn unsupported_mode_pairs_are_rejected() {
        let base = ExperimentDef::default();
        let cases = [
            ("voltage", Some("C")),
            ("voltage", Some("A")),
            ("power", Some("C")),
            ("current", None),
            ("current", Some("W")),
            ("resistance", None),
        ];
        for (mode, units) in cases {
            let def = ExperimentDef {
                mode: mode.to_string(),
                units: units.map(str::to_string),
                ..base.clone()
            };
            let err = validate_experiment(&def).unwrap_err();
            assert!(
                matches!(err, ValidationError::UnsupportedMode { .. }),
                "{mode}/{units:?} should be an unsupported pair"
            );
        }
    }

    #[test]
    fn bad_geometry_is_rejected() {
        let mut def = CellDef::default();
        def.anode.thickness_m = -1.0;
        assert!(validate_cell(&def).is_err());

        let mut def = CellDef::default();
        def.cathode.x_initial = 1.5;
        assert!(validate_cell(&def).is_err());

        let mut def = CellDef::default();
        def.anode.radial_nodes = 2;
        assert!(validate_cell(&def).is_err());
    }

    #[test]
    fn empty_voltage_window_is_rejected() {
        let def = ExperimentDef {
            voltage_min: Some(4.2),
            voltage_max: Some(3.0),
            ..ExperimentDef::default()
        };
        assert!(validate_experiment(&def).is_err());
    }
}
