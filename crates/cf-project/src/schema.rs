//! Configuration schema definitions.

use cf_cell::Profile;
use cf_cell::presets;
use cf_materials::{Graphite, MaterialModel, Nmc811};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CellDef {
    pub name: String,
    pub area_m2: f64,
    pub capacity_ah: f64,
    pub temperature_k: f64,
    pub electrolyte: ElectrolyteDef,
    pub anode: ElectrodeDef,
    pub cathode: ElectrodeDef,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ElectrolyteDef {
    pub li_ref_kmol_m3: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ElectrodeDef {
    pub material: MaterialModel,
    pub thickness_m: f64,
    pub particle_radius_m: f64,
    pub solid_fraction: f64,
    pub li_max_kmol_m3: f64,
    #[serde(default = "default_alpha")]
    pub alpha_a: f64,
    #[serde(default = "default_alpha")]
    pub alpha_c: f64,
    pub x_initial: f64,
    pub radial_nodes: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hysteresis: Option<HysteresisDef>,
}

fn default_alpha() -> f64 {
    0.5
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HysteresisDef {
    /// Relaxation gain per unit charge throughput
    pub gain: f64,
    /// Maximum hysteresis polarization [V]
    pub max_v: f64,
    /// Initial hysteresis state [V]
    pub initial_v: f64,
}

/// Experiment description as written in configuration files. The
/// `mode`/`units` strings are free-form here and checked by
/// [`crate::validate_experiment`]; only the four supported pairings
/// survive into a built `Experiment`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExperimentDef {
    /// "current", "voltage", or "power"
    pub mode: String,
    /// "A" or "C"; required for current mode, forbidden otherwise
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub units: Option<String>,
    pub profile: Profile,
    pub t_min: f64,
    pub t_max: f64,
    pub nt: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voltage_min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voltage_max: Option<f64>,
}

impl Default for CellDef {
    /// The built-in graphite / NMC811 template, matching
    /// [`cf_cell::presets`].
    fn default() -> Self {
        Self {
            name: "default_spm".to_string(),
            area_m2: presets::DEFAULT_AREA_M2,
            capacity_ah: presets::DEFAULT_CAP_AH,
            temperature_k: presets::DEFAULT_TEMP_K,
            electrolyte: ElectrolyteDef {
                li_ref_kmol_m3: presets::DEFAULT_LI_REF_KMOL_M3,
            },
            anode: ElectrodeDef {
                material: MaterialModel::Graphite(Graphite::default()),
                thickness_m: presets::DEFAULT_ANODE_THICK_M,
                particle_radius_m: presets::DEFAULT_ANODE_RADIUS_M,
                solid_fraction: presets::DEFAULT_ANODE_EPS_S,
                li_max_kmol_m3: presets::DEFAULT_ANODE_LI_MAX,
                alpha_a: 0.5,
                alpha_c: 0.5,
                x_initial: presets::DEFAULT_ANODE_X0,
                radial_nodes: presets::DEFAULT_ANODE_NR,
                hysteresis: None,
            },
            cathode: ElectrodeDef {
                material: MaterialModel::Nmc811(Nmc811::default()),
                thickness_m: presets::DEFAULT_CATHODE_THICK_M,
                particle_radius_m: presets::DEFAULT_CATHODE_RADIUS_M,
                solid_fraction: presets::DEFAULT_CATHODE_EPS_S,
                li_max_kmol_m3: presets::DEFAULT_CATHODE_LI_MAX,
                alpha_a: 0.5,
                alpha_c: 0.5,
                x_initial: presets::DEFAULT_CATHODE_X0,
                radial_nodes: presets::DEFAULT_CATHODE_NR,
                hysteresis: None,
            },
        }
    }
}

impl Default for ExperimentDef {
    /// Half-C constant-current discharge over 1350 s.
    fn default() -> Self {
        Self {
            mode: "current".to_string(),
            units: Some("C".to_string()),
            profile: Profile::Constant { value: -0.5 },
            t_min: 0.0,
            t_max: 1350.0,
            nt: 46,
            voltage_min: None,
            voltage_max: None,
        }
    }
}
