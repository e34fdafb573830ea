//! Built-in default cell: a graphite / NMC811 pairing with typical
//! commercial-cell geometry. This is the template the CLI and the test
//! suite run when no configuration file is supplied.

use cf_materials::{Graphite, MaterialModel, Nmc811};

use crate::domain::{CellParams, Electrode, Electrolyte};

pub const DEFAULT_AREA_M2: f64 = 0.1;
pub const DEFAULT_CAP_AH: f64 = 2.5;
pub const DEFAULT_TEMP_K: f64 = 300.0;
pub const DEFAULT_LI_REF_KMOL_M3: f64 = 1.0;

pub const DEFAULT_ANODE_THICK_M: f64 = 75e-6;
pub const DEFAULT_ANODE_RADIUS_M: f64 = 10e-6;
pub const DEFAULT_ANODE_EPS_S: f64 = 0.6;
pub const DEFAULT_ANODE_LI_MAX: f64 = 30.5;
pub const DEFAULT_ANODE_X0: f64 = 0.79;
pub const DEFAULT_ANODE_NR: usize = 25;

pub const DEFAULT_CATHODE_THICK_M: f64 = 70e-6;
pub const DEFAULT_CATHODE_RADIUS_M: f64 = 6e-6;
pub const DEFAULT_CATHODE_EPS_S: f64 = 0.5;
pub const DEFAULT_CATHODE_LI_MAX: f64 = 51.5;
pub const DEFAULT_CATHODE_X0: f64 = 0.41;
pub const DEFAULT_CATHODE_NR: usize = 25;

/// All domains of one cell, ready to hand to a simulation.
#[derive(Clone, Debug)]
pub struct CellAssembly {
    pub bat: CellParams,
    pub el: Electrolyte,
    pub an: Electrode,
    pub ca: Electrode,
}

pub fn default_cell() -> CellAssembly {
    let bat = CellParams {
        area: DEFAULT_AREA_M2,
        cap: DEFAULT_CAP_AH,
        temp: DEFAULT_TEMP_K,
    };
    let el = Electrolyte {
        li_ref: DEFAULT_LI_REF_KMOL_M3,
    };
    let an = Electrode::new(
        DEFAULT_ANODE_THICK_M,
        DEFAULT_ANODE_RADIUS_M,
        DEFAULT_ANODE_EPS_S,
        DEFAULT_ANODE_LI_MAX,
        0.5,
        0.5,
        DEFAULT_ANODE_X0,
        DEFAULT_ANODE_NR,
        MaterialModel::Graphite(Graphite::default()),
    )
    .expect("default anode parameters are valid");
    let ca = Electrode::new(
        DEFAULT_CATHODE_THICK_M,
        DEFAULT_CATHODE_RADIUS_M,
        DEFAULT_CATHODE_EPS_S,
        DEFAULT_CATHODE_LI_MAX,
        0.5,
        0.5,
        DEFAULT_CATHODE_X0,
        DEFAULT_CATHODE_NR,
        MaterialModel::Nmc811(Nmc811::default()),
    )
    .expect("default cathode parameters are valid");

    CellAssembly { bat, el, an, ca }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_cell_builds() {
        let cell = default_cell();
        assert_eq!(cell.an.mesh.nr(), DEFAULT_ANODE_NR);
        assert_eq!(cell.ca.mesh.nr(), DEFAULT_CATHODE_NR);
        assert!(cell.bat.cap > 0.0);
    }

    #[test]
    fn default_cell_capacity_is_within_electrode_limits() {
        // the rated capacity must be deliverable by both electrodes
        use cf_core::units::constants::FARADAY_C_PER_KMOL;
        let cell = default_cell();
        for ed in [&cell.an, &cell.ca] {
            let areal_cap_ah_m2 =
                ed.li_max * ed.eps_s * ed.thick * FARADAY_C_PER_KMOL / 3600.0;
            assert!(areal_cap_ah_m2 * cell.bat.area > cell.bat.cap);
        }
    }
}
