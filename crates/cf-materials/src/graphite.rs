//! Graphite negative-electrode material.

use serde::{Deserialize, Serialize};

use crate::kinetics::{ElectrodeKinetics, arrhenius};

/// Graphite (LiC6) anode model.
///
/// The open-circuit fit is the usual staging-plateau sum-of-tanh form;
/// kinetic and transport prefactors are adjustable so cells with
/// different coatings can reuse the same potential curve.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Graphite {
    /// Exchange current density prefactor [A/m^2]
    pub i0_ref: f64,
    /// Reaction activation energy [J/mol]
    pub ea_i0: f64,
    /// Solid diffusivity at reference temperature [m^2/s]
    pub ds_ref: f64,
    /// Diffusion activation energy [J/mol]
    pub ea_ds: f64,
    /// Electrolyte reference concentration for i0 scaling [kmol/m^3]
    pub ce_ref: f64,
}

impl Default for Graphite {
    fn default() -> Self {
        Self {
            i0_ref: 2.0,
            ea_i0: 3.5e4,
            ds_ref: 3.3e-14,
            ea_ds: 3.03e4,
            ce_ref: 1.0,
        }
    }
}

impl ElectrodeKinetics for Graphite {
    fn eq_potential(&self, x: f64, _temp: f64) -> f64 {
        0.6379 + 0.5416 * (-305.5309 * x).exp()
            + 0.044 * (-(x - 0.1958) / 0.1088).tanh()
            - 0.1978 * ((x - 1.0571) / 0.0854).tanh()
            - 0.6875 * ((x + 0.0117) / 0.0529).tanh()
            - 0.0175 * ((x - 0.5692) / 0.0875).tanh()
    }

    fn exchange_current(&self, x: f64, ce: f64, temp: f64) -> f64 {
        self.i0_ref * arrhenius(self.ea_i0, temp) * (ce / self.ce_ref).sqrt() * (x * (1.0 - x)).sqrt()
    }

    fn diffusivity(&self, _x: f64, temp: f64) -> f64 {
        self.ds_ref * arrhenius(self.ea_ds, temp)
    }
}
