//! Kinetics/transport contract shared by all electrode materials.

use serde::{Deserialize, Serialize};

use crate::{Graphite, Nmc811};

/// Reference temperature for Arrhenius corrections [K].
pub const T_REF_K: f64 = 298.15;

/// Property functions every electrode material must provide.
///
/// Inputs are the local intercalation fraction `x` (stored Li over
/// maximum Li, dimensionless), the electrolyte Li concentration `ce`
/// [kmol/m^3] where relevant, and temperature [K]. Out-of-range
/// fractions are *not* clamped: a fraction outside [0, 1] produces a
/// non-finite exchange current, which the solver treats as a failed
/// step and retries smaller.
pub trait ElectrodeKinetics {
    /// Equilibrium (open-circuit) potential vs. Li/Li+ [V].
    fn eq_potential(&self, x: f64, temp: f64) -> f64;

    /// Exchange current density [A/m^2].
    fn exchange_current(&self, x: f64, ce: f64, temp: f64) -> f64;

    /// Solid-phase Li diffusivity [m^2/s].
    fn diffusivity(&self, x: f64, temp: f64) -> f64;
}

/// Arrhenius factor relative to [`T_REF_K`].
pub(crate) fn arrhenius(ea_j_mol: f64, temp: f64) -> f64 {
    use cf_core::units::constants::GAS_CONST_J_PER_MOL_K;
    (-ea_j_mol / GAS_CONST_J_PER_MOL_K * (1.0 / temp - 1.0 / T_REF_K)).exp()
}

/// Concrete material selection, kept as an enum so electrode parameter
/// structs remain plain cloneable/serializable data.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MaterialModel {
    Graphite(Graphite),
    Nmc811(Nmc811),
}

impl ElectrodeKinetics for MaterialModel {
    fn eq_potential(&self, x: f64, temp: f64) -> f64 {
        match self {
            MaterialModel::Graphite(m) => m.eq_potential(x, temp),
            MaterialModel::Nmc811(m) => m.eq_potential(x, temp),
        }
    }

    fn exchange_current(&self, x: f64, ce: f64, temp: f64) -> f64 {
        match self {
            MaterialModel::Graphite(m) => m.exchange_current(x, ce, temp),
            MaterialModel::Nmc811(m) => m.exchange_current(x, ce, temp),
        }
    }

    fn diffusivity(&self, x: f64, temp: f64) -> f64 {
        match self {
            MaterialModel::Graphite(m) => m.diffusivity(x, temp),
            MaterialModel::Nmc811(m) => m.diffusivity(x, temp),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arrhenius_is_one_at_reference() {
        assert!((arrhenius(3.0e4, T_REF_K) - 1.0).abs() < 1e-14);
    }

    #[test]
    fn arrhenius_speeds_up_with_temperature() {
        assert!(arrhenius(3.0e4, 320.0) > 1.0);
        assert!(arrhenius(3.0e4, 280.0) < 1.0);
    }

    #[test]
    fn out_of_range_fraction_is_not_masked() {
        let m = MaterialModel::Graphite(Graphite::default());
        assert!(m.exchange_current(-0.05, 1.0, T_REF_K).is_nan());
        assert!(m.exchange_current(1.05, 1.0, T_REF_K).is_nan());
    }
}
