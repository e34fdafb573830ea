//! NMC811 positive-electrode material.

use serde::{Deserialize, Serialize};

use crate::kinetics::{ElectrodeKinetics, arrhenius};

/// LiNi0.8Mn0.1Co0.1O2 cathode model with the Chen et al. (2020)
/// open-circuit fit.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Nmc811 {
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

impl Default for Nmc811 {
    fn default() -> Self {
        Self {
            i0_ref: 1.5,
            ea_i0: 1.75e4,
            ds_ref: 4.0e-15,
            ea_ds: 2.5e4,
            ce_ref: 1.0,
        }
    }
}

impl ElectrodeKinetics for Nmc811 {
    fn eq_potential(&self, x: f64, _temp: f64) -> f64 {
        -0.8090 * x + 4.4875
            - 0.0428 * (18.5138 * (x - 0.5542)).tanh()
            - 17.7326 * (15.7890 * (x - 0.3117)).tanh()
            + 17.5842 * (15.9308 * (x - 0.3120)).tanh()
    }

    fn exchange_current(&self, x: f64, ce: f64, temp: f64) -> f64 {
        self.i0_ref * arrhenius(self.ea_i0, temp) * (ce / self.ce_ref).sqrt() * (x * (1.0 - x)).sqrt()
    }

    fn diffusivity(&self, _x: f64, temp: f64) -> f64 {
        self.ds_ref * arrhenius(self.ea_ds, temp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kinetics::T_REF_K;
    use proptest::prelude::*;

    #[test]
    fn ocv_monotone_trend() {
        // lithiating the cathode lowers cell-side potential
        let m = Nmc811::default();
        assert!(m.eq_potential(0.3, T_REF_K) > m.eq_potential(0.6, T_REF_K));
        assert!(m.eq_potential(0.6, T_REF_K) > m.eq_potential(0.9, T_REF_K));
    }

    #[test]
    fn ocv_level_at_moderate_lithiation() {
        let m = Nmc811::default();
        let u = m.eq_potential(0.41, T_REF_K);
        assert!(u > 3.9 && u < 4.2, "U = {u}");
    }

    proptest! {
        #[test]
        fn properties_finite_in_window(x in 0.05f64..0.97) {
            let m = Nmc811::default();
            let u = m.eq_potential(x, T_REF_K);
            let i0 = m.exchange_current(x, 1.0, T_REF_K);
            let ds = m.diffusivity(x, T_REF_K);
            prop_assert!(u.is_finite() && u > 2.5 && u < 5.0);
            prop_assert!(i0.is_finite() && i0 > 0.0);
            prop_assert!(ds.is_finite() && ds > 0.0);
        }
    }
}
