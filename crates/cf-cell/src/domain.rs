//! Physical domains: electrodes, electrolyte, and cell-level parameters.

use cf_materials::MaterialModel;

use crate::error::{CellError, CellResult};
use crate::mesh::RadialMesh;

/// Cell-level parameters shared by every domain.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CellParams {
    /// Electrode plate area [m^2]
    pub area: f64,
    /// Rated capacity [A*h]; the C-rate reference
    pub cap: f64,
    /// Simulation temperature [K]
    pub temp: f64,
}

impl CellParams {
    /// Unit-checked constructor for configuration code.
    pub fn new(
        area: cf_core::units::Area,
        cap: cf_core::units::Charge,
        temp: cf_core::units::Temperature,
    ) -> Self {
        Self {
            area: area.value,
            cap: cf_core::units::as_amp_hours(cap),
            temp: temp.value,
        }
    }
}

/// Electrolyte domain. The SPM carries no electrolyte transport, only
/// the reference Li+ concentration the kinetics models see.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Electrolyte {
    /// Reference Li+ concentration [kmol/m^3]
    pub li_ref: f64,
}

/// One-state hysteresis option for an electrode.
///
/// `h` relaxes toward `-sign(i) * max_v` at a rate proportional to the
/// C-rate throughput; the state adds to the equilibrium potential.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HysteresisParams {
    /// Dimensionless relaxation gain per unit charge throughput
    pub g: f64,
    /// Maximum hysteresis polarization [V]
    pub m: f64,
    /// Initial hysteresis state [V]
    pub h0: f64,
}

/// Electrode domain: geometry, capacity, kinetics, and the radial mesh
/// of its representative particle.
#[derive(Clone, Debug)]
pub struct Electrode {
    /// Coating thickness [m]
    pub thick: f64,
    /// Particle radius [m]
    pub radius: f64,
    /// Solid (active material) volume fraction
    pub eps_s: f64,
    /// Maximum intercalated Li concentration [kmol/m^3]
    pub li_max: f64,
    /// Anodic transfer coefficient
    pub alpha_a: f64,
    /// Cathodic transfer coefficient
    pub alpha_c: f64,
    /// Initial intercalation fraction
    pub x0: f64,
    /// Kinetics/transport property model
    pub material: MaterialModel,
    /// Optional hysteresis state
    pub hysteresis: Option<HysteresisParams>,
    /// Radial particle mesh
    pub mesh: RadialMesh,
}

impl Electrode {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        thick: f64,
        radius: f64,
        eps_s: f64,
        li_max: f64,
        alpha_a: f64,
        alpha_c: f64,
        x0: f64,
        nr: usize,
        material: MaterialModel,
    ) -> CellResult<Self> {
        if !(thick > 0.0) {
            return Err(CellError::Electrode {
                what: "thickness must be positive",
            });
        }
        if !(eps_s > 0.0 && eps_s < 1.0) {
            return Err(CellError::Electrode {
                what: "solid fraction must be in (0, 1)",
            });
        }
        if !(li_max > 0.0) {
            return Err(CellError::Electrode {
                what: "maximum Li concentration must be positive",
            });
        }
        if !(x0 > 0.0 && x0 < 1.0) {
            return Err(CellError::Electrode {
                what: "initial intercalation fraction must be in (0, 1)",
            });
        }
        let mesh = RadialMesh::new(radius, nr)?;
        Ok(Self {
            thick,
            radius,
            eps_s,
            li_max,
            alpha_a,
            alpha_c,
            x0,
            material,
            hysteresis: None,
            mesh,
        })
    }

    pub fn with_hysteresis(mut self, params: HysteresisParams) -> Self {
        self.hysteresis = Some(params);
        self
    }

    /// Reactive surface area per unit electrode volume [1/m].
    pub fn a_s(&self) -> f64 {
        3.0 * self.eps_s / self.radius
    }
}
