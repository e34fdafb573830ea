//! cf-materials: electrode material property models.
//!
//! Each electrode material supplies three pure functions of local state
//! and temperature: equilibrium (open-circuit) potential, exchange
//! current density, and solid-phase diffusivity. The residual assembler
//! consumes them through the [`ElectrodeKinetics`] trait; concrete
//! materials are selected through the [`MaterialModel`] enum so that
//! electrode descriptions stay plain `Clone + Serialize` data.

mod graphite;
mod kinetics;
mod nmc;

pub use graphite::Graphite;
pub use kinetics::{ElectrodeKinetics, MaterialModel, T_REF_K};
pub use nmc::Nmc811;
