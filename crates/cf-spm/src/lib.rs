//! cf-spm: single-particle-model residual engine.
//!
//! The heart of cellflow: the mapping from the solver's flat state
//! vector to named electrochemical quantities, the per-domain residual
//! physics (particle diffusion, Butler-Volmer kinetics, charge
//! conservation), the switchable boundary-condition rows for current,
//! voltage, and power control, and the numeric bandwidth/Jacobian
//! pattern discovery used to configure banded linear algebra in the
//! integrator.
//!
//! [`Simulation`] assembles the domains and drives experiments through
//! `cf-solver`; [`Solution`] snapshots the results together with an
//! independent copy of the simulation that produced them.

pub mod bandwidth;
pub mod dae;
pub mod error;
pub mod sim;
pub mod solution;

pub use bandwidth::{Bandwidth, bandwidth};
pub use dae::{Assembled, Diagnostics, OutputMode, residuals};
pub use error::{SpmError, SpmResult};
pub use sim::{RunOptions, Simulation};
pub use solution::{PostVars, Solution};
