//! Numeric bandwidth and Jacobian-pattern discovery.
//!
//! Perturbs every state and state-derivative component in turn at the
//! seed state and records which residual rows respond. The resulting
//! pattern configures the integrator's banded grouped-column Jacobian
//! assembly; because the combined system is `M*y' - f(y)`, both partial
//! derivatives accumulate into the same sparsity structure.
//!
//! This is a one-time O(N^2) setup cost dominated by the 2N residual
//! evaluations. The columns are independent, so they are probed in
//! parallel; each worker owns its perturbed vectors and residual
//! buffer, and the simulation itself is shared read-only.

use cf_cell::{Experiment, Mode, Profile, TimeGrid};
use nalgebra::{DMatrix, DVector};
use rayon::prelude::*;

use crate::dae::{OutputMode, residuals};
use crate::sim::Simulation;

/// Bandwidths and boolean sparsity pattern of the residual Jacobian.
#[derive(Clone, Debug, PartialEq)]
pub struct Bandwidth {
    pub lower: usize,
    pub upper: usize,
    pub pattern: DMatrix<bool>,
}

impl Bandwidth {
    /// Number of structurally nonzero Jacobian entries.
    pub fn nnz(&self) -> usize {
        self.pattern.iter().filter(|&&p| p).count()
    }
}

/// Relative perturbation with an absolute floor, so a component at
/// exactly zero still receives a nonzero step.
fn perturbation(v: f64) -> f64 {
    (1e-6f64).max(1e-6 * v)
}

/// Determine the residual Jacobian's bandwidth and sparsity pattern at
/// the simulation's seed state, under a zero-demand (rest) experiment.
pub fn bandwidth(sim: &Simulation) -> Bandwidth {
    let n = sim.layout.len();

    // Rest experiment: current mode, C-rate units, zero demand.
    let exp = Experiment {
        mode: Mode::CurrentCRate,
        profile: Profile::Constant { value: 0.0 },
        time: TimeGrid {
            t_min: 0.0,
            t_max: 1.0,
            nt: 2,
        },
        limits: Vec::new(),
    };

    let sv = sim.sv0().clone();
    let svdot = sim.svdot0().clone();

    let mut res_0 = DVector::zeros(n);
    residuals(0.0, &sv, &svdot, &mut res_0, sim, &exp, OutputMode::Residual);

    let columns: Vec<DVector<f64>> = (0..n)
        .into_par_iter()
        .map(|j| {
            let mut res = DVector::zeros(n);
            let mut col = DVector::zeros(n);

            let mut dsv = sv.clone();
            dsv[j] = sv[j] + perturbation(sv[j]);
            residuals(0.0, &dsv, &svdot, &mut res, sim, &exp, OutputMode::Residual);
            col += &res_0 - &res;

            let mut dsvdot = svdot.clone();
            dsvdot[j] = svdot[j] + perturbation(svdot[j]);
            residuals(0.0, &sv, &dsvdot, &mut res, sim, &exp, OutputMode::Residual);
            col += &res_0 - &res;

            col
        })
        .collect();

    let mut jac = DMatrix::zeros(n, n);
    for (j, col) in columns.iter().enumerate() {
        jac.set_column(j, col);
    }

    // Row-wise distances to the furthest nonzero entry on each side of
    // the diagonal.
    let mut lower = 0usize;
    let mut upper = 0usize;
    for i in 0..n {
        for j in 0..i {
            if jac[(i, j)].abs() > 0.0 {
                lower = lower.max(i - j);
                break;
            }
        }
        for j in (i..n).rev() {
            if jac[(i, j)].abs() > 0.0 {
                upper = upper.max(j - i);
                break;
            }
        }
    }

    let pattern = jac.map(|v| v != 0.0);

    Bandwidth {
        lower,
        upper,
        pattern,
    }
}
