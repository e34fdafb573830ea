//! Newton corrector for one implicit BDF step.
//!
//! The BDF discretization ties the derivative to the state through
//! `y' = cj*y + bias`, so the corrector iterates on `y` alone and drags
//! `y'` along with each update. The iteration matrix is factored once
//! per step attempt (and reused across steps while it stays fresh); a
//! non-finite residual or a singular solve is reported as a recoverable
//! convergence failure so the step driver can retry smaller.

use nalgebra::{DVector, Dyn, linalg::LU};

use crate::bdf::SolverStats;
use crate::problem::DaeProblem;

/// Newton corrector configuration.
#[derive(Clone, Copy, Debug)]
pub struct NewtonConfig {
    /// Maximum iterations per step attempt
    pub max_iterations: usize,
    /// Convergence bound on the weighted RMS norm of the update
    pub tol: f64,
}

impl Default for NewtonConfig {
    fn default() -> Self {
        Self {
            max_iterations: 10,
            tol: 0.33,
        }
    }
}

/// Outcome of one corrector run.
#[derive(Clone, Copy, Debug)]
pub struct NewtonOutcome {
    pub converged: bool,
    pub iterations: usize,
}

/// Error weights `1 / (rtol*|y_i| + atol)`.
pub fn error_weights(y: &DVector<f64>, rtol: f64, atol: f64) -> DVector<f64> {
    y.map(|v| 1.0 / (rtol * v.abs() + atol))
}

/// Weighted root-mean-square norm.
pub fn wrms_norm(v: &DVector<f64>, ewt: &DVector<f64>) -> f64 {
    let n = v.len();
    let sum: f64 = v
        .iter()
        .zip(ewt.iter())
        .map(|(vi, wi)| (vi * wi) * (vi * wi))
        .sum();
    (sum / n as f64).sqrt()
}

/// Correct a predicted `(y, y')` pair toward `F(t, y, y') = 0`.
///
/// On entry `y'` must satisfy the step's BDF relation `y' = cj*y + bias`;
/// each update preserves it. Returns a non-converged outcome (never an
/// error) on stagnation, singular solves, or non-finite residuals.
#[allow(clippy::too_many_arguments)]
pub fn correct_step<P: DaeProblem>(
    problem: &P,
    t: f64,
    cj: f64,
    lu: &LU<f64, Dyn, Dyn>,
    y: &mut DVector<f64>,
    yp: &mut DVector<f64>,
    res: &mut DVector<f64>,
    ewt: &DVector<f64>,
    config: &NewtonConfig,
    stats: &mut SolverStats,
) -> NewtonOutcome {
    for iter in 0..config.max_iterations {
        problem.residual(t, y, yp, res);
        stats.residual_evals += 1;

        if res.iter().any(|v| !v.is_finite()) {
            tracing::trace!(t, iter, "non-finite residual in corrector");
            return NewtonOutcome {
                converged: false,
                iterations: iter,
            };
        }

        let rhs = -(&*res);
        let Some(delta) = lu.solve(&rhs) else {
            tracing::trace!(t, iter, "singular iteration matrix");
            return NewtonOutcome {
                converged: false,
                iterations: iter,
            };
        };

        *y += &delta;
        *yp += cj * &delta;
        stats.newton_iters += 1;

        if wrms_norm(&delta, ewt) <= config.tol {
            return NewtonOutcome {
                converged: true,
                iterations: iter + 1,
            };
        }
    }

    NewtonOutcome {
        converged: false,
        iterations: config.max_iterations,
    }
}
