//! Consistent initial conditions.
//!
//! Given a state whose differential components are trusted, solve for
//! the algebraic components of `y` and the differential components of
//! `y'` so that `F(t0, y, y') = 0` before stepping begins. This is the
//! usual index-1 initialization: one Newton solve whose unknown vector
//! mixes `y[j]` (algebraic rows) and `y'[j]` (differential rows).

use nalgebra::{DMatrix, DVector};

use crate::bdf::SolveOptions;
use crate::error::{SolverError, SolverResult};
use crate::newton::{error_weights, wrms_norm};
use crate::problem::DaeProblem;

const MAX_IC_ITERATIONS: usize = 20;

/// Solve for consistent `(y0, y0')` at `t0`.
pub fn consistent_ic<P: DaeProblem>(
    problem: &P,
    t0: f64,
    y0: &DVector<f64>,
    yp0: &DVector<f64>,
    opts: &SolveOptions,
) -> SolverResult<(DVector<f64>, DVector<f64>)> {
    let n = problem.size();
    if y0.len() != n || yp0.len() != n {
        return Err(SolverError::Setup {
            what: format!("state length {} does not match problem size {}", y0.len(), n),
        });
    }
    let algebraic = problem.algebraic();

    let mut y = y0.clone();
    let mut yp = yp0.clone();
    let mut res = DVector::zeros(n);
    let mut res_p = DVector::zeros(n);

    for iter in 0..MAX_IC_ITERATIONS {
        problem.residual(t0, &y, &yp, &mut res);
        if res.iter().any(|v| !v.is_finite()) {
            return Err(SolverError::Numeric {
                what: format!("non-finite residual during initialization at t = {t0}"),
            });
        }

        // Jacobian of the mixed unknown: column j perturbs y[j] on
        // algebraic rows, y'[j] on differential rows.
        let mut jac = DMatrix::zeros(n, n);
        for j in 0..n {
            let base = if algebraic[j] { y[j] } else { yp[j] };
            let d = opts.fd_epsilon * base.abs().max(1.0);
            if algebraic[j] {
                y[j] = base + d;
            } else {
                yp[j] = base + d;
            }
            problem.residual(t0, &y, &yp, &mut res_p);
            for i in 0..n {
                jac[(i, j)] = (res_p[i] - res[i]) / d;
            }
            if algebraic[j] {
                y[j] = base;
            } else {
                yp[j] = base;
            }
        }

        let rhs = -(&res);
        let dz = jac.lu().solve(&rhs).ok_or_else(|| SolverError::Numeric {
            what: "singular initialization Jacobian".into(),
        })?;

        for j in 0..n {
            if algebraic[j] {
                y[j] += dz[j];
            } else {
                yp[j] += dz[j];
            }
        }

        let ewt = error_weights(&y, opts.rtol, opts.atol);
        if wrms_norm(&dz, &ewt) <= 1e-2 {
            tracing::debug!(iterations = iter + 1, "consistent initialization converged");
            return Ok((y, yp));
        }
    }

    Err(SolverError::ConvergenceFailed {
        what: format!("initialization did not converge within {MAX_IC_ITERATIONS} iterations"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// y0' = -y0, 0 = y1 - y0.
    struct Tracked {
        algebraic: Vec<bool>,
    }

    impl DaeProblem for Tracked {
        fn size(&self) -> usize {
            2
        }
        fn residual(&self, _t: f64, y: &DVector<f64>, yp: &DVector<f64>, res: &mut DVector<f64>) {
            res[0] = yp[0] + y[0];
            res[1] = y[1] - y[0];
        }
        fn algebraic(&self) -> &[bool] {
            &self.algebraic
        }
    }

    #[test]
    fn repairs_inconsistent_start() {
        let p = Tracked {
            algebraic: vec![false, true],
        };
        // differential value trusted; algebraic value and derivative wrong
        let y0 = DVector::from_vec(vec![1.0, 0.3]);
        let yp0 = DVector::from_vec(vec![0.0, 0.0]);

        let (y, yp) = consistent_ic(&p, 0.0, &y0, &yp0, &SolveOptions::default()).unwrap();

        assert!((y[0] - 1.0).abs() < 1e-12, "differential value untouched");
        assert!((y[1] - 1.0).abs() < 1e-8, "algebraic value repaired");
        assert!((yp[0] + 1.0).abs() < 1e-8, "derivative repaired");
    }

    #[test]
    fn rejects_mismatched_lengths() {
        let p = Tracked {
            algebraic: vec![false, true],
        };
        let y0 = DVector::zeros(3);
        let yp0 = DVector::zeros(3);
        assert!(consistent_ic(&p, 0.0, &y0, &yp0, &SolveOptions::default()).is_err());
    }
}
