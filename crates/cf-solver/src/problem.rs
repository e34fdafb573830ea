//! Problem definition for implicit DAE integration.

use nalgebra::DVector;

/// A differential-algebraic system `F(t, y, y') = 0`.
///
/// The integrator owns the state/derivative/residual buffers and calls
/// [`DaeProblem::residual`] many times per step; implementations must
/// fully populate `res` on every call and must not resize any buffer.
/// A non-finite residual entry is the designated failure signal: the
/// integrator treats it as a failed evaluation and retries the step
/// with a reduced size, so implementations never mask such values.
pub trait DaeProblem {
    /// State-vector length N.
    fn size(&self) -> usize;

    /// Fill `res` with `F(t, y, y')`.
    fn residual(&self, t: f64, y: &DVector<f64>, yp: &DVector<f64>, res: &mut DVector<f64>);

    /// Per-component flag, `true` where the component is algebraic
    /// (its derivative does not appear in `F`). Used to exclude
    /// algebraic components from the local error test and to pick the
    /// unknowns of the consistent-initialization solve.
    fn algebraic(&self) -> &[bool];

    /// Early-termination check, consulted after every accepted step.
    /// Returning `Some(reason)` stops the integration cleanly.
    fn terminate(&self, _t: f64, _y: &DVector<f64>) -> Option<String> {
        None
    }
}
