//! Simulation assembly and experiment drivers.

use cf_cell::{
    CellAssembly, CellParams, Electrode, Electrolyte, Experiment, LayoutBuilder, Mode, StateLayout,
    StopCondition, TimeGrid,
};
use cf_materials::ElectrodeKinetics;
use cf_solver::{
    DaeProblem, LinearStrategy, SolveOptions, consistent_ic, solve_dae,
};
use nalgebra::DVector;

use crate::bandwidth::{Bandwidth, bandwidth};
use crate::dae::{OutputMode, residuals};
use crate::error::SpmResult;
use crate::solution::Solution;

/// A fully assembled single-particle-model simulation.
///
/// Construction builds the immutable state layout and the seed state:
/// uniform intercalation profiles at each electrode's initial fraction,
/// potentials at their equilibrium values with the anode as ground, and
/// hysteresis states at their configured starting value. The struct is
/// plain data; solutions deep-copy it so historical results never alias
/// a live simulation.
#[derive(Clone, Debug)]
pub struct Simulation {
    pub bat: CellParams,
    pub el: Electrolyte,
    pub an: Electrode,
    pub ca: Electrode,
    pub layout: StateLayout,
    sv0: DVector<f64>,
    svdot0: DVector<f64>,
    t0: f64,
}

impl Simulation {
    pub fn new(cell: CellAssembly) -> SpmResult<Self> {
        let CellAssembly { bat, el, an, ca } = cell;

        let layout = LayoutBuilder::new()
            .anode(an.mesh.nr(), an.hysteresis.is_some())
            .cathode(ca.mesh.nr(), ca.hysteresis.is_some())
            .build()?;

        let mut sv0 = DVector::zeros(layout.len());
        for i in layout.anode.li.clone() {
            sv0[i] = an.x0;
        }
        for i in layout.cathode.li.clone() {
            sv0[i] = ca.x0;
        }

        let eeq_an = an.material.eq_potential(an.x0, bat.temp);
        let eeq_ca = ca.material.eq_potential(ca.x0, bat.temp);
        sv0[layout.anode.phi_ed] = 0.0;
        sv0[layout.phi_el] = -eeq_an;
        sv0[layout.cathode.phi_ed] = eeq_ca - eeq_an;

        if let (Some(h), Some(params)) = (layout.anode.hyst, an.hysteresis.as_ref()) {
            sv0[h] = params.h0;
        }
        if let (Some(h), Some(params)) = (layout.cathode.hyst, ca.hysteresis.as_ref()) {
            sv0[h] = params.h0;
        }

        let svdot0 = DVector::zeros(layout.len());

        Ok(Self {
            bat,
            el,
            an,
            ca,
            layout,
            sv0,
            svdot0,
            t0: 0.0,
        })
    }

    /// Offset reported event times, for runs that continue a previous
    /// experiment.
    pub fn with_start_time(mut self, t0: f64) -> Self {
        self.t0 = t0;
        self
    }

    /// Seed state vector.
    pub fn sv0(&self) -> &DVector<f64> {
        &self.sv0
    }

    /// Seed state derivative vector.
    pub fn svdot0(&self) -> &DVector<f64> {
        &self.svdot0
    }

    pub fn t0(&self) -> f64 {
        self.t0
    }

    /// Numeric Jacobian bandwidth and sparsity pattern of the residual
    /// system at the seed state.
    pub fn j_pattern(&self) -> Bandwidth {
        bandwidth(self)
    }

    /// Run an arbitrary experiment.
    pub fn run(&self, exp: &Experiment, opts: &RunOptions) -> SpmResult<Solution> {
        exp.profile.validate()?;
        exp.time.validate()?;

        let mut solver_opts = opts.solver.clone();
        // The analyzer probes under a rest current-mode experiment, so
        // its band bounds only hold for current-controlled runs; voltage
        // and power modes couple the boundary rows across the full state
        // and stay on dense assembly.
        let current_mode = matches!(exp.mode, Mode::CurrentAmps | Mode::CurrentCRate);
        if opts.banded && current_mode {
            let bw = bandwidth(self);
            tracing::info!(
                lower = bw.lower,
                upper = bw.upper,
                "using banded Jacobian assembly"
            );
            solver_opts.linear = LinearStrategy::Banded {
                lower: bw.lower,
                upper: bw.upper,
            };
        }

        let problem = SpmDae::new(self, exp);
        let started = std::time::Instant::now();

        let (y0, yp0) = consistent_ic(
            &problem,
            exp.time.t_min,
            &self.sv0,
            &self.svdot0,
            &solver_opts,
        )?;
        let t_out = exp.time.points();
        let dae = solve_dae(&problem, &y0, &yp0, &t_out, &solver_opts)?;

        let solvetime = started.elapsed().as_secs_f64();
        Ok(Solution::from_dae(self.clone(), exp.clone(), dae, solvetime))
    }

    /// Constant-current run at a C-rate (discharge negative by the sign
    /// convention of the boundary rows).
    pub fn run_cc(&self, c_rate: f64, time: TimeGrid) -> SpmResult<Solution> {
        let exp = Experiment::constant_current(c_rate, time)?;
        self.run(&exp, &RunOptions::default())
    }

    /// Constant-voltage run.
    pub fn run_cv(&self, volts: f64, time: TimeGrid) -> SpmResult<Solution> {
        let exp = Experiment::constant_voltage(volts, time)?;
        self.run(&exp, &RunOptions::default())
    }

    /// Constant-power run.
    pub fn run_cp(&self, watts: f64, time: TimeGrid) -> SpmResult<Solution> {
        let exp = Experiment::constant_power(watts, time)?;
        self.run(&exp, &RunOptions::default())
    }
}

impl Default for Simulation {
    fn default() -> Self {
        Self::new(cf_cell::default_cell()).expect("default cell template is valid")
    }
}

/// Options for [`Simulation::run`].
#[derive(Clone, Debug)]
pub struct RunOptions {
    pub solver: SolveOptions,
    /// Probe the Jacobian pattern once at setup and use grouped-column
    /// banded assembly during integration.
    pub banded: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            solver: SolveOptions::default(),
            banded: true,
        }
    }
}

/// Adapter binding one simulation and one experiment into the solver's
/// residual-callback contract. Advisory assembly outputs are discarded
/// on this path.
pub(crate) struct SpmDae<'a> {
    sim: &'a Simulation,
    exp: &'a Experiment,
    algebraic: Vec<bool>,
}

impl<'a> SpmDae<'a> {
    pub(crate) fn new(sim: &'a Simulation, exp: &'a Experiment) -> Self {
        let algebraic = sim.layout.algebraic();
        Self {
            sim,
            exp,
            algebraic,
        }
    }
}

impl DaeProblem for SpmDae<'_> {
    fn size(&self) -> usize {
        self.sim.layout.len()
    }

    fn residual(&self, t: f64, y: &DVector<f64>, yp: &DVector<f64>, res: &mut DVector<f64>) {
        residuals(t, y, yp, res, self.sim, self.exp, OutputMode::Residual);
    }

    fn algebraic(&self) -> &[bool] {
        &self.algebraic
    }

    fn terminate(&self, _t: f64, y: &DVector<f64>) -> Option<String> {
        let v = y[self.sim.layout.cathode.phi_ed];
        for limit in &self.exp.limits {
            match limit {
                StopCondition::VoltageBelow(vmin) if v < *vmin => {
                    return Some(format!("cell voltage {v:.4} V fell below {vmin} V"));
                }
                StopCondition::VoltageAbove(vmax) if v > *vmax => {
                    return Some(format!("cell voltage {v:.4} V rose above {vmax} V"));
                }
                _ => {}
            }
        }
        None
    }
}
