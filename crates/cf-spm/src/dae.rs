//! DAE residuals for the single-particle model.
//!
//! The residual form is `res = M*y' - f(t, y)`: conservation of mass in
//! each electrode particle is differential, the three potentials are
//! algebraic, and the operating mode overrides two algebraic rows (the
//! cathode charge-conservation row and the electrolyte-potential row)
//! with the externally imposed boundary condition.
//!
//! Every evaluation also computes an advisory [`Events`] snapshot of
//! the instantaneous operating point; requesting
//! [`OutputMode::Diagnostics`] additionally returns reaction rates and
//! radial flux profiles without changing anything about `res`.

use cf_cell::{Electrode, ElectrodeLayout, Events, Experiment, HysteresisParams, Mode};
use cf_core::units::constants::{FARADAY_C_PER_KMOL, GAS_CONST_J_PER_KMOL_K};
use cf_materials::ElectrodeKinetics;
use nalgebra::DVector;

use crate::sim::Simulation;

/// Output selector for one residual evaluation.
///
/// The original engine toggled a process-wide flag around diagnostic
/// calls; here the choice is an explicit argument so no call can leak
/// side-channel state into the next one.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputMode {
    /// Residuals only
    #[default]
    Residual,
    /// Residuals plus intermediate physical quantities
    Diagnostics,
}

/// Intermediate quantities for verification and post-processing.
#[derive(Clone, Debug)]
pub struct Diagnostics {
    /// Anode Li+ production rate [kmol/m^2/s]
    pub sdot_an: f64,
    /// Cathode Li+ production rate [kmol/m^2/s]
    pub sdot_ca: f64,
    /// Anode radial face fluxes, center face first [kmol/m^2/s]
    pub flux_an: Vec<f64>,
    /// Cathode radial face fluxes, center face first [kmol/m^2/s]
    pub flux_ca: Vec<f64>,
}

/// Result of one assembly call. `res` itself is written in place into
/// the caller's buffer; this carries only the advisory outputs.
#[derive(Clone, Debug)]
pub struct Assembled {
    pub events: Events,
    pub diag: Option<Diagnostics>,
}

/// Reaction rate and mass-conservation residuals for one electrode.
///
/// Writes the per-node conservation rows and returns the surface
/// reaction rate together with the face-flux vector. The flux at the
/// particle center is identically zero; the flux at the surface equals
/// the negative production rate. Interior face diffusivities are
/// length-weighted averages of the neighboring nodes, with weights from
/// the control-volume face positions.
fn electrode_terms(
    ed: &Electrode,
    lay: &ElectrodeLayout,
    phi_el: f64,
    temp: f64,
    ce: f64,
    sv: &DVector<f64>,
    svdot: &DVector<f64>,
    res: &mut DVector<f64>,
) -> (f64, Vec<f64>) {
    let nr = ed.mesh.nr();
    let r = ed.mesh.r();
    let rm = ed.mesh.rm();
    let rp = ed.mesh.rp();
    let li0 = lay.li.start;

    let phi_ed = sv[lay.phi_ed];
    let x_surf = sv[li0 + nr - 1];

    // Reaction current at the particle surface. The hysteresis state,
    // when present, shifts the equilibrium potential.
    let mut eeq = ed.material.eq_potential(x_surf, temp);
    if let Some(h) = lay.hyst {
        eeq += sv[h];
    }
    let eta = phi_ed - phi_el - eeq;

    let i0 = ed.material.exchange_current(x_surf, ce, temp);
    let f_rt = FARADAY_C_PER_KMOL / (GAS_CONST_J_PER_KMOL_K * temp);
    let sdot = i0 / FARADAY_C_PER_KMOL
        * ((ed.alpha_a * f_rt * eta).exp() - (-ed.alpha_c * f_rt * eta).exp());

    // Face fluxes: forced zero at the center, reaction-set at the surface.
    let mut flux = vec![0.0; nr + 1];
    for k in 0..nr - 1 {
        let dr = r[k + 1] - r[k];
        let wt_m = 0.5 * (rp[k] - rm[k]) / dr;
        let wt_p = 0.5 * (rp[k + 1] - rm[k + 1]) / dr;
        let ds = wt_m * ed.material.diffusivity(sv[li0 + k], temp)
            + wt_p * ed.material.diffusivity(sv[li0 + k + 1], temp);
        let grad = ed.li_max * (sv[li0 + k + 1] - sv[li0 + k]) / dr;
        flux[k + 1] = ds * grad;
    }
    flux[nr] = -sdot;

    // Solid-phase conservation of mass per radial control volume
    // (differential rows).
    for k in 0..nr {
        let vol = (rp[k].powi(3) - rm[k].powi(3)) / 3.0;
        let div = (rp[k] * rp[k] * flux[k + 1] - rm[k] * rm[k] * flux[k]) / vol;
        res[li0 + k] = ed.li_max * svdot[li0 + k] - div;
    }

    (sdot, flux)
}

/// One-state hysteresis relaxation row (differential).
fn hysteresis_row(
    params: &HysteresisParams,
    h: usize,
    current_c: f64,
    sv: &DVector<f64>,
    svdot: &DVector<f64>,
    res: &mut DVector<f64>,
) {
    let rate = params.g * current_c.abs() / 3600.0;
    res[h] = svdot[h] + rate * (sv[h] + current_c.signum() * params.m);
}

/// The DAE residuals `res = M*y' - f(t, y)` for the SPM.
///
/// `sv`, `svdot`, and `res` must all have the layout's length; `res` is
/// fully overwritten. No errors are raised here: out-of-range states
/// produce non-finite residual entries that propagate to the solver
/// unmasked.
pub fn residuals(
    t: f64,
    sv: &DVector<f64>,
    svdot: &DVector<f64>,
    res: &mut DVector<f64>,
    sim: &Simulation,
    exp: &Experiment,
    output: OutputMode,
) -> Assembled {
    let bat = &sim.bat;
    let lay = &sim.layout;
    let temp = bat.temp;

    let phi_an = sv[lay.anode.phi_ed];
    let phi_el = sv[lay.phi_el];
    let phi_ca = sv[lay.cathode.phi_ed];

    // Anode ----------------------------------------------------------------
    let (sdot_an, flux_an) = electrode_terms(
        &sim.an,
        &lay.anode,
        phi_el,
        temp,
        sim.el.li_ref,
        sv,
        svdot,
        res,
    );

    // Solid-phase charge conservation (algebraic): the anode is the
    // ground reference.
    res[lay.anode.phi_ed] = phi_an - 0.0;

    // Cathode --------------------------------------------------------------
    let (sdot_ca, flux_ca) = electrode_terms(
        &sim.ca,
        &lay.cathode,
        phi_el,
        temp,
        sim.el.li_ref,
        sv,
        svdot,
        res,
    );

    // External current [A/m^2], derived from the anode reaction rate
    // regardless of which boundary-condition branch is active.
    let i_ext = -sdot_an * sim.an.a_s() * sim.an.thick * FARADAY_C_PER_KMOL;

    let voltage_v = phi_ca;
    let current_a = i_ext * bat.area;
    let power_w = current_a * voltage_v;
    let current_c = current_a / bat.cap;

    // Hysteresis states (differential), present only when enabled.
    if let (Some(h), Some(params)) = (lay.anode.hyst, sim.an.hysteresis.as_ref()) {
        hysteresis_row(params, h, current_c, sv, svdot, res);
    }
    if let (Some(h), Some(params)) = (lay.cathode.hyst, sim.ca.hysteresis.as_ref()) {
        hysteresis_row(params, h, current_c, sv, svdot, res);
    }

    // Boundary conditions --------------------------------------------------
    // Row A: cathode solid-phase charge conservation (algebraic).
    // Row B: electrolyte potential (algebraic). Voltage and power modes
    // share the net-charge-balance form of row B because both leave the
    // total current as the implicitly solved degree of freedom.
    let value = exp.value(t);
    match exp.mode {
        Mode::CurrentAmps => {
            res[lay.cathode.phi_ed] = sdot_ca * sim.ca.a_s() * sim.ca.thick * FARADAY_C_PER_KMOL
                - value / bat.area;
            res[lay.phi_el] = sdot_an * sim.an.a_s() * sim.an.thick * FARADAY_C_PER_KMOL
                + value / bat.area;
        }
        Mode::CurrentCRate => {
            res[lay.cathode.phi_ed] = sdot_ca * sim.ca.a_s() * sim.ca.thick * FARADAY_C_PER_KMOL
                - value * bat.cap / bat.area;
            res[lay.phi_el] = sdot_an * sim.an.a_s() * sim.an.thick * FARADAY_C_PER_KMOL
                + value * bat.cap / bat.area;
        }
        Mode::Voltage => {
            res[lay.cathode.phi_ed] = voltage_v - value;
            res[lay.phi_el] =
                sdot_an * sim.an.a_s() * sim.an.thick + sdot_ca * sim.ca.a_s() * sim.ca.thick;
        }
        Mode::Power => {
            res[lay.cathode.phi_ed] = power_w - value;
            res[lay.phi_el] =
                sdot_an * sim.an.a_s() * sim.an.thick + sdot_ca * sim.ca.a_s() * sim.ca.thick;
        }
    }

    // Events tracking ------------------------------------------------------
    let total_time = sim.t0() + t;
    let events = Events {
        time_s: total_time,
        time_min: total_time / 60.0,
        time_h: total_time / 3600.0,
        current_a,
        current_c,
        current_density: i_ext,
        voltage_v,
        power_w,
    };

    let diag = match output {
        OutputMode::Residual => None,
        OutputMode::Diagnostics => Some(Diagnostics {
            sdot_an,
            sdot_ca,
            flux_an,
            flux_ca,
        }),
    };

    Assembled { events, diag }
}
