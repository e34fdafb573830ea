//! Integration tests: voltage control, power control, stop conditions.

use cf_cell::{Experiment, StopCondition, TimeGrid};
use cf_spm::{RunOptions, Simulation};

#[test]
fn cv_hold_tracks_commanded_voltage() {
    let sim = Simulation::default();
    let grid = TimeGrid::new(0.0, 900.0, 31).unwrap();

    let mut sol = sim.run_cv(3.9, grid).unwrap();
    assert!(sol.success, "solver failed: {}", sol.message);
    assert!(sol.verify(), "voltage tracking drifted past 0.5%");

    // every saved voltage equals the command within tolerance
    for v in sol.voltage() {
        assert!((v - 3.9).abs() <= 0.005 * 3.9, "voltage {v}");
    }

    // holding below the open-circuit voltage discharges the cell, and
    // the current relaxes as the surface concentrations adjust
    let post = sol.post();
    let i0 = post.i_ext[1];
    let i_end = *post.i_ext.last().unwrap();
    assert!(i0 < 0.0, "expected discharge current, got {i0}");
    assert!(i_end.abs() < i0.abs());
}

#[test]
fn cp_hold_tracks_commanded_power() {
    let sim = Simulation::default();
    let grid = TimeGrid::new(0.0, 900.0, 31).unwrap();

    // ~0.5C discharge power for the default cell
    let mut sol = sim.run_cp(-5.0, grid).unwrap();
    assert!(sol.success, "solver failed: {}", sol.message);
    assert!(sol.verify(), "power tracking drifted past 0.5%");

    let post = sol.post();
    for ev in &post.events {
        assert!((ev.power_w + 5.0).abs() <= 0.005 * 5.0, "power {}", ev.power_w);
        // power = current * voltage at every point by construction
        assert!((ev.power_w - ev.current_a * ev.voltage_v).abs() < 1e-9);
    }
}

#[test]
fn voltage_floor_stops_the_run_early() {
    let sim = Simulation::default();
    let grid = TimeGrid::new(0.0, 1350.0, 46).unwrap();
    let exp = Experiment::constant_current(-0.5, grid)
        .unwrap()
        .with_limits(vec![StopCondition::VoltageBelow(3.99)]);

    let sol = sim.run(&exp, &RunOptions::default()).unwrap();
    assert!(sol.success, "early stop still counts as success");
    let reason = sol.stopped.as_ref().expect("stop condition must fire");
    assert!(reason.contains("fell below"));
    assert!(*sol.t.last().unwrap() < 1350.0);
}

#[test]
fn rest_experiment_holds_equilibrium() {
    let sim = Simulation::default();
    let grid = TimeGrid::new(0.0, 600.0, 11).unwrap();

    let mut sol = sim.run_cc(0.0, grid).unwrap();
    assert!(sol.success, "solver failed: {}", sol.message);

    // nothing moves at rest
    let first = &sol.y[0];
    let last = sol.y.last().unwrap().clone();
    for i in 0..first.len() {
        assert!((first[i] - last[i]).abs() < 1e-6, "component {i} drifted");
    }
    let post = sol.post();
    for i in post.i_ext.iter() {
        assert!(i.abs() < 1e-9);
    }
}
