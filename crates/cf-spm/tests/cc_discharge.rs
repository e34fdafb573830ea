//! Integration test: constant-current discharge of the default cell.
//!
//! Runs a 0.5C discharge over a fixed horizon and checks the
//! charge-conservation balance at every saved time point: the model's
//! external current and both electrodes' reaction-derived currents must
//! match the commanded current within 0.5%.

use cf_cell::TimeGrid;
use cf_core::units::constants::FARADAY_C_PER_KMOL;
use cf_spm::Simulation;

#[test]
fn cc_discharge_conserves_charge() {
    let sim = Simulation::default();
    let grid = TimeGrid::new(0.0, 1350.0, 46).unwrap();

    // discharge: negative C-rate by the boundary-row sign convention
    let mut sol = sim.run_cc(-0.5, grid).unwrap();

    assert!(sol.success, "solver failed: {}", sol.message);
    assert!(sol.stopped.is_none());
    assert_eq!(sol.t.len(), 46);

    assert!(sol.verify(), "charge balance drifted past 0.5%");

    // explicit per-step check of the same property, from the
    // diagnostics channel
    let bat = sim.bat;
    let an = sim.an.clone();
    let ca = sim.ca.clone();
    let i_exp = -0.5 * bat.cap / bat.area;

    let post = sol.post();
    for k in 0..post.i_ext.len() {
        let i_mod = post.i_ext[k];
        let i_an = -post.sdot_an[k] * an.a_s() * an.thick * FARADAY_C_PER_KMOL;
        let i_ca = post.sdot_ca[k] * ca.a_s() * ca.thick * FARADAY_C_PER_KMOL;
        for (what, i) in [("model", i_mod), ("anode", i_an), ("cathode", i_ca)] {
            let ratio = i / i_exp;
            assert!(
                (0.995..=1.005).contains(&ratio),
                "step {k}: {what} current ratio {ratio}"
            );
        }
    }
}

#[test]
fn cc_discharge_moves_lithium_between_electrodes() {
    let sim = Simulation::default();
    let grid = TimeGrid::new(0.0, 1350.0, 16).unwrap();
    let sol = sim.run_cc(-0.5, grid).unwrap();
    assert!(sol.success, "solver failed: {}", sol.message);

    let lay = &sim.layout;
    let first = &sol.y[0];
    let last = sol.y.last().unwrap();

    // anode delithiates, cathode lithiates
    assert!(last[lay.anode.li_surface()] < first[lay.anode.li_surface()] - 0.05);
    assert!(last[lay.cathode.li_surface()] > first[lay.cathode.li_surface()] + 0.04);

    // the cell voltage sags under discharge
    let v = sol.voltage();
    assert!(v[0] < 4.1 && v[0] > 3.7, "initial voltage {}", v[0]);
    assert!(v.last().unwrap() < &v[0]);
}

#[test]
fn dense_and_banded_strategies_agree() {
    use cf_spm::RunOptions;
    let sim = Simulation::default();
    let grid = TimeGrid::new(0.0, 600.0, 11).unwrap();
    let exp = cf_cell::Experiment::constant_current(-0.5, grid).unwrap();

    let banded = sim.run(&exp, &RunOptions::default()).unwrap();
    let dense = sim
        .run(
            &exp,
            &RunOptions {
                banded: false,
                ..RunOptions::default()
            },
        )
        .unwrap();

    assert!(banded.success && dense.success);
    let i = sim.layout.cathode.phi_ed;
    for (yb, yd) in banded.y.iter().zip(dense.y.iter()) {
        assert!(
            (yb[i] - yd[i]).abs() < 1e-4,
            "voltage mismatch {} vs {}",
            yb[i],
            yd[i]
        );
    }
}
