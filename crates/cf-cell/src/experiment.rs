//! Experiment descriptor: operating mode, demand profile, time grid,
//! stop conditions, and the per-evaluation events snapshot.

use serde::{Deserialize, Serialize};

use crate::error::{CellError, CellResult};

/// Operating mode of the externally imposed boundary condition.
///
/// The two current-controlled variants differ only in how the demand
/// profile is scaled (absolute amperes vs. multiples of rated capacity);
/// they are kept as distinct variants so a descriptor states its units
/// explicitly and an unsupported mode/units pairing cannot be built.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Applied current in amperes
    CurrentAmps,
    /// Applied current as a C-rate
    CurrentCRate,
    /// Applied cell voltage in volts
    Voltage,
    /// Applied cell power in watts
    Power,
}

/// Demand value as a function of time. Kept as data rather than a
/// closure so experiments clone cleanly into solution snapshots.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Profile {
    Constant {
        value: f64,
    },
    /// Linear ramp from `start` at t=0 to `end` at `t_end`, held after.
    Ramp {
        start: f64,
        end: f64,
        t_end: f64,
    },
    /// Piecewise-constant steps; `values[i]` applies from `times[i]` on.
    Steps {
        times: Vec<f64>,
        values: Vec<f64>,
    },
}

impl Profile {
    pub fn value_at(&self, t: f64) -> f64 {
        match self {
            Profile::Constant { value } => *value,
            Profile::Ramp { start, end, t_end } => {
                if t >= *t_end {
                    *end
                } else {
                    start + (end - start) * t / t_end
                }
            }
            Profile::Steps { times, values } => {
                let mut v = values[0];
                for (ti, vi) in times.iter().zip(values.iter()) {
                    if t >= *ti {
                        v = *vi;
                    }
                }
                v
            }
        }
    }

    pub fn validate(&self) -> CellResult<()> {
        match self {
            Profile::Constant { .. } => Ok(()),
            Profile::Ramp { t_end, .. } => {
                if *t_end > 0.0 {
                    Ok(())
                } else {
                    Err(CellError::Experiment {
                        what: "ramp t_end must be positive",
                    })
                }
            }
            Profile::Steps { times, values } => {
                if times.is_empty() || times.len() != values.len() {
                    return Err(CellError::Experiment {
                        what: "step profile needs matching, non-empty times/values",
                    });
                }
                if times.windows(2).any(|w| w[1] <= w[0]) {
                    return Err(CellError::Experiment {
                        what: "step times must be strictly increasing",
                    });
                }
                Ok(())
            }
        }
    }
}

/// Output time grid: `nt` evenly spaced save points over
/// `[t_min, t_max]`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TimeGrid {
    pub t_min: f64,
    pub t_max: f64,
    pub nt: usize,
}

impl TimeGrid {
    pub fn new(t_min: f64, t_max: f64, nt: usize) -> CellResult<Self> {
        let grid = Self { t_min, t_max, nt };
        grid.validate()?;
        Ok(grid)
    }

    pub fn validate(&self) -> CellResult<()> {
        if !(self.t_max > self.t_min) {
            return Err(CellError::Experiment {
                what: "time grid must have t_max > t_min",
            });
        }
        if self.nt < 2 {
            return Err(CellError::Experiment {
                what: "time grid needs at least 2 points",
            });
        }
        Ok(())
    }

    pub fn points(&self) -> Vec<f64> {
        cf_core::linspace(self.t_min, self.t_max, self.nt)
    }
}

/// Early-termination condition checked against the events snapshot at
/// every accepted step.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopCondition {
    VoltageBelow(f64),
    VoltageAbove(f64),
}

/// Externally imposed operating condition for one run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Experiment {
    pub mode: Mode,
    pub profile: Profile,
    pub time: TimeGrid,
    #[serde(default)]
    pub limits: Vec<StopCondition>,
}

impl Experiment {
    pub fn new(mode: Mode, profile: Profile, time: TimeGrid) -> CellResult<Self> {
        profile.validate()?;
        time.validate()?;
        Ok(Self {
            mode,
            profile,
            time,
            limits: Vec::new(),
        })
    }

    /// Constant-current experiment with the demand in C-rate units.
    pub fn constant_current(c_rate: f64, time: TimeGrid) -> CellResult<Self> {
        Self::new(Mode::CurrentCRate, Profile::Constant { value: c_rate }, time)
    }

    /// Constant-current experiment with the demand in amperes.
    pub fn constant_current_amps(amps: f64, time: TimeGrid) -> CellResult<Self> {
        Self::new(Mode::CurrentAmps, Profile::Constant { value: amps }, time)
    }

    pub fn constant_voltage(volts: f64, time: TimeGrid) -> CellResult<Self> {
        Self::new(Mode::Voltage, Profile::Constant { value: volts }, time)
    }

    pub fn constant_power(watts: f64, time: TimeGrid) -> CellResult<Self> {
        Self::new(Mode::Power, Profile::Constant { value: watts }, time)
    }

    pub fn with_limits(mut self, limits: Vec<StopCondition>) -> Self {
        self.limits = limits;
        self
    }

    /// Demand value at time `t`.
    pub fn value(&self, t: f64) -> f64 {
        self.profile.value_at(t)
    }
}

/// Advisory telemetry computed by every residual evaluation: the
/// instantaneous operating point in each unit system. Not part of the
/// DAE state; returned to the caller, never stored in the descriptor.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Events {
    pub time_s: f64,
    pub time_min: f64,
    pub time_h: f64,
    /// External current [A], discharge positive
    pub current_a: f64,
    /// External current as a C-rate
    pub current_c: f64,
    /// Areal current density [A/m^2]
    pub current_density: f64,
    /// Cell voltage [V]
    pub voltage_v: f64,
    /// External power [W]
    pub power_w: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_constant() {
        let p = Profile::Constant { value: 2.5 };
        assert_eq!(p.value_at(0.0), 2.5);
        assert_eq!(p.value_at(1e4), 2.5);
    }

    #[test]
    fn profile_ramp_holds_after_end() {
        let p = Profile::Ramp {
            start: 0.0,
            end: 10.0,
            t_end: 100.0,
        };
        assert_eq!(p.value_at(0.0), 0.0);
        assert!((p.value_at(50.0) - 5.0).abs() < 1e-12);
        assert_eq!(p.value_at(500.0), 10.0);
    }

    #[test]
    fn profile_steps_latch() {
        let p = Profile::Steps {
            times: vec![0.0, 60.0, 120.0],
            values: vec![1.0, 0.5, 0.0],
        };
        assert_eq!(p.value_at(30.0), 1.0);
        assert_eq!(p.value_at(60.0), 0.5);
        assert_eq!(p.value_at(1000.0), 0.0);
    }

    #[test]
    fn step_profile_validation() {
        let bad = Profile::Steps {
            times: vec![0.0, 0.0],
            values: vec![1.0, 2.0],
        };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn time_grid_points_hit_both_ends() {
        let grid = TimeGrid::new(0.0, 1350.0, 151).unwrap();
        let pts = grid.points();
        assert_eq!(pts.len(), 151);
        assert_eq!(pts[0], 0.0);
        assert!((pts[150] - 1350.0).abs() < 1e-9);
    }

    #[test]
    fn experiment_constructors() {
        let grid = TimeGrid::new(0.0, 600.0, 61).unwrap();
        let cc = Experiment::constant_current(0.5, grid).unwrap();
        assert_eq!(cc.mode, Mode::CurrentCRate);
        let cv = Experiment::constant_voltage(4.0, grid).unwrap();
        assert_eq!(cv.mode, Mode::Voltage);
        assert_eq!(cv.value(100.0), 4.0);
    }
}
