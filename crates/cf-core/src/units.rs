// cf-core/src/units.rs

use uom::si::f64::{
    Area as UomArea, ElectricCharge as UomElectricCharge, ElectricCurrent as UomElectricCurrent,
    ElectricPotential as UomElectricPotential, Length as UomLength, Power as UomPower,
    ThermodynamicTemperature as UomThermodynamicTemperature, Time as UomTime,
};

// Public canonical unit types (SI, f64)
pub type Area = UomArea;
pub type Charge = UomElectricCharge;
pub type Current = UomElectricCurrent;
pub type Length = UomLength;
pub type Potential = UomElectricPotential;
pub type Power = UomPower;
pub type Temperature = UomThermodynamicTemperature;
pub type Time = UomTime;

#[inline]
pub fn volts(v: f64) -> Potential {
    use uom::si::electric_potential::volt;
    Potential::new::<volt>(v)
}

#[inline]
pub fn amps(v: f64) -> Current {
    use uom::si::electric_current::ampere;
    Current::new::<ampere>(v)
}

#[inline]
pub fn watts(v: f64) -> Power {
    use uom::si::power::watt;
    Power::new::<watt>(v)
}

#[inline]
pub fn amp_hours(v: f64) -> Charge {
    use uom::si::electric_charge::ampere_hour;
    Charge::new::<ampere_hour>(v)
}

#[inline]
pub fn as_amp_hours(q: Charge) -> f64 {
    use uom::si::electric_charge::ampere_hour;
    q.get::<ampere_hour>()
}

#[inline]
pub fn kelvin(v: f64) -> Temperature {
    use uom::si::thermodynamic_temperature::kelvin;
    Temperature::new::<kelvin>(v)
}

#[inline]
pub fn meters(v: f64) -> Length {
    use uom::si::length::meter;
    Length::new::<meter>(v)
}

#[inline]
pub fn square_meters(v: f64) -> Area {
    use uom::si::area::square_meter;
    Area::new::<square_meter>(v)
}

#[inline]
pub fn seconds(v: f64) -> Time {
    use uom::si::time::second;
    Time::new::<second>(v)
}

pub mod constants {
    /// Faraday constant [C/kmol]. Concentrations throughout the model are
    /// in kmol/m^3, so the kmol-based value is the one that appears in
    /// the reaction-rate and current expressions.
    pub const FARADAY_C_PER_KMOL: f64 = 9.648_533_212e7;

    /// Universal gas constant [J/(kmol*K)], kmol-based to match.
    pub const GAS_CONST_J_PER_KMOL_K: f64 = 8_314.462_618;

    /// Universal gas constant [J/(mol*K)] for Arrhenius factors whose
    /// activation energies are tabulated per mole.
    pub const GAS_CONST_J_PER_MOL_K: f64 = 8.314_462_618;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_smoke() {
        let _v = volts(4.2);
        let _i = amps(2.5);
        let _p = watts(10.0);
        let _q = amp_hours(3.0);
        let _t = kelvin(300.0);
        let _l = meters(75e-6);
        let _a = square_meters(0.1);
        let _dt = seconds(1350.0);
    }

    #[test]
    fn amp_hours_to_coulombs() {
        use uom::si::electric_charge::coulomb;
        let q = amp_hours(1.0);
        assert!((q.get::<coulomb>() - 3600.0).abs() < 1e-9);
    }
}
