// fr-core/src/units.rs

use uom::si::f64::{Pressure as UomPressure, ThermodynamicTemperature as UomThermodynamicTemperature};

// Public canonical unit types (SI, f64)
pub type Pressure = UomPressure;
pub type Temperature = UomThermodynamicTemperature;

/// Offset between the Celsius and Kelvin scales.
pub const CELSIUS_OFFSET_K: f64 = 273.15;

/// Pascals per bar.
pub const PA_PER_BAR: f64 = 1.0e5;

#[inline]
pub fn degc(v: f64) -> Temperature {
    use uom::si::thermodynamic_temperature::degree_celsius;
    Temperature::new::<degree_celsius>(v)
}

#[inline]
pub fn bar(v: f64) -> Pressure {
    use uom::si::pressure::bar;
    Pressure::new::<bar>(v)
}

/// Temperature in degrees Celsius to the model's Kelvin.
#[inline]
pub fn celsius_to_kelvin(v: f64) -> f64 {
    use uom::si::thermodynamic_temperature::kelvin;
    degc(v).get::<kelvin>()
}

/// Pressure in bar to the model's pressure unit (Pa).
#[inline]
pub fn bar_to_pa(v: f64) -> f64 {
    use uom::si::pressure::pascal;
    bar(v).get::<pascal>()
}
