//! SI units of engine output properties, keyed by display name.

use std::collections::HashMap;
use std::sync::LazyLock;

/// Unit written for properties missing from [`PROPERTY_UNITS`].
pub const UNKNOWN_UNIT: &str = "?";

const ENTRIES: &[(&str, &str)] = &[
    // Time (base unit)
    ("time", "s"),
    ("Time", "s"),
    ("Time step", "s"),

    // Pressure
    ("Pressure", "Pa"),
    ("Pressure drop", "Pa"),
    ("Pressure drop - total", "Pa"),
    ("Pressure drop - gravity", "Pa"),
    ("Pressure drop - friction", "Pa"),
    ("Pressure Left", "Pa"),
    ("Pressure Right", "Pa"),
    ("Pressure (inlet)", "Pa"),
    ("Pressure (outlet)", "Pa"),

    // Temperature
    ("Temperature", "C"),
    ("Temperature - gas", "C"),
    ("Temperature - oil", "C"),
    ("Temperature - average", "C"),
    ("Temperature - surroundings", "C"),
    ("Wall temperature - inner surface", "C"),
    ("Average temperature", "C"),

    // Mass flow rate
    ("Mass flow rate", "kg/s"),
    ("MFR - continuous gas", "kg/s"),
    ("MFR - continuous oil", "kg/s"),
    ("MFR - bubbles", "kg/s"),
    ("MFR - droplets", "kg/s"),
    ("MFR - total gas", "kg/s"),
    ("MFR - total liquid", "kg/s"),
    ("MFR - total", "kg/s"),
    ("MFR - gas", "kg/s"),
    ("MFR - oil", "kg/s"),
    ("MFR - liquid - 2 phase", "kg/s"),
    ("MFR - total - 2 phase", "kg/s"),

    // Mass fractions
    ("CO2 mass frac. - gas", "-"),
    ("CO2 mass frac. gas", "-"),
    ("CO2 mass frac. - oil", "-"),
    ("CO2 mass frac. oil", "-"),
    ("Mass fraction", "-"),
    ("Mass fractions", "-"),
    ("Compositional mass fractions", "-"),
    ("MF - gas", "-"),
    ("MF - oil", "-"),
    ("MF - bubbles", "-"),
    ("MF - droplets", "-"),
    ("MF - total gas - 2ph", "-"),
    ("MF - total oil - 2ph", "-"),

    // Mass/Volume
    ("Total mass - gas", "kg"),
    ("Total mass - oil", "kg"),
    ("Total mass - total", "kg"),
    ("Total volume - gas", "m³"),
    ("Total volume - oil", "m³"),
    ("Total volume - total", "m³"),
    ("Volume - gas", "m³"),
    ("Volume - oil", "m³"),
    ("Volume - bubbles", "m³"),
    ("Volume - droplets", "m³"),
    ("Volume - total gas", "m³"),
    ("Volume - total liquid", "m³"),
    ("Volume - total", "m³"),
    ("Accumulated volume", "m³"),
    ("Standard volume flow rate", "m³/s"),
    ("Std VFR - gas", "Sm³/d"),
    ("Std VFR - oil", "Sm³/d"),

    // Velocity
    ("Velocities", "m/s"),
    ("Velocity - gas", "m/s"),
    ("Velocity - oil", "m/s"),
    ("Superficial velocities", "m/s"),
    ("Superficial velocity - gas", "m/s"),
    ("Superficial velocity - oil", "m/s"),
    ("Superficial velocity - bubbles", "m/s"),
    ("Superficial velocity - droplets", "m/s"),
    ("Superficial velocity - total gas", "m/s"),
    ("Superficial velocity - total liquid", "m/s"),
    ("Superficial velocity - total", "m/s"),

    // Volume fractions
    ("Volume fraction", "-"),
    ("VF - gas", "-"),
    ("VF - oil", "-"),
    ("VF - bubbles", "-"),
    ("VF - droplets", "-"),
    ("VF - total gas", "-"),
    ("VF - total oil", "-"),
    ("VF - total gas - 2ph", "-"),
    ("VF - total oil - 2ph", "-"),
    ("VF - total gas - 2ph - pressure node", "-"),
    ("VF - total oil - 2ph - pressure node", "-"),

    // Position/Geometry
    ("Elevation profile", "m"),
    ("Mesh boundaries", "m"),
    ("Mesh centers", "m"),
    ("Position", "m"),
    ("position", "m"),
    ("Pipe elevation profile", "m"),

    // Heat transfer
    ("Heat transfer - gas-wall", "W/m²-K"),
    ("Heat transfer - oil-wall", "W/m²-K"),
    ("Heat transfer - gas-oil", "W/m²-K"),
    ("Heat transfer - average-wall", "W/m²-K"),
    ("Heat transfer - OHTC", "W/m²-K"),
    ("Heat transfer - surroundings", "W/m²-K"),
    ("Heat transfer coefficients", "W/m²-K"),

    // Iterations/Residuals
    ("Hydrodynamics", "-"),
    ("Hydrodynamics iterations", "-"),
    ("MVP total", "-"),
    ("MVP total iterations", "-"),
    ("MVP last", "-"),
    ("MVP last iterations", "-"),
    ("Energy", "-"),
    ("Energy iterations", "-"),
    ("Custom fluid", "-"),
    ("Custom fluid iterations", "-"),
    ("Compositional", "-"),
    ("Compositional iterations", "-"),
    ("Iterations", "-"),
    ("Mass residual", "kg/s"),
    ("Momentum residual", "N"),
    ("Energy residual", "K"),
    ("Residual", "-"),
    ("Restarts", "-"),

    // Time consumption
    ("Time - properties", "s"),
    ("Time - point model", "s"),
    ("Time - momentum", "s"),
    ("Time - MVP total", "s"),
    ("Time - composition", "s"),
    ("Time - single component", "s"),
    ("Time - energy total", "s"),
    ("Time - energy wall", "s"),
    ("Time - output", "s"),
    ("Time - total", "s"),
    ("Time - momentum matrix", "s"),
    ("Time - MVP matrix", "s"),
    ("Time - composition matrix", "s"),
    ("Time - single component matrix", "s"),
    ("Time - energy matrix", "s"),
    ("Time consumption", "s"),

    // Time steps
    ("Max time step", "s"),
    ("Min time step", "s"),
    ("Average time step", "s"),
    ("CFL max time step", "s"),

    // Other
    ("Opening fraction", "-"),
    ("Physical flow regime id - gas-liquid", "-"),
    ("Physical regime id", "-"),
];

pub static PROPERTY_UNITS: LazyLock<HashMap<&'static str, &'static str>> =
    LazyLock::new(|| ENTRIES.iter().copied().collect());

/// Unit of `property`, or [`UNKNOWN_UNIT`].
pub fn property_unit(property: &str) -> &'static str {
    PROPERTY_UNITS.get(property).copied().unwrap_or(UNKNOWN_UNIT)
}
