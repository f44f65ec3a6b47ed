//! Caller-facing case inputs in user units.
//!
//! Conversion to template inputs is the lenient tier: list lengths that do not
//! match their group's time vector are trimmed or padded with an advisory.
//! The template engine itself stays strict.

use fr_core::{bar_to_pa, celsius_to_kelvin};
use fr_template::{Advisory, InputValue, Placeholder, TemplateInputs, align_to_time};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

/// A constant or one value per time point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UserValue {
    Scalar(f64),
    Series(Vec<f64>),
}

impl From<f64> for UserValue {
    fn from(v: f64) -> Self {
        UserValue::Scalar(v)
    }
}

impl From<Vec<f64>> for UserValue {
    fn from(v: Vec<f64>) -> Self {
        UserValue::Series(v)
    }
}

fn default_time() -> Vec<f64> {
    vec![0.0]
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceInputs {
    #[serde(default = "default_time")]
    pub time: Vec<f64>,
    pub mass_flow_kg_s: UserValue,
    pub temperature_c: UserValue,
}

impl Default for SourceInputs {
    fn default() -> Self {
        Self {
            time: default_time(),
            mass_flow_kg_s: UserValue::Scalar(110.0),
            temperature_c: UserValue::Scalar(40.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValveInputs {
    #[serde(default = "default_time")]
    pub time: Vec<f64>,
    pub opening: UserValue,
}

impl Default for ValveInputs {
    fn default() -> Self {
        Self {
            time: default_time(),
            opening: UserValue::Scalar(0.22),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WellheadInputs {
    #[serde(default = "default_time")]
    pub time: Vec<f64>,
    pub pressure_bar: UserValue,
    pub temperature_c: UserValue,
}

impl Default for WellheadInputs {
    fn default() -> Self {
        Self {
            time: default_time(),
            pressure_bar: UserValue::Scalar(80.0),
            temperature_c: UserValue::Scalar(4.0),
        }
    }
}

/// Boundary conditions of one case, per component group.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CaseInputs {
    #[serde(default)]
    pub source: SourceInputs,
    #[serde(default)]
    pub valve: ValveInputs,
    #[serde(default)]
    pub wellhead: WellheadInputs,
}

/// Template inputs in model units plus any length adjustments made on the way.
#[derive(Debug, Clone)]
pub struct ConvertedInputs {
    pub inputs: TemplateInputs,
    pub advisories: Vec<Advisory>,
}

struct Converter {
    inputs: TemplateInputs,
    advisories: Vec<Advisory>,
}

impl Converter {
    fn time(&mut self, placeholder: Placeholder, name: &str, time: &[f64]) -> AppResult<usize> {
        if time.is_empty() {
            return Err(AppError::InvalidInput(format!("'{name}' must have at least one point")));
        }
        self.inputs.insert(placeholder.key(), time.to_vec());
        Ok(time.len())
    }

    fn property(
        &mut self,
        placeholder: Placeholder,
        name: &str,
        time_len: usize,
        value: &UserValue,
        to_model: fn(f64) -> f64,
    ) -> AppResult<()> {
        let converted = match value {
            UserValue::Scalar(v) => InputValue::Scalar(to_model(*v)),
            UserValue::Series(values) => {
                let (aligned, advisory) = align_to_time(name, time_len, values.clone())?;
                self.advisories.extend(advisory);
                InputValue::Series(aligned.into_iter().map(to_model).collect())
            }
        };
        self.inputs.insert(placeholder.key(), converted);
        Ok(())
    }
}

fn unchanged(v: f64) -> f64 {
    v
}

impl CaseInputs {
    /// Convert to template inputs: °C → K, bar → Pa.
    pub fn to_template_inputs(&self) -> AppResult<ConvertedInputs> {
        let mut c = Converter {
            inputs: TemplateInputs::new(),
            advisories: Vec::new(),
        };

        let n = c.time(Placeholder::SourceTime, "source.time", &self.source.time)?;
        c.property(
            Placeholder::SourceMassFlow,
            "source.mass_flow_kg_s",
            n,
            &self.source.mass_flow_kg_s,
            unchanged,
        )?;
        c.property(
            Placeholder::SourceTemperature,
            "source.temperature_c",
            n,
            &self.source.temperature_c,
            celsius_to_kelvin,
        )?;

        let n = c.time(Placeholder::ValveTime, "valve.time", &self.valve.time)?;
        c.property(
            Placeholder::ValveOpening,
            "valve.opening",
            n,
            &self.valve.opening,
            unchanged,
        )?;

        let n = c.time(Placeholder::WellheadTime, "wellhead.time", &self.wellhead.time)?;
        c.property(
            Placeholder::WellheadPressure,
            "wellhead.pressure_bar",
            n,
            &self.wellhead.pressure_bar,
            bar_to_pa,
        )?;
        c.property(
            Placeholder::WellheadTemperature,
            "wellhead.temperature_c",
            n,
            &self.wellhead.temperature_c,
            celsius_to_kelvin,
        )?;

        Ok(ConvertedInputs {
            inputs: c.inputs,
            advisories: c.advisories,
        })
    }
}
