//! Template input model: component groups, placeholders and raw values.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Independent boundary-condition group of the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentGroup {
    /// Inlet mass source.
    Source,
    /// Control valve.
    Valve,
    /// Outlet pressure boundary.
    Wellhead,
}

impl ComponentGroup {
    pub const ALL: [ComponentGroup; 3] = [Self::Source, Self::Valve, Self::Wellhead];

    /// Placeholder holding this group's time vector.
    pub fn time_placeholder(self) -> Placeholder {
        match self {
            Self::Source => Placeholder::SourceTime,
            Self::Valve => Placeholder::ValveTime,
            Self::Wellhead => Placeholder::WellheadTime,
        }
    }

    /// Placeholders for the property series aligned with the time vector.
    pub fn property_placeholders(self) -> &'static [Placeholder] {
        match self {
            Self::Source => &[Placeholder::SourceMassFlow, Placeholder::SourceTemperature],
            Self::Valve => &[Placeholder::ValveOpening],
            Self::Wellhead => &[
                Placeholder::WellheadPressure,
                Placeholder::WellheadTemperature,
            ],
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Source => "Source",
            Self::Valve => "Valve",
            Self::Wellhead => "Wellhead",
        }
    }
}

impl fmt::Display for ComponentGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The fixed set of placeholders a template may contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Placeholder {
    SourceTime,
    SourceMassFlow,
    SourceTemperature,
    ValveTime,
    ValveOpening,
    WellheadTime,
    WellheadPressure,
    WellheadTemperature,
}

impl Placeholder {
    pub const ALL: [Placeholder; 8] = [
        Self::SourceTime,
        Self::SourceMassFlow,
        Self::SourceTemperature,
        Self::ValveTime,
        Self::ValveOpening,
        Self::WellheadTime,
        Self::WellheadPressure,
        Self::WellheadTemperature,
    ];

    /// Input key, also the placeholder name without braces.
    pub fn key(self) -> &'static str {
        match self {
            Self::SourceTime => "SOURCE_TIME",
            Self::SourceMassFlow => "SOURCE_MFR",
            Self::SourceTemperature => "SOURCE_TEMP_K",
            Self::ValveTime => "VALVE_TIME",
            Self::ValveOpening => "VALVE_OPENING",
            Self::WellheadTime => "WH_TIME",
            Self::WellheadPressure => "WH_PRESS",
            Self::WellheadTemperature => "WH_TEMP_K",
        }
    }

    /// Literal token as it appears in a template, e.g. `{WH_PRESS}`.
    pub fn token(self) -> String {
        format!("{{{}}}", self.key())
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.key() == key)
    }

    pub fn group(self) -> ComponentGroup {
        match self {
            Self::SourceTime | Self::SourceMassFlow | Self::SourceTemperature => {
                ComponentGroup::Source
            }
            Self::ValveTime | Self::ValveOpening => ComponentGroup::Valve,
            Self::WellheadTime | Self::WellheadPressure | Self::WellheadTemperature => {
                ComponentGroup::Wellhead
            }
        }
    }
}

impl fmt::Display for Placeholder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Raw value supplied for a template input.
///
/// A scalar is broadcast over the group's time vector; a series must match it
/// point for point. Any other JSON shape is carried through so validation can
/// report it against the offending key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InputValue {
    Scalar(f64),
    Series(Vec<f64>),
    Other(serde_json::Value),
}

impl From<f64> for InputValue {
    fn from(v: f64) -> Self {
        InputValue::Scalar(v)
    }
}

impl From<Vec<f64>> for InputValue {
    fn from(v: Vec<f64>) -> Self {
        InputValue::Series(v)
    }
}

impl From<&[f64]> for InputValue {
    fn from(v: &[f64]) -> Self {
        InputValue::Series(v.to_vec())
    }
}

/// Mapping from input key (`SOURCE_TIME`, `WH_PRESS`, ...) to raw value.
///
/// Keys outside the placeholder set are allowed and simply ignored by the
/// renderer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TemplateInputs(BTreeMap<String, InputValue>);

impl TemplateInputs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<InputValue>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<InputValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&InputValue> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &InputValue)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
