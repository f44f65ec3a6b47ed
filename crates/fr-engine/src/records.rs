//! Decoding of raw engine series.
//!
//! Trend series arrive in one of two shapes:
//!
//! - parallel arrays: `{"time": [...], "value": [...]}`
//! - per-sample records: `{"values": [{"time": t, "valueForGivenTime": v}, ...]}`
//!
//! Profiles arrive either as a full history
//! (`{"mesh": [...], "values": [{"time": t, "valueForGivenTime": [...]}]}`)
//! or collapsed to the last time point
//! (`{"mesh": [...], "time": t, "value": [...]}`).
//! Both families are classified by key set and converted before any
//! aggregation sees them.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;

use tracing::warn;

use crate::{EngineError, EngineResult};

/// Totally ordered `f64` usable as a map key.
#[derive(Debug, Clone, Copy)]
pub struct TimeKey(pub f64);

impl PartialEq for TimeKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for TimeKey {}

impl PartialOrd for TimeKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TimeKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

/// Canonical trend series: time → value, ascending.
pub type TimeValueMap = BTreeMap<TimeKey, f64>;

#[derive(Debug, Deserialize)]
struct TrendSample {
    time: f64,
    #[serde(rename = "valueForGivenTime")]
    value: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TrendPayload {
    Parallel {
        time: Vec<f64>,
        value: Vec<Option<f64>>,
    },
    Records {
        values: Vec<TrendSample>,
    },
}

impl TrendPayload {
    fn into_map(self) -> TimeValueMap {
        let pairs: Vec<(f64, Option<f64>)> = match self {
            TrendPayload::Parallel { time, value } => {
                if time.len() != value.len() {
                    warn!(
                        times = time.len(),
                        values = value.len(),
                        "trend time and value arrays differ in length; unpaired samples dropped"
                    );
                }
                time.into_iter().zip(value).collect()
            }
            TrendPayload::Records { values } => {
                values.into_iter().map(|s| (s.time, s.value)).collect()
            }
        };
        pairs
            .into_iter()
            .filter_map(|(t, v)| v.map(|v| (TimeKey(t), v)))
            .collect()
    }
}

/// Decode a raw trend payload. Later duplicates of a time overwrite earlier
/// ones; null samples are dropped.
pub fn decode_trend(raw: &serde_json::Value) -> EngineResult<TimeValueMap> {
    serde_json::from_value::<TrendPayload>(raw.clone())
        .map(TrendPayload::into_map)
        .map_err(|_| EngineError::UnrecognizedPayload {
            what: "trend".to_string(),
        })
}

/// Values along the mesh at one time point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileRecord {
    pub time: f64,
    #[serde(rename = "valueForGivenTime")]
    pub values: Vec<f64>,
}

/// Full profile history of one variable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileHistory {
    #[serde(default)]
    pub property: serde_json::Value,
    pub mesh: Vec<f64>,
    pub values: Vec<ProfileRecord>,
}

/// A profile collapsed to a single time point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileSnapshot {
    #[serde(default)]
    pub property: serde_json::Value,
    pub mesh: Vec<f64>,
    pub time: f64,
    pub value: Vec<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ProfilePayload {
    History(ProfileHistory),
    Snapshot(ProfileSnapshot),
}

impl ProfileHistory {
    /// The final record only.
    pub fn last(&self) -> Option<ProfileSnapshot> {
        self.values.last().map(|record| ProfileSnapshot {
            property: self.property.clone(),
            mesh: self.mesh.clone(),
            time: record.time,
            value: record.values.clone(),
        })
    }

    /// Every `(time, position, value)` cell; mesh and values are paired
    /// positionally, extra entries on either side are ignored.
    pub fn cells(&self) -> impl Iterator<Item = (f64, f64, f64)> + '_ {
        self.values.iter().flat_map(move |record| {
            self.mesh
                .iter()
                .zip(&record.values)
                .map(move |(pos, value)| (record.time, *pos, *value))
        })
    }
}

impl From<ProfileSnapshot> for ProfileHistory {
    fn from(snapshot: ProfileSnapshot) -> Self {
        ProfileHistory {
            property: snapshot.property,
            mesh: snapshot.mesh,
            values: vec![ProfileRecord {
                time: snapshot.time,
                values: snapshot.value,
            }],
        }
    }
}

/// Decode a raw profile payload in either shape.
pub fn decode_profile(raw: &serde_json::Value) -> EngineResult<ProfileHistory> {
    match serde_json::from_value::<ProfilePayload>(raw.clone()) {
        Ok(ProfilePayload::History(history)) => Ok(history),
        Ok(ProfilePayload::Snapshot(snapshot)) => Ok(snapshot.into()),
        Err(_) => Err(EngineError::UnrecognizedPayload {
            what: "profile".to_string(),
        }),
    }
}
