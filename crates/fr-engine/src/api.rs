//! Engine scripting API as seen by the pipeline.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use tracing::info;

use crate::{EngineError, EngineResult};

/// Opaque identifier the engine mints when a model is loaded.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CaseHandle(String);

impl CaseHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CaseHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Steady-state initialization entry points across engine versions,
/// newest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InitEntryPoint {
    /// Current steady-state solve.
    RunSteady,
    /// Older initialization call.
    RunInitialization,
    /// Legacy initializer.
    Initialize,
}

impl InitEntryPoint {
    /// Order in which entry points are probed.
    pub const PROBE_ORDER: [InitEntryPoint; 3] =
        [Self::RunSteady, Self::RunInitialization, Self::Initialize];

    pub fn name(self) -> &'static str {
        match self {
            Self::RunSteady => "runSteady",
            Self::RunInitialization => "runInitialization",
            Self::Initialize => "initialize",
        }
    }
}

impl fmt::Display for InitEntryPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Blocking calls into one engine session.
///
/// Raw series are returned undecoded; see [`crate::records`] for the
/// accepted shapes.
pub trait EngineApi {
    fn select_case(&mut self, handle: &CaseHandle) -> EngineResult<()>;

    /// Load the model file again so loggers and devices attach to the
    /// selected case.
    fn reload_model(&mut self, model_path: &Path) -> EngineResult<()>;

    /// Whether this engine version exposes `entry`.
    fn has_entry_point(&self, entry: InitEntryPoint) -> bool;

    fn run_entry_point(&mut self, entry: InitEntryPoint) -> EngineResult<()>;

    /// Advance the transient simulation by `seconds`.
    fn advance(&mut self, seconds: f64) -> EngineResult<()>;

    fn list_trend_loggers(&mut self) -> EngineResult<Vec<String>>;

    fn list_trend_variables(&mut self, logger: &str) -> EngineResult<Vec<String>>;

    fn list_profile_loggers(&mut self) -> EngineResult<Vec<String>>;

    fn list_profile_variables(&mut self, logger: &str) -> EngineResult<Vec<String>>;

    fn trend_series(&mut self, logger: &str, variable: &str) -> EngineResult<serde_json::Value>;

    /// Profile of `variable`; only the last time point unless `all_times`.
    fn profile_series(
        &mut self,
        logger: &str,
        variable: &str,
        all_times: bool,
    ) -> EngineResult<serde_json::Value>;
}

/// Opens fresh engine sessions.
pub trait EngineConnector {
    fn connect(&self) -> EngineResult<Box<dyn EngineApi>>;
}

/// Run the first initialization entry point the engine exposes.
pub fn initialize_case(engine: &mut dyn EngineApi) -> EngineResult<InitEntryPoint> {
    let Some(entry) = InitEntryPoint::PROBE_ORDER
        .into_iter()
        .find(|entry| engine.has_entry_point(*entry))
    else {
        return Err(EngineError::NoInitEntryPoint {
            attempted: InitEntryPoint::PROBE_ORDER.iter().map(|e| e.name()).collect(),
        });
    };

    info!(entry_point = entry.name(), "initializing case");
    engine.run_entry_point(entry)?;
    Ok(entry)
}
