//! fr-engine: boundary to the external simulation engine.
//!
//! - `api`: the engine scripting API as consumed by the pipeline, plus
//!   version-tolerant initialization
//! - `records`: decoding of raw trend/profile payloads into canonical shapes
//! - `launcher`: turning a model file into a selectable case handle
//! - `script`: an [`EngineApi`] that drives the engine through generated
//!   control scripts
//! - `process`: captured, blocking invocation of the engine executable

pub mod api;
pub mod launcher;
pub mod process;
pub mod records;
pub mod script;

pub use api::{CaseHandle, EngineApi, EngineConnector, InitEntryPoint, initialize_case};
pub use launcher::{
    CONTROL_SCRIPT_NAME, CaseLauncher, HANDLE_FILE_NAME, HANDLE_MARKER, ProcessLauncher,
    error_diagnostic, parse_case_handle, persist_handle, wait_until_visible, write_control_script,
};
pub use process::{CapturedOutput, run_captured};
pub use records::{
    ProfileHistory, ProfileRecord, ProfileSnapshot, TimeKey, TimeValueMap, decode_profile,
    decode_trend,
};
pub use script::{ScriptConnector, ScriptEngine};

use std::path::PathBuf;

pub type EngineResult<T> = Result<T, EngineError>;
pub type LaunchResult<T> = Result<T, LaunchError>;

/// Failures of engine-API calls.
#[derive(thiserror::Error, Debug)]
pub enum EngineError {
    #[error("No case selected")]
    NoCaseSelected,

    #[error("Engine call '{operation}' failed: {message}")]
    Call { operation: String, message: String },

    #[error("Engine script '{operation}' failed (exit code {exit_code:?}): {diagnostic}")]
    Script {
        operation: String,
        exit_code: Option<i32>,
        diagnostic: String,
    },

    #[error("Failed to start engine executable {executable}: {source}")]
    Spawn {
        executable: PathBuf,
        source: std::io::Error,
    },

    #[error("Entry point '{name}' is not available on this engine")]
    UnsupportedEntryPoint { name: &'static str },

    #[error("No supported initialization entry point found; attempted: {}", .attempted.join(", "))]
    NoInitEntryPoint { attempted: Vec<&'static str> },

    #[error("Unrecognized {what} payload")]
    UnrecognizedPayload { what: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failures while turning a model file into a visible case handle.
#[derive(thiserror::Error, Debug)]
pub enum LaunchError {
    #[error("Failed to write control script {path}: {source}")]
    Script {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to start engine executable {executable}: {source}")]
    Spawn {
        executable: PathBuf,
        source: std::io::Error,
    },

    #[error(
        "Engine did not report a case handle (exit code {exit_code:?}){}\nstdout: {stdout}\nstderr: {stderr}",
        .diagnostic.as_deref().map(|d| format!(": {d}")).unwrap_or_default()
    )]
    LaunchFailed {
        exit_code: Option<i32>,
        diagnostic: Option<String>,
        stdout: String,
        stderr: String,
    },

    #[error("Case {handle} was created but did not become visible after {attempts} attempts: {last_error}")]
    HandleNotVisible {
        handle: CaseHandle,
        attempts: u32,
        last_error: String,
    },
}
