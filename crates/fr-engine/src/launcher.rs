//! Model file → visible case handle.
//!
//! The engine executable is run once against a generated control script that
//! loads the model and prints the new case's handle. The launching process
//! and the engine's scripting API do not necessarily see the same database
//! state at the same time, so the handle is then polled through fresh API
//! sessions until it can be selected, within a fixed attempt budget.

use std::path::{Path, PathBuf};

use fr_core::{Clock, RetryPolicy, SystemClock, retry_with_delay};
use tracing::{debug, info, warn};

use crate::api::{CaseHandle, EngineConnector};
use crate::process::run_captured;
use crate::{LaunchError, LaunchResult};

/// Control script written into the result folder.
pub const CONTROL_SCRIPT_NAME: &str = "run_case.js";

/// Traceability file holding the case handle.
pub const HANDLE_FILE_NAME: &str = "case_uuid.txt";

/// Marker preceding the handle in the engine's output.
pub const HANDLE_MARKER: &str = "UUID:";

/// Produces a selectable case handle from a model file.
pub trait CaseLauncher {
    fn launch(&mut self, model_path: &Path, result_folder: &Path) -> LaunchResult<CaseHandle>;
}

/// Path as a JavaScript string literal with forward slashes.
pub(crate) fn js_path_literal(path: &Path) -> String {
    let normalized = path.to_string_lossy().replace('\\', "/");
    serde_json::Value::String(normalized).to_string()
}

/// Write the script that loads `model_path` and reports the new case.
///
/// On failure inside the guarded block the script prints `ERROR:` (and
/// `STACK:` when available) and rethrows so the engine exits non-zero.
pub fn write_control_script(script_path: &Path, model_path: &Path) -> LaunchResult<()> {
    let script = [
        "try {".to_string(),
        "  var CASES = ledaModules.CASES();".to_string(),
        format!("  var c = CASES.createCaseFrom({});", js_path_literal(model_path)),
        format!("  print(\"{HANDLE_MARKER}\", c.uuid);"),
        "  print(\"CASE_DIR:\", c.caseFolder);".to_string(),
        "} catch (e) {".to_string(),
        "  try { print(\"ERROR:\", e.toString()); } catch (ee) {}".to_string(),
        "  try { if (e.stack) print(\"STACK:\", e.stack); } catch (ee) {}".to_string(),
        "  throw e;".to_string(),
        "}".to_string(),
    ];
    std::fs::write(script_path, script.join("\n")).map_err(|source| LaunchError::Script {
        path: script_path.to_path_buf(),
        source,
    })
}

/// First handle reported in `output`: the text after the first `UUID:`
/// marker, trimmed.
pub fn parse_case_handle(output: &str) -> Option<CaseHandle> {
    output
        .lines()
        .filter_map(|line| line.split_once(HANDLE_MARKER))
        .map(|(_, rest)| rest.trim())
        .find(|id| !id.is_empty())
        .map(CaseHandle::new)
}

/// Error text reported by a failed engine script, if any.
///
/// Collects `ERROR:`/`STACK:` lines printed by the control script and the
/// engine's own `[Error] ... [STACKTRACE]` block from stderr.
pub fn error_diagnostic(stdout: &str, stderr: &str) -> Option<String> {
    let mut parts: Vec<String> = stdout
        .lines()
        .chain(stderr.lines())
        .map(str::trim)
        .filter(|line| line.contains("ERROR:") || line.starts_with("STACK:"))
        .map(str::to_string)
        .collect();

    if let Some(start) = stderr.find("[Error]") {
        let tail = &stderr[start..];
        let end = tail.find("[STACKTRACE]").unwrap_or(tail.len());
        let block = tail[..end].trim();
        if !block.is_empty() {
            parts.push(block.to_string());
        }
    }

    if parts.is_empty() {
        None
    } else {
        Some(parts.join("\n"))
    }
}

/// Poll fresh engine sessions until `handle` can be selected.
///
/// Returns the number of attempts used.
pub fn wait_until_visible(
    connector: &dyn EngineConnector,
    handle: &CaseHandle,
    policy: RetryPolicy,
    clock: &mut dyn Clock,
) -> LaunchResult<u32> {
    retry_with_delay(policy, clock, |attempt| {
        debug!(%handle, attempt, "probing case visibility");
        let mut session = connector.connect()?;
        session.select_case(handle)?;
        Ok::<u32, crate::EngineError>(attempt)
    })
    .map_err(|exhausted| LaunchError::HandleNotVisible {
        handle: handle.clone(),
        attempts: exhausted.attempts,
        last_error: exhausted.last_error.to_string(),
    })
}

/// Write the handle next to the case's other artifacts. Failure is logged
/// and otherwise ignored.
pub fn persist_handle(result_folder: &Path, handle: &CaseHandle) {
    let path = result_folder.join(HANDLE_FILE_NAME);
    if let Err(err) = std::fs::write(&path, handle.as_str()) {
        warn!(path = %path.display(), error = %err, "could not record case handle");
    }
}

/// Launches cases by running the engine executable as a child process.
pub struct ProcessLauncher {
    executable: PathBuf,
    connector: Box<dyn EngineConnector>,
    clock: Box<dyn Clock>,
}

impl ProcessLauncher {
    pub fn new(executable: impl Into<PathBuf>, connector: Box<dyn EngineConnector>) -> Self {
        Self {
            executable: executable.into(),
            connector,
            clock: Box::new(SystemClock),
        }
    }

    /// Replace the clock used between visibility probes.
    pub fn with_clock(mut self, clock: Box<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }
}

impl CaseLauncher for ProcessLauncher {
    fn launch(&mut self, model_path: &Path, result_folder: &Path) -> LaunchResult<CaseHandle> {
        let script_path = result_folder.join(CONTROL_SCRIPT_NAME);
        write_control_script(&script_path, model_path)?;

        let output = run_captured(&self.executable, &script_path, None).map_err(|source| {
            LaunchError::Spawn {
                executable: self.executable.clone(),
                source,
            }
        })?;

        let handle = match parse_case_handle(&output.combined()) {
            Some(handle) if output.success => handle,
            _ => {
                return Err(LaunchError::LaunchFailed {
                    exit_code: output.exit_code,
                    diagnostic: error_diagnostic(&output.stdout, &output.stderr),
                    stdout: output.stdout,
                    stderr: output.stderr,
                });
            }
        };
        info!(%handle, "engine created case");

        let attempts = wait_until_visible(
            self.connector.as_ref(),
            &handle,
            RetryPolicy::CASE_VISIBILITY,
            self.clock.as_mut(),
        )?;
        info!(%handle, attempts, "case visible to engine API");

        persist_handle(result_folder, &handle);
        Ok(handle)
    }
}
