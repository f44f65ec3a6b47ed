//! Blocking invocation of the engine executable with captured output.
//!
//! There is no timeout: a hung engine blocks the caller indefinitely.

use std::path::Path;
use std::process::{Command, Stdio};

use tracing::debug;

/// Output from one engine invocation.
#[derive(Debug, Clone)]
pub struct CapturedOutput {
    /// Standard output, lossily decoded.
    pub stdout: String,
    /// Standard error, lossily decoded.
    pub stderr: String,
    /// Exit code (None if terminated by signal).
    pub exit_code: Option<i32>,
    /// Whether the process exited with code 0.
    pub success: bool,
}

impl CapturedOutput {
    /// stdout followed by stderr, for line scanning.
    pub fn combined(&self) -> String {
        let mut text = String::with_capacity(self.stdout.len() + self.stderr.len() + 1);
        text.push_str(&self.stdout);
        if !self.stdout.is_empty() && !self.stdout.ends_with('\n') {
            text.push('\n');
        }
        text.push_str(&self.stderr);
        text
    }
}

/// Run `executable script` and wait for it, capturing both streams as text.
pub fn run_captured(
    executable: &Path,
    script: &Path,
    working_dir: Option<&Path>,
) -> std::io::Result<CapturedOutput> {
    debug!(executable = %executable.display(), script = %script.display(), "invoking engine");

    let mut cmd = Command::new(executable);
    cmd.arg(script)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    if let Some(dir) = working_dir {
        cmd.current_dir(dir);
    }

    let output = cmd.output()?;
    let captured = CapturedOutput {
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        exit_code: output.status.code(),
        success: output.status.success(),
    };
    debug!(exit_code = ?captured.exit_code, "engine exited");
    Ok(captured)
}
