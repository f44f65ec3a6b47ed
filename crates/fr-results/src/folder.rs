//! Result folder layout.
//!
//! ```text
//! <base>/<DD_MM_YY>/run_<HH_MM>[_n]/
//!     inputs.json
//!     model.qs
//!     trends/<logger>.csv
//!     profiles/<logger>.csv
//!     case_001/ ...            (parameter sweeps)
//! ```

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use serde::Serialize;
use tracing::debug;

use crate::{ResultsError, ResultsResult};

pub const INPUTS_FILE: &str = "inputs.json";
pub const TRENDS_DIR: &str = "trends";
pub const PROFILES_DIR: &str = "profiles";
pub const TRENDS_ERROR_FILE: &str = "export_trends_error.txt";
pub const PROFILES_ERROR_FILE: &str = "export_profiles_error.txt";

/// Logger name usable as a single path component; `/` and `\` become `_`.
pub fn logger_file_stem(logger: &str) -> String {
    logger
        .chars()
        .map(|c| if matches!(c, '/' | '\\') { '_' } else { c })
        .collect()
}

/// Sidecar for a failed export of a single profile logger.
pub fn profile_logger_error_file(logger: &str) -> String {
    format!("export_profiles_error_{}.txt", logger_file_stem(logger))
}

fn create_dirs(path: &Path) -> ResultsResult<()> {
    fs::create_dir_all(path).map_err(|source| ResultsError::CreateDir {
        path: path.to_path_buf(),
        source,
    })
}

/// Create a fresh timestamped run folder under `base`.
///
/// When `run_<HH_MM>` already exists (two runs in the same minute) a
/// numeric suffix is appended; an existing folder is never reused.
pub fn create_result_folder(base: &Path, now: &DateTime<Local>) -> ResultsResult<PathBuf> {
    let day_dir = base.join(now.format("%d_%m_%y").to_string());
    create_dirs(&day_dir)?;

    let stem = format!("run_{}", now.format("%H_%M"));
    let mut n = 1u32;
    loop {
        let name = if n == 1 {
            stem.clone()
        } else {
            format!("{stem}_{n}")
        };
        let candidate = day_dir.join(name);
        match fs::create_dir(&candidate) {
            Ok(()) => {
                debug!(path = %candidate.display(), "created result folder");
                return Ok(candidate);
            }
            Err(err) if err.kind() == ErrorKind::AlreadyExists => n += 1,
            Err(source) => {
                return Err(ResultsError::CreateDir {
                    path: candidate,
                    source,
                });
            }
        }
    }
}

/// `case_NNN` folder for the 1-based `index` under a sweep root.
pub fn case_folder(root: &Path, index: usize) -> PathBuf {
    root.join(format!("case_{index:03}"))
}

pub fn create_case_folder(root: &Path, index: usize) -> ResultsResult<PathBuf> {
    let folder = case_folder(root, index);
    create_dirs(&folder)?;
    Ok(folder)
}

/// Write `inputs` as `inputs.json` with 4-space indentation.
pub fn save_inputs<T: Serialize + ?Sized>(folder: &Path, inputs: &T) -> ResultsResult<PathBuf> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    inputs.serialize(&mut ser)?;

    let path = folder.join(INPUTS_FILE);
    fs::write(&path, buf)?;
    Ok(path)
}

/// Record an export failure next to the results it would have produced.
pub fn write_error_sidecar(folder: &Path, file_name: &str, message: &str) -> ResultsResult<PathBuf> {
    let path = folder.join(file_name);
    fs::write(&path, message)?;
    Ok(path)
}
