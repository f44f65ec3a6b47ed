//! Runner configuration loaded from YAML.

use std::path::{Path, PathBuf};

use fr_engine::InitEntryPoint;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::inputs::CaseInputs;
use crate::study::SweepParameter;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Engine launcher, invoked as `<executable> <script>`.
    pub executable: PathBuf,
    /// Initialization entry points the installed engine version exposes.
    #[serde(default = "default_entry_points")]
    pub init_entry_points: Vec<InitEntryPoint>,
    /// Scratch directory for engine call scripts.
    #[serde(default)]
    pub work_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StudyConfig {
    #[serde(default)]
    pub parameters: Vec<SweepParameter>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunnerConfig {
    pub engine: EngineConfig,
    pub template: PathBuf,
    #[serde(default = "default_results_dir")]
    pub results_dir: PathBuf,
    #[serde(default = "default_dynamic_time")]
    pub dynamic_time_s: f64,
    #[serde(default)]
    pub case: CaseInputs,
    #[serde(default)]
    pub study: StudyConfig,
}

fn default_entry_points() -> Vec<InitEntryPoint> {
    vec![InitEntryPoint::Initialize]
}

fn default_results_dir() -> PathBuf {
    PathBuf::from("runs")
}

fn default_dynamic_time() -> f64 {
    3600.0
}

fn resolve(base: &Path, path: &mut PathBuf) {
    if path.is_relative() {
        *path = base.join(&*path);
    }
}

impl RunnerConfig {
    /// Scratch directory for engine call scripts.
    pub fn engine_work_dir(&self) -> PathBuf {
        self.engine
            .work_dir
            .clone()
            .unwrap_or_else(|| self.results_dir.join(".engine"))
    }

    fn validate(&self) -> Result<(), String> {
        if !(self.dynamic_time_s.is_finite() && self.dynamic_time_s > 0.0) {
            return Err(format!(
                "dynamic_time_s must be positive, got {}",
                self.dynamic_time_s
            ));
        }
        if self.engine.init_entry_points.is_empty() {
            return Err("engine.init_entry_points must not be empty".to_string());
        }
        for param in &self.study.parameters {
            if param.values.is_empty() {
                return Err(format!("study parameter '{}' has no values", param.key));
            }
        }
        Ok(())
    }
}

/// Parse a config from YAML text. Relative paths are resolved against
/// `base_dir`; an executable given as a bare name is left for `PATH` lookup.
pub fn parse_config(text: &str, base_dir: &Path, origin: &Path) -> AppResult<RunnerConfig> {
    let mut config: RunnerConfig = serde_yaml::from_str(text).map_err(|e| AppError::Config {
        path: origin.to_path_buf(),
        message: e.to_string(),
    })?;

    config.validate().map_err(|message| AppError::Config {
        path: origin.to_path_buf(),
        message,
    })?;

    resolve(base_dir, &mut config.template);
    resolve(base_dir, &mut config.results_dir);
    if config.engine.executable.components().count() > 1 {
        resolve(base_dir, &mut config.engine.executable);
    }
    if let Some(dir) = config.engine.work_dir.as_mut() {
        resolve(base_dir, dir);
    }
    Ok(config)
}

/// Load a config file.
pub fn load_config(path: &Path) -> AppResult<RunnerConfig> {
    let text = std::fs::read_to_string(path).map_err(|source| AppError::ConfigRead {
        path: path.to_path_buf(),
        source,
    })?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    parse_config(&text, base_dir, path)
}
