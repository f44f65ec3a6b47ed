//! Application service layer for flowrunner.
//!
//! Turns a runner configuration into generated models, engine runs and
//! exported result tables, for a single case or a parameter sweep.

pub mod config;
pub mod error;
pub mod export;
pub mod inputs;
pub mod pipeline;
pub mod study;

pub use config::{EngineConfig, RunnerConfig, StudyConfig, load_config, parse_config};
pub use error::{AppError, AppResult};
pub use export::{
    ExportReport, GLOBAL_LOGGER, LoggerExport, SkippedVariable, export_all_trends,
    export_profile_logger, export_trend_logger, fetch_last_profile, logger_file_name,
};
pub use inputs::{CaseInputs, ConvertedInputs, SourceInputs, UserValue, ValveInputs, WellheadInputs};
pub use pipeline::{
    CaseProgressEvent, CaseReport, CaseRunner, CaseStage, ExportStatus, MODEL_FILE,
    render_case_model,
};
pub use study::{
    CaseOutcome, CaseResult, StudyProgress, StudyReport, SweepParameter, apply_combination,
    combinations, overlay_value, run_study,
};
