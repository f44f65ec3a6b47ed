//! Single-case workflow.
//!
//! Stages run strictly in order and stop at the first failure up to and
//! including the time advance. The two export stages are isolated: a failure
//! is written to a sidecar file and logged, and the case still completes.

use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::{DateTime, Local};
use fr_engine::{
    CaseHandle, CaseLauncher, EngineApi, EngineConnector, InitEntryPoint, ProcessLauncher,
    ScriptConnector, initialize_case,
};
use fr_results::{
    PROFILES_DIR, PROFILES_ERROR_FILE, TRENDS_DIR, TRENDS_ERROR_FILE, create_result_folder,
    profile_logger_error_file, save_inputs, write_error_sidecar,
};
use fr_template::{Advisory, TemplateInputs, generate_model_from_template};
use tracing::{error, info, warn};

use crate::config::RunnerConfig;
use crate::error::AppResult;
use crate::export::{ExportReport, export_all_trends, export_profile_logger};

/// Generated model file inside a case folder.
pub const MODEL_FILE: &str = "model.qs";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseStage {
    CreateFolder,
    BuildModel,
    Launch,
    SelectHandle,
    ReloadModel,
    Initialize,
    AdvanceTime,
    ExportTrends,
    ExportProfiles,
    Done,
}

#[derive(Debug, Clone)]
pub struct CaseProgressEvent {
    pub stage: CaseStage,
    pub elapsed_wall_s: f64,
    pub message: Option<String>,
}

/// Outcome of one isolated export stage.
#[derive(Debug, Clone, PartialEq)]
pub enum ExportStatus {
    Exported(ExportReport),
    /// The stage failed as a whole; the sidecar file holds the message.
    Failed { sidecar: PathBuf, message: String },
}

impl ExportStatus {
    pub fn is_failed(&self) -> bool {
        matches!(self, ExportStatus::Failed { .. })
    }
}

/// A case that reached the end of the workflow, possibly with partial exports.
#[derive(Debug, Clone)]
pub struct CaseReport {
    pub folder: PathBuf,
    pub model_path: PathBuf,
    pub handle: CaseHandle,
    pub entry_point: InitEntryPoint,
    pub trends: ExportStatus,
    pub profiles: ExportStatus,
    /// Profile loggers whose export failed, with their sidecar files.
    pub failed_profile_loggers: Vec<(String, PathBuf)>,
}

type ProgressCb<'a> = Option<&'a mut dyn FnMut(CaseProgressEvent)>;

fn emit_progress(progress_cb: &mut ProgressCb<'_>, stage: CaseStage, started: Instant, message: Option<String>) {
    if let Some(cb) = progress_cb.as_deref_mut() {
        cb(CaseProgressEvent {
            stage,
            elapsed_wall_s: started.elapsed().as_secs_f64(),
            message,
        });
    }
}

fn record_failure(folder: &Path, file_name: &str, message: &str) -> PathBuf {
    match write_error_sidecar(folder, file_name, message) {
        Ok(path) => path,
        Err(err) => {
            warn!(folder = %folder.display(), file_name, error = %err, "could not write error sidecar");
            folder.join(file_name)
        }
    }
}

/// Drives cases through launch, engine session and export.
pub struct CaseRunner {
    launcher: Box<dyn CaseLauncher>,
    connector: Box<dyn EngineConnector>,
    template: PathBuf,
    dynamic_time_s: f64,
}

impl CaseRunner {
    pub fn new(
        launcher: Box<dyn CaseLauncher>,
        connector: Box<dyn EngineConnector>,
        template: impl Into<PathBuf>,
        dynamic_time_s: f64,
    ) -> Self {
        Self {
            launcher,
            connector,
            template: template.into(),
            dynamic_time_s,
        }
    }

    /// Runner backed by the real engine executable.
    pub fn from_config(config: &RunnerConfig) -> Self {
        let connector = ScriptConnector::new(
            &config.engine.executable,
            config.engine_work_dir(),
            config.engine.init_entry_points.clone(),
        );
        let launcher = ProcessLauncher::new(&config.engine.executable, Box::new(connector.clone()));
        Self::new(
            Box::new(launcher),
            Box::new(connector),
            &config.template,
            config.dynamic_time_s,
        )
    }

    pub fn template(&self) -> &Path {
        &self.template
    }

    pub fn dynamic_time_s(&self) -> f64 {
        self.dynamic_time_s
    }

    /// Run one case in a fresh timestamped folder under `results_dir`.
    pub fn run_case(
        &mut self,
        results_dir: &Path,
        inputs: &TemplateInputs,
        now: &DateTime<Local>,
        mut progress_cb: ProgressCb<'_>,
    ) -> AppResult<CaseReport> {
        let started = Instant::now();
        emit_progress(&mut progress_cb, CaseStage::CreateFolder, started, None);
        let folder = create_result_folder(results_dir, now)?;
        info!(folder = %folder.display(), "created result folder");
        save_inputs(&folder, inputs)?;
        self.run_case_in(&folder, inputs, progress_cb)
    }

    /// Run one case in an existing folder.
    pub fn run_case_in(
        &mut self,
        folder: &Path,
        inputs: &TemplateInputs,
        mut progress_cb: ProgressCb<'_>,
    ) -> AppResult<CaseReport> {
        let started = Instant::now();

        emit_progress(&mut progress_cb, CaseStage::BuildModel, started, None);
        let model_path = generate_model_from_template(&self.template, &folder.join(MODEL_FILE), inputs)?;
        info!(model = %model_path.display(), "model generated");

        emit_progress(&mut progress_cb, CaseStage::Launch, started, None);
        let handle = self.launcher.launch(&model_path, folder)?;
        info!(%handle, "case launched");

        emit_progress(&mut progress_cb, CaseStage::SelectHandle, started, Some(handle.to_string()));
        let mut engine = self.connector.connect()?;
        engine.select_case(&handle)?;

        emit_progress(&mut progress_cb, CaseStage::ReloadModel, started, None);
        engine.reload_model(&model_path)?;

        emit_progress(&mut progress_cb, CaseStage::Initialize, started, None);
        let entry_point = initialize_case(engine.as_mut())?;
        info!(entry_point = entry_point.name(), "initialization complete");

        emit_progress(
            &mut progress_cb,
            CaseStage::AdvanceTime,
            started,
            Some(format!("{} s", self.dynamic_time_s)),
        );
        engine.advance(self.dynamic_time_s)?;
        info!(seconds = self.dynamic_time_s, "dynamic simulation complete");

        emit_progress(&mut progress_cb, CaseStage::ExportTrends, started, None);
        let trends = export_trends_step(engine.as_mut(), folder);

        emit_progress(&mut progress_cb, CaseStage::ExportProfiles, started, None);
        let (profiles, failed_profile_loggers) = export_profiles_step(engine.as_mut(), folder);

        emit_progress(&mut progress_cb, CaseStage::Done, started, None);
        Ok(CaseReport {
            folder: folder.to_path_buf(),
            model_path,
            handle,
            entry_point,
            trends,
            profiles,
            failed_profile_loggers,
        })
    }
}

fn export_trends_step(engine: &mut dyn EngineApi, folder: &Path) -> ExportStatus {
    match export_all_trends(engine, &folder.join(TRENDS_DIR)) {
        Ok(report) => ExportStatus::Exported(report),
        Err(err) => {
            let message = err.to_string();
            error!(error = %message, "failed to export trends");
            let sidecar = record_failure(folder, TRENDS_ERROR_FILE, &message);
            ExportStatus::Failed { sidecar, message }
        }
    }
}

fn export_profiles_step(
    engine: &mut dyn EngineApi,
    folder: &Path,
) -> (ExportStatus, Vec<(String, PathBuf)>) {
    let loggers = match engine.list_profile_loggers() {
        Ok(loggers) => loggers,
        Err(err) => {
            let message = err.to_string();
            error!(error = %message, "failed to list profile loggers");
            let sidecar = record_failure(folder, PROFILES_ERROR_FILE, &message);
            return (ExportStatus::Failed { sidecar, message }, Vec::new());
        }
    };

    let output_dir = folder.join(PROFILES_DIR);
    let mut report = ExportReport::default();
    let mut failed = Vec::new();
    for logger in &loggers {
        match export_profile_logger(engine, &output_dir, logger, &mut report) {
            Ok(file) => report.files.push(file),
            Err(err) => {
                let message = err.to_string();
                error!(%logger, error = %message, "failed to export profile logger");
                let sidecar = record_failure(folder, &profile_logger_error_file(logger), &message);
                report.failed_loggers.push((logger.clone(), message));
                failed.push((logger.clone(), sidecar));
            }
        }
    }
    (ExportStatus::Exported(report), failed)
}

/// Generate the model for the configured case without running it.
pub fn render_case_model(config: &RunnerConfig, output: &Path) -> AppResult<(PathBuf, Vec<Advisory>)> {
    let converted = config.case.to_template_inputs()?;
    let path = generate_model_from_template(&config.template, output, &converted.inputs)?;
    Ok((path, converted.advisories))
}
