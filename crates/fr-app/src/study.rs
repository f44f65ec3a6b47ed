//! Parameter sweeps over the single-case workflow.

use std::fs;
use std::path::{Path, PathBuf};

use fr_core::{bar_to_pa, celsius_to_kelvin};
use fr_engine::{CaseHandle, HANDLE_FILE_NAME};
use fr_results::{PROFILES_DIR, TRENDS_DIR, case_folder, create_case_folder, save_inputs};
use fr_template::{InputValue, TemplateInputs};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use tracing::{error, info, warn};

use crate::error::{AppError, AppResult};
use crate::pipeline::{CaseReport, CaseRunner};

/// One swept key and the values it takes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepParameter {
    pub key: String,
    pub values: Vec<f64>,
}

impl SweepParameter {
    pub fn new(key: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            key: key.into(),
            values,
        }
    }
}

/// Template input a sweep key writes to, and the value it writes.
///
/// `SOURCE_TEMP` and `WH_TEMP` are given in °C, `WH_PRESS` in bar; other
/// keys are written verbatim under their own name.
pub fn overlay_value(key: &str, value: f64) -> (&str, f64) {
    match key {
        "SOURCE_TEMP" => ("SOURCE_TEMP_K", celsius_to_kelvin(value)),
        "WH_PRESS" => ("WH_PRESS", bar_to_pa(value)),
        "WH_TEMP" => ("WH_TEMP_K", celsius_to_kelvin(value)),
        other => (other, value),
    }
}

/// Base inputs with one combination applied.
pub fn apply_combination(base: &TemplateInputs, keys: &[&str], combination: &[f64]) -> TemplateInputs {
    let mut inputs = base.clone();
    for (key, value) in keys.iter().zip(combination) {
        let (target, converted) = overlay_value(key, *value);
        inputs.insert(target, InputValue::Scalar(converted));
    }
    inputs
}

/// Cartesian product of the value lists. The first parameter varies
/// slowest, the last fastest.
pub fn combinations(parameters: &[SweepParameter]) -> Vec<Vec<f64>> {
    parameters.iter().fold(vec![Vec::new()], |acc, param| {
        acc.iter()
            .flat_map(|prefix| {
                param.values.iter().map(move |v| {
                    let mut combo = prefix.clone();
                    combo.push(*v);
                    combo
                })
            })
            .collect()
    })
}

#[derive(Debug, Clone)]
pub enum CaseOutcome {
    Completed(Box<CaseReport>),
    Failed { error: String },
}

/// One entry per combination, in sweep order.
#[derive(Debug, Clone)]
pub struct CaseResult {
    /// 1-based.
    pub case_index: usize,
    pub folder: PathBuf,
    pub handle: Option<CaseHandle>,
    pub parameters: Vec<(String, f64)>,
    pub outcome: CaseOutcome,
}

impl CaseResult {
    pub fn is_completed(&self) -> bool {
        matches!(self.outcome, CaseOutcome::Completed(_))
    }
}

/// Reported after each case, whatever its outcome.
#[derive(Debug, Clone)]
pub struct StudyProgress<'a> {
    pub case_index: usize,
    pub total: usize,
    pub result: &'a CaseResult,
}

#[derive(Debug, Clone)]
pub struct StudyReport {
    pub root: PathBuf,
    pub cases: Vec<CaseResult>,
    /// Case indices without any trend CSV.
    pub missing_trends: Vec<usize>,
    /// Case indices without any profile CSV.
    pub missing_profiles: Vec<usize>,
}

impl StudyReport {
    pub fn completed(&self) -> usize {
        self.cases.iter().filter(|c| c.is_completed()).count()
    }

    pub fn failed(&self) -> usize {
        self.cases.len() - self.completed()
    }
}

struct VaryingParameters<'a>(&'a [SweepParameter]);

impl Serialize for VaryingParameters<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for param in self.0 {
            map.serialize_entry(&param.key, &param.values)?;
        }
        map.end()
    }
}

#[derive(Serialize)]
struct StudyInputs<'a> {
    mode: &'static str,
    base_inputs: &'a TemplateInputs,
    varying_parameters: VaryingParameters<'a>,
    total_combinations: usize,
    dynamic_time: f64,
}

fn has_csv(dir: &Path) -> bool {
    fs::read_dir(dir)
        .map(|entries| {
            entries
                .flatten()
                .any(|e| e.path().extension().is_some_and(|ext| ext == "csv"))
        })
        .unwrap_or(false)
}

fn recorded_handle(folder: &Path) -> Option<CaseHandle> {
    fs::read_to_string(folder.join(HANDLE_FILE_NAME))
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .map(CaseHandle::new)
}

fn run_sweep_case(
    runner: &mut CaseRunner,
    root: &Path,
    case_index: usize,
    inputs: &TemplateInputs,
) -> AppResult<CaseReport> {
    let folder = create_case_folder(root, case_index)?;
    save_inputs(&folder, inputs)?;
    runner.run_case_in(&folder, inputs, None)
}

type StudyProgressCb<'a> = Option<&'a mut dyn FnMut(StudyProgress<'_>) -> AppResult<()>>;

/// Run every combination of `parameters` over `base` into `case_NNN`
/// folders under `root`.
///
/// A failing case is recorded and the sweep moves on. Errors returned by the
/// progress callback are logged and ignored.
pub fn run_study(
    runner: &mut CaseRunner,
    root: &Path,
    base: &TemplateInputs,
    parameters: &[SweepParameter],
    mut progress_cb: StudyProgressCb<'_>,
) -> AppResult<StudyReport> {
    if parameters.is_empty() {
        return Err(AppError::InvalidInput(
            "a parameter study needs at least one parameter".to_string(),
        ));
    }

    let keys: Vec<&str> = parameters.iter().map(|p| p.key.as_str()).collect();
    let combos = combinations(parameters);
    let total = combos.len();

    save_inputs(
        root,
        &StudyInputs {
            mode: "Parameter Study",
            base_inputs: base,
            varying_parameters: VaryingParameters(parameters),
            total_combinations: total,
            dynamic_time: runner.dynamic_time_s(),
        },
    )?;
    info!(root = %root.display(), total, "starting parameter study");

    let mut cases = Vec::with_capacity(total);
    for (i, combo) in combos.iter().enumerate() {
        let case_index = i + 1;
        let parameters: Vec<(String, f64)> = keys
            .iter()
            .zip(combo)
            .map(|(k, v)| (k.to_string(), *v))
            .collect();
        info!(case_index, total, ?parameters, "running case");

        let inputs = apply_combination(base, &keys, combo);
        let folder = case_folder(root, case_index);
        let outcome = run_sweep_case(runner, root, case_index, &inputs);

        let result = match outcome {
            Ok(report) => CaseResult {
                case_index,
                folder,
                handle: Some(report.handle.clone()),
                parameters,
                outcome: CaseOutcome::Completed(Box::new(report)),
            },
            Err(err) => {
                error!(case_index, error = %err, "case failed");
                CaseResult {
                    case_index,
                    handle: recorded_handle(&folder),
                    folder,
                    parameters,
                    outcome: CaseOutcome::Failed {
                        error: err.to_string(),
                    },
                }
            }
        };

        if let Some(cb) = progress_cb.as_deref_mut() {
            let progress = StudyProgress {
                case_index,
                total,
                result: &result,
            };
            if let Err(err) = cb(progress) {
                warn!(case_index, error = %err, "progress callback failed");
            }
        }
        cases.push(result);
    }

    let missing_trends = cases
        .iter()
        .filter(|c| !has_csv(&c.folder.join(TRENDS_DIR)))
        .map(|c| c.case_index)
        .collect::<Vec<_>>();
    let missing_profiles = cases
        .iter()
        .filter(|c| !has_csv(&c.folder.join(PROFILES_DIR)))
        .map(|c| c.case_index)
        .collect::<Vec<_>>();
    if !missing_trends.is_empty() {
        warn!(cases = ?missing_trends, "no trend CSV files found");
    }
    if !missing_profiles.is_empty() {
        warn!(cases = ?missing_profiles, "no profile CSV files found");
    }

    Ok(StudyReport {
        root: root.to_path_buf(),
        cases,
        missing_trends,
        missing_profiles,
    })
}
