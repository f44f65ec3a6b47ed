//! [`EngineApi`] backed by generated control scripts.
//!
//! Every call writes a short script into the session's working directory,
//! runs the engine executable on it and, for queries, reads back the JSON
//! file the script produced. Both files are removed afterwards.

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, info};

use crate::api::{CaseHandle, EngineApi, EngineConnector, InitEntryPoint};
use crate::launcher::{error_diagnostic, js_path_literal, parse_case_handle};
use crate::process::{CapturedOutput, run_captured};
use crate::records::decode_profile;
use crate::{EngineError, EngineResult};

const CALL_SCRIPT: &str = "fr_engine_call.js";
const CALL_OUTPUT: &str = "fr_engine_call.json";

/// Catalog families exposed by the engine's results extractor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Catalog {
    Trends,
    Profiles,
}

impl Catalog {
    fn all(self) -> &'static str {
        match self {
            Catalog::Trends => "trends",
            Catalog::Profiles => "profiles",
        }
    }

    fn filter(self) -> &'static str {
        match self {
            Catalog::Trends => "filterTrends",
            Catalog::Profiles => "filterProfiles",
        }
    }

    fn extract(self) -> &'static str {
        match self {
            Catalog::Trends => "getTrendValuesForAllTimes",
            Catalog::Profiles => "getProfileValuesForAllTimes",
        }
    }
}

fn js_string(text: &str) -> String {
    Value::String(text.to_string()).to_string()
}

fn case_prelude(case: &CaseHandle) -> String {
    format!("var caseId = {};\n", js_string(case.as_str()))
}

fn validity_script(case: &CaseHandle) -> String {
    let mut s = case_prelude(case);
    s.push_str("var caseObj = ledaModules.CASES().caseobj(caseId);\n");
    s.push_str("if (caseObj.name == \"\") throw(\"ERROR: invalid case id \" + caseId);\n");
    s
}

fn create_case_script(model_path: &Path) -> String {
    format!(
        "var c = ledaModules.CASES().createCaseFrom({});\nprint(\"UUID:\", c.uuid);\n",
        js_path_literal(model_path)
    )
}

fn entry_point_script(case: &CaseHandle, entry: InitEntryPoint) -> String {
    let mut s = case_prelude(case);
    match entry {
        InitEntryPoint::RunSteady => s.push_str("ledaModules.CALCULATE().runSteady(caseId);\n"),
        InitEntryPoint::RunInitialization => {
            s.push_str("ledaModules.CALCULATE().runInitialization(caseId);\n")
        }
        InitEntryPoint::Initialize => {
            s.push_str("ledaModules.CALCULATE().purge(\"KeepFirst\", 1, caseId);\n");
            s.push_str("ledaModules.CALCULATE().calculateSS(caseId);\n");
        }
    }
    s
}

fn advance_script(case: &CaseHandle, seconds: f64) -> String {
    let mut s = case_prelude(case);
    s.push_str("var t = new LedaGeneralCase(caseId);\n");
    s.push_str(&format!("t.mycase.setTimeAdvance({seconds});\n"));
    s.push_str("ledaModules.CALCULATE().calculate(caseId);\n");
    s
}

/// Names in the catalog with consecutive duplicates removed: logger names
/// when `logger` is `None`, otherwise that logger's variable names.
fn catalog_script(case: &CaseHandle, catalog: Catalog, logger: Option<&str>, out: &Path) -> String {
    let mut s = case_prelude(case);
    s.push_str("var extractor = ledaModules.RESULTS().makeExtractor(caseId);\n");
    match logger {
        None => {
            s.push_str(&format!("var filter = extractor.catalog.{};\n", catalog.all()));
            s.push_str("var key = \"loggerName\";\n");
        }
        Some(name) => {
            s.push_str(&format!(
                "var filter = extractor.catalog.{}({{loggerName: [{}]}}, true);\n",
                catalog.filter(),
                js_string(name)
            ));
            s.push_str("var key = \"displayName\";\n");
        }
    }
    s.push_str(
        "var previous = \"\";\n\
         var names = [];\n\
         for (var j = 0; j < filter.length; j++) {\n\
         \x20 if (filter[j][key] != previous) {\n\
         \x20   names.push(filter[j][key]);\n\
         \x20   previous = filter[j][key];\n\
         \x20 }\n\
         }\n",
    );
    s.push_str(&format!(
        "ledaModules.FILE().writeJsonfileFromObject(names, {});\n",
        js_path_literal(out)
    ));
    s
}

fn series_script(
    case: &CaseHandle,
    catalog: Catalog,
    logger: &str,
    variable: &str,
    out: &Path,
) -> String {
    let mut s = case_prelude(case);
    s.push_str("var extractor = ledaModules.RESULTS().makeExtractor(caseId);\n");
    s.push_str(&format!(
        "var filter = extractor.catalog.{}({{loggerName: [{}], displayName: [{}]}}, true);\n",
        catalog.filter(),
        js_string(logger),
        js_string(variable)
    ));
    s.push_str("if (filter.length > 0) {\n");
    s.push_str(&format!(
        "  var series = extractor.{}(filter[0]);\n",
        catalog.extract()
    ));
    s.push_str(&format!(
        "  ledaModules.FILE().writeJsonfileFromObject(series, {});\n",
        js_path_literal(out)
    ));
    s.push_str("} else {\n");
    s.push_str("  throw(\"ERROR: invalid logger or variable name.\");\n");
    s.push_str("}\n");
    s
}

/// One engine session driven through control scripts.
pub struct ScriptEngine {
    executable: PathBuf,
    work_dir: PathBuf,
    entry_points: Vec<InitEntryPoint>,
    case: Option<CaseHandle>,
}

impl ScriptEngine {
    /// `entry_points` lists the initialization entry points the installed
    /// engine version exposes.
    pub fn new(
        executable: impl Into<PathBuf>,
        work_dir: impl Into<PathBuf>,
        entry_points: Vec<InitEntryPoint>,
    ) -> Self {
        Self {
            executable: executable.into(),
            work_dir: work_dir.into(),
            entry_points,
            case: None,
        }
    }

    /// Currently selected case.
    pub fn case(&self) -> Option<&CaseHandle> {
        self.case.as_ref()
    }

    fn selected(&self) -> EngineResult<CaseHandle> {
        self.case.clone().ok_or(EngineError::NoCaseSelected)
    }

    fn output_path(&self) -> PathBuf {
        self.work_dir.join(CALL_OUTPUT)
    }

    fn run_script(&self, operation: &str, body: &str) -> EngineResult<CapturedOutput> {
        std::fs::create_dir_all(&self.work_dir)?;
        let script = self.work_dir.join(CALL_SCRIPT);
        std::fs::write(&script, body)?;

        debug!(operation, "running engine script");
        let result = run_captured(&self.executable, &script, Some(&self.work_dir));
        let _ = std::fs::remove_file(&script);

        let output = result.map_err(|source| EngineError::Spawn {
            executable: self.executable.clone(),
            source,
        })?;
        if !output.success {
            let diagnostic = error_diagnostic(&output.stdout, &output.stderr)
                .unwrap_or_else(|| output.stderr.trim().to_string());
            return Err(EngineError::Script {
                operation: operation.to_string(),
                exit_code: output.exit_code,
                diagnostic,
            });
        }
        Ok(output)
    }

    fn query(&self, operation: &str, body: &str) -> EngineResult<Value> {
        let out = self.output_path();
        let _ = std::fs::remove_file(&out);
        self.run_script(operation, body)?;

        let text = std::fs::read_to_string(&out).map_err(|err| EngineError::Call {
            operation: operation.to_string(),
            message: format!("no output at {}: {err}", out.display()),
        })?;
        let _ = std::fs::remove_file(&out);
        Ok(serde_json::from_str(&text)?)
    }

    fn names(&self, operation: &str, catalog: Catalog, logger: Option<&str>) -> EngineResult<Vec<String>> {
        let case = self.selected()?;
        let body = catalog_script(&case, catalog, logger, &self.output_path());
        match self.query(operation, &body)? {
            Value::Null => Ok(Vec::new()),
            other => Ok(serde_json::from_value(other)?),
        }
    }
}

impl EngineApi for ScriptEngine {
    fn select_case(&mut self, handle: &CaseHandle) -> EngineResult<()> {
        self.run_script("select_case", &validity_script(handle))?;
        self.case = Some(handle.clone());
        Ok(())
    }

    fn reload_model(&mut self, model_path: &Path) -> EngineResult<()> {
        let resolved = std::fs::canonicalize(model_path)?;
        let output = self.run_script("reload_model", &create_case_script(&resolved))?;
        let handle = parse_case_handle(&output.combined()).ok_or_else(|| EngineError::Call {
            operation: "reload_model".to_string(),
            message: format!("no case handle reported for {}", resolved.display()),
        })?;
        info!(%handle, model = %resolved.display(), "model reloaded");
        self.select_case(&handle)
    }

    fn has_entry_point(&self, entry: InitEntryPoint) -> bool {
        self.entry_points.contains(&entry)
    }

    fn run_entry_point(&mut self, entry: InitEntryPoint) -> EngineResult<()> {
        if !self.has_entry_point(entry) {
            return Err(EngineError::UnsupportedEntryPoint { name: entry.name() });
        }
        let case = self.selected()?;
        self.run_script(entry.name(), &entry_point_script(&case, entry))?;
        Ok(())
    }

    fn advance(&mut self, seconds: f64) -> EngineResult<()> {
        let case = self.selected()?;
        self.run_script("advance", &advance_script(&case, seconds))?;
        Ok(())
    }

    fn list_trend_loggers(&mut self) -> EngineResult<Vec<String>> {
        self.names("list_trend_loggers", Catalog::Trends, None)
    }

    fn list_trend_variables(&mut self, logger: &str) -> EngineResult<Vec<String>> {
        self.names("list_trend_variables", Catalog::Trends, Some(logger))
    }

    fn list_profile_loggers(&mut self) -> EngineResult<Vec<String>> {
        self.names("list_profile_loggers", Catalog::Profiles, None)
    }

    fn list_profile_variables(&mut self, logger: &str) -> EngineResult<Vec<String>> {
        self.names("list_profile_variables", Catalog::Profiles, Some(logger))
    }

    fn trend_series(&mut self, logger: &str, variable: &str) -> EngineResult<Value> {
        let case = self.selected()?;
        let body = series_script(&case, Catalog::Trends, logger, variable, &self.output_path());
        self.query("trend_series", &body)
    }

    fn profile_series(&mut self, logger: &str, variable: &str, all_times: bool) -> EngineResult<Value> {
        let case = self.selected()?;
        let body = series_script(&case, Catalog::Profiles, logger, variable, &self.output_path());
        let raw = self.query("profile_series", &body)?;
        if all_times {
            return Ok(raw);
        }
        match decode_profile(&raw)?.last() {
            Some(snapshot) => Ok(serde_json::to_value(snapshot)?),
            None => Ok(raw),
        }
    }
}

/// Opens a new [`ScriptEngine`] session per call.
#[derive(Debug, Clone)]
pub struct ScriptConnector {
    executable: PathBuf,
    work_dir: PathBuf,
    entry_points: Vec<InitEntryPoint>,
}

impl ScriptConnector {
    pub fn new(
        executable: impl Into<PathBuf>,
        work_dir: impl Into<PathBuf>,
        entry_points: Vec<InitEntryPoint>,
    ) -> Self {
        Self {
            executable: executable.into(),
            work_dir: work_dir.into(),
            entry_points,
        }
    }

    /// A session that is not behind the trait object.
    pub fn session(&self) -> ScriptEngine {
        ScriptEngine::new(&self.executable, &self.work_dir, self.entry_points.clone())
    }
}

impl EngineConnector for ScriptConnector {
    fn connect(&self) -> EngineResult<Box<dyn EngineApi>> {
        Ok(Box::new(self.session()))
    }
}
