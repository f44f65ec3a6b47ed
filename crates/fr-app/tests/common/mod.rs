#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use fr_app::CaseRunner;
use fr_engine::{
    CaseHandle, CaseLauncher, EngineApi, EngineConnector, EngineError, EngineResult,
    InitEntryPoint, LaunchError, LaunchResult, persist_handle,
};
use fr_template::TemplateInputs;
use serde_json::{Value, json};

pub const TEMPLATE: &str = "\
BC2.time = {SOURCE_TIME}
BC2.massFlowrate = {SOURCE_MFR}
BC2.temperature = {SOURCE_TEMP_K}
VALVE1.time = {VALVE_TIME}
VALVE1.opening = {VALVE_OPENING}
BC1.time = {WH_TIME}
BC1.pressure = {WH_PRESS}
BC1.temperature = {WH_TEMP_K}
";

pub fn base_inputs() -> TemplateInputs {
    TemplateInputs::new()
        .with("SOURCE_TIME", vec![0.0])
        .with("SOURCE_MFR", 110.0)
        .with("SOURCE_TEMP_K", 313.15)
        .with("VALVE_TIME", vec![0.0])
        .with("VALVE_OPENING", 0.22)
        .with("WH_TIME", vec![0.0])
        .with("WH_PRESS", 8.0e6)
        .with("WH_TEMP_K", 277.15)
}

/// What the fake engine knows and what it was asked to do.
pub struct EngineState {
    pub entry_points: Vec<InitEntryPoint>,
    pub trend_loggers: Result<Vec<String>, String>,
    pub trend_variables: BTreeMap<String, Vec<String>>,
    pub trends: BTreeMap<(String, String), Value>,
    pub profile_loggers: Result<Vec<String>, String>,
    pub profile_variables: BTreeMap<String, Vec<String>>,
    pub profiles: BTreeMap<(String, String), Value>,

    pub selected: Vec<CaseHandle>,
    pub reloaded: Vec<PathBuf>,
    pub ran: Vec<InitEntryPoint>,
    pub advanced: Vec<f64>,
}

fn key(logger: &str, variable: &str) -> (String, String) {
    (logger.to_string(), variable.to_string())
}

fn names(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl EngineState {
    /// One trend logger with mixed payload shapes and a broken variable,
    /// plus one profile logger.
    pub fn typical() -> Self {
        let mut trend_variables = BTreeMap::new();
        trend_variables.insert("Global".into(), names(&["Time step"]));
        trend_variables.insert("Node 1".into(), names(&["Pressure", "Temperature", "Holdup"]));

        let mut trends = BTreeMap::new();
        trends.insert(key("Global", "Time step"), json!({"time": [0.0], "value": [0.1]}));
        trends.insert(
            key("Node 1", "Pressure"),
            json!({"time": [0.0, 10.0, 20.0], "value": [1.0, 2.0, 3.0]}),
        );
        trends.insert(
            key("Node 1", "Temperature"),
            json!({"values": [
                {"time": 0.0, "valueForGivenTime": 20.0},
                {"time": 5.0, "valueForGivenTime": 21.0}
            ]}),
        );

        let mut profile_variables = BTreeMap::new();
        profile_variables.insert("Pipe 1".into(), names(&["Pressure", "Volume fraction"]));

        let mut profiles = BTreeMap::new();
        profiles.insert(
            key("Pipe 1", "Pressure"),
            json!({
                "property": "Pressure",
                "mesh": [0.0, 50.0],
                "values": [
                    {"time": 0.0, "valueForGivenTime": [1.0, 2.0]},
                    {"time": 10.0, "valueForGivenTime": [3.0, 4.0]}
                ]
            }),
        );
        profiles.insert(
            key("Pipe 1", "Volume fraction"),
            json!({
                "mesh": [0.0, 50.0],
                "values": [{"time": 10.0, "valueForGivenTime": [0.1, 0.2]}]
            }),
        );

        Self {
            entry_points: vec![InitEntryPoint::RunSteady, InitEntryPoint::Initialize],
            trend_loggers: Ok(names(&["Global", "Node 1"])),
            trend_variables,
            trends,
            profile_loggers: Ok(names(&["Pipe 1"])),
            profile_variables,
            profiles,
            selected: Vec::new(),
            reloaded: Vec::new(),
            ran: Vec::new(),
            advanced: Vec::new(),
        }
    }
}

pub type SharedState = Rc<RefCell<EngineState>>;

fn call_error(operation: &str, message: impl Into<String>) -> EngineError {
    EngineError::Call {
        operation: operation.to_string(),
        message: message.into(),
    }
}

pub struct FakeEngine(SharedState);

impl EngineApi for FakeEngine {
    fn select_case(&mut self, handle: &CaseHandle) -> EngineResult<()> {
        self.0.borrow_mut().selected.push(handle.clone());
        Ok(())
    }

    fn reload_model(&mut self, model_path: &Path) -> EngineResult<()> {
        self.0.borrow_mut().reloaded.push(model_path.to_path_buf());
        Ok(())
    }

    fn has_entry_point(&self, entry: InitEntryPoint) -> bool {
        self.0.borrow().entry_points.contains(&entry)
    }

    fn run_entry_point(&mut self, entry: InitEntryPoint) -> EngineResult<()> {
        self.0.borrow_mut().ran.push(entry);
        Ok(())
    }

    fn advance(&mut self, seconds: f64) -> EngineResult<()> {
        self.0.borrow_mut().advanced.push(seconds);
        Ok(())
    }

    fn list_trend_loggers(&mut self) -> EngineResult<Vec<String>> {
        self.0
            .borrow()
            .trend_loggers
            .clone()
            .map_err(|m| call_error("list_trend_loggers", m))
    }

    fn list_trend_variables(&mut self, logger: &str) -> EngineResult<Vec<String>> {
        self.0
            .borrow()
            .trend_variables
            .get(logger)
            .cloned()
            .ok_or_else(|| call_error("list_trend_variables", format!("no logger {logger}")))
    }

    fn list_profile_loggers(&mut self) -> EngineResult<Vec<String>> {
        self.0
            .borrow()
            .profile_loggers
            .clone()
            .map_err(|m| call_error("list_profile_loggers", m))
    }

    fn list_profile_variables(&mut self, logger: &str) -> EngineResult<Vec<String>> {
        self.0
            .borrow()
            .profile_variables
            .get(logger)
            .cloned()
            .ok_or_else(|| call_error("list_profile_variables", format!("no logger {logger}")))
    }

    fn trend_series(&mut self, logger: &str, variable: &str) -> EngineResult<Value> {
        self.0
            .borrow()
            .trends
            .get(&key(logger, variable))
            .cloned()
            .ok_or_else(|| call_error("trend_series", format!("no series {logger}/{variable}")))
    }

    fn profile_series(&mut self, logger: &str, variable: &str, _all_times: bool) -> EngineResult<Value> {
        self.0
            .borrow()
            .profiles
            .get(&key(logger, variable))
            .cloned()
            .ok_or_else(|| call_error("profile_series", format!("no series {logger}/{variable}")))
    }
}

pub struct FakeConnector(pub SharedState);

impl EngineConnector for FakeConnector {
    fn connect(&self) -> EngineResult<Box<dyn EngineApi>> {
        Ok(Box::new(FakeEngine(self.0.clone())))
    }
}

/// Mints a fresh handle per model, or rejects models containing `reject`.
pub struct FakeLauncher {
    pub reject: Option<String>,
    pub launched: Rc<RefCell<Vec<PathBuf>>>,
}

impl CaseLauncher for FakeLauncher {
    fn launch(&mut self, model_path: &Path, result_folder: &Path) -> LaunchResult<CaseHandle> {
        self.launched.borrow_mut().push(model_path.to_path_buf());
        let text = std::fs::read_to_string(model_path).map_err(|source| LaunchError::Script {
            path: model_path.to_path_buf(),
            source,
        })?;
        if let Some(marker) = &self.reject
            && text.contains(marker.as_str())
        {
            return Err(LaunchError::LaunchFailed {
                exit_code: Some(1),
                diagnostic: Some("ERROR: model rejected".to_string()),
                stdout: "ERROR: model rejected".to_string(),
                stderr: String::new(),
            });
        }
        let handle = CaseHandle::new(uuid::Uuid::new_v4().to_string());
        persist_handle(result_folder, &handle);
        Ok(handle)
    }
}

pub struct Fixture {
    pub dir: tempfile::TempDir,
    pub state: SharedState,
    pub launched: Rc<RefCell<Vec<PathBuf>>>,
}

impl Fixture {
    pub fn new(state: EngineState) -> Self {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("template.qs"), TEMPLATE).unwrap();
        Self {
            dir,
            state: Rc::new(RefCell::new(state)),
            launched: Rc::new(RefCell::new(Vec::new())),
        }
    }

    pub fn runner(&self, reject: Option<&str>) -> CaseRunner {
        let launcher = FakeLauncher {
            reject: reject.map(str::to_string),
            launched: self.launched.clone(),
        };
        CaseRunner::new(
            Box::new(launcher),
            Box::new(FakeConnector(self.state.clone())),
            self.dir.path().join("template.qs"),
            3600.0,
        )
    }

    pub fn results_dir(&self) -> PathBuf {
        self.dir.path().join("runs")
    }
}

pub fn read_lines(path: &Path) -> Vec<String> {
    std::fs::read_to_string(path)
        .unwrap_or_else(|e| panic!("reading {}: {e}", path.display()))
        .lines()
        .map(str::to_string)
        .collect()
}
