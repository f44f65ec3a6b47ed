mod common;

use chrono::{Local, TimeZone};
use common::*;
use fr_app::*;
use fr_engine::{EngineError, HANDLE_FILE_NAME, InitEntryPoint};
use fr_template::find_placeholders;

fn now() -> chrono::DateTime<Local> {
    Local.with_ymd_and_hms(2025, 11, 3, 14, 7, 0).unwrap()
}

#[test]
fn case_runs_every_stage_and_exports_tables() {
    let fx = Fixture::new(EngineState::typical());
    let mut runner = fx.runner(None);

    let mut stages = Vec::new();
    let mut on_progress = |e: CaseProgressEvent| stages.push(e.stage);
    let report = runner
        .run_case(&fx.results_dir(), &base_inputs(), &now(), Some(&mut on_progress))
        .unwrap();

    assert_eq!(
        stages,
        vec![
            CaseStage::CreateFolder,
            CaseStage::BuildModel,
            CaseStage::Launch,
            CaseStage::SelectHandle,
            CaseStage::ReloadModel,
            CaseStage::Initialize,
            CaseStage::AdvanceTime,
            CaseStage::ExportTrends,
            CaseStage::ExportProfiles,
            CaseStage::Done,
        ]
    );

    let folder = fx.results_dir().join("03_11_25").join("run_14_07");
    assert_eq!(report.folder, folder);
    assert!(folder.join("inputs.json").is_file());
    let model = std::fs::read_to_string(folder.join(MODEL_FILE)).unwrap();
    assert!(find_placeholders(&model).is_empty());
    assert!(model.contains("BC1.pressure = [8000000]"));
    let persisted = std::fs::read_to_string(folder.join(HANDLE_FILE_NAME)).unwrap();
    assert_eq!(persisted, report.handle.as_str());

    {
        let state = fx.state.borrow();
        assert_eq!(state.selected, vec![report.handle.clone()]);
        assert_eq!(state.reloaded, vec![report.model_path.clone()]);
        assert_eq!(state.ran, vec![InitEntryPoint::RunSteady]);
        assert_eq!(state.advanced, vec![3600.0]);
    }
    assert_eq!(report.entry_point, InitEntryPoint::RunSteady);

    assert!(!folder.join("trends").join("Global.csv").exists());
    assert_eq!(
        read_lines(&folder.join("trends").join("Node 1.csv")),
        vec![
            "time,Pressure,Temperature,Holdup",
            "[s],[Pa],[C],[?]",
            "0,1,20,",
            "5,,21,",
            "10,2,,",
            "20,3,,",
        ]
    );
    match &report.trends {
        ExportStatus::Exported(r) => {
            assert_eq!(r.files.len(), 1);
            assert_eq!(r.skipped_variables.len(), 1);
            assert_eq!(r.skipped_variables[0].variable, "Holdup");
        }
        other => panic!("trend export failed: {other:?}"),
    }

    assert_eq!(
        read_lines(&folder.join("profiles").join("Pipe 1.csv")),
        vec![
            "time,position,Pressure,Volume fraction",
            "[s],[m],[Pa],[-]",
            "0,0,1,",
            "0,50,2,",
            "10,0,3,0.1",
            "10,50,4,0.2",
        ]
    );
    assert!(report.failed_profile_loggers.is_empty());
}

#[test]
fn trend_listing_failure_is_recorded_and_case_completes() {
    let mut state = EngineState::typical();
    state.trend_loggers = Err("results database locked".to_string());
    let fx = Fixture::new(state);
    let mut runner = fx.runner(None);

    let report = runner
        .run_case(&fx.results_dir(), &base_inputs(), &now(), None)
        .unwrap();

    match &report.trends {
        ExportStatus::Failed { sidecar, message } => {
            assert!(sidecar.ends_with("export_trends_error.txt"));
            assert!(message.contains("results database locked"));
            let text = std::fs::read_to_string(sidecar).unwrap();
            assert!(text.contains("results database locked"));
        }
        other => panic!("expected failed trend export, got {other:?}"),
    }
    assert!(!report.profiles.is_failed());
    assert!(report.folder.join("profiles").join("Pipe 1.csv").is_file());
}

#[test]
fn profile_logger_failure_only_affects_that_logger() {
    let mut state = EngineState::typical();
    state.profile_loggers = Ok(vec!["Pipe 1".to_string(), "Riser".to_string()]);
    let fx = Fixture::new(state);
    let mut runner = fx.runner(None);

    let report = runner
        .run_case(&fx.results_dir(), &base_inputs(), &now(), None)
        .unwrap();

    assert_eq!(report.failed_profile_loggers.len(), 1);
    let (logger, sidecar) = &report.failed_profile_loggers[0];
    assert_eq!(logger, "Riser");
    assert!(sidecar.ends_with("export_profiles_error_Riser.txt"));
    assert!(sidecar.is_file());
    assert!(report.folder.join("profiles").join("Pipe 1.csv").is_file());
}

#[test]
fn logger_with_path_separator_gets_sidecar_in_case_folder() {
    let mut state = EngineState::typical();
    state.profile_loggers = Ok(vec!["Pipe 1".to_string(), "Riser/Top".to_string()]);
    let fx = Fixture::new(state);
    let mut runner = fx.runner(None);

    let report = runner
        .run_case(&fx.results_dir(), &base_inputs(), &now(), None)
        .unwrap();

    let (logger, sidecar) = &report.failed_profile_loggers[0];
    assert_eq!(logger, "Riser/Top");
    assert_eq!(sidecar, &report.folder.join("export_profiles_error_Riser_Top.txt"));
    let text = std::fs::read_to_string(sidecar).unwrap();
    assert!(text.contains("Riser/Top"));
}

#[test]
fn profile_listing_failure_writes_sidecar() {
    let mut state = EngineState::typical();
    state.profile_loggers = Err("catalog unavailable".to_string());
    let fx = Fixture::new(state);
    let mut runner = fx.runner(None);

    let report = runner
        .run_case(&fx.results_dir(), &base_inputs(), &now(), None)
        .unwrap();
    assert!(report.profiles.is_failed());
    assert!(report.folder.join("export_profiles_error.txt").is_file());
    assert!(!report.trends.is_failed());
}

#[test]
fn missing_entry_points_abort_before_advance() {
    let mut state = EngineState::typical();
    state.entry_points.clear();
    let fx = Fixture::new(state);
    let mut runner = fx.runner(None);

    let err = runner
        .run_case(&fx.results_dir(), &base_inputs(), &now(), None)
        .unwrap_err();
    match err {
        AppError::Engine(EngineError::NoInitEntryPoint { attempted }) => {
            assert_eq!(attempted, vec!["runSteady", "runInitialization", "initialize"]);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(fx.state.borrow().advanced.is_empty());
}

#[test]
fn rejected_launch_never_opens_a_session() {
    let fx = Fixture::new(EngineState::typical());
    let mut runner = fx.runner(Some("BC2.time"));

    let err = runner
        .run_case(&fx.results_dir(), &base_inputs(), &now(), None)
        .unwrap_err();
    assert!(matches!(err, AppError::Launch(_)));
    assert!(fx.state.borrow().selected.is_empty());
}

#[test]
fn invalid_inputs_fail_before_launch() {
    let fx = Fixture::new(EngineState::typical());
    let mut runner = fx.runner(None);
    let inputs = base_inputs().with("WH_TEMP_K", vec![277.15, 280.15]);

    let err = runner
        .run_case(&fx.results_dir(), &inputs, &now(), None)
        .unwrap_err();
    assert!(matches!(err, AppError::Template(_)));
    assert!(fx.launched.borrow().is_empty());
}

#[test]
fn two_runs_in_one_minute_get_separate_folders() {
    let fx = Fixture::new(EngineState::typical());
    let mut runner = fx.runner(None);

    let first = runner
        .run_case(&fx.results_dir(), &base_inputs(), &now(), None)
        .unwrap();
    let second = runner
        .run_case(&fx.results_dir(), &base_inputs(), &now(), None)
        .unwrap();
    assert_ne!(first.folder, second.folder);
    assert_ne!(first.handle, second.handle);
}
