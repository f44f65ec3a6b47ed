mod common;

use common::*;
use fr_app::*;
use fr_template::InputValue;

fn study_root(fx: &Fixture) -> std::path::PathBuf {
    let root = fx.results_dir().join("study");
    std::fs::create_dir_all(&root).unwrap();
    root
}

fn read_json(path: &std::path::Path) -> serde_json::Value {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}

#[test]
fn sweep_runs_cases_in_product_order() {
    let fx = Fixture::new(EngineState::typical());
    let mut runner = fx.runner(None);
    let root = study_root(&fx);
    let params = vec![
        SweepParameter::new("SOURCE_MFR", vec![80.0, 100.0]),
        SweepParameter::new("WH_PRESS", vec![60.0, 70.0, 80.0]),
    ];

    let report = run_study(&mut runner, &root, &base_inputs(), &params, None).unwrap();

    assert_eq!(report.cases.len(), 6);
    assert_eq!(report.completed(), 6);
    let indices: Vec<usize> = report.cases.iter().map(|c| c.case_index).collect();
    assert_eq!(indices, vec![1, 2, 3, 4, 5, 6]);
    assert_eq!(
        report.cases[3].parameters,
        vec![("SOURCE_MFR".to_string(), 100.0), ("WH_PRESS".to_string(), 60.0)]
    );
    assert!(report.cases[3].folder.ends_with("case_004"));
    assert!(report.missing_trends.is_empty());
    assert!(report.missing_profiles.is_empty());

    let summary = read_json(&root.join("inputs.json"));
    assert_eq!(summary["mode"], "Parameter Study");
    assert_eq!(summary["total_combinations"], 6);
    assert_eq!(summary["dynamic_time"], 3600.0);
    assert_eq!(summary["varying_parameters"]["WH_PRESS"], serde_json::json!([60.0, 70.0, 80.0]));
    assert_eq!(summary["base_inputs"]["SOURCE_MFR"], 110.0);

    let case4 = read_json(&report.cases[3].folder.join("inputs.json"));
    assert_eq!(case4["SOURCE_MFR"], 100.0);
    let pressure = case4["WH_PRESS"].as_f64().unwrap();
    assert!((pressure - 6.0e6).abs() < 1e-6);

    let model = std::fs::read_to_string(report.cases[0].folder.join(MODEL_FILE)).unwrap();
    assert!(model.contains("BC2.massFlowrate = [80]"));
    assert_eq!(fx.state.borrow().advanced.len(), 6);
}

#[test]
fn failed_case_does_not_stop_the_sweep() {
    let fx = Fixture::new(EngineState::typical());
    let mut runner = fx.runner(Some("VALVE1.opening = [0.5]"));
    let root = study_root(&fx);
    let params = vec![SweepParameter::new("VALVE_OPENING", vec![0.2, 0.5, 0.8])];

    let mut seen = Vec::new();
    let mut on_case = |p: StudyProgress<'_>| -> AppResult<()> {
        seen.push((p.case_index, p.total, p.result.is_completed()));
        Err(AppError::InvalidInput("progress sink closed".to_string()))
    };
    let report = run_study(&mut runner, &root, &base_inputs(), &params, Some(&mut on_case)).unwrap();

    assert_eq!(seen, vec![(1, 3, true), (2, 3, false), (3, 3, true)]);
    assert_eq!(report.cases.len(), 3);
    assert_eq!(report.failed(), 1);

    let failed = &report.cases[1];
    assert!(failed.folder.ends_with("case_002"));
    assert!(failed.handle.is_none());
    match &failed.outcome {
        CaseOutcome::Failed { error } => assert!(error.contains("model rejected")),
        other => panic!("expected failure, got {other:?}"),
    }
    assert_eq!(report.missing_trends, vec![2]);
    assert_eq!(report.missing_profiles, vec![2]);
    assert!(report.cases[2].folder.join("trends").join("Node 1.csv").is_file());
}

#[test]
fn unit_converting_keys_overlay_model_inputs() {
    let base = base_inputs();
    let keys = ["SOURCE_TEMP", "WH_TEMP"];
    let inputs = apply_combination(&base, &keys, &[50.0, 10.0]);
    match (inputs.get("SOURCE_TEMP_K"), inputs.get("WH_TEMP_K")) {
        (Some(InputValue::Scalar(source)), Some(InputValue::Scalar(wellhead))) => {
            assert!((source - 323.15).abs() < 1e-9);
            assert!((wellhead - 283.15).abs() < 1e-9);
        }
        other => panic!("unexpected overlay: {other:?}"),
    }
    assert!(inputs.get("SOURCE_TEMP").is_none());
}

#[test]
fn study_without_parameters_is_rejected() {
    let fx = Fixture::new(EngineState::typical());
    let mut runner = fx.runner(None);
    let root = study_root(&fx);
    let err = run_study(&mut runner, &root, &base_inputs(), &[], None).unwrap_err();
    assert!(matches!(err, AppError::InvalidInput(_)));
    assert!(fx.launched.borrow().is_empty());
}
