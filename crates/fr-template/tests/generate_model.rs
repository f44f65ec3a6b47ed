use fr_template::*;

const TEMPLATE: &str = "\
BC2.time = {SOURCE_TIME}
BC2.massFlowrate = {SOURCE_MFR}
BC2.temperature = {SOURCE_TEMP_K}
VALVE1.time = {VALVE_TIME}
VALVE1.opening = {VALVE_OPENING}
BC1.time = {WH_TIME}
BC1.pressure = {WH_PRESS}
BC1.temperature = {WH_TEMP_K}
";

fn base_inputs() -> TemplateInputs {
    TemplateInputs::new()
        .with("SOURCE_TIME", vec![0.0, 600.0, 1200.0])
        .with("SOURCE_MFR", vec![110.0, 100.0, 90.0])
        .with("SOURCE_TEMP_K", 313.15)
        .with("VALVE_TIME", vec![0.0])
        .with("VALVE_OPENING", 0.22)
        .with("WH_TIME", vec![0.0, 1800.0])
        .with("WH_PRESS", 8.0e6)
        .with("WH_TEMP_K", vec![277.15, 280.15])
}

#[test]
fn groups_use_independent_time_vectors() {
    let text = render_model(TEMPLATE, &base_inputs()).unwrap();

    assert!(text.contains("BC2.time = [0,600,1200]"));
    assert!(text.contains("BC2.massFlowrate = [110,100,90]"));
    assert!(text.contains("BC2.temperature = [313.15,313.15,313.15]"));
    assert!(text.contains("VALVE1.opening = [0.22]"));
    assert!(text.contains("BC1.pressure = [8000000,8000000]"));
    assert!(text.contains("BC1.temperature = [277.15,280.15]"));
    assert!(find_placeholders(&text).is_empty());
}

#[test]
fn generated_file_has_no_placeholders() {
    let dir = tempfile::tempdir().unwrap();
    let template_path = dir.path().join("template.qs");
    let output_path = dir.path().join("model.qs");
    std::fs::write(&template_path, TEMPLATE).unwrap();

    let written = generate_model_from_template(&template_path, &output_path, &base_inputs()).unwrap();
    assert_eq!(written, output_path);

    let text = std::fs::read_to_string(&output_path).unwrap();
    assert!(find_placeholders(&text).is_empty());
}

#[test]
fn missing_input_fails_before_writing() {
    let dir = tempfile::tempdir().unwrap();
    let template_path = dir.path().join("template.qs");
    let output_path = dir.path().join("model.qs");
    std::fs::write(&template_path, TEMPLATE).unwrap();

    let mut inputs = TemplateInputs::new();
    for (key, value) in base_inputs().iter() {
        if key != "WH_PRESS" {
            inputs.insert(key.clone(), value.clone());
        }
    }

    let err = generate_model_from_template(&template_path, &output_path, &inputs).unwrap_err();
    assert!(matches!(err, TemplateError::MissingInput { ref key } if key == "WH_PRESS"));
    assert!(!output_path.exists());
}

#[test]
fn unknown_placeholders_are_reported_verbatim() {
    let template = format!("{TEMPLATE}PIPE1.roughness = {{ROUGHNESS_M}}\n");
    let err = render_model(&template, &base_inputs()).unwrap_err();
    match err {
        TemplateError::MissingPlaceholders { placeholders } => {
            assert_eq!(placeholders, vec!["{ROUGHNESS_M}".to_string()]);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn mismatch_inside_one_group_is_fatal() {
    let inputs = base_inputs().with("WH_TEMP_K", vec![277.15, 280.15, 281.15]);
    let err = render_model(TEMPLATE, &inputs).unwrap_err();
    assert!(matches!(
        err,
        TemplateError::LengthMismatch { ref name, actual: 3, expected: 2 } if name == "WH_TEMP_K"
    ));
}

#[test]
fn scalar_time_vector_is_rejected() {
    let inputs = base_inputs().with("VALVE_TIME", 0.0);
    assert!(matches!(
        render_model(TEMPLATE, &inputs),
        Err(TemplateError::InvalidInput { ref name, .. }) if name == "VALVE_TIME"
    ));
}

#[test]
fn derived_template_renders_back() {
    let model = "\
BC2.time = [0]
BC2.massFlowrate = [110]
BC2.temperature = [313.15]
VALVE1.time = [0]
VALVE1.opening = [0.22]
BC1.time = [0]
BC1.pressure = [8000000]
BC1.temperature = [277.15]
";
    let (template, introduced) = derive_template(model);
    assert_eq!(introduced.len(), 8);

    let inputs = TemplateInputs::new()
        .with("SOURCE_TIME", vec![0.0])
        .with("SOURCE_MFR", 110.0)
        .with("SOURCE_TEMP_K", 313.15)
        .with("VALVE_TIME", vec![0.0])
        .with("VALVE_OPENING", 0.22)
        .with("WH_TIME", vec![0.0])
        .with("WH_PRESS", 8.0e6)
        .with("WH_TEMP_K", 277.15);
    assert_eq!(render_model(&template, &inputs).unwrap(), model);
}
