//! Strict validation and placeholder substitution.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, info};

use crate::input::{ComponentGroup, InputValue, Placeholder, TemplateInputs};
use crate::{TemplateError, TemplateResult};

/// Broadcast a scalar over `time_vector`, or check a series against it.
///
/// Series of a different length are rejected; nothing is trimmed or padded
/// here.
pub fn validate_or_expand(
    values: &InputValue,
    time_vector: &[f64],
    name: &str,
) -> TemplateResult<Vec<f64>> {
    let n = time_vector.len();
    match values {
        InputValue::Scalar(v) => Ok(vec![*v; n]),
        InputValue::Series(series) if !series.is_empty() => {
            if series.len() != n {
                return Err(TemplateError::LengthMismatch {
                    name: name.to_string(),
                    actual: series.len(),
                    expected: n,
                });
            }
            Ok(series.clone())
        }
        InputValue::Series(_) => Err(TemplateError::InvalidInput {
            name: name.to_string(),
            detail: "empty series".to_string(),
        }),
        InputValue::Other(raw) => Err(TemplateError::InvalidInput {
            name: name.to_string(),
            detail: raw.to_string(),
        }),
    }
}

/// Render numbers in the model's array syntax: `[1,2.5,3]`.
pub fn format_array(values: &[f64]) -> String {
    let body: Vec<String> = values.iter().map(|v| v.to_string()).collect();
    format!("[{}]", body.join(","))
}

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{[A-Z0-9_]+\}").expect("placeholder pattern is valid"));

/// All `{UPPER_CASE_0_9}` tokens in `text`, in order of appearance.
pub fn find_placeholders(text: &str) -> Vec<String> {
    PLACEHOLDER
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}

fn required<'a>(inputs: &'a TemplateInputs, placeholder: Placeholder) -> TemplateResult<&'a InputValue> {
    inputs
        .get(placeholder.key())
        .ok_or_else(|| TemplateError::MissingInput {
            key: placeholder.key().to_string(),
        })
}

fn time_vector(inputs: &TemplateInputs, group: ComponentGroup) -> TemplateResult<Vec<f64>> {
    let placeholder = group.time_placeholder();
    match required(inputs, placeholder)? {
        InputValue::Series(t) if !t.is_empty() => Ok(t.clone()),
        other => Err(TemplateError::InvalidInput {
            name: placeholder.key().to_string(),
            detail: format!("time vector must be a non-empty list, got {other:?}"),
        }),
    }
}

/// Placeholder replacements for every group, validated per group.
fn build_replacements(inputs: &TemplateInputs) -> TemplateResult<Vec<(Placeholder, String)>> {
    let mut replacements = Vec::with_capacity(Placeholder::ALL.len());
    for group in ComponentGroup::ALL {
        let time = time_vector(inputs, group)?;
        replacements.push((group.time_placeholder(), format_array(&time)));
        for &placeholder in group.property_placeholders() {
            let values = validate_or_expand(required(inputs, placeholder)?, &time, placeholder.key())?;
            replacements.push((placeholder, format_array(&values)));
        }
    }
    Ok(replacements)
}

/// Substitute every known placeholder in `template`.
///
/// Fails if any input is missing or malformed, or if any `{NAME}` token is
/// left over after substitution.
pub fn render_model(template: &str, inputs: &TemplateInputs) -> TemplateResult<String> {
    let replacements = build_replacements(inputs)?;

    let mut text = template.to_string();
    for (placeholder, value) in &replacements {
        debug!(placeholder = placeholder.key(), value = %value, "template replacement");
        text = text.replace(&placeholder.token(), value);
    }

    let missing = find_placeholders(&text);
    if !missing.is_empty() {
        return Err(TemplateError::MissingPlaceholders {
            placeholders: missing,
        });
    }
    Ok(text)
}

/// Read `template_path`, render it with `inputs` and write `output_path`.
///
/// Nothing is written unless rendering succeeds.
pub fn generate_model_from_template(
    template_path: &Path,
    output_path: &Path,
    inputs: &TemplateInputs,
) -> TemplateResult<PathBuf> {
    let template = std::fs::read_to_string(template_path).map_err(|source| TemplateError::Io {
        path: template_path.to_path_buf(),
        source,
    })?;

    let text = render_model(&template, inputs)?;

    std::fs::write(output_path, text).map_err(|source| TemplateError::Io {
        path: output_path.to_path_buf(),
        source,
    })?;
    info!(output = %output_path.display(), "model file written");
    Ok(output_path.to_path_buf())
}
