//! fr-template: model-file generation from placeholder templates.
//!
//! A template is a complete model description in which the boundary-condition
//! arrays of three component groups (source, valve, wellhead) have been
//! replaced by `{NAME}` placeholders. Each group carries its own time vector;
//! every property of a group is validated against that vector only.

pub mod derive;
pub mod input;
pub mod lenient;
pub mod substitute;

pub use derive::{DerivationRule, derive_template, DERIVATION_RULES};
pub use input::{ComponentGroup, InputValue, Placeholder, TemplateInputs};
pub use lenient::{Advisory, AdvisoryKind, align_to_time};
pub use substitute::{
    find_placeholders, format_array, generate_model_from_template, render_model,
    validate_or_expand,
};

use std::path::PathBuf;

pub type TemplateResult<T> = Result<T, TemplateError>;

#[derive(thiserror::Error, Debug)]
pub enum TemplateError {
    #[error("Input '{name}' has {actual} points, but its component time vector has {expected} points")]
    LengthMismatch {
        name: String,
        actual: usize,
        expected: usize,
    },

    #[error("Invalid input for '{name}': {detail}")]
    InvalidInput { name: String, detail: String },

    #[error("Missing required input: {key}")]
    MissingInput { key: String },

    #[error("Missing placeholders in template: {placeholders:?}")]
    MissingPlaceholders { placeholders: Vec<String> },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}
