//! Error types for the fr-app service layer.

use std::path::PathBuf;

/// Application error wrapping the backend crates' errors, shared by the
/// CLI and any other frontend.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Failed to read config file {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config {path}: {message}")]
    Config { path: PathBuf, message: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Template(#[from] fr_template::TemplateError),

    #[error(transparent)]
    Engine(#[from] fr_engine::EngineError),

    #[error(transparent)]
    Launch(#[from] fr_engine::LaunchError),

    #[error("Results error: {0}")]
    Results(#[from] fr_results::ResultsError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for fr-app operations.
pub type AppResult<T> = Result<T, AppError>;
