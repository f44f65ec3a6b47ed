//! fr-results: result folders, input snapshots and unit-annotated CSV tables.

pub mod folder;
pub mod table;
pub mod units;

pub use folder::{
    INPUTS_FILE, PROFILES_DIR, PROFILES_ERROR_FILE, TRENDS_DIR, TRENDS_ERROR_FILE, case_folder,
    create_case_folder, create_result_folder, logger_file_stem, profile_logger_error_file, save_inputs,
    write_error_sidecar,
};
pub use table::{Column, CsvTable};
pub use units::{PROPERTY_UNITS, UNKNOWN_UNIT, property_unit};

use std::path::PathBuf;

pub type ResultsResult<T> = Result<T, ResultsError>;

#[derive(thiserror::Error, Debug)]
pub enum ResultsError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to create {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Row has {actual} cells, table has {expected} columns")]
    RowWidth { actual: usize, expected: usize },
}
