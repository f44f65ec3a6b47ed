//! Trend and profile export to unit-annotated CSV.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use fr_engine::{EngineApi, ProfileSnapshot, TimeKey, TimeValueMap, decode_profile, decode_trend};
use fr_results::{Column, CsvTable, logger_file_stem, property_unit};
use tracing::{info, warn};

use crate::error::{AppError, AppResult};

/// Trend logger left out of exports; it carries solver bookkeeping for the
/// whole case and is expensive to extract.
pub const GLOBAL_LOGGER: &str = "Global";

/// A variable that could not be fetched or decoded.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedVariable {
    pub logger: String,
    pub variable: String,
    pub reason: String,
}

/// One CSV file written for one logger.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggerExport {
    pub logger: String,
    pub path: PathBuf,
    pub variables: usize,
    pub rows: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExportReport {
    pub files: Vec<LoggerExport>,
    /// Loggers with no file, with the reason.
    pub failed_loggers: Vec<(String, String)>,
    pub skipped_variables: Vec<SkippedVariable>,
}

/// CSV file name for a logger; path separators are replaced.
pub fn logger_file_name(logger: &str) -> String {
    format!("{}.csv", logger_file_stem(logger))
}

fn skip(report: &mut ExportReport, logger: &str, variable: &str, reason: String) {
    warn!(logger, variable, %reason, "skipping variable");
    report.skipped_variables.push(SkippedVariable {
        logger: logger.to_string(),
        variable: variable.to_string(),
        reason,
    });
}

fn header(keys: &[(&str, &str)], variables: &[String]) -> Vec<Column> {
    keys.iter()
        .map(|(name, unit)| Column::new(*name, *unit))
        .chain(variables.iter().map(|v| Column::new(v.clone(), property_unit(v))))
        .collect()
}

/// Export one trend logger to `<output_dir>/<logger>.csv`.
///
/// Rows are the union of every variable's timestamps, ascending. A variable
/// that cannot be fetched keeps its column, left empty.
pub fn export_trend_logger(
    engine: &mut dyn EngineApi,
    output_dir: &Path,
    logger: &str,
    report: &mut ExportReport,
) -> AppResult<LoggerExport> {
    let variables = engine.list_trend_variables(logger)?;

    let mut series: Vec<Option<TimeValueMap>> = Vec::with_capacity(variables.len());
    let mut times = BTreeSet::new();
    for variable in &variables {
        let decoded = engine
            .trend_series(logger, variable)
            .and_then(|raw| decode_trend(&raw));
        match decoded {
            Ok(map) => {
                times.extend(map.keys().copied());
                series.push(Some(map));
            }
            Err(err) => {
                skip(report, logger, variable, err.to_string());
                series.push(None);
            }
        }
    }

    let mut table = CsvTable::new(header(&[("time", "s")], &variables));
    for t in &times {
        let mut row = Vec::with_capacity(variables.len() + 1);
        row.push(Some(t.0));
        row.extend(
            series
                .iter()
                .map(|s| s.as_ref().and_then(|m| m.get(t).copied())),
        );
        table.push_row(row)?;
    }

    let path = output_dir.join(logger_file_name(logger));
    table.write_to(&path)?;
    Ok(LoggerExport {
        logger: logger.to_string(),
        path,
        variables: variables.len(),
        rows: times.len(),
    })
}

/// Export every trend logger except [`GLOBAL_LOGGER`].
///
/// Only a failure to list loggers is returned as an error; a failing logger
/// is logged and recorded in the report.
pub fn export_all_trends(engine: &mut dyn EngineApi, output_dir: &Path) -> AppResult<ExportReport> {
    fs::create_dir_all(output_dir)?;
    let loggers: Vec<String> = engine
        .list_trend_loggers()?
        .into_iter()
        .filter(|l| l != GLOBAL_LOGGER)
        .collect();
    info!(count = loggers.len(), "exporting trend loggers");

    let mut report = ExportReport::default();
    for logger in &loggers {
        match export_trend_logger(engine, output_dir, logger, &mut report) {
            Ok(file) => report.files.push(file),
            Err(err) => {
                warn!(%logger, error = %err, "trend logger export failed");
                report.failed_loggers.push((logger.clone(), err.to_string()));
            }
        }
    }
    info!(dir = %output_dir.display(), files = report.files.len(), "trend export complete");
    Ok(report)
}

/// Export every variable of one profile logger to `<output_dir>/<logger>.csv`.
///
/// Rows are `(time, position)` pairs that carry at least one value, sorted by
/// time then position.
pub fn export_profile_logger(
    engine: &mut dyn EngineApi,
    output_dir: &Path,
    logger: &str,
    report: &mut ExportReport,
) -> AppResult<LoggerExport> {
    fs::create_dir_all(output_dir)?;
    let variables = engine.list_profile_variables(logger)?;
    info!(logger, variables = variables.len(), "exporting profile logger");

    let mut grid: BTreeMap<(TimeKey, TimeKey), Vec<Option<f64>>> = BTreeMap::new();
    for (col, variable) in variables.iter().enumerate() {
        let history = engine
            .profile_series(logger, variable, true)
            .and_then(|raw| decode_profile(&raw));
        let history = match history {
            Ok(h) => h,
            Err(err) => {
                skip(report, logger, variable, err.to_string());
                continue;
            }
        };
        for (time, pos, value) in history.cells() {
            let cells = grid
                .entry((TimeKey(time), TimeKey(pos)))
                .or_insert_with(|| vec![None; variables.len()]);
            cells[col] = Some(value);
        }
    }

    let mut table = CsvTable::new(header(&[("time", "s"), ("position", "m")], &variables));
    for ((time, pos), cells) in &grid {
        let mut row = Vec::with_capacity(cells.len() + 2);
        row.push(Some(time.0));
        row.push(Some(pos.0));
        row.extend(cells.iter().copied());
        table.push_row(row)?;
    }

    let path = output_dir.join(logger_file_name(logger));
    table.write_to(&path)?;
    info!(path = %path.display(), rows = grid.len(), "profile export complete");
    Ok(LoggerExport {
        logger: logger.to_string(),
        path,
        variables: variables.len(),
        rows: grid.len(),
    })
}

/// Profile of one variable at the last recorded time point.
pub fn fetch_last_profile(
    engine: &mut dyn EngineApi,
    logger: &str,
    variable: &str,
) -> AppResult<ProfileSnapshot> {
    let raw = engine.profile_series(logger, variable, false)?;
    decode_profile(&raw)?.last().ok_or_else(|| {
        AppError::InvalidInput(format!("profile {logger}/{variable} has no time points"))
    })
}
