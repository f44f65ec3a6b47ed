//! Two-header-row CSV tables: variable names, then `[unit]` per column.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::{ResultsError, ResultsResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    pub unit: String,
}

impl Column {
    pub fn new(name: impl Into<String>, unit: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            unit: unit.into(),
        }
    }
}

/// Numeric table where a missing value is written as an empty cell.
#[derive(Debug, Clone, Default)]
pub struct CsvTable {
    columns: Vec<Column>,
    rows: Vec<Vec<Option<f64>>>,
}

fn escape(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn cell(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

impl CsvTable {
    pub fn new(columns: Vec<Column>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Option<f64>>] {
        &self.rows
    }

    pub fn push_row(&mut self, row: Vec<Option<f64>>) -> ResultsResult<()> {
        if row.len() != self.columns.len() {
            return Err(ResultsError::RowWidth {
                actual: row.len(),
                expected: self.columns.len(),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn write<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        let names: Vec<String> = self.columns.iter().map(|c| escape(&c.name)).collect();
        writeln!(out, "{}", names.join(","))?;
        let units: Vec<String> = self
            .columns
            .iter()
            .map(|c| escape(&format!("[{}]", c.unit)))
            .collect();
        writeln!(out, "{}", units.join(","))?;

        for row in &self.rows {
            let cells: Vec<String> = row.iter().map(|v| cell(*v)).collect();
            writeln!(out, "{}", cells.join(","))?;
        }
        Ok(())
    }

    pub fn write_to(&self, path: &Path) -> ResultsResult<()> {
        let mut file = BufWriter::new(File::create(path)?);
        self.write(&mut file)?;
        file.flush()?;
        Ok(())
    }
}
