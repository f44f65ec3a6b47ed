//! Caller-facing pre-validation.
//!
//! Interactive callers often type a few more or fewer values than time
//! points. Before handing inputs to the strict renderer, this tier trims
//! extra values or pads missing ones with the last value, and reports each
//! adjustment as an [`Advisory`]. The renderer itself never does this.

use std::fmt;

use tracing::warn;

use crate::{TemplateError, TemplateResult};

/// How a value list was adjusted to fit its time vector.
#[derive(Debug, Clone, PartialEq)]
pub enum AdvisoryKind {
    /// Values beyond the time vector were dropped.
    Trimmed { supplied: usize, kept: usize },
    /// Missing values were filled with the last supplied value.
    Padded {
        supplied: usize,
        filled_to: usize,
        fill: f64,
    },
}

/// A non-fatal correction applied to caller input.
#[derive(Debug, Clone, PartialEq)]
pub struct Advisory {
    pub name: String,
    pub kind: AdvisoryKind,
}

impl fmt::Display for Advisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            AdvisoryKind::Trimmed { supplied, kept } => write!(
                f,
                "'{}': {} values entered but only {} time points; excess values trimmed",
                self.name, supplied, kept
            ),
            AdvisoryKind::Padded {
                supplied,
                filled_to,
                fill,
            } => write!(
                f,
                "'{}': {} values entered for {} time points; missing points filled with last value ({})",
                self.name, supplied, filled_to, fill
            ),
        }
    }
}

/// Fit `values` to `time_len` points, trimming or padding as needed.
pub fn align_to_time(
    name: &str,
    time_len: usize,
    mut values: Vec<f64>,
) -> TemplateResult<(Vec<f64>, Option<Advisory>)> {
    let supplied = values.len();
    if supplied == time_len {
        return Ok((values, None));
    }

    let kind = if supplied > time_len {
        values.truncate(time_len);
        AdvisoryKind::Trimmed {
            supplied,
            kept: time_len,
        }
    } else {
        let Some(&fill) = values.last() else {
            return Err(TemplateError::InvalidInput {
                name: name.to_string(),
                detail: format!("no values supplied for {time_len} time points"),
            });
        };
        values.resize(time_len, fill);
        AdvisoryKind::Padded {
            supplied,
            filled_to: time_len,
            fill,
        }
    };

    let advisory = Advisory {
        name: name.to_string(),
        kind,
    };
    warn!("{advisory}");
    Ok((values, Some(advisory)))
}
