use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use serde::ser::{SerializeMap, SerializeStruct};
use serde::{Serialize, Serializer};

use super::command::{normalize, parse, Command, Operation, Request};
use super::error::CommandError;
use super::loader::load_file;
use super::model::{format_float, CellValue, Column, Dataset};

// ---------------------------------------------------------------------------
// Result payloads
// ---------------------------------------------------------------------------

/// The value of one statistic.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum StatValue {
    Number(f64),
    /// Mode values rendered as strings (there may be ties).
    Values(Vec<String>),
}

impl fmt::Display for StatValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatValue::Number(v) => f.write_str(&format_float(*v)),
            StatValue::Values(vs) => f.write_str(&vs.join(", ")),
        }
    }
}

/// Everything computed for one column.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnStats {
    Stats(Vec<(Operation, StatValue)>),
    /// Bulk mode only: this column failed, the others did not.
    Error(String),
}

impl ColumnStats {
    pub fn get(&self, op: Operation) -> Option<&StatValue> {
        match self {
            ColumnStats::Stats(entries) => entries.iter().find(|(o, _)| *o == op).map(|(_, v)| v),
            ColumnStats::Error(_) => None,
        }
    }
}

impl Serialize for ColumnStats {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ColumnStats::Stats(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (op, value) in entries {
                    map.serialize_entry(op.name(), value)?;
                }
                map.end()
            }
            ColumnStats::Error(msg) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("error", msg)?;
                map.end()
            }
        }
    }
}

/// Statistics keyed by source column, in dataset order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregateResult {
    pub entries: Vec<(String, ColumnStats)>,
}

impl AggregateResult {
    pub fn get(&self, column: &str) -> Option<&ColumnStats> {
        self.entries.iter().find(|(c, _)| c == column).map(|(_, s)| s)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for AggregateResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (column, stats) in &self.entries {
            map.serialize_entry(column, stats)?;
        }
        map.end()
    }
}

/// What the presentation layer receives for every request.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Success { result: AggregateResult, command: String },
    Failure { error: String },
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success { .. })
    }
}

impl Serialize for Outcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Outcome::Success { result, command } => {
                let mut s = serializer.serialize_struct("Outcome", 3)?;
                s.serialize_field("success", &true)?;
                s.serialize_field("result", result)?;
                s.serialize_field("command", command)?;
                s.end()
            }
            Outcome::Failure { error } => {
                let mut s = serializer.serialize_struct("Outcome", 2)?;
                s.serialize_field("success", &false)?;
                s.serialize_field("error", error)?;
                s.end()
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Statistics over non-missing values
// ---------------------------------------------------------------------------

const NO_VALUES: &str = "column has no non-missing values";

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Quantile `q` in `[0, 1]` of already sorted values, interpolating linearly
/// between the two closest ranks.
pub fn quantile_sorted(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

pub fn sorted(values: &[f64]) -> Vec<f64> {
    let mut vals = values.to_vec();
    vals.sort_by(f64::total_cmp);
    vals
}

pub fn median(values: &[f64]) -> Option<f64> {
    quantile_sorted(&sorted(values), 0.5)
}

pub fn min(values: &[f64]) -> Option<f64> {
    values.iter().copied().reduce(f64::min)
}

pub fn max(values: &[f64]) -> Option<f64> {
    values.iter().copied().reduce(f64::max)
}

/// Sample standard deviation (denominator `N - 1`).
pub fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values)?;
    let ss: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    Some((ss / (values.len() - 1) as f64).sqrt())
}

/// All values sharing the highest frequency, sorted ascending.
/// Missing cells are ignored.
pub fn modes<'a>(values: impl IntoIterator<Item = &'a CellValue>) -> Vec<CellValue> {
    let mut counts: HashMap<&CellValue, usize> = HashMap::new();
    for v in values.into_iter().filter(|v| !v.is_missing()) {
        *counts.entry(v).or_default() += 1;
    }
    let Some(&top) = counts.values().max() else {
        return Vec::new();
    };
    let mut tied: Vec<CellValue> = counts
        .into_iter()
        .filter(|(_, n)| *n == top)
        .map(|(v, _)| v.clone())
        .collect();
    tied.sort();
    tied
}

/// Compute one statistic. The column must already be type-checked.
fn compute(op: Operation, column: &Column) -> Result<StatValue, String> {
    let stat = match op {
        Operation::Mode => {
            let rendered = modes(&column.values).iter().map(ToString::to_string).collect();
            return Ok(StatValue::Values(rendered));
        }
        Operation::Mean => mean(&column.numeric_values()),
        Operation::Median => median(&column.numeric_values()),
        Operation::Min => min(&column.numeric_values()),
        Operation::Max => max(&column.numeric_values()),
        Operation::Std => {
            let values = column.numeric_values();
            if values.len() == 1 {
                return Err("at least two non-missing values are required".to_string());
            }
            sample_std(&values)
        }
    };
    match stat {
        Some(v) if v.is_finite() => Ok(StatValue::Number(v)),
        Some(v) => Err(format!("result is not finite ({v})")),
        None => Err(NO_VALUES.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Interpreter
// ---------------------------------------------------------------------------

/// Parse, validate and compute. Errors are typed; see [`interpret`] for the
/// user-facing boundary.
pub fn evaluate(dataset: &Dataset, raw: &str) -> Result<AggregateResult, CommandError> {
    match parse(raw)? {
        Request::Bulk => Ok(bulk(dataset)),
        Request::Single(command) => single(dataset, &command),
    }
}

fn single(dataset: &Dataset, command: &Command) -> Result<AggregateResult, CommandError> {
    let column = dataset
        .column(&command.column)
        .ok_or_else(|| CommandError::UnknownColumn {
            column: command.column.clone(),
            available: dataset.column_names(),
        })?;

    let op = command.operation()?;

    if op.requires_numeric() && !column.dtype.is_numeric() {
        return Err(CommandError::TypeMismatch {
            operation: op,
            column: column.name.clone(),
        });
    }

    let value = compute(op, column).map_err(|reason| CommandError::Computation {
        operation: op,
        column: column.name.clone(),
        reason,
    })?;

    Ok(AggregateResult {
        entries: vec![(column.name.clone(), ColumnStats::Stats(vec![(op, value)]))],
    })
}

/// Every numeric statistic for every numeric column. A failing column is
/// reported in place and does not affect the others.
fn bulk(dataset: &Dataset) -> AggregateResult {
    let entries = dataset
        .columns()
        .iter()
        .filter(|c| c.dtype.is_numeric())
        .map(|column| {
            let stats = Operation::NUMERIC
                .into_iter()
                .map(|op| {
                    compute(op, column)
                        .map(|v| (op, v))
                        .map_err(|reason| format!("{op} failed: {reason}"))
                })
                .collect::<Result<Vec<_>, String>>();
            let stats = match stats {
                Ok(entries) => ColumnStats::Stats(entries),
                Err(reason) => {
                    log::warn!("Bulk statistics failed for column '{}': {reason}", column.name);
                    ColumnStats::Error(format!(
                        "Couldn't analyze column '{}': {reason}",
                        column.name
                    ))
                }
            };
            (column.name.clone(), stats)
        })
        .collect();
    AggregateResult { entries }
}

/// Evaluate a raw command against a loaded dataset and shape the answer.
pub fn interpret(dataset: &Dataset, raw: &str) -> Outcome {
    let command = normalize(raw);
    match evaluate(dataset, raw) {
        Ok(result) => {
            log::debug!("Command '{command}' produced {} column result(s)", result.len());
            Outcome::Success { result, command }
        }
        Err(e) => {
            log::info!("Command '{command}' rejected: {e}");
            Outcome::Failure {
                error: e.to_string(),
            }
        }
    }
}

/// Load `path` fresh and interpret `raw` against it.
pub fn analyze_file(path: &Path, raw: &str) -> Outcome {
    match load_file(path) {
        Ok(dataset) => interpret(&dataset, raw),
        Err(e) => {
            log::error!("Failed to load {}: {e}", path.display());
            Outcome::Failure {
                error: format!("Analysis failed: {e}"),
            }
        }
    }
}
