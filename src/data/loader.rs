use std::collections::{HashMap, HashSet};
use std::path::Path;

use anyhow::{Context, Result, bail};
use arrow::array::{Array, ArrayRef, AsArray};
use arrow::datatypes::{
    DataType, Float32Type, Float64Type, Int16Type, Int32Type, Int64Type, Int8Type, UInt16Type,
    UInt32Type, UInt64Type, UInt8Type,
};
use arrow::util::display::array_value_to_string;
use calamine::{Data, Reader, open_workbook_auto};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::error::LoadError;
use super::model::{CellValue, Column, ColumnType, Dataset};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a tabular dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`                    – header row, comma separated
/// * `.xlsx` / `.xls` / `.ods` – first worksheet, header row
/// * `.json`                   – `[{ "col": value, ... }, ...]`
/// * `.parquet`                – flat schema, one field per column
pub fn load_file(path: &Path) -> Result<Dataset, LoadError> {
    if !path.is_file() {
        return Err(LoadError::NotFound(path.to_path_buf()));
    }

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let columns = match ext.as_str() {
        "csv" => load_csv(path),
        "xlsx" | "xlsm" | "xls" | "ods" => load_workbook(path),
        "json" => load_json(path),
        "parquet" | "pq" => load_parquet(path),
        other => return Err(LoadError::UnsupportedExtension(other.to_string())),
    }
    .map_err(|e| LoadError::InvalidFormat(format!("{e:#}")))?;

    let dataset = Dataset::new(columns)?;
    log::info!(
        "Loaded {} ({} rows × {} columns)",
        path.display(),
        dataset.len(),
        dataset.width()
    );
    Ok(dataset)
}

/// Name blank headers `Unnamed: <i>` and suffix repeats with `.1`, `.2`, …
/// skipping any suffix another header already uses.
fn dedupe_headers(raw: Vec<String>) -> Vec<String> {
    let mut used: HashSet<String> = HashSet::new();
    let mut next_suffix: HashMap<String, usize> = HashMap::new();
    raw.into_iter()
        .enumerate()
        .map(|(i, h)| {
            let base = if h.trim().is_empty() {
                format!("Unnamed: {i}")
            } else {
                h
            };
            let mut name = base.clone();
            if used.contains(&name) {
                let n = next_suffix.entry(base.clone()).or_insert(1);
                while used.contains(&name) {
                    name = format!("{base}.{n}");
                    *n += 1;
                }
            }
            used.insert(name.clone());
            name
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Type inference
// ---------------------------------------------------------------------------

/// Text that a delimited parser treats as a missing value.
const NA_TOKENS: &[&str] = &[
    "", "NA", "N/A", "n/a", "NaN", "nan", "-NaN", "-nan", "null", "NULL", "None", "#N/A",
];

fn is_na(s: &str) -> bool {
    NA_TOKENS.contains(&s.trim())
}

/// Infer a column from raw text cells (CSV).
///
/// * every value an integer, none missing → `int64`
/// * every value a number                 → `float64`
/// * every value `true`/`false`           → `bool`
/// * anything else                        → `object`
pub fn infer_from_strings(name: String, raw: &[String]) -> Column {
    let present: Vec<&str> = raw.iter().map(|s| s.trim()).filter(|s| !is_na(s)).collect();
    let any_missing = present.len() < raw.len();

    if present.is_empty() {
        return Column::new(name, ColumnType::Float64, vec![CellValue::Null; raw.len()]);
    }

    if !any_missing && present.iter().all(|s| s.parse::<i64>().is_ok()) {
        let values = raw
            .iter()
            .map(|s| s.trim().parse::<i64>().map_or(CellValue::Null, CellValue::Integer))
            .collect();
        return Column::new(name, ColumnType::Int64, values);
    }

    if present.iter().all(|s| s.parse::<f64>().is_ok()) {
        let values = raw
            .iter()
            .map(|s| match s.trim().parse::<f64>() {
                Ok(v) if !is_na(s) => CellValue::Float(v),
                _ => CellValue::Null,
            })
            .collect();
        return Column::new(name, ColumnType::Float64, values);
    }

    let as_bool = |s: &str| match s.to_ascii_lowercase().as_str() {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    };
    if !any_missing && present.iter().all(|s| as_bool(*s).is_some()) {
        let values = raw
            .iter()
            .map(|s| as_bool(s.trim()).map_or(CellValue::Null, CellValue::Bool))
            .collect();
        return Column::new(name, ColumnType::Bool, values);
    }

    let values = raw
        .iter()
        .map(|s| {
            if is_na(s) {
                CellValue::Null
            } else {
                CellValue::Text(s.clone())
            }
        })
        .collect();
    Column::new(name, ColumnType::Object, values)
}

/// Infer a column from cells that already carry a type (spreadsheet, JSON,
/// Parquet).
pub fn infer_from_cells(name: String, cells: Vec<CellValue>) -> Column {
    let present: Vec<&CellValue> = cells.iter().filter(|c| !c.is_missing()).collect();
    let any_missing = present.len() < cells.len();

    if present.is_empty() {
        return Column::new(name, ColumnType::Float64, vec![CellValue::Null; cells.len()]);
    }

    let all_numeric = present
        .iter()
        .all(|c| matches!(c, CellValue::Integer(_) | CellValue::Float(_)));
    if all_numeric {
        let integral = present.iter().all(|c| match c {
            CellValue::Integer(_) => true,
            CellValue::Float(f) => f.fract() == 0.0 && f.abs() < i64::MAX as f64,
            _ => false,
        });
        if integral && !any_missing {
            let values = cells
                .into_iter()
                .map(|c| match c {
                    CellValue::Float(f) => CellValue::Integer(f as i64),
                    other => other,
                })
                .collect();
            return Column::new(name, ColumnType::Int64, values);
        }
        let values = cells
            .into_iter()
            .map(|c| match c.as_f64() {
                Some(v) => CellValue::Float(v),
                None => CellValue::Null,
            })
            .collect();
        return Column::new(name, ColumnType::Float64, values);
    }

    if !any_missing && present.iter().all(|c| matches!(c, CellValue::Bool(_))) {
        return Column::new(name, ColumnType::Bool, cells);
    }

    if present.iter().all(|c| matches!(c, CellValue::DateTime(_))) {
        return Column::new(name, ColumnType::DateTime, cells);
    }

    let values = cells
        .into_iter()
        .map(|c| if c.is_missing() { CellValue::Null } else { c })
        .collect();
    Column::new(name, ColumnType::Object, values)
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: one header row with column names, then one record per row.
/// Short records are padded with missing cells; longer ones are rejected.
fn load_csv(path: &Path) -> Result<Vec<Column>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .context("opening CSV")?;
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    if headers.is_empty() {
        bail!("No columns to parse from file");
    }
    let headers = dedupe_headers(headers);

    let mut raw: Vec<Vec<String>> = vec![Vec::new(); headers.len()];
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {}", row_no + 1))?;
        if record.len() > headers.len() {
            bail!(
                "CSV row {}: expected {} fields, saw {}",
                row_no + 1,
                headers.len(),
                record.len()
            );
        }
        for (i, col) in raw.iter_mut().enumerate() {
            col.push(record.get(i).unwrap_or_default().to_string());
        }
    }

    Ok(headers
        .into_iter()
        .zip(raw)
        .map(|(name, values)| infer_from_strings(name, &values))
        .collect())
}

// ---------------------------------------------------------------------------
// Spreadsheet loader
// ---------------------------------------------------------------------------

/// First worksheet, first row as header.
fn load_workbook(path: &Path) -> Result<Vec<Column>> {
    let mut workbook = open_workbook_auto(path).context("opening workbook")?;
    let range = workbook
        .worksheet_range_at(0)
        .context("workbook has no worksheets")?
        .context("reading first worksheet")?;

    let mut rows = range.rows();
    let header = rows.next().context("No columns to parse from file")?;
    let headers = dedupe_headers(header.iter().map(|c| c.to_string()).collect());

    let mut cells: Vec<Vec<CellValue>> = vec![Vec::new(); headers.len()];
    for row in rows {
        for (i, col) in cells.iter_mut().enumerate() {
            col.push(row.get(i).map_or(CellValue::Null, sheet_cell));
        }
    }

    Ok(headers
        .into_iter()
        .zip(cells)
        .map(|(name, values)| infer_from_cells(name, values))
        .collect())
}

fn sheet_cell(cell: &Data) -> CellValue {
    match cell {
        Data::Int(i) => CellValue::Integer(*i),
        Data::Float(f) => CellValue::Float(*f),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::String(s) if is_na(s) => CellValue::Null,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(ts) => CellValue::DateTime(ts.format("%Y-%m-%d %H:%M:%S").to_string()),
            None => CellValue::Float(dt.as_f64()),
        },
        Data::DateTimeIso(s) => CellValue::DateTime(s.clone()),
        Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(_) | Data::Empty => CellValue::Null,
    }
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default `to_json(orient='records')`):
///
/// ```json
/// [
///   { "name": "Ann", "age": 31, "member": true },
///   { "name": "Bo",  "age": null }
/// ]
/// ```
///
/// Columns appear in first-seen key order; absent keys are missing values.
fn load_json(path: &Path) -> Result<Vec<Column>> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let records = root
        .as_array()
        .context("Expected top-level JSON array")?;

    let mut headers: Vec<String> = Vec::new();
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;
        for key in obj.keys() {
            if !headers.contains(key) {
                headers.push(key.clone());
            }
        }
    }

    Ok(headers
        .into_iter()
        .map(|name| {
            let cells = records
                .iter()
                .map(|rec| rec.get(&name).map_or(CellValue::Null, json_to_cell))
                .collect();
            infer_from_cells(name, cells)
        })
        .collect())
}

fn json_to_cell(val: &JsonValue) -> CellValue {
    match val {
        JsonValue::String(s) => CellValue::Text(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                CellValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                CellValue::Float(f)
            } else {
                CellValue::Text(n.to_string())
            }
        }
        JsonValue::Bool(b) => CellValue::Bool(*b),
        JsonValue::Null => CellValue::Null,
        other => CellValue::Text(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a flat Parquet file: each top-level field becomes one column.
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`).
fn load_parquet(path: &Path) -> Result<Vec<Column>> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .context("reading parquet metadata")?;
    let headers: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build().context("building parquet reader")?;

    let mut cells: Vec<Vec<CellValue>> = vec![Vec::new(); headers.len()];
    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        for (idx, col) in cells.iter_mut().enumerate() {
            let array = batch.column(idx);
            for row in 0..batch.num_rows() {
                col.push(
                    arrow_cell(array, row)
                        .with_context(|| format!("Row {row}: failed to read '{}'", headers[idx]))?,
                );
            }
        }
    }

    Ok(headers
        .into_iter()
        .zip(cells)
        .map(|(name, values)| infer_from_cells(name, values))
        .collect())
}

/// Extract a single cell from an Arrow column at a given row.
fn arrow_cell(col: &ArrayRef, row: usize) -> Result<CellValue> {
    if col.is_null(row) {
        return Ok(CellValue::Null);
    }
    let cell = match col.data_type() {
        DataType::Utf8 => CellValue::Text(col.as_string::<i32>().value(row).to_string()),
        DataType::LargeUtf8 => CellValue::Text(col.as_string::<i64>().value(row).to_string()),
        DataType::Int8 => CellValue::Integer(col.as_primitive::<Int8Type>().value(row) as i64),
        DataType::Int16 => CellValue::Integer(col.as_primitive::<Int16Type>().value(row) as i64),
        DataType::Int32 => CellValue::Integer(col.as_primitive::<Int32Type>().value(row) as i64),
        DataType::Int64 => CellValue::Integer(col.as_primitive::<Int64Type>().value(row)),
        DataType::UInt8 => CellValue::Integer(col.as_primitive::<UInt8Type>().value(row) as i64),
        DataType::UInt16 => CellValue::Integer(col.as_primitive::<UInt16Type>().value(row) as i64),
        DataType::UInt32 => CellValue::Integer(col.as_primitive::<UInt32Type>().value(row) as i64),
        DataType::UInt64 => {
            let v = col.as_primitive::<UInt64Type>().value(row);
            i64::try_from(v).map_or(CellValue::Float(v as f64), CellValue::Integer)
        }
        DataType::Float32 => CellValue::Float(col.as_primitive::<Float32Type>().value(row) as f64),
        DataType::Float64 => CellValue::Float(col.as_primitive::<Float64Type>().value(row)),
        DataType::Boolean => CellValue::Bool(col.as_boolean().value(row)),
        DataType::Date32 | DataType::Date64 | DataType::Timestamp(_, _) => {
            CellValue::DateTime(array_value_to_string(col, row)?)
        }
        _ => CellValue::Text(array_value_to_string(col, row)?),
    };
    Ok(cell)
}
