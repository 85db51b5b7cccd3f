use std::collections::HashMap;
use std::io;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use super::aggregate::{mean, modes, quantile_sorted, sample_std, sorted};
use super::model::{CellValue, Column, Dataset};

// ---------------------------------------------------------------------------
// Summary – one row of descriptive statistics per column
// ---------------------------------------------------------------------------

/// `describe`-style statistics for one column.
///
/// Numeric columns fill `mean`..`max`; every other column fills
/// `unique`/`top`/`freq`. Fields that do not apply stay `None` and are
/// written as empty CSV cells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRow {
    pub column: String,
    pub dtype: String,
    pub count: usize,
    pub unique: Option<usize>,
    pub top: Option<String>,
    pub freq: Option<usize>,
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub min: Option<f64>,
    #[serde(rename = "25%")]
    pub q25: Option<f64>,
    #[serde(rename = "50%")]
    pub q50: Option<f64>,
    #[serde(rename = "75%")]
    pub q75: Option<f64>,
    pub max: Option<f64>,
    pub mode: Option<String>,
    pub missing_values: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Summary {
    pub rows: Vec<SummaryRow>,
}

impl Summary {
    pub fn get(&self, column: &str) -> Option<&SummaryRow> {
        self.rows.iter().find(|r| r.column == column)
    }

    /// Write one CSV record per column, header first.
    pub fn write_csv<W: io::Write>(&self, writer: W) -> Result<(), csv::Error> {
        let mut wtr = csv::Writer::from_writer(writer);
        for row in &self.rows {
            wtr.serialize(row)?;
        }
        wtr.flush()?;
        Ok(())
    }

    /// Read back a summary produced by [`Summary::write_csv`].
    pub fn read_csv<R: io::Read>(reader: R) -> Result<Self, csv::Error> {
        let mut rdr = csv::Reader::from_reader(reader);
        let rows = rdr.deserialize().collect::<Result<Vec<SummaryRow>, _>>()?;
        Ok(Summary { rows })
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let file = std::fs::File::create(path)
            .with_context(|| format!("creating {}", path.display()))?;
        self.write_csv(file)
            .with_context(|| format!("writing summary to {}", path.display()))?;
        log::info!("Wrote analysis for {} columns to {}", self.rows.len(), path.display());
        Ok(())
    }
}

/// Describe every column of `dataset`, in column order.
pub fn describe(dataset: &Dataset) -> Summary {
    Summary {
        rows: dataset.columns().iter().map(describe_column).collect(),
    }
}

fn describe_column(column: &Column) -> SummaryRow {
    let count = column.present_values().count();
    let mut row = SummaryRow {
        column: column.name.clone(),
        dtype: column.dtype.name().to_string(),
        count,
        unique: None,
        top: None,
        freq: None,
        mean: None,
        std: None,
        min: None,
        q25: None,
        q50: None,
        q75: None,
        max: None,
        mode: modes(&column.values).first().map(ToString::to_string),
        missing_values: column.missing_count(),
    };

    if column.dtype.is_numeric() {
        let values = column.numeric_values();
        let ordered = sorted(&values);
        row.mean = mean(&values);
        row.std = sample_std(&values);
        row.min = ordered.first().copied();
        row.q25 = quantile_sorted(&ordered, 0.25);
        row.q50 = quantile_sorted(&ordered, 0.5);
        row.q75 = quantile_sorted(&ordered, 0.75);
        row.max = ordered.last().copied();
    } else {
        let (unique, top) = frequencies(column.present_values());
        row.unique = Some(unique);
        if let Some((value, n)) = top {
            row.top = Some(value.to_string());
            row.freq = Some(n);
        }
    }
    row
}

/// Distinct count plus the most frequent value; ties go to the value seen
/// first.
fn frequencies<'a>(values: impl Iterator<Item = &'a CellValue>) -> (usize, Option<(&'a CellValue, usize)>) {
    let mut counts: HashMap<&CellValue, usize> = HashMap::new();
    let mut order: Vec<&CellValue> = Vec::new();
    for v in values {
        let n = counts.entry(v).or_default();
        if *n == 0 {
            order.push(v);
        }
        *n += 1;
    }

    let mut top: Option<(&CellValue, usize)> = None;
    for v in order {
        let n = counts[v];
        if top.map_or(true, |(_, best)| n > best) {
            top = Some((v, n));
        }
    }
    (counts.len(), top)
}

/// `analysis_<stem>.csv` for an uploaded file name.
pub fn analysis_file_name(filename: &str) -> String {
    let stem = Path::new(filename)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("data");
    format!("analysis_{stem}.csv")
}
