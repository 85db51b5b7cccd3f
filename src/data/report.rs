use std::fmt::Write as _;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDateTime;

use super::model::format_float;
use super::summary::Summary;

const STAT_HEADERS: [&str; 12] = [
    "column", "count", "unique", "top", "freq", "mean", "std", "min", "25%", "50%", "75%", "max",
];

/// Render the summary as a Markdown report.
pub fn render_report(summary: &Summary, filename: &str, generated_at: NaiveDateTime) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = writeln!(out, "# Data Analysis Report\n");
    let _ = writeln!(out, "Generated on {}\n", generated_at.format("%Y-%m-%d %H:%M:%S"));
    let _ = writeln!(out, "File: {}\n", escape(filename));

    let _ = writeln!(out, "## Statistics\n");
    table_header(&mut out, &STAT_HEADERS);
    for row in &summary.rows {
        let cells = [
            escape(&row.column),
            row.count.to_string(),
            opt(row.unique),
            row.top.as_deref().map(escape).unwrap_or_default(),
            opt(row.freq),
            num(row.mean),
            num(row.std),
            num(row.min),
            num(row.q25),
            num(row.q50),
            num(row.q75),
            num(row.max),
        ];
        let _ = writeln!(out, "| {} |", cells.join(" | "));
    }

    let _ = writeln!(out, "\n## Missing Values\n");
    table_header(&mut out, &["column", "missing values"]);
    for row in &summary.rows {
        let _ = writeln!(out, "| {} | {} |", escape(&row.column), row.missing_values);
    }
    out
}

/// Render and save the report to `path`.
pub fn write_report(path: &Path, summary: &Summary, filename: &str, generated_at: NaiveDateTime) -> Result<()> {
    std::fs::write(path, render_report(summary, filename, generated_at))
        .with_context(|| format!("writing report to {}", path.display()))?;
    log::info!("Wrote report for {filename} to {}", path.display());
    Ok(())
}

/// `report_<stem>.md` for an uploaded file name.
pub fn report_file_name(filename: &str) -> String {
    let stem = Path::new(filename)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("data");
    format!("report_{stem}.md")
}

fn table_header(out: &mut String, headers: &[&str]) {
    let _ = writeln!(out, "| {} |", headers.join(" | "));
    let _ = writeln!(out, "|{}", "---|".repeat(headers.len()));
}

fn escape(s: &str) -> String {
    s.replace('|', "\\|")
}

fn opt(v: Option<usize>) -> String {
    v.map(|n| n.to_string()).unwrap_or_default()
}

fn num(v: Option<f64>) -> String {
    v.map(|x| {
        if x.fract() == 0.0 {
            format_float(x)
        } else {
            format!("{x:.4}")
        }
    })
    .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::summary::SummaryRow;
    use chrono::NaiveDate;

    fn row(column: &str) -> SummaryRow {
        SummaryRow {
            column: column.to_string(),
            dtype: "float64".to_string(),
            count: 3,
            unique: None,
            top: None,
            freq: None,
            mean: Some(2.0),
            std: Some(1.0 / 3.0),
            min: Some(1.0),
            q25: Some(1.5),
            q50: Some(2.0),
            q75: Some(2.5),
            max: Some(3.0),
            mode: Some("1.0".to_string()),
            missing_values: 1,
        }
    }

    #[test]
    fn report_lists_statistics_and_missing_values() {
        let summary = Summary { rows: vec![row("a|b")] };
        let at = NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap();
        let text = render_report(&summary, "data.csv", at);

        assert!(text.starts_with("# Data Analysis Report"));
        assert!(text.contains("Generated on 2024-03-01 09:30:00"));
        assert!(text.contains("File: data.csv"));
        assert!(text.contains("| a\\|b | 3 |  |  |  | 2.0 | 0.3333 | 1.0 | 1.5000 | 2.0 | 2.5000 | 3.0 |"));
        assert!(text.contains("| a\\|b | 1 |"));
    }

    #[test]
    fn report_names_use_the_stem() {
        assert_eq!(report_file_name("sales.xlsx"), "report_sales.md");
    }
}
