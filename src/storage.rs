use crate::annotate::{Anchor, Annotation};
use crate::grid::PairGrid;
use crate::models::Dataset;
use crate::stats::Summary;
use anyhow::{Context, Result, anyhow};
use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Load a CSV file with a header row into a [`Dataset`].
///
/// Numeric variables are the columns (other than `hue`) whose non-empty cells
/// all parse as numbers. Rows with a missing numeric value, or a missing
/// group label, are dropped.
pub fn load_csv<P: AsRef<Path>>(path: P, hue: Option<&str>) -> Result<Dataset> {
    let path = path.as_ref();
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("opening {}", path.display()))?;
    let headers = rdr.headers()?.clone();
    let records: Vec<StringRecord> = rdr.records().collect::<Result<_, _>>()?;

    let hue_idx = match hue {
        Some(h) => Some(
            headers
                .iter()
                .position(|c| c == h)
                .ok_or_else(|| anyhow!("hue column `{h}` not found in {}", path.display()))?,
        ),
        None => None,
    };

    let numeric: Vec<usize> = (0..headers.len())
        .filter(|&i| Some(i) != hue_idx)
        .filter(|&i| {
            let mut cells = records.iter().filter_map(|r| r.get(i)).filter(|c| !c.is_empty());
            let mut any = false;
            let all_numeric = cells.all(|c| {
                any = true;
                c.parse::<f64>().is_ok()
            });
            any && all_numeric
        })
        .collect();
    if numeric.is_empty() {
        return Err(anyhow!("no numeric columns in {}", path.display()));
    }

    let variables = numeric.iter().map(|&i| headers[i].to_string()).collect();
    let mut dataset = Dataset::new(variables, hue.map(str::to_string))?;
    let mut dropped = 0usize;
    for record in &records {
        let values: Option<Vec<f64>> = numeric
            .iter()
            .map(|&i| {
                record
                    .get(i)
                    .and_then(|c| c.parse::<f64>().ok())
                    .filter(|v| !v.is_nan())
            })
            .collect();
        let group = hue_idx.and_then(|i| record.get(i)).filter(|g| !g.is_empty());
        match (values, hue_idx, group) {
            (Some(values), None, _) => dataset.push(values, None)?,
            (Some(values), Some(_), Some(g)) => dataset.push(values, Some(g.to_string()))?,
            _ => dropped += 1,
        }
    }
    if dropped > 0 {
        log::info!(
            "dropped {dropped} of {} rows with missing values from {}",
            records.len(),
            path.display()
        );
    }
    Ok(dataset)
}

/// Neutralise spreadsheet formula injection in a text cell.
pub fn csv_safe(cell: &str) -> String {
    if cell.starts_with(['=', '+', '-', '@']) {
        format!("'{cell}")
    } else {
        cell.to_string()
    }
}

#[derive(Serialize)]
struct PanelAnnotation<'a> {
    row_variable: &'a str,
    column_variable: &'a str,
    #[serde(flatten)]
    annotation: &'a Annotation,
}

/// Save every annotation of the grid as a pretty JSON array.
pub fn save_annotations_json<P: AsRef<Path>>(grid: &PairGrid, path: P) -> Result<()> {
    let records: Vec<PanelAnnotation<'_>> = grid
        .annotations()
        .map(|(panel, annotation)| PanelAnnotation {
            row_variable: &panel.y_var,
            column_variable: &panel.x_var,
            annotation,
        })
        .collect();
    let mut f = File::create(path)?;
    let s = serde_json::to_string_pretty(&records)?;
    f.write_all(s.as_bytes())?;
    Ok(())
}

/// Save every annotation of the grid as CSV, one row per label.
pub fn save_annotations_csv<P: AsRef<Path>>(grid: &PairGrid, path: P) -> Result<()> {
    let mut wtr = WriterBuilder::new().from_path(path)?;
    wtr.write_record([
        "row_variable",
        "column_variable",
        "statistic",
        "group",
        "text",
        "x",
        "y",
        "anchor",
        "stack_index",
        "color",
    ])?;
    for (panel, a) in grid.annotations() {
        let anchor = match a.anchor {
            Anchor::TopLeft => "top_left",
            Anchor::BottomLeft => "bottom_left",
        };
        wtr.write_record([
            csv_safe(&panel.y_var),
            csv_safe(&panel.x_var),
            a.statistic.to_string(),
            csv_safe(a.group.as_deref().unwrap_or("")),
            csv_safe(&a.text),
            format!("{:.4}", a.x),
            format!("{:.4}", a.y),
            anchor.to_string(),
            a.stack_index.to_string(),
            a.color.to_hex(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Save grouped summaries as CSV with header.
pub fn save_summary_csv<P: AsRef<Path>>(summaries: &[Summary], path: P) -> Result<()> {
    let mut wtr = WriterBuilder::new().from_path(path)?;
    wtr.serialize((
        "variable", "group", "count", "min", "max", "mean", "median", "std", "ks_p_value",
    ))?;
    for s in summaries {
        wtr.serialize((
            csv_safe(&s.variable),
            s.group.as_deref().map(csv_safe),
            s.count,
            s.min,
            s.max,
            s.mean,
            s.median,
            s.std,
            s.ks_p_value,
        ))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Save grouped summaries as a pretty JSON array.
pub fn save_summary_json<P: AsRef<Path>>(summaries: &[Summary], path: P) -> Result<()> {
    let mut f = File::create(path)?;
    let s = serde_json::to_string_pretty(summaries)?;
    f.write_all(s.as_bytes())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn formula_prefixes_are_escaped() {
        assert_eq!(csv_safe("=SUM(A1)"), "'=SUM(A1)");
        assert_eq!(csv_safe("-1.0"), "'-1.0");
        assert_eq!(csv_safe("@x"), "'@x");
        assert_eq!(csv_safe("μ=3.0, σ=1.41"), "μ=3.0, σ=1.41");
    }

    #[test]
    fn text_columns_are_not_variables() {
        let dir = tempdir().unwrap();
        let p = dir.path().join("d.csv");
        std::fs::write(&p, "name,a,b\nx,1,2\ny,3,\nz,5,6\n").unwrap();
        let ds = load_csv(&p, None).unwrap();
        assert_eq!(ds.variables(), &["a".to_string(), "b".to_string()]);
        assert_eq!(ds.len(), 2);
    }
}
