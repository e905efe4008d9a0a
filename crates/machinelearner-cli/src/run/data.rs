//! Delimited text loader for numeric feature tables.
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use csv::StringRecord;
use ndarray::{Array1, Array2};

/// Features and (when the target column is present) targets of one file.
#[derive(Debug)]
pub struct TableData {
    pub feature_names: Vec<String>,
    pub x: Array2<f64>,
    pub y: Option<Array1<f64>>,
}

fn delimiter_for(path: &Path) -> u8 {
    match path.extension().and_then(|s| s.to_str()).map(|s| s.to_lowercase()) {
        Some(ext) if ext == "tsv" => b'\t',
        _ => b',',
    }
}

fn find_column(headers: &StringRecord, name: &str) -> Option<usize> {
    headers.iter().position(|h| h.trim() == name)
}

fn parse_value(raw: &str, column: &str, row_idx: usize) -> Result<f64> {
    raw.trim()
        .parse::<f64>()
        .with_context(|| format!("Invalid number '{}' in column '{}' at row {}", raw, column, row_idx + 1))
}

/// Read a CSV or TSV file with a header row. Every column except
/// `target_column` is a feature.
pub fn read_table<P: AsRef<Path>>(path: P, target_column: &str) -> Result<TableData> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter_for(path.as_ref()))
        .has_headers(true)
        .from_path(&path)
        .with_context(|| format!("Failed to open data file: {}", path.as_ref().display()))?;

    let headers = reader
        .headers()
        .context("Failed to read header row")?
        .clone();

    let target_idx = find_column(&headers, target_column);
    let feature_indices: Vec<usize> = (0..headers.len()).filter(|&i| Some(i) != target_idx).collect();
    if feature_indices.is_empty() {
        return Err(anyhow!("No feature columns found in {}", path.as_ref().display()));
    }
    let feature_names: Vec<String> = feature_indices
        .iter()
        .map(|&i| headers[i].trim().to_string())
        .collect();

    let mut features = Vec::new();
    let mut targets = Vec::new();
    let mut n_rows = 0usize;

    for (row_idx, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("Failed to read row {}", row_idx + 1))?;
        for (&col, name) in feature_indices.iter().zip(feature_names.iter()) {
            let raw = record
                .get(col)
                .ok_or_else(|| anyhow!("Missing value for '{}' at row {}", name, row_idx + 1))?;
            features.push(parse_value(raw, name, row_idx)?);
        }
        if let Some(idx) = target_idx {
            let raw = record
                .get(idx)
                .ok_or_else(|| anyhow!("Missing target value at row {}", row_idx + 1))?;
            targets.push(parse_value(raw, target_column, row_idx)?);
        }
        n_rows += 1;
    }

    if n_rows == 0 {
        return Err(anyhow!("No data rows in {}", path.as_ref().display()));
    }

    let x = Array2::from_shape_vec((n_rows, feature_indices.len()), features)
        .context("Failed to build feature matrix")?;
    let y = target_idx.map(|_| Array1::from_vec(targets));

    log::debug!(
        "Loaded {} rows x {} features from {} (target column {})",
        n_rows,
        feature_names.len(),
        path.as_ref().display(),
        if y.is_some() { "present" } else { "absent" }
    );

    Ok(TableData {
        feature_names,
        x,
        y,
    })
}
