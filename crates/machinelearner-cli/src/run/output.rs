use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use ndarray::Array1;

fn delimiter_for(path: &Path) -> u8 {
    match path.extension().and_then(|ext| ext.to_str()).map(|ext| ext.to_lowercase()) {
        Some(ext) if ext == "csv" => b',',
        _ => b'\t',
    }
}

fn write_rows<W: Write>(
    writer: &mut csv::Writer<W>,
    predictions: &Array1<f64>,
    targets: Option<&Array1<f64>>,
) -> Result<()> {
    match targets {
        Some(_) => writer.write_record(["row", "prediction", "target"])?,
        None => writer.write_record(["row", "prediction"])?,
    }

    for (i, pred) in predictions.iter().enumerate() {
        let row = i.to_string();
        let pred = pred.to_string();
        match targets.and_then(|t| t.get(i)) {
            Some(target) => writer.write_record([row, pred, target.to_string()])?,
            None => writer.write_record([row, pred])?,
        }
    }

    writer.flush()?;
    Ok(())
}

/// Write predictions (and targets, when known) as a delimited table.
///
/// Writes TSV to stdout when `output_path` is `None`; otherwise the
/// delimiter follows the file extension.
pub fn write_predictions<P: AsRef<Path>>(
    predictions: &Array1<f64>,
    targets: Option<&Array1<f64>>,
    output_path: Option<P>,
) -> Result<()> {
    match output_path {
        Some(path) => {
            let path = path.as_ref();
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file: {:?}", path))?;
            let mut writer = csv::WriterBuilder::new()
                .delimiter(delimiter_for(path))
                .from_writer(BufWriter::new(file));
            write_rows(&mut writer, predictions, targets)?;
            log::info!("Wrote {} predictions to {:?}", predictions.len(), path);
        }
        None => {
            let stdout = io::stdout();
            let mut writer = csv::WriterBuilder::new()
                .delimiter(b'\t')
                .from_writer(stdout.lock());
            write_rows(&mut writer, predictions, targets)?;
        }
    }
    Ok(())
}
