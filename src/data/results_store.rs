//! Write-once results sink: one JSON document for the run plus one CSV table
//! per configuration.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use indexmap::IndexMap;

use crate::analysis::AnalysisReport;
use crate::config::{results_csv_filename, results_json_filename};
use crate::domain::SheetResult;

/// Configuration name -> ordered results, in configuration order.
pub type ResultsMap = IndexMap<String, Vec<SheetResult>>;

pub fn write_results_json(results: &ResultsMap, path: &Path) -> Result<()> {
    let file = File::create(path).context(format!("Failed to create file: {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, results)
        .context(format!("Failed to write results to: {}", path.display()))?;
    writer
        .flush()
        .context(format!("Failed to flush: {}", path.display()))
}

pub fn read_results_json(path: &Path) -> Result<ResultsMap> {
    let file = File::open(path).context(format!("Failed to open results file: {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .context(format!("Failed to parse results file: {}", path.display()))
}

/// One row per sheet, in ranking order.
pub fn write_results_csv(results: &[SheetResult], path: &Path) -> Result<()> {
    let mut writer =
        csv::Writer::from_path(path).context(format!("Failed to create file: {}", path.display()))?;
    for result in results {
        writer
            .serialize(result)
            .context(format!("Failed to write row for sheet {}", result.sheet_name))?;
    }
    writer
        .flush()
        .context(format!("Failed to flush: {}", path.display()))
}

/// Write every output file of the run into `output_dir` (created if needed).
/// Returns the paths written.
pub fn save_report(report: &AnalysisReport, output_dir: &Path) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(output_dir)
        .context(format!("Failed to create directory: {}", output_dir.display()))?;

    let results = report.results_map();
    let mut written = Vec::with_capacity(results.len() + 1);

    let json_path = output_dir.join(results_json_filename());
    write_results_json(&results, &json_path)?;
    written.push(json_path);

    for (name, rows) in &results {
        let csv_path = output_dir.join(results_csv_filename(name));
        write_results_csv(rows, &csv_path)?;
        written.push(csv_path);
    }

    Ok(written)
}
