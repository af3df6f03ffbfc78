//! Fans the pipeline out over every sheet of every configuration and fans the
//! results back in for grading.

use std::path::Path;
use std::time::Duration;

use rayon::prelude::*;

use crate::config::{AnalysisConfig, ColumnMapping, PipelineSettings, SheetConfiguration};
use crate::data::{SheetMap, SpreadsheetSource, WorkbookSource};
use crate::domain::SheetResult;
use crate::models::{MlpRegressor, Trainer};
use crate::pipeline::{SkippedSheet, process_sheet};

use super::grading::assign_grades;
use super::report::{AnalysisReport, ConfigurationReport};

/// Trainer built from the run's model settings and time budget.
pub fn default_trainer(settings: &PipelineSettings) -> MlpRegressor {
    MlpRegressor::new(settings.model.clone())
        .with_time_limit(settings.max_training_time_secs.map(Duration::from_secs))
}

/// Process every sheet (in parallel), then grade the survivors as one set.
pub fn analyze_sheets<T: Trainer>(
    name: &str,
    sheets: &SheetMap,
    columns: &ColumnMapping,
    settings: &PipelineSettings,
    trainer: &T,
) -> ConfigurationReport {
    let outcomes: Vec<Result<SheetResult, SkippedSheet>> = sheets
        .par_iter()
        .map(|(_, table)| process_sheet(table, columns, settings, trainer))
        .collect();

    // Barrier: grading needs the complete set
    let mut results = Vec::with_capacity(outcomes.len());
    let mut skipped = Vec::new();
    for outcome in outcomes {
        match outcome {
            Ok(result) => results.push(result),
            Err(skip) => {
                log::warn!("⚠️ [{}] {}", name, skip);
                skipped.push(skip);
            }
        }
    }
    let results = assign_grades(results, &settings.grading);

    for result in &results {
        log::debug!(
            "[{}] #{} {} final value {} grade {} (threshold {:.4})",
            name,
            result.rank.unwrap_or_default(),
            result.sheet_name,
            result.final_value,
            result.grade.map(|g| g.to_string()).unwrap_or_default(),
            result.optimal_threshold
        );
    }

    ConfigurationReport {
        name: name.to_string(),
        results,
        skipped,
        source_error: None,
    }
}

/// Load one configuration's workbook and analyze it. An unavailable workbook
/// yields a report carrying the source error and no results.
pub fn run_configuration<S: WorkbookSource, T: Trainer>(
    source: &S,
    trainer: &T,
    data_dir: &Path,
    sheet_config: &SheetConfiguration,
    config: &AnalysisConfig,
) -> ConfigurationReport {
    let path = data_dir.join(&sheet_config.file_name);
    log::info!(
        "🔍 Analyzing configuration {} from {}",
        sheet_config.name,
        path.display()
    );

    let sheets = match source.load_sheets(&path, &config.index_column) {
        Ok(sheets) => sheets,
        Err(e) => {
            log::error!("❌ Skipping configuration {}: {}", sheet_config.name, e);
            return ConfigurationReport::unavailable(&sheet_config.name, e);
        }
    };

    let report = analyze_sheets(
        &sheet_config.name,
        &sheets,
        &sheet_config.columns,
        &config.pipeline,
        trainer,
    );
    log::info!(
        "✅ {}: {} of {} sheets scored, {} skipped",
        report.name,
        report.results.len(),
        sheets.len(),
        report.skipped.len()
    );
    report
}

/// Every configuration, in enumeration order, with explicit collaborators.
pub fn run_full_analysis_with<S: WorkbookSource, T: Trainer>(
    source: &S,
    trainer: &T,
    data_dir: &Path,
    config: &AnalysisConfig,
) -> AnalysisReport {
    let configurations = config
        .configurations
        .iter()
        .map(|sheet_config| run_configuration(source, trainer, data_dir, sheet_config, config))
        .collect();
    AnalysisReport::new(configurations)
}

/// Run the whole analysis over the workbooks in `data_dir`.
pub fn run_full_analysis(data_dir: &Path, config: &AnalysisConfig) -> AnalysisReport {
    let trainer = default_trainer(&config.pipeline);
    run_full_analysis_with(&SpreadsheetSource, &trainer, data_dir, config)
}
