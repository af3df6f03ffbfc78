//! Drives one sheet through every stage up to `Scored`.

use crate::config::{ColumnMapping, PRINT_TABLE_PROFILES, PipelineSettings};
use crate::domain::{InstrumentTable, SheetResult};
use crate::models::{Model, Trainer};

use super::normalization::{MinMaxScaler, prepare_table};
use super::scoring::{build_result, score};
use super::split::split_table;
use super::stage::{SkipReason, SkippedSheet, Stage};
use super::threshold::optimal_threshold;
use super::validation::{ValidationRules, validate_sheet};

fn log_profile(table: &InstrumentTable, columns: &ColumnMapping) {
    let profile = table.profile(&columns.price);
    log::debug!(
        "Sheet '{}': {} rows x {} columns ({} cells), {} empty",
        table.name,
        profile.rows,
        profile.columns,
        profile.cell_count,
        profile.total_nulls()
    );
    if PRINT_TABLE_PROFILES {
        for (column, nulls) in profile.null_counts.iter().filter(|(_, n)| *n > 0) {
            log::debug!("    {:<24} {} empty", column, nulls);
        }
        for (price, count) in &profile.top_prices {
            log::debug!("    price {:>12.4} x{}", price, count);
        }
    }
}

/// Run validation, normalization, split, training, threshold selection and
/// scoring for one sheet. The returned result is ungraded.
///
/// Any failure becomes a `SkippedSheet` naming the stage that was not reached.
pub fn process_sheet<T: Trainer>(
    table: &InstrumentTable,
    columns: &ColumnMapping,
    settings: &PipelineSettings,
    trainer: &T,
) -> Result<SheetResult, SkippedSheet> {
    let skip = |stage: Stage| {
        let name = table.name.as_str();
        move |reason: SkipReason| SkippedSheet::new(name, stage, reason)
    };

    if log::log_enabled!(log::Level::Debug) {
        log_profile(table, columns);
    }

    // Pending -> Validated
    let rules = ValidationRules::new(columns, settings);
    validate_sheet(table, &rules).map_err(skip(Stage::Validated))?;

    // Validated -> Normalized
    let numeric = prepare_table(table, columns, settings.normalize_before_split)
        .map_err(skip(Stage::Normalized))?;

    // Normalized -> Split
    let mut split = split_table(&numeric, &columns.features, &settings.split)
        .map_err(skip(Stage::Split))?;
    if !settings.normalize_before_split {
        let scaler = MinMaxScaler::fit(&split.train.features);
        scaler.transform(&mut split.train.features);
        scaler.transform(&mut split.test.features);
    }

    // Split -> Trained
    let model = trainer
        .fit(&split.train.features, &split.train.target)
        .map_err(|e| skip(Stage::Trained)(SkipReason::TrainingFailure(e.to_string())))?;
    let predictions = model.predict(&split.test.features);

    // Trained -> Thresholded
    let threshold =
        optimal_threshold(&split.test.target, &predictions).map_err(skip(Stage::Thresholded))?;

    // Thresholded -> Scored
    let sheet_score = score(&split.test.target, &predictions, threshold);
    let result = build_result(&table.name, &sheet_score, threshold, &predictions);

    log::debug!(
        "Sheet '{}': final value {} (actual {} / predicted {}), threshold {:.4}, {}",
        table.name,
        sheet_score.final_value,
        sheet_score.actual_positive_count,
        sheet_score.predicted_positive_count,
        threshold,
        result.outlook
    );

    Ok(result)
}
