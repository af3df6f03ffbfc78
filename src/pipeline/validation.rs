//! Schema gate. Runs before any numeric transform so malformed sheets never
//! reach the trainer.

use crate::config::{ColumnMapping, PipelineSettings};
use crate::domain::{Cell, InstrumentTable};

use super::stage::SkipReason;

/// What a sheet must satisfy to enter the pipeline.
#[derive(Debug, Clone)]
pub struct ValidationRules {
    pub required_columns: Vec<String>,
    /// Columns that must coerce to a number for a row to count as usable
    pub numeric_columns: Vec<String>,
    pub target_column: String,
    /// Minimum usable rows: the configured floor or what the split policy
    /// needs for non-empty partitions, whichever is larger
    pub min_rows: usize,
}

impl ValidationRules {
    pub fn new(columns: &ColumnMapping, settings: &PipelineSettings) -> Self {
        Self {
            required_columns: columns.required_columns(),
            numeric_columns: columns.columns_to_normalize(),
            target_column: columns.detail.clone(),
            min_rows: settings.min_rows.max(settings.split.min_rows()),
        }
    }
}

/// Targets of the rows that survive numeric coercion, in row order.
fn usable_targets(table: &InstrumentTable, rules: &ValidationRules) -> Vec<f64> {
    let target = table.column(&rules.target_column).unwrap_or_default();
    let numeric: Vec<&[Cell]> = rules
        .numeric_columns
        .iter()
        .filter_map(|name| table.column(name))
        .collect();

    target
        .iter()
        .enumerate()
        .filter_map(|(row, cell)| {
            let y = cell.as_f64()?;
            numeric
                .iter()
                .all(|col| col[row].as_f64().is_some())
                .then_some(y)
        })
        .collect()
}

/// Check columns, usable row count and that the target holds at least two classes.
pub fn validate_sheet(table: &InstrumentTable, rules: &ValidationRules) -> Result<(), SkipReason> {
    // 1. Every configured column must exist
    let missing: Vec<String> = rules
        .required_columns
        .iter()
        .filter(|col| !table.has_column(col))
        .cloned()
        .collect();
    if !missing.is_empty() {
        return Err(SkipReason::Schema { missing });
    }

    // 2. Enough rows left after coercion for a train and a test partition
    let mut classes = usable_targets(table, rules);
    if classes.len() < rules.min_rows {
        return Err(SkipReason::DataQuality(format!(
            "only {} usable rows out of {} (minimum: {})",
            classes.len(),
            table.n_rows(),
            rules.min_rows
        )));
    }

    // 3. A single-class target can never produce a ROC curve
    classes.sort_by(f64::total_cmp);
    classes.dedup();
    if classes.len() < 2 {
        return Err(SkipReason::DataQuality(format!(
            "target column '{}' holds a single class ({})",
            rules.target_column,
            classes.first().copied().unwrap_or_default()
        )));
    }

    Ok(())
}
