//! Min-max rescaling and numeric coercion.
//!
//! Legacy parity: with `normalize_before_split` the min/max of each column are
//! taken over the whole sheet, before the split. The evaluation rows therefore
//! shape the scaling of the training rows (look-ahead leakage). The corrected
//! mode fits a `MinMaxScaler` on the training partition only.

use crate::config::ColumnMapping;
use crate::domain::{Cell, FeatureMatrix, InstrumentTable};
use crate::utils::maths_utils::{get_min_max, min_max_scale};

use super::stage::SkipReason;

/// The numeric part of a sheet after coercion: configured columns as `f64`,
/// rows without a numeric target removed.
#[derive(Debug, Clone, PartialEq)]
pub struct NumericTable {
    pub index: Vec<String>,
    column_names: Vec<String>,
    columns: Vec<Vec<f64>>,
    pub target_name: String,
    pub target: Vec<f64>,
    /// Rows removed because the target (or a feature) failed coercion
    pub dropped_rows: usize,
}

impl NumericTable {
    pub fn n_rows(&self) -> usize {
        self.index.len()
    }

    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.column_names
            .iter()
            .position(|c| c == name)
            .map(|pos| self.columns[pos].as_slice())
    }

    pub fn column_names(&self) -> &[String] {
        &self.column_names
    }
}

/// `x' = (x - min) / (max - min)` over the full column; a constant column becomes all zeros.
pub fn normalize_column(values: &[f64]) -> Vec<f64> {
    match get_min_max(values) {
        Some((min, max)) => values.iter().map(|&v| min_max_scale(v, min, max)).collect(),
        None => vec![0.0; values.len()],
    }
}

/// Coerce the configured columns to numbers, optionally rescale price and
/// features over the full column, then drop rows whose target is not numeric.
///
/// Rescaling happens before the drop, as the legacy workflow did, so the
/// statistics include rows that are later discarded.
pub fn prepare_table(
    table: &InstrumentTable,
    columns: &ColumnMapping,
    rescale: bool,
) -> Result<NumericTable, SkipReason> {
    let names = columns.columns_to_normalize();

    let mut raw: Vec<Vec<Option<f64>>> = Vec::with_capacity(names.len());
    for name in &names {
        let cells = table
            .column(name)
            .ok_or_else(|| SkipReason::Schema {
                missing: vec![name.clone()],
            })?;
        let mut values: Vec<Option<f64>> = cells.iter().map(Cell::as_f64).collect();

        if rescale {
            let present: Vec<f64> = values.iter().flatten().copied().collect();
            for (v, scaled) in values.iter_mut().flatten().zip(normalize_column(&present)) {
                *v = scaled;
            }
        }
        raw.push(values);
    }

    let target_cells = table
        .column(&columns.detail)
        .ok_or_else(|| SkipReason::Schema {
            missing: vec![columns.detail.clone()],
        })?;

    let mut index = Vec::with_capacity(table.n_rows());
    let mut target = Vec::with_capacity(table.n_rows());
    let mut kept: Vec<Vec<f64>> = vec![Vec::with_capacity(table.n_rows()); names.len()];
    let mut bad_target = 0;
    let mut bad_feature = 0;

    for (row, cell) in target_cells.iter().enumerate() {
        let Some(y) = cell.as_f64() else {
            bad_target += 1;
            continue;
        };
        if raw.iter().any(|col| col[row].is_none()) {
            bad_feature += 1;
            continue;
        }
        for (dst, col) in kept.iter_mut().zip(&raw) {
            dst.push(col[row].unwrap_or(0.0));
        }
        index.push(table.index()[row].clone());
        target.push(y);
    }

    if bad_target + bad_feature > 0 {
        log::debug!(
            "Sheet '{}': dropped {} rows with a non-numeric target and {} with non-numeric features",
            table.name,
            bad_target,
            bad_feature
        );
    }

    if target.is_empty() {
        return Err(SkipReason::DataQuality(
            "no rows left after numeric coercion".to_string(),
        ));
    }

    Ok(NumericTable {
        index,
        column_names: names,
        columns: kept,
        target_name: columns.detail.clone(),
        target,
        dropped_rows: bad_target + bad_feature,
    })
}

/// Per-column min/max fitted on one matrix and applied to others.
#[derive(Debug, Clone, PartialEq)]
pub struct MinMaxScaler {
    ranges: Vec<(f64, f64)>,
}

impl MinMaxScaler {
    pub fn fit(matrix: &FeatureMatrix) -> Self {
        let ranges = (0..matrix.n_cols())
            .map(|c| get_min_max(&matrix.column(c)).unwrap_or((0.0, 0.0)))
            .collect();
        Self { ranges }
    }

    /// Values outside the fitted range land outside [0, 1]; that is expected
    /// for evaluation rows.
    pub fn transform(&self, matrix: &mut FeatureMatrix) {
        matrix.map_columns(|col, v| {
            let (min, max) = self.ranges[col];
            min_max_scale(v, min, max)
        });
    }
}
