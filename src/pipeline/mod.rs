//! The per-instrument analysis pipeline.
//!
//! `Pending -> Validated -> Normalized -> Split -> Trained -> Thresholded -> Scored`,
//! then `Graded` once the whole configuration is known (see `analysis`).
//! Every stage is a pure function of its inputs.

pub mod normalization;
pub mod scoring;
pub mod sheet;
pub mod split;
pub mod stage;
pub mod threshold;
pub mod validation;

#[cfg(test)]
pub(crate) mod test_fixtures;

pub use normalization::{MinMaxScaler, NumericTable, normalize_column, prepare_table};
pub use scoring::{SheetScore, build_result, score};
pub use sheet::process_sheet;
pub use split::{Partition, TrainTestSplit, split_indices, split_table};
pub use stage::{SkipReason, SkippedSheet, Stage};
pub use threshold::{RocCurve, optimal_threshold, roc_curve};
pub use validation::{ValidationRules, validate_sheet};
