use serde::Serialize;

use crate::domain::{Outlook, SheetResult};

/// Per-instrument counts behind the final value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SheetScore {
    /// Sum of the raw evaluation predictions
    pub predicted_return: f64,
    /// Sum of the evaluation target
    pub actual_positive_count: f64,
    /// Predictions strictly above the threshold
    pub predicted_positive_count: usize,
    /// `actual_positive_count - predicted_positive_count`. Closer to zero is better calibrated.
    pub final_value: f64,
}

/// Score one instrument's evaluation block. Only meaningful for cross-instrument ranking.
pub fn score(target: &[f64], predictions: &[f64], optimal_threshold: f64) -> SheetScore {
    let predicted_return: f64 = predictions.iter().sum();
    let actual_positive_count: f64 = target.iter().sum();
    let predicted_positive_count = predictions
        .iter()
        .filter(|&&p| p > optimal_threshold)
        .count();

    SheetScore {
        predicted_return,
        actual_positive_count,
        predicted_positive_count,
        final_value: actual_positive_count - predicted_positive_count as f64,
    }
}

/// Ungraded result for a scored sheet. The outlook follows the last
/// (most recent) evaluation prediction.
pub fn build_result(
    sheet_name: &str,
    score: &SheetScore,
    optimal_threshold: f64,
    predictions: &[f64],
) -> SheetResult {
    let outlook = predictions
        .last()
        .map(|&last| Outlook::from_last_prediction(last, optimal_threshold))
        .unwrap_or(Outlook::Falling);

    SheetResult {
        sheet_name: sheet_name.to_string(),
        final_value: score.final_value,
        grade: None,
        optimal_threshold,
        predicted_return: score.predicted_return,
        rank: None,
        percentile: None,
        outlook,
    }
}
