//! Relative ranking of a configuration's scored sheets.

use std::cmp::Ordering;

use crate::config::GradingSettings;
use crate::domain::SheetResult;

/// Descending `final_value`, ties by ascending sheet name. A total order, so the
/// output never depends on the order the sheets finished in.
pub fn result_ordering(a: &SheetResult, b: &SheetResult) -> Ordering {
    b.final_value
        .total_cmp(&a.final_value)
        .then_with(|| a.sheet_name.cmp(&b.sheet_name))
}

/// Percentile of sorted position `position` among `n` results: 100 for the
/// first, 0 for the last.
pub fn percentile_of(position: usize, n: usize) -> f64 {
    if n <= 1 {
        return 100.0;
    }
    (n - 1 - position) as f64 / (n - 1) as f64 * 100.0
}

/// Sort the full result set and fill in rank, percentile and grade.
///
/// Must only run once every sheet of the configuration has been scored.
pub fn assign_grades(mut results: Vec<SheetResult>, grading: &GradingSettings) -> Vec<SheetResult> {
    results.sort_by(result_ordering);
    let n = results.len();
    for (position, result) in results.iter_mut().enumerate() {
        let percentile = percentile_of(position, n);
        result.rank = Some(position + 1);
        result.percentile = Some(percentile);
        result.grade = Some(grading.grade_for(percentile));
    }
    results
}
