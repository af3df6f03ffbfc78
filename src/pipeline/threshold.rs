//! ROC curve and Youden-based threshold selection.

use serde::Serialize;

use super::stage::SkipReason;

/// Points of a receiver operating characteristic, in curve order
/// (descending threshold, non-decreasing fpr/tpr).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RocCurve {
    pub fpr: Vec<f64>,
    pub tpr: Vec<f64>,
    pub thresholds: Vec<f64>,
}

impl RocCurve {
    pub fn len(&self) -> usize {
        self.thresholds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.thresholds.is_empty()
    }

    /// `tpr - (1 - fpr)` for each point.
    pub fn youden_offsets(&self) -> impl Iterator<Item = f64> + '_ {
        self.tpr.iter().zip(&self.fpr).map(|(tpr, fpr)| tpr - (1.0 - fpr))
    }
}

fn undefined(msg: impl Into<String>) -> SkipReason {
    SkipReason::ThresholdUndefined(msg.into())
}

/// Map the labels onto {0, 1}. The larger of exactly two distinct values is the positive class.
fn binarize(labels: &[f64]) -> Result<Vec<bool>, SkipReason> {
    if labels.iter().any(|v| !v.is_finite()) {
        return Err(undefined("non-finite label in evaluation target"));
    }
    let mut classes = labels.to_vec();
    classes.sort_by(f64::total_cmp);
    classes.dedup();
    match classes.as_slice() {
        [] => Err(undefined("empty evaluation target")),
        [only] => Err(undefined(format!(
            "evaluation target holds a single class ({})",
            only
        ))),
        [_, positive] => Ok(labels.iter().map(|v| v == positive).collect()),
        many => Err(undefined(format!(
            "evaluation target is not binary ({} classes)",
            many.len()
        ))),
    }
}

/// Build the ROC curve of `scores` against binary `labels`.
///
/// One point per distinct score, collinear intermediate points dropped, and a
/// leading `(0, 0)` point whose threshold sits one above the highest score.
pub fn roc_curve(labels: &[f64], scores: &[f64]) -> Result<RocCurve, SkipReason> {
    if labels.len() != scores.len() {
        return Err(undefined(format!(
            "{} labels for {} predictions",
            labels.len(),
            scores.len()
        )));
    }
    if scores.iter().any(|v| !v.is_finite()) {
        return Err(undefined("non-finite prediction"));
    }
    let positives = binarize(labels)?;

    // Descending score; equal scores collapse into one point below
    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));

    let mut tps: Vec<f64> = Vec::new();
    let mut fps: Vec<f64> = Vec::new();
    let mut thresholds: Vec<f64> = Vec::new();
    let (mut tp, mut fp) = (0.0, 0.0);
    for (pos, &i) in order.iter().enumerate() {
        if positives[i] {
            tp += 1.0;
        } else {
            fp += 1.0;
        }
        let last_of_value = order
            .get(pos + 1)
            .is_none_or(|&next| scores[next] != scores[i]);
        if last_of_value {
            tps.push(tp);
            fps.push(fp);
            thresholds.push(scores[i]);
        }
    }

    // Keep the endpoints and every point where the curve changes direction
    let keep: Vec<usize> = (0..thresholds.len())
        .filter(|&k| {
            if k == 0 || k + 1 == thresholds.len() {
                return true;
            }
            let second_diff = |v: &[f64]| v[k + 1] - 2.0 * v[k] + v[k - 1];
            second_diff(&fps) != 0.0 || second_diff(&tps) != 0.0
        })
        .collect();

    let top = thresholds[0] + 1.0;
    let total_tp = tp;
    let total_fp = fp;

    let mut curve = RocCurve {
        fpr: vec![0.0],
        tpr: vec![0.0],
        thresholds: vec![top],
    };
    for k in keep {
        curve.fpr.push(fps[k] / total_fp);
        curve.tpr.push(tps[k] / total_tp);
        curve.thresholds.push(thresholds[k]);
    }
    Ok(curve)
}

/// Threshold whose Youden offset `tpr - (1 - fpr)` is closest to zero.
/// Exact ties keep the first point in curve order.
pub fn optimal_threshold(labels: &[f64], predictions: &[f64]) -> Result<f64, SkipReason> {
    let curve = roc_curve(labels, predictions)?;
    let mut best: Option<(f64, f64)> = None;
    for (offset, &threshold) in curve.youden_offsets().zip(&curve.thresholds) {
        let distance = offset.abs();
        match best {
            Some((best_distance, _)) if distance >= best_distance => {}
            _ => best = Some((distance, threshold)),
        }
    }
    best.map(|(_, threshold)| threshold)
        .ok_or_else(|| undefined("empty ROC curve"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roc_curve_points() {
        let labels = [0.0, 0.0, 1.0, 1.0];
        let scores = [0.125, 0.5, 0.375, 0.75];
        let curve = roc_curve(&labels, &scores).expect("binary labels");
        assert_eq!(curve.thresholds, vec![1.75, 0.75, 0.5, 0.375, 0.125]);
        assert_eq!(curve.fpr, vec![0.0, 0.0, 0.5, 0.5, 1.0]);
        assert_eq!(curve.tpr, vec![0.0, 0.5, 0.5, 1.0, 1.0]);
    }

    #[test]
    fn test_collinear_points_dropped() {
        // Three positives in a row: the middle point lies on a straight segment
        let labels = [1.0, 1.0, 1.0, 0.0];
        let scores = [0.875, 0.75, 0.625, 0.125];
        let curve = roc_curve(&labels, &scores).expect("binary labels");
        assert_eq!(curve.thresholds, vec![1.875, 0.875, 0.625, 0.125]);
        assert_eq!(curve.tpr, vec![0.0, 1.0 / 3.0, 1.0, 1.0]);
    }

    #[test]
    fn test_tied_scores_share_a_point() {
        let labels = [1.0, 0.0, 1.0, 0.0];
        let scores = [0.5, 0.5, 0.5, 0.5];
        let curve = roc_curve(&labels, &scores).expect("binary labels");
        assert_eq!(curve.len(), 2);
        assert_eq!(curve.fpr, vec![0.0, 1.0]);
        assert_eq!(curve.tpr, vec![0.0, 1.0]);
    }

    #[test]
    fn test_optimal_threshold_balances_rates() {
        let labels = [0.0, 0.0, 1.0, 1.0];
        let scores = [0.125, 0.5, 0.375, 0.75];
        // Offsets: -1, -0.5, 0, 0.5, 1 -> exact zero at threshold 0.5
        assert_eq!(optimal_threshold(&labels, &scores), Ok(0.5));
    }

    #[test]
    fn test_exact_tie_keeps_first_curve_point() {
        let labels = [1.0, 0.0, 0.0, 1.0];
        let scores = [0.75, 0.5, 0.25, 0.125];
        let curve = roc_curve(&labels, &scores).expect("binary labels");
        assert_eq!(curve.thresholds, vec![1.75, 0.75, 0.25, 0.125]);
        let offsets: Vec<f64> = curve.youden_offsets().collect();
        assert_eq!(offsets, vec![-1.0, -0.5, 0.5, 1.0]);
        // |-0.5| == |0.5|: the earlier point (higher threshold) wins
        assert_eq!(optimal_threshold(&labels, &scores), Ok(0.75));
    }

    #[test]
    fn test_threshold_is_deterministic() {
        let labels: Vec<f64> = (0..50).map(|i| ((i * 7) % 3 == 0) as u8 as f64).collect();
        let scores: Vec<f64> = (0..50).map(|i| ((i * 37) % 17) as f64 / 17.0).collect();
        let first = optimal_threshold(&labels, &scores).expect("defined");
        for _ in 0..5 {
            assert_eq!(optimal_threshold(&labels, &scores), Ok(first));
        }
    }

    #[test]
    fn test_single_class_is_undefined() {
        for class in [0.0, 1.0] {
            let result = optimal_threshold(&[class; 6], &[0.1, 0.2, 0.3, 0.4, 0.5, 0.6]);
            assert!(
                matches!(result, Err(SkipReason::ThresholdUndefined(_))),
                "single class {} returned {:?}",
                class,
                result
            );
        }
    }

    #[test]
    fn test_malformed_inputs_are_undefined() {
        assert!(optimal_threshold(&[0.0, 1.0], &[0.5]).is_err());
        assert!(optimal_threshold(&[0.0, 1.0, 2.0], &[0.1, 0.2, 0.3]).is_err());
        assert!(optimal_threshold(&[0.0, 1.0], &[0.1, f64::NAN]).is_err());
        assert!(optimal_threshold(&[], &[]).is_err());
    }
}
