//! Train/test partitioning of a cleaned sheet.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::config::SplitPolicy;
use crate::domain::{FeatureMatrix, TargetVector};

use super::normalization::NumericTable;
use super::stage::SkipReason;

/// One side of the split. `rows` are positions in the cleaned table, ascending.
#[derive(Debug, Clone, PartialEq)]
pub struct Partition {
    pub rows: Vec<usize>,
    pub features: FeatureMatrix,
    pub target: TargetVector,
}

impl Partition {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrainTestSplit {
    pub train: Partition,
    pub test: Partition,
}

/// Row positions for (train, test). The two sets never overlap and together
/// cover at most `n_rows` rows.
pub fn split_indices(n_rows: usize, policy: &SplitPolicy) -> (Vec<usize>, Vec<usize>) {
    match *policy {
        SplitPolicy::Positional {
            train_end,
            test_start,
            test_end,
        } => {
            let train_end = train_end.min(n_rows);
            // Never let the evaluation block reach back into the training rows
            let test_start = test_start.max(train_end).min(n_rows);
            let test_end = test_end.unwrap_or(n_rows).min(n_rows).max(test_start);
            ((0..train_end).collect(), (test_start..test_end).collect())
        }
        SplitPolicy::Randomized { test_ratio, seed } => {
            if n_rows < 2 {
                return ((0..n_rows).collect(), Vec::new());
            }
            let n_test = ((n_rows as f64) * test_ratio).ceil() as usize;
            let n_test = n_test.clamp(1, n_rows - 1);

            let mut permutation: Vec<usize> = (0..n_rows).collect();
            let mut rng = StdRng::seed_from_u64(seed);
            permutation.shuffle(&mut rng);

            let mut test = permutation[..n_test].to_vec();
            let mut train = permutation[n_test..].to_vec();
            // Chronological order inside each side, so the last test row is the latest one
            test.sort_unstable();
            train.sort_unstable();
            (train, test)
        }
    }
}

fn gather(table: &NumericTable, feature_columns: &[&[f64]], rows: Vec<usize>) -> Partition {
    let mut features = FeatureMatrix::with_capacity(rows.len(), feature_columns.len());
    let mut row_buf = vec![0.0; feature_columns.len()];
    let mut target = Vec::with_capacity(rows.len());
    for &r in &rows {
        for (dst, col) in row_buf.iter_mut().zip(feature_columns) {
            *dst = col[r];
        }
        features.push_row(&row_buf);
        target.push(table.target[r]);
    }
    Partition {
        rows,
        features,
        target: TargetVector::new(target),
    }
}

/// Split the cleaned table into feature/target pairs for training and evaluation.
pub fn split_table(
    table: &NumericTable,
    features: &[String],
    policy: &SplitPolicy,
) -> Result<TrainTestSplit, SkipReason> {
    let feature_columns: Vec<&[f64]> = features
        .iter()
        .map(|name| {
            table.column(name).ok_or_else(|| SkipReason::Schema {
                missing: vec![name.clone()],
            })
        })
        .collect::<Result<_, _>>()?;

    let (train_rows, test_rows) = split_indices(table.n_rows(), policy);

    if train_rows.is_empty() || test_rows.is_empty() {
        return Err(SkipReason::DataQuality(format!(
            "split left {} training and {} evaluation rows out of {}",
            train_rows.len(),
            test_rows.len(),
            table.n_rows()
        )));
    }

    Ok(TrainTestSplit {
        train: gather(table, &feature_columns, train_rows),
        test: gather(table, &feature_columns, test_rows),
    })
}
