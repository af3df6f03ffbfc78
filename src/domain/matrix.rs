use std::ops::Deref;

/// Row-major feature matrix: rows are observations, columns are configured features.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FeatureMatrix {
    n_rows: usize,
    n_cols: usize,
    data: Vec<f64>,
}

impl FeatureMatrix {
    pub fn new(n_cols: usize) -> Self {
        Self {
            n_rows: 0,
            n_cols,
            data: Vec::new(),
        }
    }

    pub fn with_capacity(n_rows: usize, n_cols: usize) -> Self {
        Self {
            n_rows: 0,
            n_cols,
            data: Vec::with_capacity(n_rows * n_cols),
        }
    }

    /// Build from row slices. Every row must have the same width.
    pub fn from_rows(rows: &[Vec<f64>]) -> Option<Self> {
        let n_cols = rows.first().map(|r| r.len()).unwrap_or(0);
        let mut matrix = Self::with_capacity(rows.len(), n_cols);
        for row in rows {
            if row.len() != n_cols {
                return None;
            }
            matrix.push_row(row);
        }
        Some(matrix)
    }

    pub fn push_row(&mut self, row: &[f64]) {
        debug_assert_eq!(row.len(), self.n_cols);
        self.data.extend_from_slice(row);
        self.n_rows += 1;
    }

    #[inline]
    pub fn row(&self, idx: usize) -> &[f64] {
        let start = idx * self.n_cols;
        &self.data[start..start + self.n_cols]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        // chunks_exact(0) panics, and a zero-width matrix has no data anyway
        self.data.chunks_exact(self.n_cols.max(1)).take(self.n_rows)
    }

    pub fn column(&self, col: usize) -> Vec<f64> {
        (0..self.n_rows).map(|r| self.data[r * self.n_cols + col]).collect()
    }

    pub fn map_columns(&mut self, mut f: impl FnMut(usize, f64) -> f64) {
        let n_cols = self.n_cols;
        for (i, value) in self.data.iter_mut().enumerate() {
            *value = f(i % n_cols, *value);
        }
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn n_cols(&self) -> usize {
        self.n_cols
    }

    pub fn is_empty(&self) -> bool {
        self.n_rows == 0
    }
}

/// Target values aligned row-for-row with a `FeatureMatrix`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TargetVector(Vec<f64>);

impl TargetVector {
    pub fn new(values: Vec<f64>) -> Self {
        Self(values)
    }

    pub fn into_inner(self) -> Vec<f64> {
        self.0
    }
}

impl Deref for TargetVector {
    type Target = [f64];

    fn deref(&self) -> &[f64] {
        &self.0
    }
}

impl From<Vec<f64>> for TargetVector {
    fn from(values: Vec<f64>) -> Self {
        Self(values)
    }
}
