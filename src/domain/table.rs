//! One sheet of historical rows for one instrument, as handed over by the
//! workbook readers. Cells stay untyped until the pipeline coerces them.

use std::collections::HashMap;

use anyhow::{Result, bail};
use itertools::Itertools;
use serde_json::Value;

/// A single spreadsheet cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Number(f64),
    Text(String),
    Empty,
}

impl Cell {
    /// Parse a raw text cell (CSV). Blank means empty, anything that reads as
    /// a float is a number, everything else stays text.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Cell::Empty;
        }
        match trimmed.parse::<f64>() {
            Ok(v) => Cell::Number(v),
            Err(_) => Cell::Text(trimmed.to_string()),
        }
    }

    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => Cell::Empty,
            Value::Number(n) => n.as_f64().map(Cell::Number).unwrap_or(Cell::Empty),
            Value::String(s) => Cell::Text(s.clone()),
            Value::Bool(b) => Cell::Text(b.to_string()),
            other => Cell::Text(other.to_string()),
        }
    }

    /// Numeric coercion: finite numbers and numeric-looking text succeed,
    /// everything else (blank, prose, NaN, inf) fails.
    pub fn as_f64(&self) -> Option<f64> {
        let value = match self {
            Cell::Number(v) => *v,
            Cell::Text(s) => s.trim().parse::<f64>().ok()?,
            Cell::Empty => return None,
        };
        value.is_finite().then_some(value)
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }
}

impl std::fmt::Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Cell::Number(v) => write!(f, "{}", v),
            Cell::Text(s) => write!(f, "{}", s),
            Cell::Empty => Ok(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct InstrumentTable {
    pub name: String,
    /// Row labels taken from the index column (dates, usually)
    index: Vec<String>,
    column_names: Vec<String>,
    /// Column-major: `columns[c][r]`
    columns: Vec<Vec<Cell>>,
}

impl InstrumentTable {
    pub fn new(name: &str, index: Vec<String>, columns: Vec<(String, Vec<Cell>)>) -> Result<Self> {
        let n_rows = index.len();
        let mut column_names = Vec::with_capacity(columns.len());
        let mut data = Vec::with_capacity(columns.len());

        for (col_name, cells) in columns {
            if cells.len() != n_rows {
                bail!(
                    "Sheet '{}': column '{}' has {} cells but the index has {} rows",
                    name,
                    col_name,
                    cells.len(),
                    n_rows
                );
            }
            if column_names.contains(&col_name) {
                bail!("Sheet '{}': duplicate column '{}'", name, col_name);
            }
            column_names.push(col_name);
            data.push(cells);
        }

        Ok(Self {
            name: name.to_string(),
            index,
            column_names,
            columns: data,
        })
    }

    pub fn n_rows(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn index(&self) -> &[String] {
        &self.index
    }

    pub fn column_names(&self) -> &[String] {
        &self.column_names
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_names.iter().any(|c| c == name)
    }

    pub fn column(&self, name: &str) -> Option<&[Cell]> {
        self.column_names
            .iter()
            .position(|c| c == name)
            .map(|pos| self.columns[pos].as_slice())
    }

    /// Shape, null counts and the most frequent prices.
    pub fn profile(&self, price_column: &str) -> TableProfile {
        let null_counts = self
            .column_names
            .iter()
            .zip(&self.columns)
            .map(|(name, cells)| (name.clone(), cells.iter().filter(|c| c.is_empty()).count()))
            .collect();

        // Count by bit pattern so equal floats land in the same bucket
        let mut price_counts: HashMap<u64, (f64, usize)> = HashMap::new();
        if let Some(prices) = self.column(price_column) {
            for price in prices.iter().filter_map(Cell::as_f64) {
                price_counts.entry(price.to_bits()).or_insert((price, 0)).1 += 1;
            }
        }
        let top_prices = price_counts
            .into_values()
            .sorted_by(|a, b| b.1.cmp(&a.1).then(a.0.total_cmp(&b.0)))
            .take(5)
            .collect();

        TableProfile {
            rows: self.n_rows(),
            columns: self.column_names.len(),
            cell_count: self.n_rows() * self.column_names.len(),
            null_counts,
            top_prices,
        }
    }
}

/// Quick data check of a sheet before it enters the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct TableProfile {
    pub rows: usize,
    pub columns: usize,
    pub cell_count: usize,
    pub null_counts: Vec<(String, usize)>,
    /// (price, occurrences), most frequent first
    pub top_prices: Vec<(f64, usize)>,
}

impl TableProfile {
    pub fn total_nulls(&self) -> usize {
        self.null_counts.iter().map(|(_, n)| n).sum()
    }
}
