//! Synthetic sheets shared by the pipeline and analysis tests.

use crate::config::{ColumnMapping, ModelSettings, PipelineSettings};
use crate::domain::{Cell, InstrumentTable};

pub(crate) fn mapping() -> ColumnMapping {
    ColumnMapping {
        price: "Precio".to_string(),
        detail: "Detalle".to_string(),
        features: vec![
            "Movil".to_string(),
            "Moment".to_string(),
            "Ruido".to_string(),
        ],
    }
}

/// Small network and few epochs so tests stay fast.
pub(crate) fn fast_settings() -> PipelineSettings {
    PipelineSettings {
        min_rows: 20,
        model: ModelSettings {
            hidden_units: 8,
            max_iter: 60,
            learning_rate: 0.01,
            batch_size: 32,
            ..ModelSettings::default()
        },
        ..PipelineSettings::default()
    }
}

/// `n` dated rows. `Movil` tracks the target, `Moment` and `Ruido` are
/// deterministic noise.
pub(crate) fn synthetic_sheet(name: &str, n: usize, target: impl Fn(usize) -> f64) -> InstrumentTable {
    fn noise(i: usize, k: usize) -> f64 {
        ((i * 37 + k * 11) % 101) as f64 / 101.0
    }
    let column = |f: &dyn Fn(usize) -> f64| -> Vec<Cell> { (0..n).map(|i| Cell::Number(f(i))).collect() };

    InstrumentTable::new(
        name,
        (0..n).map(|i| format!("2020-01-01+{}", i)).collect(),
        vec![
            ("Precio".to_string(), column(&|i: usize| 100.0 + 10.0 * noise(i, 1))),
            ("Detalle".to_string(), column(&|i: usize| target(i))),
            ("Movil".to_string(), column(&|i: usize| target(i) * 2.0 + noise(i, 2))),
            ("Moment".to_string(), column(&|i: usize| noise(i, 3))),
            ("Ruido".to_string(), column(&|i: usize| noise(i, 4) * 50.0)),
        ],
    )
    .unwrap_or_else(|e| panic!("fixture table is rectangular: {}", e))
}

/// Copy of `table` without `column`.
pub(crate) fn drop_column(table: &InstrumentTable, column: &str) -> InstrumentTable {
    let columns = table
        .column_names()
        .iter()
        .filter(|c| c.as_str() != column)
        .map(|c| (c.clone(), table.column(c).unwrap_or_default().to_vec()))
        .collect();
    InstrumentTable::new(&table.name, table.index().to_vec(), columns)
        .unwrap_or_else(|e| panic!("fixture table is rectangular: {}", e))
}
