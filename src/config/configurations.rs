//! Which workbook feeds which analysis, and which columns play which role.

use serde::{Deserialize, Serialize};

/// Names the columns that play the role of price, target ("detail") and features
/// for one instrument family.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMapping {
    pub price: String,
    pub detail: String,
    pub features: Vec<String>,
}

impl ColumnMapping {
    /// Price, detail, then every feature column, in that order.
    pub fn required_columns(&self) -> Vec<String> {
        let mut required = Vec::with_capacity(self.features.len() + 2);
        required.push(self.price.clone());
        required.push(self.detail.clone());
        required.extend(self.features.iter().cloned());
        required
    }

    /// Columns that get min-max rescaled. The detail column is only coerced.
    pub fn columns_to_normalize(&self) -> Vec<String> {
        let mut cols = Vec::with_capacity(self.features.len() + 1);
        cols.push(self.price.clone());
        cols.extend(self.features.iter().cloned());
        cols
    }

    /// Moving averages (21/55/144) and momentum (10/70/300) over `Precio`, target `Detalle`.
    pub fn legacy_mexican_equities() -> Self {
        Self {
            price: "Precio".to_string(),
            detail: "Detalle".to_string(),
            features: [
                "Movilveintiuno",
                "Movilcincocinco",
                "Movilunocuatrocuatro",
                "Momentdiez",
                "Momentsetenta",
                "Momenttrescerocero",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

/// One named batch of instruments: a source workbook plus its column mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetConfiguration {
    pub name: String,
    /// Workbook identifier, resolved against the data directory.
    pub file_name: String,
    pub columns: ColumnMapping,
}

impl SheetConfiguration {
    pub fn new(name: &str, file_name: &str, columns: ColumnMapping) -> Self {
        Self {
            name: name.to_string(),
            file_name: file_name.to_string(),
            columns,
        }
    }
}

/// Index (MEXBOL), Mexican fixed-income (IFMEXICO) and equity (IEMEXICO) families.
pub fn legacy_configurations() -> Vec<SheetConfiguration> {
    vec![
        SheetConfiguration::new(
            "MEXBOL",
            "MEXBOL.json",
            ColumnMapping::legacy_mexican_equities(),
        ),
        SheetConfiguration::new(
            "IFMEXICO",
            "IFMEXICO.json",
            ColumnMapping::legacy_mexican_equities(),
        ),
        SheetConfiguration::new(
            "IEMEXICO",
            "IEMEXICO.json",
            ColumnMapping::legacy_mexican_equities(),
        ),
    ]
}
