//! A workbook stored as one JSON document: `{ "<sheet>": [ { "<column>": value } ] }`.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde_json::{Map, Value};

use crate::domain::Cell;

use super::workbook::{SheetMap, SourceError, WorkbookSource, build_table};

#[derive(Debug, Default, Clone, Copy)]
pub struct JsonWorkbook;

/// Column order is first appearance across the records.
fn sheet_rows(records: &[Value]) -> Option<(Vec<String>, Vec<Vec<Cell>>)> {
    let objects: Vec<&Map<String, Value>> = records.iter().map(Value::as_object).collect::<Option<_>>()?;

    let mut headers: Vec<String> = Vec::new();
    for object in &objects {
        for key in object.keys() {
            if !headers.contains(key) {
                headers.push(key.clone());
            }
        }
    }

    let rows = objects
        .iter()
        .map(|object| {
            headers
                .iter()
                .map(|h| object.get(h).map(Cell::from_json).unwrap_or(Cell::Empty))
                .collect()
        })
        .collect();
    Some((headers, rows))
}

impl WorkbookSource for JsonWorkbook {
    fn load_sheets(&self, file: &Path, index_column: &str) -> Result<SheetMap, SourceError> {
        let handle = File::open(file).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => SourceError::NotFound(file.to_path_buf()),
            _ => SourceError::unreadable(file, e),
        })?;
        let document: Map<String, Value> = serde_json::from_reader(BufReader::new(handle))
            .map_err(|e| SourceError::unreadable(file, e))?;

        let mut sheets = SheetMap::new();
        for (sheet, value) in &document {
            let Some((headers, rows)) = value.as_array().and_then(|records| sheet_rows(records)) else {
                return Err(SourceError::unreadable(
                    file,
                    format!("sheet '{}' is not an array of row objects", sheet),
                ));
            };
            if let Some(table) = build_table(file, sheet, headers, rows, index_column)? {
                sheets.insert(sheet.clone(), table);
            }
        }
        Ok(sheets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_sheets_from_json_document() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("MEXBOL.json");
        fs::write(
            &path,
            r#"{
                "MEXBOL": [
                    {"FECHA": "2024-01-02", "Precio": 52000.5, "Detalle": 1},
                    {"FECHA": "2024-01-03", "Precio": null, "Detalle": "n/d", "Extra": true}
                ],
                "VACIA": []
            }"#,
        )
        .expect("write");

        let sheets = JsonWorkbook.load_sheets(&path, "FECHA").expect("readable");
        assert_eq!(sheets.len(), 1, "empty sheet skipped");
        let table = &sheets["MEXBOL"];
        assert_eq!(table.n_rows(), 2);
        assert_eq!(table.index(), &["2024-01-02".to_string(), "2024-01-03".to_string()]);
        assert_eq!(table.column("Precio"), Some(&[Cell::Number(52000.5), Cell::Empty][..]));
        assert_eq!(table.column("Extra").expect("late column")[0], Cell::Empty);
    }

    #[test]
    fn test_malformed_document_is_unreadable() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("bad.json");
        fs::write(&path, r#"{"S": {"not": "rows"}}"#).expect("write");
        assert!(matches!(
            JsonWorkbook.load_sheets(&path, "FECHA"),
            Err(SourceError::Unreadable { .. })
        ));

        fs::write(&path, "not json").expect("write");
        assert!(matches!(
            JsonWorkbook.load_sheets(&path, "FECHA"),
            Err(SourceError::Unreadable { .. })
        ));
    }
}
