//! A workbook stored as a directory of CSV files, one per sheet.

use std::fs;
use std::path::Path;

use csv::ReaderBuilder;

use crate::domain::Cell;

use super::workbook::{SheetMap, SourceError, WorkbookSource, build_table};

/// Sheet name = file stem. The first record of each file is the header row.
#[derive(Debug, Default, Clone, Copy)]
pub struct CsvWorkbook;

impl CsvWorkbook {
    fn read_sheet(path: &Path) -> Result<(Vec<String>, Vec<Vec<Cell>>), SourceError> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(path)
            .map_err(|e| SourceError::unreadable(path, e))?;

        let headers = reader
            .headers()
            .map_err(|e| SourceError::unreadable(path, e))?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|e| SourceError::unreadable(path, e))?;
            rows.push(record.iter().map(Cell::parse).collect());
        }
        Ok((headers, rows))
    }
}

impl WorkbookSource for CsvWorkbook {
    fn load_sheets(&self, dir: &Path, index_column: &str) -> Result<SheetMap, SourceError> {
        if !dir.is_dir() {
            return Err(SourceError::NotFound(dir.to_path_buf()));
        }
        let entries = fs::read_dir(dir).map_err(|e| SourceError::unreadable(dir, e))?;

        let mut sheets = SheetMap::new();
        for entry in entries {
            let path = entry.map_err(|e| SourceError::unreadable(dir, e))?.path();
            let is_csv = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("csv"));
            let Some(sheet) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            if !is_csv || !path.is_file() {
                continue;
            }

            let (headers, rows) = Self::read_sheet(&path)?;
            if let Some(table) = build_table(&path, sheet, headers, rows, index_column)? {
                sheets.insert(sheet.to_string(), table);
            }
        }
        Ok(sheets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_each_csv_file_is_a_sheet() {
        let dir = TempDir::new().expect("tempdir");
        fs::write(
            dir.path().join("AMXL.csv"),
            "FECHA,Precio,Detalle\n2024-01-02,15.5,1\n2024-01-03,,n/d\n",
        )
        .expect("write");
        fs::write(dir.path().join("EMPTY.csv"), "FECHA,Precio,Detalle\n").expect("write");
        fs::write(dir.path().join("notes.txt"), "ignored").expect("write");

        let sheets = CsvWorkbook.load_sheets(dir.path(), "FECHA").expect("readable");
        assert_eq!(sheets.keys().collect::<Vec<_>>(), vec!["AMXL"], "empty sheet skipped");

        let table = &sheets["AMXL"];
        assert_eq!(table.n_rows(), 2);
        assert_eq!(table.index()[1], "2024-01-03");
        let price = table.column("Precio").expect("price");
        assert_eq!(price, &[Cell::Number(15.5), Cell::Empty]);
        let detail = table.column("Detalle").expect("detail");
        assert_eq!(detail[1], Cell::Text("n/d".to_string()));
    }

    #[test]
    fn test_sheet_without_index_column_is_unreadable() {
        let dir = TempDir::new().expect("tempdir");
        fs::write(dir.path().join("BAD.csv"), "Date,Precio\n2024-01-02,1\n").expect("write");
        assert!(matches!(
            CsvWorkbook.load_sheets(dir.path(), "FECHA"),
            Err(SourceError::Unreadable { .. })
        ));
    }
}
