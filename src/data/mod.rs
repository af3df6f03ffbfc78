// Workbook readers and the results sink
pub mod csv_workbook;
pub mod json_workbook;
pub mod results_store;
pub mod workbook;

// Re-export commonly used types
pub use csv_workbook::CsvWorkbook;
pub use json_workbook::JsonWorkbook;
pub use results_store::{ResultsMap, read_results_json, save_report, write_results_csv, write_results_json};
pub use workbook::{SheetMap, SourceError, SpreadsheetSource, WorkbookSource};
