// Cross-instrument aggregation: run every sheet, then rank and grade the set
pub mod grading;
pub mod report;
pub mod runner;

// Re-export commonly used types
pub use grading::{assign_grades, percentile_of, result_ordering};
pub use report::{AnalysisReport, ConfigurationReport, RunStatus};
pub use runner::{
    analyze_sheets, default_trainer, run_configuration, run_full_analysis, run_full_analysis_with,
};
