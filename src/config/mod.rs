//! Configuration module for the equity analyzer.
//!
//! Everything here is plain data. An `AnalysisConfig` is built once at startup
//! (defaults or a TOML file) and handed to the runner by reference.

pub mod analysis;
pub mod configurations;

mod debug; // Private: use crate::config::PRINT_TABLE_PROFILES etc. rather than crate::config::debug::*
pub use debug::{PRINT_TABLE_PROFILES, PRINT_TRAINING_PROGRESS};

pub mod persistence;

// Re-export commonly used items
pub use analysis::{
    AnalysisConfig, DEFAULT_INDEX_COLUMN, GradeTier, GradingSettings, ModelSettings,
    PipelineSettings, SplitPolicy,
};
pub use configurations::{ColumnMapping, SheetConfiguration};
pub use persistence::{RESULTS_BASE_FILE_NAME, results_csv_filename, results_json_filename};
