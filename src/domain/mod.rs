// Domain types and value objects
pub mod matrix;
pub mod result;
pub mod table;

// Re-export commonly used types
pub use matrix::{FeatureMatrix, TargetVector};
pub use result::{Grade, Outlook, SheetResult};
pub use table::{Cell, InstrumentTable, TableProfile};
