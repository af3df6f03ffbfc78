//! Debugging feature flags.
//!
//! Toggle individual diagnostics here; keep them `false` by default so release
//! builds remain quiet.

/// Emit the data-check profile (shape, null counts, top prices) for every sheet.
pub const PRINT_TABLE_PROFILES: bool = false;

/// Emit per-epoch loss while the network trains. Very noisy.
pub const PRINT_TRAINING_PROGRESS: bool = false;
