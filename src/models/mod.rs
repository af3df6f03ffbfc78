//! Learning algorithms behind a narrow fit/predict seam, so the pipeline never
//! depends on a particular model.

pub mod mlp;

use thiserror::Error;

use crate::domain::{FeatureMatrix, TargetVector};

pub use mlp::{MlpModel, MlpRegressor};

/// A fitted model. Owned by one analysis run, never shared across instruments.
pub trait Model: Send {
    /// One continuous prediction per row of `x`.
    fn predict(&self, x: &FeatureMatrix) -> Vec<f64>;
}

/// Fits a `Model` from training data.
pub trait Trainer: Sync {
    type Model: Model;

    fn fit(&self, x: &FeatureMatrix, y: &TargetVector) -> Result<Self::Model, TrainingError>;
}

/// "No model": callers skip the instrument.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TrainingError {
    #[error("{rows} training rows for {features} features")]
    InsufficientRows { rows: usize, features: usize },

    #[error("feature matrix has {x_rows} rows but target has {y_rows}")]
    ShapeMismatch { x_rows: usize, y_rows: usize },

    #[error("training target is constant ({0})")]
    ConstantTarget(f64),

    #[error("loss diverged at epoch {epoch}")]
    Diverged { epoch: usize },

    #[error("exceeded {limit_secs}s time budget after {epochs} epochs")]
    TimedOut { epochs: usize, limit_secs: u64 },
}
