use serde::Serialize;
use thiserror::Error;

/// Per-instrument progress through the pipeline.
#[derive(
    Copy,
    Clone,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Debug,
    Serialize,
    strum_macros::EnumIter,
    strum_macros::Display,
)]
pub enum Stage {
    Pending,
    Validated,
    Normalized,
    Split,
    Trained,
    Thresholded,
    Scored,
    Graded,
}

/// Why a sheet was dropped. None of these abort the configuration.
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
pub enum SkipReason {
    #[error("missing required columns: {}", missing.join(", "))]
    Schema { missing: Vec<String> },

    #[error("data quality: {0}")]
    DataQuality(String),

    #[error("training failed: {0}")]
    TrainingFailure(String),

    #[error("no threshold available: {0}")]
    ThresholdUndefined(String),
}

/// A sheet that left the pipeline early. `stage` is the stage it failed to reach.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedSheet {
    pub sheet_name: String,
    pub stage: Stage,
    pub reason: SkipReason,
}

impl SkippedSheet {
    pub fn new(sheet_name: &str, stage: Stage, reason: SkipReason) -> Self {
        Self {
            sheet_name: sheet_name.to_string(),
            stage,
            reason,
        }
    }
}

impl std::fmt::Display for SkippedSheet {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "sheet '{}' skipped before {}: {}",
            self.sheet_name, self.stage, self.reason
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_stages_follow_pipeline_order() {
        let stages: Vec<Stage> = Stage::iter().collect();
        assert_eq!(stages.first(), Some(&Stage::Pending));
        assert_eq!(stages.last(), Some(&Stage::Graded));
        assert!(stages.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_skip_messages() {
        let reason = SkipReason::Schema {
            missing: vec!["Momentdiez".to_string(), "Detalle".to_string()],
        };
        assert_eq!(
            reason.to_string(),
            "missing required columns: Momentdiez, Detalle"
        );
        let skipped = SkippedSheet::new("AMXL", Stage::Validated, reason);
        assert!(skipped.to_string().contains("before Validated"));
    }
}
