//! Analysis and computation configuration

use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use super::configurations::{SheetConfiguration, legacy_configurations};
use crate::domain::Grade;

/// Column holding the date of each row in every sheet.
pub const DEFAULT_INDEX_COLUMN: &str = "FECHA";

/// How the cleaned table is partitioned into training and evaluation rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum SplitPolicy {
    /// Fixed row-index slices: `[0, train_end)` trains, `[test_start, test_end)` evaluates.
    /// Cut points past the end of the table are clamped.
    Positional {
        train_end: usize,
        test_start: usize,
        test_end: Option<usize>,
    },
    /// Seeded shuffle, `ceil(n * test_ratio)` rows held out for evaluation.
    Randomized { test_ratio: f64, seed: u64 },
}

impl SplitPolicy {
    /// The cut points the original spreadsheet workflow used: rows 0..2886 train,
    /// 2887..3607 test, row 2886 left unused.
    pub fn legacy_positional() -> Self {
        SplitPolicy::Positional {
            train_end: 2886,
            test_start: 2887,
            test_end: Some(3607),
        }
    }

    /// Fewest cleaned rows that leave both partitions non-empty.
    pub fn min_rows(&self) -> usize {
        match *self {
            SplitPolicy::Positional {
                train_end,
                test_start,
                ..
            } => test_start.max(train_end).max(1) + 1,
            SplitPolicy::Randomized { .. } => 2,
        }
    }
}

impl Default for SplitPolicy {
    fn default() -> Self {
        SplitPolicy::Randomized {
            test_ratio: 0.2,
            seed: 42,
        }
    }
}

/// Hyper-parameters of the single-hidden-layer regressor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelSettings {
    pub hidden_units: usize,
    pub max_iter: usize,
    pub learning_rate: f64,
    /// L2 penalty on the weights
    pub alpha: f64,
    pub batch_size: usize,
    /// Minimum loss improvement that counts as progress
    pub tol: f64,
    /// Epochs without progress before stopping early
    pub n_iter_no_change: usize,
    pub seed: u64,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            hidden_units: 200,
            max_iter: 1000,
            learning_rate: 0.001,
            alpha: 0.0001,
            batch_size: 200,
            tol: 1e-4,
            n_iter_no_change: 10,
            seed: 42,
        }
    }
}

/// A grade is awarded when the result's percentile is at least `min_percentile`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GradeTier {
    pub grade: Grade,
    pub min_percentile: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GradingSettings {
    /// Ordered best tier first, cut-offs strictly descending, last one at 0.
    pub tiers: Vec<GradeTier>,
}

impl Default for GradingSettings {
    fn default() -> Self {
        let tiers = [
            (Grade::A, 80.0),
            (Grade::B, 60.0),
            (Grade::C, 40.0),
            (Grade::D, 20.0),
            (Grade::F, 0.0),
        ]
        .into_iter()
        .map(|(grade, min_percentile)| GradeTier {
            grade,
            min_percentile,
        })
        .collect();
        Self { tiers }
    }
}

impl GradingSettings {
    pub fn grade_for(&self, percentile: f64) -> Grade {
        self.tiers
            .iter()
            .find(|tier| percentile >= tier.min_percentile)
            .or(self.tiers.last())
            .map(|tier| tier.grade)
            .unwrap_or(Grade::F)
    }
}

/// Settings shared by every sheet of every configuration in a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineSettings {
    /// Sheets with fewer usable rows (numeric target and features) are
    /// rejected before any numeric work. The split policy may raise this floor.
    pub min_rows: usize,
    /// Legacy behaviour: min-max statistics come from the whole column, so the
    /// evaluation rows leak into the scaling of the training rows. `false`
    /// computes them on the training rows only.
    pub normalize_before_split: bool,
    pub split: SplitPolicy,
    pub model: ModelSettings,
    pub grading: GradingSettings,
    /// Training that runs longer than this is abandoned and the sheet skipped.
    pub max_training_time_secs: Option<u64>,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            min_rows: 20,
            normalize_before_split: true,
            split: SplitPolicy::default(),
            model: ModelSettings::default(),
            grading: GradingSettings::default(),
            max_training_time_secs: None,
        }
    }
}

/// The Master Analysis Configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub index_column: String,
    pub configurations: Vec<SheetConfiguration>,
    pub pipeline: PipelineSettings,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            index_column: DEFAULT_INDEX_COLUMN.to_string(),
            configurations: legacy_configurations(),
            pipeline: PipelineSettings::default(),
        }
    }
}

impl AnalysisConfig {
    /// Load configuration from TOML file. Missing keys fall back to the defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: AnalysisConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn configuration(&self, name: &str) -> Option<&SheetConfiguration> {
        self.configurations.iter().find(|c| c.name == name)
    }

    /// Every workbook the configurations refer to, in enumeration order.
    pub fn required_files(&self) -> Vec<String> {
        self.configurations
            .iter()
            .map(|c| c.file_name.clone())
            .collect()
    }

    /// Validate configuration parameters
    pub fn validate(&self) -> Result<()> {
        if self.index_column.trim().is_empty() {
            bail!("index_column must not be empty");
        }

        for config in &self.configurations {
            if config.columns.features.is_empty() {
                bail!("configuration '{}' has no feature columns", config.name);
            }
            if config.file_name.trim().is_empty() {
                bail!("configuration '{}' has no file_name", config.name);
            }
        }

        let mut names: Vec<&str> = self.configurations.iter().map(|c| c.name.as_str()).collect();
        names.sort_unstable();
        if names.windows(2).any(|w| w[0] == w[1]) {
            bail!("configuration names must be unique");
        }

        let p = &self.pipeline;
        if p.min_rows < 2 {
            bail!("min_rows must be at least 2, got {}", p.min_rows);
        }

        match p.split {
            SplitPolicy::Randomized { test_ratio, .. } => {
                if !(test_ratio > 0.0 && test_ratio < 1.0) {
                    bail!("test_ratio must be in range (0, 1), got {}", test_ratio);
                }
            }
            SplitPolicy::Positional {
                train_end,
                test_start,
                test_end,
            } => {
                if train_end == 0 {
                    bail!("train_end must be greater than 0");
                }
                if test_start < train_end {
                    bail!(
                        "test_start ({}) overlaps the training rows (train_end {})",
                        test_start,
                        train_end
                    );
                }
                if let Some(end) = test_end
                    && end <= test_start
                {
                    bail!("test_end ({}) must be after test_start ({})", end, test_start);
                }
            }
        }

        let m = &p.model;
        if m.hidden_units == 0 {
            bail!("hidden_units must be greater than 0");
        }
        if m.max_iter == 0 {
            bail!("max_iter must be greater than 0");
        }
        if m.batch_size == 0 {
            bail!("batch_size must be greater than 0");
        }
        if !(m.learning_rate > 0.0) {
            bail!("learning_rate must be positive, got {}", m.learning_rate);
        }
        if m.alpha < 0.0 {
            bail!("alpha must not be negative, got {}", m.alpha);
        }

        let tiers = &p.grading.tiers;
        if tiers.is_empty() {
            bail!("grading needs at least one tier");
        }
        if tiers.windows(2).any(|w| w[0].min_percentile <= w[1].min_percentile) {
            bail!("grade tiers must have strictly descending cut-offs");
        }
        if tiers.last().map(|t| t.min_percentile) != Some(0.0) {
            bail!("the last grade tier must start at percentile 0");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = AnalysisConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.index_column, "FECHA");
        assert_eq!(
            config.required_files(),
            vec!["MEXBOL.json", "IFMEXICO.json", "IEMEXICO.json"]
        );
        assert!(config.pipeline.normalize_before_split);
        assert_eq!(config.pipeline.model.hidden_units, 200);
        assert_eq!(config.pipeline.model.max_iter, 1000);
    }

    #[test]
    fn test_config_validation() {
        let mut config = AnalysisConfig::default();
        config.pipeline.split = SplitPolicy::Randomized {
            test_ratio: 1.5,
            seed: 1,
        };
        assert!(config.validate().is_err());

        config.pipeline.split = SplitPolicy::Positional {
            train_end: 100,
            test_start: 50,
            test_end: None,
        };
        assert!(config.validate().is_err(), "overlapping cut points accepted");

        config.pipeline.split = SplitPolicy::legacy_positional();
        assert!(config.validate().is_ok());

        config.pipeline.model.hidden_units = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_split_policy_row_floor() {
        assert_eq!(SplitPolicy::legacy_positional().min_rows(), 2888);
        let adjacent = SplitPolicy::Positional {
            train_end: 40,
            test_start: 40,
            test_end: None,
        };
        assert_eq!(adjacent.min_rows(), 41);
        assert_eq!(SplitPolicy::default().min_rows(), 2);
    }

    #[test]
    fn test_duplicate_configuration_names_rejected() {
        let mut config = AnalysisConfig::default();
        let dup = config.configurations[0].clone();
        config.configurations.push(dup);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_grade_for_percentile() {
        let grading = GradingSettings::default();
        assert_eq!(grading.grade_for(100.0), Grade::A);
        assert_eq!(grading.grade_for(80.0), Grade::A);
        assert_eq!(grading.grade_for(79.9), Grade::B);
        assert_eq!(grading.grade_for(45.0), Grade::C);
        assert_eq!(grading.grade_for(0.0), Grade::F);
    }

    #[test]
    fn test_partial_toml_falls_back_to_defaults() {
        let toml = r#"
index_column = "DATE"

[pipeline]
min_rows = 50
normalize_before_split = false

[pipeline.split]
policy = "positional"
train_end = 200
test_start = 201
test_end = 260

[pipeline.model]
hidden_units = 16

[[configurations]]
name = "TEST"
file_name = "test.json"

[configurations.columns]
price = "Close"
detail = "Signal"
features = ["ma", "mom"]
"#;
        let config = AnalysisConfig::from_toml_str(toml).expect("valid toml");
        assert_eq!(config.index_column, "DATE");
        assert_eq!(config.pipeline.min_rows, 50);
        assert!(!config.pipeline.normalize_before_split);
        assert_eq!(config.pipeline.model.hidden_units, 16);
        assert_eq!(config.pipeline.model.max_iter, 1000);
        assert_eq!(
            config.pipeline.split,
            SplitPolicy::Positional {
                train_end: 200,
                test_start: 201,
                test_end: Some(260)
            }
        );
        assert_eq!(config.configurations.len(), 1);
        assert_eq!(config.configurations[0].columns.features, vec!["ma", "mom"]);
    }
}
