use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::data::ResultsMap;
use crate::domain::SheetResult;
use crate::pipeline::SkippedSheet;

/// Outcome of one configuration: ordered, graded results plus everything that was skipped.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfigurationReport {
    pub name: String,
    /// Sorted descending by `final_value`
    pub results: Vec<SheetResult>,
    pub skipped: Vec<SkippedSheet>,
    /// Set when the workbook itself could not be read; `results` is then empty.
    pub source_error: Option<String>,
}

impl ConfigurationReport {
    pub fn unavailable(name: &str, error: impl ToString) -> Self {
        Self {
            name: name.to_string(),
            results: Vec::new(),
            skipped: Vec::new(),
            source_error: Some(error.to_string()),
        }
    }

    pub fn is_clean(&self) -> bool {
        self.source_error.is_none() && self.skipped.is_empty()
    }
}

/// "Nothing to show" vs "partial success" vs everything processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum_macros::Display)]
pub enum RunStatus {
    Complete,
    Partial,
    Empty,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub generated_at: DateTime<Utc>,
    pub configurations: Vec<ConfigurationReport>,
}

impl AnalysisReport {
    pub fn new(configurations: Vec<ConfigurationReport>) -> Self {
        Self {
            generated_at: Utc::now(),
            configurations,
        }
    }

    pub fn total_results(&self) -> usize {
        self.configurations.iter().map(|c| c.results.len()).sum()
    }

    pub fn total_skipped(&self) -> usize {
        self.configurations.iter().map(|c| c.skipped.len()).sum()
    }

    pub fn status(&self) -> RunStatus {
        if self.total_results() == 0 {
            RunStatus::Empty
        } else if self.configurations.iter().all(ConfigurationReport::is_clean) {
            RunStatus::Complete
        } else {
            RunStatus::Partial
        }
    }

    pub fn is_empty(&self) -> bool {
        self.status() == RunStatus::Empty
    }

    /// Configuration name -> ordered results, for configurations with at least
    /// one result. Keys keep the order the configurations were run in.
    pub fn results_map(&self) -> ResultsMap {
        self.configurations
            .iter()
            .filter(|c| !c.results.is_empty())
            .map(|c| (c.name.clone(), c.results.clone()))
            .collect()
    }

    pub fn configuration(&self, name: &str) -> Option<&ConfigurationReport> {
        self.configurations.iter().find(|c| c.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Outlook;
    use crate::pipeline::{SkipReason, Stage};

    fn with_results(name: &str, n: usize) -> ConfigurationReport {
        ConfigurationReport {
            name: name.to_string(),
            results: (0..n)
                .map(|i| SheetResult {
                    sheet_name: format!("S{}", i),
                    final_value: i as f64,
                    grade: None,
                    optimal_threshold: 0.5,
                    predicted_return: 0.0,
                    rank: None,
                    percentile: None,
                    outlook: Outlook::Rising,
                })
                .collect(),
            skipped: Vec::new(),
            source_error: None,
        }
    }

    #[test]
    fn test_run_status_distinguishes_empty_from_partial() {
        let complete = AnalysisReport::new(vec![with_results("A", 2)]);
        assert_eq!(complete.status(), RunStatus::Complete);

        let mut skipped = with_results("B", 1);
        skipped.skipped.push(SkippedSheet::new(
            "X",
            Stage::Validated,
            SkipReason::DataQuality("too short".to_string()),
        ));
        let partial = AnalysisReport::new(vec![with_results("A", 2), skipped]);
        assert_eq!(partial.status(), RunStatus::Partial);

        let partial = AnalysisReport::new(vec![
            with_results("A", 1),
            ConfigurationReport::unavailable("C", "workbook not found"),
        ]);
        assert_eq!(partial.status(), RunStatus::Partial);

        let empty = AnalysisReport::new(vec![
            with_results("A", 0),
            ConfigurationReport::unavailable("C", "workbook not found"),
        ]);
        assert_eq!(empty.status(), RunStatus::Empty);
        assert!(empty.is_empty());
        assert!(AnalysisReport::new(Vec::new()).is_empty());
    }

    #[test]
    fn test_results_map_omits_empty_configurations() {
        let report = AnalysisReport::new(vec![with_results("A", 2), with_results("B", 0)]);
        let map = report.results_map();
        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["A"]);
        assert_eq!(map["A"].len(), 2);
    }

    #[test]
    fn test_results_map_keeps_configuration_order() {
        let report = AnalysisReport::new(vec![
            with_results("MEXBOL", 1),
            with_results("IFMEXICO", 1),
            with_results("IEMEXICO", 1),
        ]);
        let results_map = report.results_map();
        let names: Vec<&str> = results_map.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["MEXBOL", "IFMEXICO", "IEMEXICO"]);
    }
}
