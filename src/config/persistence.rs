//! Output file naming

/// Base filename for result files (without extension)
pub const RESULTS_BASE_FILE_NAME: &str = "analysis_results";

/// Example: "analysis_results.json"
pub fn results_json_filename() -> String {
    format!("{}.json", RESULTS_BASE_FILE_NAME)
}

/// One tabular file per configuration.
/// Example: "analysis_results_MEXBOL.csv"
pub fn results_csv_filename(config_name: &str) -> String {
    format!("{}_{}.csv", RESULTS_BASE_FILE_NAME, config_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_filenames() {
        assert_eq!(results_json_filename(), "analysis_results.json");
        assert_eq!(results_csv_filename("MEXBOL"), "analysis_results_MEXBOL.csv");
    }
}
