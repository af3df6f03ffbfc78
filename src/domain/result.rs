use serde::{Deserialize, Serialize};
use std::fmt;

/// Relative grade tiers, best first.
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
    Deserialize,
    strum_macros::EnumIter,
    strum_macros::Display,
)]
pub enum Grade {
    A,
    B,
    C,
    D,
    F,
}

/// Direction implied by the most recent evaluation prediction.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum Outlook {
    Rising,
    Falling,
}

impl Outlook {
    pub fn from_last_prediction(last_prediction: f64, optimal_threshold: f64) -> Self {
        if last_prediction > optimal_threshold {
            Outlook::Rising
        } else {
            Outlook::Falling
        }
    }
}

impl fmt::Display for Outlook {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Outlook::Rising => write!(f, "📈 rising"),
            Outlook::Falling => write!(f, "📉 falling"),
        }
    }
}

/// Outcome for one successfully processed instrument.
///
/// `grade`, `rank` and `percentile` stay `None` until every sheet of the
/// configuration has been scored; see `analysis::assign_grades`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SheetResult {
    pub sheet_name: String,
    pub final_value: f64,
    pub grade: Option<Grade>,
    pub optimal_threshold: f64,
    pub predicted_return: f64,
    pub rank: Option<usize>,
    pub percentile: Option<f64>,
    pub outlook: Outlook,
}

impl SheetResult {
    pub fn is_graded(&self) -> bool {
        self.grade.is_some() && self.rank.is_some()
    }
}
