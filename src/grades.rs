use serde::{Deserialize, Serialize};
use std::fmt;

// Position in this list is the grade's rank. "V10+" sits between V10 and V11.
pub const GRADES: [&str; 19] = [
    "V0", "V1", "V2", "V3", "V4", "V5", "V6", "V7", "V8", "V9", "V10", "V10+", "V11", "V12",
    "V13", "V14", "V15", "V16", "V17",
];

/// A grade that exists in the ordering table.
///
/// Ordering follows the table, so `max()` over ranks is the hardest grade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct GradeRank(u8);

impl GradeRank {
    /// Exact table lookup. Stored labels go through here, so `"v5"` has no rank.
    pub fn from_label(label: &str) -> Option<Self> {
        GRADES
            .iter()
            .position(|g| *g == label)
            .map(|i| GradeRank(i as u8))
    }

    /// Forgiving lookup for user input: ignores surrounding spaces and case.
    pub fn parse(input: &str) -> Option<Self> {
        let wanted = input.trim();
        GRADES
            .iter()
            .position(|g| g.eq_ignore_ascii_case(wanted))
            .map(|i| GradeRank(i as u8))
    }

    pub fn from_rank(rank: u8) -> Option<Self> {
        if (rank as usize) < GRADES.len() {
            Some(GradeRank(rank))
        } else {
            None
        }
    }

    pub fn rank(self) -> u8 {
        self.0
    }

    pub fn label(self) -> &'static str {
        GRADES[self.0 as usize]
    }
}

impl fmt::Display for GradeRank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl TryFrom<String> for GradeRank {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        GradeRank::from_label(&value).ok_or_else(|| format!("unknown grade '{}'", value))
    }
}

impl From<GradeRank> for String {
    fn from(grade: GradeRank) -> Self {
        grade.label().to_string()
    }
}

/// Rank of a grade label, or `None` when the label is not in the table.
pub fn grade_rank(label: &str) -> Option<u8> {
    GradeRank::from_label(label).map(GradeRank::rank)
}
