//! Community leaderboard and challenges.
//!
//! The local climber and everyone else are both `ClimberSource`s, so the
//! illustrative roster can be replaced by a real backend without touching
//! the ranking code.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::grades::GradeRank;
use crate::models::Climb;
use crate::stats::{highest_grade, percent, Summary};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClimberStats {
    pub name: String,
    pub avatar: String,
    pub total_climbs: usize,
    pub highest_grade: Option<GradeRank>,
    pub recent_activity: Option<String>,
    pub is_you: bool,
}

pub trait ClimberSource {
    fn climbers(&self) -> Vec<ClimberStats>;
}

/// The user of this device, summarised from their own climbs.
#[derive(Debug, Clone)]
pub struct LocalClimber {
    pub summary: Summary,
    pub highest_grade: Option<GradeRank>,
}

impl LocalClimber {
    pub fn from_climbs(climbs: &[Climb]) -> Self {
        Self {
            summary: Summary::from_climbs(climbs),
            highest_grade: highest_grade(climbs),
        }
    }
}

impl ClimberSource for LocalClimber {
    fn climbers(&self) -> Vec<ClimberStats> {
        vec![ClimberStats {
            name: "You".to_string(),
            avatar: "👤".to_string(),
            total_climbs: self.summary.total,
            highest_grade: self.highest_grade,
            recent_activity: None,
            is_you: true,
        }]
    }
}

// Fixed sample climbers shown until there is a shared backend
#[derive(Debug, Clone)]
pub struct StaticRoster {
    climbers: Vec<ClimberStats>,
}

impl StaticRoster {
    pub fn new(climbers: Vec<ClimberStats>) -> Self {
        Self { climbers }
    }
}

impl Default for StaticRoster {
    fn default() -> Self {
        let sample = |name: &str, avatar: &str, total: usize, grade: &str, activity: &str| {
            ClimberStats {
                name: name.to_string(),
                avatar: avatar.to_string(),
                total_climbs: total,
                highest_grade: GradeRank::from_label(grade),
                recent_activity: Some(activity.to_string()),
                is_you: false,
            }
        };

        Self::new(vec![
            sample("Alex Chen", "🧗‍♂️", 156, "V7", "Flashed a V5 at Boulder Rock Club"),
            sample("Sarah Johnson", "🧗‍♀️", 203, "V6", "Completed first V6 at Vertical World"),
            sample("Mike Rodriguez", "🧗", 89, "V4", "Logged 8 climbs at Movement Gym"),
            sample("Emma Wilson", "🧗‍♀️", 267, "V8", "New personal best: V8 flash!"),
        ])
    }
}

impl ClimberSource for StaticRoster {
    fn climbers(&self) -> Vec<ClimberStats> {
        self.climbers.clone()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedClimber {
    pub rank: usize,
    #[serde(flatten)]
    pub climber: ClimberStats,
}

/// Merges sources in the order given and ranks by total climbs, most first.
///
/// Ties keep merge order. Ranks are 1-based positions.
pub fn rank_climbers(sources: &[&dyn ClimberSource]) -> Vec<RankedClimber> {
    let mut all: Vec<ClimberStats> = sources.iter().flat_map(|s| s.climbers()).collect();
    all.sort_by(|a, b| b.total_climbs.cmp(&a.total_climbs));

    all.into_iter()
        .enumerate()
        .map(|(i, climber)| RankedClimber {
            rank: i + 1,
            climber,
        })
        .collect()
}

/// The local climber first, then the community.
pub fn leaderboard(local: &LocalClimber, community: &dyn ClimberSource) -> Vec<RankedClimber> {
    let sources: [&dyn ClimberSource; 2] = [local, community];
    rank_climbers(&sources)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Challenge {
    pub name: &'static str,
    pub description: &'static str,
    pub target: usize,
    pub window_days: i64,
}

pub const FLASH_WEEK: Challenge = Challenge {
    name: "Flash Week",
    description: "Flash 5 problems this week",
    target: 5,
    window_days: 7,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChallengeProgress {
    pub name: &'static str,
    pub description: &'static str,
    pub progress: usize,
    pub target: usize,
    pub percent: u32,
    pub completed: bool,
}

impl Challenge {
    /// Flashes dated inside the trailing window ending at `now`.
    pub fn progress(&self, climbs: &[Climb], now: DateTime<Utc>) -> ChallengeProgress {
        let cutoff = now - Duration::days(self.window_days);
        let progress = climbs
            .iter()
            .filter(|c| c.is_flash() && c.date >= cutoff)
            .count();

        ChallengeProgress {
            name: self.name,
            description: self.description,
            progress,
            target: self.target,
            percent: percent(progress, self.target).min(100),
            completed: progress >= self.target,
        }
    }
}
