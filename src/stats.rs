//! Derived climbing analytics.
//!
//! Everything here is a pure function of a climb snapshot: nothing is
//! persisted, nothing does I/O, and every input (including an empty one)
//! has a defined output.

use chrono::{DateTime, Datelike, Duration, FixedOffset, Local, TimeZone, Utc};
use serde::ser::{SerializeStruct, Serializer};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

use crate::grades::GradeRank;
use crate::models::{Catalogue, Climb, Gym};

// Months shown in the trend view
pub const TREND_MONTHS: usize = 6;

// Window for "this week" counters
pub const RECENT_DAYS: i64 = 7;

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// Integer percentage rounded half-up, 0 when `whole` is 0.
pub fn percent(part: usize, whole: usize) -> u32 {
    if whole == 0 {
        return 0;
    }
    ((part * 200 + whole) / (whole * 2)) as u32
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Summary {
    pub total: usize,
    pub completed: usize,
    pub flashed: usize,
    pub success_rate: u32,
    pub flash_rate: u32,
}

impl Summary {
    pub fn from_climbs(climbs: &[Climb]) -> Self {
        let total = climbs.len();
        let completed = climbs.iter().filter(|c| c.is_completed()).count();
        let flashed = climbs.iter().filter(|c| c.is_flash()).count();

        Self {
            total,
            completed,
            flashed,
            success_rate: percent(completed, total),
            flash_rate: percent(flashed, total),
        }
    }
}

/// Hardest table grade among completed climbs.
///
/// Legacy grades outside the table never take part. `None` means there is
/// no completed climb with a known grade. On equal rank the first climb wins.
pub fn highest_grade<'a, I>(climbs: I) -> Option<GradeRank>
where
    I: IntoIterator<Item = &'a Climb>,
{
    climbs
        .into_iter()
        .filter(|c| c.is_completed())
        .filter_map(|c| c.grade.rank())
        .fold(None, |best, rank| match best {
            Some(b) if rank <= b => Some(b),
            _ => Some(rank),
        })
}

pub fn highest_grade_label(highest: Option<GradeRank>) -> &'static str {
    highest.map(GradeRank::label).unwrap_or("None")
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GradeCount {
    pub grade: GradeRank,
    pub count: usize,
}

/// Completed climbs per known grade, easiest first.
pub fn grade_histogram(climbs: &[Climb]) -> Vec<GradeCount> {
    let mut counts: BTreeMap<GradeRank, usize> = BTreeMap::new();
    for rank in climbs
        .iter()
        .filter(|c| c.is_completed())
        .filter_map(|c| c.grade.rank())
    {
        *counts.entry(rank).or_insert(0) += 1;
    }

    counts
        .into_iter()
        .map(|(grade, count)| GradeCount { grade, count })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    pub key: String,
    pub label: String,
    pub count: usize,
    pub percentage: u32,
}

// Groups in first-seen order; percentages are of `denominator`.
fn tally<'a, C, I>(values: I, denominator: usize) -> Vec<CategoryCount>
where
    C: Catalogue + 'a,
    I: IntoIterator<Item = &'a C>,
{
    let mut out: Vec<CategoryCount> = Vec::new();
    for value in values {
        match out.iter_mut().find(|entry| entry.key == value.key()) {
            Some(entry) => entry.count += 1,
            None => out.push(CategoryCount {
                key: value.key().to_string(),
                label: value.label().to_string(),
                count: 1,
                percentage: 0,
            }),
        }
    }

    for entry in &mut out {
        entry.percentage = percent(entry.count, denominator);
    }
    out
}

/// Route types of completed climbs, in order of first appearance.
pub fn route_type_histogram(climbs: &[Climb]) -> Vec<CategoryCount> {
    let completed: Vec<&Climb> = climbs.iter().filter(|c| c.is_completed()).collect();
    tally(
        completed.iter().filter_map(|c| c.route_type.as_ref()),
        completed.len(),
    )
}

pub fn wall_angle_histogram(climbs: &[Climb]) -> Vec<CategoryCount> {
    let completed: Vec<&Climb> = climbs.iter().filter(|c| c.is_completed()).collect();
    tally(
        completed.iter().filter_map(|c| c.wall_angle.as_ref()),
        completed.len(),
    )
}

/// Hold types of completed climbs. A climb counts once per hold type, so
/// percentages can add up to more than 100.
pub fn hold_type_histogram(climbs: &[Climb]) -> Vec<CategoryCount> {
    let completed: Vec<&Climb> = climbs.iter().filter(|c| c.is_completed()).collect();
    tally(
        completed.iter().flat_map(|c| c.hold_types.iter()),
        completed.len(),
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(into = "String")]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl From<YearMonth> for String {
    fn from(value: YearMonth) -> Self {
        value.to_string()
    }
}

/// Which calendar a climb's timestamp is bucketed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MonthZone {
    #[default]
    Utc,
    Local,
    Fixed(FixedOffset),
}

impl MonthZone {
    pub fn month_of(&self, date: DateTime<Utc>) -> YearMonth {
        match self {
            MonthZone::Utc => year_month(&date),
            MonthZone::Local => year_month(&date.with_timezone(&Local)),
            MonthZone::Fixed(offset) => year_month(&date.with_timezone(offset)),
        }
    }
}

fn year_month<Tz: TimeZone>(date: &DateTime<Tz>) -> YearMonth {
    YearMonth {
        year: date.year(),
        month: date.month(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyEntry {
    pub month: YearMonth,
    pub total: usize,
    pub completed: usize,
    pub flashed: usize,
}

/// Sparse per-month counters, oldest first. Months without climbs are absent.
///
/// Serializes as `{"full": [...], "trend": [...]}` so JSON readers get both views.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MonthlySeries {
    entries: Vec<MonthlyEntry>,
}

impl MonthlySeries {
    pub fn build(climbs: &[Climb], zone: MonthZone) -> Self {
        let mut months: BTreeMap<YearMonth, MonthlyEntry> = BTreeMap::new();
        for climb in climbs {
            let month = zone.month_of(climb.date);
            let entry = months.entry(month).or_insert(MonthlyEntry {
                month,
                total: 0,
                completed: 0,
                flashed: 0,
            });
            entry.total += 1;
            if climb.is_completed() {
                entry.completed += 1;
            }
            if climb.is_flash() {
                entry.flashed += 1;
            }
        }

        Self {
            entries: months.into_values().collect(),
        }
    }

    /// Every month with at least one climb.
    pub fn full(&self) -> &[MonthlyEntry] {
        &self.entries
    }

    /// The most recent `n` months present in the series.
    pub fn recent(&self, n: usize) -> &[MonthlyEntry] {
        let start = self.entries.len().saturating_sub(n);
        &self.entries[start..]
    }

    pub fn trend(&self) -> &[MonthlyEntry] {
        self.recent(TREND_MONTHS)
    }
}

impl Serialize for MonthlySeries {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("MonthlySeries", 2)?;
        state.serialize_field("full", self.full())?;
        state.serialize_field("trend", self.trend())?;
        state.end()
    }
}

pub fn monthly_series(climbs: &[Climb], zone: MonthZone) -> MonthlySeries {
    MonthlySeries::build(climbs, zone)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AchievementKind {
    FirstClimb,
    GettingStarted,
    DedicatedClimber,
    CenturyClub,
    FirstFlash,
    FlashMaster,
    GradeClimber(GradeRank),
    Intermediate,
    Advanced,
    Elite,
}

const CLIMB_LADDER: [(usize, AchievementKind); 4] = [
    (1, AchievementKind::FirstClimb),
    (10, AchievementKind::GettingStarted),
    (50, AchievementKind::DedicatedClimber),
    (100, AchievementKind::CenturyClub),
];

const FLASH_LADDER: [(usize, AchievementKind); 2] = [
    (1, AchievementKind::FirstFlash),
    (5, AchievementKind::FlashMaster),
];

// Thresholds are table ranks: V3, V5, V8
const GRADE_LADDER: [(u8, AchievementKind); 3] = [
    (3, AchievementKind::Intermediate),
    (5, AchievementKind::Advanced),
    (8, AchievementKind::Elite),
];

impl AchievementKind {
    pub fn icon(&self) -> &'static str {
        match self {
            AchievementKind::FirstClimb => "🧗",
            AchievementKind::GettingStarted => "🎯",
            AchievementKind::DedicatedClimber => "💪",
            AchievementKind::CenturyClub => "🏆",
            AchievementKind::FirstFlash => "⚡",
            AchievementKind::FlashMaster => "🔥",
            AchievementKind::GradeClimber(_) => "🎖️",
            AchievementKind::Intermediate => "🌟",
            AchievementKind::Advanced => "💎",
            AchievementKind::Elite => "👑",
        }
    }

    pub fn title(&self) -> String {
        match self {
            AchievementKind::FirstClimb => "First Climb".to_string(),
            AchievementKind::GettingStarted => "Getting Started".to_string(),
            AchievementKind::DedicatedClimber => "Dedicated Climber".to_string(),
            AchievementKind::CenturyClub => "Century Club".to_string(),
            AchievementKind::FirstFlash => "First Flash".to_string(),
            AchievementKind::FlashMaster => "Flash Master".to_string(),
            AchievementKind::GradeClimber(grade) => format!("{} Climber", grade),
            AchievementKind::Intermediate => "Intermediate".to_string(),
            AchievementKind::Advanced => "Advanced".to_string(),
            AchievementKind::Elite => "Elite".to_string(),
        }
    }

    pub fn description(&self) -> String {
        match self {
            AchievementKind::FirstClimb => "Logged your first climb!".to_string(),
            AchievementKind::GettingStarted => "10 climbs logged".to_string(),
            AchievementKind::DedicatedClimber => "50 climbs logged".to_string(),
            AchievementKind::CenturyClub => "100 climbs logged".to_string(),
            AchievementKind::FirstFlash => "Flashed your first problem".to_string(),
            AchievementKind::FlashMaster => "5 problems flashed".to_string(),
            AchievementKind::GradeClimber(grade) => format!("Completed your first {}", grade),
            AchievementKind::Intermediate => grade_floor_description(3),
            AchievementKind::Advanced => grade_floor_description(5),
            AchievementKind::Elite => grade_floor_description(8),
        }
    }
}

fn grade_floor_description(rank: u8) -> String {
    match GradeRank::from_rank(rank) {
        Some(grade) => format!("Completed {} or higher", grade),
        None => format!("Completed grade rank {} or higher", rank),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Achievement {
    pub kind: AchievementKind,
    pub icon: &'static str,
    pub title: String,
    pub description: String,
}

impl From<AchievementKind> for Achievement {
    fn from(kind: AchievementKind) -> Self {
        Self {
            kind,
            icon: kind.icon(),
            title: kind.title(),
            description: kind.description(),
        }
    }
}

/// Unlocked badges: climb ladder, then flash ladder, then grade ladder.
///
/// Each ladder is evaluated on its own and lower rungs stay unlocked.
pub fn achievements(summary: &Summary, highest: Option<GradeRank>) -> Vec<Achievement> {
    let mut unlocked: Vec<AchievementKind> = Vec::new();

    unlocked.extend(
        CLIMB_LADDER
            .iter()
            .filter(|(threshold, _)| summary.total >= *threshold)
            .map(|(_, kind)| *kind),
    );

    unlocked.extend(
        FLASH_LADDER
            .iter()
            .filter(|(threshold, _)| summary.flashed >= *threshold)
            .map(|(_, kind)| *kind),
    );

    if let Some(grade) = highest {
        unlocked.push(AchievementKind::GradeClimber(grade));
        unlocked.extend(
            GRADE_LADDER
                .iter()
                .filter(|(threshold, _)| grade.rank() >= *threshold)
                .map(|(_, kind)| *kind),
        );
    }

    unlocked.into_iter().map(Achievement::from).collect()
}

/// Climbs dated at or after `now - days`.
pub fn recent_count(climbs: &[Climb], now: DateTime<Utc>, days: i64) -> usize {
    let cutoff = now - Duration::days(days);
    climbs.iter().filter(|c| c.date >= cutoff).count()
}

/// Whole days (rounded up) since the earliest logged climb.
pub fn climbing_days(climbs: &[Climb], now: DateTime<Utc>) -> i64 {
    let Some(first) = climbs.iter().map(|c| c.date).min() else {
        return 0;
    };
    let elapsed = now.signed_duration_since(first).num_milliseconds();
    if elapsed <= 0 {
        0
    } else {
        (elapsed + MILLIS_PER_DAY - 1) / MILLIS_PER_DAY
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GymActivity {
    pub gym: Gym,
    pub total_climbs: usize,
    pub last_visit: Option<DateTime<Utc>>,
}

/// Per-gym climb count and latest climb date, in the order gyms are given.
pub fn gym_activity(gyms: &[Gym], climbs: &[Climb]) -> Vec<GymActivity> {
    gyms.iter()
        .map(|gym| {
            let at_gym = climbs.iter().filter(|c| c.gym_id == gym.id);
            let (total_climbs, last_visit) =
                at_gym.fold((0, None), |(n, last): (usize, Option<DateTime<Utc>>), c| {
                    (n + 1, Some(last.map_or(c.date, |l| l.max(c.date))))
                });
            GymActivity {
                gym: gym.clone(),
                total_climbs,
                last_visit,
            }
        })
        .collect()
}

/// All views the dashboard and `stats` command render, computed in one pass
/// over a snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct Analytics {
    pub summary: Summary,
    pub highest_grade: Option<GradeRank>,
    pub recent_climbs: usize,
    pub grades: Vec<GradeCount>,
    pub route_types: Vec<CategoryCount>,
    pub wall_angles: Vec<CategoryCount>,
    pub hold_types: Vec<CategoryCount>,
    pub monthly: MonthlySeries,
    pub achievements: Vec<Achievement>,
}

impl Analytics {
    pub fn compute(climbs: &[Climb], now: DateTime<Utc>, zone: MonthZone) -> Self {
        let summary = Summary::from_climbs(climbs);
        let highest = highest_grade(climbs);

        Self {
            summary,
            highest_grade: highest,
            recent_climbs: recent_count(climbs, now, RECENT_DAYS),
            grades: grade_histogram(climbs),
            route_types: route_type_histogram(climbs),
            wall_angles: wall_angle_histogram(climbs),
            hold_types: hold_type_histogram(climbs),
            monthly: monthly_series(climbs, zone),
            achievements: achievements(&summary, highest),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;
    use crate::models::ClimbStatus::{Attempted, Completed, Flash};

    fn rank(label: &str) -> GradeRank {
        GradeRank::from_label(label).unwrap()
    }

    mod percent_tests {
        use super::*;

        #[test]
        fn zero_denominator_is_zero() {
            assert_eq!(percent(0, 0), 0);
            assert_eq!(percent(5, 0), 0);
        }

        #[test]
        fn rounds_half_up() {
            assert_eq!(percent(1, 8), 13); // 12.5
            assert_eq!(percent(1, 3), 33);
            assert_eq!(percent(2, 3), 67);
            assert_eq!(percent(1, 2), 50);
            assert_eq!(percent(3, 3), 100);
        }
    }

    mod summary_tests {
        use super::*;

        #[test]
        fn empty_list_has_zero_rates() {
            let summary = Summary::from_climbs(&[]);
            assert_eq!(
                summary,
                Summary {
                    total: 0,
                    completed: 0,
                    flashed: 0,
                    success_rate: 0,
                    flash_rate: 0,
                }
            );
        }

        #[test]
        fn flash_counts_as_completed() {
            let climbs = vec![
                climb("V3", Completed),
                climb("V5", Flash),
                climb("V2", Attempted),
            ];
            let summary = Summary::from_climbs(&climbs);
            assert_eq!(summary.total, 3);
            assert_eq!(summary.completed, 2);
            assert_eq!(summary.flashed, 1);
            assert_eq!(summary.success_rate, 67);
            assert_eq!(summary.flash_rate, 33);
        }

        #[test]
        fn counts_are_nested_and_rates_bounded() {
            let statuses = [Attempted, Completed, Flash];
            for n in 0..30usize {
                let climbs: Vec<Climb> = (0..n)
                    .map(|i| climb("V1", statuses[(i * 7 + n) % 3]))
                    .collect();
                let s = Summary::from_climbs(&climbs);
                assert!(s.flashed <= s.completed);
                assert!(s.completed <= s.total);
                assert!(s.success_rate <= 100);
                assert!(s.flash_rate <= s.success_rate);
            }
        }
    }

    mod highest_grade_tests {
        use super::*;

        #[test]
        fn empty_is_sentinel() {
            let none: Vec<Climb> = Vec::new();
            assert_eq!(highest_grade(&none), None);
            assert_eq!(highest_grade_label(None), "None");
        }

        #[test]
        fn miscased_label_has_no_rank() {
            let climbs = vec![climb("v5", Completed), climb(" V9 ", Flash)];
            assert_eq!(highest_grade(&climbs), None);
            assert!(grade_histogram(&climbs).is_empty());
        }

        #[test]
        fn picks_highest_completed() {
            let climbs = vec![
                climb("V3", Completed),
                climb("V5", Flash),
                climb("V2", Attempted),
            ];
            assert_eq!(highest_grade(&climbs), Some(rank("V5")));
        }

        #[test]
        fn attempted_climbs_do_not_count() {
            let climbs = vec![climb("V9", Attempted), climb("V1", Completed)];
            assert_eq!(highest_grade(&climbs), Some(rank("V1")));
        }

        #[test]
        fn legacy_grade_alone_is_sentinel() {
            let climbs = vec![climb("5.10a", Completed), climb("V4", Attempted)];
            assert_eq!(highest_grade(&climbs), None);
        }

        #[test]
        fn legacy_grade_never_beats_a_known_one() {
            // First in input order, so a naive fold would keep it
            let climbs = vec![climb("5.10a", Completed), climb("V0", Completed)];
            assert_eq!(highest_grade(&climbs), Some(rank("V0")));

            let climbs = vec![climb("V0", Completed), climb("7a+", Flash)];
            assert_eq!(highest_grade(&climbs), Some(rank("V0")));
        }

        #[test]
        fn v10_plus_ranks_between_v10_and_v11() {
            let climbs = vec![climb("V10", Completed), climb("V10+", Completed)];
            assert_eq!(highest_grade(&climbs), Some(rank("V10+")));

            let climbs = vec![climb("V11", Completed), climb("V10+", Completed)];
            assert_eq!(highest_grade(&climbs), Some(rank("V11")));
        }

        #[test]
        fn result_is_always_a_table_grade() {
            let climbs = vec![
                climb("V2", Completed),
                climb("font 6c", Completed),
                climb("V7", Attempted),
            ];
            let highest = highest_grade(&climbs).unwrap();
            assert!(crate::grades::GRADES.contains(&highest.label()));
        }
    }

    mod histogram_tests {
        use super::*;

        #[test]
        fn grade_histogram_excludes_attempted_and_legacy() {
            let climbs = vec![
                climb("V5", Flash),
                climb("V3", Completed),
                climb("V2", Attempted),
                climb("5.10a", Completed),
            ];
            let hist = grade_histogram(&climbs);
            assert_eq!(
                hist,
                vec![
                    GradeCount { grade: rank("V3"), count: 1 },
                    GradeCount { grade: rank("V5"), count: 1 },
                ]
            );
        }

        #[test]
        fn grade_histogram_sorted_by_rank_and_sums_to_known_completed() {
            let climbs = vec![
                climb("V11", Completed),
                climb("V10+", Completed),
                climb("V2", Flash),
                climb("V10", Completed),
                climb("V2", Completed),
                climb("bogus", Completed),
            ];
            let hist = grade_histogram(&climbs);
            let labels: Vec<&str> = hist.iter().map(|g| g.grade.label()).collect();
            assert_eq!(labels, vec!["V2", "V10", "V10+", "V11"]);
            assert!(hist.windows(2).all(|w| w[0].grade < w[1].grade));
            assert_eq!(hist.iter().map(|g| g.count).sum::<usize>(), 5);
        }

        #[test]
        fn route_types_keep_first_seen_order() {
            let climbs = vec![
                with_route(climb("V1", Completed), "power"),
                with_route(climb("V1", Completed), "technical"),
                with_route(climb("V1", Flash), "power"),
                with_route(climb("V1", Attempted), "dyno"),
            ];
            let hist = route_type_histogram(&climbs);
            assert_eq!(hist.len(), 2);
            assert_eq!(hist[0].key, "power");
            assert_eq!(hist[0].label, "Power");
            assert_eq!(hist[0].count, 2);
            assert_eq!(hist[0].percentage, 67);
            assert_eq!(hist[1].key, "technical");
            assert_eq!(hist[1].percentage, 33);
        }

        #[test]
        fn unknown_route_type_uses_raw_label() {
            let climbs = vec![with_route(climb("V1", Completed), "compression")];
            let hist = route_type_histogram(&climbs);
            assert_eq!(hist.len(), 1);
            assert_eq!(hist[0].label, "compression");
            assert_eq!(hist[0].percentage, 100);
        }

        #[test]
        fn route_types_empty_without_completions() {
            let climbs = vec![with_route(climb("V1", Attempted), "power")];
            assert!(route_type_histogram(&climbs).is_empty());
            assert!(route_type_histogram(&[]).is_empty());
        }

        #[test]
        fn climbs_without_route_type_still_count_in_denominator() {
            let climbs = vec![
                with_route(climb("V1", Completed), "balance"),
                climb("V1", Completed),
            ];
            let hist = route_type_histogram(&climbs);
            assert_eq!(hist[0].count, 1);
            assert_eq!(hist[0].percentage, 50);
        }

        #[test]
        fn hold_types_count_each_hold_per_climb() {
            let climbs = vec![
                with_holds(climb("V1", Completed), &["crimps", "slopers"]),
                with_holds(climb("V1", Flash), &["crimps"]),
                with_holds(climb("V1", Attempted), &["jugs"]),
            ];
            let hist = hold_type_histogram(&climbs);
            assert_eq!(hist.len(), 2);
            assert_eq!(hist[0].key, "crimps");
            assert_eq!(hist[0].count, 2);
            assert_eq!(hist[0].percentage, 100);
            assert_eq!(hist[1].key, "slopers");
            assert_eq!(hist[1].percentage, 50);
        }

        #[test]
        fn wall_angles_group_like_route_types() {
            let climbs = vec![
                with_wall(climb("V1", Completed), "overhang"),
                with_wall(climb("V1", Completed), "slab"),
                with_wall(climb("V1", Completed), "overhang"),
                with_wall(climb("V1", Completed), "cave"),
            ];
            let hist = wall_angle_histogram(&climbs);
            let keys: Vec<&str> = hist.iter().map(|h| h.key.as_str()).collect();
            assert_eq!(keys, vec!["overhang", "slab", "cave"]);
            assert_eq!(hist[0].percentage, 50);
            assert_eq!(hist[2].label, "cave");
        }
    }

    mod monthly_tests {
        use super::*;

        fn twelve_over_eight_months() -> Vec<Climb> {
            let months = [
                (2023, 9),
                (2023, 10),
                (2023, 11),
                (2023, 12),
                (2024, 1),
                (2024, 2),
                (2024, 3),
                (2024, 4),
            ];
            let mut climbs = Vec::new();
            for (i, (y, m)) in months.iter().enumerate() {
                climbs.push(climb_on("V2", Completed, date(*y, *m, 10)));
                if i % 2 == 0 {
                    climbs.push(climb_on("V3", Attempted, date(*y, *m, 20)));
                }
            }
            // Out of date order on purpose
            climbs.reverse();
            climbs
        }

        #[test]
        fn empty_series() {
            let series = monthly_series(&[], MonthZone::Utc);
            assert!(series.full().is_empty());
            assert!(series.trend().is_empty());
        }

        #[test]
        fn twelve_climbs_across_eight_months() {
            let climbs = twelve_over_eight_months();
            assert_eq!(climbs.len(), 12);

            let series = monthly_series(&climbs, MonthZone::Utc);
            assert_eq!(series.full().len(), 8);

            let keys: Vec<String> = series.full().iter().map(|e| e.month.to_string()).collect();
            assert_eq!(keys.first().map(String::as_str), Some("2023-09"));
            assert_eq!(keys.last().map(String::as_str), Some("2024-04"));
            assert!(series.full().windows(2).all(|w| w[0].month < w[1].month));

            let trend: Vec<String> = series.trend().iter().map(|e| e.month.to_string()).collect();
            assert_eq!(
                trend,
                vec!["2023-11", "2023-12", "2024-01", "2024-02", "2024-03", "2024-04"]
            );
        }

        #[test]
        fn totals_sum_to_input_length() {
            let climbs = twelve_over_eight_months();
            let series = monthly_series(&climbs, MonthZone::Utc);
            let total: usize = series.full().iter().map(|e| e.total).sum();
            assert_eq!(total, climbs.len());
        }

        #[test]
        fn counts_completed_and_flashed_per_month() {
            let climbs = vec![
                climb_on("V1", Flash, date(2024, 5, 1)),
                climb_on("V1", Completed, date(2024, 5, 2)),
                climb_on("V1", Attempted, date(2024, 5, 3)),
            ];
            let series = monthly_series(&climbs, MonthZone::Utc);
            assert_eq!(
                series.full(),
                &[MonthlyEntry {
                    month: YearMonth { year: 2024, month: 5 },
                    total: 3,
                    completed: 2,
                    flashed: 1,
                }]
            );
        }

        #[test]
        fn sparse_months_are_not_filled() {
            let climbs = vec![
                climb_on("V1", Completed, date(2024, 1, 5)),
                climb_on("V1", Completed, date(2024, 6, 5)),
            ];
            let series = monthly_series(&climbs, MonthZone::Utc);
            assert_eq!(series.full().len(), 2);
        }

        #[test]
        fn recent_never_exceeds_available() {
            let climbs = vec![climb_on("V1", Completed, date(2024, 1, 5))];
            let series = monthly_series(&climbs, MonthZone::Utc);
            assert_eq!(series.recent(6).len(), 1);
            assert_eq!(series.recent(0).len(), 0);
        }

        #[test]
        fn month_boundary_depends_on_zone() {
            // 23:30 UTC on Jan 31 is already February at UTC+2
            let late = Utc.with_ymd_and_hms(2024, 1, 31, 23, 30, 0).unwrap();
            let climbs = vec![climb_on("V1", Completed, late)];

            let utc = monthly_series(&climbs, MonthZone::Utc);
            assert_eq!(utc.full()[0].month.to_string(), "2024-01");

            let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();
            let shifted = monthly_series(&climbs, MonthZone::Fixed(plus_two));
            assert_eq!(shifted.full()[0].month.to_string(), "2024-02");
        }

        #[test]
        fn json_carries_full_history_and_trend() {
            let climbs: Vec<Climb> = (1..=8)
                .map(|m| climb_on("V1", Completed, date(2023, m, 10)))
                .collect();
            let series = monthly_series(&climbs, MonthZone::Utc);

            let json = serde_json::to_value(&series).unwrap();
            assert_eq!(json["full"].as_array().unwrap().len(), 8);
            let trend = json["trend"].as_array().unwrap();
            assert_eq!(trend.len(), TREND_MONTHS);
            assert_eq!(trend[0]["month"], "2023-03");
        }

        #[test]
        fn year_month_serializes_as_key() {
            let ym = YearMonth { year: 2024, month: 3 };
            assert_eq!(serde_json::to_string(&ym).unwrap(), "\"2024-03\"");
        }
    }

    mod achievement_tests {
        use super::*;

        fn titles(list: &[Achievement]) -> Vec<String> {
            list.iter().map(|a| a.title.clone()).collect()
        }

        fn evaluate(climbs: &[Climb]) -> Vec<Achievement> {
            achievements(&Summary::from_climbs(climbs), highest_grade(climbs))
        }

        #[test]
        fn empty_list_has_none() {
            assert!(evaluate(&[]).is_empty());
        }

        #[test]
        fn first_attempt_unlocks_first_climb_only() {
            let list = evaluate(&[climb("V4", Attempted)]);
            assert_eq!(titles(&list), vec!["First Climb"]);
        }

        #[test]
        fn ladders_emit_in_fixed_order() {
            let mut climbs: Vec<Climb> = (0..5).map(|_| climb("V1", Flash)).collect();
            climbs.extend((0..5).map(|_| climb("V6", Completed)));

            let list = evaluate(&climbs);
            assert_eq!(
                titles(&list),
                vec![
                    "First Climb",
                    "Getting Started",
                    "First Flash",
                    "Flash Master",
                    "V6 Climber",
                    "Intermediate",
                    "Advanced",
                ]
            );
            assert_eq!(list[4].description, "Completed your first V6");
            assert_eq!(list[5].description, "Completed V3 or higher");
        }

        #[test]
        fn century_keeps_lower_rungs() {
            let climbs: Vec<Climb> = (0..100).map(|_| climb("V0", Attempted)).collect();
            let list = evaluate(&climbs);
            assert_eq!(
                titles(&list),
                vec!["First Climb", "Getting Started", "Dedicated Climber", "Century Club"]
            );
        }

        #[test]
        fn elite_at_v8() {
            let list = evaluate(&[climb("V8", Completed)]);
            assert!(list.iter().any(|a| a.kind == AchievementKind::Elite));
            let list = evaluate(&[climb("V7", Completed)]);
            assert!(!list.iter().any(|a| a.kind == AchievementKind::Elite));
        }

        #[test]
        fn legacy_only_grades_skip_grade_ladder() {
            let list = evaluate(&[climb("5.12a", Completed)]);
            assert_eq!(titles(&list), vec!["First Climb"]);
        }

        #[test]
        fn evaluation_is_deterministic() {
            let climbs = vec![climb("V5", Flash), climb("V2", Completed)];
            assert_eq!(evaluate(&climbs), evaluate(&climbs));
        }

        #[test]
        fn ladder_is_monotone() {
            use std::mem::discriminant;

            let grades = ["V0", "V3", "V5", "V8", "V12"];
            let statuses = [Attempted, Completed, Flash];
            let mut climbs: Vec<Climb> = Vec::new();
            let mut previous = evaluate(&climbs);

            for i in 0..120usize {
                climbs.push(climb(grades[(i * 3) % grades.len()], statuses[i % 3]));
                let current = evaluate(&climbs);
                for old in &previous {
                    assert!(
                        current
                            .iter()
                            .any(|a| discriminant(&a.kind) == discriminant(&old.kind)),
                        "lost {:?} after {} climbs",
                        old.kind,
                        climbs.len()
                    );
                }
                previous = current;
            }
        }
    }

    mod activity_tests {
        use super::*;
        use crate::models::Gym;

        fn gym(id: i64, name: &str) -> Gym {
            Gym {
                id,
                name: name.to_string(),
                location: "Boulder, CO".to_string(),
                created_at: date(2024, 1, 1),
            }
        }

        #[test]
        fn recent_count_uses_seven_day_window() {
            let now = date(2024, 3, 10);
            let climbs = vec![
                climb_on("V1", Completed, date(2024, 3, 9)),
                climb_on("V1", Completed, date(2024, 3, 3)),
                climb_on("V1", Completed, date(2024, 3, 2)),
            ];
            assert_eq!(recent_count(&climbs, now, RECENT_DAYS), 2);
        }

        #[test]
        fn climbing_days_rounds_up() {
            let now = date(2024, 3, 10) + Duration::hours(1);
            let climbs = vec![
                climb_on("V1", Completed, date(2024, 3, 8)),
                climb_on("V1", Completed, date(2024, 3, 9)),
            ];
            assert_eq!(climbing_days(&climbs, now), 3);
            assert_eq!(climbing_days(&[], now), 0);
        }

        #[test]
        fn climbing_days_never_negative() {
            let now = date(2024, 3, 1);
            let climbs = vec![climb_on("V1", Completed, date(2024, 4, 1))];
            assert_eq!(climbing_days(&climbs, now), 0);
        }

        #[test]
        fn gym_activity_counts_and_last_visit() {
            let gyms = vec![gym(1, "Movement"), gym(2, "Vertical World")];
            let mut climbs = vec![
                climb_on("V1", Completed, date(2024, 3, 1)),
                climb_on("V1", Completed, date(2024, 3, 5)),
            ];
            climbs[1].gym_id = 1;

            let activity = gym_activity(&gyms, &climbs);
            assert_eq!(activity.len(), 2);
            assert_eq!(activity[0].total_climbs, 2);
            assert_eq!(activity[0].last_visit, Some(date(2024, 3, 5)));
            assert_eq!(activity[1].total_climbs, 0);
            assert!(activity[1].last_visit.is_none());
        }
    }

    mod analytics_tests {
        use super::*;

        #[test]
        fn empty_snapshot() {
            let analytics = Analytics::compute(&[], date(2024, 3, 1), MonthZone::Utc);
            assert_eq!(analytics.summary, Summary::default());
            assert!(analytics.highest_grade.is_none());
            assert!(analytics.achievements.is_empty());
            assert!(analytics.grades.is_empty());
            assert!(analytics.monthly.full().is_empty());
        }

        #[test]
        fn mixed_session_rolls_up() {
            let climbs = vec![
                climb("V3", Completed),
                climb("V5", Flash),
                climb("V2", Attempted),
            ];
            let analytics = Analytics::compute(&climbs, date(2024, 3, 2), MonthZone::Utc);
            assert_eq!(analytics.summary.completed, 2);
            assert_eq!(analytics.summary.flashed, 1);
            assert_eq!(analytics.highest_grade, Some(rank("V5")));
            assert_eq!(analytics.grades.len(), 2);
            assert_eq!(analytics.recent_climbs, 3);
        }
    }
}
