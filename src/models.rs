use chrono::{DateTime, Local, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::grades::GradeRank;

// Rejections at the write boundary. Stored data is never re-validated on read.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InputError {
    #[error("route name is required")]
    EmptyRouteName,

    #[error("unknown grade '{0}' (expected V0-V10, V10+, V11-V17)")]
    UnknownGrade(String),

    #[error("unknown status '{0}'. Use: attempted, completed, or flash")]
    UnknownStatus(String),

    #[error("attempts must be at least 1")]
    ZeroAttempts,

    #[error("unknown route type '{0}'")]
    UnknownRouteType(String),

    #[error("unknown wall angle '{0}'")]
    UnknownWallAngle(String),

    #[error("unknown hold type '{0}'")]
    UnknownHoldType(String),

    #[error("no gym selected. Run `boulderlog gym select <id>` or pass --gym")]
    NoGymSelected,

    #[error("gym {0} not found")]
    UnknownGym(i64),

    #[error("gym name and location are required")]
    IncompleteGym,

    #[error("invalid date '{0}' (expected YYYY-MM-DD or RFC 3339)")]
    InvalidDate(String),

    #[error("unknown theme '{0}'. Use: dark, light, or system")]
    UnknownTheme(String),
}

// Outcome of a logged climb. Flash counts as completed everywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClimbStatus {
    Attempted,
    Completed,
    Flash,
}

impl ClimbStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClimbStatus::Attempted => "attempted",
            ClimbStatus::Completed => "completed",
            ClimbStatus::Flash => "flash",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "attempted" | "attempt" | "a" => Some(ClimbStatus::Attempted),
            "completed" | "complete" | "sent" | "send" | "c" => Some(ClimbStatus::Completed),
            "flash" | "flashed" | "f" => Some(ClimbStatus::Flash),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ClimbStatus::Attempted => "Attempted",
            ClimbStatus::Completed => "Completed",
            ClimbStatus::Flash => "Flash",
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, ClimbStatus::Completed | ClimbStatus::Flash)
    }

    pub fn is_flash(&self) -> bool {
        matches!(self, ClimbStatus::Flash)
    }
}

/// A stored grade: either a rank from the ordering table or a legacy label
/// that the table does not know.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Grade {
    Known(GradeRank),
    Unrecognized(String),
}

impl Grade {
    pub fn from_str(s: &str) -> Self {
        match GradeRank::from_label(s) {
            Some(rank) => Grade::Known(rank),
            None => Grade::Unrecognized(s.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Grade::Known(rank) => rank.label(),
            Grade::Unrecognized(raw) => raw,
        }
    }

    pub fn rank(&self) -> Option<GradeRank> {
        match self {
            Grade::Known(rank) => Some(*rank),
            Grade::Unrecognized(_) => None,
        }
    }
}

impl From<String> for Grade {
    fn from(value: String) -> Self {
        Grade::from_str(&value)
    }
}

impl From<Grade> for String {
    fn from(grade: Grade) -> Self {
        grade.as_str().to_string()
    }
}

/// Fixed display catalogue for a categorical climb tag.
///
/// `label` falls back to the stored key for values outside the catalogue.
pub trait Catalogue {
    fn key(&self) -> &str;
    fn label(&self) -> &str;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RouteType {
    Technical,
    Power,
    Endurance,
    Balance,
    Coordination,
    Dyno,
    Other(String),
}

impl RouteType {
    pub const KNOWN: [RouteType; 6] = [
        RouteType::Technical,
        RouteType::Power,
        RouteType::Endurance,
        RouteType::Balance,
        RouteType::Coordination,
        RouteType::Dyno,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            RouteType::Technical => "technical",
            RouteType::Power => "power",
            RouteType::Endurance => "endurance",
            RouteType::Balance => "balance",
            RouteType::Coordination => "coordination",
            RouteType::Dyno => "dyno",
            RouteType::Other(raw) => raw,
        }
    }

    // Strict: used when logging new climbs
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "technical" => Some(RouteType::Technical),
            "power" => Some(RouteType::Power),
            "endurance" => Some(RouteType::Endurance),
            "balance" => Some(RouteType::Balance),
            "coordination" => Some(RouteType::Coordination),
            "dyno" => Some(RouteType::Dyno),
            _ => None,
        }
    }

    // Lenient: used when reading stored rows
    pub fn from_str(s: &str) -> Self {
        Self::parse(s).unwrap_or_else(|| RouteType::Other(s.to_string()))
    }

    pub fn description(&self) -> &'static str {
        match self {
            RouteType::Technical => {
                "Requires precise footwork, body positioning, and problem-solving"
            }
            RouteType::Power => "Explosive, dynamic moves requiring maximum strength",
            RouteType::Endurance => "Long routes that test your stamina and pump management",
            RouteType::Balance => "Emphasizes core strength and body positioning",
            RouteType::Coordination => "Complex sequences requiring timing and flow",
            RouteType::Dyno => "Dynamic jumping moves requiring commitment and timing",
            RouteType::Other(_) => "",
        }
    }
}

impl Catalogue for RouteType {
    fn key(&self) -> &str {
        self.as_str()
    }

    fn label(&self) -> &str {
        match self {
            RouteType::Technical => "Technical",
            RouteType::Power => "Power",
            RouteType::Endurance => "Endurance",
            RouteType::Balance => "Balance",
            RouteType::Coordination => "Coordination",
            RouteType::Dyno => "Dyno",
            RouteType::Other(raw) => raw,
        }
    }
}

impl From<String> for RouteType {
    fn from(value: String) -> Self {
        RouteType::from_str(&value)
    }
}

impl From<RouteType> for String {
    fn from(value: RouteType) -> Self {
        value.as_str().to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum WallAngle {
    Slab,
    Vertical,
    Overhang,
    Roof,
    Other(String),
}

impl WallAngle {
    pub const KNOWN: [WallAngle; 4] = [
        WallAngle::Slab,
        WallAngle::Vertical,
        WallAngle::Overhang,
        WallAngle::Roof,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            WallAngle::Slab => "slab",
            WallAngle::Vertical => "vertical",
            WallAngle::Overhang => "overhang",
            WallAngle::Roof => "roof",
            WallAngle::Other(raw) => raw,
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "slab" => Some(WallAngle::Slab),
            "vertical" | "vert" => Some(WallAngle::Vertical),
            "overhang" => Some(WallAngle::Overhang),
            "roof" => Some(WallAngle::Roof),
            _ => None,
        }
    }

    pub fn from_str(s: &str) -> Self {
        Self::parse(s).unwrap_or_else(|| WallAngle::Other(s.to_string()))
    }

    pub fn description(&self) -> &'static str {
        match self {
            WallAngle::Slab => "Less than vertical, requires balance and friction",
            WallAngle::Vertical => "Straight up wall, most common angle",
            WallAngle::Overhang => "Past vertical, requires upper body strength",
            WallAngle::Roof => "Nearly horizontal, maximum difficulty",
            WallAngle::Other(_) => "",
        }
    }
}

impl Catalogue for WallAngle {
    fn key(&self) -> &str {
        self.as_str()
    }

    fn label(&self) -> &str {
        match self {
            WallAngle::Slab => "Slab",
            WallAngle::Vertical => "Vertical",
            WallAngle::Overhang => "Overhang",
            WallAngle::Roof => "Roof",
            WallAngle::Other(raw) => raw,
        }
    }
}

impl From<String> for WallAngle {
    fn from(value: String) -> Self {
        WallAngle::from_str(&value)
    }
}

impl From<WallAngle> for String {
    fn from(value: WallAngle) -> Self {
        value.as_str().to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum HoldType {
    Jugs,
    Crimps,
    Slopers,
    Pinches,
    Pockets,
    Other(String),
}

impl HoldType {
    pub const KNOWN: [HoldType; 5] = [
        HoldType::Jugs,
        HoldType::Crimps,
        HoldType::Slopers,
        HoldType::Pinches,
        HoldType::Pockets,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            HoldType::Jugs => "jugs",
            HoldType::Crimps => "crimps",
            HoldType::Slopers => "slopers",
            HoldType::Pinches => "pinches",
            HoldType::Pockets => "pockets",
            HoldType::Other(raw) => raw,
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "jugs" | "jug" => Some(HoldType::Jugs),
            "crimps" | "crimp" => Some(HoldType::Crimps),
            "slopers" | "sloper" => Some(HoldType::Slopers),
            "pinches" | "pinch" => Some(HoldType::Pinches),
            "pockets" | "pocket" => Some(HoldType::Pockets),
            _ => None,
        }
    }

    pub fn from_str(s: &str) -> Self {
        Self::parse(s).unwrap_or_else(|| HoldType::Other(s.to_string()))
    }

    pub fn description(&self) -> &'static str {
        match self {
            HoldType::Jugs => "Large, positive holds you can wrap your whole hand around",
            HoldType::Crimps => "Small edges gripped with fingertips, knuckles bent",
            HoldType::Slopers => "Round, smooth holds requiring open-hand grip and friction",
            HoldType::Pinches => "Holds gripped between thumb and fingers like holding a book",
            HoldType::Pockets => "Holes in the wall for 1-3 fingers",
            HoldType::Other(_) => "",
        }
    }
}

impl Catalogue for HoldType {
    fn key(&self) -> &str {
        self.as_str()
    }

    fn label(&self) -> &str {
        match self {
            HoldType::Jugs => "Jugs",
            HoldType::Crimps => "Crimps",
            HoldType::Slopers => "Slopers",
            HoldType::Pinches => "Pinches",
            HoldType::Pockets => "Pockets",
            HoldType::Other(raw) => raw,
        }
    }
}

impl From<String> for HoldType {
    fn from(value: String) -> Self {
        HoldType::from_str(&value)
    }
}

impl From<HoldType> for String {
    fn from(value: HoldType) -> Self {
        value.as_str().to_string()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Climb {
    pub id: i64,
    pub route_name: String,
    pub grade: Grade,
    pub gym_id: i64,
    pub attempts: u32,
    pub status: ClimbStatus,
    pub route_type: Option<RouteType>,
    pub wall_angle: Option<WallAngle>,
    pub hold_types: Vec<HoldType>,
    pub date: DateTime<Utc>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Climb {
    pub fn is_completed(&self) -> bool {
        self.status.is_completed()
    }

    pub fn is_flash(&self) -> bool {
        self.status.is_flash()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Gym {
    pub id: i64,
    pub name: String,
    pub location: String,
    pub created_at: DateTime<Utc>,
}

// A gym ready to insert
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewGym {
    pub name: String,
    pub location: String,
}

impl NewGym {
    pub fn new(name: &str, location: &str) -> Result<Self, InputError> {
        let name = name.trim();
        let location = location.trim();
        if name.is_empty() || location.is_empty() {
            return Err(InputError::IncompleteGym);
        }
        Ok(Self {
            name: name.to_string(),
            location: location.to_string(),
        })
    }
}

// Raw climb input as typed by the user
#[derive(Debug, Clone, Default)]
pub struct ClimbForm {
    pub route_name: String,
    pub grade: String,
    pub gym_id: Option<i64>,
    pub attempts: u32,
    pub status: Option<String>,
    pub route_type: Option<String>,
    pub wall_angle: Option<String>,
    pub hold_types: Vec<String>,
    pub notes: Option<String>,
    pub date: Option<DateTime<Utc>>,
}

// A climb that passed validation and is ready to insert
#[derive(Debug, Clone)]
pub struct NewClimb {
    pub route_name: String,
    pub grade: GradeRank,
    pub gym_id: i64,
    pub attempts: u32,
    pub status: ClimbStatus,
    pub route_type: Option<RouteType>,
    pub wall_angle: Option<WallAngle>,
    pub hold_types: Vec<HoldType>,
    pub notes: Option<String>,
    pub date: DateTime<Utc>,
}

impl ClimbForm {
    /// Checks required fields and catalogue membership.
    ///
    /// Gym existence is the store's concern; this only requires that one was chosen.
    pub fn validate(self, now: DateTime<Utc>) -> Result<NewClimb, InputError> {
        let route_name = self.route_name.trim().to_string();
        if route_name.is_empty() {
            return Err(InputError::EmptyRouteName);
        }

        let grade =
            GradeRank::parse(&self.grade).ok_or(InputError::UnknownGrade(self.grade))?;

        let gym_id = self.gym_id.ok_or(InputError::NoGymSelected)?;

        if self.attempts == 0 {
            return Err(InputError::ZeroAttempts);
        }

        let status = match self.status {
            Some(s) => ClimbStatus::from_str(&s).ok_or(InputError::UnknownStatus(s))?,
            None => ClimbStatus::Attempted,
        };

        let route_type = match self.route_type {
            Some(s) => Some(RouteType::parse(&s).ok_or(InputError::UnknownRouteType(s))?),
            None => None,
        };

        let wall_angle = match self.wall_angle {
            Some(s) => Some(WallAngle::parse(&s).ok_or(InputError::UnknownWallAngle(s))?),
            None => None,
        };

        let mut hold_types: Vec<HoldType> = Vec::new();
        for raw in self.hold_types {
            let hold = HoldType::parse(&raw).ok_or(InputError::UnknownHoldType(raw))?;
            if !hold_types.contains(&hold) {
                hold_types.push(hold);
            }
        }

        let notes = self
            .notes
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());

        Ok(NewClimb {
            route_name,
            grade,
            gym_id,
            attempts: self.attempts,
            status,
            route_type,
            wall_angle,
            hold_types,
            notes,
            date: self.date.unwrap_or(now),
        })
    }
}

/// Accepts `YYYY-MM-DD` (midnight UTC) or a full RFC 3339 timestamp.
pub fn parse_climb_date(s: &str) -> Result<DateTime<Utc>, InputError> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
        .ok_or_else(|| InputError::InvalidDate(s.to_string()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Dark,
    Light,
    #[default]
    System,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
            Theme::System => "system",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "dark" => Some(Theme::Dark),
            "light" => Some(Theme::Light),
            "system" | "auto" => Some(Theme::System),
            _ => None,
        }
    }
}

/// Local-only climber profile and preferences.
///
/// Persisted through the store alongside climbs and gyms, and handed to the
/// CLI and dashboard at startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    pub start_date: NaiveDate,
    pub favorite_gym: Option<i64>,
    pub selected_gym: Option<i64>,
    pub theme: Theme,
    pub goals: Vec<String>,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            name: String::new(),
            start_date: Local::now().date_naive(),
            favorite_gym: None,
            selected_gym: None,
            theme: Theme::default(),
            goals: Vec::new(),
        }
    }
}

impl Profile {
    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            "Climber"
        } else {
            &self.name
        }
    }
}

// Full dump written by `export`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub exported_at: DateTime<Utc>,
    pub climbs: Vec<Climb>,
    pub gyms: Vec<Gym>,
    pub profile: Profile,
}

// JSON output wrapper for CLI
#[derive(Debug, Serialize)]
pub struct JsonOutput<T: Serialize> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T: Serialize> JsonOutput<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(msg.into()),
        }
    }
}
