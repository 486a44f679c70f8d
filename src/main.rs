mod community;
mod db;
mod grades;
mod models;
mod stats;
mod text;
mod tui;

use chrono::{FixedOffset, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use std::collections::HashMap;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::info;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use community::{leaderboard, LocalClimber, StaticRoster, FLASH_WEEK};
use db::Database;
use grades::{grade_rank, GRADES};
use models::{
    parse_climb_date, Catalogue, ClimbForm, HoldType, InputError, JsonOutput, NewGym, Profile,
    RouteType, Snapshot, Theme, WallAngle,
};
use stats::{climbing_days, gym_activity, highest_grade_label, Analytics, MonthZone};
use text::{bar, truncate};

const DEFAULT_DB_NAME: &str = "boulderlog.db";
const LOG_ENV: &str = "BOULDERLOG_LOG";

#[derive(Parser)]
#[command(name = "boulderlog")]
#[command(about = "Log bouldering sessions and track your climbing progress")]
#[command(version)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Bucket monthly stats by local time instead of UTC
    #[arg(long, global = true, conflicts_with = "month_offset")]
    local_months: bool,

    /// Bucket monthly stats at a fixed UTC offset, e.g. +02:00
    #[arg(long, global = true, value_parser = parse_offset, allow_hyphen_values = true)]
    month_offset: Option<FixedOffset>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the database
    Init,

    /// Manage gyms
    #[command(subcommand)]
    Gym(GymCommands),

    /// Log and list climbs
    #[command(subcommand)]
    Climb(ClimbCommands),

    /// Show climbing statistics
    Stats {
        /// Show every month instead of the recent trend
        #[arg(long)]
        all_months: bool,
    },

    /// List unlocked achievements
    Achievements,

    /// Show the community leaderboard and weekly challenge
    Leaderboard,

    /// View or edit your profile
    #[command(subcommand)]
    Profile(ProfileCommands),

    /// Export all data as JSON
    Export {
        /// Write to this file instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Delete all climbs and gyms and reset the profile
    Clear {
        /// Confirm deletion
        #[arg(long)]
        yes: bool,
    },

    /// List valid grades, route types, wall angles and hold types
    Catalog,

    /// Launch interactive terminal UI
    Tui,
}

#[derive(Subcommand)]
enum GymCommands {
    /// Add a gym
    Add {
        /// Gym name
        name: String,

        /// City or address
        #[arg(long, short)]
        location: String,
    },

    /// List gyms with their activity
    List,

    /// Select the gym new climbs are logged against
    Select {
        /// Gym ID
        id: i64,
    },
}

#[derive(Subcommand)]
enum ClimbCommands {
    /// Log a climb
    Log {
        /// Route name
        route_name: String,

        /// V-scale grade (V0-V17, V10+)
        #[arg(long, short)]
        grade: String,

        /// attempted, completed or flash
        #[arg(long, short)]
        status: Option<String>,

        /// Number of attempts
        #[arg(long, short, default_value_t = 1)]
        attempts: u32,

        /// Route style (technical, power, endurance, balance, coordination, dyno)
        #[arg(long)]
        route_type: Option<String>,

        /// Wall angle (slab, vertical, overhang, roof)
        #[arg(long)]
        wall_angle: Option<String>,

        /// Comma-separated hold types
        #[arg(long)]
        holds: Option<String>,

        /// Free-form notes
        #[arg(long, short)]
        notes: Option<String>,

        /// Gym ID (defaults to the selected gym)
        #[arg(long)]
        gym: Option<i64>,

        /// Climb date, YYYY-MM-DD or RFC 3339 (defaults to now)
        #[arg(long, short)]
        date: Option<String>,
    },

    /// List climbs, most recent first
    List {
        /// Maximum number of climbs to show
        #[arg(long, short)]
        limit: Option<usize>,
    },

    /// Show climb details
    Show {
        /// Climb ID
        id: i64,
    },
}

#[derive(Subcommand)]
enum ProfileCommands {
    /// Show profile and climbing summary
    Show,

    /// Update profile fields
    Set {
        #[arg(long)]
        name: Option<String>,

        /// YYYY-MM-DD
        #[arg(long)]
        start_date: Option<String>,

        /// Gym ID
        #[arg(long)]
        favorite_gym: Option<i64>,

        /// dark, light or system
        #[arg(long)]
        theme: Option<String>,

        /// Comma-separated goals (replaces existing)
        #[arg(long)]
        goals: Option<String>,
    },
}

fn get_db_path() -> PathBuf {
    if let Ok(path) = std::env::var("BOULDERLOG_DB") {
        return PathBuf::from(path);
    }

    let config_dir = dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("boulderlog");

    std::fs::create_dir_all(&config_dir).ok();
    config_dir.join(DEFAULT_DB_NAME)
}

fn parse_offset(s: &str) -> Result<FixedOffset, String> {
    s.parse::<FixedOffset>()
        .map_err(|_| format!("invalid UTC offset '{}' (expected e.g. +02:00)", s))
}

/// Where log lines go. The dashboard owns the terminal, so it logs to a file
/// beside the database instead of stderr.
#[derive(Debug, PartialEq)]
enum LogSink {
    Stderr,
    File(PathBuf),
}

impl LogSink {
    fn for_command(command: &Commands, db_path: &Path) -> Self {
        match command {
            Commands::Tui => LogSink::File(db_path.with_extension("log")),
            _ => LogSink::Stderr,
        }
    }

    fn writer(&self) -> BoxMakeWriter {
        match self {
            LogSink::Stderr => BoxMakeWriter::new(std::io::stderr),
            LogSink::File(path) => match OpenOptions::new().create(true).append(true).open(path) {
                Ok(file) => BoxMakeWriter::new(Mutex::new(file)),
                // Never fall back to stderr while the alternate screen is up
                Err(_) => BoxMakeWriter::new(std::io::sink),
            },
        }
    }
}

fn init_logging(sink: &LogSink) {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(*sink == LogSink::Stderr)
                .with_writer(sink.writer()),
        )
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(&LogSink::for_command(&cli.command, &get_db_path()));
    let json = cli.json;

    if let Err(e) = run(cli) {
        if json {
            let output = JsonOutput::<()>::err(e.to_string());
            if let Ok(s) = serde_json::to_string(&output) {
                println!("{}", s);
            }
        }
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let db_path = get_db_path();
    let db = Database::open(&db_path)?;
    db.init()?;

    let zone = match (cli.month_offset, cli.local_months) {
        (Some(offset), _) => MonthZone::Fixed(offset),
        (None, true) => MonthZone::Local,
        (None, false) => MonthZone::Utc,
    };

    match cli.command {
        Commands::Init => {
            if cli.json {
                println!("{}", serde_json::to_string(&JsonOutput::<()>::ok(()))?);
            } else {
                println!("Database initialized at: {}", db_path.display());
            }
        }

        Commands::Gym(gym_cmd) => match gym_cmd {
            GymCommands::Add { name, location } => {
                let gym = NewGym::new(&name, &location)?;
                let id = db.add_gym(&gym)?;

                if cli.json {
                    println!(
                        "{}",
                        serde_json::to_string(&JsonOutput::ok(serde_json::json!({
                            "id": id,
                            "name": gym.name,
                            "location": gym.location
                        })))?
                    );
                } else {
                    println!("Added gym '{}' with ID: {}", gym.name, id);
                }
            }

            GymCommands::List => {
                let gyms = db.list_gyms()?;
                let climbs = db.list_climbs(None)?;
                let activity = gym_activity(&gyms, &climbs);
                let selected = db.get_profile()?.selected_gym;

                if cli.json {
                    println!("{}", serde_json::to_string(&JsonOutput::ok(&activity))?);
                } else if activity.is_empty() {
                    println!("No gyms found. Add one with `boulderlog gym add`.");
                } else {
                    println!(
                        "  {:<5} {:<28} {:<24} {:>7} LAST VISIT",
                        "ID", "NAME", "LOCATION", "CLIMBS"
                    );
                    println!("{}", "-".repeat(84));
                    for a in activity {
                        let marker = if selected == Some(a.gym.id) { "*" } else { " " };
                        let last = a
                            .last_visit
                            .map(|d| d.format("%Y-%m-%d").to_string())
                            .unwrap_or_else(|| "-".to_string());
                        println!(
                            "{} {:<5} {:<28} {:<24} {:>7} {}",
                            marker,
                            a.gym.id,
                            truncate(&a.gym.name, 26),
                            truncate(&a.gym.location, 22),
                            a.total_climbs,
                            last
                        );
                    }
                }
            }

            GymCommands::Select { id } => {
                let Some(gym) = db.get_gym(id)? else {
                    if cli.json {
                        println!(
                            "{}",
                            serde_json::to_string(&JsonOutput::<()>::err("Gym not found"))?
                        );
                        return Ok(());
                    }
                    return Err(InputError::UnknownGym(id).into());
                };

                let mut profile = db.get_profile()?;
                profile.selected_gym = Some(gym.id);
                db.save_profile(&profile)?;

                if cli.json {
                    println!("{}", serde_json::to_string(&JsonOutput::ok(&gym))?);
                } else {
                    println!("Selected gym '{}' (ID: {}).", gym.name, gym.id);
                }
            }
        },

        Commands::Climb(climb_cmd) => match climb_cmd {
            ClimbCommands::Log {
                route_name,
                grade,
                status,
                attempts,
                route_type,
                wall_angle,
                holds,
                notes,
                gym,
                date,
            } => {
                let profile = db.get_profile()?;
                let date = date.as_deref().map(parse_climb_date).transpose()?;

                let form = ClimbForm {
                    route_name,
                    grade,
                    gym_id: gym.or(profile.selected_gym),
                    attempts,
                    status,
                    route_type,
                    wall_angle,
                    hold_types: holds.as_deref().map(split_list).unwrap_or_default(),
                    notes,
                    date,
                };
                let climb = form.validate(Utc::now())?;

                let gym = db
                    .get_gym(climb.gym_id)?
                    .ok_or(InputError::UnknownGym(climb.gym_id))?;
                let id = db.add_climb(&climb)?;

                if cli.json {
                    println!(
                        "{}",
                        serde_json::to_string(&JsonOutput::ok(serde_json::json!({
                            "id": id,
                            "route_name": climb.route_name,
                            "grade": climb.grade,
                            "status": climb.status,
                            "gym_id": gym.id
                        })))?
                    );
                } else {
                    println!(
                        "Logged {} '{}' ({}) at {} with ID: {}",
                        climb.grade,
                        climb.route_name,
                        climb.status.label(),
                        gym.name,
                        id
                    );
                }
            }

            ClimbCommands::List { limit } => {
                let climbs = db.list_climbs(limit)?;
                if cli.json {
                    println!("{}", serde_json::to_string(&JsonOutput::ok(&climbs))?);
                } else if climbs.is_empty() {
                    println!("No climbs logged yet.");
                } else {
                    let gym_names: HashMap<i64, String> = db
                        .list_gyms()?
                        .into_iter()
                        .map(|g| (g.id, g.name))
                        .collect();

                    println!(
                        "{:<5} {:<10} {:<6} {:<10} {:>3} {:<30} GYM",
                        "ID", "DATE", "GRADE", "STATUS", "ATT", "ROUTE"
                    );
                    println!("{}", "-".repeat(90));
                    for c in climbs {
                        let gym = gym_names.get(&c.gym_id).map(String::as_str).unwrap_or("-");
                        println!(
                            "{:<5} {:<10} {:<6} {:<10} {:>3} {:<30} {}",
                            c.id,
                            c.date.format("%Y-%m-%d"),
                            c.grade.as_str(),
                            c.status.label(),
                            c.attempts,
                            truncate(&c.route_name, 28),
                            truncate(gym, 20)
                        );
                    }
                }
            }

            ClimbCommands::Show { id } => {
                let Some(climb) = db.get_climb(id)? else {
                    if cli.json {
                        println!(
                            "{}",
                            serde_json::to_string(&JsonOutput::<()>::err("Climb not found"))?
                        );
                    } else {
                        println!("Climb not found.");
                    }
                    return Ok(());
                };

                if cli.json {
                    println!("{}", serde_json::to_string(&JsonOutput::ok(&climb))?);
                } else {
                    let gym = db.get_gym(climb.gym_id)?;
                    println!("Route: {}", climb.route_name);
                    println!("ID: {}", climb.id);
                    println!("Grade: {}", climb.grade.as_str());
                    println!("Status: {} ({} attempts)", climb.status.label(), climb.attempts);
                    println!(
                        "Gym: {}",
                        gym.map(|g| g.name).unwrap_or_else(|| "-".to_string())
                    );
                    println!("Date: {}", climb.date.format("%Y-%m-%d %H:%M UTC"));
                    if let Some(rt) = &climb.route_type {
                        println!("Style: {} {}", rt.label(), describe(rt.description()));
                    }
                    if let Some(wall) = &climb.wall_angle {
                        println!("Wall: {} {}", wall.label(), describe(wall.description()));
                    }
                    if !climb.hold_types.is_empty() {
                        let holds: Vec<&str> = climb.hold_types.iter().map(|h| h.label()).collect();
                        println!("Holds: {}", holds.join(", "));
                    }
                    if let Some(notes) = &climb.notes {
                        println!("Notes: {}", notes);
                    }
                }
            }
        },

        Commands::Stats { all_months } => {
            let climbs = db.list_climbs(None)?;
            let analytics = Analytics::compute(&climbs, Utc::now(), zone);

            if cli.json {
                println!("{}", serde_json::to_string(&JsonOutput::ok(&analytics))?);
            } else {
                print_stats(&analytics, all_months);
            }
        }

        Commands::Achievements => {
            let climbs = db.list_climbs(None)?;
            let analytics = Analytics::compute(&climbs, Utc::now(), zone);

            if cli.json {
                println!(
                    "{}",
                    serde_json::to_string(&JsonOutput::ok(&analytics.achievements))?
                );
            } else if analytics.achievements.is_empty() {
                println!("No achievements yet. Log a climb to unlock your first!");
            } else {
                println!("=== Achievements ===");
                for a in &analytics.achievements {
                    println!("{} {:<20} {}", a.icon, a.title, a.description);
                }
            }
        }

        Commands::Leaderboard => {
            let climbs = db.list_climbs(None)?;
            let local = LocalClimber::from_climbs(&climbs);
            let ranked = leaderboard(&local, &StaticRoster::default());
            let challenge = FLASH_WEEK.progress(&climbs, Utc::now());

            if cli.json {
                println!(
                    "{}",
                    serde_json::to_string(&JsonOutput::ok(serde_json::json!({
                        "leaderboard": ranked,
                        "challenge": challenge
                    })))?
                );
            } else {
                println!("=== Leaderboard ===");
                println!("{:<5} {:<24} {:>7} {:<6}", "RANK", "CLIMBER", "CLIMBS", "BEST");
                println!("{}", "-".repeat(46));
                for r in &ranked {
                    let name = if r.climber.is_you {
                        format!("{} (you)", r.climber.name)
                    } else {
                        r.climber.name.clone()
                    };
                    println!(
                        "{:<5} {:<24} {:>7} {:<6}",
                        format!("#{}", r.rank),
                        truncate(&name, 22),
                        r.climber.total_climbs,
                        highest_grade_label(r.climber.highest_grade)
                    );
                }
                println!();
                println!("=== {} ===", challenge.name);
                println!("{}", challenge.description);
                println!(
                    "Progress: {}/{} ({}%){}",
                    challenge.progress,
                    challenge.target,
                    challenge.percent,
                    if challenge.completed { " - complete!" } else { "" }
                );
            }
        }

        Commands::Profile(profile_cmd) => match profile_cmd {
            ProfileCommands::Show => {
                let profile = db.get_profile()?;
                let climbs = db.list_climbs(None)?;
                let analytics = Analytics::compute(&climbs, Utc::now(), zone);
                let days = climbing_days(&climbs, Utc::now());
                let favorite = match profile.favorite_gym {
                    Some(id) => db.get_gym(id)?,
                    None => None,
                };

                if cli.json {
                    println!(
                        "{}",
                        serde_json::to_string(&JsonOutput::ok(serde_json::json!({
                            "profile": profile,
                            "climbing_days": days,
                            "summary": analytics.summary,
                            "highest_grade": analytics.highest_grade,
                            "achievements": analytics.achievements.len()
                        })))?
                    );
                } else {
                    println!("Name: {}", profile.display_name());
                    println!("Climbing since: {}", profile.start_date.format("%Y-%m-%d"));
                    println!(
                        "Favorite gym: {}",
                        favorite.map(|g| g.name).unwrap_or_else(|| "-".to_string())
                    );
                    println!("Theme: {}", profile.theme.as_str());
                    if !profile.goals.is_empty() {
                        println!("Goals:");
                        for goal in &profile.goals {
                            println!("  - {}", goal);
                        }
                    }
                    println!();
                    println!("--- Quick Stats ---");
                    println!("Total climbs: {}", analytics.summary.total);
                    println!("Highest grade: {}", highest_grade_label(analytics.highest_grade));
                    println!("Climbing days: {}", days);
                    println!("Achievements: {}", analytics.achievements.len());
                }
            }

            ProfileCommands::Set {
                name,
                start_date,
                favorite_gym,
                theme,
                goals,
            } => {
                if let Some(id) = favorite_gym {
                    if db.get_gym(id)?.is_none() {
                        return Err(InputError::UnknownGym(id).into());
                    }
                }

                let mut profile = db.get_profile()?;
                let edit = ProfileEdit {
                    name,
                    start_date,
                    favorite_gym,
                    theme,
                    goals,
                };
                edit.apply(&mut profile)?;
                db.save_profile(&profile)?;

                if cli.json {
                    println!("{}", serde_json::to_string(&JsonOutput::ok(&profile))?);
                } else {
                    println!("Profile updated.");
                }
            }
        },

        Commands::Export { output } => {
            let snapshot = db.snapshot()?;
            write_snapshot(&snapshot, output.as_deref())?;
            info!(
                climbs = snapshot.climbs.len(),
                gyms = snapshot.gyms.len(),
                "exported snapshot"
            );

            if let Some(path) = output {
                if cli.json {
                    println!(
                        "{}",
                        serde_json::to_string(&JsonOutput::ok(serde_json::json!({
                            "path": path,
                            "climbs": snapshot.climbs.len(),
                            "gyms": snapshot.gyms.len()
                        })))?
                    );
                } else {
                    println!(
                        "Exported {} climbs and {} gyms to {}",
                        snapshot.climbs.len(),
                        snapshot.gyms.len(),
                        path.display()
                    );
                }
            }
        }

        Commands::Clear { yes } => {
            if !yes {
                return Err("refusing to delete all data without --yes".into());
            }
            let removed = db.count_climbs()?;
            db.clear_all()?;

            if cli.json {
                println!(
                    "{}",
                    serde_json::to_string(&JsonOutput::ok(serde_json::json!({
                        "climbs_removed": removed
                    })))?
                );
            } else {
                println!("All climbing data cleared ({} climbs removed).", removed);
            }
        }

        Commands::Catalog => {
            if cli.json {
                let route_types = RouteType::KNOWN;
                let wall_angles = WallAngle::KNOWN;
                let hold_types = HoldType::KNOWN;
                println!(
                    "{}",
                    serde_json::to_string(&JsonOutput::ok(serde_json::json!({
                        "grades": GRADES,
                        "route_types": route_types,
                        "wall_angles": wall_angles,
                        "hold_types": hold_types
                    })))?
                );
            } else {
                print_catalog();
            }
        }

        Commands::Tui => {
            tui::run(db, zone)?;
        }
    }

    Ok(())
}

// Profile fields supplied on the command line; `None` leaves a field as is
struct ProfileEdit {
    name: Option<String>,
    start_date: Option<String>,
    favorite_gym: Option<i64>,
    theme: Option<String>,
    goals: Option<String>,
}

impl ProfileEdit {
    fn apply(self, profile: &mut Profile) -> Result<(), InputError> {
        if let Some(name) = self.name {
            profile.name = name.trim().to_string();
        }
        if let Some(raw) = self.start_date {
            profile.start_date = NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
                .map_err(|_| InputError::InvalidDate(raw))?;
        }
        if let Some(id) = self.favorite_gym {
            profile.favorite_gym = Some(id);
        }
        if let Some(raw) = self.theme {
            profile.theme = Theme::from_str(&raw).ok_or(InputError::UnknownTheme(raw))?;
        }
        if let Some(goals) = self.goals {
            profile.goals = split_list(&goals);
        }
        Ok(())
    }
}

fn print_stats(analytics: &Analytics, all_months: bool) {
    let summary = &analytics.summary;

    println!("=== Climbing Statistics ===");
    println!("Total climbs: {} ({} this week)", summary.total, analytics.recent_climbs);
    println!(
        "Completed: {} ({}% success rate)",
        summary.completed, summary.success_rate
    );
    println!("Flashed: {} ({}% flash rate)", summary.flashed, summary.flash_rate);
    println!("Highest grade: {}", highest_grade_label(analytics.highest_grade));

    if !analytics.grades.is_empty() {
        println!();
        println!("--- Grade Distribution ---");
        let max = analytics.grades.iter().map(|g| g.count).max().unwrap_or(1);
        for g in &analytics.grades {
            println!("{:<5} {:>4} {}", g.grade.label(), g.count, bar(g.count, max, 30));
        }
    }

    for (title, rows) in [
        ("Route Types", &analytics.route_types),
        ("Wall Angles", &analytics.wall_angles),
        ("Hold Types", &analytics.hold_types),
    ] {
        if rows.is_empty() {
            continue;
        }
        println!();
        println!("--- {} ---", title);
        for r in rows {
            println!("{:<14} {:>4} {:>4}%", truncate(&r.label, 14), r.count, r.percentage);
        }
    }

    let trend = if all_months {
        analytics.monthly.full()
    } else {
        analytics.monthly.trend()
    };
    if !trend.is_empty() {
        println!();
        println!("--- Monthly Progress ---");
        println!("{:<8} {:>6} {:>6} {:>6}", "MONTH", "TOTAL", "SENT", "FLASH");
        for m in trend {
            println!(
                "{:<8} {:>6} {:>6} {:>6}",
                m.month.to_string(),
                m.total,
                m.completed,
                m.flashed
            );
        }
    }
}

fn print_catalog() {
    println!("=== Grades (easiest first) ===");
    for label in GRADES {
        if let Some(rank) = grade_rank(label) {
            println!("{:>3}  {}", rank, label);
        }
    }

    println!();
    println!("=== Route Types ===");
    for rt in &RouteType::KNOWN {
        println!("{:<14} {}", rt.key(), rt.description());
    }

    println!();
    println!("=== Wall Angles ===");
    for wall in &WallAngle::KNOWN {
        println!("{:<14} {}", wall.key(), wall.description());
    }

    println!();
    println!("=== Hold Types ===");
    for hold in &HoldType::KNOWN {
        println!("{:<14} {}", hold.key(), hold.description());
    }
}

fn describe(description: &str) -> String {
    if description.is_empty() {
        String::new()
    } else {
        format!("({})", description)
    }
}

fn write_snapshot(
    snapshot: &Snapshot,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let json = serde_json::to_string_pretty(snapshot)?;
    match output {
        Some(path) => std::fs::write(path, json)?,
        None => println!("{}", json),
    }
    Ok(())
}

/// Splits a comma-separated flag value, dropping blanks.
fn split_list(s: &str) -> Vec<String> {
    s.split(',')
        .map(|part| part.trim().to_string())
        .filter(|part| !part.is_empty())
        .collect()
}
