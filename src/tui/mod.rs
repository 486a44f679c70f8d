mod ui;
mod widgets;

use std::collections::HashMap;
use std::io;
use std::time::Duration;

use chrono::{DateTime, Utc};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{debug, error};

use crate::community::{
    leaderboard, ChallengeProgress, LocalClimber, RankedClimber, StaticRoster, FLASH_WEEK,
};
use crate::db::Database;
use crate::models::{Climb, Profile};
use crate::stats::{climbing_days, Analytics, MonthZone};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Stats,
    Climbs,
    Profile,
    Community,
}

impl View {
    pub const ALL: [View; 4] = [View::Stats, View::Climbs, View::Profile, View::Community];

    fn next(&self) -> Self {
        match self {
            View::Stats => View::Climbs,
            View::Climbs => View::Profile,
            View::Profile => View::Community,
            View::Community => View::Stats,
        }
    }

    fn prev(&self) -> Self {
        match self {
            View::Stats => View::Community,
            View::Climbs => View::Stats,
            View::Profile => View::Climbs,
            View::Community => View::Profile,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            View::Stats => "Stats",
            View::Climbs => "Climbs",
            View::Profile => "Profile",
            View::Community => "Community",
        }
    }
}

pub struct StatefulList<T> {
    pub items: Vec<T>,
    pub selected: Option<usize>,
}

impl<T> StatefulList<T> {
    fn with_items(items: Vec<T>) -> Self {
        let selected = if items.is_empty() { None } else { Some(0) };
        Self { items, selected }
    }

    fn next(&mut self) {
        if self.items.is_empty() {
            return;
        }
        let i = match self.selected {
            Some(i) if i + 1 < self.items.len() => i + 1,
            _ => 0,
        };
        self.selected = Some(i);
    }

    fn previous(&mut self) {
        if self.items.is_empty() {
            return;
        }
        let i = match self.selected {
            Some(0) | None => self.items.len() - 1,
            Some(i) => i - 1,
        };
        self.selected = Some(i);
    }

    fn first(&mut self) {
        if !self.items.is_empty() {
            self.selected = Some(0);
        }
    }

    fn last(&mut self) {
        if !self.items.is_empty() {
            self.selected = Some(self.items.len() - 1);
        }
    }
}

/// Everything the tabs render, derived from one store snapshot.
pub struct Dashboard {
    pub analytics: Analytics,
    pub climbs: StatefulList<Climb>,
    pub gym_names: HashMap<i64, String>,
    pub profile: Profile,
    pub favorite_gym: Option<String>,
    pub selected_gym: Option<String>,
    pub climbing_days: i64,
    pub leaderboard: Vec<RankedClimber>,
    pub challenge: ChallengeProgress,
}

impl Dashboard {
    fn load(db: &Database, zone: MonthZone, now: DateTime<Utc>) -> rusqlite::Result<Self> {
        let climbs = db.list_climbs(None)?;
        let gym_names: HashMap<i64, String> = db
            .list_gyms()?
            .into_iter()
            .map(|g| (g.id, g.name))
            .collect();
        let profile = db.get_profile()?;

        let analytics = Analytics::compute(&climbs, now, zone);
        let local = LocalClimber::from_climbs(&climbs);
        let ranked = leaderboard(&local, &StaticRoster::default());
        let challenge = FLASH_WEEK.progress(&climbs, now);
        let days = climbing_days(&climbs, now);

        let name_of = |id: Option<i64>| id.and_then(|id| gym_names.get(&id).cloned());
        let favorite_gym = name_of(profile.favorite_gym);
        let selected_gym = name_of(profile.selected_gym);

        debug!(climbs = climbs.len(), "dashboard loaded");
        Ok(Self {
            analytics,
            climbs: StatefulList::with_items(climbs),
            gym_names,
            profile,
            favorite_gym,
            selected_gym,
            climbing_days: days,
            leaderboard: ranked,
            challenge,
        })
    }

    pub fn gym_name(&self, id: i64) -> &str {
        self.gym_names.get(&id).map(String::as_str).unwrap_or("-")
    }
}

pub enum LoadState {
    Ready(Box<Dashboard>),
    // Store read failed; tabs render an inert notice
    Failed(String),
}

pub struct App {
    db: Database,
    zone: MonthZone,
    pub view: View,
    pub state: LoadState,
    pub should_quit: bool,
}

impl App {
    pub fn new(db: Database, zone: MonthZone) -> Self {
        let state = Self::load(&db, zone);
        Self {
            db,
            zone,
            view: View::Stats,
            state,
            should_quit: false,
        }
    }

    fn load(db: &Database, zone: MonthZone) -> LoadState {
        match Dashboard::load(db, zone, Utc::now()) {
            Ok(dashboard) => LoadState::Ready(Box::new(dashboard)),
            Err(e) => {
                error!(error = %e, "could not load climbing data");
                LoadState::Failed(e.to_string())
            }
        }
    }

    pub fn refresh_data(&mut self) {
        self.state = Self::load(&self.db, self.zone);
    }

    pub fn dashboard(&self) -> Option<&Dashboard> {
        match &self.state {
            LoadState::Ready(d) => Some(d.as_ref()),
            LoadState::Failed(_) => None,
        }
    }

    // Only the climbs tab scrolls
    fn climbs_mut(&mut self) -> Option<&mut StatefulList<Climb>> {
        if self.view != View::Climbs {
            return None;
        }
        match &mut self.state {
            LoadState::Ready(d) => Some(&mut d.climbs),
            LoadState::Failed(_) => None,
        }
    }

    fn handle_key(&mut self, key: KeyCode, modifiers: KeyModifiers) {
        match key {
            KeyCode::Char('q') => self.should_quit = true,

            KeyCode::Char('r') if modifiers.contains(KeyModifiers::CONTROL) => {
                self.refresh_data();
            }

            KeyCode::Char('h') | KeyCode::Left | KeyCode::BackTab => {
                self.view = self.view.prev();
            }
            KeyCode::Char('l') | KeyCode::Right => self.view = self.view.next(),
            KeyCode::Tab => {
                if modifiers.contains(KeyModifiers::SHIFT) {
                    self.view = self.view.prev();
                } else {
                    self.view = self.view.next();
                }
            }

            KeyCode::Char('j') | KeyCode::Down => {
                if let Some(list) = self.climbs_mut() {
                    list.next();
                }
            }
            KeyCode::Char('k') | KeyCode::Up => {
                if let Some(list) = self.climbs_mut() {
                    list.previous();
                }
            }
            KeyCode::Char('g') => {
                if let Some(list) = self.climbs_mut() {
                    list.first();
                }
            }
            KeyCode::Char('G') => {
                if let Some(list) = self.climbs_mut() {
                    list.last();
                }
            }

            _ => {}
        }
    }
}

pub fn run(db: Database, zone: MonthZone) -> Result<(), Box<dyn std::error::Error>> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(db, zone);

    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                app.handle_key(key.code, key.modifiers);
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ClimbForm, NewGym};

    fn seeded_db(climbs: &[(&str, &str)]) -> Database {
        let db = Database::open(":memory:").unwrap();
        db.init().unwrap();
        let gym = db.add_gym(&NewGym::new("Movement", "Boulder, CO").unwrap()).unwrap();
        for (grade, status) in climbs {
            let form = ClimbForm {
                route_name: format!("{} line", grade),
                grade: grade.to_string(),
                gym_id: Some(gym),
                attempts: 1,
                status: Some(status.to_string()),
                ..Default::default()
            };
            db.add_climb(&form.validate(Utc::now()).unwrap()).unwrap();
        }
        db
    }

    mod list_tests {
        use super::*;

        #[test]
        fn next_and_previous_wrap() {
            let mut list = StatefulList::with_items(vec![1, 2, 3]);
            assert_eq!(list.selected, Some(0));
            list.previous();
            assert_eq!(list.selected, Some(2));
            list.next();
            assert_eq!(list.selected, Some(0));
        }

        #[test]
        fn empty_list_has_no_selection() {
            let mut list: StatefulList<i32> = StatefulList::with_items(Vec::new());
            list.next();
            list.last();
            assert!(list.selected.is_none());
        }
    }

    mod app_tests {
        use super::*;

        #[test]
        fn loads_dashboard_from_store() {
            let db = seeded_db(&[("V3", "completed"), ("V5", "flash"), ("V7", "attempted")]);
            let app = App::new(db, MonthZone::Utc);

            let dashboard = app.dashboard().expect("dashboard should load");
            assert_eq!(dashboard.analytics.summary.total, 3);
            assert_eq!(dashboard.analytics.highest_grade.map(|g| g.label()), Some("V5"));
            assert_eq!(dashboard.climbs.items.len(), 3);
            assert_eq!(dashboard.leaderboard.len(), 5);
            assert_eq!(dashboard.challenge.progress, 1);
            assert_eq!(dashboard.gym_name(dashboard.climbs.items[0].gym_id), "Movement");
        }

        #[test]
        fn corrupt_rows_leave_inert_state() {
            let db = seeded_db(&[("V3", "completed")]);
            db.execute_raw("UPDATE climbs SET date = 'last tuesday'").unwrap();

            let app = App::new(db, MonthZone::Utc);
            assert!(app.dashboard().is_none());
            assert!(matches!(app.state, LoadState::Failed(_)));
        }

        #[test]
        fn keys_switch_tabs_and_scroll() {
            let db = seeded_db(&[("V1", "completed"), ("V2", "completed")]);
            let mut app = App::new(db, MonthZone::Utc);

            app.handle_key(KeyCode::Char('l'), KeyModifiers::NONE);
            assert_eq!(app.view, View::Climbs);

            app.handle_key(KeyCode::Char('j'), KeyModifiers::NONE);
            assert_eq!(app.dashboard().unwrap().climbs.selected, Some(1));

            app.handle_key(KeyCode::Char('h'), KeyModifiers::NONE);
            app.handle_key(KeyCode::Char('h'), KeyModifiers::NONE);
            assert_eq!(app.view, View::Community);

            // Scrolling only applies on the climbs tab
            app.handle_key(KeyCode::Char('k'), KeyModifiers::NONE);
            assert_eq!(app.dashboard().unwrap().climbs.selected, Some(1));

            app.handle_key(KeyCode::Char('q'), KeyModifiers::NONE);
            assert!(app.should_quit);
        }

        #[test]
        fn refresh_picks_up_new_climbs() {
            let db = seeded_db(&[]);
            let mut app = App::new(db, MonthZone::Utc);
            assert_eq!(app.dashboard().unwrap().analytics.summary.total, 0);

            let form = ClimbForm {
                route_name: "new".to_string(),
                grade: "V0".to_string(),
                gym_id: Some(1),
                attempts: 1,
                ..Default::default()
            };
            app.db.add_climb(&form.validate(Utc::now()).unwrap()).unwrap();
            app.handle_key(KeyCode::Char('r'), KeyModifiers::CONTROL);

            assert_eq!(app.dashboard().unwrap().analytics.summary.total, 1);
        }
    }
}
