mod ui;
mod widgets;

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use crate::db::{Database, Stats, TopicUpdate};
use crate::models::{Completion, CourseOutline, CourseSummary, Importance, Topic};

/// Completion change for a single `+`/`-` press.
const COMPLETION_STEP: i32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Dashboard,
    Courses,
    CourseDetail,
}

impl View {
    fn next(&self) -> Self {
        match self {
            View::Dashboard => View::Courses,
            View::Courses => View::Dashboard,
            View::CourseDetail => View::Courses,
        }
    }

    fn prev(&self) -> Self {
        match self {
            View::Dashboard => View::Courses,
            View::Courses => View::Dashboard,
            View::CourseDetail => View::Courses,
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

    /// Replaces the items, keeping the cursor in range.
    fn replace(&mut self, items: Vec<T>) {
        self.selected = match (self.selected, items.len()) {
            (_, 0) => None,
            (Some(i), len) => Some(i.min(len - 1)),
            (None, _) => Some(0),
        };
        self.items = items;
    }

    fn next(&mut self) {
        if self.items.is_empty() {
            return;
        }
        let i = match self.selected {
            Some(i) => {
                if i >= self.items.len() - 1 {
                    0
                } else {
                    i + 1
                }
            }
            None => 0,
        };
        self.selected = Some(i);
    }

    fn previous(&mut self) {
        if self.items.is_empty() {
            return;
        }
        let i = match self.selected {
            Some(i) => {
                if i == 0 {
                    self.items.len() - 1
                } else {
                    i - 1
                }
            }
            None => 0,
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

    fn selected_item(&self) -> Option<&T> {
        self.selected.and_then(|i| self.items.get(i))
    }
}

pub struct App {
    db: Database,
    pub view: View,
    pub courses: StatefulList<CourseSummary>,
    pub stats: Stats,
    pub outline: Option<CourseOutline>,
    /// Topic ids of the open course in display order; the cursor walks these.
    pub topics: StatefulList<i64>,
    pub status: Option<String>,
    pub should_quit: bool,
}

impl App {
    pub fn new(db: Database) -> Result<Self, Box<dyn std::error::Error>> {
        let stats = db.get_stats()?;
        let courses = db.list_course_summaries()?;

        Ok(Self {
            db,
            view: View::Dashboard,
            courses: StatefulList::with_items(courses),
            stats,
            outline: None,
            topics: StatefulList::with_items(Vec::new()),
            status: None,
            should_quit: false,
        })
    }

    pub fn refresh_data(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        self.stats = self.db.get_stats()?;
        self.courses.replace(self.db.list_course_summaries()?);
        if let Some(course_id) = self.outline.as_ref().map(|o| o.course.id) {
            self.load_outline(course_id)?;
        }
        Ok(())
    }

    fn load_outline(&mut self, course_id: i64) -> Result<(), Box<dyn std::error::Error>> {
        match self.db.get_course_outline(course_id)? {
            Some(outline) => {
                let ids = outline
                    .modules
                    .iter()
                    .flat_map(|m| m.topics.iter().map(|t| t.id))
                    .collect();
                self.topics.replace(ids);
                self.outline = Some(outline);
            }
            None => {
                self.outline = None;
                self.topics = StatefulList::with_items(Vec::new());
                self.view = View::Courses;
            }
        }
        Ok(())
    }

    fn select_course(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(course_id) = self.courses.selected_item().map(|s| s.course.id) {
            self.topics = StatefulList::with_items(Vec::new());
            self.load_outline(course_id)?;
            if self.outline.is_some() {
                self.view = View::CourseDetail;
            }
        }
        Ok(())
    }

    fn close_course(&mut self) {
        self.view = View::Courses;
        self.outline = None;
        self.topics = StatefulList::with_items(Vec::new());
    }

    pub fn selected_topic(&self) -> Option<&Topic> {
        let id = *self.topics.selected_item()?;
        self.outline
            .as_ref()?
            .modules
            .iter()
            .flat_map(|m| m.topics.iter())
            .find(|t| t.id == id)
    }

    fn update_selected_topic(
        &mut self,
        change: impl Fn(&Topic) -> TopicUpdate<'static>,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let Some(topic) = self.selected_topic() else {
            return Ok(());
        };
        let id = topic.id;
        let update = change(topic);

        self.db.update_topic(id, &update)?;
        self.refresh_data()?;
        self.status = self.selected_topic().map(|t| {
            format!(
                "{}: {}% done, {} importance",
                t.name,
                t.completion_status,
                t.importance_label()
            )
        });
        Ok(())
    }

    fn step_completion(&mut self, delta: i32) -> Result<(), Box<dyn std::error::Error>> {
        self.update_selected_topic(|t| TopicUpdate {
            completion: Some(Completion::step(t.completion_status, delta)),
            ..TopicUpdate::default()
        })
    }

    fn mark_done(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        self.update_selected_topic(|_| TopicUpdate {
            completion: Some(Completion::done()),
            ..TopicUpdate::default()
        })
    }

    fn step_importance(&mut self, delta: i32) -> Result<(), Box<dyn std::error::Error>> {
        self.update_selected_topic(|t| TopicUpdate {
            importance: Some(Importance::step(t.importance, delta)),
            ..TopicUpdate::default()
        })
    }

    fn handle_key(
        &mut self,
        key: KeyCode,
        modifiers: KeyModifiers,
    ) -> Result<(), Box<dyn std::error::Error>> {
        match key {
            KeyCode::Char('q') => self.should_quit = true,

            KeyCode::Char('r') if modifiers.contains(KeyModifiers::CONTROL) => {
                self.refresh_data()?;
                self.status = Some("Refreshed".to_string());
            }

            KeyCode::Esc if self.view == View::CourseDetail => self.close_course(),

            KeyCode::Char('h') | KeyCode::Left => match self.view {
                View::CourseDetail => self.close_course(),
                _ => self.view = self.view.prev(),
            },
            KeyCode::Char('l') | KeyCode::Right => match self.view {
                View::Courses => self.select_course()?,
                View::CourseDetail => {}
                _ => self.view = self.view.next(),
            },

            KeyCode::Tab => {
                if modifiers.contains(KeyModifiers::SHIFT) {
                    self.view = self.view.prev();
                } else {
                    self.view = self.view.next();
                }
            }
            KeyCode::BackTab => {
                self.view = self.view.prev();
            }

            KeyCode::Char('j') | KeyCode::Down => match self.view {
                View::Courses => self.courses.next(),
                View::CourseDetail => self.topics.next(),
                _ => {}
            },
            KeyCode::Char('k') | KeyCode::Up => match self.view {
                View::Courses => self.courses.previous(),
                View::CourseDetail => self.topics.previous(),
                _ => {}
            },

            KeyCode::Char('g') => match self.view {
                View::Courses => self.courses.first(),
                View::CourseDetail => self.topics.first(),
                _ => {}
            },
            KeyCode::Char('G') => match self.view {
                View::Courses => self.courses.last(),
                View::CourseDetail => self.topics.last(),
                _ => {}
            },

            KeyCode::Enter if self.view == View::Courses => self.select_course()?,

            KeyCode::Char('+') | KeyCode::Char('=') if self.view == View::CourseDetail => {
                self.step_completion(COMPLETION_STEP)?;
            }
            KeyCode::Char('-') if self.view == View::CourseDetail => {
                self.step_completion(-COMPLETION_STEP)?;
            }
            KeyCode::Char('d') | KeyCode::Char(' ') if self.view == View::CourseDetail => {
                self.mark_done()?;
            }
            KeyCode::Char('>') if self.view == View::CourseDetail => {
                self.step_importance(1)?;
            }
            KeyCode::Char('<') if self.view == View::CourseDetail => {
                self.step_importance(-1)?;
            }

            _ => {}
        }
        Ok(())
    }
}

pub fn run(db: Database) -> Result<(), Box<dyn std::error::Error>> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = App::new(db).and_then(|mut app| run_app(&mut terminal, &mut app));

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
                app.handle_key(key.code, key.modifiers)?;
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}
