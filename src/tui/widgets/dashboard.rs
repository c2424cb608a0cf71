use chrono::DateTime;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use super::{completion_bar, completion_color, truncate};
use crate::tui::App;

pub fn draw(f: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(8), // Stats
            Constraint::Min(0),    // Course progress
        ])
        .split(area);

    draw_stats(f, app, chunks[0]);
    draw_course_progress(f, app, chunks[1]);
}

fn draw_stats(f: &mut Frame, app: &App, area: Rect) {
    let stats = &app.stats;

    let text = vec![
        Line::from(vec![
            Span::styled("Courses: ", Style::default().fg(Color::Gray)),
            Span::styled(
                format!("{}", stats.total_courses),
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(vec![
            Span::styled("Modules: ", Style::default().fg(Color::Gray)),
            Span::styled(
                format!("{}", stats.total_modules),
                Style::default().fg(Color::White),
            ),
        ]),
        Line::from(vec![
            Span::styled("Topics: ", Style::default().fg(Color::Gray)),
            Span::styled(
                format!("{}", stats.total_topics),
                Style::default().fg(Color::White),
            ),
        ]),
        Line::from(vec![
            Span::styled("Completed: ", Style::default().fg(Color::Gray)),
            Span::styled(
                format!("{}", stats.completed_topics),
                Style::default().fg(Color::Green),
            ),
        ]),
        Line::from(vec![
            Span::styled("Avg Completion: ", Style::default().fg(Color::Gray)),
            Span::styled(
                completion_bar(stats.avg_completion),
                Style::default().fg(completion_color(stats.avg_completion)),
            ),
            Span::styled(
                format!(" {:.1}%", stats.avg_completion),
                Style::default().fg(Color::Cyan),
            ),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Stats ")
        .title_style(Style::default().fg(Color::Cyan));

    let paragraph = Paragraph::new(text).block(block);
    f.render_widget(paragraph, area);
}

fn draw_course_progress(f: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Course Progress ")
        .title_style(Style::default().fg(Color::Magenta));

    if app.courses.items.is_empty() {
        let paragraph = Paragraph::new("No courses yet. Run `syllabus ingest <file.pdf>` to add one.")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        f.render_widget(paragraph, area);
        return;
    }

    let items: Vec<ListItem> = app
        .courses
        .items
        .iter()
        .map(|s| {
            ListItem::new(Line::from(vec![
                Span::styled(
                    format!("{:<10}", format_date(&s.course.created_at)),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::styled(
                    format!("{:<12}", truncate(&s.course.code, 10)),
                    Style::default().fg(Color::Cyan),
                ),
                Span::styled(
                    format!("{:<30}", truncate(&s.course.name, 28)),
                    Style::default().fg(Color::White),
                ),
                Span::styled(
                    completion_bar(s.avg_completion),
                    Style::default().fg(completion_color(s.avg_completion)),
                ),
                Span::styled(
                    format!(" {:>3.0}%", s.avg_completion),
                    Style::default().fg(Color::Yellow),
                ),
            ]))
        })
        .collect();

    let list = List::new(items).block(block);
    f.render_widget(list, area);
}

fn format_date(date_str: &str) -> String {
    if let Ok(dt) = DateTime::parse_from_rfc3339(date_str) {
        dt.format("%b %d").to_string()
    } else {
        date_str.chars().take(10).collect()
    }
}
