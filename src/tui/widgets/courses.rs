use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

use super::{completion_bar, completion_color, truncate};
use crate::tui::App;

pub fn draw(f: &mut Frame, app: &App, area: Rect) {
    let items: Vec<ListItem> = app
        .courses
        .items
        .iter()
        .map(|s| {
            ListItem::new(Line::from(vec![
                Span::styled(
                    format!("{:<12}", truncate(&s.course.code, 10)),
                    Style::default().fg(Color::Cyan),
                ),
                Span::styled(
                    format!("{:<32}", truncate(&s.course.name, 30)),
                    Style::default().fg(Color::White),
                ),
                Span::styled(
                    format!("{:>7} ", s.module_count),
                    Style::default().fg(Color::Gray),
                ),
                Span::styled(
                    format!("{:>6}  ", s.topic_count),
                    Style::default().fg(Color::Gray),
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

    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" Courses ({}) ", app.courses.items.len()))
        .title_style(Style::default().fg(Color::Cyan));

    let header_style = Style::default()
        .fg(Color::DarkGray)
        .add_modifier(Modifier::BOLD);
    // Indented past the highlight symbol
    let header = Line::from(vec![
        Span::raw("  "),
        Span::styled(format!("{:<12}", "Code"), header_style),
        Span::styled(format!("{:<32}", "Name"), header_style),
        Span::styled(format!("{:>7} ", "Modules"), header_style),
        Span::styled(format!("{:>6}  ", "Topics"), header_style),
        Span::styled("Completion", header_style),
    ]);

    let list = List::new(items)
        .highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    let mut state = ListState::default();
    state.select(app.courses.selected);

    let inner = block.inner(area);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(0)])
        .split(inner);

    f.render_widget(block, area);
    f.render_widget(Paragraph::new(header), chunks[0]);
    f.render_stateful_widget(list, chunks[1], &mut state);
}
