use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

use super::{completion_bar, completion_color, importance_color, truncate};
use crate::models::{CourseOutline, ModuleWithTopics, Topic};
use crate::tui::App;

pub fn draw(f: &mut Frame, app: &App, area: Rect) {
    let Some(outline) = &app.outline else {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(" Course Detail ");
        let paragraph = Paragraph::new("No course selected").block(block);
        f.render_widget(paragraph, area);
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5), // Course summary
            Constraint::Min(0),    // Modules and topics
        ])
        .split(area);

    draw_header(f, outline, chunks[0]);
    draw_outline(f, app, outline, chunks[1]);
}

fn draw_header(f: &mut Frame, outline: &CourseOutline, area: Rect) {
    let completion = outline.completion();

    let text = vec![
        Line::from(vec![
            Span::styled("Modules: ", Style::default().fg(Color::Gray)),
            Span::styled(
                format!("{}", outline.modules.len()),
                Style::default().fg(Color::White),
            ),
            Span::raw("  "),
            Span::styled("Topics: ", Style::default().fg(Color::Gray)),
            Span::styled(
                format!("{}", outline.topic_count()),
                Style::default().fg(Color::White),
            ),
        ]),
        Line::from(vec![
            Span::styled("Completion: ", Style::default().fg(Color::Gray)),
            Span::styled(
                completion_bar(completion),
                Style::default().fg(completion_color(completion)),
            ),
            Span::styled(
                format!(" {:.0}%", completion),
                Style::default().fg(Color::Yellow),
            ),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" {} {} ", outline.course.code, outline.course.name))
        .title_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );

    let paragraph = Paragraph::new(text).block(block);
    f.render_widget(paragraph, area);
}

fn module_item(m: &ModuleWithTopics) -> ListItem<'static> {
    let completion = m.completion();
    ListItem::new(Line::from(vec![
        Span::styled(
            format!("{:<40}", truncate(&m.module.name, 38)),
            Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("{:>3}h  ", m.module.hours),
            Style::default().fg(Color::DarkGray),
        ),
        Span::styled(
            completion_bar(completion),
            Style::default().fg(completion_color(completion)),
        ),
        Span::styled(
            format!(" {:>3.0}%", completion),
            Style::default().fg(Color::Yellow),
        ),
    ]))
}

fn topic_item(t: &Topic) -> ListItem<'static> {
    let percent = t.completion_status as f64;
    ListItem::new(Line::from(vec![
        Span::raw("  "),
        Span::styled(
            format!("{:<38}", truncate(&t.name, 36)),
            Style::default().fg(if t.is_complete() {
                Color::Green
            } else {
                Color::White
            }),
        ),
        Span::styled(
            format!("{:<10}", t.importance_label()),
            Style::default().fg(importance_color(t.importance)),
        ),
        Span::styled(
            completion_bar(percent),
            Style::default().fg(completion_color(percent)),
        ),
        Span::styled(
            format!(" {:>3}%", t.completion_status),
            Style::default().fg(Color::Yellow),
        ),
    ]))
}

fn draw_outline(f: &mut Frame, app: &App, outline: &CourseOutline, area: Rect) {
    let selected_id = app.selected_topic().map(|t| t.id);

    let mut items = Vec::new();
    let mut selected_row = None;
    for m in &outline.modules {
        items.push(module_item(m));
        for t in &m.topics {
            if Some(t.id) == selected_id {
                selected_row = Some(items.len());
            }
            items.push(topic_item(t));
        }
        if m.topics.is_empty() {
            items.push(ListItem::new(Span::styled(
                "  (no topics)",
                Style::default().fg(Color::DarkGray),
            )));
        }
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Modules ")
        .title_style(Style::default().fg(Color::Cyan));

    if items.is_empty() {
        let paragraph = Paragraph::new("This course has no modules.")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        f.render_widget(paragraph, area);
        return;
    }

    let list = List::new(items)
        .block(block)
        .highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    let mut state = ListState::default();
    state.select(selected_row);

    f.render_stateful_widget(list, area, &mut state);
}
