pub mod course_detail;
pub mod courses;
pub mod dashboard;

use ratatui::style::Color;

const BAR_WIDTH: usize = 10;

/// Ten-cell bar for a 0-100 percentage.
pub fn completion_bar(percent: f64) -> String {
    let filled = ((percent.clamp(0.0, 100.0) / 100.0) * BAR_WIDTH as f64).round() as usize;
    format!(
        "{}{}",
        "█".repeat(filled),
        "░".repeat(BAR_WIDTH - filled)
    )
}

pub fn completion_color(percent: f64) -> Color {
    if percent >= 100.0 {
        Color::Green
    } else if percent >= 50.0 {
        Color::Yellow
    } else if percent > 0.0 {
        Color::Cyan
    } else {
        Color::DarkGray
    }
}

pub fn importance_color(importance: i32) -> Color {
    match importance {
        5 => Color::Red,
        4 => Color::LightRed,
        3 => Color::Yellow,
        1 | 2 => Color::White,
        _ => Color::DarkGray,
    }
}

pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
