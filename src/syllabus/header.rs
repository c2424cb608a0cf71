use std::sync::OnceLock;

use regex::Regex;

use crate::pdf::TableRow;

pub const UNKNOWN_CODE: &str = "Unknown Code";
pub const UNKNOWN_COURSE: &str = "Unknown Course";
pub const UNKNOWN_NAME: &str = "Unknown Name";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseHeader {
    pub code: String,
    pub name: String,
}

// Course code, course name, then the L T P C credit distribution
fn course_line_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"([A-Z0-9]+)\s+([A-Za-z\s]+)\s+\d\s\d\s\d\s\d").expect("valid course regex")
    })
}

/// Finds the course code and name in the full document text.
pub fn from_text(text: &str) -> CourseHeader {
    match course_line_regex().captures(text) {
        Some(caps) => CourseHeader {
            code: caps[1].trim().to_string(),
            name: caps[2].trim().to_string(),
        },
        None => {
            tracing::warn!("no course header line found, using placeholders");
            CourseHeader {
                code: UNKNOWN_CODE.to_string(),
                name: UNKNOWN_COURSE.to_string(),
            }
        }
    }
}

/// Reads the course code and name from the first table row.
pub fn from_table(rows: &[TableRow]) -> CourseHeader {
    let mut cells = rows
        .first()
        .into_iter()
        .flatten()
        .filter_map(|cell| cell.as_deref())
        .map(str::trim)
        .filter(|cell| !cell.is_empty());

    let code = cells.next().map(str::to_string);
    let name = cells.next().map(str::to_string);

    if code.is_none() || name.is_none() {
        tracing::warn!("course header row is incomplete, using placeholders");
    }

    CourseHeader {
        code: code.unwrap_or_else(|| UNKNOWN_CODE.to_string()),
        name: name.unwrap_or_else(|| UNKNOWN_NAME.to_string()),
    }
}
