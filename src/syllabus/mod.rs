pub mod header;
pub mod segment;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::pdf::SourceDocument;

pub use header::CourseHeader;
pub use segment::{Markers, ModuleDraft};

/// How module structure is read out of a document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Regex over the concatenated page text
    #[default]
    Text,
    /// Row merging over the first table of each page
    Table,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Text => "text",
            Strategy::Table => "table",
        }
    }
}

/// A syllabus read from a document, ready to be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedSyllabus {
    pub header: CourseHeader,
    pub modules: Vec<ModuleDraft>,
}

impl ParsedSyllabus {
    pub fn topic_count(&self) -> usize {
        self.modules.iter().map(|m| m.topics.len()).sum()
    }
}

/// Extracts the course header and modules with the chosen strategy.
///
/// Fails with [`Error::NoStructuredContent`] when the document yields no
/// module at all, so nothing is stored for it.
pub fn parse(
    doc: &dyn SourceDocument,
    strategy: Strategy,
    markers: &Markers,
) -> Result<ParsedSyllabus> {
    let (header, modules) = match strategy {
        Strategy::Text => {
            let text = doc.text()?;
            if text.trim().is_empty() {
                return Err(Error::NoStructuredContent(
                    "document has no extractable text".to_string(),
                ));
            }
            (header::from_text(&text), segment::from_text(&text))
        }
        Strategy::Table => {
            let rows = doc.table_rows()?;
            if rows.is_empty() {
                return Err(Error::NoStructuredContent(
                    "no tables detected in document".to_string(),
                ));
            }
            (header::from_table(&rows), segment::from_table(&rows, markers))
        }
    };

    if modules.is_empty() {
        return Err(Error::NoStructuredContent(format!(
            "no modules found using the {} strategy",
            strategy.as_str()
        )));
    }

    tracing::info!(
        code = %header.code,
        name = %header.name,
        modules = modules.len(),
        strategy = strategy.as_str(),
        "parsed syllabus"
    );

    Ok(ParsedSyllabus { header, modules })
}

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::error::Result;
    use crate::pdf::{SourceDocument, TableRow};

    /// In-memory document for exercising the parsers.
    #[derive(Default)]
    pub struct FakeDocument {
        pub text: String,
        pub rows: Vec<TableRow>,
    }

    impl FakeDocument {
        pub fn with_text(text: &str) -> Self {
            Self {
                text: text.to_string(),
                rows: Vec::new(),
            }
        }

        pub fn with_rows(rows: &[&[&str]]) -> Self {
            Self {
                text: String::new(),
                rows: rows
                    .iter()
                    .map(|cells| {
                        cells
                            .iter()
                            .map(|c| if c.is_empty() { None } else { Some(c.to_string()) })
                            .collect()
                    })
                    .collect(),
            }
        }
    }

    impl SourceDocument for FakeDocument {
        fn text(&self) -> Result<String> {
            Ok(self.text.clone())
        }

        fn table_rows(&self) -> Result<Vec<TableRow>> {
            Ok(self.rows.clone())
        }
    }

    pub const SAMPLE_TEXT: &str = "CSE1001 Problem Solving 2 0 2 3\nModule:1 Basics 10 hours\nfoo - bar - baz\nModule:2 Advanced 5 hours\nqux, quux\nTotal Lecture hours: 15";
}

#[cfg(test)]
mod tests {
    use super::fixtures::{FakeDocument, SAMPLE_TEXT};
    use super::*;

    #[test]
    fn text_strategy_reads_header_and_modules() {
        let doc = FakeDocument::with_text(SAMPLE_TEXT);
        let parsed = parse(&doc, Strategy::Text, &Markers::default()).unwrap();

        assert_eq!(parsed.header.code, "CSE1001");
        assert_eq!(parsed.header.name, "Problem Solving");
        assert_eq!(parsed.modules.len(), 2);
        assert_eq!(parsed.topic_count(), 5);
    }

    #[test]
    fn table_strategy_reads_header_and_modules() {
        let doc = FakeDocument::with_rows(&[
            &["CS101", "Intro to Systems", "", "3", "3", "0", "0"],
            &["Module:1", "Basics", "6 hours"],
            &["a, b"],
            &["Module:2", "More", "4 hours"],
            &["c - d - e"],
            &["", "Total Lecture hours:", "10 hours"],
        ]);
        let parsed = parse(&doc, Strategy::Table, &Markers::default()).unwrap();

        assert_eq!(parsed.header.code, "CS101");
        assert_eq!(parsed.header.name, "Intro to Systems");
        assert_eq!(parsed.modules.len(), 2);
        assert_eq!(parsed.topic_count(), 5);
    }

    #[test]
    fn table_strategy_without_tables_fails() {
        let doc = FakeDocument::with_text(SAMPLE_TEXT);
        let result = parse(&doc, Strategy::Table, &Markers::default());
        assert!(matches!(result, Err(Error::NoStructuredContent(_))));
    }

    #[test]
    fn empty_text_fails() {
        let doc = FakeDocument::with_text("  \n ");
        let result = parse(&doc, Strategy::Text, &Markers::default());
        assert!(matches!(result, Err(Error::NoStructuredContent(_))));
    }

    #[test]
    fn text_without_modules_fails() {
        let doc = FakeDocument::with_text("CS101 Intro 3 0 0 3\nno modules here");
        let result = parse(&doc, Strategy::Text, &Markers::default());
        assert!(matches!(result, Err(Error::NoStructuredContent(_))));
    }

    #[test]
    fn strategy_serializes_lowercase() {
        let json = serde_json::to_string(&Strategy::Table).unwrap();
        assert_eq!(json, "\"table\"");
        assert_eq!(Strategy::default(), Strategy::Text);
    }
}
