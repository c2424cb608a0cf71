use std::path::Path;

use crate::config::Config;
use crate::db::Database;
use crate::error::Result;
use crate::pdf::{PdfDocument, SourceDocument};
use crate::syllabus::{self, Markers, Strategy};

/// What an ingestion produced.
#[derive(Debug, Clone, serde::Serialize)]
pub struct IngestReport {
    pub course_id: i64,
    pub code: String,
    pub name: String,
    pub modules: usize,
    pub topics: usize,
}

/// Parses a syllabus and stores it, returning the new course.
///
/// Nothing is written unless the whole document parses and every insert
/// succeeds.
pub fn ingest(
    db: &mut Database,
    doc: &dyn SourceDocument,
    strategy: Strategy,
    markers: &Markers,
) -> Result<IngestReport> {
    let parsed = syllabus::parse(doc, strategy, markers)?;
    let course_id = db.insert_syllabus(&parsed)?;
    let modules = parsed.modules.len();
    let topics = parsed.topic_count();

    let report = IngestReport {
        course_id,
        code: parsed.header.code,
        name: parsed.header.name,
        modules,
        topics,
    };
    tracing::info!(
        course_id,
        modules = report.modules,
        topics = report.topics,
        "stored syllabus"
    );
    Ok(report)
}

/// Opens a PDF and ingests it; the document is released on every path.
pub fn ingest_file(
    db: &mut Database,
    path: &Path,
    strategy: Strategy,
    config: &Config,
) -> Result<IngestReport> {
    let _span = tracing::info_span!("ingest", path = %path.display()).entered();

    let doc = PdfDocument::open(path)?.with_cell_gap(config.cell_gap);
    tracing::debug!(pages = doc.page_count(), strategy = strategy.as_str(), "opened document");
    match ingest(db, &doc, strategy, &config.markers()) {
        Ok(report) => Ok(report),
        Err(e) => {
            tracing::warn!(error = %e, "ingestion failed");
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::pdf::fixtures::build_pdf;
    use crate::syllabus::fixtures::{FakeDocument, SAMPLE_TEXT};

    fn setup_db() -> Database {
        let db = Database::open(":memory:").expect("Failed to create in-memory database");
        db.init().expect("Failed to initialize database");
        db
    }

    #[test]
    fn sample_text_end_to_end() {
        let mut db = setup_db();
        let doc = FakeDocument::with_text(SAMPLE_TEXT);

        let report = ingest(&mut db, &doc, Strategy::Text, &Markers::default()).unwrap();
        assert_eq!(report.modules, 2);
        assert_eq!(report.topics, 5);

        let outline = db.get_course_outline(report.course_id).unwrap().unwrap();
        let modules: Vec<(i32, &str, i32)> = outline
            .modules
            .iter()
            .map(|m| (m.module.number, m.module.name.as_str(), m.module.hours))
            .collect();
        assert_eq!(
            modules,
            vec![(1, "Module:1 Basics", 10), (2, "Module:2 Advanced", 5)]
        );

        let topics: Vec<Vec<&str>> = outline
            .modules
            .iter()
            .map(|m| m.topics.iter().map(|t| t.name.as_str()).collect())
            .collect();
        assert_eq!(topics, vec![vec!["foo", "bar", "baz"], vec!["qux", "quux"]]);
    }

    #[test]
    fn module_and_topic_counts_match_document() {
        let mut text = String::from("CS999 Counting 3 0 0 3\n");
        let topic_counts = [3, 1, 4, 2];
        for (i, n) in topic_counts.iter().enumerate() {
            let topics: Vec<String> = (0..*n).map(|t| format!("topic{}x{}", i, t)).collect();
            text.push_str(&format!("Module:{} Part {} 4 hours\n{}\n", i + 1, i + 1, topics.join(", ")));
        }
        text.push_str("Total Lecture hours: 16");

        let mut db = setup_db();
        let report = ingest(
            &mut db,
            &FakeDocument::with_text(&text),
            Strategy::Text,
            &Markers::default(),
        )
        .unwrap();

        let stats = db.get_stats().unwrap();
        assert_eq!(stats.total_modules, 4);
        assert_eq!(stats.total_topics, 10);
        assert_eq!(report.topics, 10);

        let outline = db.get_course_outline(report.course_id).unwrap().unwrap();
        for (module, expected) in outline.modules.iter().zip(topic_counts) {
            assert_eq!(module.module.course_id, report.course_id);
            assert_eq!(module.topics.len(), expected);
        }
    }

    #[test]
    fn same_document_twice_gives_two_courses() {
        let mut db = setup_db();
        let doc = FakeDocument::with_text(SAMPLE_TEXT);

        let first = ingest(&mut db, &doc, Strategy::Text, &Markers::default()).unwrap();
        let second = ingest(&mut db, &doc, Strategy::Text, &Markers::default()).unwrap();

        assert_ne!(first.course_id, second.course_id);
        assert_eq!(db.list_course_summaries().unwrap().len(), 2);
    }

    #[test]
    fn table_document_without_tables_stores_nothing() {
        let mut db = setup_db();
        let doc = FakeDocument::with_text(SAMPLE_TEXT);

        let result = ingest(&mut db, &doc, Strategy::Table, &Markers::default());
        assert!(matches!(result, Err(Error::NoStructuredContent(_))));
        assert!(db.list_course_summaries().unwrap().is_empty());
    }

    #[test]
    fn unparseable_document_stores_nothing() {
        let mut db = setup_db();
        let doc = FakeDocument::with_text("Course outline pending");

        let result = ingest(&mut db, &doc, Strategy::Text, &Markers::default());
        assert!(result.is_err());
        assert!(db.list_course_summaries().unwrap().is_empty());
    }

    #[test]
    fn missing_file_is_unreadable() {
        let mut db = setup_db();
        let result = ingest_file(
            &mut db,
            Path::new("/nonexistent/syllabus.pdf"),
            Strategy::Text,
            &Config::default(),
        );
        assert!(matches!(result, Err(Error::DocumentUnreadable { .. })));
        assert!(db.list_course_summaries().unwrap().is_empty());
    }

    fn table_syllabus_page() -> Vec<(i64, i64, &'static str)> {
        vec![
            (50, 760, "CS101"),
            (200, 760, "Intro to Systems"),
            (50, 746, "Module:1"),
            (200, 746, "Basics"),
            (350, 746, "6 hours"),
            (50, 732, "a, b, c"),
            (50, 718, "Module:2"),
            (200, 718, "More"),
            (350, 718, "4 hours"),
            (50, 704, "d - e"),
            (200, 690, "Total Lecture hours:"),
            (350, 690, "10 hours"),
        ]
    }

    fn write_pdf(pages: &[Vec<(i64, i64, &str)>]) -> tempfile::NamedTempFile {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), build_pdf(pages)).unwrap();
        file
    }

    #[test]
    fn table_pdf_end_to_end() {
        let file = write_pdf(&[table_syllabus_page()]);

        let mut db = setup_db();
        let report =
            ingest_file(&mut db, file.path(), Strategy::Table, &Config::default()).unwrap();
        assert_eq!(report.code, "CS101");
        assert_eq!(report.name, "Intro to Systems");
        assert_eq!(report.modules, 2);
        assert_eq!(report.topics, 5);

        let outline = db.get_course_outline(report.course_id).unwrap().unwrap();
        assert_eq!(outline.course.code, "CS101");
        let modules: Vec<(i32, &str, i32)> = outline
            .modules
            .iter()
            .map(|m| (m.module.number, m.module.name.as_str(), m.module.hours))
            .collect();
        assert_eq!(
            modules,
            vec![(1, "Module:1 Basics", 6), (2, "Module:2 More", 4)]
        );
        for module in &outline.modules {
            assert_eq!(module.module.course_id, report.course_id);
            assert!(module.topics.iter().all(|t| t.module_id == module.module.id));
        }

        let topics: Vec<Vec<&str>> = outline
            .modules
            .iter()
            .map(|m| m.topics.iter().map(|t| t.name.as_str()).collect())
            .collect();
        assert_eq!(topics, vec![vec!["a", "b", "c"], vec!["d", "e"]]);

        let stats = db.get_stats().unwrap();
        assert_eq!(stats.total_modules, 2);
        assert_eq!(stats.total_topics, 5);
    }

    #[test]
    fn table_pdf_with_tableless_page_stores_nothing() {
        let file = write_pdf(&[
            table_syllabus_page(),
            vec![(72, 700, "Reference books are listed separately")],
        ]);

        let mut db = setup_db();
        let result = ingest_file(&mut db, file.path(), Strategy::Table, &Config::default());
        assert!(matches!(result, Err(Error::NoStructuredContent(_))));
        assert!(db.list_course_summaries().unwrap().is_empty());
    }

    #[test]
    fn corrupt_file_is_unreadable() {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), b"%PDF-1.4 truncated").unwrap();

        let mut db = setup_db();
        let result = ingest_file(&mut db, file.path(), Strategy::Table, &Config::default());
        assert!(matches!(result, Err(Error::DocumentUnreadable { .. })));
    }
}
