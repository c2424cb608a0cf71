//! Splits extracted syllabus content into modules and their topics.
//!
//! Two strategies share the same output: the text strategy scans the
//! concatenated page text for `Module:<n> <name> <h> hours` headers, the
//! table strategy walks the flattened table rows and merges wrapped
//! description rows back onto their module.

use std::sync::OnceLock;

use regex::Regex;

use crate::pdf::TableRow;

/// One module as read from the document, before it has an id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleDraft {
    pub number: i32,
    pub name: String,
    pub hours: i32,
    pub topics: Vec<String>,
}

/// Markers that delimit the module content of a syllabus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Markers {
    pub module_prefix: String,
    pub summary_marker: String,
}

impl Default for Markers {
    fn default() -> Self {
        Self {
            module_prefix: "Module:".to_string(),
            summary_marker: "Total Lecture hours".to_string(),
        }
    }
}

fn module_header_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)Module:(\d+)\s*(.*?)\s*(\d+)\s*hours").expect("valid module regex")
    })
}

fn section_boundary_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"Module:\d+|Total Lecture hours:").expect("valid boundary regex")
    })
}

fn digits_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\d+").expect("valid digits regex"))
}

fn dash_run_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+[-–]+\s+").expect("valid dash regex"))
}

fn whitespace_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("valid whitespace regex"))
}

fn parse_or_zero(raw: &str, field: &str) -> i32 {
    raw.parse().unwrap_or_else(|_| {
        tracing::warn!(value = raw, field, "unparseable module field, defaulting to 0");
        0
    })
}

fn module_title(number: i32, name: &str) -> String {
    format!("Module:{} {}", number, name.trim()).trim_end().to_string()
}

/// Splits a description cell into topic names.
///
/// Documents separate topics with either commas or dashes. Whichever
/// character is more frequent wins, ties go to commas.
pub fn split_topics(description: &str) -> Vec<String> {
    let flattened = description.replace(['\r', '\n'], " ");

    let commas = flattened.matches(',').count();
    let dashes = flattened.chars().filter(|c| matches!(c, '-' | '–')).count();

    let fragments: Vec<&str> = if dashes > commas {
        let trimmed = flattened
            .trim()
            .trim_start_matches(['-', '–'])
            .trim_end_matches(['-', '–']);
        dash_run_regex().split(trimmed).collect()
    } else {
        flattened.split(',').collect()
    };

    fragments
        .into_iter()
        .map(|f| whitespace_regex().replace_all(f.trim(), " ").into_owned())
        .filter(|f| !f.is_empty())
        .collect()
}

/// Text strategy: scans for module headers in the full document text.
///
/// A module's topics run from the end of its header to the next
/// `Module:<n>` or the `Total Lecture hours:` line. A header with neither
/// after it is dropped.
pub fn from_text(text: &str) -> Vec<ModuleDraft> {
    let mut modules = Vec::new();
    let mut pos = 0;

    while let Some(caps) = module_header_regex().captures_at(text, pos) {
        let Some(whole) = caps.get(0) else { break };
        let body_start = whole.end();

        let Some(boundary) = section_boundary_regex().find_at(text, body_start) else {
            tracing::debug!(
                offset = whole.start(),
                "module header without a closing boundary, stopping"
            );
            break;
        };

        let number = parse_or_zero(&caps[1], "number");
        let hours = parse_or_zero(&caps[3], "hours");
        let body = &text[body_start..boundary.start()];

        modules.push(ModuleDraft {
            number,
            name: module_title(number, &caps[2]),
            hours,
            topics: split_topics(body),
        });

        pos = boundary.start();
    }

    modules
}

fn non_empty_cells(row: &TableRow) -> Vec<String> {
    row.iter()
        .filter_map(|cell| cell.as_deref())
        .map(str::trim)
        .filter(|cell| !cell.is_empty())
        .map(str::to_string)
        .collect()
}

fn is_module_row(cells: &[String], prefix: &str) -> bool {
    cells.first().is_some_and(|c| c.starts_with(prefix))
}

/// Locates the rows between the course header and the summary row.
///
/// The region starts at the first module row after the header row and
/// stops before the first row mentioning the summary marker.
pub fn content_region<'a>(rows: &'a [TableRow], markers: &Markers) -> Option<&'a [TableRow]> {
    let marker = markers.summary_marker.to_lowercase();

    let start = rows
        .iter()
        .enumerate()
        .skip(1)
        .find(|(_, row)| is_module_row(&non_empty_cells(row), &markers.module_prefix))
        .map(|(i, _)| i)?;

    let end = rows[start..]
        .iter()
        .position(|row| non_empty_cells(row).join(" ").to_lowercase().contains(&marker))
        .map(|offset| start + offset)
        .unwrap_or(rows.len());

    tracing::debug!(start, end, "table content region");
    Some(&rows[start..end])
}

/// Re-joins description text that wrapped across several table rows.
///
/// The result alternates module header rows with at most one description
/// row each.
pub fn merge_rows(rows: &[TableRow], prefix: &str) -> Vec<Vec<String>> {
    let mut merged: Vec<Vec<String>> = Vec::new();

    for row in rows {
        let cells = non_empty_cells(row);
        if cells.is_empty() {
            continue;
        }

        if is_module_row(&cells, prefix) {
            merged.push(cells);
            continue;
        }

        match merged.last_mut() {
            Some(last) if !is_module_row(last, prefix) => {
                last[0].push(' ');
                last[0].push_str(&cells.join(" "));
            }
            _ => merged.push(cells),
        }
    }

    merged
}

fn leading_number(cell: Option<&String>, field: &str, module: &str) -> i32 {
    let found = cell.and_then(|c| digits_regex().find(c));
    match found {
        Some(m) => parse_or_zero(m.as_str(), field),
        None => {
            tracing::warn!(module, field, "module field missing, defaulting to 0");
            0
        }
    }
}

/// Table strategy: walks merged rows pairing each module with its description.
pub fn from_table(rows: &[TableRow], markers: &Markers) -> Vec<ModuleDraft> {
    let Some(region) = content_region(rows, markers) else {
        tracing::debug!("no module rows in table");
        return Vec::new();
    };

    let merged = merge_rows(region, &markers.module_prefix);
    let mut modules = Vec::new();
    let mut i = 0;

    while i < merged.len() {
        let row = &merged[i];
        if !is_module_row(row, &markers.module_prefix) {
            tracing::debug!(row = i, "skipping description without a module");
            i += 1;
            continue;
        }

        let label = row[0].as_str();
        let number = leading_number(row.first(), "number", label);
        let name = row.get(1).cloned().unwrap_or_default();
        let hours = leading_number(row.get(2), "hours", label);

        let description = merged
            .get(i + 1)
            .filter(|next| !is_module_row(next, &markers.module_prefix));

        // Each description cell is its own topic list
        let topics = description
            .map(|next| next.iter().flat_map(|cell| split_topics(cell)).collect())
            .unwrap_or_default();

        modules.push(ModuleDraft {
            number,
            name: module_title(number, &name),
            hours,
            topics,
        });

        i += if description.is_some() { 2 } else { 1 };
    }

    modules
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> TableRow {
        cells
            .iter()
            .map(|c| if c.is_empty() { None } else { Some(c.to_string()) })
            .collect()
    }

    mod split_tests {
        use super::*;

        #[test]
        fn dashes_win_over_commas() {
            assert_eq!(
                split_topics("Stacks - Queues, Deques - Heaps"),
                vec!["Stacks", "Queues, Deques", "Heaps"]
            );
        }

        #[test]
        fn commas_win_over_dashes() {
            assert_eq!(
                split_topics("Client-server model, Sockets, Threads"),
                vec!["Client-server model", "Sockets", "Threads"]
            );
        }

        #[test]
        fn tie_goes_to_commas() {
            assert_eq!(split_topics("a - b, c"), vec!["a - b", "c"]);
        }

        #[test]
        fn en_dash_counts_as_hyphen() {
            assert_eq!(
                split_topics("Paging – Segmentation – TLB"),
                vec!["Paging", "Segmentation", "TLB"]
            );
        }

        #[test]
        fn intra_word_hyphens_survive() {
            assert_eq!(
                split_topics("Divide-and-conquer - Greedy - Dynamic programming"),
                vec!["Divide-and-conquer", "Greedy", "Dynamic programming"]
            );
        }

        #[test]
        fn newlines_become_spaces() {
            assert_eq!(
                split_topics("Process\nscheduling - Memory\nmanagement"),
                vec!["Process scheduling", "Memory management"]
            );
        }

        #[test]
        fn leading_dash_is_dropped() {
            assert_eq!(split_topics("- foo - bar -"), vec!["foo", "bar"]);
        }

        #[test]
        fn empty_fragments_are_dropped() {
            assert_eq!(split_topics("a,, ,b,"), vec!["a", "b"]);
            assert!(split_topics("   ").is_empty());
            assert!(split_topics("").is_empty());
        }

        #[test]
        fn no_fragment_is_blank() {
            for input in ["a -  - b", ",,,", "x , , y", "– – –", "a\n,\n b"] {
                for topic in split_topics(input) {
                    assert!(!topic.trim().is_empty(), "blank topic from {:?}", input);
                }
            }
        }
    }

    mod text_tests {
        use super::*;

        const SAMPLE: &str = "Module:1 Basics 10 hours\nfoo - bar - baz\nModule:2 Advanced 5 hours\nqux, quux\nTotal Lecture hours: 15";

        #[test]
        fn sample_document() {
            let modules = from_text(SAMPLE);
            assert_eq!(modules.len(), 2);

            assert_eq!(modules[0].number, 1);
            assert_eq!(modules[0].name, "Module:1 Basics");
            assert_eq!(modules[0].hours, 10);
            assert_eq!(modules[0].topics, vec!["foo", "bar", "baz"]);

            assert_eq!(modules[1].number, 2);
            assert_eq!(modules[1].name, "Module:2 Advanced");
            assert_eq!(modules[1].hours, 5);
            assert_eq!(modules[1].topics, vec!["qux", "quux"]);
        }

        #[test]
        fn header_shape_is_flexible() {
            let text = "Module:3 Memory Management  7 hours\nPaging - TLB\nTotal Lecture hours: 45";
            let modules = from_text(text);
            assert_eq!(modules.len(), 1);
            assert_eq!(modules[0].number, 3);
            assert_eq!(modules[0].hours, 7);
            assert!(modules[0].name.starts_with("Module:3 "));
            assert_eq!(modules[0].name, "Module:3 Memory Management");
        }

        #[test]
        fn header_without_boundary_is_dropped() {
            let text = "Module:1 Basics 10 hours\nfoo - bar";
            assert!(from_text(text).is_empty());
        }

        #[test]
        fn last_module_needs_summary_line() {
            let text = "Module:1 A 2 hours\nx - y\nModule:2 B 3 hours\nz - w";
            let modules = from_text(text);
            assert_eq!(modules.len(), 1);
            assert_eq!(modules[0].topics, vec!["x", "y"]);
        }

        #[test]
        fn text_before_first_module_is_ignored() {
            let text = "Course Objectives - learn - things\nModule:1 A 2 hours\nx - y\nTotal Lecture hours: 2";
            let modules = from_text(text);
            assert_eq!(modules.len(), 1);
            assert_eq!(modules[0].topics, vec!["x", "y"]);
        }

        #[test]
        fn oversized_number_defaults_to_zero() {
            let text = "Module:99999999999 Huge 4 hours\nx\nTotal Lecture hours: 4";
            let modules = from_text(text);
            assert_eq!(modules[0].number, 0);
            assert_eq!(modules[0].hours, 4);
        }

        #[test]
        fn module_without_topics() {
            let text = "Module:1 Empty 1 hours\n\nModule:2 Full 2 hours\na, b\nTotal Lecture hours: 3";
            let modules = from_text(text);
            assert_eq!(modules.len(), 2);
            assert!(modules[0].topics.is_empty());
            assert_eq!(modules[1].topics, vec!["a", "b"]);
        }

        #[test]
        fn well_formed_headers_round_trip() {
            for (n, h) in [(1, 1), (4, 12), (10, 3), (7, 45)] {
                let text = format!("Module:{} Some Name {} hours\nt - u\nTotal Lecture hours: 1", n, h);
                let modules = from_text(&text);
                assert_eq!(modules.len(), 1);
                assert_eq!(modules[0].number, n);
                assert_eq!(modules[0].hours, h);
                assert!(modules[0].name.starts_with(&format!("Module:{} ", n)));
            }
        }
    }

    mod region_tests {
        use super::*;

        #[test]
        fn region_spans_modules_to_summary() {
            let rows = vec![
                row(&["CS101", "Intro"]),
                row(&["Course Objectives"]),
                row(&["Module:1", "Basics", "6 hours"]),
                row(&["a, b"]),
                row(&["", "Total Lecture hours:", "30 hours"]),
                row(&["Text Book(s)"]),
            ];
            let region = content_region(&rows, &Markers::default()).unwrap();
            assert_eq!(region.len(), 2);
            assert_eq!(region[0][0].as_deref(), Some("Module:1"));
        }

        #[test]
        fn region_runs_to_end_without_summary() {
            let rows = vec![
                row(&["CS101", "Intro"]),
                row(&["Module:1", "Basics", "6 hours"]),
                row(&["a, b"]),
            ];
            assert_eq!(content_region(&rows, &Markers::default()).unwrap().len(), 2);
        }

        #[test]
        fn header_row_is_never_a_module() {
            let rows = vec![row(&["Module:1", "Basics", "6 hours"])];
            assert!(content_region(&rows, &Markers::default()).is_none());
        }

        #[test]
        fn custom_markers() {
            let markers = Markers {
                module_prefix: "Unit".to_string(),
                summary_marker: "Total hours".to_string(),
            };
            let rows = vec![
                row(&["EE200", "Circuits"]),
                row(&["Unit 1", "DC", "4"]),
                row(&["Ohm, Kirchhoff"]),
                row(&["TOTAL HOURS 4"]),
            ];
            let modules = from_table(&rows, &markers);
            assert_eq!(modules.len(), 1);
            assert_eq!(modules[0].number, 1);
            assert_eq!(modules[0].topics, vec!["Ohm", "Kirchhoff"]);
        }
    }

    mod merge_tests {
        use super::*;

        #[test]
        fn wrapped_descriptions_are_joined() {
            let rows = vec![
                row(&["Module:1", "Basics", "6 hours"]),
                row(&["", "intro - history"]),
                row(&["- terms"]),
                row(&["Module:2", "More", "4 hours"]),
            ];
            let merged = merge_rows(&rows, "Module:");
            assert_eq!(merged.len(), 3);
            assert_eq!(merged[1], vec!["intro - history - terms".to_string()]);
            assert_eq!(merged[2][0], "Module:2");
        }

        #[test]
        fn blank_rows_are_skipped() {
            let rows = vec![
                row(&["Module:1", "Basics", "6 hours"]),
                row(&["", ""]),
                row(&["a, b"]),
            ];
            let merged = merge_rows(&rows, "Module:");
            assert_eq!(merged.len(), 2);
        }

        #[test]
        fn consecutive_module_rows_stay_separate() {
            let rows = vec![
                row(&["Module:1", "A", "1 hours"]),
                row(&["Module:2", "B", "2 hours"]),
            ];
            assert_eq!(merge_rows(&rows, "Module:").len(), 2);
        }
    }

    mod table_tests {
        use super::*;

        fn template() -> Vec<TableRow> {
            vec![
                row(&["CS101", "Intro to Systems", "", "3", "3", "0", "0"]),
                row(&["Pre-requisite", "None"]),
                row(&["Module:1", "Basics", "6 hours"]),
                row(&["Bits, Bytes,"]),
                row(&["Words"]),
                row(&["Module:2", "Processes", "8 hours"]),
                row(&["Fork - Exec - Wait"]),
                row(&["Module:3", "Review", "2 hours"]),
                row(&["", "Total Lecture hours:", "16 hours"]),
                row(&["Module:9", "Not a module", "1 hours"]),
            ]
        }

        #[test]
        fn reads_modules_and_topics() {
            let modules = from_table(&template(), &Markers::default());
            assert_eq!(modules.len(), 3);

            assert_eq!(modules[0].number, 1);
            assert_eq!(modules[0].name, "Module:1 Basics");
            assert_eq!(modules[0].hours, 6);
            assert_eq!(modules[0].topics, vec!["Bits", "Bytes", "Words"]);

            assert_eq!(modules[1].topics, vec!["Fork", "Exec", "Wait"]);

            assert_eq!(modules[2].name, "Module:3 Review");
            assert!(modules[2].topics.is_empty());
        }

        #[test]
        fn malformed_number_defaults_to_zero() {
            let rows = vec![
                row(&["CS101", "Intro"]),
                row(&["Module:abc", "Mystery", "5 hours"]),
                row(&["x, y"]),
            ];
            let modules = from_table(&rows, &Markers::default());
            assert_eq!(modules.len(), 1);
            assert_eq!(modules[0].number, 0);
            assert_eq!(modules[0].name, "Module:0 Mystery");
            assert_eq!(modules[0].hours, 5);
            assert_eq!(modules[0].topics, vec!["x", "y"]);
        }

        #[test]
        fn missing_hours_defaults_to_zero() {
            let rows = vec![row(&["CS101", "Intro"]), row(&["Module:4", "Short"])];
            let modules = from_table(&rows, &Markers::default());
            assert_eq!(modules[0].number, 4);
            assert_eq!(modules[0].hours, 0);
            assert_eq!(modules[0].name, "Module:4 Short");
        }

        #[test]
        fn missing_name_keeps_prefix() {
            let rows = vec![row(&["CS101", "Intro"]), row(&["Module:4"])];
            let modules = from_table(&rows, &Markers::default());
            assert_eq!(modules[0].name, "Module:4");
        }

        #[test]
        fn every_description_cell_contributes_topics() {
            let rows = vec![
                row(&["CS101", "Intro"]),
                row(&["Module:1", "Basics", "4 hours"]),
                row(&["a, b", "", "c, d"]),
            ];
            let modules = from_table(&rows, &Markers::default());
            assert_eq!(modules[0].topics, vec!["a", "b", "c", "d"]);
        }

        #[test]
        fn empty_table_yields_nothing() {
            assert!(from_table(&[], &Markers::default()).is_empty());
        }
    }
}
