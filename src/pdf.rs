//! PDF access for syllabus ingestion.
//!
//! Text comes straight from `lopdf`. Tables are recovered from the page
//! content streams: text runs are positioned, grouped into lines by
//! baseline, split into cells on wide horizontal gaps, and grouped into
//! tables on wide vertical gaps. Only the first table of each page is kept.

use std::path::{Path, PathBuf};

use lopdf::content::{Content, Operation};
use lopdf::{Document, Object};

use crate::error::{Error, Result};

/// One table row; `None` marks a cell without text.
pub type TableRow = Vec<Option<String>>;

/// Source of syllabus content, either a parsed PDF or a test fixture.
pub trait SourceDocument {
    /// All page text joined with newlines, skipping pages without text.
    fn text(&self) -> Result<String>;

    /// First table of every page, flattened in page order.
    ///
    /// Fails with [`Error::NoStructuredContent`] when any page has no table.
    fn table_rows(&self) -> Result<Vec<TableRow>>;
}

/// Horizontal gap, in multiples of the font size, that separates two cells.
pub const DEFAULT_CELL_GAP: f32 = 1.5;

// Vertical gap, in multiples of the font size, that separates two tables
const TABLE_GAP: f32 = 2.5;

// Average glyph width as a fraction of the font size
const GLYPH_WIDTH: f32 = 0.5;

pub struct PdfDocument {
    doc: Document,
    source: PathBuf,
    cell_gap: f32,
}

impl PdfDocument {
    pub fn open(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path).map_err(|e| Error::DocumentUnreadable {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Self::load(&bytes, path.to_path_buf())
    }

    #[cfg(test)]
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::load(bytes, PathBuf::from("<memory>"))
    }

    fn load(bytes: &[u8], source: PathBuf) -> Result<Self> {
        let doc = Document::load_mem(bytes).map_err(|e| Error::DocumentUnreadable {
            path: source.clone(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            doc,
            source,
            cell_gap: DEFAULT_CELL_GAP,
        })
    }

    pub fn with_cell_gap(mut self, cell_gap: f32) -> Self {
        self.cell_gap = cell_gap;
        self
    }

    pub fn page_count(&self) -> usize {
        self.doc.get_pages().len()
    }

    fn page_runs(&self, page_id: lopdf::ObjectId) -> Option<Vec<TextRun>> {
        let data = match self.doc.get_page_content(page_id) {
            Ok(data) => data,
            Err(e) => {
                tracing::warn!(source = %self.source.display(), ?page_id, error = %e, "unreadable page content");
                return None;
            }
        };
        match Content::decode(&data) {
            Ok(content) => Some(text_runs(&content.operations)),
            Err(e) => {
                tracing::warn!(source = %self.source.display(), ?page_id, error = %e, "undecodable page content");
                None
            }
        }
    }
}

impl SourceDocument for PdfDocument {
    fn text(&self) -> Result<String> {
        let mut full_text = String::new();
        for (page_number, _) in self.doc.get_pages() {
            match self.doc.extract_text(&[page_number]) {
                Ok(text) if !text.trim().is_empty() => {
                    full_text.push_str(&text);
                    full_text.push('\n');
                }
                Ok(_) => tracing::debug!(page_number, "page has no text"),
                Err(e) => tracing::warn!(page_number, error = %e, "text extraction failed for page"),
            }
        }
        Ok(full_text)
    }

    fn table_rows(&self) -> Result<Vec<TableRow>> {
        let mut rows = Vec::new();
        for (page_number, page_id) in self.doc.get_pages() {
            let tables = match self.page_runs(page_id) {
                Some(runs) => find_tables(&group_lines(runs, self.cell_gap)),
                None => Vec::new(),
            };
            tracing::debug!(page_number, tables = tables.len(), "detected tables");

            let Some(first) = tables.into_iter().next() else {
                tracing::warn!(source = %self.source.display(), page_number, "page has no table");
                return Err(Error::NoStructuredContent(format!(
                    "no table detected on page {}",
                    page_number
                )));
            };
            rows.extend(first);
        }
        Ok(rows)
    }
}

/// A string drawn at one position on the page.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub text: String,
}

impl TextRun {
    fn end_x(&self) -> f32 {
        self.x + self.text.chars().count() as f32 * self.size * GLYPH_WIDTH
    }
}

/// A visual line of text split into cells.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutLine {
    pub y: f32,
    pub size: f32,
    pub cells: TableRow,
}

type Matrix = [f32; 6];

const IDENTITY: Matrix = [1.0, 0.0, 0.0, 1.0, 0.0, 0.0];

struct TextState {
    matrix: Matrix,
    line_matrix: Matrix,
    font_size: f32,
    leading: f32,
}

impl TextState {
    fn new() -> Self {
        Self {
            matrix: IDENTITY,
            line_matrix: IDENTITY,
            font_size: 12.0,
            leading: 0.0,
        }
    }

    fn begin(&mut self) {
        self.matrix = IDENTITY;
        self.line_matrix = IDENTITY;
    }

    fn translate_line(&mut self, tx: f32, ty: f32) {
        let m = &mut self.line_matrix;
        m[4] += tx * m[0] + ty * m[2];
        m[5] += tx * m[1] + ty * m[3];
        self.matrix = self.line_matrix;
    }

    fn next_line(&mut self) {
        self.translate_line(0.0, -self.leading);
    }

    fn size(&self) -> f32 {
        let scale = self.matrix[3].abs();
        if scale > f32::EPSILON {
            self.font_size * scale
        } else {
            self.font_size
        }
    }

    fn show(&mut self, bytes: &[u8], runs: &mut Vec<TextRun>) {
        let text = decode_pdf_string(bytes);
        let size = self.size();
        let run = TextRun {
            x: self.matrix[4],
            y: self.matrix[5],
            size,
            text,
        };
        self.matrix[4] = run.end_x();
        if !run.text.trim().is_empty() {
            runs.push(run);
        }
    }

    fn adjust(&mut self, thousandths: f32) {
        self.matrix[4] -= thousandths / 1000.0 * self.size();
    }
}

fn number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r as f32),
        _ => None,
    }
}

fn numbers<const N: usize>(operands: &[Object]) -> Option<[f32; N]> {
    let mut out = [0.0; N];
    for (slot, obj) in out.iter_mut().zip(operands.iter()) {
        *slot = number(obj)?;
    }
    (operands.len() >= N).then_some(out)
}

/// Positions every string shown by a page's content stream.
pub fn text_runs(operations: &[Operation]) -> Vec<TextRun> {
    let mut state = TextState::new();
    let mut runs = Vec::new();

    for op in operations {
        let operands = &op.operands;
        match op.operator.as_str() {
            "BT" => state.begin(),
            "Tf" => {
                if let Some(size) = operands.get(1).and_then(number) {
                    state.font_size = size;
                }
            }
            "TL" => {
                if let Some([leading]) = numbers::<1>(operands) {
                    state.leading = leading;
                }
            }
            "Td" => {
                if let Some([tx, ty]) = numbers::<2>(operands) {
                    state.translate_line(tx, ty);
                }
            }
            "TD" => {
                if let Some([tx, ty]) = numbers::<2>(operands) {
                    state.leading = -ty;
                    state.translate_line(tx, ty);
                }
            }
            "Tm" => {
                if let Some(m) = numbers::<6>(operands) {
                    state.matrix = m;
                    state.line_matrix = m;
                }
            }
            "T*" => state.next_line(),
            "Tj" => {
                if let Some(Object::String(bytes, _)) = operands.first() {
                    state.show(bytes, &mut runs);
                }
            }
            "'" => {
                state.next_line();
                if let Some(Object::String(bytes, _)) = operands.first() {
                    state.show(bytes, &mut runs);
                }
            }
            "\"" => {
                state.next_line();
                if let Some(Object::String(bytes, _)) = operands.get(2) {
                    state.show(bytes, &mut runs);
                }
            }
            "TJ" => {
                if let Some(Object::Array(items)) = operands.first() {
                    for item in items {
                        match item {
                            Object::String(bytes, _) => state.show(bytes, &mut runs),
                            other => {
                                if let Some(n) = number(other) {
                                    state.adjust(n);
                                }
                            }
                        }
                    }
                }
            }
            _ => {}
        }
    }

    runs
}

/// Decodes a PDF string as UTF-16BE when it carries a BOM, else as WinAnsi.
pub fn decode_pdf_string(bytes: &[u8]) -> String {
    if let Some(rest) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let units: Vec<u16> = rest
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        return String::from_utf16_lossy(&units);
    }

    bytes
        .iter()
        .map(|&b| match b {
            0x91 => '\u{2018}',
            0x92 => '\u{2019}',
            0x93 => '\u{201C}',
            0x94 => '\u{201D}',
            0x95 => '\u{2022}',
            0x96 => '–',
            0x97 => '—',
            _ => b as char,
        })
        .collect()
}

fn join_run(cell: &mut String, last_end: f32, run: &TextRun) {
    if !cell.is_empty() && run.x - last_end > run.size * 0.2 {
        cell.push(' ');
    }
    cell.push_str(&run.text);
}

/// Groups runs into lines, top of the page first, and splits them into cells.
pub fn group_lines(mut runs: Vec<TextRun>, cell_gap: f32) -> Vec<LayoutLine> {
    runs.sort_by(|a, b| b.y.total_cmp(&a.y).then(a.x.total_cmp(&b.x)));

    let mut grouped: Vec<Vec<TextRun>> = Vec::new();
    for run in runs {
        match grouped.last_mut() {
            Some(line) if (line[0].y - run.y).abs() <= line[0].size.max(run.size) * 0.5 => {
                line.push(run)
            }
            _ => grouped.push(vec![run]),
        }
    }

    grouped
        .into_iter()
        .map(|mut line| {
            line.sort_by(|a, b| a.x.total_cmp(&b.x));
            let y = line[0].y;
            let size = line.iter().map(|r| r.size).fold(0.0, f32::max);

            let mut cells: Vec<String> = Vec::new();
            let mut last_end = f32::NEG_INFINITY;
            for run in &line {
                let gap = run.x - last_end;
                match cells.last_mut() {
                    Some(cell) if gap <= cell_gap * run.size => join_run(cell, last_end, run),
                    _ => cells.push(run.text.clone()),
                }
                last_end = last_end.max(run.end_x());
            }

            LayoutLine {
                y,
                size,
                cells: cells
                    .into_iter()
                    .map(|c| {
                        let c = c.trim().to_string();
                        (!c.is_empty()).then_some(c)
                    })
                    .collect(),
            }
        })
        .collect()
}

/// Splits lines into blocks on wide vertical gaps and keeps the blocks that
/// look like tables (at least two multi-cell lines).
pub fn find_tables(lines: &[LayoutLine]) -> Vec<Vec<TableRow>> {
    let mut blocks: Vec<Vec<&LayoutLine>> = Vec::new();
    for line in lines {
        match blocks.last_mut() {
            Some(block)
                if block
                    .last()
                    .is_some_and(|prev| prev.y - line.y <= TABLE_GAP * prev.size.max(line.size)) =>
            {
                block.push(line)
            }
            _ => blocks.push(vec![line]),
        }
    }

    blocks
        .into_iter()
        .filter(|block| block.iter().filter(|l| l.cells.len() >= 2).count() >= 2)
        .map(|block| block.into_iter().map(|l| l.cells.clone()).collect())
        .collect()
}
