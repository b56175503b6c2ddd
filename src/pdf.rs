use std::collections::BTreeMap;
use std::path::Path;
use std::sync::LazyLock;

use lopdf::{Document, Encoding, Object, ObjectId};
use regex::Regex;
use tracing::{debug, info, warn};

use crate::error::ExtractError;
use crate::parser::table::Grid;

const HEAD_PAGES: usize = 3;
const TAIL_PAGES: usize = 2;
const MIN_GRID_ROWS: usize = 2;
const MIN_GRID_COLUMNS: usize = 2;

// Cells in extracted text are separated by a tab or a run of 2+ spaces.
static CELL_GAP_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\t+| {2,}").unwrap());

/// One decoded page: its text, the grids found in it, and the text left
/// over once grid rows are removed.
#[derive(Debug, Clone, PartialEq)]
pub struct RawPage {
    pub number: u32,
    pub text: String,
    pub tables: Vec<Grid>,
    pub prose: String,
}

impl RawPage {
    pub fn from_text(number: u32, text: impl Into<String>) -> Self {
        let text = text.into().replace("\r\n", "\n");
        let (tables, prose) = detect_grids(&text);
        RawPage { number, text, tables, prose }
    }
}

/// Decode every page of the document at `path`.
///
/// An unreadable file or a broken document is fatal; a single page whose
/// text cannot be extracted is kept as an empty page.
pub fn load(path: &Path) -> Result<Vec<RawPage>, ExtractError> {
    let shown = path.display().to_string();
    let bytes = std::fs::read(path).map_err(|source| ExtractError::Io {
        path: shown.clone(),
        source,
    })?;
    let doc = Document::load_mem(&bytes).map_err(|source| ExtractError::Decode {
        path: shown.clone(),
        source,
    })?;

    let pages: Vec<RawPage> = doc
        .get_pages()
        .into_iter()
        .map(|(number, page_id)| {
            let text = page_text(&doc, page_id)
                .or_else(|e| {
                    warn!(page = number, "content stream unreadable, using plain text: {}", e);
                    doc.extract_text(&[number])
                })
                .unwrap_or_else(|e| {
                    warn!(page = number, "text extraction failed: {}", e);
                    String::new()
                });
            RawPage::from_text(number, text)
        })
        .collect();

    info!(
        path = %shown,
        pages = pages.len(),
        tables = pages.iter().map(|p| p.tables.len()).sum::<usize>(),
        "document decoded"
    );
    Ok(pages)
}

/// Page text with its layout kept: a string placed further right on the
/// same baseline starts a new cell (`\t`), one placed on another baseline
/// starts a new line.
fn page_text(doc: &Document, page_id: ObjectId) -> Result<String, lopdf::Error> {
    let encodings: BTreeMap<Vec<u8>, Encoding> = doc
        .get_page_fonts(page_id)?
        .into_iter()
        .filter_map(|(name, font)| font.get_font_encoding(doc).ok().map(|enc| (name, enc)))
        .collect();
    let content = doc.get_and_decode_page_content(page_id)?;

    let mut layout = Layout::default();
    let mut encoding: Option<&Encoding> = None;
    for op in &content.operations {
        let nums: Vec<f32> = op.operands.iter().filter_map(|o| o.as_float().ok()).collect();
        match op.operator.as_str() {
            "BT" => layout.origin = (0.0, 0.0),
            "Tf" => {
                encoding = op
                    .operands
                    .first()
                    .and_then(|o| o.as_name().ok())
                    .and_then(|name| encodings.get(name));
            }
            "Td" | "TD" => {
                if let [dx, dy] = nums[..] {
                    layout.origin = (layout.origin.0 + dx, layout.origin.1 + dy);
                }
            }
            "Tm" => {
                if let [.., x, y] = nums[..] {
                    layout.origin = (x, y);
                }
            }
            "T*" => layout.line_break = true,
            "Tj" | "'" | "\"" => {
                if op.operator != "Tj" {
                    layout.line_break = true;
                }
                if let Some(bytes) = op.operands.last().and_then(|o| o.as_str().ok()) {
                    layout.show(&decode_string(encoding, bytes));
                }
            }
            "TJ" => {
                let Some(Ok(parts)) = op.operands.first().map(|o| o.as_array()) else {
                    continue;
                };
                let mut run = String::new();
                for part in parts {
                    match part {
                        Object::String(bytes, _) => run.push_str(&decode_string(encoding, bytes)),
                        // kerning wider than a fifth of an em reads as a word gap
                        other => {
                            if other.as_float().is_ok_and(|k| k < -TJ_SPACE_KERNING) {
                                run.push(' ');
                            }
                        }
                    }
                }
                layout.show(&run);
            }
            _ => {}
        }
    }
    Ok(layout.finish())
}

const TJ_SPACE_KERNING: f32 = 200.0;
const BASELINE_TOLERANCE: f32 = 1.0;

#[derive(Default)]
struct Layout {
    text: String,
    origin: (f32, f32),
    last: Option<(f32, f32)>,
    line_break: bool,
}

impl Layout {
    fn show(&mut self, s: &str) {
        if s.is_empty() {
            return;
        }
        if let Some((x, y)) = self.last {
            if self.line_break || (self.origin.1 - y).abs() > BASELINE_TOLERANCE {
                self.text.push('\n');
            } else if self.origin.0 > x {
                self.text.push('\t');
            }
        }
        self.line_break = false;
        self.text.push_str(s);
        self.last = Some(self.origin);
    }

    fn finish(mut self) -> String {
        if !self.text.is_empty() {
            self.text.push('\n');
        }
        self.text
    }
}

fn decode_string(encoding: Option<&Encoding>, bytes: &[u8]) -> String {
    encoding
        .and_then(|enc| Document::decode_text(enc, bytes).ok())
        .unwrap_or_else(|| bytes.iter().map(|&b| char::from(b)).collect())
}

/// Text of the pages that usually carry company details: the first three,
/// plus the last two when the document is longer. No page appears twice.
pub fn company_window(pages: &[RawPage]) -> String {
    let head = pages.len().min(HEAD_PAGES);
    let tail_start = pages.len().saturating_sub(TAIL_PAGES).max(head);
    pages[..head]
        .iter()
        .chain(&pages[tail_start..])
        .map(|p| p.text.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Split page text into column-aligned grids and the remaining prose.
/// A grid is a run of at least two consecutive lines that each split into
/// two or more cells; shorter rows are padded with empty cells.
pub fn detect_grids(text: &str) -> (Vec<Grid>, String) {
    let mut grids = Vec::new();
    let mut prose = Vec::new();
    let mut run: Vec<(&str, Vec<String>)> = Vec::new();

    for line in text.lines() {
        let cells = split_cells(line);
        if cells.len() >= MIN_GRID_COLUMNS {
            run.push((line, cells));
        } else {
            flush_run(&mut run, &mut grids, &mut prose);
            prose.push(line);
        }
    }
    flush_run(&mut run, &mut grids, &mut prose);

    if !grids.is_empty() {
        debug!(grids = grids.len(), "column-aligned blocks found");
    }
    (grids, prose.join("\n"))
}

fn split_cells(line: &str) -> Vec<String> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }
    CELL_GAP_RE
        .split(trimmed)
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .collect()
}

fn flush_run<'a>(
    run: &mut Vec<(&'a str, Vec<String>)>,
    grids: &mut Vec<Grid>,
    prose: &mut Vec<&'a str>,
) {
    if run.len() >= MIN_GRID_ROWS {
        let width = run.iter().map(|(_, cells)| cells.len()).max().unwrap_or(0);
        let grid = run
            .drain(..)
            .map(|(_, cells)| {
                let mut row: Vec<Option<String>> = cells.into_iter().map(Some).collect();
                row.resize(width, None);
                row
            })
            .collect();
        grids.push(grid);
    } else {
        prose.extend(run.drain(..).map(|(line, _)| line));
    }
}
