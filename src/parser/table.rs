use tracing::debug;

use crate::model::{ProductDraft, ProductRecord};
use crate::parser::classify::{apply, classify, FieldTag};

/// Rows of optional cell strings, as handed over by the document decoder.
pub type Grid = Vec<Vec<Option<String>>>;

/// Turn one grid into product records.
///
/// The first row with any non-empty cell is the header; every later
/// non-empty row is a candidate product. Rows without a filled NAME
/// column produce nothing.
pub fn interpret(grid: &[Vec<Option<String>>]) -> Vec<ProductRecord> {
    if grid.len() < 2 {
        return Vec::new();
    }

    let mut rows = grid.iter().filter(|row| !is_blank(row));
    let Some(header) = rows.next() else {
        return Vec::new();
    };

    let tags: Vec<Option<FieldTag>> = header
        .iter()
        .map(|cell| cell.as_deref().and_then(|c| classify(&c.to_lowercase())))
        .collect();

    if !tags.contains(&Some(FieldTag::Name)) {
        debug!(columns = header.len(), "grid has no name column, skipped");
        return Vec::new();
    }

    rows.filter_map(|row| interpret_row(&tags, row)).collect()
}

fn interpret_row(tags: &[Option<FieldTag>], row: &[Option<String>]) -> Option<ProductRecord> {
    let mut draft = ProductDraft::default();
    for (cell, tag) in row.iter().zip(tags) {
        if let (Some(cell), Some(tag)) = (cell, tag) {
            apply(*tag, cell, &mut draft);
        }
    }
    draft.into_record()
}

fn is_blank(row: &[Option<String>]) -> bool {
    row.iter()
        .all(|cell| cell.as_deref().map_or(true, |c| c.trim().is_empty()))
}
