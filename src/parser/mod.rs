pub mod classify;
pub mod dedup;
pub mod extract;
pub mod fields;
pub mod sections;
pub mod table;

use tracing::debug;

use crate::model::ProductRecord;
use table::Grid;

/// Two-source pipeline: grids → rows, prose → sections → records, then dedup.
/// Table records come first so they win over the same product found in prose.
pub fn mine_products<'a>(
    grids: impl IntoIterator<Item = &'a Grid>,
    prose: &str,
) -> Vec<ProductRecord> {
    let mut records: Vec<ProductRecord> = grids
        .into_iter()
        .flat_map(|g| table::interpret(g))
        .collect();
    let from_tables = records.len();

    let candidates = sections::segment(prose);
    records.extend(candidates.iter().filter_map(extract::product::build));
    debug!(
        from_tables,
        sections = candidates.len(),
        from_text = records.len() - from_tables,
        "candidate records"
    );

    dedup::dedupe(records)
}
