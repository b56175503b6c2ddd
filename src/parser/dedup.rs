use std::collections::HashSet;

use crate::model::ProductRecord;

/// Identity of a product across sources: its trimmed, lower-cased name.
pub fn identity(record: &ProductRecord) -> String {
    record.product_name.trim().to_lowercase()
}

/// Keep the first record seen for each identity, in input order.
/// Later duplicates are dropped even when they carry more fields.
pub fn dedupe(records: Vec<ProductRecord>) -> Vec<ProductRecord> {
    let mut seen = HashSet::new();
    records
        .into_iter()
        .filter(|r| seen.insert(identity(r)))
        .collect()
}
