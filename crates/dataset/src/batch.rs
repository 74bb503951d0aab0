use std::collections::HashSet;

use crate::error::DatasetError;
use crate::table::Table;

/// Select the next work batch: input rows whose key appears in neither the
/// completed nor the reprocess table, in input order, truncated to `limit`
/// (the per-run ceiling imposed by the upstream rate limit). The full input
/// schema is preserved.
pub fn pending_rows(
    input: &Table,
    complete: &Table,
    reprocess: &Table,
    key: &str,
    limit: Option<usize>,
) -> Result<Table, DatasetError> {
    let input_key = input.require_column(key, "input")?;

    let mut seen: HashSet<String> = HashSet::new();
    for (table, label) in [(complete, "complete"), (reprocess, "reprocess")] {
        for value in table.key_values(key, label)? {
            seen.insert(value);
        }
    }

    let mut out = Table::new(input.columns().to_vec());
    for row in input.rows() {
        if limit.is_some_and(|l| out.len() >= l) {
            break;
        }
        if seen.contains(row[input_key].trim()) {
            continue;
        }
        out.push_row(row.clone());
    }
    Ok(out)
}
