use std::collections::HashSet;

use crate::error::DatasetError;
use crate::table::Table;

/// Result of a safe merge. Every incoming row lands in exactly one bucket:
/// accepted into `merged` or reported in `conflicts`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeOutcome {
    pub merged: Table,
    /// Rejected incoming keys (trimmed), in incoming row order.
    pub conflicts: Vec<String>,
}

/// Append incoming rows to master, refusing any row whose key already
/// exists. Existing master rows are never modified. Conflicts are reported,
/// not fatal: the caller persists them to a side file and proceeds.
///
/// Duplicate keys inside `incoming` itself are handled the same way: the
/// first occurrence is accepted, later ones conflict, so `merged` stays
/// duplicate-free whenever `master` was.
pub fn safe_merge(
    master: &Table,
    incoming: &Table,
    key: &str,
) -> Result<MergeOutcome, DatasetError> {
    let master_key = master.require_column(key, "master")?;
    let incoming_key = incoming.require_column(key, "incoming")?;

    // Union schema: master columns first, then incoming-only columns.
    let mut merged = Table::new(master.columns().to_vec());
    for col in incoming.columns() {
        merged.add_column(col);
    }
    let incoming_map: Vec<usize> = incoming
        .columns()
        .iter()
        .map(|col| merged.column_index(col).unwrap())
        .collect();

    let mut seen: HashSet<String> = HashSet::with_capacity(master.len());
    for row in master.rows() {
        seen.insert(row[master_key].trim().to_string());
        merged.push_row(row.clone());
    }

    let mut conflicts = Vec::new();
    for row in incoming.rows() {
        let k = row[incoming_key].trim().to_string();
        if seen.contains(&k) {
            conflicts.push(k);
            continue;
        }
        seen.insert(k);

        let mut out = vec![String::new(); merged.columns().len()];
        for (ci, value) in row.iter().enumerate() {
            out[incoming_map[ci]] = value.clone();
        }
        merged.push_row(out);
    }

    Ok(MergeOutcome { merged, conflicts })
}
