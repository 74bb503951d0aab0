use std::collections::HashMap;

use serde::Serialize;

use crate::error::DatasetError;
use crate::table::Table;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct UpdateStats {
    /// Update rows whose key matched a master row.
    pub updated: usize,
    /// Update rows whose key matched nothing. Never inserted.
    pub skipped: usize,
    /// Columns created in master to receive update values.
    pub columns_added: usize,
}

/// Overwrite matching master rows with values from `updates`, column by
/// column (the key column itself is never written). Columns absent from
/// master are created and back-filled empty. Keys absent from master are
/// skipped: unlike [`safe_merge`](crate::merge::safe_merge), this adapter
/// never inserts rows.
pub fn update_in_place(
    master: &mut Table,
    updates: &Table,
    key: &str,
) -> Result<UpdateStats, DatasetError> {
    let master_key = master.require_column(key, "master")?;
    let updates_key = updates.require_column(key, "updates")?;

    let mut index: HashMap<String, usize> = HashMap::with_capacity(master.len());
    for (i, row) in master.rows().iter().enumerate() {
        index.insert(row[master_key].trim().to_string(), i);
    }

    let mut stats = UpdateStats::default();

    // Resolve target columns up front so row writes are straight stores.
    // None marks the key column, which is never overwritten.
    let mut targets: Vec<Option<usize>> = Vec::with_capacity(updates.columns().len());
    for (ci, col) in updates.columns().iter().enumerate() {
        if ci == updates_key {
            targets.push(None);
            continue;
        }
        if master.column_index(col).is_none() {
            stats.columns_added += 1;
        }
        targets.push(Some(master.add_column(col)));
    }

    for row in updates.rows() {
        let k = row[updates_key].trim();
        let Some(&mi) = index.get(k) else {
            stats.skipped += 1;
            continue;
        };
        for (ci, value) in row.iter().enumerate() {
            if let Some(target) = targets[ci] {
                master.set(mi, target, value.clone());
            }
        }
        stats.updated += 1;
    }

    Ok(stats)
}
