//! `deptscan merge` / `update` / `pending` — standalone table commands.

use std::path::PathBuf;

use deptscan_dataset::{
    pending_rows, read_table, safe_merge, update_in_place, write_conflicts, write_table,
};

use crate::CliError;

pub fn cmd_merge(
    master: PathBuf,
    incoming: PathBuf,
    key: &str,
    conflicts_out: Option<PathBuf>,
    output: Option<PathBuf>,
) -> Result<(), CliError> {
    let master_table = read_table(&master)?;
    let incoming_table = read_table(&incoming)?;

    let outcome = safe_merge(&master_table, &incoming_table, key)?;
    let accepted = outcome.merged.len() - master_table.len();

    if let Some(path) = &conflicts_out {
        write_conflicts(path, key, &outcome.conflicts)?;
    }
    let destination = output.unwrap_or(master);
    write_table(&destination, &outcome.merged)?;

    eprintln!(
        "merged {accepted} row(s), {} conflict(s){}",
        outcome.conflicts.len(),
        match &conflicts_out {
            Some(path) if !outcome.conflicts.is_empty() =>
                format!(" (appended to {})", path.display()),
            _ => String::new(),
        }
    );
    Ok(())
}

pub fn cmd_update(master: PathBuf, updates: PathBuf, key: &str) -> Result<(), CliError> {
    let mut master_table = read_table(&master)?;
    let updates_table = read_table(&updates)?;

    let stats = update_in_place(&mut master_table, &updates_table, key)?;
    write_table(&master, &master_table)?;

    eprintln!(
        "updated {} row(s), skipped {} unknown key(s), added {} column(s)",
        stats.updated, stats.skipped, stats.columns_added
    );
    Ok(())
}

pub fn cmd_pending(
    input: PathBuf,
    complete: PathBuf,
    reprocess: PathBuf,
    key: &str,
    limit: Option<usize>,
    output: Option<PathBuf>,
) -> Result<(), CliError> {
    let input_table = read_table(&input)?;
    let complete_table = read_table(&complete)?;
    let reprocess_table = read_table(&reprocess)?;

    let batch = pending_rows(&input_table, &complete_table, &reprocess_table, key, limit)?;

    match &output {
        Some(path) => write_table(path, &batch)?,
        None => print!("{}", batch.to_csv()?),
    }
    eprintln!("{} pending row(s)", batch.len());
    Ok(())
}
