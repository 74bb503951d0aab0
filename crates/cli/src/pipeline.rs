//! `deptscan run` — config-driven batch pipeline.
//!
//! One run: classify the fetched batch, split rows by whether classification
//! found any evidence, safe-merge each half into its destination table,
//! persist conflicts, then mark the roster rows as processed.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use deptscan_classify::{Classifier, DepartmentWhitelist};
use deptscan_dataset::{
    read_table, safe_merge, update_in_place, write_conflicts, write_table, RunLock, Table,
    UpdateStats,
};

use crate::exit_codes::{EXIT_PIPELINE_CONFIG, EXIT_PIPELINE_RUNTIME};
use crate::snippets::{classify_table, load_rules};
use crate::{CliError, RunMeta};

fn pipeline_err(code: u8, msg: impl Into<String>) -> CliError {
    CliError::new(code, msg)
}

fn default_key() -> String {
    "id_text".into()
}

fn default_completed_conflicts() -> PathBuf {
    "completed_conflicts.csv".into()
}

fn default_reprocess_conflicts() -> PathBuf {
    "reprocess_conflicts.csv".into()
}

fn default_lock() -> PathBuf {
    "deptscan.lock".into()
}

fn default_snippet_columns() -> Vec<String> {
    (1..=4).map(|i| format!("snippet_{i}")).collect()
}

/// Pipeline file layout and knobs. Paths are resolved relative to the
/// config file's directory.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PipelineConfig {
    /// Identity key column, present in every table.
    #[serde(default = "default_key")]
    pub key: String,

    /// The fetched batch to classify this run.
    pub batch: PathBuf,

    /// Full roster; its `is_processed` column is maintained here.
    pub roster: PathBuf,

    /// Destination for rows with classification evidence.
    pub complete: PathBuf,

    /// Destination for rows without evidence, retried later.
    pub reprocess: PathBuf,

    #[serde(default = "default_completed_conflicts")]
    pub completed_conflicts: PathBuf,

    #[serde(default = "default_reprocess_conflicts")]
    pub reprocess_conflicts: PathBuf,

    /// Whitelist side file (JSON).
    pub whitelist: PathBuf,

    /// Rules TOML; builtin rules when omitted.
    pub rules: Option<PathBuf>,

    #[serde(default = "default_lock")]
    pub lock: PathBuf,

    #[serde(default = "default_snippet_columns")]
    pub snippet_columns: Vec<String>,
}

impl PipelineConfig {
    pub fn from_toml(data: &str) -> Result<PipelineConfig, CliError> {
        let config: PipelineConfig = toml::from_str(data)
            .map_err(|e| pipeline_err(EXIT_PIPELINE_CONFIG, format!("config parse error: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), CliError> {
        if self.key.trim().is_empty() {
            return Err(pipeline_err(EXIT_PIPELINE_CONFIG, "key must not be empty"));
        }
        if self.snippet_columns.is_empty() {
            return Err(pipeline_err(
                EXIT_PIPELINE_CONFIG,
                "snippet_columns must not be empty",
            ));
        }
        Ok(())
    }
}

#[derive(Serialize)]
struct MergeStats {
    accepted: usize,
    conflicts: usize,
}

#[derive(Serialize)]
struct RunReport {
    batch_rows: usize,
    with_evidence: usize,
    without_evidence: usize,
    completed: MergeStats,
    reprocess: MergeStats,
    roster: UpdateStats,
    meta: RunMeta,
}

pub fn cmd_run(
    config_path: PathBuf,
    json_output: bool,
    output_file: Option<PathBuf>,
) -> Result<(), CliError> {
    let config_str = std::fs::read_to_string(&config_path)
        .map_err(|e| pipeline_err(EXIT_PIPELINE_RUNTIME, format!("cannot read config: {e}")))?;
    let config = PipelineConfig::from_toml(&config_str)?;

    // Resolve file paths relative to the config file's directory.
    let base_dir = config_path.parent().unwrap_or_else(|| Path::new("."));
    let resolve = |p: &PathBuf| base_dir.join(p);

    // Held for the whole run; dropped (and removed) on every exit path.
    let _lock = RunLock::acquire(&resolve(&config.lock))?;

    let rules = load_rules(config.rules.as_ref().map(|p| resolve(p)).as_ref())?;
    let whitelist = DepartmentWhitelist::load(&resolve(&config.whitelist))?;
    let classifier = Classifier::new(&rules, &whitelist);

    let batch = read_table(&resolve(&config.batch))?;
    let classified = classify_table(&batch, &classifier, &config.snippet_columns)?;
    let key_col = classified.table.require_column(&config.key, "batch")?;

    // Split by evidence into the two destination shapes.
    let mut completed_rows = Table::new(classified.table.columns().to_vec());
    let mut reprocess_rows = Table::new(classified.table.columns().to_vec());
    for (i, row) in classified.table.rows().iter().enumerate() {
        if classified.evidence[i] {
            completed_rows.push_row(row.clone());
        } else {
            reprocess_rows.push_row(row.clone());
        }
    }

    let completed = merge_into(
        &resolve(&config.complete),
        &resolve(&config.completed_conflicts),
        &completed_rows,
        &config.key,
    )?;
    let reprocess = merge_into(
        &resolve(&config.reprocess),
        &resolve(&config.reprocess_conflicts),
        &reprocess_rows,
        &config.key,
    )?;

    // Every classified row counts as processed, whichever half it joined.
    let mut updates = Table::new(vec![config.key.clone(), "is_processed".into()]);
    for row in classified.table.rows() {
        updates.push_row(vec![row[key_col].clone(), "true".into()]);
    }
    let roster_path = resolve(&config.roster);
    let mut roster = read_table(&roster_path)?;
    let roster_stats = update_in_place(&mut roster, &updates, &config.key)?;
    write_table(&roster_path, &roster)?;

    let report = RunReport {
        batch_rows: classified.table.len(),
        with_evidence: completed_rows.len(),
        without_evidence: reprocess_rows.len(),
        completed,
        reprocess,
        roster: roster_stats,
        meta: RunMeta::now(),
    };

    let rendered = serde_json::to_string_pretty(&report)
        .map_err(|e| pipeline_err(EXIT_PIPELINE_RUNTIME, format!("cannot serialize report: {e}")))?;
    if let Some(path) = &output_file {
        std::fs::write(path, &rendered).map_err(|e| {
            pipeline_err(
                EXIT_PIPELINE_RUNTIME,
                format!("cannot write {}: {e}", path.display()),
            )
        })?;
    }
    if json_output {
        println!("{rendered}");
    } else {
        eprintln!(
            "batch: {} row(s), {} with evidence, {} for reprocess",
            report.batch_rows, report.with_evidence, report.without_evidence
        );
        eprintln!(
            "completed: +{} row(s), {} conflict(s); reprocess: +{} row(s), {} conflict(s)",
            report.completed.accepted,
            report.completed.conflicts,
            report.reprocess.accepted,
            report.reprocess.conflicts
        );
        eprintln!(
            "roster: {} marked processed, {} unknown key(s) skipped",
            report.roster.updated, report.roster.skipped
        );
    }
    Ok(())
}

/// Merge incoming rows into the table at `path`, creating it on first run.
/// Conflicts go to the side file and are reported, never fatal.
fn merge_into(
    path: &Path,
    conflicts_path: &Path,
    incoming: &Table,
    key: &str,
) -> Result<MergeStats, CliError> {
    let master = if path.exists() {
        read_table(path)?
    } else {
        Table::new(incoming.columns().to_vec())
    };

    let outcome = safe_merge(&master, incoming, key)?;
    let accepted = outcome.merged.len() - master.len();

    write_conflicts(conflicts_path, key, &outcome.conflicts)?;
    write_table(path, &outcome.merged)?;

    Ok(MergeStats {
        accepted,
        conflicts: outcome.conflicts.len(),
    })
}
