//! `deptscan classify` / `whitelist` / `validate` — classification commands.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use clap::Subcommand;
use serde::Serialize;

use deptscan_classify::{
    Classifier, DepartmentWhitelist, PatternTier, RoleFlag, RuleSet, DERIVED_COLUMNS,
};
use deptscan_dataset::{read_table, write_table, Table};

use crate::exit_codes::{EXIT_DATA_IO, EXIT_ERROR};
use crate::{CliError, RunMeta};

#[derive(Subcommand)]
pub enum WhitelistCommands {
    /// Build the JSON side file from the curated review spreadsheet
    #[command(after_help = "\
Examples:
  deptscan whitelist build --curated curated.csv --output whitelist.json")]
    Build {
        /// Curated CSV with department_keyword and precision_level columns
        #[arg(long)]
        curated: PathBuf,

        /// Side file destination
        #[arg(long, short = 'o')]
        output: PathBuf,
    },

    /// Show tier sizes and sample entries of a side file
    Inspect {
        /// Whitelist side file (JSON)
        whitelist: PathBuf,
    },
}

/// Per-batch classification counts, reported on stderr or as JSON.
#[derive(Serialize)]
pub struct ClassifySummary {
    pub rows: usize,
    pub with_evidence: usize,
    pub primary_matches: usize,
    pub backup_matches: usize,
    pub keyword_matches: usize,
    pub teaching_mentions: u64,
    pub flag_counts: BTreeMap<String, usize>,
}

/// A classified batch: the input table with the derived columns appended,
/// plus a per-row evidence marker for the complete/reprocess split.
pub struct ClassifiedBatch {
    pub table: Table,
    pub evidence: Vec<bool>,
    pub summary: ClassifySummary,
}

/// Classify every row of `input`, appending the derived columns and
/// `is_processed`. Snippet columns absent from the input are ignored;
/// at least one must exist.
pub fn classify_table(
    input: &Table,
    classifier: &Classifier,
    snippet_columns: &[String],
) -> Result<ClassifiedBatch, CliError> {
    let snippet_cols: Vec<usize> = snippet_columns
        .iter()
        .filter_map(|name| input.column_index(name))
        .collect();
    if snippet_cols.is_empty() {
        return Err(CliError::args(format!(
            "none of the snippet columns ({}) exist in the input",
            snippet_columns.join(", ")
        ))
        .with_hint("pass --snippet-column once per snippet column in the input"));
    }

    let mut table = input.clone();
    let derived_cols: Vec<usize> = DERIVED_COLUMNS
        .iter()
        .map(|name| table.add_column(name))
        .collect();
    let processed_col = table.add_column("is_processed");

    let mut summary = ClassifySummary {
        rows: table.len(),
        with_evidence: 0,
        primary_matches: 0,
        backup_matches: 0,
        keyword_matches: 0,
        teaching_mentions: 0,
        flag_counts: RoleFlag::ALL
            .iter()
            .map(|f| (f.column_name().to_string(), 0))
            .collect(),
    };
    let mut evidence = Vec::with_capacity(table.len());

    for row in 0..table.len() {
        let snippets: Vec<String> = snippet_cols
            .iter()
            .map(|&c| table.get(row, c).trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        let classification = classifier.classify(Some(&snippets));

        summary.teaching_mentions += u64::from(classification.teaching_intensity);
        match &classification.textual {
            Some(m) if m.tier == PatternTier::Primary => summary.primary_matches += 1,
            Some(_) => summary.backup_matches += 1,
            None => {}
        }
        if classification.keyword.is_some() {
            summary.keyword_matches += 1;
        }
        for flag in RoleFlag::ALL {
            if classification.flags.get(flag) {
                if let Some(count) = summary.flag_counts.get_mut(flag.column_name()) {
                    *count += 1;
                }
            }
        }
        if classification.has_evidence() {
            summary.with_evidence += 1;
        }
        evidence.push(classification.has_evidence());

        for (value, &col) in classification.column_values().iter().zip(&derived_cols) {
            table.set(row, col, value.clone());
        }
        table.set(row, processed_col, "true".to_string());
    }

    Ok(ClassifiedBatch {
        table,
        evidence,
        summary,
    })
}

pub fn load_rules(path: Option<&PathBuf>) -> Result<RuleSet, CliError> {
    match path {
        Some(path) => {
            let data = fs::read_to_string(path).map_err(|e| {
                CliError::new(EXIT_DATA_IO, format!("cannot read {}: {e}", path.display()))
            })?;
            Ok(RuleSet::from_toml(&data)?)
        }
        None => Ok(RuleSet::builtin()),
    }
}

pub fn cmd_classify(
    input: PathBuf,
    whitelist: PathBuf,
    rules: Option<PathBuf>,
    snippet_columns: Vec<String>,
    output: Option<PathBuf>,
    json: bool,
) -> Result<(), CliError> {
    let rules = load_rules(rules.as_ref())?;
    let whitelist = DepartmentWhitelist::load(&whitelist)?;
    let classifier = Classifier::new(&rules, &whitelist);

    let table = read_table(&input)?;
    let batch = classify_table(&table, &classifier, &snippet_columns)?;

    match &output {
        Some(path) => write_table(path, &batch.table)?,
        None if !json => print!("{}", batch.table.to_csv()?),
        None => {}
    }

    #[derive(Serialize)]
    struct Report {
        summary: ClassifySummary,
        meta: RunMeta,
    }

    if json {
        let report = Report {
            summary: batch.summary,
            meta: RunMeta::now(),
        };
        match serde_json::to_string_pretty(&report) {
            Ok(out) => println!("{out}"),
            Err(e) => {
                return Err(CliError::new(
                    EXIT_ERROR,
                    format!("cannot serialize report: {e}"),
                ))
            }
        }
    } else {
        let s = &batch.summary;
        eprintln!(
            "classified {} row(s): {} with evidence, {} primary / {} backup textual, {} keyword",
            s.rows, s.with_evidence, s.primary_matches, s.backup_matches, s.keyword_matches
        );
    }
    Ok(())
}

pub fn cmd_whitelist(cmd: WhitelistCommands) -> Result<(), CliError> {
    match cmd {
        WhitelistCommands::Build { curated, output } => {
            let data = fs::read_to_string(&curated).map_err(|e| {
                CliError::new(
                    EXIT_DATA_IO,
                    format!("cannot read {}: {e}", curated.display()),
                )
            })?;
            let whitelist = DepartmentWhitelist::from_curated_csv(&data)?;
            fs::write(&output, whitelist.to_json()).map_err(|e| {
                CliError::new(
                    EXIT_DATA_IO,
                    format!("cannot write {}: {e}", output.display()),
                )
            })?;
            eprintln!(
                "wrote {} entries ({} / {} / {} by tier) to {}",
                whitelist.len(),
                whitelist.tier(1).len(),
                whitelist.tier(2).len(),
                whitelist.tier(3).len(),
                output.display()
            );
            Ok(())
        }
        WhitelistCommands::Inspect { whitelist } => {
            let wl = DepartmentWhitelist::load(&whitelist)?;
            for precision in 1..=3u8 {
                let entries = wl.tier(precision);
                let sample: Vec<&str> = entries.iter().take(5).map(String::as_str).collect();
                if sample.is_empty() {
                    println!("tier {}: {} entries", precision, entries.len());
                } else {
                    println!(
                        "tier {}: {} entries ({}, ...)",
                        precision,
                        entries.len(),
                        sample.join(", ")
                    );
                }
            }
            Ok(())
        }
    }
}

pub fn cmd_validate(rules: PathBuf) -> Result<(), CliError> {
    let data = fs::read_to_string(&rules).map_err(|e| {
        CliError::new(EXIT_DATA_IO, format!("cannot read {}: {e}", rules.display()))
    })?;
    let rules = RuleSet::from_toml(&data)?;
    println!(
        "ok: {} flag keyword sets, {} primary and {} backup patterns",
        rules.role_keywords().len(),
        rules.primary().len(),
        rules.backup().len()
    );
    Ok(())
}
