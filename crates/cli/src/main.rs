// deptscan CLI - headless snippet classification and dataset upkeep

mod exit_codes;
mod pipeline;
mod snippets;
mod tables;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use deptscan_classify::ClassifyError;
use deptscan_dataset::DatasetError;
use exit_codes::{classify_exit_code, dataset_exit_code, EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "deptscan")]
#[command(about = "Snippet classification and master-dataset upkeep (headless)")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify a batch of snippet rows and append the derived columns
    #[command(after_help = "\
Examples:
  deptscan classify --input batch.csv --whitelist whitelist.json -o classified.csv
  deptscan classify --input batch.csv --whitelist whitelist.json --rules rules.toml --json")]
    Classify {
        /// Input CSV with id_text and snippet columns
        #[arg(long)]
        input: PathBuf,

        /// Whitelist side file (JSON)
        #[arg(long)]
        whitelist: PathBuf,

        /// Rules TOML (builtin rules when omitted)
        #[arg(long)]
        rules: Option<PathBuf>,

        /// Snippet column to read; repeatable
        #[arg(
            long,
            value_name = "COL",
            default_values = ["snippet_1", "snippet_2", "snippet_3", "snippet_4"]
        )]
        snippet_column: Vec<String>,

        /// Write the classified table here (stdout when omitted)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// JSON summary on stdout instead of the CSV table
        #[arg(long)]
        json: bool,
    },

    /// Safe-merge incoming rows into a master table
    #[command(after_help = "\
Examples:
  deptscan merge --master complete.csv --incoming batch.csv --conflicts-out completed_conflicts.csv
  deptscan merge --master complete.csv --incoming batch.csv -o merged.csv")]
    Merge {
        /// Master table (existing rows are never modified)
        #[arg(long)]
        master: PathBuf,

        /// Incoming rows to append
        #[arg(long)]
        incoming: PathBuf,

        /// Identity key column
        #[arg(long, default_value = "id_text")]
        key: String,

        /// Append rejected keys to this side file
        #[arg(long)]
        conflicts_out: Option<PathBuf>,

        /// Merged table destination (defaults to overwriting --master)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Overwrite matching master rows from an updates table (never inserts)
    Update {
        /// Master table, rewritten in place
        #[arg(long)]
        master: PathBuf,

        /// Update rows; unknown keys are skipped
        #[arg(long)]
        updates: PathBuf,

        /// Identity key column
        #[arg(long, default_value = "id_text")]
        key: String,
    },

    /// Select the next unprocessed batch from a roster
    Pending {
        /// Full roster CSV
        #[arg(long)]
        input: PathBuf,

        /// Completed table
        #[arg(long)]
        complete: PathBuf,

        /// Reprocess table
        #[arg(long)]
        reprocess: PathBuf,

        /// Identity key column
        #[arg(long, default_value = "id_text")]
        key: String,

        /// Batch ceiling (all pending rows when omitted)
        #[arg(long)]
        limit: Option<usize>,

        /// Batch destination (stdout when omitted)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Build or inspect the department whitelist side file
    Whitelist {
        #[command(subcommand)]
        command: snippets::WhitelistCommands,
    },

    /// Validate a rules file without classifying anything
    Validate {
        /// Path to the rules TOML
        rules: PathBuf,
    },

    /// Run the full batch pipeline from a TOML config
    #[command(after_help = "\
Examples:
  deptscan run pipeline.toml
  deptscan run pipeline.toml --json
  deptscan run pipeline.toml --output report.json")]
    Run {
        /// Path to the pipeline TOML config
        config: PathBuf,

        /// Output JSON report to stdout instead of human summary
        #[arg(long)]
        json: bool,

        /// Write JSON report to file
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

/// Command failure carrying the process exit code. All commands funnel
/// through this so the registry in `exit_codes` stays authoritative.
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn new(code: u8, msg: impl Into<String>) -> Self {
        Self {
            code,
            message: msg.into(),
            hint: None,
        }
    }

    pub fn args(msg: impl Into<String>) -> Self {
        Self::new(EXIT_USAGE, msg)
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl From<DatasetError> for CliError {
    fn from(err: DatasetError) -> Self {
        Self::new(dataset_exit_code(&err), err.to_string())
    }
}

impl From<ClassifyError> for CliError {
    fn from(err: ClassifyError) -> Self {
        Self::new(classify_exit_code(&err), err.to_string())
    }
}

/// Report metadata block shared by all JSON outputs.
#[derive(serde::Serialize)]
pub struct RunMeta {
    pub version: &'static str,
    pub run_at: String,
}

impl RunMeta {
    pub fn now() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION"),
            run_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Classify {
            input,
            whitelist,
            rules,
            snippet_column,
            output,
            json,
        } => snippets::cmd_classify(input, whitelist, rules, snippet_column, output, json),
        Commands::Merge {
            master,
            incoming,
            key,
            conflicts_out,
            output,
        } => tables::cmd_merge(master, incoming, &key, conflicts_out, output),
        Commands::Update {
            master,
            updates,
            key,
        } => tables::cmd_update(master, updates, &key),
        Commands::Pending {
            input,
            complete,
            reprocess,
            key,
            limit,
            output,
        } => tables::cmd_pending(input, complete, reprocess, &key, limit, output),
        Commands::Whitelist { command } => snippets::cmd_whitelist(command),
        Commands::Validate { rules } => snippets::cmd_validate(rules),
        Commands::Run {
            config,
            json,
            output,
        } => pipeline::cmd_run(config, json, output),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(err) => {
            eprintln!("error: {}", err.message);
            if let Some(hint) = &err.hint {
                eprintln!("hint: {hint}");
            }
            ExitCode::from(err.code)
        }
    }
}
