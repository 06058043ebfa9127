//! # aim-cli
//!
//! Command-line interface for AIM-DRAG governance.
//!
//! - `aim validate <request>` — run the admissibility gate on a request file
//! - `aim check --mode <mode>` — check text against the phrase policy
//! - `aim record <request>` — govern an externally run action and seal its record
//! - `aim audit verify/tail` — inspect the tamper-evident audit log

mod commands;

use std::path::PathBuf;

use aim_gateway::GovernanceConfig;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// AIM-DRAG governance CLI — validate declarations and audit AI actions.
#[derive(Parser)]
#[command(name = "aim", version, about)]
struct Cli {
    /// Project root directory (defaults to current directory).
    #[arg(long, global = true, default_value = ".")]
    project_root: PathBuf,

    /// Emit logs as JSON lines instead of human-readable text.
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a governance request file (JSON or YAML).
    Validate {
        /// Path to the request file.
        file: PathBuf,
        /// Print the full step trace as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Check generated text against the prescriptive-language policy.
    Check {
        /// DRAG mode the text was produced under.
        #[arg(long)]
        mode: String,
        /// Read the text from a file instead of the argument or stdin.
        #[arg(long)]
        file: Option<PathBuf>,
        /// Text to check (reads stdin when neither TEXT nor --file is given).
        text: Option<String>,
    },
    /// Govern an action that ran outside aim and seal its audit record.
    Record {
        /// Path to the request file.
        file: PathBuf,
        /// How the action ended.
        #[arg(long, value_enum)]
        outcome: commands::record::ReportedOutcome,
        /// Error message for a failed action.
        #[arg(long)]
        error: Option<String>,
        /// File holding the action's generated text (phrase-checked in draft/research).
        #[arg(long)]
        output_file: Option<PathBuf>,
    },
    /// Inspect the audit log.
    Audit {
        #[command(subcommand)]
        command: commands::audit::AuditCommands,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.json_logs)?;

    let project_root = cli.project_root.canonicalize().unwrap_or(cli.project_root);
    let config = GovernanceConfig::load(&project_root)?;

    match &cli.command {
        Commands::Validate { file, json } => commands::validate::execute(file, *json),
        Commands::Check { mode, file, text } => {
            commands::check::execute(mode, file.as_deref(), text.as_deref())
        }
        Commands::Record {
            file,
            outcome,
            error,
            output_file,
        } => commands::record::execute(
            &config,
            file,
            *outcome,
            error.as_deref(),
            output_file.as_deref(),
        ),
        Commands::Audit { command } => commands::audit::execute(command, &config),
    }
}

/// Logs go to stderr so they don't interfere with command output on stdout.
fn init_logging(json: bool) -> anyhow::Result<()> {
    let filter = EnvFilter::from_default_env()
        .add_directive("aim_gateway=info".parse()?)
        .add_directive("aim_cli=info".parse()?);

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if json {
        builder.json().init();
    } else {
        builder.with_ansi(false).init();
    }
    Ok(())
}
