use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use webjuris_core::{CaseStatus, Priority, StatusFilter};
use webjuris_store::StoreError;
use webjuris_sync::{ConfigError, SyncError};

mod commands;
mod display;

/// Case files held in the firm's object store.
#[derive(Parser, Debug)]
#[command(name = "webjuris")]
#[command(about = "Manage Web Juris case files")]
#[command(version)]
struct Cli {
    /// Print records as JSON instead of tables and cards.
    #[arg(long, global = true, default_value_t = false)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List cases, optionally narrowed by text and status.
    List(ListArgs),
    /// Show a single case.
    Show { id: String },
    /// Validate and create a new case.
    Create(CreateArgs),
    /// Edit an existing case. The case number cannot change.
    Update(UpdateArgs),
    /// Delete a case.
    Delete { id: String },
    /// Print the next free case number for a classification code.
    NextNumber { code: String },
    /// Manage reserved case numbers.
    Numbers {
        /// Registry file.
        #[arg(long, env = "WEBJURIS_NUMBERS_FILE", default_value = "case-numbers.json")]
        file: PathBuf,
        #[command(subcommand)]
        action: NumbersAction,
    },
    /// Check the object store connection and credentials.
    Ping,
    /// List classification codes.
    Codes,
    /// List courts of appeal, or the tribunals under one of them.
    Courts {
        #[arg(long)]
        appeal: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
enum NumbersAction {
    /// List reserved numbers, split into available and used.
    List,
    /// Reserve a number such as 2024/1501/7.
    Add {
        number: String,
        #[arg(long)]
        note: Option<String>,
    },
    /// Change an available reserved number.
    Edit { id: u64, number: String },
    /// Drop an available reserved number.
    Delete { id: u64 },
}

#[derive(Args, Debug)]
struct ListArgs {
    #[arg(long, default_value_t = 1)]
    page: u32,
    /// Defaults to WEBJURIS_PAGE_SIZE.
    #[arg(long)]
    page_size: Option<u32>,
    /// Local filter on title, client and case number.
    #[arg(short, long, default_value = "")]
    query: String,
    /// `all` or a status (open, pending, closed, cancelled, or their French labels).
    #[arg(short, long, default_value = "all")]
    status: StatusFilter,
    /// Server-side search term.
    #[arg(long)]
    search: Option<String>,
    /// Walk every page instead of fetching one.
    #[arg(long, default_value_t = false)]
    all: bool,
}

#[derive(Args, Debug)]
struct CreateArgs {
    #[arg(long)]
    title: String,
    #[arg(long)]
    client: String,
    /// Four-digit year; defaults to the current one.
    #[arg(long)]
    year: Option<String>,
    /// Classification code, see `webjuris codes`.
    #[arg(long)]
    code: String,
    /// Explicit sequence; the next free one is used when omitted.
    #[arg(long)]
    sequence: Option<String>,
    #[arg(long, default_value = "open")]
    status: CaseStatus,
    #[arg(long, default_value = "medium")]
    priority: Priority,
    #[arg(long, default_value = "")]
    description: String,
    #[arg(long)]
    lawyer: String,
    #[arg(long)]
    court: Option<String>,
    /// Court of appeal id, see `webjuris courts`.
    #[arg(long)]
    appeal: String,
    /// First-instance tribunal id, see `webjuris courts --appeal <id>`.
    #[arg(long)]
    tribunal: Option<String>,
    #[arg(long)]
    next_hearing: Option<String>,
}

#[derive(Args, Debug)]
struct UpdateArgs {
    id: String,
    #[arg(long)]
    title: Option<String>,
    #[arg(long)]
    client: Option<String>,
    #[arg(long)]
    status: Option<CaseStatus>,
    #[arg(long)]
    priority: Option<Priority>,
    #[arg(long)]
    description: Option<String>,
    #[arg(long)]
    lawyer: Option<String>,
    /// Pass an empty string to clear.
    #[arg(long)]
    court: Option<String>,
    #[arg(long)]
    appeal: Option<String>,
    /// Pass an empty string to clear.
    #[arg(long)]
    tribunal: Option<String>,
    /// Pass an empty string to clear.
    #[arg(long)]
    next_hearing: Option<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();
    tracing::debug!("webjuris v{}", env!("CARGO_PKG_VERSION"));

    let cli = Cli::parse();
    match commands::run(cli.command, cli.json).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => report(&err),
    }
}

/// What to tell the user about a failed command, and the exit code.
#[derive(Debug, PartialEq, Eq)]
struct Report {
    lines: Vec<String>,
    code: u8,
}

/// Network failures get a retry banner, validation failures one line per
/// field and exit code 2.
fn describe(err: &anyhow::Error) -> Report {
    if let Some(StoreError::Invalid(errors)) = err.downcast_ref::<StoreError>() {
        let mut lines = vec!["Case not saved:".to_string()];
        lines.extend(
            errors
                .errors()
                .iter()
                .map(|e| format!("  {:<24} {}", e.field(), e)),
        );
        return Report { lines, code: 2 };
    }
    let line = if let Some(e) = err.downcast_ref::<SyncError>() {
        format!("Object store request failed ({e}). Re-run the command to retry.")
    } else if let Some(e) = err.downcast_ref::<ConfigError>() {
        format!("Configuration error: {e}")
    } else {
        format!("error: {err:#}")
    };
    Report {
        lines: vec![line],
        code: 1,
    }
}

fn report(err: &anyhow::Error) -> ExitCode {
    let report = describe(err);
    for line in &report.lines {
        eprintln!("{line}");
    }
    ExitCode::from(report.code)
}
