//! `prebake` schedules CI builds of prebuilt native artifacts.
//!
//! Every run reads the library catalog, works out which build combinations
//! are wanted but neither published nor already scheduled, and triggers one
//! workflow run per combination.

mod cmd;
mod context;
mod error;

use clap::{Parser, Subcommand, ValueEnum};
use prebake_config::Platform;
use prebake_ledger::BuildStatus;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "prebake", author, version, about, long_about = None)]
struct Cli {
    /// Settings file (TOML); missing files are ignored
    #[arg(short, long, global = true, env = "PREBAKE_CONFIG", default_value = "prebake.toml")]
    config: PathBuf,

    /// Increase log verbosity (-v debug, -vv trace); RUST_LOG takes precedence
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Dispatch builds for every wanted combination not yet scheduled
    Schedule {
        /// Stop after scheduling this many builds
        #[arg(short, long)]
        limit: Option<usize>,

        /// Report what would be dispatched without dispatching or recording
        #[arg(long)]
        dry_run: bool,

        /// Only process these libraries
        #[arg(long = "library", value_name = "NAME")]
        libraries: Vec<String>,

        /// Only process these platforms
        #[arg(long = "platform", value_enum)]
        platforms: Vec<PlatformArg>,
    },

    /// Print the oldest matching version of a library without an artifact
    Oldest {
        library: String,

        #[arg(short, long, value_enum)]
        platform: PlatformArg,
    },

    /// Inspect and maintain the build ledger
    #[command(subcommand)]
    Ledger(LedgerCommand),
}

#[derive(Subcommand)]
enum LedgerCommand {
    /// List records, most recently updated first
    List {
        #[arg(short, long, value_enum)]
        status: Option<StatusArg>,

        #[arg(short, long, default_value_t = 50)]
        limit: u32,
    },
    /// Record a finished build, identified by its run name
    Complete {
        run_name: String,

        #[arg(long)]
        run_url: String,

        /// Build duration in seconds
        #[arg(long)]
        duration: u64,
    },
    /// Record a failed build, identified by its run name
    Fail {
        run_name: String,

        #[arg(long)]
        run_url: Option<String>,
    },
    /// Allow the next scheduling run to dispatch a build again
    Retry { run_name: String },
}

#[derive(Clone, Copy, ValueEnum)]
enum PlatformArg {
    Android,
    Ios,
}

impl From<PlatformArg> for Platform {
    fn from(arg: PlatformArg) -> Self {
        match arg {
            PlatformArg::Android => Platform::Android,
            PlatformArg::Ios => Platform::Ios,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum StatusArg {
    Scheduled,
    Completed,
    Failed,
}

impl From<StatusArg> for BuildStatus {
    fn from(arg: StatusArg) -> Self {
        match arg {
            StatusArg::Scheduled => BuildStatus::Scheduled,
            StatusArg::Completed => BuildStatus::Completed,
            StatusArg::Failed => BuildStatus::Failed,
        }
    }
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Command::Schedule { limit, dry_run, libraries, platforms } => {
            let platforms = platforms.into_iter().map(Platform::from).collect();
            cmd::schedule(&cli.config, limit, dry_run, &libraries, platforms).await
        },
        Command::Oldest { library, platform } => cmd::oldest(&cli.config, &library, platform.into()).await,
        Command::Ledger(LedgerCommand::List { status, limit }) => {
            cmd::ledger_list(&cli.config, status.map(BuildStatus::from), limit).await
        },
        Command::Ledger(LedgerCommand::Complete { run_name, run_url, duration }) => {
            let outcome = cmd::Outcome::Completed { run_url: &run_url, duration };
            cmd::ledger_update(&cli.config, &run_name, outcome).await
        },
        Command::Ledger(LedgerCommand::Fail { run_name, run_url }) => {
            let outcome = cmd::Outcome::Failed { run_url: run_url.as_deref() };
            cmd::ledger_update(&cli.config, &run_name, outcome).await
        },
        Command::Ledger(LedgerCommand::Retry { run_name }) => {
            cmd::ledger_update(&cli.config, &run_name, cmd::Outcome::Retry).await
        },
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:?}");
            ExitCode::FAILURE
        },
    }
}
