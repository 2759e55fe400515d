mod commands;

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use commands::{EXIT_FAILURE, EXIT_LOCK_ERROR, EXIT_MANIFEST_ERROR};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "relock",
    version,
    about = "Change detection gate for dependency lock snapshots"
)]
struct Cli {
    /// Output results as structured JSON.
    #[arg(long, default_value_t = false, global = true)]
    json: bool,

    /// Enable verbose (debug) logging output.
    #[arg(short, long, default_value_t = false, global = true)]
    verbose: bool,

    /// Enable trace-level logging (more detailed than --verbose).
    #[arg(long, default_value_t = false, global = true)]
    trace: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Compare the manifest against the lock snapshot and report what must
    /// be re-resolved.
    Check {
        /// Path to the dependency manifest.
        #[arg(long, default_value = "relock.toml")]
        manifest: PathBuf,
        /// Path to the lock snapshot.
        #[arg(long, default_value = "relock.lock")]
        lock: PathBuf,
    },
    /// Show the preferred version and source for every locked package.
    Preferred {
        /// Path to the dependency manifest.
        #[arg(long, default_value = "relock.toml")]
        manifest: PathBuf,
        /// Path to the lock snapshot.
        #[arg(long, default_value = "relock.lock")]
        lock: PathBuf,
    },
    /// Generate shell completion scripts.
    Completions { shell: Shell },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.trace {
        "trace"
    } else if cli.verbose {
        "debug"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("RELOCK_LOG")
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_target(false)
        .without_time()
        .init();

    let json_output = cli.json;
    let result = match cli.command {
        Commands::Check { manifest, lock } => commands::check::run(&manifest, &lock, json_output),
        Commands::Preferred { manifest, lock } => {
            commands::preferred::run(&manifest, &lock, json_output)
        }
        Commands::Completions { shell } => commands::completions::run::<Cli>(shell),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(msg) => {
            eprintln!("error: {msg}");
            let code = if msg.starts_with("failed to parse manifest")
                || msg.starts_with("failed to read manifest")
                || msg.starts_with("unsupported manifest_version")
            {
                EXIT_MANIFEST_ERROR
            } else if msg.starts_with("lock file") || msg.starts_with("unsupported lock_version") {
                EXIT_LOCK_ERROR
            } else {
                EXIT_FAILURE
            };
            ExitCode::from(code)
        }
    }
}
