// Copyright 2026 Chatsweep Contributors
// SPDX-License-Identifier: Apache-2.0

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use chatsweep::cli;
use chatsweep::platform::DEFAULT_BASE_API;

#[derive(Parser)]
#[command(
    name = "chatsweep",
    about = "Chatsweep — sweep your own messages out of a chat channel",
    version,
    after_help = "Run 'chatsweep <command> --help' for details on each command."
)]
struct Cli {
    /// Output results as JSON (machine-readable)
    #[arg(long, global = true)]
    json: bool,

    /// Suppress non-essential output
    #[arg(long, short, global = true)]
    quiet: bool,

    /// Enable verbose/debug logging
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sweep using a browser "copy as fetch" command (from --file or stdin)
    Run {
        /// File containing the fetch command (defaults to stdin)
        #[arg(long)]
        file: Option<PathBuf>,
        /// REST API base URL
        #[arg(long, default_value = DEFAULT_BASE_API)]
        base_url: String,
        /// Stop after this many batches
        #[arg(long)]
        limit: Option<u32>,
        /// Show what would be deleted without deleting anything
        #[arg(long)]
        dry_run: bool,
    },
    /// Capture credentials from a live browser session, then sweep
    Sniff {
        /// Page to open in the browser (defaults to the platform app)
        #[arg(long)]
        url: Option<String>,
        /// REST API base URL
        #[arg(long, default_value = DEFAULT_BASE_API)]
        base_url: String,
        /// Stop after this many batches
        #[arg(long)]
        limit: Option<u32>,
        /// Show what would be deleted without deleting anything
        #[arg(long)]
        dry_run: bool,
    },
    /// Parse a fetch command and print the recovered request
    Parse {
        /// File containing the fetch command (defaults to stdin)
        #[arg(long)]
        file: Option<PathBuf>,
        /// Print credential header values instead of redacting them
        #[arg(long)]
        show_secrets: bool,
    },
    /// Check environment and diagnose issues
    Doctor {
        /// REST API base URL
        #[arg(long, default_value = DEFAULT_BASE_API)]
        base_url: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Global flags live in env vars so all modules can check them
    if cli.json {
        std::env::set_var("CHATSWEEP_JSON", "1");
    }
    if cli.quiet {
        std::env::set_var("CHATSWEEP_QUIET", "1");
    }

    let default_filter = if cli.verbose {
        "chatsweep=debug"
    } else if cli.quiet {
        "chatsweep=error"
    } else {
        "chatsweep=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Run {
            file,
            base_url,
            limit,
            dry_run,
        } => cli::run_cmd::run(file.as_deref(), &base_url, limit, dry_run).await,
        Commands::Sniff {
            url,
            base_url,
            limit,
            dry_run,
        } => cli::sniff_cmd::run(url.as_deref(), &base_url, limit, dry_run).await,
        Commands::Parse { file, show_secrets } => {
            cli::parse_cmd::run(file.as_deref(), show_secrets).await
        }
        Commands::Doctor { base_url } => cli::doctor::run(&base_url).await,
    };

    // Consistent exit codes: 0=success, 1=error
    if let Err(e) = &result {
        if !cli::output::is_quiet() && !cli::output::is_json() {
            eprintln!("  Error: {e:#}");
        }
        if cli::output::is_json() {
            cli::output::print_json(&serde_json::json!({
                "error": true,
                "message": format!("{e:#}"),
            }));
        }
        std::process::exit(1);
    }

    result
}
