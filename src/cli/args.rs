use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "concurrent_tally")]
#[command(about = "Concurrent directory search and letter-frequency tally over a shared worker pool")]
#[command(version)]
pub struct Cli {
    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress progress output and non-error logs
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Recursively search a directory tree for entries whose name contains a pattern
    Search {
        /// Root directory to search
        root: PathBuf,

        /// Case-sensitive substring to look for in entry names
        #[arg(short, long, default_value = "README.md")]
        pattern: String,

        /// Number of workers (default: max(CPU count, 4))
        #[arg(short, long)]
        workers: Option<usize>,

        /// Configuration preset (default, high_concurrency, testing)
        #[arg(long)]
        config_preset: Option<String>,

        /// Print the full report as JSON
        #[arg(long)]
        json: bool,

        /// Re-run the search single-threaded and compare match counts
        #[arg(long)]
        sequential_check: bool,
    },

    /// Fetch URLs concurrently and count letter frequencies
    Letters {
        /// URLs to fetch (default: RFC 1000-1019)
        urls: Vec<String>,

        /// Number of workers (default: max(CPU count, 4))
        #[arg(short, long)]
        workers: Option<usize>,

        /// Per-request timeout in seconds
        #[arg(long)]
        timeout_secs: Option<u64>,

        /// Configuration preset (default, high_concurrency, testing)
        #[arg(long)]
        config_preset: Option<String>,

        /// Write the per-unit event timeline as JSON to this file
        #[arg(long)]
        timeline: Option<PathBuf>,
    },
}
