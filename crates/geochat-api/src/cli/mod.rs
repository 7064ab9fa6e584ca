//! CLI command definitions for the `geochat` binary.
//!
//! Uses clap derive macros for argument parsing.

pub mod config;
pub mod history;
pub mod output;
pub mod run;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

/// Join a chat server and relay commands to it.
#[derive(Parser)]
#[command(name = "geochat", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Export tracing spans through OpenTelemetry (stdout exporter).
    #[arg(long, global = true)]
    pub otel: bool,

    /// Configuration file (defaults to config.toml in the data directory).
    #[arg(long, global = true, env = "GEOCHAT_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the chat host: read JSON commands from stdin, print events to stdout.
    ///
    /// Each input line is one command, e.g.
    /// `{"cmd":10,"name":"alice","serverUri":"ws://localhost:8080/chat"}`.
    Run {
        /// Participant name used when a command carries none.
        #[arg(long)]
        name: Option<String>,

        /// Server address used when a join command carries none.
        #[arg(long)]
        server: Option<String>,

        /// Do not reload the configuration file when it changes.
        #[arg(long)]
        no_watch: bool,

        /// Do not record messages in the local history database.
        #[arg(long)]
        no_history: bool,
    },

    /// Show recently stored chat messages.
    History {
        /// Maximum messages to display.
        #[arg(long, default_value = "20")]
        limit: u32,
    },

    /// Show the effective configuration.
    Config {
        /// Participant name override to apply.
        #[arg(long)]
        name: Option<String>,

        /// Server address override to apply.
        #[arg(long)]
        server: Option<String>,
    },

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}
