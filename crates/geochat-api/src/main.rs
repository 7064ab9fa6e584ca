//! GeoChat command host entry point.
//!
//! Binary name: `geochat`
//!
//! Parses CLI arguments, initializes tracing, then either runs the chat host
//! (commands read from stdin, events written to stdout) or one of the
//! inspection commands.

mod cli;
mod state;

use clap::Parser;
use clap_complete::generate;

use cli::{Cli, Commands};
use geochat_observe::tracing_setup::{filter_for_verbosity, init_tracing, shutdown_tracing};
use state::AppPaths;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_tracing(filter_for_verbosity(cli.verbose, cli.quiet), cli.otel)
        .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

    // Shell completions don't need any paths
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "geochat", &mut std::io::stdout());
        return Ok(());
    }

    let paths = AppPaths::resolve(cli.config.clone());

    let result = match cli.command {
        Commands::Run {
            name,
            server,
            no_watch,
            no_history,
        } => {
            let options = cli::run::RunOptions {
                name,
                server,
                watch: !no_watch,
                record_history: !no_history,
                json: cli.json,
            };
            cli::run::run_host(&paths, options).await
        }

        Commands::History { limit } => cli::history::show_history(&paths, limit, cli.json).await,

        Commands::Config { name, server } => {
            cli::config::show_config(&paths, name.as_deref(), server.as_deref(), cli.json).await
        }

        Commands::Completions { .. } => Ok(()),
    };

    shutdown_tracing();
    result
}
