//! Kiln CLI.
//!
//! Drives remote kernel sessions from the command line:
//!   kiln run python3 -c 'print(1)'
//!   kiln run cpp main.cpp --rm
//!   kiln terminate my-session
//!   kiln logs my-session
//!   kiln agents -s ALIVE

use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use kiln_transport::{ApiConfig, HttpTransport};

mod commands;
mod console;
mod pretty;
mod run;
mod stats;

#[derive(Debug, Parser)]
#[command(name = "kiln", version, about = "Client CLI for Kiln sandboxed compute sessions")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run a code snippet or files in a kernel session.
    ///
    /// Depending on the session name you give (default is random), it
    /// may reuse an existing session or create a new one.
    Run(run::RunArgs),

    /// Terminate the given session.
    Terminate {
        /// The session ID or its alias given when creating the session.
        name: String,
        /// Show resource usage statistics after termination.
        #[arg(short = 's', long)]
        stats: bool,
    },

    /// Show the output logs of a running session.
    Logs {
        /// The session ID or its alias given when creating the session.
        name: String,
    },

    /// List agents known to the manager.
    Agents {
        /// Filter agents by the given status.
        #[arg(short = 's', long, default_value = "ALIVE")]
        status: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    // Status lines go to stdout; keep tracing on stderr so piped kernel
    // output stays clean.
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let config = match ApiConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            pretty::fail(&e.to_string());
            return ExitCode::FAILURE;
        }
    };
    let transport = Arc::new(HttpTransport::new(config));

    match cli.command {
        Command::Run(args) => run::run(transport, args).await,
        Command::Terminate { name, stats } => commands::terminate(transport, &name, stats).await,
        Command::Logs { name } => commands::logs(transport, &name).await,
        Command::Agents { status } => commands::agents(transport, &status).await,
    }
}
