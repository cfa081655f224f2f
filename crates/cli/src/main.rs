mod feed;
mod serve;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

/// Task-approval dashboard demo.
#[derive(Parser)]
#[command(name = "taskview", version, about = "Task-approval view materializer demo")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the task API and run the view materializer
    Serve {
        /// Port to listen on
        #[arg(long, default_value_t = 8080)]
        port: u16,
    },

    /// Apply a JSON array of task events and print the resulting views
    Feed {
        /// Path to the JSON events file
        events: PathBuf,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let rt = tokio::runtime::Runtime::new().expect("failed to create tokio runtime");

    match cli.command {
        Commands::Serve { port } => {
            if let Err(e) = rt.block_on(serve::start_server(port)) {
                eprintln!("Server error: {}", e);
                process::exit(1);
            }
        }
        Commands::Feed { events } => {
            if let Err(e) = rt.block_on(feed::run(&events)) {
                eprintln!("error: {}", e);
                process::exit(1);
            }
        }
    }
}
