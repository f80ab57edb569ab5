use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod core;
mod mcp;
pub mod ui;

use commands::{config, search};
use crate::core::config::Config;

#[derive(Parser)]
#[command(name = "file-search-server")]
#[command(about = "Search a file for a keyword - as an MCP tool or from the shell")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the MCP server on stdio (default)
    #[command(alias = "mcp-server")]
    Serve,

    /// Search a file once and print the matching lines
    #[command(alias = "s")]
    Search {
        /// File to search
        file: String,

        /// Keyword to look for (plain substring)
        keyword: String,

        /// Match letter case exactly
        #[arg(short = 's', long)]
        case_sensitive: bool,

        /// Print the JSON payload the MCP tool would return
        #[arg(long)]
        json: bool,
    },

    /// Print the tool catalog as JSON
    Tools,

    /// Show or update configuration
    #[command(alias = "c")]
    Config {
        /// Default log filter (overridden by RUST_LOG)
        #[arg(long)]
        log_level: Option<String>,

        /// Show current configuration
        #[arg(long)]
        show: bool,
    },
}

/// Logging goes to stderr only; stdout carries the protocol
fn init_logging() {
    let (config, load_error) = match Config::load() {
        Ok(config) => (config, None),
        Err(e) => (Config::default(), Some(e)),
    };

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.log_level.as_str()),
    )
    .target(env_logger::Target::Stderr)
    .init();

    if let Some(e) = load_error {
        log::warn!("Ignoring config: {:#}", e);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging();

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => {
            log::info!(
                "Starting {} {}",
                mcp::SERVER_NAME,
                env!("CARGO_PKG_VERSION")
            );
            let server = mcp::McpServer::new();
            server.run().await?;
            log::info!("Server stopped");
        }
        Commands::Search {
            file,
            keyword,
            case_sensitive,
            json,
        } => {
            let found = search::run(search::SearchOptions {
                file,
                keyword,
                case_sensitive,
                json,
            })?;
            if !found {
                std::process::exit(1);
            }
        }
        Commands::Tools => {
            println!(
                "{}",
                serde_json::to_string_pretty(&mcp::catalog::inventory_json())?
            );
        }
        Commands::Config { log_level, show } => {
            config::run(config::ConfigOptions { log_level, show })?;
        }
    }

    Ok(())
}
