use anyhow::Result;
use colored::Colorize;

use crate::core::config::Config;

pub struct ConfigOptions {
    pub log_level: Option<String>,
    pub show: bool,
}

pub fn run(options: ConfigOptions) -> Result<()> {
    let mut config = Config::load()?;

    if options.show {
        show_config(&config)?;
        return Ok(());
    }

    if let Some(level) = options.log_level {
        if level.trim().is_empty() {
            println!("{}", "Error: log level must not be empty".red());
            println!("  e.g. error, warn, info, debug, trace, or file_search_server=debug");
            return Ok(());
        }
        config.log_level = level;
        config.save()?;
        println!("{}", "✓ Log level updated".green());
    } else {
        show_config(&config)?;
    }

    Ok(())
}

fn show_config(config: &Config) -> Result<()> {
    println!("{}", "file-search-server configuration".bold());
    println!();
    println!("  {} {}", "File:".dimmed(), Config::config_path()?.display());
    println!("  {} {}", "Log level:".dimmed(), config.log_level);

    if let Ok(filter) = std::env::var("RUST_LOG") {
        println!();
        println!("{}", "Environment variables:".dimmed());
        println!("  {} {} (overrides log level)", "RUST_LOG:".dimmed(), filter);
    }

    Ok(())
}
