//! Unibot CLI
//!
//! A command-line interface for the Unibot university schedule assistant.

mod commands;
mod output;
mod telemetry;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;
use unibot_conversation::Assistant;
use unibot_core::AppConfig;

use crate::output::OutputFormat;

#[derive(Parser)]
#[command(
    name = "unibot",
    author = "Unibot Team",
    version,
    about = "Unibot - bilingual university schedule assistant",
    long_about = "Answers English and Turkish questions about course times, rooms,\n\
                  teachers and exams from a schedule file."
)]
struct Cli {
    /// Path to configuration file (TOML, JSON or YAML)
    #[arg(short, long, env = "UNIBOT_CONFIG")]
    config: Option<PathBuf>,

    /// Path to the schedule JSON file, overriding the configuration
    #[arg(short, long, env = "UNIBOT_DATA")]
    data: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(
        short,
        long,
        env = "LOG_LEVEL",
        default_value = "warn",
        value_parser = ["trace", "debug", "info", "warn", "error"]
    )]
    log_level: String,

    /// Enable JSON log format
    #[arg(long, env = "JSON_LOGS")]
    json_logs: bool,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start an interactive chat session
    Chat,

    /// Ask a single question and print the answer
    Ask {
        /// The question to ask
        message: String,

        /// Output format (text, json, yaml)
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Show the entities extracted from a message
    Entities {
        /// The message to analyze
        message: String,
    },

    /// Print the effective configuration as TOML
    Config,
}

fn main() -> ExitCode {
    dotenv::dotenv().ok();

    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }

    let result = telemetry::init_telemetry(&cli.log_level, cli.json_logs).and_then(|_| run(&cli));

    match result {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}: {}", "Error".red().bold(), e);
            if cli.verbose {
                for cause in e.chain().skip(1) {
                    eprintln!("{}: {}", "Caused by".yellow(), cause);
                }
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let config = load_config(cli)?;

    match &cli.command {
        Commands::Config => commands::config::run(&config),
        Commands::Chat => commands::chat::run(&bootstrap(&config)?),
        Commands::Ask { message, format } => {
            commands::ask::run(&bootstrap(&config)?, message, *format)
        }
        Commands::Entities { message } => commands::entities::run(&bootstrap(&config)?, message),
    }
}

fn bootstrap(config: &AppConfig) -> Result<Assistant> {
    info!(schedule = %config.data.schedule_path.display(), "Starting Unibot");
    Assistant::bootstrap(config).context("Failed to start the assistant")
}

fn load_config(cli: &Cli) -> Result<AppConfig> {
    let config = match &cli.config {
        Some(path) => AppConfig::load_from_file(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => AppConfig::load().context("Failed to load configuration")?,
    };

    Ok(match &cli.data {
        Some(path) => config.with_schedule_path(path),
        None => config,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ask() {
        let cli = Cli::try_parse_from(["unibot", "--data", "s.json", "ask", "When is CS101?", "-f", "json"])
            .unwrap();
        assert_eq!(cli.data, Some(PathBuf::from("s.json")));
        match cli.command {
            Commands::Ask { message, format } => {
                assert_eq!(message, "When is CS101?");
                assert_eq!(format, OutputFormat::Json);
            }
            _ => panic!("expected ask"),
        }
    }

    #[test]
    fn test_rejects_unknown_log_level() {
        assert!(Cli::try_parse_from(["unibot", "--log-level", "loud", "chat"]).is_err());
    }

    #[test]
    fn test_data_flag_overrides_schedule_path() {
        let cli = Cli::try_parse_from(["unibot", "--data", "other.json", "chat"]).unwrap();
        let config = load_config(&cli).unwrap();
        assert_eq!(config.data.schedule_path, PathBuf::from("other.json"));
    }

    #[test]
    fn test_missing_config_file_is_an_error() {
        let cli = Cli::try_parse_from(["unibot", "--config", "/nonexistent/unibot.toml", "chat"]).unwrap();
        let err = load_config(&cli).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/unibot.toml"));
    }
}
