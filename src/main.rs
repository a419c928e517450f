mod aggregate;
mod cli;
mod config;
mod devops;
mod display;
mod error;
mod export;
mod logging;
mod models;
mod storage;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::cli::export::ExportOptions;
use crate::config::ExportTarget;

#[derive(Parser)]
#[command(name = "commit-export")]
#[command(
    about = "Export an author's commits across all projects and repositories to CSV",
    long_about = None
)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Query commits and write them to a CSV file (the default)
    Export(ExportArgs),
    /// Configuration commands
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// Show commands
    Show {
        #[command(subcommand)]
        command: ShowCommands,
    },
}

#[derive(Args, Default)]
struct ExportArgs {
    /// Path to config file (environment variables override it)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory for the generated CSV (defaults to ./file)
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Export target: file or s3
    #[arg(long, value_parser = parse_target)]
    target: Option<ExportTarget>,

    /// Print the CSV to stdout instead of writing a file
    #[arg(long)]
    dry_run: bool,

    /// Abort when any repository cannot be queried
    #[arg(long)]
    strict: bool,

    /// Exit non-zero when the S3 upload fails
    #[arg(long)]
    fail_on_upload_error: bool,

    /// Log level: trace, debug, info, warn, error
    #[arg(long)]
    log_level: Option<String>,

    /// Log format: text or json
    #[arg(long)]
    log_format: Option<String>,
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Initialize commit-export.toml configuration file
    Init {
        /// Path where to create the config file
        #[arg(long)]
        path: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum ShowCommands {
    /// Display the most recent CSV export
    Latest {
        /// Path to config file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Directory holding the exports
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
}

impl From<ExportArgs> for ExportOptions {
    fn from(args: ExportArgs) -> Self {
        Self {
            config: args.config,
            output_dir: args.output_dir,
            target: args.target,
            dry_run: args.dry_run,
            strict: args.strict,
            fail_on_upload_error: args.fail_on_upload_error,
            log_level: args.log_level,
            log_format: args.log_format,
        }
    }
}

fn parse_target(value: &str) -> std::result::Result<ExportTarget, String> {
    match value.trim().to_ascii_lowercase().as_str() {
        "file" => Ok(ExportTarget::File),
        "s3" => Ok(ExportTarget::S3),
        other => Err(format!("unknown target '{}', expected 'file' or 's3'", other)),
    }
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command.unwrap_or_else(|| Commands::Export(ExportArgs::default())) {
        Commands::Export(args) => cli::export::run(args.into()),
        Commands::Config { command } => match command {
            ConfigCommands::Init { path } => cli::config::init(path),
        },
        Commands::Show { command } => match command {
            ShowCommands::Latest { config, output_dir } => cli::show::latest(config, output_dir),
        },
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
