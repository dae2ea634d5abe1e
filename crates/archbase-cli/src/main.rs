//! archbase CLI tool.
//!
//! Usage:
//! ```bash
//! archbase scan [OPTIONS] [PATH]
//! archbase analyze [OPTIONS] [PATH]
//! archbase migrate <analyze|v1-to-v2|batch> [OPTIONS] [PATH]
//! archbase list-rules
//! archbase init
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod config_resolver;

/// Component analysis and V1 to V2 migration for Archbase React projects
#[derive(Parser)]
#[command(name = "archbase")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "ARCHBASE_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan component usages and report issues
    Scan {
        /// Path to analyze (default: current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Include patterns, replacing the configured ones
        #[arg(short, long)]
        include: Vec<String>,

        /// Exclude patterns, replacing the configured ones
        #[arg(short, long)]
        exclude: Vec<String>,

        /// Do not descend into subdirectories
        #[arg(long)]
        shallow: bool,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,

        /// Write a JSON report to this file
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// Extract reusable patterns and recommendations
    Analyze {
        /// Path to analyze (default: current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,

        /// Write the analysis as JSON to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Migrate DataSource V1 code to V2
    Migrate {
        #[command(subcommand)]
        command: MigrateCommand,
    },

    /// List available migration and recommendation rules
    ListRules,

    /// Initialize configuration file
    Init {
        /// Overwrite existing config
        #[arg(long)]
        force: bool,
    },
}

#[derive(Subcommand)]
enum MigrateCommand {
    /// Report migration candidates without changing files
    Analyze {
        /// Project root (default: current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Only consider this component
        #[arg(long)]
        component: Option<String>,

        /// Write a JSON report to this file
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// Run every enabled rule over the project
    #[command(name = "v1-to-v2")]
    V1ToV2 {
        /// Project root (default: current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Only run rules targeting this component
        #[arg(long)]
        component: Option<String>,

        /// Report changes without writing files
        #[arg(long)]
        dry_run: bool,

        /// Do not write `.backup` files
        #[arg(long)]
        no_backup: bool,

        /// Include patterns, replacing the configured ones
        #[arg(short, long)]
        include: Vec<String>,

        /// Exclude patterns, replacing the configured ones
        #[arg(short, long)]
        exclude: Vec<String>,
    },

    /// Migrate the files named by a migration analysis
    Batch {
        /// Project root (default: current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Only run these rules (comma-separated ids)
        #[arg(long)]
        rules: Option<String>,

        /// Skip usages rated complex
        #[arg(long)]
        exclude_complex: bool,

        /// Report changes without writing files
        #[arg(long)]
        dry_run: bool,

        /// Write a JSON report to this file
        #[arg(long)]
        report: Option<PathBuf>,
    },
}

/// Output format for scan and analysis results.
#[derive(Clone, Copy, Debug, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    #[default]
    Text,
    /// JSON output.
    Json,
    /// One-line-per-issue compact format.
    Compact,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let config = cli.config.as_deref();
    match cli.command {
        Commands::Scan {
            path,
            include,
            exclude,
            shallow,
            format,
            report,
        } => commands::scan::run(
            &path,
            commands::scan::ScanArgs {
                include,
                exclude,
                shallow,
                format,
                report,
                verbose: cli.verbose,
            },
            config,
        ),
        Commands::Analyze {
            path,
            format,
            output,
        } => commands::analyze::run(&path, format, output.as_deref(), config),
        Commands::Migrate { command } => match command {
            MigrateCommand::Analyze {
                path,
                component,
                report,
            } => commands::migrate::analyze(&path, component, report.as_deref(), config),
            MigrateCommand::V1ToV2 {
                path,
                component,
                dry_run,
                no_backup,
                include,
                exclude,
            } => commands::migrate::v1_to_v2(
                &path,
                commands::migrate::V1ToV2Args {
                    component,
                    dry_run,
                    no_backup,
                    include,
                    exclude,
                },
                config,
            ),
            MigrateCommand::Batch {
                path,
                rules,
                exclude_complex,
                dry_run,
                report,
            } => commands::migrate::batch(
                &path,
                commands::migrate::BatchArgs {
                    rules,
                    exclude_complex,
                    dry_run,
                    report,
                },
                config,
            ),
        },
        Commands::ListRules => {
            commands::list_rules::run();
            Ok(())
        }
        Commands::Init { force } => commands::init::run(force),
    }
}
