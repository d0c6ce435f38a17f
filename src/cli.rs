use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "sensorkit")]
#[command(about = "Pluggable sensor runner for static project analysis", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run all registered sensors over a project
    Analyze {
        /// Path to analyze
        path: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value = "terminal")]
        format: OutputFormat,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Configuration file (default: nearest .sensorkit.toml)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Optional LCOV coverage report to import
        #[arg(long = "coverage-file", visible_alias = "lcov")]
        coverage_file: Option<PathBuf>,

        /// Abort on the first sensor failure
        #[arg(long = "fail-fast")]
        fail_fast: bool,

        /// Number of worker threads (defaults to available cores)
        #[arg(short, long)]
        jobs: Option<usize>,

        /// Suppress progress bars
        #[arg(short, long)]
        quiet: bool,
    },

    /// List the registered sensors and when they run
    Sensors,

    /// Write a starter configuration file into the given directory
    Init {
        /// Directory to initialize
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Overwrite an existing configuration file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Markdown,
    Terminal,
}

impl From<OutputFormat> for crate::report::OutputFormat {
    fn from(f: OutputFormat) -> Self {
        match f {
            OutputFormat::Json => crate::report::OutputFormat::Json,
            OutputFormat::Markdown => crate::report::OutputFormat::Markdown,
            OutputFormat::Terminal => crate::report::OutputFormat::Terminal,
        }
    }
}

pub fn parse_args() -> Cli {
    Cli::parse()
}
