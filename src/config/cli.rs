use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::pipeline::sinks::OutputFormat;

// Define command-line arguments
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the pipeline configuration YAML file. The built-in junior
    /// chain is used when omitted.
    #[arg(short = 'c', long)]
    pub pipeline_config: Option<PathBuf>,

    /// Path to a YAML roster file to stream instead of the built-in
    /// production line.
    #[arg(short = 'r', long)]
    pub roster: Option<PathBuf>,

    /// Label printed above text output (overrides the configured one)
    #[arg(short = 'l', long)]
    pub label: Option<String>,

    /// Output format (overrides the configured one)
    #[arg(long, value_enum)]
    pub format: Option<FormatArg>,

    /// Per-channel capacity between stages (overrides the configured one)
    #[arg(long)]
    pub capacity: Option<usize>,

    /// Cancel the run after this many deliveries
    #[arg(long)]
    pub take: Option<u64>,

    /// Run every stage on the current task instead of one task per stage
    #[arg(long)]
    pub sequential: bool,

    /// Optional: Port for the Prometheus metrics HTTP endpoint
    #[arg(long)]
    pub metrics_port: Option<u16>,

    /// Optional: Write logs as JSON lines to this file instead of plain
    /// text on stderr
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Validate the pipeline configuration and exit
    #[arg(long)]
    pub validate_config: bool,
}

/// Output format as accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    Text,
    Json,
}

impl From<FormatArg> for OutputFormat {
    fn from(value: FormatArg) -> Self {
        match value {
            FormatArg::Text => OutputFormat::Text,
            FormatArg::Json => OutputFormat::Json,
        }
    }
}
