//! CLI argument definitions using clap derive

use clap::{Parser, Subcommand, ValueEnum};

use crate::cli::commands::{
    bom::BomArgs, completions::CompletionsArgs, graph::GraphArgs, validate::ValidateArgs,
};

#[derive(Parser)]
#[command(name = "wirekit")]
#[command(author, version, about = "Wiring harness toolkit")]
#[command(long_about = "Resolve wiring-harness descriptions into a connection graph and a deduplicated bill of materials.")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug)]
pub struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "auto")]
    pub format: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Enable verbose output (debug logging, overridden by RUST_LOG)
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the bill of materials of a harness document
    Bom(BomArgs),

    /// Dump the resolved connection graph of a harness document
    Graph(GraphArgs),

    /// Build harness documents and report errors
    Validate(ValidateArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Use the configured default, else a table
    #[default]
    Auto,
    /// Human-readable table
    Table,
    /// Tab-separated values (for piping)
    Tsv,
    /// CSV format (for spreadsheets)
    Csv,
    /// JSON format (for programming)
    Json,
    /// YAML format
    Yaml,
    /// Markdown tables
    Md,
}
