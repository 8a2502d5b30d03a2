//! `wirekit graph` command - dump the resolved connection graph

use miette::{IntoDiagnostic, Result};
use std::path::PathBuf;

use crate::cli::helpers::{load_harness, write_output};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::config::Config;

#[derive(clap::Args, Debug)]
pub struct GraphArgs {
    /// Harness document (YAML)
    pub file: PathBuf,

    /// Output to file instead of stdout
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

pub fn run(args: GraphArgs, global: &GlobalOpts) -> Result<()> {
    let config = Config::load();
    let harness = load_harness(&args.file, &config)?;
    let graph = harness.graph();

    // Only YAML is honored explicitly; everything else dumps JSON
    let content = match global.format {
        OutputFormat::Yaml => serde_yml::to_string(&graph).into_diagnostic()?,
        _ => {
            let mut json = serde_json::to_string_pretty(&graph).into_diagnostic()?;
            json.push('\n');
            json
        }
    };
    write_output(&content, args.output.as_ref(), global.quiet)
}
