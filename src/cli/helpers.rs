//! Shared helper functions for CLI commands

use clap::ValueEnum;
use miette::{IntoDiagnostic, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::config::Config;
use crate::core::harness::FinalizedHarness;
use crate::core::loader::load_file;

/// Resolve `auto` against the configured default format
pub fn effective_format(global: &GlobalOpts, config: &Config) -> OutputFormat {
    if global.format != OutputFormat::Auto {
        return global.format;
    }
    match config.default_format.as_deref() {
        Some(name) => OutputFormat::from_str(name, true).unwrap_or_else(|_| {
            log::warn!("unknown default_format `{}` in config, using table", name);
            OutputFormat::Table
        }),
        None => OutputFormat::Table,
    }
}

/// Load, build and finalize a harness document
pub fn load_harness(path: &Path, config: &Config) -> Result<FinalizedHarness> {
    load_file(path, config.build_options()).map_err(miette::Report::new)
}

/// Write to a file, or to stdout when no path is given
pub fn write_output(content: &str, output_path: Option<&PathBuf>, quiet: bool) -> Result<()> {
    match output_path {
        Some(path) => {
            let file = File::create(path).into_diagnostic()?;
            let mut writer = BufWriter::new(file);
            writer.write_all(content.as_bytes()).into_diagnostic()?;
            if !quiet {
                eprintln!("Written to: {}", path.display());
            }
        }
        None => {
            print!("{}", content);
        }
    }
    Ok(())
}

/// Display a quantity without trailing zeros
pub fn format_quantity(quantity: f64) -> String {
    format!("{}", quantity)
}

/// Replace characters that would break a TSV row
pub fn escape_tsv(s: &str) -> String {
    s.replace(['\t', '\n'], " ")
}
