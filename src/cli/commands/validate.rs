//! `wirekit validate` command - build harness documents and report errors

use console::style;
use miette::Result;
use std::path::PathBuf;
use walkdir::WalkDir;

use crate::core::config::Config;
use crate::core::loader::{is_harness_file, load_file, LoadError};

#[derive(clap::Args, Debug)]
pub struct ValidateArgs {
    /// Files or directories to validate (default: current directory)
    #[arg()]
    pub paths: Vec<PathBuf>,

    /// Continue validation after first error
    #[arg(long)]
    pub keep_going: bool,

    /// Show summary only, don't show individual errors
    #[arg(long)]
    pub summary: bool,
}

#[derive(Default)]
struct ValidationStats {
    files_checked: usize,
    files_passed: usize,
    files_failed: usize,
}

pub fn run(args: ValidateArgs) -> Result<()> {
    let config = Config::load();
    let paths = if args.paths.is_empty() {
        vec![PathBuf::from(".")]
    } else {
        args.paths.clone()
    };
    let files = expand_paths(&paths);

    println!(
        "{} Validating {} file(s)...\n",
        style("→").blue(),
        files.len()
    );

    let mut stats = ValidationStats::default();
    for path in &files {
        stats.files_checked += 1;

        let outcome = load_file(path, config.build_options())
            .and_then(|harness| harness.bom().map(|_| ()).map_err(LoadError::from));

        match outcome {
            Ok(()) => {
                stats.files_passed += 1;
                if !args.summary {
                    println!("{} {}", style("✓").green(), path.display());
                }
            }
            Err(e) => {
                stats.files_failed += 1;
                if !args.summary {
                    println!("{} {}", style("✗").red(), path.display());
                    println!("{:?}", miette::Report::new(e));
                }
                if !args.keep_going {
                    break;
                }
            }
        }
    }

    println!();
    println!("{}", style("─".repeat(60)).dim());
    println!("{}", style("Validation Summary").bold());
    println!("{}", style("─".repeat(60)).dim());
    println!("  Files checked:  {}", style(stats.files_checked).cyan());
    println!("  Files passed:   {}", style(stats.files_passed).green());
    println!("  Files failed:   {}", style(stats.files_failed).red());
    println!();

    match stats.files_failed {
        0 => {
            println!("{} All files passed validation!", style("✓").green().bold());
            Ok(())
        }
        1 => Err(miette::miette!("Validation failed: 1 file has errors")),
        n => Err(miette::miette!("Validation failed: {} files have errors", n)),
    }
}

/// Expand directories into the harness documents they contain
fn expand_paths(paths: &[PathBuf]) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for path in paths {
        if path.is_dir() {
            for entry in WalkDir::new(path)
                .into_iter()
                .filter_entry(|e| e.depth() == 0 || !e.file_name().to_string_lossy().starts_with('.'))
                .filter_map(|e| e.ok())
                .filter(|e| e.file_type().is_file())
            {
                if is_harness_file(entry.path()) {
                    files.push(entry.path().to_path_buf());
                }
            }
        } else {
            files.push(path.clone());
        }
    }

    files.sort();
    files
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_expand_paths_skips_hidden_and_non_yaml() {
        let tmp = tempdir().unwrap();
        std::fs::create_dir_all(tmp.path().join("sub")).unwrap();
        std::fs::create_dir_all(tmp.path().join(".hidden")).unwrap();
        std::fs::write(tmp.path().join("a.yaml"), "").unwrap();
        std::fs::write(tmp.path().join("sub/b.yml"), "").unwrap();
        std::fs::write(tmp.path().join("notes.txt"), "").unwrap();
        std::fs::write(tmp.path().join(".hidden/c.yaml"), "").unwrap();

        let files = expand_paths(&[tmp.path().to_path_buf()]);
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a.yaml", "b.yml"]);
    }
}
