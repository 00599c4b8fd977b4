//! Command-line interface module for filetidy.
//!
//! Thin glue between the argument parser and the organizer: parse flags,
//! validate the root path, load the mapping and hand everything to
//! [`Organizer`]. All fatal conditions bubble up as an error string that
//! `main` reports before exiting non-zero.

use crate::mapping::Mapping;
use crate::organizer::{Organizer, RunOptions};
use crate::output::OutputFormatter;
use clap::Parser;
use log::debug;
use std::path::PathBuf;

/// Organize files into folders by extension.
#[derive(Parser, Debug)]
#[command(name = "filetidy", version, about)]
pub struct Cli {
    /// Root directory to organize (e.g. `.`)
    #[arg(default_value = ".")]
    pub root: PathBuf,

    /// JSON file with extension-to-folder overrides
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Recurse into subdirectories
    #[arg(short, long)]
    pub recursive: bool,

    /// Show what would happen without moving anything
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// Runs one organization pass for the parsed arguments.
///
/// # Examples
///
/// ```no_run
/// use clap::Parser;
/// use filetidy::cli::{Cli, run_cli};
///
/// let cli = Cli::parse_from(["filetidy", "/path/to/project", "--dry-run"]);
/// match run_cli(&cli) {
///     Ok(()) => println!("Operation completed successfully"),
///     Err(e) => eprintln!("Error: {}", e),
/// }
/// ```
pub fn run_cli(cli: &Cli) -> Result<(), String> {
    if !cli.root.is_dir() {
        return Err(format!("Invalid directory: {}", cli.root.display()));
    }

    let mapping = Mapping::load(cli.config.as_deref())
        .map_err(|e| format!("Error loading configuration: {}", e))?;
    debug!("mapping has {} entries", mapping.len());

    if cli.dry_run {
        OutputFormatter::info(&format!(
            "DRY RUN: Analyzing contents of: {}",
            cli.root.display()
        ));
    } else {
        OutputFormatter::info(&format!("Organizing contents of: {}", cli.root.display()));
    }

    let options = RunOptions {
        recursive: cli.recursive,
        dry_run: cli.dry_run,
    };
    let report = Organizer::new(cli.root.clone(), mapping, options)
        .run()
        .map_err(|e| e.to_string())?;

    if report.skipped_in_place > 0 {
        OutputFormatter::warning(&format!(
            "{} file(s) already in place, left untouched",
            report.skipped_in_place
        ));
    }

    if report.planned_moves == 0 {
        OutputFormatter::plain("No files found to organize.");
        return Ok(());
    }

    OutputFormatter::summary_table(&report.folder_counts, report.planned_moves);
    if cli.dry_run {
        OutputFormatter::success("Dry run complete. No files were modified.");
    } else {
        OutputFormatter::success("Organization complete!");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    #[test]
    fn test_parse_defaults() {
        let cli = Cli::parse_from(["filetidy"]);
        assert_eq!(cli.root, PathBuf::from("."));
        assert!(cli.config.is_none());
        assert!(!cli.recursive);
        assert!(!cli.dry_run);
        assert!(!cli.verbose);
    }

    #[test]
    fn test_parse_all_flags() {
        let cli = Cli::parse_from([
            "filetidy", "/tmp/work", "--config", "map.json", "-r", "-n", "-v",
        ]);
        assert_eq!(cli.root, PathBuf::from("/tmp/work"));
        assert_eq!(cli.config, Some(PathBuf::from("map.json")));
        assert!(cli.recursive);
        assert!(cli.dry_run);
        assert!(cli.verbose);
    }

    #[test]
    fn test_run_cli_invalid_root() {
        let cli = Cli::parse_from(["filetidy", "/non/existent/path"]);
        let result = run_cli(&cli);
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("/non/existent/path"));
    }

    #[test]
    fn test_run_cli_bad_config_is_fatal() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let config = temp_dir.path().join("bad.json");
        fs::write(&config, "{ nope").expect("Failed to write config");
        fs::write(temp_dir.path().join("a.png"), "png").expect("Failed to write file");

        let cli = Cli::parse_from([
            Path::new("filetidy"),
            temp_dir.path(),
            Path::new("--config"),
            config.as_path(),
        ]);
        let result = run_cli(&cli);

        assert!(result.is_err());
        // Nothing moved when the config was rejected.
        assert!(temp_dir.path().join("a.png").exists());
    }
}
