//! Move pipeline tying the mapping, tree walker and destination resolver
//! together.
//!
//! The organizer processes one file at a time in enumeration order: resolve
//! where it belongs, log the planned move, and perform it unless the run is
//! a dry run. The run aborts on the first filesystem error; there is no
//! per-file recovery.

use crate::mapping::Mapping;
use crate::output::OutputFormatter;
use crate::resolver::resolve_destination;
use crate::walker::FileWalk;
use log::debug;
use std::collections::HashMap;
use std::env;
use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Errors that can occur during an organization run.
#[derive(Debug)]
pub enum OrganizeError {
    /// The root path is not an existing directory.
    InvalidRoot { path: PathBuf },
    /// Failed to enumerate files under the root.
    WalkFailed { path: PathBuf, source: io::Error },
    /// Failed to create a destination directory.
    DirectoryCreationFailed { path: PathBuf, source: io::Error },
    /// Failed to move a file to its destination.
    FileMoveFailed {
        source: PathBuf,
        destination: PathBuf,
        source_error: io::Error,
    },
}

impl std::fmt::Display for OrganizeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidRoot { path } => {
                write!(f, "Invalid directory: {}", path.display())
            }
            Self::WalkFailed { path, source } => {
                write!(f, "Error reading directory {}: {}", path.display(), source)
            }
            Self::DirectoryCreationFailed { path, source } => {
                write!(
                    f,
                    "Failed to create directory {}: {}",
                    path.display(),
                    source
                )
            }
            Self::FileMoveFailed {
                source,
                destination,
                source_error,
            } => {
                write!(
                    f,
                    "Failed to move {} to {}: {}",
                    source.display(),
                    destination.display(),
                    source_error
                )
            }
        }
    }
}

impl std::error::Error for OrganizeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidRoot { .. } => None,
            Self::WalkFailed { source, .. } => Some(source),
            Self::DirectoryCreationFailed { source, .. } => Some(source),
            Self::FileMoveFailed { source_error, .. } => Some(source_error),
        }
    }
}

/// Result type for organization operations.
pub type OrganizeResult<T> = Result<T, OrganizeError>;

/// Flags for a single run, built once from CLI input.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Descend into subdirectories instead of only direct children.
    pub recursive: bool,
    /// Log planned moves without touching the filesystem.
    pub dry_run: bool,
}

/// What a run did (or, for a dry run, would have done).
#[derive(Debug, Default)]
pub struct RunReport {
    /// Moves performed, or planned under dry-run.
    pub planned_moves: usize,
    /// Planned moves per destination folder.
    pub folder_counts: HashMap<String, usize>,
    /// Files that already sat in their destination folder and were left alone.
    pub skipped_in_place: usize,
}

/// Relocates files under a root directory according to a mapping.
pub struct Organizer {
    root: PathBuf,
    mapping: Mapping,
    options: RunOptions,
}

impl Organizer {
    pub fn new(root: PathBuf, mapping: Mapping, options: RunOptions) -> Self {
        Self {
            root,
            mapping,
            options,
        }
    }

    /// Runs the pipeline: enumerate, resolve, log, move.
    ///
    /// Emits one `<relative source> → <relative destination>` line per file.
    /// Under dry-run the filesystem is never touched. The first filesystem
    /// error aborts the run and is returned to the caller.
    pub fn run(&self) -> OrganizeResult<RunReport> {
        if !self.root.is_dir() {
            return Err(OrganizeError::InvalidRoot {
                path: self.root.clone(),
            });
        }

        let mut walk =
            FileWalk::new(&self.root, self.options.recursive).map_err(|e| {
                OrganizeError::WalkFailed {
                    path: self.root.clone(),
                    source: e,
                }
            })?;
        if let Some(own_name) = self.own_binary_name() {
            debug!("excluding own binary {:?} from the walk", own_name);
            walk = walk.exclude_name(own_name);
        }

        let mut report = RunReport::default();
        for entry in walk {
            let file = entry.map_err(|e| OrganizeError::WalkFailed {
                path: self.root.clone(),
                source: e,
            })?;

            let destination = resolve_destination(&self.root, &self.mapping, &file)?;
            if destination == file {
                debug!("{} already in place, skipping", file.display());
                report.skipped_in_place += 1;
                continue;
            }

            OutputFormatter::move_line(
                self.relative(&file),
                self.relative(&destination),
                self.options.dry_run,
            );

            if !self.options.dry_run {
                move_file(&file, &destination)?;
            }

            let folder = destination
                .parent()
                .map(|dir| self.relative(dir).display().to_string())
                .unwrap_or_default();
            *report.folder_counts.entry(folder).or_insert(0) += 1;
            report.planned_moves += 1;
        }

        Ok(report)
    }

    /// Strips the run root from a path, for log lines.
    fn relative<'a>(&self, path: &'a Path) -> &'a Path {
        path.strip_prefix(&self.root).unwrap_or(path)
    }

    /// File name of the running binary when it sits directly inside the
    /// root, so the tool never relocates itself.
    fn own_binary_name(&self) -> Option<OsString> {
        let exe = env::current_exe().ok()?;
        let parent = exe.parent()?;
        if same_directory(parent, &self.root) {
            exe.file_name().map(OsString::from)
        } else {
            None
        }
    }
}

fn same_directory(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

/// Moves a file, preferring an atomic rename.
///
/// The destination directory is created here, not during resolution, so
/// dry runs never touch the filesystem. Creation is idempotent when the
/// directory already exists.
///
/// Across filesystems the rename fails and we fall back to copy-then-delete:
/// the source is removed only after the copy succeeded, and a failed copy
/// leaves no partial destination behind.
fn move_file(source: &Path, destination: &Path) -> OrganizeResult<()> {
    if let Some(parent) = destination.parent() {
        fs::create_dir_all(parent).map_err(|e| OrganizeError::DirectoryCreationFailed {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }

    if fs::rename(source, destination).is_ok() {
        return Ok(());
    }

    match fs::copy(source, destination) {
        Ok(_) => fs::remove_file(source).map_err(|e| OrganizeError::FileMoveFailed {
            source: source.to_path_buf(),
            destination: destination.to_path_buf(),
            source_error: e,
        }),
        Err(e) => {
            let _ = fs::remove_file(destination);
            Err(OrganizeError::FileMoveFailed {
                source: source.to_path_buf(),
                destination: destination.to_path_buf(),
                source_error: e,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn organize(root: &Path, options: RunOptions) -> OrganizeResult<RunReport> {
        Organizer::new(root.to_path_buf(), Mapping::defaults(), options).run()
    }

    #[test]
    fn test_run_invalid_root() {
        let result = organize(Path::new("/non/existent/path"), RunOptions::default());
        assert!(matches!(result, Err(OrganizeError::InvalidRoot { .. })));
    }

    #[test]
    fn test_run_moves_mapped_file() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root = temp_dir.path();
        fs::write(root.join("style.css"), "body {}").expect("Failed to write file");

        let report = organize(root, RunOptions::default()).expect("Run failed");

        assert_eq!(report.planned_moves, 1);
        assert!(root.join("src/styles/style.css").exists());
        assert!(!root.join("style.css").exists());
        assert_eq!(report.folder_counts.get("src/styles"), Some(&1));
    }

    #[test]
    fn test_dry_run_leaves_filesystem_untouched() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root = temp_dir.path();
        fs::write(root.join("photo.png"), "png").expect("Failed to write file");

        let report = organize(
            root,
            RunOptions {
                recursive: false,
                dry_run: true,
            },
        )
        .expect("Run failed");

        assert_eq!(report.planned_moves, 1);
        assert!(root.join("photo.png").exists());
        assert!(!root.join("public").exists());
    }

    #[test]
    fn test_second_run_skips_files_in_place() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root = temp_dir.path();
        fs::write(root.join("notes.txt"), "hello").expect("Failed to write file");

        organize(root, RunOptions::default()).expect("First run failed");

        // A recursive second pass sees misc/notes.txt already at its
        // destination and must not rename it to notes_1.txt.
        let report = organize(
            root,
            RunOptions {
                recursive: true,
                dry_run: false,
            },
        )
        .expect("Second run failed");

        assert_eq!(report.planned_moves, 0);
        assert_eq!(report.skipped_in_place, 1);
        assert!(root.join("misc/notes.txt").exists());
        assert!(!root.join("misc/notes_1.txt").exists());
    }

    #[test]
    fn test_move_file_preserves_content() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let source = temp_dir.path().join("a.txt");
        let destination = temp_dir.path().join("b.txt");
        fs::write(&source, "payload").expect("Failed to write file");

        move_file(&source, &destination).expect("Move failed");

        assert!(!source.exists());
        assert_eq!(
            fs::read_to_string(&destination).expect("Failed to read destination"),
            "payload"
        );
    }
}
