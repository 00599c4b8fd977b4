//! Lazy enumeration of candidate files under a root directory.
//!
//! `FileWalk` is a finite, non-restartable iterator reflecting filesystem
//! state at enumeration time. It yields regular files only, skips
//! dot-prefixed path segments (hidden directories are pruned, not just
//! their own entry), and can exclude specific file names so the tool never
//! relocates its own binary. Ordering follows the filesystem listing and is
//! deterministic per directory state.

use log::debug;
use std::ffi::OsString;
use std::fs::{self, ReadDir};
use std::io;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, FilterEntry, IntoIter, WalkDir};

type HiddenFilter = FilterEntry<IntoIter, fn(&DirEntry) -> bool>;

/// Iterator over candidate files under a root.
pub struct FileWalk {
    inner: WalkInner,
    excluded_names: Vec<OsString>,
}

enum WalkInner {
    /// Direct children of the root only.
    Flat(ReadDir),
    /// All descendants, hidden directories pruned.
    Recursive(HiddenFilter),
}

/// Keeps an entry unless its final path segment is dot-prefixed.
///
/// The root itself (depth 0) is always kept, so walking `.` or a hidden
/// directory the user explicitly named still works.
fn keep_entry(entry: &DirEntry) -> bool {
    entry.depth() == 0 || !entry.file_name().to_string_lossy().starts_with('.')
}

fn is_hidden_name(path: &Path) -> bool {
    path.file_name()
        .map(|name| name.to_string_lossy().starts_with('.'))
        .unwrap_or(false)
}

impl FileWalk {
    /// Starts a walk under `root`.
    ///
    /// In non-recursive mode the root listing is opened eagerly and an
    /// unreadable root fails here; recursive walks surface errors during
    /// iteration instead.
    pub fn new(root: &Path, recursive: bool) -> io::Result<Self> {
        let inner = if recursive {
            WalkInner::Recursive(
                WalkDir::new(root)
                    .min_depth(1)
                    .follow_links(false)
                    .into_iter()
                    .filter_entry(keep_entry as fn(&DirEntry) -> bool),
            )
        } else {
            WalkInner::Flat(fs::read_dir(root)?)
        };

        Ok(Self {
            inner,
            excluded_names: Vec::new(),
        })
    }

    /// Adds a file name that is never yielded, wherever it appears.
    pub fn exclude_name(mut self, name: OsString) -> Self {
        self.excluded_names.push(name);
        self
    }

    fn is_excluded(&self, path: &Path) -> bool {
        path.file_name()
            .is_some_and(|name| self.excluded_names.iter().any(|excluded| excluded == name))
    }
}

impl Iterator for FileWalk {
    type Item = io::Result<PathBuf>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let candidate = match &mut self.inner {
                WalkInner::Flat(entries) => {
                    let entry = match entries.next()? {
                        Ok(entry) => entry,
                        Err(e) => return Some(Err(e)),
                    };
                    let path = entry.path();
                    if is_hidden_name(&path) {
                        debug!("skipping hidden entry {}", path.display());
                        continue;
                    }
                    match entry.file_type() {
                        Ok(file_type) if file_type.is_file() => path,
                        Ok(_) => continue,
                        Err(e) => return Some(Err(e)),
                    }
                }
                WalkInner::Recursive(entries) => {
                    let entry = match entries.next()? {
                        Ok(entry) => entry,
                        Err(e) => return Some(Err(e.into())),
                    };
                    if !entry.file_type().is_file() {
                        continue;
                    }
                    entry.into_path()
                }
            };

            if self.is_excluded(&candidate) {
                debug!("skipping excluded file {}", candidate.display());
                continue;
            }

            return Some(Ok(candidate));
        }
    }
}
