//! Destination resolution with collision avoidance.
//!
//! Given a file and the mapping, compute the collision-free path the file
//! should move to. Resolution only reads the filesystem; the destination
//! directory is created by the move itself, so a dry run never leaves
//! anything behind. Mapping keys use the dotted lowercase convention
//! (`.png`, not `png` or `.PNG`), so extensions are case-folded and dotted
//! before lookup.

use crate::mapping::Mapping;
use crate::organizer::{OrganizeError, OrganizeResult};
use log::debug;
use std::path::{Path, PathBuf};

/// Dotted lowercase mapping key for a file's extension, e.g. `.png`.
///
/// `None` for files without an extension (including dotfiles like
/// `.gitignore`), which fall through to the sentinel folder.
fn extension_key(file: &Path) -> Option<String> {
    file.extension()
        .map(|ext| format!(".{}", ext.to_string_lossy().to_lowercase()))
}

/// Computes the destination path for `file` under `root`.
///
/// Pure path computation: nothing is created here, so a dry run can resolve
/// freely. The returned path never points at an existing file: when
/// `target_dir/filename` is taken, `{stem}_{n}{ext}` is probed for
/// n = 1, 2, … until a free slot is found, so no pre-existing file is ever
/// overwritten. The one exception is the file itself already sitting at its
/// destination, which is returned unchanged so the caller can skip it.
pub fn resolve_destination(
    root: &Path,
    mapping: &Mapping,
    file: &Path,
) -> OrganizeResult<PathBuf> {
    let key = extension_key(file);
    let folder = match key.as_deref() {
        Some(key) => mapping.folder_for(key),
        None => mapping.sentinel_folder(),
    };

    let target_dir = root.join(folder);

    let file_name = file
        .file_name()
        .ok_or_else(|| OrganizeError::FileMoveFailed {
            source: file.to_path_buf(),
            destination: target_dir.clone(),
            source_error: std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "file has no name component",
            ),
        })?;

    let candidate = target_dir.join(file_name);
    if !candidate.exists() || candidate == file {
        return Ok(candidate);
    }

    Ok(next_free_path(&target_dir, file))
}

/// First unoccupied `{stem}_{n}{ext}` slot in `target_dir`.
fn next_free_path(target_dir: &Path, file: &Path) -> PathBuf {
    let stem = file
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let suffix = file
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    let mut counter: u32 = 1;
    loop {
        let candidate = target_dir.join(format!("{stem}_{counter}{suffix}"));
        if !candidate.exists() {
            debug!(
                "destination for {} occupied, using {}",
                file.display(),
                candidate.display()
            );
            return candidate;
        }
        counter += 1;
    }
}
