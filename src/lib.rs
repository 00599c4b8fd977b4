//! filetidy - relocate files into extension-based subfolders
//!
//! This library provides utilities for mapping file extensions to
//! destination folders, enumerating candidate files with optional
//! recursion, resolving collision-free destination paths, and moving (or
//! dry-run previewing) files into place.

pub mod cli;
pub mod mapping;
pub mod organizer;
pub mod output;
pub mod resolver;
pub mod walker;

pub use mapping::{Mapping, MappingError, OTHERS_KEY};
pub use organizer::{OrganizeError, OrganizeResult, Organizer, RunOptions, RunReport};
pub use resolver::resolve_destination;
pub use walker::FileWalk;

pub use cli::{Cli, run_cli};
