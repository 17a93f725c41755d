//! Utility functions for jarcompat
//!
//! Filesystem helpers shared by the listing, conversion and cleanup steps.

use anyhow::{Context, Result};
use regex::Regex;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

/// List regular files below `dir` whose path matches `pattern`.
///
/// Entries are visited in file-name order so repeated runs over the same tree
/// produce the same listing.
pub fn list_files_matching<P: AsRef<Path>>(dir: P, pattern: &str) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    let regex = Regex::new(pattern).with_context(|| format!("Invalid file pattern: {pattern}"))?;

    let mut files = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!("Skipping unreadable entry under {}: {}", dir.display(), e);
                continue;
            }
        };

        if entry.file_type().is_file() && regex.is_match(&entry.path().to_string_lossy()) {
            files.push(entry.into_path());
        }
    }

    Ok(files)
}

/// Bare file name of a path, or the whole path when it has no file name.
pub fn filename_from_path<P: AsRef<Path>>(path: P) -> String {
    let path = path.as_ref();
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

/// The last `depth` normal components of a path joined with `/`.
///
/// `trailing_components("/builds/v1.2/jars", 2)` is `"v1.2/jars"`.
pub fn trailing_components<P: AsRef<Path>>(path: P, depth: usize) -> String {
    let parts: Vec<String> = path
        .as_ref()
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();

    let start = parts.len().saturating_sub(depth);
    parts[start..].join("/")
}

/// Strip the last occurrence of `suffix` (and anything after it) from `name`.
pub fn strip_extension<'a>(name: &'a str, suffix: &str) -> &'a str {
    match name.rfind(suffix) {
        Some(pos) => &name[..pos],
        None => name,
    }
}

/// Ensure a directory exists
pub fn ensure_dir_exists<P: AsRef<Path>>(path: P) -> Result<()> {
    let path = path.as_ref();
    std::fs::create_dir_all(path)
        .with_context(|| format!("Failed to create directory: {}", path.display()))?;
    Ok(())
}

/// Remove a directory tree; a directory that does not exist is not an error.
pub fn remove_dir_recursive<P: AsRef<Path>>(path: P) -> Result<()> {
    let path = path.as_ref();
    if !path.exists() {
        return Ok(());
    }

    std::fs::remove_dir_all(path)
        .with_context(|| format!("Failed to remove directory: {}", path.display()))?;
    Ok(())
}

/// Make a path absolute against the current directory without touching the
/// filesystem.
pub fn absolute_path<P: AsRef<Path>>(path: P) -> Result<PathBuf> {
    let path = path.as_ref();
    std::path::absolute(path)
        .with_context(|| format!("Failed to resolve path: {}", path.display()))
}

/// Check if a command exists in PATH
pub fn command_exists(command: &str) -> bool {
    which::which(command).is_ok()
}
