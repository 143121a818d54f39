//! File resolver module for locating metadata targets on disk
//!
//! This module provides the filesystem lookups the metadata providers rely on:
//! media file existence checks, extension replacement and scanning a show
//! directory for its season folders.

use regex::Regex;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use thiserror::Error;

/// Directory name used for season 0.
pub const SPECIALS_DIR_NAME: &str = "Specials";

// "Season 1", "season 02", "SEASON  3"
static SEASON_DIR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^Season\s+(\d+)$").unwrap());

/// Errors that can occur during file resolution
#[derive(Debug, Error)]
pub enum FileResolverError {
    /// Path is not a directory
    #[error("Path is not a directory: {0}")]
    NotADirectory(PathBuf),

    /// Failed to read directory
    #[error("Failed to read directory {path}: {source}")]
    ReadDirectoryFailed { path: PathBuf, source: io::Error },

    /// Failed to read directory entry
    #[error("Failed to read directory entry: {0}")]
    ReadEntryFailed(#[from] io::Error),
}

/// Returns true if the media file exists and is a regular file
pub fn media_file_exists(path: &Path) -> bool {
    path.is_file()
}

/// Returns the path with its extension replaced (or added, if it has none)
///
/// # Examples
///
/// ```
/// use mede8er_metadata::replace_extension;
/// use std::path::{Path, PathBuf};
///
/// assert_eq!(
///     replace_extension(Path::new("/tv/Lost/Season 1/Lost.S01E01.mkv"), "xml"),
///     PathBuf::from("/tv/Lost/Season 1/Lost.S01E01.xml")
/// );
/// ```
pub fn replace_extension(path: &Path, extension: &str) -> PathBuf {
    path.with_extension(extension)
}

/// Lists the names of the immediate subdirectories of `dir_path`
///
/// Names are returned in the order the filesystem reports them. Entries whose
/// names are not valid UTF-8 are skipped.
pub fn list_subdirectories(dir_path: &Path) -> Result<Vec<String>, FileResolverError> {
    if !dir_path.is_dir() {
        return Err(FileResolverError::NotADirectory(dir_path.to_path_buf()));
    }

    let mut directories = Vec::new();

    for entry in fs::read_dir(dir_path).map_err(|e| FileResolverError::ReadDirectoryFailed {
        path: dir_path.to_path_buf(),
        source: e,
    })? {
        let entry = entry?;

        if !entry.path().is_dir() {
            continue;
        }

        if let Ok(name) = entry.file_name().into_string() {
            directories.push(name);
        }
    }

    Ok(directories)
}

/// Picks the season directory for `season` from a list of directory names
///
/// Season 0 prefers a directory named exactly `Specials`. Otherwise the first
/// directory matching `Season <n>` (case-insensitive) with `n == season` wins.
pub fn match_season_dir(directories: &[String], season: u32) -> Option<&str> {
    if season == 0 {
        if let Some(specials) = directories.iter().find(|d| *d == SPECIALS_DIR_NAME) {
            return Some(specials.as_str());
        }
    }

    directories
        .iter()
        .find(|dir| {
            SEASON_DIR
                .captures(dir)
                .and_then(|caps| caps[1].parse::<u32>().ok())
                .is_some_and(|number| number == season)
        })
        .map(String::as_str)
}

/// Scans `show_dir` and returns the name of the directory holding `season`
pub fn find_season_dir(show_dir: &Path, season: u32) -> Result<Option<String>, FileResolverError> {
    let directories = list_subdirectories(show_dir)?;
    Ok(match_season_dir(&directories, season).map(str::to_string))
}

/// Creates the parent directory of `path` if it does not exist yet
pub(crate) fn ensure_parent_dir(path: &Path) -> io::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => fs::create_dir_all(parent),
        _ => Ok(()),
    }
}
