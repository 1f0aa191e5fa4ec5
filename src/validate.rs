//! Input validation.
//!
//! Every function here turns a raw command line string into a typed value.
//! The synchronous ones are plugged into clap as `value_parser`s.

use crate::api::paper::PaperClient;
use crate::error::ValidationError;
use crate::fork::Fork;
use std::path::PathBuf;
use unicode_general_category::{GeneralCategory, get_general_category};

pub fn non_empty(s: &str) -> Result<String, ValidationError> {
    if s.is_empty() {
        return Err(ValidationError::Empty);
    }
    if !s.chars().all(is_printable) {
        return Err(ValidationError::NotPrintable(s.to_string()));
    }
    Ok(s.to_string())
}

// Other (C*) and separator (Z*) categories are not printable, except the ASCII space.
fn is_printable(c: char) -> bool {
    if c == ' ' {
        return true;
    }
    !matches!(
        get_general_category(c),
        GeneralCategory::Control
            | GeneralCategory::Format
            | GeneralCategory::Surrogate
            | GeneralCategory::PrivateUse
            | GeneralCategory::Unassigned
            | GeneralCategory::LineSeparator
            | GeneralCategory::ParagraphSeparator
            | GeneralCategory::SpaceSeparator
    )
}

pub fn dir_path(s: &str) -> Result<PathBuf, ValidationError> {
    let path = PathBuf::from(non_empty(s)?);
    if path.exists() && !path.is_dir() {
        return Err(ValidationError::NotADirectory(s.to_string()));
    }
    Ok(path)
}

pub fn file_path(s: &str) -> Result<PathBuf, ValidationError> {
    let path = PathBuf::from(non_empty(s)?);
    if path.exists() && !path.is_file() {
        return Err(ValidationError::NotAFile(s.to_string()));
    }
    Ok(path)
}

/// Expands `s` and requires it to name exactly one file.
pub fn file_glob_path(s: &str) -> Result<PathBuf, ValidationError> {
    let pattern = non_empty(s)?;
    let paths = glob::glob(&pattern).map_err(|err| ValidationError::BadGlob {
        pattern: pattern.clone(),
        reason: err.msg.to_string(),
    })?;

    // unreadable entries are not matches
    let mut matches: Vec<PathBuf> = paths.filter_map(Result::ok).collect();
    if matches.len() != 1 {
        return Err(ValidationError::GlobMatches {
            pattern,
            matches: matches.len(),
        });
    }

    let path = matches.remove(0);
    file_path(&path.to_string_lossy())
}

pub fn network_port(s: &str) -> Result<u16, ValidationError> {
    let s = non_empty(s)?;
    let n: i64 = s
        .trim()
        .parse()
        .map_err(|_| ValidationError::NotANumber(s.clone()))?;
    if !(1..=i64::from(u16::MAX)).contains(&n) {
        return Err(ValidationError::PortOutOfRange(n));
    }
    Ok(n as u16)
}

pub fn server_fork(s: &str) -> Result<Fork, ValidationError> {
    non_empty(s)?.parse()
}

/// Confirms `s` against the versions the catalog advertises.
///
/// A catalog that cannot be reached surfaces as a [`crate::error::SetupError`], not as a
/// validation failure.
pub async fn mc_version(catalog: &PaperClient, s: &str) -> anyhow::Result<String> {
    let version = non_empty(s)?;
    let versions = catalog.list_versions().await?;
    if !versions.contains(&version) {
        return Err(ValidationError::UnsupportedVersion(version).into());
    }
    Ok(version)
}
