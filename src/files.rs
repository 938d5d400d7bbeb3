//! Local file handling: extension filters, folder globbing and name lists.
use glob::{MatchOptions, Pattern};
use log::*;
use std::{
    collections::{BTreeSet, HashSet},
    fmt,
    path::{Path, PathBuf},
    str::FromStr,
};

use crate::{Result, error::AssetError};

/// File name suffix used to select assets, always starting with a dot.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Extension(String);

impl Extension {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Extension {
    type Err = AssetError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim().trim_start_matches('.');

        if trimmed.is_empty() {
            return Err(AssetError::invalid_args(format!(
                "invalid extension: '{s}'"
            )));
        }

        if trimmed.contains(['/', '\\']) {
            return Err(AssetError::invalid_args(format!(
                "extension must not contain path separators: '{s}'"
            )));
        }

        Ok(Self(format!(".{trimmed}")))
    }
}

impl fmt::Display for Extension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Regular files directly inside `folder` whose names end with one of
/// `extensions`.
///
/// Files are grouped by extension in the order given and sorted by name
/// within each group. A file matching several extensions is listed once.
pub fn find_local_files(
    folder: &Path,
    extensions: &[Extension],
) -> Result<Vec<PathBuf>> {
    if !folder.is_dir() {
        return Err(AssetError::invalid_args(format!(
            "folder '{}' not found",
            folder.display()
        )));
    }

    let folder_str = folder.to_str().ok_or_else(|| {
        AssetError::invalid_args(format!(
            "folder path is not valid UTF-8: {}",
            folder.display()
        ))
    })?;

    let options = MatchOptions {
        case_sensitive: true,
        require_literal_separator: true,
        require_literal_leading_dot: false,
    };

    let mut seen = HashSet::new();
    let mut files = vec![];

    for ext in extensions {
        let pattern = format!(
            "{}/*{}",
            Pattern::escape(folder_str),
            Pattern::escape(ext.as_str())
        );
        debug!("searching for files matching: {pattern}");

        let mut matched = glob::glob_with(&pattern, options)?
            .filter_map(|entry| match entry {
                Ok(path) => Some(path),
                Err(err) => {
                    warn!("skipping unreadable entry: {err}");
                    None
                }
            })
            .filter(|path| path.is_file())
            .collect::<Vec<_>>();

        matched.sort();

        for path in matched {
            if seen.insert(path.clone()) {
                files.push(path);
            }
        }
    }

    Ok(files)
}

/// Asset name of a local file.
pub fn asset_name(path: &Path) -> Result<String> {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(String::from)
        .ok_or_else(|| AssetError::unreadable(path, "file name is not valid UTF-8"))
}

/// Collect requested asset names from positional arguments and an optional
/// list file with one name per line. Blank lines are ignored, duplicates
/// collapse and the result is sorted.
pub fn collect_names(
    names: &[String],
    file_list: Option<&Path>,
) -> Result<BTreeSet<String>> {
    if names.is_empty() && file_list.is_none() {
        return Err(AssetError::invalid_args(
            "no files given: provide a file list with --file-list or file names as arguments",
        ));
    }

    let mut collected = BTreeSet::new();

    if let Some(list) = file_list {
        if !list.exists() {
            return Err(AssetError::invalid_args(format!(
                "file list '{}' not found",
                list.display()
            )));
        }

        let content = std::fs::read_to_string(list)?;
        collected.extend(
            content
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(String::from),
        );
    }

    collected.extend(
        names
            .iter()
            .map(|n| n.trim())
            .filter(|n| !n.is_empty())
            .map(String::from),
    );

    Ok(collected)
}
