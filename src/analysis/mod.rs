//! Matching of archive listings between two builds

use indexmap::IndexMap;
use std::path::PathBuf;

use crate::utils;

/// An archive present in both builds
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommonFile {
    pub target_file: String,
    pub old_path: PathBuf,
    pub new_path: PathBuf,
}

/// Archive names split by where they appear
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchResult {
    pub common: Vec<CommonFile>,
    /// Only in the old build
    pub missing: Vec<String>,
    /// Only in the new build
    pub new: Vec<String>,
}

/// Index paths by bare filename. A repeated name keeps its first slot but
/// takes the last path listed.
pub fn index_by_filename<I, P>(paths: I) -> IndexMap<String, PathBuf>
where
    I: IntoIterator<Item = P>,
    P: Into<PathBuf>,
{
    let mut index = IndexMap::new();
    for path in paths {
        let path = path.into();
        index.insert(utils::filename_from_path(&path), path);
    }
    index
}

/// Split two indexed listings into common, missing and new names
pub fn classify(old: &IndexMap<String, PathBuf>, new: &IndexMap<String, PathBuf>) -> MatchResult {
    let mut result = MatchResult::default();

    for (name, new_path) in new {
        match old.get(name) {
            Some(old_path) => result.common.push(CommonFile {
                target_file: name.clone(),
                old_path: old_path.clone(),
                new_path: new_path.clone(),
            }),
            None => result.new.push(name.clone()),
        }
    }

    result.missing = old
        .keys()
        .filter(|name| !new.contains_key(*name))
        .cloned()
        .collect();

    result
}
