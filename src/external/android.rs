//! Android build-output support
//!
//! Restricts listings to archives that are actually deployed on a device image,
//! and turns dex-only archives into plain class jars so the compliance checker
//! can read them.

use anyhow::{Context, Result};
use indexmap::IndexMap;
use std::path::{Component, Path, PathBuf};

use super::exec::{ToolCommand, ToolError};
use crate::config::ToolsConfig;
use crate::utils;

/// Partitions of a platform image that end up on a device
pub const DEPLOY_PARTITIONS: &[&str] = &[
    "system",
    "system_ext",
    "product",
    "oem",
    "vendor",
    "odm",
    "apex",
];

/// Staging directory used while merging split archives
const MERGE_STAGING_DIR: &str = "_tmp";

/// True when the path lives under one of the deployed partitions.
///
/// Below a `target/product/<device>/` build root only the first directory
/// counts, so `out/target/product/x/data/app/Foo.jar` is not deployed even
/// though the root itself names `product`. Elsewhere any directory component
/// may name the partition. Components are compared whole, never as
/// substrings.
pub fn is_deployed_artifact<P: AsRef<Path>>(path: P) -> bool {
    let parts: Vec<String> = path
        .as_ref()
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();

    // Directories only; the file name never names a partition
    let dirs = &parts[..parts.len().saturating_sub(1)];
    let is_partition = |dir: &String| DEPLOY_PARTITIONS.contains(&dir.as_str());

    match device_root_end(dirs) {
        Some(end) => dirs.get(end).is_some_and(is_partition),
        None => dirs.iter().any(is_partition),
    }
}

/// Index just past the last `target/product/<device>` run, if any
fn device_root_end(dirs: &[String]) -> Option<usize> {
    dirs.windows(3)
        .rposition(|w| w[0] == "target" && w[1] == "product")
        .map(|start| start + 3)
}

/// Keep only the entries whose path is a deployed artifact
pub fn filter_to_deployed_only(files: &IndexMap<String, PathBuf>) -> IndexMap<String, PathBuf> {
    let mut result = IndexMap::new();

    for path in files.values() {
        if is_deployed_artifact(path) {
            result.insert(utils::filename_from_path(path), path.clone());
        }
    }

    result
}

/// Converts Android dex archives into standard jars with external tools
pub struct DexConverter<'a> {
    tools: &'a ToolsConfig,
}

impl<'a> DexConverter<'a> {
    pub fn new(tools: &'a ToolsConfig) -> Self {
        Self { tools }
    }

    /// Whether the archive contains any `.dex` entry
    pub fn is_dex_archive(&self, archive: &Path) -> Result<bool, ToolError> {
        let lines = ToolCommand::new(&self.tools.unzip)
            .arg("-l")
            .arg(archive)
            .output_lines()?;

        Ok(lines.iter().any(|line| line.ends_with(".dex")))
    }

    /// Extract `archive` into `output_dir`, optionally only entries matching
    /// the unzip wildcard `only`.
    pub fn extract_archive(
        &self,
        archive: &Path,
        output_dir: &Path,
        only: Option<&str>,
    ) -> Result<(), ToolError> {
        let mut cmd = ToolCommand::new(&self.tools.unzip)
            .args(["-o", "-qq"])
            .arg(archive);
        if let Some(pattern) = only {
            cmd = cmd.arg(pattern);
        }
        cmd.arg("-d").arg(output_dir).run()
    }

    /// Convert one dex file into `<output_dir>/<stem>.jar`
    pub fn convert_dex_to_jar(&self, dex: &Path, output_dir: &Path) -> Result<PathBuf, ToolError> {
        let filename = utils::filename_from_path(dex);
        let stem = utils::strip_extension(&filename, ".dex");
        let output_jar = output_dir.join(format!("{stem}.jar"));

        ToolCommand::new(&self.tools.dex2jar)
            .arg(dex)
            .arg("-o")
            .arg(&output_jar)
            .arg("--force")
            .current_dir(output_dir)
            .run()?;

        Ok(output_jar)
    }

    /// Re-pack the contents of several archives into `output`.
    pub fn merge_archives(&self, archives: &[PathBuf], output: &Path, work_dir: &Path) -> Result<()> {
        let staging = work_dir.join(MERGE_STAGING_DIR);
        utils::remove_dir_recursive(&staging)?;
        utils::ensure_dir_exists(&staging)?;

        for archive in archives {
            self.extract_archive(archive, &staging, None)
                .with_context(|| format!("Failed to extract {}", archive.display()))?;
        }

        let output = utils::absolute_path(output)?;
        if output.exists() {
            std::fs::remove_file(&output)
                .with_context(|| format!("Failed to replace {}", output.display()))?;
        }

        ToolCommand::new(&self.tools.zip)
            .args(["-r", "-o", "-q"])
            .arg(&output)
            .arg(".")
            .current_dir(&staging)
            .run()
            .with_context(|| format!("Failed to create {}", output.display()))?;

        Ok(())
    }

    /// Return a path to a class jar equivalent to `archive`.
    ///
    /// Non-dex archives come back unchanged. Dex archives are unpacked into
    /// `work_dir`, every dex is converted, and when the dex count ceiling split
    /// the code over several dex files the converted jars are merged into
    /// `<work_dir>/<archive file name>` so exactly one path is returned.
    pub fn convert_if_dex(&self, archive: &Path, work_dir: &Path) -> Result<PathBuf> {
        match self.is_dex_archive(archive) {
            Ok(true) => {}
            Ok(false) => return Ok(archive.to_path_buf()),
            Err(e) => {
                tracing::warn!(
                    "Could not inspect {} for dex content, comparing as-is: {}",
                    archive.display(),
                    e
                );
                return Ok(archive.to_path_buf());
            }
        }

        tracing::debug!("Converting dex archive {}", archive.display());

        utils::remove_dir_recursive(work_dir)?;
        utils::ensure_dir_exists(work_dir)?;

        self.extract_archive(archive, work_dir, Some("*.dex"))
            .with_context(|| format!("Failed to extract dex files from {}", archive.display()))?;

        let mut jar_files = Vec::new();
        for dex in utils::list_files_matching(work_dir, r"\.dex$")? {
            let jar = self
                .convert_dex_to_jar(&dex, work_dir)
                .with_context(|| format!("Failed to convert {}", dex.display()))?;
            jar_files.push(jar);
        }
        jar_files.sort();

        match jar_files.len() {
            0 => Ok(archive.to_path_buf()),
            1 => Ok(jar_files.remove(0)),
            count => {
                let merged = work_dir.join(utils::filename_from_path(archive));
                tracing::debug!("Merging {} converted jars into {}", count, merged.display());
                self.merge_archives(&jar_files, &merged, work_dir)?;
                Ok(merged)
            }
        }
    }
}
