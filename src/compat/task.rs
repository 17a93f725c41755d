use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::{CompatibilityResult, ResultSet, parser, report_location};
use crate::analysis::CommonFile;
use crate::config::CompatConfig;
use crate::external::{DexConverter, ToolCommand};
use crate::parallel::Task;
use crate::utils;

/// Build labels passed to the checker as `-v1` and `-v2`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionLabels {
    pub old: String,
    pub new: String,
}

/// Compares one archive present in both builds
pub struct CompatibilityCheckTask {
    name: String,
    file: CommonFile,
    labels: Arc<VersionLabels>,
    config: Arc<CompatConfig>,
    results: ResultSet,
}

impl CompatibilityCheckTask {
    pub fn new(
        file: CommonFile,
        labels: Arc<VersionLabels>,
        config: Arc<CompatConfig>,
        results: ResultSet,
    ) -> Self {
        Self {
            name: format!("compat:{}", file.target_file),
            file,
            labels,
            config,
            results,
        }
    }

    /// `<temp>/<jar stem>/<side>`
    fn work_dir(&self, side: &str) -> PathBuf {
        let stem = utils::strip_extension(&self.file.target_file, ".jar");
        self.config.temp_dir.join(stem).join(side)
    }

    /// Path the checker should read for `archive`, converting dex archives
    fn prepare(&self, archive: &Path, side: &str) -> PathBuf {
        let converter = DexConverter::new(&self.config.tools);
        match converter.convert_if_dex(archive, &self.work_dir(side)) {
            Ok(path) => path,
            Err(e) => {
                tracing::warn!(
                    "Dex conversion of {} failed, comparing original: {:#}",
                    archive.display(),
                    e
                );
                archive.to_path_buf()
            }
        }
    }

    fn checker_command(&self, old: &Path, new: &Path) -> ToolCommand {
        ToolCommand::new(&self.config.tools.checker)
            .arg("-old")
            .arg(old)
            .arg("-new")
            .arg(new)
            .arg("-lib")
            .arg(&self.file.target_file)
            .arg("-v1")
            .arg(&self.labels.old)
            .arg("-v2")
            .arg(&self.labels.new)
            .current_dir(&self.config.output_dir)
    }

    /// Run the whole comparison and build its result
    pub fn run_check(&self) -> CompatibilityResult {
        let old = self.prepare(&self.file.old_path, "old");
        let new = self.prepare(&self.file.new_path, "new");

        let mut result = CompatibilityResult::new(self.file.target_file.clone());
        let verbose = self.config.verbose;

        let status = self.checker_command(&old, &new).for_each_line(|line| {
            if verbose {
                tracing::info!("[{}] {}", self.file.target_file, line);
            }
            parser::parse_line(&mut result, line);
        });

        match status {
            Ok(status) if !status.success() => {
                tracing::debug!("Checker exited with {} for {}", status, self.file.target_file);
            }
            Ok(_) => {}
            Err(e) => {
                tracing::warn!("Compatibility check of {} failed: {}", self.file.target_file, e);
            }
        }

        result.report = report_location(
            &self.config.report_link_base(),
            &self.file.target_file,
            &self.labels.old,
            &self.labels.new,
        );
        result
    }
}

impl Task for CompatibilityCheckTask {
    fn name(&self) -> &str {
        &self.name
    }

    fn execute(self: Box<Self>) {
        let result = self.run_check();
        self.results.add_result(result);
    }
}
