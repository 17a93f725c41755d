use anyhow::{Context, Result};
use indexmap::IndexMap;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::analysis::{self, CommonFile};
use crate::cli::Output;
use crate::compat::{CompatibilityCheckTask, ResultSet, VersionLabels};
use crate::config::CompatConfig;
use crate::external;
use crate::parallel::{ExecutionSummary, TaskScheduler};
use crate::reports::{Section, SectionEmitter};
use crate::utils;

const JAR_PATTERN: &str = r"\.jar$";

/// Path components used as the build label of an input directory
const LABEL_DEPTH: usize = 2;

pub async fn execute(
    old_dir: &Path,
    new_dir: &Path,
    config: CompatConfig,
    output: &Output,
) -> Result<()> {
    for dir in [old_dir, new_dir] {
        if !dir.is_dir() {
            output.error(&format!("{} is not found", dir.display()));
            std::process::exit(1);
        }
    }

    if !utils::command_exists(&config.tools.checker) {
        output.warning(&format!(
            "{} not found on PATH, every comparison will report 0% compatibility",
            config.tools.checker
        ));
    }

    let labels = Arc::new(VersionLabels {
        old: utils::trailing_components(old_dir, LABEL_DEPTH),
        new: utils::trailing_components(new_dir, LABEL_DEPTH),
    });
    tracing::debug!("Comparing {} against {}", labels.old, labels.new);

    let mut old_files = list_jars(old_dir)?;
    let mut new_files = list_jars(new_dir)?;
    output.verbose_summary("📦", "Jars in old build", old_files.len());
    output.verbose_summary("📦", "Jars in new build", new_files.len());

    if config.android_built_out_mode {
        old_files = external::filter_to_deployed_only(&old_files);
        new_files = external::filter_to_deployed_only(&new_files);
        output.verbose_summary("🤖", "Deployed jars in old build", old_files.len());
        output.verbose_summary("🤖", "Deployed jars in new build", new_files.len());
    }

    let mut matched = analysis::classify(&old_files, &new_files);

    // The checker runs in the output directory
    for file in &mut matched.common {
        file.old_path = utils::absolute_path(&file.old_path)?;
        file.new_path = utils::absolute_path(&file.new_path)?;
    }
    let emitter = SectionEmitter::new(&config);

    {
        let mut out = io::stdout().lock();
        emitter.emit_names(&mut out, Section::Missing, &matched.missing)?;
        emitter.emit_names(&mut out, Section::New, &matched.new)?;
        out.flush()?;
    }

    // The checker writes compat_reports/ relative to its working directory
    utils::ensure_dir_exists(&config.output_dir)?;

    let config = Arc::new(config);
    let results = ResultSet::new();

    output.verbose_summary("🔍", "Comparing jars", matched.common.len());
    let summary = {
        let config = Arc::clone(&config);
        let results = results.clone();
        let output = *output;
        let common = matched.common;
        tokio::task::spawn_blocking(move || run_comparisons(common, labels, config, results, output))
            .await
            .context("Comparison workers failed")??
    };

    if summary.panicked > 0 {
        output.warning(&format!(
            "{} of {} comparisons aborted unexpectedly",
            summary.panicked, summary.total
        ));
    }
    output.verbose(&format!(
        "Compared {} jars in {:.2}s",
        summary.completed,
        summary.elapsed.as_secs_f64()
    ));

    let classification = results.finalize();
    {
        let mut out = io::stdout().lock();
        emitter.emit_results(&mut out, Section::Problem, &classification.problematic)?;
        emitter.emit_results(&mut out, Section::Compatible, &classification.compatible)?;
        out.flush()?;
    }

    if config.cleanup_temporary {
        utils::remove_dir_recursive(&config.temp_dir)?;
    } else {
        output.verbose(&format!("Keeping converted jars in {}", config.temp_dir.display()));
    }

    Ok(())
}

/// Index every jar below `dir` by file name
fn list_jars(dir: &Path) -> Result<IndexMap<String, PathBuf>> {
    let files = utils::list_files_matching(dir, JAR_PATTERN)
        .with_context(|| format!("Failed to list jars in {}", dir.display()))?;
    Ok(analysis::index_by_filename(files))
}

/// Run one check per common jar on the scheduler; blocks until all finish
fn run_comparisons(
    common: Vec<CommonFile>,
    labels: Arc<VersionLabels>,
    config: Arc<CompatConfig>,
    results: ResultSet,
    output: Output,
) -> Result<ExecutionSummary> {
    let bar = output.progress_bar(common.len() as u64, "Comparing jars");
    let mut scheduler = TaskScheduler::new(config.num_threads).with_progress({
        let bar = bar.clone();
        move |done, _total, name| {
            bar.set_position(done as u64);
            bar.set_message(name.to_string());
        }
    });

    for file in common {
        scheduler.add_task(Box::new(CompatibilityCheckTask::new(
            file,
            Arc::clone(&labels),
            Arc::clone(&config),
            results.clone(),
        )));
    }

    let summary = scheduler.execute_all()?;
    scheduler.finalize();
    bar.finish_and_clear();
    Ok(summary)
}
