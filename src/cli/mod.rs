//! Command-line interface for jarcompat
//!
//! Flags are applied as the last configuration layer, on top of the defaults,
//! the config file and the environment.

use anyhow::Result;
use clap::{CommandFactory, Parser};
use serde::Serialize;
use std::path::PathBuf;

pub mod commands;
mod output;

pub use output::Output;

use crate::config::ConfigLoader;
use crate::reports::ReportFormat;

/// Compare the Java APIs of every jar found in two build output trees
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(override_usage = "jarcompat [options] <old-jar-dir> <new-jar-dir>")]
pub struct Cli {
    /// Old and new directories to scan for jars
    #[arg(value_name = "DIR")]
    pub dirs: Vec<PathBuf>,

    /// Number of comparisons run at once
    #[arg(short = 'j', long = "numOfThreads", value_name = "N")]
    pub num_of_threads: Option<String>,

    /// Only compare jars deployed to an Android image partition
    #[arg(short = 'a', long = "androidBuiltOutMode")]
    pub android_built_out_mode: bool,

    /// Where the compliance checker writes compat_reports/
    #[arg(short = 'o', long = "outputDir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Scratch directory for converted jars
    #[arg(short = 't', long = "temp", value_name = "DIR")]
    pub temp: Option<PathBuf>,

    /// URL prefix for report links (e.g. http://ci.example.com/compat)
    #[arg(short = 'u', long = "reportBase", value_name = "URL")]
    pub report_base: Option<String>,

    /// Summary format
    #[arg(short = 'r', long = "reportFormat", value_enum, value_name = "FORMAT")]
    pub report_format: Option<ReportFormat>,

    /// Sections to print, e.g. missing|new|problem|compatible
    #[arg(short = 's', long = "outputSections", value_name = "SECTIONS")]
    pub output_sections: Option<String>,

    /// Omit empty sections and the compatible list
    #[arg(short = 'd', long = "dontReportIfNoIssue")]
    pub dont_report_if_no_issue: bool,

    /// Echo checker output and progress
    #[arg(short, long)]
    pub verbose: bool,

    /// Keep the temporary directory after the run
    #[arg(short = 'k', long = "keep-converted-jars")]
    pub keep_converted_jars: bool,

    /// Configuration file path
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

/// Flag values layered over the loaded configuration. Unset flags are left
/// out so they do not mask lower layers.
#[derive(Debug, Default, Serialize)]
pub struct ConfigOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_threads: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub android_built_out_mode: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temp_dir: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report_base: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report_format: Option<ReportFormat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_sections: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dont_report_if_no_issue: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verbose: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cleanup_temporary: Option<bool>,
}

/// Lenient thread count: leading digits, anything else or zero means 1
pub fn parse_thread_count(text: &str) -> usize {
    let digits: String = text
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse::<usize>().ok().filter(|n| *n > 0).unwrap_or(1)
}

fn flag(set: bool) -> Option<bool> {
    set.then_some(true)
}

impl Cli {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            num_threads: self.num_of_threads.as_deref().map(parse_thread_count),
            android_built_out_mode: flag(self.android_built_out_mode),
            output_dir: self.output_dir.clone(),
            temp_dir: self.temp.clone(),
            report_base: self.report_base.clone(),
            report_format: self.report_format,
            output_sections: self.output_sections.clone(),
            dont_report_if_no_issue: flag(self.dont_report_if_no_issue),
            verbose: flag(self.verbose),
            cleanup_temporary: self.keep_converted_jars.then_some(false),
        }
    }

    /// Execute the comparison
    pub async fn run(self) -> Result<()> {
        if self.dirs.len() < 2 {
            let mut cmd = Cli::command();
            cmd.print_help()?;
            std::process::exit(1);
        }

        let config = ConfigLoader::load(self.config.as_deref())?
            .with_overrides(&self.overrides())
            .extract()?;

        crate::logging::setup_logging(config.verbose);
        let output = Output::new(config.verbose);

        commands::compare::execute(&self.dirs[0], &self.dirs[1], config, &output).await
    }
}
