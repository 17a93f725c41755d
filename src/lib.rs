//! # jarcompat - Java API compatibility across two builds
//!
//! Finds every jar in an old and a new build output tree, runs
//! `japi-compliance-checker` on each jar present in both (several at a time),
//! and prints a summary of missing, new, problematic and fully compatible jars
//! as markdown, CSV or plain text.
//!
//! ## Quick Start
//!
//! ```bash
//! jarcompat -j 8 -o reports out/old/system out/new/system
//!
//! # Android build output: deployed jars only, dex converted to classes
//! jarcompat -a -r csv -d old_build new_build
//! ```

pub mod analysis;
pub mod cli;
pub mod compat;
pub mod config;
pub mod external;
pub mod logging;
pub mod parallel;
pub mod reports;
pub mod utils;

pub use cli::{Cli, Output};
pub use config::CompatConfig;
