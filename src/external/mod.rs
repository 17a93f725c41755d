//! External tool integration
//!
//! This module drives the command-line tools the checker depends on:
//! `unzip`/`zip` for archive handling, a dex-to-jar converter for Android
//! archives, and the API compliance checker itself.

pub mod android;
pub mod exec;

pub use android::{DexConverter, filter_to_deployed_only, is_deployed_artifact};
pub use exec::{ToolCommand, ToolError};
