//! Subprocess execution
//!
//! Thin wrapper over [`std::process::Command`] for the external tools the
//! checker drives. Arguments are passed directly to the program, never through
//! a shell, so paths need no quoting. Standard error is discarded; standard
//! output is decoded as UTF-8 with invalid sequences replaced.

use std::ffi::{OsStr, OsString};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};
use thiserror::Error;

/// Errors raised while running an external tool
#[derive(Error, Debug)]
pub enum ToolError {
    #[error("Failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with {status}")]
    Failed { program: String, status: ExitStatus },

    #[error("Failed to read output of {program}: {source}")]
    Output {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

/// A command line for an external tool
#[derive(Debug, Clone)]
pub struct ToolCommand {
    program: String,
    args: Vec<OsString>,
    current_dir: Option<PathBuf>,
}

impl ToolCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            current_dir: None,
        }
    }

    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args
            .extend(args.into_iter().map(|a| a.as_ref().to_os_string()));
        self
    }

    /// Run the tool with `dir` as its working directory
    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.current_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Human-readable command line for logs
    pub fn display(&self) -> String {
        let mut line = self.program.clone();
        for arg in &self.args {
            line.push(' ');
            line.push_str(&arg.to_string_lossy());
        }
        line
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args).stdin(Stdio::null()).stderr(Stdio::null());
        if let Some(dir) = &self.current_dir {
            cmd.current_dir(dir);
        }
        cmd
    }

    /// Run to completion, discarding output. A non-zero exit is an error.
    pub fn run(&self) -> Result<(), ToolError> {
        tracing::debug!("Executing: {}", self.display());

        let status = self
            .command()
            .stdout(Stdio::null())
            .status()
            .map_err(|source| ToolError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if !status.success() {
            return Err(ToolError::Failed {
                program: self.program.clone(),
                status,
            });
        }

        Ok(())
    }

    /// Run to completion and return standard output as trimmed lines.
    /// A non-zero exit is an error.
    pub fn output_lines(&self) -> Result<Vec<String>, ToolError> {
        tracing::debug!("Executing: {}", self.display());

        let output = self
            .command()
            .stdout(Stdio::piped())
            .output()
            .map_err(|source| ToolError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(ToolError::Failed {
                program: self.program.clone(),
                status: output.status,
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout)
            .lines()
            .map(|line| line.trim().to_string())
            .collect())
    }

    /// Stream standard output line by line into `on_line` while the tool runs.
    ///
    /// The exit status is returned rather than checked: some tools report
    /// findings through a non-zero exit.
    pub fn for_each_line<F>(&self, mut on_line: F) -> Result<ExitStatus, ToolError>
    where
        F: FnMut(&str),
    {
        tracing::debug!("Executing: {}", self.display());

        let mut child = self
            .command()
            .stdout(Stdio::piped())
            .spawn()
            .map_err(|source| ToolError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if let Some(stdout) = child.stdout.take() {
            let mut reader = BufReader::new(stdout);
            let mut buf = Vec::new();
            loop {
                buf.clear();
                let read = reader
                    .read_until(b'\n', &mut buf)
                    .map_err(|source| ToolError::Output {
                        program: self.program.clone(),
                        source,
                    })?;
                if read == 0 {
                    break;
                }
                on_line(String::from_utf8_lossy(&buf).trim());
            }
        }

        child.wait().map_err(|source| ToolError::Output {
            program: self.program.clone(),
            source,
        })
    }
}
