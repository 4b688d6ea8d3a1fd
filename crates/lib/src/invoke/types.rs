//! Types for running external commands.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

use crate::report::StructuredReport;

/// A single external command, fully resolved.
///
/// The first argument is the build-tool subcommand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Invocation {
  pub command: String,
  pub arguments: Vec<String>,
  pub working_directory: PathBuf,
}

impl Invocation {
  pub fn new(command: impl Into<String>, arguments: Vec<String>, working_directory: impl Into<PathBuf>) -> Self {
    Self {
      command: command.into(),
      arguments,
      working_directory: working_directory.into(),
    }
  }

  /// The build-tool subcommand (`build`, `test`, ...), if any.
  pub fn subcommand(&self) -> Option<&str> {
    self.arguments.first().map(String::as_str)
  }

  /// Arguments after the subcommand.
  pub fn flags(&self) -> &[String] {
    self.arguments.get(1..).unwrap_or(&[])
  }

  /// Same command with one more argument appended last.
  pub fn with_appended(&self, argument: &str) -> Self {
    let mut arguments = self.arguments.clone();
    arguments.push(argument.to_string());
    Self {
      command: self.command.clone(),
      arguments,
      working_directory: self.working_directory.clone(),
    }
  }
}

impl fmt::Display for Invocation {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.command)?;
    for arg in &self.arguments {
      write!(f, " {}", arg)?;
    }
    Ok(())
  }
}

/// How the child's standard streams are wired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capture {
  /// Inherit the caller's terminal; nothing is captured.
  Inherit,
  /// Capture stdout and stderr.
  Output,
  /// Capture stdout; discard stderr.
  StdoutOnly,
}

/// What a finished command left behind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvocationResult {
  /// `None` when the process was terminated by a signal.
  pub exit_code: Option<i32>,
  pub stdout: Vec<u8>,
  pub stderr: Vec<u8>,
  /// Present only when the structured-output pass ran and parsed.
  pub structured_report: Option<StructuredReport>,
}

impl InvocationResult {
  pub fn success(&self) -> bool {
    self.exit_code == Some(0)
  }

  pub fn stderr_lossy(&self) -> String {
    String::from_utf8_lossy(&self.stderr).into_owned()
  }
}

/// Failures to run a command at all. A non-zero exit is not one of these.
#[derive(Debug, Error)]
pub enum InvocationError {
  /// The command could not be located or started.
  #[error("failed to spawn '{command}': {source}")]
  Spawn {
    command: String,
    #[source]
    source: std::io::Error,
  },

  /// The user interrupted the run; the child was killed.
  #[error("interrupted while running '{command}'")]
  Interrupted { command: String },

  /// I/O error while waiting on or reading from the child.
  #[error("io error while running '{command}': {source}")]
  Io {
    command: String,
    #[source]
    source: std::io::Error,
  },
}
