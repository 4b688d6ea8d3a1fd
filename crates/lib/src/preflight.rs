//! Startup precondition: required helper tools must be installed.
//!
//! Runs once before any build logic and reports what is missing instead of
//! exiting, so callers decide how to fail.

use std::path::PathBuf;

use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum PreflightError {
  #[error("required tool '{tool}' was not found on PATH")]
  MissingTool {
    tool: String,
    #[source]
    source: which::Error,
  },
}

/// Resolve every tool in `tools`, returning their paths in the same order.
///
/// Names containing a path separator are checked as paths; bare names are
/// searched on `PATH`. Stops at the first missing tool.
pub fn check<S: AsRef<str>>(tools: &[S]) -> Result<Vec<PathBuf>, PreflightError> {
  tools
    .iter()
    .map(|tool| {
      let tool = tool.as_ref();
      let path = which::which(tool).map_err(|source| PreflightError::MissingTool {
        tool: tool.to_string(),
        source,
      })?;
      debug!(tool, path = %path.display(), "found required tool");
      Ok(path)
    })
    .collect()
}
