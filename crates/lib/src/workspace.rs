//! Driving the build tool over a workspace.
//!
//! A build runs the tool twice. The first run streams human-readable progress
//! to the terminal and fails fast. Only if it succeeds is the same command
//! repeated with `--message-format=json`, captured and parsed into a
//! [`StructuredReport`]. Keeping the passes apart means progress output never
//! has to be separated from machine-readable data in one stream.

use std::path::Path;

use tracing::{debug, info, warn};

use crate::config::DiagnosticCapture;
use crate::consts::{DEFAULT_TOOL, MESSAGE_FORMAT_FLAG};
use crate::invoke::{Capture, Invocation, InvocationError, InvocationResult, Runner};
use crate::report::StructuredReport;

pub struct WorkspaceDriver<R> {
  runner: R,
  tool: String,
  capture: DiagnosticCapture,
}

impl<R: Runner> WorkspaceDriver<R> {
  /// Driver for `cargo` that streams the first run.
  pub fn new(runner: R) -> Self {
    Self {
      runner,
      tool: DEFAULT_TOOL.to_string(),
      capture: DiagnosticCapture::Passthrough,
    }
  }

  pub fn with_tool(mut self, tool: impl Into<String>) -> Self {
    self.tool = tool.into();
    self
  }

  pub fn with_capture(mut self, capture: DiagnosticCapture) -> Self {
    self.capture = capture;
    self
  }

  pub fn runner(&self) -> &R {
    &self.runner
  }

  /// Build `subcommand` in `working_directory` and return the parsed report.
  ///
  /// `None` when the first run fails (no second run is attempted) or when the
  /// structured pass does not produce a readable report.
  pub async fn build_workspace(
    &self,
    working_directory: &Path,
    subcommand: &str,
    arguments: &[String],
  ) -> Result<Option<StructuredReport>, InvocationError> {
    let mut args = Vec::with_capacity(arguments.len() + 1);
    args.push(subcommand.to_string());
    args.extend_from_slice(arguments);

    let invocation = Invocation::new(self.tool.clone(), args, working_directory);
    Ok(self.run(&invocation).await?.structured_report)
  }

  /// Run a translated invocation through both passes.
  ///
  /// The returned result carries the first run's exit code (and its stderr
  /// when diagnostics are captured) plus the report from the second run.
  pub async fn run(&self, invocation: &Invocation) -> Result<InvocationResult, InvocationError> {
    let first_capture = match self.capture {
      DiagnosticCapture::Passthrough => Capture::Inherit,
      DiagnosticCapture::Capture => Capture::Output,
    };

    info!(invocation = %invocation, "running build tool");
    let mut first = self.runner.run(invocation, first_capture).await?;

    if !first.success() {
      warn!(exit_code = ?first.exit_code, "build tool failed, skipping structured pass");
      return Ok(first);
    }

    let structured = invocation.with_appended(MESSAGE_FORMAT_FLAG);
    debug!(invocation = %structured, "collecting structured report");
    let second = self.runner.run(&structured, Capture::StdoutOnly).await?;

    first.structured_report = if second.success() {
      match StructuredReport::parse(&second.stdout) {
        Ok(report) => {
          debug!(messages = report.messages.len(), "parsed structured report");
          Some(report)
        }
        Err(err) => {
          warn!(error = %err, "structured report unreadable");
          None
        }
      }
    } else {
      warn!(exit_code = ?second.exit_code, "structured pass failed after a successful build");
      None
    };

    Ok(first)
  }

  /// Single streamed run with no structured pass, for subcommands such as
  /// `clean` that have no JSON output.
  pub async fn run_plain(&self, invocation: &Invocation) -> Result<InvocationResult, InvocationError> {
    info!(invocation = %invocation, "running build tool");
    let capture = match self.capture {
      DiagnosticCapture::Passthrough => Capture::Inherit,
      DiagnosticCapture::Capture => Capture::Output,
    };
    let mut result = self.runner.run(invocation, capture).await?;
    if result.success() {
      result.structured_report = Some(StructuredReport::default());
    }
    Ok(result)
  }
}
