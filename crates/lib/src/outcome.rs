//! Classifying a finished build into a terminal outcome.

use std::fmt;

use serde::Serialize;

use crate::invoke::InvocationResult;
use crate::options::BuildMode;
use crate::report::StructuredReport;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailureReason {
  /// The build tool exited non-zero.
  BuildFailed,
  /// The build tool exited non-zero while compiling the test binary.
  TestCompileFailed,
  /// The tool succeeded but its structured report was missing or unreadable.
  ReportParseFailed,
}

impl fmt::Display for FailureReason {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let text = match self {
      FailureReason::BuildFailed => "build failed",
      FailureReason::TestCompileFailed => "test binary failed to compile",
      FailureReason::ReportParseFailed => "build report could not be parsed",
    };
    f.write_str(text)
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildFailure {
  pub reason: FailureReason,
  pub exit_code: Option<i32>,
  /// Empty unless the failing run's diagnostics were captured.
  #[serde(skip)]
  pub stderr: Vec<u8>,
}

impl BuildFailure {
  pub fn stderr_lossy(&self) -> String {
    String::from_utf8_lossy(&self.stderr).into_owned()
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "lowercase")]
pub enum BuildOutcome {
  Success(StructuredReport),
  Failure(BuildFailure),
}

impl BuildOutcome {
  pub fn is_success(&self) -> bool {
    matches!(self, BuildOutcome::Success(_))
  }
}

/// Classify a driver result for a plain build.
pub fn interpret(result: InvocationResult) -> BuildOutcome {
  interpret_for(BuildMode::Build, result)
}

/// Classify a driver result, naming test-binary compile failures as such.
pub fn interpret_for(mode: BuildMode, result: InvocationResult) -> BuildOutcome {
  if !result.success() {
    let reason = match mode {
      BuildMode::Test => FailureReason::TestCompileFailed,
      _ => FailureReason::BuildFailed,
    };
    return BuildOutcome::Failure(BuildFailure {
      reason,
      exit_code: result.exit_code,
      stderr: result.stderr,
    });
  }

  match result.structured_report {
    Some(report) => BuildOutcome::Success(report),
    None => BuildOutcome::Failure(BuildFailure {
      reason: FailureReason::ReportParseFailed,
      exit_code: result.exit_code,
      stderr: result.stderr,
    }),
  }
}
