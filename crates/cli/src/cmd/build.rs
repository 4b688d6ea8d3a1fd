//! Implementation of the build command.
//!
//! Validates the requested build, checks the build tool is installed, runs
//! the pipeline and reports the outcome.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::debug;

use rbuild_lib::pipeline::{PipelineError, PipelineResult, execute};
use rbuild_lib::{
  BuildFailure, BuildLayout, BuildMode, BuildOptions, BuildOutcome, DiagnosticCapture, InvocationError, ProcessRunner,
  StructuredReport, preflight,
};

use crate::output::{
  OutputFormat, format_duration, print_artifact, print_error, print_info, print_json, print_stat, print_success,
  print_warning,
};

/// Exit status after a user interrupt (128 + SIGINT).
const EXIT_INTERRUPTED: u8 = 130;

pub struct BuildArgs {
  pub clean: bool,
  pub test: bool,
  pub check: bool,
  pub document: bool,
  pub debug: bool,
  pub only_run: bool,
  pub target: String,
  pub features: Vec<String>,
  pub cargo: Option<String>,
  pub workspace: Option<PathBuf>,
  pub capture_diagnostics: bool,
}

#[derive(Serialize)]
struct Summary<'a> {
  mode: BuildMode,
  command: &'a str,
  arguments: &'a [String],
  #[serde(skip_serializing_if = "Option::is_none")]
  elapsed_ms: Option<u128>,
  #[serde(skip_serializing_if = "Option::is_none")]
  result: Option<&'a BuildOutcome>,
  skipped: bool,
}

pub fn cmd_build(args: BuildArgs, output: OutputFormat) -> Result<ExitCode> {
  let mode = BuildMode::from_flags(args.clean, args.test, args.check, args.document)?;
  let echo_diagnostics = args.capture_diagnostics;
  let options = BuildOptions::new(mode, args.target)
    .debug(args.debug)
    .only_run(args.only_run)
    .features(args.features);

  let mut layout = BuildLayout::from_env();
  if let Some(cargo) = args.cargo {
    layout = layout.with_tool(cargo);
  }
  if let Some(workspace) = args.workspace {
    layout = layout.with_workspace_dir(workspace);
  }
  if args.capture_diagnostics {
    layout = layout.with_capture(DiagnosticCapture::Capture);
  }

  let resolved = preflight::check(&[layout.tool.as_str()]).context("Missing build prerequisites")?;
  if let Some(tool) = resolved.into_iter().next() {
    layout = layout.with_tool(tool.to_string_lossy());
  }

  let rt = tokio::runtime::Runtime::new().context("Failed to create async runtime")?;
  let result = match rt.block_on(execute(&options, &layout, ProcessRunner::new())) {
    Ok(result) => result,
    Err(err) => match interrupt_exit_code(&err) {
      Some(code) => {
        print_warning("Interrupted");
        return Ok(ExitCode::from(code));
      }
      None => return Err(err).context("Build failed to run"),
    },
  };

  debug!(invocation = %result.invocation(), "pipeline finished");

  match result {
    PipelineResult::Skipped { invocation } => {
      if output.is_json() {
        print_json(&Summary {
          mode,
          command: &invocation.command,
          arguments: &invocation.arguments,
          elapsed_ms: None,
          result: None,
          skipped: true,
        })?;
      } else {
        print_info("Skipping build (--only-run)");
      }
      Ok(ExitCode::SUCCESS)
    }
    PipelineResult::Completed {
      invocation,
      outcome,
      elapsed,
    } => {
      if output.is_json() {
        print_json(&Summary {
          mode,
          command: &invocation.command,
          arguments: &invocation.arguments,
          elapsed_ms: Some(elapsed.as_millis()),
          result: Some(&outcome),
          skipped: false,
        })?;
      }

      match outcome {
        BuildOutcome::Success(report) => {
          if !output.is_json() {
            if echo_diagnostics {
              for rendered in report.rendered() {
                eprint!("{}", rendered);
              }
            }
            print_success(&format!("{} finished in {}", describe(mode), format_duration(elapsed)));
            print_report(&report);
          }
          Ok(ExitCode::SUCCESS)
        }
        BuildOutcome::Failure(failure) => {
          report_failure(&failure);
          Ok(ExitCode::from(failure_exit_code(&failure)))
        }
      }
    }
  }
}

fn describe(mode: BuildMode) -> &'static str {
  match mode {
    BuildMode::Build => "Build",
    BuildMode::Test => "Test build",
    BuildMode::Check => "Check",
    BuildMode::Document => "Documentation",
    BuildMode::Clean => "Clean",
  }
}

fn print_report(report: &StructuredReport) {
  let warnings = report.warning_count();
  if warnings > 0 {
    print_stat("Warnings", &warnings.to_string());
  }
  for executable in report.executables() {
    print_artifact(executable);
  }
}

fn report_failure(failure: &BuildFailure) {
  let message = match failure.exit_code {
    Some(code) => format!("{} (exit code {})", failure.reason, code),
    None => format!("{} (terminated by signal)", failure.reason),
  };
  print_error(&message);

  if !failure.stderr.is_empty() {
    eprint!("{}", failure.stderr_lossy());
  }
}

fn interrupt_exit_code(err: &PipelineError) -> Option<u8> {
  match err {
    PipelineError::Invocation(InvocationError::Interrupted { .. }) => Some(EXIT_INTERRUPTED),
    _ => None,
  }
}

/// The build tool's own exit code when it fits, otherwise 1.
fn failure_exit_code(failure: &BuildFailure) -> u8 {
  match failure.exit_code {
    Some(code) if code != 0 => u8::try_from(code).unwrap_or(1),
    _ => 1,
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use rbuild_lib::FailureReason;

  fn failure(exit_code: Option<i32>) -> BuildFailure {
    BuildFailure {
      reason: FailureReason::BuildFailed,
      exit_code,
      stderr: Vec::new(),
    }
  }

  #[test]
  fn tool_exit_code_is_forwarded() {
    assert_eq!(failure_exit_code(&failure(Some(101))), 101);
  }

  #[test]
  fn unrepresentable_codes_become_failure() {
    assert_eq!(failure_exit_code(&failure(Some(-1))), 1);
    assert_eq!(failure_exit_code(&failure(Some(300))), 1);
    assert_eq!(failure_exit_code(&failure(None)), 1);
  }

  #[test]
  fn interrupt_exits_130() {
    let err = PipelineError::Invocation(InvocationError::Interrupted {
      command: "cargo".to_string(),
    });
    assert_eq!(interrupt_exit_code(&err), Some(130));
  }

  #[test]
  fn other_pipeline_errors_are_not_interrupts() {
    let err = PipelineError::Invocation(InvocationError::Spawn {
      command: "cargo".to_string(),
      source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
    });
    assert_eq!(interrupt_exit_code(&err), None);
  }

  #[test]
  fn parse_failure_with_zero_exit_still_fails() {
    let failure = BuildFailure {
      reason: FailureReason::ReportParseFailed,
      exit_code: Some(0),
      stderr: Vec::new(),
    };
    assert_eq!(failure_exit_code(&failure), 1);
  }
}
