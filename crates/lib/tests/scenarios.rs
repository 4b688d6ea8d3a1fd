//! End-to-end scenarios through the public API.
//!
//! The stubbed scenarios never spawn a process. The `fake_cargo` scenarios
//! run a shell script standing in for cargo, so the real process runner and
//! the driver are exercised together.

use std::path::Path;
use std::sync::Mutex;

use rbuild_lib::{
  BuildLayout, BuildMode, BuildOptions, BuildOutcome, Capture, ConfigurationError, Invocation, InvocationError,
  InvocationResult, PipelineResult, Runner, WorkspaceDriver, execute, translate,
};

/// Records calls and exits with a fixed code.
struct Recording {
  exit_code: i32,
  calls: Mutex<Vec<Vec<String>>>,
}

impl Recording {
  fn exiting(exit_code: i32) -> Self {
    Self {
      exit_code,
      calls: Mutex::new(Vec::new()),
    }
  }

  fn calls(&self) -> Vec<Vec<String>> {
    self.calls.lock().unwrap().clone()
  }
}

impl Runner for Recording {
  async fn run(&self, invocation: &Invocation, _capture: Capture) -> Result<InvocationResult, InvocationError> {
    self.calls.lock().unwrap().push(invocation.arguments.clone());
    Ok(InvocationResult {
      exit_code: Some(self.exit_code),
      ..Default::default()
    })
  }
}

fn strings(args: &[&str]) -> Vec<String> {
  args.iter().map(|s| s.to_string()).collect()
}

#[test]
fn release_build_arguments() {
  let invocation = translate(&BuildOptions::new(BuildMode::Build, "x86_64")).unwrap();
  assert_eq!(
    invocation.arguments,
    strings(&["build", "--package", "kernel", "--target", ".cargo/x86_64.json", "release"])
  );
}

#[test]
fn debug_test_build_arguments() {
  let options = BuildOptions::new(BuildMode::Test, "riscv64")
    .debug(true)
    .features(["alloc"]);
  let invocation = translate(&options).unwrap();
  assert_eq!(
    invocation.arguments,
    strings(&[
      "test",
      "--package",
      "kernel",
      "--target",
      ".cargo/riscv64.json",
      "--no-run",
      "--features",
      "alloc"
    ])
  );
}

#[test]
fn exclusive_modes_cannot_be_combined() {
  assert!(matches!(
    BuildMode::from_flags(false, true, true, false),
    Err(ConfigurationError::ConflictingModes(_))
  ));
}

#[tokio::test]
async fn failing_tool_is_invoked_once() {
  let driver = WorkspaceDriver::new(Recording::exiting(1));

  let report = driver
    .build_workspace(Path::new("src"), "build", &strings(&["--package", "kernel"]))
    .await
    .unwrap();

  assert!(report.is_none());
  assert_eq!(driver.runner().calls().len(), 1);
}

#[tokio::test]
async fn succeeding_tool_is_invoked_twice() {
  let driver = WorkspaceDriver::new(Recording::exiting(0));
  let args = strings(&["--package", "kernel", "--target", ".cargo/x86_64.json", "--features", "a,b"]);

  driver.build_workspace(Path::new("src"), "build", &args).await.unwrap();

  let calls = driver.runner().calls();
  assert_eq!(calls.len(), 2);
  let mut expected = calls[0].clone();
  expected.push("--message-format=json".to_string());
  assert_eq!(calls[1], expected);
}

#[tokio::test]
async fn invalid_descriptor_never_reaches_runner() {
  for descriptor in ["", "sub/dir"] {
    let runner = Recording::exiting(0);
    let result = execute(
      &BuildOptions::new(BuildMode::Build, descriptor),
      &BuildLayout::default(),
      &runner,
    )
    .await;
    assert!(result.is_err());
    assert!(runner.calls().is_empty());
  }
}

#[cfg(unix)]
mod fake_cargo {
  use super::*;
  use rbuild_lib::{FailureReason, ProcessRunner};
  use std::os::unix::fs::PermissionsExt;
  use std::path::PathBuf;
  use tempfile::TempDir;

  /// A cargo stand-in that logs its arguments and, when asked for JSON,
  /// prints a minimal report.
  const SCRIPT: &str = r#"#!/bin/sh
echo "$@" >> "$(dirname "$0")/calls.log"
if [ -f "$(dirname "$0")/fail" ]; then
  echo "error: could not compile \`kernel\`" >&2
  exit 101
fi
for arg in "$@"; do
  if [ "$arg" = "--message-format=json" ]; then
    echo '{"reason":"compiler-artifact","package_id":"kernel 0.1.0","target":{"name":"kernel","kind":["bin"]},"filenames":["target/kernel"],"executable":"target/kernel","fresh":true}'
    echo '{"reason":"build-finished","success":true}'
    exit 0
  fi
done
echo "   Compiling kernel v0.1.0"
"#;

  struct Project {
    _temp: TempDir,
    tool: PathBuf,
    workspace: PathBuf,
    log: PathBuf,
  }

  fn project() -> Project {
    let temp = TempDir::new().unwrap();
    let bin = temp.path().join("bin");
    let workspace = temp.path().join("src");
    std::fs::create_dir_all(&bin).unwrap();
    std::fs::create_dir_all(&workspace).unwrap();

    let tool = bin.join("cargo");
    std::fs::write(&tool, SCRIPT).unwrap();
    std::fs::set_permissions(&tool, std::fs::Permissions::from_mode(0o755)).unwrap();

    Project {
      log: bin.join("calls.log"),
      _temp: temp,
      tool,
      workspace,
    }
  }

  fn logged_calls(project: &Project) -> Vec<String> {
    std::fs::read_to_string(&project.log)
      .unwrap_or_default()
      .lines()
      .map(str::to_string)
      .collect()
  }

  #[tokio::test]
  async fn build_collects_report_from_second_run() {
    let project = project();
    let layout = BuildLayout::default()
      .with_tool(project.tool.to_string_lossy())
      .with_workspace_dir(&project.workspace);

    let result = execute(&BuildOptions::new(BuildMode::Build, "x86_64"), &layout, ProcessRunner)
      .await
      .unwrap();

    match result {
      PipelineResult::Completed {
        outcome: BuildOutcome::Success(report),
        ..
      } => {
        assert_eq!(report.executables().collect::<Vec<_>>(), vec!["target/kernel"]);
        assert_eq!(report.build_finished(), Some(true));
      }
      other => panic!("unexpected result: {:?}", other),
    }

    assert_eq!(
      logged_calls(&project),
      vec![
        "build --package kernel --target .cargo/x86_64.json release".to_string(),
        "build --package kernel --target .cargo/x86_64.json release --message-format=json".to_string(),
      ]
    );
  }

  #[tokio::test]
  async fn failing_build_stops_after_first_run() {
    let project = project();
    std::fs::write(project.tool.with_file_name("fail"), "").unwrap();
    let layout = BuildLayout::default()
      .with_tool(project.tool.to_string_lossy())
      .with_workspace_dir(&project.workspace);

    let result = execute(&BuildOptions::new(BuildMode::Test, "x86_64"), &layout, ProcessRunner)
      .await
      .unwrap();

    match result {
      PipelineResult::Completed {
        outcome: BuildOutcome::Failure(failure),
        ..
      } => {
        assert_eq!(failure.reason, FailureReason::TestCompileFailed);
        assert_eq!(failure.exit_code, Some(101));
      }
      other => panic!("unexpected result: {:?}", other),
    }
    assert_eq!(logged_calls(&project).len(), 1);
  }
}
