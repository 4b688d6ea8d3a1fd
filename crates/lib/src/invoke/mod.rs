//! Running external commands.
//!
//! [`Runner`] is the seam between build logic and the operating system: the
//! driver only ever talks to a runner, so tests swap in a recording stub and
//! production uses [`ProcessRunner`].

pub mod types;

use std::future::Future;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::process::Command;
use tracing::{debug, trace, warn};

pub use types::{Capture, Invocation, InvocationError, InvocationResult};

/// Executes one [`Invocation`] to completion.
///
/// A non-zero exit is returned as a normal [`InvocationResult`]. Errors are
/// reserved for commands that could not run or were interrupted.
pub trait Runner {
  fn run(
    &self,
    invocation: &Invocation,
    capture: Capture,
  ) -> impl Future<Output = Result<InvocationResult, InvocationError>> + Send;
}

impl<R: Runner> Runner for &R {
  fn run(
    &self,
    invocation: &Invocation,
    capture: Capture,
  ) -> impl Future<Output = Result<InvocationResult, InvocationError>> + Send {
    (**self).run(invocation, capture)
  }
}

/// Spawns real child processes with tokio.
///
/// One child per call, no retries. A Ctrl-C received while the child runs
/// kills it and yields [`InvocationError::Interrupted`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

impl ProcessRunner {
  pub fn new() -> Self {
    Self
  }
}

impl Runner for ProcessRunner {
  async fn run(&self, invocation: &Invocation, capture: Capture) -> Result<InvocationResult, InvocationError> {
    let mut command = Command::new(program(&invocation.command));
    command
      .args(&invocation.arguments)
      .current_dir(&invocation.working_directory)
      .stdin(Stdio::inherit())
      .kill_on_drop(true);

    match capture {
      Capture::Inherit => {
        command.stdout(Stdio::inherit()).stderr(Stdio::inherit());
      }
      Capture::Output => {
        command.stdout(Stdio::piped()).stderr(Stdio::piped());
      }
      Capture::StdoutOnly => {
        command.stdout(Stdio::piped()).stderr(Stdio::null());
      }
    }

    debug!(
      command = %invocation.command,
      args = ?invocation.arguments,
      cwd = %invocation.working_directory.display(),
      ?capture,
      "spawning process"
    );

    let child = command.spawn().map_err(|source| InvocationError::Spawn {
      command: invocation.command.clone(),
      source,
    })?;

    // Dropping the wait future drops the child, which kill_on_drop kills.
    let output = tokio::select! {
      output = child.wait_with_output() => output.map_err(|source| InvocationError::Io {
        command: invocation.command.clone(),
        source,
      })?,
      _ = interrupted() => {
        warn!(command = %invocation.command, "interrupted, killing child process");
        return Err(InvocationError::Interrupted {
          command: invocation.command.clone(),
        });
      }
    };

    let exit_code = output.status.code();
    debug!(command = %invocation.command, exit_code = ?exit_code, "process exited");

    if !output.stderr.is_empty() {
      trace!(stderr = %String::from_utf8_lossy(&output.stderr), "captured stderr");
    }

    Ok(InvocationResult {
      exit_code,
      stdout: output.stdout,
      stderr: output.stderr,
      structured_report: None,
    })
  }
}

/// Relative paths with a directory part resolve against our working
/// directory. The child's `current_dir` would otherwise apply to them.
fn program(command: &str) -> PathBuf {
  let path = Path::new(command);
  if path.is_relative() && path.components().count() > 1 {
    if let Ok(absolute) = std::path::absolute(path) {
      return absolute;
    }
  }
  path.to_path_buf()
}

/// Resolves on Ctrl-C. Never resolves if the handler cannot be installed.
async fn interrupted() {
  if tokio::signal::ctrl_c().await.is_err() {
    std::future::pending::<()>().await;
  }
}
