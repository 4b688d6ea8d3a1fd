//! Test utilities for rbuild-lib.
//!
//! [`StubRunner`] replays scripted results and records every call so tests
//! can assert on how many processes the driver would have spawned and with
//! which arguments.

use std::collections::VecDeque;
use std::sync::Mutex;

use crate::invoke::{Capture, Invocation, InvocationError, InvocationResult, Runner};

/// Returns the shell command and args to execute a shell script.
#[cfg(unix)]
pub fn shell_cmd(script: &str) -> (&'static str, Vec<String>) {
  ("/bin/sh", vec!["-c".to_string(), script.to_string()])
}

#[cfg(windows)]
pub fn shell_cmd(script: &str) -> (&'static str, Vec<String>) {
  ("cmd.exe", vec!["/C".to_string(), script.to_string()])
}

/// One scripted response.
pub enum Scripted {
  Exit { code: i32, stdout: Vec<u8>, stderr: String },
  SpawnFails,
  /// As if Ctrl-C arrived while the child was running.
  Interrupted,
}

impl Scripted {
  pub fn exit(code: i32) -> Self {
    Scripted::Exit {
      code,
      stdout: Vec::new(),
      stderr: String::new(),
    }
  }

  pub fn stdout(code: i32, stdout: &str) -> Self {
    Self::raw_stdout(code, stdout.as_bytes())
  }

  pub fn raw_stdout(code: i32, stdout: &[u8]) -> Self {
    Scripted::Exit {
      code,
      stdout: stdout.to_vec(),
      stderr: String::new(),
    }
  }

  pub fn stderr(code: i32, stderr: &str) -> Self {
    Scripted::Exit {
      code,
      stdout: Vec::new(),
      stderr: stderr.to_string(),
    }
  }
}

/// A recorded call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
  pub invocation: Invocation,
  pub capture: Capture,
}

/// Runner that never spawns anything.
///
/// Responses are consumed in order; once exhausted every call exits 0 with no
/// output.
#[derive(Default)]
pub struct StubRunner {
  responses: Mutex<VecDeque<Scripted>>,
  calls: Mutex<Vec<Call>>,
}

impl StubRunner {
  pub fn new(responses: impl IntoIterator<Item = Scripted>) -> Self {
    Self {
      responses: Mutex::new(responses.into_iter().collect()),
      calls: Mutex::new(Vec::new()),
    }
  }

  pub fn calls(&self) -> Vec<Call> {
    self.calls.lock().unwrap().clone()
  }

  pub fn call_count(&self) -> usize {
    self.calls.lock().unwrap().len()
  }
}

impl Runner for StubRunner {
  async fn run(&self, invocation: &Invocation, capture: Capture) -> Result<InvocationResult, InvocationError> {
    self.calls.lock().unwrap().push(Call {
      invocation: invocation.clone(),
      capture,
    });

    let response = self.responses.lock().unwrap().pop_front().unwrap_or(Scripted::exit(0));
    match response {
      Scripted::Exit { code, stdout, stderr } => Ok(InvocationResult {
        exit_code: Some(code),
        stdout,
        stderr: stderr.into_bytes(),
        structured_report: None,
      }),
      Scripted::SpawnFails => Err(InvocationError::Spawn {
        command: invocation.command.clone(),
        source: std::io::Error::new(std::io::ErrorKind::NotFound, "stubbed spawn failure"),
      }),
      Scripted::Interrupted => Err(InvocationError::Interrupted {
        command: invocation.command.clone(),
      }),
    }
  }
}

/// Two lines of real `cargo build --message-format=json` output plus the
/// closing `build-finished` message.
pub const CARGO_JSON: &str = r#"{"reason":"compiler-message","package_id":"kernel 0.1.0 (path+file:///rustos/src/kernel)","manifest_path":"/rustos/src/kernel/Cargo.toml","target":{"kind":["bin"],"crate_types":["bin"],"name":"kernel","src_path":"/rustos/src/kernel/src/main.rs","edition":"2021","doc":true,"doctest":false,"test":true},"message":{"rendered":"warning: unused variable: `x`\n","$message_type":"diagnostic","children":[],"code":{"code":"unused_variables","explanation":null},"level":"warning","message":"unused variable: `x`","spans":[]}}
{"reason":"compiler-artifact","package_id":"kernel 0.1.0 (path+file:///rustos/src/kernel)","manifest_path":"/rustos/src/kernel/Cargo.toml","target":{"kind":["bin"],"crate_types":["bin"],"name":"kernel","src_path":"/rustos/src/kernel/src/main.rs","edition":"2021","doc":true,"doctest":false,"test":true},"profile":{"opt_level":"3","debuginfo":0,"debug_assertions":false,"overflow_checks":false,"test":false},"features":[],"filenames":["/rustos/src/target/x86_64/release/kernel"],"executable":"/rustos/src/target/x86_64/release/kernel","fresh":false}
{"reason":"build-finished","success":true}
"#;
