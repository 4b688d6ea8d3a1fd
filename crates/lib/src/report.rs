//! Cargo's machine-readable build report.
//!
//! With `--message-format=json` cargo writes one JSON object per line to
//! stdout, each tagged by `reason`. Only the fields the CLI reports on are
//! typed; unknown fields are ignored and unknown reasons parse as
//! [`BuildMessage::Other`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
  #[error("invalid build report at line {line}: {source}")]
  Parse {
    line: usize,
    #[source]
    source: serde_json::Error,
  },

  #[error("build report is not valid UTF-8: {0}")]
  Encoding(#[from] std::str::Utf8Error),
}

/// The compilation target a message refers to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactTarget {
  pub name: String,
  #[serde(default)]
  pub kind: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
  pub package_id: String,
  pub target: ArtifactTarget,
  #[serde(default)]
  pub filenames: Vec<String>,
  /// Set for binaries and test harnesses.
  #[serde(default)]
  pub executable: Option<String>,
  #[serde(default)]
  pub fresh: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiagnosticLevel {
  Error,
  Warning,
  Note,
  Help,
  FailureNote,
  #[serde(rename = "error: internal compiler error")]
  Ice,
  #[serde(other)]
  Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
  pub level: DiagnosticLevel,
  pub message: String,
  #[serde(default)]
  pub rendered: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompilerMessage {
  pub package_id: String,
  pub message: Diagnostic,
}

/// One line of the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "kebab-case")]
pub enum BuildMessage {
  CompilerArtifact(Artifact),
  CompilerMessage(CompilerMessage),
  BuildScriptExecuted {
    package_id: String,
    #[serde(default)]
    out_dir: Option<String>,
  },
  BuildFinished {
    success: bool,
  },
  #[serde(other)]
  Other,
}

/// All messages from one structured-output run, in the order cargo wrote them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StructuredReport {
  pub messages: Vec<BuildMessage>,
}

impl StructuredReport {
  /// Parse newline-delimited JSON. Blank lines are skipped.
  pub fn parse(stdout: &[u8]) -> Result<Self, ReportError> {
    let text = std::str::from_utf8(stdout)?;
    let mut messages = Vec::new();

    for (idx, line) in text.lines().enumerate() {
      let line = line.trim();
      if line.is_empty() {
        continue;
      }
      let message = serde_json::from_str(line).map_err(|source| ReportError::Parse { line: idx + 1, source })?;
      messages.push(message);
    }

    Ok(Self { messages })
  }

  pub fn is_empty(&self) -> bool {
    self.messages.is_empty()
  }

  pub fn artifacts(&self) -> impl Iterator<Item = &Artifact> {
    self.messages.iter().filter_map(|m| match m {
      BuildMessage::CompilerArtifact(artifact) => Some(artifact),
      _ => None,
    })
  }

  /// Paths of every executable artifact (kernel image, test harnesses).
  pub fn executables(&self) -> impl Iterator<Item = &str> {
    self.artifacts().filter_map(|a| a.executable.as_deref())
  }

  pub fn diagnostics(&self, level: DiagnosticLevel) -> impl Iterator<Item = &Diagnostic> {
    self.messages.iter().filter_map(move |m| match m {
      BuildMessage::CompilerMessage(msg) if msg.message.level == level => Some(&msg.message),
      _ => None,
    })
  }

  pub fn warning_count(&self) -> usize {
    self.diagnostics(DiagnosticLevel::Warning).count()
  }

  pub fn error_count(&self) -> usize {
    self.diagnostics(DiagnosticLevel::Error).count()
  }

  /// Rendered text of every compiler diagnostic, in report order.
  pub fn rendered(&self) -> impl Iterator<Item = &str> {
    self.messages.iter().filter_map(|m| match m {
      BuildMessage::CompilerMessage(msg) => msg.message.rendered.as_deref(),
      _ => None,
    })
  }

  /// The `success` flag of the trailing `build-finished` message, if any.
  pub fn build_finished(&self) -> Option<bool> {
    self.messages.iter().rev().find_map(|m| match m {
      BuildMessage::BuildFinished { success } => Some(*success),
      _ => None,
    })
  }
}
