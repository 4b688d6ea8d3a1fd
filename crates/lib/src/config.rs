//! Filesystem layout and toolchain selection.
//!
//! Every fixed name the translator and driver depend on lives in a
//! [`BuildLayout`], so tests and the CLI can point the pipeline at a stub
//! build tool or a scratch workspace without touching process-wide state.

use std::path::PathBuf;

use tracing::debug;

use crate::consts::{
  BUILD_DIR, DEFAULT_TOOL, ENV_BUILD_DIR, ENV_TOOL, ENV_WORKSPACE, KERNEL_PACKAGE, TARGET_CONFIG_DIR, TARGET_EXTENSION,
  WORKSPACE_DIR,
};

/// How the first (human-readable) build-tool run treats its diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DiagnosticCapture {
  /// Stream straight to the terminal. The failing run's stderr is not kept.
  #[default]
  Passthrough,
  /// Capture stdout and stderr so a failure can carry the tool's diagnostics.
  Capture,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildLayout {
  /// Build tool binary (name on `PATH` or a path).
  pub tool: String,
  /// Directory the build tool runs in.
  pub workspace_dir: PathBuf,
  /// Target descriptor directory, relative to `workspace_dir`.
  pub target_config_dir: PathBuf,
  pub target_extension: String,
  pub package: String,
  /// Output directory removed on clean, relative to the project root.
  pub build_dir: PathBuf,
  pub capture: DiagnosticCapture,
}

impl Default for BuildLayout {
  fn default() -> Self {
    Self {
      tool: DEFAULT_TOOL.to_string(),
      workspace_dir: PathBuf::from(WORKSPACE_DIR),
      target_config_dir: PathBuf::from(TARGET_CONFIG_DIR),
      target_extension: TARGET_EXTENSION.to_string(),
      package: KERNEL_PACKAGE.to_string(),
      build_dir: PathBuf::from(BUILD_DIR),
      capture: DiagnosticCapture::default(),
    }
  }
}

impl BuildLayout {
  /// Default layout with `RBUILD_CARGO`, `RBUILD_WORKSPACE` and
  /// `RBUILD_BUILD_DIR` applied when set and non-empty.
  pub fn from_env() -> Self {
    let mut layout = Self::default();

    if let Some(tool) = env_override(ENV_TOOL) {
      layout.tool = tool;
    }
    if let Some(dir) = env_override(ENV_WORKSPACE) {
      layout.workspace_dir = PathBuf::from(dir);
    }
    if let Some(dir) = env_override(ENV_BUILD_DIR) {
      layout.build_dir = PathBuf::from(dir);
    }

    debug!(tool = %layout.tool, workspace = %layout.workspace_dir.display(), "resolved build layout");
    layout
  }

  pub fn with_tool(mut self, tool: impl Into<String>) -> Self {
    self.tool = tool.into();
    self
  }

  pub fn with_workspace_dir(mut self, dir: impl Into<PathBuf>) -> Self {
    self.workspace_dir = dir.into();
    self
  }

  pub fn with_build_dir(mut self, dir: impl Into<PathBuf>) -> Self {
    self.build_dir = dir.into();
    self
  }

  pub fn with_capture(mut self, capture: DiagnosticCapture) -> Self {
    self.capture = capture;
    self
  }

  /// Path of a target descriptor as passed to `--target`.
  ///
  /// Relative to the workspace directory, e.g. `.cargo/x86_64.json`. Always
  /// joined with `/` so the argument list is identical on every host.
  pub fn target_path(&self, descriptor: &str) -> String {
    let dir = self.target_config_dir.to_string_lossy();
    let file = format!("{}.{}", descriptor, self.target_extension);
    if dir.is_empty() {
      file
    } else {
      format!("{}/{}", dir.trim_end_matches(['/', '\\']), file)
    }
  }

  /// Location of a target descriptor on disk.
  pub fn target_file(&self, descriptor: &str) -> PathBuf {
    self
      .workspace_dir
      .join(&self.target_config_dir)
      .join(format!("{}.{}", descriptor, self.target_extension))
  }
}

fn env_override(var: &str) -> Option<String> {
  std::env::var(var).ok().filter(|v| !v.is_empty())
}
