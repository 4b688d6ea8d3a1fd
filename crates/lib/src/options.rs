//! Validated build intent.
//!
//! A [`BuildOptions`] value is created once per run from user input and never
//! mutated. The mutually exclusive CLI flags collapse into a single
//! [`BuildMode`], so a combination such as "test and document" cannot exist
//! as a value.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Errors raised while validating build options, before any process runs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
  #[error("conflicting build modes: {0} (choose at most one of --clean, --test, --check, --document)")]
  ConflictingModes(String),

  #[error("target descriptor must not be empty")]
  EmptyTargetDescriptor,

  #[error("target descriptor must name a target file, not a path: {0}")]
  TargetDescriptorIsPath(String),

  #[error("feature names must not be empty")]
  EmptyFeature,
}

/// What the build tool is asked to do.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildMode {
  #[default]
  Build,
  /// Compile the test binary without running it.
  Test,
  Check,
  Document,
  Clean,
}

impl BuildMode {
  /// Collapse the CLI flag group into one mode.
  ///
  /// No flag set means [`BuildMode::Build`]; more than one is rejected.
  pub fn from_flags(clean: bool, test: bool, check: bool, document: bool) -> Result<Self, ConfigurationError> {
    let selected: Vec<BuildMode> = [
      (clean, BuildMode::Clean),
      (test, BuildMode::Test),
      (check, BuildMode::Check),
      (document, BuildMode::Document),
    ]
    .into_iter()
    .filter_map(|(set, mode)| set.then_some(mode))
    .collect();

    match selected.as_slice() {
      [] => Ok(BuildMode::Build),
      [mode] => Ok(*mode),
      many => Err(ConfigurationError::ConflictingModes(
        many.iter().map(|m| m.as_str()).collect::<Vec<_>>().join(", "),
      )),
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      BuildMode::Build => "build",
      BuildMode::Test => "test",
      BuildMode::Check => "check",
      BuildMode::Document => "document",
      BuildMode::Clean => "clean",
    }
  }
}

impl fmt::Display for BuildMode {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildOptions {
  mode: BuildMode,
  debug: bool,
  target_descriptor: String,
  features: Vec<String>,
  only_run: bool,
}

impl BuildOptions {
  /// Build options for `target_descriptor` in release mode with no features.
  pub fn new(mode: BuildMode, target_descriptor: impl Into<String>) -> Self {
    Self {
      mode,
      debug: false,
      target_descriptor: target_descriptor.into(),
      features: Vec::new(),
      only_run: false,
    }
  }

  pub fn debug(mut self, debug: bool) -> Self {
    self.debug = debug;
    self
  }

  pub fn only_run(mut self, only_run: bool) -> Self {
    self.only_run = only_run;
    self
  }

  /// Set the feature list. Order is kept; repeated names keep their first
  /// position.
  pub fn features<I, S>(mut self, features: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.features.clear();
    for feature in features {
      let feature = feature.into();
      if !self.features.contains(&feature) {
        self.features.push(feature);
      }
    }
    self
  }

  /// Check the descriptor and feature names.
  ///
  /// [`crate::translate::translate`] calls this too, so options that skip it
  /// still cannot reach the build tool.
  pub fn validate(&self) -> Result<(), ConfigurationError> {
    validate_descriptor(&self.target_descriptor)?;
    if self.features.iter().any(|f| f.trim().is_empty()) {
      return Err(ConfigurationError::EmptyFeature);
    }
    Ok(())
  }

  pub fn mode(&self) -> BuildMode {
    self.mode
  }

  pub fn is_debug(&self) -> bool {
    self.debug
  }

  pub fn target_descriptor(&self) -> &str {
    &self.target_descriptor
  }

  pub fn feature_list(&self) -> &[String] {
    &self.features
  }

  pub fn is_only_run(&self) -> bool {
    self.only_run
  }
}

fn validate_descriptor(descriptor: &str) -> Result<(), ConfigurationError> {
  if descriptor.is_empty() {
    return Err(ConfigurationError::EmptyTargetDescriptor);
  }
  if descriptor.contains(['/', '\\']) {
    return Err(ConfigurationError::TargetDescriptorIsPath(descriptor.to_string()));
  }
  Ok(())
}
