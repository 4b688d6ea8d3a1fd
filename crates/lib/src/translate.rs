//! Mapping a build intent onto a cargo command line.
//!
//! Translation is pure: the same [`BuildOptions`] and [`BuildLayout`] always
//! yield the same [`Invocation`], argument for argument.

use tracing::debug;

use crate::config::BuildLayout;
use crate::consts::{FEATURES_FLAG, NO_RUN_FLAG, PACKAGE_FLAG, RELEASE_FLAG, TARGET_FLAG};
use crate::invoke::Invocation;
use crate::options::{BuildMode, BuildOptions, ConfigurationError};

/// Translate with the default layout (`cargo` in `src`).
pub fn translate(options: &BuildOptions) -> Result<Invocation, ConfigurationError> {
  translate_with(options, &BuildLayout::default())
}

/// Produce the build-tool invocation for `options`.
///
/// Argument order: subcommand, `--package <pkg>`, `--target <file>`,
/// the release flag unless debugging, mode flags, then `--features`.
pub fn translate_with(options: &BuildOptions, layout: &BuildLayout) -> Result<Invocation, ConfigurationError> {
  options.validate()?;

  let mut args = vec![
    PACKAGE_FLAG.to_string(),
    layout.package.clone(),
    TARGET_FLAG.to_string(),
    layout.target_path(options.target_descriptor()),
  ];

  if !options.is_debug() {
    args.push(RELEASE_FLAG.to_string());
  }

  let subcommand = match options.mode() {
    BuildMode::Test => {
      args.push(NO_RUN_FLAG.to_string());
      "test"
    }
    BuildMode::Check => "check",
    BuildMode::Document => "doc",
    BuildMode::Clean => "clean",
    BuildMode::Build => "build",
  };

  // cargo clean rejects --features
  if options.mode() != BuildMode::Clean && !options.feature_list().is_empty() {
    args.push(FEATURES_FLAG.to_string());
    args.push(options.feature_list().join(","));
  }

  let mut arguments = Vec::with_capacity(args.len() + 1);
  arguments.push(subcommand.to_string());
  arguments.extend(args);

  let invocation = Invocation::new(layout.tool.clone(), arguments, layout.workspace_dir.clone());
  debug!(mode = %options.mode(), invocation = %invocation, "translated build options");
  Ok(invocation)
}
