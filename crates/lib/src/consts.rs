//! Fixed names shared by the translator, driver and CLI.

/// Binary name shown in help and version output.
pub const APP_NAME: &str = "rbuild";

/// Build tool used when nothing overrides it.
pub const DEFAULT_TOOL: &str = "cargo";

/// Package selected in every kernel invocation.
pub const KERNEL_PACKAGE: &str = "kernel";

/// Directory holding the source workspace, relative to the project root.
pub const WORKSPACE_DIR: &str = "src";

/// Directory (relative to the workspace) holding one descriptor per target.
pub const TARGET_CONFIG_DIR: &str = ".cargo";

pub const TARGET_EXTENSION: &str = "json";

/// Output directory removed by `--clean`.
pub const BUILD_DIR: &str = "build";

pub const PACKAGE_FLAG: &str = "--package";
pub const TARGET_FLAG: &str = "--target";
pub const RELEASE_FLAG: &str = "release";
pub const NO_RUN_FLAG: &str = "--no-run";
pub const FEATURES_FLAG: &str = "--features";
pub const MESSAGE_FORMAT_FLAG: &str = "--message-format=json";

/// Environment overrides for [`crate::config::BuildLayout`].
pub const ENV_TOOL: &str = "RBUILD_CARGO";
pub const ENV_WORKSPACE: &str = "RBUILD_WORKSPACE";
pub const ENV_BUILD_DIR: &str = "RBUILD_BUILD_DIR";
