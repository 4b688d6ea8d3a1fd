use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser};
use rbuild_lib::consts::APP_NAME;
use tracing_subscriber::EnvFilter;

mod cmd;
mod output;

use output::{OutputFormat, print_error};

/// rbuild - Builds the RusTOS kernel
#[derive(Parser)]
#[command(name = APP_NAME)]
#[command(author, version, about, long_about = None)]
struct Cli {
  #[command(flatten)]
  mode: ModeFlags,

  /// Build in debug mode (omit the release flag)
  #[arg(long)]
  debug: bool,

  /// Run without re-building
  #[arg(long)]
  only_run: bool,

  /// Target descriptor, resolved to .cargo/<TARGET>.json in the workspace
  #[arg(short, long, default_value = "x86_64")]
  target: String,

  /// Kernel features to enable (repeat or comma-separate)
  #[arg(short = 'F', long = "features", value_delimiter = ',')]
  features: Vec<String>,

  /// Build tool binary [env: RBUILD_CARGO]
  #[arg(long)]
  cargo: Option<String>,

  /// Workspace directory the build tool runs in [env: RBUILD_WORKSPACE]
  #[arg(long)]
  workspace: Option<PathBuf>,

  /// Capture the build tool's diagnostics instead of streaming them.
  /// Failures echo the captured stderr; successful builds echo the
  /// compiler diagnostics from the structured report
  #[arg(long)]
  capture_diagnostics: bool,

  /// Output format
  #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
  output: OutputFormat,

  /// Enable verbose output
  #[arg(short, long)]
  verbose: bool,
}

/// At most one of these may be given.
#[derive(Args)]
#[group(multiple = false)]
struct ModeFlags {
  /// Remove the build artifacts
  #[arg(long)]
  clean: bool,

  /// Compile the kernel test binary without running it
  #[arg(long)]
  test: bool,

  /// Type-check the kernel without producing a binary
  #[arg(long)]
  check: bool,

  /// Generate the kernel documentation
  #[arg(long)]
  document: bool,
}

fn main() -> ExitCode {
  let cli = Cli::parse();

  let default_level = if cli.verbose { "debug" } else { "warn" };
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
    .with_writer(std::io::stderr)
    .without_time()
    .init();

  let args = cmd::BuildArgs {
    clean: cli.mode.clean,
    test: cli.mode.test,
    check: cli.mode.check,
    document: cli.mode.document,
    debug: cli.debug,
    only_run: cli.only_run,
    target: cli.target,
    features: cli.features,
    cargo: cli.cargo,
    workspace: cli.workspace,
    capture_diagnostics: cli.capture_diagnostics,
  };

  match cmd::cmd_build(args, cli.output) {
    Ok(code) => code,
    Err(err) => {
      print_error(&format!("{:#}", err));
      ExitCode::FAILURE
    }
  }
}
