//! One build request from options to outcome.
//!
//! Options are translated (and so validated) before anything touches the
//! filesystem or spawns a process.

use std::io::ErrorKind;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{info, instrument};

use crate::config::BuildLayout;
use crate::invoke::{Invocation, InvocationError, Runner};
use crate::options::{BuildMode, BuildOptions, ConfigurationError};
use crate::outcome::{BuildOutcome, interpret_for};
use crate::translate::translate_with;
use crate::workspace::WorkspaceDriver;

#[derive(Debug, Error)]
pub enum PipelineError {
  #[error(transparent)]
  Configuration(#[from] ConfigurationError),

  #[error(transparent)]
  Invocation(#[from] InvocationError),

  #[error("failed to remove build directory {}: {source}", .path.display())]
  Clean {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },
}

#[derive(Debug)]
pub enum PipelineResult {
  /// `--only-run`: the build was not attempted.
  Skipped { invocation: Invocation },
  Completed {
    invocation: Invocation,
    outcome: BuildOutcome,
    elapsed: Duration,
  },
}

impl PipelineResult {
  pub fn invocation(&self) -> &Invocation {
    match self {
      PipelineResult::Skipped { invocation } | PipelineResult::Completed { invocation, .. } => invocation,
    }
  }
}

/// Translate `options`, run the build tool and classify the result.
#[instrument(skip_all, fields(mode = %options.mode(), descriptor = options.target_descriptor()))]
pub async fn execute<R: Runner>(
  options: &BuildOptions,
  layout: &BuildLayout,
  runner: R,
) -> Result<PipelineResult, PipelineError> {
  let invocation = translate_with(options, layout)?;

  if options.is_only_run() {
    info!("only-run requested, skipping build");
    return Ok(PipelineResult::Skipped { invocation });
  }

  let driver = WorkspaceDriver::new(runner)
    .with_tool(layout.tool.clone())
    .with_capture(layout.capture);
  let started = Instant::now();

  let result = match options.mode() {
    BuildMode::Clean => {
      remove_build_dir(layout).await?;
      driver.run_plain(&invocation).await?
    }
    _ => driver.run(&invocation).await?,
  };

  let outcome = interpret_for(options.mode(), result);
  let elapsed = started.elapsed();
  info!(success = outcome.is_success(), elapsed_ms = elapsed.as_millis() as u64, "build finished");

  Ok(PipelineResult::Completed {
    invocation,
    outcome,
    elapsed,
  })
}

async fn remove_build_dir(layout: &BuildLayout) -> Result<(), PipelineError> {
  match tokio::fs::remove_dir_all(&layout.build_dir).await {
    Ok(()) => {
      info!(path = %layout.build_dir.display(), "removed build directory");
      Ok(())
    }
    Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
    Err(source) => Err(PipelineError::Clean {
      path: layout.build_dir.clone(),
      source,
    }),
  }
}
