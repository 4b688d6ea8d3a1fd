//! rbuild-lib: build orchestration for the RusTOS kernel
//!
//! Turns a build intent into cargo invocations and classifies the result:
//! - `options`: the validated build intent (`BuildOptions`, `BuildMode`)
//! - `translate`: intent to `Invocation`
//! - `workspace`: the two-pass build driver
//! - `outcome`: exit status and report to `BuildOutcome`
//! - `pipeline`: all of the above for one request

pub mod config;
pub mod consts;
pub mod invoke;
pub mod options;
pub mod outcome;
pub mod pipeline;
pub mod preflight;
pub mod report;
pub mod translate;
pub mod util;
pub mod workspace;

pub use config::{BuildLayout, DiagnosticCapture};
pub use invoke::{Capture, Invocation, InvocationError, InvocationResult, ProcessRunner, Runner};
pub use options::{BuildMode, BuildOptions, ConfigurationError};
pub use outcome::{BuildFailure, BuildOutcome, FailureReason, interpret, interpret_for};
pub use pipeline::{PipelineError, PipelineResult, execute};
pub use report::StructuredReport;
pub use translate::{translate, translate_with};
pub use workspace::WorkspaceDriver;
