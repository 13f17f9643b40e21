//! Result and error types for compiler invocations.

use std::ffi::OsString;
use std::path::PathBuf;

use thiserror::Error;

use crate::stage::StageError;

/// Errors raised while locating, running, or publishing a compiler invocation.
#[derive(Debug, Error)]
pub enum CompileError {
  /// The compiler ran and returned a non-zero status.
  #[error("schema compiler failed with exit code {code}: {}", display_args(args))]
  BuildFailure {
    args: Vec<OsString>,
    code: i32,
    diagnostics: String,
  },

  /// The compiler or one of its support files could not be resolved.
  #[error("missing dependency: {what} ({hint})")]
  MissingDependency { what: String, hint: String },

  /// The compiler process could not be started.
  #[error("failed to run {}: {source}", program.display())]
  Spawn {
    program: PathBuf,
    #[source]
    source: std::io::Error,
  },

  /// The compiler was killed before it produced an exit status.
  #[error("schema compiler terminated by signal: {}", display_args(args))]
  Terminated { args: Vec<OsString> },

  #[error("failed to create output directory {}: {source}", path.display())]
  OutputDir {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error(transparent)]
  Stage(#[from] StageError),
}

impl CompileError {
  /// The compiler's exit status, for failures that carry one.
  pub fn exit_code(&self) -> Option<i32> {
    match self {
      CompileError::BuildFailure { code, .. } => Some(*code),
      _ => None,
    }
  }
}

/// Exit status and captured diagnostics of one compiler run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilerExit {
  pub code: i32,
  /// Whatever the compiler wrote to stderr.
  pub diagnostics: String,
}

impl CompilerExit {
  pub fn success() -> Self {
    Self {
      code: 0,
      diagnostics: String::new(),
    }
  }
}

/// Outcome of a single invocation.
///
/// Created the moment the compiler returns. Callers decide whether a non-zero status
/// aborts the build, usually through [`InvocationResult::into_result`].
#[derive(Debug, Clone)]
pub struct InvocationResult {
  /// The full argument vector, selector first.
  pub args: Vec<OsString>,
  pub exit_code: i32,
  pub diagnostics: String,
  /// False when there was nothing to compile and the compiler was not called.
  pub ran: bool,
}

impl InvocationResult {
  pub fn succeeded(&self) -> bool {
    self.exit_code == 0
  }

  /// Turn a non-zero status into [`CompileError::BuildFailure`].
  pub fn into_result(self) -> Result<Self, CompileError> {
    if self.succeeded() {
      return Ok(self);
    }
    Err(CompileError::BuildFailure {
      args: self.args,
      code: self.exit_code,
      diagnostics: self.diagnostics,
    })
  }
}

/// Render an argument vector as a single space-separated line.
pub fn display_args(args: &[OsString]) -> String {
  args
    .iter()
    .map(|a| a.to_string_lossy())
    .collect::<Vec<_>>()
    .join(" ")
}
