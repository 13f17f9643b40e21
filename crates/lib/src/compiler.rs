//! The schema compiler seam.
//!
//! [`SchemaCompiler`] is the only way the pipeline talks to a compiler: it receives the
//! complete argument vector and returns an exit status. Nothing else is shared between
//! invocations, so every run is a function of its arguments and the files they name.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use tokio::process::Command;
use tracing::{debug, info};

use crate::consts::{COMPILER_BIN, COMPILER_ENV, WELL_KNOWN_INCLUDE_ENV, WELL_KNOWN_MARKER};
use crate::invocation::{CompileError, CompilerExit};

/// A schema compiler driven by a CLI-style argument vector.
#[allow(async_fn_in_trait)]
pub trait SchemaCompiler {
  /// The value placed in `args[0]`.
  fn selector(&self) -> OsString;

  /// Run the compiler with `args` (selector first) and report its exit status.
  ///
  /// A non-zero status is a normal return; `Err` is reserved for the compiler not
  /// running at all.
  async fn run(&self, args: &[OsString]) -> Result<CompilerExit, CompileError>;
}

/// Runs a `protoc` binary.
///
/// Blocks the calling task until the compiler exits; there is no timeout.
#[derive(Debug, Clone)]
pub struct ProtocCompiler {
  program: PathBuf,
}

impl ProtocCompiler {
  pub fn new(program: impl Into<PathBuf>) -> Self {
    Self {
      program: program.into(),
    }
  }

  pub fn program(&self) -> &Path {
    &self.program
  }
}

impl SchemaCompiler for ProtocCompiler {
  fn selector(&self) -> OsString {
    self.program.as_os_str().to_os_string()
  }

  async fn run(&self, args: &[OsString]) -> Result<CompilerExit, CompileError> {
    let rest = args.get(1..).unwrap_or_default();

    debug!(program = %self.program.display(), "spawning schema compiler");

    let output = Command::new(&self.program)
      .args(rest)
      .output()
      .await
      .map_err(|source| CompileError::Spawn {
        program: self.program.clone(),
        source,
      })?;

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr).trim_end().to_string();

    if !stdout.trim().is_empty() {
      debug!(stdout = %stdout.trim(), "compiler stdout");
    }
    if !stderr.is_empty() {
      debug!(stderr = %stderr, "compiler stderr");
    }

    let code = output.status.code().ok_or_else(|| CompileError::Terminated { args: args.to_vec() })?;

    Ok(CompilerExit {
      code,
      diagnostics: stderr,
    })
  }
}

/// The compiler binary plus the well-known definitions it ships with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toolchain {
  pub compiler: PathBuf,
  pub well_known_include: PathBuf,
}

impl Toolchain {
  /// Resolve both halves of the toolchain. Explicit paths win over lookup.
  pub fn locate(compiler: Option<&Path>, well_known_include: Option<&Path>) -> Result<Self, CompileError> {
    let compiler = locate_compiler(compiler)?;
    let well_known_include = locate_well_known_include(well_known_include, &compiler)?;

    info!(
      compiler = %compiler.display(),
      include = %well_known_include.display(),
      "resolved schema compiler"
    );

    Ok(Self {
      compiler,
      well_known_include,
    })
  }

  pub fn compiler(&self) -> ProtocCompiler {
    ProtocCompiler::new(&self.compiler)
  }
}

/// Find the compiler binary: `explicit`, then `$PROTOC`, then `protoc` on PATH.
pub fn locate_compiler(explicit: Option<&Path>) -> Result<PathBuf, CompileError> {
  if let Some(path) = explicit {
    return check_compiler(path.to_path_buf(), "configured compiler");
  }

  if let Some(path) = std::env::var_os(COMPILER_ENV).filter(|v| !v.is_empty()) {
    return check_compiler(PathBuf::from(path), COMPILER_ENV);
  }

  which::which(COMPILER_BIN).map_err(|_| CompileError::MissingDependency {
    what: format!("{} compiler", COMPILER_BIN),
    hint: format!("install it, put it on PATH, or set {}", COMPILER_ENV),
  })
}

fn check_compiler(path: PathBuf, source: &str) -> Result<PathBuf, CompileError> {
  if path.is_file() {
    return Ok(path);
  }
  // A bare name like "protoc" is looked up on PATH.
  if path.components().count() == 1 {
    if let Ok(found) = which::which(&path) {
      return Ok(found);
    }
  }
  Err(CompileError::MissingDependency {
    what: format!("{} compiler", COMPILER_BIN),
    hint: format!("{} points to {}, which does not exist", source, path.display()),
  })
}

/// Find the bundled well-known definitions directory.
///
/// Candidates, in order: `explicit`, `$PROTOC_INCLUDE`, `<compiler dir>/../include`,
/// `/usr/local/include`, `/usr/include`. Explicit and environment values must contain
/// the well-known marker file; the guessed locations are skipped when they don't.
pub fn locate_well_known_include(explicit: Option<&Path>, compiler: &Path) -> Result<PathBuf, CompileError> {
  if let Some(path) = explicit {
    return check_include(path.to_path_buf(), "configured include path");
  }

  if let Some(path) = std::env::var_os(WELL_KNOWN_INCLUDE_ENV).filter(|v| !v.is_empty()) {
    return check_include(PathBuf::from(path), WELL_KNOWN_INCLUDE_ENV);
  }

  let bundled = compiler
    .parent()
    .and_then(Path::parent)
    .map(|prefix| prefix.join("include"));

  bundled
    .into_iter()
    .chain(system_include_dirs())
    .find(|dir| has_well_known_marker(dir))
    .ok_or_else(|| CompileError::MissingDependency {
      what: "well-known definitions".to_string(),
      hint: format!(
        "no {} found next to {}; set {}",
        WELL_KNOWN_MARKER,
        compiler.display(),
        WELL_KNOWN_INCLUDE_ENV
      ),
    })
}

fn check_include(path: PathBuf, source: &str) -> Result<PathBuf, CompileError> {
  if has_well_known_marker(&path) {
    return Ok(path);
  }
  Err(CompileError::MissingDependency {
    what: "well-known definitions".to_string(),
    hint: format!("{} {} does not contain {}", source, path.display(), WELL_KNOWN_MARKER),
  })
}

fn has_well_known_marker(dir: &Path) -> bool {
  dir.join(WELL_KNOWN_MARKER).is_file()
}

#[cfg(unix)]
fn system_include_dirs() -> Vec<PathBuf> {
  vec![PathBuf::from("/usr/local/include"), PathBuf::from("/usr/include")]
}

#[cfg(not(unix))]
fn system_include_dirs() -> Vec<PathBuf> {
  Vec::new()
}
