//! Compiler invocation.
//!
//! An [`InvocationSpec`] describes one compiler run: which files, which include paths,
//! which output generators and where they write. [`build_args`] turns it into the exact
//! argument vector and [`invoke`] hands that vector to a [`SchemaCompiler`].

mod types;

use std::collections::{BTreeMap, BTreeSet};
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::compiler::SchemaCompiler;
use crate::plugin::Plugin;

pub use types::{CompileError, CompilerExit, InvocationResult, display_args};

/// Everything needed to assemble one compiler invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationSpec {
  /// Root of the project's own definitions, passed as an include path.
  pub input_root: PathBuf,
  /// Directory every enabled generator writes into.
  pub output_root: PathBuf,
  /// Passed verbatim as trailing positional arguments.
  pub definition_files: Vec<PathBuf>,
  /// Searched in order; the well-known definitions come first, then `input_root`.
  pub include_paths: Vec<PathBuf>,
  pub enabled_plugins: BTreeSet<Plugin>,
  /// Explicit generator executables, for generators not built into the compiler.
  pub plugin_paths: BTreeMap<Plugin, PathBuf>,
}

impl InvocationSpec {
  /// Create a spec with every plugin enabled and the mandatory include paths
  /// `[well_known_include, input_root]`.
  pub fn new(
    input_root: impl Into<PathBuf>,
    output_root: impl Into<PathBuf>,
    definition_files: Vec<PathBuf>,
    well_known_include: impl Into<PathBuf>,
  ) -> Self {
    let input_root = input_root.into();
    Self {
      include_paths: vec![well_known_include.into(), input_root.clone()],
      input_root,
      output_root: output_root.into(),
      definition_files,
      enabled_plugins: Plugin::ALL.into_iter().collect(),
      plugin_paths: BTreeMap::new(),
    }
  }

  /// Append an include path after the mandatory ones.
  pub fn with_include(mut self, path: impl Into<PathBuf>) -> Self {
    self.include_paths.push(path.into());
    self
  }

  pub fn with_plugins(mut self, plugins: impl IntoIterator<Item = Plugin>) -> Self {
    self.enabled_plugins = plugins.into_iter().collect();
    self
  }

  pub fn with_plugin_path(mut self, plugin: Plugin, executable: impl Into<PathBuf>) -> Self {
    self.plugin_paths.insert(plugin, executable.into());
    self
  }

  /// Same invocation, writing somewhere else.
  pub fn with_output_root(mut self, output_root: impl Into<PathBuf>) -> Self {
    self.output_root = output_root.into();
    self
  }
}

/// Assemble the argument vector for `spec`.
///
/// Layout: the selector, one `--proto_path` per include path in order, one output flag
/// per enabled plugin in canonical order, `--plugin` flags for explicitly located
/// generators, then the definition files exactly as given.
pub fn build_args(spec: &InvocationSpec, selector: &OsStr) -> Vec<OsString> {
  let mut args = Vec::new();

  args.push(selector.to_os_string());
  args.extend(spec.include_paths.iter().map(|p| include_flag(p)));
  args.extend(spec.enabled_plugins.iter().map(|p| p.output_flag(&spec.output_root)));
  args.extend(
    spec
      .enabled_plugins
      .iter()
      .filter_map(|p| spec.plugin_paths.get(p).map(|exe| p.executable_flag(exe))),
  );
  args.extend(spec.definition_files.iter().map(|f| f.as_os_str().to_os_string()));

  args
}

fn include_flag(path: &Path) -> OsString {
  let mut flag = OsString::from("--proto_path=");
  flag.push(path.as_os_str());
  flag
}

/// Run the compiler once for `spec`.
///
/// With no definition files the compiler is not called and a successful result with
/// `ran == false` is returned. Otherwise `output_root` is created and the compiler's
/// exit status is reported as-is; a non-zero status is not an error at this level.
pub async fn invoke<C: SchemaCompiler>(compiler: &C, spec: &InvocationSpec) -> Result<InvocationResult, CompileError> {
  let args = build_args(spec, &compiler.selector());

  if spec.definition_files.is_empty() {
    warn!(input_root = %spec.input_root.display(), "no definition files found, nothing to compile");
    return Ok(InvocationResult {
      args,
      exit_code: 0,
      diagnostics: String::new(),
      ran: false,
    });
  }

  tokio::fs::create_dir_all(&spec.output_root)
    .await
    .map_err(|source| CompileError::OutputDir {
      path: spec.output_root.clone(),
      source,
    })?;

  info!(
    files = spec.definition_files.len(),
    plugins = spec.enabled_plugins.len(),
    output = %spec.output_root.display(),
    "invoking schema compiler"
  );
  debug!(args = %display_args(&args), "compiler arguments");

  let exit = compiler.run(&args).await?;

  if exit.code == 0 {
    debug!("schema compiler succeeded");
  } else {
    warn!(code = exit.code, "schema compiler failed");
  }

  Ok(InvocationResult {
    args,
    exit_code: exit.code,
    diagnostics: exit.diagnostics,
    ran: true,
  })
}
