//! The build pipeline.
//!
//! Discovery feeds straight into a single compiler invocation:
//! 1. Find the definition files under the source root
//! 2. Assemble the invocation (well-known includes, project includes, outputs, files)
//! 3. Run the compiler, into a staging directory unless in-place output was requested
//! 4. Publish staged output and fingerprint the output root

use std::collections::{BTreeMap, BTreeSet};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::compiler::SchemaCompiler;
use crate::consts::DEFAULT_EXTENSION;
use crate::discover::find_definitions;
use crate::invocation::{CompileError, InvocationResult, InvocationSpec, build_args, invoke};
use crate::plugin::Plugin;
use crate::stage::Staging;
use crate::util::hash::{ContentHash, HASH_EXCLUDE, hash_directory};

/// What to compile and where to put it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOptions {
  /// Root of the project's definitions, passed to the compiler as an include path.
  pub input_root: PathBuf,
  /// Where to look for definition files. Defaults to `input_root`.
  pub source_root: Option<PathBuf>,
  pub output_root: PathBuf,
  /// Definition file extension, without the leading dot.
  pub extension: String,
  pub plugins: BTreeSet<Plugin>,
  pub plugin_paths: BTreeMap<Plugin, PathBuf>,
  /// Include paths searched after the well-known definitions and `input_root`.
  pub extra_includes: Vec<PathBuf>,
  /// Compile into a staging directory and publish only on success.
  pub staged: bool,
}

impl BuildOptions {
  pub fn new(input_root: impl Into<PathBuf>, output_root: impl Into<PathBuf>) -> Self {
    Self {
      input_root: input_root.into(),
      source_root: None,
      output_root: output_root.into(),
      extension: DEFAULT_EXTENSION.to_string(),
      plugins: Plugin::ALL.into_iter().collect(),
      plugin_paths: BTreeMap::new(),
      extra_includes: Vec::new(),
      staged: true,
    }
  }

  pub fn source_root(&self) -> &Path {
    self.source_root.as_deref().unwrap_or(&self.input_root)
  }

  /// Definition files under the source root, sorted.
  pub fn discover(&self) -> Vec<PathBuf> {
    find_definitions(self.source_root(), &self.extension)
  }

  /// The invocation these options describe for `files`.
  pub fn spec(&self, files: Vec<PathBuf>, well_known_include: &Path) -> InvocationSpec {
    let spec = self
      .extra_includes
      .iter()
      .fold(
        InvocationSpec::new(&self.input_root, &self.output_root, files, well_known_include),
        |spec, include| spec.with_include(include),
      )
      .with_plugins(self.plugins.iter().copied());

    self
      .plugin_paths
      .iter()
      .fold(spec, |spec, (plugin, exe)| spec.with_plugin_path(*plugin, exe))
  }
}

/// A dry run: what would be passed to the compiler.
#[derive(Debug, Clone)]
pub struct Plan {
  pub spec: InvocationSpec,
  pub args: Vec<OsString>,
}

/// Summary of a successful build.
#[derive(Debug, Clone)]
pub struct BuildReport {
  pub result: InvocationResult,
  /// Definition files handed to the compiler.
  pub files: Vec<PathBuf>,
  /// Files moved from staging into the output root, relative to it. Empty for
  /// in-place builds.
  pub published: Vec<PathBuf>,
  /// Fingerprint of the output root after the build. `None` when the root does not
  /// exist or could not be read in full.
  pub output_hash: Option<ContentHash>,
  pub elapsed: Duration,
}

/// Discover files and assemble the invocation without running anything.
pub fn plan<C: SchemaCompiler>(compiler: &C, options: &BuildOptions, well_known_include: &Path) -> Plan {
  let spec = options.spec(options.discover(), well_known_include);
  let args = build_args(&spec, &compiler.selector());
  Plan { spec, args }
}

/// Run the full pipeline once.
///
/// A non-zero compiler status is returned as [`CompileError::BuildFailure`]. With
/// staging enabled the output root is only touched after the compiler succeeded; with
/// in-place output a failure may leave a mix of old, new, and missing files behind, and
/// re-running is the way to recover.
pub async fn build<C: SchemaCompiler>(
  compiler: &C,
  options: &BuildOptions,
  well_known_include: &Path,
) -> Result<BuildReport, CompileError> {
  let started = Instant::now();

  let files = options.discover();
  info!(
    root = %options.source_root().display(),
    count = files.len(),
    "found definition files"
  );
  for file in &files {
    debug!(file = %file.display(), "definition file");
  }

  let spec = options.spec(files.clone(), well_known_include);

  let (result, published) = if options.staged && !files.is_empty() {
    let staging = Staging::new(&options.output_root)?;
    let staged = spec.with_output_root(staging.path());
    // On failure the staging directory is dropped, discarding partial output.
    let result = invoke(compiler, &staged).await?.into_result()?;
    let published = staging.publish()?;
    (result, published)
  } else {
    let result = invoke(compiler, &spec).await?.into_result()?;
    (result, Vec::new())
  };

  let output_hash = fingerprint(&options.output_root);

  let elapsed = started.elapsed();
  info!(
    output = %options.output_root.display(),
    published = published.len(),
    elapsed_ms = elapsed.as_millis() as u64,
    "build complete"
  );

  Ok(BuildReport {
    result,
    files,
    published,
    output_hash,
    elapsed,
  })
}

/// Hash the output root for the report.
///
/// The compiler has already succeeded at this point, so an unreadable entry only costs
/// the fingerprint, never the build.
fn fingerprint(output_root: &Path) -> Option<ContentHash> {
  if !output_root.is_dir() {
    return None;
  }
  match hash_directory(output_root, HASH_EXCLUDE) {
    Ok(hash) => Some(hash),
    Err(err) => {
      warn!(output = %output_root.display(), error = %err, "could not fingerprint output root");
      None
    }
  }
}
