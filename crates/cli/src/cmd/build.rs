//! Implementation of the `protogen build` command.
//!
//! Discovers definition files, runs the schema compiler once with every enabled
//! output generator, and publishes the generated sources into the output root.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;

use protogen_lib::compiler::Toolchain;
use protogen_lib::invocation::CompileError;
use protogen_lib::pipeline::{BuildReport, build};

use crate::output::{OutputFormat, build_report, compiler_failure, print_json};
use crate::project::ProjectArgs;

#[derive(Debug, Serialize)]
struct BuildSummary {
  compiled: bool,
  files: Vec<PathBuf>,
  args: Vec<String>,
  output_root: PathBuf,
  published: Vec<PathBuf>,
  output_hash: Option<String>,
  elapsed_ms: u128,
}

/// Execute the build command.
///
/// On a compiler failure the compiler's diagnostics are written to stderr and the
/// returned error carries the failing argument vector and exit status.
pub fn cmd_build(args: &ProjectArgs, format: OutputFormat) -> Result<()> {
  let project = args.resolve()?;
  let toolchain = Toolchain::locate(project.compiler.as_deref(), project.well_known_include.as_deref())
    .context("Failed to locate schema compiler")?;
  let compiler = toolchain.compiler();

  let rt = tokio::runtime::Runtime::new().context("Failed to create async runtime")?;
  let report = match rt.block_on(build(&compiler, &project.options, &toolchain.well_known_include)) {
    Ok(report) => report,
    Err(err) => {
      if let CompileError::BuildFailure { diagnostics, .. } = &err {
        compiler_failure(diagnostics, &project.options.output_root, project.options.staged);
      }
      return Err(err).context("Build failed");
    }
  };

  if format.is_json() {
    return print_json(&summary(&report, &project.options.output_root));
  }

  build_report(&report, &project.options.output_root, project.options.staged);
  Ok(())
}

fn summary(report: &BuildReport, output_root: &Path) -> BuildSummary {
  BuildSummary {
    compiled: report.result.ran,
    files: report.files.clone(),
    args: report
      .result
      .args
      .iter()
      .map(|a| a.to_string_lossy().into_owned())
      .collect(),
    output_root: output_root.to_path_buf(),
    published: report.published.clone(),
    output_hash: report.output_hash.as_ref().map(|h| h.0.clone()),
    elapsed_ms: report.elapsed.as_millis(),
  }
}
