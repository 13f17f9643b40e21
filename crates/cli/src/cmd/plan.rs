//! Implementation of the `protogen plan` command.
//!
//! Shows the compiler invocation a build would perform without running it.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Serialize;

use protogen_lib::compiler::Toolchain;
use protogen_lib::pipeline::plan;

use crate::output::{OutputFormat, Status, plan_lines, print_json, status};
use crate::project::ProjectArgs;

#[derive(Debug, Serialize)]
struct PlanSummary {
  args: Vec<String>,
  files: Vec<PathBuf>,
  include_paths: Vec<PathBuf>,
  plugins: Vec<String>,
  output_root: PathBuf,
  staged: bool,
}

pub fn cmd_plan(args: &ProjectArgs, format: OutputFormat) -> Result<()> {
  let project = args.resolve()?;
  let toolchain = Toolchain::locate(project.compiler.as_deref(), project.well_known_include.as_deref())
    .context("Failed to locate schema compiler")?;

  let plan = plan(&toolchain.compiler(), &project.options, &toolchain.well_known_include);

  if format.is_json() {
    return print_json(&PlanSummary {
      args: plan.args.iter().map(|a| a.to_string_lossy().into_owned()).collect(),
      files: plan.spec.definition_files.clone(),
      include_paths: plan.spec.include_paths.clone(),
      plugins: plan.spec.enabled_plugins.iter().map(|p| p.to_string()).collect(),
      output_root: plan.spec.output_root.clone(),
      staged: project.options.staged,
    });
  }

  if plan.spec.definition_files.is_empty() {
    status(
      Status::Warning,
      &format!(
        "No definition files under {}; the compiler would not be run",
        project.options.source_root().display()
      ),
    );
  }

  for line in plan_lines(&plan, project.options.staged) {
    println!("{}", line);
  }

  Ok(())
}
