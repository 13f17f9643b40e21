//! Terminal rendering for build reports, plans, and compiler failures.
//!
//! Status lines go to stdout, except failures and warnings which go to stderr so that
//! `--format json` output stays parseable.

use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use clap::ValueEnum;
use owo_colors::{AnsiColors, OwoColorize, Stream};

use protogen_lib::consts::STAGING_PREFIX;
use protogen_lib::invocation::display_args;
use protogen_lib::pipeline::{BuildReport, Plan};

/// How a command writes its result to stdout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
  #[default]
  Text,
  Json,
}

impl OutputFormat {
  pub fn is_json(self) -> bool {
    self == OutputFormat::Json
  }
}

/// Kind of a one-line status message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
  Done,
  Failed,
  Warning,
  Note,
}

impl Status {
  fn symbol(self) -> &'static str {
    match self {
      Status::Done => "✓",
      Status::Failed => "✗",
      Status::Warning => "⚠",
      Status::Note => "•",
    }
  }

  fn color(self) -> AnsiColors {
    match self {
      Status::Done => AnsiColors::Green,
      Status::Failed => AnsiColors::Red,
      Status::Warning => AnsiColors::Yellow,
      Status::Note => AnsiColors::Blue,
    }
  }
}

const BULLET: &str = "→";

pub fn status(kind: Status, message: &str) {
  let color = kind.color();
  match kind {
    Status::Failed | Status::Warning => eprintln!(
      "{} {}",
      kind.symbol().if_supports_color(Stream::Stderr, |s| s.color(color)),
      message.if_supports_color(Stream::Stderr, |s| s.color(color))
    ),
    Status::Done | Status::Note => println!(
      "{} {}",
      kind.symbol().if_supports_color(Stream::Stdout, |s| s.color(color)),
      message
    ),
  }
}

fn field(label: &str, value: &str) {
  println!("  {}: {}", label.if_supports_color(Stream::Stdout, |s| s.dimmed()), value);
}

/// `50ms`, `1.50s`, `1m 5s`.
pub fn format_elapsed(elapsed: Duration) -> String {
  match elapsed.as_secs() {
    0 => format!("{}ms", elapsed.as_millis()),
    secs @ 1..60 => format!("{}.{:02}s", secs, elapsed.subsec_millis() / 10),
    secs => format!("{}m {}s", secs / 60, secs % 60),
  }
}

/// Where the compiler's `--*_out` flags actually point during a build.
pub fn staging_note(output_root: &Path, staged: bool) -> String {
  if staged {
    format!(
      "compiler writes to a hidden {}* sibling of {}, published on success",
      STAGING_PREFIX,
      output_root.display()
    )
  } else {
    format!("off, compiler writes straight into {}", output_root.display())
  }
}

/// Summary of a finished build.
pub fn build_report(report: &BuildReport, output_root: &Path, staged: bool) {
  if !report.result.ran {
    status(Status::Note, "Nothing to compile: no definition files found");
    return;
  }

  status(
    Status::Done,
    &format!("Compiled {} definition file(s)", report.files.len()),
  );
  field("Output", &output_root.display().to_string());
  if staged {
    field("Generated", &format!("{} file(s)", report.published.len()));
  }
  if let Some(hash) = &report.output_hash {
    field("Hash", hash.short());
  }
  field("Time", &format_elapsed(report.elapsed));
}

/// Compiler diagnostics for a failed build, verbatim, followed by where the partial
/// output went.
pub fn compiler_failure(diagnostics: &str, output_root: &Path, staged: bool) {
  if !diagnostics.is_empty() {
    eprintln!("{}", diagnostics);
  }
  if staged {
    status(
      Status::Warning,
      &format!(
        "Output was staged in a {}* directory that has been removed; {} is unchanged",
        STAGING_PREFIX,
        output_root.display()
      ),
    );
  }
}

/// The text form of `protogen plan`.
pub fn plan_lines(plan: &Plan, staged: bool) -> Vec<String> {
  let spec = &plan.spec;
  let mut lines = vec![format!("Files: {}", spec.definition_files.len())];
  lines.extend(
    spec
      .definition_files
      .iter()
      .map(|file| format!("  {} {}", BULLET, file.display())),
  );
  lines.push("Plugins:".to_string());
  lines.extend(
    spec
      .enabled_plugins
      .iter()
      .map(|plugin| format!("  {} {} ({})", BULLET, plugin, plugin.description())),
  );
  lines.push(format!("Output: {}", spec.output_root.display()));
  lines.push(format!("Staging: {}", staging_note(&spec.output_root, staged)));
  lines.push(format!("Command: {}", display_args(&plan.args)));
  lines
}

pub fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
  let json = serde_json::to_string_pretty(value).context("Failed to serialize to JSON")?;
  println!("{}", json);
  Ok(())
}
