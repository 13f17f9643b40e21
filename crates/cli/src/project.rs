//! Resolution of project settings from `protogen.toml` and command-line flags.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use tracing::debug;

use protogen_lib::config::Config;
use protogen_lib::consts::CONFIG_FILENAME;
use protogen_lib::pipeline::BuildOptions;
use protogen_lib::plugin::Plugin;

/// Flags shared by every command. Flags win over the config file.
#[derive(Debug, Default, Args)]
pub struct ProjectArgs {
  /// Config file (default: ./protogen.toml if present)
  #[arg(short, long)]
  pub config: Option<PathBuf>,

  /// Root of the project's definitions, passed to the compiler as an include path
  #[arg(short, long)]
  pub input_root: Option<PathBuf>,

  /// Directory searched for definition files (default: the input root)
  #[arg(short, long)]
  pub source_root: Option<PathBuf>,

  /// Directory the generated sources are written to
  #[arg(short, long)]
  pub output_root: Option<PathBuf>,

  /// Output generator to enable; repeatable (default: all)
  #[arg(short, long = "plugin", value_delimiter = ',', value_parser = parse_plugin)]
  pub plugins: Vec<Plugin>,

  /// Additional include path, searched after the input root; repeatable
  #[arg(short = 'I', long = "include")]
  pub include: Vec<PathBuf>,

  /// Definition file extension
  #[arg(long)]
  pub extension: Option<String>,

  /// Schema compiler binary (default: $PROTOC, then protoc on PATH)
  #[arg(long)]
  pub compiler: Option<PathBuf>,

  /// Well-known definitions directory (default: $PROTOC_INCLUDE, then next to the compiler)
  #[arg(long)]
  pub well_known_include: Option<PathBuf>,

  /// Write straight into the output root instead of staging and publishing
  #[arg(long)]
  pub in_place: bool,
}

fn parse_plugin(s: &str) -> Result<Plugin, String> {
  s.parse::<Plugin>().map_err(|e| e.to_string())
}

/// Everything a command needs once config and flags are merged.
#[derive(Debug)]
pub struct Project {
  pub options: BuildOptions,
  pub compiler: Option<PathBuf>,
  pub well_known_include: Option<PathBuf>,
  pub config_path: Option<PathBuf>,
}

impl ProjectArgs {
  pub fn resolve(&self) -> Result<Project> {
    let (mut config, config_path) = match &self.config {
      Some(path) => {
        let config = Config::load(path).with_context(|| format!("Failed to load config: {}", path.display()))?;
        (config, Some(path.clone()))
      }
      None => match Config::find(Path::new(".")).context("Failed to load config")? {
        Some(config) => (config, Some(PathBuf::from(CONFIG_FILENAME))),
        None => (Config::default(), None),
      },
    };

    self.apply(&mut config);
    debug!(?config, "resolved configuration");

    let options = config.build_options().context("Invalid configuration")?;

    Ok(Project {
      options,
      compiler: config.compiler,
      well_known_include: config.well_known_include,
      config_path,
    })
  }

  fn apply(&self, config: &mut Config) {
    if let Some(path) = &self.input_root {
      config.input_root = Some(path.clone());
    }
    if let Some(path) = &self.source_root {
      config.source_root = Some(path.clone());
    }
    if let Some(path) = &self.output_root {
      config.output_root = Some(path.clone());
    }
    if !self.plugins.is_empty() {
      config.plugins = Some(self.plugins.clone());
    }
    config.include.extend(self.include.iter().cloned());
    if let Some(ext) = &self.extension {
      config.extension = Some(ext.clone());
    }
    if let Some(path) = &self.compiler {
      config.compiler = Some(path.clone());
    }
    if let Some(path) = &self.well_known_include {
      config.well_known_include = Some(path.clone());
    }
    if self.in_place {
      config.staged = Some(false);
    }
  }
}
