//! Project configuration.
//!
//! A project may carry a `protogen.toml` next to its definitions:
//!
//! ```toml
//! input_root = "."
//! source_root = "apis"
//! output_root = "python"
//! plugins = ["python", "grpc_python", "mypy"]
//! include = ["third_party"]
//!
//! [plugin_paths]
//! grpc_python = "/usr/local/bin/grpc_python_plugin"
//! ```
//!
//! Every key is optional. Relative paths are resolved against the directory holding
//! the file.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::consts::{CONFIG_FILENAME, DEFAULT_EXTENSION, DEFAULT_OUTPUT_DIR};
use crate::pipeline::BuildOptions;
use crate::plugin::{Plugin, UnknownPlugin};

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("failed to read config {}: {source}", path.display())]
  Read {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("invalid config {}: {source}", path.display())]
  Parse {
    path: PathBuf,
    #[source]
    source: toml::de::Error,
  },

  #[error(transparent)]
  UnknownPlugin(#[from] UnknownPlugin),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
  pub input_root: Option<PathBuf>,
  pub source_root: Option<PathBuf>,
  pub output_root: Option<PathBuf>,
  pub extension: Option<String>,
  pub plugins: Option<Vec<Plugin>>,
  #[serde(default)]
  pub include: Vec<PathBuf>,
  /// Generator name to executable.
  #[serde(default)]
  pub plugin_paths: BTreeMap<String, PathBuf>,
  pub compiler: Option<PathBuf>,
  pub well_known_include: Option<PathBuf>,
  pub staged: Option<bool>,
}

impl Config {
  /// Load and parse a config file, resolving relative paths against its directory.
  pub fn load(path: &Path) -> Result<Self, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
      path: path.to_path_buf(),
      source,
    })?;

    let config: Config = toml::from_str(&content).map_err(|source| ConfigError::Parse {
      path: path.to_path_buf(),
      source,
    })?;

    let base = path.parent().unwrap_or(Path::new(""));
    debug!(path = %path.display(), "loaded config");
    Ok(config.relative_to(base))
  }

  /// Load `protogen.toml` from `dir` if there is one.
  pub fn find(dir: &Path) -> Result<Option<Self>, ConfigError> {
    let path = dir.join(CONFIG_FILENAME);
    if !path.is_file() {
      return Ok(None);
    }
    Self::load(&path).map(Some)
  }

  fn relative_to(mut self, base: &Path) -> Self {
    let join = |p: PathBuf| if p.is_absolute() { p } else { base.join(p) };

    self.input_root = self.input_root.map(join);
    self.source_root = self.source_root.map(join);
    self.output_root = self.output_root.map(join);
    self.well_known_include = self.well_known_include.map(join);
    self.include = self.include.into_iter().map(join).collect();
    self.plugin_paths = self.plugin_paths.into_iter().map(|(k, v)| (k, join(v))).collect();
    // A bare program name is left for PATH lookup.
    self.compiler = self
      .compiler
      .map(|p| if p.components().count() == 1 { p } else { join(p) });
    self
  }

  /// Build options from this config, filling in defaults for missing keys.
  pub fn build_options(&self) -> Result<BuildOptions, ConfigError> {
    let input_root = self.input_root.clone().unwrap_or_else(|| PathBuf::from("."));
    let output_root = self
      .output_root
      .clone()
      .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR));

    let mut options = BuildOptions::new(input_root, output_root);
    options.source_root = self.source_root.clone();
    options.extension = self
      .extension
      .clone()
      .unwrap_or_else(|| DEFAULT_EXTENSION.to_string());
    if let Some(plugins) = &self.plugins {
      options.plugins = plugins.iter().copied().collect();
    }
    options.extra_includes = self.include.clone();
    options.staged = self.staged.unwrap_or(true);

    for (name, exe) in &self.plugin_paths {
      let plugin: Plugin = name.parse()?;
      options.plugin_paths.insert(plugin, exe.clone());
    }

    Ok(options)
  }
}
