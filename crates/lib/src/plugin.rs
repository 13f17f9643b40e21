//! Output generator plugins.

use std::ffi::OsString;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A compiler output generator producing one category of generated source.
///
/// Variants are declared in canonical order; argument assembly emits output flags in
/// this order regardless of how the enabled set was specified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Plugin {
  /// Message classes (data-access bindings), `--python_out`.
  Python,
  /// gRPC client and server stubs, `--grpc_python_out`.
  GrpcPython,
  /// Type-hint stubs (`.pyi`), `--mypy_out`.
  Mypy,
}

#[derive(Debug, Error)]
#[error("unknown plugin '{0}' (expected one of: python, grpc_python, mypy)")]
pub struct UnknownPlugin(pub String);

impl Plugin {
  pub const ALL: [Plugin; 3] = [Plugin::Python, Plugin::GrpcPython, Plugin::Mypy];

  /// The generator name as used in `--<name>_out` and `protoc-gen-<name>`.
  pub fn name(self) -> &'static str {
    match self {
      Plugin::Python => "python",
      Plugin::GrpcPython => "grpc_python",
      Plugin::Mypy => "mypy",
    }
  }

  pub fn description(self) -> &'static str {
    match self {
      Plugin::Python => "data-access bindings",
      Plugin::GrpcPython => "service-stub bindings",
      Plugin::Mypy => "type-hint stubs",
    }
  }

  /// `--<name>_out=<out>`
  pub fn output_flag(self, out: &Path) -> OsString {
    let mut flag = OsString::from(format!("--{}_out=", self.name()));
    flag.push(out.as_os_str());
    flag
  }

  /// `--plugin=protoc-gen-<name>=<executable>`
  pub fn executable_flag(self, executable: &Path) -> OsString {
    let mut flag = OsString::from(format!("--plugin=protoc-gen-{}=", self.name()));
    flag.push(executable.as_os_str());
    flag
  }
}

impl fmt::Display for Plugin {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.name())
  }
}

impl FromStr for Plugin {
  type Err = UnknownPlugin;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Plugin::ALL
      .into_iter()
      .find(|p| p.name() == s)
      .ok_or_else(|| UnknownPlugin(s.to_string()))
  }
}
