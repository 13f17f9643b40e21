//! Test utilities for protogen-lib.
//!
//! [`FakeCompiler`] stands in for `protoc`: it understands the argument layout produced
//! by `build_args`, writes one small file per definition file and generator, and can be
//! told to fail.

use std::ffi::OsString;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

use crate::compiler::SchemaCompiler;
use crate::invocation::{CompileError, CompilerExit};

pub struct FakeCompiler {
  calls: Mutex<Vec<Vec<OsString>>>,
  exit_code: i32,
  fail_marker: Option<&'static str>,
}

impl FakeCompiler {
  /// A compiler that always succeeds.
  pub fn new() -> Self {
    Self {
      calls: Mutex::new(Vec::new()),
      exit_code: 0,
      fail_marker: None,
    }
  }

  /// A compiler that always returns `code`.
  pub fn exiting_with(code: i32) -> Self {
    Self {
      exit_code: code,
      ..Self::new()
    }
  }

  /// A compiler that exits 1 when any input file contains `marker`.
  pub fn failing_on(marker: &'static str) -> Self {
    Self {
      fail_marker: Some(marker),
      ..Self::new()
    }
  }

  /// Every argument vector this compiler was run with.
  pub fn calls(&self) -> Vec<Vec<OsString>> {
    self.calls.lock().unwrap().clone()
  }
}

/// File name a generator produces for a definition file stem.
pub fn generated_name(generator: &str, stem: &str) -> String {
  match generator {
    "python" => format!("{}_pb2.py", stem),
    "grpc_python" => format!("{}_pb2_grpc.py", stem),
    "mypy" => format!("{}_pb2.pyi", stem),
    other => format!("{}_{}", stem, other),
  }
}

impl SchemaCompiler for FakeCompiler {
  fn selector(&self) -> OsString {
    OsString::from("fake-protoc")
  }

  async fn run(&self, args: &[OsString]) -> Result<CompilerExit, CompileError> {
    self.calls.lock().unwrap().push(args.to_vec());

    let mut outputs: Vec<(String, PathBuf)> = Vec::new();
    let mut files: Vec<PathBuf> = Vec::new();
    for arg in &args[1..] {
      let arg = arg.to_string_lossy();
      match arg.strip_prefix("--").and_then(|flag| flag.split_once('=')) {
        Some((flag, value)) => {
          if let Some(generator) = flag.strip_suffix("_out") {
            outputs.push((generator.to_string(), PathBuf::from(value)));
          }
        }
        None => files.push(PathBuf::from(arg.as_ref())),
      }
    }

    let sources: Vec<(String, String)> = files
      .iter()
      .map(|f| {
        let stem = f.file_stem().unwrap().to_string_lossy().to_string();
        (stem, fs::read_to_string(f).unwrap_or_default())
      })
      .collect();

    let failing = self
      .fail_marker
      .is_some_and(|marker| sources.iter().any(|(_, content)| content.contains(marker)));
    let code = if failing { 1 } else { self.exit_code };

    // Generators run in order; a failing run still lets the first one write.
    for (index, (generator, out)) in outputs.iter().enumerate() {
      if code != 0 && index > 0 {
        break;
      }
      for (stem, content) in &sources {
        let generated = format!("# {} output for {}\n{}", generator, stem, content);
        fs::write(out.join(generated_name(generator, stem)), generated).unwrap();
      }
    }

    Ok(CompilerExit {
      code,
      diagnostics: if code == 0 {
        String::new()
      } else {
        "x.proto:4:3: \"Missing\" is not defined.".to_string()
      },
    })
  }
}
