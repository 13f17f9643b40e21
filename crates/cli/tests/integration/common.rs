//! Shared test helpers for CLI integration tests.

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::PathBuf;

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use tempfile::TempDir;
use walkdir::WalkDir;

pub const VALID: &str = "syntax = \"proto3\";\npackage demo;\nmessage Ok { string name = 1; }\n";

/// References a type that is never declared, which the stand-in compiler rejects.
pub const UNRESOLVED: &str = "syntax = \"proto3\";\npackage demo;\nmessage Bad { Missing field = 1; }\n";

/// Stand-in for `protoc`.
///
/// Understands `--<generator>_out=<dir>` flags and trailing file arguments, records the
/// arguments it was given in `last-args` next to itself, and exits 3 with a protoc-style
/// diagnostic when a file references `Missing`.
const FAKE_PROTOC: &str = r#"#!/bin/sh
printf '%s\n' "$@" > "$(dirname "$0")/last-args"

files=""
status=0
for arg in "$@"; do
  case "$arg" in
    --*) ;;
    *)
      files="$files $arg"
      if grep -q "Missing" "$arg"; then
        echo "$arg:3:15: \"Missing\" is not defined." >&2
        status=3
      fi
      ;;
  esac
done
if [ "$status" -ne 0 ]; then
  exit "$status"
fi

for arg in "$@"; do
  case "$arg" in
    --*_out=*)
      dir="${arg#*=}"
      gen="${arg%%_out=*}"
      gen="${gen#--}"
      for f in $files; do
        stem=$(basename "$f" .proto)
        case "$gen" in
          python) name="${stem}_pb2.py" ;;
          grpc_python) name="${stem}_pb2_grpc.py" ;;
          mypy) name="${stem}_pb2.pyi" ;;
          *) name="${stem}_${gen}" ;;
        esac
        printf '# %s output for %s\n' "$gen" "$stem" > "$dir/$name"
        cat "$f" >> "$dir/$name"
      done
      ;;
  esac
done
exit 0
"#;

/// Isolated project with a stand-in toolchain.
///
/// Layout:
/// ```text
/// <temp>/
/// ├── toolchain/bin/protoc
/// ├── toolchain/include/google/protobuf/descriptor.proto
/// └── schemas/{a/x.proto, b/y.proto}
/// ```
pub struct TestEnv {
  pub temp: TempDir,
}

impl TestEnv {
  /// A project whose `x.proto` has the given content; `y.proto` is always valid.
  pub fn with_schemas(x: &str) -> Self {
    let env = Self::empty();
    env.write_file("schemas/a/x.proto", x);
    env.write_file("schemas/b/y.proto", VALID);
    env
  }

  /// A project with a toolchain but no definition files.
  pub fn empty() -> Self {
    let temp = TempDir::new().unwrap();
    let env = Self { temp };

    env.write_file(
      "toolchain/include/google/protobuf/descriptor.proto",
      "syntax = \"proto2\";\npackage google.protobuf;\n",
    );
    env.write_file("toolchain/bin/protoc", FAKE_PROTOC);
    let compiler = env.compiler_path();
    fs::set_permissions(&compiler, fs::Permissions::from_mode(0o755)).unwrap();

    env
  }

  /// Write a file relative to the temp directory.
  pub fn write_file(&self, relative_path: &str, content: &str) {
    let path = self.temp.path().join(relative_path);
    if let Some(parent) = path.parent() {
      fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, content).unwrap();
  }

  pub fn root(&self) -> PathBuf {
    dunce::canonicalize(self.temp.path()).unwrap()
  }

  pub fn path(&self, relative: &str) -> PathBuf {
    self.root().join(relative)
  }

  pub fn compiler_path(&self) -> PathBuf {
    self.temp.path().join("toolchain/bin/protoc")
  }

  /// Arguments the stand-in compiler received on its last run.
  pub fn last_args(&self) -> Vec<String> {
    fs::read_to_string(self.temp.path().join("toolchain/bin/last-args"))
      .unwrap()
      .lines()
      .map(str::to_string)
      .collect()
  }

  /// Relative paths of every file under `dir`, sorted.
  pub fn list(&self, dir: &str) -> Vec<String> {
    let root = self.path(dir);
    if !root.exists() {
      return Vec::new();
    }
    WalkDir::new(&root)
      .sort_by_file_name()
      .into_iter()
      .map(Result::unwrap)
      .filter(|entry| entry.file_type().is_file())
      .map(|entry| entry.path().strip_prefix(&root).unwrap().to_string_lossy().to_string())
      .collect()
  }

  /// Get a pre-configured Command for the protogen binary.
  ///
  /// Runs inside the project directory with the stand-in toolchain selected through
  /// `PROTOC` and `PROTOC_INCLUDE`.
  pub fn protogen_cmd(&self) -> Command {
    let mut cmd: Command = cargo_bin_cmd!("protogen");
    cmd.current_dir(self.root());
    cmd.env("PROTOC", self.compiler_path());
    cmd.env("PROTOC_INCLUDE", self.temp.path().join("toolchain/include"));
    cmd.env_remove("RUST_LOG");
    cmd
  }
}
