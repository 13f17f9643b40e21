//! Plan and info command integration tests.

use predicates::prelude::*;

use super::common::{TestEnv, VALID};

#[test]
fn plan_shows_command_without_running_it() {
  let env = TestEnv::with_schemas(VALID);

  env
    .protogen_cmd()
    .args(["plan", "-i", "schemas", "-o", "gen"])
    .assert()
    .success()
    .stdout(predicate::str::contains("Files: 2"))
    .stdout(predicate::str::contains("--grpc_python_out=gen"))
    .stdout(predicate::str::contains("schemas/a/x.proto"));

  assert!(!env.path("gen").exists());
  assert!(!env.temp.path().join("toolchain/bin/last-args").exists());
}

#[test]
fn plan_json_lists_arguments() {
  let env = TestEnv::with_schemas(VALID);

  let output = env
    .protogen_cmd()
    .args(["plan", "-i", "schemas", "-o", "gen", "-I", "vendor", "--format", "json"])
    .output()
    .unwrap();
  assert!(output.status.success());

  let plan: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
  let args: Vec<&str> = plan["args"]
    .as_array()
    .unwrap()
    .iter()
    .map(|a| a.as_str().unwrap())
    .collect();

  assert_eq!(args.len(), 1 + 3 + 3 + 2);
  assert_eq!(args[2], "--proto_path=schemas");
  assert_eq!(args[3], "--proto_path=vendor");
  assert_eq!(&args[4..7], ["--python_out=gen", "--grpc_python_out=gen", "--mypy_out=gen"]);
  assert_eq!(&args[7..], ["schemas/a/x.proto", "schemas/b/y.proto"]);
  assert_eq!(plan["plugins"].as_array().unwrap().len(), 3);
  assert_eq!(plan["staged"], true);
}

#[test]
fn plan_with_empty_tree_warns() {
  let env = TestEnv::empty();

  env
    .protogen_cmd()
    .args(["plan", "-i", "schemas", "-o", "gen"])
    .assert()
    .success()
    .stdout(predicate::str::contains("Files: 0"))
    .stderr(predicate::str::contains("No definition files"));
}

#[test]
fn info_shows_toolchain() {
  let env = TestEnv::empty();

  env
    .protogen_cmd()
    .arg("info")
    .assert()
    .success()
    .stdout(predicate::str::contains("Compiler:"))
    .stdout(predicate::str::contains("toolchain/bin/protoc"))
    .stdout(predicate::str::contains("toolchain/include"));
}

#[test]
fn info_reports_missing_compiler() {
  let env = TestEnv::empty();

  env
    .protogen_cmd()
    .env("PROTOC", "/nonexistent/bin/protoc")
    .arg("info")
    .assert()
    .success()
    .stdout(predicate::str::contains("not found"));
}

#[test]
fn plan_text_explains_staging() {
  let env = TestEnv::with_schemas(VALID);

  env
    .protogen_cmd()
    .args(["plan", "-i", "schemas", "-o", "gen"])
    .assert()
    .success()
    .stdout(predicate::str::contains("Staging: compiler writes to a hidden .protogen-* sibling of gen"));

  env
    .protogen_cmd()
    .args(["plan", "-i", "schemas", "-o", "gen", "--in-place"])
    .assert()
    .success()
    .stdout(predicate::str::contains("Staging: off, compiler writes straight into gen"));
}
