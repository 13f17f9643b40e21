//! CLI integration tests driving `protogen` against a stand-in compiler.

#![cfg(unix)]

mod common;
mod plan_tests;
