//! protogen-lib: Core logic for protogen
//!
//! This crate discovers interface-definition files and drives the schema compiler:
//! - `discover`: recursive lookup of definition files under a root
//! - `invocation`: deterministic argument assembly and result handling
//! - `compiler`: the `SchemaCompiler` seam and the `protoc` implementation
//! - `stage`: write-to-staging-then-publish for generated output
//! - `pipeline`: the discovery-to-invocation build, plus dry-run planning

pub mod compiler;
pub mod config;
pub mod consts;
pub mod discover;
pub mod invocation;
pub mod pipeline;
pub mod plugin;
pub mod stage;
pub mod util;
