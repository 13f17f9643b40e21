/// Extension of interface-definition files, without the leading dot.
pub const DEFAULT_EXTENSION: &str = "proto";

/// Project configuration file looked up in the working directory.
pub const CONFIG_FILENAME: &str = "protogen.toml";

/// Default destination for generated sources, relative to the project.
pub const DEFAULT_OUTPUT_DIR: &str = "gen";

/// Name of the schema compiler binary looked up on PATH.
pub const COMPILER_BIN: &str = "protoc";

/// Environment variable naming the compiler binary, as honored by prost-build and friends.
pub const COMPILER_ENV: &str = "PROTOC";

/// Environment variable naming the well-known definitions directory.
pub const WELL_KNOWN_INCLUDE_ENV: &str = "PROTOC_INCLUDE";

/// A directory is accepted as the well-known include root only if it contains this file.
pub const WELL_KNOWN_MARKER: &str = "google/protobuf/descriptor.proto";

/// Prefix of the staging directory created next to the output root.
pub const STAGING_PREFIX: &str = ".protogen-";
