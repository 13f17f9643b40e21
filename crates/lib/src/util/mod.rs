//! Shared utilities.
//!
//! Hashing of generated output and test helpers.

pub mod hash;

#[cfg(test)]
pub mod testutil;
