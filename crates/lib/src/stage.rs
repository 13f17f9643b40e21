//! Staged output.
//!
//! The compiler writes into a hidden sibling of the output root. Only a successful run
//! is published into the output root; dropping a [`Staging`] without publishing removes
//! everything the compiler wrote, so a failed run leaves the output root untouched.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use thiserror::Error;
use tracing::debug;
use walkdir::WalkDir;

use crate::consts::STAGING_PREFIX;

#[derive(Debug, Error)]
pub enum StageError {
  #[error("failed to create staging directory in {}: {source}", parent.display())]
  Create {
    parent: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to walk staging directory: {0}")]
  Walk(#[source] walkdir::Error),

  #[error("failed to publish {} to {}: {source}", from.display(), to.display())]
  Publish {
    from: PathBuf,
    to: PathBuf,
    #[source]
    source: io::Error,
  },
}

/// A temporary output directory that is either published into its target or discarded.
#[derive(Debug)]
pub struct Staging {
  dir: TempDir,
  target: PathBuf,
}

impl Staging {
  /// Create a staging directory next to `target`.
  ///
  /// The sibling usually shares the target's filesystem, so publishing is a rename. A
  /// target that is a symlink into another filesystem falls back to copying.
  pub fn new(target: &Path) -> Result<Self, StageError> {
    let parent = match target.parent() {
      Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
      _ => PathBuf::from("."),
    };

    fs::create_dir_all(&parent).map_err(|source| StageError::Create {
      parent: parent.clone(),
      source,
    })?;

    let dir = tempfile::Builder::new()
      .prefix(STAGING_PREFIX)
      .tempdir_in(&parent)
      .map_err(|source| StageError::Create {
        parent: parent.clone(),
        source,
      })?;

    debug!(staging = %dir.path().display(), target = %target.display(), "created staging directory");

    Ok(Self {
      dir,
      target: target.to_path_buf(),
    })
  }

  /// Where the compiler should write.
  pub fn path(&self) -> &Path {
    self.dir.path()
  }

  pub fn target(&self) -> &Path {
    &self.target
  }

  /// Move every staged file into the target, replacing files with the same relative
  /// path and leaving all other files in the target alone.
  ///
  /// Returns the published paths relative to the target, sorted.
  pub fn publish(self) -> Result<Vec<PathBuf>, StageError> {
    let root = self.dir.path();
    let mut published = Vec::new();

    for entry in WalkDir::new(root).sort_by_file_name() {
      let entry = entry.map_err(StageError::Walk)?;
      if !entry.file_type().is_file() {
        continue;
      }

      let relative = entry.path().strip_prefix(root).unwrap_or(entry.path()).to_path_buf();
      let dest = self.target.join(&relative);

      if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent).map_err(|source| StageError::Publish {
          from: entry.path().to_path_buf(),
          to: dest.clone(),
          source,
        })?;
      }

      move_file(entry.path(), &dest).map_err(|source| StageError::Publish {
        from: entry.path().to_path_buf(),
        to: dest.clone(),
        source,
      })?;

      published.push(relative);
    }

    debug!(count = published.len(), target = %self.target.display(), "published staged output");
    Ok(published)
  }
}

/// Rename `from` to `to`, copying across filesystem boundaries.
fn move_file(from: &Path, to: &Path) -> io::Result<()> {
  match fs::rename(from, to) {
    Err(err) if err.kind() == io::ErrorKind::CrossesDevices => {
      debug!(from = %from.display(), to = %to.display(), "rename crosses filesystems, copying");
      copy_then_remove(from, to)
    }
    other => other,
  }
}

fn copy_then_remove(from: &Path, to: &Path) -> io::Result<()> {
  fs::copy(from, to)?;
  fs::remove_file(from)
}
