//! Definition file discovery.
//!
//! Walks a root directory and collects every file carrying the definition-file
//! extension, at any depth. Discovery never fails: a missing or unreadable root
//! simply produces no matches.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use tracing::{debug, trace};
use walkdir::{DirEntry, WalkDir};

/// Find all definition files under `root` whose extension is `extension`.
///
/// `extension` may be given with or without its leading dot (`"proto"` or `".proto"`).
/// Hidden files and directories below the root are skipped, matching the behavior of
/// a recursive `**` glob. Entries that cannot be read are ignored.
///
/// The returned paths are `root` joined with the relative location of each file and
/// are sorted lexicographically so repeated runs hand the compiler the same order.
pub fn find_definitions(root: &Path, extension: &str) -> Vec<PathBuf> {
  let extension = extension.trim_start_matches('.');

  let walker = WalkDir::new(root)
    .follow_links(true)
    .into_iter()
    .filter_entry(|e| e.depth() == 0 || !is_hidden(e));

  let mut files: Vec<PathBuf> = walker
    .filter_map(|entry| match entry {
      Ok(entry) => Some(entry),
      Err(e) => {
        trace!(error = %e, "skipping unreadable entry");
        None
      }
    })
    .filter(|entry| entry.file_type().is_file())
    .filter(|entry| entry.path().extension() == Some(OsStr::new(extension)))
    .map(DirEntry::into_path)
    .collect();

  files.sort();

  debug!(root = %root.display(), count = files.len(), "discovered definition files");
  files
}

fn is_hidden(entry: &DirEntry) -> bool {
  entry.file_name().to_str().is_some_and(|name| name.starts_with('.'))
}
