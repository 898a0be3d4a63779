//! Mtime-based change detection (the change filter).
//!
//! Destination content is derived state: a pure function of source
//! content and the transform stage. The filter only decides whether
//! that derivation needs to re-run, by comparing modification times.
//! It never touches file contents and raises no error for a missing
//! output - missing simply means stale.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Get the modification time of a file
///
/// Returns `None` if the file doesn't exist or mtime cannot be read
pub fn mtime(path: &Path) -> Option<SystemTime> {
    path.metadata().and_then(|m| m.modified()).ok()
}

/// Check if file A is newer than file B
///
/// Returns `true` if A exists and is newer than B
/// Returns `false` if either file doesn't exist or times can't be compared
pub fn is_newer_than(a: &Path, b: &Path) -> bool {
    let (Some(a_time), Some(b_time)) = (mtime(a), mtime(b)) else {
        return false;
    };
    a_time > b_time
}

/// Map a source file into a destination directory, optionally remapping
/// the extension (e.g. `.scss` -> `.css`).
///
/// The remap must happen before any timestamp comparison; comparing
/// `main.scss` against a nonexistent `main.scss` in the output would
/// mark every style file stale forever.
pub fn output_path(source: &Path, dest_dir: &Path, remap_ext: Option<&str>) -> PathBuf {
    let name = source.file_name().unwrap_or_default();
    let mut output = dest_dir.join(name);
    if let Some(ext) = remap_ext {
        output.set_extension(ext);
    }
    output
}

/// Change filter: `true` when the output is missing or older than the
/// source.
pub fn is_stale(source: &Path, output: &Path) -> bool {
    !output.exists() || is_newer_than(source, output)
}

/// Collapsing-class variant: stale when the output is missing or any
/// input is newer than it.
pub fn any_stale<'a, I>(inputs: I, output: &Path) -> bool
where
    I: IntoIterator<Item = &'a PathBuf>,
{
    if !output.exists() {
        return true;
    }
    inputs.into_iter().any(|input| is_newer_than(input, output))
}
