//! Source scanning per asset class.
//!
//! A missing source directory scans to an empty list rather than an
//! error; the glob simply matches nothing.

use std::fs;
use std::path::{Path, PathBuf};

use jwalk::WalkDir;

use super::AssetClass;
use crate::config::PipelineConfig;

/// Image extensions accepted by the image class.
pub const IMAGE_EXTS: &[&str] = &["svg", "png", "jpg", "jpeg", "gif"];

/// List source files for a class, sorted for deterministic task order.
pub fn scan(class: AssetClass, config: &PipelineConfig) -> Vec<PathBuf> {
    let paths = &config.paths;
    let mut files = match class {
        AssetClass::Html => {
            let entry = paths.html_source();
            if entry.is_file() { vec![entry] } else { Vec::new() }
        }
        AssetClass::Font => walk_files(&paths.fonts_dir()),
        AssetClass::Image => list_with_exts(&paths.img_dir(), IMAGE_EXTS),
        AssetClass::Style => {
            // Partials are compile inputs, never entry points
            let mut entries = list_with_exts(&paths.scss_dir(), &["scss"]);
            entries.retain(|p| !is_partial(p));
            entries
        }
        AssetClass::Script => list_with_exts(&paths.js_dir(), &["js"]),
    };
    files.sort();
    files
}

/// Every `.scss` file under the style source directory, partials
/// included. This is the staleness input set for `style.css`: editing
/// a partial must mark the collapsed output stale even though the
/// partial itself is never an entry point.
pub fn scan_style_inputs(config: &PipelineConfig) -> Vec<PathBuf> {
    let mut files = walk_files(&config.paths.scss_dir());
    files.retain(|p| has_ext(p, &["scss"]));
    files.sort();
    files
}

/// `_name.scss` convention: an import-only partial.
fn is_partial(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with('_'))
}

fn has_ext(path: &Path, exts: &[&str]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| exts.contains(&e.to_ascii_lowercase().as_str()))
}

/// Non-recursive listing of files with one of the given extensions.
fn list_with_exts(dir: &Path, exts: &[&str]) -> Vec<PathBuf> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };
    entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file() && has_ext(p, exts))
        .collect()
}

/// Recursive listing of all files below a directory.
fn walk_files(dir: &Path) -> Vec<PathBuf> {
    if !dir.is_dir() {
        return Vec::new();
    }
    WalkDir::new(dir)
        // Serial: tasks already run inside the global rayon pool, and
        // jwalk's default rayon parallelism aborts with a busy error
        // (yielding an empty scan) when called from a pool thread.
        .parallelism(jwalk::Parallelism::Serial)
        .skip_hidden(true)
        .sort(true)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.path())
        .collect()
}
