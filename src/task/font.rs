//! Font task: copy fonts into the output root, preserving structure.
//!
//! Fonts have no transform stage; the task is a freshness-gated
//! recursive copy.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use super::{TaskOutcome, report_error};
use crate::asset::{self, AssetClass};
use crate::config::PipelineConfig;
use crate::freshness;

pub(super) fn run(config: &PipelineConfig) -> TaskOutcome {
    let mut outcome = TaskOutcome::default();
    let source_root = config.paths.fonts_dir();
    let dest_root = AssetClass::Font.dest_dir(config);

    for source in asset::scan(AssetClass::Font, config) {
        // Preserve the directory layout below src/fonts/
        let Ok(rel) = source.strip_prefix(&source_root) else {
            continue;
        };
        let output = dest_root.join(rel);

        if !freshness::is_stale(&source, &output) {
            outcome.skipped += 1;
            continue;
        }
        match copy(&source, &output) {
            Ok(()) => outcome.written += 1,
            Err(e) => {
                report_error(AssetClass::Font, &source, &e);
                outcome.errors += 1;
            }
        }
    }
    outcome
}

fn copy(source: &Path, output: &Path) -> Result<()> {
    if let Some(parent) = output.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::copy(source, output)
        .with_context(|| format!("failed to copy to {}", output.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;
    use tempfile::TempDir;

    fn config_rooted_at(dir: &TempDir) -> PipelineConfig {
        let mut config = PipelineConfig::default();
        config.paths.source = dir.path().join("src");
        config.paths.output = dir.path().join("build");
        config
    }

    #[test]
    fn test_copies_nested_fonts() {
        let dir = TempDir::new().unwrap();
        let config = config_rooted_at(&dir);
        let fonts = config.paths.fonts_dir();
        fs::create_dir_all(fonts.join("inter")).unwrap();
        fs::write(fonts.join("inter/Inter.woff2"), b"abc").unwrap();

        let outcome = run(&config);
        assert_eq!(outcome.written, 1);
        assert!(
            config
                .paths
                .output_fonts_dir()
                .join("inter/Inter.woff2")
                .is_file()
        );
    }

    #[test]
    fn test_incremental_copy() {
        let dir = TempDir::new().unwrap();
        let config = config_rooted_at(&dir);
        let fonts = config.paths.fonts_dir();
        fs::create_dir_all(&fonts).unwrap();
        fs::write(fonts.join("a.ttf"), b"v1").unwrap();

        assert_eq!(run(&config).written, 1);
        assert_eq!(run(&config).written, 0);

        thread::sleep(Duration::from_millis(10));
        fs::write(fonts.join("a.ttf"), b"v2").unwrap();
        assert_eq!(run(&config).written, 1);
    }
}
