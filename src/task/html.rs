//! HTML task: minify the entry page into the output root.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use minify_html::Cfg;

use super::{TaskOutcome, report_error};
use crate::asset::{self, AssetClass};
use crate::config::PipelineConfig;
use crate::freshness;

pub(super) fn run(config: &PipelineConfig) -> TaskOutcome {
    let mut outcome = TaskOutcome::default();
    let dest = AssetClass::Html.dest_dir(config);

    for source in asset::scan(AssetClass::Html, config) {
        let output = freshness::output_path(&source, &dest, None);
        if !freshness::is_stale(&source, &output) {
            outcome.skipped += 1;
            continue;
        }
        match process(&source, &output, config.build.minify) {
            Ok(()) => outcome.written += 1,
            Err(e) => {
                report_error(AssetClass::Html, &source, &e);
                outcome.errors += 1;
            }
        }
    }
    outcome
}

fn process(source: &Path, output: &Path, minify: bool) -> Result<()> {
    let raw = fs::read(source).with_context(|| format!("failed to read {}", source.display()))?;

    let body = if minify {
        let mut cfg = Cfg::new();
        cfg.minify_css = true;
        // Scripts ship through the js task; leave inline JS untouched
        cfg.minify_js = false;
        minify_html::minify(&raw, &cfg)
    } else {
        raw
    };

    if let Some(parent) = output.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(output, body).with_context(|| format!("failed to write {}", output.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_minifies_whitespace_and_comments() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("index.html");
        let output = dir.path().join("out/index.html");
        fs::write(
            &source,
            "<html>\n  <body>\n    <!-- remove me -->\n    <p>  hi  </p>\n  </body>\n</html>",
        )
        .unwrap();

        process(&source, &output, true).unwrap();
        let minified = fs::read_to_string(&output).unwrap();
        assert!(!minified.contains("remove me"));
        assert!(minified.len() < fs::metadata(&source).unwrap().len() as usize);
    }

    #[test]
    fn test_passthrough_without_minify() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("index.html");
        let output = dir.path().join("index.out.html");
        let content = "<html><body><!-- kept --></body></html>";
        fs::write(&source, content).unwrap();

        process(&source, &output, false).unwrap();
        assert_eq!(fs::read_to_string(&output).unwrap(), content);
    }
}
