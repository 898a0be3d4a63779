//! Style task: compile SCSS entries into a single css/style.css.
//!
//! Style is a collapsing class: every non-partial entry compiles
//! through `grass`, the results concatenate in sorted order, and
//! `lightningcss` minifies and vendor-prefixes the bundle for the
//! configured browserslist targets.

use anyhow::{Context, Result, anyhow};
use lightningcss::stylesheet::{MinifyOptions, ParserOptions, PrinterOptions, StyleSheet};
use lightningcss::targets::{Browsers, Targets};
use std::fs;

use super::{TaskOutcome, report_error};
use crate::asset::{self, AssetClass};
use crate::config::PipelineConfig;
use crate::freshness;

pub(super) fn run(config: &PipelineConfig) -> TaskOutcome {
    let mut outcome = TaskOutcome::default();
    let entries = asset::scan(AssetClass::Style, config);
    if entries.is_empty() {
        return outcome;
    }

    let dest = AssetClass::Style.dest_dir(config);
    let output = dest.join("style.css");

    // Staleness tracks every .scss file: partials are imported into
    // entries, so an edited partial must re-derive the bundle too.
    let inputs = asset::scan_style_inputs(config);
    if !freshness::any_stale(&inputs, &output) {
        outcome.skipped = entries.len();
        return outcome;
    }

    let options = grass::Options::default().load_path(config.paths.scss_dir());
    let mut bundle = String::new();
    for entry in &entries {
        match grass::from_path(entry, &options) {
            Ok(css) => {
                bundle.push_str(&css);
                bundle.push('\n');
            }
            Err(e) => {
                report_error(AssetClass::Style, entry, &anyhow!("{e}"));
                outcome.errors += 1;
            }
        }
    }

    // Every entry failed: keep whatever bundle already exists
    if bundle.is_empty() && outcome.errors > 0 {
        return outcome;
    }

    match finalize(&bundle, config) {
        Ok(css) => {
            if let Err(e) = write_output(&output, &css) {
                report_error(AssetClass::Style, &output, &e);
                outcome.errors += 1;
            } else {
                outcome.written = 1;
            }
        }
        Err(e) => {
            report_error(AssetClass::Style, &output, &e);
            outcome.errors += 1;
        }
    }
    outcome
}

fn write_output(output: &std::path::Path, css: &str) -> Result<()> {
    if let Some(parent) = output.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(output, css).with_context(|| format!("failed to write {}", output.display()))?;
    Ok(())
}

/// Minify and vendor-prefix the compiled bundle.
fn finalize(css: &str, config: &PipelineConfig) -> Result<String> {
    let targets = browser_targets(&config.build.browserslist)?;

    let mut stylesheet = StyleSheet::parse(css, ParserOptions::default())
        .map_err(|e| anyhow!("css parse error: {e}"))?;
    stylesheet
        .minify(MinifyOptions {
            targets,
            ..MinifyOptions::default()
        })
        .map_err(|e| anyhow!("css minify error: {e}"))?;

    let result = stylesheet
        .to_css(PrinterOptions {
            minify: config.build.minify,
            targets,
            ..PrinterOptions::default()
        })
        .map_err(|e| anyhow!("css print error: {e}"))?;
    Ok(result.code)
}

fn browser_targets(queries: &[String]) -> Result<Targets> {
    let browsers = Browsers::from_browserslist(queries)
        .map_err(|e| anyhow!("invalid browserslist query: {e}"))?;
    Ok(Targets {
        browsers,
        ..Targets::default()
    })
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
    fn test_compiles_entry_with_partial_import() {
        let dir = TempDir::new().unwrap();
        let config = config_rooted_at(&dir);
        let scss = config.paths.scss_dir();
        fs::create_dir_all(&scss).unwrap();
        fs::write(scss.join("_vars.scss"), "$accent: #ff0000;").unwrap();
        fs::write(scss.join("main.scss"), "@use 'vars';\nbody { color: vars.$accent; }").unwrap();

        let outcome = run(&config);
        assert_eq!(outcome.written, 1);
        assert_eq!(outcome.errors, 0);

        let css = fs::read_to_string(config.paths.output_css_dir().join("style.css")).unwrap();
        assert!(css.contains("red") || css.contains("#ff0000") || css.contains("#f00"));
    }

    #[test]
    fn test_partial_edit_marks_bundle_stale() {
        let dir = TempDir::new().unwrap();
        let config = config_rooted_at(&dir);
        let scss = config.paths.scss_dir();
        fs::create_dir_all(&scss).unwrap();
        fs::write(scss.join("_vars.scss"), "$accent: blue;").unwrap();
        fs::write(scss.join("main.scss"), "@use 'vars';\na { color: vars.$accent; }").unwrap();

        assert_eq!(run(&config).written, 1);
        assert_eq!(run(&config).written, 0);

        thread::sleep(Duration::from_millis(10));
        fs::write(scss.join("_vars.scss"), "$accent: green;").unwrap();
        assert_eq!(run(&config).written, 1);
    }

    #[test]
    fn test_malformed_entry_skipped_others_compile() {
        let dir = TempDir::new().unwrap();
        let config = config_rooted_at(&dir);
        let scss = config.paths.scss_dir();
        fs::create_dir_all(&scss).unwrap();
        fs::write(scss.join("bad.scss"), "body { color: $undefined-var; }").unwrap();
        fs::write(scss.join("good.scss"), "p { margin: 0; }").unwrap();

        let outcome = run(&config);
        assert_eq!(outcome.errors, 1);
        assert_eq!(outcome.written, 1);

        let css = fs::read_to_string(config.paths.output_css_dir().join("style.css")).unwrap();
        assert!(css.contains("p{margin:0}") || css.contains("margin"));
    }

    #[test]
    fn test_no_entries_is_noop() {
        let dir = TempDir::new().unwrap();
        let config = config_rooted_at(&dir);
        assert_eq!(run(&config), TaskOutcome::default());
    }
}
