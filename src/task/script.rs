//! Script task: minify sources into a single script.js.
//!
//! Script is a collapsing class: every source minifies individually
//! through oxc and the results concatenate in sorted order. A file
//! that fails to parse is reported and left out of the bundle.

use anyhow::{Context, Result, bail};
use oxc::allocator::Allocator;
use oxc::codegen::{Codegen, CodegenOptions, CommentOptions};
use oxc::mangler::MangleOptions;
use oxc::minifier::{CompressOptions, Minifier, MinifierOptions};
use oxc::parser::Parser;
use oxc::span::SourceType;
use std::fs;

use super::{TaskOutcome, report_error};
use crate::asset::{self, AssetClass};
use crate::config::PipelineConfig;
use crate::freshness;

pub(super) fn run(config: &PipelineConfig) -> TaskOutcome {
    let mut outcome = TaskOutcome::default();
    let sources = asset::scan(AssetClass::Script, config);
    if sources.is_empty() {
        return outcome;
    }

    let output = config.paths.output.join("script.js");
    if !freshness::any_stale(&sources, &output) {
        outcome.skipped = sources.len();
        return outcome;
    }

    let mut parts = Vec::with_capacity(sources.len());
    for source in &sources {
        let result = fs::read_to_string(source)
            .with_context(|| format!("failed to read {}", source.display()))
            .and_then(|text| {
                if config.build.minify {
                    minify_js(&text)
                } else {
                    Ok(text)
                }
            });
        match result {
            Ok(code) => parts.push(code),
            Err(e) => {
                report_error(AssetClass::Script, source, &e);
                outcome.errors += 1;
            }
        }
    }

    // Every source failed: keep whatever bundle already exists
    if parts.is_empty() && outcome.errors > 0 {
        return outcome;
    }

    let bundle = parts.join("\n");
    match write_output(&output, &bundle) {
        Ok(()) => outcome.written = 1,
        Err(e) => {
            report_error(AssetClass::Script, &output, &e);
            outcome.errors += 1;
        }
    }
    outcome
}

fn write_output(output: &std::path::Path, bundle: &str) -> Result<()> {
    if let Some(parent) = output.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(output, bundle)
        .with_context(|| format!("failed to write {}", output.display()))?;
    Ok(())
}

/// Minify JavaScript source code through oxc.
fn minify_js(source: &str) -> Result<String> {
    let allocator = Allocator::default();
    let source_type = SourceType::mjs();
    let ret = Parser::new(&allocator, source, source_type).parse();
    if !ret.errors.is_empty() {
        let messages: Vec<String> = ret.errors.iter().map(ToString::to_string).collect();
        bail!("syntax error: {}", messages.join("; "));
    }
    let mut program = ret.program;
    let options = MinifierOptions {
        mangle: Some(MangleOptions::default()),
        compress: Some(CompressOptions::smallest()),
    };
    let ret = Minifier::new(options).minify(&allocator, &mut program);
    let code = Codegen::new()
        .with_options(CodegenOptions {
            minify: true,
            comments: CommentOptions::disabled(),
            ..CodegenOptions::default()
        })
        .with_scoping(ret.scoping)
        .build(&program)
        .code;
    Ok(code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn config_rooted_at(dir: &TempDir) -> PipelineConfig {
        let mut config = PipelineConfig::default();
        config.paths.source = dir.path().join("src");
        config.paths.output = dir.path().join("build");
        config
    }

    #[test]
    fn test_minify_js_shrinks_source() {
        let source = "// comment\nfunction add(first, second) {\n    return first + second;\n}\nexport { add };\n";
        let minified = minify_js(source).unwrap();
        assert!(minified.len() < source.len());
        assert!(!minified.contains("comment"));
    }

    #[test]
    fn test_minify_js_rejects_garbage() {
        assert!(minify_js("function ( { nope").is_err());
    }

    #[test]
    fn test_sources_collapse_to_single_bundle() {
        let dir = TempDir::new().unwrap();
        let config = config_rooted_at(&dir);
        let js = config.paths.js_dir();
        fs::create_dir_all(&js).unwrap();
        fs::write(js.join("a.js"), "console.log('a');").unwrap();
        fs::write(js.join("b.js"), "console.log('b');").unwrap();

        let outcome = run(&config);
        assert_eq!(outcome.written, 1);

        let bundle = fs::read_to_string(config.paths.output.join("script.js")).unwrap();
        assert!(bundle.contains("a") && bundle.contains("b"));
    }

    #[test]
    fn test_bundle_skipped_when_fresh() {
        let dir = TempDir::new().unwrap();
        let config = config_rooted_at(&dir);
        let js = config.paths.js_dir();
        fs::create_dir_all(&js).unwrap();
        fs::write(js.join("a.js"), "console.log(1);").unwrap();

        assert_eq!(run(&config).written, 1);
        let second = run(&config);
        assert_eq!(second.written, 0);
        assert_eq!(second.skipped, 1);
    }
}
