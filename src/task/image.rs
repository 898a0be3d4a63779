//! Image task: optimize images into the output root.
//!
//! Raster formats are re-encoded through the `image` crate (JPEG at a
//! configurable quality, PNG at maximum compression), SVG is
//! re-emitted minified through `usvg`, and anything else (GIF) copies
//! through untouched. When a re-encode comes out larger than the
//! original, the original bytes win - optimization never grows a file.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};

use super::{TaskOutcome, report_error};
use crate::asset::{self, AssetClass};
use crate::config::PipelineConfig;
use crate::freshness;

pub(super) fn run(config: &PipelineConfig) -> TaskOutcome {
    let mut outcome = TaskOutcome::default();
    let dest = AssetClass::Image.dest_dir(config);

    for source in asset::scan(AssetClass::Image, config) {
        let output = freshness::output_path(&source, &dest, None);
        if !freshness::is_stale(&source, &output) {
            outcome.skipped += 1;
            continue;
        }
        match optimize(&source, &output, config.build.jpeg_quality) {
            Ok(()) => outcome.written += 1,
            Err(e) => {
                report_error(AssetClass::Image, &source, &e);
                outcome.errors += 1;
            }
        }
    }
    outcome
}

fn optimize(source: &Path, output: &Path, jpeg_quality: u8) -> Result<()> {
    let data = fs::read(source).with_context(|| format!("failed to read {}", source.display()))?;
    let ext = source
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    let encoded = match ext.as_str() {
        "jpg" | "jpeg" => Some(encode_jpeg(&data, jpeg_quality)?),
        "png" => Some(encode_png(&data)?),
        "svg" => match minify_svg(&data) {
            Ok(svg) => Some(svg),
            Err(e) => {
                // Unparsable SVG still copies through verbatim
                crate::debug!("img"; "svg not minified ({}): {e:#}", source.display());
                None
            }
        },
        _ => None, // gif passes through
    };

    let body = match encoded {
        Some(bytes) if bytes.len() < data.len() => bytes,
        _ => data,
    };

    if let Some(parent) = output.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(output, body).with_context(|| format!("failed to write {}", output.display()))?;
    Ok(())
}

fn encode_jpeg(data: &[u8], quality: u8) -> Result<Vec<u8>> {
    let img = image::load_from_memory(data).context("failed to decode JPEG")?;
    let mut buf = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut buf, quality);
    // JPEG has no alpha channel
    img.to_rgb8()
        .write_with_encoder(encoder)
        .context("failed to encode JPEG")?;
    Ok(buf)
}

fn encode_png(data: &[u8]) -> Result<Vec<u8>> {
    let img = image::load_from_memory(data).context("failed to decode PNG")?;
    let mut buf = Vec::new();
    let encoder = PngEncoder::new_with_quality(&mut buf, CompressionType::Best, FilterType::Adaptive);
    img.write_with_encoder(encoder)
        .context("failed to encode PNG")?;
    Ok(buf)
}

/// Re-emit SVG without indentation through usvg.
fn minify_svg(data: &[u8]) -> Result<Vec<u8>> {
    let tree =
        usvg::Tree::from_data(data, &usvg::Options::default()).context("failed to parse SVG")?;
    let options = usvg::WriteOptions {
        indent: usvg::Indent::None,
        ..Default::default()
    };
    Ok(tree.to_string(&options).into_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use tempfile::TempDir;

    fn config_rooted_at(dir: &TempDir) -> PipelineConfig {
        let mut config = PipelineConfig::default();
        config.paths.source = dir.path().join("src");
        config.paths.output = dir.path().join("build");
        config
    }

    fn sample_png() -> Vec<u8> {
        let img = image::DynamicImage::new_rgb8(8, 8);
        let mut buf = Vec::new();
        img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
            .unwrap();
        buf
    }

    #[test]
    fn test_png_round_trips_decodable() {
        let dir = TempDir::new().unwrap();
        let config = config_rooted_at(&dir);
        let img_dir = config.paths.img_dir();
        fs::create_dir_all(&img_dir).unwrap();
        fs::write(img_dir.join("pixel.png"), sample_png()).unwrap();

        let outcome = run(&config);
        assert_eq!(outcome.written, 1);
        assert_eq!(outcome.errors, 0);

        let written = fs::read(config.paths.output_img_dir().join("pixel.png")).unwrap();
        image::load_from_memory(&written).unwrap();
    }

    #[test]
    fn test_svg_is_minified() {
        let svg = b"<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"10\" height=\"10\">\n    <rect width=\"10\" height=\"10\"/>\n</svg>";
        let minified = minify_svg(svg).unwrap();
        assert!(!minified.windows(2).any(|w| w == b"\n "));
    }

    #[test]
    fn test_corrupt_image_reports_error() {
        let dir = TempDir::new().unwrap();
        let config = config_rooted_at(&dir);
        let img_dir = config.paths.img_dir();
        fs::create_dir_all(&img_dir).unwrap();
        fs::write(img_dir.join("broken.png"), b"definitely not a png").unwrap();

        let outcome = run(&config);
        assert_eq!(outcome.errors, 1);
        assert_eq!(outcome.written, 0);
    }

    #[test]
    fn test_gif_passes_through() {
        let dir = TempDir::new().unwrap();
        let config = config_rooted_at(&dir);
        let img_dir = config.paths.img_dir();
        fs::create_dir_all(&img_dir).unwrap();
        fs::write(img_dir.join("anim.gif"), b"GIF89a-opaque-bytes").unwrap();

        let outcome = run(&config);
        assert_eq!(outcome.written, 1);
        let copied = fs::read(config.paths.output_img_dir().join("anim.gif")).unwrap();
        assert_eq!(copied, b"GIF89a-opaque-bytes");
    }
}
