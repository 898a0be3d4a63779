//! Asset classes: the unit of pipeline scheduling.
//!
//! Each class owns a disjoint destination subtree, so tasks for
//! different classes never contend for the same output files.

mod scan;

pub use scan::{IMAGE_EXTS, scan, scan_style_inputs};

use std::path::{Path, PathBuf};

use crate::config::PipelineConfig;

/// A category of source files sharing a location, destination and
/// transform chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetClass {
    Html,
    Font,
    Image,
    Style,
    Script,
}

impl AssetClass {
    /// Every class, in default build order.
    pub const ALL: [AssetClass; 5] = [
        AssetClass::Html,
        AssetClass::Font,
        AssetClass::Image,
        AssetClass::Style,
        AssetClass::Script,
    ];

    /// Task label used in the command surface and log prefixes.
    pub fn label(self) -> &'static str {
        match self {
            AssetClass::Html => "html",
            AssetClass::Font => "font",
            AssetClass::Image => "img",
            AssetClass::Style => "sass",
            AssetClass::Script => "js",
        }
    }

    /// Destination directory owned by this class.
    pub fn dest_dir(self, config: &PipelineConfig) -> PathBuf {
        match self {
            AssetClass::Html | AssetClass::Script => config.paths.output.clone(),
            AssetClass::Font => config.paths.output_fonts_dir(),
            AssetClass::Image => config.paths.output_img_dir(),
            AssetClass::Style => config.paths.output_css_dir(),
        }
    }

    /// Classify a path relative to the source root (watch routing).
    ///
    /// Returns `None` for paths no class is interested in.
    pub fn from_relative(rel: &Path) -> Option<Self> {
        let mut components = rel.components();
        let first = components.next()?.as_os_str().to_str()?;

        let ext = rel
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        match first {
            "index.html" => Some(AssetClass::Html),
            "fonts" => components.next().is_some().then_some(AssetClass::Font),
            "img" => IMAGE_EXTS.contains(&ext.as_str()).then_some(AssetClass::Image),
            "scss" => (ext == "scss").then_some(AssetClass::Style),
            "js" => (ext == "js").then_some(AssetClass::Script),
            _ => None,
        }
    }
}
