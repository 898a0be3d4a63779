//! `[build]` section configuration.

use serde::Deserialize;

/// Transform settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuildConfig {
    /// Minify HTML/CSS/JS output. When disabled, text assets pass
    /// through the pipeline unmodified (useful for debugging output).
    pub minify: bool,

    /// JPEG re-encode quality (0-100).
    pub jpeg_quality: u8,

    /// Browserslist queries used for CSS vendor prefixing.
    pub browserslist: Vec<String>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            minify: true,
            jpeg_quality: 75,
            browserslist: vec!["defaults".to_string()],
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::config::test_parse_config;

    #[test]
    fn test_build_config() {
        let config =
            test_parse_config("[build]\nminify = false\njpeg_quality = 90\nbrowserslist = [\"last 2 versions\"]");
        assert!(!config.build.minify);
        assert_eq!(config.build.jpeg_quality, 90);
        assert_eq!(config.build.browserslist, ["last 2 versions"]);
    }
}
