//! `[paths]` section configuration: the path registry.
//!
//! Maps the asset classes onto a fixed project layout rooted at
//! `source` and `output`:
//!
//! ```text
//! src/index.html        -> build/index.html
//! src/fonts/**/*        -> build/fonts/
//! src/img/*.{svg,png,jpg,jpeg,gif} -> build/img/
//! src/scss/*.scss       -> build/css/style.css
//! src/js/*.js           -> build/script.js
//! ```

use std::path::PathBuf;

use serde::Deserialize;

/// Source and output roots for the pipeline.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PathsConfig {
    /// Source root directory.
    pub source: PathBuf,

    /// Destination root directory. Owned entirely by the pipeline:
    /// `clean` removes it wholesale.
    pub output: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            source: PathBuf::from("src"),
            output: PathBuf::from("build"),
        }
    }
}

impl PathsConfig {
    /// The single HTML entry file.
    pub fn html_source(&self) -> PathBuf {
        self.source.join("index.html")
    }

    pub fn fonts_dir(&self) -> PathBuf {
        self.source.join("fonts")
    }

    pub fn img_dir(&self) -> PathBuf {
        self.source.join("img")
    }

    pub fn scss_dir(&self) -> PathBuf {
        self.source.join("scss")
    }

    pub fn js_dir(&self) -> PathBuf {
        self.source.join("js")
    }

    pub fn output_fonts_dir(&self) -> PathBuf {
        self.output.join("fonts")
    }

    pub fn output_img_dir(&self) -> PathBuf {
        self.output.join("img")
    }

    pub fn output_css_dir(&self) -> PathBuf {
        self.output.join("css")
    }
}

#[cfg(test)]
mod tests {
    use crate::config::test_parse_config;
    use std::path::PathBuf;

    #[test]
    fn test_paths_derive_from_roots() {
        let config = test_parse_config("[paths]\nsource = \"web\"\noutput = \"dist\"");
        assert_eq!(config.paths.html_source(), PathBuf::from("web/index.html"));
        assert_eq!(config.paths.scss_dir(), PathBuf::from("web/scss"));
        assert_eq!(config.paths.output_css_dir(), PathBuf::from("dist/css"));
    }
}
