//! Clean task: reset the destination root.

use std::fs;

use anyhow::{Context, Result};

use crate::config::PipelineConfig;

/// Remove the destination root recursively.
///
/// A missing root completes immediately with no error. A failed
/// removal is fatal for the invocation: building on top of a
/// half-removed tree would leave stale output alongside fresh output.
pub fn clean(config: &PipelineConfig) -> Result<()> {
    let output = &config.paths.output;
    if !output.exists() {
        return Ok(());
    }

    fs::remove_dir_all(output)
        .with_context(|| format!("failed to remove {}", output.display()))?;
    crate::log!("clean"; "removed {}", output.display());
    Ok(())
}
