//! Watch loop: filesystem change events re-trigger the matching build
//! tasks.
//!
//! One `notify` subscription covers the whole source root; a single
//! consumer thread drains debounced batches, routes each changed path
//! to its asset class, and runs the triggered tasks in sequence. The
//! single consumer is also the coalescing policy: a class's task can
//! never overlap itself, and events landing mid-run buffer in the
//! channel and collapse into at most one follow-up batch.

mod debounce;

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc;

use anyhow::{Context, Result};
use notify::{RecursiveMode, Watcher};

use crate::asset::AssetClass;
use crate::config::PipelineConfig;
use crate::logger::{status_error, status_success};
use crate::task;
use debounce::{ChangeKind, Debouncer};

/// Run the watch loop on the current thread until process exit.
pub fn run(config: &PipelineConfig) -> Result<()> {
    // Canonicalize once so event paths (absolute) strip cleanly
    let source_root = fs::canonicalize(&config.paths.source).with_context(|| {
        format!(
            "source directory {} not found",
            config.paths.source.display()
        )
    })?;

    let (tx, rx) = mpsc::channel();
    let mut watcher = notify::recommended_watcher(move |res| {
        let _ = tx.send(res);
    })
    .context("failed to create filesystem watcher")?;
    watcher
        .watch(&source_root, RecursiveMode::Recursive)
        .with_context(|| format!("failed to watch {}", source_root.display()))?;

    crate::log!("watch"; "watching {}", source_root.display());

    let mut debouncer = Debouncer::new();
    loop {
        match rx.recv_timeout(debouncer.sleep_duration()) {
            Ok(Ok(event)) => debouncer.add_event(&event),
            Ok(Err(e)) => crate::log!("watch"; "notify error: {e}"),
            Err(mpsc::RecvTimeoutError::Timeout) => {
                let Some(batch) = debouncer.take_if_ready() else {
                    continue;
                };
                let classes = route_batch(&source_root, &batch);
                run_triggered(config, &classes);
            }
            // Watcher dropped: nothing left to consume
            Err(mpsc::RecvTimeoutError::Disconnected) => break,
        }
    }
    Ok(())
}

/// Map a batch of changed paths to the distinct classes to rebuild,
/// in default build order.
fn route_batch(source_root: &Path, batch: &HashMap<PathBuf, ChangeKind>) -> Vec<AssetClass> {
    let mut classes = Vec::new();
    for path in batch.keys() {
        let Ok(rel) = path.strip_prefix(source_root) else {
            continue;
        };
        if let Some(class) = AssetClass::from_relative(rel)
            && !classes.contains(&class)
        {
            classes.push(class);
        }
    }
    classes.sort_by_key(|class| AssetClass::ALL.iter().position(|c| c == class));
    classes
}

/// Invoke the triggered tasks one at a time.
fn run_triggered(config: &PipelineConfig, classes: &[AssetClass]) {
    for &class in classes {
        let outcome = task::run(config, class);
        if outcome.errors > 0 {
            status_error(
                &format!("{}: {}", class.label(), outcome.summary()),
                "",
            );
        } else {
            status_success(&format!("{}: {}", class.label(), outcome.summary()));
        }
    }
}
