//! Build tasks: one named, repeatable unit of work per asset class.
//!
//! Every task follows the same shape: scan sources, apply the change
//! filter, pipe survivors through the class's transform stage, write
//! results. A per-file transform failure is reported through the
//! notification channel and never aborts the task or its siblings; a
//! single malformed source must not halt the build.

mod clean;
mod font;
mod html;
mod image;
mod script;
mod style;

pub use clean::clean;

use std::path::Path;

use parking_lot::Mutex;

use crate::asset::AssetClass;
use crate::config::PipelineConfig;

/// Result of one task invocation, observable once every file has been
/// written or reported.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TaskOutcome {
    /// Output files written this run.
    pub written: usize,
    /// Sources skipped by the change filter.
    pub skipped: usize,
    /// Files that failed their transform stage.
    pub errors: usize,
}

impl TaskOutcome {
    pub fn summary(&self) -> String {
        format!(
            "{} written, {} up-to-date, {} failed",
            self.written, self.skipped, self.errors
        )
    }
}

/// Run one build task to completion.
pub fn run(config: &PipelineConfig, class: AssetClass) -> TaskOutcome {
    match class {
        AssetClass::Html => html::run(config),
        AssetClass::Font => font::run(config),
        AssetClass::Image => image::run(config),
        AssetClass::Style => style::run(config),
        AssetClass::Script => script::run(config),
    }
}

/// Run all build tasks concurrently and return once every class has
/// settled. Classes own disjoint destination subtrees, so no locking
/// is needed beyond collecting the outcomes.
pub fn run_all(config: &PipelineConfig) -> Vec<(AssetClass, TaskOutcome)> {
    let results = Mutex::new(Vec::with_capacity(AssetClass::ALL.len()));

    rayon::scope(|s| {
        for class in AssetClass::ALL {
            let results = &results;
            s.spawn(move |_| {
                let outcome = run(config, class);
                results.lock().push((class, outcome));
            });
        }
    });

    let mut results = results.into_inner();
    results.sort_by_key(|(class, _)| AssetClass::ALL.iter().position(|c| c == class));

    for (class, outcome) in &results {
        crate::log!(class.label(); "{}", outcome.summary());
    }
    results
}

/// Notification channel: a class-tagged, human-readable error report.
/// Never terminates the process.
pub(crate) fn report_error(class: AssetClass, path: &Path, err: &anyhow::Error) {
    crate::log!("error"; "[{}] {}: {err:#}", class.label(), path.display());
}
