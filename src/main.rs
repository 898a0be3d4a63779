//! Atelier - a static asset build pipeline with watch mode and live reload.

mod asset;
mod cli;
mod config;
mod freshness;
mod logger;
mod serve;
mod task;
mod utils;
mod watch;

use std::sync::Arc;

use anyhow::Result;
use clap::{ColorChoice, Parser};

use asset::AssetClass;
use cli::{Cli, Commands};
use config::PipelineConfig;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    logger::set_verbose(cli.verbose);

    let config = Arc::new(PipelineConfig::load(&cli)?);

    match cli.command.unwrap_or(Commands::Dev) {
        Commands::Html => run_single(&config, AssetClass::Html),
        Commands::Font => run_single(&config, AssetClass::Font),
        Commands::Img => run_single(&config, AssetClass::Image),
        Commands::Sass => run_single(&config, AssetClass::Style),
        Commands::Js => run_single(&config, AssetClass::Script),
        Commands::Clean => task::clean(&config),
        Commands::Watch => watch::run(&config),
        Commands::Serve => serve::run(config),
        Commands::Dev => dev(config),
    }
}

/// Run one build task and print its outcome.
fn run_single(config: &PipelineConfig, class: AssetClass) -> Result<()> {
    let outcome = task::run(config, class);
    crate::log!(class.label(); "{}", outcome.summary());
    Ok(())
}

/// Default composition: clean, full parallel build, then watch + serve.
///
/// The build group fully settles before the watcher and server start,
/// so the first served build is always complete.
fn dev(config: Arc<PipelineConfig>) -> Result<()> {
    task::clean(&config)?;
    task::run_all(&config);

    let watch_config = Arc::clone(&config);
    std::thread::spawn(move || {
        if let Err(e) = watch::run(&watch_config) {
            crate::log!("watch"; "watch loop stopped: {e:#}");
        }
    });

    serve::run(config)
}
