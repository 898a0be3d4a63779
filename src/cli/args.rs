//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::net::IpAddr;
use std::path::PathBuf;

/// Atelier asset pipeline CLI
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (default: atelier.toml)
    #[arg(short = 'C', long, default_value = "atelier.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Source directory path (overrides [paths].source)
    #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
    pub source: Option<PathBuf>,

    /// Output directory path (overrides [paths].output)
    #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
    pub output: Option<PathBuf>,

    /// Network interface to bind (e.g., 127.0.0.1, 0.0.0.0)
    #[arg(short, long)]
    pub interface: Option<IpAddr>,

    /// Port number to listen on
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Enable verbose output for debugging
    #[arg(long)]
    pub verbose: bool,

    /// Operation to run; defaults to `dev` when omitted
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available operations
#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commands {
    /// Minify HTML into the output root
    Html,

    /// Copy fonts into the output root
    Font,

    /// Optimize images into the output root
    #[command(visible_alias = "copy-img")]
    Img,

    /// Compile SCSS into css/style.css
    Sass,

    /// Minify scripts into script.js
    Js,

    /// Serve the output directory with live reload
    #[command(visible_alias = "start-server")]
    Serve,

    /// Remove the output directory
    Clean,

    /// Rebuild asset classes as their sources change
    Watch,

    /// Clean, build everything, then watch and serve (default)
    Dev,
}
