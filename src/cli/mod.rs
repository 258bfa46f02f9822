//! CLI module for vedit
//!
//! This module handles command-line argument parsing and command execution.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub mod args;
pub mod commands;

/// vedit - trim, re-encode and thumbnail video clips
#[derive(Parser, Debug)]
#[command(name = "vedit")]
#[command(about = "Trim, re-encode and thumbnail video clips")]
#[command(version)]
#[command(long_about = None)]
pub struct Cli {
    /// Configuration file (default: vedit.toml or config/vedit.toml)
    #[arg(long, global = true, env = "VEDIT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Logging level, overriding the configuration
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Log format (pretty or json), overriding the configuration
    #[arg(long, global = true)]
    pub log_format: Option<String>,

    /// Directory for generated files, overriding the configuration
    #[arg(long, global = true)]
    pub output_dir: Option<PathBuf>,

    /// The command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Trim and re-encode a video file
    Edit(args::EditArgs),
    /// Extract a single frame as a JPEG thumbnail
    Thumbnail(args::ThumbnailArgs),
    /// Inspect video file tracks
    Probe(args::ProbeArgs),
}
