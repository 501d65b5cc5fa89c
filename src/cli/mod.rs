//! CLI Module
//!
//! Command-line front end for inspecting recordings.

pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::SourceOptions;
use crate::engine::LoadStrategy;
use crate::error::Result;

/// Inspect timestamped multi-channel WAV recordings
#[derive(Parser, Debug)]
#[command(name = "wavsource")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Map the recording into memory instead of reading it
    #[arg(long, global = true)]
    pub mmap: bool,

    /// JSON file with source options
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print format, start time, scales and INFO text
    #[command(name = "info")]
    Info {
        /// Recording to inspect
        file: PathBuf,
    },

    /// Print frames as comma-separated values
    #[command(name = "dump")]
    Dump {
        /// Recording to read
        file: PathBuf,

        /// First frame to print
        #[arg(short, long, default_value_t = 0)]
        start: usize,

        /// Number of frames to print (default: to the end)
        #[arg(short = 'n', long)]
        count: Option<usize>,

        /// Multiply samples by their channel scale
        #[arg(long)]
        scaled: bool,
    },
}

impl Cli {
    /// Source options from `--config`, then `--mmap`.
    pub fn options(&self) -> Result<SourceOptions> {
        let mut options = match &self.config {
            Some(path) => SourceOptions::from_json_file(path)?,
            None => SourceOptions::default(),
        };
        if self.mmap {
            options.strategy = LoadStrategy::Map;
        }
        Ok(options)
    }
}
