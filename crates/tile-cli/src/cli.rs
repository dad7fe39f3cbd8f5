// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Command-line surface.

use clap::{Parser, Subcommand};

/// Read and paint LAN tile lights.
#[derive(Parser, Debug)]
#[command(name = "tilectl", author, version, about)]
pub struct Cli {
    /// Light address (`ip` or `ip:port`); overrides the stored address
    #[arg(long, global = true)]
    pub address: Option<String>,
    /// Device MAC (aa:bb:cc:dd:ee:ff); overrides the stored target
    #[arg(long, global = true)]
    pub target: Option<String>,
    /// Give up after this many milliseconds
    #[arg(long, global = true, default_value_t = 5000)]
    pub timeout_ms: u64,
    /// What to do
    #[command(subcommand)]
    pub command: Command,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Read every tile and print the board
    Get {
        /// Dump the board as JSON instead of a glyph grid
        #[arg(long)]
        json: bool,
    },
    /// Paint every tile with one color
    Set {
        /// Hue in degrees
        #[arg(long, default_value_t = 0.0)]
        hue: f64,
        /// Saturation, 0.0 to 1.0
        #[arg(long, default_value_t = 0.0)]
        saturation: f64,
        /// Brightness, 0.0 to 1.0
        #[arg(long)]
        brightness: f64,
        /// Color temperature in kelvin
        #[arg(long, default_value_t = 3500)]
        kelvin: u16,
        /// Fade duration in milliseconds
        #[arg(long, default_value_t = 0)]
        transition_ms: u64,
        /// Wait for the light to acknowledge every frame
        #[arg(long)]
        ack: bool,
    },
    /// Manage stored preferences
    Config {
        /// Config action
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// `config` subcommands.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ConfigAction {
    /// Write default preferences, keeping the effective address and target
    Init {
        /// Overwrite existing preferences
        #[arg(long)]
        force: bool,
    },
    /// Print the effective preferences as JSON
    Show,
}
