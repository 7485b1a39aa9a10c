// chatview-rs - Themeable chat view runtime for embedded hosts
// Copyright (C) 2025  Simon Peter Rothgang
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as
// published by the Free Software Foundation, either version 3 of the
// License, or (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

pub mod app;
pub mod config;
pub mod error;
pub mod format;
pub mod host;
pub mod theme;
pub mod ui;
pub mod view;

use clap::{Parser, Subcommand};
use host::CallMode;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "chatview-rs", version, about = "Themeable chat view runtime")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// How the theme reaches its host
    #[arg(long, value_enum, global = true)]
    pub call_mode: Option<CallMode>,

    /// External host program and arguments, e.g. "myhost --stdio" (async mode only)
    #[arg(long, global = true)]
    pub host_command: Option<String>,

    /// Directory theme resources are loaded from
    #[arg(long, global = true)]
    pub resource_dir: Option<PathBuf>,

    /// Time pattern overriding the host option
    #[arg(long, global = true)]
    pub time_format: Option<String>,

    /// Jump to the bottom instead of animating
    #[arg(long, global = true)]
    pub no_animate: bool,

    /// Configuration file (defaults to the platform config dir)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Write tracing diagnostics to this file
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    /// Tracing filter directives, e.g. "chatview=debug" (falls back to RUST_LOG)
    #[arg(long, global = true)]
    pub log_filter: Option<String>,

    /// Append to the log file instead of truncating it
    #[arg(long, global = true)]
    pub log_append: bool,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Translate a time pattern and optionally format a timestamp with it
    Pattern {
        pattern: String,
        /// Timestamp to format (RFC 3339, `YYYY-MM-DD HH:MM:SS` or epoch milliseconds)
        #[arg(long)]
        at: Option<String>,
    },
    /// Feed an event log through a headless view and print the result
    Replay {
        /// JSON lines, one chat event per line
        events: PathBuf,
        /// Print wrapped text rows instead of markup
        #[arg(long)]
        text: bool,
        #[arg(long, default_value_t = 80)]
        width: u16,
        #[arg(long, default_value_t = 24)]
        height: u16,
    },
    /// Replay an event log into an interactive terminal view
    View {
        events: PathBuf,
        /// Delay between events
        #[arg(long, default_value_t = 400)]
        interval_ms: u64,
    },
}
