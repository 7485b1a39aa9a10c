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

//! Optional JSON configuration, merged under the command line.

use crate::Cli;
use crate::error::AppError;
use crate::host::{CallMode, HostSettings};
use anyhow::Context as _;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const CONFIG_DIR: &str = "chatview-rs";
const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Config {
    pub call_mode: CallMode,
    pub animate_scroll: bool,
    /// Overrides the host's time format option.
    pub time_format: Option<String>,
    /// External host program followed by its arguments.
    pub host_command: Vec<String>,
    /// Answers of the in-process host.
    pub host: HostSettings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            call_mode: CallMode::default(),
            animate_scroll: true,
            time_format: None,
            host_command: Vec::new(),
            host: HostSettings::default(),
        }
    }
}

/// `<config dir>/chatview-rs/config.json`, if the platform has a config dir.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILE))
}

impl Config {
    /// Reads the file at `explicit`, or the default path when it exists.
    ///
    /// An explicit path must be readable; a missing default file yields the
    /// built-in defaults.
    pub fn load(explicit: Option<&Path>) -> anyhow::Result<Self> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => match default_config_path() {
                Some(path) if path.is_file() => path,
                _ => {
                    tracing::debug!("no config file, using defaults");
                    return Ok(Self::default());
                }
            },
        };
        let text = std::fs::read_to_string(&path)
            .map_err(|_| anyhow::Error::new(AppError::ConfigInvalid))
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let mut config = Self::parse(&text)
            .with_context(|| format!("failed to parse config {}", path.display()))?;
        if let Some(base) = path.parent() {
            config.resolve_paths(base);
        }
        tracing::info!(config = %path.display(), "loaded configuration");
        Ok(config)
    }

    pub fn parse(text: &str) -> anyhow::Result<Self> {
        serde_json::from_str(text).map_err(|err| {
            anyhow::Error::new(AppError::ConfigInvalid).context(format!("invalid config JSON: {err}"))
        })
    }

    /// Relative resource directories are taken relative to the config file.
    fn resolve_paths(&mut self, base: &Path) {
        if let Some(dir) = self.host.resource_dir.as_mut()
            && dir.is_relative()
        {
            *dir = base.join(&*dir);
        }
    }

    /// Command-line flags win over file values.
    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(mode) = cli.call_mode {
            self.call_mode = mode;
        }
        if cli.no_animate {
            self.animate_scroll = false;
        }
        if let Some(format) = cli.time_format.as_ref() {
            self.time_format = Some(format.clone());
        }
        if let Some(command) = cli.host_command.as_deref() {
            self.host_command = command.split_whitespace().map(str::to_owned).collect();
        }
        if let Some(dir) = cli.resource_dir.as_ref() {
            self.host.resource_dir = Some(dir.clone());
        }
    }
}
