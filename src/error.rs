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

use crate::host::BridgeError;
use crate::view::MarkupError;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AppError {
    #[error("Host program not found")]
    HostUnavailable,
    #[error("Host process failed")]
    HostCrashed,
    #[error("Configuration invalid")]
    ConfigInvalid,
    #[error("Event log unreadable")]
    EventLogUnreadable,
    #[error("Invalid timestamp")]
    InvalidTimestamp,
}

impl AppError {
    pub const HOST_UNAVAILABLE_EXIT_CODE: i32 = 20;
    pub const HOST_CRASHED_EXIT_CODE: i32 = 21;
    pub const CONFIG_INVALID_EXIT_CODE: i32 = 22;
    pub const EVENT_LOG_UNREADABLE_EXIT_CODE: i32 = 23;
    pub const INVALID_TIMESTAMP_EXIT_CODE: i32 = 24;

    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::HostUnavailable => Self::HOST_UNAVAILABLE_EXIT_CODE,
            Self::HostCrashed => Self::HOST_CRASHED_EXIT_CODE,
            Self::ConfigInvalid => Self::CONFIG_INVALID_EXIT_CODE,
            Self::EventLogUnreadable => Self::EVENT_LOG_UNREADABLE_EXIT_CODE,
            Self::InvalidTimestamp => Self::INVALID_TIMESTAMP_EXIT_CODE,
        }
    }

    #[must_use]
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::HostUnavailable => {
                "Host program not found. Check --host-command and ensure the program is on PATH."
            }
            Self::HostCrashed => "The host process exited or stopped answering.",
            Self::ConfigInvalid => {
                "The configuration file could not be parsed. Fix it or pass --config with another path."
            }
            Self::EventLogUnreadable => "The event log could not be read.",
            Self::InvalidTimestamp => {
                "The timestamp could not be parsed. Use RFC 3339, `YYYY-MM-DD HH:MM:SS` or epoch milliseconds."
            }
        }
    }
}

/// Failures inside the theme runtime.
#[derive(Debug, thiserror::Error)]
pub enum ThemeError {
    #[error("file {path} is empty, can't parse markup")]
    EmptyResource { path: String },
    #[error("failed to parse markup from {path}")]
    Markup {
        path: String,
        #[source]
        source: MarkupError,
    },
    #[error(transparent)]
    Bridge(#[from] BridgeError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_are_distinct() {
        let all = [
            AppError::HostUnavailable,
            AppError::HostCrashed,
            AppError::ConfigInvalid,
            AppError::EventLogUnreadable,
            AppError::InvalidTimestamp,
        ];
        let mut codes: Vec<i32> = all.iter().map(AppError::exit_code).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), all.len());
        assert!(all.iter().all(|e| !e.user_message().is_empty()));
    }
}
