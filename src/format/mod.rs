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

//! Date/time display patterns.
//!
//! Theme options carry time patterns in percent style (`%H:%M`) or in
//! quoted-literal style (`h:mm 'o''clock'`). Both are normalized into one
//! bracketed target syntax (`h:mm[ o'clock]`) which is compiled once and
//! rendered with chrono.

mod formatter;
mod pattern;
mod render;

pub use formatter::{DEFAULT_PATTERN, DateTimeFormatter, DateValue, DayTracker, FormatError, date_format};
pub use pattern::{convert_percent_pattern, convert_quoted_pattern, translate_pattern};
pub use render::{Field, TargetPattern, Token};
