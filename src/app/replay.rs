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

use super::{HostLink, SETTLE_TIMEOUT, build_theme, deliver_event};
use crate::config::Config;
use crate::error::AppError;
use crate::view::SimulatedSurface;
use anyhow::Context as _;
use serde_json::Value;
use std::path::Path;
use std::time::Instant;

/// Reads a JSON-lines event log. Blank lines are skipped.
pub fn read_events(path: &Path) -> anyhow::Result<Vec<Value>> {
    let text = std::fs::read_to_string(path)
        .map_err(|_| anyhow::Error::new(AppError::EventLogUnreadable))
        .with_context(|| format!("failed to read event log {}", path.display()))?;
    parse_events(&text).with_context(|| format!("in event log {}", path.display()))
}

pub fn parse_events(text: &str) -> anyhow::Result<Vec<Value>> {
    let mut events = Vec::new();
    for (index, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let event = serde_json::from_str(line).map_err(|err| {
            anyhow::Error::new(AppError::EventLogUnreadable)
                .context(format!("line {}: {err}", index + 1))
        })?;
        events.push(event);
    }
    Ok(events)
}

/// Feeds `events` through a headless view of `width` x `height` and returns
/// either the body markup or the rows left in the viewport.
pub async fn replay_events(
    config: &Config,
    events: &[Value],
    text: bool,
    width: u16,
    height: u16,
) -> anyhow::Result<String> {
    let mut link = HostLink::connect(config)?;
    let surface = SimulatedSurface::new(width, height);
    let mut theme = build_theme(config, &link, Box::new(surface.clone()), Instant::now());
    link.settle(SETTLE_TIMEOUT).await?;

    for event in events {
        deliver_event(&mut theme, event);
        link.settle(SETTLE_TIMEOUT).await?;
        theme.view_mut().settle();
    }
    tracing::info!(events = events.len(), adapter = theme.adapter_name(), "replay finished");

    let output = if text {
        let mut rows = surface.visible_rows().join("\n");
        rows.push('\n');
        rows
    } else {
        let view = theme.view();
        let mut markup = view.document().inner_markup(view.root());
        markup.push('\n');
        markup
    };
    drop(theme);
    link.shutdown().await?;
    Ok(output)
}

pub async fn run_replay(
    config: &Config,
    path: &Path,
    text: bool,
    width: u16,
    height: u16,
) -> anyhow::Result<String> {
    let events = read_events(path)?;
    replay_events(config, &events, text, width, height).await
}
