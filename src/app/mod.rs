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

//! Command drivers: pattern translation, headless replay and the terminal
//! viewer.

mod events;
mod host_link;
mod replay;
mod state;

pub use host_link::HostLink;
pub use replay::{parse_events, read_events, replay_events, run_replay};
pub use state::Viewer;

use crate::config::Config;
use crate::error::AppError;
use crate::format::{DateTimeFormatter, DateValue};
use crate::theme::{BasicAdapter, Theme, ThemeUtil};
use crate::ui::chat::TerminalSurface;
use crate::view::{ChatView, ScrollSurface};
use anyhow::Context as _;
use crossterm::event::EventStream;
use futures::{FutureExt as _, StreamExt};
use serde_json::Value;
use std::path::Path;
use std::time::{Duration, Instant};

/// How long a driver waits for an asynchronous host before moving on.
pub const SETTLE_TIMEOUT: Duration = Duration::from_secs(5);

/// Builds the chat view and theme on `surface`, talking to `link`'s host.
pub fn build_theme(
    config: &Config,
    link: &HostLink,
    surface: Box<dyn ScrollSurface>,
    now: Instant,
) -> Theme {
    let util = ThemeUtil::new(config.call_mode, link.host());
    let view = ChatView::new(surface, config.animate_scroll, now);
    Theme::new(view, util, BasicAdapter::factory(config.time_format.clone()))
}

/// Hands one event to the theme. Adapter failures become an in-view banner.
pub fn deliver_event(theme: &mut Theme, event: &Value) {
    if let Err(err) = theme.receive_object(event) {
        tracing::error!("adapter failed to handle event: {err:#}");
        theme.show_critical_error(&format!("{err:#}"));
    }
}

/// Translates `pattern` and, with `at`, formats that timestamp with it.
pub fn run_pattern(pattern: &str, at: Option<&str>) -> anyhow::Result<String> {
    let formatter = DateTimeFormatter::new(Some(pattern));
    let mut out = formatter.pattern().to_owned();
    if let Some(at) = at {
        let value = at.parse::<i64>().map_or_else(|_| DateValue::from(at), DateValue::from);
        let formatted = formatter
            .format(value)
            .map_err(|err| anyhow::Error::new(AppError::InvalidTimestamp).context(err.to_string()))?;
        out.push('\n');
        out.push_str(&formatted);
    }
    Ok(out)
}

/// Replays `events_path` into the terminal, one event per `interval_ms`.
pub async fn run_view(config: &Config, events_path: &Path, interval_ms: u64) -> anyhow::Result<()> {
    let events = read_events(events_path)?;
    let mut link = HostLink::connect(config)?;
    let surface = TerminalSurface::new();
    let theme = build_theme(config, &link, Box::new(surface.clone()), Instant::now());
    link.settle(SETTLE_TIMEOUT).await.context("host did not deliver theme settings")?;
    let mut viewer = Viewer::new(theme, surface, events);

    let mut terminal = ratatui::init();
    let _ = crossterm::execute!(std::io::stdout(), crossterm::event::EnableMouseCapture);

    let interval = Duration::from_millis(interval_ms.max(1));
    let result = drive(&mut terminal, &mut viewer, &mut link, interval).await;

    let _ = crossterm::execute!(std::io::stdout(), crossterm::event::DisableMouseCapture);
    ratatui::restore();

    drop(viewer);
    let shutdown = link.shutdown().await;
    result.and(shutdown)
}

async fn drive(
    terminal: &mut ratatui::DefaultTerminal,
    viewer: &mut Viewer,
    link: &mut HostLink,
    interval: Duration,
) -> anyhow::Result<()> {
    let mut events = EventStream::new();
    let mut feed = tokio::time::interval(interval);
    feed.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    let frame_duration = Duration::from_millis(16);
    let mut last_render = Instant::now();

    loop {
        // Phase 1: wait for input, a host reply, the next event, a follow
        // timer or the next frame tick
        let mut wait = frame_duration.saturating_sub(last_render.elapsed());
        if let Some(deadline) = viewer.theme.view().next_deadline() {
            wait = wait.min(deadline.saturating_duration_since(Instant::now()));
        }
        let feeding = viewer.has_pending() && !viewer.paused;
        tokio::select! {
            Some(Ok(event)) = events.next() => {
                events::handle_terminal_event(viewer, event);
            }
            Some(reply) = link.next_reply() => {
                link.deliver(reply);
            }
            _ = feed.tick(), if feeding => {
                viewer.feed_next();
            }
            () = tokio::time::sleep(wait) => {}
        }

        // Phase 2: drain whatever else is ready
        while let Some(Some(Ok(event))) = events.next().now_or_never() {
            events::handle_terminal_event(viewer, event);
        }
        link.deliver_ready();

        if viewer.should_quit {
            break;
        }

        // Phase 3: fit, run due timers, render once
        let size = terminal.size()?;
        viewer.fit(crate::ui::chat_area(ratatui::layout::Rect::new(0, 0, size.width, size.height)));
        viewer.theme.view_mut().fire_due_timers(Instant::now());
        terminal.draw(|f| crate::ui::render(f, viewer))?;
        last_render = Instant::now();
    }

    Ok(())
}
