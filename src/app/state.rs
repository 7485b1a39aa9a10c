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

use crate::theme::Theme;
use crate::ui::chat::TerminalSurface;
use ratatui::layout::Rect;
use serde_json::Value;
use std::collections::VecDeque;

/// Interactive viewer: the theme being fed, the surface it draws on and the
/// events still waiting to be delivered.
pub struct Viewer {
    pub theme: Theme,
    pub surface: TerminalSurface,
    queue: VecDeque<Value>,
    total: usize,
    pub paused: bool,
    pub should_quit: bool,
}

impl Viewer {
    pub fn new(theme: Theme, surface: TerminalSurface, events: Vec<Value>) -> Self {
        let total = events.len();
        Self { theme, surface, queue: events.into(), total, paused: false, should_quit: false }
    }

    #[must_use]
    pub fn has_pending(&self) -> bool {
        !self.queue.is_empty()
    }

    #[must_use]
    pub fn delivered(&self) -> usize {
        self.total - self.queue.len()
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.total
    }

    /// Delivers the next queued event. Returns `false` when none is left.
    pub fn feed_next(&mut self) -> bool {
        let Some(event) = self.queue.pop_front() else {
            return false;
        };
        super::deliver_event(&mut self.theme, &event);
        true
    }

    /// Fits the surface to the chat area and lets the follower see any
    /// resulting resize or clamp.
    pub fn fit(&mut self, area: Rect) {
        self.surface.set_viewport(area.width, area.height);
        self.theme.view_mut().process_notifications();
    }

    pub fn scroll_by(&mut self, delta: i64) {
        self.surface.user_scroll_by(delta);
        self.theme.view_mut().process_notifications();
    }

    pub fn scroll_to(&mut self, offset: i64) {
        self.surface.user_scroll_to(offset);
        self.theme.view_mut().process_notifications();
    }

    pub fn scroll_to_end(&mut self) {
        let end = self.surface.max_offset();
        self.scroll_to(end);
    }

    pub fn force_follow(&mut self) {
        self.theme.view_mut().force_follow();
    }

    /// Rows a page key moves.
    #[must_use]
    pub fn page(&self) -> i64 {
        let (_, height) = self.surface.viewport();
        i64::from(height.saturating_sub(1).max(1))
    }
}
