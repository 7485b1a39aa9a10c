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

//! Rendering surfaces the chat view scrolls.

use super::document::Document;
use super::scroll::ScrollMetrics;
use std::cell::RefCell;
use std::rc::Rc;
use unicode_width::UnicodeWidthChar;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceNotification {
    /// The scroll offset changed.
    Scrolled,
    /// The viewport changed size.
    Resized,
}

/// A scrollable surface that lays out the document body.
///
/// Surfaces queue a notification for every offset change, including changes
/// made through [`ScrollMetrics::scroll_to`], and never for a scroll that
/// leaves the offset where it was.
pub trait ScrollSurface: ScrollMetrics {
    /// Re-measures after the document changed.
    fn reflow(&mut self, document: &Document);
    fn take_notifications(&mut self) -> Vec<SurfaceNotification>;
}

#[derive(Debug, Default)]
struct SurfaceState {
    width: u16,
    height: u16,
    source: Vec<String>,
    rows: Vec<String>,
    offset: i64,
    notifications: Vec<SurfaceNotification>,
}

impl SurfaceState {
    fn max_offset(&self) -> i64 {
        (len_i64(self.rows.len()) - i64::from(self.height)).max(0)
    }

    fn set_offset(&mut self, offset: i64) {
        let clamped = offset.clamp(0, self.max_offset());
        if clamped != self.offset {
            self.offset = clamped;
            self.notifications.push(SurfaceNotification::Scrolled);
        }
    }

    fn rewrap(&mut self) {
        self.rows = wrap_lines(&self.source, self.width);
    }
}

/// Headless surface: one unit of height per wrapped text row.
///
/// Clones share state, so a driver can keep a handle after boxing one into a
/// chat view and scroll or resize it the way a user would.
#[derive(Debug, Clone, Default)]
pub struct SimulatedSurface {
    state: Rc<RefCell<SurfaceState>>,
}

impl SimulatedSurface {
    #[must_use]
    pub fn new(width: u16, height: u16) -> Self {
        let state = SurfaceState { width, height, ..SurfaceState::default() };
        Self { state: Rc::new(RefCell::new(state)) }
    }

    /// All wrapped rows.
    #[must_use]
    pub fn rows(&self) -> Vec<String> {
        self.state.borrow().rows.clone()
    }

    /// Rows inside the viewport.
    #[must_use]
    pub fn visible_rows(&self) -> Vec<String> {
        let state = self.state.borrow();
        let start = usize::try_from(state.offset).unwrap_or(0);
        state.rows.iter().skip(start).take(usize::from(state.height)).cloned().collect()
    }

    /// Scrolls as a user gesture would.
    pub fn user_scroll_to(&self, offset: i64) {
        self.state.borrow_mut().set_offset(offset);
    }

    pub fn user_scroll_by(&self, delta: i64) {
        let mut state = self.state.borrow_mut();
        let target = state.offset + delta;
        state.set_offset(target);
    }

    /// Resizes the viewport; the offset is clamped to the new extent.
    pub fn set_viewport(&self, width: u16, height: u16) {
        let mut state = self.state.borrow_mut();
        if state.width == width && state.height == height {
            return;
        }
        state.width = width;
        state.height = height;
        state.rewrap();
        state.notifications.push(SurfaceNotification::Resized);
        let offset = state.offset;
        state.set_offset(offset);
    }
}

impl ScrollMetrics for SimulatedSurface {
    fn content_height(&self) -> i64 {
        len_i64(self.state.borrow().rows.len())
    }

    fn viewport_height(&self) -> i64 {
        i64::from(self.state.borrow().height)
    }

    fn scroll_offset(&self) -> i64 {
        self.state.borrow().offset
    }

    fn scroll_to(&mut self, offset: i64) {
        self.state.borrow_mut().set_offset(offset);
    }
}

impl ScrollSurface for SimulatedSurface {
    fn reflow(&mut self, document: &Document) {
        let mut state = self.state.borrow_mut();
        state.source = document.text_lines(document.root());
        state.rewrap();
        // content may have shrunk below the current offset
        let offset = state.offset;
        state.set_offset(offset);
    }

    fn take_notifications(&mut self) -> Vec<SurfaceNotification> {
        std::mem::take(&mut self.state.borrow_mut().notifications)
    }
}

fn len_i64(len: usize) -> i64 {
    i64::try_from(len).unwrap_or(i64::MAX)
}

/// Wraps each line to `width` columns, breaking at spaces where possible.
/// A zero width disables wrapping.
#[must_use]
pub fn wrap_lines(lines: &[String], width: u16) -> Vec<String> {
    let width = usize::from(width);
    let mut rows = Vec::new();
    for line in lines {
        if width == 0 {
            rows.push(line.clone());
            continue;
        }
        wrap_line(line, width, &mut rows);
    }
    rows
}

fn wrap_line(line: &str, width: usize, rows: &mut Vec<String>) {
    let mut row = String::new();
    let mut row_width = 0;
    for word in line.split(' ') {
        let word_width: usize = word.chars().map(|c| c.width().unwrap_or(0)).sum();
        let sep = usize::from(!row.is_empty());
        if row_width + sep + word_width <= width {
            if sep == 1 {
                row.push(' ');
            }
            row.push_str(word);
            row_width += sep + word_width;
            continue;
        }
        if !row.is_empty() {
            rows.push(std::mem::take(&mut row));
            row_width = 0;
        }
        for c in word.chars() {
            let w = c.width().unwrap_or(0);
            if row_width + w > width && !row.is_empty() {
                rows.push(std::mem::take(&mut row));
                row_width = 0;
            }
            row.push(c);
            row_width += w;
        }
    }
    rows.push(row);
}
