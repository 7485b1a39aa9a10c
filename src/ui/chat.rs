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

use crate::ui::theme;
use crate::view::{Document, NodeId, ScrollMetrics, ScrollSurface, SurfaceNotification};
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Paragraph, Wrap};
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Debug, Default)]
struct ChatState {
    width: u16,
    height: u16,
    lines: Vec<Line<'static>>,
    content_height: usize,
    offset: i64,
    notifications: Vec<SurfaceNotification>,
}

impl ChatState {
    fn paragraph(&self) -> Paragraph<'static> {
        Paragraph::new(Text::from(self.lines.clone())).wrap(Wrap { trim: false })
    }

    // line_count gives the real wrapped height
    fn measure(&mut self) {
        self.content_height =
            if self.width == 0 { self.lines.len() } else { self.paragraph().line_count(self.width) };
    }

    fn max_offset(&self) -> i64 {
        (i64::try_from(self.content_height).unwrap_or(i64::MAX) - i64::from(self.height)).max(0)
    }

    fn set_offset(&mut self, offset: i64) {
        let clamped = offset.clamp(0, self.max_offset());
        if clamped != self.offset {
            self.offset = clamped;
            self.notifications.push(SurfaceNotification::Scrolled);
        }
    }
}

/// Scroll surface backed by a wrapped ratatui paragraph.
///
/// Clones share state: the chat view owns one handle, the event loop keeps
/// another to resize, scroll and draw.
#[derive(Debug, Clone, Default)]
pub struct TerminalSurface {
    state: Rc<RefCell<ChatState>>,
}

impl TerminalSurface {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fits the surface to the chat area. Queues a resize notification when
    /// the size changed.
    pub fn set_viewport(&self, width: u16, height: u16) {
        let mut state = self.state.borrow_mut();
        if state.width == width && state.height == height {
            return;
        }
        state.width = width;
        state.height = height;
        state.measure();
        state.notifications.push(SurfaceNotification::Resized);
        let offset = state.offset;
        state.set_offset(offset);
    }

    pub fn user_scroll_by(&self, delta: i64) {
        let mut state = self.state.borrow_mut();
        let target = state.offset.saturating_add(delta);
        state.set_offset(target);
    }

    pub fn user_scroll_to(&self, offset: i64) {
        self.state.borrow_mut().set_offset(offset);
    }

    #[must_use]
    pub fn max_offset(&self) -> i64 {
        self.state.borrow().max_offset()
    }

    #[must_use]
    pub fn viewport(&self) -> (u16, u16) {
        let state = self.state.borrow();
        (state.width, state.height)
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let state = self.state.borrow();
        let offset = u16::try_from(state.offset).unwrap_or(u16::MAX);
        frame.render_widget(state.paragraph().scroll((offset, 0)), area);
    }
}

impl ScrollMetrics for TerminalSurface {
    fn content_height(&self) -> i64 {
        i64::try_from(self.state.borrow().content_height).unwrap_or(i64::MAX)
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

impl ScrollSurface for TerminalSurface {
    fn reflow(&mut self, document: &Document) {
        let mut state = self.state.borrow_mut();
        state.lines = document_lines(document);
        state.measure();
        let offset = state.offset;
        state.set_offset(offset);
    }

    fn take_notifications(&mut self) -> Vec<SurfaceNotification> {
        std::mem::take(&mut self.state.borrow_mut().notifications)
    }
}

/// Styled lines for each top-level block of the body.
fn document_lines(document: &Document) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    for &node in document.children(document.root()) {
        let style = block_style(document, node);
        let nick = has_class(document, node, "msg").then(|| nick_of(document, node)).flatten();
        for (i, text) in document.node_text_lines(node).into_iter().enumerate() {
            match &nick {
                Some((name, color)) if i == 0 => lines.push(message_line(text, name, *color)),
                _ => lines.push(Line::styled(text, style)),
            }
        }
    }
    lines
}

fn has_class(document: &Document, node: NodeId, class: &str) -> bool {
    document.attr(node, "class").is_some_and(|c| c.split_whitespace().any(|c| c == class))
}

fn block_style(document: &Document, node: NodeId) -> Style {
    if has_class(document, node, "critical-error") {
        Style::default()
            .fg(theme::CRITICAL_ERROR_FG)
            .bg(theme::CRITICAL_ERROR_BG)
            .add_modifier(Modifier::BOLD)
    } else if has_class(document, node, "date-separator") {
        Style::default().fg(theme::DATE_SEPARATOR).add_modifier(Modifier::BOLD)
    } else if has_class(document, node, "sys") {
        let fg = document.attr(node, "style").and_then(style_color).unwrap_or(theme::SYSTEM_LINE);
        Style::default().fg(fg)
    } else {
        Style::default()
    }
}

fn nick_of(document: &Document, node: NodeId) -> Option<(String, Color)> {
    let span = document.query(node, "span", "class", "nick")?;
    let name = document.node_text_lines(span).join(" ");
    let color = document.attr(span, "style").and_then(style_color).unwrap_or(theme::ACCENT);
    (!name.is_empty()).then_some((name, color))
}

/// Splits the first line of a message around the sender's nick.
fn message_line(text: String, nick: &str, color: Color) -> Line<'static> {
    let Some(pos) = text.find(nick) else {
        return Line::raw(text);
    };
    let (head, rest) = text.split_at(pos);
    let (name, tail) = rest.split_at(nick.len());
    Line::from(vec![
        Span::styled(head.to_owned(), Style::default().fg(theme::DIM)),
        Span::styled(name.to_owned(), Style::default().fg(color).add_modifier(Modifier::BOLD)),
        Span::raw(tail.to_owned()),
    ])
}

/// The `color` declaration of an inline style, e.g. `color:#aa0000`.
pub fn style_color(style: &str) -> Option<Color> {
    style.split(';').find_map(|decl| {
        let (name, value) = decl.split_once(':')?;
        if name.trim() == "color" { value.trim().parse().ok() } else { None }
    })
}
