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

pub mod chat;
pub mod theme;

use crate::app::Viewer;
use crate::view::FollowPhase;
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

const HEADER_HEIGHT: u16 = 1;
const FOOTER_HEIGHT: u16 = 1;

struct Areas {
    header: Rect,
    body: Rect,
    footer: Rect,
}

fn layout(area: Rect) -> Areas {
    let [header, body, footer] = Layout::vertical([
        Constraint::Length(HEADER_HEIGHT),
        Constraint::Min(1),
        Constraint::Length(FOOTER_HEIGHT),
    ])
    .areas(area);
    Areas { header, body, footer }
}

/// The part of a frame of `area` the chat surface occupies.
#[must_use]
pub fn chat_area(area: Rect) -> Rect {
    layout(area).body
}

pub fn render(frame: &mut Frame, viewer: &Viewer) {
    let areas = layout(frame.area());
    render_header(frame, areas.header, viewer);
    viewer.surface.render(frame, areas.body);
    render_footer(frame, areas.footer, viewer);
}

fn follow_label(viewer: &Viewer) -> (&'static str, Color) {
    let follower = viewer.theme.view().follower();
    match (follower.phase(), follower.wants_follow()) {
        (FollowPhase::Animating, _) => ("catching up", theme::ANIMATING),
        (FollowPhase::Idle, true) => ("following", theme::FOLLOWING),
        (FollowPhase::Idle, false) => ("scrolled back", theme::DETACHED),
    }
}

fn render_header(frame: &mut Frame, area: Rect, viewer: &Viewer) {
    let (label, color) = follow_label(viewer);
    let line = Line::from(vec![
        Span::styled(
            " chatview ",
            Style::default().fg(theme::ACCENT).add_modifier(Modifier::BOLD),
        ),
        Span::styled(theme::SEPARATOR_CHAR, Style::default().fg(theme::DIM)),
        Span::styled(
            format!(" {} ", viewer.theme.adapter_name()),
            Style::default().fg(theme::DIM),
        ),
        Span::styled(theme::SEPARATOR_CHAR, Style::default().fg(theme::DIM)),
        Span::styled(format!(" {label}"), Style::default().fg(color)),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

fn render_footer(frame: &mut Frame, area: Rect, viewer: &Viewer) {
    let dim = Style::default().fg(theme::DIM);
    let mut spans = vec![Span::styled(
        format!(" {}/{} events", viewer.delivered(), viewer.total()),
        Style::default().fg(Color::White),
    )];
    if viewer.paused {
        spans.push(Span::styled("  paused", Style::default().fg(theme::DETACHED)));
    }
    spans.push(Span::styled(
        "  ↑↓/PgUp/PgDn scroll  f follow  space pause  n next  q quit",
        dim,
    ));
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
