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

use super::Viewer;
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEventKind};

const MOUSE_SCROLL_LINES: i64 = 3;

pub fn handle_terminal_event(viewer: &mut Viewer, event: Event) {
    match event {
        Event::Key(key) if key.kind == KeyEventKind::Press => handle_key(viewer, key),
        Event::Mouse(mouse) => match mouse.kind {
            MouseEventKind::ScrollUp => viewer.scroll_by(-MOUSE_SCROLL_LINES),
            MouseEventKind::ScrollDown => viewer.scroll_by(MOUSE_SCROLL_LINES),
            _ => {}
        },
        // Resize is picked up by the fit before the next draw
        _ => {}
    }
}

fn handle_key(viewer: &mut Viewer, key: KeyEvent) {
    match (key.code, key.modifiers) {
        (KeyCode::Char('q') | KeyCode::Esc, _) | (KeyCode::Char('c'), KeyModifiers::CONTROL) => {
            viewer.should_quit = true;
        }
        (KeyCode::Up | KeyCode::Char('k'), _) => viewer.scroll_by(-1),
        (KeyCode::Down | KeyCode::Char('j'), _) => viewer.scroll_by(1),
        (KeyCode::PageUp, _) => viewer.scroll_by(-viewer.page()),
        (KeyCode::PageDown, _) => viewer.scroll_by(viewer.page()),
        (KeyCode::Home, _) => viewer.scroll_to(0),
        (KeyCode::End, _) => viewer.scroll_to_end(),
        (KeyCode::Char('f'), _) => viewer.force_follow(),
        (KeyCode::Char(' '), _) => viewer.paused = !viewer.paused,
        (KeyCode::Char('n'), _) => {
            viewer.feed_next();
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{CallMode, HostSettings, StaticHost};
    use crate::theme::{BasicAdapter, Theme, ThemeUtil};
    use crate::ui::chat::TerminalSurface;
    use crate::view::{ChatView, ScrollMetrics};
    use ratatui::layout::Rect;
    use serde_json::json;
    use std::rc::Rc;
    use std::time::Instant;

    fn viewer(messages: usize) -> Viewer {
        let surface = TerminalSurface::new();
        let util =
            ThemeUtil::new(CallMode::Synchronous, Rc::new(StaticHost::new(HostSettings::default())));
        let view = ChatView::new(Box::new(surface.clone()), false, Instant::now());
        let theme = Theme::new(view, util, BasicAdapter::factory(Some("HH:mm".to_owned())));
        let events = (0..messages)
            .map(|i| {
                json!({"type": "message", "sender": "bob", "message": format!("line {i}"),
                       "time": "2024-03-01T09:00:00"})
            })
            .collect();
        let mut viewer = Viewer::new(theme, surface, events);
        viewer.fit(Rect::new(0, 0, 40, 5));
        viewer
    }

    fn press(viewer: &mut Viewer, code: KeyCode) {
        handle_terminal_event(viewer, Event::Key(KeyEvent::new(code, KeyModifiers::NONE)));
        viewer.theme.view_mut().settle();
    }

    #[test]
    fn feeding_follows_the_bottom() {
        let mut viewer = viewer(12);
        while viewer.feed_next() {
            viewer.theme.view_mut().settle();
        }
        assert_eq!(viewer.delivered(), 12);
        assert_eq!(viewer.surface.scroll_offset(), viewer.surface.max_offset());
        assert!(viewer.theme.view().follower().wants_follow());
    }

    #[test]
    fn user_scroll_detaches_and_f_reattaches() {
        let mut viewer = viewer(12);
        while viewer.feed_next() {}
        viewer.theme.view_mut().settle();

        press(&mut viewer, KeyCode::PageUp);
        assert!(!viewer.theme.view().follower().wants_follow());
        let parked = viewer.surface.scroll_offset();
        assert!(parked < viewer.surface.max_offset());

        press(&mut viewer, KeyCode::Char('f'));
        assert!(viewer.theme.view().follower().wants_follow());
        assert_eq!(viewer.surface.scroll_offset(), viewer.surface.max_offset());
    }

    #[test]
    fn quit_and_pause_keys() {
        let mut viewer = viewer(1);
        press(&mut viewer, KeyCode::Char(' '));
        assert!(viewer.paused);
        press(&mut viewer, KeyCode::Char('n'));
        assert_eq!(viewer.delivered(), 1);
        press(&mut viewer, KeyCode::Char('q'));
        assert!(viewer.should_quit);
    }
}
