// =====
// TESTS: 7
// =====
//
// Theme runtime: directory bookkeeping, adapter rendering, follow behavior
// for local messages and the fallback adapter.

use chatview::host::{CallMode, HostSettings, StaticHost};
use chatview::theme::{AdapterFactory, Theme, ThemeUtil};
use chatview::view::{ChatView, ScrollMetrics, SimulatedSurface};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::rc::Rc;
use std::time::Instant;

use crate::helpers::{body, message, settings, sync_theme};

#[test]
fn join_colors_later_messages_and_logs_a_system_line() {
    let (mut theme, _) = sync_theme(settings(), 80, 10);
    theme
        .receive_object(&json!({"type": "message", "mtype": "join", "sender": "eve",
                                "nickcolor": "#123456", "time": "2024-03-01T10:00:00"}))
        .unwrap();
    theme.receive_object(&message("eve", "hi", "2024-03-01T10:01:00")).unwrap();

    assert_eq!(theme.users().nick_color("eve"), Some("#123456"));
    let markup = body(&theme);
    assert!(markup.contains(
        "<div class=\"sys\" style=\"color:#808080\"><span class=\"time\">[10:00]</span> *** eve has joined the room</div>"
    ));
    assert!(markup.contains("<span class=\"nick\" style=\"color:#123456\">eve</span>: hi"));
}

#[test]
fn silent_part_only_updates_the_directory() {
    let (mut theme, _) = sync_theme(settings(), 80, 10);
    theme
        .receive_object(&json!({"type": "message", "mtype": "join", "sender": "eve", "nopartjoin": true}))
        .unwrap();
    theme
        .receive_object(&json!({"type": "message", "mtype": "part", "sender": "eve", "nopartjoin": true}))
        .unwrap();
    assert!(theme.users().is_empty());
    assert_eq!(body(&theme), "");
}

#[test]
fn nick_change_moves_the_directory_entry() {
    let (mut theme, _) = sync_theme(settings(), 80, 10);
    theme
        .receive_object(&json!({"type": "message", "mtype": "join", "sender": "eve",
                                "avatar": "eve.png", "nopartjoin": true}))
        .unwrap();
    theme
        .receive_object(&json!({"type": "message", "mtype": "newnick", "sender": "eve",
                                "newnick": "eva", "time": "2024-03-01T10:00:00"}))
        .unwrap();
    assert!(theme.users().get("eve").is_none());
    assert_eq!(theme.users().avatar_for_nick("eva"), Some("eve.png"));
    assert!(body(&theme).contains("eve is now known as eva"));
}

#[test]
fn clear_empties_the_view_and_restarts_date_separators() {
    let (mut theme, _) = sync_theme(settings(), 80, 10);
    theme.receive_object(&message("bob", "a", "2024-03-01T09:00:00")).unwrap();
    theme.receive_object(&message("bob", "b", "2024-03-01T09:01:00")).unwrap();
    assert_eq!(body(&theme).matches("date-separator").count(), 1);

    theme.receive_object(&json!({"type": "clear"})).unwrap();
    assert_eq!(body(&theme), "");
    theme.receive_object(&message("bob", "c", "2024-03-01T09:02:00")).unwrap();
    assert!(body(&theme).starts_with("<div class=\"date-separator\">Friday, 1 March 2024</div>"));
}

#[test]
fn local_message_pulls_the_view_back_down() {
    let (mut theme, surface) = sync_theme(settings(), 80, 4);
    for i in 0..20 {
        theme.receive_object(&message("bob", &format!("m{i}"), "2024-03-01T09:00:00")).unwrap();
    }
    theme.view_mut().settle();
    surface.user_scroll_to(0);
    theme.view_mut().process_notifications();
    assert!(!theme.view().follower().wants_follow());

    theme.receive_object(&message("bob", "remote", "2024-03-01T09:00:00")).unwrap();
    theme.view_mut().settle();
    assert_eq!(surface.scroll_offset(), 0);

    let mut local = message("me", "mine", "2024-03-01T09:00:00");
    local["local"] = json!(true);
    theme.receive_object(&local).unwrap();
    theme.view_mut().settle();
    assert_eq!(surface.scroll_offset(), surface.bottom_offset());
    assert!(theme.view().follower().wants_follow());
}

#[test]
fn broken_adapter_falls_back_to_error_banners() {
    let util =
        ThemeUtil::new(CallMode::Synchronous, Rc::new(StaticHost::new(HostSettings::default())));
    let surface = SimulatedSurface::new(80, 10);
    let view = ChatView::new(Box::new(surface.clone()), true, Instant::now());
    let factory: AdapterFactory = Box::new(|_| Err(anyhow::anyhow!("theme script missing")));
    let mut theme = Theme::new(view, util, factory);

    assert_eq!(theme.adapter_name(), "fallback");
    theme.receive_object(&message("bob", "hi", "2024-03-01T09:00:00")).unwrap();
    let rows = surface.rows();
    assert_eq!(rows[0], "Adapter is not loaded. output impossible!");
    assert!(rows.iter().any(|row| row.contains("message = String(\"hi\")")));
}

#[test]
fn clear_then_refill_stays_pinned_to_the_bottom() {
    let (mut theme, surface) = sync_theme(settings(), 40, 3);
    for i in 0..10 {
        theme.receive_object(&message("bob", &format!("m{i}"), "2024-03-01T09:00:00")).unwrap();
    }
    theme.view_mut().settle();
    assert_eq!(surface.scroll_offset(), surface.bottom_offset());

    theme.receive_object(&json!({"type": "clear"})).unwrap();
    theme.view_mut().settle();
    assert!(theme.view().follower().wants_follow());

    for i in 0..10 {
        theme.receive_object(&message("bob", &format!("n{i}"), "2024-03-01T09:00:00")).unwrap();
    }
    theme.view_mut().settle();
    assert!(surface.bottom_offset() > 0);
    assert_eq!(surface.scroll_offset(), surface.bottom_offset());
    assert!(theme.view().follower().wants_follow());
}
