// =====
// TESTS: 6
// =====
//
// Scroll-follow engine driven through a chat view on a headless surface,
// on a virtual clock.

use chatview::view::{ChatView, FollowPhase, ScrollMetrics, SimulatedSurface};
use pretty_assertions::assert_eq;
use std::time::{Duration, Instant};

const TICK: Duration = Duration::from_millis(70);

fn view_with_rows(rows: usize, animate: bool) -> (ChatView, SimulatedSurface, Instant) {
    let start = Instant::now();
    let surface = SimulatedSurface::new(40, 10);
    let mut view = ChatView::new(Box::new(surface.clone()), animate, start);
    for i in 0..rows {
        view.append_html(&format!("<p>row {i}</p>")).unwrap();
    }
    (view, surface, start)
}

#[test]
fn animation_catches_up_in_shrinking_steps() {
    let (mut view, surface, start) = view_with_rows(50, true);
    view.invalidate();
    assert_eq!(view.follower().phase(), FollowPhase::Animating);

    let mut offsets = Vec::new();
    for tick in 0..4 {
        view.fire_due_timers(start + TICK * tick);
        offsets.push(surface.scroll_offset());
    }
    assert_eq!(offsets, vec![23, 33, 40, 40]);
    assert_eq!(view.follower().phase(), FollowPhase::Idle);
    assert!(view.follower().wants_follow());
    assert_eq!(surface.visible_rows().last().map(String::as_str), Some("row 49"));
}

#[test]
fn jump_mode_reaches_bottom_on_first_tick() {
    let (mut view, surface, start) = view_with_rows(50, false);
    view.invalidate();
    view.fire_due_timers(start);
    assert_eq!(surface.scroll_offset(), 40);
}

#[test]
fn user_scroll_stops_following_until_forced() {
    let (mut view, surface, start) = view_with_rows(50, true);
    view.invalidate();
    view.fire_due_timers(start);
    assert_eq!(surface.scroll_offset(), 23);

    surface.user_scroll_by(-5);
    view.process_notifications();
    assert!(!view.follower().wants_follow());
    assert!(!view.follower().is_animating());

    view.append_html("<p>late</p>").unwrap();
    view.invalidate();
    view.settle();
    assert_eq!(surface.scroll_offset(), 18);

    view.force_follow();
    view.settle();
    assert_eq!(surface.scroll_offset(), 41);
    assert!(view.follower().wants_follow());
}

#[test]
fn scrolling_back_to_the_bottom_resumes_following() {
    let (mut view, surface, _) = view_with_rows(30, false);
    view.invalidate();
    view.settle();
    surface.user_scroll_to(0);
    view.process_notifications();
    assert!(!view.follower().wants_follow());

    surface.user_scroll_to(20);
    view.process_notifications();
    assert!(view.follower().wants_follow());
}

#[test]
fn resize_repins_after_settle_tick() {
    let (mut view, surface, start) = view_with_rows(50, false);
    view.invalidate();
    view.settle();
    assert_eq!(surface.scroll_offset(), 40);

    surface.set_viewport(40, 5);
    view.process_notifications();
    // the jump waits for the zero-delay settle timer
    assert_eq!(surface.scroll_offset(), 40);
    assert!(view.next_deadline().is_some());

    view.fire_due_timers(start + TICK * 10);
    assert_eq!(surface.scroll_offset(), 45);
    assert!(view.follower().wants_follow());
}

#[test]
fn viewport_taller_than_content_keeps_following() {
    let start = Instant::now();
    let surface = SimulatedSurface::new(40, 3);
    let mut view = ChatView::new(Box::new(surface.clone()), false, start);
    for i in 0..5 {
        view.append_html(&format!("<p>row {i}</p>")).unwrap();
    }
    view.invalidate();
    view.settle();
    assert_eq!(surface.scroll_offset(), 2);

    surface.set_viewport(40, 10);
    view.process_notifications();
    view.settle();
    assert_eq!(surface.scroll_offset(), 0);
    assert!(view.follower().wants_follow());

    for i in 5..15 {
        view.append_html(&format!("<p>row {i}</p>")).unwrap();
        view.invalidate();
    }
    view.settle();
    assert_eq!(surface.scroll_offset(), 5);
    assert_eq!(surface.visible_rows().last().map(String::as_str), Some("row 14"));
}
