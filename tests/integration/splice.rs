// =====
// TESTS: 4
// =====
//
// Message edits through the theme: marker lookup, splice, edited indicator
// and the fallback when the original is not on screen.

use chatview::view::{EDITED_INDICATOR, SpliceOutcome, replaceable_message};
use pretty_assertions::assert_eq;
use serde_json::json;

use crate::helpers::{body, settings, sync_theme};

fn with_id(id: &str, text: &str) -> serde_json::Value {
    json!({"type": "message", "sender": "bob", "message": text, "id": id,
           "time": "2024-03-01T09:05:00"})
}

fn edit(replace_id: &str, id: &str, text: &str) -> serde_json::Value {
    json!({"type": "message", "sender": "bob", "message": text, "id": id,
           "replaceId": replace_id, "time": "2024-03-01T09:06:00"})
}

#[test]
fn edit_replaces_the_body_in_place() {
    let (mut theme, surface) = sync_theme(settings(), 80, 10);
    theme.receive_object(&with_id("m1", "helo")).unwrap();
    theme.receive_object(&with_id("m9", "next")).unwrap();
    theme.receive_object(&edit("m1", "m2", "hello")).unwrap();

    let markup = body(&theme);
    assert!(markup.contains(&replaceable_message("m2", &format!("hello{EDITED_INDICATOR}"))));
    assert!(!markup.contains("helo"));
    // the edit stays where the original was
    assert!(markup.find("hello").unwrap() < markup.find("next").unwrap());
    assert!(surface.rows().iter().any(|row| row.ends_with("bob: hello[edited]")));
}

#[test]
fn chained_edits_follow_the_new_id() {
    let (mut theme, _) = sync_theme(settings(), 80, 10);
    theme.receive_object(&with_id("m1", "one")).unwrap();
    theme.receive_object(&edit("m1", "m2", "two")).unwrap();
    theme.receive_object(&edit("m2", "m3", "three")).unwrap();

    let markup = body(&theme);
    assert!(markup.contains("three"));
    assert!(!markup.contains("two<"));
    assert_eq!(markup.matches("msg\"").count(), 1);
}

#[test]
fn edit_of_unrendered_message_is_appended() {
    let (mut theme, _) = sync_theme(settings(), 80, 10);
    theme.receive_object(&with_id("m1", "first")).unwrap();
    theme.receive_object(&edit("gone", "m5", "orphan")).unwrap();

    let markup = body(&theme);
    assert_eq!(markup.matches("class=\"msg\"").count(), 2);
    assert!(markup.contains(&replaceable_message("m5", "orphan")));
}

#[test]
fn view_reports_why_a_splice_failed() {
    let (mut theme, _) = sync_theme(settings(), 80, 10);
    theme
        .view_mut()
        .append_html("<div><marker-start mid=\"x\"></marker-start>a</div><marker-end mid=\"x\"></marker-end>")
        .unwrap();
    let before = body(&theme);
    let outcome = theme.view_mut().replace_message("x", "y", "b").unwrap();
    assert_eq!(outcome, SpliceOutcome::ParentMismatch);
    assert_eq!(body(&theme), before);

    let outcome = theme.view_mut().replace_message("nope", "y", "b").unwrap();
    assert_eq!(outcome, SpliceOutcome::MarkersMissing { start: true, end: true });
}
