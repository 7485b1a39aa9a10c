// =====
// TESTS: 5
// =====
//
// Format pattern translation as themes and the `pattern` command see it.

use chatview::app::run_pattern;
use chatview::format::{DateTimeFormatter, date_format};
use chatview::host::{CallMode, HostSettings, StaticHost};
use chatview::theme::ThemeUtil;
use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use std::rc::Rc;

fn at(h: u32, m: u32) -> chrono::NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 3, 1).unwrap().and_hms_opt(h, m, 0).unwrap()
}

#[test]
fn percent_and_quoted_patterns_agree() {
    let percent = DateTimeFormatter::new(Some("%H:%M"));
    let quoted = DateTimeFormatter::new(Some("HH:mm"));
    assert_eq!(percent.format(at(9, 5)).unwrap(), "09:05");
    assert_eq!(quoted.format(at(9, 5)).unwrap(), "09:05");
}

#[test]
fn util_date_format_defaults_to_short_clock() {
    let util =
        ThemeUtil::new(CallMode::Synchronous, Rc::new(StaticHost::new(HostSettings::default())));
    assert_eq!(util.date_format(at(14, 30), None).unwrap(), "2:30");
    assert_eq!(util.date_format(at(14, 30), Some("h:mm a")).unwrap(), "2:30 pm");
}

#[test]
fn quoted_literals_survive_translation() {
    assert_eq!(date_format(at(21, 0), Some("H 'o''clock'")).unwrap(), "21 o'clock");
    // an unterminated literal runs to the end of the pattern
    assert_eq!(date_format(at(21, 0), Some("HH 'at night")).unwrap(), "21 at night");
}

#[test]
fn pattern_command_prints_translation_and_time() {
    assert_eq!(run_pattern("j:mm", None).unwrap(), "h:mm");
    assert_eq!(
        run_pattern("EEEE, d MMMM", Some("2024-03-01 09:05:00")).unwrap(),
        "dddd, d MMMM\nFriday, 1 March"
    );
}

#[test]
fn pattern_command_rejects_garbage_time() {
    assert!(run_pattern("HH:mm", Some("not a time")).is_err());
}
