// =====
// TESTS: 4
// =====
//
// Headless replay of event logs, in both call modes.

use chatview::app::run_replay;
use chatview::config::Config;
use chatview::error::AppError;
use chatview::host::CallMode;
use pretty_assertions::assert_eq;

use crate::helpers::settings;

const LOG: &str = r#"{"type":"message","mtype":"join","sender":"eve","time":"2024-03-01T09:00:00"}
{"type":"message","sender":"eve","message":"hi all","id":"e1","time":"2024-03-01T09:01:00"}

{"type":"message","sender":"eve","message":"hi everyone","id":"e2","replaceId":"e1","time":"2024-03-01T09:02:00"}
{"type":"message","sender":"bob","message":"<icon name=\"smile\" text=\":)\"></icon>","time":"2024-03-01T09:03:00"}
"#;

fn write_log(dir: &tempfile::TempDir, text: &str) -> std::path::PathBuf {
    let path = dir.path().join("events.jsonl");
    std::fs::write(&path, text).unwrap();
    path
}

async fn replay(mode: CallMode, text: bool, height: u16) -> String {
    let dir = tempfile::tempdir().unwrap();
    let path = write_log(&dir, LOG);
    let config =
        Config { call_mode: mode, animate_scroll: true, host: settings(), ..Config::default() };
    let local = tokio::task::LocalSet::new();
    local.run_until(run_replay(&config, &path, text, 80, height)).await.unwrap()
}

#[tokio::test]
async fn text_replay_shows_the_bottom_of_the_chat() {
    let out = replay(CallMode::Synchronous, true, 3).await;
    assert_eq!(
        out,
        "[09:00] *** eve has joined the room\n[09:01] eve: hi everyone[edited]\n[09:03] bob: [:)]\n"
    );
}

#[tokio::test]
async fn async_mode_renders_the_same_markup() {
    let sync = replay(CallMode::Synchronous, false, 24).await;
    let async_out = replay(CallMode::Asynchronous, false, 24).await;
    assert_eq!(sync, async_out);
    assert!(sync.contains("<img src=\"/psiicon/smile\" title=\":)\">"));
}

#[tokio::test]
async fn malformed_log_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_log(&dir, "{\"type\":\"clear\"}\n{broken\n");
    let local = tokio::task::LocalSet::new();
    let err = local
        .run_until(run_replay(&Config::default(), &path, true, 80, 24))
        .await
        .unwrap_err();
    let app = err.chain().find_map(|c| c.downcast_ref::<AppError>());
    assert_eq!(app, Some(&AppError::EventLogUnreadable));
}

#[tokio::test]
async fn unknown_event_types_are_ignored() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_log(&dir, "{\"type\":\"typing\",\"sender\":\"bob\"}\n");
    let local = tokio::task::LocalSet::new();
    let out = local
        .run_until(run_replay(&Config::default(), &path, false, 80, 24))
        .await
        .unwrap();
    assert_eq!(out, "\n");
}
