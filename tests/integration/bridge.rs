// =====
// TESTS: 6
// =====
//
// Remote call bridge: synchronous and asynchronous hosts behind one
// callback contract, and the host link the drivers use.

use chatview::app::{HostLink, build_theme};
use chatview::config::Config;
use chatview::error::AppError;
use chatview::host::{
    BridgeError, CallMode, ChannelHost, Host, HostMethod, Reply, StaticHost, serve_requests,
};
use chatview::theme::ThemeUtil;
use chatview::view::SimulatedSurface;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

use crate::helpers::{body, message, settings};

type Seen = Rc<RefCell<Vec<Result<Value, String>>>>;

fn recorder() -> (Seen, impl Fn() -> Box<dyn FnOnce(Result<Value, BridgeError>)>) {
    let seen: Seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    let make = move || -> Box<dyn FnOnce(Result<Value, BridgeError>)> {
        let sink = Rc::clone(&sink);
        Box::new(move |r: Result<Value, BridgeError>| {
            sink.borrow_mut().push(r.map_err(|e| e.to_string()));
        })
    };
    (seen, make)
}

/// Answers every option with the same raw text.
struct RawHost(&'static str);

impl Host for RawHost {
    fn call(&self, _method: HostMethod, _args: Vec<Value>) -> Result<Value, BridgeError> {
        Ok(Value::from(self.0))
    }

    fn call_deferred(
        &self,
        method: HostMethod,
        args: Vec<Value>,
        reply: Reply,
    ) -> Result<(), BridgeError> {
        reply.send(self.call(method, args)?);
        Ok(())
    }
}

#[test]
fn sync_call_completes_before_returning() {
    let util = ThemeUtil::new(CallMode::Synchronous, Rc::new(StaticHost::new(settings())));
    let (seen, make) = recorder();
    util.psi_option("options.ui.look.chat.time-format", make()).unwrap();
    util.psi_option("options.not.there", make()).unwrap();
    assert_eq!(*seen.borrow(), vec![Ok(json!("HH:mm")), Ok(Value::Null)]);
}

#[test]
fn unparsable_literal_is_a_protocol_mismatch() {
    let util = ThemeUtil::new(CallMode::Synchronous, Rc::new(RawHost("{oops")));
    let (seen, make) = recorder();
    util.color_option("any", make()).unwrap();
    let seen = seen.borrow();
    assert_eq!(seen.len(), 1);
    assert!(seen[0].as_ref().unwrap_err().contains("unparsable literal for color_option"));
}

#[tokio::test]
async fn async_call_completes_when_the_reply_arrives() {
    let local = tokio::task::LocalSet::new();
    local
        .run_until(async {
            let (request_tx, request_rx) = mpsc::unbounded_channel();
            let (reply_tx, mut reply_rx) = mpsc::unbounded_channel();
            tokio::task::spawn_local(serve_requests(
                StaticHost::new(settings()),
                request_rx,
                reply_tx,
            ));
            let host = Rc::new(ChannelHost::new(request_tx));
            let util = ThemeUtil::new(CallMode::Asynchronous, host.clone());

            let (seen, make) = recorder();
            util.psi_option("options.ui.look.chat.time-format", make()).unwrap();
            assert!(seen.borrow().is_empty());
            assert_eq!(host.pending_count(), 1);

            let reply = reply_rx.recv().await.unwrap();
            assert!(host.deliver(reply));
            assert_eq!(*seen.borrow(), vec![Ok(json!("HH:mm"))]);
            assert_eq!(host.pending_count(), 0);
        })
        .await;
}

#[tokio::test]
async fn async_palette_color_is_delivered_plain() {
    let local = tokio::task::LocalSet::new();
    local
        .run_until(async {
            let mut settings = settings();
            settings.palette.insert("Base".to_owned(), "#fafafa".to_owned());
            let config =
                Config { call_mode: CallMode::Asynchronous, host: settings, ..Config::default() };
            let mut link = HostLink::connect(&config).unwrap();
            let util = ThemeUtil::new(CallMode::Asynchronous, link.host());

            let color = Rc::new(RefCell::new(None));
            let sink = Rc::clone(&color);
            util.get_palette_color("Base", move |v| *sink.borrow_mut() = Some(v)).unwrap();
            link.settle(Duration::from_secs(1)).await.unwrap();
            assert_eq!(*color.borrow(), Some(json!("#fafafa")));
            assert_eq!(link.pending(), 0);
            link.shutdown().await.unwrap();
        })
        .await;
}

#[tokio::test]
async fn theme_settings_apply_once_the_host_answers() {
    let local = tokio::task::LocalSet::new();
    local
        .run_until(async {
            let config =
                Config { call_mode: CallMode::Asynchronous, host: settings(), ..Config::default() };
            let mut link = HostLink::connect(&config).unwrap();
            let surface = SimulatedSurface::new(80, 10);
            let mut theme = build_theme(&config, &link, Box::new(surface), Instant::now());

            // default pattern until the host's time format arrives
            theme.receive_object(&message("bob", "early", "2024-03-01T21:05:00")).unwrap();
            assert!(body(&theme).contains("[9:05]"));

            link.settle(Duration::from_secs(1)).await.unwrap();
            theme.receive_object(&message("bob", "late", "2024-03-01T21:06:00")).unwrap();
            assert!(body(&theme).contains("[21:06]"));
            drop(theme);
            link.shutdown().await.unwrap();
        })
        .await;
}

#[test]
fn host_command_needs_async_mode() {
    let config = Config { host_command: vec!["somehost".to_owned()], ..Config::default() };
    let err = HostLink::connect(&config).err().unwrap();
    let app = err.chain().find_map(|c| c.downcast_ref::<AppError>());
    assert_eq!(app, Some(&AppError::ConfigInvalid));
}
