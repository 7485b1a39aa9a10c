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

use super::wire::HostMethod;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// How the host answers calls. Fixed for the lifetime of a theme.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum CallMode {
    /// Same-process host: calls return their value directly.
    #[default]
    #[value(name = "sync")]
    #[serde(alias = "sync")]
    Synchronous,
    /// Out-of-process host: results arrive later through a reply callback.
    #[value(name = "async")]
    #[serde(alias = "async")]
    Asynchronous,
}

#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error("host returned an unparsable literal for {method}: {source}")]
    ProtocolMismatch {
        method: HostMethod,
        #[source]
        source: serde_json::Error,
    },
    #[error("host cannot answer {method} in {mode:?} mode")]
    ModeMismatch { method: HostMethod, mode: CallMode },
    #[error("host call {method} failed: {message}")]
    HostFailed { method: HostMethod, message: String },
    #[error("host request channel closed")]
    ChannelClosed,
}

/// Completion callback handed to an asynchronous host.
///
/// Consumed by [`Reply::send`], so it fires at most once.
pub struct Reply(Box<dyn FnOnce(Value)>);

impl Reply {
    pub fn new(on_result: impl FnOnce(Value) + 'static) -> Self {
        Self(Box::new(on_result))
    }

    pub fn send(self, value: Value) {
        (self.0)(value);
    }
}

impl fmt::Debug for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Reply(..)")
    }
}

/// The host's call surface.
pub trait Host {
    /// Answers a call directly.
    fn call(&self, method: HostMethod, args: Vec<Value>) -> Result<Value, BridgeError>;

    /// Accepts a call and fires `reply` exactly once, now or later.
    fn call_deferred(
        &self,
        method: HostMethod,
        args: Vec<Value>,
        reply: Reply,
    ) -> Result<(), BridgeError>;

    /// Logging sink for theme diagnostics.
    fn console(&self, text: &str) {
        tracing::info!(target: "host_console", "{text}");
    }
}

/// Presents sync and async hosts through one callback contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemoteCall {
    mode: CallMode,
}

impl RemoteCall {
    #[must_use]
    pub fn new(mode: CallMode) -> Self {
        Self { mode }
    }

    #[must_use]
    pub fn mode(&self) -> CallMode {
        self.mode
    }

    /// Calls `method` on the host and delivers its result to `on_result`.
    ///
    /// In synchronous mode `on_result` has fired by the time this returns.
    /// In asynchronous mode it fires whenever the host replies; a host that
    /// never replies leaves it pending forever.
    pub fn invoke<F>(
        &self,
        host: &dyn Host,
        method: HostMethod,
        args: Vec<Value>,
        on_result: F,
    ) -> Result<(), BridgeError>
    where
        F: FnOnce(Value) + 'static,
    {
        match self.mode {
            CallMode::Asynchronous => host.call_deferred(method, args, Reply::new(on_result)),
            CallMode::Synchronous => {
                let value = host.call(method, args)?;
                on_result(value);
                Ok(())
            }
        }
    }

    /// Like [`RemoteCall::invoke`] for hosts that answer with a serialized
    /// literal. The literal is decoded before delivery; a decode failure is
    /// delivered as `Err` instead of a value.
    pub fn invoke_literal<F>(
        &self,
        host: &dyn Host,
        method: HostMethod,
        args: Vec<Value>,
        on_result: F,
    ) -> Result<(), BridgeError>
    where
        F: FnOnce(Result<Value, BridgeError>) + 'static,
    {
        self.invoke(host, method, args, move |raw| on_result(decode_literal(method, raw)))
    }
}

/// Decodes a host value that arrives as literal text.
///
/// Blank text stands for "no value". Values that are already structured
/// pass through unchanged.
pub fn decode_literal(method: HostMethod, raw: Value) -> Result<Value, BridgeError> {
    match raw {
        Value::String(text) if text.trim().is_empty() => Ok(Value::Null),
        Value::String(text) => serde_json::from_str(&text)
            .map_err(|source| BridgeError::ProtocolMismatch { method, source }),
        other => Ok(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Echoes its first argument; deferred calls are parked until released.
    #[derive(Default)]
    struct EchoHost {
        parked: RefCell<Vec<(Value, Reply)>>,
    }

    impl EchoHost {
        fn release_all(&self) {
            let parked = std::mem::take(&mut *self.parked.borrow_mut());
            for (value, reply) in parked {
                reply.send(value);
            }
        }
    }

    impl Host for EchoHost {
        fn call(&self, _method: HostMethod, args: Vec<Value>) -> Result<Value, BridgeError> {
            Ok(args.into_iter().next().unwrap_or(Value::Null))
        }

        fn call_deferred(
            &self,
            _method: HostMethod,
            args: Vec<Value>,
            reply: Reply,
        ) -> Result<(), BridgeError> {
            let value = args.into_iter().next().unwrap_or(Value::Null);
            self.parked.borrow_mut().push((value, reply));
            Ok(())
        }
    }

    #[test]
    fn sync_result_is_delivered_before_return() {
        let host = EchoHost::default();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        RemoteCall::new(CallMode::Synchronous)
            .invoke(&host, HostMethod::GetPaletteColor, vec![json!("#102030")], move |v| {
                sink.borrow_mut().push(v);
            })
            .unwrap();
        assert_eq!(*seen.borrow(), vec![json!("#102030")]);
    }

    #[test]
    fn async_result_waits_for_host_reply() {
        let host = EchoHost::default();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        RemoteCall::new(CallMode::Asynchronous)
            .invoke(&host, HostMethod::GetPaletteColor, vec![json!(7)], move |v| {
                sink.borrow_mut().push(v);
            })
            .unwrap();
        assert!(seen.borrow().is_empty());
        host.release_all();
        assert_eq!(*seen.borrow(), vec![json!(7)]);
    }

    #[test]
    fn literal_is_decoded() {
        assert_eq!(
            decode_literal(HostMethod::PsiOption, json!("{\"size\": 11}")).unwrap(),
            json!({"size": 11})
        );
        assert_eq!(decode_literal(HostMethod::PsiOption, json!("  ")).unwrap(), Value::Null);
        assert_eq!(decode_literal(HostMethod::PsiOption, json!(true)).unwrap(), json!(true));
    }

    #[test]
    fn bad_literal_is_propagated_to_callback() {
        let host = EchoHost::default();
        let seen = Rc::new(RefCell::new(None));
        let sink = Rc::clone(&seen);
        RemoteCall::new(CallMode::Synchronous)
            .invoke_literal(&host, HostMethod::ColorOption, vec![json!("#zz")], move |r| {
                *sink.borrow_mut() = Some(r);
            })
            .unwrap();
        let result = seen.borrow_mut().take().unwrap();
        assert!(matches!(
            result,
            Err(BridgeError::ProtocolMismatch { method: HostMethod::ColorOption, .. })
        ));
    }
}
