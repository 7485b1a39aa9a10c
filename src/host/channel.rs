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

use super::bridge::{BridgeError, CallMode, Host, Reply};
use super::wire::{HostMethod, HostReply, HostRequest};
use serde_json::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use tokio::sync::mpsc;

/// Asynchronous host reached by message passing.
///
/// Each deferred call is sent as a [`HostRequest`]; its [`Reply`] waits in
/// the pending map until [`ChannelHost::deliver`] sees the matching
/// [`HostReply`].
pub struct ChannelHost {
    outbox: mpsc::UnboundedSender<HostRequest>,
    pending: RefCell<HashMap<String, Reply>>,
}

impl ChannelHost {
    #[must_use]
    pub fn new(outbox: mpsc::UnboundedSender<HostRequest>) -> Self {
        Self { outbox, pending: RefCell::new(HashMap::new()) }
    }

    /// Fires the reply waiting for `reply.request_id`.
    /// Returns `false` for unknown or already answered ids.
    pub fn deliver(&self, reply: HostReply) -> bool {
        // Released before firing: the callback may issue new calls.
        let waiting = self.pending.borrow_mut().remove(&reply.request_id);
        match waiting {
            Some(callback) => {
                callback.send(reply.value);
                true
            }
            None => {
                tracing::warn!(request_id = %reply.request_id, "reply for unknown host request");
                false
            }
        }
    }

    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.pending.borrow().len()
    }
}

impl Host for ChannelHost {
    fn call(&self, method: HostMethod, _args: Vec<Value>) -> Result<Value, BridgeError> {
        Err(BridgeError::ModeMismatch { method, mode: CallMode::Synchronous })
    }

    fn call_deferred(
        &self,
        method: HostMethod,
        args: Vec<Value>,
        reply: Reply,
    ) -> Result<(), BridgeError> {
        let request_id = uuid::Uuid::new_v4().to_string();
        self.pending.borrow_mut().insert(request_id.clone(), reply);
        let request = HostRequest { request_id: request_id.clone(), method, args };
        if self.outbox.send(request).is_err() {
            self.pending.borrow_mut().remove(&request_id);
            return Err(BridgeError::ChannelClosed);
        }
        tracing::debug!(%request_id, %method, "host request queued");
        Ok(())
    }
}

/// Answers requests from `requests` with `host`, as an out-of-process host
/// would. Runs until either channel closes.
pub async fn serve_requests(
    host: impl Host,
    mut requests: mpsc::UnboundedReceiver<HostRequest>,
    replies: mpsc::UnboundedSender<HostReply>,
) {
    while let Some(request) = requests.recv().await {
        let value = match host.call(request.method, request.args) {
            Ok(value) => value,
            Err(err) => {
                tracing::error!("host request {} failed: {err}", request.request_id);
                Value::Null
            }
        };
        if replies.send(HostReply { request_id: request.request_id, value }).is_err() {
            break;
        }
    }
}
