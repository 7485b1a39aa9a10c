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

use crate::config::Config;
use crate::error::AppError;
use crate::host::process::{HostProcess, resolve_host_launcher};
use crate::host::{CallMode, ChannelHost, Host, HostReply, StaticHost, serve_requests};
use anyhow::Context as _;
use std::rc::Rc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

struct ChannelLink {
    host: Rc<ChannelHost>,
    replies: mpsc::UnboundedReceiver<HostReply>,
    task: JoinHandle<anyhow::Result<()>>,
}

/// The host a theme talks to, plus the reply pump for asynchronous hosts.
///
/// Synchronous mode answers from the configured [`crate::host::HostSettings`]
/// in place. Asynchronous mode sends requests over a channel, served either
/// by an in-process task or by an external `--host-command` program.
pub struct HostLink {
    host: Rc<dyn Host>,
    channel: Option<ChannelLink>,
}

impl HostLink {
    /// Must be called inside a `LocalSet` when asynchronous.
    pub fn connect(config: &Config) -> anyhow::Result<Self> {
        match config.call_mode {
            CallMode::Synchronous => {
                if !config.host_command.is_empty() {
                    return Err(anyhow::Error::new(AppError::ConfigInvalid))
                        .context("a host command requires --call-mode async");
                }
                tracing::debug!("using in-process synchronous host");
                Ok(Self { host: Rc::new(StaticHost::new(config.host.clone())), channel: None })
            }
            CallMode::Asynchronous => {
                let (request_tx, request_rx) = mpsc::unbounded_channel();
                let (reply_tx, replies) = mpsc::unbounded_channel();
                let task = if config.host_command.is_empty() {
                    tracing::debug!("serving asynchronous host requests in process");
                    let host = StaticHost::new(config.host.clone());
                    tokio::task::spawn_local(async move {
                        serve_requests(host, request_rx, reply_tx).await;
                        Ok(())
                    })
                } else {
                    let launcher = resolve_host_launcher(&config.host_command)?;
                    tracing::info!("starting host process: {}", launcher.describe());
                    HostProcess::spawn(&launcher)?.start(request_rx, reply_tx)
                };
                let host = Rc::new(ChannelHost::new(request_tx));
                let shared: Rc<dyn Host> = Rc::<ChannelHost>::clone(&host);
                Ok(Self { host: shared, channel: Some(ChannelLink { host, replies, task }) })
            }
        }
    }

    #[must_use]
    pub fn host(&self) -> Rc<dyn Host> {
        Rc::clone(&self.host)
    }

    /// Requests still waiting for an answer.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.channel.as_ref().map_or(0, |c| c.host.pending_count())
    }

    /// Waits for the next reply; never resolves for synchronous hosts.
    pub async fn next_reply(&mut self) -> Option<HostReply> {
        match self.channel.as_mut() {
            Some(channel) => channel.replies.recv().await,
            None => std::future::pending().await,
        }
    }

    pub fn deliver(&self, reply: HostReply) {
        if let Some(channel) = self.channel.as_ref() {
            channel.host.deliver(reply);
        }
    }

    /// Delivers every reply that already arrived. Returns how many.
    pub fn deliver_ready(&mut self) -> usize {
        let Some(channel) = self.channel.as_mut() else {
            return 0;
        };
        let mut delivered = 0;
        while let Ok(reply) = channel.replies.try_recv() {
            channel.host.deliver(reply);
            delivered += 1;
        }
        delivered
    }

    /// Pumps replies until no request is pending. Gives up with a warning
    /// after `timeout`; a host that went away is an error.
    pub async fn settle(&mut self, timeout: Duration) -> anyhow::Result<()> {
        let Some(channel) = self.channel.as_mut() else {
            return Ok(());
        };
        let deadline = tokio::time::Instant::now() + timeout;
        while channel.host.pending_count() > 0 {
            match tokio::time::timeout_at(deadline, channel.replies.recv()).await {
                Ok(Some(reply)) => {
                    channel.host.deliver(reply);
                }
                Ok(None) => {
                    return Err(anyhow::Error::new(AppError::HostCrashed)).context(format!(
                        "host stopped answering with {} request(s) pending",
                        channel.host.pending_count()
                    ));
                }
                Err(_) => {
                    tracing::warn!(
                        pending = channel.host.pending_count(),
                        "host did not answer within {timeout:?}"
                    );
                    break;
                }
            }
        }
        Ok(())
    }

    /// Stops the host task. A host task that already failed reports its error.
    pub async fn shutdown(self) -> anyhow::Result<()> {
        let Some(channel) = self.channel else {
            return Ok(());
        };
        drop(channel.replies);
        if channel.task.is_finished() {
            return match channel.task.await {
                Ok(Ok(())) => Ok(()),
                Ok(Err(err)) => Err(anyhow::Error::new(AppError::HostCrashed))
                    .context(format!("host task failed: {err:#}")),
                Err(err) => Err(anyhow::anyhow!("host task panicked: {err}")),
            };
        }
        channel.task.abort();
        Ok(())
    }
}
