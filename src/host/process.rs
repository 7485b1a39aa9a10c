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

use super::wire::{HostReply, HostRequest};
use crate::error::AppError;
use anyhow::Context as _;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt as _, AsyncWriteExt as _, BufReader, BufWriter};
use tokio::process::{Child, ChildStderr, ChildStdin, ChildStdout, Command};
use tokio::sync::mpsc;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HostLauncher {
    pub program: PathBuf,
    pub args: Vec<String>,
}

impl HostLauncher {
    #[must_use]
    pub fn describe(&self) -> String {
        let mut out = self.program.to_string_lossy().into_owned();
        for arg in &self.args {
            out.push(' ');
            out.push_str(arg);
        }
        out
    }

    #[must_use]
    pub fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        cmd.stdin(std::process::Stdio::piped());
        cmd.stdout(std::process::Stdio::piped());
        cmd.stderr(std::process::Stdio::piped());
        cmd.kill_on_drop(true);
        cmd
    }
}

/// Resolves `command_line` (program followed by its arguments) to a launcher.
pub fn resolve_host_launcher(command_line: &[String]) -> anyhow::Result<HostLauncher> {
    let Some((program, args)) = command_line.split_first() else {
        return Err(anyhow::anyhow!("host command is empty"));
    };
    let program = which::which(program)
        .map_err(|_| anyhow::Error::new(AppError::HostUnavailable))
        .with_context(|| format!("failed to resolve host program `{program}`"))?;
    Ok(HostLauncher { program, args: args.to_vec() })
}

/// An external host speaking [`HostRequest`]/[`HostReply`] JSON lines over stdio.
pub struct HostProcess {
    child: Child,
    stdin: BufWriter<ChildStdin>,
    stdout: Option<ChildStdout>,
}

impl HostProcess {
    pub fn spawn(launcher: &HostLauncher) -> anyhow::Result<Self> {
        let mut child = launcher
            .command()
            .spawn()
            .with_context(|| format!("failed to spawn host process: {}", launcher.describe()))?;

        let stdin = child.stdin.take().context("host stdin not available")?;
        let stdout = child.stdout.take().context("host stdout not available")?;
        let stderr = child.stderr.take().context("host stderr not available")?;
        Self::spawn_stderr_logger(stderr);

        Ok(Self { child, stdin: BufWriter::new(stdin), stdout: Some(stdout) })
    }

    fn spawn_stderr_logger(stderr: ChildStderr) {
        tokio::task::spawn_local(async move {
            let mut lines = BufReader::new(stderr).lines();
            loop {
                match lines.next_line().await {
                    Ok(Some(line)) => tracing::debug!(target: "host_console", "{line}"),
                    Ok(None) => break,
                    Err(err) => {
                        tracing::error!("failed to read host stderr: {err}");
                        break;
                    }
                }
            }
        });
    }

    pub async fn send(&mut self, request: &HostRequest) -> anyhow::Result<()> {
        let line = serde_json::to_string(request).context("failed to serialize host request")?;
        self.stdin.write_all(line.as_bytes()).await.context("failed to write host request")?;
        self.stdin.write_all(b"\n").await.context("failed to write host newline")?;
        self.stdin.flush().await.context("failed to flush host stdin")?;
        Ok(())
    }

    /// Pumps `requests` into the process and its replies into `replies`.
    /// Must run inside a `LocalSet`.
    pub fn start(
        mut self,
        mut requests: mpsc::UnboundedReceiver<HostRequest>,
        replies: mpsc::UnboundedSender<HostReply>,
    ) -> tokio::task::JoinHandle<anyhow::Result<()>> {
        if let Some(stdout) = self.stdout.take() {
            tokio::task::spawn_local(read_replies(stdout, replies));
        }
        tokio::task::spawn_local(async move {
            while let Some(request) = requests.recv().await {
                self.send(&request).await?;
            }
            drop(self.stdin);
            let status = self.child.wait().await.context("failed to wait for host process")?;
            tracing::info!("host process exited: {status}");
            Ok(())
        })
    }
}

async fn read_replies(stdout: ChildStdout, replies: mpsc::UnboundedSender<HostReply>) {
    let mut lines = BufReader::new(stdout).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) if line.trim().is_empty() => {}
            Ok(Some(line)) => match serde_json::from_str::<HostReply>(&line) {
                Ok(reply) => {
                    if replies.send(reply).is_err() {
                        break;
                    }
                }
                Err(err) => tracing::warn!("undecodable host reply `{line}`: {err}"),
            },
            Ok(None) => break,
            Err(err) => {
                tracing::error!("failed to read host stdout: {err}");
                break;
            }
        }
    }
}
