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

//! The host surface and the bridge that calls it.

pub mod bridge;
pub mod channel;
pub mod process;
pub mod static_host;
pub mod wire;

pub use bridge::{BridgeError, CallMode, Host, RemoteCall, Reply, decode_literal};
pub use channel::{ChannelHost, serve_requests};
pub use static_host::{HostSettings, StaticHost};
pub use wire::{HostMethod, HostReply, HostRequest};
