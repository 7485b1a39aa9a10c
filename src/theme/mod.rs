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

//! Theme runtime: receives chat events, keeps the user directory and hands
//! events to the theme's adapter.

pub mod adapter;
pub mod basic;
pub mod directory;
pub mod nick_color;
pub mod util;

pub use adapter::{AdapterContext, AdapterFactory, FallbackAdapter, ThemeAdapter};
pub use basic::{BasicAdapter, BasicSettings};
pub use directory::{DirectoryUpdate, UserDirectory, UserEntry};
pub use nick_color::{NickColoring, NickColorizer};
pub use util::{ThemeUtil, critical_error_markup, describe_props};

use crate::view::ChatView;
use serde_json::Value;

pub struct Theme {
    view: ChatView,
    users: UserDirectory,
    util: ThemeUtil,
    adapter: Box<dyn ThemeAdapter>,
}

impl Theme {
    /// Initializes the theme. An adapter that fails to build is replaced by
    /// [`FallbackAdapter`].
    pub fn new(view: ChatView, util: ThemeUtil, factory: AdapterFactory) -> Self {
        util.console("Util is initializing");
        let adapter = match factory(&util) {
            Ok(adapter) => adapter,
            Err(err) => {
                tracing::error!("failed to initialize adapter: {err:#}");
                util.console(&format!("Failed to initialize adapter: {err:#}"));
                Box::new(FallbackAdapter)
            }
        };
        util.console("Util successfully initialized");
        tracing::debug!(adapter = adapter.name(), "theme ready");
        Self { view, users: UserDirectory::default(), util, adapter }
    }

    /// Delivers one chat event: directory bookkeeping first, then the
    /// adapter unless the event is a silent join or part.
    pub fn receive_object(&mut self, data: &Value) -> anyhow::Result<()> {
        let update = DirectoryUpdate::from_event(data);
        if !self.users.apply(&update) {
            return Ok(());
        }
        let mut ctx =
            AdapterContext { view: &mut self.view, users: &self.users, util: &self.util };
        self.adapter.receive_object(&mut ctx, data)
    }

    /// Shows a banner for errors that make output impossible.
    pub fn show_critical_error(&mut self, text: &str) {
        if let Err(err) = self.view.append_html(&critical_error_markup(text)) {
            tracing::error!("cannot render error banner: {err}");
            return;
        }
        self.view.invalidate();
    }

    #[must_use]
    pub fn adapter_name(&self) -> &str {
        self.adapter.name()
    }

    #[must_use]
    pub fn view(&self) -> &ChatView {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut ChatView {
        &mut self.view
    }

    #[must_use]
    pub fn users(&self) -> &UserDirectory {
        &self.users
    }

    #[must_use]
    pub fn util(&self) -> &ThemeUtil {
        &self.util
    }
}
