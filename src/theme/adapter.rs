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

use super::directory::UserDirectory;
use super::util::{ThemeUtil, critical_error_markup, describe_props};
use crate::view::ChatView;
use serde_json::Value;

/// What an adapter may touch while handling an event.
pub struct AdapterContext<'a> {
    pub view: &'a mut ChatView,
    pub users: &'a UserDirectory,
    pub util: &'a ThemeUtil,
}

/// Renders chat events into the view.
pub trait ThemeAdapter {
    fn name(&self) -> &str;

    fn receive_object(&mut self, ctx: &mut AdapterContext<'_>, data: &Value) -> anyhow::Result<()>;
}

/// Builds the theme's adapter once the utilities are ready.
pub type AdapterFactory = Box<dyn FnOnce(&ThemeUtil) -> anyhow::Result<Box<dyn ThemeAdapter>>>;

/// Installed when the real adapter failed to initialize. Every event is
/// answered with a visible error instead of being dropped.
#[derive(Debug, Default)]
pub struct FallbackAdapter;

impl ThemeAdapter for FallbackAdapter {
    fn name(&self) -> &str {
        "fallback"
    }

    fn receive_object(&mut self, ctx: &mut AdapterContext<'_>, data: &Value) -> anyhow::Result<()> {
        let text = format!(
            "Adapter is not loaded. output impossible!\n\nData was:{}",
            describe_props(data, false)
        );
        ctx.view.append_html(&critical_error_markup(&text))?;
        ctx.view.invalidate();
        Ok(())
    }
}
