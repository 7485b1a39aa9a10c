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

use super::bridge::{BridgeError, Host, Reply};
use super::wire::HostMethod;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};

/// Values an in-process host answers with.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct HostSettings {
    /// Application options by dotted name.
    pub options: BTreeMap<String, Value>,
    /// Color options by dotted name, as `#rrggbb`.
    pub colors: BTreeMap<String, String>,
    /// Font description handed to the theme, e.g. `{"family": "Sans", "size": 11}`.
    pub font: Option<Value>,
    /// Palette roles (`Base`, `Text`, `Highlight`, ...) to colors.
    pub palette: BTreeMap<String, String>,
    /// Directory theme resources are loaded from.
    pub resource_dir: Option<PathBuf>,
}

/// Same-process host answering from [`HostSettings`].
///
/// Option, color and font values are answered as serialized literals, the
/// way an embedding application hands them over.
#[derive(Debug, Clone, Default)]
pub struct StaticHost {
    settings: HostSettings,
}

impl StaticHost {
    #[must_use]
    pub fn new(settings: HostSettings) -> Self {
        Self { settings }
    }

    #[must_use]
    pub fn settings(&self) -> &HostSettings {
        &self.settings
    }

    fn read_resource(&self, name: &str) -> String {
        let Some(dir) = self.settings.resource_dir.as_ref() else {
            tracing::warn!("no resource directory configured, cannot load {name}");
            return String::new();
        };
        let relative = Path::new(name);
        if !relative.components().all(|c| matches!(c, Component::Normal(_))) {
            tracing::warn!("refusing to load resource outside the theme directory: {name}");
            return String::new();
        }
        let path = dir.join(relative);
        match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(err) => {
                tracing::warn!("failed to read resource {}: {err}", path.display());
                String::new()
            }
        }
    }
}

fn literal(value: Option<Value>) -> Value {
    Value::String(value.map(|v| v.to_string()).unwrap_or_default())
}

fn key_arg(method: HostMethod, args: &[Value]) -> Result<&str, BridgeError> {
    args.first().and_then(Value::as_str).ok_or_else(|| BridgeError::HostFailed {
        method,
        message: "missing string argument".to_owned(),
    })
}

impl Host for StaticHost {
    fn call(&self, method: HostMethod, args: Vec<Value>) -> Result<Value, BridgeError> {
        let settings = &self.settings;
        let value = match method {
            HostMethod::PsiOption => {
                literal(settings.options.get(key_arg(method, &args)?).cloned())
            }
            HostMethod::ColorOption => literal(
                settings.colors.get(key_arg(method, &args)?).map(|c| Value::String(c.clone())),
            ),
            HostMethod::GetFont => literal(settings.font.clone()),
            HostMethod::GetPaletteColor => settings
                .palette
                .get(key_arg(method, &args)?)
                .map_or(Value::Null, |c| Value::String(c.clone())),
            HostMethod::GetFileContents => {
                Value::String(self.read_resource(key_arg(method, &args)?))
            }
        };
        Ok(value)
    }

    fn call_deferred(
        &self,
        method: HostMethod,
        args: Vec<Value>,
        reply: Reply,
    ) -> Result<(), BridgeError> {
        let value = self.call(method, args)?;
        reply.send(value);
        Ok(())
    }
}
