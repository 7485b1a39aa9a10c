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

//! Helpers themes call into: host lookups through the bridge, resource
//! loading, formatting and debug output.

use crate::error::ThemeError;
use crate::format::{DateValue, FormatError, date_format};
use crate::host::{BridgeError, CallMode, Host, HostMethod, RemoteCall};
use crate::view::Document;
use serde_json::Value;
use std::fmt::Write as _;
use std::rc::Rc;

pub use crate::view::{escape_html, replace_icons};

const CRITICAL_ERROR_STYLE: &str = "background-color:red;color:white;border:1px solid black;padding:1em;margin:1em;font-weight:bold";

/// Host access for themes, bound to one call mode.
#[derive(Clone)]
pub struct ThemeUtil {
    bridge: RemoteCall,
    host: Rc<dyn Host>,
}

impl ThemeUtil {
    pub fn new(mode: CallMode, host: Rc<dyn Host>) -> Self {
        Self { bridge: RemoteCall::new(mode), host }
    }

    #[must_use]
    pub fn mode(&self) -> CallMode {
        self.bridge.mode()
    }

    #[must_use]
    pub fn host(&self) -> &Rc<dyn Host> {
        &self.host
    }

    pub fn console(&self, text: &str) {
        self.host.console(text);
    }

    pub fn psi_option(
        &self,
        option: &str,
        on_result: impl FnOnce(Result<Value, BridgeError>) + 'static,
    ) -> Result<(), BridgeError> {
        self.bridge.invoke_literal(
            self.host.as_ref(),
            HostMethod::PsiOption,
            vec![Value::from(option)],
            on_result,
        )
    }

    pub fn color_option(
        &self,
        option: &str,
        on_result: impl FnOnce(Result<Value, BridgeError>) + 'static,
    ) -> Result<(), BridgeError> {
        self.bridge.invoke_literal(
            self.host.as_ref(),
            HostMethod::ColorOption,
            vec![Value::from(option)],
            on_result,
        )
    }

    pub fn get_font(
        &self,
        on_result: impl FnOnce(Result<Value, BridgeError>) + 'static,
    ) -> Result<(), BridgeError> {
        self.bridge.invoke_literal(self.host.as_ref(), HostMethod::GetFont, Vec::new(), on_result)
    }

    pub fn get_palette_color(
        &self,
        name: &str,
        on_result: impl FnOnce(Value) + 'static,
    ) -> Result<(), BridgeError> {
        self.bridge.invoke(
            self.host.as_ref(),
            HostMethod::GetPaletteColor,
            vec![Value::from(name)],
            on_result,
        )
    }

    /// Loads a markup resource and parses it into a fresh document.
    ///
    /// An empty resource is an error: a theme cannot work without the
    /// markup it asked for.
    pub fn load_markup(
        &self,
        path: &str,
        on_loaded: impl FnOnce(Result<Document, ThemeError>) + 'static,
    ) -> Result<(), BridgeError> {
        let mode = match self.mode() {
            CallMode::Synchronous => "sync",
            CallMode::Asynchronous => "async",
        };
        self.console(&format!("loading markup {mode}: {path}"));
        let host = Rc::clone(&self.host);
        let owned_path = path.to_owned();
        self.bridge.invoke(
            self.host.as_ref(),
            HostMethod::GetFileContents,
            vec![Value::from(path)],
            move |contents| on_loaded(parse_resource(host.as_ref(), &owned_path, &contents)),
        )
    }

    #[allow(clippy::unused_self)]
    pub fn date_format(
        &self,
        value: impl Into<DateValue>,
        pattern: Option<&str>,
    ) -> Result<String, FormatError> {
        date_format(value, pattern)
    }
}

fn parse_resource(host: &dyn Host, path: &str, contents: &Value) -> Result<Document, ThemeError> {
    let text = contents.as_str().unwrap_or_default();
    if text.is_empty() {
        return Err(ThemeError::EmptyResource { path: path.to_owned() });
    }
    let mut document = Document::new();
    let root = document.root();
    if let Err(source) = document.append_markup(root, text) {
        host.console(&format!("failed to parse markup from file {path}"));
        return Err(ThemeError::Markup { path: path.to_owned(), source });
    }
    Ok(document)
}

/// Banner markup for errors that make output impossible.
#[must_use]
pub fn critical_error_markup(text: &str) -> String {
    let body = escape_html(text).replace('\n', "<br>");
    format!("<div class=\"critical-error\" style=\"{CRITICAL_ERROR_STYLE}\">{body}</div>")
}

/// One line per property of `value`, for debug dumps. Nested objects and
/// arrays are expanded when `recursive` is set.
#[must_use]
pub fn describe_props(value: &Value, recursive: bool) -> String {
    let mut out = String::new();
    match value {
        Value::Object(map) => {
            for (key, val) in map {
                describe_prop(&mut out, key, val, recursive);
            }
        }
        Value::Array(items) => {
            for (index, val) in items.iter().enumerate() {
                describe_prop(&mut out, &index.to_string(), val, recursive);
            }
        }
        other => describe_prop(&mut out, "value", other, recursive),
    }
    out
}

fn describe_prop(out: &mut String, key: &str, value: &Value, recursive: bool) {
    let _ = match value {
        Value::Null => writeln!(out, "{key} = null"),
        Value::Bool(b) => writeln!(out, "{key} = Boolean(\"{b}\")"),
        Value::Number(n) => writeln!(out, "{key} = Number(\"{n}\")"),
        Value::String(s) => writeln!(out, "{key} = String(\"{s}\")"),
        Value::Array(_) if recursive => {
            writeln!(out, "{key} = Array{{{}}}", describe_props(value, true))
        }
        Value::Object(_) if recursive => {
            writeln!(out, "{key} = Object{{{}}}", describe_props(value, true))
        }
        Value::Array(items) => writeln!(out, "{key} = Array({} items)", items.len()),
        Value::Object(map) => writeln!(out, "{key} = Object({} keys)", map.len()),
    };
}
