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

//! Built-in adapter rendering chat events as simple HTML lines.

use super::adapter::{AdapterContext, AdapterFactory, ThemeAdapter};
use super::nick_color::{NickColoring, NickColorizer};
use super::util::{ThemeUtil, escape_html};
use crate::format::{DateTimeFormatter, DateValue, DayTracker};
use crate::host::BridgeError;
use crate::view::{escape_attr, replaceable_message};
use anyhow::Context as _;
use chrono::{Local, NaiveDateTime};
use serde::Deserialize;
use serde_json::Value;
use std::cell::RefCell;
use std::rc::Rc;

pub const TIME_FORMAT_OPTION: &str = "options.ui.look.chat.time-format";
pub const INFORMATIONAL_COLOR_OPTION: &str = "options.ui.look.colors.messages.informational";
pub const NICK_COLORING_OPTION: &str = "options.ui.muc.use-nick-coloring";
pub const HASH_NICK_COLORING_OPTION: &str = "options.ui.muc.use-hash-nick-coloring";
pub const NICK_COLORS_OPTION: &str = "options.ui.look.colors.muc.nick-colors";

const DATE_SEPARATOR_PATTERN: &str = "EEEE, d MMMM yyyy";

/// Host-provided look settings, filled in as the host answers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BasicSettings {
    pub time_format: Option<String>,
    pub informational_color: Option<String>,
    pub font: Option<Value>,
    pub nick_coloring: bool,
    pub hash_nick_coloring: bool,
    pub nick_colors: Vec<String>,
}

impl BasicSettings {
    fn coloring(&self) -> NickColoring {
        if !self.nick_coloring {
            NickColoring::Off
        } else if self.hash_nick_coloring {
            NickColoring::Hashed
        } else {
            NickColoring::Palette(self.nick_colors.clone())
        }
    }
}

#[derive(Debug)]
struct BasicState {
    settings: BasicSettings,
    time: DateTimeFormatter,
    colors: NickColorizer,
    days: DayTracker,
}

impl BasicState {
    fn update(&mut self, apply: impl FnOnce(&mut BasicSettings)) {
        apply(&mut self.settings);
        self.time = DateTimeFormatter::new(self.settings.time_format.as_deref());
        self.colors.set_coloring(self.settings.coloring());
    }
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum ChatEvent {
    Message(MessageEvent),
    Clear,
    #[serde(other)]
    Other,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct MessageEvent {
    mtype: Option<String>,
    sender: String,
    /// Body markup, or the status text for status events.
    message: String,
    time: Option<Value>,
    local: bool,
    emote: bool,
    id: Option<String>,
    replace_id: Option<String>,
    newnick: String,
    status: String,
}

pub struct BasicAdapter {
    state: Rc<RefCell<BasicState>>,
}

impl BasicAdapter {
    /// Creates the adapter and asks the host for its settings. With an
    /// asynchronous host the answers arrive later and apply from then on.
    ///
    /// A `time_format` given here takes precedence over the host's.
    pub fn new(util: &ThemeUtil, time_format: Option<&str>) -> anyhow::Result<Self> {
        let settings =
            BasicSettings { time_format: time_format.map(str::to_owned), ..BasicSettings::default() };
        let state = Rc::new(RefCell::new(BasicState {
            time: DateTimeFormatter::new(time_format),
            colors: NickColorizer::new(settings.coloring()),
            settings,
            days: DayTracker::default(),
        }));

        if time_format.is_none() {
            let target = Rc::clone(&state);
            util.psi_option(TIME_FORMAT_OPTION, move |answer| {
                if let Some(Value::String(format)) = accept(TIME_FORMAT_OPTION, answer) {
                    target.borrow_mut().update(|s| s.time_format = Some(format));
                }
            })
            .context("requesting time format")?;
        }

        let target = Rc::clone(&state);
        util.color_option(INFORMATIONAL_COLOR_OPTION, move |answer| {
            if let Some(Value::String(color)) = accept(INFORMATIONAL_COLOR_OPTION, answer) {
                target.borrow_mut().update(|s| s.informational_color = Some(color));
            }
        })
        .context("requesting informational color")?;

        let target = Rc::clone(&state);
        util.psi_option(NICK_COLORING_OPTION, move |answer| {
            if let Some(enabled) = accept(NICK_COLORING_OPTION, answer).and_then(|v| v.as_bool()) {
                target.borrow_mut().update(|s| s.nick_coloring = enabled);
            }
        })
        .context("requesting nick coloring")?;

        let target = Rc::clone(&state);
        util.psi_option(HASH_NICK_COLORING_OPTION, move |answer| {
            if let Some(enabled) =
                accept(HASH_NICK_COLORING_OPTION, answer).and_then(|v| v.as_bool())
            {
                target.borrow_mut().update(|s| s.hash_nick_coloring = enabled);
            }
        })
        .context("requesting hash nick coloring")?;

        let target = Rc::clone(&state);
        util.psi_option(NICK_COLORS_OPTION, move |answer| {
            if let Some(Value::Array(items)) = accept(NICK_COLORS_OPTION, answer) {
                let colors = items.iter().filter_map(Value::as_str).map(str::to_owned).collect();
                target.borrow_mut().update(|s| s.nick_colors = colors);
            }
        })
        .context("requesting nick colors")?;

        let target = Rc::clone(&state);
        util.get_font(move |answer| {
            if let Some(font) = accept("font", answer) {
                target.borrow_mut().update(|s| s.font = Some(font));
            }
        })
        .context("requesting font")?;

        Ok(Self { state })
    }

    /// Factory for [`Theme::new`](super::Theme::new).
    #[must_use]
    pub fn factory(time_format: Option<String>) -> AdapterFactory {
        Box::new(move |util: &ThemeUtil| -> anyhow::Result<Box<dyn ThemeAdapter>> {
            Ok(Box::new(Self::new(util, time_format.as_deref())?))
        })
    }

    #[must_use]
    pub fn settings(&self) -> BasicSettings {
        self.state.borrow().settings.clone()
    }

    fn on_message(&self, ctx: &mut AdapterContext<'_>, event: &MessageEvent) -> anyhow::Result<()> {
        let mtype = event.mtype.as_deref().unwrap_or("message");

        if mtype == "message"
            && let Some(replace_id) = event.replace_id.as_deref()
        {
            let new_id = event.id.as_deref().unwrap_or(replace_id);
            let outcome = ctx.view.replace_message(replace_id, new_id, &event.message)?;
            if outcome.is_replaced() {
                ctx.view.invalidate();
                return Ok(());
            }
            tracing::info!(replace_id, ?outcome, "edit target not rendered, appending instead");
        }

        let at = timestamp(event);
        let mut state = self.state.borrow_mut();
        if state.days.update(at) {
            let date = DateTimeFormatter::new(Some(DATE_SEPARATOR_PATTERN)).format(at)?;
            ctx.view.append_html(&format!("<div class=\"date-separator\">{}</div>", escape_html(&date)))?;
        }
        let time = state.time.format(at)?;
        let sender = escape_html(&event.sender);

        let markup = match mtype {
            "message" => {
                let color = match ctx.users.nick_color(&event.sender) {
                    Some(color) => color.to_owned(),
                    None => state.colors.color(&event.sender, event.local),
                };
                let body = match event.id.as_deref() {
                    Some(id) => replaceable_message(id, &event.message),
                    None => event.message.clone(),
                };
                let nick = format!(
                    "<span class=\"nick\" style=\"color:{}\">{sender}</span>",
                    escape_attr(&color)
                );
                if event.emote {
                    format!("<div class=\"msg emote\"><span class=\"time\">[{time}]</span> * {nick} {body}</div>")
                } else {
                    format!("<div class=\"msg\"><span class=\"time\">[{time}]</span> {nick}: {body}</div>")
                }
            }
            "join" => system_line(&state.settings, &time, &format!("{sender} has joined the room")),
            "part" => system_line(&state.settings, &time, &format!("{sender} has left the room")),
            "newnick" => system_line(
                &state.settings,
                &time,
                &format!("{sender} is now known as {}", escape_html(&event.newnick)),
            ),
            "status" => {
                let mut text = format!("{sender} is now {}", escape_html(&event.status));
                if !event.message.is_empty() {
                    text.push_str(&format!(" ({})", escape_html(&event.message)));
                }
                system_line(&state.settings, &time, &text)
            }
            _ => system_line(&state.settings, &time, &event.message),
        };
        drop(state);

        ctx.view.append_html(&markup)?;
        ctx.view.invalidate();
        if event.local {
            ctx.view.force_follow();
        }
        Ok(())
    }
}

impl ThemeAdapter for BasicAdapter {
    fn name(&self) -> &str {
        "basic"
    }

    fn receive_object(&mut self, ctx: &mut AdapterContext<'_>, data: &Value) -> anyhow::Result<()> {
        let event = ChatEvent::deserialize(data).context("malformed chat event")?;
        match event {
            ChatEvent::Message(message) => self.on_message(ctx, &message),
            ChatEvent::Clear => {
                ctx.view.clear();
                self.state.borrow_mut().days.reset();
                ctx.view.invalidate();
                Ok(())
            }
            ChatEvent::Other => Ok(()),
        }
    }
}

fn system_line(settings: &BasicSettings, time: &str, text: &str) -> String {
    let style = settings
        .informational_color
        .as_deref()
        .map(|color| format!(" style=\"color:{}\"", escape_attr(color)))
        .unwrap_or_default();
    format!("<div class=\"sys\"{style}><span class=\"time\">[{time}]</span> *** {text}</div>")
}

fn accept(option: &str, answer: Result<Value, BridgeError>) -> Option<Value> {
    match answer {
        Ok(Value::Null) => None,
        Ok(value) => Some(value),
        Err(err) => {
            tracing::error!(option, "host setting unavailable: {err}");
            None
        }
    }
}

fn timestamp(event: &MessageEvent) -> NaiveDateTime {
    let value = match &event.time {
        Some(Value::String(text)) => DateValue::Text(text.clone()),
        Some(Value::Number(n)) if n.as_i64().is_some() => {
            DateValue::EpochMillis(n.as_i64().unwrap_or_default())
        }
        _ => return Local::now().naive_local(),
    };
    value.to_local().unwrap_or_else(|err| {
        tracing::warn!("{err}, using the current time");
        Local::now().naive_local()
    })
}
