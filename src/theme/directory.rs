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

use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

/// What the theme knows about a room participant.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserEntry {
    pub avatar: Option<String>,
    pub nickcolor: Option<String>,
}

/// Participants keyed by nickname.
#[derive(Debug, Default)]
pub struct UserDirectory {
    users: HashMap<String, UserEntry>,
}

impl UserDirectory {
    #[must_use]
    pub fn get(&self, nick: &str) -> Option<&UserEntry> {
        self.users.get(nick)
    }

    #[must_use]
    pub fn avatar_for_nick(&self, nick: &str) -> Option<&str> {
        self.users.get(nick)?.avatar.as_deref()
    }

    #[must_use]
    pub fn nick_color(&self, nick: &str) -> Option<&str> {
        self.users.get(nick)?.nickcolor.as_deref()
    }

    pub fn upsert(&mut self, nick: &str, entry: UserEntry) {
        self.users.insert(nick.to_owned(), entry);
    }

    pub fn remove(&mut self, nick: &str) -> Option<UserEntry> {
        self.users.remove(nick)
    }

    /// Moves the entry of `from` to `to`. Unknown nicks are left alone.
    pub fn rename(&mut self, from: &str, to: &str) {
        if let Some(entry) = self.users.remove(from) {
            self.users.insert(to.to_owned(), entry);
        }
    }

    pub fn set_avatar(&mut self, nick: &str, avatar: Option<String>) -> bool {
        match self.users.get_mut(nick) {
            Some(entry) => {
                entry.avatar = avatar;
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.users.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    /// Applies the directory side of a chat event. Returns whether the event
    /// should still reach the adapter.
    pub fn apply(&mut self, update: &DirectoryUpdate) -> bool {
        match update {
            DirectoryUpdate::Join { sender, entry, nopartjoin } => {
                self.upsert(sender, entry.clone());
                !nopartjoin
            }
            DirectoryUpdate::Part { sender, nopartjoin } => {
                self.remove(sender);
                !nopartjoin
            }
            DirectoryUpdate::NewNick { sender, newnick } => {
                self.rename(sender, newnick);
                true
            }
            DirectoryUpdate::Avatar { sender, avatar } => {
                if !self.set_avatar(sender, avatar.clone()) {
                    tracing::warn!(%sender, "avatar update for unknown user");
                }
                true
            }
            DirectoryUpdate::None => true,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct EventFields {
    #[serde(rename = "type")]
    kind: String,
    mtype: String,
    sender: String,
    avatar: Option<String>,
    nickcolor: Option<String>,
    newnick: String,
    nopartjoin: bool,
}

/// Directory bookkeeping carried by a chat event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectoryUpdate {
    Join { sender: String, entry: UserEntry, nopartjoin: bool },
    Part { sender: String, nopartjoin: bool },
    NewNick { sender: String, newnick: String },
    Avatar { sender: String, avatar: Option<String> },
    None,
}

impl DirectoryUpdate {
    #[must_use]
    pub fn from_event(data: &Value) -> Self {
        let fields = match EventFields::deserialize(data) {
            Ok(fields) => fields,
            Err(err) => {
                tracing::debug!("event carries no directory fields: {err}");
                return Self::None;
            }
        };
        match (fields.kind.as_str(), fields.mtype.as_str()) {
            ("message", "join") => Self::Join {
                sender: fields.sender,
                entry: UserEntry { avatar: fields.avatar, nickcolor: fields.nickcolor },
                nopartjoin: fields.nopartjoin,
            },
            ("message", "part") => {
                Self::Part { sender: fields.sender, nopartjoin: fields.nopartjoin }
            }
            ("message", "newnick") => {
                Self::NewNick { sender: fields.sender, newnick: fields.newnick }
            }
            ("avatar", _) => Self::Avatar { sender: fields.sender, avatar: fields.avatar },
            _ => Self::None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn apply(dir: &mut UserDirectory, event: &Value) -> bool {
        dir.apply(&DirectoryUpdate::from_event(event))
    }

    #[test]
    fn join_part_rename_avatar() {
        let mut dir = UserDirectory::default();
        assert!(apply(
            &mut dir,
            &json!({"type": "message", "mtype": "join", "sender": "alice", "avatar": "a.png", "nickcolor": "#f00"})
        ));
        assert_eq!(dir.nick_color("alice"), Some("#f00"));

        assert!(apply(&mut dir, &json!({"type": "avatar", "sender": "alice", "avatar": "b.png"})));
        assert_eq!(dir.avatar_for_nick("alice"), Some("b.png"));

        assert!(apply(&mut dir, &json!({"type": "message", "mtype": "newnick", "sender": "alice", "newnick": "al"})));
        assert!(dir.get("alice").is_none());
        assert_eq!(dir.avatar_for_nick("al"), Some("b.png"));

        assert!(apply(&mut dir, &json!({"type": "message", "mtype": "part", "sender": "al"})));
        assert!(dir.is_empty());
    }

    #[test]
    fn nopartjoin_stops_forwarding() {
        let mut dir = UserDirectory::default();
        assert!(!apply(&mut dir, &json!({"type": "message", "mtype": "join", "sender": "bob", "nopartjoin": true})));
        assert_eq!(dir.len(), 1);
        assert!(!apply(&mut dir, &json!({"type": "message", "mtype": "part", "sender": "bob", "nopartjoin": true})));
        assert!(dir.is_empty());
    }

    #[test]
    fn avatar_for_unknown_user_is_ignored() {
        let mut dir = UserDirectory::default();
        assert!(apply(&mut dir, &json!({"type": "avatar", "sender": "ghost", "avatar": "x.png"})));
        assert!(dir.is_empty());
    }

    #[test]
    fn other_events_pass_through() {
        assert_eq!(DirectoryUpdate::from_event(&json!({"type": "message", "message": "hi"})), DirectoryUpdate::None);
        assert_eq!(DirectoryUpdate::from_event(&json!("not an object")), DirectoryUpdate::None);
    }
}
