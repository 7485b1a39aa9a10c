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

//! Markup fragments: lenient parsing into a [`Document`] and serialization.

use super::document::{Document, NodeId, NodeKind};
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use std::borrow::Cow;

/// Elements that never have children or a closing tag.
const VOID_TAGS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MarkupError {
    #[error("malformed markup at byte {position}: {message}")]
    Malformed { position: u64, message: String },
}

#[must_use]
pub fn is_void_tag(tag: &str) -> bool {
    VOID_TAGS.contains(&tag)
}

/// Escapes text for inclusion in markup.
#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

#[must_use]
pub fn escape_attr(value: &str) -> String {
    escape_html(value).replace('"', "&quot;")
}

/// Expands entities in raw markup text. Unknown entities are kept as written.
#[must_use]
pub fn unescape_text(raw: &str) -> Cow<'_, str> {
    if !raw.contains('&') {
        return Cow::Borrowed(raw);
    }
    let expanded = raw.replace("&nbsp;", "\u{a0}");
    match quick_xml::escape::unescape(&expanded) {
        Ok(text) => Cow::Owned(text.into_owned()),
        Err(_) => Cow::Owned(expanded),
    }
}

/// Parses `markup` into detached nodes owned by `doc`, returning the
/// top-level nodes in order.
///
/// Parsing is forgiving the way HTML is: void elements need no closing tag,
/// unmatched closing tags are ignored, unclosed elements end with the input.
pub fn parse_fragment(doc: &mut Document, markup: &str) -> Result<Vec<NodeId>, MarkupError> {
    let mut reader = Reader::from_str(markup);
    let config = reader.config_mut();
    config.check_end_names = false;
    config.allow_unmatched_ends = true;

    let mut top = Vec::new();
    let mut open: Vec<NodeId> = Vec::new();

    loop {
        let event = match reader.read_event() {
            Ok(event) => event,
            Err(err) => {
                return Err(MarkupError::Malformed {
                    position: u64::try_from(reader.buffer_position()).unwrap_or(u64::MAX),
                    message: err.to_string(),
                });
            }
        };
        match event {
            Event::Start(start) => {
                let node = element_from(doc, &start);
                attach(doc, &mut top, &open, node);
                if !doc.tag(node).is_some_and(is_void_tag) {
                    open.push(node);
                }
            }
            Event::Empty(start) => {
                let node = element_from(doc, &start);
                attach(doc, &mut top, &open, node);
            }
            Event::End(end) => {
                let name = String::from_utf8_lossy(end.name().as_ref()).to_ascii_lowercase();
                if let Some(pos) = open.iter().rposition(|&n| doc.tag(n) == Some(name.as_str())) {
                    open.truncate(pos);
                }
            }
            Event::Text(text) => {
                let raw = String::from_utf8_lossy(&text.into_inner()).into_owned();
                if !raw.is_empty() {
                    let node = doc.create_text(&raw);
                    attach(doc, &mut top, &open, node);
                }
            }
            Event::CData(data) => {
                let content = String::from_utf8_lossy(&data.into_inner()).into_owned();
                let node = doc.create_text(&escape_html(&content));
                attach(doc, &mut top, &open, node);
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(top)
}

fn element_from(doc: &mut Document, start: &BytesStart<'_>) -> NodeId {
    let tag = String::from_utf8_lossy(start.name().as_ref()).to_ascii_lowercase();
    let mut attrs = Vec::new();
    for attr in start.html_attributes() {
        let attr = match attr {
            Ok(attr) => attr,
            Err(err) => {
                tracing::warn!("skipping malformed attributes on <{tag}>: {err}");
                break;
            }
        };
        let key = String::from_utf8_lossy(attr.key.as_ref()).to_ascii_lowercase();
        let value = match attr.unescape_value() {
            Ok(value) => value.into_owned(),
            Err(_) => String::from_utf8_lossy(&attr.value).into_owned(),
        };
        attrs.push((key, value));
    }
    doc.create_element(&tag, attrs)
}

fn attach(doc: &mut Document, top: &mut Vec<NodeId>, open: &[NodeId], node: NodeId) {
    match open.last() {
        Some(&parent) => doc.append_child(parent, node),
        None => top.push(node),
    }
}

pub(super) fn write_node(doc: &Document, id: NodeId, out: &mut String) {
    match doc.kind(id) {
        NodeKind::Text(raw) => out.push_str(raw),
        NodeKind::Element { tag, attrs } => {
            out.push('<');
            out.push_str(tag);
            for (key, value) in attrs {
                out.push(' ');
                out.push_str(key);
                out.push_str("=\"");
                out.push_str(&escape_attr(value));
                out.push('"');
            }
            out.push('>');
            if is_void_tag(tag) {
                return;
            }
            for &child in doc.children(id) {
                write_node(doc, child, out);
            }
            out.push_str("</");
            out.push_str(tag);
            out.push('>');
        }
    }
}
