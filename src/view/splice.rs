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

//! In-place replacement of rendered messages.
//!
//! A replaceable message is rendered between two empty marker elements
//! tagged with the message id. Wrapping the message in a real container could
//! break the theme's element flow or pick up unwanted styles, and a start
//! marker alone would leave no way to find where the message ends.

use super::document::{Document, NodeId};
use super::markup::{MarkupError, escape_attr};

pub const MARKER_START_TAG: &str = "marker-start";
pub const MARKER_END_TAG: &str = "marker-end";
pub const MARKER_ID_ATTR: &str = "mid";

/// Appended to the body of every edited message.
pub const EDITED_INDICATOR: &str = "<img src=\"/psiicon/psi/action_templates_edit\" title=\"edited\">";

/// Tree operations the splice editor needs.
pub trait ContentTree {
    type Node: Copy + Eq + std::fmt::Debug;

    /// First descendant of `scope` with `tag` whose marker id is `id`.
    fn find_marker(&self, scope: Self::Node, tag: &str, id: &str) -> Option<Self::Node>;
    fn parent(&self, node: Self::Node) -> Option<Self::Node>;
    fn next_sibling(&self, node: Self::Node) -> Option<Self::Node>;
    fn remove(&mut self, node: Self::Node);
    /// Parses `markup` into detached nodes without touching the live tree.
    fn parse_markup(&mut self, markup: &str) -> Result<Vec<Self::Node>, MarkupError>;
    fn insert_before(&mut self, reference: Self::Node, node: Self::Node);
}

impl ContentTree for Document {
    type Node = NodeId;

    fn find_marker(&self, scope: NodeId, tag: &str, id: &str) -> Option<NodeId> {
        self.query(scope, tag, MARKER_ID_ATTR, id)
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        Document::parent(self, node)
    }

    fn next_sibling(&self, node: NodeId) -> Option<NodeId> {
        Document::next_sibling(self, node)
    }

    fn remove(&mut self, node: NodeId) {
        self.detach(node);
    }

    fn parse_markup(&mut self, markup: &str) -> Result<Vec<NodeId>, MarkupError> {
        self.parse_fragment(markup)
    }

    fn insert_before(&mut self, reference: NodeId, node: NodeId) {
        Document::insert_before(self, reference, node);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpliceOutcome {
    Replaced,
    /// No start marker, no end marker, or neither.
    MarkersMissing { start: bool, end: bool },
    /// Both markers exist but under different parents.
    ParentMismatch,
    /// The end marker does not follow the start marker.
    OutOfOrder,
}

impl SpliceOutcome {
    #[must_use]
    pub fn is_replaced(self) -> bool {
        matches!(self, Self::Replaced)
    }
}

/// Wraps rendered `text` in a marker pair for `msg_id`.
#[must_use]
pub fn replaceable_message(msg_id: &str, text: &str) -> String {
    let id = escape_attr(msg_id);
    format!(
        "<{MARKER_START_TAG} {MARKER_ID_ATTR}=\"{id}\"></{MARKER_START_TAG}>{text}<{MARKER_END_TAG} {MARKER_ID_ATTR}=\"{id}\"></{MARKER_END_TAG}>"
    )
}

/// Replaces the body of message `msg_id` under `scope` with `text`, tagging
/// the replacement `new_id` and marking it as edited.
///
/// Everything strictly between the old markers is removed and the new marker
/// pair is inserted right before the old end marker. Without a valid marker
/// pair nothing changes. A replacement that fails to parse leaves the tree
/// untouched.
pub fn replace_message<T: ContentTree>(
    tree: &mut T,
    scope: T::Node,
    msg_id: &str,
    new_id: &str,
    text: &str,
) -> Result<SpliceOutcome, MarkupError> {
    let start = tree.find_marker(scope, MARKER_START_TAG, msg_id);
    let end = tree.find_marker(scope, MARKER_END_TAG, msg_id);
    let same_parent = match (start, end) {
        (Some(s), Some(e)) => tree.parent(s).is_some() && tree.parent(s) == tree.parent(e),
        _ => false,
    };
    tracing::debug!(
        msg_id,
        start = if start.is_some() { "found" } else { "not found" },
        end = if end.is_some() { "found" } else { "not found" },
        parent_match = same_parent,
        "replace message"
    );

    let (Some(start), Some(end)) = (start, end) else {
        return Ok(SpliceOutcome::MarkersMissing { start: start.is_none(), end: end.is_none() });
    };
    if !same_parent {
        return Ok(SpliceOutcome::ParentMismatch);
    }

    let mut interior = Vec::new();
    let mut cursor = tree.next_sibling(start);
    loop {
        match cursor {
            Some(node) if node == end => break,
            Some(node) => {
                interior.push(node);
                cursor = tree.next_sibling(node);
            }
            None => {
                tracing::warn!(msg_id, "end marker precedes start marker");
                return Ok(SpliceOutcome::OutOfOrder);
            }
        }
    }

    let replacement =
        tree.parse_markup(&replaceable_message(new_id, &format!("{text}{EDITED_INDICATOR}")))?;
    for node in interior {
        tree.remove(node);
    }
    for node in replacement {
        tree.insert_before(end, node);
    }
    Ok(SpliceOutcome::Replaced)
}
