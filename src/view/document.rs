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

use super::markup::{self, MarkupError, unescape_text};

/// Handle to a node inside one [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Element { tag: String, attrs: Vec<(String, String)> },
    /// Text as written in markup, entities unexpanded.
    Text(String),
}

#[derive(Debug, Clone)]
struct Node {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Arena-backed content tree rooted at a `<body>` element.
///
/// Detached nodes keep their arena slot; ids stay valid for the lifetime of
/// the document.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
    root: NodeId,
}

const BLOCK_TAGS: &[&str] = &[
    "article", "blockquote", "div", "footer", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr",
    "li", "ol", "p", "pre", "section", "table", "tr", "ul",
];

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    #[must_use]
    pub fn new() -> Self {
        let body = Node {
            kind: NodeKind::Element { tag: "body".to_owned(), attrs: Vec::new() },
            parent: None,
            children: Vec::new(),
        };
        Self { nodes: vec![body], root: NodeId(0) }
    }

    #[must_use]
    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn create_element(&mut self, tag: &str, attrs: Vec<(String, String)>) -> NodeId {
        self.push(NodeKind::Element { tag: tag.to_owned(), attrs })
    }

    pub fn create_text(&mut self, raw: &str) -> NodeId {
        self.push(NodeKind::Text(raw.to_owned()))
    }

    fn push(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node { kind, parent: None, children: Vec::new() });
        id
    }

    #[must_use]
    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.0].kind
    }

    #[must_use]
    pub fn tag(&self, id: NodeId) -> Option<&str> {
        match &self.nodes[id.0].kind {
            NodeKind::Element { tag, .. } => Some(tag),
            NodeKind::Text(_) => None,
        }
    }

    #[must_use]
    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        match &self.nodes[id.0].kind {
            NodeKind::Element { attrs, .. } => {
                attrs.iter().find(|(k, _)| k == name).map(|(_, v)| v.as_str())
            }
            NodeKind::Text(_) => None,
        }
    }

    pub fn set_attr(&mut self, id: NodeId, name: &str, value: &str) {
        if let NodeKind::Element { attrs, .. } = &mut self.nodes[id.0].kind {
            if let Some(slot) = attrs.iter_mut().find(|(k, _)| k == name) {
                value.clone_into(&mut slot.1);
            } else {
                attrs.push((name.to_owned(), value.to_owned()));
            }
        }
    }

    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    #[must_use]
    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let siblings = self.children(parent);
        let pos = siblings.iter().position(|&n| n == id)?;
        siblings.get(pos + 1).copied()
    }

    /// Whether `id` is reachable from the root.
    #[must_use]
    pub fn is_attached(&self, id: NodeId) -> bool {
        self.is_ancestor_or_self(self.root, id)
    }

    fn is_ancestor_or_self(&self, ancestor: NodeId, mut id: NodeId) -> bool {
        loop {
            if id == ancestor {
                return true;
            }
            match self.parent(id) {
                Some(parent) => id = parent,
                None => return false,
            }
        }
    }

    /// Removes `id` (and its subtree) from its parent.
    pub fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.nodes[id.0].parent.take() {
            self.nodes[parent.0].children.retain(|&n| n != id);
        }
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        if self.is_ancestor_or_self(child, parent) {
            tracing::warn!("refusing to append {child:?} under its own descendant {parent:?}");
            return;
        }
        self.detach(child);
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    /// Inserts `node` immediately before `reference`. Returns `false` when
    /// `reference` has no parent.
    pub fn insert_before(&mut self, reference: NodeId, node: NodeId) -> bool {
        let Some(parent) = self.parent(reference) else {
            return false;
        };
        if self.is_ancestor_or_self(node, parent) {
            tracing::warn!("refusing to insert {node:?} under its own descendant {parent:?}");
            return false;
        }
        self.detach(node);
        let Some(pos) = self.children(parent).iter().position(|&n| n == reference) else {
            return false;
        };
        self.nodes[node.0].parent = Some(parent);
        self.nodes[parent.0].children.insert(pos, node);
        true
    }

    pub fn clear_children(&mut self, id: NodeId) {
        for child in std::mem::take(&mut self.nodes[id.0].children) {
            self.nodes[child.0].parent = None;
        }
    }

    /// All descendants of `scope` in document order, `scope` excluded.
    #[must_use]
    pub fn descendants(&self, scope: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(scope).iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.children(id).iter().rev().copied());
        }
        out
    }

    /// First descendant of `scope` with the given tag and attribute value.
    #[must_use]
    pub fn query(&self, scope: NodeId, tag: &str, attr: &str, value: &str) -> Option<NodeId> {
        self.descendants(scope)
            .into_iter()
            .find(|&id| self.tag(id) == Some(tag) && self.attr(id, attr) == Some(value))
    }

    #[must_use]
    pub fn elements_by_tag(&self, scope: NodeId, tag: &str) -> Vec<NodeId> {
        self.descendants(scope).into_iter().filter(|&id| self.tag(id) == Some(tag)).collect()
    }

    #[must_use]
    pub fn element_by_id(&self, id: &str) -> Option<NodeId> {
        self.descendants(self.root).into_iter().find(|&n| self.attr(n, "id") == Some(id))
    }

    /// Parses `markup` into detached nodes.
    pub fn parse_fragment(&mut self, markup: &str) -> Result<Vec<NodeId>, MarkupError> {
        markup::parse_fragment(self, markup)
    }

    /// Parses `markup` and appends the result to `parent`.
    pub fn append_markup(
        &mut self,
        parent: NodeId,
        markup: &str,
    ) -> Result<Vec<NodeId>, MarkupError> {
        let nodes = self.parse_fragment(markup)?;
        for &node in &nodes {
            self.append_child(parent, node);
        }
        Ok(nodes)
    }

    #[must_use]
    pub fn inner_markup(&self, id: NodeId) -> String {
        let mut out = String::new();
        for &child in self.children(id) {
            markup::write_node(self, child, &mut out);
        }
        out
    }

    #[must_use]
    pub fn outer_markup(&self, id: NodeId) -> String {
        let mut out = String::new();
        markup::write_node(self, id, &mut out);
        out
    }

    /// Visible text of `id` broken into lines at block boundaries and `<br>`.
    /// Whitespace collapses as in HTML; images show their title.
    #[must_use]
    pub fn text_lines(&self, id: NodeId) -> Vec<String> {
        let mut lines = LineBuilder::default();
        for &child in self.children(id) {
            self.collect_text(child, &mut lines);
        }
        lines.finish()
    }

    /// Like [`Document::text_lines`], but includes `id` itself, so a bare
    /// text node yields its own text.
    #[must_use]
    pub fn node_text_lines(&self, id: NodeId) -> Vec<String> {
        let mut lines = LineBuilder::default();
        self.collect_text(id, &mut lines);
        lines.finish()
    }

    fn collect_text(&self, id: NodeId, lines: &mut LineBuilder) {
        match self.kind(id) {
            NodeKind::Text(raw) => lines.push_text(&unescape_text(raw)),
            NodeKind::Element { tag, .. } => match tag.as_str() {
                "br" => lines.hard_break(),
                "img" => {
                    if let Some(title) = self.attr(id, "title").or_else(|| self.attr(id, "alt")) {
                        lines.push_text(&format!("[{title}]"));
                    }
                }
                _ => {
                    let block = BLOCK_TAGS.contains(&tag.as_str());
                    if block {
                        lines.soft_break();
                    }
                    for &child in self.children(id) {
                        self.collect_text(child, lines);
                    }
                    if block {
                        lines.soft_break();
                    }
                }
            },
        }
    }
}

#[derive(Default)]
struct LineBuilder {
    lines: Vec<String>,
    current: String,
}

impl LineBuilder {
    fn push_text(&mut self, text: &str) {
        for (i, word) in text.split(char::is_whitespace).enumerate() {
            let at_line_start = self.current.is_empty();
            if i > 0 && !at_line_start && !self.current.ends_with(' ') {
                self.current.push(' ');
            }
            self.current.push_str(word);
        }
    }

    fn soft_break(&mut self) {
        let line = self.current.trim_end();
        if !line.is_empty() {
            self.lines.push(line.to_owned());
        }
        self.current.clear();
    }

    fn hard_break(&mut self) {
        self.lines.push(self.current.trim_end().to_owned());
        self.current.clear();
    }

    fn finish(mut self) -> Vec<String> {
        self.soft_break();
        self.lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn siblings_and_parents() {
        let mut doc = Document::new();
        let root = doc.root();
        let nodes = doc.append_markup(root, "<a></a><b></b><c></c>").unwrap();
        assert_eq!(doc.next_sibling(nodes[0]), Some(nodes[1]));
        assert_eq!(doc.next_sibling(nodes[2]), None);
        assert_eq!(doc.parent(nodes[1]), Some(root));
    }

    #[test]
    fn insert_before_and_detach() {
        let mut doc = Document::new();
        let root = doc.root();
        let nodes = doc.append_markup(root, "<a></a><c></c>").unwrap();
        let b = doc.create_element("b", Vec::new());
        assert!(doc.insert_before(nodes[1], b));
        assert_eq!(doc.inner_markup(root), "<a></a><b></b><c></c>");
        doc.detach(nodes[0]);
        assert_eq!(doc.inner_markup(root), "<b></b><c></c>");
        assert!(!doc.is_attached(nodes[0]));
    }

    #[test]
    fn cycles_are_refused() {
        let mut doc = Document::new();
        let root = doc.root();
        let outer = doc.append_markup(root, "<div><span></span></div>").unwrap()[0];
        let inner = doc.children(outer)[0];
        doc.append_child(inner, outer);
        assert_eq!(doc.parent(outer), Some(root));
    }

    #[test]
    fn query_by_tag_and_attribute() {
        let mut doc = Document::new();
        let root = doc.root();
        doc.append_markup(root, "<div><x k=\"1\"></x><x k=\"2\"></x></div>").unwrap();
        let found = doc.query(root, "x", "k", "2").unwrap();
        assert_eq!(doc.attr(found, "k"), Some("2"));
        assert_eq!(doc.elements_by_tag(root, "x").len(), 2);
        assert!(doc.query(root, "x", "k", "3").is_none());
    }

    #[test]
    fn text_lines_follow_blocks() {
        let mut doc = Document::new();
        let root = doc.root();
        doc.append_markup(
            root,
            "<div>  hello   <b>world</b></div>\n<div>one<br>two &amp; <img title=\"edited\"></div>",
        )
        .unwrap();
        assert_eq!(doc.text_lines(root), vec!["hello world", "one", "two & [edited]"]);
    }

    #[test]
    fn node_text_lines_include_the_node() {
        let mut doc = Document::new();
        let root = doc.root();
        let nodes = doc.append_markup(root, "loose <i>text</i><p>para</p>").unwrap();
        assert_eq!(doc.node_text_lines(nodes[0]), vec!["loose"]);
        assert_eq!(doc.node_text_lines(nodes[2]), vec!["para"]);
        assert!(doc.text_lines(nodes[0]).is_empty());
    }
}
