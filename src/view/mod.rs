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

//! The chat view: content tree, scroll surface and scroll-follow engine.

pub mod document;
pub mod markup;
pub mod scroll;
pub mod splice;
pub mod surface;

pub use document::{Document, NodeId, NodeKind};
pub use markup::{MarkupError, escape_attr, escape_html};
pub use scroll::{FollowPhase, ScrollFollower, ScrollMetrics, TickScheduler, TimerId, TimerQueue};
pub use splice::{ContentTree, EDITED_INDICATOR, SpliceOutcome, replace_message, replaceable_message};
pub use surface::{ScrollSurface, SimulatedSurface, SurfaceNotification};

use std::time::Instant;

/// Replaces every `<icon name="N" text="T">` under `scope` with
/// `<img src="/psiicon/N" title="T">`.
pub fn replace_icons(document: &mut Document, scope: NodeId) {
    for icon in document.elements_by_tag(scope, "icon") {
        let name = document.attr(icon, "name").unwrap_or_default().to_owned();
        let text = document.attr(icon, "text").unwrap_or_default().to_owned();
        let img = document.create_element(
            "img",
            vec![("src".to_owned(), format!("/psiicon/{name}")), ("title".to_owned(), text)],
        );
        document.insert_before(icon, img);
        document.detach(icon);
    }
}

/// Rendered chat content on a scrollable surface.
///
/// Every mutation reflows the surface immediately; callers invalidate the
/// follower once they are done mutating.
pub struct ChatView {
    document: Document,
    surface: Box<dyn ScrollSurface>,
    follower: ScrollFollower<TimerQueue>,
}

impl ChatView {
    pub fn new(surface: Box<dyn ScrollSurface>, animate: bool, now: Instant) -> Self {
        Self {
            document: Document::new(),
            surface,
            follower: ScrollFollower::new(TimerQueue::new(now), animate),
        }
    }

    #[must_use]
    pub fn document(&self) -> &Document {
        &self.document
    }

    #[must_use]
    pub fn root(&self) -> NodeId {
        self.document.root()
    }

    #[must_use]
    pub fn follower(&self) -> &ScrollFollower<TimerQueue> {
        &self.follower
    }

    #[must_use]
    pub fn surface(&self) -> &dyn ScrollSurface {
        self.surface.as_ref()
    }

    /// Appends `markup` to the end of the body.
    pub fn append_html(&mut self, markup: &str) -> Result<Vec<NodeId>, MarkupError> {
        let root = self.document.root();
        self.append_html_to(root, markup)
    }

    pub fn append_html_to(&mut self, dest: NodeId, markup: &str) -> Result<Vec<NodeId>, MarkupError> {
        let nodes = self.parse_with_icons(markup)?;
        for &node in &nodes {
            self.document.append_child(dest, node);
        }
        self.reflow();
        Ok(nodes)
    }

    /// Inserts `markup` immediately before `dest`.
    pub fn sibling_html(&mut self, dest: NodeId, markup: &str) -> Result<Vec<NodeId>, MarkupError> {
        let nodes = self.parse_with_icons(markup)?;
        for &node in &nodes {
            if !self.document.insert_before(dest, node) {
                tracing::warn!("sibling insert target {dest:?} is detached");
            }
        }
        self.reflow();
        Ok(nodes)
    }

    fn parse_with_icons(&mut self, markup: &str) -> Result<Vec<NodeId>, MarkupError> {
        let holder = self.document.create_element("div", Vec::new());
        for node in self.document.parse_fragment(markup)? {
            self.document.append_child(holder, node);
        }
        replace_icons(&mut self.document, holder);
        let nodes = self.document.children(holder).to_vec();
        self.document.clear_children(holder);
        Ok(nodes)
    }

    /// Removes the element with `id` if it exists.
    pub fn ensure_deleted(&mut self, id: &str) -> bool {
        if id.is_empty() {
            return false;
        }
        let Some(node) = self.document.element_by_id(id) else {
            return false;
        };
        self.document.detach(node);
        self.reflow();
        true
    }

    /// Replaces a rendered message; see [`splice::replace_message`].
    pub fn replace_message(
        &mut self,
        msg_id: &str,
        new_id: &str,
        text: &str,
    ) -> Result<SpliceOutcome, MarkupError> {
        let root = self.document.root();
        let outcome = replace_message(&mut self.document, root, msg_id, new_id, text)?;
        if outcome.is_replaced() {
            replace_icons(&mut self.document, root);
            self.reflow();
        }
        Ok(outcome)
    }

    /// Removes all content.
    pub fn clear(&mut self) {
        let root = self.document.root();
        self.document.clear_children(root);
        self.reflow();
    }

    pub fn invalidate(&mut self) {
        self.follower.invalidate(self.surface.as_ref());
    }

    pub fn force_follow(&mut self) {
        self.follower.force(self.surface.as_ref());
    }

    fn reflow(&mut self) {
        self.surface.reflow(&self.document);
        self.process_notifications();
    }

    /// Feeds queued surface notifications to the follower.
    pub fn process_notifications(&mut self) {
        for notification in self.surface.take_notifications() {
            match notification {
                SurfaceNotification::Scrolled => self.follower.on_scroll(self.surface.as_ref()),
                SurfaceNotification::Resized => self.follower.on_resize(),
            }
        }
    }

    /// Fires every timer due at `now`, including zero-delay timers scheduled
    /// while firing. Returns the number fired.
    pub fn fire_due_timers(&mut self, now: Instant) -> usize {
        let mut fired = 0;
        loop {
            self.process_notifications();
            let due = self.follower.scheduler_mut().advance_to(now);
            if due.is_empty() {
                return fired;
            }
            for id in due {
                self.follower.on_timer(id, self.surface.as_mut());
                self.process_notifications();
                fired += 1;
            }
        }
    }

    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.follower.scheduler().next_deadline()
    }

    /// Runs pending timers on a virtual clock until none remain.
    pub fn settle(&mut self) {
        while let Some(deadline) = self.next_deadline() {
            self.fire_due_timers(deadline);
        }
    }
}
