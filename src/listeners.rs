//! Click handlers on the comment toggle buttons.
//!
//! Each bound button's [`ListenerId`] is kept in a side map keyed by post
//! id, and unbinding detaches exactly those stored ids. The document never
//! has to recognise a handler by identity.

use indexmap::IndexMap;
use serde::Serialize;

use crate::constants::POST_ID_ATTR;
use crate::dom::{Document, ListenerId, NodeId};
use crate::models::{Id, present};
use crate::mutate::main_container;

pub const CLICK: &str = "click";

/// A button together with the listener registered on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BoundButton {
    pub button: NodeId,
    pub post_id: Id,
    pub listener: ListenerId,
}

/// Registry of toggle-button listeners.
#[derive(Debug, Default)]
pub struct ListenerManager {
    bindings: IndexMap<Id, BoundButton>,
}

/// The post id a button (or section) is tagged with.
pub fn post_id_of(doc: &Document, node: NodeId) -> Option<Id> {
    doc.attr(node, POST_ID_ATTR)
        .and_then(|v| v.trim().parse::<Id>().ok())
        .and_then(present)
}

impl ListenerManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a click listener to every tagged button under `<main>`.
    ///
    /// Buttons without a usable post id are skipped; a click on them could
    /// not toggle anything.
    pub fn bind_toggle_handlers(&mut self, doc: &mut Document) -> Vec<BoundButton> {
        let Some(main) = main_container(doc) else {
            return Vec::new();
        };
        let mut bound = Vec::new();
        for button in doc.elements_by_tag(main, "button") {
            let Some(post_id) = post_id_of(doc, button) else {
                tracing::debug!(?button, "button has no post id; not bound");
                continue;
            };
            if let Some(previous) = self.bindings.shift_remove(&post_id) {
                doc.remove_event_listener(previous.button, CLICK, previous.listener);
            }
            let Ok(listener) = doc.add_event_listener(button, CLICK) else {
                continue;
            };
            let binding = BoundButton {
                button,
                post_id,
                listener,
            };
            self.bindings.insert(post_id, binding);
            bound.push(binding);
        }
        tracing::debug!(count = bound.len(), "bound toggle handlers");
        bound
    }

    /// Detach every listener this manager registered.
    pub fn unbind_toggle_handlers(&mut self, doc: &mut Document) -> Vec<BoundButton> {
        let unbound: Vec<BoundButton> = self.bindings.drain(..).map(|(_, b)| b).collect();
        for binding in &unbound {
            if !doc.remove_event_listener(binding.button, CLICK, binding.listener) {
                tracing::debug!(post_id = binding.post_id, "listener already gone");
            }
        }
        tracing::debug!(count = unbound.len(), "unbound toggle handlers");
        unbound
    }

    /// The post a dispatched listener was bound for.
    pub fn post_for_listener(&self, listener: ListenerId) -> Option<Id> {
        self.bindings
            .values()
            .find(|b| b.listener == listener)
            .map(|b| b.post_id)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}
