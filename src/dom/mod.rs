//! In-memory document tree.
//!
//! An arena of nodes addressed by [`NodeId`]. Removing children frees their
//! whole subtrees; the slots are reused, and every handle carries the
//! generation of its slot so a handle to a freed node resolves to nothing.
//! Event listeners are registered per element as opaque [`ListenerId`]s;
//! whoever registers one is responsible for remembering what it means.

pub mod html;
pub mod selector;
pub mod vnode;

use indexmap::IndexMap;
use serde::Serialize;
use thiserror::Error;

pub use selector::Selector;
pub use vnode::{Fragment, VNode};

/// Errors from document operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomError {
    #[error("node {0:?} is not an element")]
    NotAnElement(NodeId),

    #[error("no container element given")]
    MissingContainer,

    #[error("cannot append {child:?} under its own descendant {parent:?}")]
    HierarchyRequest { parent: NodeId, child: NodeId },

    #[error("unsupported selector: {0}")]
    UnsupportedSelector(String),
}

/// Handle to a node in a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId {
    index: usize,
    generation: u32,
}

/// Handle to a registered event listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ListenerId(u64);

#[derive(Debug, Clone)]
enum NodeKind {
    Root,
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone)]
struct Element {
    tag: String,
    attrs: IndexMap<String, String>,
    listeners: Vec<(String, ListenerId)>,
}

#[derive(Debug, Clone)]
struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    kind: NodeKind,
}

/// One arena cell. `node` is `None` while the slot sits on the free list.
#[derive(Debug, Clone)]
struct Slot {
    generation: u32,
    node: Option<Node>,
}

/// The document tree.
#[derive(Debug, Clone)]
pub struct Document {
    slots: Vec<Slot>,
    free: Vec<usize>,
    root: NodeId,
    next_listener: u64,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// An empty document (just the root).
    pub fn new() -> Self {
        Self {
            slots: vec![Slot {
                generation: 0,
                node: Some(Node {
                    parent: None,
                    children: Vec::new(),
                    kind: NodeKind::Root,
                }),
            }],
            free: Vec::new(),
            root: NodeId {
                index: 0,
                generation: 0,
            },
            next_listener: 1,
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of live nodes, the root included.
    pub fn node_count(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    fn node(&self, id: NodeId) -> Option<&Node> {
        self.slots
            .get(id.index)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_ref())
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.slots
            .get_mut(id.index)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_mut())
    }

    fn push(&mut self, kind: NodeKind) -> NodeId {
        let node = Node {
            parent: None,
            children: Vec::new(),
            kind,
        };
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index];
            slot.node = Some(node);
            return NodeId {
                index,
                generation: slot.generation,
            };
        }
        self.slots.push(Slot {
            generation: 0,
            node: Some(node),
        });
        NodeId {
            index: self.slots.len() - 1,
            generation: 0,
        }
    }

    /// Drop `id` and everything under it, returning the slots to the free list.
    fn free_subtree(&mut self, id: NodeId) {
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if current == self.root {
                continue;
            }
            let Some(slot) = self
                .slots
                .get_mut(current.index)
                .filter(|slot| slot.generation == current.generation)
            else {
                continue;
            };
            let Some(node) = slot.node.take() else {
                continue;
            };
            slot.generation = slot.generation.wrapping_add(1);
            self.free.push(current.index);
            stack.extend(node.children);
        }
    }

    /// Create a detached element.
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.push(NodeKind::Element(Element {
            tag: tag.to_ascii_lowercase(),
            attrs: IndexMap::new(),
            listeners: Vec::new(),
        }))
    }

    /// Create a detached text node.
    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.push(NodeKind::Text(text.to_string()))
    }

    fn element(&self, id: NodeId) -> Option<&Element> {
        match &self.node(id)?.kind {
            NodeKind::Element(el) => Some(el),
            _ => None,
        }
    }

    fn element_mut(&mut self, id: NodeId) -> Result<&mut Element, DomError> {
        match self.node_mut(id).map(|n| &mut n.kind) {
            Some(NodeKind::Element(el)) => Ok(el),
            _ => Err(DomError::NotAnElement(id)),
        }
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        self.element(id).is_some()
    }

    pub fn tag(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(|el| el.tag.as_str())
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(|n| n.parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    /// Element children only, skipping text.
    pub fn element_children(&self, id: NodeId) -> Vec<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .filter(|c| self.is_element(*c))
            .collect()
    }

    /// Whether `id` is reachable from the document root.
    pub fn is_connected(&self, id: NodeId) -> bool {
        self.node(id).is_some() && self.is_inclusive_ancestor(self.root, id)
    }

    fn is_inclusive_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut cursor = Some(node);
        while let Some(current) = cursor {
            if current == ancestor {
                return true;
            }
            cursor = self.parent(current);
        }
        false
    }

    fn detach(&mut self, child: NodeId) {
        let Some(old) = self.node_mut(child).and_then(|n| n.parent.take()) else {
            return;
        };
        if let Some(parent) = self.node_mut(old) {
            parent.children.retain(|c| *c != child);
        }
    }

    /// Append `child` as the last child of `parent`, moving it if attached.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        if matches!(self.node(parent).map(|n| &n.kind), Some(NodeKind::Text(_)) | None) {
            return Err(DomError::NotAnElement(parent));
        }
        if matches!(self.node(child).map(|n| &n.kind), Some(NodeKind::Root) | None) {
            return Err(DomError::NotAnElement(child));
        }
        if self.is_inclusive_ancestor(child, parent) {
            return Err(DomError::HierarchyRequest { parent, child });
        }
        self.detach(child);
        if let Some(node) = self.node_mut(child) {
            node.parent = Some(parent);
        }
        if let Some(node) = self.node_mut(parent) {
            node.children.push(child);
        }
        Ok(())
    }

    /// Remove and free every child of `parent`. Returns how many were removed.
    ///
    /// Handles into the removed subtrees go stale: they no longer resolve,
    /// even after their slots are reused.
    pub fn remove_children(&mut self, parent: NodeId) -> Result<usize, DomError> {
        let children = match self.node_mut(parent) {
            Some(node) if !matches!(node.kind, NodeKind::Text(_)) => std::mem::take(&mut node.children),
            _ => return Err(DomError::NotAnElement(parent)),
        };
        for child in &children {
            self.free_subtree(*child);
        }
        Ok(children.len())
    }

    /// Build a detached subtree from a [`VNode`].
    pub fn materialize(&mut self, node: &VNode) -> NodeId {
        match node {
            VNode::Text { text } => self.create_text(text),
            VNode::Element {
                tag,
                attrs,
                children,
            } => {
                let id = self.create_element(tag);
                if let Ok(el) = self.element_mut(id) {
                    el.attrs = attrs.clone();
                }
                for child in children {
                    let child_id = self.materialize(child);
                    if let Some(node) = self.node_mut(child_id) {
                        node.parent = Some(id);
                    }
                    if let Some(node) = self.node_mut(id) {
                        node.children.push(child_id);
                    }
                }
                id
            }
        }
    }

    /// Materialize `fragment` and append its nodes to `parent` in order.
    pub fn append_fragment(
        &mut self,
        parent: NodeId,
        fragment: &Fragment,
    ) -> Result<Vec<NodeId>, DomError> {
        let mut appended = Vec::with_capacity(fragment.len());
        for node in &fragment.nodes {
            let id = self.materialize(node);
            if let Err(e) = self.append_child(parent, id) {
                self.free_subtree(id);
                return Err(e);
            }
            appended.push(id);
        }
        Ok(appended)
    }

    // ── Attributes and classes ──────────────────────────────────────

    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id)
            .and_then(|el| el.attrs.get(name))
            .map(String::as_str)
    }

    pub fn set_attr(&mut self, id: NodeId, name: &str, value: &str) -> Result<(), DomError> {
        self.element_mut(id)?
            .attrs
            .insert(name.to_string(), value.to_string());
        Ok(())
    }

    pub fn remove_attr(&mut self, id: NodeId, name: &str) -> Result<(), DomError> {
        self.element_mut(id)?.attrs.shift_remove(name);
        Ok(())
    }

    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.attr(id, "class")
            .is_some_and(|classes| classes.split_whitespace().any(|c| c == class))
    }

    /// Toggle a class token. Returns `true` if the class is now present.
    pub fn toggle_class(&mut self, id: NodeId, class: &str) -> Result<bool, DomError> {
        let el = self.element_mut(id)?;
        let mut tokens: Vec<String> = el
            .attrs
            .get("class")
            .map(|v| v.split_whitespace().map(ToOwned::to_owned).collect())
            .unwrap_or_default();

        let present = if let Some(pos) = tokens.iter().position(|t| t == class) {
            tokens.remove(pos);
            false
        } else {
            tokens.push(class.to_string());
            true
        };

        if tokens.is_empty() {
            el.attrs.shift_remove("class");
        } else {
            el.attrs.insert("class".to_string(), tokens.join(" "));
        }
        Ok(present)
    }

    pub fn is_disabled(&self, id: NodeId) -> bool {
        self.attr(id, "disabled").is_some()
    }

    pub fn set_disabled(&mut self, id: NodeId, disabled: bool) -> Result<(), DomError> {
        if disabled {
            self.set_attr(id, "disabled", "")
        } else {
            self.remove_attr(id, "disabled")
        }
    }

    // ── Text ────────────────────────────────────────────────────────

    pub fn text_content(&self, id: NodeId) -> String {
        match self.node(id).map(|n| &n.kind) {
            Some(NodeKind::Text(text)) => text.clone(),
            Some(_) => self
                .children(id)
                .iter()
                .map(|c| self.text_content(*c))
                .collect(),
            None => String::new(),
        }
    }

    /// Replace all children of an element with a single text node.
    pub fn set_text_content(&mut self, id: NodeId, text: &str) -> Result<(), DomError> {
        self.remove_children(id)?;
        if !text.is_empty() {
            let node = self.create_text(text);
            self.append_child(id, node)?;
        }
        Ok(())
    }

    // ── Lookup ──────────────────────────────────────────────────────

    /// Descendant elements of `under` in document order.
    pub fn descendants(&self, under: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(under).iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            if self.is_element(id) {
                out.push(id);
            }
            stack.extend(self.children(id).iter().rev());
        }
        out
    }

    /// Descendant elements of `under` with the given tag, in document order.
    pub fn elements_by_tag(&self, under: NodeId, tag: &str) -> Vec<NodeId> {
        self.descendants(under)
            .into_iter()
            .filter(|id| self.tag(*id).is_some_and(|t| t.eq_ignore_ascii_case(tag)))
            .collect()
    }

    pub fn by_id(&self, id: &str) -> Option<NodeId> {
        self.descendants(self.root)
            .into_iter()
            .find(|n| self.attr(*n, "id") == Some(id))
    }

    /// First descendant of `under` matching `selector`.
    pub fn query_selector(&self, under: NodeId, selector: &str) -> Result<Option<NodeId>, DomError> {
        Ok(self.query_selector_all(under, selector)?.into_iter().next())
    }

    /// Every descendant of `under` matching `selector`, in document order.
    pub fn query_selector_all(&self, under: NodeId, selector: &str) -> Result<Vec<NodeId>, DomError> {
        let sel = Selector::parse(selector)?;
        Ok(self
            .descendants(under)
            .into_iter()
            .filter(|id| {
                self.element(*id).is_some_and(|el| {
                    sel.matches(&el.tag, |name| el.attrs.get(name).map(String::as_str))
                })
            })
            .collect())
    }

    // ── Events ──────────────────────────────────────────────────────

    /// Register a new listener for `event` on an element.
    pub fn add_event_listener(&mut self, id: NodeId, event: &str) -> Result<ListenerId, DomError> {
        let listener = ListenerId(self.next_listener);
        self.element_mut(id)?
            .listeners
            .push((event.to_string(), listener));
        self.next_listener += 1;
        Ok(listener)
    }

    /// Unregister exactly `listener`. Returns whether anything was removed.
    pub fn remove_event_listener(&mut self, id: NodeId, event: &str, listener: ListenerId) -> bool {
        let Ok(el) = self.element_mut(id) else {
            return false;
        };
        let before = el.listeners.len();
        el.listeners
            .retain(|(ev, l)| !(ev == event && *l == listener));
        el.listeners.len() != before
    }

    /// Listeners registered for `event` on `id`, in registration order.
    pub fn listeners(&self, id: NodeId, event: &str) -> Vec<ListenerId> {
        self.element(id)
            .map(|el| {
                el.listeners
                    .iter()
                    .filter(|(ev, _)| ev == event)
                    .map(|(_, l)| *l)
                    .collect()
            })
            .unwrap_or_default()
    }
}
