//! Detached node descriptions.
//!
//! Renderers build [`VNode`] trees as plain values; nothing touches a
//! [`Document`](super::Document) until the tree is materialized.

use indexmap::IndexMap;
use serde::Serialize;

/// A detached node: an element with attributes and children, or text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum VNode {
    Element {
        tag: String,
        attrs: IndexMap<String, String>,
        children: Vec<VNode>,
    },
    Text { text: String },
}

impl VNode {
    /// An empty element.
    pub fn element(tag: &str) -> Self {
        VNode::Element {
            tag: tag.to_string(),
            attrs: IndexMap::new(),
            children: Vec::new(),
        }
    }

    /// An element whose only child is `text` (nothing when `text` is empty).
    pub fn with_text(tag: &str, text: impl Into<String>) -> Self {
        VNode::element(tag).text(text)
    }

    /// Set an attribute. No effect on text nodes.
    pub fn attr(mut self, name: &str, value: impl Into<String>) -> Self {
        if let VNode::Element { attrs, .. } = &mut self {
            attrs.insert(name.to_string(), value.into());
        }
        self
    }

    /// Append a class token to the `class` attribute.
    pub fn class(mut self, class: &str) -> Self {
        if let VNode::Element { attrs, .. } = &mut self {
            let classes = attrs.entry("class".to_string()).or_default();
            if !classes.split_whitespace().any(|c| c == class) {
                if !classes.is_empty() {
                    classes.push(' ');
                }
                classes.push_str(class);
            }
        }
        self
    }

    pub fn child(mut self, node: VNode) -> Self {
        if let VNode::Element { children, .. } = &mut self {
            children.push(node);
        }
        self
    }

    pub fn children(mut self, nodes: impl IntoIterator<Item = VNode>) -> Self {
        if let VNode::Element { children, .. } = &mut self {
            children.extend(nodes);
        }
        self
    }

    /// Append a text child, skipping empty strings like `textContent = ""`.
    pub fn text(self, text: impl Into<String>) -> Self {
        let text = text.into();
        if text.is_empty() {
            self
        } else {
            self.child(VNode::Text { text })
        }
    }

    pub fn tag(&self) -> Option<&str> {
        match self {
            VNode::Element { tag, .. } => Some(tag),
            VNode::Text { .. } => None,
        }
    }

    pub fn get_attr(&self, name: &str) -> Option<&str> {
        match self {
            VNode::Element { attrs, .. } => attrs.get(name).map(String::as_str),
            VNode::Text { .. } => None,
        }
    }

    /// Concatenated text of this node and its descendants.
    pub fn text_content(&self) -> String {
        match self {
            VNode::Text { text } => text.clone(),
            VNode::Element { children, .. } => {
                children.iter().map(VNode::text_content).collect()
            }
        }
    }
}

/// An ordered run of detached nodes appended to a parent in one step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Fragment {
    pub nodes: Vec<VNode>,
}

impl Fragment {
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl FromIterator<VNode> for Fragment {
    fn from_iter<I: IntoIterator<Item = VNode>>(iter: I) -> Self {
        Self {
            nodes: iter.into_iter().collect(),
        }
    }
}
