//! Applies renderer output to the live document.
//!
//! Lookups of a post's button and comment section go through the shared
//! `data-post-id` attribute; each half reports its own outcome.

use crate::constants::{HIDE_CLASS, HIDE_COMMENTS, POST_ID_ATTR, SELECT_MENU_ID, SHOW_COMMENTS};
use crate::dom::{Document, DomError, Fragment, NodeId};
use crate::models::{Id, User};
use crate::render;

/// Outcome of a toggle on one half of a post's button/section pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    /// No post id was given; nothing was looked up.
    NoOp,
    /// No element carries that post id.
    NotFound,
    /// The element was toggled.
    Toggled(NodeId),
}

/// What goes into `<main>` after a refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MainContent {
    Posts(Fragment),
    Placeholder,
}

/// The page's `<main>` element.
pub fn main_container(doc: &Document) -> Option<NodeId> {
    doc.elements_by_tag(doc.root(), "main").into_iter().next()
}

/// The `select#selectMenu` user picker.
pub fn select_menu(doc: &Document) -> Option<NodeId> {
    doc.by_id(SELECT_MENU_ID)
}

/// Remove every child of `container`.
pub fn clear_children(doc: &mut Document, container: Option<NodeId>) -> Result<NodeId, DomError> {
    let container = container.ok_or(DomError::MissingContainer)?;
    if !doc.is_element(container) {
        return Err(DomError::NotAnElement(container));
    }
    doc.remove_children(container)?;
    Ok(container)
}

/// Clear `<main>` and append `content`. Returns the appended top-level nodes.
pub fn replace_main_content(doc: &mut Document, content: &MainContent) -> Result<Vec<NodeId>, DomError> {
    let main = main_container(doc);
    clear_children(doc, main)?;
    append_main_content(doc, content)
}

/// Append `content` to `<main>` without clearing it first.
pub fn append_main_content(doc: &mut Document, content: &MainContent) -> Result<Vec<NodeId>, DomError> {
    let main = main_container(doc).ok_or(DomError::MissingContainer)?;
    match content {
        MainContent::Posts(fragment) => doc.append_fragment(main, fragment),
        MainContent::Placeholder => {
            let placeholder: Fragment = std::iter::once(render::placeholder()).collect();
            doc.append_fragment(main, &placeholder)
        }
    }
}

/// Mark the option whose value is `value` as selected, unmarking the rest.
pub fn set_selected_option(doc: &mut Document, value: &str) -> Option<NodeId> {
    let select = select_menu(doc)?;
    let mut chosen = None;
    for option in doc.elements_by_tag(select, "option") {
        if chosen.is_none() && doc.attr(option, "value") == Some(value) {
            doc.set_attr(option, "selected", "").ok()?;
            chosen = Some(option);
        } else {
            doc.remove_attr(option, "selected").ok()?;
        }
    }
    chosen
}

fn find_tagged(doc: &Document, tag: &str, post_id: Id) -> Option<NodeId> {
    let selector = format!("{tag}[{POST_ID_ATTR}='{post_id}']");
    doc.query_selector(doc.root(), &selector).ok().flatten()
}

/// The comment section tagged with `post_id`, if rendered.
pub fn comment_section(doc: &Document, post_id: Id) -> Option<NodeId> {
    find_tagged(doc, "section", post_id)
}

/// The toggle button tagged with `post_id`, if rendered.
pub fn toggle_button(doc: &Document, post_id: Id) -> Option<NodeId> {
    find_tagged(doc, "button", post_id)
}

/// Flip the hidden marker on a post's comment section.
pub fn toggle_comment_section(doc: &mut Document, post_id: Option<Id>) -> Toggle {
    let Some(post_id) = post_id else {
        return Toggle::NoOp;
    };
    let Some(section) = comment_section(doc, post_id) else {
        return Toggle::NotFound;
    };
    match doc.toggle_class(section, HIDE_CLASS) {
        Ok(_) => Toggle::Toggled(section),
        Err(_) => Toggle::NotFound,
    }
}

/// Flip a post's button label between "Show Comments" and "Hide Comments".
pub fn toggle_comment_button(doc: &mut Document, post_id: Option<Id>) -> Toggle {
    let Some(post_id) = post_id else {
        return Toggle::NoOp;
    };
    let Some(button) = toggle_button(doc, post_id) else {
        return Toggle::NotFound;
    };
    let label = if doc.text_content(button) == SHOW_COMMENTS {
        HIDE_COMMENTS
    } else {
        SHOW_COMMENTS
    };
    match doc.set_text_content(button, label) {
        Ok(()) => Toggle::Toggled(button),
        Err(_) => Toggle::NotFound,
    }
}

/// Append one option per user to the select menu.
pub fn populate_select_menu(doc: &mut Document, users: Option<&[User]>) -> Option<NodeId> {
    let options = render::build_option_list(users)?;
    let select = select_menu(doc)?;
    for option in &options {
        let node = doc.materialize(option);
        doc.append_child(select, node).ok()?;
    }
    Some(select)
}

/// Build the static page: header with the user picker, and an empty `<main>`.
pub fn page_skeleton() -> Document {
    use crate::dom::VNode;

    let mut doc = Document::new();
    let html = VNode::element("html").attr("lang", "en").child(
        VNode::element("body")
            .child(
                VNode::element("header")
                    .child(VNode::with_text("h1", "Employee Posts"))
                    .child(
                        VNode::element("select")
                            .attr("id", SELECT_MENU_ID)
                            .child(VNode::with_text("option", "Employees").attr("value", "")),
                    ),
            )
            .child(VNode::element("main")),
    );
    let root = doc.root();
    let node = doc.materialize(&html);
    if let Err(e) = doc.append_child(root, node) {
        tracing::debug!("could not attach page skeleton: {e}");
    }
    doc
}
