//! Output renderers: terminal, HTML, JSON.

pub mod html;
pub mod json;
pub mod terminal;

use crate::orchestrator::PageSnapshot;

/// Trait for rendering a page to an output format.
pub trait OutputRenderer {
    /// Render the page to a string.
    fn render(&self, page: &PageSnapshot<'_>) -> String;
}
