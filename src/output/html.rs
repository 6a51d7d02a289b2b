//! HTML renderer: the whole document as a standalone page.

use crate::orchestrator::PageSnapshot;
use crate::output::OutputRenderer;

/// Serializes the live document tree.
pub struct HtmlRenderer;

impl OutputRenderer for HtmlRenderer {
    fn render(&self, page: &PageSnapshot<'_>) -> String {
        let doc = page.document;
        format!("<!DOCTYPE html>\n{}\n", doc.outer_html(doc.root()))
    }
}
