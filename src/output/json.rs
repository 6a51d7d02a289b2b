//! JSON output renderer.
//!
//! Outputs `{"state": ..., "view": {...}}` format.

use crate::orchestrator::PageSnapshot;
use crate::output::OutputRenderer;

/// JSON output renderer.
pub struct JsonRenderer;

impl OutputRenderer for JsonRenderer {
    fn render(&self, page: &PageSnapshot<'_>) -> String {
        let output = serde_json::json!({
            "state": page.state,
            "view": page.view,
        });

        serde_json::to_string_pretty(&output).unwrap_or_else(|_| "{}".to_string())
    }
}
