//! Progress reporting for terminal output.
//!
//! Provides a live-updating per-fetch status display with colored
//! checkmarks and failure indicators while post details load. Designed
//! for interactive terminals; silenced with `--quiet`.

use std::io::{self, Write};
use std::sync::Mutex;

use colored::Colorize;
use indexmap::IndexMap;

/// Status of a single upstream fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskStatus {
    /// Queued, waiting for a concurrency slot.
    Pending,
    /// Request in flight.
    InProgress,
    /// Completed successfully.
    Done,
    /// Produced no result.
    Failed(String),
}

/// Tracks and renders live progress for a batch of fetches.
///
/// Shared across async tasks via `Arc`.
pub struct ProgressTracker {
    inner: Mutex<ProgressState>,
    /// If false, all output is suppressed.
    enabled: bool,
}

struct ProgressState {
    /// label → status, in registration order.
    tasks: IndexMap<String, TaskStatus>,
    /// Number of lines we last printed (for clearing).
    rendered_lines: usize,
    /// Header line for the current batch.
    title: String,
}

impl ProgressTracker {
    pub fn new(enabled: bool) -> Self {
        Self {
            inner: Mutex::new(ProgressState {
                tasks: IndexMap::new(),
                rendered_lines: 0,
                title: String::new(),
            }),
            enabled,
        }
    }

    /// A tracker that records state but never prints.
    pub fn silent() -> Self {
        Self::new(false)
    }

    /// Start a new batch, replacing whatever was tracked before.
    pub fn begin(&self, title: &str, labels: &[String]) {
        let mut state = self.lock();
        state.title = title.to_string();
        state.tasks = labels
            .iter()
            .map(|l| (l.clone(), TaskStatus::Pending))
            .collect();
        if self.enabled {
            Self::render(&mut state);
        }
    }

    /// Update the status of a task and re-render.
    pub fn update(&self, label: &str, status: TaskStatus) {
        let mut state = self.lock();
        state.tasks.insert(label.to_string(), status);
        if self.enabled {
            Self::render(&mut state);
        }
    }

    /// Current status of a task.
    pub fn status(&self, label: &str) -> Option<TaskStatus> {
        self.lock().tasks.get(label).cloned()
    }

    /// Clear the live display and print one summary line.
    pub fn finish(&self) {
        if !self.enabled {
            return;
        }
        let mut state = self.lock();
        Self::clear_lines(state.rendered_lines);
        state.rendered_lines = 0;

        let failed = state
            .tasks
            .values()
            .filter(|s| matches!(s, TaskStatus::Failed(_)))
            .count();
        let total = state.tasks.len();
        if total == 0 {
            return;
        }

        let stderr = io::stderr();
        let mut handle = stderr.lock();
        if failed == 0 {
            let _ = writeln!(handle, "  {} {} fetch(es) done", "✔".green().bold(), total);
        } else {
            let _ = writeln!(
                handle,
                "  {} {} of {} fetch(es) produced no result",
                "✖".red().bold(),
                failed,
                total
            );
        }
        let _ = handle.flush();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ProgressState> {
        // A panic while holding the lock leaves only display state behind.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Render the current state to stderr, clearing previous output.
    fn render(state: &mut ProgressState) {
        let stderr = io::stderr();
        let mut handle = stderr.lock();

        Self::clear_lines(state.rendered_lines);

        let mut lines = 0;

        let _ = writeln!(handle, "  {} {}", "▸".cyan().bold(), state.title);
        lines += 1;

        for (label, status) in &state.tasks {
            let (icon, status_text) = match status {
                TaskStatus::Pending => ("○".dimmed().to_string(), "waiting".dimmed().to_string()),
                TaskStatus::InProgress => (
                    "◌".cyan().bold().to_string(),
                    "fetching…".cyan().to_string(),
                ),
                TaskStatus::Done => ("✔".green().bold().to_string(), "done".green().to_string()),
                TaskStatus::Failed(reason) => {
                    ("✖".red().bold().to_string(), reason.red().to_string())
                }
            };
            let _ = writeln!(handle, "    {icon} {} {status_text}", label.dimmed());
            lines += 1;
        }

        let _ = handle.flush();
        state.rendered_lines = lines;
    }

    /// Move cursor up and clear `n` lines.
    fn clear_lines(n: usize) {
        if n == 0 {
            return;
        }
        let stderr = io::stderr();
        let mut handle = stderr.lock();
        for _ in 0..n {
            let _ = write!(handle, "\x1b[1A\x1b[2K");
        }
        let _ = handle.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracker_disabled_no_panic() {
        let tracker = ProgressTracker::silent();
        tracker.begin("Loading 1 post", &["comments 1".to_string()]);
        tracker.update("comments 1", TaskStatus::InProgress);
        tracker.update("comments 1", TaskStatus::Done);
        tracker.finish();
    }

    #[test]
    fn tracker_tracks_state() {
        let tracker = ProgressTracker::silent();
        tracker.begin(
            "Loading",
            &["author 3".to_string(), "comments 10".to_string()],
        );
        assert_eq!(tracker.status("author 3"), Some(TaskStatus::Pending));

        tracker.update("author 3", TaskStatus::Done);
        tracker.update("comments 10", TaskStatus::Failed("no result".to_string()));

        assert_eq!(tracker.status("author 3"), Some(TaskStatus::Done));
        assert!(matches!(tracker.status("comments 10"), Some(TaskStatus::Failed(_))));
    }

    #[test]
    fn begin_replaces_previous_batch() {
        let tracker = ProgressTracker::silent();
        tracker.begin("first", &["a".to_string()]);
        tracker.begin("second", &["b".to_string()]);
        assert_eq!(tracker.status("a"), None);
        assert_eq!(tracker.status("b"), Some(TaskStatus::Pending));
    }
}
