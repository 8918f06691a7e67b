use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::AbortHandle;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadStatus {
    Uploading,
    Completed,
    Error,
}

/// An in-flight upload as observed by the UI
#[derive(Debug, Clone)]
pub struct UploadTask {
    pub id: String,
    pub name: String,
    pub size: u64,
    pub progress: u8,
    pub status: UploadStatus,
}

#[derive(Default)]
struct TrackerInner {
    tasks: Vec<UploadTask>,
    /// Scheduled removals keyed by task id, aborted on early removal
    pending_removals: HashMap<String, AbortHandle>,
}

/// Process-wide registry of in-flight uploads.
///
/// Concurrent uploads each own a disjoint task entry; collection-level
/// add/remove are serialized behind one lock so near-simultaneous
/// completions never lose updates.
#[derive(Default)]
pub struct UploadTracker {
    inner: Mutex<TrackerInner>,
}

impl UploadTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, task: UploadTask) {
        if let Ok(mut inner) = self.inner.lock() {
            debug!("Tracking upload '{}' ({})", task.id, task.name);
            inner.tasks.push(task);
        }
    }

    pub fn update_progress(&self, id: &str, progress: u8) {
        if let Ok(mut inner) = self.inner.lock() {
            if let Some(task) = inner.tasks.iter_mut().find(|t| t.id == id) {
                task.progress = progress.min(100);
            }
        }
    }

    pub fn mark_complete(&self, id: &str) {
        if let Ok(mut inner) = self.inner.lock() {
            if let Some(task) = inner.tasks.iter_mut().find(|t| t.id == id) {
                task.progress = 100;
                task.status = UploadStatus::Completed;
            }
        }
    }

    pub fn mark_error(&self, id: &str) {
        if let Ok(mut inner) = self.inner.lock() {
            if let Some(task) = inner.tasks.iter_mut().find(|t| t.id == id) {
                task.status = UploadStatus::Error;
            }
        }
    }

    /// Remove a task immediately, cancelling any scheduled removal
    pub fn remove(&self, id: &str) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.tasks.retain(|t| t.id != id);
            if let Some(handle) = inner.pending_removals.remove(id) {
                handle.abort();
            }
        }
    }

    /// Schedule removal of a task after `delay`. The removal is keyed by
    /// task id and cancelled if the task is removed early by another path.
    pub fn schedule_removal(self: &Arc<Self>, id: &str, delay: Duration) {
        let tracker = Arc::clone(self);
        let task_id = id.to_string();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            tracker.remove(&task_id);
        });

        if let Ok(mut inner) = self.inner.lock() {
            inner
                .pending_removals
                .insert(id.to_string(), handle.abort_handle());
        }
    }

    pub fn get(&self, id: &str) -> Option<UploadTask> {
        self.inner
            .lock()
            .ok()
            .and_then(|inner| inner.tasks.iter().find(|t| t.id == id).cloned())
    }

    pub fn snapshot(&self) -> Vec<UploadTask> {
        self.inner
            .lock()
            .map(|inner| inner.tasks.clone())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().map(|inner| inner.tasks.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
