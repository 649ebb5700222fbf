//! In-memory registry of live tasks.
//!
//! The map itself is only locked to look entries up or insert them. Each
//! [`TaskEntry`] then carries its own lock, so work on one task never
//! waits on another.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::{Mutex, MutexGuard, Notify, RwLock};
use tracing::debug;

use crate::types::Task;

/// One task plus its coordination state.
#[derive(Debug)]
pub struct TaskEntry {
    id: String,
    task: Mutex<Task>,
    running: AtomicBool,
    cancel_requested: AtomicBool,
    cancel: Notify,
}

impl TaskEntry {
    fn new(task: Task) -> Self {
        Self {
            id: task.id.clone(),
            task: Mutex::new(task),
            running: AtomicBool::new(false),
            cancel_requested: AtomicBool::new(false),
            cancel: Notify::new(),
        }
    }

    /// The task ID.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Lock the task for reading or mutation.
    pub async fn lock(&self) -> MutexGuard<'_, Task> {
        self.task.lock().await
    }

    /// A copy of the task as it is right now.
    pub async fn snapshot(&self) -> Task {
        self.task.lock().await.clone()
    }

    /// Claim the run slot. `None` while another driver holds it.
    pub fn try_claim(self: &Arc<Self>) -> Option<RunGuard> {
        self.running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| RunGuard {
                entry: Arc::clone(self),
            })
    }

    /// Whether a driver currently holds the run slot.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Signal the driver, if any, to stop.
    pub fn request_cancel(&self) {
        self.cancel_requested.store(true, Ordering::Release);
        // Stores a permit when no driver is waiting yet.
        self.cancel.notify_one();
    }

    /// Whether cancellation has been requested.
    pub fn cancel_requested(&self) -> bool {
        self.cancel_requested.load(Ordering::Acquire)
    }

    /// Resolves once cancellation has been requested.
    pub async fn cancelled(&self) {
        if self.cancel_requested() {
            return;
        }
        self.cancel.notified().await;
    }
}

/// Exclusive right to drive a task. Released on drop.
#[derive(Debug)]
pub struct RunGuard {
    entry: Arc<TaskEntry>,
}

impl RunGuard {
    /// The entry this guard was claimed on.
    pub fn entry(&self) -> &Arc<TaskEntry> {
        &self.entry
    }
}

impl Drop for RunGuard {
    fn drop(&mut self) {
        self.entry.running.store(false, Ordering::Release);
        debug!(task_id = %self.entry.id, "Run slot released");
    }
}

/// Keyed registry of task entries.
#[derive(Debug, Default)]
pub struct TaskRegistry {
    entries: RwLock<HashMap<String, Arc<TaskEntry>>>,
}

impl TaskRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up an entry.
    pub async fn get(&self, task_id: &str) -> Option<Arc<TaskEntry>> {
        self.entries.read().await.get(task_id).cloned()
    }

    /// Insert `task` unless its ID is taken.
    ///
    /// A new entry comes back with its run slot already claimed, so no
    /// other submitter can start it first. When the ID exists, the
    /// existing entry is returned as the error.
    pub async fn insert_new(&self, task: Task) -> Result<RunGuard, Arc<TaskEntry>> {
        let mut entries = self.entries.write().await;
        if let Some(existing) = entries.get(&task.id) {
            return Err(Arc::clone(existing));
        }
        let entry = Arc::new(TaskEntry::new(task));
        let guard = entry.try_claim().ok_or_else(|| Arc::clone(&entry))?;
        entries.insert(entry.id.clone(), Arc::clone(&entry));
        debug!(task_id = %entry.id, "Task registered");
        Ok(guard)
    }

    /// Remove an entry.
    pub async fn remove(&self, task_id: &str) -> Option<Arc<TaskEntry>> {
        let removed = self.entries.write().await.remove(task_id);
        if removed.is_some() {
            debug!(task_id = %task_id, "Task removed from registry");
        }
        removed
    }

    /// Number of tasks held.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Whether the registry holds no tasks.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}
