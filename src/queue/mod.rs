use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Utc;
use tokio::fs as async_fs;
use tokio::sync::{Mutex, MutexGuard};
use tracing::debug;

use crate::task::Task;

const QUEUE_FILE: &str = "queue.json";

/// First task whose dedup key matches, in insertion order
pub fn find_in(tasks: &[Task], key: &str) -> Option<usize> {
    tasks.iter().position(|task| task.source_url() == key)
}

/// Durable, ordered list of queued tasks backed by a single JSON document.
///
/// Individual operations are atomic (writes go through a temp file and a
/// rename), and every mutating operation takes the single mutation slot. A
/// caller that needs a read-then-write sequence to be atomic, like the sync
/// engine's dedup-check-then-append, holds the slot itself via
/// [`QueueStore::lock_mutations`] and uses the unlocked primitives.
pub struct QueueStore {
    pub state_dir: PathBuf,
    queue_path: PathBuf,
    mutation_slot: Mutex<()>,
}

impl QueueStore {
    /// Create a queue store rooted at the given state directory
    pub fn new(state_dir: PathBuf) -> Self {
        let queue_path = state_dir.join(QUEUE_FILE);
        Self {
            state_dir,
            queue_path,
            mutation_slot: Mutex::new(()),
        }
    }

    /// Initialize the state directory
    pub async fn init(&self) -> Result<()> {
        async_fs::create_dir_all(&self.state_dir).await?;
        Ok(())
    }

    /// Read the whole queue. A missing or empty file is an empty queue; a
    /// file that no longer parses is a persistence failure, not silently an
    /// empty queue.
    pub async fn load(&self) -> Result<Vec<Task>> {
        let bytes = match async_fs::read(&self.queue_path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(e).with_context(|| {
                    format!("Failed to read queue file: {:?}", self.queue_path)
                })
            }
        };

        if bytes.iter().all(|b| b.is_ascii_whitespace()) {
            return Ok(Vec::new());
        }

        serde_json::from_slice(&bytes)
            .with_context(|| format!("Corrupt queue file: {:?}", self.queue_path))
    }

    /// Number of queued tasks
    pub async fn len(&self) -> Result<usize> {
        Ok(self.load().await?.len())
    }

    /// First queued task whose dedup key matches
    pub async fn find_by_key(&self, key: &str) -> Result<Option<usize>> {
        Ok(find_in(&self.load().await?, key))
    }

    /// Append one task; returns the new queue length
    pub async fn append(&self, task: &Task) -> Result<usize> {
        let _slot = self.mutation_slot.lock().await;
        self.append_unlocked(task).await
    }

    /// Replace the entire queue
    pub async fn replace(&self, tasks: &[Task]) -> Result<()> {
        let _slot = self.mutation_slot.lock().await;
        self.write_atomic(tasks).await
    }

    /// Drop every queued task
    pub async fn clear(&self) -> Result<()> {
        self.replace(&[]).await
    }

    /// Drop tasks older than the retention window; returns how many were
    /// evicted. The file is rewritten only when something was dropped.
    /// Tasks whose timestamp no longer parses are treated as stale.
    pub async fn evict_stale(&self, retention: chrono::Duration) -> Result<usize> {
        let _slot = self.mutation_slot.lock().await;

        let tasks = self.load().await?;
        let cutoff = Utc::now() - retention;
        let kept: Vec<Task> = tasks
            .iter()
            .filter(|task| task.added_at().map(|at| at > cutoff).unwrap_or(false))
            .cloned()
            .collect();

        let evicted = tasks.len() - kept.len();
        if evicted > 0 {
            self.write_atomic(&kept).await?;
        }
        Ok(evicted)
    }

    /// Take the single-writer mutation slot for a read-modify-write sequence
    pub async fn lock_mutations(&self) -> MutexGuard<'_, ()> {
        self.mutation_slot.lock().await
    }

    /// Append without taking the mutation slot; the caller already holds it
    pub(crate) async fn append_unlocked(&self, task: &Task) -> Result<usize> {
        let mut tasks = self.load().await?;
        tasks.push(task.clone());
        self.write_atomic(&tasks).await?;
        debug!("Queued task: {}", task.source_url());
        Ok(tasks.len())
    }

    /// Write the queue through a temp file and an atomic rename
    async fn write_atomic(&self, tasks: &[Task]) -> Result<()> {
        let json = serde_json::to_vec_pretty(tasks)?;
        let tmp_path = self.queue_path.with_extension("json.tmp");

        async_fs::write(&tmp_path, &json)
            .await
            .with_context(|| format!("Failed to write queue file: {:?}", tmp_path))?;
        async_fs::rename(&tmp_path, &self.queue_path)
            .await
            .with_context(|| format!("Failed to commit queue file: {:?}", self.queue_path))?;
        Ok(())
    }
}
