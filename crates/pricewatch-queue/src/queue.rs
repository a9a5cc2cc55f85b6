// SPDX-FileCopyrightText: 2026 Pricewatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The durable FIFO task queue and its processing cycle.
//!
//! The queue lock is held only around the atomic pop and around queue-file
//! rewrites; everything after the pop (account selection, session use,
//! mutation, store write) runs without mutual exclusion. Re-enqueued tasks
//! go to the tail, so completion order is not FIFO under failures.

use std::collections::{HashMap, VecDeque};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use pricewatch_config::AccountRegistry;
use pricewatch_config::model::QueueConfig;
use pricewatch_core::{
    Account, AccountId, ItemId, MutationErrorKind, MutationOutcome, TrackingMutator,
};
use pricewatch_session::SessionManager;
use pricewatch_store::TrackingStore;
use rand::Rng;
use serde::Serialize;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::task::{Task, TaskKey, TaskMeta};

/// Retry and pacing knobs for the queue, resolved from configuration.
#[derive(Debug, Clone)]
pub struct QueueSettings {
    /// Attempts after which a task is permanently discarded.
    pub max_attempts: u32,
    /// Sleep while the queue is empty.
    pub empty_sleep: Duration,
    /// Sleep while processing is paused.
    pub paused_sleep: Duration,
    /// Lower bound of the random inter-task pause.
    pub pacing_min: Duration,
    /// Upper bound of the random inter-task pause.
    pub pacing_max: Duration,
    /// Number of least-loaded candidates the random pick draws from.
    pub selection_pool_size: usize,
}

impl Default for QueueSettings {
    fn default() -> Self {
        Self::from_config(&QueueConfig::default())
    }
}

impl QueueSettings {
    pub fn from_config(config: &QueueConfig) -> Self {
        Self {
            max_attempts: config.max_attempts,
            empty_sleep: Duration::from_secs(config.empty_sleep_secs),
            paused_sleep: Duration::from_secs(config.paused_sleep_secs),
            pacing_min: Duration::from_secs(config.pacing_min_secs),
            pacing_max: Duration::from_secs(config.pacing_max_secs),
            selection_pool_size: config.selection_pool_size.max(1),
        }
    }
}

/// Result of one bulk import call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BulkImportReport {
    pub added: usize,
    pub skipped: usize,
    pub queue_size: usize,
}

/// What one processing cycle did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessOutcome {
    /// Queue empty or paused; nothing was popped.
    Idle,
    /// Task completed (mutated, or already tracked).
    Success,
    /// Task permanently discarded.
    Discarded,
    /// Task re-enqueued at the tail.
    Requeued,
    /// Task re-enqueued and the whole queue paused (global saturation).
    QueuePaused,
}

/// Point-in-time queue snapshot for the status surface.
#[derive(Debug, Clone, Serialize)]
pub struct QueueStatus {
    pub running: bool,
    pub paused: bool,
    pub queue_size: usize,
    /// `item,price` descriptor of the task being processed right now.
    pub current_task: Option<String>,
    pub processed: u64,
    pub succeeded: u64,
    pub failed: u64,
    pub last_run: Option<DateTime<Utc>>,
    /// Tasks currently carrying retry metadata.
    pub tasks_with_retry_metadata: usize,
}

#[derive(Default)]
struct QueueState {
    tasks: VecDeque<Task>,
    meta: HashMap<TaskKey, TaskMeta>,
}

#[derive(Default)]
struct Counters {
    processed: u64,
    succeeded: u64,
    failed: u64,
    last_run: Option<DateTime<Utc>>,
}

/// The process-wide task queue. One instance, owned by the composition root.
pub struct TaskQueue {
    path: PathBuf,
    registry: AccountRegistry,
    store: Arc<TrackingStore>,
    sessions: Arc<SessionManager>,
    mutator: Arc<dyn TrackingMutator>,
    settings: QueueSettings,
    state: Mutex<QueueState>,
    current: Mutex<Option<Task>>,
    counters: Mutex<Counters>,
    running: AtomicBool,
    paused: AtomicBool,
}

impl TaskQueue {
    pub fn new(
        path: impl Into<PathBuf>,
        registry: AccountRegistry,
        store: Arc<TrackingStore>,
        sessions: Arc<SessionManager>,
        mutator: Arc<dyn TrackingMutator>,
        settings: QueueSettings,
    ) -> Self {
        Self {
            path: path.into(),
            registry,
            store,
            sessions,
            mutator,
            settings,
            state: Mutex::new(QueueState::default()),
            current: Mutex::new(None),
            counters: Mutex::new(Counters::default()),
            running: AtomicBool::new(false),
            paused: AtomicBool::new(false),
        }
    }

    /// Load pending tasks from the queue file, skipping malformed lines.
    ///
    /// Returns the number of tasks loaded. A missing file is an empty queue.
    pub async fn load(&self) -> usize {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return 0,
            Err(error) => {
                warn!(path = %self.path.display(), %error, "failed to read queue file");
                return 0;
            }
        };
        let mut state = self.state.lock().await;
        for line in raw.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match Task::parse_line(line) {
                Some(task) => state.tasks.push_back(task),
                None => warn!(line, "skipping malformed queue line"),
            }
        }
        let loaded = state.tasks.len();
        info!(loaded, path = %self.path.display(), "loaded task queue");
        loaded
    }

    /// Append one task and persist. Returns the queue size afterwards.
    pub async fn add(&self, task: Task) -> usize {
        let mut state = self.state.lock().await;
        info!(item = %task.item, price = %task.price, "task enqueued");
        state.tasks.push_back(task);
        self.persist_locked(&state).await;
        state.tasks.len()
    }

    /// Parse `item,price` lines and enqueue the new ones.
    ///
    /// Blank and `#` comment lines are ignored outright. Malformed lines and
    /// items already tracked on any account count as skipped.
    pub async fn add_from_bulk_source(&self, raw: &str) -> BulkImportReport {
        let mut added = 0;
        let mut skipped = 0;
        let mut new_tasks = Vec::new();
        for line in raw.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some(task) = Task::parse_line(line) else {
                warn!(line, "skipping malformed bulk line");
                skipped += 1;
                continue;
            };
            if self.tracked_anywhere(&task.item).await {
                debug!(item = %task.item, "already tracked, skipping");
                skipped += 1;
                continue;
            }
            new_tasks.push(task);
            added += 1;
        }

        let mut state = self.state.lock().await;
        state.tasks.extend(new_tasks);
        self.persist_locked(&state).await;
        let report = BulkImportReport {
            added,
            skipped,
            queue_size: state.tasks.len(),
        };
        info!(added, skipped, queue_size = report.queue_size, "bulk import finished");
        report
    }

    async fn tracked_anywhere(&self, item: &ItemId) -> bool {
        for account in self.registry.list() {
            match self.store.get(&account.id, item).await {
                Ok(Some(_)) => return true,
                Ok(None) => {}
                Err(error) => {
                    warn!(account = %account.id, %error, "duplicate check failed for account")
                }
            }
        }
        false
    }

    /// Drop all tasks and metadata. Returns the number of tasks removed.
    pub async fn clear(&self) -> usize {
        let mut state = self.state.lock().await;
        let removed = state.tasks.len();
        state.tasks.clear();
        state.meta.clear();
        self.persist_locked(&state).await;
        info!(removed, "queue cleared");
        removed
    }

    pub fn pause(&self) {
        self.paused.store(true, Ordering::SeqCst);
        info!("queue paused");
    }

    /// Clear the paused flag. The worker loop picks the queue back up on its
    /// next iteration; it never exits on pause.
    pub fn resume(&self) {
        self.paused.store(false, Ordering::SeqCst);
        info!("queue resumed");
    }

    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::SeqCst)
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub async fn size(&self) -> usize {
        self.state.lock().await.tasks.len()
    }

    pub async fn status(&self) -> QueueStatus {
        let state = self.state.lock().await;
        let counters = self.counters.lock().await;
        let current = self.current.lock().await;
        QueueStatus {
            running: self.is_running(),
            paused: self.is_paused(),
            queue_size: state.tasks.len(),
            current_task: current.as_ref().map(Task::render_line),
            processed: counters.processed,
            succeeded: counters.succeeded,
            failed: counters.failed,
            last_run: counters.last_run,
            tasks_with_retry_metadata: state.meta.len(),
        }
    }

    /// Pop and process one task. Safe to call concurrently with the worker
    /// loop: the pop is atomic, so no two callers process the same task.
    ///
    /// Never returns an error; every failure mode is folded into the outcome
    /// and logged.
    pub async fn process_single_task(&self) -> ProcessOutcome {
        if self.is_paused() {
            return ProcessOutcome::Idle;
        }

        let (task, attempts) = {
            let mut state = self.state.lock().await;
            let Some(task) = state.tasks.pop_front() else {
                return ProcessOutcome::Idle;
            };
            let meta = state.meta.entry(task.key()).or_default();
            meta.attempts += 1;
            meta.last_attempt = Some(Utc::now());
            let attempts = meta.attempts;
            self.persist_locked(&state).await;
            (task, attempts)
        };

        *self.current.lock().await = Some(task.clone());
        let outcome = self.process_popped(task, attempts).await;
        *self.current.lock().await = None;
        outcome
    }

    async fn process_popped(&self, task: Task, attempts: u32) -> ProcessOutcome {
        let key = task.key();

        if attempts > self.settings.max_attempts {
            warn!(item = %task.item, attempts, "attempts exhausted, discarding task");
            self.drop_meta(&key).await;
            self.mark_failure().await;
            return ProcessOutcome::Discarded;
        }

        let meta = self.meta_snapshot(&key).await;
        let accounts = self.registry.list();

        // Exclusion by tried-set is lifted once every account has been
        // tried, so a task can keep making progress across retry rounds.
        let all_tried = accounts
            .iter()
            .all(|a| meta.tried_accounts.contains(&a.id));

        let mut eligible: Vec<(Account, usize)> = Vec::new();
        for account in accounts {
            if !all_tried && meta.tried_accounts.contains(&account.id) {
                continue;
            }
            if meta.accounts_with_limit.contains(&account.id) {
                continue;
            }
            let count = match self.store.count(&account.id).await {
                Ok(count) => count,
                Err(error) => {
                    warn!(account = %account.id, %error, "failed to read account load");
                    continue;
                }
            };
            if count >= account.capacity_ceiling as usize {
                continue;
            }
            eligible.push((account.clone(), count));
        }
        eligible.sort_by_key(|(_, count)| *count);

        if eligible.is_empty() {
            let globally_exhausted = accounts.iter().all(|a| {
                meta.tried_accounts.contains(&a.id) || meta.accounts_with_limit.contains(&a.id)
            });
            if globally_exhausted {
                warn!(item = %task.item, "no account can take this task, discarding");
                self.drop_meta(&key).await;
                self.mark_failure().await;
                return ProcessOutcome::Discarded;
            }
            // Accounts are over the local ceiling but not remotely
            // exhausted: pause instead of spinning against saturation.
            warn!(item = %task.item, "all accounts at capacity, pausing queue");
            self.requeue(task).await;
            self.pause();
            return ProcessOutcome::QueuePaused;
        }

        // Prefer untried accounts; pick at random from the least-loaded few
        // so load does not pile onto a single account.
        let untried: Vec<&(Account, usize)> = eligible
            .iter()
            .filter(|(a, _)| !meta.tried_accounts.contains(&a.id))
            .collect();
        let pool: Vec<&(Account, usize)> = if untried.is_empty() {
            eligible.iter().collect()
        } else {
            untried
        };
        let pool_len = pool.len().min(self.settings.selection_pool_size);
        let index = rand::thread_rng().gen_range(0..pool_len);
        let chosen = pool[index].0.clone();
        debug!(item = %task.item, account = %chosen.id, attempts, "selected account");
        self.record_tried(&key, &chosen.id).await;

        // The load reading above can be stale by the time we mutate.
        match self.store.count(&chosen.id).await {
            Ok(count) if count >= chosen.capacity_ceiling as usize => {
                debug!(account = %chosen.id, "account hit ceiling since selection, re-enqueueing");
                self.requeue(task).await;
                return ProcessOutcome::Requeued;
            }
            Ok(_) => {}
            Err(error) => {
                warn!(account = %chosen.id, %error, "failed to re-check account load");
                self.requeue(task).await;
                self.mark_failure().await;
                return ProcessOutcome::Requeued;
            }
        }

        match self.store.get(&chosen.id, &task.item).await {
            Ok(Some(_)) => {
                info!(item = %task.item, account = %chosen.id,
                    "item already tracked, counting as success");
                self.drop_meta(&key).await;
                self.mark_success().await;
                return ProcessOutcome::Success;
            }
            Ok(None) => {}
            Err(error) => {
                warn!(account = %chosen.id, %error, "pre-mutation store read failed");
            }
        }

        let Some(session) = self.sessions.get_session(&chosen).await else {
            warn!(item = %task.item, account = %chosen.id,
                "no session available, re-enqueueing");
            self.requeue(task).await;
            self.mark_failure().await;
            return ProcessOutcome::Requeued;
        };

        let outcome = match self
            .mutator
            .create_or_update(session.handle(), &task.item, &task.price)
            .await
        {
            Ok(outcome) => outcome,
            Err(error) => {
                warn!(item = %task.item, %error, "mutation raised, treating as unknown failure");
                MutationOutcome::failed(MutationErrorKind::Unknown)
            }
        };

        if outcome.success {
            if let Err(error) = self
                .store
                .put(&chosen.id, &task.item, &task.price, outcome.title)
                .await
            {
                // The remote mutation already happened; memory stays ahead of
                // disk until the next successful write on this account.
                warn!(item = %task.item, account = %chosen.id, %error,
                    "store write failed after successful mutation");
            }
            info!(item = %task.item, account = %chosen.id, price = %task.price, "item tracked");
            self.drop_meta(&key).await;
            self.mark_success().await;
            return ProcessOutcome::Success;
        }

        match outcome.error.unwrap_or(MutationErrorKind::Unknown) {
            MutationErrorKind::LimitReached => {
                warn!(item = %task.item, account = %chosen.id,
                    "remote limit reached, excluding account for this task");
                self.record_limit(&key, &chosen.id).await;
                self.requeue(task).await;
                self.mark_failure().await;
                ProcessOutcome::Requeued
            }
            kind => {
                warn!(item = %task.item, account = %chosen.id, error_kind = %kind,
                    "mutation failed, re-enqueueing");
                self.requeue(task).await;
                self.mark_failure().await;
                ProcessOutcome::Requeued
            }
        }
    }

    /// Worker loop: process tasks with pacing until cancelled.
    ///
    /// `process_single_task` cannot return an error, so the loop only exits
    /// on cancellation; the queue is persisted once more on the way out.
    pub async fn run(self: Arc<Self>, cancel: CancellationToken) {
        self.running.store(true, Ordering::SeqCst);
        info!("queue worker started");
        loop {
            if cancel.is_cancelled() {
                break;
            }
            if self.is_paused() {
                if !self.sleep_or_cancel(self.settings.paused_sleep, &cancel).await {
                    break;
                }
                continue;
            }
            if self.size().await == 0 {
                if !self.sleep_or_cancel(self.settings.empty_sleep, &cancel).await {
                    break;
                }
                continue;
            }

            let outcome = self.process_single_task().await;
            debug!(?outcome, "processed one task");

            let pacing = self.random_pacing();
            if !self.sleep_or_cancel(pacing, &cancel).await {
                break;
            }
        }

        let state = self.state.lock().await;
        self.persist_locked(&state).await;
        drop(state);
        self.running.store(false, Ordering::SeqCst);
        info!("queue worker stopped");
    }

    fn random_pacing(&self) -> Duration {
        let min = self.settings.pacing_min.as_millis() as u64;
        let max = self.settings.pacing_max.as_millis() as u64;
        Duration::from_millis(rand::thread_rng().gen_range(min..=max.max(min)))
    }

    /// Sleep for `duration` unless cancelled first. Returns `false` on
    /// cancellation.
    async fn sleep_or_cancel(&self, duration: Duration, cancel: &CancellationToken) -> bool {
        tokio::select! {
            _ = cancel.cancelled() => false,
            _ = tokio::time::sleep(duration) => true,
        }
    }

    async fn requeue(&self, task: Task) {
        let mut state = self.state.lock().await;
        state.tasks.push_back(task);
        self.persist_locked(&state).await;
    }

    async fn meta_snapshot(&self, key: &TaskKey) -> TaskMeta {
        self.state
            .lock()
            .await
            .meta
            .get(key)
            .cloned()
            .unwrap_or_default()
    }

    async fn drop_meta(&self, key: &TaskKey) {
        self.state.lock().await.meta.remove(key);
    }

    async fn record_tried(&self, key: &TaskKey, account: &AccountId) {
        let mut state = self.state.lock().await;
        state
            .meta
            .entry(key.clone())
            .or_default()
            .tried_accounts
            .insert(account.clone());
    }

    async fn record_limit(&self, key: &TaskKey, account: &AccountId) {
        let mut state = self.state.lock().await;
        state
            .meta
            .entry(key.clone())
            .or_default()
            .accounts_with_limit
            .insert(account.clone());
    }

    async fn mark_success(&self) {
        let mut counters = self.counters.lock().await;
        counters.processed += 1;
        counters.succeeded += 1;
        counters.last_run = Some(Utc::now());
    }

    async fn mark_failure(&self) {
        let mut counters = self.counters.lock().await;
        counters.processed += 1;
        counters.failed += 1;
        counters.last_run = Some(Utc::now());
    }

    /// Rewrite the queue file in full. Write failures are logged, not
    /// propagated; the in-memory queue stays authoritative until the next
    /// successful write.
    async fn persist_locked(&self, state: &QueueState) {
        let mut contents = String::new();
        for task in &state.tasks {
            contents.push_str(&task.render_line());
            contents.push('\n');
        }
        if let Err(error) = tokio::fs::write(&self.path, contents).await {
            warn!(path = %self.path.display(), %error, "failed to persist queue");
        }
    }
}
