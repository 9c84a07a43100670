//! Generation task registry.
//!
//! One background job per (user, relation type). The task table sits behind
//! a single lock so two concurrent `start` calls can never both launch a job
//! for the same key. Each job runs on its own OS thread, talks to the
//! blocking store, and publishes progress into a per-task record that status
//! readers copy out.

pub mod feed;

pub use feed::{status_feed, DoneReason, FeedEvent};

use std::collections::{BTreeMap, HashMap, HashSet};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};

use chrono::{DateTime, Utc};
use log::{error, info, warn};
use serde::Serialize;
use uuid::Uuid;

use crate::config::GenerationConfig;
use crate::error::{LexrelError, Result};
use crate::generate::{word_index, CancellationToken, GenerationContext, GenerationStats, Generator};
use crate::lexicon::SharedOracle;
use crate::models::RelationType;
use crate::store::RelationStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Idle,
    Running,
    Completed,
    Stopped,
    Error,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Idle => "idle",
            TaskStatus::Running => "running",
            TaskStatus::Completed => "completed",
            TaskStatus::Stopped => "stopped",
            TaskStatus::Error => "error",
        }
    }

    /// The run has ended, one way or another
    pub fn is_finished(&self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Stopped | TaskStatus::Error)
    }
}

/// Counters of one run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSnapshot {
    pub processed: usize,
    pub total: usize,
    pub found: usize,
    /// Undirected relations durably written
    pub saved: usize,
    /// Words already processed by an earlier run
    pub skipped: usize,
    pub error: Option<String>,
    pub started_at: DateTime<Utc>,
    pub run_id: Uuid,
}

impl RunSnapshot {
    fn new() -> Self {
        Self {
            processed: 0,
            total: 0,
            found: 0,
            saved: 0,
            skipped: 0,
            error: None,
            started_at: Utc::now(),
            run_id: Uuid::new_v4(),
        }
    }
}

/// Copy of a task's state. `run` is absent while the key is idle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskSnapshot {
    pub status: TaskStatus,
    #[serde(flatten)]
    pub run: Option<RunSnapshot>,
}

impl TaskSnapshot {
    pub fn idle() -> Self {
        Self { status: TaskStatus::Idle, run: None }
    }

    pub fn is_running(&self) -> bool {
        self.status == TaskStatus::Running
    }
}

struct TaskRecord {
    status: TaskStatus,
    run: RunSnapshot,
}

impl TaskRecord {
    fn snapshot(&self) -> TaskSnapshot {
        TaskSnapshot { status: self.status, run: Some(self.run.clone()) }
    }
}

type TaskKey = (String, RelationType);

struct TaskEntry {
    record: Arc<Mutex<TaskRecord>>,
    cancel: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

struct Inner {
    store: Arc<dyn RelationStore>,
    oracle: Option<SharedOracle>,
    config: GenerationConfig,
    tasks: Mutex<HashMap<TaskKey, TaskEntry>>,
}

/// Starts, stops and reports generation jobs. Cheap to clone.
#[derive(Clone)]
pub struct TaskManager {
    inner: Arc<Inner>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl TaskManager {
    pub fn new(store: Arc<dyn RelationStore>, oracle: Option<SharedOracle>, config: GenerationConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                store,
                oracle,
                config,
                tasks: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Launch a job. Returns `Ok(false)` if one is already running for the key.
    pub fn start(&self, relation_type: &str, user_id: &str) -> Result<bool> {
        let relation_type: RelationType = relation_type.parse()?;
        self.start_type(relation_type, user_id)
    }

    pub fn start_type(&self, relation_type: RelationType, user_id: &str) -> Result<bool> {
        let mut tasks = lock(&self.inner.tasks);
        let key = (user_id.to_string(), relation_type);

        if let Some(entry) = tasks.get(&key) {
            if lock(&entry.record).status == TaskStatus::Running {
                return Ok(false);
            }
        }

        let record = Arc::new(Mutex::new(TaskRecord { status: TaskStatus::Running, run: RunSnapshot::new() }));
        let cancel = CancellationToken::new();
        let job = Job {
            store: self.inner.store.clone(),
            oracle: self.inner.oracle.clone(),
            config: self.inner.config.clone(),
            user_id: user_id.to_string(),
            relation_type,
            record: record.clone(),
            cancel: cancel.clone(),
        };

        let handle = thread::Builder::new()
            .name(format!("lexrel-{}", relation_type))
            .spawn(move || job.run())
            .map_err(|e| LexrelError::Generation(format!("failed to spawn {} job: {}", relation_type, e)))?;

        tasks.insert(key, TaskEntry { record, cancel, handle: Some(handle) });
        Ok(true)
    }

    /// Raise the stop signal. Returns `Ok(false)` if nothing is running for the key.
    pub fn stop(&self, relation_type: &str, user_id: &str) -> Result<bool> {
        let relation_type: RelationType = relation_type.parse()?;
        Ok(self.stop_type(relation_type, user_id))
    }

    pub fn stop_type(&self, relation_type: RelationType, user_id: &str) -> bool {
        let tasks = lock(&self.inner.tasks);
        let Some(entry) = tasks.get(&(user_id.to_string(), relation_type)) else {
            return false;
        };
        if lock(&entry.record).status != TaskStatus::Running {
            return false;
        }
        entry.cancel.cancel();
        info!("Stop requested: {} generation for user {}", relation_type, user_id);
        true
    }

    /// Snapshot of every relation type for the user
    pub fn status(&self, user_id: &str) -> BTreeMap<RelationType, TaskSnapshot> {
        let tasks = lock(&self.inner.tasks);
        RelationType::ALL
            .iter()
            .map(|rt| {
                let snapshot = tasks
                    .get(&(user_id.to_string(), *rt))
                    .map(|entry| lock(&entry.record).snapshot())
                    .unwrap_or_else(TaskSnapshot::idle);
                (*rt, snapshot)
            })
            .collect()
    }

    pub fn snapshot(&self, relation_type: RelationType, user_id: &str) -> TaskSnapshot {
        let tasks = lock(&self.inner.tasks);
        tasks
            .get(&(user_id.to_string(), relation_type))
            .map(|entry| lock(&entry.record).snapshot())
            .unwrap_or_else(TaskSnapshot::idle)
    }

    pub fn has_active_tasks(&self, user_id: &str) -> bool {
        self.status(user_id).values().any(TaskSnapshot::is_running)
    }

    /// Block until the job thread of the current run for the key exits.
    /// Returns the final snapshot.
    pub fn join(&self, relation_type: RelationType, user_id: &str) -> TaskSnapshot {
        let handle = {
            let mut tasks = lock(&self.inner.tasks);
            tasks
                .get_mut(&(user_id.to_string(), relation_type))
                .and_then(|entry| entry.handle.take())
        };
        if let Some(handle) = handle {
            if handle.join().is_err() {
                warn!("{} job thread for user {} ended abnormally", relation_type, user_id);
            }
        }
        self.snapshot(relation_type, user_id)
    }
}

/// Everything a job thread owns
struct Job {
    store: Arc<dyn RelationStore>,
    oracle: Option<SharedOracle>,
    config: GenerationConfig,
    user_id: String,
    relation_type: RelationType,
    record: Arc<Mutex<TaskRecord>>,
    cancel: CancellationToken,
}

impl Job {
    fn run(self) {
        let outcome = catch_unwind(AssertUnwindSafe(|| self.execute()));

        let mut record = lock(&self.record);
        match outcome {
            Ok(Ok(stats)) => {
                record.run.found = stats.total_found;
                if self.cancel.is_cancelled() {
                    record.status = TaskStatus::Stopped;
                    info!(
                        "{} generation for user {} stopped: {} found, {} saved",
                        self.relation_type, self.user_id, stats.total_found, record.run.saved
                    );
                } else {
                    record.status = TaskStatus::Completed;
                    if stats.oracle_unavailable {
                        warn!("{} generation for user {} finished without a lexicon", self.relation_type, self.user_id);
                    }
                    info!(
                        "{} generation for user {} completed: {} found, {} already linked, breakdown {:?}",
                        self.relation_type, self.user_id, stats.total_found, stats.skipped_existing, stats.breakdown
                    );
                }
            }
            Ok(Err(e)) => {
                error!("{} generation for user {} failed: {}", self.relation_type, self.user_id, e);
                record.status = TaskStatus::Error;
                record.run.error = Some(e.to_string());
            }
            Err(panic) => {
                let message = panic
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| panic.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "generation job panicked".to_string());
                error!("{} generation for user {} panicked: {}", self.relation_type, self.user_id, message);
                record.status = TaskStatus::Error;
                record.run.error = Some(message);
            }
        }
    }

    fn execute(&self) -> Result<GenerationStats> {
        let user_id = self.user_id.as_str();
        info!("Starting {} generation for user {}", self.relation_type, user_id);

        let words = self.store.load_words(user_id)?;
        let mut existing = self.store.load_existing_relations(user_id)?;
        let processed = self.store.load_processed_word_ids(user_id, self.relation_type)?;

        // Log rows of deleted words must not count
        let word_ids: HashSet<i64> = words.iter().map(|w| w.id).collect();
        let already_processed = processed.iter().filter(|id| word_ids.contains(id)).count();
        let total = words.len() - already_processed;
        info!(
            "Loaded {} words, {} relation rows, {} already processed for {}",
            words.len(),
            existing.len(),
            already_processed,
            self.relation_type
        );

        {
            let mut record = lock(&self.record);
            record.run.total = total;
            record.run.skipped = already_processed;
        }

        let index = word_index(&words);
        let mut generator = Generator::for_type(self.relation_type, &self.config, self.oracle.clone());
        let store = &self.store;
        let record = &self.record;

        let mut ctx = GenerationContext::new(self.relation_type, self.config.flush_threshold, self.cancel.clone())
            .on_save(|relations, logs| {
                store.save_batch(relations, logs, user_id)?;
                lock(record).run.saved += relations.len() / 2;
                Ok(())
            })
            .on_progress(|processed, total, found| {
                let mut record = lock(record);
                record.run.processed = processed;
                record.run.total = total;
                record.run.found = found;
            });

        generator.generate(&words, &index, &mut existing, &processed, &mut ctx)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::models::{ProcessedLog, Relation, RelationKey, Word};
    use std::sync::mpsc::{self, Receiver, Sender};

    /// In-memory store with hooks to hold a job at a known point.
    #[derive(Default)]
    pub struct MemoryStore {
        pub words: Vec<Word>,
        pub rows: Mutex<HashSet<RelationKey>>,
        pub logs: Mutex<HashMap<(i64, RelationType), usize>>,
        pub fail_saves: bool,
        /// Zero-based index of the one `save_batch` call that fails
        pub fail_save_at: Option<usize>,
        pub save_calls: Mutex<usize>,
        pub panic_on_load: bool,
        /// `load_words` blocks until this fires
        pub load_gate: Mutex<Option<Receiver<()>>>,
        /// The first `save_batch` reports on the sender, then blocks on the receiver
        pub save_pause: Mutex<Option<(Sender<()>, Receiver<()>)>>,
    }

    impl MemoryStore {
        pub fn with_words(list: &[(i64, &str)]) -> Self {
            Self {
                words: list.iter().map(|(id, text)| Word::new(*id, *text, "")).collect(),
                ..Self::default()
            }
        }

        /// Hold `load_words`; send on the returned sender to release it.
        pub fn gate_load(&self) -> Sender<()> {
            let (tx, rx) = mpsc::channel();
            *lock(&self.load_gate) = Some(rx);
            tx
        }

        /// Returns (entered, resume) for the first batch write
        pub fn pause_first_save(&self) -> (Receiver<()>, Sender<()>) {
            let (entered_tx, entered_rx) = mpsc::channel();
            let (resume_tx, resume_rx) = mpsc::channel();
            *lock(&self.save_pause) = Some((entered_tx, resume_rx));
            (entered_rx, resume_tx)
        }

        pub fn has_pair(&self, a: i64, b: i64, rt: RelationType) -> bool {
            let rows = lock(&self.rows);
            rows.contains(&(a, b, rt)) && rows.contains(&(b, a, rt))
        }
    }

    impl RelationStore for MemoryStore {
        fn load_words(&self, _user_id: &str) -> Result<Vec<Word>> {
            if self.panic_on_load {
                panic!("word table unreadable");
            }
            let gate = lock(&self.load_gate).take();
            if let Some(gate) = gate {
                let _ = gate.recv();
            }
            Ok(self.words.clone())
        }

        fn load_existing_relations(&self, _user_id: &str) -> Result<HashSet<RelationKey>> {
            Ok(lock(&self.rows).clone())
        }

        fn load_processed_word_ids(&self, _user_id: &str, relation_type: RelationType) -> Result<HashSet<i64>> {
            Ok(lock(&self.logs)
                .keys()
                .filter(|(_, rt)| *rt == relation_type)
                .map(|(id, _)| *id)
                .collect())
        }

        fn save_batch(&self, relations: &[Relation], logs: &[ProcessedLog], _user_id: &str) -> Result<()> {
            let call = {
                let mut calls = lock(&self.save_calls);
                *calls += 1;
                *calls - 1
            };
            if self.fail_saves || self.fail_save_at == Some(call) {
                return Err(LexrelError::StoreFailure("disk I/O error".into()));
            }
            {
                let mut rows = lock(&self.rows);
                rows.extend(relations.iter().map(|r| (r.source_id, r.target_id, r.relation_type)));
                let mut stored = lock(&self.logs);
                for entry in logs {
                    stored.insert((entry.word_id, entry.relation_type), entry.found_count);
                }
            }
            let pause = lock(&self.save_pause).take();
            if let Some((entered, resume)) = pause {
                let _ = entered.send(());
                let _ = resume.recv();
            }
            Ok(())
        }
    }

    pub fn manager(store: Arc<MemoryStore>, flush_threshold: usize) -> TaskManager {
        let config = GenerationConfig { flush_threshold, ..GenerationConfig::default() };
        TaskManager::new(store, None, config)
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::{manager, MemoryStore};
    use super::*;

    const ROOT_WORDS: &[(i64, &str)] = &[
        (1, "inspect"),
        (2, "spectator"),
        (3, "quick"),
        (4, "quickly"),
        (5, "photograph"),
        (6, "photographer"),
    ];

    #[test]
    fn test_double_start_launches_once() {
        let store = Arc::new(MemoryStore::with_words(ROOT_WORDS));
        let release = store.gate_load();
        let tasks = manager(store.clone(), 200);

        assert!(tasks.start("root", "u1").unwrap());
        assert!(!tasks.start("root", "u1").unwrap());
        assert!(tasks.has_active_tasks("u1"));
        // other users and other types are independent keys
        assert!(!tasks.has_active_tasks("u2"));

        release.send(()).unwrap();
        let done = tasks.join(RelationType::Root, "u1");
        assert_eq!(done.status, TaskStatus::Completed);
        assert!(store.has_pair(3, 4, RelationType::Root));
        assert!(!tasks.has_active_tasks("u1"));
    }

    #[test]
    fn test_completed_run_counters() {
        let store = Arc::new(MemoryStore::with_words(ROOT_WORDS));
        let tasks = manager(store.clone(), 200);
        assert!(tasks.start("root", "u1").unwrap());

        let snapshot = tasks.join(RelationType::Root, "u1");
        let run = snapshot.run.unwrap();
        assert_eq!(snapshot.status, TaskStatus::Completed);
        assert_eq!(run.total, 6);
        assert_eq!(run.processed, 6);
        assert_eq!(run.skipped, 0);
        assert_eq!(run.found, run.saved);
        assert_eq!(lock(&store.rows).len(), run.saved * 2);
        assert_eq!(lock(&store.logs).len(), 6);
    }

    #[test]
    fn test_rerun_with_everything_processed_finds_nothing() {
        let store = Arc::new(MemoryStore::with_words(ROOT_WORDS));
        let tasks = manager(store.clone(), 200);
        tasks.start("root", "u1").unwrap();
        let first = tasks.join(RelationType::Root, "u1").run.unwrap();

        assert!(tasks.start("root", "u1").unwrap());
        let second = tasks.join(RelationType::Root, "u1");
        let run = second.run.unwrap();
        assert_eq!(second.status, TaskStatus::Completed);
        assert_eq!(run.found, 0);
        assert_eq!(run.total, 0);
        assert_eq!(run.skipped, 6);
        assert_ne!(run.run_id, first.run_id);
    }

    #[test]
    fn test_stop_keeps_flushed_relations() {
        let store = Arc::new(MemoryStore::with_words(ROOT_WORDS));
        let (entered, resume) = store.pause_first_save();
        // one relation pair fills the buffer
        let tasks = manager(store.clone(), 2);

        assert!(tasks.start("root", "u1").unwrap());
        entered.recv().unwrap();
        assert!(tasks.stop("root", "u1").unwrap());
        resume.send(()).unwrap();

        let snapshot = tasks.join(RelationType::Root, "u1");
        assert_eq!(snapshot.status, TaskStatus::Stopped);
        assert!(store.has_pair(1, 2, RelationType::Root));
        assert!(!store.has_pair(3, 4, RelationType::Root));
        assert_eq!(snapshot.run.unwrap().saved, lock(&store.rows).len() / 2);
        // stopping again is a no-op
        assert!(!tasks.stop("root", "u1").unwrap());
    }

    #[test]
    fn test_store_failure_sets_error() {
        let store = Arc::new(MemoryStore { fail_saves: true, ..MemoryStore::with_words(ROOT_WORDS) });
        let tasks = manager(store.clone(), 2);
        tasks.start("root", "u1").unwrap();

        let snapshot = tasks.join(RelationType::Root, "u1");
        assert_eq!(snapshot.status, TaskStatus::Error);
        let message = snapshot.run.unwrap().error.unwrap();
        assert!(message.contains("Store failure"), "{}", message);
        assert!(lock(&store.logs).is_empty());
    }

    #[test]
    fn test_restart_after_store_failure_rescans_unflushed_words() {
        // inspect/spectator fill the first batch; the next batch write fails
        let store = Arc::new(MemoryStore { fail_save_at: Some(1), ..MemoryStore::with_words(ROOT_WORDS) });
        let tasks = manager(store.clone(), 2);

        tasks.start("root", "u1").unwrap();
        let failed = tasks.join(RelationType::Root, "u1");
        assert_eq!(failed.status, TaskStatus::Error);
        assert_eq!(failed.run.unwrap().saved, 1);
        assert!(store.has_pair(1, 2, RelationType::Root));
        assert!(!store.has_pair(3, 4, RelationType::Root));
        assert_eq!(lock(&store.logs).keys().map(|(id, _)| *id).collect::<Vec<_>>(), vec![1]);

        tasks.start("root", "u1").unwrap();
        let resumed = tasks.join(RelationType::Root, "u1");
        assert_eq!(resumed.status, TaskStatus::Completed);
        let run = resumed.run.unwrap();
        assert_eq!(run.skipped, 1);
        assert_eq!(run.total, 5);
        assert_eq!(run.processed, 5);
        assert!(store.has_pair(3, 4, RelationType::Root));

        let logs = lock(&store.logs);
        assert_eq!(logs.len(), 6);
        // spectator's marker was lost with the failed batch, so it was rescanned
        assert!(logs.contains_key(&(2, RelationType::Root)));
    }

    #[test]
    fn test_panic_becomes_error_status() {
        let store = Arc::new(MemoryStore { panic_on_load: true, ..MemoryStore::default() });
        let tasks = manager(store, 200);
        tasks.start("topic", "u1").unwrap();

        let snapshot = tasks.join(RelationType::Topic, "u1");
        assert_eq!(snapshot.status, TaskStatus::Error);
        assert_eq!(snapshot.run.unwrap().error.as_deref(), Some("word table unreadable"));
        // a failed key can be started again
        assert!(!tasks.has_active_tasks("u1"));
    }

    #[test]
    fn test_unknown_type_rejected() {
        let tasks = manager(Arc::new(MemoryStore::default()), 200);
        assert!(matches!(tasks.start("hypernym", "u1"), Err(LexrelError::UnknownRelationType(_))));
        assert!(matches!(tasks.stop("hypernym", "u1"), Err(LexrelError::UnknownRelationType(_))));
        assert!(tasks.status("u1").values().all(|s| s.status == TaskStatus::Idle));
    }

    #[test]
    fn test_stop_without_task() {
        let tasks = manager(Arc::new(MemoryStore::default()), 200);
        assert!(!tasks.stop("antonym", "u1").unwrap());
    }

    #[test]
    fn test_status_lists_every_type() {
        let store = Arc::new(MemoryStore::with_words(&[(1, "public"), (2, "private")]));
        let tasks = manager(store, 200);
        tasks.start("antonym", "u1").unwrap();
        tasks.join(RelationType::Antonym, "u1");

        let status = tasks.status("u1");
        assert_eq!(status.len(), 5);
        assert_eq!(status[&RelationType::Antonym].status, TaskStatus::Completed);
        assert_eq!(status[&RelationType::Synonym], TaskSnapshot::idle());
    }

    #[test]
    fn test_snapshot_serialization() {
        let idle = serde_json::to_value(TaskSnapshot::idle()).unwrap();
        assert_eq!(idle, serde_json::json!({"status": "idle"}));

        let running = TaskSnapshot { status: TaskStatus::Running, run: Some(RunSnapshot::new()) };
        let value = serde_json::to_value(running).unwrap();
        assert_eq!(value["status"], "running");
        assert_eq!(value["processed"], 0);
        assert!(value["error"].is_null());
        assert!(value["run_id"].is_string());
    }
}
