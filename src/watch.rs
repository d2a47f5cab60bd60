//! Watch mode: regenerate when MDX sources change.
//!
//! [`Watcher`] polls the content tree for `.mdx` modification times and
//! debounces bursts of changes. [`Regenerator`] runs the regeneration task
//! with at most one run in flight: requests arriving mid-run are coalesced
//! into exactly one follow-up run.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant, SystemTime};

use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use crate::batch::discover;

/// Quiet period after the last change before regenerating
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(1000);
/// Delay between two scans of the content tree
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(250);

// =============================================================================
// Regenerator
// =============================================================================

/// Serializes regeneration runs.
pub struct Regenerator<F> {
    task: Mutex<F>,
    pending: AtomicBool,
    changed: Mutex<BTreeSet<PathBuf>>,
    runs: AtomicUsize,
}

impl<F: FnMut(&[PathBuf])> Regenerator<F> {
    pub fn new(task: F) -> Self {
        Self {
            task: Mutex::new(task),
            pending: AtomicBool::new(false),
            changed: Mutex::new(BTreeSet::new()),
            runs: AtomicUsize::new(0),
        }
    }

    /// Request a run for `changed` sources.
    ///
    /// Runs the task on the calling thread unless a run is already in
    /// progress, in which case the request is folded into the follow-up run
    /// and this returns immediately.
    pub fn request(&self, changed: impl IntoIterator<Item = PathBuf>) {
        self.changed.lock().extend(changed);
        self.pending.store(true, Ordering::SeqCst);

        loop {
            let Some(mut task) = self.task.try_lock() else {
                return;
            };
            while self.pending.swap(false, Ordering::SeqCst) {
                let batch: Vec<PathBuf> =
                    std::mem::take(&mut *self.changed.lock()).into_iter().collect();
                self.runs.fetch_add(1, Ordering::SeqCst);
                let run = &mut *task;
                run(&batch);
            }
            drop(task);

            // A request may have landed between the last check and the unlock.
            if !self.pending.load(Ordering::SeqCst) {
                return;
            }
        }
    }

    /// Number of completed or running task invocations
    pub fn runs(&self) -> usize {
        self.runs.load(Ordering::SeqCst)
    }
}

// =============================================================================
// Watcher
// =============================================================================

type Snapshot = FxHashMap<PathBuf, SystemTime>;

/// Polling watcher over a content tree.
pub struct Watcher {
    root: PathBuf,
    debounce: Duration,
    poll_interval: Duration,
    snapshot: Snapshot,
}

impl Watcher {
    /// Start watching `root`; the current state is the baseline.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let snapshot = scan(&root);
        log::debug!("watching {} sources under {}", snapshot.len(), root.display());
        Self {
            root,
            debounce: DEFAULT_DEBOUNCE,
            poll_interval: DEFAULT_POLL_INTERVAL,
            snapshot,
        }
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Sources added, modified or removed since the previous scan, sorted.
    pub fn poll_changes(&mut self) -> Vec<PathBuf> {
        let current = scan(&self.root);
        let mut changed: Vec<PathBuf> = current
            .iter()
            .filter(|(path, mtime)| self.snapshot.get(*path) != Some(*mtime))
            .map(|(path, _)| path.clone())
            .chain(self.snapshot.keys().filter(|p| !current.contains_key(*p)).cloned())
            .collect();
        changed.sort();
        self.snapshot = current;
        changed
    }

    /// Watch forever.
    pub fn run<F>(self, regen: Arc<Regenerator<F>>)
    where
        F: FnMut(&[PathBuf]) + Send + 'static,
    {
        self.run_while(|| true, regen);
    }

    /// Watch for `duration`, then wait for in-flight runs to finish.
    pub fn run_for<F>(self, duration: Duration, regen: Arc<Regenerator<F>>)
    where
        F: FnMut(&[PathBuf]) + Send + 'static,
    {
        let deadline = Instant::now() + duration;
        self.run_while(|| Instant::now() < deadline, regen);
    }

    fn run_while<F>(mut self, mut keep_going: impl FnMut() -> bool, regen: Arc<Regenerator<F>>)
    where
        F: FnMut(&[PathBuf]) + Send + 'static,
    {
        let mut workers: Vec<JoinHandle<()>> = Vec::new();
        let mut pending: BTreeSet<PathBuf> = BTreeSet::new();
        let mut last_change: Option<Instant> = None;

        while keep_going() {
            thread::sleep(self.poll_interval);

            let changed = self.poll_changes();
            if !changed.is_empty() {
                for path in &changed {
                    log::debug!("changed: {}", path.display());
                }
                pending.extend(changed);
                last_change = Some(Instant::now());
            }

            if let Some(at) = last_change
                && at.elapsed() >= self.debounce
            {
                last_change = None;
                let batch = std::mem::take(&mut pending);
                log::info!("{} sources changed, regenerating", batch.len());

                workers.retain(|w| !w.is_finished());
                let regen = Arc::clone(&regen);
                workers.push(thread::spawn(move || regen.request(batch)));
            }
        }

        for worker in workers {
            if worker.join().is_err() {
                log::error!("regeneration task panicked");
            }
        }
    }
}

/// Modification times of all sources under `root`
fn scan(root: &Path) -> Snapshot {
    let docs = match discover(root) {
        Ok(docs) => docs,
        Err(err) => {
            log::warn!("cannot scan {}: {err}", root.display());
            return Snapshot::default();
        }
    };
    docs.into_iter()
        .filter_map(|doc| {
            let mtime = fs::metadata(&doc.path).and_then(|m| m.modified()).ok()?;
            Some((doc.path, mtime))
        })
        .collect()
}
