//! Persists judgments to a JSON file, debounced on the background worker.
//!
//! The cache maps comma-joined tree paths to `"pass"` or `"fail"`. Exercises
//! whose judgment is unknown are left out.

use std::collections::{BTreeMap, HashMap};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::runtime::Handle;

use coursetree_core::config::Settings;
use coursetree_core::{ContentNode, Exercise, Judgment, TreePath};

use crate::worker::Worker;

/// Keeps the judgment cache file in sync with the exercises of a tree.
pub struct CachingService {
    // Keeps the worker alive for as long as flushes may be scheduled.
    _worker: Worker,
    state: Arc<CacheState>,
}

struct CacheState {
    exercises: Vec<Arc<Exercise>>,
    path: PathBuf,
    delay: Duration,
    handle: Handle,
    dirty: AtomicBool,
    scheduled: AtomicBool,
    flushes: AtomicUsize,
    write_lock: Mutex<()>,
}

impl CachingService {
    /// Load the cache configured in `settings` and start tracking `root`.
    pub fn new(root: &ContentNode, worker: &Worker, settings: &Settings) -> Self {
        Self::with_location(
            root,
            worker,
            settings.judgment_cache.clone(),
            settings.cache_delay(),
        )
    }

    /// Load the cache at `path` and start tracking `root`.
    ///
    /// Cached judgments are applied before any observer is registered, so
    /// loading never schedules a write.
    pub fn with_location(
        root: &ContentNode,
        worker: &Worker,
        path: impl Into<PathBuf>,
        delay: Duration,
    ) -> Self {
        let path = path.into();
        let exercises: Vec<Arc<Exercise>> = root.exercises().cloned().collect();

        load_cache(&path, &exercises);

        let state = Arc::new(CacheState {
            exercises,
            path,
            delay,
            handle: worker.handle().clone(),
            dirty: AtomicBool::new(false),
            scheduled: AtomicBool::new(false),
            flushes: AtomicUsize::new(0),
            write_lock: Mutex::new(()),
        });

        for exercise in &state.exercises {
            let weak: Weak<CacheState> = Arc::downgrade(&state);
            exercise.observe_judgment(Box::new(move |_| {
                if let Some(state) = weak.upgrade() {
                    state.mark_dirty();
                }
            }));
        }

        Self {
            _worker: worker.clone(),
            state,
        }
    }

    pub fn cache_path(&self) -> &Path {
        &self.state.path
    }

    /// Whether there are changes not yet written to disk.
    pub fn is_dirty(&self) -> bool {
        self.state.dirty.load(Ordering::Acquire)
    }

    /// Number of successful writes so far.
    pub fn flush_count(&self) -> usize {
        self.state.flushes.load(Ordering::Acquire)
    }

    /// Current known judgments, keyed by tree path.
    pub fn snapshot(&self) -> BTreeMap<TreePath, Judgment> {
        self.state.snapshot()
    }

    /// Write the cache right away on the calling thread.
    ///
    /// A write already scheduled on the worker still runs and picks up any
    /// changes made after this call.
    pub fn flush_now(&self) -> Result<()> {
        self.state.flush(false)
    }
}

impl CacheState {
    fn mark_dirty(self: &Arc<Self>) {
        self.dirty.store(true, Ordering::Release);
        if self
            .scheduled
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return;
        }

        tracing::debug!("cache write scheduled in {:?}", self.delay);
        let state = Arc::clone(self);
        self.handle.spawn(async move {
            tokio::time::sleep(state.delay).await;
            if let Err(e) = state.flush(true) {
                tracing::error!("failed to write judgment cache: {e:#}");
            }
        });
    }

    fn snapshot(&self) -> BTreeMap<TreePath, Judgment> {
        self.exercises
            .iter()
            .filter(|exercise| exercise.judgment() != Judgment::Unknown)
            .map(|exercise| (exercise.tree_path().clone(), exercise.judgment()))
            .collect()
    }

    /// Only the scheduled task passes `release_schedule`; the pending task
    /// owns the `scheduled` flag until it runs.
    fn flush(&self, release_schedule: bool) -> Result<()> {
        self.dirty.store(false, Ordering::Release);
        if release_schedule {
            self.scheduled.store(false, Ordering::Release);
        }

        let result = self.write();
        match &result {
            Ok(()) => {
                self.flushes.fetch_add(1, Ordering::AcqRel);
                tracing::debug!("judgment cache written to {}", self.path.display());
            }
            Err(_) => self.dirty.store(true, Ordering::Release),
        }
        result
    }

    fn write(&self) -> Result<()> {
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let entries: BTreeMap<String, &str> = self
            .snapshot()
            .into_iter()
            .map(|(path, judgment)| (path.to_string(), judgment.as_str()))
            .collect();
        let json = serde_json::to_string_pretty(&entries)?;

        let directory = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(directory)
            .with_context(|| format!("failed to create {}", directory.display()))?;

        let mut file = tempfile::NamedTempFile::new_in(directory)
            .with_context(|| format!("failed to create temporary file in {}", directory.display()))?;
        file.write_all(json.as_bytes())?;
        file.persist(&self.path)
            .with_context(|| format!("failed to replace {}", self.path.display()))?;
        Ok(())
    }
}

/// Apply the judgments stored at `path` to `exercises`.
///
/// A missing file is an empty cache. An unreadable or malformed file is
/// logged and ignored.
fn load_cache(path: &Path, exercises: &[Arc<Exercise>]) {
    let entries = match read_cache(path) {
        Ok(Some(entries)) => entries,
        Ok(None) => {
            tracing::debug!("no judgment cache at {}", path.display());
            return;
        }
        Err(e) => {
            tracing::warn!("ignoring judgment cache: {e:#}");
            return;
        }
    };

    let by_path: HashMap<&TreePath, &Arc<Exercise>> = exercises
        .iter()
        .map(|exercise| (exercise.tree_path(), exercise))
        .collect();

    let mut applied = 0usize;
    for (key, value) in entries {
        let tree_path: TreePath = match key.parse() {
            Ok(tree_path) => tree_path,
            Err(e) => match e {},
        };
        let Some(exercise) = by_path.get(&tree_path) else {
            tracing::debug!("cached judgment for unknown exercise {key}");
            continue;
        };
        match value.parse::<Judgment>() {
            Ok(judgment) => {
                exercise.set_judgment(judgment);
                applied += 1;
            }
            Err(e) => tracing::warn!("ignoring cached judgment for {key}: {e}"),
        }
    }
    tracing::info!("loaded {applied} judgment(s) from {}", path.display());
}

fn read_cache(path: &Path) -> Result<Option<BTreeMap<String, String>>> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(e).with_context(|| format!("failed to read {}", path.display()));
        }
    };
    let entries = serde_json::from_str(&content)
        .with_context(|| format!("malformed judgment cache {}", path.display()))?;
    Ok(Some(entries))
}

/// Delete the cache file at `path`. Returns whether a file was removed.
pub fn clear_cache(path: &Path) -> Result<bool> {
    match std::fs::remove_file(path) {
        Ok(()) => {
            tracing::info!("removed judgment cache {}", path.display());
            Ok(true)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e).with_context(|| format!("failed to remove {}", path.display())),
    }
}
