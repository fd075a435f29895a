//! Schedules judge runs on the background worker.

use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::oneshot;

use coursetree_core::{ContentNode, Exercise, Judgment, TreePath};

use crate::worker::Worker;

/// Submits exercises for judging.
///
/// All runs happen on the shared [`Worker`]; the service itself is cheap to
/// clone and can be used from any thread.
#[derive(Clone)]
pub struct JudgingService {
    worker: Worker,
}

impl JudgingService {
    pub fn new(worker: Worker) -> Self {
        Self { worker }
    }

    /// Reset the exercise's judgment to `Unknown` and schedule a judge run.
    ///
    /// Returns immediately. Runs for the same exercise never overlap; if this
    /// request is superseded by a later one before it completes, its verdict
    /// is discarded.
    pub fn judge(&self, exercise: &Arc<Exercise>) -> JudgeHandle {
        tracing::info!("enqueueing judgment for {}", exercise.tree_path());
        let generation = exercise.begin_judging();
        let (tx, rx) = oneshot::channel();
        let tree_path = exercise.tree_path().clone();

        let exercise = Arc::clone(exercise);
        self.worker.spawn(async move {
            let _running = exercise.run_lock().lock().await;
            if !exercise.is_current(generation) {
                tracing::debug!("skipping superseded run for {}", exercise.tree_path());
                let _ = tx.send(None);
                return;
            }

            tracing::debug!("judging {}", exercise.tree_path());
            let judgment = Judgment::from_verdict(exercise.judge().run().await);
            let outcome = if exercise.complete_judging(generation, judgment) {
                tracing::info!("judged {}: {judgment}", exercise.tree_path());
                Some(judgment)
            } else {
                tracing::debug!("discarding stale verdict for {}", exercise.tree_path());
                None
            };
            let _ = tx.send(outcome);
        });

        JudgeHandle {
            tree_path,
            receiver: rx,
        }
    }

    /// Judge every exercise in the subtree rooted at `node`.
    ///
    /// With `only_unknown`, exercises that already have a verdict are left
    /// alone.
    pub fn judge_recursively(&self, node: &ContentNode, only_unknown: bool) -> Vec<JudgeHandle> {
        node.exercises()
            .filter(|exercise| !only_unknown || exercise.judgment() == Judgment::Unknown)
            .map(|exercise| self.judge(exercise))
            .collect()
    }
}

/// Completion handle for one judge request.
///
/// Dropping the handle does not cancel the run.
#[derive(Debug)]
pub struct JudgeHandle {
    tree_path: TreePath,
    receiver: oneshot::Receiver<Option<Judgment>>,
}

impl JudgeHandle {
    pub fn tree_path(&self) -> &TreePath {
        &self.tree_path
    }

    /// Wait for the run to finish.
    ///
    /// Returns `None` when the request was superseded by a newer one or the
    /// worker shut down before the run completed.
    pub async fn wait(self) -> Option<Judgment> {
        self.receiver.await.ok().flatten()
    }

    /// Blocking variant of [`wait`](Self::wait).
    ///
    /// Must not be called from within an async context.
    pub fn wait_blocking(self) -> Option<Judgment> {
        self.receiver.blocking_recv().ok().flatten()
    }
}

/// Wait for all handles, pairing each outcome with its exercise path.
pub async fn wait_all(handles: Vec<JudgeHandle>) -> Vec<(TreePath, Option<Judgment>)> {
    join_all(handles.into_iter().map(|handle| async move {
        let path = handle.tree_path.clone();
        (path, handle.wait().await)
    }))
    .await
}
