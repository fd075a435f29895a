//! Background worker: one OS thread driving a single-threaded tokio runtime.
//!
//! Judge runs and cache flushes are tasks on this runtime. Other threads
//! only submit work through the runtime handle; they never run tasks.

use std::future::Future;
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle, ThreadId};

use anyhow::{Context, Result};
use tokio::runtime::Handle;
use tokio::sync::oneshot;

/// Name of the worker thread.
pub const WORKER_THREAD_NAME: &str = "coursetree-worker";

/// Cloneable handle to the background worker.
///
/// The worker shuts down when the last clone is dropped; tasks still pending
/// at that point are cancelled.
#[derive(Clone)]
pub struct Worker {
    inner: Arc<WorkerInner>,
}

struct WorkerInner {
    handle: Handle,
    shutdown: Mutex<Option<oneshot::Sender<()>>>,
    thread: Mutex<Option<JoinHandle<()>>>,
    thread_id: ThreadId,
}

impl Worker {
    /// Spawn the worker thread and wait until its runtime is ready.
    pub fn start() -> Result<Self> {
        let (ready_tx, ready_rx) = std::sync::mpsc::channel();
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        let thread = thread::Builder::new()
            .name(WORKER_THREAD_NAME.to_string())
            .spawn(move || {
                let runtime = match tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build()
                {
                    Ok(runtime) => runtime,
                    Err(e) => {
                        let _ = ready_tx.send(Err(e));
                        return;
                    }
                };
                tracing::debug!("background worker reporting for duty");
                let _ = ready_tx.send(Ok(runtime.handle().clone()));

                runtime.block_on(async {
                    let _ = shutdown_rx.await;
                });
                tracing::debug!("background worker shutting down");
            })
            .context("failed to spawn worker thread")?;

        let thread_id = thread.thread().id();
        let handle = ready_rx
            .recv()
            .context("worker thread exited during startup")?
            .context("failed to build worker runtime")?;

        Ok(Self {
            inner: Arc::new(WorkerInner {
                handle,
                shutdown: Mutex::new(Some(shutdown_tx)),
                thread: Mutex::new(Some(thread)),
                thread_id,
            }),
        })
    }

    /// Runtime handle; safe to use from any thread.
    pub fn handle(&self) -> &Handle {
        &self.inner.handle
    }

    /// Submit a task to the worker. Does not block.
    pub fn spawn<F>(&self, future: F) -> tokio::task::JoinHandle<F::Output>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        self.inner.handle.spawn(future)
    }

    /// Whether the calling thread is the worker thread.
    pub fn is_worker_thread(&self) -> bool {
        thread::current().id() == self.inner.thread_id
    }
}

impl Drop for WorkerInner {
    fn drop(&mut self) {
        if let Some(shutdown) = lock(&self.shutdown).take() {
            let _ = shutdown.send(());
        }
        if thread::current().id() == self.thread_id {
            return;
        }
        if let Some(thread) = lock(&self.thread).take() {
            if thread.join().is_err() {
                tracing::error!("background worker panicked");
            }
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
