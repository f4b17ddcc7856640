// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// UI execution contexts.
//
// Surfaces are single-threaded objects. Everything that touches one is funnelled
// through a `UiExecutor`, which either owns a dedicated thread (`WorkerThread`,
// used on desktop and in tests) or queues work until the host's own UI loop
// drains it (`PumpedQueue`, used when the platform owns the main thread).

use std::collections::VecDeque;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError, mpsc};
use std::thread::{JoinHandle, ThreadId};

use tracing::{debug, error, warn};
use webcanvas_core::error::{CanvasError, Result};

use crate::traits::{UiExecutor, UiTask};

/// Name given to the dedicated UI thread.
pub const UI_THREAD_NAME: &str = "webcanvas-ui";

/// Callback the host registers to learn that a pump is needed.
pub type Waker = Arc<dyn Fn() + Send + Sync + 'static>;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Run `task`, containing any panic so the UI loop keeps going.
pub(crate) fn run_guarded(task: UiTask) {
    if catch_unwind(AssertUnwindSafe(task)).is_err() {
        error!("ui task panicked");
    }
}

// ---------------------------------------------------------------------------
// WorkerThread
// ---------------------------------------------------------------------------

/// A dedicated thread draining a FIFO task queue.
///
/// The thread exits once the executor is dropped and the queue is empty.
pub struct WorkerThread {
    sender: Option<mpsc::Sender<UiTask>>,
    thread_id: ThreadId,
    handle: Option<JoinHandle<()>>,
}

impl WorkerThread {
    /// Spawn the UI thread.
    pub fn spawn() -> Result<Self> {
        let (tx, rx) = mpsc::channel::<UiTask>();
        let handle = std::thread::Builder::new()
            .name(UI_THREAD_NAME.to_string())
            .spawn(move || {
                for task in rx {
                    run_guarded(task);
                }
                debug!("ui worker drained, exiting");
            })
            .map_err(CanvasError::Io)?;
        let thread_id = handle.thread().id();
        debug!(?thread_id, "ui worker started");

        Ok(Self {
            sender: Some(tx),
            thread_id,
            handle: Some(handle),
        })
    }
}

impl UiExecutor for WorkerThread {
    fn is_ui_thread(&self) -> bool {
        std::thread::current().id() == self.thread_id
    }

    fn post(&self, task: UiTask) {
        let delivered = match &self.sender {
            Some(tx) => tx.send(task).is_ok(),
            None => false,
        };
        if !delivered {
            warn!("ui worker stopped, dropping task");
        }
    }
}

impl Drop for WorkerThread {
    fn drop(&mut self) {
        self.sender.take();
        // Joining ourselves would deadlock.
        if self.is_ui_thread() {
            return;
        }
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                error!("ui worker panicked during shutdown");
            }
        }
    }
}

// ---------------------------------------------------------------------------
// PumpedQueue
// ---------------------------------------------------------------------------

/// Tasks wait here until the host calls [`PumpedQueue::pump`] on its UI
/// thread.
///
/// The host binds its UI thread once with [`PumpedQueue::bind_current_thread`]
/// and usually registers a waker that schedules a pump (an Android `Handler`
/// post, a run-loop source, ...).
#[derive(Default)]
pub struct PumpedQueue {
    tasks: Mutex<VecDeque<UiTask>>,
    ui_thread: OnceLock<ThreadId>,
    waker: Mutex<Option<Waker>>,
}

impl PumpedQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the calling thread as the UI thread. Returns `false` when a
    /// different thread was bound earlier; the first binding wins.
    pub fn bind_current_thread(&self) -> bool {
        let current = std::thread::current().id();
        *self.ui_thread.get_or_init(|| current) == current
    }

    /// Register the callback invoked after every post.
    pub fn set_waker(&self, waker: Waker) {
        *lock(&self.waker) = Some(waker);
    }

    /// Number of queued tasks.
    pub fn pending(&self) -> usize {
        lock(&self.tasks).len()
    }

    /// Run every queued task, including ones posted while pumping. Returns
    /// the number of tasks run; off the bound UI thread nothing runs.
    pub fn pump(&self) -> usize {
        if !self.is_ui_thread() {
            warn!("pump called off the ui thread, ignoring");
            return 0;
        }
        let mut ran = 0;
        loop {
            // The guard must be released before the task runs; tasks may post.
            let next = lock(&self.tasks).pop_front();
            match next {
                Some(task) => {
                    run_guarded(task);
                    ran += 1;
                }
                None => break,
            }
        }
        ran
    }
}

impl UiExecutor for PumpedQueue {
    fn is_ui_thread(&self) -> bool {
        self.ui_thread.get() == Some(&std::thread::current().id())
    }

    fn post(&self, task: UiTask) {
        lock(&self.tasks).push_back(task);
        let waker = lock(&self.waker).clone();
        if let Some(wake) = waker {
            wake();
        }
    }
}
