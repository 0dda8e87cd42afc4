// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// The UI-owning execution context.
//
// Screen/view mutation, broker bookkeeping, and plugin invocation all happen
// on one thread. Work arriving from elsewhere (the web runtime's message
// thread, background tasks) is posted as a task onto an unbounded queue that
// the UI loop drains in FIFO order.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Arc, OnceLock};
use std::thread::ThreadId;

use tokio::sync::mpsc;
use tracing::{debug, error, warn};

use cobalt_core::error::{CobaltError, Result};

type UiTask = Box<dyn FnOnce() + Send + 'static>;

/// Create a connected handle/loop pair.
///
/// The loop binds itself to the first thread that drives it.
pub fn ui_channel() -> (UiThread, UiLoop) {
    let (tx, rx) = mpsc::unbounded_channel();
    let owner = Arc::new(OnceLock::new());
    (
        UiThread {
            tx,
            owner: Arc::clone(&owner),
        },
        UiLoop { rx, owner },
    )
}

/// Cloneable handle used to schedule work on the UI context.
#[derive(Clone)]
pub struct UiThread {
    tx: mpsc::UnboundedSender<UiTask>,
    owner: Arc<OnceLock<ThreadId>>,
}

impl UiThread {
    /// Whether the calling thread is the one driving the UI loop.
    pub fn is_ui_thread(&self) -> bool {
        self.owner.get() == Some(&std::thread::current().id())
    }

    /// Queue `task` for the UI loop without waiting for it.
    pub fn post<F>(&self, task: F) -> Result<()>
    where
        F: FnOnce() + Send + 'static,
    {
        self.tx.send(Box::new(task)).map_err(|_| CobaltError::UiClosed)
    }

    /// Run `task` immediately when already on the UI thread, otherwise queue it.
    pub fn run_on_ui<F>(&self, task: F) -> Result<()>
    where
        F: FnOnce() + Send + 'static,
    {
        if self.is_ui_thread() {
            task();
            Ok(())
        } else {
            self.post(task)
        }
    }
}

/// Receiving side of the UI queue. Owned by whoever drives the UI thread.
pub struct UiLoop {
    rx: mpsc::UnboundedReceiver<UiTask>,
    owner: Arc<OnceLock<ThreadId>>,
}

impl UiLoop {
    fn bind(&self) {
        let current = std::thread::current().id();
        let owner = *self.owner.get_or_init(|| current);
        if owner != current {
            warn!(?owner, ?current, "UI loop driven from a thread other than the one it was bound to");
        }
    }

    /// Drain tasks until every [`UiThread`] handle has been dropped.
    pub async fn run(mut self) {
        self.bind();
        debug!("UI loop running");
        while let Some(task) = self.rx.recv().await {
            run_task(task);
        }
        debug!("UI loop stopped: all handles dropped");
    }

    /// Run every task queued so far, plus any they queue in turn.
    ///
    /// Returns the number of tasks executed.
    pub fn run_pending(&mut self) -> usize {
        self.bind();
        let mut ran = 0;
        while let Ok(task) = self.rx.try_recv() {
            run_task(task);
            ran += 1;
        }
        ran
    }
}

/// A panicking task must not take the UI loop down with it.
fn run_task(task: UiTask) {
    if catch_unwind(AssertUnwindSafe(task)).is_err() {
        error!("task panicked on the UI thread, continuing");
    }
}
