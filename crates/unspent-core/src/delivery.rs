//! Callback execution context.
//!
//! Worker tasks never call result callbacks directly. They post a [`Task`]
//! to a [`CallbackExecutor`], and whoever owns that executor decides where
//! the task runs. [`callback_channel`] provides the standard executor: a
//! channel whose [`CallbackLoop`] runs posted tasks one at a time, in post
//! order, on whichever task drives it.

use tokio::sync::mpsc;
use tracing::warn;

/// A unit of callback work posted from a worker.
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Designated execution context for delivering outcomes.
pub trait CallbackExecutor: Send + Sync + 'static {
    fn post(&self, task: Task);
}

/// Create a connected poster/loop pair.
pub fn callback_channel() -> (CallbackPoster, CallbackLoop) {
    let (tx, rx) = mpsc::unbounded_channel();
    (CallbackPoster { tx }, CallbackLoop { rx })
}

/// Posting half of [`callback_channel`]. Cheap to clone.
#[derive(Clone)]
pub struct CallbackPoster {
    tx: mpsc::UnboundedSender<Task>,
}

impl CallbackExecutor for CallbackPoster {
    fn post(&self, task: Task) {
        if self.tx.send(task).is_err() {
            warn!("callback loop has shut down; dropping posted delivery");
        }
    }
}

/// Receiving half of [`callback_channel`].
pub struct CallbackLoop {
    rx: mpsc::UnboundedReceiver<Task>,
}

impl CallbackLoop {
    /// Run posted tasks until every poster has been dropped. Returns the
    /// number of tasks run.
    pub async fn run(mut self) -> usize {
        let mut ran = 0;
        while let Some(task) = self.rx.recv().await {
            task();
            ran += 1;
        }
        ran
    }

    /// Wait for the next posted task and run it. Returns `false` once every
    /// poster has been dropped and the queue is empty.
    pub async fn run_next(&mut self) -> bool {
        match self.rx.recv().await {
            Some(task) => {
                task();
                true
            }
            None => false,
        }
    }

    /// Run every task already queued without waiting for more.
    pub fn run_pending(&mut self) -> usize {
        let mut ran = 0;
        while let Ok(task) = self.rx.try_recv() {
            task();
            ran += 1;
        }
        ran
    }
}
