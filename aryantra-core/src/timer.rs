//! Cancelable delayed transitions.
//!
//! A [`TransitionTimer`] owns at most one pending delay. Scheduling replaces
//! whatever was pending, and a delay that elapses is delivered as a [`Fired`]
//! message on the receiver returned by [`TransitionTimer::new`]. The owner
//! passes each message back through [`TransitionTimer::accept`], which drops
//! anything that does not belong to the live handle. That covers the window
//! where a delay elapsed and queued its message right before being cancelled.

use std::{fmt, time::Duration};

use tokio::{
    sync::mpsc,
    task::JoinHandle,
    time::{Instant, sleep_until},
};
use tokio_util::sync::CancellationToken;
use tracing::trace;

/// Identifies one scheduled delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle(u64);

impl TimerHandle {
    pub fn id(self) -> u64 {
        self.0
    }
}

/// Delivered when a scheduled delay elapses.
#[derive(Debug)]
pub struct Fired<T> {
    pub handle: TimerHandle,
    pub payload: T,
}

struct Pending {
    handle: TimerHandle,
    deadline: Instant,
    token: CancellationToken,
    task: JoinHandle<()>,
}

impl Pending {
    fn cancel(self) {
        self.token.cancel();
        self.task.abort();
    }
}

pub struct TransitionTimer<T> {
    tx: mpsc::UnboundedSender<Fired<T>>,
    pending: Option<Pending>,
    next_id: u64,
}

impl<T> fmt::Debug for TransitionTimer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransitionTimer")
            .field("pending", &self.pending.as_ref().map(|p| p.handle))
            .field("next_id", &self.next_id)
            .finish()
    }
}

impl<T: Send + 'static> TransitionTimer<T> {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Fired<T>>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                tx,
                pending: None,
                next_id: 0,
            },
            rx,
        )
    }

    /// Schedule `payload` to fire after `delay`, cancelling any pending delay
    /// first. Must be called from within a tokio runtime.
    pub fn schedule(&mut self, delay: Duration, payload: T) -> TimerHandle {
        self.cancel_all();

        let handle = TimerHandle(self.next_id);
        self.next_id += 1;

        let deadline = Instant::now() + delay;
        let token = CancellationToken::new();
        let cancelled = token.clone();
        let tx = self.tx.clone();

        let task = tokio::spawn(async move {
            tokio::select! {
                biased;
                _ = cancelled.cancelled() => {}
                _ = sleep_until(deadline) => {
                    // The receiver is gone once the owner tore down.
                    let _ = tx.send(Fired { handle, payload });
                }
            }
        });

        trace!(timer = handle.0, delay_ms = delay.as_millis() as u64, "timer scheduled");
        self.pending = Some(Pending {
            handle,
            deadline,
            token,
            task,
        });
        handle
    }
}

impl<T> TransitionTimer<T> {
    /// Cancel `handle` if it is still the pending delay.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        match &self.pending {
            Some(pending) if pending.handle == handle => {
                self.cancel_all();
                true
            }
            _ => false,
        }
    }

    /// Cancel every outstanding delay. A timer owns at most one, whose handle
    /// is returned.
    pub fn cancel_all(&mut self) -> Option<TimerHandle> {
        let pending = self.pending.take()?;
        let handle = pending.handle;
        pending.cancel();
        trace!(timer = handle.0, "timer cancelled");
        Some(handle)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn pending_handle(&self) -> Option<TimerHandle> {
        self.pending.as_ref().map(|p| p.handle)
    }

    /// Time left before the pending delay elapses.
    pub fn remaining(&self) -> Option<Duration> {
        self.pending
            .as_ref()
            .map(|p| p.deadline.saturating_duration_since(Instant::now()))
    }

    /// Take the payload out of a fired message if it belongs to the pending
    /// delay. Stale messages yield `None`.
    pub fn accept(&mut self, fired: Fired<T>) -> Option<T> {
        match &self.pending {
            Some(pending) if pending.handle == fired.handle => {
                self.pending = None;
                Some(fired.payload)
            }
            _ => {
                trace!(timer = fired.handle.0, "dropping stale timer message");
                None
            }
        }
    }
}

impl<T> Drop for TransitionTimer<T> {
    fn drop(&mut self) {
        self.cancel_all();
    }
}
