//! Cooperative cancellation signal.
//!
//! A [`CancelToken`] pairs a cache-padded `AtomicBool` flag with a
//! capacity-1 `crossbeam_channel` so that any blocking receive can race the
//! cancellation via [`crossbeam_channel::Select`] instead of polling a flag
//! in a spin loop. Every Worker owns exactly one token; only its parent (or
//! the solver, for roots) ever calls [`CancelToken::cancel`] on it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crossbeam_channel::{bounded, Receiver, Sender};
use crossbeam_utils::CachePadded;

struct Inner {
    /// Checked on every `recv_cancellable`, so every Worker hammers this on
    /// its own cache line rather than contending with `tx`/`rx`'s.
    fired: CachePadded<AtomicBool>,
    tx: Sender<()>,
    rx: Receiver<()>,
}

#[derive(Clone)]
pub(crate) struct CancelToken {
    inner: Arc<Inner>,
}

impl CancelToken {
    pub(crate) fn new() -> Self {
        let (tx, rx) = bounded(1);
        Self {
            inner: Arc::new(Inner {
                fired: CachePadded::new(AtomicBool::new(false)),
                tx,
                rx,
            }),
        }
    }

    /// Requests cancellation. Idempotent: a second call is a no-op.
    pub(crate) fn cancel(&self) {
        if !self.inner.fired.swap(true, Ordering::AcqRel) {
            // Capacity is 1 and we only ever send once (guarded by the
            // swap above), so this can never fail with `Full`.
            let _ = self.inner.tx.try_send(());
        }
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.inner.fired.load(Ordering::Acquire)
    }

    /// The receiving half of the cancellation signal, for use in a
    /// [`crossbeam_channel::Select`] alongside the operation being raced.
    pub(crate) fn signal(&self) -> &Receiver<()> {
        &self.inner.rx
    }
}
