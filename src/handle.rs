//! The write-once value handle that couples one root computation to its
//! external waiter.

use std::sync::Arc;

use parking_lot::{Condvar, Mutex};

use crate::error::Cancelled;

#[derive(Clone, Copy)]
enum State {
    Pending,
    Ready(bool),
    Broken,
}

struct Inner {
    state: Mutex<State>,
    condvar: Condvar,
}

/// A single-writer/multi-reader latch carrying the eventual boolean result
/// of a submitted circuit, or a `broken` outcome if the computation was
/// cancelled.
///
/// Cheap to clone (an `Arc` underneath); may be awaited by any number of
/// threads, any number of times.
#[derive(Clone)]
pub struct ValueHandle {
    inner: Arc<Inner>,
}

impl ValueHandle {
    pub(crate) fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(State::Pending),
                condvar: Condvar::new(),
            }),
        }
    }

    /// A handle that is already `broken`, never `pending`. Returned by
    /// [`crate::solver::CircuitSolver::solve`] once the solver has stopped
    /// accepting submissions.
    pub(crate) fn new_broken() -> Self {
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(State::Broken),
                condvar: Condvar::new(),
            }),
        }
    }

    /// Blocks until the handle leaves `pending`, then reports the outcome.
    /// May be called repeatedly, from any number of threads; each call
    /// re-reads the final state.
    pub fn wait(&self) -> Result<bool, Cancelled> {
        let mut state = self.inner.state.lock();
        loop {
            match *state {
                State::Pending => self.inner.condvar.wait(&mut state),
                State::Ready(value) => return Ok(value),
                State::Broken => return Err(Cancelled),
            }
        }
    }

    /// Transitions to `ready(value)`. A call that observes a non-`pending`
    /// state is the benign race against a concurrent [`Self::cancel`]
    /// described in `spec.md` §4.1 — it is a silent no-op, not an error (see
    /// `SPEC_FULL.md` for why `Error::DoublePublish` is never actually
    /// reachable from inside this crate).
    pub(crate) fn publish(&self, value: bool) {
        let mut state = self.inner.state.lock();
        if let State::Pending = *state {
            *state = State::Ready(value);
            drop(state);
            self.inner.condvar.notify_all();
        }
    }

    /// Transitions to `broken` if still `pending`; idempotent otherwise.
    pub(crate) fn cancel(&self) {
        let mut state = self.inner.state.lock();
        if let State::Pending = *state {
            *state = State::Broken;
            drop(state);
            self.inner.condvar.notify_all();
        }
    }
}
