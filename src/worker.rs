//! The per-node concurrent evaluator: one Worker per (non-cancelled) node,
//! spawning one child Worker per argument and driving the operator rule
//! that decides the parent's value.

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::Sender;
use tracing::trace;

use crate::cancel::CancelToken;
use crate::channel::{child_channel, ChildMessage};
use crate::config::SolverConfig;
use crate::error::Cancelled;
use crate::handle::ValueHandle;
use crate::node::{Kind, Node};
use crate::rules;

/// Where a Worker delivers its result: the parent's channel (non-root), or
/// the circuit's [`ValueHandle`] (root).
enum Publisher {
    Root(ValueHandle),
    Child(Sender<ChildMessage>, usize),
}

impl Publisher {
    fn publish(self, value: bool) {
        match self {
            Publisher::Root(handle) => handle.publish(value),
            Publisher::Child(tx, index) => {
                // A parent that has already decided drops its receiver;
                // sending into a discarded channel is a silent no-op, per
                // spec.md §4.2 — the producing Worker will have observed
                // its own cancellation before or during its next
                // suspension point anyway.
                let _ = tx.try_send(ChildMessage { index, value });
            }
        }
    }

    fn cancel(self) {
        if let Publisher::Root(handle) = self {
            handle.cancel();
        }
        // A cancelled non-root Worker publishes nothing: dropping the
        // sender is enough, there is nothing to notify downstream of a
        // value that will never exist.
    }
}

/// A join handle plus the means to cancel the Worker it belongs to. Every
/// spawner joins every Worker it spawns, on every exit path, so no Worker
/// ever outlives its parent.
pub(crate) struct WorkerHandle {
    cancel: CancelToken,
    join: JoinHandle<()>,
}

impl WorkerHandle {
    /// Requests cancellation and waits for the Worker to terminate.
    /// Cancelling an already-finished Worker is a no-op; joining an
    /// already-finished thread returns immediately — so this is safe to
    /// call unconditionally during cleanup, regardless of whether the
    /// child actually needed cancelling.
    pub(crate) fn cancel_and_join(self) {
        self.cancel.cancel();
        // A worker thread only panics on a spawn failure inside its own
        // subtree, which we already propagate by panicking at spawn time;
        // ordinary evaluation never panics, so a panicked join here would
        // indicate a bug in this crate rather than in embedder code.
        let _ = self.join.join();
    }
}

/// Spawns the root Worker for a freshly submitted circuit.
pub(crate) fn spawn_root(
    node: Arc<dyn Node>,
    handle: ValueHandle,
    config: &SolverConfig,
) -> WorkerHandle {
    let cancel = CancelToken::new();
    let thread_cancel = cancel.clone();
    let name = format!("{}-root", config.thread_name_prefix);
    let publisher = Publisher::Root(handle);

    let mut builder = thread::Builder::new().name(name);
    if let Some(stack_size) = config.worker_stack_size {
        builder = builder.stack_size(stack_size);
    }

    let config = config.clone();
    let join = builder
        .spawn(move || run_worker(node, publisher, thread_cancel, &config))
        .expect("failed to spawn root worker thread");

    WorkerHandle { cancel, join }
}

fn spawn_child(
    node: Arc<dyn Node>,
    index: usize,
    parent_tx: Sender<ChildMessage>,
    config: &SolverConfig,
) -> WorkerHandle {
    let cancel = CancelToken::new();
    let thread_cancel = cancel.clone();
    let name = format!("{}-child-{index}", config.thread_name_prefix);
    let publisher = Publisher::Child(parent_tx, index);

    let mut builder = thread::Builder::new().name(name);
    if let Some(stack_size) = config.worker_stack_size {
        builder = builder.stack_size(stack_size);
    }

    let config = config.clone();
    let join = builder
        .spawn(move || run_worker(node, publisher, thread_cancel, &config))
        .expect("failed to spawn child worker thread");

    WorkerHandle { cancel, join }
}

fn run_worker(
    node: Arc<dyn Node>,
    publisher: Publisher,
    cancel: CancelToken,
    config: &SolverConfig,
) {
    match evaluate_node(node.as_ref(), &cancel, config) {
        Ok(value) => publisher.publish(value),
        Err(Cancelled) => publisher.cancel(),
    }
}

/// Evaluates one subtree: a leaf reads directly; an operator spawns one
/// child Worker per argument, drives the operator rule, then — on every
/// exit path, decided or cancelled — cancels and joins every child it
/// spawned before returning. This uniform teardown is what makes
/// cancellation cascade leaf-ward without any operator rule needing to
/// track which children are still outstanding.
pub(crate) fn evaluate_node(
    node: &dyn Node,
    cancel: &CancelToken,
    config: &SolverConfig,
) -> Result<bool, Cancelled> {
    if cancel.is_cancelled() {
        return Err(Cancelled);
    }

    let kind = node.kind();
    if kind == Kind::Leaf {
        return node.read(cancel);
    }

    let children = node.children();
    let arity = children.len();
    let (tx, rx) = child_channel(arity);

    let workers: Vec<WorkerHandle> = children
        .iter()
        .enumerate()
        .map(|(index, child)| spawn_child(child.clone(), index, tx.clone(), config))
        .collect();
    // The parent never sends on its own channel; dropping its sender means
    // the channel disconnects once every spawned child has dropped theirs.
    drop(tx);

    trace!(?kind, arity, "driving operator rule");
    let result = rules::evaluate(kind, arity, &rx, cancel);

    for worker in workers {
        worker.cancel_and_join();
    }

    result
}
