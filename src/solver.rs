//! The solver lifecycle: accepts root submissions, owns all roots, and
//! performs an irreversible, global stop.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::config::SolverConfig;
use crate::error::Error;
use crate::handle::ValueHandle;
use crate::node::{Kind, Node};
use crate::worker::{self, WorkerHandle};

struct SolverState {
    accepting: bool,
    roots: Vec<WorkerHandle>,
}

/// Accepts circuit submissions and evaluates each as an independent root,
/// until [`CircuitSolver::stop`] irreversibly cancels every in-flight root
/// and refuses further submissions.
///
/// `solve` and `stop` are serialised by a single mutex, so a root
/// registered by `solve` is always observed by any subsequent `stop`, and a
/// `solve` racing a concurrent `stop` either wins (and is then cancelled
/// like any other root) or loses (and gets back an already-`broken`
/// handle).
pub struct CircuitSolver {
    config: SolverConfig,
    state: Mutex<SolverState>,
}

impl Default for CircuitSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl CircuitSolver {
    pub fn new() -> Self {
        Self::with_config(SolverConfig::default())
    }

    pub fn with_config(config: SolverConfig) -> Self {
        Self {
            config,
            state: Mutex::new(SolverState {
                accepting: true,
                roots: Vec::new(),
            }),
        }
    }

    /// Submits a circuit for evaluation. Returns a [`ValueHandle`] that may
    /// be awaited any number of times, from any number of threads.
    ///
    /// Returns [`Error::InvalidIfArity`] without spawning anything if the
    /// tree contains an `If` node that doesn't have exactly 3 children. If
    /// the solver has already been stopped, returns a handle that is
    /// already `broken` rather than an error — submission itself always
    /// succeeds; it's the eventual result that reflects the stop.
    pub fn solve(&self, circuit: Arc<dyn Node>) -> Result<ValueHandle, Error> {
        validate(circuit.as_ref())?;

        let mut state = self.state.lock();
        if !state.accepting {
            debug!("solve() called after stop(); returning a pre-broken handle");
            return Ok(ValueHandle::new_broken());
        }

        let handle = ValueHandle::new();
        let root = worker::spawn_root(circuit, handle.clone(), &self.config);
        state.roots.push(root);
        trace!(live_roots = state.roots.len(), "accepted new root");
        Ok(handle)
    }

    /// Irreversibly stops accepting submissions and cancels every
    /// outstanding root, cascading through each root's subtree. Returns
    /// only after every root has terminated. Idempotent: a second call is a
    /// no-op.
    pub fn stop(&self) {
        let mut state = self.state.lock();
        if !state.accepting {
            return;
        }
        state.accepting = false;
        let roots = std::mem::take(&mut state.roots);
        debug!(roots = roots.len(), "stopping solver");
        for root in roots {
            root.cancel_and_join();
        }
        trace!("all roots joined; solver stopped");
    }
}

/// Walks the tree once before anything is spawned, rejecting malformed
/// input — currently only `If` nodes with other than exactly 3 children
/// (spec.md's "Open Question": implementations should reject other
/// arities).
fn validate(node: &dyn Node) -> Result<(), Error> {
    let children = node.children();
    if node.kind() == Kind::If && children.len() != 3 {
        return Err(Error::InvalidIfArity(children.len()));
    }
    for child in children {
        validate(child.as_ref())?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Circuit;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::{Duration, Instant};

    #[test]
    fn and_of_all_true_is_true() {
        let solver = CircuitSolver::new();
        let circuit = Circuit::and(vec![
            Circuit::leaf_value(true),
            Circuit::leaf_value(true),
            Circuit::leaf_value(true),
        ]);
        let handle = solver.solve(circuit).unwrap();
        assert_eq!(handle.wait(), Ok(true));
    }

    #[test]
    fn and_short_circuits_a_slow_sibling() {
        let solver = CircuitSolver::new();
        let completed: Arc<AtomicUsize> = Arc::new(AtomicUsize::new(0));
        let completed_clone = completed.clone();

        let circuit = Circuit::and(vec![
            Circuit::leaf_after(Duration::from_millis(50), true),
            Circuit::leaf_value(false),
            Circuit::leaf_fn(move |_cancel| {
                std::thread::sleep(Duration::from_secs(10));
                completed_clone.fetch_add(1, Ordering::SeqCst);
                Ok(true)
            }),
        ]);

        let start = Instant::now();
        let handle = solver.solve(circuit).unwrap();
        assert_eq!(handle.wait(), Ok(false));
        assert!(start.elapsed() < Duration::from_secs(5));
        assert_eq!(completed.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn if_cancels_the_unchosen_branch() {
        let solver = CircuitSolver::new();
        let completed = Arc::new(AtomicUsize::new(0));
        let completed_clone = completed.clone();

        let circuit = Circuit::if_(
            Circuit::leaf_value(true),
            Circuit::leaf_value(false),
            Circuit::leaf_fn(move |_cancel| {
                std::thread::sleep(Duration::from_secs(10));
                completed_clone.fetch_add(1, Ordering::SeqCst);
                Ok(true)
            }),
        );

        let start = Instant::now();
        let handle = solver.solve(circuit).unwrap();
        assert_eq!(handle.wait(), Ok(false));
        assert!(start.elapsed() < Duration::from_secs(5));
        assert_eq!(completed.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn if_cancels_condition_when_branches_agree() {
        let solver = CircuitSolver::new();
        let condition_completed = Arc::new(AtomicUsize::new(0));
        let condition_clone = condition_completed.clone();

        let circuit = Circuit::if_(
            Circuit::leaf_fn(move |_cancel| {
                std::thread::sleep(Duration::from_secs(10));
                condition_clone.fetch_add(1, Ordering::SeqCst);
                Ok(true)
            }),
            Circuit::leaf_value(true),
            Circuit::leaf_value(true),
        );

        let start = Instant::now();
        let handle = solver.solve(circuit).unwrap();
        assert_eq!(handle.wait(), Ok(true));
        assert!(start.elapsed() < Duration::from_secs(5));
        assert_eq!(condition_completed.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn gt_cancels_a_slow_leaf_once_decided() {
        let solver = CircuitSolver::new();
        let completed = Arc::new(AtomicUsize::new(0));
        let completed_clone = completed.clone();

        let circuit = Circuit::gt(
            2,
            vec![
                Circuit::leaf_value(true),
                Circuit::leaf_value(true),
                Circuit::leaf_value(true),
                Circuit::leaf_fn(move |_cancel| {
                    std::thread::sleep(Duration::from_secs(10));
                    completed_clone.fetch_add(1, Ordering::SeqCst);
                    Ok(true)
                }),
            ],
        );

        let start = Instant::now();
        let handle = solver.solve(circuit).unwrap();
        assert_eq!(handle.wait(), Ok(true));
        assert!(start.elapsed() < Duration::from_secs(5));
        assert_eq!(completed.load(Ordering::SeqCst), 0);
    }

    /// `Circuit::if_` always builds a 3-element array, so it can't itself
    /// misreport arity; a malformed `If` can only come from a third-party
    /// `Node` implementation, which this stands in for.
    struct MalformedIf(Vec<Arc<dyn Node>>);

    impl Node for MalformedIf {
        fn kind(&self) -> Kind {
            Kind::If
        }

        fn children(&self) -> &[Arc<dyn Node>] {
            &self.0
        }
    }

    #[test]
    fn invalid_if_arity_is_rejected_before_spawning() {
        let solver = CircuitSolver::new();
        let malformed: Arc<dyn Node> = Arc::new(MalformedIf(vec![
            Circuit::leaf_value(true),
            Circuit::leaf_value(true),
        ]));
        // Nest the malformed node under an `And` so `validate` must recurse.
        let wrapped = Circuit::and(vec![malformed]);
        match solver.solve(wrapped) {
            Err(Error::InvalidIfArity(2)) => {}
            Err(other) => panic!("expected InvalidIfArity(2), got {other:?}"),
            Ok(_) => panic!("expected InvalidIfArity(2), got Ok"),
        }
    }

    #[test]
    fn stop_breaks_outstanding_and_future_submissions() {
        let solver = CircuitSolver::new();
        let first = solver
            .solve(Circuit::leaf_after(Duration::from_secs(10), true))
            .unwrap();

        solver.stop();

        assert_eq!(first.wait(), Err(crate::error::Cancelled));

        let second = solver.solve(Circuit::leaf_value(true)).unwrap();
        assert_eq!(second.wait(), Err(crate::error::Cancelled));
    }

    #[test]
    fn stop_is_idempotent() {
        let solver = CircuitSolver::new();
        solver.stop();
        solver.stop();
    }

    #[test]
    fn no_leaks_after_await() {
        // Every spawned worker thread's handle is joined by its parent (or
        // the solver, for the root) on every exit path: if that weren't
        // true, `stop()` above and `wait()` here simply wouldn't return.
        let solver = CircuitSolver::new();
        let circuit = Circuit::or(vec![
            Circuit::leaf_value(false),
            Circuit::leaf_value(true),
            Circuit::leaf_after(Duration::from_secs(10), false),
        ]);
        let handle = solver.solve(circuit).unwrap();
        assert_eq!(handle.wait(), Ok(true));
    }
}
