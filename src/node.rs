//! The circuit data model: the tree interface embedders implement, plus a
//! ready-made reference implementation (`Circuit`) used by this crate's own
//! tests and doctests.

use std::fmt;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crate::cancel::CancelToken;
use crate::error::Cancelled;

/// The fixed space of operator kinds a circuit node can be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Leaf,
    Not,
    And,
    Or,
    If,
    Gt(usize),
    Lt(usize),
}

/// A node in a boolean circuit. Leaves expose a (possibly blocking) boolean
/// `read`; every other kind exposes an ordered list of children. Nodes are
/// immutable and shared read-only — `Arc<dyn Node>` is how a tree is handed
/// to [`crate::solver::CircuitSolver::solve`].
///
/// Implementors of a leaf only need to override [`Node::read`]; implementors
/// of an operator only need to override [`Node::kind`] and [`Node::children`].
/// `read` on an operator node, and `children` on a leaf node, are never
/// called by this crate.
pub trait Node: Send + Sync {
    fn kind(&self) -> Kind;

    fn children(&self) -> &[Arc<dyn Node>] {
        &[]
    }

    /// Reads a leaf's value. May block. Implementations that want to honor
    /// cancellation promptly should check `cancel.is_cancelled()` between
    /// chunks of blocking work, the way [`Circuit::leaf_after`] does.
    fn read(&self, _cancel: &CancelToken) -> Result<bool, Cancelled> {
        unreachable!("read() called on a non-leaf node")
    }
}

type LeafFn = Box<dyn Fn(&CancelToken) -> Result<bool, Cancelled> + Send + Sync>;

/// The crate's reference `Node` implementation.
///
/// `Not` and `If` store their (fixed-arity) children as arrays rather than
/// `Vec`s, so the constructors can't produce the wrong arity in the first
/// place; `And`/`Or`/`Gt`/`Lt` take any number of children.
pub enum Circuit {
    Leaf(LeafFn),
    Not([Arc<dyn Node>; 1]),
    And(Vec<Arc<dyn Node>>),
    Or(Vec<Arc<dyn Node>>),
    If([Arc<dyn Node>; 3]),
    Gt(usize, Vec<Arc<dyn Node>>),
    Lt(usize, Vec<Arc<dyn Node>>),
}

impl fmt::Debug for Circuit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Circuit").field("kind", &self.kind()).finish()
    }
}

impl Circuit {
    /// An immediately-ready leaf.
    pub fn leaf_value(value: bool) -> Arc<dyn Node> {
        Arc::new(Circuit::Leaf(Box::new(move |_cancel| Ok(value))))
    }

    /// A leaf that sleeps for `delay`, in short cancellation-checking
    /// increments, before yielding `value`. Used to simulate a slow leaf in
    /// short-circuit and cancellation tests without leaving the process
    /// blocked for the full delay once cancelled.
    pub fn leaf_after(delay: Duration, value: bool) -> Arc<dyn Node> {
        const STEP: Duration = Duration::from_millis(5);
        Arc::new(Circuit::Leaf(Box::new(move |cancel| {
            let deadline = Instant::now() + delay;
            while Instant::now() < deadline {
                if cancel.is_cancelled() {
                    return Err(Cancelled);
                }
                thread::sleep(STEP.min(deadline.saturating_duration_since(Instant::now())));
            }
            if cancel.is_cancelled() {
                return Err(Cancelled);
            }
            Ok(value)
        })))
    }

    /// A leaf backed by an arbitrary, cancellation-aware closure.
    pub fn leaf_fn(
        f: impl Fn(&CancelToken) -> Result<bool, Cancelled> + Send + Sync + 'static,
    ) -> Arc<dyn Node> {
        Arc::new(Circuit::Leaf(Box::new(f)))
    }

    pub fn not(child: Arc<dyn Node>) -> Arc<dyn Node> {
        Arc::new(Circuit::Not([child]))
    }

    pub fn and(children: Vec<Arc<dyn Node>>) -> Arc<dyn Node> {
        Arc::new(Circuit::And(children))
    }

    pub fn or(children: Vec<Arc<dyn Node>>) -> Arc<dyn Node> {
        Arc::new(Circuit::Or(children))
    }

    pub fn if_(cond: Arc<dyn Node>, then: Arc<dyn Node>, else_: Arc<dyn Node>) -> Arc<dyn Node> {
        Arc::new(Circuit::If([cond, then, else_]))
    }

    pub fn gt(k: usize, children: Vec<Arc<dyn Node>>) -> Arc<dyn Node> {
        Arc::new(Circuit::Gt(k, children))
    }

    pub fn lt(k: usize, children: Vec<Arc<dyn Node>>) -> Arc<dyn Node> {
        Arc::new(Circuit::Lt(k, children))
    }
}

impl Node for Circuit {
    fn kind(&self) -> Kind {
        match self {
            Circuit::Leaf(_) => Kind::Leaf,
            Circuit::Not(_) => Kind::Not,
            Circuit::And(_) => Kind::And,
            Circuit::Or(_) => Kind::Or,
            Circuit::If(_) => Kind::If,
            Circuit::Gt(k, _) => Kind::Gt(*k),
            Circuit::Lt(k, _) => Kind::Lt(*k),
        }
    }

    fn children(&self) -> &[Arc<dyn Node>] {
        match self {
            Circuit::Leaf(_) => &[],
            Circuit::Not(child) => child.as_slice(),
            Circuit::And(children) | Circuit::Or(children) => children.as_slice(),
            Circuit::If(children) => children.as_slice(),
            Circuit::Gt(_, children) | Circuit::Lt(_, children) => children.as_slice(),
        }
    }

    fn read(&self, cancel: &CancelToken) -> Result<bool, Cancelled> {
        match self {
            Circuit::Leaf(f) => f(cancel),
            _ => unreachable!("read() called on a non-leaf node"),
        }
    }
}
