//! Error types for circuit construction and evaluation.

/// The computation did not produce a value: the solver was stopped, or a
/// parent decided the value was irrelevant and cancelled the subtree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("circuit evaluation was cancelled")]
pub struct Cancelled;

/// Errors raised while constructing or submitting a circuit.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An `If` node must have exactly 3 children (condition, then, else).
    #[error("If node must have exactly 3 children, found {0}")]
    InvalidIfArity(usize),

    /// A [`crate::handle::ValueHandle`] was published to after it already
    /// left the `pending` state. This can only happen if a second writer is
    /// layered on top of the handle outside this crate's own worker/solver
    /// machinery — no path inside this crate can trigger it.
    #[error("value handle was published to more than once")]
    DoublePublish,
}
