//! A parallel, cancellation-aware boolean circuit evaluator.
//!
//! A circuit is a rooted tree of logical operators (`NOT`, `AND`, `OR`,
//! `IF`, `GT(k)`, `LT(k)`) whose leaves yield booleans. [`CircuitSolver`]
//! evaluates a circuit by spawning one worker thread per node:
//! every operator evaluates its children concurrently and cancels the
//! siblings the moment its result is decidable — an `AND` with one `false`
//! child never waits for the rest, an `IF` cancels whichever branch it
//! didn't take, and so on.
//!
//! ```
//! use std::sync::Arc;
//! use shortcircuit::{CircuitSolver, Circuit};
//!
//! let solver = CircuitSolver::new();
//! let circuit = Circuit::and(vec![
//!     Circuit::leaf_value(true),
//!     Circuit::leaf_value(false),
//! ]);
//!
//! let handle = solver.solve(circuit).unwrap();
//! assert_eq!(handle.wait(), Ok(false));
//! ```
//!
//! Submissions are asynchronous: [`CircuitSolver::solve`] returns a
//! [`ValueHandle`] immediately, which any number of threads may
//! [`wait`](ValueHandle::wait) on, any number of times. [`CircuitSolver::stop`]
//! is a single, irreversible transition that cancels every in-flight root
//! and causes every outstanding (and every future) handle to resolve to
//! `Err(Cancelled)`.
//!
//! The circuit data model itself — what a node *is* — is the embedder's
//! concern, expressed as the [`Node`] trait; [`Circuit`] is this crate's
//! own reference implementation, used throughout its tests and doctests.

mod cancel;
mod channel;
mod config;
mod error;
mod handle;
mod node;
mod rules;
mod solver;
mod worker;

pub use config::{SolverConfig, SolverConfigBuilder};
pub use error::{Cancelled, Error};
pub use handle::ValueHandle;
pub use node::{Circuit, Kind, Node};
pub use solver::CircuitSolver;
