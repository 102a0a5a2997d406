//! Solver configuration: worker thread naming and stack size.

/// Configuration for a [`crate::solver::CircuitSolver`]'s worker threads.
#[derive(Debug, Clone)]
pub struct SolverConfig {
    /// Prefix used to name worker threads, e.g. `"circuit-root"` and
    /// `"circuit-child-2"` for the default `"circuit"` prefix. Useful for
    /// telling threads from different solvers apart in a debugger or
    /// `tracing` output.
    pub thread_name_prefix: String,
    /// Stack size for worker threads, in bytes. `None` uses the platform
    /// default.
    pub worker_stack_size: Option<usize>,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            thread_name_prefix: "circuit".to_string(),
            worker_stack_size: None,
        }
    }
}

impl SolverConfig {
    pub fn builder() -> SolverConfigBuilder {
        SolverConfigBuilder::default()
    }
}

/// Builder for [`SolverConfig`].
#[derive(Debug, Default)]
pub struct SolverConfigBuilder {
    config: SolverConfig,
}

impl SolverConfigBuilder {
    pub fn thread_name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.thread_name_prefix = prefix.into();
        self
    }

    pub fn worker_stack_size(mut self, bytes: usize) -> Self {
        self.config.worker_stack_size = Some(bytes);
        self
    }

    pub fn build(self) -> SolverConfig {
        self.config
    }
}
