//! Dependency-checked, idempotent execution of file-producing tasks.
//!
//! Every task declares the files it needs and the files it produces. Before a
//! task runs, its inputs must exist and its outputs must be either all present
//! (the task is skipped) or all absent (the task runs). A failing task has its
//! partial outputs removed, so re-running the same set of tasks resumes where
//! the last run stopped.

use std::fmt;
use std::path::PathBuf;

/// Task descriptors and the operation trait.
mod task;
pub use task::{Operation, Task};

/// The check/skip/rollback algorithm applied to every task.
mod check;
pub use check::Outcome;

/// Lifecycle events emitted while running tasks.
mod report;
pub use report::{LogReporter, Reporter};

/// Fixed-size pool of worker threads for parallel runs.
mod pool;

/// Task queue and run loop.
mod machine;
pub use machine::{Mode, Summary, TaskMachine};

/// Two-phase stage lifecycle around a task machine.
mod stage;
pub use stage::{Action, Phase, Prepared, Stage};

/// Identifies a task within one run, for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskLabel {
    /// 1-based position in registration order
    pub index: usize,
    /// number of tasks in the run
    pub total: usize,
    pub description: String,
}

impl fmt::Display for TaskLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Task {}/{} ({})", self.index, self.total, self.description)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{task}: Required input file(s) missing: {missing:?}")]
    MissingInput {
        task: TaskLabel,
        missing: Vec<PathBuf>,
    },
    #[error("{task}: Some output file(s) already exist: {existing:?}")]
    PartialOutput {
        task: TaskLabel,
        existing: Vec<PathBuf>,
    },
    #[error("{task}: Execution failed. Removed partial results. Reason signaled: {source}")]
    OperationFailed {
        task: TaskLabel,
        #[source]
        source: anyhow::Error,
    },
    #[error("{task}: Execution failed to create some output file(s): {missing:?}")]
    Incomplete {
        task: TaskLabel,
        missing: Vec<PathBuf>,
    },
    /// A worker panicked outside of a task body; panics inside one are
    /// reported as `OperationFailed`.
    #[error("A worker thread panicked")]
    WorkerPanicked,
}

impl Error {
    /// The task this error belongs to, if any.
    pub fn task(&self) -> Option<&TaskLabel> {
        match self {
            Self::MissingInput { task, .. }
            | Self::PartialOutput { task, .. }
            | Self::OperationFailed { task, .. }
            | Self::Incomplete { task, .. } => Some(task),
            Self::WorkerPanicked => None,
        }
    }
}
