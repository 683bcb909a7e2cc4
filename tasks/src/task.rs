use std::fmt;
use std::path::PathBuf;

use anyhow::Result;

/// The body of a task.
///
/// An operation receives everything it needs up front (already-resolved paths
/// and parameters captured by value), runs once, and signals failure by
/// returning an error rather than by leaving partial or sentinel files behind.
pub trait Operation: Send {
    fn execute(self: Box<Self>) -> Result<()>;
}

impl<F> Operation for F
where
    F: FnOnce() -> Result<()> + Send,
{
    fn execute(self: Box<Self>) -> Result<()> {
        (*self)()
    }
}

/// One declared unit of file-producing work.
pub struct Task {
    /// Files that must exist before the operation runs.
    pub inputs: Vec<PathBuf>,
    /// Files that must all exist once the operation has run.
    pub outputs: Vec<PathBuf>,
    pub operation: Box<dyn Operation>,
    /// Operator-facing only; never parsed.
    pub description: String,
}

impl Task {
    pub fn new<F, S>(inputs: Vec<PathBuf>, outputs: Vec<PathBuf>, operation: F, description: S) -> Self
    where
        F: FnOnce() -> Result<()> + Send + 'static,
        S: Into<String>,
    {
        Self {
            inputs,
            outputs,
            operation: Box::new(operation),
            description: description.into(),
        }
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("inputs", &self.inputs)
            .field("outputs", &self.outputs)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}
