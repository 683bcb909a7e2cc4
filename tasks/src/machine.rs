use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;

use crate::check::{execute, Outcome};
use crate::{pool, Error, LogReporter, Reporter, Task, TaskLabel};

/// How a [`TaskMachine`] drains its queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// One task at a time, in registration order; the first failure aborts the run.
    Sequential,
    /// A fixed pool of worker threads (default: one per logical CPU).
    /// Tasks must be independent of each other and write disjoint outputs.
    Parallel { workers: Option<usize> },
}

impl Default for Mode {
    fn default() -> Self {
        Self::Parallel { workers: None }
    }
}

/// Counts of what a successful run did.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub executed: usize,
    pub skipped: usize,
}

impl Summary {
    pub(crate) fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Executed => self.executed += 1,
            Outcome::Skipped => self.skipped += 1,
        }
    }
}

/// Accumulates declared tasks and executes them.
///
/// `register` is pure bookkeeping; nothing touches the filesystem until `run`,
/// since inputs may be produced by an earlier run. `run` takes the whole queue:
/// afterwards the queue is empty, whether or not the run succeeded.
pub struct TaskMachine {
    tasks: Vec<Task>,
    mode: Mode,
    reporter: Arc<dyn Reporter>,
}

impl TaskMachine {
    pub fn new(mode: Mode) -> Self {
        Self {
            tasks: Vec::with_capacity(16),
            mode,
            reporter: Arc::new(LogReporter),
        }
    }

    pub fn sequential() -> Self {
        Self::new(Mode::Sequential)
    }

    pub fn parallel() -> Self {
        Self::new(Mode::default())
    }

    /// Replace the default `LogReporter`.
    pub fn with_reporter(mut self, reporter: Arc<dyn Reporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// Queue a task producing `outputs` from `inputs` by running `operation`.
    pub fn register<F, S>(
        &mut self,
        inputs: Vec<PathBuf>,
        outputs: Vec<PathBuf>,
        operation: F,
        description: S,
    ) where
        F: FnOnce() -> Result<()> + Send + 'static,
        S: Into<String>,
    {
        self.tasks
            .push(Task::new(inputs, outputs, operation, description));
    }

    /// Queue an already-built task.
    pub fn push(&mut self, task: Task) {
        self.tasks.push(task);
    }

    pub fn extend<I: IntoIterator<Item = Task>>(&mut self, tasks: I) {
        self.tasks.extend(tasks);
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Execute every queued task, then leave the queue empty.
    pub fn run(&mut self) -> Result<Summary, Error> {
        let tasks = std::mem::take(&mut self.tasks);
        let total = tasks.len();
        let labelled: Vec<(TaskLabel, Task)> = tasks
            .into_iter()
            .enumerate()
            .map(|(i, task)| {
                let label = TaskLabel {
                    index: i + 1,
                    total,
                    description: task.description.clone(),
                };
                (label, task)
            })
            .collect();

        let reporter = &*self.reporter;
        let summary = match self.mode {
            Mode::Sequential => {
                reporter.run_started(total, 1);
                run_sequential(labelled, reporter)?
            }
            Mode::Parallel { workers } => {
                let workers = workers.unwrap_or_else(num_cpus::get).clamp(1, total.max(1));
                reporter.run_started(total, workers);
                pool::run(labelled, workers, reporter)?
            }
        };
        reporter.run_finished(&summary);
        Ok(summary)
    }
}

impl Default for TaskMachine {
    fn default() -> Self {
        Self::parallel()
    }
}

fn run_sequential(tasks: Vec<(TaskLabel, Task)>, reporter: &dyn Reporter) -> Result<Summary, Error> {
    let mut summary = Summary::default();
    for (label, task) in tasks {
        match execute(task, &label, reporter) {
            Ok(outcome) => summary.record(outcome),
            Err(e) => {
                reporter.task_failed(&e);
                return Err(e);
            }
        }
    }
    Ok(summary)
}
