use std::fmt;

use anyhow::{ensure, Context, Result};

use crate::{Summary, Task, TaskMachine};

/// The work a stage has planned: where its results will land, and the tasks
/// that put them there. Nothing has been produced yet.
pub struct Prepared<O> {
    pub output: O,
    pub tasks: Vec<Task>,
}

/// One step of a pipeline.
///
/// `prepare` allocates the output location(s) and declares one task per
/// independent unit of work; `finalize` checks what the tasks produced.
pub trait Stage {
    /// Usually a `FileSet`, or a tuple of them.
    type Output;

    fn name(&self) -> &str;

    fn prepare(&self) -> Result<Prepared<Self::Output>>;

    fn finalize(&self, output: Self::Output) -> Result<Self::Output>;
}

/// Where an [`Action`] is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Constructed,
    Prepared,
    Executing,
    Completed,
    Failed,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Constructed => "constructed",
            Self::Prepared => "prepared",
            Self::Executing => "executing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Runs a [`Stage`]: prepare, execute every task through a [`TaskMachine`],
/// then finalize.
///
/// If a task fails, outputs of tasks that finished before it stay on disk and
/// only the failing task's outputs are removed, so running the same stage again
/// resumes where it stopped.
pub struct Action<S> {
    stage: S,
    phase: Phase,
    summary: Option<Summary>,
}

impl<S: Stage> Action<S> {
    pub fn new(stage: S) -> Self {
        Self {
            stage,
            phase: Phase::Constructed,
            summary: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// What the task run did, once tasks have been executed successfully.
    pub fn summary(&self) -> Option<Summary> {
        self.summary
    }

    /// Run the stage, queuing its tasks on `machine`, which must be empty.
    pub fn run(&mut self, machine: &mut TaskMachine) -> Result<S::Output> {
        let result = self.run_phases(machine);
        if result.is_err() {
            self.set_phase(Phase::Failed);
        }
        result
    }

    fn run_phases(&mut self, machine: &mut TaskMachine) -> Result<S::Output> {
        let name = self.stage.name().to_owned();
        ensure!(
            machine.is_empty(),
            "stage {name} needs an empty task machine, found {} queued task(s)",
            machine.len()
        );

        let Prepared { output, tasks } = self
            .stage
            .prepare()
            .with_context(|| format!("while preparing stage {name}"))?;
        self.set_phase(Phase::Prepared);
        log::debug!("stage {name} declared {} task(s)", tasks.len());

        self.set_phase(Phase::Executing);
        machine.extend(tasks);
        let summary = machine
            .run()
            .with_context(|| format!("while executing tasks of stage {name}"))?;
        self.summary = Some(summary);

        let output = self
            .stage
            .finalize(output)
            .with_context(|| format!("while finalizing stage {name}"))?;
        self.set_phase(Phase::Completed);
        Ok(output)
    }

    fn set_phase(&mut self, phase: Phase) {
        log::debug!("stage {}: {} -> {}", self.stage.name(), self.phase, phase);
        self.phase = phase;
    }
}
