use std::time::Duration;

use crate::{Error, Summary, TaskLabel};

/// Receives lifecycle events from a [`TaskMachine`](crate::TaskMachine) run.
///
/// Shared between worker threads, so events from a parallel run may arrive
/// interleaved. All methods default to doing nothing.
pub trait Reporter: Send + Sync {
    fn run_started(&self, _ntasks: usize, _workers: usize) {}
    fn task_started(&self, _task: &TaskLabel) {}
    /// All outputs already existed; the operation was not invoked.
    fn task_skipped(&self, _task: &TaskLabel) {}
    fn task_completed(&self, _task: &TaskLabel, _elapsed: Duration) {}
    fn task_failed(&self, _err: &Error) {}
    fn run_finished(&self, _summary: &Summary) {}
}

/// Forwards events to the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogReporter;

impl Reporter for LogReporter {
    fn run_started(&self, ntasks: usize, workers: usize) {
        log::info!("running {ntasks} task(s) on {workers} worker(s)");
    }

    fn task_started(&self, task: &TaskLabel) {
        log::info!("{task}: running");
    }

    fn task_skipped(&self, task: &TaskLabel) {
        log::warn!("{task}: target files already exist; skipping task");
    }

    fn task_completed(&self, task: &TaskLabel, elapsed: Duration) {
        log::info!("{task}: completed in {elapsed:?}");
    }

    fn task_failed(&self, err: &Error) {
        log::error!("{err}");
    }

    fn run_finished(&self, summary: &Summary) {
        log::info!(
            "run finished: {} executed, {} skipped",
            summary.executed,
            summary.skipped
        );
    }
}
