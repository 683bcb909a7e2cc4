use std::time::Duration;

use colored::Colorize;

use tasks::{Error, Reporter, Summary, TaskLabel};
use util::Timer;

use crate::settings::Settings;

/// All interactions with the text UI should go through this struct.
pub struct Ui {
    /// -v setting, displays extra text info to user
    pub verbose: bool,
    /// keeps track of time for each stage
    timer: Timer,
}

impl Ui {
    pub fn new(settings: &Settings) -> Self {
        Self {
            verbose: settings.verbose > 0,
            timer: Timer::now(),
        }
    }

    pub fn start_timer(&mut self) {
        if self.verbose {
            self.timer.reset();
        }
    }

    pub fn print_elapsed(&self, what: &str) {
        if self.verbose {
            self.timer.print_elapsed(what);
        }
    }

    pub fn verbose_msg(&self, msg: &str) {
        if self.verbose {
            eprintln!("{}", msg);
        }
    }

    pub fn verbose_progress_debug<T: std::fmt::Debug>(&self, msg: &str, arg: T) {
        if self.verbose {
            eprint!("{} {:?}... ", msg.magenta(), arg);
        }
    }

    pub fn done(&self) {
        if self.verbose {
            eprintln!("{}.", "done".green());
        }
    }

    /// A task reporter printing to the terminal in the same style.
    pub fn task_printer(&self) -> TaskPrinter {
        TaskPrinter {
            verbose: self.verbose,
        }
    }
}

/// Prints task lifecycle events as they happen.
pub struct TaskPrinter {
    verbose: bool,
}

impl Reporter for TaskPrinter {
    fn run_started(&self, ntasks: usize, workers: usize) {
        if self.verbose {
            eprintln!(
                "{} {ntasks} task(s) on {workers} worker(s).\n",
                "Running".magenta()
            );
        }
    }

    fn task_started(&self, task: &TaskLabel) {
        eprintln!("{} {task}", "RUN".green());
    }

    fn task_skipped(&self, task: &TaskLabel) {
        eprintln!(
            "{} {task}: target files already exist; skipping task",
            "SKIP".yellow()
        );
    }

    fn task_completed(&self, task: &TaskLabel, elapsed: Duration) {
        if self.verbose {
            eprintln!("{} {task} in {elapsed:?}", "COMPLETED".green());
        } else {
            eprintln!("{} {task}", "COMPLETED".green());
        }
    }

    fn task_failed(&self, err: &Error) {
        eprintln!("{} {err}", "FAILED".red());
    }

    fn run_finished(&self, summary: &Summary) {
        eprintln!(
            "\n{} ({} executed, {} skipped).",
            "Completed run".green(),
            summary.executed,
            summary.skipped
        );
    }
}
