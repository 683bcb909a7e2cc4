use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Sender};
use std::sync::Mutex;
use std::thread;

use crate::check::{execute, Outcome};
use crate::{Error, Reporter, Summary, Task, TaskLabel};

type Queue = Mutex<VecDeque<(TaskLabel, Task)>>;

/// Run `tasks` on `workers` threads.
///
/// Workers pull from a shared queue and send each result back to the
/// coordinating thread. After the first failure no new tasks are handed out;
/// tasks already running are allowed to finish. The first error received is
/// returned, later ones are only reported.
pub(crate) fn run(
    tasks: Vec<(TaskLabel, Task)>,
    workers: usize,
    reporter: &dyn Reporter,
) -> Result<Summary, Error> {
    let queue: Queue = Mutex::new(tasks.into());
    let abort = AtomicBool::new(false);
    let (result_tx, result_rx) = mpsc::channel();

    thread::scope(|s| {
        let (queue, abort) = (&queue, &abort);
        let handles: Vec<_> = (0..workers)
            .map(|_| {
                let results = result_tx.clone();
                s.spawn(move || worker(queue, abort, results, reporter))
            })
            .collect();
        // results channel closes once every worker is done:
        drop(result_tx);

        let mut summary = Summary::default();
        let mut first_err: Option<Error> = None;
        for result in result_rx {
            match result {
                Ok(outcome) => summary.record(outcome),
                Err(e) => {
                    abort.store(true, Ordering::SeqCst);
                    reporter.task_failed(&e);
                    if first_err.is_none() {
                        first_err = Some(e);
                    }
                }
            }
        }

        for handle in handles {
            if handle.join().is_err() {
                first_err.get_or_insert(Error::WorkerPanicked);
            }
        }

        match first_err {
            Some(e) => Err(e),
            None => Ok(summary),
        }
    })
}

fn worker(
    queue: &Queue,
    abort: &AtomicBool,
    results: Sender<Result<Outcome, Error>>,
    reporter: &dyn Reporter,
) {
    while !abort.load(Ordering::SeqCst) {
        let next = match queue.lock() {
            Ok(mut queue) => queue.pop_front(),
            Err(_) => None,
        };
        let Some((label, task)) = next else {
            break;
        };
        if results.send(execute(task, &label, reporter)).is_err() {
            break;
        }
    }
}
