use std::any::Any;
use std::fs;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};

use util::Timer;

use crate::{Error, Operation, Reporter, Task, TaskLabel};

/// What happened to a task that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The operation ran and produced all outputs.
    Executed,
    /// All outputs already existed; the operation was not invoked.
    Skipped,
}

/// Run one task under the check/skip/rollback rules:
///
/// 1. every input must exist, otherwise the operation is never invoked;
/// 2. if every output exists the task is skipped, if only some exist it fails;
/// 3. if the operation fails, any outputs it left behind are removed;
/// 4. after the operation, every output must exist.
///
/// A task never leaves a mix of present and absent outputs behind.
pub(crate) fn execute(task: Task, label: &TaskLabel, reporter: &dyn Reporter) -> Result<Outcome, Error> {
    let Task {
        inputs,
        outputs,
        operation,
        ..
    } = task;

    let missing = missing_files(&inputs);
    if !missing.is_empty() {
        return Err(Error::MissingInput {
            task: label.clone(),
            missing,
        });
    }

    let existing: Vec<PathBuf> = outputs.iter().filter(|p| p.is_file()).cloned().collect();
    if existing.len() == outputs.len() {
        reporter.task_skipped(label);
        return Ok(Outcome::Skipped);
    } else if !existing.is_empty() {
        return Err(Error::PartialOutput {
            task: label.clone(),
            existing,
        });
    }

    reporter.task_started(label);
    let timer = Timer::now();
    if let Err(source) = run_operation(operation) {
        remove_partial(&outputs);
        return Err(Error::OperationFailed {
            task: label.clone(),
            source,
        });
    }

    let missing = missing_files(&outputs);
    if !missing.is_empty() {
        remove_partial(&outputs);
        return Err(Error::Incomplete {
            task: label.clone(),
            missing,
        });
    }

    reporter.task_completed(label, timer.elapsed());
    Ok(Outcome::Executed)
}

/// Run the body, turning a panic into an error so it is rolled back like one.
fn run_operation(operation: Box<dyn Operation>) -> anyhow::Result<()> {
    match panic::catch_unwind(AssertUnwindSafe(move || operation.execute())) {
        Ok(result) => result,
        Err(payload) => Err(anyhow::anyhow!("panicked: {}", panic_message(&*payload))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        *s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "unknown panic payload"
    }
}

fn missing_files(files: &[PathBuf]) -> Vec<PathBuf> {
    files.iter().filter(|p| !p.is_file()).cloned().collect()
}

/// Best-effort removal; failures are logged and otherwise ignored.
fn remove_partial(files: &[PathBuf]) {
    for file in files.iter().map(PathBuf::as_path).filter(|p| p.is_file()) {
        remove_file(file);
    }
}

fn remove_file(file: &Path) {
    match fs::remove_file(file) {
        Ok(()) => log::debug!("removed partial output {file:?}"),
        Err(e) => log::debug!("could not remove partial output {file:?}: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LogReporter;
    use anyhow::{bail, Result};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tempfile::tempdir;

    fn label() -> TaskLabel {
        TaskLabel {
            index: 1,
            total: 1,
            description: "test".into(),
        }
    }

    #[test]
    fn test_rollback_on_failure() -> Result<()> {
        let dir = tempdir()?;
        let a = dir.path().join("a.txt");
        let b = dir.path().join("b.txt");

        let a_op = a.clone();
        let task = Task::new(
            vec![],
            vec![a.clone(), b.clone()],
            move || {
                fs::write(&a_op, "a")?;
                bail!("failed before writing b");
            },
            "write a then fail",
        );

        let err = execute(task, &label(), &LogReporter).unwrap_err();
        assert!(matches!(err, Error::OperationFailed { .. }));
        assert!(err.to_string().contains("failed before writing b"));
        assert!(!a.exists());
        assert!(!b.exists());
        Ok(())
    }

    #[test]
    fn test_rollback_on_panic() -> Result<()> {
        let dir = tempdir()?;
        let a = dir.path().join("a.txt");
        let b = dir.path().join("b.txt");

        let a_op = a.clone();
        let task = Task::new(
            vec![],
            vec![a.clone(), b.clone()],
            move || {
                fs::write(&a_op, "a")?;
                let values: Vec<u8> = Vec::new();
                fs::write(&a_op, [values[0]])?;
                Ok(())
            },
            "write a then panic",
        );

        let err = execute(task, &label(), &LogReporter).unwrap_err();
        assert!(matches!(err, Error::OperationFailed { .. }));
        assert!(err.to_string().starts_with("Task 1/1 (test)"));
        assert!(err.to_string().contains("panicked"));
        assert!(!a.exists());

        // nothing left behind, so the same task can run again:
        let a_op = a.clone();
        let b_op = b.clone();
        let task = Task::new(
            vec![],
            vec![a.clone(), b.clone()],
            move || {
                fs::write(&a_op, "a")?;
                fs::write(&b_op, "b")?;
                Ok(())
            },
            "write a and b",
        );
        assert_eq!(execute(task, &label(), &LogReporter)?, Outcome::Executed);
        Ok(())
    }

    #[test]
    fn test_incomplete_outputs() -> Result<()> {
        let dir = tempdir()?;
        let a = dir.path().join("a.txt");
        let b = dir.path().join("b.txt");

        let a_op = a.clone();
        let task = Task::new(
            vec![],
            vec![a.clone(), b.clone()],
            move || {
                fs::write(&a_op, "a")?;
                Ok(())
            },
            "forgets b",
        );

        match execute(task, &label(), &LogReporter) {
            Err(Error::Incomplete { missing, .. }) => assert_eq!(missing, vec![b]),
            other => panic!("unexpected result {other:?}"),
        }
        assert!(!a.exists(), "no mixed state is left behind");
        Ok(())
    }

    #[test]
    fn test_missing_input_never_invokes() -> Result<()> {
        let dir = tempdir()?;
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let task = Task::new(
            vec![dir.path().join("absent")],
            vec![dir.path().join("out")],
            move || {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            },
            "needs absent",
        );

        let err = execute(task, &label(), &LogReporter).unwrap_err();
        assert!(matches!(err, Error::MissingInput { .. }));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        Ok(())
    }
}
