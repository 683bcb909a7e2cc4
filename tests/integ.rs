use anyhow::Result;
use neuroless::{App, Args, Settings};
use std::fs;
use std::path::Path;
use tempfile::tempdir;

const CASES: [&str; 3] = ["c01", "c02", "c03"];
const FILES: [&str; 2] = ["a_flair.nii.gz", "b_t1.nii.gz"];

fn basic_args(input: &Path, output: &Path) -> Args {
    Args {
        input: stringify(input),
        output: stringify(output),
        sequences: String::from("FLAIR:T1"),
        cases: false,
        sequential: false,
        jobs: Some(2),
        verbose: 1,
        command: Vec::with_capacity(0),
    }
}

fn stringify(path: &Path) -> String {
    path.to_str().unwrap().to_owned()
}

/// `<input>/<case>/<file>` for every case and file, each holding its own path.
fn nested_dataset(input: &Path) -> Result<()> {
    for case in CASES {
        fs::create_dir_all(input.join(case))?;
        for file in FILES {
            fs::write(input.join(case).join(file), format!("{case}/{file}"))?;
        }
    }
    Ok(())
}

fn run(args: Args) -> Result<fileset::FileSet> {
    simple_logging::log_to_stderr(log::LevelFilter::Trace);
    let settings: Settings = args.try_into()?;
    App::new(settings).run()
}

#[test]
fn copy_stage() -> Result<()> {
    let input = tempdir()?;
    let output = tempdir()?;
    nested_dataset(input.path())?;

    let copied = run(basic_args(input.path(), output.path()))?;
    assert_eq!(copied.directory(), output.path().join("copy"));
    assert_eq!(copied.identifiers(), Some(&["flair".to_owned(), "t1".to_owned()][..]));

    let t1 = copied.file(Some("c02"), Some("t1"))?;
    assert_eq!(t1, output.path().join("copy/c02/b_t1.nii.gz"));
    assert_eq!(fs::read_to_string(t1)?, "c02/b_t1.nii.gz");
    Ok(())
}

#[test]
fn rerun_leaves_results_untouched() -> Result<()> {
    let input = tempdir()?;
    let output = tempdir()?;
    nested_dataset(input.path())?;

    run(basic_args(input.path(), output.path()))?;
    let flair = output.path().join("copy/c01/a_flair.nii.gz");
    fs::write(&flair, "edited")?;

    let mut args = basic_args(input.path(), output.path());
    args.jobs = None;
    args.sequential = true;
    run(args)?;
    assert_eq!(fs::read_to_string(&flair)?, "edited", "existing output was skipped");
    Ok(())
}

#[test]
fn flat_cases() -> Result<()> {
    let input = tempdir()?;
    let output = tempdir()?;
    fs::write(input.path().join("x.nii"), "x")?;
    fs::write(input.path().join("y.nii"), "y")?;

    let mut args = basic_args(input.path(), output.path());
    args.sequences = String::from("p1:p2");
    args.cases = true;
    let copied = run(args)?;
    assert_eq!(copied.identifiers(), None);
    assert_eq!(fs::read_to_string(copied.file(Some("p2"), None)?)?, "y");
    Ok(())
}

#[test]
fn inconsistent_input_is_rejected() -> Result<()> {
    let input = tempdir()?;
    let output = tempdir()?;
    nested_dataset(input.path())?;
    fs::remove_file(input.path().join("c03").join(FILES[1]))?;

    let res = run(basic_args(input.path(), output.path()));
    assert!(res.is_err());
    assert!(!output.path().join("copy").exists());
    Ok(())
}

#[cfg(unix)]
#[test]
fn command_stage() -> Result<()> {
    let input = tempdir()?;
    let output = tempdir()?;
    nested_dataset(input.path())?;

    let mut args = basic_args(input.path(), output.path());
    args.command = ["cp", "{input}", "{output}"].map(String::from).to_vec();
    let result = run(args)?;

    assert_eq!(result.directory(), output.path().join("cp"));
    for file in result.files(None, None)? {
        assert!(file.is_file(), "{file:?} was produced");
    }
    Ok(())
}

#[cfg(unix)]
#[test]
fn failing_command_leaves_no_outputs() -> Result<()> {
    let input = tempdir()?;
    let output = tempdir()?;
    nested_dataset(input.path())?;

    let mut args = basic_args(input.path(), output.path());
    args.command = vec![String::from("false")];
    let err = run(args).unwrap_err();

    let task_err = err
        .chain()
        .find_map(|e| e.downcast_ref::<tasks::Error>())
        .expect("task error in chain");
    assert!(matches!(task_err, tasks::Error::OperationFailed { .. }));

    for case in CASES {
        let dir = output.path().join("false").join(case);
        assert_eq!(fs::read_dir(&dir)?.count(), 0, "{dir:?} is empty");
    }
    Ok(())
}
