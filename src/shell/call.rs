use std::io::{stderr, Read, Write};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;

use super::Error;

/// Everything a finished subprocess left behind.
#[derive(Debug)]
pub struct CallOutput {
    /// The command line, for diagnostics
    pub cmd: String,
    pub status: ExitStatus,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

/// Run `cmd` to completion, capturing stdout and stderr.
/// If `echo` is set, both streams are also copied to our stderr as they arrive.
pub fn call(cmd: &mut Command, echo: bool) -> Result<CallOutput, Error> {
    let cmd_str = command_line(cmd);
    log::debug!("running {cmd_str}");

    let mut child = cmd
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|source| Error::Spawn {
            cmd: cmd_str.clone(),
            source,
        })?;

    // both pipes are present since we just requested them:
    let child_out = child.stdout.take();
    let child_err = child.stderr.take();

    let thread_out = thread::spawn(move || communicate(child_out, echo));
    let thread_err = thread::spawn(move || communicate(child_err, echo));

    let stdout = join(thread_out);
    let stderr = join(thread_err);
    finish(&mut child, cmd_str, stdout, stderr)
}

/// Reap `child`, even if reading its output failed.
fn finish(
    child: &mut Child,
    cmd: String,
    stdout: Result<Vec<u8>, Error>,
    stderr: Result<Vec<u8>, Error>,
) -> Result<CallOutput, Error> {
    let status = child.wait()?;
    log::debug!("{cmd} finished with {status}");

    Ok(CallOutput {
        cmd,
        status,
        stdout: stdout?,
        stderr: stderr?,
    })
}

fn communicate<R: Read>(stream: Option<R>, echo: bool) -> std::io::Result<Vec<u8>> {
    let mut captured = Vec::with_capacity(1024);
    let Some(mut stream) = stream else {
        return Ok(captured);
    };
    let mut buf = [0u8; 1024];
    loop {
        let num_read = stream.read(&mut buf)?;
        if num_read == 0 {
            break;
        }

        let buf = &buf[..num_read];
        captured.extend_from_slice(buf);
        if echo {
            stderr().write_all(buf)?;
        }
    }

    Ok(captured)
}

fn join(handle: thread::JoinHandle<std::io::Result<Vec<u8>>>) -> Result<Vec<u8>, Error> {
    match handle.join() {
        Ok(captured) => Ok(captured?),
        Err(_) => Err(Error::Io(std::io::Error::new(
            std::io::ErrorKind::Other,
            "thread reading subprocess output panicked",
        ))),
    }
}

fn command_line(cmd: &Command) -> String {
    let mut s = cmd.get_program().to_string_lossy().into_owned();
    for arg in cmd.get_args() {
        s.push(' ');
        s.push_str(&arg.to_string_lossy());
    }
    s
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use anyhow::Result;

    #[test]
    fn test_call_captures_output() -> Result<()> {
        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg("echo out; echo err >&2; exit 3");
        let output = call(&mut cmd, false)?;

        assert_eq!(output.stdout, b"out\n");
        assert_eq!(output.stderr, b"err\n");
        assert_eq!(output.status.code(), Some(3));
        assert_eq!(output.cmd, "sh -c echo out; echo err >&2; exit 3");
        Ok(())
    }

    #[test]
    fn test_child_reaped_when_reading_fails() -> Result<()> {
        let mut child = Command::new("sleep").arg("0.2").spawn()?;
        let failed = Err(Error::Io(std::io::Error::new(
            std::io::ErrorKind::Other,
            "read failed",
        )));

        let res = finish(&mut child, "sleep 0.2".into(), failed, Ok(Vec::new()));
        assert!(matches!(res, Err(Error::Io(_))));
        // already exited and reaped, not still running:
        assert!(child.try_wait()?.is_some());
        Ok(())
    }

    #[test]
    fn test_call_missing_program() {
        let mut cmd = Command::new("/definitely/not/a/program");
        assert!(matches!(call(&mut cmd, false), Err(Error::Spawn { .. })));
    }
}
