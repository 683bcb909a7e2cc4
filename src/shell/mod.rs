//! Helpers for task bodies that shell out to external tools or copy files around.
//!
//! All of these signal failure by returning an error, never by leaving a
//! partial destination file behind for the caller to interpret.

use std::path::PathBuf;

/// Run a subprocess and capture its output
mod call;
pub use call::{call, CallOutput};

/// Copying files
mod ops;
pub use ops::{cp, scp};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("The source file \"{0}\" does not exist")]
    SourceMissing(PathBuf),
    #[error("The destination \"{0}\" already exists")]
    DestinationExists(PathBuf),
    #[error("The destination file \"{0}\" was not created")]
    NotCreated(PathBuf),
    #[error("Failed to run \"{cmd}\"")]
    Spawn {
        cmd: String,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// A command ran, but did not produce what was expected of it.
#[derive(Debug, thiserror::Error)]
#[error(
    "Running \"{cmd}\" did not produce the expected results: {info}\n\
     Return-code:\t{status}\n\
     Stdout:\n-------\n{stdout}\n-------\n\
     Stderr:\n-------\n{stderr}\n-------"
)]
pub struct CommandExecutionError {
    pub cmd: String,
    pub status: String,
    pub stdout: String,
    pub stderr: String,
    pub info: String,
}

impl CommandExecutionError {
    pub fn new(output: &CallOutput, info: &str) -> Self {
        Self {
            cmd: output.cmd.clone(),
            status: output.status.to_string(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            info: info.to_owned(),
        }
    }
}
