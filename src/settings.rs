use std::path::PathBuf;

use anyhow::Result;

use fileset::Axis;
use tasks::Mode;

use crate::args::Args;
use crate::stages::CommandTemplate;

const SEQUENCE_DELIM: char = ':';

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Input directory \"{0}\" does not exist")]
    InputNotDirectory(String),
    #[error("No sequence names given")]
    NoSequences,
    #[error("--jobs can not be combined with --sequential")]
    JobsWithSequential,
    #[error("--jobs must be at least 1")]
    ZeroJobs,
}

/// Settings are like Args, except all the logic has
/// been applied so e.g. defaults are added in.
#[derive(Debug)]
pub struct Settings {
    pub input: PathBuf,
    pub output: PathBuf,
    /// names mapped onto the files of the input set
    pub sequence: Vec<String>,
    /// which axis `sequence` names
    pub axis: Axis,
    pub mode: Mode,
    pub verbose: u8,
    /// `None` means copy
    pub command: Option<CommandTemplate>,
}

impl TryFrom<Args> for Settings {
    type Error = anyhow::Error;
    fn try_from(args: Args) -> Result<Self, Self::Error> {
        let input = PathBuf::from(&args.input);
        if !input.is_dir() {
            return Err(Error::InputNotDirectory(args.input).into());
        }

        let sequence: Vec<String> = args
            .sequences
            .split(SEQUENCE_DELIM)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase)
            .collect();
        if sequence.is_empty() {
            return Err(Error::NoSequences.into());
        }

        let axis = if args.cases {
            Axis::Cases
        } else {
            Axis::Identifiers
        };

        let mode = match (args.sequential, args.jobs) {
            (true, Some(_)) => return Err(Error::JobsWithSequential.into()),
            (_, Some(0)) => return Err(Error::ZeroJobs.into()),
            (true, None) => Mode::Sequential,
            (false, workers) => Mode::Parallel { workers },
        };

        Ok(Self {
            input,
            output: PathBuf::from(&args.output),
            sequence,
            axis,
            mode,
            verbose: args.verbose,
            command: CommandTemplate::from_words(&args.command),
        })
    }
}
