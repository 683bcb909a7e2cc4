use std::path::PathBuf;

use anyhow::Result;

use fileset::FileSet;
use tasks::{Prepared, Stage, Task};

use crate::shell;

use super::{addresses, describe};

/// Copies an input file set into a new directory with the same structure.
pub struct CopyStage {
    input: FileSet,
    directory: PathBuf,
}

impl CopyStage {
    pub fn new<P: Into<PathBuf>>(input: FileSet, directory: P) -> Self {
        Self {
            input,
            directory: directory.into(),
        }
    }
}

impl Stage for CopyStage {
    type Output = FileSet;

    fn name(&self) -> &str {
        "copy"
    }

    fn prepare(&self) -> Result<Prepared<FileSet>> {
        let output = FileSet::from_fileset(&self.directory, &self.input)?;

        let mut tasks = Vec::new();
        for (case, identifier) in addresses(&self.input) {
            let src = self.input.file(case, identifier)?;
            let dest = output.file(case, identifier)?;
            let (s, d) = (src.clone(), dest.clone());
            tasks.push(Task::new(
                vec![src],
                vec![dest],
                move || Ok(shell::scp(&s, &d)?),
                describe("save-copy", case, identifier),
            ));
        }

        Ok(Prepared { output, tasks })
    }

    fn finalize(&self, output: FileSet) -> Result<FileSet> {
        output.validate()?;
        Ok(output)
    }
}
