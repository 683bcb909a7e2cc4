use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::Result;

use fileset::FileSet;
use tasks::{Prepared, Stage, Task};
use util::os_str_to_string;

use crate::shell::{self, CommandExecutionError};

use super::{addresses, describe};

/// An external program plus arguments, where `{input}`, `{output}`, `{case}`
/// and `{identifier}` in any argument are replaced for each task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandTemplate {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandTemplate {
    /// First word is the program, the rest are its arguments.
    pub fn from_words(words: &[String]) -> Option<Self> {
        let (program, args) = words.split_first()?;
        Some(Self {
            program: program.clone(),
            args: args.to_vec(),
        })
    }

    /// File name of the program, used to name the stage and its directory.
    pub fn name(&self) -> &str {
        Path::new(&self.program)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(self.program.as_str())
    }

    fn command(&self, vars: &Vars) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(self.args.iter().map(|arg| vars.substitute(arg)));
        cmd
    }
}

/// Values substituted into a `CommandTemplate`.
struct Vars {
    input: String,
    output: String,
    case: String,
    identifier: String,
}

impl Vars {
    fn substitute(&self, arg: &str) -> String {
        arg.replace("{input}", &self.input)
            .replace("{output}", &self.output)
            .replace("{case}", &self.case)
            .replace("{identifier}", &self.identifier)
    }
}

/// Runs an external command once per file of the input set, each run producing
/// the file of the same name in the output set.
pub struct CommandStage {
    input: FileSet,
    directory: PathBuf,
    template: CommandTemplate,
    /// copy the tool's stdout/stderr to ours while it runs
    echo: bool,
}

impl CommandStage {
    pub fn new<P: Into<PathBuf>>(
        input: FileSet,
        directory: P,
        template: CommandTemplate,
        echo: bool,
    ) -> Self {
        Self {
            input,
            directory: directory.into(),
            template,
            echo,
        }
    }
}

impl Stage for CommandStage {
    type Output = FileSet;

    fn name(&self) -> &str {
        self.template.name()
    }

    fn prepare(&self) -> Result<Prepared<FileSet>> {
        let output = FileSet::from_fileset(&self.directory, &self.input)?;

        let mut tasks = Vec::new();
        for (case, identifier) in addresses(&self.input) {
            let src = self.input.file(case, identifier)?;
            let dest = output.file(case, identifier)?;
            let vars = Vars {
                input: os_str_to_string(src.as_os_str())?,
                output: os_str_to_string(dest.as_os_str())?,
                case: case.unwrap_or_default().to_owned(),
                identifier: identifier.unwrap_or_default().to_owned(),
            };
            let (template, echo, expected) = (self.template.clone(), self.echo, dest.clone());
            tasks.push(Task::new(
                vec![src],
                vec![dest],
                move || run_tool(&template, &vars, &expected, echo),
                describe(self.template.name(), case, identifier),
            ));
        }

        Ok(Prepared { output, tasks })
    }

    fn finalize(&self, output: FileSet) -> Result<FileSet> {
        output.validate()?;
        Ok(output)
    }
}

fn run_tool(template: &CommandTemplate, vars: &Vars, expected: &Path, echo: bool) -> Result<()> {
    let mut cmd = template.command(vars);
    let output = shell::call(&mut cmd, echo)?;
    if !output.status.success() {
        return Err(CommandExecutionError::new(&output, "Command returned an error.").into());
    }
    if !expected.is_file() {
        return Err(CommandExecutionError::new(&output, "Output file not created.").into());
    }
    Ok(())
}
