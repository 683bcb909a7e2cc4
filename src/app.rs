use std::sync::Arc;

use anyhow::{Context, Result};
use colored::Colorize;

use fileset::FileSet;
use tasks::{Action, Stage, TaskMachine};

use crate::settings::Settings;
use crate::stages::{CommandStage, CopyStage};
use crate::ui::Ui;

/// This struct actually runs the command-line app.
pub struct App {
    /// Interpreted command line settings
    settings: Settings,
    /// User interface
    ui: Ui,
}

impl App {
    /// Create a new `App`.
    pub fn new(settings: Settings) -> Self {
        let ui = Ui::new(&settings);
        Self { settings, ui }
    }

    /// Load the input set, run the configured stage over it,
    /// and return the stage's output set.
    pub fn run(mut self) -> Result<FileSet> {
        if self.ui.verbose {
            eprintln!("Using working directory {:?}", self.settings.output);
        }

        let input = self.load_input()?;

        let output = match self.settings.command.clone() {
            Some(template) => {
                let dir = self.settings.output.join(template.name());
                let stage = CommandStage::new(input, dir, template, self.settings.verbose > 1);
                self.run_stage(stage)?
            }
            None => {
                let dir = self.settings.output.join("copy");
                self.run_stage(CopyStage::new(input, dir))?
            }
        };

        eprintln!(
            "{} {:?}\n",
            "Results written to".green(),
            output.directory()
        );
        Ok(output)
    }

    fn load_input(&self) -> Result<FileSet> {
        self.ui
            .verbose_progress_debug("Reading input file set", &self.settings.input);
        let input = FileSet::from_directory(
            &self.settings.input,
            self.settings.sequence.clone(),
            self.settings.axis,
        )
        .with_context(|| format!("while reading input directory {:?}", self.settings.input))?;
        self.ui.done();

        if self.ui.verbose {
            eprintln!(
                "Found {} {} file set with {} file(s).",
                input.topology(),
                input.source(),
                input.files(None, None)?.len()
            );
        }
        Ok(input)
    }

    fn run_stage<S: Stage<Output = FileSet>>(&mut self, stage: S) -> Result<FileSet> {
        let name = stage.name().to_owned();
        eprintln!("{} {}\n", "Starting stage".magenta(), name.cyan());
        self.ui.start_timer();

        let mut machine =
            TaskMachine::new(self.settings.mode).with_reporter(Arc::new(self.ui.task_printer()));
        let mut action = Action::new(stage);
        let output = action
            .run(&mut machine)
            .with_context(|| format!("while running stage {name}"))?;

        self.ui.print_elapsed(&format!("Stage {name}"));
        self.ui.verbose_msg("Output file set validated.");
        Ok(output)
    }
}
