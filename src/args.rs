use clap::Parser;

const CMD_NAME: &str = "nl";
const DEFAULT_OUTPUT: &str = "output";

/// Stores our command-line args format.
#[derive(Parser)]
#[command(name = CMD_NAME, version, about = None, long_about = None)]
pub struct Args {
    /// Directory holding the input file set
    #[arg(short, long, value_name = "DIR")]
    #[arg(env = "NEUROLESS_INPUT")]
    pub input: String,

    /// Working directory; each stage writes into a subdirectory of it
    #[arg(short, long, value_name = "DIR", default_value = DEFAULT_OUTPUT)]
    #[arg(env = "NEUROLESS_OUTPUT")]
    pub output: String,

    /// Colon-separated names for the (alphabetically ordered) files of each case
    #[arg(short, long, value_name = "SEQ1[:SEQ2...]")]
    pub sequences: String,

    /// Treat the sequence names as cases of a flat input directory
    #[arg(long)]
    pub cases: bool,

    /// Run tasks one at a time, in order
    #[arg(long)]
    pub sequential: bool,

    /// Number of worker threads (default: number of CPUs)
    #[arg(short, long, value_name = "N")]
    pub jobs: Option<usize>,

    /// Print additional info (repeat for more)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Command to run per file; {input}, {output}, {case} and {identifier}
    /// are substituted. Files are copied if no command is given.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true, value_name = "CMD")]
    pub command: Vec<String>,
}
