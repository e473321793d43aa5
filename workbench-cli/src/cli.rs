use clap::{Parser, ValueEnum};
use std::num::NonZeroUsize;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "workbench",
    version,
    about = "Let a language model solve tasks with MCP tools"
)]
pub struct Cli {
    /// Configuration file (defaults to config/workbench.toml)
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Extra system instructions placed before the tool protocol
    #[arg(long)]
    pub system: Option<String>,
    #[arg(long, short, value_enum, default_value_t = RunMode::Agent)]
    pub mode: RunMode,
    /// Read the task from a file instead of the command line
    #[arg(long)]
    pub prompt_file: Option<PathBuf>,
    /// Print the full run outcome as JSON
    #[arg(long)]
    pub json: bool,
    /// Override the configured step budget
    #[arg(long)]
    pub max_steps: Option<NonZeroUsize>,
    /// Override the configured model
    #[arg(long)]
    pub model: Option<String>,
    /// Override the configured provider id
    #[arg(long)]
    pub provider: Option<String>,
    /// Task for agent mode; stdin is read when omitted and not a terminal
    #[arg(trailing_var_arg = true)]
    pub task: Vec<String>,
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum RunMode {
    /// Run a single task and print the answer
    Agent,
    /// Interactive loop, one task per line; `q` quits
    Chat,
    /// Print the advertised tool catalogue
    Tools,
}

#[derive(Parser, Debug)]
#[command(
    name = "workbench-server",
    version,
    about = "Serve the built-in tools as an MCP server over stdio"
)]
pub struct ServerArgs {
    /// Configuration file whose [workspace] table is used
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Directory relative tool paths resolve against
    #[arg(long)]
    pub root: Option<PathBuf>,
    /// Directory name hidden from show_directory (repeatable)
    #[arg(long = "ignore", value_name = "NAME")]
    pub ignore: Vec<String>,
    /// Do not register run_shell_command
    #[arg(long)]
    pub no_shell: bool,
    /// Seconds a shell command may run
    #[arg(long, value_name = "SECS")]
    pub shell_timeout: Option<u64>,
}
