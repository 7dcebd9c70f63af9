use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "sqljudge",
    version,
    about = "Grades SQL SELECT submissions against sandboxed test cases"
)]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Command,

    /// log filter directive (e.g. warn, sqljudge_core=debug)
    #[arg(long, global = true, env = "SQLJUDGE_LOG", default_value = "warn")]
    pub log_level: String,

    /// log output: text|json
    #[arg(long, global = true, default_value = "text", value_parser = ["text", "json"])]
    pub log_format: String,
}

#[derive(Subcommand)]
pub enum Command {
    /// Grade a submission against one challenge
    Grade(GradeArgs),
    /// Run the static validator only
    Check(CheckArgs),
    /// Write a sample challenge file
    Init(InitArgs),
    Version,
}

/// Where the submitted SQL comes from. `--query-file -` reads stdin.
#[derive(Args, Clone)]
#[group(required = true, multiple = false)]
pub struct QuerySource {
    #[arg(long)]
    pub query: Option<String>,
    #[arg(long)]
    pub query_file: Option<PathBuf>,
}

#[derive(Parser, Clone)]
pub struct GradeArgs {
    #[arg(long, default_value = "challenges.json")]
    pub challenges: PathBuf,

    #[arg(long)]
    pub challenge: u32,

    #[command(flatten)]
    pub source: QuerySource,

    /// grading options (YAML)
    #[arg(long)]
    pub options: Option<PathBuf>,

    /// fail on unknown keys in the options file
    #[arg(long)]
    pub strict_options: bool,

    /// global row cap (only tightens the challenge's own cap)
    #[arg(long)]
    pub max_rows: Option<usize>,

    /// per-case time budget override, in milliseconds
    #[arg(long)]
    pub timeout_ms: Option<u64>,

    /// disable the subset fallback
    #[arg(long)]
    pub exact_only: bool,

    /// test cases executed concurrently
    #[arg(long)]
    pub parallel: Option<usize>,

    /// output: text|json
    #[arg(long, default_value = "text", value_parser = ["text", "json"])]
    pub format: String,

    /// also write the verdict as JSON to this file
    #[arg(long)]
    pub out: Option<PathBuf>,
}

#[derive(Parser, Clone)]
pub struct CheckArgs {
    #[command(flatten)]
    pub source: QuerySource,

    /// validator policy is read from the options file's `validator` section
    #[arg(long)]
    pub options: Option<PathBuf>,
}

#[derive(Parser, Clone)]
pub struct InitArgs {
    #[arg(long, default_value = "challenges.json")]
    pub out: PathBuf,
}
