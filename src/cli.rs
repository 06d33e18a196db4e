use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
pub struct Cli {
    #[clap(long, global = true, value_parser, default_value_t = false)]
    pub verbose: bool,

    #[clap(long, global = true, value_parser)]
    pub log: Option<PathBuf>,

    #[clap(long, global = true, value_parser)]
    pub config: Option<PathBuf>,

    /// Print collected metrics to stderr on exit
    #[clap(long, global = true, value_parser, default_value_t = false)]
    pub metrics: bool,

    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Search file contents with a case-insensitive regex
    Search {
        pattern: String,

        /// File or directory to search; defaults to the working directory
        path: Option<String>,

        /// Comma-separated globs, e.g. "*.rs,src/**/*.toml"
        #[clap(short, long, value_parser)]
        include: Option<String>,

        #[clap(long, value_parser, default_value_t = false)]
        json: bool,
    },
    /// List the immediate children of a directory
    List {
        #[clap(default_value = ".")]
        path: PathBuf,

        #[clap(long, value_parser, default_value_t = false)]
        json: bool,
    },
    /// Answer newline-delimited JSON requests on stdin
    Stdio,
    /// Generate shell completions
    Completions {
        #[clap(value_enum)]
        shell: Shell,
    },
}
