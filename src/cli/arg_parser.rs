use clap::{Parser, Subcommand};
use std::path::PathBuf;

struct DefaultArgs;

impl DefaultArgs {
    pub const WORK_DIR: &'static str = ".fuzzcorpus-work";
}

/// Dynamic input corpus engine: scan seeds, run the coverage-ordered dynamic corpus, and manage
/// dictionaries and stack-hash blacklists.
#[derive(Clone, Parser)]
#[command(name = "fuzzcorpus")]
#[command(about = "Inspect and drive a coverage-guided fuzzer's input corpus.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbose output. Default: false.
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Emit a machine-readable JSON summary instead of log lines.
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Clone, Subcommand)]
pub enum Commands {
    /// Scan a seed directory and report file count / derived max input size.
    Scan {
        /// Seed directory to scan.
        #[arg(value_name = "DIR")]
        input_dir: PathBuf,

        /// Per-input size cap. 0 derives it from the largest seed found.
        #[arg(long, short = 'F', default_value = "0")]
        max_file_sz: usize,
    },

    /// Dry-run a seed directory into a dynamic corpus and report the resulting ordering.
    Replay {
        /// Seed directory to dry-run.
        #[arg(value_name = "DIR")]
        input_dir: PathBuf,

        /// Directory newly discovered coverage is written back into. Default: INPUT_DIR.
        #[arg(long, short = 'o')]
        output_dir: Option<PathBuf>,

        /// Scratch directory for worker buffers.
        #[arg(long, default_value = DefaultArgs::WORK_DIR)]
        work_dir: PathBuf,
    },

    /// Parse and validate a dictionary file.
    Dict {
        /// Dictionary file to parse.
        #[arg(value_name = "FILE")]
        path: PathBuf,
    },

    /// Parse and validate a stack-hash blacklist file.
    Blacklist {
        /// Blacklist file to parse.
        #[arg(value_name = "FILE")]
        path: PathBuf,
    },
}
