//! fuzzcorpus: dynamic input corpus engine for coverage-guided fuzzers.
//!
//! Ties together a seed directory [`scanner`], a coverage-ordered [`corpus`], per-worker
//! [`buffer`]s, and content-addressed [`persist`]ence into the same corpus-management machinery a
//! coverage-guided fuzzer's worker loop drives once per test case.

pub mod blacklist;
pub mod buffer;
pub mod cli;
pub mod corpus;
pub mod dict;
pub mod error;
pub mod persist;
pub mod scanner;
pub mod types;
pub mod utils;

pub use corpus::DynamicCorpus;
pub use error::CorpusError;
pub use scanner::SeedScanner;
pub use types::{CovTuple, DynInput, GlobalConfig, Phase, PersistTargets, WorkerState};

use std::path::Path;

/// Open a corpus engine rooted at `config.input_dir`: this both opens the seed scanner (failing
/// if the directory can't be read) and hands back a fresh, empty [`DynamicCorpus`] for the
/// dry-run phase to populate. Mirrors the source's `input_init` + corpus-allocation pairing.
pub fn open_corpus(config: &GlobalConfig) -> anyhow::Result<(SeedScanner, DynamicCorpus)> {
    let scanner = SeedScanner::new(&config.input_dir)?;
    Ok((scanner, DynamicCorpus::new()))
}

/// Convenience wrapper around [`GlobalConfig::new`] that also derives `max_input_sz` from the
/// directory's current contents, the way `Init` immediately followed by `GetDirStatsAndRewind`
/// does in the source.
pub fn configure(
    input_dir: impl AsRef<Path>,
    work_dir: impl AsRef<Path>,
) -> anyhow::Result<(GlobalConfig, SeedScanner)> {
    let config = GlobalConfig::new(input_dir.as_ref(), work_dir.as_ref());
    let scanner = SeedScanner::new(&config.input_dir)?;
    let mut config = config;
    config.max_input_sz = scanner.max_input_sz();
    Ok((config, scanner))
}
