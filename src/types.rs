//! Public and internal types for the corpus engine (§3).

use std::path::PathBuf;

/// Coverage tuple: four unsigned metrics ordered by significance, index 0 dominates.
pub type CovTuple = [u64; 4];

/// Which phase the surrounding fuzzer is in. Owned by the caller (`fuzz_getState` in the
/// source); this crate only ever receives it as a parameter, it never tracks phase itself.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Initial replay of seed inputs; insertions are kept strictly coverage-ordered.
    DryRun,
    /// Steady-state fuzzing; new discoveries jump to the head of the queue.
    Main,
}

/// A single entry in the dynamic corpus.
///
/// Invariants (enforced by [`crate::corpus::DynamicCorpus`], not by this struct alone):
/// `idx` unique and in `1..=count` after a renumeration, `tested < test_quota(idx, count)`
/// outside the selection critical section.
#[derive(Clone, Debug)]
pub struct DynInput {
    pub data: Vec<u8>,
    pub cov: CovTuple,
    /// Logical rank assigned by the last renumeration; higher is better.
    pub idx: usize,
    /// Selections served from this entry since the cursor last advanced.
    pub tested: usize,
    /// Provenance: source filename, or a synthetic tag such as `[EXTERNAL]`.
    pub path: String,
}

impl DynInput {
    pub fn new(data: Vec<u8>, cov: CovTuple, path: impl Into<String>) -> Self {
        Self {
            data,
            cov,
            idx: 0,
            tested: 0,
            path: path.into(),
        }
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }
}

/// Where (and whether) to mirror newly discovered inputs to disk, passed into
/// [`crate::corpus::DynamicCorpus::add`]. Pass `None` there to reproduce the source's
/// socket-fuzzer / minimize-mode skip ("side-effects... skipped in minimization mode or in
/// socket-fuzzer mode").
#[derive(Clone, Debug)]
pub struct PersistTargets {
    /// `outputDir ?? inputDir` in the source.
    pub out_dir: PathBuf,
    /// Only written to in the main phase, when configured.
    pub cov_dir_new: Option<PathBuf>,
}

/// Global, process-wide configuration shared by the scanner, corpus, and per-worker buffers.
#[derive(Clone, Debug)]
pub struct GlobalConfig {
    pub input_dir: PathBuf,
    pub output_dir: Option<PathBuf>,
    pub cov_dir_new: Option<PathBuf>,
    /// Per-seed cap (`-F`); zero means "derive from observed data" (§4.1).
    pub max_file_sz: usize,
    /// Absolute ceiling, clamped into `[INPUT_DEFAULT_SIZE, INPUT_MAX_SIZE]` by `stat_and_rewind`
    /// unless `max_file_sz` overrides it.
    pub max_input_sz: usize,
    /// Scratch directory for per-worker tempfiles (§6).
    pub work_dir: PathBuf,
}

impl GlobalConfig {
    pub fn new(input_dir: impl Into<PathBuf>, work_dir: impl Into<PathBuf>) -> Self {
        Self {
            input_dir: input_dir.into(),
            output_dir: None,
            cov_dir_new: None,
            max_file_sz: 0,
            max_input_sz: crate::utils::config::INPUT_DEFAULT_SIZE,
            work_dir: work_dir.into(),
        }
    }

    /// Resolve the persistence target implied by this config ("outputDir ?? inputDir", plus the
    /// optional cov-dir-new). Callers in minimize/socket-fuzzer mode simply don't call this.
    pub fn persist_targets(&self) -> PersistTargets {
        PersistTargets {
            out_dir: self
                .output_dir
                .clone()
                .unwrap_or_else(|| self.input_dir.clone()),
            cov_dir_new: self.cov_dir_new.clone(),
        }
    }
}

/// Per-worker scratch state (`run_t` in the source). Only the fields this crate's operations
/// touch are modeled; process/runtime-wide fields (pid, timers, ...) belong to the surrounding
/// fuzzer and are out of scope.
#[derive(Default)]
pub struct WorkerState {
    pub orig_file_name: String,
    /// Dry-run ramp-up flag: "try a larger prefix of the same static file next time".
    pub static_file_try_more: bool,
}
