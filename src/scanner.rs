//! Seed directory scanner (§4.1): serves the dry-run phase a stream of static seed files, and
//! hosts the handful of static-file/external-file operations that only make sense while walking
//! that directory.

use crate::buffer::WorkerBuffer;
use crate::error::CorpusError;
use crate::types::WorkerState;
use crate::utils::config::{INPUT_DEFAULT_SIZE, INPUT_MAX_SIZE, STATIC_FILE_RAMP_START};
use std::fs::{self, DirEntry, ReadDir};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Scans `input_dir` for regular files to dry-run against, and derives the effective
/// `max_input_sz` the rest of the engine should use.
pub struct SeedScanner {
    input_dir: PathBuf,
    /// Re-created on every rewind; `None` means "not yet opened".
    cursor: Mutex<Option<ReadDir>>,
    file_count: std::sync::atomic::AtomicUsize,
    max_input_sz: std::sync::atomic::AtomicUsize,
    /// `max_file_sz_override` from the last `stat_and_rewind` call, remembered so `next`'s
    /// rewind path can restat with the same override instead of silently dropping it.
    max_file_sz_override: std::sync::atomic::AtomicUsize,
}

impl SeedScanner {
    /// §4.1 `Init`: open (but don't yet consume) the seed directory. Fails if `input_dir` can't be
    /// opened at all — a missing corpus directory is a configuration error, not a "zero seeds"
    /// dry run.
    pub fn new(input_dir: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let input_dir = input_dir.into();
        let _probe = fs::read_dir(&input_dir).map_err(|e| {
            CorpusError::Configuration(format!("couldn't open input directory {input_dir:?}: {e}"))
        })?;
        let scanner = Self {
            input_dir,
            cursor: Mutex::new(None),
            file_count: std::sync::atomic::AtomicUsize::new(0),
            max_input_sz: std::sync::atomic::AtomicUsize::new(INPUT_DEFAULT_SIZE),
            max_file_sz_override: std::sync::atomic::AtomicUsize::new(0),
        };
        scanner.stat_and_rewind(0)?;
        Ok(scanner)
    }

    pub fn input_dir(&self) -> &Path {
        &self.input_dir
    }

    pub fn file_count(&self) -> usize {
        self.file_count.load(std::sync::atomic::Ordering::Relaxed)
    }

    pub fn max_input_sz(&self) -> usize {
        self.max_input_sz.load(std::sync::atomic::Ordering::Relaxed)
    }

    /// §4.1 `GetDirStatsAndRewind`: count regular files and find the largest one, clamp that size
    /// into `[INPUT_DEFAULT_SIZE, INPUT_MAX_SIZE]` unless `max_file_sz_override` pins it, and reset
    /// the read cursor to the start. Called once at `Init` and again whenever the caller wants a
    /// fresh stat pass (e.g. after seeds were added mid-run).
    pub fn stat_and_rewind(&self, max_file_sz_override: usize) -> anyhow::Result<()> {
        self.max_file_sz_override
            .store(max_file_sz_override, std::sync::atomic::Ordering::Relaxed);

        let entries = fs::read_dir(&self.input_dir)?;
        let mut count = 0usize;
        let mut largest = 0usize;
        for entry in entries {
            let entry = entry?;
            if !is_regular_file(&entry) {
                continue;
            }
            count += 1;
            if let Ok(meta) = entry.metadata() {
                let size = meta.len() as usize;
                if max_file_sz_override > 0 && size > max_file_sz_override {
                    log::debug!(
                        "{:?} is {size} bytes, over max_file_sz_override={max_file_sz_override}; counted anyway",
                        entry.path()
                    );
                }
                largest = largest.max(size);
            }
        }

        let effective = if max_file_sz_override > 0 {
            max_file_sz_override
        } else {
            largest.clamp(INPUT_DEFAULT_SIZE, INPUT_MAX_SIZE)
        };

        self.file_count
            .store(count, std::sync::atomic::Ordering::Relaxed);
        self.max_input_sz
            .store(effective, std::sync::atomic::Ordering::Relaxed);
        if count == 0 {
            log::warn!("no usable files in input directory {:?}", self.input_dir);
        }
        log::info!(
            "{count} file(s) in input directory {:?}, max_input_sz={effective}",
            self.input_dir
        );

        *self.cursor.lock().unwrap() = Some(fs::read_dir(&self.input_dir)?);
        Ok(())
    }

    /// §4.1 `GetNext`: hand out the next regular file in the directory, or `None` once the
    /// directory is exhausted. Pass `rewind = true` to wrap back to the start instead of stopping
    /// (used once, at the end of the first dry-run pass, to recheck for seeds added while the run
    /// was in progress).
    pub fn next(&self, rewind: bool) -> anyhow::Result<Option<PathBuf>> {
        loop {
            let mut guard = self.cursor.lock().unwrap();
            let read_dir = guard.get_or_insert_with(|| {
                fs::read_dir(&self.input_dir).expect("input directory vanished mid-scan")
            });
            match read_dir.next() {
                Some(entry) => {
                    let entry = entry?;
                    if !is_regular_file(&entry) {
                        continue;
                    }
                    return Ok(Some(entry.path()));
                }
                None => {
                    if !rewind {
                        return Ok(None);
                    }
                    drop(guard);
                    let override_sz = self
                        .max_file_sz_override
                        .load(std::sync::atomic::Ordering::Relaxed);
                    self.stat_and_rewind(override_sz)?;
                }
            }
        }
    }
}

fn is_regular_file(entry: &DirEntry) -> bool {
    entry
        .file_type()
        .map(|ft| ft.is_file())
        .unwrap_or(false)
}

/// §4.1 `ShouldReadNewFile`: dry-run ramp-up. A static file is first tried at
/// `STATIC_FILE_RAMP_START` bytes; if that prefix didn't crash anything, the worker is told to
/// retry the same file at double the size next time, until the whole file has been read.
pub fn should_read_new_file(state: &WorkerState, last_try_size: usize, file_size: usize) -> bool {
    if !state.static_file_try_more {
        return true;
    }
    last_try_size >= file_size
}

/// §4.1 `PrepareStaticFile`: load the next ramp-up prefix of `path` into `buf`, doubling the
/// previous attempt's size (starting at `STATIC_FILE_RAMP_START`), capped at the file's actual
/// length and at `buf.max_input_sz()`. Updates `state` for the next call. When `mangle` is
/// `Some`, the mutation collaborator (§6) is run over the loaded prefix in place on every call,
/// including partial ramp steps.
pub fn prepare_static_file(
    path: &Path,
    last_try_size: usize,
    state: &mut WorkerState,
    buf: &mut WorkerBuffer,
    mangle: Option<&mut dyn FnMut(&mut [u8])>,
) -> anyhow::Result<()> {
    let file_size = fs::metadata(path)?.len() as usize;
    let next_try = if last_try_size == 0 {
        STATIC_FILE_RAMP_START
    } else {
        last_try_size.saturating_mul(2)
    };
    let read_len = next_try.min(file_size).min(buf.max_input_sz());

    let data = fs::read(path)?;
    buf.load(&data[..read_len]);

    state.orig_file_name = path.display().to_string();
    state.static_file_try_more = read_len < file_size;
    log::debug!(
        "dry run: loaded {read_len}/{file_size} bytes from {path:?} (try_more={})",
        state.static_file_try_more
    );

    if let Some(mangle) = mangle {
        mangle(buf.as_mut_slice());
    }
    Ok(())
}

/// §4.1 `RemoveStaticFile`: once a static seed has been fully absorbed into the dynamic corpus
/// (no crash, whole file read), delete it from the seed directory so subsequent dry runs don't
/// re-import it. Failure to remove is logged, not fatal — the file will just be dry-run again.
pub fn remove_static_file(path: &Path) {
    if let Err(e) = fs::remove_file(path) {
        log::warn!("couldn't remove static file {path:?} after import: {e}");
    } else {
        log::debug!("removed static file {path:?} after import into dynamic corpus");
    }
}

/// §4.1/§6 `PrepareExternalFile`: flush `buf` to its backing file and hand its `/dev/fd/<n>` path
/// to an external producer, matching the source's subprocess-based external-file collaborator.
/// The producer is expected to overwrite the file in place; its output becomes the buffer's new
/// logical contents.
#[cfg(unix)]
pub fn prepare_external_file(
    buf: &mut WorkerBuffer,
    producer: impl Fn(&Path) -> anyhow::Result<()>,
) -> anyhow::Result<()> {
    buf.flush_to_file()?;
    let fd_path = buf.fd_path();
    producer(&fd_path)?;
    let data = fs::read(&fd_path)?;
    buf.load(&data);
    Ok(())
}

/// §4.1/§6 `PostProcessFile`: run a post-process hook (e.g. a corpus minimizer/normalizer) over
/// `buf`'s current contents by path, then reload the buffer with whatever the hook left behind.
#[cfg(unix)]
pub fn post_process_file(
    buf: &mut WorkerBuffer,
    hook: impl Fn(&Path) -> anyhow::Result<()>,
) -> anyhow::Result<()> {
    buf.flush_to_file()?;
    let fd_path = buf.fd_path();
    hook(&fd_path)?;
    let data = fs::read(&fd_path)?;
    buf.load(&data);
    Ok(())
}
