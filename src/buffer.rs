//! Per-worker file-backed input buffer (§4.4).
//!
//! Each worker owns one [`WorkerBuffer`]: a file the target process can read as a path, mapped
//! into memory so the mutator can write through it directly. The mapping's capacity and the
//! buffer's *logical* size (`dynamicFileSz` in the source) are tracked separately, because
//! shrinking the logical size should not require re-mapping.

use memmap2::MmapMut;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

/// A resizable, file-backed memory region owned by one worker.
pub struct WorkerBuffer {
    file: File,
    mmap: MmapMut,
    /// Logical size; distinct from `mmap.len()`, which is the mapping's capacity.
    logical_size: usize,
    max_input_sz: usize,
}

impl WorkerBuffer {
    /// Create a worker buffer backed by a fresh anonymous (unlinked) tempfile under `work_dir`,
    /// pre-sized to `max_input_sz` so the mapping never needs to grow.
    pub fn new(work_dir: &Path, max_input_sz: usize) -> anyhow::Result<Self> {
        std::fs::create_dir_all(work_dir)?;
        let file = tempfile::tempfile_in(work_dir)?;
        file.set_len(max_input_sz.max(1) as u64)?;
        let mmap = unsafe { MmapMut::map_mut(&file)? };
        Ok(Self {
            file,
            mmap,
            logical_size: 0,
            max_input_sz,
        })
    }

    pub fn logical_size(&self) -> usize {
        self.logical_size
    }

    pub fn max_input_sz(&self) -> usize {
        self.max_input_sz
    }

    /// `/dev/fd/<n>`-style path for handing this buffer's contents to an external helper by
    /// descriptor number, as the source does for `subproc_System` collaborators (§6).
    #[cfg(unix)]
    pub fn fd_path(&self) -> PathBuf {
        use std::os::unix::io::AsRawFd;
        PathBuf::from(format!("/dev/fd/{}", self.file.as_raw_fd()))
    }

    /// Contents up to the logical size (the mapping's capacity may be larger).
    pub fn as_slice(&self) -> &[u8] {
        &self.mmap[..self.logical_size]
    }

    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.mmap[..self.logical_size]
    }

    /// §4.4 `SetSize` contract: no-op when unchanged, fatal when over the ceiling, truncates the
    /// backing file (best-effort — platforms where truncating a mapped file is unsupported or
    /// slow may skip it; the logical size remains authoritative for downstream readers either
    /// way), and updates the logical size.
    pub fn set_size(&mut self, sz: usize) {
        if sz == self.logical_size {
            return;
        }
        if sz > self.max_input_sz {
            panic!(
                "requested buffer size {sz} exceeds max_input_sz {}",
                self.max_input_sz
            );
        }
        if let Err(e) = self.file.set_len(sz as u64) {
            log::warn!("ftruncate(sz={sz}) failed, continuing with logical size only: {e}");
        }
        self.logical_size = sz;
    }

    /// Copy `data` into the buffer and set the logical size to `data.len()`.
    pub fn load(&mut self, data: &[u8]) {
        self.set_size(data.len());
        self.as_mut_slice().copy_from_slice(data);
    }

    /// Flush whatever is logically in the buffer out to its backing file (used when handing the
    /// buffer's path to an external helper that expects a real file, not just a live mapping).
    pub fn flush_to_file(&mut self) -> anyhow::Result<()> {
        self.mmap.flush_range(0, self.logical_size)?;
        Ok(())
    }
}

impl Write for WorkerBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let start = self.logical_size;
        let end = start + buf.len();
        if end > self.max_input_sz {
            return Err(std::io::Error::other("write exceeds max_input_sz"));
        }
        self.set_size(end);
        self.mmap[start..end].copy_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}
