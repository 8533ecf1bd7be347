//! Coverage-addressed persister (§4.5): CRC64-addressed, idempotent corpus file writer.

use crate::error::CorpusError;
use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

const CRC64_POLY: u64 = 0xad93d23594c935a9;

fn crc64_table() -> &'static [u64; 256] {
    static TABLE: OnceLock<[u64; 256]> = OnceLock::new();
    TABLE.get_or_init(|| {
        let mut table = [0u64; 256];
        let mut i = 0;
        while i < 256 {
            let mut crc = i as u64;
            let mut j = 0;
            while j < 8 {
                crc = if crc & 1 == 1 {
                    (crc >> 1) ^ CRC64_POLY
                } else {
                    crc >> 1
                };
                j += 1;
            }
            table[i] = crc;
            i += 1;
        }
        table
    })
}

/// Forward CRC-64 (CRC-64/XZ-style reflected polynomial) over `data` in byte order.
pub fn crc64(data: &[u8]) -> u64 {
    let table = crc64_table();
    let mut crc = !0u64;
    for &byte in data {
        let idx = ((crc ^ byte as u64) & 0xff) as usize;
        crc = table[idx] ^ (crc >> 8);
    }
    !crc
}

/// Reverse-direction CRC-64: same algorithm, consuming `data` back-to-front. Paired with
/// [`crc64`], this gives a collision-resistant content address without a cryptographic digest
/// (§4.5): flipping the processing direction makes the two values independent for any input that
/// isn't a palindrome, at negligible extra cost.
pub fn crc64_rev(data: &[u8]) -> u64 {
    let table = crc64_table();
    let mut crc = !0u64;
    for &byte in data.iter().rev() {
        let idx = ((crc ^ byte as u64) & 0xff) as usize;
        crc = table[idx] ^ (crc >> 8);
    }
    !crc
}

/// Suffix of every persisted corpus file. Part of the external file-format contract (§4.5/§6),
/// not derived from the crate's own name.
const COV_FILE_SUFFIX: &str = "honggfuzz.cov";

/// Filename for a given buffer: `<crc64f:016x><crc64r:016x>.<len:08x>.honggfuzz.cov`.
pub fn cov_filename(data: &[u8]) -> String {
    format!(
        "{:016x}{:016x}.{:08x}.{COV_FILE_SUFFIX}",
        crc64(data),
        crc64_rev(data),
        data.len() as u32,
    )
}

/// §4.5 `WriteCovFile`: idempotent under retry — an existing file with the derived name is
/// treated as success without being overwritten.
pub fn write_cov_file(dir: &Path, data: &[u8]) -> anyhow::Result<PathBuf> {
    std::fs::create_dir_all(dir).map_err(|e| {
        CorpusError::Persistence(format!("couldn't create corpus directory {dir:?}: {e}"))
    })?;
    let path = dir.join(cov_filename(data));

    match OpenOptions::new().write(true).create_new(true).open(&path) {
        Ok(mut f) => {
            f.write_all(data).map_err(|e| {
                CorpusError::Persistence(format!("couldn't write {path:?}: {e}"))
            })?;
            log::debug!("added {path:?} to corpus directory {dir:?}");
        }
        Err(e) if e.kind() == ErrorKind::AlreadyExists => {
            log::debug!("{path:?} already exists in corpus directory {dir:?}");
        }
        Err(e) => {
            return Err(CorpusError::Persistence(format!("couldn't open {path:?}: {e}")).into());
        }
    }
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filename_is_deterministic() {
        let data = b"some corpus bytes";
        assert_eq!(cov_filename(data), cov_filename(data));
    }

    #[test]
    fn different_data_gives_different_filenames() {
        assert_ne!(cov_filename(b"abc"), cov_filename(b"abd"));
    }

    #[test]
    fn round_trip_through_write_cov_file() {
        let dir = tempfile::tempdir().unwrap();
        let data = b"round trip me";
        let path = write_cov_file(dir.path(), data).unwrap();
        let read_back = std::fs::read(&path).unwrap();
        assert_eq!(read_back, data);
        assert_eq!(path, dir.path().join(cov_filename(data)));
    }

    #[test]
    fn write_is_idempotent_under_retry() {
        let dir = tempfile::tempdir().unwrap();
        let data = b"idempotent";
        let first = write_cov_file(dir.path(), data).unwrap();
        let second = write_cov_file(dir.path(), data).unwrap();
        assert_eq!(first, second);
    }
}
