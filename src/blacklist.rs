//! Stack-hash blacklist parser (§4.7): a sorted list of hex hashes to reject as "already known".

use crate::error::CorpusError;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Parsed blacklist: non-decreasing `u64` hashes, one per non-empty line.
#[derive(Clone, Debug, Default)]
pub struct Blacklist {
    hashes: Vec<u64>,
}

impl Blacklist {
    pub fn len(&self) -> usize {
        self.hashes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hashes.is_empty()
    }

    pub fn contains(&self, hash: u64) -> bool {
        self.hashes.binary_search(&hash).is_ok()
    }

    /// §4.7 `ParseBlacklist`: every line must parse as a hex `u64` and the file must be
    /// non-decreasing (duplicates allowed, out-of-order entries are fatal), matching the source's
    /// refusal to fuzz against a blacklist it can't binary-search. An empty file is also fatal —
    /// a blacklist you asked for and got zero entries from is almost certainly a mistake, not a
    /// no-op.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let file = std::fs::File::open(path)
            .map_err(|e| anyhow::anyhow!("couldn't open blacklist {path:?}: {e}"))?;
        let reader = BufReader::new(file);
        let mut hashes = Vec::new();

        for (lineno, line) in reader.lines().enumerate() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let hash = u64::from_str_radix(line, 16).map_err(|e| {
                anyhow::anyhow!("blacklist {path:?}:{}: '{line}' is not a hex integer: {e}", lineno + 1)
            })?;
            if let Some(&last) = hashes.last()
                && hash < last
            {
                anyhow::bail!(
                    "blacklist {path:?}:{}: entries must be non-decreasing ({hash:016x} after {last:016x})",
                    lineno + 1
                );
            }
            hashes.push(hash);
        }

        if hashes.is_empty() {
            return Err(CorpusError::EmptyBlacklist(format!("{path:?}")).into());
        }

        log::info!("loaded {} stack hash(es) from blacklist {path:?}", hashes.len());
        Ok(Self { hashes })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascending_hashes_load_and_are_searchable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blacklist.txt");
        std::fs::write(&path, "1\nff\n1a2b3c\n").unwrap();
        let bl = Blacklist::load(&path).unwrap();
        assert_eq!(bl.len(), 3);
        assert!(bl.contains(0xff));
        assert!(!bl.contains(0x2));
    }

    #[test]
    fn out_of_order_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blacklist.txt");
        std::fs::write(&path, "ff\n1\n").unwrap();
        assert!(Blacklist::load(&path).is_err());
    }

    #[test]
    fn duplicate_entries_are_accepted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blacklist.txt");
        std::fs::write(&path, "1\n1\n").unwrap();
        let bl = Blacklist::load(&path).unwrap();
        assert_eq!(bl.len(), 2);
        assert!(bl.contains(1));
    }

    #[test]
    fn empty_file_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blacklist.txt");
        std::fs::write(&path, "").unwrap();
        assert!(Blacklist::load(&path).is_err());
    }

    #[test]
    fn non_hex_line_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blacklist.txt");
        std::fs::write(&path, "not-hex\n").unwrap();
        assert!(Blacklist::load(&path).is_err());
    }
}
