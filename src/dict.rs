//! Dictionary parser (§4.6): bounded table of literal byte-strings for the mutator.

use crate::utils::config::{DICTIONARY_MAX_ENTRIES, DICTIONARY_MAX_WORD_LEN};
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

/// One decoded dictionary word, truncated to `DICTIONARY_MAX_WORD_LEN` bytes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DictEntry {
    pub val: Vec<u8>,
}

/// Bounded dictionary table. Slots are reserved with an atomic post-increment the way the
/// source's `ATOMIC_POST_INC(dictionaryCnt)` does, so the count stays observable by other
/// threads mid-load without needing the whole table behind a lock.
#[derive(Default)]
pub struct Dictionary {
    entries: Vec<DictEntry>,
    count: AtomicUsize,
}

impl Dictionary {
    pub fn len(&self) -> usize {
        self.count.load(Ordering::Relaxed)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn entries(&self) -> &[DictEntry] {
        &self.entries
    }

    /// §4.6: parse a dictionary file line by line. `#`-comments and blank lines are skipped;
    /// every other line must contain at least two `"` characters, with the word taken from
    /// between the first and last quote and C-decoded. Malformed lines are logged and skipped.
    /// Once `DICTIONARY_MAX_ENTRIES` entries are loaded, further lines are discarded with a
    /// warning rather than erroring.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let file = std::fs::File::open(path)
            .map_err(|e| anyhow::anyhow!("couldn't open dictionary {path:?}: {e}"))?;
        let reader = BufReader::new(file);
        let mut dict = Dictionary::default();

        for line in reader.lines() {
            let line = line?;
            if dict.count.load(Ordering::Relaxed) >= DICTIONARY_MAX_ENTRIES {
                log::warn!(
                    "maximum number of dictionary entries ({DICTIONARY_MAX_ENTRIES}) already loaded, skipping the rest"
                );
                break;
            }
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let first = line.find('"');
            let last = line.rfind('"');
            let (Some(first), Some(last)) = (first, last) else {
                log::warn!("malformed dictionary line '{line}', skipping");
                continue;
            };
            if first == last {
                log::warn!("malformed dictionary line '{line}', skipping");
                continue;
            }

            let word = &line[first + 1..last];
            let mut decoded = decode_c_escapes(word);
            decoded.truncate(DICTIONARY_MAX_WORD_LEN);
            dict.count.fetch_add(1, Ordering::Relaxed);
            log::debug!("dictionary: loaded word '{word}' (len={})", decoded.len());
            dict.entries.push(DictEntry { val: decoded });
        }

        log::info!(
            "loaded {} word(s) from the dictionary {path:?}",
            dict.entries.len()
        );
        Ok(dict)
    }
}

/// `util_decodeCString` equivalent: decode C-style escape sequences (`\n`, `\t`, `\r`, `\\`, `\"`,
/// `\0`, `\xNN`) in `s`. Unrecognized escapes keep the backslash and the following character.
pub fn decode_c_escapes(s: &str) -> Vec<u8> {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] != b'\\' || i + 1 >= bytes.len() {
            out.push(bytes[i]);
            i += 1;
            continue;
        }
        match bytes[i + 1] {
            b'n' => {
                out.push(b'\n');
                i += 2;
            }
            b't' => {
                out.push(b'\t');
                i += 2;
            }
            b'r' => {
                out.push(b'\r');
                i += 2;
            }
            b'\\' => {
                out.push(b'\\');
                i += 2;
            }
            b'"' => {
                out.push(b'"');
                i += 2;
            }
            b'0' => {
                out.push(0);
                i += 2;
            }
            b'x' if i + 3 < bytes.len() => {
                let hex = &s[i + 2..i + 4];
                match u8::from_str_radix(hex, 16) {
                    Ok(byte) => {
                        out.push(byte);
                        i += 4;
                    }
                    Err(_) => {
                        out.push(bytes[i]);
                        i += 1;
                    }
                }
            }
            other => {
                out.push(b'\\');
                out.push(other);
                i += 2;
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_newline_escape() {
        assert_eq!(decode_c_escapes("hi\\n"), vec![b'h', b'i', b'\n']);
    }

    #[test]
    fn decodes_hex_escape() {
        assert_eq!(decode_c_escapes("\\x41\\x42"), vec![b'A', b'B']);
    }

    #[test]
    fn unknown_escape_keeps_backslash() {
        assert_eq!(decode_c_escapes("\\q"), vec![b'\\', b'q']);
    }

    #[test]
    fn quoted_entry_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dict.txt");
        std::fs::write(&path, "# comment\n\n\"hi\\n\"\n").unwrap();
        let dict = Dictionary::load(&path).unwrap();
        assert_eq!(dict.len(), 1);
        assert_eq!(dict.entries()[0].val, vec![b'h', b'i', b'\n']);
    }

    #[test]
    fn malformed_lines_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dict.txt");
        std::fs::write(&path, "no quotes here\n\"only one quote\n\"good\"\n").unwrap();
        let dict = Dictionary::load(&path).unwrap();
        assert_eq!(dict.len(), 1);
        assert_eq!(dict.entries()[0].val, b"good".to_vec());
    }

    #[test]
    fn capacity_exhaustion_is_non_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dict.txt");
        let mut content = String::new();
        for i in 0..DICTIONARY_MAX_ENTRIES + 5 {
            content.push_str(&format!("\"w{i}\"\n"));
        }
        std::fs::write(&path, content).unwrap();
        let dict = Dictionary::load(&path).unwrap();
        assert_eq!(dict.len(), DICTIONARY_MAX_ENTRIES);
    }
}
