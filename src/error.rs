//! Error kinds for the corpus engine (§7).
//!
//! Most filesystem hiccups are logged and recovered from locally (a `bool`/`Option` return,
//! matching the source's `input_getNext` returning `false` rather than propagating). `CorpusError`
//! exists for the cases a caller actually wants to branch on: a missing input directory, an empty
//! blacklist, or a cov-file write that failed. Invariant violations (`idx > count`, an empty
//! dynamic corpus at selection time) are not represented here at all — they're programmer bugs and
//! panic immediately, the same way the source calls `LOG_F` and aborts.

use std::fmt;

#[derive(Debug)]
pub enum CorpusError {
    /// No usable input directory was configured or it could not be opened.
    Configuration(String),
    /// The stack-hash blacklist file was empty or missing.
    EmptyBlacklist(String),
    /// Writing a coverage-addressed file failed (logged at error level by the caller; this
    /// variant exists so a caller that cares can still see it without aborting the insertion).
    Persistence(String),
}

impl fmt::Display for CorpusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configuration(msg) => write!(f, "configuration error: {msg}"),
            Self::EmptyBlacklist(msg) => write!(f, "empty blacklist: {msg}"),
            Self::Persistence(msg) => write!(f, "persistence failure: {msg}"),
        }
    }
}

impl std::error::Error for CorpusError {}
