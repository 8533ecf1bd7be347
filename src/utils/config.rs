//! Tuning constants for the corpus engine, in one place.

// ---- Input sizing (§3, §4.1) ----

/// Default per-input size ceiling used when the seed set is small or `max_file_sz` is unset.
pub const INPUT_DEFAULT_SIZE: usize = 1024 * 1024;

/// Absolute ceiling on any single input, regardless of what the seed directory contains.
pub const INPUT_MAX_SIZE: usize = 1024 * 1024 * 1024;

/// Size of the first dry-run read of a static seed before the ramp-up doubles it (§4.1).
pub const STATIC_FILE_RAMP_START: usize = 1024;

// ---- Dictionary (§4.6) ----

/// Dictionary: maximum number of entries held in the bounded table.
pub const DICTIONARY_MAX_ENTRIES: usize = 1024;

/// Dictionary: maximum decoded byte length stored per entry (longer words are truncated).
pub const DICTIONARY_MAX_WORD_LEN: usize = 1024;

// ---- Scanner streaming (§2.1) ----

/// Path/filename channel capacity for the scanner's static-file feed. Large enough that the
/// scanner thread never blocks on send for a seed directory of realistic size.
pub const STREAMING_CHANNEL_CAP: usize = 50_000;

// ---- Selection policy (§4.3) ----

/// Quota percentile table: `idx * 100 / count` indexes into this table. `QUOTA_PERCENTILE_TABLE[p]`
/// is the number of selections served from an entry at percentile `p` before the cursor advances.
pub const QUOTA_PERCENTILE_TABLE: [usize; 101] = {
    let mut table = [1usize; 101];
    let mut p = 91;
    while p <= 92 {
        table[p] = 2;
        p += 1;
    }
    while p <= 94 {
        table[p] = 3;
        p += 1;
    }
    while p <= 96 {
        table[p] = 4;
        p += 1;
    }
    while p <= 98 {
        table[p] = 5;
        p += 1;
    }
    while p <= 100 {
        table[p] = 10;
        p += 1;
    }
    table
};
