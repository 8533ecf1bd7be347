//! The dynamic corpus (§4.2) and selection policy (§4.3).
//!
//! Represented as an arena of nodes with explicit `prev`/`next` indices rather than a raw
//! intrusive linked list (Design Notes §9's suggested alternative) — no `unsafe` is needed, and
//! the cursor contract survives head-prepends for the same reason the source's pointer-based
//! list does: once allocated, a node's identity (here, its arena index) never changes, and no
//! node is ever freed while the process runs (no eviction, §5 Resource lifetimes).

use crate::persist::write_cov_file;
use crate::types::{CovTuple, DynInput, PersistTargets, Phase};
use crate::utils::config::QUOTA_PERCENTILE_TABLE;
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::RwLock;
use std::time::{SystemTime, UNIX_EPOCH};

struct Node {
    input: DynInput,
    prev: Option<usize>,
    next: Option<usize>,
}

struct CorpusInner {
    nodes: Vec<Node>,
    head: Option<usize>,
    tail: Option<usize>,
    /// The selection cursor (`dynfileqCurrent` in the source). `None` means "needs reseating to
    /// head on next use", which also covers the freshly-initialized and just-walked-off-tail cases.
    cursor: Option<usize>,
}

/// The coverage-ordered dynamic corpus: intrusive-ordered sequence of [`DynInput`]s, a selection
/// cursor, and the advisory counters observers read outside the lock (§5).
pub struct DynamicCorpus {
    inner: RwLock<CorpusInner>,
    count: AtomicUsize,
    max_size: AtomicUsize,
    last_cov_update: AtomicI64,
    new_units_added: AtomicUsize,
}

impl Default for DynamicCorpus {
    fn default() -> Self {
        Self::new()
    }
}

impl DynamicCorpus {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(CorpusInner {
                nodes: Vec::new(),
                head: None,
                tail: None,
                cursor: None,
            }),
            count: AtomicUsize::new(0),
            max_size: AtomicUsize::new(0),
            last_cov_update: AtomicI64::new(0),
            new_units_added: AtomicUsize::new(0),
        }
    }

    /// Advisory count, readable without taking the lock (§5: `PrepareDynamic` checks this before
    /// acquiring the write lock).
    pub fn count(&self) -> usize {
        self.count.load(Ordering::Relaxed)
    }

    pub fn max_size(&self) -> usize {
        self.max_size.load(Ordering::Relaxed)
    }

    pub fn last_cov_update(&self) -> i64 {
        self.last_cov_update.load(Ordering::Relaxed)
    }

    pub fn new_units_added(&self) -> usize {
        self.new_units_added.load(Ordering::Relaxed)
    }

    /// §4.2 `cmpCov`: true when `a` is strictly greater than `b`, scanning `cov[0..4]` in order.
    pub fn cmp_cov(a: &CovTuple, b: &CovTuple) -> bool {
        for i in 0..4 {
            if a[i] > b[i] {
                return true;
            }
            if a[i] < b[i] {
                return false;
            }
        }
        false
    }

    /// §4.2 `Add`. `persist` is `None` to reproduce the source's minimize-mode / socket-fuzzer
    /// skip of all side effects; otherwise the new bytes are mirrored to `persist.out_dir`, and in
    /// the main phase also to `persist.cov_dir_new` when set.
    pub fn add(&self, data: Vec<u8>, cov: CovTuple, path: impl Into<String>, phase: Phase, persist: Option<&PersistTargets>) {
        let len = data.len();
        let data_for_write = data.clone();
        let mut input = DynInput::new(data, cov, path);

        {
            let mut inner = self.inner.write().unwrap();
            input.idx = inner.nodes.len();
            let slot = inner.nodes.len();
            inner.nodes.push(Node {
                input,
                prev: None,
                next: None,
            });

            match phase {
                Phase::Main => {
                    Self::link_at_head(&mut inner, slot);
                    inner.cursor = Some(slot);
                }
                Phase::DryRun => {
                    let insert_before = Self::find_insertion_point(&inner, slot);
                    match insert_before {
                        Some(before) => Self::link_before(&mut inner, slot, before),
                        None => Self::link_at_tail(&mut inner, slot),
                    }
                }
            }
        }

        self.count.fetch_add(1, Ordering::Relaxed);
        self.max_size.fetch_max(len, Ordering::Relaxed);
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() as i64)
            .unwrap_or(0);
        self.last_cov_update.store(now, Ordering::Relaxed);

        let Some(persist) = persist else { return };
        if let Err(e) = write_cov_file(&persist.out_dir, &data_for_write) {
            log::error!("couldn't save coverage data to {:?}: {e}", persist.out_dir);
        }
        if phase != Phase::Main {
            return;
        }
        self.new_units_added.fetch_add(1, Ordering::Relaxed);
        if let Some(cov_dir_new) = &persist.cov_dir_new
            && let Err(e) = write_cov_file(cov_dir_new, &data_for_write)
        {
            log::error!("couldn't save new coverage data to {cov_dir_new:?}: {e}");
        }
    }

    fn find_insertion_point(inner: &CorpusInner, new_slot: usize) -> Option<usize> {
        let mut iter = inner.head;
        while let Some(idx) = iter {
            if Self::cmp_cov(&inner.nodes[new_slot].input.cov, &inner.nodes[idx].input.cov) {
                return Some(idx);
            }
            iter = inner.nodes[idx].next;
        }
        None
    }

    fn link_at_head(inner: &mut CorpusInner, slot: usize) {
        inner.nodes[slot].next = inner.head;
        inner.nodes[slot].prev = None;
        if let Some(old_head) = inner.head {
            inner.nodes[old_head].prev = Some(slot);
        }
        inner.head = Some(slot);
        if inner.tail.is_none() {
            inner.tail = Some(slot);
        }
    }

    fn link_at_tail(inner: &mut CorpusInner, slot: usize) {
        inner.nodes[slot].prev = inner.tail;
        inner.nodes[slot].next = None;
        if let Some(old_tail) = inner.tail {
            inner.nodes[old_tail].next = Some(slot);
        }
        inner.tail = Some(slot);
        if inner.head.is_none() {
            inner.head = Some(slot);
        }
    }

    fn link_before(inner: &mut CorpusInner, slot: usize, before: usize) {
        let prev = inner.nodes[before].prev;
        inner.nodes[slot].prev = prev;
        inner.nodes[slot].next = Some(before);
        inner.nodes[before].prev = Some(slot);
        match prev {
            Some(p) => inner.nodes[p].next = Some(slot),
            None => inner.head = Some(slot),
        }
    }

    /// §4.2 `Renumerate`: head gets `count`, tail gets `1`.
    pub fn renumerate(&self) {
        let mut inner = self.inner.write().unwrap();
        let count = self.count();
        let mut idx = count;
        let mut cur = inner.head;
        while let Some(slot) = cur {
            inner.nodes[slot].input.idx = idx;
            idx = idx.saturating_sub(1);
            cur = inner.nodes[slot].next;
        }
    }

    /// Snapshot of the corpus in list order, for inspection/testing.
    pub fn snapshot(&self) -> Vec<DynInput> {
        let inner = self.inner.read().unwrap();
        let mut out = Vec::with_capacity(self.count());
        let mut cur = inner.head;
        while let Some(slot) = cur {
            out.push(inner.nodes[slot].input.clone());
            cur = inner.nodes[slot].next;
        }
        out
    }

    /// §4.3 `testQuota`: number of selections served from `idx` before the cursor advances.
    pub fn test_quota(idx: usize, count: usize) -> usize {
        if idx > count {
            panic!("idx ({idx}) > count ({count})");
        }
        let percentile = (idx * 100) / count;
        QUOTA_PERCENTILE_TABLE[percentile]
    }

    /// §4.3 `PrepareDynamic`. Returns the bytes and provenance path of the selected entry; the
    /// caller resizes its worker buffer and copies them in, then applies mutation, outside this
    /// lock (matching "release the lock; resize the worker's buffer; copy" in the source).
    pub fn prepare_dynamic(&self) -> (Vec<u8>, String) {
        if self.count() == 0 {
            panic!("the dynamic corpus is empty; this shouldn't happen");
        }
        let mut inner = self.inner.write().unwrap();
        if inner.cursor.is_none() {
            inner.cursor = inner.head;
        }
        let current = inner.cursor.expect("corpus non-empty implies a head");
        let count = self.count();

        let idx = inner.nodes[current].input.idx;
        let quota = Self::test_quota(idx, count);
        inner.nodes[current].input.tested += 1;
        if inner.nodes[current].input.tested >= quota {
            inner.nodes[current].input.tested = 0;
            inner.cursor = inner.nodes[current].next;
        }

        let input = &inner.nodes[current].input;
        (input.data.clone(), input.path.clone())
    }

    /// §4.3 `PrepareDynamicForMinimization`: serial sweep, `None` once the cursor walks off tail.
    pub fn prepare_dynamic_for_minimization(&self) -> Option<(Vec<u8>, String, CovTuple)> {
        if self.count() == 0 {
            panic!("the dynamic corpus is empty (for minimization); this shouldn't happen");
        }
        let mut inner = self.inner.write().unwrap();
        inner.cursor = match inner.cursor {
            None => inner.head,
            Some(cur) => inner.nodes[cur].next,
        };
        let current = inner.cursor?;
        let input = &inner.nodes[current].input;
        Some((input.data.clone(), input.path.clone(), input.cov))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cmp_cov_orders_by_first_differing_index() {
        assert!(DynamicCorpus::cmp_cov(&[3, 0, 0, 0], &[2, 9, 9, 9]));
        assert!(!DynamicCorpus::cmp_cov(&[2, 9, 9, 9], &[3, 0, 0, 0]));
        assert!(!DynamicCorpus::cmp_cov(&[1, 1, 1, 1], &[1, 1, 1, 1]));
        assert!(DynamicCorpus::cmp_cov(&[2, 5, 0, 0], &[2, 4, 0, 0]));
    }

    #[test]
    fn dry_run_insertions_stay_coverage_sorted() {
        let corpus = DynamicCorpus::new();
        corpus.add(vec![1], [1, 0, 0, 0], "a", Phase::DryRun, None);
        corpus.add(vec![2], [3, 0, 0, 0], "b", Phase::DryRun, None);
        corpus.add(vec![3], [2, 5, 0, 0], "c", Phase::DryRun, None);
        corpus.add(vec![4], [2, 4, 0, 0], "d", Phase::DryRun, None);

        let snap = corpus.snapshot();
        let paths: Vec<_> = snap.iter().map(|d| d.path.as_str()).collect();
        assert_eq!(paths, vec!["b", "c", "d", "a"]);

        corpus.renumerate();
        let snap = corpus.snapshot();
        let idxs: Vec<_> = snap.iter().map(|d| d.idx).collect();
        assert_eq!(idxs, vec![4, 3, 2, 1]);
    }

    #[test]
    fn main_phase_insertion_heads_the_queue() {
        let corpus = DynamicCorpus::new();
        corpus.add(vec![1], [1, 0, 0, 0], "a", Phase::DryRun, None);
        corpus.add(vec![2], [3, 0, 0, 0], "b", Phase::DryRun, None);
        corpus.renumerate();

        corpus.add(vec![3], [0, 9, 0, 0], "new", Phase::Main, None);
        let snap = corpus.snapshot();
        assert_eq!(snap[0].path, "new");

        let (_data, path) = corpus.prepare_dynamic();
        assert_eq!(path, "new");
    }

    #[test]
    fn quota_scheduling_matches_percentile_bands() {
        assert_eq!(DynamicCorpus::test_quota(100, 100), 10);
        assert_eq!(DynamicCorpus::test_quota(50, 100), 1);
    }

    #[test]
    #[should_panic(expected = "idx (101) > count (100)")]
    fn quota_fatal_when_idx_exceeds_count() {
        DynamicCorpus::test_quota(101, 100);
    }

    #[test]
    fn prepare_dynamic_advances_after_exactly_quota_selections() {
        let corpus = DynamicCorpus::new();
        for i in 0..100u64 {
            corpus.add(vec![i as u8], [i, 0, 0, 0], format!("seed{i}"), Phase::DryRun, None);
        }
        corpus.renumerate();

        // Highest-idx entry (idx=100, percentile 100) should take 10 selections before advancing.
        let mut selections = 0;
        let first_path = corpus.snapshot()[0].path.clone();
        loop {
            let (_data, path) = corpus.prepare_dynamic();
            selections += 1;
            if path != first_path {
                break;
            }
            if selections > 20 {
                panic!("cursor never advanced");
            }
        }
        assert_eq!(selections, 10);
    }

    #[test]
    fn minimization_sweep_terminates_at_tail() {
        let corpus = DynamicCorpus::new();
        corpus.add(vec![1], [1, 0, 0, 0], "a", Phase::DryRun, None);
        corpus.add(vec![2], [2, 0, 0, 0], "b", Phase::DryRun, None);

        assert!(corpus.prepare_dynamic_for_minimization().is_some());
        assert!(corpus.prepare_dynamic_for_minimization().is_some());
        assert!(corpus.prepare_dynamic_for_minimization().is_none());
    }

    #[test]
    #[should_panic(expected = "empty")]
    fn prepare_dynamic_on_empty_corpus_is_fatal() {
        let corpus = DynamicCorpus::new();
        corpus.prepare_dynamic();
    }
}
