use fuzzcorpus::types::{GlobalConfig, Phase};
use fuzzcorpus::{open_corpus, DynamicCorpus};

#[test]
fn dry_run_then_main_phase_end_to_end() {
    let seeds = tempfile::tempdir().unwrap();
    std::fs::write(seeds.path().join("a"), b"aaaa").unwrap();
    std::fs::write(seeds.path().join("b"), b"bb").unwrap();
    let work = tempfile::tempdir().unwrap();

    let mut config = GlobalConfig::new(seeds.path(), work.path());
    config.output_dir = Some(seeds.path().to_path_buf());
    let (scanner, corpus) = open_corpus(&config).unwrap();
    let persist = config.persist_targets();

    let mut count = 0;
    while let Some(path) = scanner.next(false).unwrap() {
        let data = std::fs::read(&path).unwrap();
        let cov = [data.len() as u64, 0, 0, 0];
        corpus.add(data, cov, path.display().to_string(), Phase::DryRun, Some(&persist));
        count += 1;
    }
    assert_eq!(count, 2);
    corpus.renumerate();
    assert_eq!(corpus.count(), 2);

    // A main-phase discovery jumps straight to the head and becomes the selection cursor.
    corpus.add(b"discovered".to_vec(), [99, 0, 0, 0], "[NEW]", Phase::Main, Some(&persist));
    let snapshot = corpus.snapshot();
    assert_eq!(snapshot[0].path, "[NEW]");

    let (_data, path) = corpus.prepare_dynamic();
    assert_eq!(path, "[NEW]");
}

#[test]
fn open_corpus_fails_on_missing_input_dir() {
    let seeds = tempfile::tempdir().unwrap();
    let missing = seeds.path().join("nope");
    let work = tempfile::tempdir().unwrap();
    let config = GlobalConfig::new(missing, work.path());
    assert!(open_corpus(&config).is_err());
}

#[test]
fn fresh_corpus_has_no_entries() {
    let corpus = DynamicCorpus::new();
    assert_eq!(corpus.count(), 0);
    assert!(corpus.snapshot().is_empty());
}
