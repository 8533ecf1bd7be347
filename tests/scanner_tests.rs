use fuzzcorpus::utils::INPUT_DEFAULT_SIZE;
use fuzzcorpus::SeedScanner;

#[test]
fn empty_seed_directory_has_zero_files_and_next_is_none() {
    let dir = tempfile::tempdir().unwrap();
    let scanner = SeedScanner::new(dir.path()).unwrap();
    assert_eq!(scanner.file_count(), 0);
    assert_eq!(scanner.next(false).unwrap(), None);
    assert_eq!(scanner.next(true).unwrap(), None);
}

#[test]
fn three_seeds_derive_max_input_sz_from_largest() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("small"), vec![0u8; 10]).unwrap();
    std::fs::write(dir.path().join("medium"), vec![0u8; 200]).unwrap();
    std::fs::write(dir.path().join("large"), vec![0u8; 5000]).unwrap();

    let scanner = SeedScanner::new(dir.path()).unwrap();
    assert_eq!(scanner.file_count(), 3);
    // 5000 bytes is well under INPUT_DEFAULT_SIZE, so the clamp floor wins.
    assert_eq!(scanner.max_input_sz(), INPUT_DEFAULT_SIZE);
}

#[test]
fn max_file_sz_override_wins_over_derived_size() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("seed"), vec![0u8; 50]).unwrap();

    let scanner = SeedScanner::new(dir.path()).unwrap();
    scanner.stat_and_rewind(12345).unwrap();
    assert_eq!(scanner.max_input_sz(), 12345);
}
