//! CLI command handlers for the `fuzzcorpus` demonstration binary.

pub mod arg_parser;

use crate::blacklist::Blacklist;
use crate::dict::Dictionary;
use crate::types::{GlobalConfig, Phase};
use crate::{SeedScanner, open_corpus};
use anyhow::Result;
use arg_parser::Cli;
use log::info;
use serde::Serialize;
use std::path::Path;

#[derive(Serialize)]
struct ScanSummary {
    input_dir: String,
    file_count: usize,
    max_input_sz: usize,
}

/// `scan`: open the seed directory and report what a dry run would see.
pub fn handle_scan(input_dir: &Path, max_file_sz: usize, json: bool) -> Result<()> {
    let scanner = SeedScanner::new(input_dir)?;
    scanner.stat_and_rewind(max_file_sz)?;

    let summary = ScanSummary {
        input_dir: input_dir.display().to_string(),
        file_count: scanner.file_count(),
        max_input_sz: scanner.max_input_sz(),
    };
    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        info!(
            "{} file(s) in {input_dir:?}, max_input_sz={}",
            summary.file_count, summary.max_input_sz
        );
    }
    Ok(())
}

#[derive(Serialize)]
struct ReplayEntry {
    idx: usize,
    cov: [u64; 4],
    size: usize,
    path: String,
}

#[derive(Serialize)]
struct ReplaySummary {
    imported: usize,
    entries: Vec<ReplayEntry>,
}

/// `replay`: dry-run every seed in `input_dir` into a fresh dynamic corpus and report the
/// resulting coverage-sorted order. There is no real fuzz target wired up here, so each seed's
/// "coverage" is a deterministic stand-in derived from its content (its CRC64, split across the
/// four coverage slots) purely so the ordering logic has something real to sort by.
pub fn handle_replay(
    input_dir: &Path,
    output_dir: Option<std::path::PathBuf>,
    work_dir: &Path,
    json: bool,
) -> Result<()> {
    let mut config = GlobalConfig::new(input_dir, work_dir);
    config.output_dir = output_dir;
    let (scanner, corpus) = open_corpus(&config)?;
    let persist = config.persist_targets();

    // Fan the seed paths out over a bounded channel to a rayon worker pool, the same
    // producer/consumer split the teacher's pipeline uses for its directory walk.
    let (tx, rx) = crossbeam_channel::bounded::<std::path::PathBuf>(
        crate::utils::config::STREAMING_CHANNEL_CAP,
    );
    let producer = std::thread::spawn(move || -> Result<()> {
        while let Some(path) = scanner.next(false)? {
            if tx.send(path).is_err() {
                break;
            }
        }
        Ok(())
    });

    let imported = std::sync::atomic::AtomicUsize::new(0);
    rayon::scope(|s| {
        for _ in 0..rayon::current_num_threads() {
            let rx = rx.clone();
            let corpus = &corpus;
            let persist = &persist;
            let imported = &imported;
            s.spawn(move |_| {
                for path in rx {
                    let data = match std::fs::read(&path) {
                        Ok(d) => d,
                        Err(e) => {
                            log::warn!("couldn't read seed {path:?}: {e}");
                            continue;
                        }
                    };
                    let cov = synthetic_coverage(&data);
                    corpus.add(
                        data,
                        cov,
                        path.display().to_string(),
                        Phase::DryRun,
                        Some(persist),
                    );
                    imported.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
                }
            });
        }
    });
    producer.join().expect("seed scanner thread panicked")?;
    let imported = imported.load(std::sync::atomic::Ordering::Relaxed);
    corpus.renumerate();

    let entries: Vec<ReplayEntry> = corpus
        .snapshot()
        .into_iter()
        .map(|input| ReplayEntry {
            idx: input.idx,
            cov: input.cov,
            size: input.size(),
            path: input.path,
        })
        .collect();

    if json {
        let summary = ReplaySummary { imported, entries };
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        info!("imported {imported} seed(s) into the dynamic corpus");
        for entry in &entries {
            info!(
                "  idx={:>4} cov={:?} size={:>8} path={}",
                entry.idx, entry.cov, entry.size, entry.path
            );
        }
    }
    Ok(())
}

fn synthetic_coverage(data: &[u8]) -> crate::types::CovTuple {
    let crc = crate::persist::crc64(data);
    let rev = crate::persist::crc64_rev(data);
    [crc >> 32, crc & 0xffff_ffff, rev >> 32, rev & 0xffff_ffff]
}

/// `dict`: parse a dictionary file and report how many entries loaded.
pub fn handle_dict(path: &Path) -> Result<()> {
    let dict = Dictionary::load(path)?;
    info!("dictionary {path:?}: {} entr(y/ies) loaded", dict.len());
    Ok(())
}

/// `blacklist`: parse a stack-hash blacklist file and report how many entries loaded.
pub fn handle_blacklist(path: &Path) -> Result<()> {
    let blacklist = Blacklist::load(path)?;
    info!("blacklist {path:?}: {} hash(es) loaded", blacklist.len());
    Ok(())
}

pub use arg_parser::Commands;

pub fn dispatch(cli: &Cli) -> Result<()> {
    match &cli.command {
        Commands::Scan {
            input_dir,
            max_file_sz,
        } => handle_scan(input_dir, *max_file_sz, cli.json),
        Commands::Replay {
            input_dir,
            output_dir,
            work_dir,
        } => handle_replay(input_dir, output_dir.clone(), work_dir, cli.json),
        Commands::Dict { path } => handle_dict(path),
        Commands::Blacklist { path } => handle_blacklist(path),
    }
}
