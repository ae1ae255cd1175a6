//! Integration tests running full deduplication passes on temporary ROM collections.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use rom_dedupe::dedupe::{DedupeError, RomDedupe, RunLog, RunSummary, Settings};

fn create_test_file(root: &Path, relative: &str, size: usize) -> PathBuf {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().expect("parent")).expect("Failed to create dir");
    fs::write(&path, vec![0_u8; size]).expect("Failed to write file");
    path
}

fn settings(dryrun: bool) -> Settings {
    Settings {
        dryrun,
        ..Settings::default()
    }
}

fn run(root: &Path, settings: Settings) -> (RunSummary, String) {
    let mut log = RunLog::new(Vec::new());
    let summary = RomDedupe::new(root.to_path_buf(), settings)
        .run_with_log(&mut log)
        .expect("run should succeed");
    let text = String::from_utf8(log.into_inner()).expect("log should be valid UTF-8");
    (summary, text)
}

/// All regular files under `root`, relative and sorted.
fn list_files(root: &Path) -> Vec<String> {
    let mut files: Vec<String> = walkdir::WalkDir::new(root)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| {
            entry
                .path()
                .strip_prefix(root)
                .expect("inside root")
                .to_string_lossy()
                .replace('\\', "/")
        })
        .collect();
    files.sort();
    files
}

#[test]
fn chrono_trigger_usa_is_kept() {
    let temp = TempDir::new().expect("Failed to create temp dir");
    let root = temp.path();
    create_test_file(root, "snes/Chrono Trigger (USA).zip", 4096);
    create_test_file(root, "snes/Chrono Trigger (Japan).zip", 4096);

    let (summary, log) = run(root, settings(false));

    assert_eq!(summary.groups_evaluated, 1);
    assert_eq!(summary.files_moved, 1);
    assert_eq!(summary.bytes_reclaimed, 4096);
    assert!(summary.is_success());
    assert_eq!(
        list_files(root),
        vec!["duplicates/snes/Chrono Trigger (Japan).zip", "snes/Chrono Trigger (USA).zip"]
    );
    assert!(log.contains("GROUP   \"Chrono Trigger\""));
    assert!(log.contains("MOVE"));
}

#[test]
fn dry_run_changes_nothing_and_logs_intended_move() {
    let temp = TempDir::new().expect("Failed to create temp dir");
    let root = temp.path();
    create_test_file(root, "snes/Chrono Trigger (USA).zip", 10);
    create_test_file(root, "snes/Chrono Trigger (Japan).zip", 10);
    let before = list_files(root);

    let (summary, log) = run(root, settings(true));

    assert!(summary.dry_run);
    assert_eq!(summary.files_moved, 1);
    assert_eq!(list_files(root), before);
    assert!(!root.join("duplicates").exists());
    let dry_run_line = log
        .lines()
        .find(|line| line.contains("DRYRUN"))
        .expect("log should contain the intended move");
    assert!(dry_run_line.contains("Chrono Trigger (Japan).zip"));
    assert!(dry_run_line.contains("duplicates"));
}

#[test]
fn second_pass_moves_nothing() {
    let temp = TempDir::new().expect("Failed to create temp dir");
    let root = temp.path();
    create_test_file(root, "snes/Super Metroid (USA, Europe).zip", 10);
    create_test_file(root, "snes/Super Metroid (Japan).zip", 10);
    create_test_file(root, "snes/Super Metroid (Europe).zip", 10);
    create_test_file(root, "megadrive/Sonic (World).zip", 10);
    create_test_file(root, "megadrive/Sonic (Japan).zip", 10);

    let (first, _) = run(root, settings(false));
    assert_eq!(first.files_moved, 3);
    let after_first = list_files(root);

    let (second, _) = run(root, settings(false));
    assert_eq!(second.groups_evaluated, 0);
    assert_eq!(second.files_moved, 0);
    assert!(second.is_success());
    assert_eq!(list_files(root), after_first);
}

#[test]
fn existing_destination_is_reported_as_failure() {
    let temp = TempDir::new().expect("Failed to create temp dir");
    let root = temp.path();
    create_test_file(root, "snes/Game (USA).zip", 10);
    create_test_file(root, "snes/Game (Japan).zip", 10);
    create_test_file(root, "snes/Other (USA).zip", 10);
    create_test_file(root, "snes/Other (Japan).zip", 10);
    create_test_file(root, "duplicates/snes/Game (Japan).zip", 99);

    let (summary, log) = run(root, settings(false));

    // The failure does not stop the rest of the run
    assert!(!summary.is_success());
    assert_eq!(summary.failures.len(), 1);
    assert_eq!(summary.files_moved, 1);
    let failure = &summary.failures[0];
    assert_eq!(failure.key, "Game");
    assert!(matches!(failure.error, DedupeError::DestinationExists { .. }));
    assert!(root.join("snes/Game (Japan).zip").exists());
    assert!(root.join("duplicates/snes/Other (Japan).zip").exists());
    assert_eq!(
        fs::metadata(root.join("duplicates/snes/Game (Japan).zip"))
            .expect("metadata")
            .len(),
        99
    );
    assert!(log.contains("ERROR"));
}

#[test]
fn relative_path_is_preserved_in_quarantine() {
    let temp = TempDir::new().expect("Failed to create temp dir");
    let root = temp.path().join("roms");
    create_test_file(&root, "psx/Final Fantasy VII/Final Fantasy VII (USA) (Disc 1).chd", 10);
    create_test_file(&root, "psx/Final Fantasy VII/Final Fantasy VII (Japan) (Disc 1).chd", 10);
    create_test_file(&root, "psx/Final Fantasy VII/Final Fantasy VII (USA) (Disc 2).chd", 10);
    let quarantine = temp.path().join("quarantine");

    let settings = Settings {
        quarantine: Some(quarantine.clone()),
        ..settings(false)
    };
    let (summary, _) = run(&root, settings);

    assert_eq!(summary.groups_evaluated, 1);
    assert_eq!(summary.files_moved, 1);
    assert_eq!(
        list_files(&quarantine),
        vec!["psx/Final Fantasy VII/Final Fantasy VII (Japan) (Disc 1).chd"]
    );
    assert!(
        root.join("psx/Final Fantasy VII/Final Fantasy VII (USA) (Disc 2).chd")
            .exists()
    );
}

#[test]
fn handheld_and_console_versions_survive_by_default() {
    let temp = TempDir::new().expect("Failed to create temp dir");
    let root = temp.path();
    create_test_file(root, "gba/Final Fight One (USA).zip", 10);
    create_test_file(root, "snes/Final Fight (USA).zip", 10);
    create_test_file(root, "gba/Double Dragon Advance (USA).zip", 10);
    create_test_file(root, "snes/Double Dragon Advance (Japan).zip", 10);

    let (summary, log) = run(root, settings(false));

    assert_eq!(summary.groups_evaluated, 1);
    assert_eq!(summary.files_moved, 0);
    assert!(log.contains("RULE"));

    let single = Settings {
        keep_handheld_and_console: false,
        ..settings(false)
    };
    let (summary, _) = run(root, single);
    assert_eq!(summary.files_moved, 1);
    assert!(root.join("duplicates/snes/Double Dragon Advance (Japan).zip").exists());
}

#[test]
fn arcade_sets_prefer_fbneo() {
    let temp = TempDir::new().expect("Failed to create temp dir");
    let root = temp.path();
    create_test_file(root, "mame/Metal Slug.zip", 10);
    create_test_file(root, "fbneo/Metal Slug.zip", 20);

    let (summary, log) = run(root, settings(false));

    assert_eq!(summary.files_moved, 1);
    assert!(root.join("fbneo/Metal Slug.zip").exists());
    assert!(root.join("duplicates/mame/Metal Slug.zip").exists());
    assert!(log.contains("MAME/FBNeo"));
}

#[test]
fn system_info_file_limits_extensions() {
    let temp = TempDir::new().expect("Failed to create temp dir");
    let root = temp.path();
    fs::create_dir_all(root.join("snes")).expect("Failed to create dir");
    fs::write(
        root.join("snes/systeminfo.txt"),
        "System name:\nSNES\n\nSupported file extensions:\n.sfc .smc\n",
    )
    .expect("Failed to write file");
    create_test_file(root, "snes/Game (USA).sfc", 10);
    create_test_file(root, "snes/Game (Japan).sfc", 10);
    create_test_file(root, "snes/Game (Europe).zip", 10);

    let (summary, _) = run(root, settings(false));

    assert_eq!(summary.files_scanned, 2);
    assert_eq!(summary.files_moved, 1);
    assert!(root.join("snes/Game (USA).sfc").exists());
    assert!(root.join("snes/Game (Europe).zip").exists());
}

#[test]
fn titles_starting_with_a_dot_are_deduplicated() {
    let temp = TempDir::new().expect("Failed to create temp dir");
    let root = temp.path();
    create_test_file(root, "ps2/.hack - Infection Part 1 (USA).iso", 10);
    create_test_file(root, "ps2/.hack - Infection Part 1 (Japan).iso", 10);
    create_test_file(root, "ps2/._.hack - Infection Part 1 (Japan).iso", 10);

    let (summary, log) = run(root, settings(false));

    assert_eq!(summary.files_scanned, 2);
    assert_eq!(summary.files_moved, 1);
    assert!(root.join("ps2/.hack - Infection Part 1 (USA).iso").exists());
    assert!(root.join("duplicates/ps2/.hack - Infection Part 1 (Japan).iso").exists());
    assert!(root.join("ps2/._.hack - Infection Part 1 (Japan).iso").exists());
    assert!(log.contains("GROUP   \".hack - Infection Part 1\""));
}

#[test]
fn empty_titles_are_excluded_not_failed() {
    let temp = TempDir::new().expect("Failed to create temp dir");
    let root = temp.path();
    create_test_file(root, "snes/(USA).zip", 10);
    create_test_file(root, "snes/(Japan).zip", 10);

    let (summary, log) = run(root, settings(false));

    assert_eq!(summary.excluded, 2);
    assert_eq!(summary.files_moved, 0);
    assert!(summary.is_success());
    assert!(log.contains("SKIP"));
}

#[test]
fn run_writes_log_file() {
    let temp = TempDir::new().expect("Failed to create temp dir");
    let root = temp.path().join("roms");
    create_test_file(&root, "snes/Game (USA).zip", 10);
    create_test_file(&root, "snes/Game (Japan).zip", 10);
    let log_file = temp.path().join("logs").join("run.log");

    let settings = Settings {
        log_file: Some(log_file.clone()),
        ..settings(true)
    };
    let summary = RomDedupe::new(root, settings).run().expect("run should succeed");

    assert_eq!(summary.files_moved, 1);
    let content = fs::read_to_string(&log_file).expect("Failed to read log file");
    assert!(content.contains("INIT"));
    assert!(content.contains("DRYRUN"));
    assert!(content.contains("STATISTICS"));
}

#[test]
fn missing_root_fails_before_scanning() {
    let temp = TempDir::new().expect("Failed to create temp dir");
    let mut log = RunLog::new(Vec::new());
    let result = RomDedupe::new(temp.path().join("missing"), settings(false)).run_with_log(&mut log);
    assert!(result.is_err());
    assert!(log.into_inner().is_empty());
}
