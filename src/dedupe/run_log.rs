use std::fs;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Local;
use itertools::Itertools;

use crate::dedupe::config::Settings;
use crate::dedupe::metadata::FileRecord;
use crate::dedupe::orchestrator::RunSummary;
use crate::dedupe::relocate::Relocation;
use crate::dedupe::scanner::ExcludedFile;

/// Text log of a deduplication run with buffered writes.
///
/// Every entry is flushed immediately so the log stays useful if the run is interrupted.
pub struct RunLog<W: Write = BufWriter<File>> {
    writer: W,
}

impl RunLog {
    /// Create a new run log at `path`, creating missing parent directories.
    ///
    /// # Errors
    /// Returns an error if the directory or the file cannot be created.
    pub fn to_file(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create log directory: {}", parent.display()))?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Failed to create log file: {}", path.display()))?;

        Ok(Self::new(BufWriter::new(file)))
    }

    /// Default log file path: `~/logs/rom-dedupe/rom_dedupe_<timestamp>.log`
    ///
    /// # Errors
    /// Returns an error if the home directory cannot be determined.
    pub fn default_path() -> Result<PathBuf> {
        let log_dir = crate::config::LOG_DIR
            .as_deref()
            .context("Failed to get home directory")?;
        Ok(log_dir.join(format!("rom_dedupe_{}.log", Local::now().format("%Y-%m-%d_%H-%M-%S"))))
    }
}

impl<W: Write> RunLog<W> {
    pub const fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Consume the log and return the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }

    fn timestamp() -> String {
        Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
    }

    /// Log when starting the program
    pub fn log_init(&mut self, root: &Path, quarantine: &Path, settings: &Settings) {
        let _ = writeln!(self.writer, "[{}] INIT \"{}\"", Self::timestamp(), root.display());
        let _ = writeln!(self.writer, "  quarantine: {}", quarantine.display());
        let _ = writeln!(self.writer, "  dryrun: {}", settings.dryrun);
        let _ = writeln!(
            self.writer,
            "  keep_handheld_and_console: {}",
            settings.keep_handheld_and_console
        );
        if !settings.default_extensions.is_empty() {
            let _ = writeln!(self.writer, "  default_extensions: {:?}", settings.default_extensions);
        }
        if !settings.extensions.is_empty() {
            let _ = writeln!(
                self.writer,
                "  extensions: {}",
                settings
                    .extensions
                    .iter()
                    .sorted_by(|a, b| a.0.cmp(b.0))
                    .map(|(system, extensions)| format!("{system}={}", extensions.join(",")))
                    .join(" ")
            );
        }
        if !settings.generations.is_empty() {
            let _ = writeln!(
                self.writer,
                "  generations: {}",
                settings
                    .generations
                    .iter()
                    .sorted_by(|a, b| a.0.cmp(b.0))
                    .map(|(system, rank)| format!("{system}={rank}"))
                    .join(" ")
            );
        }
        if !settings.handhelds.is_empty() {
            let _ = writeln!(self.writer, "  handhelds: {:?}", settings.handhelds);
        }
        let _ = writeln!(self.writer, "  verbose: {}", settings.verbose);
        let _ = self.writer.flush();
    }

    /// Log a duplicate group with all members and the records that were kept.
    pub fn log_group(&mut self, key: &str, members: &[FileRecord], kept: &[FileRecord]) {
        let _ = writeln!(
            self.writer,
            "[{}] GROUP   \"{key}\" | {} members | keep: {}",
            Self::timestamp(),
            members.len(),
            kept.iter().map(|record| format!("\"{}\"", record.path.display())).join(", ")
        );
        for member in members {
            let _ = writeln!(self.writer, "  {member}");
        }
        let _ = self.writer.flush();
    }

    /// Log a decision made by a special resolution rule.
    pub fn log_rule(&mut self, key: &str, note: &str) {
        let _ = writeln!(self.writer, "[{}] RULE    \"{key}\" | {note}", Self::timestamp());
        let _ = self.writer.flush();
    }

    /// Log a moved or would-be moved file.
    pub fn log_relocation(&mut self, key: &str, source: &Path, relocation: &Relocation) {
        let action = match relocation {
            Relocation::Moved { .. } => "MOVE   ",
            Relocation::WouldMove { .. } => "DRYRUN ",
        };
        let _ = writeln!(
            self.writer,
            "[{}] {action} \"{key}\" | \"{}\" -> \"{}\"",
            Self::timestamp(),
            source.display(),
            relocation.destination().display()
        );
        let _ = self.writer.flush();
    }

    /// Log a failed relocation.
    pub fn log_failure(&mut self, key: &str, source: &Path, error: &str) {
        let _ = writeln!(
            self.writer,
            "[{}] ERROR   \"{key}\" | \"{}\" | {error}",
            Self::timestamp(),
            source.display()
        );
        let _ = self.writer.flush();
    }

    /// Log a file that was left out of grouping.
    pub fn log_excluded(&mut self, excluded: &ExcludedFile) {
        let _ = writeln!(
            self.writer,
            "[{}] SKIP    \"{}\" | {}",
            Self::timestamp(),
            excluded.path.display(),
            excluded.reason
        );
        let _ = self.writer.flush();
    }

    /// Log final statistics
    pub fn log_summary(&mut self, summary: &RunSummary) {
        let _ = writeln!(self.writer, "[{}] STATISTICS", Self::timestamp());
        let _ = writeln!(self.writer, "  Files scanned:    {}", summary.files_scanned);
        let _ = writeln!(self.writer, "  Groups evaluated: {}", summary.groups_evaluated);
        let moved_label = if summary.dry_run { "Files to move:   " } else { "Files moved:     " };
        let _ = writeln!(self.writer, "  {moved_label} {}", summary.files_moved);
        let _ = writeln!(
            self.writer,
            "  Space reclaimed:  {}",
            crate::format_size(summary.bytes_reclaimed)
        );
        let _ = writeln!(self.writer, "  Files excluded:   {}", summary.excluded);
        let _ = writeln!(self.writer, "  Failures:         {}", summary.failures.len());
        let _ = writeln!(self.writer, "  Dry run:          {}", summary.dry_run);
        let _ = writeln!(
            self.writer,
            "  Total time: {}",
            crate::format_duration(summary.elapsed)
        );
        let _ = writeln!(self.writer, "[{}] END", Self::timestamp());
        let _ = self.writer.flush();
    }
}
