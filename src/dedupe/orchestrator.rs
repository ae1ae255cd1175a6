use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::Context;
use colored::Colorize;
use indicatif::ProgressBar;
#[cfg(not(test))]
use indicatif::ProgressStyle;

use crate::dedupe::DedupeError;
use crate::dedupe::config::Settings;
use crate::dedupe::relocate::{Relocation, relocate};
use crate::dedupe::resolver::{Resolution, Resolver};
use crate::dedupe::run_log::RunLog;
use crate::dedupe::scanner::{ExclusionReason, ScanResult, scan};
use crate::{print_bold, print_error, print_warning};

/// Default quarantine directory name inside the collection root.
pub const DEFAULT_QUARANTINE_DIR: &str = "duplicates";

#[cfg(not(test))]
const SPINNER_TEMPLATE: &str = "{spinner:.magenta} [{elapsed_precise}] {msg}";

/// Deduplicates one ROM collection.
#[derive(Debug)]
pub struct RomDedupe {
    root: PathBuf,
    settings: Settings,
}

/// A duplicate that could not be moved.
#[derive(Debug)]
pub struct RelocationFailure {
    pub path: PathBuf,
    /// Canonical title of the group the file belongs to.
    pub key: String,
    pub error: DedupeError,
}

/// Totals for a finished run.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub files_scanned: usize,
    /// Groups with two or more candidates.
    pub groups_evaluated: usize,
    /// Files moved, or that would be moved in a dry run.
    pub files_moved: usize,
    pub bytes_reclaimed: u64,
    pub excluded: usize,
    pub failures: Vec<RelocationFailure>,
    pub dry_run: bool,
    pub elapsed: Duration,
}

impl RomDedupe {
    #[must_use]
    pub const fn new(root: PathBuf, settings: Settings) -> Self {
        Self { root, settings }
    }

    /// Run deduplication and write the run log to the configured log file,
    /// or a timestamped file in the default log directory.
    ///
    /// # Errors
    /// Returns an error if the collection root does not exist,
    /// the quarantine directory cannot be created,
    /// or the log file cannot be created.
    /// Failed relocations are not errors here, they are listed in the summary.
    pub fn run(&self) -> anyhow::Result<RunSummary> {
        self.resolve_root()?;
        let log_path = match &self.settings.log_file {
            Some(path) => path.clone(),
            None => RunLog::default_path()?,
        };
        let mut log = RunLog::to_file(&log_path)?;
        if self.settings.verbose {
            println!("Log file: {}", log_path.display());
        }
        self.run_with_log(&mut log)
    }

    /// Run deduplication writing the run log to the given log.
    ///
    /// # Errors
    /// Returns an error if the collection root does not exist
    /// or the quarantine directory cannot be created.
    pub fn run_with_log<W: Write>(&self, log: &mut RunLog<W>) -> anyhow::Result<RunSummary> {
        let start = Instant::now();
        let root = self.resolve_root()?;
        let quarantine = self.quarantine_dir(&root)?;

        if self.settings.verbose {
            print!("{}", self.settings);
            println!("Root: {}", root.display().to_string().magenta());
            println!("Quarantine: {}", quarantine.display().to_string().magenta());
        }
        log.log_init(&root, &quarantine, &self.settings);

        if !self.settings.dryrun {
            fs::create_dir_all(&quarantine).with_context(|| {
                format!("Failed to create quarantine directory: {}", quarantine.display())
            })?;
        }

        let scan_result = self.scan_collection(&root, &quarantine);
        let mut summary = RunSummary {
            files_scanned: scan_result.files_scanned,
            excluded: scan_result.excluded.len(),
            dry_run: self.settings.dryrun,
            ..RunSummary::default()
        };

        for excluded in &scan_result.excluded {
            log.log_excluded(excluded);
            match excluded.reason {
                ExclusionReason::Unreadable(_) => {
                    print_warning!("Skipping {}: {}", excluded.path.display(), excluded.reason);
                }
                ExclusionReason::EmptyTitle if self.settings.verbose => {
                    print_warning!("Skipping {}: {}", excluded.path.display(), excluded.reason);
                }
                ExclusionReason::EmptyTitle => {}
            }
        }

        let resolver = Resolver::new(self.settings.catalog(), self.settings.keep_handheld_and_console);
        for (key, members) in scan_result.duplicate_groups() {
            summary.groups_evaluated += 1;
            let resolution = resolver.resolve(members);

            log.log_group(key, members, &resolution.kept);
            for note in &resolution.notes {
                log.log_rule(key, note);
            }
            self.print_group(key, &resolution, &root);

            for record in &resolution.moved {
                match relocate(record, &quarantine, &root, self.settings.dryrun) {
                    Ok(relocation) => {
                        summary.files_moved += 1;
                        summary.bytes_reclaimed += record.size;
                        log.log_relocation(key, &record.path, &relocation);
                        Self::print_relocation(&record.path, &relocation, &root);
                    }
                    Err(error) => {
                        print_error!("{key}: {error}");
                        log.log_failure(key, &record.path, &error.to_string());
                        summary.failures.push(RelocationFailure {
                            path: record.path.clone(),
                            key: key.clone(),
                            error,
                        });
                    }
                }
            }
        }

        summary.elapsed = start.elapsed();
        log.log_summary(&summary);
        Ok(summary)
    }

    /// Absolute collection root, which must be an existing directory.
    fn resolve_root(&self) -> anyhow::Result<PathBuf> {
        let root = crate::resolve_input_path(Some(&self.root))?;
        if !root.is_dir() {
            anyhow::bail!("Collection root is not a directory: '{}'", root.display());
        }
        Ok(root)
    }

    /// Absolute quarantine directory, `<root>/duplicates` unless configured.
    fn quarantine_dir(&self, root: &Path) -> anyhow::Result<PathBuf> {
        let quarantine = self
            .settings
            .quarantine
            .as_deref()
            .unwrap_or_else(|| Path::new(DEFAULT_QUARANTINE_DIR));
        let quarantine = crate::resolve_output_dir(quarantine, root);
        if root.starts_with(&quarantine) {
            anyhow::bail!(
                "Quarantine directory '{}' must not contain the collection root '{}'",
                quarantine.display(),
                root.display()
            );
        }
        Ok(quarantine)
    }

    fn scan_collection(&self, root: &Path, quarantine: &Path) -> ScanResult {
        #[cfg(test)]
        let spinner = ProgressBar::hidden();
        #[cfg(not(test))]
        let spinner = {
            let pb = ProgressBar::new_spinner();
            pb.set_style(
                ProgressStyle::default_spinner()
                    .template(SPINNER_TEMPLATE)
                    .expect("Failed to set spinner template"),
            );
            pb.enable_steady_tick(Duration::from_millis(100));
            pb
        };
        spinner.set_message(format!("Scanning {}", root.display()));

        let lookup = self.settings.extension_lookup();
        let result = scan(root, &lookup, Some(quarantine));
        spinner.finish_and_clear();

        if self.settings.verbose {
            println!(
                "Scanned {} files, found {} titles with duplicates",
                result.files_scanned,
                result.duplicate_group_count()
            );
        }
        result
    }

    fn print_group(&self, key: &str, resolution: &Resolution, root: &Path) {
        print_bold!("{key}");
        if self.settings.verbose {
            for note in &resolution.notes {
                println!("  {}", note.cyan());
            }
        }
        for record in &resolution.kept {
            println!(
                "  {} {}",
                "keep".green(),
                crate::get_relative_path_or_filename(&record.path, root)
            );
        }
    }

    fn print_relocation(source: &Path, relocation: &Relocation, root: &Path) {
        let action = match relocation {
            Relocation::Moved { .. } => "move".yellow(),
            Relocation::WouldMove { .. } => "would move".yellow(),
        };
        println!(
            "  {action} {} -> {}",
            crate::get_relative_path_or_filename(source, root),
            crate::path_to_string_relative(relocation.destination())
        );
    }
}

impl RunSummary {
    /// True when every duplicate was relocated.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Files scanned:    {}", self.files_scanned)?;
        writeln!(f, "Groups evaluated: {}", self.groups_evaluated)?;
        if self.dry_run {
            writeln!(f, "Files to move:    {}", self.files_moved)?;
        } else {
            writeln!(f, "Files moved:      {}", self.files_moved)?;
        }
        writeln!(f, "Space reclaimed:  {}", crate::format_size(self.bytes_reclaimed))?;
        if self.excluded > 0 {
            writeln!(f, "Files excluded:   {}", self.excluded)?;
        }
        if !self.failures.is_empty() {
            writeln!(f, "{}", format!("Failures:         {}", self.failures.len()).red())?;
        }
        writeln!(f, "Dry run:          {}", self.dry_run)?;
        write!(f, "Time:             {}", crate::format_duration(self.elapsed))
    }
}
