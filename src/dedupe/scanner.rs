//! Collection walk that groups ROM files by canonical title.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use walkdir::{DirEntry, WalkDir};

use crate::dedupe::DedupeError;
use crate::dedupe::extensions::{ExtensionLookup, SYSTEM_INFO_FILE};
use crate::dedupe::metadata::{FileRecord, extract};
use crate::dedupe::normalize::normalize;
use crate::print_warning;

/// Candidate duplicates keyed by canonical title, in order of first encounter.
pub type TitleGroups = IndexMap<String, Vec<FileRecord>>;

/// A file that was accepted by extension but left out of grouping.
#[derive(Debug)]
pub struct ExcludedFile {
    pub path: PathBuf,
    pub reason: ExclusionReason,
}

#[derive(Debug)]
pub enum ExclusionReason {
    /// Nothing is left of the name after removing metadata tags.
    EmptyTitle,
    /// File metadata could not be read.
    Unreadable(DedupeError),
}

/// Output of a collection scan.
#[derive(Debug, Default)]
pub struct ScanResult {
    pub groups: TitleGroups,
    pub excluded: Vec<ExcludedFile>,
    /// Number of files with an accepted extension.
    pub files_scanned: usize,
}

impl ScanResult {
    /// Groups that have more than one candidate.
    pub fn duplicate_groups(&self) -> impl Iterator<Item = (&String, &Vec<FileRecord>)> {
        self.groups.iter().filter(|(_, records)| records.len() > 1)
    }

    /// Number of groups that have more than one candidate.
    #[must_use]
    pub fn duplicate_group_count(&self) -> usize {
        self.duplicate_groups().count()
    }
}

impl fmt::Display for ExclusionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "no title left after removing tags"),
            Self::Unreadable(error) => write!(f, "{error}"),
        }
    }
}

/// Walk `root` recursively and group all accepted files by canonical title.
///
/// Symbolic link directories are not followed, hidden directories and AppleDouble files are skipped,
/// and the `quarantine` directory is never entered so already moved files are not picked up again.
/// Directory entries are visited in file name order.
pub fn scan(root: &Path, lookup: &dyn ExtensionLookup, quarantine: Option<&Path>) -> ScanResult {
    let mut result = ScanResult::default();
    let mut extension_cache: HashMap<PathBuf, Vec<String>> = HashMap::new();

    let walker = WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !crate::should_skip_entry(entry) && !is_quarantine(entry, quarantine));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(error) => {
                print_warning!("Skipping unreadable entry: {error}");
                continue;
            }
        };
        if !is_file(&entry) {
            continue;
        }

        let path = entry.path();
        let Some(dir) = path.parent() else {
            continue;
        };
        let file_name = crate::get_normalized_file_name(path).unwrap_or_else(|_| crate::path_to_filename_string(path));
        if file_name.eq_ignore_ascii_case(SYSTEM_INFO_FILE) {
            continue;
        }

        let extensions = extension_cache
            .entry(dir.to_path_buf())
            .or_insert_with(|| lookup.extensions(dir));
        if !has_accepted_extension(&file_name, extensions) {
            continue;
        }
        result.files_scanned += 1;

        let Some(key) = normalize(&file_name) else {
            result.excluded.push(ExcludedFile {
                path: path.to_path_buf(),
                reason: ExclusionReason::EmptyTitle,
            });
            continue;
        };

        match extract(path) {
            Ok(record) => result.groups.entry(key).or_default().push(record),
            Err(error) => result.excluded.push(ExcludedFile {
                path: path.to_path_buf(),
                reason: ExclusionReason::Unreadable(error),
            }),
        }
    }

    result
}

/// Regular files and symlinks pointing to regular files.
fn is_file(entry: &DirEntry) -> bool {
    entry.file_type().is_file() || (entry.path_is_symlink() && entry.path().is_file())
}

fn is_quarantine(entry: &DirEntry, quarantine: Option<&Path>) -> bool {
    quarantine.is_some_and(|quarantine| entry.depth() > 0 && entry.path() == quarantine)
}

/// Case-insensitive suffix match so multi-part extensions like `p8.png` work.
fn has_accepted_extension(file_name: &str, extensions: &[String]) -> bool {
    let lower = file_name.to_lowercase();
    extensions.iter().any(|ext| {
        lower.len() > ext.len() + 1 && lower.ends_with(ext.as_str()) && lower[..lower.len() - ext.len()].ends_with('.')
    })
}
