//! Comparison attributes derived from a ROM filename and its system directory.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use crate::dedupe::DedupeError;
use crate::dedupe::normalize::normalize;

/// Regex to match a parenthesized release year like `(1995)`
static RE_YEAR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\((\d{4})\)").expect("Invalid year regex"));

const PREFERRED_TAGS: &[&str] = &["(europe)", "(en,fr,de)", "(world)"];
const USA_TAGS: &[&str] = &["(usa)", "(us)"];
const NON_ENGLISH_TAGS: &[&str] = &["(japan)", "(jp)", "(asia)", "(ko)", "(ch)"];

/// Region priority of a release, lower is preferred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Region {
    /// Europe, World or multi-language English releases
    Preferred = 1,
    Usa = 2,
    /// No recognized region tag, typical for arcade sets
    Untagged = 3,
    /// Explicitly non-English releases
    NonEnglish = 4,
}

/// One ROM file and the attributes used to rank it against its duplicates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    pub path: PathBuf,
    /// Full filename including extension.
    pub file_name: String,
    /// Filename without extension.
    pub raw_name: String,
    /// Lowercase name of the directory containing the file.
    pub system: String,
    /// Release year from the filename, 0 when missing.
    pub year: u16,
    pub region: Region,
    /// Size in bytes.
    pub size: u64,
}

impl Region {
    /// Detect the region from the tags in a filename.
    ///
    /// Tags are checked in priority order and the first matching group wins,
    /// so "(Europe) (Japan)" counts as a European release.
    #[must_use]
    pub fn from_file_name(file_name: &str) -> Self {
        let lower = file_name.to_lowercase();
        let has_any = |tags: &[&str]| tags.iter().any(|tag| lower.contains(tag));
        if has_any(PREFERRED_TAGS) {
            Self::Preferred
        } else if has_any(USA_TAGS) {
            Self::Usa
        } else if has_any(NON_ENGLISH_TAGS) {
            Self::NonEnglish
        } else {
            Self::Untagged
        }
    }

    /// Numeric priority from 1 (best) to 4 (worst).
    #[must_use]
    pub const fn priority(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Preferred => "Europe/World",
            Self::Usa => "USA",
            Self::Untagged => "untagged",
            Self::NonEnglish => "non-English",
        };
        write!(f, "{name}")
    }
}

impl FileRecord {
    /// Create a record from already known values.
    ///
    /// Year and region are parsed from the filename in `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, system: &str, size: u64) -> Self {
        let path = path.into();
        let file_name = crate::path_to_filename_string(&path);
        let raw_name = Path::new(&file_name)
            .file_stem()
            .map_or_else(|| file_name.clone(), |stem| stem.to_string_lossy().to_string());
        Self {
            year: parse_year(&file_name),
            region: Region::from_file_name(&file_name),
            system: system.to_lowercase(),
            path,
            file_name,
            raw_name,
            size,
        }
    }

    /// Canonical title key for this file.
    #[must_use]
    pub fn key(&self) -> Option<String> {
        normalize(&self.file_name)
    }
}

impl fmt::Display for FileRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{} | {} | {} | {} bytes]",
            self.path.display(),
            self.system,
            if self.year == 0 {
                "-".to_string()
            } else {
                self.year.to_string()
            },
            self.region,
            self.size
        )
    }
}

/// Read the metadata of a file on disk.
///
/// The system comes from the parent directory name
/// and the size is read from the filesystem at call time.
///
/// # Errors
/// Returns an error if the file metadata cannot be read.
pub fn extract(path: &Path) -> Result<FileRecord, DedupeError> {
    let metadata = fs::metadata(path).map_err(|source| DedupeError::Metadata {
        path: path.to_path_buf(),
        source,
    })?;

    let system = path
        .parent()
        .and_then(|parent| crate::get_normalized_dir_name(parent).ok())
        .unwrap_or_default();

    let mut record = FileRecord::new(path, &system, metadata.len());
    if let Ok(file_name) = crate::get_normalized_file_name(path) {
        record.year = parse_year(&file_name);
        record.region = Region::from_file_name(&file_name);
        record.raw_name = Path::new(&file_name)
            .file_stem()
            .map_or_else(|| file_name.clone(), |stem| stem.to_string_lossy().to_string());
        record.file_name = file_name;
    }
    Ok(record)
}

/// Parse the first parenthesized four-digit year, or 0 if there is none.
#[must_use]
pub fn parse_year(file_name: &str) -> u16 {
    RE_YEAR
        .captures(file_name)
        .and_then(|caps| caps[1].parse().ok())
        .unwrap_or(0)
}
