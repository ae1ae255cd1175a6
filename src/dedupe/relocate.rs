use std::fs;
use std::path::{Path, PathBuf};

use crate::dedupe::DedupeError;
use crate::dedupe::metadata::FileRecord;

/// Outcome of a successful relocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Relocation {
    /// File was moved to the destination.
    Moved { destination: PathBuf },
    /// Dry run: the file would have been moved to the destination.
    WouldMove { destination: PathBuf },
}

impl Relocation {
    #[must_use]
    pub fn destination(&self) -> &Path {
        match self {
            Self::Moved { destination } | Self::WouldMove { destination } => destination,
        }
    }
}

/// Move a losing duplicate into the quarantine directory.
///
/// The destination keeps the path of the file relative to `source_root`,
/// so `<root>/snes/Game (Japan).sfc` ends up in `<quarantine>/snes/Game (Japan).sfc`.
/// Existing files are never overwritten.
/// In dry-run mode nothing is created or moved.
///
/// # Errors
/// Returns an error if the file is not inside `source_root`,
/// the destination already exists,
/// or creating the destination directory or renaming the file fails.
/// Moving across filesystems is not supported and fails with the rename error.
pub fn relocate(
    record: &FileRecord,
    quarantine_root: &Path,
    source_root: &Path,
    dry_run: bool,
) -> Result<Relocation, DedupeError> {
    let relative = record
        .path
        .strip_prefix(source_root)
        .map_err(|_| DedupeError::OutsideRoot {
            path: record.path.clone(),
            root: source_root.to_path_buf(),
        })?;
    let destination = quarantine_root.join(relative);

    if destination.try_exists().unwrap_or(true) || destination.is_symlink() {
        return Err(DedupeError::DestinationExists { path: destination });
    }

    if dry_run {
        return Ok(Relocation::WouldMove { destination });
    }

    if let Some(parent) = destination.parent() {
        fs::create_dir_all(parent).map_err(|source| DedupeError::CreateDir {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    fs::rename(&record.path, &destination).map_err(|source| DedupeError::Move {
        from: record.path.clone(),
        to: destination.clone(),
        source,
    })?;

    Ok(Relocation::Moved { destination })
}
