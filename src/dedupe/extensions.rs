//! Per-directory accepted file extensions.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use itertools::Itertools;

use crate::print_warning;

/// Extensions accepted in directories without any other configuration.
pub const DEFAULT_EXTENSIONS: &[&str] = &["zip", "7z", "iso", "cue", "chd"];

/// Batocera system description file found in each system directory.
pub const SYSTEM_INFO_FILE: &str = "systeminfo.txt";

/// Line preceding the space-separated extension list in [`SYSTEM_INFO_FILE`].
const SUPPORTED_EXTENSIONS_HEADER: &str = "Supported file extensions:";

/// Resolves which file extensions count as ROMs in a directory.
pub trait ExtensionLookup {
    /// Accepted extensions for files directly inside `dir`,
    /// lowercase and without a leading dot.
    fn extensions(&self, dir: &Path) -> Vec<String>;
}

impl<F> ExtensionLookup for F
where
    F: Fn(&Path) -> Vec<String>,
{
    fn extensions(&self, dir: &Path) -> Vec<String> {
        self(dir)
    }
}

/// Extension lookup backed by user config and `systeminfo.txt` files.
///
/// Resolution order for a directory:
/// 1. extensions configured for the system (directory name) in the user config
/// 2. the list in the directory's `systeminfo.txt`
/// 3. the default extensions
#[derive(Debug, Clone)]
pub struct SystemInfoLookup {
    defaults: Vec<String>,
    overrides: HashMap<String, Vec<String>>,
}

impl SystemInfoLookup {
    #[must_use]
    pub fn new(defaults: &[String], overrides: &HashMap<String, Vec<String>>) -> Self {
        let defaults = if defaults.is_empty() {
            DEFAULT_EXTENSIONS.iter().map(|&ext| ext.to_string()).collect()
        } else {
            clean_extensions(defaults)
        };
        let overrides = overrides
            .iter()
            .map(|(system, extensions)| (system.trim().to_lowercase(), clean_extensions(extensions)))
            .filter(|(_, extensions)| !extensions.is_empty())
            .collect();
        Self { defaults, overrides }
    }

    /// Read the supported extensions from a `systeminfo.txt` file in `dir`.
    ///
    /// Returns `None` if the file is missing or does not list any extensions.
    fn read_system_info(dir: &Path) -> Option<Vec<String>> {
        let path = dir.join(SYSTEM_INFO_FILE);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => return None,
            Err(error) => {
                print_warning!("Failed to read {}: {error}", path.display());
                return None;
            }
        };
        parse_system_info(&content)
    }
}

impl Default for SystemInfoLookup {
    fn default() -> Self {
        Self::new(&[], &HashMap::new())
    }
}

impl ExtensionLookup for SystemInfoLookup {
    fn extensions(&self, dir: &Path) -> Vec<String> {
        let system = crate::get_normalized_dir_name(dir)
            .map(|name| name.to_lowercase())
            .unwrap_or_default();
        if let Some(extensions) = self.overrides.get(&system) {
            return extensions.clone();
        }
        Self::read_system_info(dir).unwrap_or_else(|| self.defaults.clone())
    }
}

/// Parse the extension list that follows the header line of a `systeminfo.txt`.
fn parse_system_info(content: &str) -> Option<Vec<String>> {
    let mut lines = content.lines();
    lines.find(|line| line.contains(SUPPORTED_EXTENSIONS_HEADER))?;
    let extensions: Vec<String> = lines
        .next()
        .map(|line| clean_extensions(&line.split_whitespace().map(str::to_string).collect::<Vec<_>>()))
        .unwrap_or_default();
    if extensions.is_empty() { None } else { Some(extensions) }
}

/// Lowercase, strip leading dots and drop empty and repeated entries.
fn clean_extensions(extensions: &[String]) -> Vec<String> {
    extensions
        .iter()
        .map(|ext| ext.trim().trim_start_matches('.').to_lowercase())
        .filter(|ext| !ext.is_empty())
        .unique()
        .collect()
}
