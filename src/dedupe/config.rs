//! Configuration for `RomDedupe`.
//!
//! Handles reading the `[romdedupe]` section of the user config file.
//! The binary merges it with command line arguments into [`Settings`].

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::PathBuf;

use anyhow::Result;
use itertools::Itertools;
use serde::Deserialize;

use crate::dedupe::catalog::SystemCatalog;
use crate::dedupe::extensions::SystemInfoLookup;

/// Config from the user config file.
#[derive(Debug, Deserialize)]
pub struct DedupeConfig {
    /// Default collection root.
    #[serde(default)]
    pub path: Option<PathBuf>,
    /// Quarantine directory for moved duplicates.
    #[serde(default)]
    pub quarantine: Option<PathBuf>,
    #[serde(default)]
    pub dryrun: bool,
    #[serde(default = "default_true")]
    pub keep_handheld_and_console: bool,
    #[serde(default)]
    pub verbose: bool,
    #[serde(default)]
    pub log_file: Option<PathBuf>,
    /// Extensions used for directories without a `systeminfo.txt`.
    #[serde(default)]
    pub default_extensions: Vec<String>,
    /// Accepted extensions per system directory.
    #[serde(default)]
    pub extensions: HashMap<String, Vec<String>>,
    /// Generation rank overrides and additions per system.
    #[serde(default)]
    pub generations: HashMap<String, u8>,
    /// Additional handheld systems.
    #[serde(default)]
    pub handhelds: Vec<String>,
}

/// Wrapper needed for parsing the config file section.
#[derive(Debug, Default, Deserialize)]
struct UserConfig {
    #[serde(default)]
    romdedupe: DedupeConfig,
}

/// Final run settings created from CLI arguments and user config file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub dryrun: bool,
    pub keep_handheld_and_console: bool,
    pub verbose: bool,
    /// Quarantine directory, `<root>/duplicates` when not set.
    pub quarantine: Option<PathBuf>,
    /// Run log file, a timestamped file in the log directory when not set.
    pub log_file: Option<PathBuf>,
    pub default_extensions: Vec<String>,
    pub extensions: HashMap<String, Vec<String>>,
    pub generations: HashMap<String, u8>,
    pub handhelds: Vec<String>,
}

const fn default_true() -> bool {
    true
}

impl Default for DedupeConfig {
    fn default() -> Self {
        Self {
            path: None,
            quarantine: None,
            dryrun: false,
            keep_handheld_and_console: true,
            verbose: false,
            log_file: None,
            default_extensions: Vec::new(),
            extensions: HashMap::new(),
            generations: HashMap::new(),
            handhelds: Vec::new(),
        }
    }
}

impl DedupeConfig {
    /// Try to read user config from the file if it exists.
    /// Otherwise, fall back to default config.
    ///
    /// # Errors
    /// Returns an error if config file exists but cannot be read or parsed.
    pub fn get_user_config() -> Result<Self> {
        let Some(path) = crate::config::CONFIG_PATH.as_deref() else {
            return Ok(Self::default());
        };

        match fs::read_to_string(path) {
            Ok(content) => Self::from_toml_str(&content)
                .map_err(|e| anyhow::anyhow!("Failed to parse config file {}:\n{e}", path.display())),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(error) => Err(anyhow::anyhow!(
                "Failed to read config file {}: {error}",
                path.display()
            )),
        }
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    /// Returns an error if the TOML string is invalid.
    pub fn from_toml_str(toml_str: &str) -> Result<Self> {
        toml::from_str::<UserConfig>(toml_str)
            .map(|config| config.romdedupe)
            .map_err(|e| anyhow::anyhow!("Failed to parse config: {e}"))
    }
}

impl Settings {
    /// System catalog with the configured generation and handheld overrides applied.
    #[must_use]
    pub fn catalog(&self) -> SystemCatalog {
        SystemCatalog::with_overrides(&self.generations, &self.handhelds)
    }

    /// Extension lookup with the configured defaults and per-system overrides.
    #[must_use]
    pub fn extension_lookup(&self) -> SystemInfoLookup {
        SystemInfoLookup::new(&self.default_extensions, &self.extensions)
    }
}

impl Default for Settings {
    fn default() -> Self {
        DedupeConfig::default().into()
    }
}

impl From<DedupeConfig> for Settings {
    fn from(config: DedupeConfig) -> Self {
        Self {
            dryrun: config.dryrun,
            keep_handheld_and_console: config.keep_handheld_and_console,
            verbose: config.verbose,
            quarantine: config.quarantine,
            log_file: config.log_file,
            default_extensions: config.default_extensions,
            extensions: config.extensions,
            generations: config.generations,
            handhelds: config.handhelds,
        }
    }
}

impl fmt::Display for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Settings:")?;
        writeln!(f, "  dryrun: {}", crate::colorize_bool(self.dryrun))?;
        writeln!(
            f,
            "  keep_handheld_and_console: {}",
            crate::colorize_bool(self.keep_handheld_and_console)
        )?;
        writeln!(f, "  verbose: {}", crate::colorize_bool(self.verbose))?;
        if let Some(quarantine) = &self.quarantine {
            writeln!(f, "  quarantine: {}", quarantine.display())?;
        }
        if let Some(log_file) = &self.log_file {
            writeln!(f, "  log_file: {}", log_file.display())?;
        }
        if !self.default_extensions.is_empty() {
            writeln!(f, "  default_extensions: {}", self.default_extensions.join(", "))?;
        }
        for (system, extensions) in self.extensions.iter().sorted_by(|a, b| a.0.cmp(b.0)) {
            writeln!(f, "  extensions.{system}: {}", extensions.join(", "))?;
        }
        for (system, rank) in self.generations.iter().sorted_by(|a, b| a.0.cmp(b.0)) {
            writeln!(f, "  generations.{system}: {rank}")?;
        }
        if !self.handhelds.is_empty() {
            writeln!(f, "  handhelds: {}", self.handhelds.join(", "))?;
        }
        Ok(())
    }
}
