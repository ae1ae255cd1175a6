//! Configuration for `romdedupe`.
//!
//! Combines CLI arguments with the `[romdedupe]` section of the user config file.

use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};
use itertools::Itertools;

use rom_dedupe::dedupe::{DEFAULT_EXTENSIONS, DedupeConfig, Settings};

use crate::Args;

/// Final config created from CLI arguments and user config file.
#[derive(Debug, Clone)]
pub struct Config {
    /// Absolute collection root.
    pub(crate) root: PathBuf,
    pub(crate) settings: Settings,
}

impl Config {
    /// Create config from given command line args and user config file.
    ///
    /// # Errors
    /// Returns an error if the config file cannot be read or parsed,
    /// or the collection root does not exist.
    pub fn from_args(args: Args) -> Result<Self> {
        let user_config = DedupeConfig::get_user_config()?;
        Self::from_user_config(args, user_config)
    }

    /// CLI args take priority over the user config.
    fn from_user_config(args: Args, user_config: DedupeConfig) -> Result<Self> {
        let root = rom_dedupe::resolve_input_path(args.path.as_deref().or(user_config.path.as_deref()))?;

        // A relative output path on the command line is relative to the working directory,
        // while a relative path in the config file is relative to the collection root.
        let quarantine = match args.output {
            Some(path) => {
                let current_dir = env::current_dir().context("Failed to get current working directory")?;
                Some(rom_dedupe::resolve_output_dir(&path, &current_dir))
            }
            None => user_config.quarantine,
        };

        let keep_handheld_and_console = if args.separate {
            true
        } else if args.single {
            false
        } else {
            user_config.keep_handheld_and_console
        };

        // CLI extensions are added on top of the configured or built-in defaults
        let default_extensions: Vec<String> = if user_config.default_extensions.is_empty() {
            DEFAULT_EXTENSIONS.iter().map(|&ext| ext.to_string()).collect()
        } else {
            user_config.default_extensions
        }
        .into_iter()
        .chain(args.extension)
        .map(|ext| ext.trim().trim_start_matches('.').to_lowercase())
        .filter(|ext| !ext.is_empty())
        .unique()
        .collect();

        Ok(Self {
            root,
            settings: Settings {
                dryrun: args.print || user_config.dryrun,
                keep_handheld_and_console,
                verbose: args.verbose || user_config.verbose,
                quarantine,
                log_file: args.log.or(user_config.log_file),
                default_extensions,
                extensions: user_config.extensions,
                generations: user_config.generations,
                handhelds: user_config.handhelds,
            },
        })
    }
}
