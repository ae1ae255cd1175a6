//! ROM deduplication engine.
//!
//! Groups files from a collection tree by a canonical title key,
//! ranks each group and moves the losing copies into a quarantine directory.
//! Nothing is ever deleted, and the dry-run mode performs no filesystem changes.

mod catalog;
mod config;
mod error;
mod extensions;
mod metadata;
mod normalize;
mod orchestrator;
mod relocate;
mod resolver;
mod run_log;
mod scanner;

pub use catalog::SystemCatalog;
pub use config::{DedupeConfig, Settings};
pub use error::DedupeError;
pub use extensions::{DEFAULT_EXTENSIONS, ExtensionLookup, SYSTEM_INFO_FILE, SystemInfoLookup};
pub use metadata::{FileRecord, Region, extract};
pub use normalize::normalize;
pub use orchestrator::{DEFAULT_QUARANTINE_DIR, RelocationFailure, RomDedupe, RunSummary};
pub use relocate::{Relocation, relocate};
pub use resolver::{
    ArcadePairRule, GenericOrderRule, HandheldSplitRule, Resolution, ResolutionRule, ResolutionState, Resolver,
    RuleOutcome, compare,
};
pub use run_log::RunLog;
pub use scanner::{ExcludedFile, ExclusionReason, ScanResult, TitleGroups, scan};
