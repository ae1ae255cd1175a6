//! Canonical title keys from noisy ROM filenames.

use std::path::Path;
use std::sync::LazyLock;

use regex::{Captures, Regex};

/// Regex to match a single bracketed `[...]` or parenthesized `(...)` segment
static RE_BRACKETED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[[^\]]*\]|\([^)]*\)").expect("Invalid bracket regex"));

/// Regex to match volume markers like `(Disc 1)`, `[CD2]` or `(Disk 1 of 3)`
static RE_DISC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^[(\[]\s*(?:disc|disk|cd)\s*\d+(?:\s*of\s*\d+)?\s*[)\]]$").expect("Invalid disc regex")
});

/// Regex to match game mode qualifiers like `(Arcade Mode)`
static RE_MODE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)^\([^()]*\smode\)$").expect("Invalid mode regex"));

/// Regex to match two or more consecutive whitespace characters
static RE_MULTI_SPACES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s{2,}").expect("Invalid spaces regex"));

/// Reduce a filename to the canonical key used for grouping duplicates.
///
/// The extension and all bracketed metadata (region, revision, publisher, ...) are removed.
/// Disc markers and mode qualifiers are kept verbatim and in place,
/// so that "Game (Disc 1)" and "Game (Disc 2)" are never considered the same title.
///
/// Returns `None` when nothing is left of the name,
/// since such a file cannot safely be compared against anything.
///
/// ```rust
/// use rom_dedupe::dedupe::normalize;
///
/// assert_eq!(normalize("Final Fantasy VII (USA) (Disc 2).chd").as_deref(), Some("Final Fantasy VII (Disc 2)"));
/// assert_eq!(normalize("Tetris (World) (Rev 1).zip").as_deref(), Some("Tetris"));
/// assert_eq!(normalize("(USA).zip"), None);
/// ```
#[must_use]
pub fn normalize(file_name: &str) -> Option<String> {
    let stem = Path::new(file_name)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or(file_name);

    // Segments are classified one at a time and preserved ones are written back as-is,
    // so there is no placeholder text that could collide with the title itself.
    let stripped = RE_BRACKETED.replace_all(stem, |caps: &Captures| {
        let segment = &caps[0];
        if is_preserved(segment) {
            segment.to_string()
        } else {
            String::new()
        }
    });

    let key = RE_MULTI_SPACES.replace_all(&stripped, " ").trim().to_string();
    if key.is_empty() { None } else { Some(key) }
}

/// Check if a bracketed segment carries title identity and must survive normalization.
fn is_preserved(segment: &str) -> bool {
    RE_DISC.is_match(segment) || RE_MODE.is_match(segment)
}
