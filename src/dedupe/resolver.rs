//! Ranking of duplicate candidates and selection of the copies to keep.
//!
//! Resolution runs an ordered chain of rules over the candidates of one title.
//! Each rule can eliminate losers, pick winners, or pass to the next rule.
//! Special cases sit at the front of the chain and the generic ranking comes last,
//! so new exceptions can be added without touching the generic comparison.

use std::cmp::Ordering;
use std::fmt;

use crate::dedupe::catalog::SystemCatalog;
use crate::dedupe::metadata::{FileRecord, Region};

const MAME: &str = "mame";
const FBNEO: &str = "fbneo";

/// Result of resolving one group of candidates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Records that stay in the collection, in group order.
    pub kept: Vec<FileRecord>,
    /// Records to move to quarantine, in group order.
    pub moved: Vec<FileRecord>,
    /// Human-readable explanation of the special rules that were applied.
    pub notes: Vec<String>,
}

/// Whether the rule chain should continue after a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleOutcome {
    Continue,
    /// Winners have been decided, remaining candidates lose.
    Done,
}

/// Mutable view of a group while the rule chain runs.
///
/// Candidates are referred to by their index in the group,
/// which keeps tie-breaks tied to the original encounter order.
#[derive(Debug)]
pub struct ResolutionState<'a> {
    records: &'a [FileRecord],
    remaining: Vec<usize>,
    kept: Vec<usize>,
    notes: Vec<String>,
}

/// One step in the resolution chain.
///
/// A rule must never eliminate every remaining candidate without keeping one.
pub trait ResolutionRule: fmt::Debug {
    fn name(&self) -> &'static str;

    fn apply(&self, state: &mut ResolutionState<'_>, catalog: &SystemCatalog) -> RuleOutcome;
}

/// Between a single MAME and a single FBNeo copy, FBNeo wins
/// unless it is explicitly non-English while the MAME copy is not.
///
/// Only the loser is eliminated: the winner keeps competing with the other candidates.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArcadePairRule;

/// Keep the best handheld and the best console version separately
/// when a title exists for both kinds of systems.
#[derive(Debug, Clone, Copy)]
pub struct HandheldSplitRule {
    pub keep_both: bool,
}

/// Keep the single best candidate by generation, year, region and size.
#[derive(Debug, Clone, Copy, Default)]
pub struct GenericOrderRule;

/// Decides which members of a duplicate group survive.
#[derive(Debug)]
pub struct Resolver {
    catalog: SystemCatalog,
    rules: Vec<Box<dyn ResolutionRule>>,
}

impl<'a> ResolutionState<'a> {
    #[must_use]
    pub fn new(records: &'a [FileRecord]) -> Self {
        Self {
            records,
            remaining: (0..records.len()).collect(),
            kept: Vec::new(),
            notes: Vec::new(),
        }
    }

    /// Indices of the candidates still competing, in group order.
    #[must_use]
    pub fn remaining(&self) -> &[usize] {
        &self.remaining
    }

    #[must_use]
    pub fn record(&self, index: usize) -> &'a FileRecord {
        &self.records[index]
    }

    /// Mark a candidate as kept and take it out of the competition.
    pub fn keep(&mut self, index: usize) {
        self.remaining.retain(|&i| i != index);
        if !self.kept.contains(&index) {
            self.kept.push(index);
        }
    }

    /// Remove a candidate from the competition, it will be moved.
    pub fn eliminate(&mut self, index: usize) {
        self.remaining.retain(|&i| i != index);
    }

    pub fn note(&mut self, note: impl Into<String>) {
        self.notes.push(note.into());
    }

    /// Best candidate among `pool` by the generic order.
    /// On a full tie the earliest candidate in the pool wins.
    #[must_use]
    pub fn best_of(&self, pool: &[usize], catalog: &SystemCatalog) -> Option<usize> {
        pool.iter().copied().reduce(|winner, candidate| {
            if compare(&self.records[candidate], &self.records[winner], catalog) == Ordering::Greater {
                candidate
            } else {
                winner
            }
        })
    }

    /// Split into kept and moved records, both in group order.
    fn into_resolution(mut self) -> Resolution {
        self.kept.sort_unstable();
        let (kept, moved) = self
            .records
            .iter()
            .enumerate()
            .partition::<Vec<_>, _>(|(index, _)| self.kept.contains(index));
        Resolution {
            kept: kept.into_iter().map(|(_, record)| record.clone()).collect(),
            moved: moved.into_iter().map(|(_, record)| record.clone()).collect(),
            notes: self.notes,
        }
    }
}

/// Compare two candidates by the generic priority order.
///
/// `Ordering::Greater` means `a` is the better copy.
/// Axes in order of precedence:
/// 1. generation rank of the system, higher wins
/// 2. release year, later wins
/// 3. region priority, lower wins
/// 4. file size, smaller wins
#[must_use]
pub fn compare(a: &FileRecord, b: &FileRecord, catalog: &SystemCatalog) -> Ordering {
    catalog
        .generation(&a.system)
        .cmp(&catalog.generation(&b.system))
        .then_with(|| a.year.cmp(&b.year))
        .then_with(|| b.region.cmp(&a.region))
        .then_with(|| b.size.cmp(&a.size))
}

impl ResolutionRule for ArcadePairRule {
    fn name(&self) -> &'static str {
        "MAME/FBNeo"
    }

    fn apply(&self, state: &mut ResolutionState<'_>, _catalog: &SystemCatalog) -> RuleOutcome {
        let of_system = |system: &str| -> Vec<usize> {
            state
                .remaining()
                .iter()
                .copied()
                .filter(|&i| state.record(i).system == system)
                .collect()
        };
        let (mame, fbneo) = match (of_system(MAME).as_slice(), of_system(FBNEO).as_slice()) {
            (&[mame], &[fbneo]) => (mame, fbneo),
            _ => return RuleOutcome::Continue,
        };

        let mame_region = state.record(mame).region;
        let fbneo_region = state.record(fbneo).region;
        let (winner, loser, reason) = if fbneo_region == Region::NonEnglish && mame_region < Region::NonEnglish {
            (mame, fbneo, "FBNeo copy is explicitly non-English")
        } else {
            (fbneo, mame, "FBNeo is preferred")
        };

        state.eliminate(loser);
        let note = format!(
            "{} rule: keeping '{}' over '{}' ({reason})",
            self.name(),
            state.record(winner).path.display(),
            state.record(loser).path.display()
        );
        state.note(note);
        RuleOutcome::Continue
    }
}

impl ResolutionRule for HandheldSplitRule {
    fn name(&self) -> &'static str {
        "Handheld exception"
    }

    fn apply(&self, state: &mut ResolutionState<'_>, catalog: &SystemCatalog) -> RuleOutcome {
        if !self.keep_both {
            return RuleOutcome::Continue;
        }
        let (handhelds, consoles): (Vec<usize>, Vec<usize>) = state
            .remaining()
            .iter()
            .partition(|&&i| catalog.is_handheld(&state.record(i).system));
        if handhelds.is_empty() || consoles.is_empty() {
            return RuleOutcome::Continue;
        }

        state.note(format!(
            "{}: evaluating {} handheld and {} console version(s) separately",
            self.name(),
            handhelds.len(),
            consoles.len()
        ));
        for pool in [handhelds, consoles] {
            if let Some(winner) = state.best_of(&pool, catalog) {
                state.keep(winner);
            }
        }
        RuleOutcome::Done
    }
}

impl ResolutionRule for GenericOrderRule {
    fn name(&self) -> &'static str {
        "General"
    }

    fn apply(&self, state: &mut ResolutionState<'_>, catalog: &SystemCatalog) -> RuleOutcome {
        let pool = state.remaining().to_vec();
        if let Some(winner) = state.best_of(&pool, catalog) {
            state.keep(winner);
        }
        RuleOutcome::Done
    }
}

impl Resolver {
    /// Create a resolver with the standard rule chain.
    #[must_use]
    pub fn new(catalog: SystemCatalog, keep_handheld_and_console: bool) -> Self {
        Self::with_rules(
            catalog,
            vec![
                Box::new(ArcadePairRule),
                Box::new(HandheldSplitRule {
                    keep_both: keep_handheld_and_console,
                }),
                Box::new(GenericOrderRule),
            ],
        )
    }

    /// Create a resolver with a custom rule chain.
    ///
    /// Candidates left undecided after the last rule compete in the generic order.
    #[must_use]
    pub fn with_rules(catalog: SystemCatalog, rules: Vec<Box<dyn ResolutionRule>>) -> Self {
        Self { catalog, rules }
    }

    #[must_use]
    pub const fn catalog(&self) -> &SystemCatalog {
        &self.catalog
    }

    /// Decide which records of a group to keep and which to move.
    ///
    /// Deterministic for a given group order and catalog.
    /// Every record ends up in exactly one of `kept` and `moved`,
    /// and `kept` is never empty for a non-empty group.
    #[must_use]
    pub fn resolve(&self, group: &[FileRecord]) -> Resolution {
        let mut state = ResolutionState::new(group);
        for rule in &self.rules {
            if state.remaining().is_empty() {
                break;
            }
            if rule.apply(&mut state, &self.catalog) == RuleOutcome::Done {
                break;
            }
        }
        if state.kept.is_empty() && !state.remaining().is_empty() {
            GenericOrderRule.apply(&mut state, &self.catalog);
        }
        debug_assert!(group.is_empty() || !state.kept.is_empty(), "resolution must keep a record");
        state.into_resolution()
    }
}
