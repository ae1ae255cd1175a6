//! Static knowledge about systems: hardware generation and handheld classification.

use std::collections::{HashMap, HashSet};

/// Generation rank per system directory name.
///
/// Handhelds are aligned with the home consoles of the same era,
/// and the arcade systems are placed in the 16-bit era for comparison.
const GENERATIONS: &[(&str, u8)] = &[
    // Pre-NES
    ("channelf", 1),
    ("odyssey2", 1),
    ("videopac", 1),
    ("atari2600", 2),
    ("atari5200", 2),
    ("intellivision", 2),
    ("colecovision", 2),
    ("vectrex", 2),
    // 8-bit
    ("nes", 3),
    ("famicom", 3),
    ("mastersystem", 3),
    ("mark3", 3),
    ("sg-1000", 3),
    ("atari7800", 3),
    // 16-bit
    ("megadrive", 4),
    ("genesis", 4),
    ("snes", 4),
    ("sfc", 4),
    ("superfamicom", 4),
    ("pcengine", 4),
    ("tg16", 4),
    ("neogeo", 4),
    ("segacd", 4),
    ("amigacd32", 4),
    ("cdi", 4),
    // 32/64-bit
    ("psx", 5),
    ("n64", 5),
    ("saturn", 5),
    // Often counted as 6th gen, but fits better here against PS2 and GameCube ports
    ("dreamcast", 5),
    ("3do", 5),
    ("jaguar", 5),
    ("pcfx", 5),
    ("sega32x", 5),
    ("virtualboy", 5),
    ("ps2", 6),
    ("gc", 6),
    ("gamecube", 6),
    ("xbox", 6),
    ("wii", 7),
    ("ps3", 7),
    ("xbox360", 7),
    ("wiiu", 8),
    ("ps4", 8),
    ("switch", 8),
    // Arcade
    ("mame", 4),
    ("fbneo", 4),
    // Handhelds
    ("gameboy", 3),
    ("gb", 3),
    ("gamepock", 3),
    ("gamegear", 4),
    ("lynx", 4),
    ("atarilynx", 4),
    ("supervision", 4),
    ("gamate", 4),
    ("gbc", 5),
    ("ngp", 5),
    ("ngpc", 5),
    ("neogeopocketcolor", 5),
    ("wonderswan", 5),
    ("wswan", 5),
    ("wonderswancolor", 5),
    ("wswanc", 5),
    ("gamecom", 5),
    ("gba", 6),
    ("psp", 7),
    ("nds", 7),
    ("3ds", 8),
    ("n3ds", 8),
    ("psvita", 8),
];

const HANDHELDS: &[&str] = &[
    "gameboy",
    "gb",
    "gamegear",
    "lynx",
    "atarilynx",
    "gbc",
    "ngp",
    "ngpc",
    "neogeopocketcolor",
    "wonderswan",
    "wswan",
    "wonderswancolor",
    "wswanc",
    "gba",
    "psp",
    "nds",
    "3ds",
    "n3ds",
    "psvita",
    "gamepock",
    "supervision",
    "gamate",
    "gamecom",
    "pokemini",
    "vsmile",
];

/// Generation ranks and handheld classification for known systems.
///
/// Built once at startup and never modified during a run.
/// System names are lowercase directory names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemCatalog {
    generations: HashMap<String, u8>,
    handhelds: HashSet<String>,
}

impl SystemCatalog {
    /// Create an empty catalog where every system has rank 0 and counts as a console.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            generations: HashMap::new(),
            handhelds: HashSet::new(),
        }
    }

    /// Built-in catalog extended with user-provided ranks and handheld systems.
    ///
    /// User ranks override built-in ones for the same system.
    #[must_use]
    pub fn with_overrides<'a>(
        generations: impl IntoIterator<Item = (&'a String, &'a u8)>,
        handhelds: impl IntoIterator<Item = &'a String>,
    ) -> Self {
        let mut catalog = Self::default();
        for (system, rank) in generations {
            catalog.generations.insert(system.trim().to_lowercase(), *rank);
        }
        for system in handhelds {
            catalog.handhelds.insert(system.trim().to_lowercase());
        }
        catalog
    }

    /// Add or replace the generation rank for a system.
    #[must_use]
    pub fn with_generation(mut self, system: &str, rank: u8) -> Self {
        self.generations.insert(system.to_lowercase(), rank);
        self
    }

    /// Mark a system as a handheld.
    #[must_use]
    pub fn with_handheld(mut self, system: &str) -> Self {
        self.handhelds.insert(system.to_lowercase());
        self
    }

    /// Generation rank for a system, 0 for unknown systems.
    #[must_use]
    pub fn generation(&self, system: &str) -> u8 {
        self.generations.get(system).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn is_handheld(&self, system: &str) -> bool {
        self.handhelds.contains(system)
    }
}

impl Default for SystemCatalog {
    fn default() -> Self {
        Self {
            generations: GENERATIONS
                .iter()
                .map(|&(system, rank)| (system.to_string(), rank))
                .collect(),
            handhelds: HANDHELDS.iter().map(|&system| system.to_string()).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_system_has_rank_zero() {
        let catalog = SystemCatalog::default();
        assert_eq!(catalog.generation("commodore64"), 0);
        assert!(!catalog.is_handheld("commodore64"));
    }

    #[test]
    fn builtin_ranks() {
        let catalog = SystemCatalog::default();
        assert_eq!(catalog.generation("snes"), 4);
        assert_eq!(catalog.generation("psx"), 5);
        assert_eq!(catalog.generation("gba"), 6);
        assert_eq!(catalog.generation("mame"), catalog.generation("fbneo"));
    }

    #[test]
    fn handheld_classification() {
        let catalog = SystemCatalog::default();
        assert!(catalog.is_handheld("gba"));
        assert!(catalog.is_handheld("pokemini"));
        assert!(!catalog.is_handheld("snes"));
        assert!(!catalog.is_handheld("mame"));
    }

    #[test]
    fn overrides_replace_and_extend() {
        let generations = HashMap::from([("SNES".to_string(), 9_u8), ("pico8".to_string(), 3_u8)]);
        let handhelds = vec!["Arduboy".to_string()];
        let catalog = SystemCatalog::with_overrides(&generations, &handhelds);
        assert_eq!(catalog.generation("snes"), 9);
        assert_eq!(catalog.generation("pico8"), 3);
        assert_eq!(catalog.generation("psx"), 5);
        assert!(catalog.is_handheld("arduboy"));
        assert!(catalog.is_handheld("gba"));
    }

    #[test]
    fn empty_catalog_knows_nothing() {
        let catalog = SystemCatalog::empty().with_generation("snes", 4).with_handheld("GBA");
        assert_eq!(catalog.generation("snes"), 4);
        assert_eq!(catalog.generation("psx"), 0);
        assert!(catalog.is_handheld("gba"));
    }
}
