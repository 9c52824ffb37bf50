//! Extension discovery and tier classification
//!
//! A directory scan keeps files named `Oxide.*.dll`, drops host
//! infrastructure and stale artifacts of the previous packaging scheme, and
//! sorts the rest into load tiers. Core modules load before game modules,
//! and game modules load before everything else.

use serde::Serialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// File name prefix of every extension module
pub const MODULE_PREFIX: &str = "Oxide.";

/// File name suffix of every extension module
pub const MODULE_SUFFIX: &str = ".dll";

/// Host infrastructure that matches the module pattern but is not an extension
pub const IGNORED_MODULES: &[&str] = &["Oxide.Core.dll", "Oxide.References.dll"];

/// Modules loaded in the first tier
pub const CORE_EXTENSIONS: &[&str] = &[
    "Oxide.CSharp",
    "Oxide.JavaScript",
    "Oxide.Lua",
    "Oxide.MySql",
    "Oxide.Python",
    "Oxide.SQLite",
    "Oxide.Unity",
];

/// Modules loaded in the second tier
pub const GAME_EXTENSIONS: &[&str] = &[
    "Oxide.Blackwake",
    "Oxide.Blockstorm",
    "Oxide.FortressCraft",
    "Oxide.FromTheDepths",
    "Oxide.GangBeasts",
    "Oxide.Hurtworld",
    "Oxide.InterstellarRift",
    "Oxide.MedievalEngineers",
    "Oxide.Nomad",
    "Oxide.PlanetExplorers",
    "Oxide.ReignOfKings",
    "Oxide.Rust",
    "Oxide.RustLegacy",
    "Oxide.SavageLands",
    "Oxide.SevenDaysToDie",
    "Oxide.SpaceEngineers",
    "Oxide.TheForest",
    "Oxide.Terraria",
    "Oxide.Unturned",
];

const LEGACY_CORE_PREFIX: &str = "Oxide.Core.";
const LEGACY_EXT_PREFIX: &str = "Oxide.Ext.";
const LEGACY_GAME_PREFIX: &str = "Oxide.Game.";

/// Load priority class of a module
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Tier {
    Core,
    Game,
    Other,
}

impl Tier {
    /// Classify a module by its file stem (`Oxide.Lua`)
    pub fn classify(stem: &str) -> Self {
        if CORE_EXTENSIONS.contains(&stem) {
            Tier::Core
        } else if GAME_EXTENSIONS.contains(&stem) {
            Tier::Game
        } else {
            Tier::Other
        }
    }
}

/// Result of classifying a directory listing
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ScanResult {
    pub core: Vec<PathBuf>,
    pub game: Vec<PathBuf>,
    pub other: Vec<PathBuf>,
    /// Stale files that must never be loaded
    pub cleanup: Vec<PathBuf>,
}

impl ScanResult {
    /// All loadable paths in load order
    pub fn load_order(&self) -> impl Iterator<Item = (Tier, &PathBuf)> {
        self.core
            .iter()
            .map(|p| (Tier::Core, p))
            .chain(self.game.iter().map(|p| (Tier::Game, p)))
            .chain(self.other.iter().map(|p| (Tier::Other, p)))
    }

    pub fn loadable_count(&self) -> usize {
        self.core.len() + self.game.len() + self.other.len()
    }
}

fn file_name(path: &Path) -> Option<&str> {
    path.file_name().and_then(|n| n.to_str())
}

/// Whether a file name follows the module naming convention
pub fn is_module_file_name(name: &str) -> bool {
    name.len() > MODULE_PREFIX.len() + MODULE_SUFFIX.len()
        && name.starts_with(MODULE_PREFIX)
        && name.ends_with(MODULE_SUFFIX)
}

/// Extension name implied by a module path: `/ext/Oxide.Foo.dll` -> `Foo`
pub fn derive_extension_name(path: &Path) -> Option<String> {
    let stem = path.file_stem()?.to_str()?;
    Some(stem.strip_prefix(MODULE_PREFIX).unwrap_or(stem).to_string())
}

/// Classify candidate module paths, preserving their order within each tier.
///
/// Paths that do not match the module pattern or are on the ignore list are
/// dropped silently.
pub fn classify(candidates: Vec<PathBuf>) -> ScanResult {
    let candidates: Vec<PathBuf> = candidates
        .into_iter()
        .filter(|path| {
            file_name(path)
                .is_some_and(|name| is_module_file_name(name) && !IGNORED_MODULES.contains(&name))
        })
        .collect();

    let present: HashSet<&str> = candidates.iter().filter_map(|p| file_name(p)).collect();
    let mut result = ScanResult::default();

    for path in &candidates {
        let Some(name) = file_name(path) else {
            continue;
        };

        if is_stale(name, &present) {
            tracing::debug!(path = %path.display(), "Queueing stale module for cleanup");
            result.cleanup.push(path.clone());
            continue;
        }

        let stem = name.strip_suffix(MODULE_SUFFIX).unwrap_or(name);
        match Tier::classify(stem) {
            Tier::Core => result.core.push(path.clone()),
            Tier::Game => result.game.push(path.clone()),
            Tier::Other => result.other.push(path.clone()),
        }
    }

    result
}

fn is_stale(name: &str, present: &HashSet<&str>) -> bool {
    if name.contains(LEGACY_CORE_PREFIX)
        && present.contains(name.replacen(LEGACY_CORE_PREFIX, MODULE_PREFIX, 1).as_str())
    {
        return true;
    }
    if name.contains(LEGACY_EXT_PREFIX)
        && present.contains(name.replacen(LEGACY_EXT_PREFIX, MODULE_PREFIX, 1).as_str())
    {
        return true;
    }
    name.contains(LEGACY_GAME_PREFIX)
}

/// Enumerate `dir` and classify the module files found in it.
///
/// Order within a tier follows directory enumeration order.
pub fn scan_directory(dir: &Path) -> std::io::Result<ScanResult> {
    let mut candidates = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_file() {
            candidates.push(path);
        }
    }
    Ok(classify(candidates))
}
