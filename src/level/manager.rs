//! Compiled form of one level definition.

use std::collections::HashMap;

use super::boss::BossSetting;
use super::structure::Structure;

/// Setting keys the generator understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingKey {
    /// Loop over the templates forever instead of ending the level.
    Infinite,
    /// Pick templates at random instead of in order.
    Shuffle,
    /// Insert a one or two columns wide floor gap after every regular structure.
    DoGaps,
    /// Sprinkle coins into empty cells.
    AutoCoinSpawn,
    /// Arcade group this level belongs to.
    Group,
}

impl SettingKey {
    pub const ALL: [SettingKey; 5] = [
        SettingKey::Infinite,
        SettingKey::Shuffle,
        SettingKey::DoGaps,
        SettingKey::AutoCoinSpawn,
        SettingKey::Group,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SettingKey::Infinite => "INFINITE",
            SettingKey::Shuffle => "SHUFFLE",
            SettingKey::DoGaps => "DO_GAPS",
            SettingKey::AutoCoinSpawn => "AUTO_COIN_SPAWN",
            SettingKey::Group => "GROUP",
        }
    }
}

/// Alias table, settings, boss rules and ordered structure templates.
///
/// Filled by the parser, then only read. Share it between levels with an `Arc`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StructureManager {
    aliases: HashMap<String, String>,
    settings: HashMap<String, String>,
    boss_setting: BossSetting,
    structures: Vec<Structure>,
}

impl StructureManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_alias(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.aliases.insert(key.into(), value.into());
    }

    pub fn set_setting(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.settings.insert(key.into(), value.into());
    }

    pub fn add_structure(&mut self, structure: Structure) {
        self.structures.push(structure);
    }

    pub fn boss_setting_mut(&mut self) -> &mut BossSetting {
        &mut self.boss_setting
    }

    pub fn boss_setting(&self) -> &BossSetting {
        &self.boss_setting
    }

    /// Template at `index`, in definition order.
    pub fn structure(&self, index: usize) -> Option<&Structure> {
        self.structures.get(index)
    }

    pub fn structures(&self) -> &[Structure] {
        &self.structures
    }

    pub fn amount_of_structures(&self) -> usize {
        self.structures.len()
    }

    pub fn aliases(&self) -> &HashMap<String, String> {
        &self.aliases
    }

    /// The symbol `symbol` is aliased to, or `symbol` itself.
    pub fn resolve_alias<'a>(&'a self, symbol: &'a str) -> &'a str {
        self.aliases.get(symbol).map_or(symbol, String::as_str)
    }

    pub fn settings(&self) -> &HashMap<String, String> {
        &self.settings
    }

    pub fn setting(&self, key: &str) -> Option<&str> {
        self.settings.get(key).map(String::as_str)
    }

    /// Whether `key` is present with a truthy value.
    pub fn is_setting_set(&self, key: SettingKey) -> bool {
        self.setting(key.as_str()).is_some_and(is_truthy)
    }
}

/// Anything but empty, `0` or `false` counts as set.
fn is_truthy(value: &str) -> bool {
    let value = value.trim();
    !(value.is_empty() || value == "0" || value.eq_ignore_ascii_case("false"))
}
