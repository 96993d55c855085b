//! Level storage: compiled definitions keyed by level id, arcade groups,
//! and seed policy per level type.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use thiserror::Error;

use crate::dsl::{CompileError, Compiler};

use super::manager::{SettingKey, StructureManager};

/// File extension of level definition files.
pub const LEVEL_EXTENSION: &str = "ldl";
/// Group for arcade levels without a `GROUP` setting.
pub const DEFAULT_GROUP: &str = "default";

const SECONDS_PER_DAY: u64 = 86_400;

/// The kind of level a definition is played as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LevelType {
    Infinite,
    LevelOfTheDay,
    Arcade,
    BossRush,
}

impl LevelType {
    /// Type of a level stored under `id`. Everything not reserved is arcade.
    pub fn from_level_id(id: &str) -> Self {
        match id {
            "infinite" => LevelType::Infinite,
            "lotd" => LevelType::LevelOfTheDay,
            "bossrush" => LevelType::BossRush,
            _ => LevelType::Arcade,
        }
    }

    /// Seed a level of this type is generated with.
    ///
    /// Arcade and boss rush levels look the same on every run, the level of
    /// the day changes daily, and infinite levels use the caller's session
    /// seed.
    pub fn seed(&self, id: &str, day_index: u64, session_seed: u64) -> u64 {
        match self {
            LevelType::Arcade | LevelType::BossRush => seed_for_id(id),
            LevelType::LevelOfTheDay => lotd_seed(day_index),
            LevelType::Infinite => session_seed,
        }
    }
}

/// Stable seed derived from a level id (FNV-1a).
pub fn seed_for_id(id: &str) -> u64 {
    id.bytes().fold(0xcbf2_9ce4_8422_2325, |hash, byte| {
        (hash ^ u64::from(byte)).wrapping_mul(0x0100_0000_01b3)
    })
}

/// Seed of the level of the day for a day number (splitmix64 finalizer).
pub fn lotd_seed(day_index: u64) -> u64 {
    let mut z = day_index.wrapping_add(0x9e37_79b9_7f4a_7c15);
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

/// Days since the Unix epoch, in UTC.
pub fn current_day_index() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_secs() / SECONDS_PER_DAY)
}

fn io_err(path: &Path) -> impl FnOnce(std::io::Error) -> LibraryError {
    let path = path.to_path_buf();
    move |source| LibraryError::Io { path, source }
}

/// A compiled level together with the identity it is played under.
#[derive(Debug, Clone)]
pub struct LevelDefinition {
    id: String,
    level_type: LevelType,
    seed: u64,
    manager: Arc<StructureManager>,
}

impl LevelDefinition {
    pub fn new(
        id: impl Into<String>,
        level_type: LevelType,
        seed: u64,
        manager: Arc<StructureManager>,
    ) -> Self {
        Self {
            id: id.into(),
            level_type,
            seed,
            manager,
        }
    }

    /// Compile `source` into a definition. Nothing is produced on error.
    pub fn compile(
        id: impl Into<String>,
        level_type: LevelType,
        seed: u64,
        source: &str,
    ) -> Result<Self, CompileError> {
        let id = id.into();
        let manager = Compiler::compile(source)?;
        tracing::info!(
            level = %id,
            structures = manager.amount_of_structures(),
            "compiled level"
        );
        Ok(Self::new(id, level_type, seed, Arc::new(manager)))
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn level_type(&self) -> LevelType {
        self.level_type
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Same definition, different seed.
    pub fn with_seed(&self, seed: u64) -> Self {
        Self {
            seed,
            ..self.clone()
        }
    }

    pub fn manager(&self) -> &Arc<StructureManager> {
        &self.manager
    }

    /// Arcade group named by the `GROUP` setting.
    pub fn group(&self) -> &str {
        self.manager
            .setting(SettingKey::Group.as_str())
            .unwrap_or(DEFAULT_GROUP)
    }
}

#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// All levels known to the game, plus the ones that failed to compile.
#[derive(Debug, Clone, Default)]
pub struct LevelLibrary {
    levels: BTreeMap<String, LevelDefinition>,
    unavailable: BTreeMap<String, CompileError>,
    day_index: u64,
    session_seed: u64,
}

impl LevelLibrary {
    pub fn new(day_index: u64, session_seed: u64) -> Self {
        Self {
            day_index,
            session_seed,
            ..Self::default()
        }
    }

    /// Compile every `*.ldl` file in `dir`. The file stem is the level id.
    ///
    /// Levels that fail to compile are recorded as unavailable instead of
    /// failing the whole load.
    pub fn load_dir(
        dir: impl AsRef<Path>,
        day_index: u64,
        session_seed: u64,
    ) -> Result<Self, LibraryError> {
        let dir = dir.as_ref();
        let mut library = Self::new(day_index, session_seed);
        let entries = std::fs::read_dir(dir).map_err(io_err(dir))?;
        for entry in entries {
            let path = entry.map_err(io_err(dir))?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(LEVEL_EXTENSION) {
                continue;
            }
            let Some(id) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let source = std::fs::read_to_string(&path).map_err(io_err(&path))?;
            // Failures are kept in `unavailable`.
            let _ = library.insert_source(id, &source);
        }

        tracing::info!(
            dir = %dir.display(),
            levels = library.levels.len(),
            unavailable = library.unavailable.len(),
            "loaded level library"
        );
        Ok(library)
    }

    /// Compile and register one level.
    pub fn insert_source(&mut self, id: &str, source: &str) -> Result<&LevelDefinition, CompileError> {
        let level_type = LevelType::from_level_id(id);
        let seed = level_type.seed(id, self.day_index, self.session_seed);
        match LevelDefinition::compile(id, level_type, seed, source) {
            Ok(definition) => {
                self.unavailable.remove(id);
                self.levels.insert(id.to_string(), definition);
                Ok(&self.levels[id])
            }
            Err(err) => {
                tracing::warn!(level = id, "level unavailable: {err}");
                self.levels.remove(id);
                self.unavailable.insert(id.to_string(), err.clone());
                Err(err)
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<&LevelDefinition> {
        self.levels.get(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.levels.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Levels that failed to compile, with the reason.
    pub fn unavailable(&self) -> impl Iterator<Item = (&str, &CompileError)> {
        self.unavailable.iter().map(|(id, err)| (id.as_str(), err))
    }

    /// Arcade level ids per group, ordered by id.
    pub fn arcade_groups(&self) -> BTreeMap<&str, Vec<&str>> {
        let mut groups: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
        for definition in self.levels.values() {
            if definition.level_type() == LevelType::Arcade {
                groups
                    .entry(definition.group())
                    .or_default()
                    .push(definition.id());
            }
        }
        groups
    }

    /// The arcade level after `id` in its group, if any.
    pub fn next_level(&self, id: &str) -> Option<&str> {
        let definition = self.get(id)?;
        if definition.level_type() != LevelType::Arcade {
            return None;
        }
        let groups = self.arcade_groups();
        let group = groups.get(definition.group())?;
        let position = group.iter().position(|other| *other == id)?;
        group.get(position + 1).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_type_from_id() {
        assert_eq!(LevelType::from_level_id("infinite"), LevelType::Infinite);
        assert_eq!(LevelType::from_level_id("lotd"), LevelType::LevelOfTheDay);
        assert_eq!(LevelType::from_level_id("bossrush"), LevelType::BossRush);
        assert_eq!(LevelType::from_level_id("level_03"), LevelType::Arcade);
    }

    #[test]
    fn seeds_per_type() {
        assert_eq!(LevelType::Arcade.seed("a", 1, 99), seed_for_id("a"));
        assert_ne!(seed_for_id("a"), seed_for_id("b"));
        assert_eq!(LevelType::Infinite.seed("infinite", 1, 99), 99);
        assert_eq!(LevelType::LevelOfTheDay.seed("lotd", 5, 99), lotd_seed(5));
        assert_ne!(lotd_seed(5), lotd_seed(6));
    }

    #[test]
    fn seed_for_id_is_stable() {
        // FNV-1a offset basis for the empty string.
        assert_eq!(seed_for_id(""), 0xcbf2_9ce4_8422_2325);
        assert_eq!(seed_for_id("level"), seed_for_id("level"));
    }

    #[test]
    fn definition_group_defaults() {
        let def = LevelDefinition::compile("a", LevelType::Arcade, 1, "{{A}}").unwrap();
        assert_eq!(def.group(), DEFAULT_GROUP);
        let def =
            LevelDefinition::compile("b", LevelType::Arcade, 1, "#SETTING::GROUP->cave").unwrap();
        assert_eq!(def.group(), "cave");
        assert_eq!(def.with_seed(7).seed(), 7);
    }

    #[test]
    fn next_level_within_group() {
        let mut library = LevelLibrary::new(0, 0);
        library.insert_source("a1", "#SETTING::GROUP->a {{X}}").unwrap();
        library.insert_source("a2", "#SETTING::GROUP->a {{X}}").unwrap();
        library.insert_source("b1", "#SETTING::GROUP->b {{X}}").unwrap();
        library.insert_source("infinite", "#SETTING::INFINITE->1 {{X}}").unwrap();
        assert_eq!(library.next_level("a1"), Some("a2"));
        assert_eq!(library.next_level("a2"), None);
        assert_eq!(library.next_level("b1"), None);
        assert_eq!(library.next_level("infinite"), None);
        assert_eq!(library.next_level("missing"), None);
        assert_eq!(library.arcade_groups().len(), 2);
    }

    #[test]
    fn failed_level_is_unavailable() {
        let mut library = LevelLibrary::new(0, 0);
        assert!(library.insert_source("broken", "#ALIAS::X").is_err());
        assert!(library.get("broken").is_none());
        let unavailable: Vec<_> = library.unavailable().map(|(id, _)| id).collect();
        assert_eq!(unavailable, vec!["broken"]);
    }

    #[test]
    fn load_dir_compiles_levels() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("one.ldl"), "{{A A}}").unwrap();
        std::fs::write(dir.path().join("two.ldl"), "{{A A}").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "not a level").unwrap();

        let library = LevelLibrary::load_dir(dir.path(), 0, 0).unwrap();
        assert_eq!(library.ids().collect::<Vec<_>>(), vec!["one"]);
        assert_eq!(library.unavailable().count(), 1);
        assert_eq!(library.get("one").unwrap().seed(), seed_for_id("one"));
    }

    #[test]
    fn load_missing_dir_is_error() {
        let result = LevelLibrary::load_dir("/nonexistent/ldl/levels", 0, 0);
        assert!(matches!(result, Err(LibraryError::Io { .. })));
    }
}
