//! Structure generation engine: a seeded cursor over a compiled level.
//!
//! A [`Level`] hands out [`Structure`]s one at a time as the frontier moves
//! right: first a flat start floor, then templates in order (or shuffled),
//! interrupted by bosses when progress crosses a [`BossSetting`] threshold,
//! and finally an end wall unless the level is infinite.
//!
//! All randomness comes from a ChaCha8 stream seeded with the level seed, so
//! the same seed and the same definition always produce the same level.

pub mod boss;
pub mod element;
pub mod library;
pub mod manager;
pub mod structure;

pub use boss::{BossRule, BossSetting, BossTrigger, InvalidTrigger};
pub use element::{
    ElementContext, ElementRegistry, ElementSink, Placement, BLOCKS, BOSSES, DEFAULT_COIN, ENEMIES,
    END_TRIGGER, INANIMATE, PICKUPS,
};
pub use library::{LevelDefinition, LevelLibrary, LevelType, LibraryError};
pub use manager::{SettingKey, StructureManager};
pub use structure::{BuildContext, RaggedRows, Structure};

use std::ops::RangeInclusive;
use std::sync::Arc;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::config::GenerationConfig;

/// Widths a gap may take when `DO_GAPS` is set.
pub const GAP_WIDTHS: RangeInclusive<u32> = 1..=2;

/// Where a level's cursor stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationState {
    NotStarted,
    Building,
    Exhausted,
}

/// What kind of structure [`Level::next`] produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StructureKind {
    Start,
    /// A template, by its index in the manager.
    Regular(usize),
    Boss,
    End,
}

/// One step of the generator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generated {
    pub kind: StructureKind,
    pub structure: Structure,
}

/// A play session's cursor over a compiled level.
///
/// Not thread safe by itself; share the [`StructureManager`], not the level.
#[derive(Debug, Clone)]
pub struct Level {
    manager: Arc<StructureManager>,
    seed: u64,
    random: ChaCha8Rng,
    start_floor_width: u32,
    boss_room_width: u32,
    state: GenerationState,
    generated_until: i32,
    units_built: u32,
    /// Units of regular templates and gaps. Bosses don't advance it.
    boss_progress: u32,
    last_boss_progress: u32,
    current_index: Option<usize>,
}

impl Level {
    pub fn new(manager: Arc<StructureManager>, seed: u64, config: &GenerationConfig) -> Self {
        Self {
            manager,
            seed,
            random: ChaCha8Rng::seed_from_u64(seed),
            start_floor_width: config.start_floor_width,
            boss_room_width: config.boss_room_width,
            state: GenerationState::NotStarted,
            generated_until: 0,
            units_built: 0,
            boss_progress: 0,
            last_boss_progress: 0,
            current_index: None,
        }
    }

    pub fn from_definition(definition: &LevelDefinition, config: &GenerationConfig) -> Self {
        Self::new(Arc::clone(definition.manager()), definition.seed(), config)
    }

    /// Rewind to the start of the level. The replay is identical to the
    /// first run.
    pub fn reset(&mut self) {
        self.random = ChaCha8Rng::seed_from_u64(self.seed);
        self.state = GenerationState::NotStarted;
        self.generated_until = 0;
        self.units_built = 0;
        self.boss_progress = 0;
        self.last_boss_progress = 0;
        self.current_index = None;
    }

    pub fn manager(&self) -> &Arc<StructureManager> {
        &self.manager
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn state(&self) -> GenerationState {
        self.state
    }

    /// Rightmost world x built so far.
    pub fn generated_until(&self) -> i32 {
        self.generated_until
    }

    pub fn units_built(&self) -> u32 {
        self.units_built
    }

    pub fn current_structure_index(&self) -> Option<usize> {
        self.current_index
    }

    /// False once a finite level has handed out its end wall.
    pub fn has_next_structure(&self) -> bool {
        self.state != GenerationState::Exhausted
    }

    /// Build structures until the frontier reaches `max` or the level ends.
    /// Returns how many structures were built.
    pub fn generate(
        &mut self,
        max: i32,
        elements: &mut ElementContext,
        sink: &mut dyn ElementSink,
    ) -> usize {
        let manager = Arc::clone(&self.manager);
        let auto_coin_spawn = manager.is_setting_set(SettingKey::AutoCoinSpawn);
        let mut ctx = BuildContext {
            aliases: manager.aliases(),
            elements,
            sink,
        };

        let mut built = 0;
        let mut stalled = 0;
        while self.generated_until < max && self.has_next_structure() {
            let Some(next) = self.next() else { break };
            let width = next
                .structure
                .build(self.generated_until + 1, auto_coin_spawn, &mut ctx);
            self.generated_until = advance_frontier(self.generated_until, width);
            built += 1;

            // Empty templates without gaps don't move the frontier.
            if width == 0 {
                stalled += 1;
                if stalled > manager.amount_of_structures() {
                    tracing::warn!(
                        frontier = self.generated_until,
                        "templates have no width, stopping generation"
                    );
                    break;
                }
            } else {
                stalled = 0;
            }
        }
        built
    }

    /// Pick the next structure and account for its width.
    ///
    /// Returns `None` once the level is exhausted.
    pub fn next(&mut self) -> Option<Generated> {
        match self.state {
            GenerationState::Exhausted => return None,
            GenerationState::NotStarted => return Some(self.start()),
            GenerationState::Building => {}
        }

        let count = self.manager.amount_of_structures();
        let mut index = self.current_index.map_or(0, |i| i + 1);
        if index >= count {
            if self.is_setting_set(SettingKey::Infinite) && count > 0 {
                index = 0;
            } else {
                return Some(self.end());
            }
        }

        // A boss takes the step but not the template slot.
        let boss = self.manager.boss_setting().next_or_none(
            self.last_boss_progress,
            self.boss_progress,
            self.boss_room_width,
        );
        self.last_boss_progress = self.boss_progress;

        if let Some(structure) = boss {
            self.units_built += structure.width();
            tracing::info!(
                units_built = self.units_built,
                progress = self.boss_progress,
                "boss structure"
            );
            return Some(Generated {
                kind: StructureKind::Boss,
                structure,
            });
        }

        self.current_index = Some(index);
        let selected = if self.is_setting_set(SettingKey::Shuffle) {
            self.random.gen_range(0..count)
        } else {
            index
        };
        let mut structure = self.manager.structure(selected)?.clone();
        let gap = self.next_gap_width();
        structure.set_gap(gap);
        self.units_built += structure.width() + gap;
        self.boss_progress += structure.width() + gap;

        tracing::debug!(
            template = selected,
            width = structure.width(),
            gap,
            units_built = self.units_built,
            "regular structure"
        );
        Some(Generated {
            kind: StructureKind::Regular(selected),
            structure,
        })
    }

    fn start(&mut self) -> Generated {
        let structure = Structure::start_floor(self.start_floor_width);
        self.units_built += structure.width();
        self.state = GenerationState::Building;
        tracing::debug!(width = structure.width(), "start floor");
        Generated {
            kind: StructureKind::Start,
            structure,
        }
    }

    fn end(&mut self) -> Generated {
        let structure = Structure::end_wall();
        self.units_built += structure.width();
        self.current_index = Some(self.manager.amount_of_structures());
        self.state = GenerationState::Exhausted;
        tracing::debug!(units_built = self.units_built, "end of level");
        Generated {
            kind: StructureKind::End,
            structure,
        }
    }

    fn next_gap_width(&mut self) -> u32 {
        if self.is_setting_set(SettingKey::DoGaps) {
            self.random.gen_range(GAP_WIDTHS)
        } else {
            0
        }
    }

    fn is_setting_set(&self, key: SettingKey) -> bool {
        self.manager.is_setting_set(key)
    }
}

/// Frontier after building `width` columns, clamped at `i32::MAX`.
fn advance_frontier(frontier: i32, width: u32) -> i32 {
    frontier.saturating_add(i32::try_from(width).unwrap_or(i32::MAX))
}
