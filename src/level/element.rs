//! Element registry and placement output.
//!
//! The core never constructs game elements itself. It resolves symbols
//! against an [`ElementRegistry`] and hands `(id, x, y, modifiers)` commands to
//! an [`ElementSink`] supplied by the scene.

use std::collections::BTreeMap;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

use crate::config::GenerationConfig;

/// Plain floor block. Also the placeholder for unknown symbols.
pub const INANIMATE: &str = "Inanimate";
/// Invisible wall that ends a finite level on contact.
pub const END_TRIGGER: &str = "EndTrigger";
/// Coin placed by auto coin spawn.
pub const DEFAULT_COIN: &str = "DefaultCoin";

/// Terrain pieces.
pub const BLOCKS: [&str; 2] = ["MovingBox", "ReflectionBox"];
/// Enemies, also placeable as the `Enemies` group.
pub const ENEMIES: [&str; 4] = ["RektKiller", "Slurp", "Cannon", "Rocket"];
/// Pickups, also placeable as the `Pickups` group.
pub const PICKUPS: [&str; 3] = ["Life", "EvilCoin", "GhostCoin"];
pub const BOSSES: [&str; 1] = ["RektSmasher"];

/// One placement command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Placement {
    pub id: String,
    pub x: i32,
    pub y: i32,
    pub modifiers: Vec<String>,
}

/// Receiver of placement commands (the scene's element factory).
pub trait ElementSink {
    fn generate(&mut self, id: &str, x: i32, y: i32, modifiers: &[String]);
}

impl ElementSink for Vec<Placement> {
    fn generate(&mut self, id: &str, x: i32, y: i32, modifiers: &[String]) {
        self.push(Placement {
            id: id.to_string(),
            x,
            y,
            modifiers: modifiers.to_vec(),
        });
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Entry {
    Element,
    Group(Vec<String>),
}

/// Table of known element ids and named groups.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ElementRegistry {
    entries: BTreeMap<String, Entry>,
}

impl ElementRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the elements the generator itself emits.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        for id in [INANIMATE, END_TRIGGER, DEFAULT_COIN] {
            registry.register(id);
        }
        registry
    }

    /// The full element set of the game: defaults, blocks, enemies,
    /// pickups and bosses, plus the `Enemies` and `Pickups` groups.
    pub fn standard() -> Self {
        let mut registry = Self::with_defaults();
        for id in BLOCKS.into_iter().chain(BOSSES) {
            registry.register(id);
        }
        registry
            .register_group("Enemies", ENEMIES)
            .register_group("Pickups", PICKUPS);
        registry
    }

    pub fn register(&mut self, id: impl Into<String>) -> &mut Self {
        self.entries.insert(id.into(), Entry::Element);
        self
    }

    /// Register a group. Its members become known elements as well.
    /// Placing the group id places a random member.
    pub fn register_group<I, S>(&mut self, name: impl Into<String>, members: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let members: Vec<String> = members.into_iter().map(Into::into).collect();
        for member in &members {
            self.entries.insert(member.clone(), Entry::Element);
        }
        self.entries.insert(name.into(), Entry::Group(members));
        self
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    /// Resolve a symbol to a concrete element id.
    ///
    /// Unknown ids and empty groups fall back to [`INANIMATE`].
    pub fn resolve<'a>(&'a self, id: &'a str, rng: &mut ChaCha8Rng) -> &'a str {
        match self.entries.get(id) {
            Some(Entry::Element) => id,
            Some(Entry::Group(members)) if !members.is_empty() => {
                &members[rng.gen_range(0..members.len())]
            }
            Some(Entry::Group(_)) => {
                tracing::warn!(group = id, "empty element group, placing {INANIMATE}");
                INANIMATE
            }
            None => {
                tracing::warn!(symbol = id, "unknown symbol, placing {INANIMATE}");
                INANIMATE
            }
        }
    }
}

/// Per-session element state: the registry, build-time randomness and
/// world geometry. Owned by the scene and passed into every build.
#[derive(Debug, Clone)]
pub struct ElementContext {
    pub registry: ElementRegistry,
    pub grid_height: i32,
    pub coin_probability: f64,
    rng: ChaCha8Rng,
}

impl ElementContext {
    pub fn new(registry: ElementRegistry, config: &GenerationConfig, seed: u64) -> Self {
        Self {
            registry,
            grid_height: config.grid_height,
            coin_probability: config.coin_probability,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Resolve `id` through the registry and forward it to `sink`.
    pub fn place(
        &mut self,
        sink: &mut dyn ElementSink,
        id: &str,
        x: i32,
        y: i32,
        modifiers: &[String],
    ) {
        let resolved = self.registry.resolve(id, &mut self.rng);
        sink.generate(resolved, x, y, modifiers);
    }

    /// Roll for an auto-spawned coin.
    pub fn roll_coin(&mut self) -> bool {
        self.coin_probability > 0.0 && self.rng.gen_bool(self.coin_probability.min(1.0))
    }
}
