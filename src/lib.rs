//! LDL: compiles textual level definitions and generates platformer levels
//! from them, one structure at a time, deterministically per seed.

pub mod config;
pub mod dsl;
pub mod level;
pub mod logging;
