//! Structure templates and their expansion into placement commands.

use std::collections::HashMap;

use thiserror::Error;

use super::element::{ElementContext, ElementSink, DEFAULT_COIN, END_TRIGGER, INANIMATE};

/// Separator between a symbol and its modifiers inside a grid cell.
const MODIFIER_SEPARATOR: char = ':';

/// Cell spellings that mean "nothing here".
const EMPTY_CELLS: [&str; 2] = [".", "0"];

/// Height of the end-of-level wall.
const END_WALL_HEIGHT: usize = 9;
/// Row of the end-of-level wall that carries the trigger.
const END_TRIGGER_ROW: usize = 4;

/// Everything a [`Structure::build`] call writes through.
pub struct BuildContext<'a> {
    pub aliases: &'a HashMap<String, String>,
    pub elements: &'a mut ElementContext,
    pub sink: &'a mut dyn ElementSink,
}

/// A template row whose width differs from the first row.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("row {} has {len} cells, expected {expected}", .row + 1)]
pub struct RaggedRows {
    /// Zero-based index of the offending row.
    pub row: usize,
    pub len: usize,
    pub expected: usize,
}

/// A 2-D grid of symbols plus the width of floor-only gap built to its right.
///
/// Templates are plain values: the level engine clones one out of the
/// manager and sets the gap on its own copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Structure {
    rows: Vec<Vec<String>>,
    gap_width: u32,
}

impl Structure {
    /// Create a template from rows. Every row must be as wide as the first.
    pub fn from_rows(rows: Vec<Vec<String>>) -> Result<Self, RaggedRows> {
        if let Some(first) = rows.first() {
            let expected = first.len();
            let ragged = rows.iter().enumerate().find(|(_, r)| r.len() != expected);
            if let Some((row, cells)) = ragged {
                return Err(RaggedRows {
                    row,
                    len: cells.len(),
                    expected,
                });
            }
        }
        Ok(Self::rectangular(rows))
    }

    fn rectangular(rows: Vec<Vec<String>>) -> Self {
        Self { rows, gap_width: 0 }
    }

    /// Flat floor the player spawns on.
    pub fn start_floor(width: u32) -> Self {
        Self::rectangular(vec![vec![INANIMATE.to_string(); width as usize]])
    }

    /// One column wide wall whose trigger ends the level.
    pub fn end_wall() -> Self {
        let rows = (0..END_WALL_HEIGHT)
            .map(|row| {
                let cell = if row == END_TRIGGER_ROW {
                    END_TRIGGER
                } else {
                    EMPTY_CELLS[0]
                };
                vec![cell.to_string()]
            })
            .collect();
        Self::rectangular(rows)
    }

    /// Arena for a boss: floor along the bottom, the boss standing in the middle.
    pub fn boss_room(boss: &str, width: u32) -> Self {
        let width = width.max(1) as usize;
        let mut arena = vec![EMPTY_CELLS[0].to_string(); width];
        arena[width / 2] = boss.to_string();
        Self::rectangular(vec![arena, vec![INANIMATE.to_string(); width]])
    }

    pub fn width(&self) -> u32 {
        self.rows.first().map_or(0, |row| row.len() as u32)
    }

    pub fn height(&self) -> u32 {
        self.rows.len() as u32
    }

    pub fn gap_width(&self) -> u32 {
        self.gap_width
    }

    /// Raw symbol at `(row, col)`, if inside the grid.
    pub fn cell(&self, row: usize, col: usize) -> Option<&str> {
        self.rows.get(row)?.get(col).map(String::as_str)
    }

    /// Set the width of the floor gap built after the template.
    /// Range checking is the caller's job.
    pub fn set_gap(&mut self, gap_width: u32) {
        self.gap_width = gap_width;
    }

    /// Place this structure with its left edge at `origin_x`.
    ///
    /// The bottom row sits on the world's floor row. Returns the number of
    /// columns consumed, template width plus gap.
    pub fn build(&self, origin_x: i32, auto_coin_spawn: bool, ctx: &mut BuildContext<'_>) -> u32 {
        let floor_offset = ctx.elements.grid_height - self.height() as i32;

        for (row, cells) in self.rows.iter().enumerate() {
            let y = floor_offset + row as i32;
            for (col, cell) in cells.iter().enumerate() {
                let x = origin_x.saturating_add(col as i32);
                match parse_cell(cell, ctx.aliases) {
                    Some((symbol, modifiers)) => {
                        ctx.elements.place(ctx.sink, symbol, x, y, &modifiers);
                    }
                    None => {
                        if auto_coin_spawn && ctx.elements.roll_coin() {
                            ctx.elements.place(ctx.sink, DEFAULT_COIN, x, y, &[]);
                        }
                    }
                }
            }
        }

        let gap_origin = origin_x.saturating_add(self.width() as i32);
        let floor_row = ctx.elements.grid_height - 1;
        for offset in 0..self.gap_width as i32 {
            let x = gap_origin.saturating_add(offset);
            ctx.elements.place(ctx.sink, INANIMATE, x, floor_row, &[]);
        }

        self.width() + self.gap_width
    }
}

/// Split a cell into its alias-resolved symbol and modifiers.
/// `None` for an empty cell.
fn parse_cell<'a>(
    cell: &'a str,
    aliases: &'a HashMap<String, String>,
) -> Option<(&'a str, Vec<String>)> {
    let mut parts = cell.split(MODIFIER_SEPARATOR);
    let symbol = parts.next().filter(|s| !s.is_empty())?;
    if EMPTY_CELLS.contains(&symbol) {
        return None;
    }
    let resolved = aliases.get(symbol).map_or(symbol, String::as_str);
    if EMPTY_CELLS.contains(&resolved) {
        return None;
    }
    Some((resolved, parts.map(str::to_string).collect()))
}
