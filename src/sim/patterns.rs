//! Built-in maps: the starting screen and per-stage chunk templates
//!
//! Cells: `.` empty, `g` grass, `c` cloud, `a` asteroid. Platforms sit on
//! every other row so the next one is always within a jump.

use super::tile::TileKind;
use super::world::Stage;

/// A row/column grid of tile kinds
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    pub rows: Vec<Vec<TileKind>>,
}

impl Pattern {
    pub fn from_rows(rows: &[&str]) -> Self {
        Self {
            rows: rows
                .iter()
                .map(|row| row.bytes().map(TileKind::from_cell).collect())
                .collect(),
        }
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Non-empty cells as (row, col, kind)
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize, TileKind)> + '_ {
        self.rows.iter().enumerate().flat_map(|(r, row)| {
            row.iter()
                .enumerate()
                .filter(|(_, kind)| !kind.is_empty())
                .map(move |(c, &kind)| (r, c, kind))
        })
    }
}

/// The screen the player starts on; its top row is y = 0
pub const INITIAL_MAP: &[&str] = &[
    "gg......gg",
    "..........",
    "......ggg.",
    "..........",
    ".ggg......",
    "..........",
    ".....ggg..",
    "..........",
    "gg........",
    "..........",
    "....ggg...",
    "..........",
    "ggg....ggg",
    "..........",
    "gggggggggg",
];

const GRASS: &[&[&str]] = &[
    &[
        "ggg.......",
        "..........",
        "....ggg...",
        "..........",
        ".......ggg",
        "..........",
        "...ggg....",
        "..........",
        "gg.....gg.",
        "..........",
    ],
    &[
        ".....gggg.",
        "..........",
        "gg........",
        "..........",
        "....ggg...",
        "..........",
        "........gg",
        "..........",
        "..ggg.....",
        "..........",
    ],
    &[
        "gg......gg",
        "..........",
        "....gg....",
        "..........",
        "ggg....ggg",
        "..........",
        "...gggg...",
        "..........",
        "g.......gg",
        "..........",
    ],
];

const CLOUDS: &[&[&str]] = &[
    &[
        "..cccc....",
        "..........",
        "......cccc",
        "..........",
        "cccc......",
        "..........",
        "....cccc..",
        "..........",
        "cc......cc",
        "..........",
    ],
    &[
        "cc.....ccc",
        "..........",
        "...ccc....",
        "..........",
        "......ccc.",
        "..........",
        ".ccc......",
        "..........",
        ".....ccc..",
        "..........",
    ],
    &[
        "....ccc...",
        "..........",
        "c.......cc",
        "..........",
        "...cc.....",
        "..........",
        "......ccc.",
        "..........",
        "ccc.......",
        "..........",
    ],
];

const ASTEROIDS: &[&[&str]] = &[
    &[
        ".a.....a..",
        "..........",
        "....aa....",
        "..........",
        "a.......aa",
        "..........",
        "...a..a...",
        "..........",
        ".aa.......",
        "..........",
    ],
    &[
        "......aa..",
        "..........",
        "..a.......",
        "..........",
        ".....a..a.",
        "..........",
        "aa........",
        "..........",
        "....aa....",
        "..........",
    ],
    &[
        "a...a...a.",
        "..........",
        "..aa......",
        "..........",
        "......aa..",
        "..........",
        "...a......",
        "..........",
        ".......aa.",
        "..........",
    ],
];

/// Chunk templates available in `stage`
pub fn builtin_patterns(stage: Stage) -> Vec<Pattern> {
    let templates = match stage {
        Stage::Grass => GRASS,
        Stage::Clouds => CLOUDS,
        Stage::Asteroids => ASTEROIDS,
    };
    templates.iter().map(|rows| Pattern::from_rows(rows)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::WORLD_COLUMNS;

    #[test]
    fn test_templates_fit_a_chunk() {
        for stage in Stage::ALL {
            let patterns = builtin_patterns(stage);
            assert!(!patterns.is_empty());
            for pattern in &patterns {
                assert_eq!(pattern.height(), 10);
                assert!(pattern.rows.iter().all(|r| r.len() == WORLD_COLUMNS));
            }
        }
    }

    #[test]
    fn test_templates_use_their_stage_tile() {
        for stage in Stage::ALL {
            for pattern in builtin_patterns(stage) {
                assert!(pattern.cells().all(|(_, _, kind)| kind == stage.tile_kind()));
                assert!(pattern.cells().count() > 0);
            }
        }
    }

    #[test]
    fn test_initial_map_has_ground() {
        let map = Pattern::from_rows(INITIAL_MAP);
        let last = map.height() - 1;
        assert_eq!(map.cells().filter(|(r, _, _)| *r == last).count(), WORLD_COLUMNS);
        // Top row is populated so the first chunk above stays reachable
        assert!(map.cells().any(|(r, _, _)| r == 0));
    }
}
