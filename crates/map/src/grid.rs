use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::MapError;

/// A 2D cell coordinate in the tile grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    pub x: i32,
    pub y: i32,
}

impl CellCoord {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Cell containing a continuous ground-plane position.
    pub fn containing(pos: Vec2) -> Self {
        Self {
            x: pos.x.floor() as i32,
            y: pos.y.floor() as i32,
        }
    }

    /// Center of the cell in world units.
    pub fn center(self) -> Vec2 {
        Vec2::new(self.x as f32 + 0.5, self.y as f32 + 0.5)
    }
}

/// One grid tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cell {
    Passable,
    Blocked,
}

impl Cell {
    pub fn is_blocked(self) -> bool {
        self == Cell::Blocked
    }
}

/// What a layout glyph put in a cell. Only walls and trees are drawn; both block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tile {
    Floor,
    Wall,
    Tree,
}

impl Tile {
    fn from_glyph(glyph: char) -> Option<Self> {
        match glyph {
            '.' | ' ' => Some(Tile::Floor),
            '#' => Some(Tile::Wall),
            'T' => Some(Tile::Tree),
            _ => None,
        }
    }

    fn glyph(self) -> char {
        match self {
            Tile::Floor => '.',
            Tile::Wall => '#',
            Tile::Tree => 'T',
        }
    }

    pub fn cell(self) -> Cell {
        match self {
            Tile::Floor => Cell::Passable,
            Tile::Wall | Tile::Tree => Cell::Blocked,
        }
    }
}

/// Static grid of passable and blocked cells, stored row-major.
///
/// Built once at startup and never mutated. Every lookup outside the grid
/// resolves to [`Cell::Blocked`], so nothing can walk off the map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridMap {
    width: usize,
    height: usize,
    tiles: Vec<Tile>,
}

impl GridMap {
    /// Build a map from plain cells. `cells.len()` must equal `width * height`.
    pub fn new(width: usize, height: usize, cells: Vec<Cell>) -> Result<Self, MapError> {
        if width == 0 || height == 0 {
            return Err(MapError::Empty);
        }
        if cells.len() != width * height {
            return Err(MapError::SizeMismatch {
                expected: width * height,
                actual: cells.len(),
            });
        }
        let tiles = cells
            .into_iter()
            .map(|c| match c {
                Cell::Passable => Tile::Floor,
                Cell::Blocked => Tile::Wall,
            })
            .collect();
        Ok(Self {
            width,
            height,
            tiles,
        })
    }

    /// Parse a text layout, one string per row, top row is `y = 0`.
    ///
    /// `#` is a wall, `T` a tree, `.` or space is floor.
    pub fn from_rows<S: AsRef<str>>(rows: &[S]) -> Result<Self, MapError> {
        let width = rows.first().map(|r| r.as_ref().chars().count()).unwrap_or(0);
        if width == 0 {
            return Err(MapError::Empty);
        }

        let mut tiles = Vec::with_capacity(width * rows.len());
        for (y, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            let len = row.chars().count();
            if len != width {
                return Err(MapError::RaggedRow {
                    row: y,
                    expected: width,
                    actual: len,
                });
            }
            for (x, glyph) in row.chars().enumerate() {
                let tile = Tile::from_glyph(glyph).ok_or(MapError::UnknownGlyph {
                    glyph,
                    row: y,
                    column: x,
                })?;
                tiles.push(tile);
            }
        }

        Ok(Self {
            width,
            height: rows.len(),
            tiles,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Whether the coordinate lies inside the configured bounds.
    pub fn contains(&self, coord: CellCoord) -> bool {
        coord.x >= 0
            && coord.y >= 0
            && (coord.x as usize) < self.width
            && (coord.y as usize) < self.height
    }

    /// Cell at integer coordinates; `Blocked` outside the grid.
    pub fn cell_at(&self, x: i32, y: i32) -> Cell {
        self.tile_at(CellCoord::new(x, y))
            .map(Tile::cell)
            .unwrap_or(Cell::Blocked)
    }

    /// Cell containing a continuous position (coordinates are floored).
    pub fn cell_at_position(&self, pos: Vec2) -> Cell {
        let c = CellCoord::containing(pos);
        self.cell_at(c.x, c.y)
    }

    /// Tile at a coordinate, `None` outside the grid.
    pub fn tile_at(&self, coord: CellCoord) -> Option<Tile> {
        if !self.contains(coord) {
            return None;
        }
        Some(self.tiles[coord.y as usize * self.width + coord.x as usize])
    }

    /// All tiles in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (CellCoord, Tile)> + '_ {
        self.tiles.iter().enumerate().map(|(i, t)| {
            let coord = CellCoord::new((i % self.width) as i32, (i / self.width) as i32);
            (coord, *t)
        })
    }

    /// Coordinates of every tree tile.
    pub fn tree_cells(&self) -> Vec<CellCoord> {
        self.iter()
            .filter(|(_, t)| *t == Tile::Tree)
            .map(|(c, _)| c)
            .collect()
    }

    /// Number of blocked cells inside the bounds.
    pub fn blocked_count(&self) -> usize {
        self.tiles.iter().filter(|t| t.cell().is_blocked()).count()
    }

    /// Render the layout back to rows of glyphs.
    pub fn to_rows(&self) -> Vec<String> {
        self.tiles
            .chunks(self.width)
            .map(|row| row.iter().map(|t| t.glyph()).collect())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: [&str; 8] = [
        "########",
        "#......#",
        "#..T...#",
        "#......#",
        "#...##.#",
        "#......#",
        "#......#",
        "########",
    ];

    #[test]
    fn parses_sample_layout() {
        let map = GridMap::from_rows(&SAMPLE).unwrap();
        assert_eq!(map.width(), 8);
        assert_eq!(map.height(), 8);
        assert_eq!(map.cell_at(0, 0), Cell::Blocked);
        assert_eq!(map.cell_at(1, 1), Cell::Passable);
        assert_eq!(map.cell_at(3, 2), Cell::Blocked);
        assert_eq!(map.tree_cells(), vec![CellCoord::new(3, 2)]);
    }

    #[test]
    fn out_of_range_is_blocked() {
        let map = GridMap::new(8, 8, vec![Cell::Passable; 64]).unwrap();
        for (x, y) in [(-1, 0), (0, -1), (8, 0), (0, 8), (-5, -5), (i32::MAX, 3), (3, i32::MIN)] {
            assert_eq!(map.cell_at(x, y), Cell::Blocked, "({x}, {y})");
        }
        assert_eq!(map.cell_at(7, 7), Cell::Passable);
    }

    #[test]
    fn position_lookup_floors() {
        let map = GridMap::from_rows(&["..", ".#"]).unwrap();
        assert_eq!(map.cell_at_position(Vec2::new(1.0, 1.0)), Cell::Blocked);
        assert_eq!(map.cell_at_position(Vec2::new(0.999, 1.5)), Cell::Passable);
        assert_eq!(map.cell_at_position(Vec2::new(-0.001, 0.5)), Cell::Blocked);
    }

    #[test]
    fn containing_cell() {
        assert_eq!(CellCoord::containing(Vec2::new(2.7, -0.2)), CellCoord::new(2, -1));
        assert_eq!(CellCoord::new(2, 3).center(), Vec2::new(2.5, 3.5));
    }

    #[test]
    fn rejects_ragged_rows() {
        let err = GridMap::from_rows(&["###", "#."]).unwrap_err();
        assert!(matches!(err, MapError::RaggedRow { row: 1, expected: 3, actual: 2 }));
    }

    #[test]
    fn rejects_unknown_glyph() {
        let err = GridMap::from_rows(&["#x#"]).unwrap_err();
        assert!(matches!(err, MapError::UnknownGlyph { glyph: 'x', row: 0, column: 1 }));
    }

    #[test]
    fn rejects_empty_and_mismatched() {
        let empty: [&str; 0] = [];
        assert!(matches!(GridMap::from_rows(&empty), Err(MapError::Empty)));
        assert!(matches!(GridMap::new(0, 3, vec![]), Err(MapError::Empty)));
        assert!(matches!(
            GridMap::new(2, 2, vec![Cell::Passable; 3]),
            Err(MapError::SizeMismatch { expected: 4, actual: 3 })
        ));
    }

    #[test]
    fn rows_round_trip() {
        let map = GridMap::from_rows(&SAMPLE).unwrap();
        assert_eq!(map.to_rows(), SAMPLE.to_vec());
        assert_eq!(map.blocked_count(), 28 + 1 + 2);
    }
}
