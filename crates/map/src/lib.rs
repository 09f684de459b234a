//! Grid Map: static lookup of passable vs. blocked cells.
//!
//! # Invariants
//! - Lookups outside the configured bounds are always `Blocked`.
//! - Continuous positions are floored before lookup.
//! - The map is never mutated after construction.

mod grid;

pub use grid::{Cell, CellCoord, GridMap, Tile};

/// Errors from building a map.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MapError {
    #[error("map has no cells")]
    Empty,
    #[error("expected {expected} cells, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },
    #[error("row {row} has {actual} cells, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        actual: usize,
    },
    #[error("unknown map glyph {glyph:?} at row {row}, column {column}")]
    UnknownGlyph { glyph: char, row: usize, column: usize },
}
