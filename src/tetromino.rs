//! Piece shape definitions
//!
//! All 8 piece patterns as flattened 4x4 boolean grids. Patterns are stored
//! once, in their unrotated layout; every other orientation is derived through
//! [`crate::rotation::rotate`].

use ratatui::style::Color;

/// Number of piece variants
pub const SHAPE_COUNT: usize = 8;

/// Side length of a piece bounding box
pub const BOX_SIZE: i32 = 4;

/// A 4x4 pattern, row-major, `true` = occupied
pub type Pattern = [bool; 16];

const X: bool = true;
const O: bool = false;

#[rustfmt::skip]
const PATTERNS: [Pattern; SHAPE_COUNT] = [
    // ..X.
    // ..X.
    // ..X.
    // ..X.
    [O, O, X, O,
     O, O, X, O,
     O, O, X, O,
     O, O, X, O],
    // ..X.
    // .XX.
    // .X..
    [O, O, X, O,
     O, X, X, O,
     O, X, O, O,
     O, O, O, O],
    // .X..
    // .XX.
    // ..X.
    [O, X, O, O,
     O, X, X, O,
     O, O, X, O,
     O, O, O, O],
    // .XX.
    // .XX.
    [O, O, O, O,
     O, X, X, O,
     O, X, X, O,
     O, O, O, O],
    // ..X.
    // .XX.
    // ..X.
    [O, O, X, O,
     O, X, X, O,
     O, O, X, O,
     O, O, O, O],
    // .X..
    // .XX.
    // .X..
    [O, X, O, O,
     O, X, X, O,
     O, X, O, O,
     O, O, O, O],
    // .XX.
    // ..X.
    // ..X.
    [O, O, O, O,
     O, X, X, O,
     O, O, X, O,
     O, O, X, O],
    // .XX.
    // .X..
    // .X..
    [O, O, O, O,
     O, X, X, O,
     O, X, O, O,
     O, X, O, O],
];

/// Identifies one of the 8 piece variants (0-7)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShapeId(u8);

impl ShapeId {
    /// Every shape, in id order
    pub const ALL: [ShapeId; SHAPE_COUNT] = [
        Self(0),
        Self(1),
        Self(2),
        Self(3),
        Self(4),
        Self(5),
        Self(6),
        Self(7),
    ];

    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// Value written into the grid when this shape locks (`id + 1`)
    pub fn cell_value(self) -> u8 {
        self.0 + 1
    }

    pub fn pattern(self) -> &'static Pattern {
        &PATTERNS[self.index()]
    }

    /// Whether the unrotated pattern has a block at flattened index `i`
    pub fn is_occupied(self, i: usize) -> bool {
        self.pattern()[i]
    }

    /// One glyph per shape, `A` through `H`
    pub fn glyph(self) -> char {
        (b'A' + self.0) as char
    }

    pub fn color(self) -> Color {
        match self.0 {
            0 => Color::Cyan,
            1 => Color::Green,
            2 => Color::Red,
            3 => Color::Yellow,
            4 => Color::Magenta,
            5 => Color::Rgb(255, 165, 0), // Orange
            6 => Color::Blue,
            _ => Color::LightMagenta,
        }
    }
}
