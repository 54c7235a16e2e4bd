//! Playfield grid and collision detection

use crate::rotation::rotate;
use crate::tetromino::{BOX_SIZE, ShapeId};
use ratatui::style::Color;

/// Reference playfield dimensions, border included
pub const DEFAULT_WIDTH: usize = 12;
pub const DEFAULT_HEIGHT: usize = 18;
/// Largest playfield side the renderer can lay out
pub const MAX_FIELD_SIZE: usize = 250;

/// Grid value of a row waiting to be removed
pub const CLEARING_VALUE: u8 = 9;
/// Grid value of a border cell
pub const WALL_VALUE: u8 = 10;

/// Glyph for each grid value, indexed by [`Cell::value`]
const GLYPHS: &[u8; 11] = b" ABCDEFGH=#";

/// A cell on the playfield
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cell {
    #[default]
    Empty,
    /// Part of a piece that has locked
    Locked(ShapeId),
    /// Part of a full row shown once before it is removed
    Clearing,
    /// Left, right or bottom border
    Wall,
}

impl Cell {
    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    /// Numeric grid value: 0 empty, 1-8 locked shape, 9 clearing, 10 wall
    pub fn value(&self) -> u8 {
        match self {
            Cell::Empty => 0,
            Cell::Locked(shape) => shape.cell_value(),
            Cell::Clearing => CLEARING_VALUE,
            Cell::Wall => WALL_VALUE,
        }
    }

    pub fn glyph(&self) -> char {
        match self {
            Cell::Locked(shape) => shape.glyph(),
            _ => GLYPHS[self.value() as usize] as char,
        }
    }

    pub fn color(&self) -> Color {
        match self {
            Cell::Empty => Color::Reset,
            Cell::Locked(shape) => shape.color(),
            Cell::Clearing => Color::White,
            Cell::Wall => Color::Gray,
        }
    }
}

/// The playfield is too small for a piece to spawn inside the border
#[derive(Debug, thiserror::Error, PartialEq, Eq, Clone, Copy)]
#[error("playfield {width}x{height} must host a 4x4 spawn box inside its border and be at most {} per side", MAX_FIELD_SIZE)]
pub struct FieldError {
    pub width: usize,
    pub height: usize,
}

/// The game board
///
/// Coordinates are `(x, y)` with `x` growing rightward and `y` growing
/// downward; row 0 is the top. Column 0, column `width - 1` and row
/// `height - 1` are walls and never change after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    width: usize,
    height: usize,
    /// Row-major cells (`y * width + x`)
    cells: Vec<Cell>,
}

impl Default for Board {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            cells: Self::initial_cells(DEFAULT_WIDTH, DEFAULT_HEIGHT),
        }
    }
}

impl Board {
    /// Create an empty board with its border in place
    pub fn new(width: usize, height: usize) -> Result<Self, FieldError> {
        Self::check_dimensions(width, height)?;
        Ok(Self {
            width,
            height,
            cells: Self::initial_cells(width, height),
        })
    }

    /// The spawn box at `(width / 2, 0)` must lie inside the side walls and above the floor
    pub fn check_dimensions(width: usize, height: usize) -> Result<(), FieldError> {
        let box_size = BOX_SIZE as usize;
        if width < 3
            || width / 2 + box_size > width - 1
            || height < box_size + 1
            || width > MAX_FIELD_SIZE
            || height > MAX_FIELD_SIZE
        {
            return Err(FieldError { width, height });
        }
        Ok(())
    }

    fn initial_cells(width: usize, height: usize) -> Vec<Cell> {
        (0..height)
            .flat_map(|y| {
                (0..width).map(move |x| {
                    if x == 0 || x == width - 1 || y == height - 1 {
                        Cell::Wall
                    } else {
                        Cell::Empty
                    }
                })
            })
            .collect()
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 {
            return None;
        }
        let (x, y) = (x as usize, y as usize);
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(y * self.width + x)
    }

    pub fn is_border(&self, x: i32, y: i32) -> bool {
        self.index(x, y).is_some()
            && (x == 0 || x as usize == self.width - 1 || y as usize == self.height - 1)
    }

    /// Get the cell at `(x, y)`, `None` if out of bounds
    pub fn get(&self, x: i32, y: i32) -> Option<Cell> {
        self.index(x, y).map(|i| self.cells[i])
    }

    /// Set an interior cell. Returns false for out-of-bounds and border cells.
    pub fn set(&mut self, x: i32, y: i32, cell: Cell) -> bool {
        if self.is_border(x, y) {
            return false;
        }
        match self.index(x, y) {
            Some(i) => {
                self.cells[i] = cell;
                true
            }
            None => false,
        }
    }

    /// Whether `shape` at bounding-box position `(px, py)` and `rotation` fits
    ///
    /// Only occupied cells that land inside the grid are tested. Occupied
    /// cells outside the grid are ignored, so it is the wall cells that stop
    /// a piece at the sides and bottom, and a piece may poke above row 0.
    pub fn does_piece_fit(&self, shape: ShapeId, px: i32, py: i32, rotation: u32) -> bool {
        for y in 0..BOX_SIZE {
            for x in 0..BOX_SIZE {
                if !shape.is_occupied(rotate(x, y, rotation)) {
                    continue;
                }
                if let Some(cell) = self.get(px + x, py + y) {
                    if !cell.is_empty() {
                        return false;
                    }
                }
            }
        }
        true
    }

    /// Write a shape's occupied cells into the grid. Returns the number of cells written.
    pub fn lock_piece(&mut self, shape: ShapeId, px: i32, py: i32, rotation: u32) -> usize {
        let mut written = 0;
        for y in 0..BOX_SIZE {
            for x in 0..BOX_SIZE {
                if shape.is_occupied(rotate(x, y, rotation))
                    && self.set(px + x, py + y, Cell::Locked(shape))
                {
                    written += 1;
                }
            }
        }
        written
    }

    /// A row is full when every non-border column is filled
    pub fn is_row_full(&self, y: usize) -> bool {
        if y + 1 >= self.height {
            return false;
        }
        let row = &self.cells[y * self.width..(y + 1) * self.width];
        row[1..self.width - 1].iter().all(|cell| !cell.is_empty())
    }

    /// Scan the four rows starting at `top`, tag the full ones as clearing,
    /// and return their indices top to bottom. The floor is never scanned.
    pub fn mark_full_rows(&mut self, top: i32) -> Vec<usize> {
        let mut marked = Vec::new();
        for y in top..top + BOX_SIZE {
            if y < 0 || y as usize >= self.height - 1 {
                continue;
            }
            let y = y as usize;
            if self.is_row_full(y) {
                for x in 1..self.width - 1 {
                    self.cells[y * self.width + x] = Cell::Clearing;
                }
                marked.push(y);
            }
        }
        marked
    }

    /// Remove the given rows, shifting everything above each one down by a
    /// row and emptying the top row. Walls are untouched.
    pub fn collapse_rows(&mut self, rows: &[usize]) {
        let mut rows = rows.to_vec();
        rows.sort_unstable();
        rows.dedup();

        for row in rows {
            if row + 1 >= self.height {
                continue;
            }
            for x in 1..self.width - 1 {
                for y in (1..=row).rev() {
                    self.cells[y * self.width + x] = self.cells[(y - 1) * self.width + x];
                }
                self.cells[x] = Cell::Empty;
            }
        }
    }
}
