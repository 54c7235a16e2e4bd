//! Active falling piece logic

use crate::board::Board;
use crate::rotation::rotate;
use crate::tetromino::{BOX_SIZE, ShapeId};

/// The piece under player control
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Piece {
    pub shape: ShapeId,
    /// Top-left corner of the 4x4 bounding box in grid coordinates
    pub x: i32,
    pub y: i32,
    /// Quarter turns clockwise, kept in 0..4
    pub rotation: u32,
}

impl Piece {
    /// Create a piece at the spawn position: top-centre, unrotated
    pub fn spawn(shape: ShapeId, board_width: usize) -> Self {
        Self {
            shape,
            x: (board_width / 2) as i32,
            y: 0,
            rotation: 0,
        }
    }

    /// Whether the piece fits the board where it is
    pub fn fits(&self, board: &Board) -> bool {
        board.does_piece_fit(self.shape, self.x, self.y, self.rotation)
    }

    /// Absolute positions of the occupied cells
    pub fn block_positions(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        (0..BOX_SIZE)
            .flat_map(|y| (0..BOX_SIZE).map(move |x| (x, y)))
            .filter(|&(x, y)| self.shape.is_occupied(rotate(x, y, self.rotation)))
            .map(|(x, y)| (self.x + x, self.y + y))
    }

    /// Try to move by `(dx, dy)`, returns true if successful
    pub fn try_shift(&mut self, dx: i32, dy: i32, board: &Board) -> bool {
        if board.does_piece_fit(self.shape, self.x + dx, self.y + dy, self.rotation) {
            self.x += dx;
            self.y += dy;
            true
        } else {
            false
        }
    }

    pub fn move_left(&mut self, board: &Board) -> bool {
        self.try_shift(-1, 0, board)
    }

    pub fn move_right(&mut self, board: &Board) -> bool {
        self.try_shift(1, 0, board)
    }

    pub fn move_down(&mut self, board: &Board) -> bool {
        self.try_shift(0, 1, board)
    }

    /// Try to rotate a quarter turn clockwise in place (no wall kicks)
    pub fn rotate_cw(&mut self, board: &Board) -> bool {
        let next = (self.rotation + 1) % 4;
        if board.does_piece_fit(self.shape, self.x, self.y, next) {
            self.rotation = next;
            true
        } else {
            false
        }
    }

    /// Stamp the piece into the board
    pub fn lock(&self, board: &mut Board) -> usize {
        board.lock_piece(self.shape, self.x, self.y, self.rotation)
    }
}
