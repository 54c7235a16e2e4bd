//! Scoring and speed progression

/// Points for every locked piece
pub const PIECE_BONUS: u64 = 25;
/// Base of the line-clear bonus: `2^lines * LINE_CLEAR_BASE`
pub const LINE_CLEAR_BASE: u64 = 100;

pub const DEFAULT_INITIAL_SPEED: u32 = 20;
pub const DEFAULT_MIN_SPEED: u32 = 10;
pub const DEFAULT_PIECES_PER_SPEEDUP: u32 = 10;

/// Points awarded for one lock that cleared `lines` rows
///
/// Any non-zero clear is worth `2^lines * 100` on top of the piece bonus,
/// so one line gives 200, two give 400, three give 800.
pub fn lock_points(lines: usize) -> u64 {
    if lines == 0 {
        PIECE_BONUS
    } else {
        PIECE_BONUS + (1u64 << lines.min(32)) * LINE_CLEAR_BASE
    }
}

/// Score tracking
#[derive(Debug, Clone)]
pub struct Score {
    /// Current score, never decreases
    pub points: u64,
    /// Total pieces locked
    pub pieces: u32,
    /// Total rows cleared
    pub lines: u32,
    /// Ticks per gravity step; lower is faster
    pub speed: u32,
    min_speed: u32,
    pieces_per_speedup: u32,
}

impl Default for Score {
    fn default() -> Self {
        Self::new(
            DEFAULT_INITIAL_SPEED,
            DEFAULT_MIN_SPEED,
            DEFAULT_PIECES_PER_SPEEDUP,
        )
    }
}

impl Score {
    pub fn new(initial_speed: u32, min_speed: u32, pieces_per_speedup: u32) -> Self {
        Self {
            points: 0,
            pieces: 0,
            lines: 0,
            speed: initial_speed,
            min_speed,
            pieces_per_speedup: pieces_per_speedup.max(1),
        }
    }

    /// Count a locked piece, speeding up every `pieces_per_speedup` pieces.
    /// Returns true when the speed changed.
    pub fn add_piece(&mut self) -> bool {
        self.pieces += 1;
        if self.pieces % self.pieces_per_speedup == 0 {
            let next = self.speed.saturating_sub(1).max(self.min_speed);
            if next != self.speed {
                self.speed = next;
                return true;
            }
        }
        false
    }

    /// Award points for a lock that cleared `lines` rows, returns the points added
    pub fn add_lock(&mut self, lines: usize) -> u64 {
        let points = lock_points(lines);
        self.points += points;
        self.lines += lines as u32;
        points
    }
}
