//! Core game state and the per-tick transition

use crate::board::{Board, Cell, FieldError};
use crate::piece::Piece;
use crate::randomizer::Randomizer;
use crate::score::Score;
use crate::settings::Settings;
use tracing::{debug, info};

/// Game state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameState {
    Playing,
    GameOver,
}

/// Player intents gathered since the last tick, at most one of each kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Intents {
    pub left: bool,
    pub down: bool,
    pub right: bool,
    pub rotate: bool,
}

/// What happened when a piece locked
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockEvent {
    /// Rows tagged for clearing, top to bottom
    pub rows: Vec<usize>,
    /// Points added by this lock
    pub points: u64,
    /// The replacement piece could not spawn
    pub game_over: bool,
}

/// The grid merged with the active piece, ready to paint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrawBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl DrawBuffer {
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Rows top to bottom
    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.cells.chunks(self.width)
    }

    /// One string of glyphs per row
    #[cfg(test)]
    pub fn lines(&self) -> Vec<String> {
        self.rows()
            .map(|row| row.iter().map(Cell::glyph).collect())
            .collect()
    }
}

/// The main game struct
pub struct Game {
    board: Board,
    piece: Piece,
    randomizer: Randomizer,
    score: Score,
    state: GameState,
    /// Ticks since the last gravity step
    speed_counter: u32,
    force_down: bool,
    /// Rows tagged as clearing, removed after they have been drawn once
    pending_clear: Vec<usize>,
}

impl Game {
    /// Create a game; the first piece is drawn from `randomizer`
    pub fn new(board: Board, score: Score, mut randomizer: Randomizer) -> Self {
        let piece = Piece::spawn(randomizer.next_shape(), board.width());
        let state = if piece.fits(&board) {
            GameState::Playing
        } else {
            GameState::GameOver
        };
        Self {
            board,
            piece,
            randomizer,
            score,
            state,
            speed_counter: 0,
            force_down: false,
            pending_clear: Vec::new(),
        }
    }

    /// Create a game from validated settings
    pub fn from_settings(settings: &Settings) -> Result<Self, FieldError> {
        let board = Board::new(settings.field.width, settings.field.height)?;
        let score = Score::new(
            settings.difficulty.initial_speed,
            settings.difficulty.min_speed,
            settings.difficulty.pieces_per_speedup,
        );
        let randomizer = match settings.seed {
            Some(seed) => Randomizer::with_seed(seed),
            None => Randomizer::new(),
        };
        Ok(Self::new(board, score, randomizer))
    }

    pub fn piece(&self) -> &Piece {
        &self.piece
    }

    pub fn score(&self) -> &Score {
        &self.score
    }

    pub fn is_over(&self) -> bool {
        self.state == GameState::GameOver
    }

    /// Rows drawn with the clearing marker and waiting for [`Game::clear_pending_rows`]
    pub fn pending_clear(&self) -> &[usize] {
        &self.pending_clear
    }

    /// Run one simulation step: gravity count, intents, then gravity or lock.
    ///
    /// Returns the lock event if the piece locked this tick. Does nothing once
    /// the game is over.
    pub fn tick(&mut self, intents: Intents) -> Option<LockEvent> {
        if self.is_over() {
            return None;
        }

        self.speed_counter += 1;
        if self.speed_counter >= self.score.speed {
            self.force_down = true;
            self.speed_counter = 0;
        }

        if intents.left {
            self.piece.move_left(&self.board);
        }
        if intents.down {
            self.piece.move_down(&self.board);
        }
        if intents.right {
            self.piece.move_right(&self.board);
        }
        if intents.rotate {
            self.piece.rotate_cw(&self.board);
        }

        if !self.force_down {
            return None;
        }
        self.force_down = false;

        if self.piece.move_down(&self.board) {
            return None;
        }
        Some(self.lock_piece())
    }

    /// Lock the current piece, tag full rows, score, and spawn the next piece
    fn lock_piece(&mut self) -> LockEvent {
        let piece = self.piece;
        piece.lock(&mut self.board);
        debug!(
            shape = piece.shape.index(),
            x = piece.x,
            y = piece.y,
            rotation = piece.rotation,
            "piece locked"
        );

        if self.score.add_piece() {
            info!(speed = self.score.speed, pieces = self.score.pieces, "speed up");
        }

        let rows = self.board.mark_full_rows(piece.y);
        if !rows.is_empty() {
            info!(?rows, "lines complete");
        }
        self.pending_clear.extend_from_slice(&rows);
        let points = self.score.add_lock(rows.len());

        self.piece = Piece::spawn(self.randomizer.next_shape(), self.board.width());
        let game_over = !self.piece.fits(&self.board);
        if game_over {
            self.state = GameState::GameOver;
            info!(score = self.score.points, pieces = self.score.pieces, "game over");
        }

        LockEvent {
            rows,
            points,
            game_over,
        }
    }

    /// The grid with the active piece drawn over it
    pub fn draw_buffer(&self) -> DrawBuffer {
        let mut cells = self.board.cells().to_vec();
        let width = self.board.width();
        for (x, y) in self.piece.block_positions() {
            if self.board.get(x, y).is_some() {
                cells[y as usize * width + x as usize] = Cell::Locked(self.piece.shape);
            }
        }
        DrawBuffer {
            width,
            height: self.board.height(),
            cells,
        }
    }

    /// Remove the rows tagged by the last lock. Returns how many were removed.
    pub fn clear_pending_rows(&mut self) -> usize {
        if self.pending_clear.is_empty() {
            return 0;
        }
        let removed = self.pending_clear.len();
        self.board.collapse_rows(&self.pending_clear);
        self.pending_clear.clear();
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tetromino::ShapeId;

    fn shape(id: u8) -> ShapeId {
        ShapeId::ALL[id as usize]
    }

    fn game() -> Game {
        Game::new(Board::default(), Score::default(), Randomizer::with_seed(1))
    }

    fn with_piece(game: &mut Game, id: u8, x: i32, y: i32, rotation: u32) {
        game.piece = Piece {
            shape: shape(id),
            x,
            y,
            rotation,
        };
    }

    fn fill_row_except(board: &mut Board, y: i32, gaps: &[i32]) {
        for x in 1..board.width() as i32 - 1 {
            if !gaps.contains(&x) {
                board.set(x, y, Cell::Locked(shape(5)));
            }
        }
    }

    /// Tick with no input until the next gravity step fires
    fn gravity_step(game: &mut Game) -> Option<LockEvent> {
        for _ in 1..game.score.speed {
            assert_eq!(game.tick(Intents::default()), None);
        }
        game.tick(Intents::default())
    }

    #[test]
    fn test_new_game_spawns_top_center() {
        let game = game();
        assert_eq!(game.state, GameState::Playing);
        assert_eq!((game.piece().x, game.piece().y, game.piece().rotation), (6, 0, 0));
    }

    #[test]
    fn test_gravity_every_speed_ticks() {
        let mut game = game();
        with_piece(&mut game, 3, 4, 0, 0);
        for _ in 0..19 {
            game.tick(Intents::default());
        }
        assert_eq!(game.piece().y, 0);
        game.tick(Intents::default());
        assert_eq!(game.piece().y, 1);
    }

    #[test]
    fn test_intents_apply_in_order() {
        let mut game = game();
        with_piece(&mut game, 3, 4, 0, 0);
        game.tick(Intents {
            left: true,
            down: true,
            right: false,
            rotate: true,
        });
        assert_eq!((game.piece().x, game.piece().y, game.piece().rotation), (3, 1, 1));
    }

    #[test]
    fn test_blocked_intent_is_dropped() {
        let mut game = game();
        // Bar in local column 2 against the left wall
        with_piece(&mut game, 0, -1, 0, 0);
        game.tick(Intents {
            left: true,
            ..Intents::default()
        });
        assert_eq!(game.piece().x, -1);
        game.tick(Intents {
            right: true,
            ..Intents::default()
        });
        assert_eq!(game.piece().x, 0);
    }

    #[test]
    fn test_lock_without_lines_scores_piece_bonus() {
        let mut game = game();
        with_piece(&mut game, 3, 4, 14, 0);
        let event = gravity_step(&mut game).unwrap();
        assert_eq!(event.rows, Vec::<usize>::new());
        assert_eq!(event.points, 25);
        assert!(!event.game_over);
        assert_eq!(game.score().points, 25);
        assert_eq!(game.score().pieces, 1);
        assert_eq!(game.board.get(5, 15), Some(Cell::Locked(shape(3))));
        assert_eq!(game.board.get(6, 16), Some(Cell::Locked(shape(3))));
        assert_eq!((game.piece().x, game.piece().y, game.piece().rotation), (6, 0, 0));
    }

    #[test]
    fn test_lock_with_one_line() {
        let mut game = game();
        fill_row_except(&mut game.board, 16, &[5, 6]);
        with_piece(&mut game, 3, 4, 14, 0);
        let event = gravity_step(&mut game).unwrap();
        assert_eq!(event.rows, vec![16]);
        assert_eq!(event.points, 25 + 200);
        assert_eq!(game.pending_clear(), &[16]);
        assert_eq!(game.board.get(1, 16), Some(Cell::Clearing));
    }

    #[test]
    fn test_lock_with_two_lines_then_clear() {
        let mut game = game();
        fill_row_except(&mut game.board, 15, &[5, 6]);
        fill_row_except(&mut game.board, 16, &[5, 6]);
        game.board.set(2, 14, Cell::Locked(shape(1)));
        with_piece(&mut game, 3, 4, 14, 0);
        let event = gravity_step(&mut game).unwrap();
        assert_eq!(event.rows, vec![15, 16]);
        assert_eq!(game.score().points, 25 + 400);
        assert_eq!(game.score().lines, 2);

        let buffer = game.draw_buffer();
        assert_eq!(buffer.lines()[16], "#==========#");

        assert_eq!(game.clear_pending_rows(), 2);
        assert!(game.pending_clear().is_empty());
        assert_eq!(game.board.get(2, 16), Some(Cell::Locked(shape(1))));
        assert_eq!(game.board.get(2, 14), Some(Cell::Empty));
        assert_eq!(game.clear_pending_rows(), 0);
    }

    #[test]
    fn test_lock_with_three_lines() {
        let mut game = game();
        for y in 14..17 {
            fill_row_except(&mut game.board, y, &[6]);
        }
        // Vertical bar drops into column 6, bottom row 13 stays open
        with_piece(&mut game, 0, 4, 13, 0);
        let event = gravity_step(&mut game).unwrap();
        assert_eq!(event.rows, vec![14, 15, 16]);
        assert_eq!(event.points, 25 + 800);
    }

    #[test]
    fn test_full_row_outside_piece_rows_is_not_flagged() {
        let mut game = game();
        fill_row_except(&mut game.board, 16, &[]);
        game.board.set(5, 15, Cell::Locked(shape(2)));
        // Square rests on the block at (5, 15) and covers rows 13 and 14 only
        with_piece(&mut game, 3, 4, 12, 0);
        let event = gravity_step(&mut game).unwrap();
        assert!(event.rows.is_empty());
        assert!(game.pending_clear().is_empty());
        assert_eq!(game.board.get(3, 16), Some(Cell::Locked(shape(5))));
    }

    #[test]
    fn test_speed_after_ten_locks() {
        let mut game = game();
        for _ in 0..10 {
            with_piece(&mut game, 3, 4, 14, 0);
            game.board = Board::default();
            gravity_step(&mut game).unwrap();
        }
        assert_eq!(game.score().pieces, 10);
        assert_eq!(game.score().speed, 19);
    }

    #[test]
    fn test_blocked_spawn_is_game_over() {
        let mut game = game();
        for y in 0..4 {
            fill_row_except(&mut game.board, y, &[1]);
        }
        with_piece(&mut game, 3, 1, 14, 0);
        let event = gravity_step(&mut game).unwrap();
        assert!(event.game_over);
        assert!(game.is_over());

        let board = game.board.clone();
        let piece = *game.piece();
        let points = game.score().points;
        for _ in 0..100 {
            assert_eq!(
                game.tick(Intents {
                    left: true,
                    down: true,
                    right: true,
                    rotate: true,
                }),
                None
            );
        }
        assert_eq!(game.board, board);
        assert_eq!(game.piece(), &piece);
        assert_eq!(game.score().points, points);
    }

    #[test]
    fn test_draw_buffer_merges_piece() {
        let mut game = game();
        with_piece(&mut game, 3, 4, 0, 0);
        let lines = game.draw_buffer().lines();
        assert_eq!(lines.len(), 18);
        assert_eq!(lines[0], "#          #");
        assert_eq!(lines[1], "#    DD    #");
        assert_eq!(lines[2], "#    DD    #");
        assert_eq!(lines[17], "############");
        // The board itself is untouched
        assert_eq!(game.board.get(5, 1), Some(Cell::Empty));
    }

    #[test]
    fn test_from_settings_uses_seed() {
        let mut settings = Settings::default();
        settings.seed = Some(99);
        let a = Game::from_settings(&settings).unwrap();
        let b = Game::from_settings(&settings).unwrap();
        assert_eq!(a.piece(), b.piece());

        settings.field.width = 4;
        assert!(Game::from_settings(&settings).is_err());
    }
}
