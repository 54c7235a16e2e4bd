//! Terminal UI rendering with ratatui

use crate::board::Cell;
use crate::game::DrawBuffer;
use crate::score::Score;
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Style, Stylize},
    text::{Line, Span},
    widgets::Paragraph,
};

/// Narrowest frame, wide enough for the status line
const MIN_WIDTH: u16 = 24;

/// Draw one full frame: score line, playfield, status line
pub fn render_game(frame: &mut Frame, buffer: &DrawBuffer, score: &Score, game_over: bool) {
    let width = u16::try_from(buffer.width())
        .unwrap_or(u16::MAX)
        .max(MIN_WIDTH);
    let field_height = u16::try_from(buffer.height()).unwrap_or(u16::MAX);
    let area = center_rect(frame.area(), width, field_height.saturating_add(2));

    let [header, field, footer] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(field_height),
        Constraint::Length(1),
    ])
    .areas(area);

    let score_line = Line::styled(
        format!("SCORE: {:8}", score.points),
        Style::default().fg(Color::White).bold(),
    );
    frame.render_widget(Paragraph::new(score_line), header);

    render_field(frame, field, buffer);

    let status = if game_over {
        Line::styled("GAME OVER", Style::default().fg(Color::Red).bold())
    } else {
        Line::styled(
            format!("SPEED {:>2}  PIECES {}", score.speed, score.pieces),
            Style::default().fg(Color::DarkGray),
        )
    };
    frame.render_widget(Paragraph::new(status), footer);
}

/// One text row per grid row, one glyph per cell
fn render_field(frame: &mut Frame, area: Rect, buffer: &DrawBuffer) {
    let lines: Vec<Line> = buffer
        .rows()
        .map(|row| {
            let spans: Vec<Span> = row.iter().map(cell_span).collect();
            Line::from(spans)
        })
        .collect();
    frame.render_widget(Paragraph::new(lines), area);
}

fn cell_span(cell: &Cell) -> Span<'static> {
    let style = match cell {
        Cell::Empty => Style::default(),
        Cell::Clearing => Style::default().fg(cell.color()).bold(),
        _ => Style::default().fg(cell.color()),
    };
    Span::styled(cell.glyph().to_string(), style)
}

/// Center a rect within another rect
fn center_rect(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Board;
    use crate::game::{Game, Intents};
    use crate::randomizer::Randomizer;
    use ratatui::{Terminal, backend::TestBackend};

    fn row_text(terminal: &Terminal<TestBackend>, y: u16) -> String {
        let buffer = terminal.backend().buffer();
        (0..buffer.area.width)
            .map(|x| buffer[(x, y)].symbol().to_string())
            .collect()
    }

    fn draw(game: &Game) -> Terminal<TestBackend> {
        let mut terminal = Terminal::new(TestBackend::new(MIN_WIDTH, 20)).unwrap();
        let buffer = game.draw_buffer();
        terminal
            .draw(|frame| render_game(frame, &buffer, game.score(), game.is_over()))
            .unwrap();
        terminal
    }

    #[test]
    fn test_frame_layout() {
        let game = Game::new(Board::default(), Score::default(), Randomizer::with_seed(3));
        let terminal = draw(&game);

        assert!(row_text(&terminal, 0).starts_with("SCORE:        0"));
        assert!(row_text(&terminal, 5).starts_with("#          #"));
        assert!(row_text(&terminal, 18).starts_with("############"));
        assert!(row_text(&terminal, 19).starts_with("SPEED 20  PIECES 0"));
    }

    #[test]
    fn test_active_piece_glyphs() {
        let game = Game::new(Board::default(), Score::default(), Randomizer::with_seed(3));
        let terminal = draw(&game);
        let glyph = Cell::Locked(game.piece().shape).glyph().to_string();

        for (x, y) in game.piece().block_positions() {
            let cell = &terminal.backend().buffer()[(x as u16, y as u16 + 1)];
            assert_eq!(cell.symbol(), glyph);
        }
    }

    #[test]
    fn test_game_over_banner() {
        let mut board = Board::default();
        for y in 0..4 {
            for x in 2..11 {
                board.set(x, y, Cell::Locked(crate::tetromino::ShapeId::ALL[0]));
            }
        }
        let mut game = Game::new(board, Score::default(), Randomizer::with_seed(3));
        assert!(game.is_over());
        assert_eq!(game.tick(Intents::default()), None);

        let terminal = draw(&game);
        assert!(row_text(&terminal, 19).starts_with("GAME OVER"));
    }

    #[test]
    fn test_status_counts_locked_pieces() {
        let mut game = Game::new(Board::default(), Score::default(), Randomizer::with_seed(3));
        let mut locks = 0;
        while locks < 2 {
            if game.tick(Intents::default()).is_some() {
                locks += 1;
            }
        }
        let terminal = draw(&game);
        assert!(row_text(&terminal, 19).starts_with("SPEED 20  PIECES 2"));
    }

    #[test]
    fn test_tallest_field_renders_clipped() {
        let board = Board::new(12, crate::board::MAX_FIELD_SIZE).unwrap();
        let game = Game::new(board, Score::default(), Randomizer::with_seed(3));
        let terminal = draw(&game);
        assert!((0..20).any(|y| row_text(&terminal, y).starts_with("#          #")));
    }
}
