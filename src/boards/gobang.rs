use crate::board::{ActionId, Board, GameOutcome};

/// A stone colour, which doubles as the player identifier.
#[derive(Debug, PartialEq, Eq, Hash, Copy, Clone)]
pub enum Stone {
    /// Moves first on a fresh board.
    Black,
    /// Moves second on a fresh board.
    White,
}

impl Stone {
    /// Returns the other colour.
    pub fn opponent(self) -> Self {
        match self {
            Stone::Black => Stone::White,
            Stone::White => Stone::Black,
        }
    }
}

/// An implementation of the `Board` trait for "n in a row" games on a
/// `width` x `height` grid (tic-tac-toe, gomoku and friends).
///
/// Cells are numbered row by row, so action `a` is the cell at row
/// `a / width`, column `a % width`. The default board is tic-tac-toe.
#[derive(Debug, Clone, PartialEq)]
pub struct GobangBoard {
    width: usize,
    height: usize,
    n_in_row: usize,
    field: Vec<Option<Stone>>,
    current_player: Stone,
    last_move: Option<ActionId>,
    outcome: GameOutcome<Stone>,
}

impl GobangBoard {
    /// Creates an empty board with `start_player` to move.
    ///
    /// `n_in_row` is clamped to the longer side so the game stays winnable.
    pub fn new(width: usize, height: usize, n_in_row: usize, start_player: Stone) -> Self {
        Self {
            width,
            height,
            n_in_row: n_in_row.clamp(1, width.max(height).max(1)),
            field: vec![None; width * height],
            current_player: start_player,
            last_move: None,
            outcome: GameOutcome::InProgress,
        }
    }

    /// A 3x3 board with three in a row, Black to move.
    pub fn tic_tac_toe() -> Self {
        GobangBoard::new(3, 3, 3, Stone::Black)
    }

    /// Width of the grid.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height of the grid.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the stone on a cell, if any.
    pub fn stone_at(&self, action: ActionId) -> Option<Stone> {
        self.field.get(action).copied().flatten()
    }

    /// The most recently played cell.
    pub fn last_move(&self) -> Option<ActionId> {
        self.last_move
    }

    fn line_length(&self, origin: ActionId, stone: Stone, (dr, dc): (isize, isize)) -> usize {
        let mut length = 1;
        for sign in [1, -1] {
            let mut row = (origin / self.width) as isize;
            let mut col = (origin % self.width) as isize;
            loop {
                row += dr * sign;
                col += dc * sign;
                if row < 0 || col < 0 || row >= self.height as isize || col >= self.width as isize {
                    break;
                }
                let cell = row as usize * self.width + col as usize;
                if self.field[cell] != Some(stone) {
                    break;
                }
                length += 1;
            }
        }
        length
    }

    fn compute_outcome(&self) -> GameOutcome<Stone> {
        if let Some((last, Some(stone))) = self.last_move.map(|last| (last, self.field[last])) {
            let wins = [(0, 1), (1, 0), (1, 1), (1, -1)]
                .into_iter()
                .any(|direction| self.line_length(last, stone, direction) >= self.n_in_row);
            if wins {
                return GameOutcome::Win(stone);
            }
        }

        if self.field.iter().any(|cell| cell.is_none()) {
            GameOutcome::InProgress
        } else {
            GameOutcome::Draw
        }
    }
}

impl Default for GobangBoard {
    /// Creates a new tic-tac-toe board with Black starting.
    fn default() -> Self {
        GobangBoard::tic_tac_toe()
    }
}

impl Board for GobangBoard {
    type Player = Stone;
    type Encoding = Vec<f32>;

    fn action_count(&self) -> usize {
        self.width * self.height
    }

    fn player_to_move(&self) -> Stone {
        self.current_player
    }

    fn legal_actions(&self) -> Vec<ActionId> {
        if self.outcome.is_over() {
            return Vec::new();
        }

        self.field
            .iter()
            .enumerate()
            .filter(|(_, cell)| cell.is_none())
            .map(|(i, _)| i)
            .collect()
    }

    fn apply_action(&mut self, action: ActionId) {
        self.field[action] = Some(self.current_player);
        self.current_player = self.current_player.opponent();
        self.last_move = Some(action);
        self.outcome = self.compute_outcome();
    }

    fn outcome(&self) -> GameOutcome<Stone> {
        self.outcome
    }

    /// Four planes of `width * height` cells: stones of the player to move,
    /// opponent stones, the last move, and a plane of ones when Black is to move.
    fn encode(&self) -> Vec<f32> {
        let cells = self.width * self.height;
        let mut planes = vec![0.0; 4 * cells];
        for (i, cell) in self.field.iter().enumerate() {
            match cell {
                Some(stone) if *stone == self.current_player => planes[i] = 1.0,
                Some(_) => planes[cells + i] = 1.0,
                None => {}
            }
        }
        if let Some(last) = self.last_move {
            planes[2 * cells + last] = 1.0;
        }
        if self.current_player == Stone::Black {
            planes[3 * cells..].fill(1.0);
        }
        planes
    }
}

#[cfg(test)]
mod tests {
    use super::{GobangBoard, Stone};
    use crate::board::{Board, GameOutcome};

    fn play(board: &mut GobangBoard, moves: &[usize]) {
        for &action in moves {
            board.apply_action(action);
        }
    }

    #[test]
    fn row_win_is_detected() {
        // arrange
        let mut board = GobangBoard::tic_tac_toe();

        // act
        play(&mut board, &[0, 3, 1, 4, 2]);

        // assert
        assert_eq!(board.outcome(), GameOutcome::Win(Stone::Black));
        assert_eq!(board.is_terminal(), (true, Some(Stone::Black)));
        assert!(board.legal_actions().is_empty());
    }

    #[test]
    fn anti_diagonal_win_is_detected() {
        let mut board = GobangBoard::tic_tac_toe();
        play(&mut board, &[0, 2, 1, 4, 8, 6]);
        assert_eq!(board.outcome(), GameOutcome::Win(Stone::White));
    }

    #[test]
    fn full_board_without_line_is_a_draw() {
        let mut board = GobangBoard::tic_tac_toe();
        play(&mut board, &[0, 1, 2, 4, 3, 5, 7, 6, 8]);
        assert_eq!(board.outcome(), GameOutcome::Draw);
        assert_eq!(board.is_terminal(), (true, None));
    }

    #[test]
    fn wider_board_needs_longer_line() {
        let mut board = GobangBoard::new(6, 6, 4, Stone::White);
        play(&mut board, &[0, 6, 1, 7, 2, 8]);
        assert_eq!(board.outcome(), GameOutcome::InProgress);
        assert_eq!(board.player_to_move(), Stone::White);
        board.apply_action(3);
        assert_eq!(board.outcome(), GameOutcome::Win(Stone::White));
    }

    #[test]
    fn encoding_is_relative_to_player_to_move() {
        // arrange
        let mut board = GobangBoard::tic_tac_toe();
        board.apply_action(4);

        // act
        let planes = board.encode();

        // assert
        assert_eq!(planes.len(), 36);
        assert_eq!(planes[4], 0.0);
        assert_eq!(planes[9 + 4], 1.0);
        assert_eq!(planes[18 + 4], 1.0);
        assert!(planes[27..].iter().all(|&v| v == 0.0));
    }

    #[test]
    fn legal_actions_skip_occupied_cells() {
        let mut board = GobangBoard::tic_tac_toe();
        play(&mut board, &[4, 0]);
        assert_eq!(board.legal_actions(), vec![1, 2, 3, 5, 6, 7, 8]);
        assert_eq!(board.stone_at(0), Some(Stone::White));
        assert_eq!(board.last_move(), Some(0));
    }
}
