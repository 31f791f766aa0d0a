//! Game drivers: self-play data generation and matches between agents.

use tracing::debug;

use crate::board::Board;
use crate::mcts::SearchError;
use crate::player::{Agent, Decision};

/// One training example: a position, the search's move probabilities there
/// and the final result from the perspective of the player who moved.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingSample<S> {
    /// Board encoding before the move was played.
    pub state: S,
    /// Move probabilities over the full action space.
    pub policy: Vec<f64>,
    /// `1.0` if the player to move went on to win, `-1.0` if they lost, `0.0` for a draw.
    pub outcome: f64,
}

/// Result of a self-play game.
#[derive(Debug, Clone, PartialEq)]
pub struct SelfPlayRecord<P, S> {
    /// The winner, or `None` for a draw.
    pub winner: Option<P>,
    /// One sample per turn, in move order.
    pub samples: Vec<TrainingSample<S>>,
}

/// Plays games starting from a fixed initial position.
#[derive(Debug, Clone)]
pub struct Game<B: Board> {
    board: B,
}

impl<B: Board + Default> Default for Game<B> {
    fn default() -> Self {
        Game::new(B::default())
    }
}

impl<B: Board> Game<B> {
    /// Creates a driver whose games start from `board`.
    pub fn new(board: B) -> Self {
        Self { board }
    }

    /// The initial position of every game.
    pub fn initial_board(&self) -> &B {
        &self.board
    }

    /// Lets `agent` play both sides until the game ends, recording the
    /// position, the move probabilities and the player to move at every turn.
    /// Once the game is over every turn is labelled with its final result.
    pub fn start_self_play<A: Agent<B>>(
        &self,
        agent: &mut A,
        temperature: f64,
    ) -> Result<SelfPlayRecord<B::Player, B::Encoding>, SearchError> {
        agent.reset();
        let mut board = self.board.clone();
        let mut turns = Vec::new();

        let winner = loop {
            let (over, winner) = board.is_terminal();
            if over {
                break winner;
            }

            let Decision {
                action,
                distribution,
            } = agent.decide(&board, temperature, true)?;
            let policy = distribution.ok_or_else(|| {
                SearchError::InvalidCall("agent returned no move distribution".to_string())
            })?;
            turns.push((board.encode(), policy, board.player_to_move()));
            board.apply_action(action);
        };
        agent.reset();

        let samples: Vec<_> = turns
            .into_iter()
            .map(|(state, policy, player)| TrainingSample {
                state,
                policy,
                outcome: match winner {
                    Some(winner) if winner == player => 1.0,
                    Some(_) => -1.0,
                    None => 0.0,
                },
            })
            .collect();

        debug!(winner = ?winner, turns = samples.len(), "self-play game finished");
        Ok(SelfPlayRecord { winner, samples })
    }

    /// Plays `first` against `second`, `first` taking the side to move in the
    /// initial position. Each agent is told about its opponent's moves.
    /// Returns the winner, or `None` for a draw.
    pub fn start_play<A1: Agent<B>, A2: Agent<B>>(
        &self,
        first: &mut A1,
        second: &mut A2,
        temperature: f64,
    ) -> Result<Option<B::Player>, SearchError> {
        first.reset();
        second.reset();
        let mut board = self.board.clone();
        let first_side = board.player_to_move();
        let mut turns = 0usize;

        loop {
            let (over, winner) = board.is_terminal();
            if over {
                debug!(winner = ?winner, turns, "game finished");
                return Ok(winner);
            }

            if board.player_to_move() == first_side {
                let action = first.decide(&board, temperature, false)?.action;
                board.apply_action(action);
                second.notify_move_played(Some(action));
            } else {
                let action = second.decide(&board, temperature, false)?.action;
                board.apply_action(action);
                first.notify_move_played(Some(action));
            }
            turns += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use super::*;
    use crate::board::ActionId;
    use crate::boards::gobang::{GobangBoard, Stone};
    use crate::evaluator::UniformEvaluator;
    use crate::mcts::MonteCarloTreeSearch;
    use crate::player::{MctsPlayer, RandomPlayer};
    use crate::random::seeded;

    /// Plays a fixed list of moves and remembers what it was told.
    struct ScriptedAgent {
        moves: VecDeque<ActionId>,
        notified: Vec<Option<ActionId>>,
    }

    impl ScriptedAgent {
        fn new(moves: &[ActionId]) -> Self {
            Self {
                moves: moves.iter().copied().collect(),
                notified: Vec::new(),
            }
        }
    }

    impl Agent<GobangBoard> for ScriptedAgent {
        fn decide(
            &mut self,
            board: &GobangBoard,
            _temperature: f64,
            want_distribution: bool,
        ) -> Result<Decision, SearchError> {
            let action = self.moves.pop_front().ok_or(SearchError::NoLegalActions)?;
            let distribution = want_distribution.then(|| {
                let mut one_hot = vec![0.0; board.action_count()];
                one_hot[action] = 1.0;
                one_hot
            });
            Ok(Decision {
                action,
                distribution,
            })
        }

        fn notify_move_played(&mut self, action: Option<ActionId>) {
            self.notified.push(action);
        }
    }

    #[test]
    fn self_play_labels_every_turn_with_the_result() {
        // arrange
        let game = Game::new(GobangBoard::tic_tac_toe());
        let mut agent = ScriptedAgent::new(&[0, 3, 1, 4, 2]);

        // act
        let record = game.start_self_play(&mut agent, 1.0).unwrap();

        // assert
        assert_eq!(record.winner, Some(Stone::Black));
        let outcomes: Vec<f64> = record.samples.iter().map(|s| s.outcome).collect();
        assert_eq!(outcomes, vec![1.0, -1.0, 1.0, -1.0, 1.0]);
        assert_eq!(record.samples[1].policy[3], 1.0);
        assert_eq!(record.samples[0].state, GobangBoard::tic_tac_toe().encode());
        assert_eq!(agent.notified, vec![None, None]);
    }

    #[test]
    fn self_play_draw_labels_zero() {
        let game = Game::new(GobangBoard::tic_tac_toe());
        let mut agent = ScriptedAgent::new(&[0, 1, 2, 4, 3, 5, 7, 6, 8]);

        let record = game.start_self_play(&mut agent, 1.0).unwrap();

        assert_eq!(record.winner, None);
        assert_eq!(record.samples.len(), 9);
        assert!(record.samples.iter().all(|s| s.outcome == 0.0));
    }

    #[test]
    fn self_play_with_search_produces_consistent_samples() {
        // arrange
        let game = Game::<GobangBoard>::default();
        let mcts = MonteCarloTreeSearch::new(UniformEvaluator, 5.0, 60);
        let mut agent = MctsPlayer::new(mcts, seeded(2024)).with_self_play(true);

        // act
        let record = game.start_self_play(&mut agent, 1.0).unwrap();

        // assert
        let turns = record.samples.len();
        assert!((5..=9).contains(&turns));
        for (i, sample) in record.samples.iter().enumerate() {
            assert_eq!(sample.policy.len(), 9);
            assert!((sample.policy.iter().sum::<f64>() - 1.0).abs() < 1e-9);
            assert_eq!(sample.state.len(), 36);
            let mover = if i % 2 == 0 { Stone::Black } else { Stone::White };
            let expected = match record.winner {
                Some(winner) if winner == mover => 1.0,
                Some(_) => -1.0,
                None => 0.0,
            };
            assert_eq!(sample.outcome, expected);
        }
        match record.winner {
            Some(Stone::Black) => assert_eq!(turns % 2, 1),
            Some(Stone::White) => assert_eq!(turns % 2, 0),
            None => assert_eq!(turns, 9),
        }
        assert_eq!(agent.mcts().tree().len(), 1);
    }

    #[test]
    fn match_notifies_the_waiting_side() {
        // arrange
        let game = Game::new(GobangBoard::tic_tac_toe());
        let mut first = ScriptedAgent::new(&[0, 1, 2]);
        let mut second = ScriptedAgent::new(&[3, 4]);

        // act
        let winner = game.start_play(&mut first, &mut second, 1e-3).unwrap();

        // assert
        assert_eq!(winner, Some(Stone::Black));
        assert_eq!(first.notified, vec![None, Some(3), Some(4)]);
        assert_eq!(second.notified, vec![None, Some(0), Some(1), Some(2)]);
    }

    #[test]
    fn search_player_converts_a_winning_position() {
        let mut board = GobangBoard::tic_tac_toe();
        for action in [0, 3, 1, 4] {
            board.apply_action(action);
        }
        let game = Game::new(board);
        let mcts = MonteCarloTreeSearch::new(UniformEvaluator, 5.0, 400);
        let mut searcher = MctsPlayer::new(mcts, seeded(17));
        let mut random = RandomPlayer::new(seeded(18));

        let winner = game.start_play(&mut searcher, &mut random, 1e-3).unwrap();

        assert_eq!(winner, Some(Stone::Black));
    }

    #[test]
    fn agent_errors_abort_the_game() {
        let game = Game::new(GobangBoard::tic_tac_toe());
        let mut agent = ScriptedAgent::new(&[0, 3]);

        let result = game.start_self_play(&mut agent, 1.0);

        assert!(matches!(result, Err(SearchError::NoLegalActions)));
    }
}
