//! Evaluator trait for position evaluation.
//!
//! The evaluator provides move priors and a value estimate for a position.
//! In an AlphaZero-style agent this is the policy/value network; the search
//! only sees it through [`Evaluator::evaluate`]. Two model-free evaluators are
//! provided for testing and as baselines.

use rand::Rng;
use thiserror::Error;

use crate::board::{ActionId, Board};

/// Errors that can occur during evaluation.
#[derive(Debug, Error)]
pub enum EvaluatorError {
    #[error("Evaluation failed: {0}")]
    EvaluationFailed(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),
}

/// Result of evaluating a game state.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    /// Prior probability for each legal action. Not renormalized by the search.
    pub priors: Vec<(ActionId, f64)>,

    /// Value estimate in `[-1, 1]` for the player to move.
    pub value: f64,
}

impl Evaluation {
    /// Equal priors over `actions` with the given value.
    pub fn uniform(actions: &[ActionId], value: f64) -> Self {
        let prior = if actions.is_empty() {
            0.0
        } else {
            1.0 / actions.len() as f64
        };
        Self {
            priors: actions.iter().map(|&action| (action, prior)).collect(),
            value,
        }
    }
}

/// Trait for position evaluators.
///
/// Any `FnMut(&B) -> Result<Evaluation, EvaluatorError>` closure is an evaluator,
/// which is the usual way to plug a model in.
pub trait Evaluator<B: Board> {
    /// Evaluate a position.
    fn evaluate(&mut self, board: &B) -> Result<Evaluation, EvaluatorError>;
}

impl<B, F> Evaluator<B> for F
where
    B: Board,
    F: FnMut(&B) -> Result<Evaluation, EvaluatorError>,
{
    fn evaluate(&mut self, board: &B) -> Result<Evaluation, EvaluatorError> {
        self(board)
    }
}

/// Uniform evaluator that assigns equal probability to all legal moves.
/// Value is always 0.0 (neutral). Useful for testing MCTS without a model.
#[derive(Debug, Clone, Copy, Default)]
pub struct UniformEvaluator;

impl<B: Board> Evaluator<B> for UniformEvaluator {
    fn evaluate(&mut self, board: &B) -> Result<Evaluation, EvaluatorError> {
        Ok(Evaluation::uniform(&board.legal_actions(), 0.0))
    }
}

/// Uniform priors plus a value taken from one random playout to the end of
/// the game. This turns the search into plain MCTS, the usual baseline
/// opponent for measuring a trained agent.
#[derive(Debug, Clone)]
pub struct RolloutEvaluator<R: Rng> {
    random: R,
    max_depth: usize,
}

impl<R: Rng> RolloutEvaluator<R> {
    /// Default cap on the number of random moves in a rollout.
    pub const DEFAULT_MAX_DEPTH: usize = 1000;

    /// Creates a rollout evaluator drawing moves from `random`.
    pub fn new(random: R) -> Self {
        Self {
            random,
            max_depth: Self::DEFAULT_MAX_DEPTH,
        }
    }

    /// Caps the rollout length. A rollout hitting the cap scores as a draw.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    fn rollout<B: Board>(&mut self, board: &B) -> f64 {
        let player = board.player_to_move();
        let mut board = board.clone();
        for _ in 0..self.max_depth {
            let outcome = board.outcome();
            if outcome.is_over() {
                return outcome.value_for(player);
            }
            let actions = board.legal_actions();
            if actions.is_empty() {
                return 0.0;
            }
            let action = actions[self.random.random_range(0..actions.len())];
            board.apply_action(action);
        }
        board.outcome().value_for(player)
    }
}

impl<B: Board, R: Rng> Evaluator<B> for RolloutEvaluator<R> {
    fn evaluate(&mut self, board: &B) -> Result<Evaluation, EvaluatorError> {
        let actions = board.legal_actions();
        let value = self.rollout(board);
        Ok(Evaluation::uniform(&actions, value))
    }
}
