//! A game-agnostic Monte Carlo tree search guided by a policy/value evaluator.
//!
//! The search follows the PUCT rule used by AlphaZero-style agents: each
//! playout descends the tree picking the child with the best
//! `Q + c * P * sqrt(N_parent) / (1 + N)`, asks the evaluator for move priors
//! and a value at the leaf, expands it and backs the value up with the sign
//! flipped at every ply. Visit counts at the root then become the move
//! probabilities used both to play and as policy training targets.
//!
//! Games plug in through the [`board::Board`] trait and evaluators through
//! [`evaluator::Evaluator`] (any closure returning an [`evaluator::Evaluation`]
//! works). [`player::MctsPlayer`] turns a search into an agent and
//! [`game::Game`] drives self-play games that produce training samples.
//!
//! # Example
//!
//! ```rust
//! use alphazero_mcts::boards::gobang::GobangBoard;
//! use alphazero_mcts::evaluator::UniformEvaluator;
//! use alphazero_mcts::game::Game;
//! use alphazero_mcts::mcts::MonteCarloTreeSearch;
//! use alphazero_mcts::player::MctsPlayer;
//! use alphazero_mcts::random::seeded;
//!
//! // Create and configure a new search using the builder
//! let mcts = MonteCarloTreeSearch::<GobangBoard, _>::builder(UniformEvaluator)
//!     .with_exploration_constant(5.0)
//!     .with_simulation_count(100)
//!     .build();
//!
//! // Wrap it into a self-play agent with a seeded random source
//! let mut player = MctsPlayer::new(mcts, seeded(42)).with_self_play(true);
//!
//! // Play one game of tic-tac-toe against itself
//! let record = Game::new(GobangBoard::tic_tac_toe()).start_self_play(&mut player, 1.0)?;
//!
//! println!("Winner: {:?}, {} training samples", record.winner, record.samples.len());
//! # Ok::<(), alphazero_mcts::mcts::SearchError>(())
//! ```

/// Contains the `Board` trait and related types that define the interface for a game.
pub mod board;
/// Contains pre-made implementations of the `Board` trait.
pub mod boards;
/// Search and agent configuration.
pub mod config;
/// The evaluator interface and model-free evaluators.
pub mod evaluator;
/// Self-play and match drivers.
pub mod game;
/// The core module of the library, containing the `MonteCarloTreeSearch` implementation.
pub mod mcts;
/// Contains the `MctsNode` struct, the statistics stored in each tree node.
pub mod mcts_node;
/// Agents wrapping the search for use by game drivers.
pub mod player;
/// Seeded generators, weighted sampling and Dirichlet noise.
pub mod random;
/// Arena storage of the search tree.
pub mod tree;

pub use board::{ActionId, Board, GameOutcome};
pub use config::MctsConfig;
pub use evaluator::{Evaluation, Evaluator, EvaluatorError};
pub use game::{Game, SelfPlayRecord, TrainingSample};
pub use mcts::{ActionDistribution, MonteCarloTreeSearch, SearchError};
pub use player::{Agent, Decision, MctsPlayer, RandomPlayer};
