//! Agents: decision makers a game driver can ask for moves.

use rand::Rng;
use tracing::debug;

use crate::board::{ActionId, Board};
use crate::config::MctsConfig;
use crate::evaluator::Evaluator;
use crate::mcts::{MonteCarloTreeSearch, SearchError};
use crate::random::{mix_with_noise, sample_index};

/// Dirichlet concentration used for self-play noise unless configured.
pub const DEFAULT_DIRICHLET_ALPHA: f64 = 0.3;
/// Share of the noise in the self-play sampling distribution unless configured.
pub const DEFAULT_NOISE_WEIGHT: f64 = 0.25;

/// A chosen move, optionally with the search's move probabilities.
#[derive(Debug, Clone, PartialEq)]
pub struct Decision {
    /// The action to play.
    pub action: ActionId,
    /// Move probabilities over the full action space, zero for unexplored
    /// actions. Present when requested.
    pub distribution: Option<Vec<f64>>,
}

/// A player the game drivers can ask for moves.
pub trait Agent<B: Board> {
    /// Chooses a move for the player to move on `board`.
    ///
    /// Fails with [`SearchError::NoLegalActions`] on a finished position.
    fn decide(
        &mut self,
        board: &B,
        temperature: f64,
        want_distribution: bool,
    ) -> Result<Decision, SearchError>;

    /// Tells the agent a move was played on the real board. `None` means the
    /// agent should forget everything it kept from earlier moves.
    fn notify_move_played(&mut self, action: Option<ActionId>);

    /// Forgets any state carried over between moves.
    fn reset(&mut self) {
        self.notify_move_played(None);
    }
}

/// An agent backed by Monte Carlo tree search.
///
/// In evaluation mode it samples from the search distribution and drops the
/// tree after every decision. In self-play mode it samples from the
/// distribution mixed with Dirichlet noise and keeps the subtree of the
/// chosen move for its next decision.
pub struct MctsPlayer<B: Board, E: Evaluator<B>, R: Rng> {
    mcts: MonteCarloTreeSearch<B, E>,
    random: R,
    self_play: bool,
    dirichlet_alpha: f64,
    noise_weight: f64,
}

impl<B: Board, E: Evaluator<B>, R: Rng> MctsPlayer<B, E, R> {
    /// Creates an evaluation-mode player around a search.
    pub fn new(mcts: MonteCarloTreeSearch<B, E>, random: R) -> Self {
        Self {
            mcts,
            random,
            self_play: false,
            dirichlet_alpha: DEFAULT_DIRICHLET_ALPHA,
            noise_weight: DEFAULT_NOISE_WEIGHT,
        }
    }

    /// Builds the search and the player from a validated config, including
    /// its self-play mode and noise settings.
    pub fn from_config(evaluator: E, config: &MctsConfig, random: R) -> Result<Self, SearchError> {
        config.validate()?;
        let mcts = MonteCarloTreeSearch::builder(evaluator)
            .with_config(config)
            .build();
        Ok(Self::new(mcts, random)
            .with_self_play(config.self_play)
            .with_noise(config.dirichlet_alpha, config.noise_weight))
    }

    /// Switches between self-play and evaluation mode.
    pub fn with_self_play(mut self, self_play: bool) -> Self {
        self.self_play = self_play;
        self
    }

    /// Sets the Dirichlet concentration and the noise share used in self-play.
    pub fn with_noise(mut self, dirichlet_alpha: f64, noise_weight: f64) -> Self {
        self.dirichlet_alpha = dirichlet_alpha;
        self.noise_weight = noise_weight;
        self
    }

    /// Whether the player runs in self-play mode.
    pub fn is_self_play(&self) -> bool {
        self.self_play
    }

    /// The underlying search.
    pub fn mcts(&self) -> &MonteCarloTreeSearch<B, E> {
        &self.mcts
    }

    /// The underlying search, mutably.
    pub fn mcts_mut(&mut self) -> &mut MonteCarloTreeSearch<B, E> {
        &mut self.mcts
    }
}

impl<B: Board, E: Evaluator<B>, R: Rng> Agent<B> for MctsPlayer<B, E, R> {
    fn decide(
        &mut self,
        board: &B,
        temperature: f64,
        want_distribution: bool,
    ) -> Result<Decision, SearchError> {
        if board.legal_actions().is_empty() {
            return Err(SearchError::NoLegalActions);
        }

        let distribution = self.mcts.get_move_probabilities(board, temperature)?;
        let padded = want_distribution.then(|| distribution.padded(board.action_count()));

        let sampled = if self.self_play {
            let mixed = mix_with_noise(
                &distribution.probabilities,
                self.dirichlet_alpha,
                self.noise_weight,
                &mut self.random,
            )?;
            sample_index(&mixed, &mut self.random).map(|i| distribution.actions[i])
        } else {
            distribution.sample(&mut self.random)
        };
        let action = sampled.ok_or(SearchError::EmptyRoot)?;

        let reused = if self.self_play {
            self.mcts.advance(action)
        } else {
            self.mcts.reset();
            false
        };

        debug!(
            action,
            self_play = self.self_play,
            probability = distribution.probability(action),
            reused,
            "decided"
        );
        Ok(Decision {
            action,
            distribution: padded,
        })
    }

    fn notify_move_played(&mut self, action: Option<ActionId>) {
        match action {
            Some(action) => {
                self.mcts.advance(action);
            }
            None => self.mcts.reset(),
        }
    }
}

/// An agent playing uniformly random legal moves. Baseline opponent.
#[derive(Debug, Clone)]
pub struct RandomPlayer<R: Rng> {
    random: R,
}

impl<R: Rng> RandomPlayer<R> {
    /// Creates a random player drawing from `random`.
    pub fn new(random: R) -> Self {
        Self { random }
    }
}

impl<B: Board, R: Rng> Agent<B> for RandomPlayer<R> {
    fn decide(
        &mut self,
        board: &B,
        _temperature: f64,
        want_distribution: bool,
    ) -> Result<Decision, SearchError> {
        let actions = board.legal_actions();
        if actions.is_empty() {
            return Err(SearchError::NoLegalActions);
        }

        let action = actions[self.random.random_range(0..actions.len())];
        let distribution = want_distribution.then(|| {
            let mut uniform = vec![0.0; board.action_count()];
            for &a in &actions {
                if let Some(slot) = uniform.get_mut(a) {
                    *slot = 1.0 / actions.len() as f64;
                }
            }
            uniform
        });
        Ok(Decision {
            action,
            distribution,
        })
    }

    fn notify_move_played(&mut self, _action: Option<ActionId>) {}
}
