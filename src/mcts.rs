use std::marker::PhantomData;
use std::time::{Duration, Instant};

use ego_tree::NodeRef;
use rand::Rng;
use thiserror::Error;
use tracing::{debug, trace};

use crate::board::{ActionId, Board, GameOutcome};
use crate::config::MctsConfig;
use crate::evaluator::{Evaluation, Evaluator, EvaluatorError};
use crate::mcts_node::MctsNode;
use crate::random::sample_index;
use crate::tree::SearchTree;

/// Exploration constant used when none is configured.
pub const DEFAULT_EXPLORATION_CONSTANT: f64 = 5.0;
/// Playouts per decision used when none is configured.
pub const DEFAULT_SIMULATION_COUNT: u32 = 300;
/// Added to visit counts before taking their logarithm.
const VISIT_EPSILON: f64 = 1e-10;

/// Errors that can occur during search.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Invalid call: {0}")]
    InvalidCall(String),

    #[error("No legal actions available")]
    NoLegalActions,

    #[error("Root has no children, no simulations executed")]
    EmptyRoot,

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Evaluator error: {0}")]
    Evaluator(#[from] EvaluatorError),
}

/// The main struct for running PUCT Monte Carlo tree search.
///
/// It owns the search tree and the evaluator guiding it. Between real moves
/// the tree is either advanced into the played subtree or reset.
pub struct MonteCarloTreeSearch<B: Board, E: Evaluator<B>> {
    tree: SearchTree,
    evaluator: E,
    exploration_constant: f64,
    simulation_count: u32,
    time_budget: Option<Duration>,
    _board: PhantomData<fn() -> B>,
}

/// A builder for creating instances of `MonteCarloTreeSearch`.
pub struct MonteCarloTreeSearchBuilder<B: Board, E: Evaluator<B>> {
    evaluator: E,
    exploration_constant: f64,
    simulation_count: u32,
    time_budget: Option<Duration>,
    _board: PhantomData<fn() -> B>,
}

impl<B: Board, E: Evaluator<B>> MonteCarloTreeSearchBuilder<B, E> {
    /// Creates a new builder around the given evaluator.
    pub fn new(evaluator: E) -> Self {
        Self {
            evaluator,
            exploration_constant: DEFAULT_EXPLORATION_CONSTANT,
            simulation_count: DEFAULT_SIMULATION_COUNT,
            time_budget: None,
            _board: PhantomData,
        }
    }

    /// Sets the exploration constant `c` of the PUCT rule.
    pub fn with_exploration_constant(mut self, c: f64) -> Self {
        self.exploration_constant = c;
        self
    }

    /// Sets the number of playouts per call to `run_simulations`.
    pub fn with_simulation_count(mut self, n: u32) -> Self {
        self.simulation_count = n;
        self
    }

    /// Runs playouts until `budget` has elapsed instead of a fixed count.
    pub fn with_time_budget(mut self, budget: Duration) -> Self {
        self.time_budget = Some(budget);
        self
    }

    /// Takes the search parameters from a config.
    pub fn with_config(mut self, config: &MctsConfig) -> Self {
        self.exploration_constant = config.c_puct;
        self.simulation_count = config.n_playout;
        self.time_budget = config.time_budget();
        self
    }

    /// Builds the `MonteCarloTreeSearch` instance with the configured parameters.
    pub fn build(self) -> MonteCarloTreeSearch<B, E> {
        MonteCarloTreeSearch {
            tree: SearchTree::new(),
            evaluator: self.evaluator,
            exploration_constant: self.exploration_constant,
            simulation_count: self.simulation_count,
            time_budget: self.time_budget,
            _board: PhantomData,
        }
    }
}

impl<B: Board, E: Evaluator<B>> MonteCarloTreeSearch<B, E> {
    /// Returns a new builder for `MonteCarloTreeSearch`.
    pub fn builder(evaluator: E) -> MonteCarloTreeSearchBuilder<B, E> {
        MonteCarloTreeSearchBuilder::new(evaluator)
    }

    /// Creates a search with a fresh root.
    pub fn new(evaluator: E, exploration_constant: f64, simulation_count: u32) -> Self {
        Self::builder(evaluator)
            .with_exploration_constant(exploration_constant)
            .with_simulation_count(simulation_count)
            .build()
    }

    /// Returns an immutable reference to the underlying search tree.
    pub fn tree(&self) -> &SearchTree {
        &self.tree
    }

    /// Returns the root node of the search tree.
    pub fn root(&self) -> NodeRef<'_, MctsNode> {
        self.tree.root()
    }

    /// The exploration constant `c`.
    pub fn exploration_constant(&self) -> f64 {
        self.exploration_constant
    }

    /// Playouts per call to `run_simulations` when no time budget is set.
    pub fn simulation_count(&self) -> u32 {
        self.simulation_count
    }

    /// Returns the evaluator.
    pub fn evaluator(&self) -> &E {
        &self.evaluator
    }

    /// Returns the evaluator mutably, e.g. to swap model weights.
    pub fn evaluator_mut(&mut self) -> &mut E {
        &mut self.evaluator
    }

    /// Runs the configured number of playouts from `state`, each on its own
    /// clone. `state` itself is never modified. Returns the number of
    /// playouts executed.
    ///
    /// Fails with [`SearchError::InvalidParameter`] if the exploration
    /// constant is not positive, or if there is neither a playout count nor
    /// a time budget.
    pub fn run_simulations(&mut self, state: &B) -> Result<u32, SearchError> {
        self.check_parameters()?;
        let started = Instant::now();
        let mut executed = 0u32;
        loop {
            let done = match self.time_budget {
                Some(budget) => executed > 0 && started.elapsed() >= budget,
                None => executed >= self.simulation_count,
            };
            if done {
                break;
            }
            self.playout(state.clone())?;
            executed += 1;
        }

        debug!(
            playouts = executed,
            root_visits = self.tree.root().value().visits,
            tree_size = self.tree.len(),
            "simulations complete"
        );
        Ok(executed)
    }

    fn check_parameters(&self) -> Result<(), SearchError> {
        if !(self.exploration_constant.is_finite() && self.exploration_constant > 0.0) {
            return Err(SearchError::InvalidParameter(format!(
                "exploration constant must be positive, got {}",
                self.exploration_constant
            )));
        }
        if self.simulation_count == 0 && self.time_budget.is_none() {
            return Err(SearchError::InvalidParameter(
                "simulation count must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Descends to a leaf, evaluates it and backs the value up.
    fn playout(&mut self, mut state: B) -> Result<(), SearchError> {
        let mut node_id = self.tree.root_id();
        let mut depth = 0u32;
        while !self.tree.is_leaf(node_id) {
            let (action, child) = self.tree.select(node_id, self.exploration_constant)?;
            state.apply_action(action);
            node_id = child;
            depth += 1;
        }

        let Evaluation { priors, value } = self.evaluator.evaluate(&state)?;
        let outcome = state.outcome();
        let leaf_value = match outcome {
            GameOutcome::InProgress => {
                self.tree.expand(node_id, priors)?;
                value
            }
            GameOutcome::Draw | GameOutcome::Win(_) => outcome.value_for(state.player_to_move()),
        };

        // the leaf's statistics describe the move into it, i.e. the parent's side
        self.tree.update_recursive(node_id, -leaf_value)?;

        trace!(depth, leaf_value, terminal = outcome.is_over(), "playout");
        Ok(())
    }

    /// Turns the visit counts of the root's children into move probabilities,
    /// `p_i ∝ exp(ln(N_i + ε) / temperature)`.
    pub fn compute_action_distribution(
        &self,
        temperature: f64,
    ) -> Result<ActionDistribution, SearchError> {
        if !(temperature.is_finite() && temperature > 0.0) {
            return Err(SearchError::InvalidCall(format!(
                "temperature must be positive, got {temperature}"
            )));
        }

        let (actions, visits): (Vec<ActionId>, Vec<u32>) = self
            .tree
            .root()
            .children()
            .filter_map(|child| child.value().action.map(|a| (a, child.value().visits)))
            .unzip();
        if actions.is_empty() {
            return Err(SearchError::EmptyRoot);
        }

        Ok(ActionDistribution {
            actions,
            probabilities: visit_distribution(&visits, temperature),
        })
    }

    /// Runs the simulations and returns the resulting move probabilities.
    pub fn get_move_probabilities(
        &mut self,
        state: &B,
        temperature: f64,
    ) -> Result<ActionDistribution, SearchError> {
        self.run_simulations(state)?;
        self.compute_action_distribution(temperature)
    }

    /// Moves the root into the subtree of `action`, keeping its statistics.
    /// An action the root never explored resets the tree. Returns whether the
    /// subtree was reused.
    pub fn advance(&mut self, action: ActionId) -> bool {
        let reused = self.tree.promote(action);
        debug!(action, reused, "tree advanced");
        reused
    }

    /// Discards the tree and starts over from a fresh root.
    pub fn reset(&mut self) {
        self.tree.reset();
    }
}

/// Softmax of `ln(N + ε) / temperature`, shifted by the maximum for stability.
pub(crate) fn visit_distribution(visits: &[u32], temperature: f64) -> Vec<f64> {
    let logits: Vec<f64> = visits
        .iter()
        .map(|&n| (f64::from(n) + VISIT_EPSILON).ln() / temperature)
        .collect();
    let max = logits.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let mut probabilities: Vec<f64> = logits.iter().map(|l| (l - max).exp()).collect();
    let sum: f64 = probabilities.iter().sum();
    for p in &mut probabilities {
        *p /= sum;
    }
    probabilities
}

/// Move probabilities over the root's explored actions.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionDistribution {
    /// Actions in the order the root's children were created.
    pub actions: Vec<ActionId>,
    /// Probability of each entry of `actions`; sums to one.
    pub probabilities: Vec<f64>,
}

impl ActionDistribution {
    /// Number of actions in the support.
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Whether the support is empty.
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Iterates over `(action, probability)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (ActionId, f64)> + '_ {
        self.actions.iter().copied().zip(self.probabilities.iter().copied())
    }

    /// Probability of `action`, zero outside the support.
    pub fn probability(&self, action: ActionId) -> f64 {
        self.iter()
            .find(|(a, _)| *a == action)
            .map_or(0.0, |(_, p)| p)
    }

    /// Expands the distribution over the whole action space, with zeros for
    /// actions the root never explored. This is the policy training target.
    ///
    /// Every action must be below `action_count`; debug builds assert it.
    pub fn padded(&self, action_count: usize) -> Vec<f64> {
        debug_assert!(
            self.actions.iter().all(|&action| action < action_count),
            "action outside the action space of size {action_count}: {:?}",
            self.actions
        );
        let mut padded = vec![0.0; action_count];
        for (action, p) in self.iter() {
            if let Some(slot) = padded.get_mut(action) {
                *slot = p;
            }
        }
        padded
    }

    /// The most probable action; ties go to the earliest.
    pub fn best_action(&self) -> Option<ActionId> {
        let mut best: Option<(ActionId, f64)> = None;
        for (action, p) in self.iter() {
            if best.is_none_or(|(_, best_p)| p > best_p) {
                best = Some((action, p));
            }
        }
        best.map(|(action, _)| action)
    }

    /// Draws an action according to the probabilities.
    pub fn sample<R: Rng + ?Sized>(&self, random: &mut R) -> Option<ActionId> {
        sample_index(&self.probabilities, random).map(|i| self.actions[i])
    }
}
