use std::fmt::Debug;

/// Identifier of an action within a game's fixed action space `0..action_count()`.
pub type ActionId = usize;

/// The central trait of the library, defining the interface for a game state.
///
/// To search a custom game, this trait must be implemented. The search never
/// inspects the board beyond these methods: it clones it for every playout,
/// applies actions drawn from the evaluator's legal-action list and asks for
/// the outcome at the leaf.
pub trait Board: Clone {
    /// Identifies a player. Compared against the winner of a finished game.
    type Player: Copy + Eq + Debug;

    /// Feature representation handed to evaluators and stored in training samples.
    type Encoding: Clone;

    /// Size of the full action space. Every legal action is below this bound;
    /// padded move distributions are indexed by action, so an evaluator
    /// reporting a larger action would lose probability mass.
    fn action_count(&self) -> usize;

    /// Returns the player whose turn it is to move.
    fn player_to_move(&self) -> Self::Player;

    /// Returns all legal actions available from the current state.
    fn legal_actions(&self) -> Vec<ActionId>;

    /// Applies an action for the player to move, modifying the state in place.
    ///
    /// Callers only pass actions that were reported legal for this state.
    fn apply_action(&mut self, action: ActionId);

    /// Returns the current outcome of the game.
    fn outcome(&self) -> GameOutcome<Self::Player>;

    /// Encodes the position from the perspective of the player to move.
    fn encode(&self) -> Self::Encoding;

    /// Returns whether the game is over and, if somebody won, the winner.
    fn is_terminal(&self) -> (bool, Option<Self::Player>) {
        match self.outcome() {
            GameOutcome::InProgress => (false, None),
            GameOutcome::Win(winner) => (true, Some(winner)),
            GameOutcome::Draw => (true, None),
        }
    }
}

/// Represents the possible outcomes of a game.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum GameOutcome<P> {
    /// The game is still ongoing.
    InProgress,
    /// The given player has won.
    Win(P),
    /// The game has ended in a draw.
    Draw,
}

impl<P: Copy + Eq> GameOutcome<P> {
    /// Returns `true` unless the game is still in progress.
    pub fn is_over(&self) -> bool {
        !matches!(self, GameOutcome::InProgress)
    }

    /// Returns the winner, if any.
    pub fn winner(&self) -> Option<P> {
        match self {
            GameOutcome::Win(winner) => Some(*winner),
            _ => None,
        }
    }

    /// Scores a finished game for `player`: `1.0` for a win, `-1.0` for a loss
    /// and `0.0` for a draw or an unfinished game.
    pub fn value_for(&self, player: P) -> f64 {
        match self {
            GameOutcome::Win(winner) if *winner == player => 1.0,
            GameOutcome::Win(_) => -1.0,
            GameOutcome::InProgress | GameOutcome::Draw => 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::GameOutcome;

    #[test]
    fn value_for_scores_from_each_side() {
        let outcome = GameOutcome::Win(1u8);
        assert_eq!(outcome.value_for(1), 1.0);
        assert_eq!(outcome.value_for(2), -1.0);
        assert_eq!(GameOutcome::<u8>::Draw.value_for(1), 0.0);
        assert_eq!(GameOutcome::<u8>::InProgress.value_for(2), 0.0);
    }

    #[test]
    fn winner_and_is_over() {
        assert_eq!(GameOutcome::Win(2u8).winner(), Some(2));
        assert!(GameOutcome::<u8>::Draw.is_over());
        assert!(GameOutcome::<u8>::Draw.winner().is_none());
        assert!(!GameOutcome::<u8>::InProgress.is_over());
    }
}
