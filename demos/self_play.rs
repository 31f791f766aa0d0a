extern crate alphazero_mcts;

use alphazero_mcts::boards::gobang::GobangBoard;
use alphazero_mcts::evaluator::{RolloutEvaluator, UniformEvaluator};
use alphazero_mcts::game::Game;
use alphazero_mcts::player::{MctsPlayer, RandomPlayer};
use alphazero_mcts::random::seeded;
use alphazero_mcts::{MctsConfig, SearchError};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), SearchError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let game = Game::new(GobangBoard::tic_tac_toe());

    // Generate one self-play game with a model-free evaluator
    let config = MctsConfig::for_self_play().with_playouts(200);
    let mut trainee = MctsPlayer::from_config(UniformEvaluator, &config, seeded(1))?;
    let record = game.start_self_play(&mut trainee, config.temperature)?;
    println!("Self-play winner: {:?}", record.winner);
    for (turn, sample) in record.samples.iter().enumerate() {
        let policy: Vec<String> = sample.policy.iter().map(|p| format!("{p:.2}")).collect();
        println!("Turn {turn}: z = {:+.0}, pi = [{}]", sample.outcome, policy.join(", "));
    }

    // Pit plain rollout MCTS against a random player
    let config = MctsConfig::for_evaluation().with_playouts(400);
    let mut searcher =
        MctsPlayer::from_config(RolloutEvaluator::new(seeded(2)), &config, seeded(3))?;
    let mut random = RandomPlayer::new(seeded(4));
    let winner = game.start_play(&mut searcher, &mut random, config.temperature)?;
    println!("Rollout MCTS vs random, winner: {winner:?}");

    Ok(())
}
