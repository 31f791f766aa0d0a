//! Contains pre-made implementations of the `Board` trait.

/// A `Board` implementation for "n in a row" games, tic-tac-toe included.
pub mod gobang;
