//! Core types for bridge card-play analysis: cards, bitboard card sets,
//! seats, contracts, tricks and the authoritative game state.

mod card;
pub mod cards;
mod constraint;
mod contract;
mod game;
mod seat;
mod trick;

pub use card::{Card, Rank, Suit};
pub use cards::CardSet;
pub use constraint::HandConstraint;
pub use contract::{Contract, Strain};
pub use game::{Deal, Game};
pub use seat::{Seat, Side};
pub use trick::Trick;

use std::fmt;

/// Error type for parsing cards, seats, contracts and deal strings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub message: String,
}

impl ParseError {
    pub fn new(message: impl Into<String>) -> Self {
        ParseError {
            message: message.into(),
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "parse error: {}", self.message)
    }
}

impl std::error::Error for ParseError {}
