use std::fmt;
use std::str::FromStr;

use crate::{ParseError, Suit};

/// Denomination of a contract: one of the four suits or notrump
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strain {
    Clubs,
    Diamonds,
    Hearts,
    Spades,
    NoTrump,
}

impl Strain {
    /// All five strains in ranking order
    pub const ALL: [Strain; 5] = [
        Strain::Clubs,
        Strain::Diamonds,
        Strain::Hearts,
        Strain::Spades,
        Strain::NoTrump,
    ];

    /// Convert from a Suit
    pub fn from_suit(suit: Suit) -> Self {
        match suit {
            Suit::Clubs => Strain::Clubs,
            Suit::Diamonds => Strain::Diamonds,
            Suit::Hearts => Strain::Hearts,
            Suit::Spades => Strain::Spades,
        }
    }

    /// The trump suit, if any (NoTrump returns None)
    pub fn trump(&self) -> Option<Suit> {
        match self {
            Strain::Clubs => Some(Suit::Clubs),
            Strain::Diamonds => Some(Suit::Diamonds),
            Strain::Hearts => Some(Suit::Hearts),
            Strain::Spades => Some(Suit::Spades),
            Strain::NoTrump => None,
        }
    }

    fn token(&self) -> &'static str {
        match self {
            Strain::Clubs => "C",
            Strain::Diamonds => "D",
            Strain::Hearts => "H",
            Strain::Spades => "S",
            Strain::NoTrump => "NT",
        }
    }
}

impl fmt::Display for Strain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.token())
    }
}

/// A contract: level 1-7 in a strain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Contract {
    pub level: u8,
    pub strain: Strain,
}

impl Contract {
    /// Create a contract; the level must be in 1..=7
    pub fn new(level: u8, strain: Strain) -> Option<Self> {
        if (1..=7).contains(&level) {
            Some(Contract { level, strain })
        } else {
            None
        }
    }

    /// Tricks the declaring side needs to make the contract
    #[inline]
    pub fn required_tricks(&self) -> u8 {
        6 + self.level
    }

    /// The trump suit, if any
    #[inline]
    pub fn trump(&self) -> Option<Suit> {
        self.strain.trump()
    }
}

impl fmt::Display for Contract {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.level, self.strain)
    }
}

impl FromStr for Contract {
    type Err = ParseError;

    /// Parse `<level><strain>` (e.g. "3NT", "4s"), case-insensitively
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let err = || ParseError::new(format!("invalid contract: {}", s));

        let mut chars = s.chars();
        let level = chars
            .next()
            .and_then(|c| c.to_digit(10))
            .filter(|l| (1..=7).contains(l))
            .ok_or_else(err)? as u8;

        let strain = match chars.as_str().to_ascii_uppercase().as_str() {
            "C" => Strain::Clubs,
            "D" => Strain::Diamonds,
            "H" => Strain::Hearts,
            "S" => Strain::Spades,
            "N" | "NT" => Strain::NoTrump,
            _ => return Err(err()),
        };

        Ok(Contract { level, strain })
    }
}
