use std::fmt;
use std::str::FromStr;

use crate::ParseError;

/// The four seats at the table, numbered clockwise
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum Seat {
    North = 0,
    East = 1,
    South = 2,
    West = 3,
}

/// A partnership index: 0 = North/South, 1 = East/West
pub type Side = u8;

impl Seat {
    /// All seats in clockwise order starting from North
    pub const ALL: [Seat; 4] = [Seat::North, Seat::East, Seat::South, Seat::West];

    /// Convert from numeric index (0-3)
    pub fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(Seat::North),
            1 => Some(Seat::East),
            2 => Some(Seat::South),
            3 => Some(Seat::West),
            _ => None,
        }
    }

    /// The seat to this seat's left (next to act)
    #[inline]
    pub fn next(&self) -> Seat {
        Seat::ALL[((*self as u8 + 1) & 3) as usize]
    }

    /// Advance clockwise by `steps` seats
    #[inline]
    pub fn advance(&self, steps: u8) -> Seat {
        Seat::ALL[((*self as u8 + steps) & 3) as usize]
    }

    /// This seat's partner
    #[inline]
    pub fn partner(&self) -> Seat {
        Seat::ALL[((*self as u8 + 2) & 3) as usize]
    }

    /// The partnership this seat belongs to (NS = 0, EW = 1)
    #[inline]
    pub fn side(&self) -> Side {
        *self as u8 & 1
    }

    /// Get the seat as a single character (N, E, S, W)
    pub fn to_char(&self) -> char {
        match self {
            Seat::North => 'N',
            Seat::East => 'E',
            Seat::South => 'S',
            Seat::West => 'W',
        }
    }

    /// Parse a seat character, case-insensitively
    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'N' => Some(Seat::North),
            'E' => Some(Seat::East),
            'S' => Some(Seat::South),
            'W' => Some(Seat::West),
            _ => None,
        }
    }
}

impl fmt::Display for Seat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_char())
    }
}

impl FromStr for Seat {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.trim().chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => {
                Seat::from_char(c).ok_or_else(|| ParseError::new(format!("invalid seat: {}", s)))
            }
            _ => Err(ParseError::new(format!("invalid seat: {}", s))),
        }
    }
}
