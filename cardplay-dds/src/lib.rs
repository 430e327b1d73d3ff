//! Double-dummy oracle for fully-specified deals.
//!
//! The oracle answers one question: given a complete deal, a strain and the
//! seat on lead, how many tricks will the side next to act take with all four
//! hands visible? The interface is handle-based: a handle is opened on a
//! deal, a trailing sequence of plays may be applied to it, and it is
//! released when dropped.

mod solver;

pub use solver::AlphaBetaOracle;

use std::fmt;

use cardplay_core::{Seat, Strain};

/// Error raised by oracle construction or use
#[derive(Debug, Clone)]
pub struct OracleError {
    pub message: String,
}

impl OracleError {
    pub fn new(message: impl Into<String>) -> Self {
        OracleError {
            message: message.into(),
        }
    }
}

impl fmt::Display for OracleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "oracle error: {}", self.message)
    }
}

impl std::error::Error for OracleError {}

/// Factory side of the oracle contract
pub trait Oracle: Send + Sync {
    /// Open a solving handle on a PBN deal string with the given strain and
    /// the seat on lead. All four hands must be fully specified and of equal
    /// length.
    fn open(
        &self,
        pbn: &str,
        strain: Strain,
        leader: Seat,
    ) -> Result<Box<dyn OracleHandle>, OracleError>;
}

/// One solving session, released exactly once when dropped
pub trait OracleHandle {
    /// Apply a whitespace-separated sequence of `<suit><rank>` plays in
    /// rotation from the seat currently due to act
    fn exec(&mut self, commands: &str) -> Result<(), OracleError>;

    /// Optimal tricks (0..=13) the side next to act will win from the
    /// current position onward
    fn tricks_to_take(&mut self) -> Result<u8, OracleError>;
}
