//! PBN deal-string support.
//!
//! Only the deal-string form of PBN is handled here: parsing a
//! `<seat>:<h0> <h1> <h2> <h3>` string into known hands plus a hidden
//! remainder, and formatting deals back out for display or for the
//! double-dummy oracle.

mod deal;

pub use deal::{format_deal, format_hands, parse_deal};
