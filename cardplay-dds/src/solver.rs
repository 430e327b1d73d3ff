//! Built-in alpha-beta double-dummy solver.
//!
//! Minimax over the remaining play with alpha-beta pruning, a transposition
//! table probed at trick boundaries, and rank-equivalence move collapsing:
//! cards of one hand that are adjacent among the still-live cards of their
//! suit are interchangeable, so only the highest of each run is searched.

use rustc_hash::FxHashMap;

use cardplay_core::cards::suit_mask;
use cardplay_core::{Card, CardSet, Rank, Seat, Strain, Suit, Trick};
use cardplay_pbn::parse_deal;

use crate::{Oracle, OracleError, OracleHandle};

/// Zero-configuration factory for the built-in solver
#[derive(Debug, Default, Clone, Copy)]
pub struct AlphaBetaOracle;

impl Oracle for AlphaBetaOracle {
    fn open(
        &self,
        pbn: &str,
        strain: Strain,
        leader: Seat,
    ) -> Result<Box<dyn OracleHandle>, OracleError> {
        let (_, deal) = parse_deal(pbn).map_err(|e| OracleError::new(e.to_string()))?;

        let mut hands = [CardSet::new(); 4];
        for seat in Seat::ALL {
            hands[seat as usize] = deal
                .hand(seat)
                .ok_or_else(|| OracleError::new(format!("hand for seat {} not specified", seat)))?;
        }
        let len = hands[0].len();
        if hands.iter().any(|h| h.len() != len) {
            return Err(OracleError::new("hands are of unequal length"));
        }

        Ok(Box::new(Session {
            hands,
            trump: strain.trump(),
            trick: Trick::new(leader),
            table: FxHashMap::default(),
        }))
    }
}

/// Transposition entry with the usual bound kinds
#[derive(Clone, Copy)]
enum Bound {
    Exact(u8),
    Lower(u8),
    Upper(u8),
}

/// Table key: the four hands plus the seat on lead, valid at trick boundaries
type TableKey = (u64, u64, u64, u64, u8);

struct Session {
    hands: [CardSet; 4],
    trump: Option<Suit>,
    trick: Trick,
    /// Tricks North/South win from the keyed position
    table: FxHashMap<TableKey, Bound>,
}

impl OracleHandle for Session {
    fn exec(&mut self, commands: &str) -> Result<(), OracleError> {
        for token in commands.split_whitespace() {
            let card = parse_play(token)?;
            let seat = self.trick.to_act();
            if !self.hands[seat as usize].contains(card) {
                return Err(OracleError::new(format!(
                    "seat {} does not hold {}",
                    seat, card
                )));
            }
            self.hands[seat as usize].remove(card);
            self.trick.push(card);
            if self.trick.is_complete() {
                // Replayed tricks are the caller's; only the position advances
                let winner = self
                    .trick
                    .winner(self.trump)
                    .ok_or_else(|| OracleError::new("unscorable trick"))?;
                self.trick = Trick::new(winner);
            }
        }
        Ok(())
    }

    fn tricks_to_take(&mut self) -> Result<u8, OracleError> {
        let total_cards: u32 =
            self.hands.iter().map(|h| h.len()).sum::<u32>() + self.trick.len() as u32;
        if total_cards % 4 != 0 {
            return Err(OracleError::new("position does not divide into tricks"));
        }
        let remaining = (total_cards / 4) as u8;
        if remaining == 0 {
            return Ok(0);
        }

        let ns = search(
            &self.hands,
            self.trick,
            self.trump,
            0,
            remaining,
            &mut self.table,
        );
        match self.trick.to_act().side() {
            0 => Ok(ns),
            _ => Ok(remaining - ns),
        }
    }
}

/// Parse an oracle play token: `<suit><rank>`, e.g. "SA"
fn parse_play(token: &str) -> Result<Card, OracleError> {
    let mut chars = token.chars();
    match (chars.next(), chars.next(), chars.next()) {
        (Some(s), Some(r), None) => {
            let suit = Suit::from_char(s);
            let rank = Rank::from_char(r);
            match (suit, rank) {
                (Some(suit), Some(rank)) => Ok(Card::new(suit, rank)),
                _ => Err(OracleError::new(format!("invalid play token: {}", token))),
            }
        }
        _ => Err(OracleError::new(format!("invalid play token: {}", token))),
    }
}

/// Tricks North/South win from here with best play by both sides.
/// `alpha`/`beta` bound the NS trick count.
fn search(
    hands: &[CardSet; 4],
    trick: Trick,
    trump: Option<Suit>,
    mut alpha: u8,
    mut beta: u8,
    table: &mut FxHashMap<TableKey, Bound>,
) -> u8 {
    let remaining =
        ((hands.iter().map(|h| h.len()).sum::<u32>() + trick.len() as u32) / 4) as u8;
    if remaining == 0 {
        return 0;
    }

    // Probe only at trick boundaries; mid-trick positions are too transient
    let key = if trick.is_empty() {
        let k = (
            hands[0].bits(),
            hands[1].bits(),
            hands[2].bits(),
            hands[3].bits(),
            trick.leader() as u8,
        );
        match table.get(&k) {
            Some(Bound::Exact(v)) => return *v,
            Some(Bound::Lower(v)) => {
                if *v >= beta {
                    return *v;
                }
                alpha = alpha.max(*v);
            }
            Some(Bound::Upper(v)) => {
                if *v <= alpha {
                    return *v;
                }
                beta = beta.min(*v);
            }
            None => {}
        }
        Some(k)
    } else {
        None
    };

    let seat = trick.to_act();
    let maximizing = seat.side() == 0;
    let orig_alpha = alpha;
    let orig_beta = beta;

    let mut value = if maximizing { 0 } else { remaining };
    for card in moves(hands, trick) {
        let mut next_hands = *hands;
        next_hands[seat as usize].remove(card);
        let mut next_trick = trick;
        next_trick.push(card);

        let score = if next_trick.is_complete() {
            match next_trick.winner(trump) {
                Some(winner) => {
                    let delta = if winner.side() == 0 { 1 } else { 0 };
                    delta
                        + search(
                            &next_hands,
                            Trick::new(winner),
                            trump,
                            alpha.saturating_sub(delta),
                            beta.saturating_sub(delta),
                            table,
                        )
                }
                None => 0,
            }
        } else {
            search(&next_hands, next_trick, trump, alpha, beta, table)
        };

        if maximizing {
            value = value.max(score);
            alpha = alpha.max(value);
        } else {
            value = value.min(score);
            beta = beta.min(value);
        }
        if alpha >= beta {
            break;
        }
    }

    if let Some(k) = key {
        let bound = if value <= orig_alpha {
            Bound::Upper(value)
        } else if value >= orig_beta {
            Bound::Lower(value)
        } else {
            Bound::Exact(value)
        };
        table.insert(k, bound);
    }

    value
}

/// Legal moves for the seat to act, collapsed by rank equivalence
fn moves(hands: &[CardSet; 4], trick: Trick) -> Vec<Card> {
    let seat = trick.to_act();
    let hand = hands[seat as usize];

    let pool = match trick.lead_suit() {
        Some(lead) if !hand.suit(lead).is_empty() => hand.suit(lead),
        _ => hand,
    };

    // Live cards order the ranks; cards still in the current trick count
    let mut live = hands.iter().fold(CardSet::new(), |acc, h| acc | *h);
    for card in trick.cards() {
        live.insert(card);
    }

    let mut result = Vec::with_capacity(pool.len() as usize);
    for suit in Suit::ALL {
        let suit_live = live & CardSet::from_bits(suit_mask(suit));
        if (pool & suit_live).is_empty() {
            continue;
        }
        // Walk ranks downward; a run of consecutive live cards all in the
        // pool is one equivalence class, represented by its top card
        let mut in_class = false;
        for &rank in Rank::ALL.iter().rev() {
            let card = Card::new(suit, rank);
            if !suit_live.contains(card) {
                continue;
            }
            if pool.contains(card) {
                if !in_class {
                    result.push(card);
                    in_class = true;
                }
            } else {
                in_class = false;
            }
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open(pbn: &str, strain: Strain, leader: Seat) -> Box<dyn OracleHandle> {
        AlphaBetaOracle.open(pbn, strain, leader).unwrap()
    }

    /// One suit per hand: N spades, E hearts, S diamonds, W clubs
    const ONE_SUIT: &str =
        "N:AKQJT98765432... .AKQJT98765432.. ..AKQJT98765432. ...AKQJT98765432";

    #[test]
    fn test_monochromatic_notrump_leader_runs_the_suit() {
        // In notrump nobody can touch East's hearts
        let mut handle = open(ONE_SUIT, Strain::NoTrump, Seat::East);
        assert_eq!(handle.tricks_to_take().unwrap(), 13);
    }

    #[test]
    fn test_monochromatic_with_trumps_ruffs_everything() {
        // With spades trump North over-ruffs every lead
        let mut handle = open(ONE_SUIT, Strain::Spades, Seat::East);
        assert_eq!(handle.tricks_to_take().unwrap(), 0);
    }

    #[test]
    fn test_exec_advances_the_position() {
        let mut handle = open(ONE_SUIT, Strain::NoTrump, Seat::East);
        // East cashes one heart; the rest are still good
        handle.exec("HA D2 C2 S2").unwrap();
        assert_eq!(handle.tricks_to_take().unwrap(), 12);
    }

    #[test]
    fn test_exec_rejects_card_not_held() {
        let mut handle = open(ONE_SUIT, Strain::NoTrump, Seat::East);
        assert!(handle.exec("SA").is_err());
        assert!(handle.exec("H?").is_err());
    }

    #[test]
    fn test_one_card_endgame() {
        // Last trick: East leads the club king into North's ace
        let pbn = "N:...A ...K ...Q ...J";
        let mut handle = open(pbn, Strain::NoTrump, Seat::East);
        assert_eq!(handle.tricks_to_take().unwrap(), 0);
    }

    #[test]
    fn test_finesse_onside() {
        // South leads toward North's AQ; the king sits with West, so the
        // queen scores and both tricks are North/South's
        let pbn = "N:AQ... 54... 2..2. K3...";
        let mut handle = open(pbn, Strain::NoTrump, Seat::South);
        assert_eq!(handle.tricks_to_take().unwrap(), 2);
    }

    #[test]
    fn test_finesse_offside_guarded() {
        // The spade king sits behind the AQ and is twice guarded; the ace
        // is the only North/South spade trick, and the heart goes to East
        let pbn = "N:AQ.2.. K76... 543... .JT..2";
        let mut handle = open(pbn, Strain::NoTrump, Seat::South);
        assert_eq!(handle.tricks_to_take().unwrap(), 1);
    }

    #[test]
    fn test_finesse_onside_guarded() {
        // Same cards with the king in front of the AQ: the finesse and the
        // ace both score
        let pbn = "N:AQ.2.. .JT..2 543... K76...";
        let mut handle = open(pbn, Strain::NoTrump, Seat::South);
        assert_eq!(handle.tricks_to_take().unwrap(), 2);
    }

    #[test]
    fn test_defender_side_counting() {
        // Same finesse position queried from the defenders' viewpoint:
        // West on lead holding K3 under the AQ never scores the king
        let pbn = "N:AQ... 54... 2..2. K3...";
        let mut handle = open(pbn, Strain::NoTrump, Seat::West);
        let tricks = handle.tricks_to_take().unwrap();
        assert_eq!(tricks, 0);
    }

    #[test]
    fn test_open_rejects_unknown_hands() {
        assert!(AlphaBetaOracle
            .open("N:AQ... ... 2..2. K3...", Strain::NoTrump, Seat::South)
            .is_err());
    }

    #[test]
    fn test_open_rejects_unequal_hands() {
        assert!(AlphaBetaOracle
            .open("N:AQ3... 54... 2..2. K3...", Strain::NoTrump, Seat::South)
            .is_err());
    }

    #[test]
    fn test_equivalent_ranks_collapse() {
        let hands = [
            CardSet::from_bits(suit_mask(Suit::Spades)),
            CardSet::from_bits(suit_mask(Suit::Hearts)),
            CardSet::from_bits(suit_mask(Suit::Diamonds)),
            CardSet::from_bits(suit_mask(Suit::Clubs)),
        ];
        // All 13 spades are one run: a single representative move
        let generated = moves(&hands, Trick::new(Seat::North));
        assert_eq!(generated, vec![Card::new(Suit::Spades, Rank::Ace)]);
    }

    #[test]
    fn test_broken_runs_stay_distinct() {
        // North holds AQ of spades, the king is live elsewhere
        let north: CardSet = ["AS", "QS"].iter().map(|s| s.parse().unwrap()).collect();
        let west: CardSet = ["KS", "3S"].iter().map(|s| s.parse().unwrap()).collect();
        let east: CardSet = ["5S", "4S"].iter().map(|s| s.parse().unwrap()).collect();
        let south: CardSet = ["2S", "2H"].iter().map(|s| s.parse().unwrap()).collect();
        let hands = [north, east, south, west];

        let generated = moves(&hands, Trick::new(Seat::North));
        assert_eq!(generated.len(), 2);
    }
}
