//! Playout world: one fully-specified determinization of the position.
//!
//! Worlds are cheap, mutated destructively by the simulation loop, and never
//! shared between threads. Each play extends a textual history (replayed
//! into the oracle) and the packed public key that identifies the
//! information set reached.

use cardplay_core::{Card, CardSet, Seat, Side, Strain, Suit, Trick};
use cardplay_dds::{Oracle, OracleError};

/// A fully-specified deal being played out
#[derive(Debug, Clone)]
pub struct World {
    hands: [CardSet; 4],
    strain: Strain,
    trick: Trick,
    taken: [u8; 2],
    /// Oracle replay commands for every play since the position was fixed
    history: String,
    /// Public play-history key: 8 bits per play, oldest in the high bits
    key: u64,
    /// PBN of the position the oracle is opened on
    pbn: String,
    pbn_leader: Seat,
}

impl World {
    /// Create a world at a trick boundary with `leader` on lead
    pub fn new(hands: [CardSet; 4], strain: Strain, leader: Seat, taken: [u8; 2]) -> Self {
        World {
            hands,
            strain,
            trick: Trick::new(leader),
            taken,
            history: String::new(),
            key: 0,
            pbn: String::new(),
            pbn_leader: leader,
        }
    }

    /// The hand currently held by a seat
    pub fn hand(&self, seat: Seat) -> CardSet {
        self.hands[seat as usize]
    }

    /// The seat due to play next
    pub fn to_act(&self) -> Seat {
        self.trick.to_act()
    }

    pub fn strain(&self) -> Strain {
        self.strain
    }

    pub fn trump(&self) -> Option<Suit> {
        self.strain.trump()
    }

    pub fn taken(&self) -> [u8; 2] {
        self.taken
    }

    /// The packed public play-history key
    pub fn key(&self) -> u64 {
        self.key
    }

    /// Remove already-played cards from the sampled hands
    pub fn remove_played(&mut self, plays: &[CardSet; 4]) {
        for i in 0..4 {
            self.hands[i] &= !plays[i];
        }
    }

    /// Fix the current position as the oracle's starting point. Must be
    /// called at a trick boundary, before any play.
    pub fn set_position(&mut self, pbn: String) {
        self.pbn = pbn;
        self.pbn_leader = self.trick.leader();
    }

    /// Legal moves for the seat to act: follow suit if able, else anything
    pub fn legal_moves(&self) -> Vec<Card> {
        let hand = self.hands[self.to_act() as usize];
        let pool = match self.trick.lead_suit() {
            Some(lead) if !hand.suit(lead).is_empty() => hand.suit(lead),
            _ => hand,
        };
        pool.iter().collect()
    }

    /// Play a card for the seat to act and return the updated history key
    pub fn play(&mut self, card: Card) -> u64 {
        let seat = self.to_act();
        self.hands[seat as usize].remove(card);

        if !self.history.is_empty() {
            self.history.push(' ');
        }
        self.history.push(card.suit.to_char());
        self.history.push(card.rank.to_char());

        // 8 bits per play: card index in the low 6, seat in the high 2
        self.key = (self.key << 8) | (card.index() as u64 | ((seat as u64) << 6));

        self.trick.push(card);
        if self.trick.is_complete() {
            if let Some(winner) = self.trick.winner(self.trump()) {
                self.taken[winner.side() as usize] += 1;
                self.trick = Trick::new(winner);
            }
        }
        self.key
    }

    /// Whether every card has been played
    pub fn is_over(&self) -> bool {
        self.trick.is_empty() && self.hands.iter().all(|h| h.is_empty())
    }

    /// Total tricks the side currently on lead wins: the tricks already
    /// taken plus, for an unfinished world, the oracle's optimal remainder.
    pub fn tricks(&self, oracle: &dyn Oracle) -> Result<u8, OracleError> {
        let side: Side = self.to_act().side();
        if self.is_over() {
            return Ok(self.taken[side as usize]);
        }
        let mut handle = oracle.open(&self.pbn, self.strain, self.pbn_leader)?;
        if !self.history.is_empty() {
            handle.exec(&self.history)?;
        }
        let remainder = handle.tricks_to_take()?;
        Ok(self.taken[side as usize] + remainder)
    }
}
