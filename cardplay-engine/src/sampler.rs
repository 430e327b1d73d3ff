//! Determinization sampler.
//!
//! Built from a snapshot of the game with the current trick unplayed, so
//! every sampled world starts at a trick boundary. Generation shuffles the
//! hidden cards and deals them out around known voids; filtering applies the
//! per-seat shape and HCP constraints to the reconstructed full hands;
//! synchronization strips the cards already played and replays the trick in
//! progress so the world lines up with the game again.

use rand::seq::SliceRandom;
use rand::Rng;

use cardplay_core::{Card, CardSet, Game, HandConstraint, Seat, Strain, Suit, Trick};
use cardplay_pbn::format_hands;

use crate::world::World;

pub struct Sampler {
    /// Original 13-card content known per seat: held plus already played,
    /// with the current trick restored to the holders' hands
    known: [CardSet; 4],
    /// Cards each seat still needs drawn from the hidden pool
    needed: [u8; 4],
    /// Completed-trick plays per seat (current trick unplayed)
    plays: [CardSet; 4],
    /// The hidden pool as a card list
    leftovers: Vec<Card>,
    /// Packed void flags copied from the game
    voids: u16,
    constraints: [HandConstraint; 4],
    strain: Strain,
    /// The trick in progress, replayed into each world
    trick: Trick,
    taken: [u8; 2],
}

impl Sampler {
    /// Snapshot a game for sampling
    pub fn new(game: &Game) -> Self {
        let mut hands = [CardSet::new(); 4];
        let mut plays = [CardSet::new(); 4];
        for seat in Seat::ALL {
            hands[seat as usize] = game.hand(seat);
            plays[seat as usize] = game.plays(seat);
        }

        // Unplay the current trick so worlds start at a trick boundary
        let trick = *game.trick();
        for (i, card) in trick.cards().enumerate() {
            let seat = trick.seat_of(i as u8);
            hands[seat as usize].insert(card);
            plays[seat as usize].remove(card);
        }

        let mut known = [CardSet::new(); 4];
        let mut needed = [0u8; 4];
        for seat in Seat::ALL {
            let union = hands[seat as usize] | plays[seat as usize];
            known[seat as usize] = union;
            needed[seat as usize] = 13u8.saturating_sub(union.len() as u8);
        }

        Sampler {
            known,
            needed,
            plays,
            leftovers: game.hidden().iter().collect(),
            voids: game.voids(),
            constraints: [
                *game.constraint(Seat::North),
                *game.constraint(Seat::East),
                *game.constraint(Seat::South),
                *game.constraint(Seat::West),
            ],
            strain: game.contract().strain,
            trick,
            taken: game.taken(),
        }
    }

    #[inline]
    fn is_void(&self, seat: Seat, suit: Suit) -> bool {
        self.voids & (1 << (seat as u16 * 4 + suit as u16)) != 0
    }

    /// Deal a random world consistent with the known cards and voids.
    ///
    /// Hidden cards are drawn in shuffled order; a card of a suit the seat
    /// is known void in is passed over for the next seat. A seat can run
    /// out of acceptable cards, leaving it short — such degraded samples
    /// are dealt anyway and rejected by `filter`.
    pub fn generate<R: Rng>(&self, rng: &mut R) -> World {
        let mut pool = self.leftovers.clone();
        pool.shuffle(rng);

        let mut hands = self.known;
        for seat in Seat::ALL {
            let mut remaining = self.needed[seat as usize];
            if remaining == 0 {
                continue;
            }
            let mut passed = Vec::with_capacity(pool.len());
            for card in pool.drain(..) {
                if remaining > 0 && !self.is_void(seat, card.suit) {
                    hands[seat as usize].insert(card);
                    remaining -= 1;
                } else {
                    passed.push(card);
                }
            }
            pool = passed;
        }

        World::new(hands, self.strain, self.trick.leader(), self.taken)
    }

    /// Accept or reject a sampled world. Every seat must have received its
    /// full 13 cards, and every edited constraint must be satisfied by the
    /// seat's reconstructed original hand.
    pub fn filter(&self, world: &World) -> bool {
        for seat in Seat::ALL {
            let hand = world.hand(seat);
            if hand.len() != 13 {
                return false;
            }
            let constraint = &self.constraints[seat as usize];
            if constraint.is_edited() && !constraint.matches(hand) {
                return false;
            }
        }
        true
    }

    /// Bring a sampled world up to date with the game: remove the cards
    /// already played, fix the oracle position, and replay the trick in
    /// progress.
    pub fn synchronize(&self, world: &mut World) {
        world.remove_played(&self.plays);

        let hands = [
            world.hand(Seat::North),
            world.hand(Seat::East),
            world.hand(Seat::South),
            world.hand(Seat::West),
        ];
        world.set_position(format_hands(&hands, self.trick.leader()));

        for card in self.trick.cards() {
            world.play(card);
        }
    }
}
