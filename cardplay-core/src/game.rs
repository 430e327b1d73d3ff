//! Authoritative game state for the card-play phase.
//!
//! The state tracks, per seat, which cards are known to be held, which have
//! been played, and how many remain unknown; cards whose owner is unknown sit
//! in a shared hidden pool. Suit voids deduced from failures to follow suit
//! are recorded and, where only one seat can still hold a suit, hidden cards
//! are promoted to that seat's known hand.

use log::warn;

use crate::cards::suit_mask;
use crate::{Card, CardSet, Contract, HandConstraint, Seat, Suit, Trick};

/// A deal as supplied to the engine: known hands by seat, `None` = unknown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deal {
    pub hands: [Option<CardSet>; 4],
}

impl Deal {
    /// A deal with every hand unknown
    pub fn unknown() -> Self {
        Deal { hands: [None; 4] }
    }

    /// The hand dealt to a seat, if known
    pub fn hand(&self, seat: Seat) -> Option<CardSet> {
        self.hands[seat as usize]
    }

    /// Union of all known cards; `Err` if two hands share a card
    pub fn known_union(&self) -> Result<CardSet, String> {
        let mut union = CardSet::new();
        for hand in self.hands.iter().flatten() {
            if union.intersects(*hand) {
                return Err("deal assigns a card to two seats".to_string());
            }
            union |= *hand;
        }
        Ok(union)
    }
}

/// Everything Play mutates, captured for undo/redo
#[derive(Debug, Clone, PartialEq, Eq)]
struct Snapshot {
    hands: [CardSet; 4],
    plays: [CardSet; 4],
    hidden: CardSet,
    unknown: [u8; 4],
    voids: u16,
    leader: Seat,
    trick: Trick,
    taken: [u8; 2],
}

/// The authoritative position: known hands, play history, hidden pool,
/// void knowledge, the trick in progress and the trick score
#[derive(Debug, Clone)]
pub struct Game {
    hands: [CardSet; 4],
    plays: [CardSet; 4],
    hidden: CardSet,
    unknown: [u8; 4],
    /// Bit (seat * 4 + suit) set iff the seat is known void in the suit
    voids: u16,
    leader: Seat,
    trick: Trick,
    taken: [u8; 2],
    declarer: Seat,
    contract: Contract,
    constraints: [HandConstraint; 4],
    undo_stack: Vec<Snapshot>,
    redo_stack: Vec<Snapshot>,
}

impl Game {
    /// Create a game at the opening lead. Known hands must hold exactly 13
    /// cards; unknown hands draw from the hidden pool. The opening leader is
    /// the declarer's left-hand opponent.
    pub fn new(deal: &Deal, declarer: Seat, contract: Contract) -> Result<Game, String> {
        let known = deal.known_union()?;
        let mut hands = [CardSet::new(); 4];
        let mut unknown = [0u8; 4];
        for seat in Seat::ALL {
            match deal.hand(seat) {
                Some(hand) => {
                    if hand.len() != 13 {
                        return Err(format!(
                            "seat {} holds {} cards, expected 13",
                            seat,
                            hand.len()
                        ));
                    }
                    hands[seat as usize] = hand;
                }
                None => unknown[seat as usize] = 13,
            }
        }

        let leader = declarer.next();
        Ok(Game {
            hands,
            plays: [CardSet::new(); 4],
            hidden: !known,
            unknown,
            voids: 0,
            leader,
            trick: Trick::new(leader),
            taken: [0, 0],
            declarer,
            contract,
            constraints: [HandConstraint::any(); 4],
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
        })
    }

    /// Create a game part-way through the play, at a trick boundary.
    ///
    /// `taken` fixes how many tricks each side has already won, which also
    /// fixes how many cards each seat still holds. `hidden` lists the live
    /// cards whose owner is unknown; every other absent card is treated as
    /// already played. The fabricated play history is evenly split between
    /// the seats, which is the only split consistent with the trick count.
    pub fn from_endgame(
        deal: &Deal,
        hidden: CardSet,
        declarer: Seat,
        contract: Contract,
        leader: Seat,
        taken: [u8; 2],
    ) -> Result<Game, String> {
        let total_taken = taken[0] + taken[1];
        if total_taken > 13 {
            return Err(format!("{} tricks already taken", total_taken));
        }
        let holding = 13 - total_taken;

        let known = deal.known_union()?;
        if known.intersects(hidden) {
            return Err("hidden pool overlaps a known hand".to_string());
        }

        let mut hands = [CardSet::new(); 4];
        let mut unknown = [0u8; 4];
        for seat in Seat::ALL {
            let hand = deal.hand(seat).unwrap_or_default();
            let len = hand.len() as u8;
            if len > holding {
                return Err(format!(
                    "seat {} holds {} cards, expected at most {}",
                    seat, len, holding
                ));
            }
            hands[seat as usize] = hand;
            unknown[seat as usize] = holding - len;
        }

        let expected_hidden: u8 = unknown.iter().sum();
        if hidden.len() != expected_hidden as u32 {
            return Err(format!(
                "hidden pool holds {} cards, expected {}",
                hidden.len(),
                expected_hidden
            ));
        }

        // Everything neither held nor hidden has been played; deal those
        // cards out as the play history, 13 - holding per seat.
        let mut plays = [CardSet::new(); 4];
        let mut dead = (!known & !hidden).iter();
        for seat in Seat::ALL {
            for _ in 0..(13 - holding) {
                match dead.next() {
                    Some(card) => plays[seat as usize].insert(card),
                    None => return Err("not enough played cards to account for".to_string()),
                }
            }
        }

        Ok(Game {
            hands,
            plays,
            hidden,
            unknown,
            voids: 0,
            leader,
            trick: Trick::new(leader),
            taken,
            declarer,
            contract,
            constraints: [HandConstraint::any(); 4],
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
        })
    }

    /// Known cards still held by a seat
    pub fn hand(&self, seat: Seat) -> CardSet {
        self.hands[seat as usize]
    }

    /// Cards played by a seat
    pub fn plays(&self, seat: Seat) -> CardSet {
        self.plays[seat as usize]
    }

    /// Cards whose owner is unknown
    pub fn hidden(&self) -> CardSet {
        self.hidden
    }

    /// Cards a seat holds beyond its known hand
    pub fn unknown(&self, seat: Seat) -> u8 {
        self.unknown[seat as usize]
    }

    /// The seat due to play next
    pub fn leader(&self) -> Seat {
        self.leader
    }

    /// The trick in progress
    pub fn trick(&self) -> &Trick {
        &self.trick
    }

    /// Tricks won so far, indexed by side (NS = 0, EW = 1)
    pub fn taken(&self) -> [u8; 2] {
        self.taken
    }

    pub fn declarer(&self) -> Seat {
        self.declarer
    }

    pub fn contract(&self) -> Contract {
        self.contract
    }

    /// The trump suit, if the contract is not notrump
    pub fn trump(&self) -> Option<Suit> {
        self.contract.trump()
    }

    /// Whether a seat is known to be void in a suit
    #[inline]
    pub fn is_void(&self, seat: Seat, suit: Suit) -> bool {
        self.voids & (1 << (seat as u16 * 4 + suit as u16)) != 0
    }

    /// Packed void flags, bit (seat * 4 + suit)
    pub fn voids(&self) -> u16 {
        self.voids
    }

    pub fn constraint(&self, seat: Seat) -> &HandConstraint {
        &self.constraints[seat as usize]
    }

    pub fn constraint_mut(&mut self, seat: Seat) -> &mut HandConstraint {
        &mut self.constraints[seat as usize]
    }

    /// Union of all played cards
    pub fn all_plays(&self) -> CardSet {
        self.plays.iter().fold(CardSet::new(), |acc, p| acc | *p)
    }

    /// Whether the acting seat may legally play `card`
    pub fn is_legal(&self, card: Card) -> bool {
        let seat = self.leader;

        // Must come from the known hand, or from the hidden pool if the
        // seat still has unknown cards
        let holdable = self.hands[seat as usize].contains(card)
            || (self.hidden.contains(card) && self.unknown[seat as usize] > 0);
        if !holdable {
            return false;
        }
        if self.is_void(seat, card.suit) {
            return false;
        }
        if self.all_plays().contains(card) {
            return false;
        }
        // Follow suit while the seat is known to hold the led suit
        if let Some(lead) = self.trick.lead_suit() {
            if !self.hands[seat as usize].suit(lead).is_empty() && card.suit != lead {
                return false;
            }
        }
        true
    }

    /// All cards the acting seat may legally play
    pub fn legal_moves(&self) -> Vec<Card> {
        let seat = self.leader;
        let avail = !self.all_plays();

        let mut pool = avail & self.hands[seat as usize];
        if self.unknown[seat as usize] > 0 {
            pool |= avail & self.hidden;
        }

        // Known voids exclude whole suits from the hidden candidates
        for suit in Suit::ALL {
            if self.is_void(seat, suit) {
                pool &= !CardSet::from_bits(suit_mask(suit));
            }
        }

        if let Some(lead) = self.trick.lead_suit() {
            if !self.hands[seat as usize].suit(lead).is_empty() {
                pool &= CardSet::from_bits(suit_mask(lead));
            }
        }
        pool.iter().collect()
    }

    /// Play a card for the acting seat. Returns false, with no state change,
    /// if the card is illegal.
    pub fn play(&mut self, card: Card) -> bool {
        if !self.is_legal(card) {
            warn!("illegal play {} by {}", card, self.leader);
            return false;
        }
        self.play_unchecked(card);
        true
    }

    /// Play a card without a legality check
    pub fn play_unchecked(&mut self, card: Card) {
        self.undo_stack.push(self.snapshot());
        self.redo_stack.clear();

        let seat = self.leader;

        // Showing out on a led suit reveals a void
        if let Some(lead) = self.trick.lead_suit() {
            if card.suit != lead {
                self.apply_void(lead);
            }
        }

        if self.hidden.contains(card) {
            self.hidden.remove(card);
            self.unknown[seat as usize] -= 1;
        }
        self.hands[seat as usize].remove(card);
        self.plays[seat as usize].insert(card);
        self.trick.push(card);

        if self.trick.is_complete() {
            self.finish_trick();
        } else {
            self.leader = self.leader.next();
        }
    }

    /// Record that the acting seat is void in `suit`, and promote hidden
    /// cards of that suit when only one other seat can still hold them.
    fn apply_void(&mut self, suit: Suit) {
        let seat = self.leader;
        self.voids |= 1 << (seat as u16 * 4 + suit as u16);

        let mut candidates = Seat::ALL
            .iter()
            .filter(|&&s| s != seat && self.unknown[s as usize] > 0);
        if let (Some(&target), None) = (candidates.next(), candidates.next()) {
            let moved = self.hidden & CardSet::from_bits(suit_mask(suit));
            if !moved.is_empty() {
                let count = (moved.len() as u8).min(self.unknown[target as usize]);
                self.hands[target as usize] |= moved;
                self.unknown[target as usize] -= count;
                self.hidden &= !CardSet::from_bits(suit_mask(suit));
            }
        }
    }

    /// Score a complete trick and start the next one from its winner
    fn finish_trick(&mut self) {
        if let Some(winner) = self.trick.winner(self.trump()) {
            self.taken[winner.side() as usize] += 1;
            self.leader = winner;
            self.trick = Trick::new(winner);
        }
    }

    /// Revert the most recent play. Returns false if there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        match self.undo_stack.pop() {
            Some(snapshot) => {
                self.redo_stack.push(self.snapshot());
                self.restore(snapshot);
                true
            }
            None => {
                warn!("undo with no plays recorded");
                false
            }
        }
    }

    /// Re-apply the most recently undone play. Returns false if there is
    /// nothing to redo.
    pub fn redo(&mut self) -> bool {
        match self.redo_stack.pop() {
            Some(snapshot) => {
                self.undo_stack.push(self.snapshot());
                self.restore(snapshot);
                true
            }
            None => {
                warn!("redo with no undone plays");
                false
            }
        }
    }

    /// Whether all 13 tricks have been scored
    pub fn is_over(&self) -> bool {
        self.taken[0] + self.taken[1] >= 13
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            hands: self.hands,
            plays: self.plays,
            hidden: self.hidden,
            unknown: self.unknown,
            voids: self.voids,
            leader: self.leader,
            trick: self.trick,
            taken: self.taken,
        }
    }

    fn restore(&mut self, snapshot: Snapshot) {
        self.hands = snapshot.hands;
        self.plays = snapshot.plays;
        self.hidden = snapshot.hidden;
        self.unknown = snapshot.unknown;
        self.voids = snapshot.voids;
        self.leader = snapshot.leader;
        self.trick = snapshot.trick;
        self.taken = snapshot.taken;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(s: &str) -> Card {
        s.parse().unwrap()
    }

    fn whole_suit(suit: Suit) -> CardSet {
        CardSet::from_bits(suit_mask(suit))
    }

    /// N holds all spades, E all hearts, S all diamonds, W all clubs
    fn one_suit_deal() -> Deal {
        Deal {
            hands: [
                Some(whole_suit(Suit::Spades)),
                Some(whole_suit(Suit::Hearts)),
                Some(whole_suit(Suit::Diamonds)),
                Some(whole_suit(Suit::Clubs)),
            ],
        }
    }

    fn contract(s: &str) -> Contract {
        s.parse().unwrap()
    }

    fn state_of(game: &Game) -> Snapshot {
        game.snapshot()
    }

    #[test]
    fn test_opening_leader_is_declarers_lho() {
        let game = Game::new(&one_suit_deal(), Seat::North, contract("3NT")).unwrap();
        assert_eq!(game.leader(), Seat::East);
        assert!(game.hidden().is_empty());
    }

    #[test]
    fn test_new_rejects_short_hand() {
        let mut deal = one_suit_deal();
        let mut hand = whole_suit(Suit::Spades);
        hand.remove(card("2S"));
        deal.hands[0] = Some(hand);
        assert!(Game::new(&deal, Seat::North, contract("3NT")).is_err());
    }

    #[test]
    fn test_new_rejects_duplicated_card() {
        let mut deal = one_suit_deal();
        deal.hands[1] = Some(whole_suit(Suit::Spades));
        assert!(Game::new(&deal, Seat::North, contract("3NT")).is_err());
    }

    #[test]
    fn test_follow_suit_enforced() {
        let mut game = Game::new(&one_suit_deal(), Seat::West, contract("3NT")).unwrap();
        assert_eq!(game.leader(), Seat::North);
        assert!(game.play(card("AS")));

        // East holds only hearts, so any heart is legal as a discard
        assert!(game.is_legal(card("2H")));
        // East cannot play a card they do not hold
        assert!(!game.is_legal(card("2S")));
        assert!(!game.is_legal(card("2D")));
    }

    #[test]
    fn test_trick_scoring_and_next_leader() {
        let mut game = Game::new(&one_suit_deal(), Seat::West, contract("3NT")).unwrap();
        for c in ["AS", "2H", "2D", "2C"] {
            assert!(game.play(card(c)));
        }
        // North's spade ace wins in notrump; North leads again
        assert_eq!(game.taken(), [1, 0]);
        assert_eq!(game.leader(), Seat::North);
        assert!(game.trick().is_empty());
    }

    #[test]
    fn test_trump_takes_the_trick() {
        let mut game = Game::new(&one_suit_deal(), Seat::West, contract("4H")).unwrap();
        for c in ["AS", "2H", "2D", "2C"] {
            assert!(game.play(card(c)));
        }
        // East's small trump beats the spade ace
        assert_eq!(game.taken(), [0, 1]);
        assert_eq!(game.leader(), Seat::East);
    }

    #[test]
    fn test_show_out_marks_void_and_promotes_hidden() {
        // North and South fully known; East and West unknown
        let mut north = whole_suit(Suit::Spades);
        north.remove(card("AS"));
        north.insert(card("2C"));
        let deal = Deal {
            hands: [
                Some(north),
                None,
                Some(whole_suit(Suit::Diamonds)),
                None,
            ],
        };
        // West declares, so North leads
        let mut game = Game::new(&deal, Seat::West, contract("3NT")).unwrap();
        assert_eq!(game.unknown(Seat::East), 13);
        assert_eq!(game.unknown(Seat::West), 13);
        assert!(game.hidden().contains(card("AS")));

        assert!(game.play(card("KS")));
        // East discards a heart from the hidden pool
        assert!(game.play(card("2H")));

        // East is now known void in spades
        assert!(game.is_void(Seat::East, Suit::Spades));
        assert!(!game.is_legal(card("AS")));

        // West is the only other seat with unknowns, so the hidden spade
        // ace must be West's
        assert!(game.hand(Seat::West).contains(card("AS")));
        assert_eq!(game.unknown(Seat::West), 12);
        assert!(!game.hidden().contains(card("AS")));
    }

    #[test]
    fn test_show_out_without_unique_target_leaves_hidden() {
        // Only North known; three seats share the hidden pool
        let deal = Deal {
            hands: [Some(whole_suit(Suit::Spades)), None, None, None],
        };
        let mut game = Game::new(&deal, Seat::West, contract("3NT")).unwrap();
        assert!(game.play(card("AS")));
        assert!(game.play(card("2H")));

        assert!(game.is_void(Seat::East, Suit::Spades));
        // South and West both have unknowns, so nothing can be promoted
        assert!(game.hand(Seat::South).is_empty());
        assert!(game.hand(Seat::West).is_empty());
        assert_eq!(game.unknown(Seat::South), 13);
    }

    #[test]
    fn test_hidden_play_decrements_unknown() {
        let deal = Deal {
            hands: [Some(whole_suit(Suit::Spades)), None, None, None],
        };
        let mut game = Game::new(&deal, Seat::West, contract("3NT")).unwrap();
        assert!(game.play(card("AS")));
        assert!(game.play(card("KS")));
        assert_eq!(game.unknown(Seat::East), 12);
        assert!(!game.hidden().contains(card("KS")));
        assert!(game.plays(Seat::East).contains(card("KS")));
    }

    #[test]
    fn test_legal_moves_follow_lead() {
        let mut game = Game::new(&one_suit_deal(), Seat::North, contract("3NT")).unwrap();
        assert!(game.play(card("AH")));
        // South must follow... but holds no hearts, so all diamonds are on
        let moves = game.legal_moves();
        assert_eq!(moves.len(), 13);
        assert!(moves.iter().all(|c| c.suit == Suit::Diamonds));
    }

    #[test]
    fn test_legal_moves_exclude_void_suits() {
        // North holds 12 spades and a club; the spade ace is hidden
        let mut north = whole_suit(Suit::Spades);
        north.remove(card("AS"));
        north.insert(card("2C"));
        let deal = Deal {
            hands: [Some(north), None, None, None],
        };
        let mut game = Game::new(&deal, Seat::West, contract("3NT")).unwrap();
        assert!(game.play(card("KS")));
        assert!(game.play(card("2H"))); // East shows out
        assert!(game.play(card("2D")));
        assert!(game.play(card("3C")));
        // North's king won; North leads another spade
        assert!(game.play(card("QS")));

        // The spade ace is still hidden, but East is known void
        assert!(game.hidden().contains(card("AS")));
        let moves = game.legal_moves();
        assert!(!moves.is_empty());
        assert!(moves.iter().all(|c| c.suit != Suit::Spades));
        // Moves must agree with is_legal
        for m in &moves {
            assert!(game.is_legal(*m));
        }
        assert!(!game.is_legal(card("AS")));
    }

    #[test]
    fn test_undo_restores_state_and_redo_reapplies() {
        let mut game = Game::new(&one_suit_deal(), Seat::West, contract("3NT")).unwrap();
        let before = state_of(&game);

        assert!(game.play(card("AS")));
        let after = state_of(&game);
        assert_ne!(before, after);

        assert!(game.undo());
        assert_eq!(state_of(&game), before);

        assert!(game.redo());
        assert_eq!(state_of(&game), after);
    }

    #[test]
    fn test_undo_redo_on_empty_stacks() {
        let mut game = Game::new(&one_suit_deal(), Seat::West, contract("3NT")).unwrap();
        assert!(!game.undo());
        assert!(!game.redo());
        assert!(game.play(card("AS")));
        assert!(game.undo());
        // Play clears the redo stack
        assert!(game.redo());
        assert!(game.play(card("2H")));
        assert!(!game.redo());
    }

    #[test]
    fn test_clone_evolves_independently() {
        let mut game = Game::new(&one_suit_deal(), Seat::West, contract("3NT")).unwrap();
        assert!(game.play(card("AS")));
        let mut copy = game.clone();

        assert!(copy.play(card("2H")));
        assert_eq!(game.trick().len(), 1);
        assert_eq!(copy.trick().len(), 2);

        // The clone carries the undo history
        assert!(copy.undo());
        assert!(copy.undo());
        assert_eq!(state_of(&copy), {
            let fresh = Game::new(&one_suit_deal(), Seat::West, contract("3NT")).unwrap();
            state_of(&fresh)
        });
    }

    #[test]
    fn test_counting_invariants_hold_during_play() {
        let deal = Deal {
            hands: [Some(whole_suit(Suit::Spades)), None, None, None],
        };
        let mut game = Game::new(&deal, Seat::West, contract("3NT")).unwrap();

        for c in ["AS", "2H", "2D", "2C", "KS", "3H", "3D", "3C"] {
            assert!(game.play(card(c)));
            // Disjointness
            for i in Seat::ALL {
                for j in Seat::ALL {
                    if i != j {
                        assert!(!game.hand(i).intersects(game.hand(j)));
                    }
                    assert!(!game.hand(i).intersects(game.plays(j)));
                }
                assert!(!game.hidden().intersects(game.hand(i) | game.plays(i)));
            }
            // Card counting at trick boundaries
            if game.trick().is_empty() {
                for seat in Seat::ALL {
                    let total = game.hand(seat).len() as u8
                        + game.unknown(seat)
                        + game.plays(seat).len() as u8;
                    assert_eq!(total, 13);
                }
            }
            // Trick accounting
            let played: u32 = Seat::ALL.iter().map(|&s| game.plays(s).len()).sum();
            let scored = 4 * (game.taken()[0] + game.taken()[1]) as u32;
            assert_eq!(played, scored + game.trick().len() as u32);
        }
    }

    #[test]
    fn test_endgame_construction() {
        // Three cards each, nine tricks gone, last-trick leader East
        let deal = Deal {
            hands: [
                Some(["AS", "KS", "QS"].iter().map(|s| card(s)).collect()),
                Some(["AH", "KH", "QH"].iter().map(|s| card(s)).collect()),
                Some(["AD", "KD", "QD"].iter().map(|s| card(s)).collect()),
                Some(["AC", "KC", "QC"].iter().map(|s| card(s)).collect()),
            ],
        };
        let game = Game::from_endgame(
            &deal,
            CardSet::new(),
            Seat::North,
            contract("1NT"),
            Seat::East,
            [6, 4],
        )
        .unwrap();

        assert_eq!(game.leader(), Seat::East);
        assert_eq!(game.taken(), [6, 4]);
        for seat in Seat::ALL {
            assert_eq!(game.hand(seat).len(), 3);
            assert_eq!(game.plays(seat).len(), 10);
            assert_eq!(game.unknown(seat), 0);
        }
        assert!(game.hidden().is_empty());
    }

    #[test]
    fn test_endgame_with_hidden_pool() {
        let north: CardSet = ["AS", "KS"].iter().map(|s| card(s)).collect();
        let south: CardSet = ["AD", "KD"].iter().map(|s| card(s)).collect();
        let hidden: CardSet = ["AH", "KH", "AC", "KC"].iter().map(|s| card(s)).collect();
        let deal = Deal {
            hands: [Some(north), None, Some(south), None],
        };
        let game =
            Game::from_endgame(&deal, hidden, Seat::North, contract("1NT"), Seat::East, [7, 4])
                .unwrap();

        assert_eq!(game.unknown(Seat::East), 2);
        assert_eq!(game.unknown(Seat::West), 2);
        assert_eq!(game.hidden(), hidden);
        assert!(game.is_legal(card("AH")));
    }

    #[test]
    fn test_endgame_rejects_miscounted_hidden() {
        let deal = Deal {
            hands: [
                Some(["AS"].iter().map(|s| card(s)).collect()),
                None,
                None,
                None,
            ],
        };
        // One card each, 12 tricks gone: the hidden pool must hold 3 cards
        let result = Game::from_endgame(
            &deal,
            CardSet::new(),
            Seat::North,
            contract("1NT"),
            Seat::East,
            [8, 4],
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_is_over_after_final_trick() {
        let deal = Deal {
            hands: [
                Some(["AS"].iter().map(|s| card(s)).collect()),
                Some(["AH"].iter().map(|s| card(s)).collect()),
                Some(["AD"].iter().map(|s| card(s)).collect()),
                Some(["AC"].iter().map(|s| card(s)).collect()),
            ],
        };
        let mut game = Game::from_endgame(
            &deal,
            CardSet::new(),
            Seat::North,
            contract("1NT"),
            Seat::East,
            [6, 6],
        )
        .unwrap();

        assert!(!game.is_over());
        for c in ["AH", "AD", "AC", "AS"] {
            assert!(game.play(card(c)));
        }
        assert!(game.is_over());
        assert_eq!(game.taken(), [7, 6]);
    }

    #[test]
    fn test_illegal_play_leaves_state_untouched() {
        let mut game = Game::new(&one_suit_deal(), Seat::West, contract("3NT")).unwrap();
        let before = state_of(&game);
        assert!(!game.play(card("AH"))); // North doesn't hold hearts
        assert_eq!(state_of(&game), before);
    }
}
