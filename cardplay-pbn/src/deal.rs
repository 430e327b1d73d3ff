use cardplay_core::{Card, CardSet, Deal, ParseError, Rank, Seat, Suit};

/// PBN lists suits spades-first within each hand
const PBN_SUITS: [Suit; 4] = [Suit::Spades, Suit::Hearts, Suit::Diamonds, Suit::Clubs];

/// Hand string standing for a completely unknown hand
const UNKNOWN_HAND: &str = "...";

/// Parse a PBN deal string.
///
/// Format: `N:KQ4.QJ982..AKQ43 J653.A73.985.J97 9.K54.KQT732.652 AT872.T6.AJ64.T8`
/// — a first seat, then four hands clockwise from it, each hand four
/// dot-separated suit strings in spades-hearts-diamonds-clubs order. A hand
/// given as `...` is unknown and its cards stay in the hidden pool.
pub fn parse_deal(input: &str) -> Result<(Seat, Deal), ParseError> {
    let content = input.trim();

    let (seat_str, hands_part) = content
        .split_once(':')
        .ok_or_else(|| ParseError::new("expected <seat>:<hands>"))?;

    let first_seat = Seat::from_char(
        seat_str
            .trim()
            .chars()
            .next()
            .filter(|_| seat_str.trim().len() == 1)
            .ok_or_else(|| ParseError::new(format!("invalid first seat: {}", seat_str)))?,
    )
    .ok_or_else(|| ParseError::new(format!("invalid first seat: {}", seat_str)))?;

    let hand_strs: Vec<&str> = hands_part.split_whitespace().collect();
    if hand_strs.len() != 4 {
        return Err(ParseError::new(format!(
            "expected 4 hands, got {}",
            hand_strs.len()
        )));
    }

    let mut deal = Deal::unknown();
    let mut seen = CardSet::new();
    for (i, hand_str) in hand_strs.iter().enumerate() {
        let seat = first_seat.advance(i as u8);
        if let Some(hand) = parse_hand(hand_str)? {
            if seen.intersects(hand) {
                return Err(ParseError::new(format!(
                    "hand {} repeats a card already dealt",
                    hand_str
                )));
            }
            seen |= hand;
            deal.hands[seat as usize] = Some(hand);
        }
    }

    Ok((first_seat, deal))
}

/// Parse one PBN hand; `...` yields None (unknown hand)
fn parse_hand(s: &str) -> Result<Option<CardSet>, ParseError> {
    if s == UNKNOWN_HAND {
        return Ok(None);
    }

    let suit_strs: Vec<&str> = s.split('.').collect();
    if suit_strs.len() != 4 {
        return Err(ParseError::new(format!(
            "expected 4 dot-separated suits in {}",
            s
        )));
    }

    let mut hand = CardSet::new();
    for (suit, ranks) in PBN_SUITS.iter().zip(&suit_strs) {
        for c in ranks.chars() {
            let rank = Rank::from_char(c)
                .ok_or_else(|| ParseError::new(format!("invalid rank character: {}", c)))?;
            let card = Card::new(*suit, rank);
            if hand.contains(card) {
                return Err(ParseError::new(format!("card {} repeated in hand", card)));
            }
            hand.insert(card);
        }
    }
    Ok(Some(hand))
}

/// Format a deal as a PBN deal string, hands clockwise from `first_seat`
pub fn format_deal(deal: &Deal, first_seat: Seat) -> String {
    let mut parts = Vec::with_capacity(4);
    for i in 0..4 {
        let seat = first_seat.advance(i);
        parts.push(match deal.hand(seat) {
            Some(hand) => format_hand(hand),
            None => UNKNOWN_HAND.to_string(),
        });
    }
    format!("{}:{}", first_seat.to_char(), parts.join(" "))
}

/// Format four known hands as a PBN deal string
pub fn format_hands(hands: &[CardSet; 4], first_seat: Seat) -> String {
    let deal = Deal {
        hands: [
            Some(hands[0]),
            Some(hands[1]),
            Some(hands[2]),
            Some(hands[3]),
        ],
    };
    format_deal(&deal, first_seat)
}

/// Format one hand in PBN suit order, ranks descending
fn format_hand(hand: CardSet) -> String {
    let mut suits = Vec::with_capacity(4);
    for suit in PBN_SUITS {
        // Iterate descending by walking ranks from the ace down
        let held: String = Rank::ALL
            .iter()
            .rev()
            .filter(|&&r| hand.contains(Card::new(suit, r)))
            .map(|r| r.to_char())
            .collect();
        suits.push(held);
    }
    suits.join(".")
}
