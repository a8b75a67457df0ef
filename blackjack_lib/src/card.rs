use serde::{Deserialize, Serialize};
use std::fmt::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Suit {
    Spade,
    Diamond,
    Club,
    Heart,
}

impl Suit {
    pub const ALL: [Suit; 4] = [Suit::Spade, Suit::Diamond, Suit::Club, Suit::Heart];

    fn symbol(&self) -> char {
        match self {
            Suit::Spade => '♠',
            Suit::Diamond => '♦',
            Suit::Club => '♣',
            Suit::Heart => '♥',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rank {
    Two,
    Three,
    Four,
    Five,
    Six,
    Seven,
    Eight,
    Nine,
    Ten,
    Jack,
    Queen,
    King,
    Ace,
}

impl Rank {
    pub const ALL: [Rank; 13] = [
        Rank::Two,
        Rank::Three,
        Rank::Four,
        Rank::Five,
        Rank::Six,
        Rank::Seven,
        Rank::Eight,
        Rank::Nine,
        Rank::Ten,
        Rank::Jack,
        Rank::Queen,
        Rank::King,
        Rank::Ace,
    ];
}

/// The blackjack value of a card. Every card counts a single fixed amount except the ace,
/// which may be counted low or high.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CardValue {
    Single(u8),
    Alternative { low: u8, high: u8 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Card {
    pub rank: Rank,
    pub suit: Suit,
}

impl Card {
    pub fn new(rank: Rank, suit: Suit) -> Card {
        Card { rank, suit }
    }

    /// Returns the value of the card, an ace yields `CardValue::Alternative { low: 1, high: 11 }`.
    pub fn value(&self) -> CardValue {
        match self.rank {
            Rank::Two => CardValue::Single(2),
            Rank::Three => CardValue::Single(3),
            Rank::Four => CardValue::Single(4),
            Rank::Five => CardValue::Single(5),
            Rank::Six => CardValue::Single(6),
            Rank::Seven => CardValue::Single(7),
            Rank::Eight => CardValue::Single(8),
            Rank::Nine => CardValue::Single(9),
            Rank::Ten | Rank::Jack | Rank::Queen | Rank::King => CardValue::Single(10),
            Rank::Ace => CardValue::Alternative { low: 1, high: 11 },
        }
    }

    /// The representative value of the card, i.e. the high value of an ace.
    pub fn absolute_value(&self) -> u8 {
        match self.value() {
            CardValue::Single(v) => v,
            CardValue::Alternative { high, .. } => high,
        }
    }

    pub fn is_ace(&self) -> bool {
        self.rank == Rank::Ace
    }
}

impl Display for Card {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}{}]", self.absolute_value(), self.suit.symbol())
    }
}
