use crate::card::{Card, Rank, Suit};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DeckError {
    #[error("cannot draw from an empty deck")]
    Empty,
}

/// A source of cards. `draw` removes the top card, `reset` restores the deck to its full length.
pub trait Deck {
    fn len(&self) -> usize;
    fn draw(&mut self) -> Result<Card, DeckError>;
    fn reset(&mut self);

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A shoe of `num_decks` standard 52 card decks, shuffled on creation and on every reset.
pub struct Shoe {
    num_decks: usize,
    cards: Vec<Card>,
    rng: StdRng,
}

impl Shoe {
    /// Builds a new shuffled shoe. Passing a `seed` makes the card order reproducible.
    pub fn new(num_decks: usize, seed: Option<u64>) -> Shoe {
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };
        let mut shoe = Shoe {
            num_decks,
            cards: Vec::with_capacity(num_decks * 52),
            rng,
        };
        shoe.reset();
        shoe
    }

    pub fn num_decks(&self) -> usize {
        self.num_decks
    }
}

impl Deck for Shoe {
    fn len(&self) -> usize {
        self.cards.len()
    }

    fn draw(&mut self) -> Result<Card, DeckError> {
        self.cards.pop().ok_or(DeckError::Empty)
    }

    fn reset(&mut self) {
        self.cards.clear();
        for _ in 0..self.num_decks {
            for suit in Suit::ALL {
                for rank in Rank::ALL {
                    self.cards.push(Card::new(rank, suit));
                }
            }
        }
        self.cards.shuffle(&mut self.rng);
    }
}

/// A deck that deals a fixed sequence of cards in the given order. Resetting it replays the sequence
/// from the start.
#[derive(Debug, Clone)]
pub struct StackedDeck {
    order: Vec<Card>,
    remaining: Vec<Card>,
}

impl StackedDeck {
    pub fn new(order: Vec<Card>) -> StackedDeck {
        let remaining = order.iter().rev().copied().collect();
        StackedDeck { order, remaining }
    }

    /// Convenience constructor, every card is a spade of the given rank.
    pub fn from_ranks<I: IntoIterator<Item = Rank>>(ranks: I) -> StackedDeck {
        StackedDeck::new(
            ranks
                .into_iter()
                .map(|rank| Card::new(rank, Suit::Spade))
                .collect(),
        )
    }
}

impl Deck for StackedDeck {
    fn len(&self) -> usize {
        self.remaining.len()
    }

    fn draw(&mut self) -> Result<Card, DeckError> {
        self.remaining.pop().ok_or(DeckError::Empty)
    }

    fn reset(&mut self) {
        self.remaining = self.order.iter().rev().copied().collect();
    }
}
