//! Card and deck primitives shared by the blackjack simulation crates.
//! The engine only ever talks to a deck through the `Deck` trait, so any card source
//! (a shuffled shoe, a replayed sequence) can be plugged into a table.

pub mod card;
pub mod deck;

pub use card::{Card, CardValue, Rank, Suit};
pub use deck::{Deck, DeckError, Shoe, StackedDeck};
