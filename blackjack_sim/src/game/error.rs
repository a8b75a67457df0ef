use crate::game::strategy::{Action, StrategyTable};
use blackjack_lib::DeckError;
use thiserror::Error;

/// Broad classification of a `BlackjackGameError`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A wager that the balances cannot support or the table does not accept.
    Validation,
    /// An operation called while a hand or player is in the wrong state.
    State,
    /// A strategy table is missing an entry.
    StrategyLookup,
    /// The decision engine chose an action that is neither offered nor covered by a fallback.
    Logic,
    /// The card source failed.
    Deck,
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum BlackjackGameError {
    #[error("not enough money to make that bid: balance {balance:.2}, bid {amount:.2}")]
    InsufficientFunds { balance: f64, amount: f64 },
    #[error("balance for player \"{0}\" is not a valid number")]
    InvalidBalance(String),
    #[error("{operation} should only be called when there are two cards, found {found}")]
    CardCount {
        operation: &'static str,
        found: usize,
    },
    #[error("pairs_of should only be called when there is a pair")]
    NotAPair,
    #[error("soft_of should only be called when there is an ace")]
    NotSoft,
    #[error("already on second hand")]
    NoSecondHand,
    #[error("player already holds two hands")]
    AlreadySplit,
    #[error("invalid card when splitting")]
    EmptyHand,
    #[error("player \"{0}\" has no active hand")]
    NoActiveHand(String),
    #[error("hand is already resolved as {0}")]
    HandResolved(&'static str),
    #[error("no {table} strategy found for {total} against a dealer {up_card}")]
    StrategyLookup {
        table: StrategyTable,
        total: u8,
        up_card: u8,
    },
    #[error("action {0} is not available")]
    ActionNotAvailable(Action),
    #[error(transparent)]
    Deck(#[from] DeckError),
}

impl BlackjackGameError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            BlackjackGameError::InsufficientFunds { .. }
            | BlackjackGameError::InvalidBalance(_) => ErrorKind::Validation,
            BlackjackGameError::CardCount { .. }
            | BlackjackGameError::NotAPair
            | BlackjackGameError::NotSoft
            | BlackjackGameError::NoSecondHand
            | BlackjackGameError::AlreadySplit
            | BlackjackGameError::EmptyHand
            | BlackjackGameError::NoActiveHand(_)
            | BlackjackGameError::HandResolved(_) => ErrorKind::State,
            BlackjackGameError::StrategyLookup { .. } => ErrorKind::StrategyLookup,
            BlackjackGameError::ActionNotAvailable(_) => ErrorKind::Logic,
            BlackjackGameError::Deck(_) => ErrorKind::Deck,
        }
    }
}
