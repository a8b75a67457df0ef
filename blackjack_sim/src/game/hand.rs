use crate::game::error::BlackjackGameError;
use blackjack_lib::{Card, CardValue};
use std::fmt::Display;

/// Lifecycle of a hand within a round. `Draw`, `Lose` and `Won` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandStatus {
    Waiting,
    Playing,
    Draw,
    Lose,
    Won,
}

impl HandStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, HandStatus::Draw | HandStatus::Lose | HandStatus::Won)
    }

    fn name(&self) -> &'static str {
        match self {
            HandStatus::Waiting => "waiting",
            HandStatus::Playing => "playing",
            HandStatus::Draw => "draw",
            HandStatus::Lose => "lose",
            HandStatus::Won => "won",
        }
    }

    fn check_open(self) -> Result<(), BlackjackGameError> {
        if self.is_terminal() {
            return Err(BlackjackGameError::HandResolved(self.name()));
        }
        Ok(())
    }

    /// Checks a status change, nothing leaves a terminal state.
    fn transition(self, next: HandStatus) -> Result<HandStatus, BlackjackGameError> {
        self.check_open()?;
        Ok(next)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reason {
    Blackjack,
    Bust,
    DealerWon,
    DealerBust,
    DealerLost,
}

/// The pair of alternative totals of a hand, `low` counts every ace as one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Score {
    pub low: u8,
    pub high: u8,
}

#[derive(Debug, Clone)]
pub struct Hand {
    cards: Vec<Card>,
    status: HandStatus,
    reason: Option<Reason>,
}

impl Hand {
    pub fn new() -> Hand {
        Hand {
            cards: Vec::new(),
            status: HandStatus::Waiting,
            reason: None,
        }
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn num_of_cards(&self) -> usize {
        self.cards.len()
    }

    pub fn status(&self) -> HandStatus {
        self.status
    }

    pub fn reason(&self) -> Option<Reason> {
        self.reason
    }

    /// Computes the score card by card in the order the cards were received. An ace adds 1 to `low`
    /// and 11 to `high`, unless 11 would push `high` past 21, in which case it adds 1 to both.
    pub fn score(&self) -> Score {
        self.cards
            .iter()
            .fold(Score::default(), |mut acc, card| match card.value() {
                CardValue::Alternative { low, high } => {
                    if acc.high + high > 21 {
                        acc.low += 1;
                        acc.high += 1;
                    } else {
                        acc.low += low;
                        acc.high += high;
                    }
                    acc
                }
                CardValue::Single(v) => {
                    acc.low += v;
                    acc.high += v;
                    acc
                }
            })
    }

    pub fn is_blackjack(&self) -> bool {
        if self.cards.len() != 2 {
            return false;
        }
        let got_ten = self
            .cards
            .iter()
            .any(|c| c.value() == CardValue::Single(10));
        let got_ace = self.cards.iter().any(|c| c.is_ace());
        got_ten && got_ace
    }

    pub fn has_pairs(&self) -> bool {
        if self.cards.len() != 2 {
            return false;
        }
        let (first, second) = (&self.cards[0], &self.cards[1]);
        first.value() == second.value() || (first.is_ace() && second.is_ace())
    }

    /// Returns the value of the paired card.
    pub fn pairs_of(&self) -> Result<u8, BlackjackGameError> {
        if self.cards.len() != 2 {
            return Err(BlackjackGameError::CardCount {
                operation: "pairs_of",
                found: self.cards.len(),
            });
        }
        if !self.has_pairs() {
            return Err(BlackjackGameError::NotAPair);
        }
        Ok(self.cards[0].absolute_value())
    }

    pub fn is_soft(&self) -> bool {
        self.cards.len() == 2 && self.cards.iter().any(|c| c.is_ace())
    }

    /// Returns the value of the card accompanying the ace.
    pub fn soft_of(&self) -> Result<u8, BlackjackGameError> {
        if self.cards.len() != 2 {
            return Err(BlackjackGameError::CardCount {
                operation: "soft_of",
                found: self.cards.len(),
            });
        }
        if !self.is_soft() {
            return Err(BlackjackGameError::NotSoft);
        }
        let (first, second) = (&self.cards[0], &self.cards[1]);
        Ok(if first.is_ace() {
            second.absolute_value()
        } else {
            first.absolute_value()
        })
    }

    pub fn add_card(&mut self, card: Card) -> Result<(), BlackjackGameError> {
        self.status.check_open()?;
        self.cards.push(card);
        Ok(())
    }

    /// Removes the last card received, used when splitting.
    pub(crate) fn pop_card(&mut self) -> Result<Option<Card>, BlackjackGameError> {
        self.status.check_open()?;
        Ok(self.cards.pop())
    }

    pub fn play(&mut self) -> Result<(), BlackjackGameError> {
        self.set_state(HandStatus::Playing, None)
    }

    pub fn stand(&mut self) -> Result<(), BlackjackGameError> {
        self.set_state(HandStatus::Waiting, None)
    }

    pub fn lose(&mut self, reason: Reason) -> Result<(), BlackjackGameError> {
        self.set_state(HandStatus::Lose, Some(reason))
    }

    pub fn push(&mut self, reason: Option<Reason>) -> Result<(), BlackjackGameError> {
        self.set_state(HandStatus::Draw, reason)
    }

    pub fn won(&mut self, reason: Reason) -> Result<(), BlackjackGameError> {
        self.set_state(HandStatus::Won, Some(reason))
    }

    fn set_state(
        &mut self,
        status: HandStatus,
        reason: Option<Reason>,
    ) -> Result<(), BlackjackGameError> {
        self.status = self.status.transition(status)?;
        self.reason = reason;
        Ok(())
    }
}

impl Default for Hand {
    fn default() -> Self {
        Hand::new()
    }
}

impl Display for Hand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let score = self.score();
        let cards = self
            .cards
            .iter()
            .map(|c| c.to_string())
            .collect::<Vec<String>>()
            .join("");
        if score.low != score.high && score.high <= 21 {
            write!(f, "{} {}/{}", cards, score.low, score.high)
        } else {
            write!(f, "{} {}", cards, score.high)
        }
    }
}
