use crate::game::error::BlackjackGameError;
use crate::game::hand::{Hand, HandStatus};
use crate::game::strategy::{self, Action, AvailableActions, BidLadder, StrategyTable};
use blackjack_lib::Card;
use log::{debug, trace};
use std::fmt::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerStatus {
    Disabled,
    Waiting,
    Biding,
    Playing,
}

/// Struct for a simulated player. Holds one or two hands for the current round, plus the state of
/// the bid ladder carried from round to round.
#[derive(Debug, Clone)]
pub struct PlayerSim {
    id: String,
    status: PlayerStatus,
    hands: Vec<Hand>,
    current_hand_index: usize,
    ladder: BidLadder,
    pub last_bid: f64,
    pub lost_balance: f64,
}

impl PlayerSim {
    /// Associated function to create a new `PlayerSim` struct.
    pub fn new<S: Into<String>>(id: S, ladder: BidLadder) -> PlayerSim {
        PlayerSim {
            id: id.into(),
            status: PlayerStatus::Waiting,
            hands: vec![],
            current_hand_index: 0,
            ladder,
            last_bid: ladder.original_bid,
            lost_balance: 0.0,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn status(&self) -> PlayerStatus {
        self.status
    }

    pub fn set_status(&mut self, status: PlayerStatus) {
        self.status = status;
    }

    pub fn ladder(&self) -> &BidLadder {
        &self.ladder
    }

    pub fn hands(&self) -> &[Hand] {
        &self.hands
    }

    pub(crate) fn hand_mut(&mut self, index: usize) -> Result<&mut Hand, BlackjackGameError> {
        match self.hands.get_mut(index) {
            Some(hand) => Ok(hand),
            None => Err(BlackjackGameError::NoActiveHand(self.id.clone())),
        }
    }

    pub fn current_hand_index(&self) -> usize {
        self.current_hand_index
    }

    pub fn current_hand(&self) -> Option<&Hand> {
        self.hands.get(self.current_hand_index)
    }

    pub(crate) fn current_hand_mut(&mut self) -> Result<&mut Hand, BlackjackGameError> {
        let index = self.current_hand_index;
        self.hand_mut(index)
    }

    /// True while the player is on the first of two hands.
    pub fn has_second_hand(&self) -> bool {
        self.current_hand_index == 0 && self.hands.len() == 2
    }

    /// Computes the next wager from the bid ladder, capped by `balance`. Records it as the last bid.
    pub fn bid(&mut self, balance: f64) -> f64 {
        self.status = PlayerStatus::Biding;
        let mut current_bid = self.ladder.next_bid(self.last_bid, self.lost_balance);
        if current_bid > balance {
            debug!("player \"{}\" is all in with {:.2}", self.id, balance);
            current_bid = balance;
        }
        self.last_bid = current_bid;
        self.status = PlayerStatus::Waiting;
        current_bid
    }

    /// Receives a card on the current hand, opening the hand if it does not exist yet.
    pub fn add_card(&mut self, card: Card) -> Result<(), BlackjackGameError> {
        if self.hands.len() <= self.current_hand_index {
            self.hands.push(Hand::new());
        }
        self.current_hand_mut()?.add_card(card)
    }

    /// Moves the last card of the current hand into a new second hand.
    pub fn split(&mut self) -> Result<(), BlackjackGameError> {
        if self.hands.len() >= 2 {
            return Err(BlackjackGameError::AlreadySplit);
        }
        let card = self
            .current_hand_mut()?
            .pop_card()?
            .ok_or(BlackjackGameError::EmptyHand)?;
        let mut second = Hand::new();
        second.add_card(card)?;
        self.hands.push(second);
        Ok(())
    }

    pub fn select_second_hand(&mut self) -> Result<(), BlackjackGameError> {
        if !self.has_second_hand() {
            return Err(BlackjackGameError::NoSecondHand);
        }
        self.current_hand_index = 1;
        self.current_hand_mut()?.play()
    }

    /// Decides how to play the current hand against the dealer's up-card. The returned action is
    /// always one of `actions`.
    pub fn play(
        &mut self,
        dealer_up_card: u8,
        actions: &AvailableActions,
    ) -> Result<Action, BlackjackGameError> {
        self.current_hand_mut()?.play()?;
        let hand = &self.hands[self.current_hand_index];

        let (table, hand_score) = if hand.has_pairs() {
            (StrategyTable::Pairs, hand.pairs_of()?)
        } else if hand.is_soft() {
            (StrategyTable::Soft, hand.soft_of()?)
        } else if hand.score().high >= 17 {
            return Ok(Action::Stand);
        } else {
            (StrategyTable::Hard, hand.score().high)
        };

        let action = strategy::lookup(table, hand_score, dealer_up_card)?;
        trace!(
            "player \"{}\" {} against {}: {} table says {}",
            self.id,
            hand,
            dealer_up_card,
            table,
            action
        );
        if actions.contains(action) {
            return Ok(action);
        }

        match action {
            Action::Double => Ok(Action::Hit),
            Action::Split => {
                let hard_total = hand.score().high;
                if hard_total >= 17 {
                    return Ok(Action::Stand);
                }
                match strategy::lookup(StrategyTable::Hard, hard_total, dealer_up_card)? {
                    fallback if actions.contains(fallback) => Ok(fallback),
                    Action::Double => Ok(Action::Hit),
                    _ => Ok(Action::Stand),
                }
            }
            other => Err(BlackjackGameError::ActionNotAvailable(other)),
        }
    }

    pub fn loss(&mut self, amount: f64) {
        self.lost_balance -= amount;
    }

    pub fn draw(&mut self) {
        if self.lost_balance > 0.0 {
            self.lost_balance = 0.0;
        }
    }

    pub fn win(&mut self, amount: f64) {
        self.lost_balance += amount;
    }

    /// True once none of the hands is still being played.
    pub fn is_done(&self) -> bool {
        !self
            .hands
            .iter()
            .any(|hand| hand.status() == HandStatus::Playing)
    }

    /// Drops the hands of the last round. A disabled player stays disabled.
    pub fn clear(&mut self) {
        self.current_hand_index = 0;
        self.hands.clear();
        if self.status != PlayerStatus::Disabled {
            self.status = PlayerStatus::Waiting;
        }
    }
}

impl Display for PlayerSim {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let hands = self
            .hands
            .iter()
            .map(|hand| hand.to_string())
            .collect::<Vec<String>>()
            .join(", ");
        write!(
            f,
            "{:<21}{}\n\
             {:<21}{:?}\n\
             {:<21}{}\n\
             {:<21}{}\n\
             {:<21}{:.2}\n\
             {:<21}{:.2}",
            "player:",
            self.id,
            "status:",
            self.status,
            "hands:",
            hands,
            "hand_idx:",
            self.current_hand_index,
            "last_bid:",
            self.last_bid,
            "lost_balance:",
            self.lost_balance,
        )
    }
}
